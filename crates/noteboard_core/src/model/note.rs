use super::person::Person;
use super::{check_id, RecordValidationError};
use crate::ledger::DocId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note posted on a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Assigned by the ledger on first write.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    pub list_id: DocId,
    pub author_id: DocId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Creates an unsaved note stamped with the current time.
    pub fn new(
        list_id: impl Into<DocId>,
        author_id: impl Into<DocId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            list_id: list_id.into(),
            author_id: author_id.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<DocId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// # Errors
    /// - `EmptyText` when `text` is blank.
    /// - `InvalidId` when `_id`, `list_id` or `author_id` is not a usable id.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.text.trim().is_empty() {
            return Err(RecordValidationError::EmptyText);
        }
        if let Some(id) = self.id.as_deref() {
            check_id("_id", id)?;
        }
        check_id("list_id", &self.list_id)?;
        check_id("author_id", &self.author_id)
    }
}

/// Projection row of the notes-for-list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteWithAuthor {
    pub note: Note,
    /// `None` when the join found no matching person.
    pub author: Option<Person>,
}
