use super::{check_id, RecordValidationError};
use crate::ledger::DocId;
use serde::{Deserialize, Serialize};

/// A list that notes are posted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteList {
    #[serde(rename = "_id")]
    pub id: DocId,
    pub name: String,
}

impl NoteList {
    pub fn new(id: impl Into<DocId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Default name for a list created without one.
    pub fn named_after(id: impl Into<DocId>) -> Self {
        let id = id.into();
        let name = format!("List {id}");
        Self { id, name }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        check_id("_id", &self.id)
    }
}
