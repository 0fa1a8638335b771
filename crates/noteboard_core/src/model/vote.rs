use super::{check_id, RecordValidationError};
use crate::ledger::DocId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only approval of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    pub note_id: DocId,
    pub user_id: DocId,
    /// Voter's points at the time of the vote.
    pub points: u32,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(note_id: impl Into<DocId>, user_id: impl Into<DocId>, points: u32) -> Self {
        Self {
            id: None,
            note_id: note_id.into(),
            user_id: user_id.into(),
            points,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        check_id("note_id", &self.note_id)?;
        check_id("user_id", &self.user_id)
    }
}

/// Read-side aggregate of all votes cast on one note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub count: usize,
    /// Sum of the voters' point snapshots.
    pub points: u64,
}

impl VoteTally {
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        votes.into_iter().fold(Self::default(), |tally, vote| Self {
            count: tally.count + 1,
            points: tally.points + u64::from(vote.points),
        })
    }
}
