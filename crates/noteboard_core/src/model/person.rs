use super::{check_id, RecordValidationError};
use crate::ledger::DocId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A note author and voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: DocId,
    pub name: String,
    /// Accumulated points; absent on legacy documents.
    #[serde(default)]
    pub points: u32,
    /// Fields this crate does not model, kept across upserts.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Person {
    pub fn new(id: impl Into<DocId>, name: impl Into<String>, points: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            points,
            extra: Map::new(),
        }
    }

    /// Copy of this person with `amount` more points, saturating at `u32::MAX`.
    pub fn awarded(&self, amount: u32) -> Self {
        Self {
            points: self.points.saturating_add(amount),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        check_id("_id", &self.id)
    }
}
