//! Typed records stored in the board ledgers.
//!
//! # Responsibility
//! - Define the note/person/list/vote shapes and their JSON field names.
//! - Validate records before they reach a ledger.
//!
//! # Invariants
//! - Field names are stable wire names (`list_id`, `author_id`, `_id`, ...).
//! - Timestamps serialize as RFC 3339 UTC strings.

use crate::ledger::validate_doc_id;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod list;
pub mod note;
pub mod person;
pub mod vote;

/// Validation failure for a record about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Note text is empty after trimming.
    EmptyText,
    /// A reference or identifier field holds an unusable document id.
    InvalidId { field: &'static str, value: String },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "note text cannot be empty"),
            Self::InvalidId { field, value } => write!(f, "invalid {field}: `{value}`"),
        }
    }
}

impl Error for RecordValidationError {}

pub(crate) fn check_id(field: &'static str, value: &str) -> Result<(), RecordValidationError> {
    validate_doc_id(value).map_err(|_| RecordValidationError::InvalidId {
        field,
        value: value.to_string(),
    })
}
