//! Document ledgers layered on the SQLite `documents` table.
//!
//! # Responsibility
//! - Store schemaless JSON documents in independently named ledgers.
//! - Offer the put/get/delete surface and a select/where/join/order/limit
//!   query builder used by the board repository.
//!
//! # Invariants
//! - Every stored document carries a string `_id` that matches
//!   [`validate_doc_id`].
//! - `put` is an upsert keyed by `(ledger, _id)`; insertion order (`seq`) is
//!   kept across updates.
//! - Query ordering is stable: equal keys keep insertion order.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod document;
mod query;
mod store;

pub use document::{DocId, Document};
pub use query::{Join, JoinBuilder, JoinedRow, Select, SortKey};
pub use store::Ledger;

static DOC_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:@-]{0,127}$").expect("valid document id regex")
});
static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised by ledger reads, writes and queries.
#[derive(Debug)]
pub enum LedgerError {
    Db(DbError),
    /// Caller supplied a document id that fails [`validate_doc_id`].
    InvalidId(String),
    /// Query referenced a field name that cannot be pushed down to SQL.
    InvalidField(String),
    /// A document body is not a JSON object or has a malformed `_id`.
    InvalidDocument {
        ledger: &'static str,
        message: String,
    },
    Serde(serde_json::Error),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidId(id) => write!(f, "invalid document id: `{id}`"),
            Self::InvalidField(name) => write!(f, "invalid query field: `{name}`"),
            Self::InvalidDocument { ledger, message } => {
                write!(f, "invalid document in ledger `{ledger}`: {message}")
            }
            Self::Serde(err) => write!(f, "document serialization failed: {err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::InvalidId(_) | Self::InvalidField(_) | Self::InvalidDocument { .. } => None,
        }
    }
}

impl From<DbError> for LedgerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Checks that `id` can be used as a document identifier.
///
/// Accepted ids start with an ASCII alphanumeric character, continue with
/// alphanumerics or `._:@-`, and are at most 128 characters long.
pub fn validate_doc_id(id: &str) -> LedgerResult<()> {
    if DOC_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(LedgerError::InvalidId(id.to_string()))
    }
}

pub(crate) fn validate_field_name(name: &str) -> LedgerResult<()> {
    if FIELD_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(LedgerError::InvalidField(name.to_string()))
    }
}
