//! Repository layer over the board ledgers.
//!
//! # Responsibility
//! - Map typed records onto the `noteLedger`/`peopleDB`/`listDB`/`voteLedger`
//!   document ledgers.
//! - Own the notes-for-list join query and multi-ledger transactions.
//!
//! # Invariants
//! - Write paths validate records before touching a ledger.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   ledger/DB transport errors.

use crate::db::DbError;
use crate::ledger::{DocId, LedgerError};
use crate::model::RecordValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod board_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for board persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Ledger(LedgerError),
    NotFound {
        kind: &'static str,
        id: DocId,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<LedgerError> for RepoError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Ledger(LedgerError::Db(value))
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Ledger(LedgerError::from(value))
    }
}
