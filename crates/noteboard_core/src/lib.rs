//! Core logic for the note board.
//! Notes, people, lists and votes live in document ledgers on SQLite; this
//! crate owns the board's data shapes, query and mutation rules.

pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use config::{BoardConfig, ConfigError};
pub use ledger::{Document, Ledger, LedgerError, LedgerResult, SortKey};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::list::NoteList;
pub use model::note::{Note, NoteWithAuthor};
pub use model::person::Person;
pub use model::vote::{Vote, VoteTally};
pub use model::RecordValidationError;
pub use repo::board_repo::{
    AuthorJoinKey, BoardRepository, NotesForListQuery, SqliteBoardRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::board_service::{
    AddedNote, BoardResult, BoardService, BoardServiceError, NotesForListResult,
    NOTE_CREATION_AWARD,
};
pub use service::seed_service::{SeedPolicy, SeedReport};
pub use view::{BoardOptions, BoardProps, BoardView, EditState, NoteBoard, NoteCard};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
