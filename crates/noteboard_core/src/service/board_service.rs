//! Board use-case service.
//!
//! # Responsibility
//! - Implement the board's user actions: add, edit, delete, upvote.
//! - Load the current user and their points.
//! - Serve the notes-for-list view rows and per-note vote tallies.
//!
//! # Invariants
//! - Adding a note awards its author `NOTE_CREATION_AWARD` points in the
//!   same transaction.
//! - Upvotes never change the note or the voter's points.
//! - Deleting a note leaves points and votes untouched.

use crate::ledger::{validate_doc_id, DocId};
use crate::model::note::{Note, NoteWithAuthor};
use crate::model::person::Person;
use crate::model::vote::{Vote, VoteTally};
use crate::model::RecordValidationError;
use crate::repo::board_repo::{
    normalize_notes_limit, AuthorJoinKey, BoardRepository, NotesForListQuery,
};
use crate::repo::RepoError;
use crate::service::seed_service::{seed_baseline, SeedPolicy, SeedReport};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Points granted to an author for each note they add.
pub const NOTE_CREATION_AWARD: u32 = 5;

/// Service error for board use-cases.
#[derive(Debug)]
pub enum BoardServiceError {
    /// Note text is blank.
    EmptyText,
    /// An id supplied by the caller cannot name a document.
    InvalidId(String),
    /// Target note does not exist.
    NoteNotFound(DocId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "note text cannot be empty"),
            Self::InvalidId(id) => write!(f, "invalid id: `{id}`"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent board state: {details}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BoardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind: "note", id } => Self::NoteNotFound(id),
            RepoError::Validation(RecordValidationError::EmptyText) => Self::EmptyText,
            RepoError::Validation(RecordValidationError::InvalidId { value, .. }) => {
                Self::InvalidId(value)
            }
            other => Self::Repo(other),
        }
    }
}

pub type BoardResult<T> = Result<T, BoardServiceError>;

/// Result envelope of the notes-for-list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesForListResult {
    /// Rows sorted by `[author points, created_at]` descending.
    pub items: Vec<NoteWithAuthor>,
    /// Effective normalized limit used by the query.
    pub applied_limit: usize,
}

/// Outcome of a successful add-note action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedNote {
    pub note: Note,
    /// Author record after the point award.
    pub author: Person,
}

/// Board service facade over repository implementations.
pub struct BoardService<R: BoardRepository> {
    repo: R,
}

impl<R: BoardRepository> BoardService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Writes baseline data for `list_id`.
    pub fn seed(&self, list_id: &str, policy: SeedPolicy) -> BoardResult<SeedReport> {
        check_id(list_id)?;
        Ok(seed_baseline(&self.repo, list_id, policy)?)
    }

    /// Notes of one list joined with their authors, newest high scorers first.
    pub fn notes_for_list(
        &self,
        list_id: &str,
        join_key: AuthorJoinKey,
    ) -> BoardResult<NotesForListResult> {
        check_id(list_id)?;
        let applied_limit = normalize_notes_limit(None);
        let query = NotesForListQuery {
            list_id: list_id.to_string(),
            join_key,
            limit: Some(applied_limit),
        };
        let items = self.repo.notes_for_list(&query)?;
        Ok(NotesForListResult {
            items,
            applied_limit,
        })
    }

    /// Gets one note by id.
    pub fn get_note(&self, note_id: &str) -> BoardResult<Note> {
        check_id(note_id)?;
        self.repo
            .get_note(note_id)?
            .ok_or_else(|| BoardServiceError::NoteNotFound(note_id.to_string()))
    }

    /// Fetches the person acting as current user, if they exist.
    pub fn load_current_user(&self, user_id: &str) -> BoardResult<Option<Person>> {
        check_id(user_id)?;
        Ok(self.repo.get_person(user_id)?)
    }

    /// Current points of `user_id`; 0 when the person or field is absent.
    pub fn current_user_points(&self, user_id: &str) -> BoardResult<u32> {
        check_id(user_id)?;
        Ok(self.repo.person_points(user_id)?.unwrap_or(0))
    }

    /// Records an upvote carrying the voter's current point snapshot.
    ///
    /// # Errors
    /// - `NoteNotFound` when `note_id` names no note.
    pub fn upvote(&self, note_id: &str, user_id: &str) -> BoardResult<Vote> {
        check_id(note_id)?;
        if self.repo.get_note(note_id)?.is_none() {
            return Err(BoardServiceError::NoteNotFound(note_id.to_string()));
        }

        let points = self.current_user_points(user_id)?;
        let vote = self.repo.put_vote(&Vote::new(note_id, user_id, points))?;
        info!(
            "event=note_upvote module=service status=ok note_id={} user_id={} points={}",
            note_id, user_id, points
        );
        Ok(vote)
    }

    /// Adds a note by `current_user` and awards them points.
    ///
    /// Text is trimmed before storage. Both writes commit together.
    pub fn add_note(
        &mut self,
        list_id: &str,
        current_user: &Person,
        text: &str,
    ) -> BoardResult<AddedNote> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BoardServiceError::EmptyText);
        }
        check_id(list_id)?;

        let draft = Note::new(list_id, current_user.id.as_str(), text);
        let (note, author) =
            self.repo
                .create_note_with_award(&draft, current_user, NOTE_CREATION_AWARD)?;
        let note_id = note
            .id
            .as_deref()
            .ok_or(BoardServiceError::InconsistentState(
                "created note has no id",
            ))?;
        info!(
            "event=note_add module=service status=ok note_id={} list_id={} author_id={} author_points={}",
            note_id, list_id, author.id, author.points
        );
        Ok(AddedNote { note, author })
    }

    /// Replaces a note's text.
    ///
    /// `None` or blank replacement keeps the current text; the note is
    /// rewritten either way.
    pub fn edit_note(&self, note_id: &str, replacement: Option<&str>) -> BoardResult<Note> {
        let mut note = self.get_note(note_id)?;

        if let Some(text) = replacement.map(str::trim).filter(|text| !text.is_empty()) {
            note.text = text.to_string();
        }
        let stored = self.repo.put_note(&note)?;
        info!("event=note_edit module=service status=ok note_id={note_id}");
        Ok(stored)
    }

    pub fn delete_note(&self, note_id: &str) -> BoardResult<()> {
        check_id(note_id)?;
        self.repo.delete_note(note_id)?;
        info!("event=note_delete module=service status=ok note_id={note_id}");
        Ok(())
    }

    pub fn vote_tally(&self, note_id: &str) -> BoardResult<VoteTally> {
        check_id(note_id)?;
        let votes = self.repo.votes_for_note(note_id)?;
        Ok(VoteTally::from_votes(&votes))
    }
}

fn check_id(id: &str) -> BoardResult<()> {
    validate_doc_id(id).map_err(|_| BoardServiceError::InvalidId(id.to_string()))
}
