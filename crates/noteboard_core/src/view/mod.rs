//! Board view component.
//!
//! # Responsibility
//! - Hold UI state (props, draft, current user, edit dialog).
//! - Derive the rendered note list from the ledgers, re-fetching only when
//!   its dependencies change.
//!
//! # Invariants
//! - The note list is keyed by `(list_id, revision)`; every successful
//!   mutation bumps `revision`.
//! - Editing is a non-blocking state machine: `Closed -> Editing -> Closed`.

mod board;
mod render;

pub use board::{BoardOptions, BoardProps, EditState, NoteBoard};
pub use render::{BoardView, NoteCard, ADD_NOTE_PLACEHOLDER, UNKNOWN_AUTHOR};
