//! Baseline demo data for a board.
//!
//! # Responsibility
//! - Make sure a list has its seed note, seed author and list record.
//!
//! # Invariants
//! - `InitializeOnce` is idempotent: repeated calls write nothing new and
//!   never reset the seed author's points.
//! - `ReseedEveryRender` inserts a fresh seed note per call and overwrites
//!   the seed author/list by fixed id.

use crate::model::list::NoteList;
use crate::model::note::Note;
use crate::model::person::Person;
use crate::repo::board_repo::BoardRepository;
use crate::repo::RepoResult;
use log::info;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub const SEED_AUTHOR_ID: &str = "author-1";
pub const SEED_AUTHOR_NAME: &str = "Author 1";
pub const SEED_AUTHOR_POINTS: u32 = 50;
pub const SEED_NOTE_TEXT: &str = "hello world";

/// When baseline data is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Check-then-insert with fixed ids, once per list.
    #[default]
    InitializeOnce,
    /// Write the baseline on every render, duplicating the seed note.
    ReseedEveryRender,
}

impl Display for SeedPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitializeOnce => f.write_str("once"),
            Self::ReseedEveryRender => f.write_str("every_render"),
        }
    }
}

impl FromStr for SeedPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Self::InitializeOnce),
            "every_render" | "every-render" => Ok(Self::ReseedEveryRender),
            other => Err(format!(
                "unsupported seed policy `{other}`; expected once|every_render"
            )),
        }
    }
}

/// What one seeding pass wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub note_written: bool,
    pub person_written: bool,
    pub list_written: bool,
}

impl SeedReport {
    pub fn wrote_anything(&self) -> bool {
        self.note_written || self.person_written || self.list_written
    }
}

/// Fixed id of the seed note for `list_id` under `InitializeOnce`.
///
/// Derived through a name-based UUID so it fits the id limit for any valid
/// list id.
pub fn seed_note_id(list_id: &str) -> String {
    let key = Uuid::new_v5(&Uuid::NAMESPACE_OID, list_id.as_bytes());
    format!("seed-note-{key}")
}

/// Writes the baseline records for `list_id` according to `policy`.
pub fn seed_baseline<R: BoardRepository>(
    repo: &R,
    list_id: &str,
    policy: SeedPolicy,
) -> RepoResult<SeedReport> {
    let report = match policy {
        SeedPolicy::InitializeOnce => {
            let note_id = seed_note_id(list_id);
            let note_written = repo.get_note(&note_id)?.is_none();
            if note_written {
                repo.put_note(&seed_note(list_id).with_id(note_id))?;
            }
            let person_written = repo.get_person(SEED_AUTHOR_ID)?.is_none();
            if person_written {
                repo.put_person(&seed_author())?;
            }
            let list_written = repo.get_list(list_id)?.is_none();
            if list_written {
                repo.put_list(&NoteList::named_after(list_id))?;
            }
            SeedReport {
                note_written,
                person_written,
                list_written,
            }
        }
        SeedPolicy::ReseedEveryRender => {
            repo.put_note(&seed_note(list_id))?;
            repo.put_person(&seed_author())?;
            repo.put_list(&NoteList::named_after(list_id))?;
            SeedReport {
                note_written: true,
                person_written: true,
                list_written: true,
            }
        }
    };

    if report.wrote_anything() {
        info!(
            "event=seed module=service status=ok policy={} list_id={} note={} person={} list={}",
            policy, list_id, report.note_written, report.person_written, report.list_written
        );
    }
    Ok(report)
}

fn seed_note(list_id: &str) -> Note {
    Note::new(list_id, SEED_AUTHOR_ID, SEED_NOTE_TEXT)
}

fn seed_author() -> Person {
    Person::new(SEED_AUTHOR_ID, SEED_AUTHOR_NAME, SEED_AUTHOR_POINTS)
}

#[cfg(test)]
mod tests {
    use super::{seed_note_id, SeedPolicy};

    #[test]
    fn seed_policy_parses_config_spellings() {
        assert_eq!("once".parse::<SeedPolicy>(), Ok(SeedPolicy::InitializeOnce));
        assert_eq!(
            " Every_Render ".parse::<SeedPolicy>(),
            Ok(SeedPolicy::ReseedEveryRender)
        );
        assert!("always".parse::<SeedPolicy>().is_err());
    }

    #[test]
    fn seed_note_id_is_scoped_by_list() {
        assert_ne!(seed_note_id("a"), seed_note_id("b"));
        assert_eq!(seed_note_id("a"), seed_note_id("a"));
    }

    #[test]
    fn seed_note_id_stays_valid_for_longest_list_id() {
        let id = seed_note_id(&"a".repeat(128));
        assert!(crate::ledger::validate_doc_id(&id).is_ok());
    }
}
