//! Board repository contract and ledger-backed implementation.
//!
//! # Responsibility
//! - Provide typed CRUD over notes, people, lists and votes.
//! - Run the notes-for-list query: filter by list, left join authors, sort
//!   by `[points, created_at]` descending, cap the row count.
//! - Apply note creation and the author's point award atomically.
//!
//! # Invariants
//! - Notes-for-list never returns more than `NOTES_LIMIT_MAX` rows.
//! - `create_note_with_award` writes both documents or neither.

use super::{RepoError, RepoResult};
use crate::ledger::{Ledger, SortKey};
use crate::model::list::NoteList;
use crate::model::note::{Note, NoteWithAuthor};
use crate::model::person::Person;
use crate::model::vote::Vote;
use rusqlite::{Connection, TransactionBehavior};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const NOTES_LEDGER: &str = "noteLedger";
pub const PEOPLE_LEDGER: &str = "peopleDB";
pub const LISTS_LEDGER: &str = "listDB";
pub const VOTES_LEDGER: &str = "voteLedger";

const NOTES_DEFAULT_LIMIT: usize = 100;
const NOTES_LIMIT_MAX: usize = 100;

/// Note field compared against `person._id` when joining authors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorJoinKey {
    /// `note.author_id`, the field notes are actually written with.
    #[default]
    AuthorId,
    /// `note.authorId`. No stored note carries it, so every row comes back
    /// without an author. Kept to reproduce the historical board output.
    LegacyCamelCase,
}

impl AuthorJoinKey {
    pub fn field(self) -> &'static str {
        match self {
            Self::AuthorId => "author_id",
            Self::LegacyCamelCase => "authorId",
        }
    }
}

impl Display for AuthorJoinKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

impl FromStr for AuthorJoinKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "author_id" => Ok(Self::AuthorId),
            "authorId" => Ok(Self::LegacyCamelCase),
            other => Err(format!(
                "unsupported join key `{other}`; expected author_id|authorId"
            )),
        }
    }
}

/// Query options for the notes-for-list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesForListQuery {
    pub list_id: String,
    pub join_key: AuthorJoinKey,
    /// Maximum rows to return. Defaults to 100 and clamps to 100.
    pub limit: Option<usize>,
}

/// Repository interface for board operations.
pub trait BoardRepository {
    /// Upserts a note and returns it with its assigned id.
    fn put_note(&self, note: &Note) -> RepoResult<Note>;
    fn get_note(&self, id: &str) -> RepoResult<Option<Note>>;
    /// Removes a note; `NotFound` when no such note exists.
    fn delete_note(&self, id: &str) -> RepoResult<()>;
    /// All notes of a list in insertion order, without joins or limits.
    fn list_notes(&self, list_id: &str) -> RepoResult<Vec<Note>>;
    /// Joined, sorted and capped view rows for one list.
    fn notes_for_list(&self, query: &NotesForListQuery) -> RepoResult<Vec<NoteWithAuthor>>;
    /// Creates `note` and adds `award` points to the stored copy of `author`
    /// in one transaction. `author` is written as given when not stored yet.
    fn create_note_with_award(
        &mut self,
        note: &Note,
        author: &Person,
        award: u32,
    ) -> RepoResult<(Note, Person)>;

    fn put_person(&self, person: &Person) -> RepoResult<Person>;
    fn get_person(&self, id: &str) -> RepoResult<Option<Person>>;
    /// Reads only the `points` field of a person.
    ///
    /// Returns `None` when the person or the field is absent.
    fn person_points(&self, id: &str) -> RepoResult<Option<u32>>;

    fn put_list(&self, list: &NoteList) -> RepoResult<NoteList>;
    fn get_list(&self, id: &str) -> RepoResult<Option<NoteList>>;

    /// Appends a vote and returns it with its assigned id.
    fn put_vote(&self, vote: &Vote) -> RepoResult<Vote>;
    fn votes_for_note(&self, note_id: &str) -> RepoResult<Vec<Vote>>;
}

/// Board repository backed by SQLite document ledgers.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the connection
    ///   was not opened through `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn ledger(&self, name: &'static str) -> Ledger<'_> {
        Ledger::open(&*self.conn, name)
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn put_note(&self, note: &Note) -> RepoResult<Note> {
        note.validate()?;
        Ok(self.ledger(NOTES_LEDGER).put_record(note)?)
    }

    fn get_note(&self, id: &str) -> RepoResult<Option<Note>> {
        Ok(self.ledger(NOTES_LEDGER).get_record(id)?)
    }

    fn delete_note(&self, id: &str) -> RepoResult<()> {
        if self.ledger(NOTES_LEDGER).delete(id)? {
            Ok(())
        } else {
            Err(RepoError::NotFound {
                kind: "note",
                id: id.to_string(),
            })
        }
    }

    fn list_notes(&self, list_id: &str) -> RepoResult<Vec<Note>> {
        self.ledger(NOTES_LEDGER)
            .select()
            .where_eq("list_id", list_id)
            .rows()?
            .iter()
            .map(|doc| doc.to_record().map_err(RepoError::from))
            .collect()
    }

    fn notes_for_list(&self, query: &NotesForListQuery) -> RepoResult<Vec<NoteWithAuthor>> {
        let join_field = query.join_key.field();
        let rows = self
            .ledger(NOTES_LEDGER)
            .select()
            .where_eq("list_id", query.list_id.as_str())
            .join(self.ledger(PEOPLE_LEDGER))
            .on(move |note, person| note.str_field(join_field) == Some(person.id()))
            .order_by(|note, person| {
                vec![
                    SortKey::int_field(person, "points"),
                    SortKey::time_field(Some(note), "created_at"),
                ]
            })
            .desc()
            .limit(normalize_notes_limit(query.limit))
            .rows()?;

        rows.into_iter()
            .map(|row| {
                Ok(NoteWithAuthor {
                    note: row.left.to_record()?,
                    author: row.right.map(|doc| doc.to_record()).transpose()?,
                })
            })
            .collect()
    }

    fn create_note_with_award(
        &mut self,
        note: &Note,
        author: &Person,
        award: u32,
    ) -> RepoResult<(Note, Person)> {
        note.validate()?;
        author.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let stored = {
            let people = Ledger::open(&tx, PEOPLE_LEDGER);
            // Another connection may have awarded points since `author` was read.
            let current = people
                .get_record::<Person>(&author.id)?
                .unwrap_or_else(|| author.clone());
            let note = Ledger::open(&tx, NOTES_LEDGER).put_record(note)?;
            let person = people.put_record(&current.awarded(award))?;
            (note, person)
        };
        tx.commit()?;
        Ok(stored)
    }

    fn put_person(&self, person: &Person) -> RepoResult<Person> {
        person.validate()?;
        Ok(self.ledger(PEOPLE_LEDGER).put_record(person)?)
    }

    fn get_person(&self, id: &str) -> RepoResult<Option<Person>> {
        Ok(self.ledger(PEOPLE_LEDGER).get_record(id)?)
    }

    fn person_points(&self, id: &str) -> RepoResult<Option<u32>> {
        let projected = self
            .ledger(PEOPLE_LEDGER)
            .select()
            .fields(["points"])
            .where_eq("_id", id)
            .first()?;

        match projected.and_then(|doc| doc.field("points").cloned()) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|points| u32::try_from(points).ok())
                .map(Some)
                .ok_or_else(|| {
                    RepoError::InvalidData(format!("invalid points value `{value}` for `{id}`"))
                }),
        }
    }

    fn put_list(&self, list: &NoteList) -> RepoResult<NoteList> {
        list.validate()?;
        Ok(self.ledger(LISTS_LEDGER).put_record(list)?)
    }

    fn get_list(&self, id: &str) -> RepoResult<Option<NoteList>> {
        Ok(self.ledger(LISTS_LEDGER).get_record(id)?)
    }

    fn put_vote(&self, vote: &Vote) -> RepoResult<Vote> {
        vote.validate()?;
        Ok(self.ledger(VOTES_LEDGER).put_record(vote)?)
    }

    fn votes_for_note(&self, note_id: &str) -> RepoResult<Vec<Vote>> {
        self.ledger(VOTES_LEDGER)
            .select()
            .where_eq("note_id", note_id)
            .rows()?
            .iter()
            .map(|doc| doc.to_record().map_err(RepoError::from))
            .collect()
    }
}

/// Normalizes the notes-for-list limit.
pub fn normalize_notes_limit(limit: Option<usize>) -> usize {
    match limit {
        Some(0) | None => NOTES_DEFAULT_LIMIT,
        Some(value) => value.min(NOTES_LIMIT_MAX),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "documents")? {
        return Err(RepoError::MissingRequiredTable("documents"));
    }

    for column in ["ledger", "doc_id", "body", "seq"] {
        if !table_has_column(conn, "documents", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "documents",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{normalize_notes_limit, AuthorJoinKey};

    #[test]
    fn notes_limit_defaults_and_caps_at_100() {
        assert_eq!(normalize_notes_limit(None), 100);
        assert_eq!(normalize_notes_limit(Some(0)), 100);
        assert_eq!(normalize_notes_limit(Some(7)), 7);
        assert_eq!(normalize_notes_limit(Some(1_000)), 100);
    }

    #[test]
    fn join_key_parses_both_spellings() {
        assert_eq!("author_id".parse::<AuthorJoinKey>(), Ok(AuthorJoinKey::AuthorId));
        assert_eq!("authorId".parse::<AuthorJoinKey>(), Ok(AuthorJoinKey::LegacyCamelCase));
        assert!("author".parse::<AuthorJoinKey>().is_err());
    }
}
