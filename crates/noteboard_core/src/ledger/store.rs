//! SQLite-backed ledger handle.
//!
//! # Responsibility
//! - Upsert, read, delete and scan documents of one named ledger.
//!
//! # Invariants
//! - All statements are scoped by `ledger = ?`; ledgers never see each
//!   other's documents.
//! - Scans return documents in insertion (`seq`) order.

use super::document::{record_body, ID_FIELD};
use super::query::Select;
use super::{validate_doc_id, validate_field_name, DocId, Document, LedgerError, LedgerResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Handle over one named document ledger.
///
/// Cheap to copy; it only borrows the connection.
#[derive(Clone, Copy)]
pub struct Ledger<'conn> {
    conn: &'conn Connection,
    name: &'static str,
}

impl<'conn> Ledger<'conn> {
    pub fn open(conn: &'conn Connection, name: &'static str) -> Self {
        Self { conn, name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Upserts a document body and returns it with its identifier.
    ///
    /// A missing `_id` gets a fresh UUID v4; an existing `_id` replaces the
    /// stored body of that document.
    ///
    /// # Errors
    /// - `InvalidDocument` when `_id` is present but not a string.
    /// - `InvalidId` when `_id` fails validation.
    pub fn put(&self, mut body: Map<String, Value>) -> LedgerResult<Document> {
        let id: DocId = match body.remove(ID_FIELD) {
            Some(Value::String(id)) => {
                validate_doc_id(&id)?;
                id
            }
            Some(Value::Null) | None => Uuid::new_v4().to_string(),
            Some(other) => {
                return Err(LedgerError::InvalidDocument {
                    ledger: self.name,
                    message: format!("`_id` must be a string, got {other}"),
                })
            }
        };

        let document = Document::new(id, body);
        let serialized = serde_json::to_string(document.body())?;
        self.conn.execute(
            "INSERT INTO documents (ledger, doc_id, body)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (ledger, doc_id) DO UPDATE
             SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.name, document.id(), serialized],
        )?;

        debug!(
            "event=ledger_put module=ledger status=ok ledger={} doc_id={}",
            self.name,
            document.id()
        );
        Ok(document)
    }

    /// Serializes `record`, upserts it, and decodes the stored document back.
    pub fn put_record<T>(&self, record: &T) -> LedgerResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let body = record_body(self.name, record)?;
        self.put(body)?.to_record()
    }

    pub fn get(&self, id: &str) -> LedgerResult<Option<Document>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE ledger = ?1 AND doc_id = ?2;",
                params![self.name, id],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|raw| Document::from_stored(self.name, &raw))
            .transpose()
    }

    pub fn get_record<T: DeserializeOwned>(&self, id: &str) -> LedgerResult<Option<T>> {
        self.get(id)?.map(|doc| doc.to_record()).transpose()
    }

    /// Deletes a document. Returns whether a document was removed.
    pub fn delete(&self, id: &str) -> LedgerResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE ledger = ?1 AND doc_id = ?2;",
            params![self.name, id],
        )?;
        debug!(
            "event=ledger_delete module=ledger status=ok ledger={} doc_id={} removed={}",
            self.name,
            id,
            changed > 0
        );
        Ok(changed > 0)
    }

    pub fn len(&self) -> LedgerResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE ledger = ?1;",
            [self.name],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Starts a query over this ledger.
    pub fn select<'q>(&self) -> Select<'conn, 'q> {
        Select::new(*self)
    }

    /// Loads documents in insertion order, optionally narrowed in SQL to
    /// those whose top-level `field` equals `value`.
    pub(crate) fn scan(&self, eq: Option<(&str, &str)>) -> LedgerResult<Vec<Document>> {
        let mut documents = Vec::new();
        match eq {
            Some((field, value)) => {
                validate_field_name(field)?;
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT body
                     FROM documents
                     WHERE ledger = ?1
                       AND json_extract(body, '$.{field}') = ?2
                     ORDER BY seq ASC;"
                ))?;
                let mut rows = stmt.query(params![self.name, value])?;
                while let Some(row) = rows.next()? {
                    let raw: String = row.get(0)?;
                    documents.push(Document::from_stored(self.name, &raw)?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT body
                     FROM documents
                     WHERE ledger = ?1
                     ORDER BY seq ASC;",
                )?;
                let mut rows = stmt.query([self.name])?;
                while let Some(row) = rows.next()? {
                    let raw: String = row.get(0)?;
                    documents.push(Document::from_stored(self.name, &raw)?);
                }
            }
        }
        Ok(documents)
    }
}
