use super::{validate_doc_id, LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Identifier of one document inside a ledger.
pub type DocId = String;

pub(crate) const ID_FIELD: &str = "_id";

/// One stored JSON object together with its ledger-assigned `_id`.
///
/// The body always mirrors the identifier under `_id`, so field lookups and
/// typed decoding see the same shape the ledger persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocId,
    body: Map<String, Value>,
}

impl Document {
    pub(crate) fn new(id: DocId, mut body: Map<String, Value>) -> Self {
        body.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        Self { id, body }
    }

    /// Decodes a persisted body, requiring a valid string `_id`.
    pub(crate) fn from_stored(ledger: &'static str, raw: &str) -> LedgerResult<Self> {
        let body = match serde_json::from_str::<Value>(raw)? {
            Value::Object(body) => body,
            _ => {
                return Err(LedgerError::InvalidDocument {
                    ledger,
                    message: "document body is not a JSON object".to_string(),
                })
            }
        };
        let id = match body.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            _ => {
                return Err(LedgerError::InvalidDocument {
                    ledger,
                    message: "document body has no string `_id`".to_string(),
                })
            }
        };
        validate_doc_id(&id)?;
        Ok(Self { id, body })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn i64_field(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(Value::as_i64)
    }

    /// Parses an RFC 3339 string field into a UTC timestamp.
    pub fn time_field(&self, name: &str) -> Option<DateTime<Utc>> {
        self.str_field(name)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|time| time.with_timezone(&Utc))
    }

    /// Keeps only the named fields (plus `_id`).
    pub(crate) fn project(self, fields: &[String]) -> Self {
        let Self { id, body } = self;
        let body = body
            .into_iter()
            .filter(|(key, _)| key == ID_FIELD || fields.iter().any(|field| field == key))
            .collect();
        Self { id, body }
    }

    /// Deserializes the document into a typed record.
    pub fn to_record<T: DeserializeOwned>(&self) -> LedgerResult<T> {
        Ok(serde_json::from_value(Value::Object(self.body.clone()))?)
    }
}

/// Serializes a typed record into a JSON object body.
pub(crate) fn record_body<T: Serialize>(
    ledger: &'static str,
    record: &T,
) -> LedgerResult<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(body) => Ok(body),
        _ => Err(LedgerError::InvalidDocument {
            ledger,
            message: "record does not serialize to a JSON object".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use serde_json::json;

    #[test]
    fn from_stored_requires_object_with_string_id() {
        assert!(Document::from_stored("noteLedger", r#"{"_id":"n1","text":"x"}"#).is_ok());
        assert!(Document::from_stored("noteLedger", r#"["n1"]"#).is_err());
        assert!(Document::from_stored("noteLedger", r#"{"_id":7}"#).is_err());
    }

    #[test]
    fn project_keeps_id_and_requested_fields() {
        let body = json!({"name": "Author 1", "points": 50})
            .as_object()
            .cloned()
            .unwrap();
        let doc = Document::new("author-1".to_string(), body).project(&["points".to_string()]);
        assert_eq!(doc.str_field("_id"), Some("author-1"));
        assert_eq!(doc.i64_field("points"), Some(50));
        assert!(doc.field("name").is_none());
    }

    #[test]
    fn time_field_parses_rfc3339_and_ignores_garbage() {
        let body = json!({"a": "2026-01-02T03:04:05Z", "b": "yesterday"})
            .as_object()
            .cloned()
            .unwrap();
        let doc = Document::new("n1".to_string(), body);
        assert!(doc.time_field("a").is_some());
        assert!(doc.time_field("b").is_none());
    }
}
