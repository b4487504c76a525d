//! Inline document metadata

use serde_json::{Map, Value};

pub const METADATA: &str = "@metadata";
pub const ID: &str = "@id";
pub const COLLECTION: &str = "@collection";
pub const CHANGE_VECTOR: &str = "@change-vector";
pub const PROJECTION: &str = "@projection";
pub const INDEX_SCORE: &str = "@index-score";

/// Metadata read from a raw result document's `@metadata` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub id: Option<String>,
    pub collection: Option<String>,
    pub change_vector: Option<String>,
    /// The document is a projection rather than a stored document
    pub projection: bool,
    raw: Value,
}

impl DocumentMetadata {
    /// A document without metadata yields empty metadata.
    pub fn from_document(document: &Value) -> Self {
        let raw = document
            .get(METADATA)
            .filter(|m| m.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        let id = text(ID);
        let collection = text(COLLECTION);
        let change_vector = text(CHANGE_VECTOR);
        let projection = raw.get(PROJECTION).and_then(Value::as_bool).unwrap_or(false);

        Self {
            id,
            collection,
            change_vector,
            projection,
            raw,
        }
    }

    /// The id, when present and non-empty
    pub fn non_empty_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}
