//! On-disk JSON schema.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "items",
//!   "description": "",
//!   "created_at": "2024-05-01T10:00:00Z",
//!   "modified_at": "2024-05-01T10:00:00Z",
//!   "dimension": 3,
//!   "categories": ["weapons"],
//!   "distance_metric": "euclidean",
//!   "entries": [
//!     {"vector": [0.1, 0.2, 0.3], "entry_type": "text", "category": "weapons",
//!      "string_value": "a sword"}
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::vector_store::{DistanceMetric, PayloadKind};

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// Whole-store document. `entries` is the only required field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default = "default_format_version")]
    pub format_version: u32,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,

    /// Declared embedding dimension.
    #[serde(default)]
    pub dimension: usize,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub distance_metric: DistanceMetric,

    /// Must be an array; elements that do not form a record are skipped on read.
    #[serde(deserialize_with = "deserialize_entries")]
    pub entries: Vec<RecordDocument>,
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<RecordDocument>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    let mut entries = Vec::with_capacity(raw.len());

    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<RecordDocument>(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!(index, error = %e, "skipping malformed store entry"),
        }
    }

    Ok(entries)
}

/// One persisted record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub vector: Vec<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<PayloadKind>,

    #[serde(default)]
    pub category: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Text payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    /// Stable path of a host-reference payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_path: Option<String>,

    /// Registry name of a record-blob payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_type: Option<String>,

    /// Base64 of the record bytes, host references nulled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_data: Option<String>,

    /// Dotted field path → stable path of each host reference inside the record.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub struct_refs: BTreeMap<String, String>,

    /// Older field-level record document, read when `struct_data` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_fields: Option<Map<String, Value>>,
}
