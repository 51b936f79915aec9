//! Data models for the vector store.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reflect::{HostHandle, RecordBlob};

/// Kind of content attached to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Text,
    HostReference,
    RecordBlob,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadKind::Text => "text",
            PayloadKind::HostReference => "host_reference",
            PayloadKind::RecordBlob => "record_blob",
        };
        f.write_str(name)
    }
}

/// Content attached to a record.
///
/// Owned by the record. Copies out of the store go through [`Payload::deep_copy`].
#[derive(Debug, PartialEq)]
pub enum Payload {
    Text(String),
    /// Host object reference; `None` once the host identity is lost (e.g. after a reload
    /// whose path no longer resolves).
    HostReference(Option<HostHandle>),
    RecordBlob(RecordBlob),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Text(_) => PayloadKind::Text,
            Payload::HostReference(_) => PayloadKind::HostReference,
            Payload::RecordBlob(_) => PayloadKind::RecordBlob,
        }
    }

    pub fn deep_copy(&self) -> Self {
        match self {
            Payload::Text(text) => Payload::Text(text.clone()),
            Payload::HostReference(handle) => Payload::HostReference(*handle),
            Payload::RecordBlob(blob) => Payload::RecordBlob(blob.deep_copy()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_host_reference(&self) -> Option<HostHandle> {
        match self {
            Payload::HostReference(handle) => *handle,
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordBlob> {
        match self {
            Payload::RecordBlob(blob) => Some(blob),
            _ => None,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<HostHandle> for Payload {
    fn from(handle: HostHandle) -> Self {
        Payload::HostReference(Some(handle))
    }
}

impl From<RecordBlob> for Payload {
    fn from(blob: RecordBlob) -> Self {
        Payload::RecordBlob(blob)
    }
}

/// One stored embedding with its payload.
#[derive(Debug)]
pub struct VectorRecord {
    /// Assigned on insert, stable across save/load.
    pub id: Uuid,

    pub embedding: Vec<f32>,

    /// Absent when the payload could not be restored on load.
    pub payload: Option<Payload>,

    /// Empty string means uncategorized.
    pub category: String,

    pub metadata: BTreeMap<String, String>,
}

impl VectorRecord {
    pub fn new(embedding: Vec<f32>, payload: Payload, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            embedding,
            payload: Some(payload),
            category: category.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn payload_kind(&self) -> Option<PayloadKind> {
        self.payload.as_ref().map(Payload::kind)
    }

    pub fn deep_copy(&self) -> Self {
        Self {
            id: self.id,
            embedding: self.embedding.clone(),
            payload: self.payload.as_ref().map(Payload::deep_copy),
            category: self.category.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Candidate filter for ranked queries.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Only records with this payload kind.
    pub payload_kind: Option<PayloadKind>,

    /// Only records in one of these categories; empty means all.
    pub categories: BTreeSet<String>,
}

impl QueryFilter {
    /// Create a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload_kind(mut self, kind: PayloadKind) -> Self {
        self.payload_kind = Some(kind);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn matches_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.contains(category)
    }

    /// Whether `record` is a ranking candidate for a query of `query_len` dimensions.
    pub fn matches(&self, record: &VectorRecord, query_len: usize) -> bool {
        let kind_ok = match self.payload_kind {
            Some(kind) => record.payload_kind() == Some(kind),
            None => true,
        };
        kind_ok && record.embedding.len() == query_len && self.matches_category(&record.category)
    }
}

/// One ranked query result; owns copies, never aliases store memory.
#[derive(Debug)]
pub struct SearchHit {
    pub id: Uuid,

    /// Metric score (distance, or similarity for Cosine/DotProduct).
    pub score: f32,

    pub embedding: Vec<f32>,

    pub payload: Option<Payload>,

    pub category: String,

    pub metadata: BTreeMap<String, String>,
}

impl SearchHit {
    pub(crate) fn from_record(record: &VectorRecord, score: f32) -> Self {
        Self {
            id: record.id,
            score,
            embedding: record.embedding.clone(),
            payload: record.payload.as_ref().map(Payload::deep_copy),
            category: record.category.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

/// Statistics about the vector store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VectorStoreStats {
    pub total_entries: usize,

    pub text_count: usize,

    pub host_reference_count: usize,

    pub record_count: usize,

    /// Records whose payload was dropped on load.
    pub empty_payload_count: usize,

    pub category_counts: BTreeMap<String, usize>,

    /// Embedding length of the first record, 0 when empty.
    pub dimension: usize,

    /// Distinct categories in first-seen order.
    pub categories: Vec<String>,
}
