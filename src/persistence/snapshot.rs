//! Whole-store snapshots and their file persistence.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;

use super::document::{RecordDocument, StoreDocument, FORMAT_VERSION};
use crate::error::{Result, VectorSearchError};
use crate::reflect::{HostResolver, RecordBlob, TypeRegistry};
use crate::vector_store::{Payload, PayloadKind, VectorRecord, VectorStore};

/// Self-contained, serializable copy of a store plus descriptive metadata.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    document: StoreDocument,
}

impl StoreSnapshot {
    /// An empty snapshot.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            document: StoreDocument {
                format_version: FORMAT_VERSION,
                name: name.into(),
                description: String::new(),
                created_at: now,
                modified_at: now,
                dimension: 0,
                categories: Vec::new(),
                distance_metric: Default::default(),
                entries: Vec::new(),
            },
        }
    }

    /// Capture `store` into a new snapshot.
    pub fn from_store(
        name: impl Into<String>,
        store: &VectorStore,
        resolver: &dyn HostResolver,
    ) -> Self {
        let mut snapshot = Self::new(name);
        snapshot.capture(store, resolver);
        snapshot
    }

    /// Replace the snapshot's records with the current contents of `store`.
    pub fn capture(&mut self, store: &VectorStore, resolver: &dyn HostResolver) {
        let doc = &mut self.document;
        doc.entries = store
            .iter()
            .map(|record| encode_record(record, resolver))
            .collect();
        doc.dimension = store.dimension();
        doc.categories = store.unique_categories();
        doc.distance_metric = store.distance_metric();
        doc.modified_at = Utc::now();

        tracing::debug!(name = %doc.name, entries = doc.entries.len(), "captured store snapshot");
    }

    /// Rebuild a live store.
    ///
    /// Record-scoped failures never abort the rebuild: a record blob whose type does
    /// not resolve loses its payload, a record whose embedding disagrees with the
    /// first one is skipped.
    pub fn to_store(&self, registry: &dyn TypeRegistry, resolver: &dyn HostResolver) -> VectorStore {
        let mut store = VectorStore::with_metric(self.document.distance_metric);

        for (index, entry) in self.document.entries.iter().enumerate() {
            let record = decode_record(entry, registry, resolver);
            if let Err(e) = store.insert(record) {
                tracing::warn!(index, error = %e, "skipping persisted record");
            }
        }

        tracing::info!(
            name = %self.document.name,
            loaded = store.len(),
            persisted = self.document.entries.len(),
            "restored vector store"
        );
        store
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let document: StoreDocument = serde_json::from_str(json)
            .map_err(|e| VectorSearchError::format(format!("invalid store document: {e}")))?;

        if document.format_version > FORMAT_VERSION {
            return Err(VectorSearchError::format(format!(
                "unsupported format version {} (newest known is {FORMAT_VERSION})",
                document.format_version
            )));
        }

        Ok(Self { document })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    /// Read a snapshot file. A missing file is [`VectorSearchError::NotFound`];
    /// unparsable content or a missing `entries` field is a
    /// [`VectorSearchError::Format`] error.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                VectorSearchError::not_found(format!("store file {}", path.display()))
            }
            _ => VectorSearchError::from(e),
        })?;
        let snapshot = Self::from_json(&json).inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to load store file");
        })?;
        tracing::debug!(path = %path.display(), "loaded store file");
        Ok(snapshot)
    }

    /// Write the snapshot atomically, refreshing its modified time.
    ///
    /// The document is written to a temporary file next to `path` and renamed over
    /// it; on failure the previous file is untouched.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.document.modified_at = Utc::now();
        let json = self.to_json()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| VectorSearchError::Io(e.error))?;

        tracing::debug!(
            path = %path.display(),
            entries = self.document.entries.len(),
            "saved store file"
        );
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.document.name = name.into();
    }

    pub fn description(&self) -> &str {
        &self.document.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.document.description = description.into();
    }

    pub fn document(&self) -> &StoreDocument {
        &self.document
    }

    pub fn entries(&self) -> &[RecordDocument] {
        &self.document.entries
    }

    pub fn len(&self) -> usize {
        self.document.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.entries.is_empty()
    }

    /// Sorted, de-duplicated, non-empty categories of the persisted records.
    pub fn unique_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .document
            .entries
            .iter()
            .filter(|e| !e.category.is_empty())
            .map(|e| e.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn entry_count_for_category(&self, category: &str) -> usize {
        self.document
            .entries
            .iter()
            .filter(|e| e.category == category)
            .count()
    }

    pub fn entries_for_category(&self, category: &str) -> Vec<&RecordDocument> {
        self.document
            .entries
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }
}

/// Save `store` to `path` as a snapshot named after the file stem.
pub fn save_store(
    store: &VectorStore,
    path: impl AsRef<Path>,
    resolver: &dyn HostResolver,
) -> Result<StoreSnapshot> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut snapshot = StoreSnapshot::from_store(name, store, resolver);
    snapshot.save_to_file(path)?;
    Ok(snapshot)
}

/// Load a store file straight into a live store.
pub fn load_store(
    path: impl AsRef<Path>,
    registry: &dyn TypeRegistry,
    resolver: &dyn HostResolver,
) -> Result<VectorStore> {
    Ok(StoreSnapshot::load_from_file(path)?.to_store(registry, resolver))
}

fn encode_record(record: &VectorRecord, resolver: &dyn HostResolver) -> RecordDocument {
    let mut doc = RecordDocument {
        vector: record.embedding.clone(),
        id: Some(record.id),
        entry_type: record.payload_kind(),
        category: record.category.clone(),
        metadata: record.metadata.clone(),
        ..Default::default()
    };

    match &record.payload {
        Some(Payload::Text(text)) => doc.string_value = Some(text.clone()),
        Some(Payload::HostReference(handle)) => {
            doc.object_path = handle.and_then(|h| resolver.path_of(h));
            if handle.is_some() && doc.object_path.is_none() {
                tracing::warn!(id = %record.id, "host reference has no stable path, persisting none");
            }
        }
        Some(Payload::RecordBlob(blob)) => {
            // The copy has every host reference nulled; live ones travel in struct_refs.
            let copy = blob.deep_copy();
            doc.struct_type = Some(blob.type_name().to_string());
            doc.struct_data = Some(STANDARD.encode(copy.as_bytes()));
            doc.struct_refs = blob.host_references(resolver);
        }
        None => {}
    }

    doc
}

fn decode_record(
    doc: &RecordDocument,
    registry: &dyn TypeRegistry,
    resolver: &dyn HostResolver,
) -> VectorRecord {
    let payload = match doc.entry_type {
        None => None,
        Some(PayloadKind::Text) => Some(Payload::Text(doc.string_value.clone().unwrap_or_default())),
        Some(PayloadKind::HostReference) => {
            let handle = doc.object_path.as_deref().and_then(|path| {
                let handle = resolver.resolve(path);
                if handle.is_none() {
                    let e = VectorSearchError::reference_resolution(path);
                    tracing::warn!(error = %e, "host reference payload left null");
                }
                handle
            });
            Some(Payload::HostReference(handle))
        }
        Some(PayloadKind::RecordBlob) => match decode_blob(doc, registry, resolver) {
            Ok(blob) => Some(Payload::RecordBlob(blob)),
            // Unknown types are expected when a store outlives its host; corrupt bytes are not.
            Err(e) if e.is_recoverable() => {
                tracing::warn!(
                    id = ?doc.id,
                    category = e.category(),
                    error = %e,
                    "dropping record payload"
                );
                None
            }
            Err(e) => {
                tracing::error!(
                    id = ?doc.id,
                    category = e.category(),
                    error = %e,
                    "dropping corrupt record payload"
                );
                None
            }
        },
    };

    VectorRecord {
        id: doc.id.unwrap_or_else(uuid::Uuid::new_v4),
        embedding: doc.vector.clone(),
        payload,
        category: doc.category.clone(),
        metadata: doc.metadata.clone(),
    }
}

fn decode_blob(
    doc: &RecordDocument,
    registry: &dyn TypeRegistry,
    resolver: &dyn HostResolver,
) -> Result<RecordBlob> {
    let type_name = doc
        .struct_type
        .as_deref()
        .ok_or_else(|| VectorSearchError::format("record blob without struct_type"))?;
    let ty = registry
        .resolve(type_name)
        .ok_or_else(|| VectorSearchError::type_resolution(type_name))?;

    match (&doc.struct_data, &doc.struct_fields) {
        (Some(data), _) => {
            let bytes = STANDARD
                .decode(data)
                .map_err(|e| VectorSearchError::format(format!("struct_data is not base64: {e}")))?;
            let mut blob = RecordBlob::from_owned(ty, bytes)?;
            blob.restore_host_references(&doc.struct_refs, resolver);
            Ok(blob)
        }
        (None, Some(fields)) => Ok(RecordBlob::from_document(ty, fields, resolver)),
        (None, None) => Err(VectorSearchError::format(
            "record blob carries neither struct_data nor struct_fields",
        )),
    }
}
