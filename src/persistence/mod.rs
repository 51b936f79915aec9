//! Persistence of whole stores to self-contained JSON documents.
//!
//! Record-blob payloads are stored as base64 raw bytes, which keeps every field,
//! including kinds the field-level codec cannot represent. Documents written by
//! older versions carrying field-level `struct_fields` are still readable.

mod document;
mod snapshot;

pub use document::{RecordDocument, StoreDocument, FORMAT_VERSION};
pub use snapshot::{load_store, save_store, StoreSnapshot};
