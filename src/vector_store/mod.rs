//! Vector store module for in-process similarity search.
//!
//! Records pair an embedding with a text, host-reference or record-blob payload.
//! Queries are a linear scan ranked under the selected [`DistanceMetric`].

mod metric;
mod models;
mod store;

pub use metric::{l2_norm, DistanceMetric, MISMATCH_SENTINEL};
pub use models::{Payload, PayloadKind, QueryFilter, SearchHit, VectorRecord, VectorStoreStats};
pub use store::VectorStore;
