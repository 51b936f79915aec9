pub mod cli;
pub mod config;
pub mod embedding;
pub mod persistence;
pub mod reflect;
pub mod vector_store;

pub mod env;
pub mod error;
pub mod logging;

pub use error::{Result, VectorSearchError};
pub use logging::{init_logging, LoggingConfig};
pub use persistence::{load_store, save_store, StoreSnapshot};
pub use reflect::{HostHandle, HostResolver, RecordBlob, RecordType, TypeDescriptor, TypeRegistry};
pub use vector_store::{
    DistanceMetric, Payload, PayloadKind, QueryFilter, SearchHit, VectorRecord, VectorStore,
    VectorStoreStats,
};
