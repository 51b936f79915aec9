//! Type-generic handling of host-defined record payloads.

pub mod blob;
pub mod codec;
pub mod descriptor;
mod layout;
pub mod registry;
pub mod value;

pub use blob::RecordBlob;
pub use codec::{deep_copy, deep_copy_into, deserialize, serialize, Document, REFPATH_SUFFIX};
pub use descriptor::{
    ElementKind, FieldDescriptor, FieldKind, RecordType, RecordTypeBuilder, TypeDescriptor, TypeRef,
};
pub use registry::{
    HostResolver, InMemoryHostResolver, InMemoryTypeRegistry, NullHostResolver, TypeRegistry,
};
pub use value::{FieldValue, HostHandle};
