//! Type descriptors for opaque record blobs.
//!
//! A descriptor enumerates the fields of a host-defined record type (name, kind,
//! byte offset) and reports the record's total byte size. The codec only ever
//! talks to records through this interface.

use std::fmt;
use std::sync::Arc;

/// Shared handle to a record type description.
pub type TypeRef = Arc<dyn TypeDescriptor>;

/// Size of the length/count prefix in front of text and array payloads.
pub const LENGTH_PREFIX: usize = 4;

/// Describes the layout of one host record type.
pub trait TypeDescriptor: fmt::Debug + Send + Sync {
    /// Registry name of the type.
    fn type_name(&self) -> &str;

    /// Total size in bytes of one record of this type.
    fn byte_size(&self) -> usize;

    /// Fields in declaration order.
    fn fields(&self) -> &[FieldDescriptor];

    /// Default-initialize a record region. Zero-filled unless the host overrides it.
    fn initialize(&self, dest: &mut [u8]) {
        dest.fill(0);
    }
}

/// Element kinds supported inside single-level arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Int32,
    Float32,
    Text { capacity: usize },
}

impl ElementKind {
    pub fn byte_size(&self) -> usize {
        match self {
            ElementKind::Int32 | ElementKind::Float32 => 4,
            ElementKind::Text { capacity } => LENGTH_PREFIX + capacity,
        }
    }
}

/// The kind of a record field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Bool,
    Int32,
    Float32,
    Float64,
    /// UTF-8 text with a fixed byte capacity.
    Text { capacity: usize },
    /// Symbolic name; stored like text.
    Name { capacity: usize },
    /// Single-level array with a fixed element capacity.
    Array {
        element: ElementKind,
        capacity: usize,
    },
    /// Nested record stored inline.
    Record(TypeRef),
    /// Live reference to an object owned by the host runtime.
    HostReference,
    /// Any other host kind (maps, sets, arrays of records). Copied as raw bytes,
    /// never represented in field-level documents.
    Opaque { label: String, size: usize },
}

impl FieldKind {
    /// Number of bytes the field occupies inside its record.
    pub fn byte_size(&self) -> usize {
        match self {
            FieldKind::Bool => 1,
            FieldKind::Int32 | FieldKind::Float32 => 4,
            FieldKind::Float64 | FieldKind::HostReference => 8,
            FieldKind::Text { capacity } | FieldKind::Name { capacity } => {
                LENGTH_PREFIX + capacity
            }
            FieldKind::Array { element, capacity } => {
                LENGTH_PREFIX + element.byte_size() * capacity
            }
            FieldKind::Record(ty) => ty.byte_size(),
            FieldKind::Opaque { size, .. } => *size,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int32 => "int32",
            FieldKind::Float32 => "float32",
            FieldKind::Float64 => "float64",
            FieldKind::Text { .. } => "text",
            FieldKind::Name { .. } => "name",
            FieldKind::Array { .. } => "array",
            FieldKind::Record(_) => "record",
            FieldKind::HostReference => "host_reference",
            FieldKind::Opaque { label, .. } => label,
        }
    }
}

/// One field of a record type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Byte offset from the start of the enclosing record.
    pub offset: usize,
}

impl FieldDescriptor {
    /// Byte range of the field inside its enclosing record.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.kind.byte_size()
    }
}

/// A record type built in-process with a packed layout.
#[derive(Debug, Clone)]
pub struct RecordType {
    name: String,
    fields: Vec<FieldDescriptor>,
    byte_size: usize,
}

impl RecordType {
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
            offset: 0,
        }
    }
}

impl TypeDescriptor for RecordType {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn byte_size(&self) -> usize {
        self.byte_size
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Lays fields out back to back in declaration order.
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    offset: usize,
}

impl RecordTypeBuilder {
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let size = kind.byte_size();
        self.fields.push(FieldDescriptor {
            name: name.into(),
            kind,
            offset: self.offset,
        });
        self.offset += size;
        self
    }

    pub fn bool(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Bool)
    }

    pub fn int32(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Int32)
    }

    pub fn float32(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Float32)
    }

    pub fn float64(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Float64)
    }

    pub fn text(self, name: impl Into<String>, capacity: usize) -> Self {
        self.field(name, FieldKind::Text { capacity })
    }

    pub fn name(self, name: impl Into<String>, capacity: usize) -> Self {
        self.field(name, FieldKind::Name { capacity })
    }

    pub fn array(self, name: impl Into<String>, element: ElementKind, capacity: usize) -> Self {
        self.field(name, FieldKind::Array { element, capacity })
    }

    pub fn record(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.field(name, FieldKind::Record(ty))
    }

    pub fn host_reference(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::HostReference)
    }

    pub fn opaque(self, name: impl Into<String>, label: impl Into<String>, size: usize) -> Self {
        self.field(
            name,
            FieldKind::Opaque {
                label: label.into(),
                size,
            },
        )
    }

    pub fn build(self) -> TypeRef {
        Arc::new(RecordType {
            name: self.name,
            fields: self.fields,
            byte_size: self.offset,
        })
    }
}

/// Resolve a dotted field path (`"stats.health"`) to its absolute offset and kind.
pub fn locate(ty: &dyn TypeDescriptor, path: &str) -> Option<(usize, FieldKind)> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let field = ty.fields().iter().find(|f| f.name == head)?;

    match (rest, &field.kind) {
        (None, kind) => Some((field.offset, kind.clone())),
        (Some(rest), FieldKind::Record(inner)) => locate(inner.as_ref(), rest)
            .map(|(offset, kind)| (field.offset + offset, kind)),
        (Some(_), _) => None,
    }
}

/// Whether two descriptors name the same record type.
pub fn same_type(a: &dyn TypeDescriptor, b: &dyn TypeDescriptor) -> bool {
    a.type_name() == b.type_name() && a.byte_size() == b.byte_size()
}
