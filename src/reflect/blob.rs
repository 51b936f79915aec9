//! Owned record instances.

use std::collections::BTreeMap;
use std::fmt;

use super::codec::{self, Document};
use super::descriptor::{locate, same_type, TypeDescriptor, TypeRef};
use super::layout;
use super::registry::HostResolver;
use super::value::FieldValue;
use crate::error::{Result, VectorSearchError};

/// A record's type descriptor plus the bytes of one instance.
///
/// The blob owns its bytes exclusively. It is deliberately not `Clone`: copies go
/// through [`RecordBlob::deep_copy`], which nulls host references.
pub struct RecordBlob {
    ty: TypeRef,
    bytes: Vec<u8>,
}

impl RecordBlob {
    /// A default-initialized instance of `ty`.
    pub fn new(ty: TypeRef) -> Self {
        let mut bytes = vec![0u8; ty.byte_size()];
        ty.initialize(&mut bytes);
        Self { ty, bytes }
    }

    /// Deep-copy a caller-owned instance into a new blob.
    pub fn from_bytes(ty: TypeRef, src: &[u8]) -> Result<Self> {
        let bytes = codec::deep_copy(ty.as_ref(), src)?;
        Ok(Self { ty, bytes })
    }

    /// Take ownership of already-copied bytes without copying again.
    pub(crate) fn from_owned(ty: TypeRef, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != ty.byte_size() {
            return Err(VectorSearchError::invalid_argument(format!(
                "{} bytes do not form a {} ({} bytes)",
                bytes.len(),
                ty.type_name(),
                ty.byte_size()
            )));
        }
        Ok(Self { ty, bytes })
    }

    /// Rebuild an instance from a field-level document.
    pub fn from_document(ty: TypeRef, doc: &Document, resolver: &dyn HostResolver) -> Self {
        let bytes = codec::deserialize(ty.as_ref(), doc, resolver);
        Self { ty, bytes }
    }

    pub fn record_type(&self) -> &TypeRef {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.type_name()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read a field by dotted path.
    pub fn get(&self, path: &str) -> Result<FieldValue> {
        let (offset, kind) =
            locate(self.ty.as_ref(), path).ok_or_else(|| VectorSearchError::unknown_field(path))?;
        let region = self
            .bytes
            .get(offset..offset + kind.byte_size())
            .ok_or_else(|| out_of_bounds(path, self.type_name()))?;
        layout::read_value(&kind, region)
    }

    /// Write a field by dotted path; the blob is unchanged on error.
    pub fn set(&mut self, path: &str, value: impl Into<FieldValue>) -> Result<()> {
        let (offset, kind) =
            locate(self.ty.as_ref(), path).ok_or_else(|| VectorSearchError::unknown_field(path))?;
        let type_name = self.ty.type_name();
        let region = self
            .bytes
            .get_mut(offset..offset + kind.byte_size())
            .ok_or_else(|| out_of_bounds(path, type_name))?;
        layout::write_value(&kind, region, &value.into())
    }

    /// Builder-style [`RecordBlob::set`].
    pub fn with(mut self, path: &str, value: impl Into<FieldValue>) -> Result<Self> {
        self.set(path, value)?;
        Ok(self)
    }

    /// An independent copy; host references in the copy are null.
    pub fn deep_copy(&self) -> Self {
        Self {
            ty: self.ty.clone(),
            bytes: codec::clone_record(self.ty.as_ref(), &self.bytes),
        }
    }

    /// Deep-copy the bytes out when the caller names the stored type.
    pub fn extract_as(&self, ty: &dyn TypeDescriptor) -> Result<Vec<u8>> {
        if !same_type(self.ty.as_ref(), ty) {
            return Err(VectorSearchError::type_mismatch(ty.type_name(), self.type_name()));
        }
        Ok(codec::clone_record(self.ty.as_ref(), &self.bytes))
    }

    pub fn to_document(&self, resolver: &dyn HostResolver) -> Document {
        // Length is fixed at construction, so this never takes the error branch.
        codec::serialize(self.ty.as_ref(), &self.bytes, resolver).unwrap_or_default()
    }

    /// Dotted field path → stable path of every live host reference.
    pub fn host_references(&self, resolver: &dyn HostResolver) -> BTreeMap<String, String> {
        codec::collect_host_references(self.ty.as_ref(), &self.bytes, resolver)
    }

    /// Install host references collected by [`RecordBlob::host_references`].
    pub fn restore_host_references(
        &mut self,
        refs: &BTreeMap<String, String>,
        resolver: &dyn HostResolver,
    ) -> usize {
        codec::restore_host_references(self.ty.as_ref(), &mut self.bytes, refs, resolver)
    }
}

fn out_of_bounds(path: &str, type_name: &str) -> VectorSearchError {
    VectorSearchError::invalid_argument(format!(
        "field {path} lies outside the bytes of {type_name}"
    ))
}

impl fmt::Debug for RecordBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBlob")
            .field("type", &self.ty.type_name())
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl PartialEq for RecordBlob {
    fn eq(&self, other: &Self) -> bool {
        same_type(self.ty.as_ref(), other.ty.as_ref()) && self.bytes == other.bytes
    }
}
