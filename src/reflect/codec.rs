//! Generic deep-copy, serialize and deserialize of opaque record blobs.
//!
//! Everything here is driven by a [`TypeDescriptor`]; no record type is known
//! ahead of time. Field-scoped failures are logged and skipped so one bad field
//! never aborts a whole record.
//!
//! Field-level documents cover booleans, 32-bit integers, 32/64-bit floats, text,
//! names, single-level int/float/text arrays, nested records and host references.
//! [`FieldKind::Opaque`] fields (maps, sets, arrays of records, ...) are left out of
//! documents entirely and come back default-initialized after a document round
//! trip. Use the raw bytes when those fields must survive.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::descriptor::{ElementKind, FieldKind, TypeDescriptor};
use super::layout;
use super::registry::HostResolver;
use super::value::{FieldValue, HostHandle};
use crate::error::{Result, VectorSearchError};

/// Suffix of the document key carrying a host reference's stable path.
pub const REFPATH_SUFFIX: &str = "_refpath";

/// A field-level document: field name → value.
pub type Document = Map<String, Value>;

fn check_len(ty: &dyn TypeDescriptor, bytes: &[u8], role: &str) -> Result<()> {
    if bytes.len() != ty.byte_size() {
        return Err(VectorSearchError::invalid_argument(format!(
            "{role} buffer for {} is {} bytes, expected {}",
            ty.type_name(),
            bytes.len(),
            ty.byte_size()
        )));
    }
    Ok(())
}

fn refpath_key(field: &str) -> String {
    format!("{field}{REFPATH_SUFFIX}")
}

/// Copy `src` into a freshly allocated, default-initialized buffer.
///
/// Host references are never carried into the copy: the destination field is
/// null. Mutating the result never affects `src`.
pub fn deep_copy(ty: &dyn TypeDescriptor, src: &[u8]) -> Result<Vec<u8>> {
    check_len(ty, src, "source").inspect_err(|e| {
        tracing::error!(error = %e, "deep copy rejected");
    })?;
    Ok(clone_record(ty, src))
}

/// Copy `src` into an existing destination buffer.
///
/// Both buffers must match the type size; on a size mismatch nothing is written.
pub fn deep_copy_into(ty: &dyn TypeDescriptor, dest: &mut [u8], src: &[u8]) -> Result<()> {
    check_len(ty, src, "source")?;
    check_len(ty, dest, "destination")?;
    ty.initialize(dest);
    copy_fields(ty, dest, src);
    Ok(())
}

/// Deep copy without the length check; `src` must be exactly one record.
pub(crate) fn clone_record(ty: &dyn TypeDescriptor, src: &[u8]) -> Vec<u8> {
    let mut dest = vec![0u8; ty.byte_size()];
    ty.initialize(&mut dest);
    copy_fields(ty, &mut dest, src);
    dest
}

fn copy_fields(ty: &dyn TypeDescriptor, dest: &mut [u8], src: &[u8]) {
    for field in ty.fields() {
        let range = field.range();
        if range.end > dest.len() || range.end > src.len() {
            tracing::warn!(
                record = ty.type_name(),
                field = %field.name,
                "field lies outside the record, skipping"
            );
            continue;
        }

        match &field.kind {
            FieldKind::Record(inner) => {
                let nested = &mut dest[range.clone()];
                inner.initialize(nested);
                copy_fields(inner.as_ref(), nested, &src[range]);
            }
            FieldKind::HostReference => dest[range].fill(0),
            _ => dest[range.clone()].copy_from_slice(&src[range]),
        }
    }
}

/// Produce a field-level document for one record.
pub fn serialize(
    ty: &dyn TypeDescriptor,
    bytes: &[u8],
    resolver: &dyn HostResolver,
) -> Result<Document> {
    check_len(ty, bytes, "source")?;
    Ok(serialize_fields(ty, bytes, resolver))
}

fn serialize_fields(ty: &dyn TypeDescriptor, bytes: &[u8], resolver: &dyn HostResolver) -> Document {
    let mut doc = Document::new();

    for field in ty.fields() {
        let Some(region) = bytes.get(field.range()) else {
            tracing::warn!(record = ty.type_name(), field = %field.name, "field out of bounds");
            continue;
        };

        match &field.kind {
            FieldKind::Record(inner) => {
                let nested = serialize_fields(inner.as_ref(), region, resolver);
                doc.insert(field.name.clone(), Value::Object(nested));
            }
            FieldKind::HostReference => {
                doc.insert(field.name.clone(), Value::Null);
                if let Some(handle) = read_handle(region) {
                    match resolver.path_of(handle) {
                        Some(path) => {
                            doc.insert(refpath_key(&field.name), Value::String(path));
                        }
                        None => tracing::warn!(
                            record = ty.type_name(),
                            field = %field.name,
                            handle = %handle,
                            "host reference has no stable path, writing null"
                        ),
                    }
                }
            }
            FieldKind::Opaque { label, .. } => {
                tracing::trace!(field = %field.name, kind = %label, "omitting unsupported field kind");
            }
            kind => match layout::read_value(kind, region) {
                Ok(value) => {
                    doc.insert(field.name.clone(), to_json(value));
                }
                Err(e) => tracing::warn!(
                    record = ty.type_name(),
                    field = %field.name,
                    error = %e,
                    "failed to read field, omitting"
                ),
            },
        }
    }

    doc
}

/// Build a default-initialized record and fill every field present in `doc`.
///
/// Host references are looked up by their `<field>_refpath` entry; an unknown path
/// leaves the field null.
pub fn deserialize(ty: &dyn TypeDescriptor, doc: &Document, resolver: &dyn HostResolver) -> Vec<u8> {
    let mut bytes = vec![0u8; ty.byte_size()];
    ty.initialize(&mut bytes);
    deserialize_fields(ty, &mut bytes, doc, resolver);
    bytes
}

fn deserialize_fields(
    ty: &dyn TypeDescriptor,
    bytes: &mut [u8],
    doc: &Document,
    resolver: &dyn HostResolver,
) {
    for field in ty.fields() {
        let Some(region) = bytes.get_mut(field.range()) else {
            continue;
        };

        match &field.kind {
            FieldKind::Record(inner) => {
                if let Some(Value::Object(nested)) = doc.get(&field.name) {
                    deserialize_fields(inner.as_ref(), region, nested, resolver);
                }
            }
            FieldKind::HostReference => {
                let Some(path) = doc.get(&refpath_key(&field.name)).and_then(Value::as_str) else {
                    continue;
                };
                match resolver.resolve(path) {
                    Some(handle) => write_handle(region, Some(handle)),
                    None => {
                        let e = VectorSearchError::reference_resolution(path);
                        tracing::warn!(
                            record = ty.type_name(),
                            field = %field.name,
                            error = %e,
                            "leaving host reference null"
                        );
                    }
                }
            }
            FieldKind::Opaque { .. } => {}
            kind => {
                let Some(json) = doc.get(&field.name) else {
                    continue;
                };
                let written = from_json(kind, json)
                    .ok_or_else(|| VectorSearchError::type_mismatch(kind.label(), json_label(json)))
                    .and_then(|value| layout::write_value(kind, region, &value));
                if let Err(e) = written {
                    tracing::warn!(
                        record = ty.type_name(),
                        field = %field.name,
                        error = %e,
                        "skipping document field"
                    );
                }
            }
        }
    }
}

/// Collect the stable path of every live host reference, keyed by dotted field path.
pub fn collect_host_references(
    ty: &dyn TypeDescriptor,
    bytes: &[u8],
    resolver: &dyn HostResolver,
) -> BTreeMap<String, String> {
    let mut refs = BTreeMap::new();
    walk_references(ty, bytes, "", &mut |path, region| {
        if let Some(handle) = read_handle(region) {
            match resolver.path_of(handle) {
                Some(object_path) => {
                    refs.insert(path.to_string(), object_path);
                }
                None => tracing::warn!(field = path, handle = %handle, "host reference has no stable path"),
            }
        }
    });
    refs
}

/// Re-resolve host references recorded by [`collect_host_references`].
///
/// Returns the number of references installed; unresolved ones stay null.
pub fn restore_host_references(
    ty: &dyn TypeDescriptor,
    bytes: &mut [u8],
    refs: &BTreeMap<String, String>,
    resolver: &dyn HostResolver,
) -> usize {
    let mut installed = 0;

    for (field_path, object_path) in refs {
        let Some((offset, FieldKind::HostReference)) = super::descriptor::locate(ty, field_path)
        else {
            tracing::warn!(field = %field_path, "recorded host reference names no such field");
            continue;
        };
        let Some(region) = bytes.get_mut(offset..offset + 8) else {
            continue;
        };
        match resolver.resolve(object_path) {
            Some(handle) => {
                write_handle(region, Some(handle));
                installed += 1;
            }
            None => tracing::warn!(
                field = %field_path,
                path = %object_path,
                "host reference could not be resolved, leaving null"
            ),
        }
    }

    installed
}

fn walk_references(
    ty: &dyn TypeDescriptor,
    bytes: &[u8],
    prefix: &str,
    visit: &mut dyn FnMut(&str, &[u8]),
) {
    for field in ty.fields() {
        let Some(region) = bytes.get(field.range()) else {
            continue;
        };
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        match &field.kind {
            FieldKind::Record(inner) => walk_references(inner.as_ref(), region, &path, visit),
            FieldKind::HostReference => visit(&path, region),
            _ => {}
        }
    }
}

fn read_handle(region: &[u8]) -> Option<HostHandle> {
    match layout::read_value(&FieldKind::HostReference, region) {
        Ok(FieldValue::HostReference(handle)) => handle,
        _ => None,
    }
}

fn write_handle(region: &mut [u8], handle: Option<HostHandle>) {
    // An 8-byte region always accepts a handle.
    let _ = layout::write_value(
        &FieldKind::HostReference,
        region,
        &FieldValue::HostReference(handle),
    );
}

fn to_json(value: FieldValue) -> Value {
    match value {
        FieldValue::Bool(v) => Value::Bool(v),
        FieldValue::Int32(v) => Value::from(v),
        FieldValue::Float32(v) => Value::from(v),
        FieldValue::Float64(v) => Value::from(v),
        FieldValue::Text(v) | FieldValue::Name(v) => Value::String(v),
        FieldValue::Int32Array(v) => Value::from(v),
        FieldValue::Float32Array(v) => Value::from(v),
        FieldValue::TextArray(v) => Value::from(v),
        FieldValue::HostReference(_) => Value::Null,
    }
}

fn from_json(kind: &FieldKind, json: &Value) -> Option<FieldValue> {
    let value = match kind {
        FieldKind::Bool => FieldValue::Bool(json.as_bool()?),
        FieldKind::Int32 => FieldValue::Int32(i32::try_from(json.as_i64()?).ok()?),
        FieldKind::Float32 => FieldValue::Float32(json.as_f64()? as f32),
        FieldKind::Float64 => FieldValue::Float64(json.as_f64()?),
        FieldKind::Text { .. } => FieldValue::Text(json.as_str()?.to_string()),
        FieldKind::Name { .. } => FieldValue::Name(json.as_str()?.to_string()),
        FieldKind::Array { element, .. } => {
            let items = json.as_array()?;
            match element {
                ElementKind::Int32 => FieldValue::Int32Array(
                    items
                        .iter()
                        .map(|v| v.as_i64().and_then(|i| i32::try_from(i).ok()))
                        .collect::<Option<_>>()?,
                ),
                ElementKind::Float32 => FieldValue::Float32Array(
                    items
                        .iter()
                        .map(|v| v.as_f64().map(|f| f as f32))
                        .collect::<Option<_>>()?,
                ),
                ElementKind::Text { .. } => FieldValue::TextArray(
                    items
                        .iter()
                        .map(|v| v.as_str().map(str::to_string))
                        .collect::<Option<_>>()?,
                ),
            }
        }
        FieldKind::Record(_) | FieldKind::HostReference | FieldKind::Opaque { .. } => return None,
    };
    Some(value)
}

fn json_label(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
