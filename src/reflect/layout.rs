//! Byte-level encoding of individual field values.
//!
//! Every scalar is little-endian. Text and arrays carry a `u32` length/count
//! prefix followed by a fixed-capacity payload region; unused capacity is zero.
//! A host reference is a `u64` handle where zero means null.

use super::descriptor::{ElementKind, FieldKind, LENGTH_PREFIX};
use super::value::{FieldValue, HostHandle};
use crate::error::{Result, VectorSearchError};

fn le<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn read_len(bytes: &[u8], capacity: usize) -> Result<usize> {
    let len = u32::from_le_bytes(le(bytes)) as usize;
    if len > capacity {
        return Err(VectorSearchError::format(format!(
            "stored length {len} exceeds capacity {capacity}"
        )));
    }
    Ok(len)
}

fn write_len(bytes: &mut [u8], len: usize) {
    bytes[..LENGTH_PREFIX].copy_from_slice(&(len as u32).to_le_bytes());
}

fn read_text(bytes: &[u8], capacity: usize) -> Result<String> {
    let len = read_len(bytes, capacity)?;
    let raw = &bytes[LENGTH_PREFIX..LENGTH_PREFIX + len];
    String::from_utf8(raw.to_vec())
        .map_err(|e| VectorSearchError::format(format!("stored text is not UTF-8: {e}")))
}

fn write_text(bytes: &mut [u8], capacity: usize, text: &str) -> Result<()> {
    if text.len() > capacity {
        return Err(VectorSearchError::invalid_argument(format!(
            "text of {} bytes exceeds capacity {capacity}",
            text.len()
        )));
    }
    let region = &mut bytes[..LENGTH_PREFIX + capacity];
    region.fill(0);
    write_len(region, text.len());
    region[LENGTH_PREFIX..LENGTH_PREFIX + text.len()].copy_from_slice(text.as_bytes());
    Ok(())
}

fn mismatch(kind: &FieldKind, value: &FieldValue) -> VectorSearchError {
    VectorSearchError::type_mismatch(kind.label(), value.label())
}

/// Decode the value of a field whose bytes are exactly `bytes`.
pub(crate) fn read_value(kind: &FieldKind, bytes: &[u8]) -> Result<FieldValue> {
    if bytes.len() < kind.byte_size() {
        return Err(VectorSearchError::invalid_argument(format!(
            "{} field needs {} bytes, region has {}",
            kind.label(),
            kind.byte_size(),
            bytes.len()
        )));
    }

    let value = match kind {
        FieldKind::Bool => FieldValue::Bool(bytes[0] != 0),
        FieldKind::Int32 => FieldValue::Int32(i32::from_le_bytes(le(bytes))),
        FieldKind::Float32 => FieldValue::Float32(f32::from_le_bytes(le(bytes))),
        FieldKind::Float64 => FieldValue::Float64(f64::from_le_bytes(le(bytes))),
        FieldKind::Text { capacity } => FieldValue::Text(read_text(bytes, *capacity)?),
        FieldKind::Name { capacity } => FieldValue::Name(read_text(bytes, *capacity)?),
        FieldKind::HostReference => {
            FieldValue::HostReference(HostHandle::new(u64::from_le_bytes(le(bytes))))
        }
        FieldKind::Array { element, capacity } => {
            let count = read_len(bytes, *capacity)?;
            let stride = element.byte_size();
            let items = (0..count).map(|i| &bytes[LENGTH_PREFIX + i * stride..]);
            match element {
                ElementKind::Int32 => {
                    FieldValue::Int32Array(items.map(|b| i32::from_le_bytes(le(b))).collect())
                }
                ElementKind::Float32 => {
                    FieldValue::Float32Array(items.map(|b| f32::from_le_bytes(le(b))).collect())
                }
                ElementKind::Text { capacity } => FieldValue::TextArray(
                    items
                        .map(|b| read_text(b, *capacity))
                        .collect::<Result<Vec<_>>>()?,
                ),
            }
        }
        FieldKind::Record(_) | FieldKind::Opaque { .. } => {
            return Err(VectorSearchError::invalid_argument(format!(
                "{} fields have no scalar value",
                kind.label()
            )))
        }
    };

    Ok(value)
}

/// Encode `value` into the field region `bytes`.
///
/// The region is left untouched when the value does not fit the field.
pub(crate) fn write_value(kind: &FieldKind, bytes: &mut [u8], value: &FieldValue) -> Result<()> {
    if bytes.len() < kind.byte_size() {
        return Err(VectorSearchError::invalid_argument(format!(
            "{} field needs {} bytes, region has {}",
            kind.label(),
            kind.byte_size(),
            bytes.len()
        )));
    }

    match (kind, value) {
        (FieldKind::Bool, FieldValue::Bool(v)) => bytes[0] = u8::from(*v),
        (FieldKind::Int32, FieldValue::Int32(v)) => bytes[..4].copy_from_slice(&v.to_le_bytes()),
        (FieldKind::Float32, FieldValue::Float32(v)) => {
            bytes[..4].copy_from_slice(&v.to_le_bytes())
        }
        (FieldKind::Float64, FieldValue::Float64(v)) => {
            bytes[..8].copy_from_slice(&v.to_le_bytes())
        }
        (FieldKind::Text { capacity }, FieldValue::Text(v))
        | (FieldKind::Text { capacity }, FieldValue::Name(v))
        | (FieldKind::Name { capacity }, FieldValue::Name(v))
        | (FieldKind::Name { capacity }, FieldValue::Text(v)) => write_text(bytes, *capacity, v)?,
        (FieldKind::HostReference, FieldValue::HostReference(handle)) => {
            let raw = handle.map(HostHandle::get).unwrap_or(0);
            bytes[..8].copy_from_slice(&raw.to_le_bytes());
        }
        (FieldKind::Array { element, capacity }, value) => {
            write_array(*element, *capacity, bytes, value).map_err(|e| match e {
                VectorSearchError::TypeMismatch { .. } => mismatch(kind, value),
                other => other,
            })?
        }
        _ => return Err(mismatch(kind, value)),
    }

    Ok(())
}

fn write_array(
    element: ElementKind,
    capacity: usize,
    bytes: &mut [u8],
    value: &FieldValue,
) -> Result<()> {
    let stride = element.byte_size();

    match (element, value) {
        (ElementKind::Int32, FieldValue::Int32Array(items)) => {
            let region = prepare_array(bytes, stride, capacity, items.len())?;
            for (slot, item) in region.chunks_exact_mut(stride).zip(items) {
                slot.copy_from_slice(&item.to_le_bytes());
            }
        }
        (ElementKind::Float32, FieldValue::Float32Array(items)) => {
            let region = prepare_array(bytes, stride, capacity, items.len())?;
            for (slot, item) in region.chunks_exact_mut(stride).zip(items) {
                slot.copy_from_slice(&item.to_le_bytes());
            }
        }
        (ElementKind::Text { capacity: text_capacity }, FieldValue::TextArray(items)) => {
            if let Some(long) = items.iter().find(|s| s.len() > text_capacity) {
                return Err(VectorSearchError::invalid_argument(format!(
                    "array element of {} bytes exceeds capacity {text_capacity}",
                    long.len()
                )));
            }
            let region = prepare_array(bytes, stride, capacity, items.len())?;
            for (slot, item) in region.chunks_exact_mut(stride).zip(items) {
                write_text(slot, text_capacity, item)?;
            }
        }
        _ => return Err(VectorSearchError::type_mismatch("array", value.label())),
    }

    Ok(())
}

/// Zero the array region, write its count and return the element slots.
fn prepare_array(
    bytes: &mut [u8],
    stride: usize,
    capacity: usize,
    count: usize,
) -> Result<&mut [u8]> {
    if count > capacity {
        return Err(VectorSearchError::invalid_argument(format!(
            "array of {count} elements exceeds capacity {capacity}"
        )));
    }
    let region = &mut bytes[..LENGTH_PREFIX + stride * capacity];
    region.fill(0);
    write_len(region, count);
    Ok(&mut region[LENGTH_PREFIX..])
}
