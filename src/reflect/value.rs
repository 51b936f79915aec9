//! Typed field values read from and written to record blobs.

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// Identity of an object whose lifetime is owned by the host runtime.
///
/// Only meaningful inside the process that issued it; persisted documents carry a
/// resolvable path instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostHandle(NonZeroU64);

impl HostHandle {
    /// Wrap a raw handle value; zero is the null handle and yields `None`.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl From<NonZeroU64> for HostHandle {
    fn from(raw: NonZeroU64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int32(i32),
    Float32(f32),
    Float64(f64),
    Text(String),
    Name(String),
    Int32Array(Vec<i32>),
    Float32Array(Vec<f32>),
    TextArray(Vec<String>),
    HostReference(Option<HostHandle>),
}

impl FieldValue {
    pub fn label(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int32(_) => "int32",
            FieldValue::Float32(_) => "float32",
            FieldValue::Float64(_) => "float64",
            FieldValue::Text(_) => "text",
            FieldValue::Name(_) => "name",
            FieldValue::Int32Array(_) => "int32 array",
            FieldValue::Float32Array(_) => "float32 array",
            FieldValue::TextArray(_) => "text array",
            FieldValue::HostReference(_) => "host_reference",
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int32(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float32(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float64(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<HostHandle> for FieldValue {
    fn from(value: HostHandle) -> Self {
        FieldValue::HostReference(Some(value))
    }
}
