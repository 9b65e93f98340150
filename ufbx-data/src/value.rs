//! The generic parse tree leaf shapes (spec §3 "Generic parse tree", §4.5, §4.6).
//!
//! Both the binary and the ASCII front-ends build the same [`DomNode`] tree;
//! only the *leaf* shape differs node-to-node, driven by the context-aware
//! array classifier (§4.6.1). A leaf is either a small tuple of
//! heterogeneous [`ScalarValue`]s or a single homogeneous [`DomArray`].

use crate::strings::InternedStr;
use std::sync::Arc;

/// One value slot inside a non-array node's value tuple.
///
/// FBX nodes carry at most seven scalar values; tagged as
/// number/string/empty per spec §3.
#[derive(Clone, Debug)]
pub enum ScalarValue {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(InternedStr),
    /// An `R` binary blob value (raw byte payload, e.g. embedded thumbnails).
    Binary(Arc<[u8]>),
    Empty,
}

impl ScalarValue {
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ScalarValue::Bool(b) => Some(b as i64),
            ScalarValue::I16(v) => Some(v as i64),
            ScalarValue::I32(v) => Some(v as i64),
            ScalarValue::I64(v) => Some(v),
            ScalarValue::F32(v) => Some(v as i64),
            ScalarValue::F64(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ScalarValue::Bool(b) => Some(b as i64 as f64),
            ScalarValue::I16(v) => Some(v as f64),
            ScalarValue::I32(v) => Some(v as f64),
            ScalarValue::I64(v) => Some(v as f64),
            ScalarValue::F32(v) => Some(v as f64),
            ScalarValue::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A typed, homogeneous bulk array leaf.
///
/// Stored as an `Arc<[T]>` rather than a raw arena slice: the result-arena
/// "make it contiguous" step (§4.3 `make_array`) becomes, in safe Rust,
/// simply collecting into a `Vec` and freezing it into an `Arc<[T]>` once —
/// the sharing this buys is what lets multiple vertex-attribute streams
/// reference the same zero/consecutive sentinel buffer (§4.7 point 5)
/// without cloning.
#[derive(Clone, Debug)]
pub enum DomArray {
    Bool(Arc<[bool]>),
    I32(Arc<[i32]>),
    I64(Arc<[i64]>),
    F32(Arc<[f32]>),
    F64(Arc<[f64]>),
    Byte(Arc<[u8]>),
}

impl DomArray {
    pub fn len(&self) -> usize {
        match self {
            DomArray::Bool(a) => a.len(),
            DomArray::I32(a) => a.len(),
            DomArray::I64(a) => a.len(),
            DomArray::F32(a) => a.len(),
            DomArray::F64(a) => a.len(),
            DomArray::Byte(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_f64_vec(&self) -> Vec<f64> {
        match self {
            DomArray::Bool(a) => a.iter().map(|&b| b as i64 as f64).collect(),
            DomArray::I32(a) => a.iter().map(|&v| v as f64).collect(),
            DomArray::I64(a) => a.iter().map(|&v| v as f64).collect(),
            DomArray::F32(a) => a.iter().map(|&v| v as f64).collect(),
            DomArray::F64(a) => a.to_vec(),
            DomArray::Byte(a) => a.iter().map(|&v| v as f64).collect(),
        }
    }

    pub fn as_i64_vec(&self) -> Vec<i64> {
        match self {
            DomArray::Bool(a) => a.iter().map(|&b| b as i64).collect(),
            DomArray::I32(a) => a.iter().map(|&v| v as i64).collect(),
            DomArray::I64(a) => a.to_vec(),
            DomArray::F32(a) => a.iter().map(|&v| v as i64).collect(),
            DomArray::F64(a) => a.iter().map(|&v| v as i64).collect(),
            DomArray::Byte(a) => a.iter().map(|&v| v as i64).collect(),
        }
    }
}

/// The leaf content of a [`DomNode`]: either a scalar tuple or a bulk array.
#[derive(Clone, Debug)]
pub enum NodeContent {
    Scalars(Vec<ScalarValue>),
    Array(DomArray),
}

impl Default for NodeContent {
    fn default() -> Self {
        NodeContent::Scalars(Vec::new())
    }
}

impl NodeContent {
    pub fn as_array(&self) -> Option<&DomArray> {
        match self {
            NodeContent::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_scalars(&self) -> Option<&[ScalarValue]> {
        match self {
            NodeContent::Scalars(values) => Some(values),
            _ => None,
        }
    }
}
