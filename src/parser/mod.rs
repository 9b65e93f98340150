//! Shared parser infrastructure (spec §4.5/§4.6): the context-driven
//! array classifier both front-ends consult, plus the binary and ASCII
//! node readers themselves.

pub mod ascii;
pub mod binary;
pub mod classify;

use crate::error::{Error, Result};
use crate::options::LoadOpts;
use ufbx_data::error::ErrorKind;
use ufbx_data::DomArray;

/// Spec §7 "Max depth: parse ... recursion exceeds cap", checked on every
/// recursive descent into a node's children (both front-ends).
pub(crate) fn check_node_depth(depth: usize, opts: &LoadOpts) -> Result<()> {
    if depth > opts.max_node_depth {
        return Err(Error::new(ErrorKind::MaxDepth, "check_node_depth", line!(), format!("node nesting depth {depth} exceeds configured max_node_depth ({})", opts.max_node_depth)));
    }
    Ok(())
}

/// Spec §7 "Allocation: any arena exceeds its configured cap or allocation
/// count", applied to one node's child list.
pub(crate) fn check_node_children(count: usize, opts: &LoadOpts) -> Result<()> {
    if count > opts.max_node_children {
        return Err(Error::new(ErrorKind::Allocation, "check_node_children", line!(), format!("node has {count} children, exceeding configured max_node_children ({})", opts.max_node_children)));
    }
    Ok(())
}

/// Spec §7 "Allocation" cap on a single node's scalar-value tuple (spec §3:
/// "up to seven heterogeneous scalar values").
pub(crate) fn check_node_values(count: usize, opts: &LoadOpts) -> Result<()> {
    if count > opts.max_node_values {
        return Err(Error::new(ErrorKind::Allocation, "check_node_values", line!(), format!("node has {count} values, exceeding configured max_node_values ({})", opts.max_node_values)));
    }
    Ok(())
}

/// Spec §7 "Allocation" cap on a typed bulk array leaf (spec §4.5/§4.6
/// "typed homogeneous buffer").
pub(crate) fn check_array_size(len: usize, opts: &LoadOpts) -> Result<()> {
    if len > opts.max_array_size {
        return Err(Error::new(ErrorKind::Allocation, "check_array_size", line!(), format!("array of {len} elements exceeds configured max_array_size ({})", opts.max_array_size)));
    }
    Ok(())
}

fn dom_array_len(arr: &DomArray) -> usize {
    match arr {
        DomArray::Bool(a) => a.len(),
        DomArray::I32(a) => a.len(),
        DomArray::I64(a) => a.len(),
        DomArray::F32(a) => a.len(),
        DomArray::F64(a) => a.len(),
        DomArray::Byte(a) => a.len(),
    }
}

pub(crate) fn check_array(arr: &DomArray, opts: &LoadOpts) -> Result<()> {
    check_array_size(dom_array_len(arr), opts)
}

/// Prepends `pad` zero elements to `arr`, used for the `-1`-is-valid
/// sentinel padding spec §4.7 point 4 describes (shared by both
/// front-ends since the classifier supplies `pad_begin` uniformly).
pub(crate) fn pad_array(arr: DomArray, pad: usize) -> DomArray {
    if pad == 0 {
        return arr;
    }
    match arr {
        DomArray::Bool(a) => DomArray::Bool(std::iter::repeat(false).take(pad).chain(a.iter().copied()).collect()),
        DomArray::I32(a) => DomArray::I32(std::iter::repeat(0).take(pad).chain(a.iter().copied()).collect()),
        DomArray::I64(a) => DomArray::I64(std::iter::repeat(0).take(pad).chain(a.iter().copied()).collect()),
        DomArray::F32(a) => DomArray::F32(std::iter::repeat(0.0).take(pad).chain(a.iter().copied()).collect()),
        DomArray::F64(a) => DomArray::F64(std::iter::repeat(0.0).take(pad).chain(a.iter().copied()).collect()),
        DomArray::Byte(a) => DomArray::Byte(std::iter::repeat(0).take(pad).chain(a.iter().copied()).collect()),
    }
}
