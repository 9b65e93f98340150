//! Structural validation.
//!
//! Two passes are distinguished, matching the split the loader itself
//! needs: `validate_minimally` checks the invariants the rest of the
//! pipeline depends on not to panic or index out of bounds (§8 of the
//! specification); `validate_completely` additionally checks conformance
//! details that are safe to ignore (e.g. a `RotationOrder` outside the
//! documented range falls back to `Xyz` rather than being fatal).

use crate::{Path, Root};
use std::collections::HashMap;
use std::hash::Hash;

/// Specifies what kind of error occurred during validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Error {
    /// An [`crate::Index`] pointed outside the bounds of its target array.
    IndexOutOfBounds,
    /// A value was recognized as structurally present but semantically invalid.
    Invalid,
    /// Required data was omitted.
    Missing,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = match self {
            Error::IndexOutOfBounds => "index out of bounds",
            Error::Invalid => "invalid value",
            Error::Missing => "missing data",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for Error {}

/// Trait for validating resolved scene data.
///
/// `#[derive(Validate)]` (from `ufbx-derive`) implements this for a struct
/// by calling it on every field in turn.
pub trait Validate {
    fn validate_minimally<P, R>(&self, _root: &Root, _path: P, _report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
    }

    fn validate_completely<P, R>(&self, _root: &Root, _path: P, _report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
    }
}

/// A value that may have failed to parse into a closed enumeration.
///
/// Rather than failing the whole node on an unrecognized
/// `MappingMode`/`Interpolation`/etc, the value is preserved as
/// `Invalid` and validation (or the reader) decides the fallback,
/// matching the original's "unknown tag is ignored at the node level"
/// robustness policy (spec §7).
#[derive(Debug, Eq, PartialEq, Hash)]
pub enum Checked<T> {
    Valid(T),
    Invalid,
}

impl<T> Checked<T> {
    pub fn as_ref(&self) -> Checked<&T> {
        match self {
            Checked::Valid(item) => Checked::Valid(item),
            Checked::Invalid => Checked::Invalid,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Checked::Valid(item) => item,
            Checked::Invalid => default,
        }
    }
}

impl<T: Clone> Clone for Checked<T> {
    fn clone(&self) -> Self {
        match self {
            Checked::Valid(item) => Checked::Valid(item.clone()),
            Checked::Invalid => Checked::Invalid,
        }
    }
}

impl<T: Copy> Copy for Checked<T> {}

impl<T: Default> Default for Checked<T> {
    fn default() -> Self {
        Checked::Valid(T::default())
    }
}

impl<T> Validate for Checked<T> {
    fn validate_minimally<P, R>(&self, _root: &Root, path: P, report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
        if let Checked::Invalid = self {
            report(&path, Error::Invalid);
        }
    }
}

impl<K: Eq + Hash + ToString, V: Validate> Validate for HashMap<K, V> {
    fn validate_minimally<P, R>(&self, root: &Root, path: P, report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
        for (key, value) in self.iter() {
            value.validate_minimally(root, || path().key(&key.to_string()), report);
        }
    }

    fn validate_completely<P, R>(&self, root: &Root, path: P, report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
        for (key, value) in self.iter() {
            value.validate_completely(root, || path().key(&key.to_string()), report);
        }
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate_minimally<P, R>(&self, root: &Root, path: P, report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
        if let Some(value) = self.as_ref() {
            value.validate_minimally(root, path, report);
        }
    }

    fn validate_completely<P, R>(&self, root: &Root, path: P, report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
        if let Some(value) = self.as_ref() {
            value.validate_completely(root, path, report);
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate_minimally<P, R>(&self, root: &Root, path: P, report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
        for (index, value) in self.iter().enumerate() {
            value.validate_minimally(root, || path().index(index), report);
        }
    }

    fn validate_completely<P, R>(&self, root: &Root, path: P, report: &mut R)
    where
        P: Fn() -> Path,
        R: FnMut(&dyn Fn() -> Path, Error),
    {
        for (index, value) in self.iter().enumerate() {
            value.validate_completely(root, || path().index(index), report);
        }
    }
}

// Leaves assumed to always be valid once they exist.
impl Validate for bool {}
impl Validate for u8 {}
impl Validate for u32 {}
impl Validate for u64 {}
impl Validate for i32 {}
impl Validate for i64 {}
impl Validate for f32 {}
impl Validate for f64 {}
impl Validate for [f32; 3] {}
impl Validate for [f32; 4] {}
impl Validate for [f64; 3] {}
impl Validate for [f64; 4] {}
impl Validate for () {}
impl Validate for String {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_invalid_reports_once() {
        let value: Checked<u32> = Checked::Invalid;
        let root = Root::default();
        let mut errors = Vec::new();
        value.validate_minimally(&root, Path::new, &mut |path, error| {
            errors.push((path(), error));
        });
        assert_eq!(1, errors.len());
        assert_eq!(Error::Invalid, errors[0].1);
    }
}
