use std::{fmt, marker::PhantomData};

/// The 64-bit identifier FBX assigns to every connectable element.
///
/// Post-7000 files supply this explicitly in the `Objects` section; pre-7000
/// files synthesize it from the interned `Type::Name` string (the loader
/// hashes the interned pointer's address space position rather than the raw
/// bytes, so two identically named pre-7000 objects of the same type still
/// collide the way a pointer-as-integer id scheme would — this is
/// intentional, see `DESIGN.md`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u64);

impl ElementId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl crate::validation::Validate for ElementId {}

/// An offset into one of [`crate::Root`]'s per-kind element arrays.
///
/// This is the safe-Rust replacement for the raw pointers the original
/// implementation threads through `Model`/`Mesh`/... records: every former
/// pointer field becomes an `Index<T>` (or `Option<Index<T>>` where the
/// source allows a null, e.g. `Skin::bone`).
pub struct Index<T>(u32, PhantomData<fn() -> T>);

impl<T> Index<T> {
    pub fn new(value: u32) -> Self {
        Index(value, PhantomData)
    }

    pub fn value(&self) -> usize {
        self.0 as usize
    }
}

impl<T> Clone for Index<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Index<T> {}

impl<T> PartialEq for Index<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Index<T> {}

impl<T> std::hash::Hash for Index<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> fmt::Debug for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Index({})", self.0)
    }
}

impl<T> fmt::Display for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Helper trait for retrieving a top-level element by its [`Index`].
///
/// Implemented once per element kind on [`crate::Root`] (see `root.rs`).
pub trait Get<T> {
    fn get(&self, index: Index<T>) -> Option<&T>;
}

impl<T> crate::validation::Validate for Index<T>
where
    crate::Root: Get<T>,
{
    fn validate_minimally<P, R>(&self, root: &crate::Root, path: P, report: &mut R)
    where
        P: Fn() -> crate::Path,
        R: FnMut(&dyn Fn() -> crate::Path, crate::validation::Error),
    {
        if root.get(*self).is_none() {
            report(&path, crate::validation::Error::IndexOutOfBounds);
        }
    }
}
