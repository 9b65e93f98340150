//! The interned-string handle shared by every part of the data model.
//!
//! The actual interning hash map (open addressing, robin-hood probing, the
//! ~100 preloaded FBX keywords) lives in the `ufbx` crate's `strings`
//! module, since it is parser infrastructure rather than a data shape. This
//! type is the handle that infrastructure hands out: a reference-counted,
//! immutable string whose *pointer* identity is stable for the lifetime of
//! a load, which is what lets a node/property name compare against a known
//! keyword by pointer rather than by content (spec §4.4).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone)]
pub struct InternedStr(Arc<str>);

impl InternedStr {
    pub fn new(s: Arc<str>) -> Self {
        InternedStr(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True identity comparison: same interning pool slot, not just equal
    /// contents. Used by the template/defaults merge (§4.8) to compare two
    /// string property values without re-scanning bytes.
    pub fn ptr_eq(&self, other: &InternedStr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for InternedStr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Eq for InternedStr {}

impl Hash for InternedStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for InternedStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for InternedStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl AsRef<str> for InternedStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Arc<str>> for InternedStr {
    fn from(s: Arc<str>) -> Self {
        InternedStr(s)
    }
}

impl Default for InternedStr {
    fn default() -> Self {
        InternedStr(Arc::from(""))
    }
}

impl crate::validation::Validate for InternedStr {}
