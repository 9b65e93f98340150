//! The property system (spec §3 "Properties", §4.8).
//!
//! `Props` owns a sorted, deduplicated array plus an optional link to a
//! `defaults` container — the template-inheritance chain. The sort/dedup
//! algorithm itself (insertion sort below 32 entries, merge sort above)
//! lives in `ufbx::templates`, which is parser-pipeline code; this module
//! only defines the shape it produces and consumes.

use crate::strings::InternedStr;
use crate::transform::Vec3;
use std::sync::{Arc, OnceLock};

/// `ufbx_prop_type`'s numeric/semantic split, carried verbatim from the
/// original header per `SPEC_FULL` §3 (the distilled spec only lists the
/// storage union, not the type tag's range).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PropertyType {
    #[default]
    Unknown,
    Number,
    Integer,
    Boolean,
    Vector,
    Color,
    ColorRgb,
    Translation,
    Rotation,
    Scaling,
    String,
    DateTime,
    Enum,
    Compound,
}

/// The tagged-union storage for a single property's value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    None,
    Int(i64),
    Real(f64),
    Vec3(Vec3),
    Str(InternedStr),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(v) => Some(*v as f64),
            PropertyValue::Real(v) => Some(*v),
            PropertyValue::Vec3(v) => Some(v.x),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            PropertyValue::Vec3(v) => Some(*v),
            PropertyValue::Real(v) => Some(Vec3::new(*v, *v, *v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A single FBX property, `{name, imp_key, type, value}` per spec §3.
#[derive(Clone, Debug)]
pub struct Property {
    pub name: InternedStr,
    /// First four bytes of `name`, packed big-endian, used to accelerate
    /// binary search and as the primary sort key (spec §3).
    pub imp_key: u32,
    pub prop_type: PropertyType,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(name: InternedStr, prop_type: PropertyType, value: PropertyValue) -> Self {
        let imp_key = imp_key_of(name.as_str());
        Property { name, imp_key, prop_type, value }
    }

    /// Spec §4.8: "Equality compares `value_int`, `value_vec3`, and
    /// `value_str`" — strings compare by interned pointer, not content.
    pub fn value_equals(&self, other: &Property) -> bool {
        match (&self.value, &other.value) {
            (PropertyValue::None, PropertyValue::None) => true,
            (PropertyValue::Int(a), PropertyValue::Int(b)) => a == b,
            (PropertyValue::Real(a), PropertyValue::Real(b)) => a == b,
            (PropertyValue::Vec3(a), PropertyValue::Vec3(b)) => a == b,
            (PropertyValue::Str(a), PropertyValue::Str(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    fn sort_key(&self) -> (u32, &str) {
        (self.imp_key, self.name.as_str())
    }
}

/// Packs the first four bytes of `name` big-endian, zero-padded, matching
/// `ufbxi_get_imp_key` in the original.
pub fn imp_key_of(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut key = 0u32;
    for i in 0..4 {
        key = (key << 8) | (*bytes.get(i).unwrap_or(&0) as u32);
    }
    key
}

/// A sorted, deduplicated property bag with an optional defaults chain.
///
/// The chain depth is bounded (object -> template -> global defaults, at
/// most 3 links per Design Note "Attribute merging and defaults chain"),
/// so it's represented as a plain `Option<Arc<Props>>` rather than an
/// index into a shared table.
#[derive(Clone, Debug, Default)]
pub struct Props {
    /// Invariant: strictly sorted by `(imp_key, name)`, no duplicates
    /// (spec §3 invariant 4).
    pub props: Vec<Property>,
    pub defaults: Option<Arc<Props>>,
}

impl Props {
    pub fn new(mut props: Vec<Property>, defaults: Option<Arc<Props>>) -> Self {
        sort_dedup(&mut props);
        Props { props, defaults }
    }

    /// Binary search over the sorted array, falling back to the defaults
    /// chain on a miss.
    pub fn find(&self, name: &str) -> Option<&Property> {
        let key = imp_key_of(name);
        if let Ok(idx) = self.props.binary_search_by(|p| p.sort_key().cmp(&(key, name))) {
            return Some(&self.props[idx]);
        }
        self.defaults.as_deref().and_then(|d| d.find(name))
    }

    pub fn find_real(&self, name: &str, default: f64) -> f64 {
        self.find(name).and_then(|p| p.value.as_f64()).unwrap_or(default)
    }

    pub fn find_vec3(&self, name: &str, default: Vec3) -> Vec3 {
        self.find(name).and_then(|p| p.value.as_vec3()).unwrap_or(default)
    }

    pub fn find_string<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.find(name).and_then(|p| p.value.as_str()).unwrap_or(default)
    }

    /// Removes every property equal (name *and* value, spec §4.8) to the
    /// corresponding entry in `defaults`, leaving the chain link in place
    /// so lookups still resolve through it.
    pub fn strip_defaults(&mut self) {
        let Some(defaults) = self.defaults.clone() else { return };
        self.props.retain(|p| {
            !defaults
                .find(p.name.as_str())
                .is_some_and(|d| d.value_equals(p))
        });
    }

    /// Terminates iff the chain is acyclic, which it always is by
    /// construction here (an `Arc<Props>` cannot reference its own
    /// allocation); checked explicitly to document spec §8's invariant.
    pub fn chain_len(&self) -> usize {
        let mut len = 0;
        let mut cur = self.defaults.as_deref();
        while let Some(p) = cur {
            len += 1;
            cur = p.defaults.as_deref();
        }
        len
    }
}

// `Props` is leaf data from the resolver's point of view (the defaults
// chain holds no element references), so there is nothing index-shaped to
// check here; validation only cares about the `SceneNode`/`Mesh`/...
// structs that embed a `Props`.
impl crate::validation::Validate for Props {}

/// Insertion sort below 32 entries (spec §4.8: "covers the vast majority
/// of nodes"), merge sort otherwise. Equal `(imp_key, name)` entries
/// collapse, the later one winning (matches the original's "overwrites
/// predecessor" rule), mirroring the described in-place insertion dedup.
pub fn sort_dedup(props: &mut Vec<Property>) {
    if props.len() < 32 {
        insertion_sort_dedup(props);
    } else {
        props.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        dedup_sorted(props);
    }
}

fn insertion_sort_dedup(props: &mut Vec<Property>) {
    let mut out: Vec<Property> = Vec::with_capacity(props.len());
    'outer: for prop in props.drain(..) {
        let key = prop.sort_key();
        let mut idx = out.len();
        while idx > 0 {
            let cmp = out[idx - 1].sort_key().cmp(&key);
            match cmp {
                std::cmp::Ordering::Greater => idx -= 1,
                std::cmp::Ordering::Equal => {
                    out[idx - 1] = prop;
                    continue 'outer;
                }
                std::cmp::Ordering::Less => break,
            }
        }
        out.insert(idx, prop);
    }
    *props = out;
}

fn dedup_sorted(props: &mut Vec<Property>) {
    props.dedup_by(|a, b| {
        if a.sort_key() == b.sort_key() {
            // `dedup_by` calls with (next, prev); keep the later entry.
            std::mem::swap(a, b);
            true
        } else {
            false
        }
    });
}

/// FBX's standard defaults, built once per process (spec §3 "A global,
/// process-initialized `default_props`"; §4.8 ambient addition: a
/// `OnceLock` rather than a mutable global per Design Note "Global mutable
/// state").
pub fn default_props() -> &'static Arc<Props> {
    static DEFAULTS: OnceLock<Arc<Props>> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        use crate::strings::InternedStr;
        let intern = |s: &str| InternedStr::new(Arc::from(s));
        let props = vec![
            Property::new(intern("Lcl Translation"), PropertyType::Translation, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("Lcl Rotation"), PropertyType::Rotation, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("Lcl Scaling"), PropertyType::Scaling, PropertyValue::Vec3(Vec3::ONE)),
            Property::new(intern("RotationOffset"), PropertyType::Vector, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("RotationPivot"), PropertyType::Vector, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("PreRotation"), PropertyType::Vector, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("PostRotation"), PropertyType::Vector, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("ScalingOffset"), PropertyType::Vector, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("ScalingPivot"), PropertyType::Vector, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("RotationOrder"), PropertyType::Enum, PropertyValue::Int(0)),
            Property::new(intern("InheritType"), PropertyType::Enum, PropertyValue::Int(0)),
            Property::new(intern("Visibility"), PropertyType::Number, PropertyValue::Real(1.0)),
            Property::new(intern("DiffuseColor"), PropertyType::Color, PropertyValue::Vec3(Vec3::new(0.8, 0.8, 0.8))),
            Property::new(intern("AmbientColor"), PropertyType::Color, PropertyValue::Vec3(Vec3::ZERO)),
            Property::new(intern("SpecularColor"), PropertyType::Color, PropertyValue::Vec3(Vec3::new(1.0, 1.0, 1.0))),
        ];
        Arc::new(Props::new(props, None))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intern(s: &str) -> InternedStr {
        InternedStr::new(Arc::from(s))
    }

    #[test]
    fn sort_dedup_keeps_later_duplicate() {
        let mut props = vec![
            Property::new(intern("Foo"), PropertyType::Number, PropertyValue::Real(1.0)),
            Property::new(intern("Bar"), PropertyType::Number, PropertyValue::Real(2.0)),
            Property::new(intern("Foo"), PropertyType::Number, PropertyValue::Real(3.0)),
        ];
        sort_dedup(&mut props);
        assert_eq!(2, props.len());
        let foo = props.iter().find(|p| p.name.as_str() == "Foo").unwrap();
        assert_eq!(Some(3.0), foo.value.as_f64());
    }

    #[test]
    fn strip_defaults_drops_matching_value_only() {
        let defaults = Arc::new(Props::new(
            vec![Property::new(intern("Lcl Scaling"), PropertyType::Scaling, PropertyValue::Vec3(Vec3::ONE))],
            None,
        ));
        let mut props = Props::new(
            vec![
                Property::new(intern("Lcl Scaling"), PropertyType::Scaling, PropertyValue::Vec3(Vec3::ONE)),
                Property::new(intern("Lcl Translation"), PropertyType::Translation, PropertyValue::Vec3(Vec3::new(1.0, 0.0, 0.0))),
            ],
            Some(defaults),
        );
        props.strip_defaults();
        assert_eq!(1, props.props.len());
        assert_eq!("Lcl Translation", props.props[0].name.as_str());
        // Still resolvable through the chain.
        assert_eq!(Vec3::ONE, props.find_vec3("Lcl Scaling", Vec3::ZERO));
    }

    #[test]
    fn chain_terminates() {
        let inner = Arc::new(Props::new(vec![], None));
        let props = Props::new(vec![], Some(inner));
        assert_eq!(1, props.chain_len());
    }
}
