//! Per-kind object readers (spec §4.7, §4.9, §4.10): each module turns the
//! generic `DomNode` tree for one FBX object kind into a typed "raw"
//! record keyed by its 64-bit object id. [`crate::connect`] resolves the
//! `Connections` graph across these raw records into the final
//! `ufbx_data::Root` arrays.

pub mod anim;
pub mod bone;
pub mod deformer;
pub mod light;
pub mod material;
pub mod mesh;
pub mod model;

/// Synthesizes a pre-7000 object id from its interned name pointer, so
/// objects without an explicit numeric id (spec §4.1 GLOSSARY "pre-7000
/// files") still get a stable, collidable-the-same-way-as-the-original
/// identity (see `ufbx_data::index::ElementId`'s doc comment).
pub fn synthetic_id(ptr: *const u8) -> i64 {
    ptr as i64
}
