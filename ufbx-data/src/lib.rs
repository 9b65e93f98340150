//! Data model for the `ufbx` FBX scene loader.
//!
//! This crate holds only the *shapes* the loader produces and the
//! resolver/finalizer consume — no parsing logic. The `ufbx` crate
//! depends on this one the way a reader depends on its own data model,
//! kept as a separate crate so the shapes can be reused without pulling
//! in the parser.

// `#[derive(Validate)]` (ufbx-derive) emits fully-qualified `ufbx_data::...`
// paths so the same derive works identically whether applied inside this
// crate or from the `ufbx` root crate; self-reference by crate name needs
// this alias (stable since Rust 1.34).
extern crate self as ufbx_data;

pub mod animation;
pub mod bone;
pub mod element;
pub mod error;
pub mod index;
pub mod light;
pub mod material;
pub mod mesh;
pub mod path;
pub mod props;
pub mod root;
pub mod skin;
pub mod strings;
pub mod transform;
pub mod validation;
mod value;

pub use element::{NodeKind, SceneNode};
pub use index::{ElementId, Get, Index};
pub use path::Path;
pub use root::Root;
pub use strings::InternedStr;
pub use validation::Validate;
pub use value::{DomArray, NodeContent, ScalarValue};

pub use node::DomNode;
mod node;
