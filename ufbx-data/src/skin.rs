//! Skin deformation (spec §3, §4.11, end-to-end scenario §8.3).

use crate::element::SceneNode;
use crate::index::Index;
use std::sync::Arc;
use ufbx_derive::Validate;

/// One skin cluster: a bone binding plus the vertex indices/weights it
/// influences. `bone` may be absent (spec invariant 1 explicitly
/// documents `Skin.bone` as an allowed null).
#[derive(Clone, Debug, Validate)]
pub struct Skin {
    pub bone: Option<Index<SceneNode>>,
    pub geometry_to_bone: crate::transform::Matrix4,
    /// Vertex index into the owning mesh, parallel to `weights`.
    pub indices: Arc<[u32]>,
    pub weights: Arc<[f64]>,
}

/// Parse-time aux record (spec §3): a `Deformer` node holding the list of
/// cluster ids connected to it, before pass 2 of the connection resolver
/// (spec §4.11) attaches each cluster to its containing mesh.
#[derive(Clone, Debug, Default)]
pub struct SkinDeformer {
    pub clusters: Vec<Index<Skin>>,
}
