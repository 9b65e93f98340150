//! The resolved scene root (spec §4.12 "Finalizer": "Allocate the
//! `SceneImp` header ... Populate `metadata`").

use crate::animation::{AnimCurve, AnimLayer, AnimStack};
use crate::bone::Bone;
use crate::element::SceneNode;
use crate::index::{Get, Index};
use crate::light::Light;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::skin::Skin;
use ufbx_derive::Validate;

/// FBX version/creator/memory metadata (spec §4.12).
#[derive(Clone, Debug, Default, Validate)]
pub struct Metadata {
    pub version: u32,
    pub ascii: bool,
    pub creator: String,
    pub temp_memory_used: usize,
    pub result_memory_used: usize,
    pub temp_allocs: usize,
    pub result_allocs: usize,
}

impl crate::validation::Validate for usize {}

/// The root object of a resolved FBX scene, the safe-Rust analogue of the
/// original's `SceneImp` (spec §3 "Lifecycle": "The result arena also
/// contains the `SceneImp` header itself so the handle *is* the allocation
/// root" — here, `Root` plays that role without the arena-identity trick).
#[derive(Clone, Debug, Default, Validate)]
pub struct Root {
    pub nodes: Vec<SceneNode>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub bones: Vec<Bone>,
    pub skins: Vec<Skin>,
    pub anim_stacks: Vec<AnimStack>,
    pub anim_layers: Vec<AnimLayer>,
    pub anim_curves: Vec<AnimCurve>,
    pub root_node: Option<Index<SceneNode>>,
    pub metadata: Metadata,
}

macro_rules! impl_get {
    ($ty:ty, $field:ident) => {
        impl Get<$ty> for Root {
            fn get(&self, index: Index<$ty>) -> Option<&$ty> {
                self.$field.get(index.value())
            }
        }
    };
}

impl_get!(SceneNode, nodes);
impl_get!(Mesh, meshes);
impl_get!(Material, materials);
impl_get!(Light, lights);
impl_get!(Bone, bones);
impl_get!(Skin, skins);
impl_get!(AnimStack, anim_stacks);
impl_get!(AnimLayer, anim_layers);
impl_get!(AnimCurve, anim_curves);

impl Root {
    /// Spec §8: "For every node `n`, iterating `n -> n.parent` terminates
    /// at the root model within `max_child_depth` steps."
    pub fn parent_chain_len(&self, mut node: Index<SceneNode>, max_depth: usize) -> Option<usize> {
        let mut depth = 0;
        loop {
            let n = self.get(node)?;
            match n.parent {
                None => return Some(depth),
                Some(parent) => {
                    depth += 1;
                    if depth > max_depth {
                        return None;
                    }
                    node = parent;
                }
            }
        }
    }

    /// Spec §8: "re-computing `to_root` from the `parent`-chain reproduces
    /// the stored `to_root`". Used by tests and by callers double-checking
    /// the finalizer's work.
    pub fn recompute_to_root(&self, index: Index<SceneNode>) -> Option<crate::transform::Matrix4> {
        let node = self.get(index)?;
        match node.parent {
            None => Some(node.to_parent),
            Some(parent) => {
                let parent_to_root = self.recompute_to_root(parent)?;
                Some(parent_to_root * node.to_parent)
            }
        }
    }

    pub fn find_node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name.as_str() == name)
    }

    pub fn find_material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name.as_str() == name)
    }
}
