//! Finalizer (spec §4.12): sentinel/face-material cleanup, the `nodes`
//! list, world-transform propagation, and `metadata` population — the
//! last stage before a [`ufbx_data::Root`] is returned to the caller.

use crate::error::{Error, Result};
use ufbx_data::element::SceneNode;
use ufbx_data::error::ErrorKind;
use ufbx_data::index::Index;
use ufbx_data::transform::{compose_world, Matrix4};
use ufbx_data::Root;

/// Recursion bound on the parent chain (spec §4.12 "bail with
/// `MAX_CHILD_DEPTH` on recursion overflow"). Generous relative to any
/// real scene graph, but finite so a (corrupt or adversarial) connection
/// cycle can't hang the loader.
pub const MAX_CHILD_DEPTH: usize = 256;

fn fail(kind: ErrorKind, function: &'static str, description: impl Into<String>) -> Error {
    Error::new(kind, function, line!(), description)
}

/// Rebuilds each node's `children` list from the `parent` pointers
/// [`crate::connect`] resolved (spec §4.12 "collect ... nodes list").
pub(crate) fn link_children(nodes: &mut [SceneNode]) {
    for i in 0..nodes.len() {
        nodes[i].children.clear();
    }
    for i in 0..nodes.len() {
        if let Some(parent) = nodes[i].parent {
            nodes[parent.value()].children.push(Index::new(i as u32));
        }
    }
}

/// Walks from every root (`parent.is_none()`) computing `to_root`/
/// `world_transform`, failing if any chain exceeds [`MAX_CHILD_DEPTH`]
/// (spec §4.12).
pub(crate) fn propagate_world_transforms(nodes: &mut Vec<SceneNode>, max_child_depth: usize) -> Result<()> {
    let roots: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].parent.is_none()).collect();
    let mut stack: Vec<(usize, usize)> = roots.into_iter().map(|r| (r, 0)).collect();

    while let Some((idx, depth)) = stack.pop() {
        if depth > max_child_depth {
            return Err(fail(ErrorKind::MaxDepth, "propagate_world_transforms", "node depth exceeds MAX_CHILD_DEPTH"));
        }
        let to_parent = nodes[idx].to_parent;
        let local_scale = nodes[idx].local_transform.scale;
        let (parent_to_root, parent_rotation) = match nodes[idx].parent {
            None => (Matrix4::IDENTITY, Matrix4::IDENTITY),
            Some(p) => {
                let parent = &nodes[p.value()];
                (parent.to_root, parent.world_transform.rotation.to_matrix())
            }
        };
        let to_root = compose_world(nodes[idx].inherit_type, parent_to_root, parent_rotation, to_parent, local_scale);
        nodes[idx].to_root = to_root;

        let mut world = nodes[idx].local_transform;
        world.translation = ufbx_data::transform::Vec3::new(to_root.rows[0][3], to_root.rows[1][3], to_root.rows[2][3]);
        if let Some(p) = nodes[idx].parent {
            let parent_world = nodes[p.value()].world_transform;
            world.rotation = parent_world.rotation * nodes[idx].local_transform.rotation;
            world.scale = parent_world.scale.mul_elem(nodes[idx].local_transform.scale);
        }
        nodes[idx].world_transform = world;

        for child in nodes[idx].children.clone() {
            stack.push((child.value(), depth + 1));
        }
    }
    Ok(())
}

/// Clamps (or drops) every mesh's `face_material` array, assigns `root_node`
/// to the first parentless node, links children, and propagates world
/// transforms (spec §4.12).
pub fn finalize(root: &mut Root, opts: &crate::options::LoadOpts) -> Result<()> {
    for mesh in &mut root.meshes {
        mesh.clamp_face_material();
        mesh.clamp_attribute_indices(opts.allow_nonexistent_indices);
    }

    link_children(&mut root.nodes);
    root.root_node = (0..root.nodes.len()).find(|&i| root.nodes[i].parent.is_none()).map(|i| Index::new(i as u32));
    propagate_world_transforms(&mut root.nodes, opts.max_child_depth)?;

    root.metadata.result_memory_used = std::mem::size_of::<Root>()
        + root.nodes.len() * std::mem::size_of::<SceneNode>()
        + root.meshes.len() * std::mem::size_of::<ufbx_data::mesh::Mesh>();
    root.metadata.result_allocs = root.nodes.len() + root.meshes.len() + root.materials.len() + root.lights.len() + root.bones.len();

    Ok(())
}
