//! `Deformer`/`SubDeformer` reader for skin clusters (spec §3, §4.11,
//! end-to-end scenario §8.3).
//!
//! A `Deformer` of class `"Skin"` is the aggregate; each `SubDeformer` of
//! class `"Cluster"` underneath it binds one bone to a run of mesh
//! vertex/weight pairs. [`crate::connect`] resolves which mesh a skin
//! deformer belongs to and which model a cluster's bone is, since that's
//! purely a `Connections` fact this reader has no access to.

use crate::toplevel::{object_id, TopLevel};
use ufbx_data::transform::Matrix4;
use ufbx_data::DomNode;

fn class_of(node: &DomNode) -> &str {
    node.scalars().get(2).and_then(|v| v.as_str()).unwrap_or("")
}

pub struct RawCluster {
    pub id: i64,
    pub indices: Vec<u32>,
    pub weights: Vec<f64>,
    pub geometry_to_bone: Matrix4,
}

fn read_matrix4(node: &DomNode, name: &str) -> Option<Matrix4> {
    let flat = node.find_child(name)?.array()?.as_f64_vec();
    if flat.len() < 16 {
        return None;
    }
    let mut rows = [[0.0; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            // FBX stores 4x4 transforms column-major.
            rows[r][c] = flat[c * 4 + r];
        }
    }
    Some(Matrix4::from_rows(rows))
}

pub fn read_skin_deformer_ids(top: &TopLevel) -> Vec<i64> {
    top.objects_of_kind("Deformer")
        .filter(|n| class_of(n) == "Skin")
        .filter_map(object_id)
        .collect()
}

pub fn read_clusters(top: &TopLevel) -> Vec<RawCluster> {
    top.objects_of_kind("SubDeformer")
        .filter(|n| class_of(n) == "Cluster")
        .filter_map(|node| {
            let id = object_id(&node)?;
            let indices = node
                .find_child("Indexes")
                .and_then(|n| n.array())
                .map(|a| a.as_i64_vec().into_iter().map(|v| v as u32).collect())
                .unwrap_or_default();
            let weights = node
                .find_child("Weights")
                .and_then(|n| n.array())
                .map(|a| a.as_f64_vec())
                .unwrap_or_default();

            let transform = read_matrix4(&node, "Transform").unwrap_or(Matrix4::IDENTITY);
            let transform_link = read_matrix4(&node, "TransformLink").unwrap_or(Matrix4::IDENTITY);
            let geometry_to_bone = transform_link.inverse().unwrap_or(Matrix4::IDENTITY) * transform;

            Some(RawCluster { id, indices, weights, geometry_to_bone })
        })
        .collect()
}
