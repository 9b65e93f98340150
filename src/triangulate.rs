//! Face triangulation (spec §6 `triangulate`, §8 Laws).
//!
//! Fast-paths triangles and quads; quads split along whichever diagonal
//! stays inside the polygon, falling back to a fan for n-gons. Grounded on
//! `original_source/`'s `ufbx_triangulate`.

use ufbx_data::mesh::{Face, Mesh};
use ufbx_data::transform::Vec3;

fn vec3_at(mesh: &Mesh, logical_index: u32) -> Vec3 {
    let [x, y, z] = mesh.position_at(logical_index as usize);
    Vec3::new(x, y, z)
}

/// Triangulates `face` into `dst_indices`, writing `3 * (face.num_indices - 2)`
/// logical polygon-vertex indices. Returns `false` (writing nothing) if the
/// face has fewer than 3 indices or `dst_indices` is too small.
pub fn triangulate(dst_indices: &mut [u32], mesh: &Mesh, face: Face) -> bool {
    if face.num_indices < 3 {
        return false;
    }
    let needed = (face.num_indices as usize - 2) * 3;
    if dst_indices.len() < needed {
        return false;
    }

    if face.num_indices == 3 {
        dst_indices[0] = face.index_begin;
        dst_indices[1] = face.index_begin + 1;
        dst_indices[2] = face.index_begin + 2;
        return true;
    }

    if face.num_indices == 4 {
        let i0 = face.index_begin;
        let i1 = face.index_begin + 1;
        let i2 = face.index_begin + 2;
        let i3 = face.index_begin + 3;
        let v0 = vec3_at(mesh, i0);
        let v1 = vec3_at(mesh, i1);
        let v2 = vec3_at(mesh, i2);
        let v3 = vec3_at(mesh, i3);

        let a = v2.sub(v0);
        let b = v3.sub(v1);

        let na1 = a.cross(v1.sub(v0)).normalize();
        let na3 = a.cross(v0.sub(v3)).normalize();
        let nb0 = b.cross(v1.sub(v0)).normalize();
        let nb2 = b.cross(v2.sub(v1)).normalize();

        let dot_aa = a.dot(a);
        let dot_bb = b.dot(b);
        let dot_na = na1.dot(na3);
        let dot_nb = nb0.dot(nb2);

        let mut split_a = dot_aa <= dot_bb;
        if dot_na < 0.0 || dot_nb < 0.0 {
            split_a = dot_na >= dot_nb;
        }

        if split_a {
            dst_indices[0] = i0;
            dst_indices[1] = i1;
            dst_indices[2] = i2;
            dst_indices[3] = i2;
            dst_indices[4] = i3;
            dst_indices[5] = i0;
        } else {
            dst_indices[0] = i1;
            dst_indices[1] = i2;
            dst_indices[2] = i3;
            dst_indices[3] = i3;
            dst_indices[4] = i0;
            dst_indices[5] = i1;
        }
        return true;
    }

    // N-gon: fan from the first vertex. Acknowledged-approximate, matching
    // the original's own "TODO something reasonable" comment.
    let mut dst = 0;
    let mut i = 1u32;
    while i + 2 <= face.num_indices {
        dst_indices[dst] = face.index_begin;
        dst_indices[dst + 1] = face.index_begin + i;
        dst_indices[dst + 2] = face.index_begin + i + 1;
        dst += 3;
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn quad_mesh(positions: [[f64; 3]; 4]) -> Mesh {
        let mut mesh = Mesh::default();
        mesh.vertices = Arc::from(positions.to_vec());
        mesh.polygon_vertex_index = Arc::from(vec![0i32, 1, 2, 3]);
        mesh.num_vertices = 4;
        mesh.num_indices = 4;
        mesh
    }

    #[test]
    fn triangle_fast_path() {
        let mesh = quad_mesh([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]);
        let face = Face { index_begin: 0, num_indices: 3 };
        let mut out = [0u32; 3];
        assert!(triangulate(&mut out, &mesh, face));
        assert_eq!(out, [0, 1, 2]);
    }

    #[test]
    fn quad_splits_into_two_triangles_in_range() {
        let mesh = quad_mesh([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
        let face = Face { index_begin: 0, num_indices: 4 };
        let mut out = [0u32; 6];
        assert!(triangulate(&mut out, &mesh, face));
        for &idx in &out {
            assert!(idx < face.index_begin + face.num_indices);
        }
    }

    #[test]
    fn rejects_degenerate_face() {
        let mesh = quad_mesh([[0.0, 0.0, 0.0]; 4]);
        let face = Face { index_begin: 0, num_indices: 2 };
        let mut out = [0u32; 3];
        assert!(!triangulate(&mut out, &mesh, face));
    }

    #[test]
    fn rejects_undersized_output_buffer() {
        let mesh = quad_mesh([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
        let face = Face { index_begin: 0, num_indices: 4 };
        let mut out = [0u32; 3];
        assert!(!triangulate(&mut out, &mesh, face));
    }

    #[test]
    fn pentagon_fan_covers_all_triangles() {
        let mut mesh = Mesh::default();
        mesh.vertices = Arc::from(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.5, 1.0, 0.0],
            [0.5, 1.5, 0.0],
            [-0.5, 1.0, 0.0],
        ]);
        mesh.polygon_vertex_index = Arc::from(vec![0i32, 1, 2, 3, 4]);
        let face = Face { index_begin: 0, num_indices: 5 };
        let mut out = [0u32; 9];
        assert!(triangulate(&mut out, &mesh, face));
        assert_eq!(out, [0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }
}
