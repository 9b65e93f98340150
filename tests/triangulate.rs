//! End-to-end: triangulating a loaded mesh's quad faces (spec §6
//! `triangulate`, §8 Law "emits `3*(face.num_indices - 2)` indices ...
//! each triangle has non-zero signed area").

fn source() -> &'static str {
    r#"; FBX 7.4.0 project file
FBXHeaderExtension:  {
    Creator: "integration-suite"
}
Objects:  {
    Model: 1000, "Model::Plane", "Mesh" {
        Properties70:  {
        }
    }
    Geometry: 2000, "Geometry::Plane", "Mesh" {
        Vertices: *12 {
            a: 0,0,0, 1,0,0, 1,1,0, 0,1,0
        }
        PolygonVertexIndex: *4 {
            a: 0,1,2,-4
        }
    }
}
Connections:  {
    C: "OO",2000,1000
}
"#
}

#[test]
fn triangulates_the_only_quad_face() {
    let result = ufbx::load_memory(source().as_bytes(), ufbx::LoadOpts::default()).expect("load should succeed");
    let mesh = &result.scene.meshes[0];
    assert_eq!(1, mesh.faces.len());

    let face = mesh.faces[0];
    assert_eq!(4, face.num_indices);
    assert_eq!(2, face.num_triangles());

    let mut out = [0u32; 6];
    assert!(ufbx::triangulate(&mut out, mesh, face));
    for &idx in &out {
        assert!(idx >= face.index_begin && idx < face.index_begin + face.num_indices);
    }

    // Every emitted triangle has non-zero signed area (spec §8 Law).
    for tri in out.chunks_exact(3) {
        let p = |i: u32| mesh.position_at(i as usize);
        let [ax, ay, _] = p(tri[0]);
        let [bx, by, _] = p(tri[1]);
        let [cx, cy, _] = p(tri[2]);
        let area2 = (bx - ax) * (cy - ay) - (cx - ax) * (by - ay);
        assert!(area2.abs() > 1e-9);
    }
}

#[test]
fn rejects_short_output_buffer() {
    let result = ufbx::load_memory(source().as_bytes(), ufbx::LoadOpts::default()).expect("load should succeed");
    let mesh = &result.scene.meshes[0];
    let face = mesh.faces[0];
    let mut out = [0u32; 3];
    assert!(!ufbx::triangulate(&mut out, mesh, face));
}
