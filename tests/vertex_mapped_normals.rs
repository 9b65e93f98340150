//! End-to-end: a `LayerElementNormal` block declared `ByVertex` +
//! `IndexToDirect` (spec §4.7 point 3: "`ByVertex` + indexed -> indirect
//! through position indices"), with the polygon winding order
//! deliberately different from vertex-position order so a reader that
//! (incorrectly) indexes the normal array by the polygon-vertex slot
//! instead of the vertex-position index would return the wrong value.

fn source() -> &'static str {
    r#"; FBX 7.4.0 project file
FBXHeaderExtension:  {
    Creator: "integration-suite"
}
Objects:  {
    Model: 1000, "Model::Quad", "Mesh" {
        Properties70:  {
        }
    }
    Geometry: 2000, "Geometry::Quad", "Mesh" {
        Vertices: *12 {
            a: 0,0,0, 1,0,0, 1,1,0, 0,1,0
        }
        PolygonVertexIndex: *4 {
            a: 3,2,1,-1
        }
        LayerElementNormal: 0 {
            Version: 101
            Name: ""
            MappingInformationType: "ByVertex"
            ReferenceInformationType: "IndexToDirect"
            Normals: *12 {
                a: 1,0,0, 0,1,0, 0,0,1, 1,1,1
            }
            NormalsIndex: *4 {
                a: 0,1,2,3
            }
        }
    }
}
Connections:  {
    C: "OO",2000,1000
}
"#
}

#[test]
fn by_vertex_normal_resolves_through_vertex_position_index() {
    let result = ufbx::load_memory(source().as_bytes(), ufbx::LoadOpts::default()).expect("load should succeed");
    let scene = result.scene;

    assert_eq!(1, scene.meshes.len());
    let mesh = &scene.meshes[0];
    assert_eq!(ufbx_data::mesh::MappingMode::ByVertex, mesh.normals.mapping);

    // polygon_vertex_index is [3, 2, 1, 0]: logical slot `i` sits on vertex
    // position `3 - i`, so a `ByVertex` normal must resolve through that
    // position, not the logical slot itself.
    assert_eq!(vec![3, 2, 1, 0], mesh.polygon_vertex_index.to_vec());

    let expected = [[1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
    for (logical_index, want) in expected.into_iter().enumerate() {
        let got = mesh.normal_at(logical_index);
        assert!(
            got.iter().zip(want.iter()).all(|(a, b)| (a - b).abs() < 1e-9),
            "normal_at({logical_index}) = {got:?}, want {want:?}"
        );
    }
}
