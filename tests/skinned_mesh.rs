//! End-to-end: a mesh bound to one bone through a `Skin` deformer and a
//! single `Cluster` sub-deformer (spec §4.11).

fn source() -> &'static str {
    r#"; FBX 7.4.0 project file
FBXHeaderExtension:  {
    Creator: "integration-suite"
}
Objects:  {
    Model: 1000, "Model::Mesh", "Mesh" {
        Properties70:  {
        }
    }
    Model: 1001, "Model::Bone", "LimbNode" {
        Properties70:  {
        }
    }
    NodeAttribute: 1002, "NodeAttribute::", "LimbNode" {
    }
    Geometry: 2000, "Geometry::Mesh", "Mesh" {
        Vertices: *12 {
            a: 0,0,0, 1,0,0, 1,1,0, 0,1,0
        }
        PolygonVertexIndex: *4 {
            a: 0,1,2,-4
        }
    }
    Deformer: 3000, "Deformer::", "Skin" {
    }
    SubDeformer: 3001, "SubDeformer::", "Cluster" {
        Indexes: *4 {
            a: 0,1,2,3
        }
        Weights: *4 {
            a: 1.0,1.0,1.0,1.0
        }
        Transform: *16 {
            a: 1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1
        }
        TransformLink: *16 {
            a: 1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1
        }
    }
}
Connections:  {
    C: "OO",2000,1000
    C: "OO",1002,1001
    C: "OO",3000,2000
    C: "OO",3001,3000
    C: "OO",1001,3001
}
"#
}

#[test]
fn binds_cluster_to_mesh_and_bone() {
    let result = ufbx::load_memory(source().as_bytes(), ufbx::LoadOpts::default()).expect("load should succeed");
    let scene = result.scene;

    assert_eq!(1, scene.meshes.len());
    assert_eq!(1, scene.bones.len());
    assert_eq!(1, scene.skins.len());

    let skin = &scene.skins[0];
    assert_eq!(4, skin.indices.len());
    assert_eq!(4, skin.weights.len());
    assert!(skin.weights.iter().all(|&w| (w - 1.0).abs() < 1e-9));

    let bone_node = scene.find_node("Model::Bone").expect("bone node present");
    assert!(matches!(bone_node.kind, ufbx_data::element::NodeKind::Bone(_)));

    let bone_index = skin.bone.expect("cluster bound to a bone");
    let bound_node = scene.nodes.get(bone_index.value()).expect("bone index resolves");
    assert_eq!("Model::Bone", bound_node.name.as_str());

    let mesh = &scene.meshes[0];
    assert_eq!(1, mesh.skins.len());
}
