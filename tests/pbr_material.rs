//! End-to-end: an ASCII 7500 file with a `Mesh` model carrying a
//! `Material` connected through `Connections`, reading color/shininess
//! properties out of a `Properties70` bag.

fn source() -> &'static str {
    r#"; FBX 7.5.0 project file
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
    Material: 3000, "Material::Asphalt", "" {
        Properties70:  {
            P: "DiffuseColor", "Color", "", "A", 0.2,0.2,0.25
            P: "SpecularColor", "Color", "", "A", 0.9,0.9,0.9
            P: "Shininess", "Number", "", "A", 64.0
            P: "TransparencyFactor", "Number", "", "A", 0.25
        }
    }
}
Connections:  {
    C: "OO",2000,1000
    C: "OO",3000,1000
}
"#
}

#[test]
fn reads_material_properties_and_attaches_to_mesh() {
    let result = ufbx::load_memory(source().as_bytes(), ufbx::LoadOpts::default()).expect("load should succeed");
    let scene = result.scene;

    assert_eq!(1, scene.materials.len());
    let material = &scene.materials[0];
    assert_eq!("Material::Asphalt", material.name.as_str());
    assert!((material.diffuse_color.x - 0.2).abs() < 1e-9);
    assert!((material.specular_color.x - 0.9).abs() < 1e-9);
    assert!((material.shininess - 64.0).abs() < 1e-9);
    assert!((material.opacity - 0.75).abs() < 1e-9);

    assert_eq!(1, scene.meshes.len());
    assert_eq!(1, scene.meshes[0].materials.len());
    assert_eq!(0, scene.meshes[0].materials[0].value());
}
