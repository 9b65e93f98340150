//! End-to-end: a post-7000 `AnimationCurve` with `KeyAttrFlags` auto-tangent
//! bits set, wired to a `Model`'s `Lcl Translation.d|X` channel through an
//! `AnimationCurveNode`, `AnimationLayer`, and `AnimationStack` (spec
//! §4.10.1).

fn source() -> &'static str {
    r#"; FBX 7.4.0 project file
FBXHeaderExtension:  {
    Creator: "integration-suite"
}
Objects:  {
    Model: 1000, "Model::Cube", "Mesh" {
        Properties70:  {
        }
    }
    AnimationStack: 4000, "AnimStack::Take 001", "" {
    }
    AnimationLayer: 4001, "AnimLayer::BaseLayer", "" {
    }
    AnimationCurveNode: 4002, "AnimCurveNode::T", "" {
    }
    AnimationCurve: 4003, "AnimCurve::", "" {
        KeyTime: *3 {
            a: 0,46186158000,92372316000
        }
        KeyValueFloat: *3 {
            a: 0.0,10.0,20.0
        }
        KeyAttrFlags: *1 {
            a: 2048
        }
        KeyAttrDataFloat: *4 {
            a: 0.0,0.0,0.0,0.0
        }
        KeyAttrRefCount: *1 {
            a: 3
        }
    }
}
Connections:  {
    C: "OO",4001,4000
    C: "OO",4002,4001
    C: "OP",4002,1000,"Lcl Translation"
    C: "OP",4003,4002,"d|X"
}
"#
}

#[test]
fn evaluates_cubic_auto_tangent_curve_linearly() {
    let result = ufbx::load_memory(source().as_bytes(), ufbx::LoadOpts::default()).expect("load should succeed");
    let scene = result.scene;

    assert_eq!(1, scene.anim_stacks.len());
    assert_eq!(1, scene.anim_layers.len());
    assert_eq!(1, scene.anim_curves.len());

    let curve = &scene.anim_curves[0];
    assert_eq!(3, curve.keyframes.len());

    let stack_idx = ufbx_data::index::Index::<ufbx_data::animation::AnimStack>::new(0);
    let node_idx = ufbx_data::index::Index::<ufbx_data::element::SceneNode>::new(0);

    // A straight-line ramp: the solved auto-tangent should reproduce the
    // linear interpolant exactly at the segment midpoint.
    let mid = ufbx_data::animation::KTime(46186158000 / 2);
    let value = curve.evaluate(mid);
    assert!((value - 5.0).abs() < 1e-6, "expected ~5.0, got {value}");

    let t = ufbx::evaluate_transform(&scene, node_idx, Some(stack_idx), ufbx_data::animation::KTime(46186158000));
    assert!((t.translation.x - 10.0).abs() < 1e-6);
}
