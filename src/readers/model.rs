//! `Model` reader (spec §4.9): properties plus the pivot chain inputs the
//! transform composer needs. The actual matrix composition happens in
//! [`crate::connect`]/[`crate::finalize`] once parent links are known.

use crate::templates;
use crate::toplevel::{object_id, object_name, TopLevel};
use std::collections::HashMap;
use std::sync::Arc;
use ufbx_data::props::Props;
use ufbx_data::transform::{InheritType, PivotChain, RotationOrder, Vec3};

pub struct RawModel {
    pub id: i64,
    pub name: String,
    pub props: Props,
    pub pivots: PivotChain,
    pub inherit_type: InheritType,
    pub rotation_order: RotationOrder,
    pub visibility: f64,
}

fn rotation_order_from_int(v: i64) -> RotationOrder {
    match v {
        0 => RotationOrder::Xyz,
        1 => RotationOrder::Xzy,
        2 => RotationOrder::Yzx,
        3 => RotationOrder::Yxz,
        4 => RotationOrder::Zxy,
        5 => RotationOrder::Zyx,
        6 => RotationOrder::SphericXyz,
        _ => RotationOrder::Xyz,
    }
}

fn inherit_type_from_int(v: i64) -> InheritType {
    match v {
        1 => InheritType::NoScale,
        2 => InheritType::NoShear,
        _ => InheritType::Normal,
    }
}

pub fn read_models(top: &TopLevel, templates: &HashMap<String, Arc<Props>>, max_properties: usize) -> Vec<RawModel> {
    let mut out = Vec::new();
    for node in top.objects_of_kind("Model") {
        let id = object_id(node).unwrap_or_else(|| crate::readers::synthetic_id(node.name.as_str().as_ptr()));
        let name = object_name(node).to_string();
        let props = templates::build_props(Some(node), templates.get("Model").cloned(), max_properties);

        let pivots = PivotChain {
            translation: props.find_vec3("Lcl Translation", Vec3::ZERO),
            rotation_offset: props.find_vec3("RotationOffset", Vec3::ZERO),
            rotation_pivot: props.find_vec3("RotationPivot", Vec3::ZERO),
            pre_rotation: props.find_vec3("PreRotation", Vec3::ZERO),
            rotation: props.find_vec3("Lcl Rotation", Vec3::ZERO),
            post_rotation: props.find_vec3("PostRotation", Vec3::ZERO),
            scaling_offset: props.find_vec3("ScalingOffset", Vec3::ZERO),
            scaling_pivot: props.find_vec3("ScalingPivot", Vec3::ZERO),
            scaling: props.find_vec3("Lcl Scaling", Vec3::ONE),
            rotation_order: rotation_order_from_int(props.find_real("RotationOrder", 0.0) as i64),
        };
        let inherit_type = inherit_type_from_int(props.find_real("InheritType", 0.0) as i64);
        let visibility = props.find_real("Visibility", 1.0);

        out.push(RawModel {
            id,
            name,
            rotation_order: pivots.rotation_order,
            props,
            pivots,
            inherit_type,
            visibility,
        });
    }
    out
}
