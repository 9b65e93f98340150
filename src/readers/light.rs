//! `NodeAttribute` reader for the `Light` subtype (spec §3).
//!
//! `NodeAttribute` nodes carry their concrete class (`"Light"`,
//! `"LimbNode"`, ...) as the third scalar value; [`crate::readers::deformer`]
//! and this module both filter the same `NodeAttribute` object list by
//! that tag rather than having a dedicated top-level section each.

use crate::templates;
use ufbx_data::light::{Light, LightType};
use ufbx_data::props::Props;
use ufbx_data::DomNode;

pub struct RawLight {
    pub id: i64,
    pub light: Light,
}

fn light_type_from_int(v: i64) -> LightType {
    match v {
        1 => LightType::Directional,
        2 => LightType::Spot,
        3 => LightType::Area,
        4 => LightType::Volume,
        _ => LightType::Point,
    }
}

pub fn read_light(id: i64, node: &DomNode, template: Option<std::sync::Arc<Props>>, max_properties: usize) -> RawLight {
    let props = templates::build_props(Some(node), template, max_properties);
    let mut light = Light::from_props(props);
    light.light_type = light_type_from_int(light.props.find_real("LightType", 0.0) as i64);
    light.cast_light = light.props.find_real("CastLight", 1.0) != 0.0;
    RawLight { id, light }
}
