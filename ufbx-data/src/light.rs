//! Light attribute records (spec §3, merged onto their owning `Model`'s
//! node header via `NodeKind::Light` per the connection resolver, §4.11).

use crate::props::Props;
use crate::transform::Vec3;
use ufbx_derive::Validate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Point,
    Directional,
    Spot,
    Area,
    Volume,
}

impl crate::validation::Validate for LightType {}

#[derive(Clone, Debug, Validate)]
pub struct Light {
    pub light_type: LightType,
    pub color: Vec3,
    pub intensity: f64,
    pub cast_light: bool,
    pub props: Props,
}

impl Light {
    pub fn from_props(props: Props) -> Self {
        let color = props.find_vec3("Color", Vec3::ONE);
        let intensity = props.find_real("Intensity", 100.0);
        Light {
            light_type: LightType::Point,
            color,
            intensity,
            cast_light: true,
            props,
        }
    }
}
