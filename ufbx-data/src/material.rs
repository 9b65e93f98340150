//! Material records (spec §3, end-to-end scenario §8.2).

use crate::props::Props;
use crate::strings::InternedStr;
use crate::transform::Vec3;
use ufbx_derive::Validate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ShadingModel {
    #[default]
    Unknown,
    Lambert,
    Phong,
    Pbr,
}

impl crate::validation::Validate for ShadingModel {}
impl crate::validation::Validate for Vec3 {}

#[derive(Clone, Debug, Validate)]
pub struct Material {
    pub name: InternedStr,
    pub shading_model: ShadingModel,
    pub props: Props,
    pub diffuse_color: Vec3,
    pub ambient_color: Vec3,
    pub specular_color: Vec3,
    pub emissive_color: Vec3,
    pub shininess: f64,
    pub opacity: f64,
}

impl Material {
    pub fn from_props(name: InternedStr, props: Props) -> Self {
        let diffuse_color = props.find_vec3("DiffuseColor", Vec3::new(0.8, 0.8, 0.8));
        let ambient_color = props.find_vec3("AmbientColor", Vec3::ZERO);
        let specular_color = props.find_vec3("SpecularColor", Vec3::new(1.0, 1.0, 1.0));
        let emissive_color = props.find_vec3("EmissiveColor", Vec3::ZERO);
        let shininess = props.find_real("Shininess", 20.0);
        let opacity = 1.0 - props.find_real("TransparencyFactor", 0.0);
        Material {
            name,
            shading_model: ShadingModel::Unknown,
            props,
            diffuse_color,
            ambient_color,
            specular_color,
            emissive_color,
            shininess,
            opacity,
        }
    }
}
