//! Bone (`LimbNode`) attribute records (spec §3).

use crate::props::Props;
use ufbx_derive::Validate;

#[derive(Clone, Debug, Validate)]
pub struct Bone {
    pub radius: f64,
    pub relative_length: f64,
    pub props: Props,
}

impl Bone {
    pub fn from_props(props: Props) -> Self {
        let radius = props.find_real("Size", 100.0) * 0.01;
        let relative_length = props.find_real("LimbLength", 1.0);
        Bone { radius, relative_length, props }
    }
}
