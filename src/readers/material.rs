//! `Material` reader (spec §3, end-to-end scenario §8.2).

use crate::templates;
use crate::toplevel::{object_id, object_name, TopLevel};
use std::collections::HashMap;
use std::sync::Arc;
use ufbx_data::material::Material;
use ufbx_data::props::Props;
use ufbx_data::strings::InternedStr;

pub struct RawMaterial {
    pub id: i64,
    pub material: Material,
}

pub fn read_materials(top: &TopLevel, templates: &HashMap<String, Arc<Props>>, max_properties: usize) -> Vec<RawMaterial> {
    let mut out = Vec::new();
    for node in top.objects_of_kind("Material") {
        let id = object_id(node).unwrap_or_else(|| crate::readers::synthetic_id(node.name.as_str().as_ptr()));
        let name = InternedStr::new(Arc::from(object_name(node)));
        let props = templates::build_props(Some(node), templates.get("Material").cloned(), max_properties);
        out.push(RawMaterial { id, material: Material::from_props(name, props) });
    }
    out
}
