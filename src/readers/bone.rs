//! `NodeAttribute` reader for the `LimbNode` subtype (spec §3).

use crate::templates;
use ufbx_data::bone::Bone;
use ufbx_data::props::Props;
use ufbx_data::DomNode;

pub struct RawBone {
    pub id: i64,
    pub bone: Bone,
}

pub fn read_bone(id: i64, node: &DomNode, template: Option<std::sync::Arc<Props>>, max_properties: usize) -> RawBone {
    let props = templates::build_props(Some(node), template, max_properties);
    RawBone { id, bone: Bone::from_props(props) }
}
