//! Top-level section scheduler (spec §4.2 "Toplevel scheduler").
//!
//! A binary or ASCII file's root is a flat list of section nodes
//! (`FBXHeaderExtension`, `Documents`, `Definitions`, `Objects`,
//! `Connections`, `Takes`, `GlobalSettings`, ...). This module picks each
//! section out by name once so the rest of the pipeline can address them
//! directly instead of re-scanning the top-level list.

use ufbx_data::DomNode;

pub struct TopLevel<'a> {
    pub nodes: &'a [DomNode],
}

impl<'a> TopLevel<'a> {
    pub fn new(nodes: &'a [DomNode]) -> Self {
        TopLevel { nodes }
    }

    fn find(&self, name: &str) -> Option<&'a DomNode> {
        self.nodes.iter().find(|n| n.name.as_str() == name)
    }

    pub fn header_extension(&self) -> Option<&'a DomNode> {
        self.find("FBXHeaderExtension")
    }

    pub fn global_settings(&self) -> Option<&'a DomNode> {
        self.find("GlobalSettings")
    }

    pub fn definitions(&self) -> Option<&'a DomNode> {
        self.find("Definitions")
    }

    pub fn objects(&self) -> Option<&'a DomNode> {
        self.find("Objects")
    }

    pub fn connections(&self) -> Option<&'a DomNode> {
        self.find("Connections")
    }

    /// Pre-7000 animation data; absent in post-7000 files (spec §4.10.2).
    pub fn takes(&self) -> Vec<&'a DomNode> {
        self.find("Takes").map(|t| t.find_children("Take").collect()).unwrap_or_default()
    }

    pub fn creator(&self) -> Option<&'a str> {
        self.header_extension()?.find_child("Creator")?.scalars().first()?.as_str()
    }

    /// Objects of a given top-level kind (`"Model"`, `"Geometry"`,
    /// `"Material"`, `"NodeAttribute"`, `"Deformer"`, `"AnimationStack"`,
    /// `"AnimationLayer"`, `"AnimationCurveNode"`, `"AnimationCurve"`),
    /// each tagged with its 64-bit object id from the first scalar value
    /// (post-7000) or `None` (pre-7000, where ids are synthesized by the
    /// connection resolver from the interned name instead, spec §4.11).
    pub fn objects_of_kind(&self, kind: &str) -> impl Iterator<Item = &'a DomNode> + 'a {
        self.objects()
            .into_iter()
            .flat_map(move |o| o.find_children(kind))
    }
}

/// Post-7000 object id: the node's first scalar value, an `i64`. Returns
/// `None` for pre-7000 files, where `Model`/`Geometry`/... nodes carry a
/// name/type pair instead of a numeric id.
pub fn object_id(node: &DomNode) -> Option<i64> {
    node.scalars().first().and_then(|v| v.as_i64())
}

/// The object's own name, which post-7000 is the second scalar
/// (`"Name::Type"` split on `"::"`, already separated by the wire format
/// into just the name portion here) and pre-7000 is the first.
pub fn object_name(node: &DomNode) -> &str {
    for v in node.scalars() {
        if let Some(s) = v.as_str() {
            // Binary post-7000 encodes "Model::Name" as the raw string;
            // strip the FBX SDK's null-separated type tag if present.
            return s.split("\u{0}\u{1}").next().unwrap_or(s);
        }
    }
    ""
}
