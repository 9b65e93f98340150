//! The common `Node` header shared by `Model`/`Mesh`/`Light`/`Bone` (spec
//! §3 "Scene elements") and the top-level element kind tag.

use crate::index::{ElementId, Index};
use crate::props::Props;
use crate::strings::InternedStr;
use crate::transform::{InheritType, Matrix4, PivotChain, RotationOrder, Transform};
use ufbx_derive::Validate;

use crate::bone::Bone;
use crate::light::Light;
use crate::mesh::Mesh;

/// Which concrete record a [`SceneNode`] wraps. Attribute-only kinds
/// (`NodeAttribute`) never appear here: their properties are merged into
/// the owning node during connection resolution (spec §4.11) and the
/// `Attribute` record itself does not survive into the result scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Model,
    Mesh(Index<Mesh>),
    Light(Index<Light>),
    Bone(Index<Bone>),
}

impl crate::validation::Validate for NodeKind {
    fn validate_minimally<P, R>(&self, root: &crate::Root, path: P, report: &mut R)
    where
        P: Fn() -> crate::Path,
        R: FnMut(&dyn Fn() -> crate::Path, crate::validation::Error),
    {
        match self {
            NodeKind::Model => {}
            NodeKind::Mesh(i) => i.validate_minimally(root, path, report),
            NodeKind::Light(i) => i.validate_minimally(root, path, report),
            NodeKind::Bone(i) => i.validate_minimally(root, path, report),
        }
    }
}

/// The `Model`/`Mesh`/`Light`/`Bone` common header (spec §3): name,
/// properties, parent pointer, inherit type, local transform, world
/// transform, `to_parent`/`to_root` matrices, and children list.
///
/// Pointer fields from the original (`parent`, `children[]`) become
/// `Index<SceneNode>` per Design Note "Pointer-graph, cyclic references".
#[derive(Clone, Debug, Validate)]
pub struct SceneNode {
    pub id: ElementId,
    pub name: InternedStr,
    pub props: Props,
    pub kind: NodeKind,
    pub parent: Option<Index<SceneNode>>,
    pub children: Vec<Index<SceneNode>>,
    pub inherit_type: InheritType,
    pub rotation_order: RotationOrder,
    /// Property-derived TRS and pivot offsets feeding [`Self::local_transform`]
    /// / [`Self::to_parent`]. Kept alongside the composed forms so animated
    /// evaluation can re-substitute the animatable fields and recompose
    /// without re-reading the source properties.
    pub base_pivots: PivotChain,
    /// Decomposed local TRS, kept alongside the composed matrices (the
    /// dual representation `SPEC_FULL` calls out, §"Supplemental features").
    pub local_transform: Transform,
    pub to_parent: Matrix4,
    pub to_root: Matrix4,
    pub world_transform: Transform,
    pub visibility: f64,
}

impl SceneNode {
    pub fn new_model(id: ElementId, name: InternedStr, props: Props) -> Self {
        SceneNode {
            id,
            name,
            props,
            kind: NodeKind::Model,
            parent: None,
            children: Vec::new(),
            inherit_type: InheritType::Normal,
            rotation_order: RotationOrder::Xyz,
            base_pivots: PivotChain::default(),
            local_transform: Transform::IDENTITY,
            to_parent: Matrix4::IDENTITY,
            to_root: Matrix4::IDENTITY,
            world_transform: Transform::IDENTITY,
            visibility: 1.0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
