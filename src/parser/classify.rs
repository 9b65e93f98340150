//! Context-driven array classification (spec §4.6.1): the mechanism that
//! lets the binary and ASCII front-ends share one semantic tree even
//! though only one of the two syntaxes marks arrays explicitly.
//!
//! Both parsers track the nearest interesting ancestor as a
//! [`ParseState`] and, before parsing a node's values, ask
//! [`classify`] whether `(state, node_name)` names a known array slot.
//! When it does, the node's values are read as one homogeneous array of
//! the given [`ArrayType`], optionally padded at the front so index `-1`
//! resolves to valid (zeroed) data — the safety net spec §4.7 point 4
//! and point 5 build on.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseState {
    TopLevel,
    Objects,
    Geometry,
    Model,
    Deformer,
    SubDeformer,
    AnimationCurve,
    AnimationCurveNode,
    LayerElement,
    Take,
    TakeObject,
    Channel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayType {
    Bool,
    I32,
    I64,
    F32,
    F64,
    Byte,
}

#[derive(Clone, Copy, Debug)]
pub struct ArrayInfo {
    pub type_code: ArrayType,
    /// Elements of leading zero padding so index `-1` is valid (spec
    /// §4.7 point 4).
    pub pad_begin: usize,
}

/// `(parent_state, node_name) -> ArrayInfo`, shared by both front-ends.
///
/// `pad_begin` is always 0: an earlier revision prepended raw scalars to
/// the wire array so a `-1` sentinel index would land on zeroed data, but
/// that padding is counted in scalars while several of these arrays group
/// into vec2/vec3/vec4 tuples downstream, so a fixed 4-scalar pad misaligns
/// every later group. [`ufbx_data::mesh::VertexAttribute::get`] already
/// returns a zeroed default for negative/out-of-range indices at read
/// time, which is the mechanism spec §4.7 point 4 actually needs, so the
/// field is kept (for array kinds that may want it later) but unused here.
pub fn classify(state: ParseState, name: &str) -> Option<ArrayInfo> {
    let f64arr = ArrayInfo { type_code: ArrayType::F64, pad_begin: 0 };
    let i32arr = ArrayInfo { type_code: ArrayType::I32, pad_begin: 0 };

    match (state, name) {
        (ParseState::Geometry, "Vertices") => Some(f64arr),
        (ParseState::Geometry, "PolygonVertexIndex") => Some(i32arr),
        (ParseState::Geometry, "Edges") => Some(i32arr),

        (ParseState::LayerElement, "Normals") => Some(f64arr),
        (ParseState::LayerElement, "Binormals") => Some(f64arr),
        (ParseState::LayerElement, "Tangents") => Some(f64arr),
        (ParseState::LayerElement, "UV") => Some(f64arr),
        (ParseState::LayerElement, "Colors") => Some(f64arr),
        (ParseState::LayerElement, "VertexCrease") => Some(f64arr),
        (ParseState::LayerElement, "EdgeCrease") => Some(f64arr),
        (ParseState::LayerElement, "Smoothing") => Some(i32arr),
        (ParseState::LayerElement, "Materials") => Some(i32arr),
        (ParseState::LayerElement, "NormalsIndex") => Some(i32arr),
        (ParseState::LayerElement, "BinormalsIndex") => Some(i32arr),
        (ParseState::LayerElement, "TangentsIndex") => Some(i32arr),
        (ParseState::LayerElement, "UVIndex") => Some(i32arr),
        (ParseState::LayerElement, "ColorIndex") => Some(i32arr),

        (ParseState::Deformer, "Indexes") => Some(i32arr),
        (ParseState::Deformer, "Weights") => Some(f64arr),
        (ParseState::SubDeformer, "Indexes") => Some(i32arr),
        (ParseState::SubDeformer, "Weights") => Some(f64arr),
        (ParseState::SubDeformer, "Transform") => Some(f64arr),
        (ParseState::SubDeformer, "TransformLink") => Some(f64arr),

        (ParseState::AnimationCurve, "KeyTime") => Some(ArrayInfo { type_code: ArrayType::I64, pad_begin: 0 }),
        (ParseState::AnimationCurve, "KeyValueFloat") => Some(f64arr),
        (ParseState::AnimationCurve, "KeyAttrFlags") => Some(i32arr),
        (ParseState::AnimationCurve, "KeyAttrDataFloat") => Some(f64arr),
        (ParseState::AnimationCurve, "KeyAttrRefCount") => Some(i32arr),

        (ParseState::Channel, "Key") => Some(f64arr),

        _ => None,
    }
}

/// The child-name transitions that move parsing into a new
/// [`ParseState`] (spec §4.6.1's "nearest interesting ancestor").
pub fn child_state(current: ParseState, child_name: &str) -> ParseState {
    match child_name {
        "Geometry" => ParseState::Geometry,
        "Model" => ParseState::Model,
        "Deformer" => ParseState::Deformer,
        "SubDeformer" => ParseState::SubDeformer,
        "AnimationCurveNode" => ParseState::AnimationCurveNode,
        "AnimationCurve" => ParseState::AnimationCurve,
        "LayerElementNormal" | "LayerElementBinormal" | "LayerElementTangent" | "LayerElementUV"
        | "LayerElementColor" | "LayerElementMaterial" | "LayerElementSmoothing"
        | "LayerElementVertexCrease" | "LayerElementEdgeCrease" => ParseState::LayerElement,
        "Take" => ParseState::Take,
        "Channel" => ParseState::Channel,
        "Objects" | "Connections" => ParseState::Objects,
        _ if current == ParseState::Take => ParseState::TakeObject,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_classify_as_f64_array() {
        let info = classify(ParseState::Geometry, "Vertices").unwrap();
        assert_eq!(ArrayType::F64, info.type_code);
        assert_eq!(0, info.pad_begin);
    }

    #[test]
    fn unknown_combination_is_scalar() {
        assert!(classify(ParseState::TopLevel, "Vertices").is_none());
        assert!(classify(ParseState::Geometry, "Properties70").is_none());
    }

    #[test]
    fn child_state_tracks_nearest_ancestor() {
        assert_eq!(ParseState::Geometry, child_state(ParseState::Objects, "Geometry"));
        assert_eq!(ParseState::LayerElement, child_state(ParseState::Geometry, "LayerElementUV"));
    }
}
