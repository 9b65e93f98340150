//! Mesh geometry records (spec §3 "Scene elements", §4.7).

use crate::index::Index;
use crate::material::Material;
use crate::skin::Skin;
use std::sync::Arc;
use ufbx_derive::Validate;

/// The two global sentinel buffers the reader returns to avoid per-mesh
/// allocation for the common "all-same"/"consecutive" index cases (spec
/// §4.7 point 5), collapsed into concrete buffers during finalization
/// (Design Note "Sentinel index buffers").
#[derive(Clone, Debug, PartialEq)]
pub enum IndexBuffer {
    /// Every logical slot maps to element 0.
    Zeros { len: usize },
    /// Slot `i` maps to element `i` (identity indexing, e.g. `ByPolygonVertex` direct).
    Consecutive { len: usize },
    /// A real, finalized index buffer.
    Owned(Arc<[i32]>),
}

impl IndexBuffer {
    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::Zeros { len } | IndexBuffer::Consecutive { len } => *len,
            IndexBuffer::Owned(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> i32 {
        match self {
            IndexBuffer::Zeros { .. } => 0,
            IndexBuffer::Consecutive { .. } => i as i32,
            IndexBuffer::Owned(v) => v[i],
        }
    }

    /// Materializes a sentinel into a real buffer sized to the discovered
    /// maximum (finalizer step, spec §4.12).
    pub fn materialize(&self) -> Arc<[i32]> {
        match self {
            IndexBuffer::Owned(v) => v.clone(),
            IndexBuffer::Zeros { len } => vec![0i32; *len].into(),
            IndexBuffer::Consecutive { len } => (0..*len as i32).collect::<Vec<_>>().into(),
        }
    }
}

impl Default for IndexBuffer {
    fn default() -> Self {
        IndexBuffer::Zeros { len: 0 }
    }
}

impl crate::validation::Validate for IndexBuffer {}

/// Mapping mode for a layer element (spec GLOSSARY).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MappingMode {
    #[default]
    ByPolygonVertex,
    ByVertex,
    ByPolygon,
    ByEdge,
    AllSame,
}

impl crate::validation::Validate for MappingMode {}

/// Reference mode for a layer element (spec GLOSSARY).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReferenceMode {
    #[default]
    Direct,
    IndexToDirect,
}

impl crate::validation::Validate for ReferenceMode {}

/// A per-attribute vertex stream: data, index, element count (spec §3
/// "a mesh owns ... per-attribute vertex streams (data + index + element count)").
#[derive(Clone, Debug, Validate)]
pub struct VertexAttribute<T> {
    pub values: Arc<[T]>,
    pub indices: IndexBuffer,
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
}

impl<T> crate::validation::Validate for Arc<[T]> {}

impl<T: Clone + Default> VertexAttribute<T> {
    pub fn empty() -> Self {
        VertexAttribute {
            values: Arc::from(Vec::new()),
            indices: IndexBuffer::default(),
            mapping: MappingMode::ByPolygonVertex,
            reference: ReferenceMode::Direct,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Negative-safe accessor: out-of-range indices (including the `-1`
    /// sentinel, spec §3 invariant 3) return a zero-filled fallback.
    ///
    /// `logical_index` is the polygon-vertex slot (an index into
    /// `Mesh::polygon_vertex_index`); `vertex_index` is that slot's
    /// resolved vertex-position index (`polygon_vertex_index[logical_index]`).
    /// Which one actually selects into `self.indices` depends on
    /// `self.mapping` (spec §4.7 point 3): `ByPolygonVertex` re-uses the
    /// polygon-vertex slot directly, `ByVertex` goes indirectly through the
    /// vertex-position index instead, and `AllSame` always resolves through
    /// the single shared slot 0. `ByPolygon`/`ByEdge` streams (materials,
    /// edge creases/smoothing) are read with their own per-face/per-edge
    /// index space rather than through this polygon-vertex accessor, so
    /// they fall back to `logical_index` here, matching the space their
    /// caller already indexes them in.
    pub fn get(&self, logical_index: usize, vertex_index: usize) -> T {
        let selector = match self.mapping {
            MappingMode::ByVertex => vertex_index,
            MappingMode::AllSame => 0,
            MappingMode::ByPolygonVertex | MappingMode::ByPolygon | MappingMode::ByEdge => logical_index,
        };
        let idx = self.indices.get(selector);
        if idx < 0 {
            return T::default();
        }
        self.values.get(idx as usize).cloned().unwrap_or_default()
    }

    /// Rewrites every out-of-range index (spec §4.7 point 4): to `-1`
    /// when `allow_nonexistent_indices` is set (paired with [`Self::get`]'s
    /// zero-fallback), or clamped to the last valid element otherwise
    /// ("safe-by-default"). A no-op for the `Zeros`/`Consecutive` sentinel
    /// variants, which are already in range by construction.
    pub fn clamp_indices(&mut self, allow_nonexistent_indices: bool) {
        let IndexBuffer::Owned(ref indices) = self.indices else { return };
        let num_elements = self.values.len() as i32;
        if num_elements == 0 {
            return;
        }
        let last = num_elements - 1;
        let mut out = indices.to_vec();
        for idx in out.iter_mut() {
            if *idx < 0 || *idx >= num_elements {
                *idx = if allow_nonexistent_indices { -1 } else { last };
            }
        }
        self.indices = IndexBuffer::Owned(Arc::from(out));
    }
}

/// A UV or color set, carrying its declared `index` field so consumer
/// ordering matches file order (spec §4.7 point 6, sorted by that field).
#[derive(Clone, Debug, Validate)]
pub struct NamedAttribute<T> {
    pub name: String,
    pub set_index: i32,
    pub attribute: VertexAttribute<T>,
}

/// One polygon face: a contiguous run in the flattened vertex-index array
/// (spec §3 invariant 7).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Validate)]
pub struct Face {
    pub index_begin: u32,
    pub num_indices: u32,
}

impl Face {
    pub fn is_triangle_fannable(&self) -> bool {
        self.num_indices >= 3
    }

    pub fn num_triangles(&self) -> u32 {
        self.num_indices.saturating_sub(2)
    }
}

/// One mesh edge: an index into `polygon_vertex_index` identifying the
/// edge's first endpoint within its polygon (spec §4.7 point 2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Validate)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
}

/// A skin binding reference attached to a mesh (spec §3, §4.11).
#[derive(Clone, Debug, Validate)]
pub struct SkinRef {
    pub skin: Index<Skin>,
}

#[derive(Clone, Debug, Default, Validate)]
pub struct Mesh {
    pub vertices: Arc<[[f64; 3]]>,
    /// Raw `PolygonVertexIndex` with the per-polygon terminal negated
    /// (spec §4.7 point 1); retained for edge/layer-element re-derivation.
    pub polygon_vertex_index: Arc<[i32]>,
    pub faces: Vec<Face>,
    /// Faces with `< 3` indices (points/lines/degenerate), tail-partitioned
    /// per spec §3 invariant 7.
    pub bad_faces: Vec<Face>,
    pub edges: Vec<Edge>,
    pub num_vertices: usize,
    pub num_indices: usize,
    pub num_triangles: usize,

    pub normals: VertexAttribute<[f64; 3]>,
    /// Binormal sets, each matched to the UV set occupying the same
    /// `Layer` slot (spec §4.7 point 6: "Binormals and tangents are
    /// matched to UV sets by scanning `Layer` records whose children
    /// identify `LayerElement*` by `(Type, TypedIndex)`"). `set_index`
    /// holds the matched UV set's `set_index` when a `Layer` record
    /// resolves the association, or the binormal's own declared index
    /// otherwise.
    pub binormals: Vec<NamedAttribute<[f64; 3]>>,
    /// Tangent sets, matched to UV sets the same way as `binormals`.
    pub tangents: Vec<NamedAttribute<[f64; 3]>>,
    pub vertex_crease: VertexAttribute<f64>,
    pub edge_crease: VertexAttribute<f64>,
    pub edge_smoothing: VertexAttribute<bool>,
    pub uv_sets: Vec<NamedAttribute<[f64; 2]>>,
    pub color_sets: Vec<NamedAttribute<[f64; 4]>>,

    /// `face_material[i]` is absent (no materials on this mesh) or in
    /// `[0, materials.len())` after finalizer clamping (spec invariant 2).
    pub face_material: Option<Vec<i32>>,
    pub materials: Vec<Index<Material>>,
    pub skins: Vec<SkinRef>,
}

impl crate::validation::Validate for [f64; 2] {}

impl Mesh {
    /// The resolved vertex position for logical polygon-vertex slot `i`
    /// (`vertices[polygon_vertex_index[i]]`), used by triangulation's
    /// shortest-diagonal heuristic (spec §6 `triangulate`).
    pub fn position_at(&self, logical_index: usize) -> [f64; 3] {
        let vertex = self.polygon_vertex_index[logical_index] as usize;
        self.vertices[vertex]
    }

    /// The vertex-position index backing logical polygon-vertex slot `i`
    /// (`polygon_vertex_index[i]`), the second selector
    /// [`VertexAttribute::get`]'s `ByVertex` mapping mode indexes through
    /// (spec §4.7 point 3).
    pub fn vertex_index_at(&self, logical_index: usize) -> usize {
        self.polygon_vertex_index[logical_index] as usize
    }

    /// Resolves `attribute`'s value for logical polygon-vertex slot `i`,
    /// dispatching through [`VertexAttribute::get`]'s mapping-aware
    /// selector (spec §4.7 point 3).
    pub fn attribute_at<T: Clone + Default>(&self, attribute: &VertexAttribute<T>, logical_index: usize) -> T {
        attribute.get(logical_index, self.vertex_index_at(logical_index))
    }

    /// The resolved normal for logical polygon-vertex slot `i`.
    pub fn normal_at(&self, logical_index: usize) -> [f64; 3] {
        self.attribute_at(&self.normals, logical_index)
    }

    /// The resolved UV for logical polygon-vertex slot `i`, in UV set `set`.
    pub fn uv_at(&self, set: &NamedAttribute<[f64; 2]>, logical_index: usize) -> [f64; 2] {
        self.attribute_at(&set.attribute, logical_index)
    }

    /// Spec §3 invariant 2 / §4.12: clamp (or drop) `face_material`.
    pub fn clamp_face_material(&mut self) {
        let num_materials = self.materials.len();
        match &mut self.face_material {
            Some(fm) if num_materials == 0 => {
                self.face_material = None;
                let _ = fm;
            }
            Some(fm) => {
                let last = (num_materials - 1) as i32;
                for m in fm.iter_mut() {
                    if *m < 0 || *m as usize >= num_materials {
                        *m = last;
                    }
                }
            }
            None => {}
        }
    }

    /// Applies [`VertexAttribute::clamp_indices`] to every attribute
    /// stream on this mesh (spec §4.7 point 4, run once in the finalizer
    /// once every layer element has been read).
    pub fn clamp_attribute_indices(&mut self, allow_nonexistent_indices: bool) {
        self.normals.clamp_indices(allow_nonexistent_indices);
        for binormal in &mut self.binormals {
            binormal.attribute.clamp_indices(allow_nonexistent_indices);
        }
        for tangent in &mut self.tangents {
            tangent.attribute.clamp_indices(allow_nonexistent_indices);
        }
        self.vertex_crease.clamp_indices(allow_nonexistent_indices);
        self.edge_crease.clamp_indices(allow_nonexistent_indices);
        self.edge_smoothing.clamp_indices(allow_nonexistent_indices);
        for uv in &mut self.uv_sets {
            uv.attribute.clamp_indices(allow_nonexistent_indices);
        }
        for color in &mut self.color_sets {
            color.attribute.clamp_indices(allow_nonexistent_indices);
        }
    }
}
