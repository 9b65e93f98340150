//! `Geometry` reader (spec §4.7): vertex positions, polygon topology,
//! edges, and layer elements (normals/UV/colors/creases/materials).

use std::collections::HashMap;
use std::sync::Arc;
use ufbx_data::mesh::{
    Edge, Face, IndexBuffer, MappingMode, Mesh, NamedAttribute, ReferenceMode, VertexAttribute,
};
use ufbx_data::{DomArray, DomNode};

pub struct RawMesh {
    pub id: i64,
    pub mesh: Mesh,
}

fn mapping_mode(s: &str) -> MappingMode {
    match s {
        "ByVertex" | "ByVertice" => MappingMode::ByVertex,
        "ByPolygon" => MappingMode::ByPolygon,
        "ByEdge" => MappingMode::ByEdge,
        "AllSame" => MappingMode::AllSame,
        _ => MappingMode::ByPolygonVertex,
    }
}

fn reference_mode(s: &str) -> ReferenceMode {
    match s {
        "IndexToDirect" => ReferenceMode::IndexToDirect,
        _ => ReferenceMode::Direct,
    }
}

fn node_str_child(node: &DomNode, name: &str) -> String {
    node.find_child(name)
        .and_then(|c| c.scalars().first())
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Decodes `PolygonVertexIndex` (spec §4.7 point 1): each polygon's final
/// vertex index is bitwise-negated (`~x`) on the wire to mark the end of
/// the run. Returns the resolved (always non-negative) indices alongside
/// the face table and the tail-partitioned degenerate (`< 3` indices)
/// faces (spec invariant 7).
fn decode_faces(raw: &[i32]) -> (Vec<i32>, Vec<Face>, Vec<Face>) {
    let mut resolved = Vec::with_capacity(raw.len());
    let mut faces = Vec::new();
    let mut bad_faces = Vec::new();
    let mut face_begin = 0u32;

    for (i, &v) in raw.iter().enumerate() {
        let is_end = v < 0;
        let actual = if is_end { !v } else { v };
        resolved.push(actual);
        if is_end {
            let end = i as u32 + 1;
            let face = Face { index_begin: face_begin, num_indices: end - face_begin };
            if face.num_indices < 3 {
                bad_faces.push(face);
            } else {
                faces.push(face);
            }
            face_begin = end;
        }
    }
    (resolved, faces, bad_faces)
}

/// Resolves an `Edges` array entry (an index into `polygon_vertex_index`)
/// into the `{a, b}` endpoint pair, `b` being the next vertex position in
/// the same polygon, wrapping at the polygon's end (spec §4.7 point 2).
fn resolve_edges(raw_edges: &[i32], faces: &[Face]) -> Vec<Edge> {
    raw_edges
        .iter()
        .map(|&pos| {
            let pos = pos as u32;
            let face = faces
                .iter()
                .find(|f| pos >= f.index_begin && pos < f.index_begin + f.num_indices);
            let b = match face {
                Some(f) => {
                    let local = pos - f.index_begin;
                    f.index_begin + (local + 1) % f.num_indices
                }
                None => pos,
            };
            Edge { a: pos, b }
        })
        .collect()
}

/// Builds the index buffer backing a `VertexAttribute` when no index array
/// was present on the wire (`Direct` reference mode): `mapping` only picks
/// the *sentinel shape* here (`AllSame` shares one zero slot; anything else
/// is identity-indexed), never the selector space consulted to resolve a
/// value — that dispatch happens later, per logical polygon-vertex slot, in
/// [`ufbx_data::mesh::VertexAttribute::get`] (spec §4.7 point 3).
fn build_index_buffer(indices: Option<&DomArray>, mapping: MappingMode, len_hint: usize) -> IndexBuffer {
    match indices {
        Some(arr) => IndexBuffer::Owned(arr.as_i64_vec().into_iter().map(|v| v as i32).collect()),
        None if mapping == MappingMode::AllSame => IndexBuffer::Zeros { len: len_hint },
        None => IndexBuffer::Consecutive { len: len_hint },
    }
}

/// Scans a `Geometry` node's `Layer` records into one `{LayerElement type
/// name -> TypedIndex}` map per `Layer` slot (spec §4.7 point 6): each
/// `Layer` groups the `LayerElement*` blocks that share a rendering slot
/// via a nested `LayerElement { Type: "...", TypedIndex: N }` child.
fn read_layer_slots(node: &DomNode) -> Vec<HashMap<String, i64>> {
    node.find_children("Layer")
        .map(|layer| {
            layer
                .find_children("LayerElement")
                .filter_map(|elem| {
                    let ty = elem.find_child("Type").and_then(|n| n.scalars().first()).and_then(|v| v.as_str())?;
                    let idx = elem.find_child("TypedIndex").and_then(|n| n.scalars().first()).and_then(|v| v.as_i64())?;
                    Some((ty.to_string(), idx))
                })
                .collect()
        })
        .collect()
}

/// Resolves the UV set `set_index` a `kind` (`"LayerElementTangent"`/
/// `"LayerElementBinormal"`) entry with the wire's own `typed_index`
/// belongs to, by finding the `Layer` slot that names both that entry and
/// a `LayerElementUV` entry (spec §4.7 point 6). Falls back to the
/// binormal/tangent's own declared index when no `Layer` record resolves
/// the association (e.g. a minimal file with no `Layer` section at all).
fn match_uv_set_index(slots: &[HashMap<String, i64>], kind: &str, typed_index: i32) -> i32 {
    slots
        .iter()
        .find(|slot| slot.get(kind) == Some(&(typed_index as i64)))
        .and_then(|slot| slot.get("LayerElementUV"))
        .map(|&i| i as i32)
        .unwrap_or(typed_index)
}

fn read_vec_attribute<const N: usize>(
    layer_node: &DomNode,
    data_name: &str,
    index_name: &str,
    num_polygon_vertices: usize,
) -> VertexAttribute<[f64; N]> {
    let Some(data_node) = layer_node.find_child(data_name) else {
        return VertexAttribute::empty();
    };
    let Some(array) = data_node.array() else {
        return VertexAttribute::empty();
    };
    let flat = array.as_f64_vec();
    let values: Arc<[[f64; N]]> = flat
        .chunks_exact(N)
        .map(|c| {
            let mut v = [0.0; N];
            v.copy_from_slice(c);
            v
        })
        .collect::<Vec<_>>()
        .into();

    let mapping = mapping_mode(&node_str_child(layer_node, "MappingInformationType"));
    let reference = reference_mode(&node_str_child(layer_node, "ReferenceInformationType"));
    let index_array = layer_node.find_child(index_name).and_then(|n| n.array());
    let indices = build_index_buffer(index_array, mapping, num_polygon_vertices);

    VertexAttribute { values, indices, mapping, reference }
}

fn read_scalar_attribute(
    layer_node: &DomNode,
    data_name: &str,
    num_polygon_vertices: usize,
) -> VertexAttribute<f64> {
    let Some(data_node) = layer_node.find_child(data_name) else {
        return VertexAttribute::empty();
    };
    let Some(array) = data_node.array() else {
        return VertexAttribute::empty();
    };
    let values: Arc<[f64]> = array.as_f64_vec().into();
    let mapping = mapping_mode(&node_str_child(layer_node, "MappingInformationType"));
    let reference = reference_mode(&node_str_child(layer_node, "ReferenceInformationType"));
    VertexAttribute { values, indices: IndexBuffer::Consecutive { len: num_polygon_vertices }, mapping, reference }
}

/// Reads one `Geometry` node into a [`Mesh`] (spec §4.7). Takes the node
/// directly (rather than iterating internally) so [`crate::connect`] can
/// drive the id bookkeeping once for every object kind uniformly.
pub fn read_mesh(node: &DomNode) -> Mesh {
    let vertices_flat = node
        .find_child("Vertices")
        .and_then(|n| n.array())
        .map(|a| a.as_f64_vec())
        .unwrap_or_default();
    let vertices: Arc<[[f64; 3]]> = vertices_flat
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect::<Vec<_>>()
        .into();

    let raw_pvi = node
        .find_child("PolygonVertexIndex")
        .and_then(|n| n.array())
        .map(|a| a.as_i64_vec())
        .unwrap_or_default();
    let raw_pvi: Vec<i32> = raw_pvi.into_iter().map(|v| v as i32).collect();
    let (polygon_vertex_index, faces, bad_faces) = decode_faces(&raw_pvi);
    let num_indices = polygon_vertex_index.len();
    let num_triangles = faces.iter().map(|f| f.num_triangles() as usize).sum();

    let raw_edges = node
        .find_child("Edges")
        .and_then(|n| n.array())
        .map(|a| a.as_i64_vec())
        .unwrap_or_default();
    let raw_edges: Vec<i32> = raw_edges.into_iter().map(|v| v as i32).collect();
    let edges = resolve_edges(&raw_edges, &faces);

    let mut normals = VertexAttribute::empty();
    let mut raw_binormals: Vec<(i32, VertexAttribute<[f64; 3]>)> = Vec::new();
    let mut raw_tangents: Vec<(i32, VertexAttribute<[f64; 3]>)> = Vec::new();
    let mut vertex_crease = VertexAttribute::empty();
    let mut edge_crease = VertexAttribute::empty();
    let mut edge_smoothing = VertexAttribute::empty();
    let mut uv_sets = Vec::new();
    let mut color_sets = Vec::new();
    let mut face_material: Option<Vec<i32>> = None;

    for layer in &node.children {
        match layer.name.as_str() {
            "LayerElementNormal" => normals = read_vec_attribute::<3>(layer, "Normals", "NormalsIndex", num_indices),
            "LayerElementBinormal" => {
                let typed_index = layer.scalars().first().and_then(|v| v.as_i64()).unwrap_or(0) as i32;
                raw_binormals.push((typed_index, read_vec_attribute::<3>(layer, "Binormals", "BinormalsIndex", num_indices)));
            }
            "LayerElementTangent" => {
                let typed_index = layer.scalars().first().and_then(|v| v.as_i64()).unwrap_or(0) as i32;
                raw_tangents.push((typed_index, read_vec_attribute::<3>(layer, "Tangents", "TangentsIndex", num_indices)));
            }
            "LayerElementVertexCrease" => vertex_crease = read_scalar_attribute(layer, "VertexCrease", vertices.len()),
            "LayerElementEdgeCrease" => edge_crease = read_scalar_attribute(layer, "EdgeCrease", edges.len()),
            "LayerElementSmoothing" => {
                let raw = layer.find_child("Smoothing").and_then(|n| n.array()).map(|a| a.as_i64_vec()).unwrap_or_default();
                let values: Arc<[bool]> = raw.iter().map(|&v| v != 0).collect::<Vec<_>>().into();
                let mapping = mapping_mode(&node_str_child(layer, "MappingInformationType"));
                edge_smoothing = VertexAttribute { values, indices: IndexBuffer::Consecutive { len: edges.len() }, mapping, reference: ReferenceMode::Direct };
            }
            "LayerElementUV" => {
                let set_index = layer.scalars().first().and_then(|v| v.as_i64()).unwrap_or(0) as i32;
                let name = node_str_child(layer, "Name");
                let attribute = read_vec_attribute::<2>(layer, "UV", "UVIndex", num_indices);
                uv_sets.push(NamedAttribute { name, set_index, attribute });
            }
            "LayerElementColor" => {
                let set_index = layer.scalars().first().and_then(|v| v.as_i64()).unwrap_or(0) as i32;
                let name = node_str_child(layer, "Name");
                let attribute = read_vec_attribute::<4>(layer, "Colors", "ColorIndex", num_indices);
                color_sets.push(NamedAttribute { name, set_index, attribute });
            }
            "LayerElementMaterial" => {
                let raw = layer.find_child("Materials").and_then(|n| n.array()).map(|a| a.as_i64_vec()).unwrap_or_default();
                let mapping = mapping_mode(&node_str_child(layer, "MappingInformationType"));
                face_material = Some(match mapping {
                    MappingMode::AllSame => vec![raw.first().copied().unwrap_or(0) as i32; faces.len()],
                    _ => raw.iter().map(|&v| v as i32).collect(),
                });
            }
            _ => {}
        }
    }
    uv_sets.sort_by_key(|a| a.set_index);
    color_sets.sort_by_key(|a| a.set_index);

    // Match binormals/tangents to the UV set occupying the same `Layer`
    // slot (spec §4.7 point 6).
    let layer_slots = read_layer_slots(node);
    let uv_name_for = |set_index: i32| uv_sets.iter().find(|u| u.set_index == set_index).map(|u| u.name.clone()).unwrap_or_default();
    let mut binormals: Vec<NamedAttribute<[f64; 3]>> = raw_binormals
        .into_iter()
        .map(|(typed_index, attribute)| {
            let set_index = match_uv_set_index(&layer_slots, "LayerElementBinormal", typed_index);
            NamedAttribute { name: uv_name_for(set_index), set_index, attribute }
        })
        .collect();
    let mut tangents: Vec<NamedAttribute<[f64; 3]>> = raw_tangents
        .into_iter()
        .map(|(typed_index, attribute)| {
            let set_index = match_uv_set_index(&layer_slots, "LayerElementTangent", typed_index);
            NamedAttribute { name: uv_name_for(set_index), set_index, attribute }
        })
        .collect();
    binormals.sort_by_key(|a| a.set_index);
    tangents.sort_by_key(|a| a.set_index);

    Mesh {
        num_vertices: vertices.len(),
        vertices,
        polygon_vertex_index: Arc::from(polygon_vertex_index),
        faces,
        bad_faces,
        edges,
        num_indices,
        num_triangles,
        normals,
        binormals,
        tangents,
        vertex_crease,
        edge_crease,
        edge_smoothing,
        uv_sets,
        color_sets,
        face_material,
        materials: Vec::new(),
        skins: Vec::new(),
    }
}
