//! Property template / defaults chain (spec §4.8).
//!
//! `Definitions` holds one `ObjectType <kind>` block per FBX object kind,
//! each with zero-or-one `PropertyTemplate <sub_type>` child. Every
//! object's own `Properties70` bag chains to its type's template (when
//! one exists) which in turn chains to the process-global
//! [`ufbx_data::props::default_props`], matching the lookup order spec
//! §4.8 describes: object override -> template default -> global default.

use std::collections::HashMap;
use std::sync::Arc;
use ufbx_data::props::{default_props, Property, PropertyType, PropertyValue, Props};
use ufbx_data::strings::InternedStr;
use ufbx_data::transform::Vec3;
use ufbx_data::{DomNode, ScalarValue};

/// Maps the `P` row's type-name column to a [`PropertyType`]/value shape.
/// Spec §4.8 only says "type tag" without enumerating the strings; the
/// set below is the standard FBX SDK vocabulary (compound/object
/// references fall through to `Compound`/`None` since they're resolved
/// by the connection pass, not stored as a scalar here).
fn classify_type(type_name: &str) -> PropertyType {
    match type_name {
        "Vector3D" | "Vector" | "Lcl Translation" | "Lcl Rotation" | "Lcl Scaling" => {
            PropertyType::Vector
        }
        "ColorRGB" => PropertyType::ColorRgb,
        "Color" => PropertyType::Color,
        "Number" | "double" | "Real" | "Float" => PropertyType::Number,
        "int" | "Integer" | "Byte" | "enum" => PropertyType::Integer,
        "bool" | "Bool" => PropertyType::Boolean,
        "KString" | "KStringUUID" | "URL" | "DateTime" | "XRefUrl" => PropertyType::String,
        "Compound" | "object" | "Reference" => PropertyType::Compound,
        _ => PropertyType::Unknown,
    }
}

/// Parses one `P` row: `Name, type, subtype, flags, value...` (spec §4.8;
/// value arity depends on `type`: 3 reals for a vector/color, 1 for a
/// scalar, 1 string literal for `KString`).
fn parse_property_row(row: &[ScalarValue]) -> Option<Property> {
    let name = row.first()?.as_str()?;
    let type_name = row.get(1).and_then(|v| v.as_str()).unwrap_or("");
    let prop_type = classify_type(type_name);

    let name = InternedStr::new(Arc::from(name));
    let value = match prop_type {
        PropertyType::Vector | PropertyType::Color | PropertyType::ColorRgb => {
            let x = row.get(4).and_then(|v| v.as_f64()).unwrap_or(0.0);
            let y = row.get(5).and_then(|v| v.as_f64()).unwrap_or(0.0);
            let z = row.get(6).and_then(|v| v.as_f64()).unwrap_or(0.0);
            PropertyValue::Vec3(Vec3::new(x, y, z))
        }
        PropertyType::Number => PropertyValue::Real(row.get(4).and_then(|v| v.as_f64()).unwrap_or(0.0)),
        PropertyType::Integer | PropertyType::Boolean | PropertyType::Enum => {
            PropertyValue::Int(row.get(4).and_then(|v| v.as_i64()).unwrap_or(0))
        }
        PropertyType::String => match row.get(4) {
            Some(ScalarValue::String(s)) => PropertyValue::Str(s.clone()),
            _ => PropertyValue::None,
        },
        _ => {
            // Unknown/compound: still capture a best-effort scalar so a
            // lookup doesn't silently miss the property, matching the
            // original's leniency toward vendor-specific property types.
            match row.get(4) {
                Some(v) if v.as_f64().is_some() => PropertyValue::Real(v.as_f64().unwrap()),
                Some(ScalarValue::String(s)) => PropertyValue::Str(s.clone()),
                _ => PropertyValue::None,
            }
        }
    };

    Some(Property::new(name, prop_type, value))
}

/// Reads every `P` child of a `Properties70` node into a flat property
/// list (unsorted; callers hand this to [`Props::new`], which sorts and
/// dedups per spec §4.8). Truncated to `max_properties` rows (spec §7
/// "Allocation" cap on a single object's property bag).
pub fn parse_properties70(properties_node: &DomNode, max_properties: usize) -> Vec<Property> {
    properties_node
        .find_children("P")
        .filter_map(|p| parse_property_row(p.scalars()))
        .take(max_properties)
        .collect()
}

/// Builds `Props` for an object from its own `Properties70` node (if any)
/// plus the template defaults chain for its type.
pub fn build_props(object_node: Option<&DomNode>, template: Option<Arc<Props>>, max_properties: usize) -> Props {
    let defaults = template.or_else(|| Some(default_props().clone()));
    let own = object_node
        .and_then(|n| n.find_child("Properties70"))
        .map(|n| parse_properties70(n, max_properties))
        .unwrap_or_default();
    let mut props = Props::new(own, defaults);
    props.strip_defaults();
    props
}

/// Three-way merge of an attribute's properties onto its owning node (spec
/// §4.11 "Attribute property bags are merged into their node's props via a
/// three-way merge (attribute defaults, node defaults, node overrides) and
/// then default-stripped"). Grounded on `original_source/`'s
/// `ufbxi_merge_attribute_properties`: node entries and attribute entries
/// are combined with the *later* entry in [`ufbx_data::props::sort_dedup`]'s
/// collision rule winning, which here means attribute-only properties
/// (e.g. a light's `Color`/`Intensity`) land on the node while any property
/// the node already overrides explicitly is preserved, then the result is
/// stripped back down against the node's own defaults chain.
pub fn merge_attribute_props(node: &Props, attr: &Props) -> Props {
    // `Props::new` -> `sort_dedup` keeps the *later* duplicate on a key
    // collision, so the attribute's properties go first and the node's own
    // explicit overrides, appended last, win.
    let mut merged = attr.props.clone();
    merged.extend(node.props.iter().cloned());
    let mut props = Props::new(merged, node.defaults.clone());
    props.strip_defaults();
    props
}

/// `object_type -> template props`, keyed by the FBX type name
/// (`"Model"`, `"Mesh"`, `"Material"`, ...). Each template chains to the
/// global defaults so a lookup that misses the template still resolves
/// (spec §4.8).
pub fn build_templates(definitions: Option<&DomNode>, max_properties: usize) -> HashMap<String, Arc<Props>> {
    let mut templates = HashMap::new();
    let Some(definitions) = definitions else { return templates };

    for object_type in definitions.find_children("ObjectType") {
        let Some(ScalarValue::String(kind)) = object_type.scalars().first() else {
            continue;
        };
        let Some(template_node) = object_type.find_child("PropertyTemplate") else {
            continue;
        };
        let props = template_node
            .find_child("Properties70")
            .map(|n| parse_properties70(n, max_properties))
            .unwrap_or_default();
        let resolved = Props::new(props, Some(default_props().clone()));
        templates.insert(kind.as_str().to_string(), Arc::new(resolved));
    }

    templates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_scalar(s: &str) -> ScalarValue {
        ScalarValue::String(InternedStr::new(Arc::from(s)))
    }

    #[test]
    fn parses_vector_property_row() {
        let row = vec![
            string_scalar("Lcl Translation"),
            string_scalar("Lcl Translation"),
            string_scalar(""),
            string_scalar("A"),
            ScalarValue::F64(1.0),
            ScalarValue::F64(2.0),
            ScalarValue::F64(3.0),
        ];
        let prop = parse_property_row(&row).unwrap();
        assert_eq!(Some(Vec3::new(1.0, 2.0, 3.0)), prop.value.as_vec3());
    }

    #[test]
    fn parses_number_property_row() {
        let row = vec![
            string_scalar("Intensity"),
            string_scalar("Number"),
            string_scalar(""),
            string_scalar("A"),
            ScalarValue::F64(75.0),
        ];
        let prop = parse_property_row(&row).unwrap();
        assert_eq!(Some(75.0), prop.value.as_f64());
    }

    #[test]
    fn merge_attribute_props_keeps_node_override_and_adds_attribute_only() {
        let node = Props::new(
            vec![Property::new(InternedStr::new(Arc::from("Visibility")), PropertyType::Number, PropertyValue::Real(0.0))],
            None,
        );
        let attr = Props::new(
            vec![
                Property::new(InternedStr::new(Arc::from("Intensity")), PropertyType::Number, PropertyValue::Real(75.0)),
                Property::new(InternedStr::new(Arc::from("Visibility")), PropertyType::Number, PropertyValue::Real(1.0)),
            ],
            None,
        );
        let merged = merge_attribute_props(&node, &attr);
        assert_eq!(0.0, merged.find_real("Visibility", -1.0));
        assert_eq!(75.0, merged.find_real("Intensity", -1.0));
    }
}
