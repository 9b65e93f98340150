//! Animation readers (spec §4.10): post-7000 `AnimationCurve`/
//! `AnimationLayer`/`AnimationStack`, and the pre-7000 `Take` compound
//! curve format, both producing the same [`AnimCurve`] shape.

use crate::toplevel::{object_id, object_name, TopLevel};
use ufbx_data::animation::{AnimCurve, AnimStack, Interpolation, KTime, Keyframe, KTIME_PER_SECOND};
use ufbx_data::strings::InternedStr;
use ufbx_data::DomNode;
use std::sync::Arc;

pub struct RawStack {
    pub id: i64,
    pub stack: AnimStack,
}

pub struct RawLayer {
    pub id: i64,
    pub name: String,
    pub weight: f64,
}

pub struct RawCurveNode {
    pub id: i64,
}

pub struct RawCurve {
    pub id: i64,
    pub curve: AnimCurve,
}

pub fn read_anim_stacks(top: &TopLevel, max_properties: usize) -> Vec<RawStack> {
    top.objects_of_kind("AnimationStack")
        .filter_map(|node| {
            let id = object_id(&node)?;
            let name = InternedStr::new(Arc::from(object_name(&node)));
            let props = crate::templates::build_props(Some(&node), None, max_properties);
            // `LocalStart`/`LocalStop` are stored as raw KTime ticks, not seconds.
            let time_begin = KTime(props.find_real("LocalStart", 0.0) as i64);
            let time_end = KTime(props.find_real("LocalStop", 0.0) as i64);
            Some(RawStack { id, stack: AnimStack { name, layers: Vec::new(), time_begin, time_end } })
        })
        .collect()
}

pub fn read_anim_layers(top: &TopLevel, max_properties: usize) -> Vec<RawLayer> {
    top.objects_of_kind("AnimationLayer")
        .filter_map(|node| {
            let id = object_id(&node)?;
            let name = object_name(&node).to_string();
            let props = crate::templates::build_props(Some(&node), None, max_properties);
            let weight = props.find_real("Weight", 100.0);
            Some(RawLayer { id, name, weight })
        })
        .collect()
}

pub fn read_anim_curve_nodes(top: &TopLevel) -> Vec<RawCurveNode> {
    top.objects_of_kind("AnimationCurveNode")
        .filter_map(|node| Some(RawCurveNode { id: object_id(&node)? }))
        .collect()
}

const INTERP_CONSTANT: i32 = 0x0002;
const INTERP_LINEAR: i32 = 0x0004;
const CONSTANT_NEXT: i32 = 0x0100;
const TANGENT_AUTO: i32 = 0x0800;

fn interpolation_from_flags(flags: i32) -> Interpolation {
    if flags & INTERP_CONSTANT != 0 {
        Interpolation::Constant { next: flags & CONSTANT_NEXT != 0 }
    } else if flags & INTERP_LINEAR != 0 {
        Interpolation::Linear
    } else {
        Interpolation::Cubic
    }
}

/// Slope for an auto tangent (spec §4.10.1 "auto-tangents solved at read
/// time"): the average of the neighboring secants, flattened to zero
/// whenever they disagree in sign (a local extremum) or a neighbor is
/// missing, so a cubic segment never overshoots past a keyframe it
/// should touch exactly (Design Note "auto-tangent clamp").
fn auto_slope(prev: Option<(f64, f64)>, cur: (f64, f64), next: Option<(f64, f64)>) -> f64 {
    let d1 = prev.and_then(|(t, v)| if cur.0 > t { Some((cur.1 - v) / (cur.0 - t)) } else { None });
    let d2 = next.and_then(|(t, v)| if t > cur.0 { Some((v - cur.1) / (t - cur.0)) } else { None });
    match (d1, d2) {
        (Some(a), Some(b)) if a.signum() == b.signum() && a != 0.0 => (a + b) * 0.5,
        _ => 0.0,
    }
}

/// Reads a post-7000 `AnimationCurve` node's parallel arrays into an
/// [`AnimCurve`] (spec §4.10.1).
pub fn read_anim_curve(node: &DomNode) -> AnimCurve {
    let times: Vec<i64> = node.find_child("KeyTime").and_then(|n| n.array()).map(|a| a.as_i64_vec()).unwrap_or_default();
    let values: Vec<f64> = node.find_child("KeyValueFloat").and_then(|n| n.array()).map(|a| a.as_f64_vec()).unwrap_or_default();
    let flags: Vec<i32> = node
        .find_child("KeyAttrFlags")
        .and_then(|n| n.array())
        .map(|a| a.as_i64_vec().into_iter().map(|v| v as i32).collect())
        .unwrap_or_default();
    let refcounts: Vec<i64> = node.find_child("KeyAttrRefCount").and_then(|n| n.array()).map(|a| a.as_i64_vec()).unwrap_or_default();
    let attr_data: Vec<f64> = node.find_child("KeyAttrDataFloat").and_then(|n| n.array()).map(|a| a.as_f64_vec()).unwrap_or_default();

    let n = times.len().min(values.len());
    let mut per_key_interp = vec![Interpolation::Cubic; n];
    let mut per_key_slope = vec![(0.0f64, 0.0f64); n]; // (left_slope, right_slope)

    let mut key_idx = 0usize;
    for (run, &flag) in flags.iter().enumerate() {
        let count = refcounts.get(run).copied().unwrap_or(0).max(0) as usize;
        let interp = interpolation_from_flags(flag);
        let is_auto = flag & TANGENT_AUTO != 0;
        let right_slope = attr_data.get(run * 4).copied().unwrap_or(0.0);
        let left_slope = attr_data.get(run * 4 + 2).copied().unwrap_or(0.0);
        for _ in 0..count {
            if key_idx >= n {
                break;
            }
            per_key_interp[key_idx] = interp;
            if !is_auto {
                per_key_slope[key_idx] = (left_slope, right_slope);
            }
            key_idx += 1;
        }
    }

    let times_secs: Vec<f64> = times.iter().take(n).map(|&t| t as f64 / KTIME_PER_SECOND as f64).collect();
    let mut keyframes = Vec::with_capacity(n);
    for i in 0..n {
        let prev = if i > 0 { Some((times_secs[i - 1], values[i - 1])) } else { None };
        let next = if i + 1 < n { Some((times_secs[i + 1], values[i + 1])) } else { None };
        let interp = per_key_interp[i];
        let (mut left_slope, mut right_slope) = per_key_slope[i];
        if matches!(interp, Interpolation::Cubic) && left_slope == 0.0 && right_slope == 0.0 {
            let slope = auto_slope(prev, (times_secs[i], values[i]), next);
            left_slope = slope;
            right_slope = slope;
        }
        let dt_prev = prev.map(|(t, _)| (times_secs[i] - t).max(0.0)).unwrap_or(0.0) / 3.0;
        let dt_next = next.map(|(t, _)| (t - times_secs[i]).max(0.0)).unwrap_or(0.0) / 3.0;

        keyframes.push(Keyframe {
            time: KTime(times[i]),
            value: values[i],
            interpolation: interp,
            left_tangent: (-dt_prev, -dt_prev * left_slope),
            right_tangent: (dt_next, dt_next * right_slope),
        });
    }

    AnimCurve { keyframes: Arc::from(keyframes), default_value: values.first().copied().unwrap_or(0.0) }
}

pub fn read_anim_curves(top: &TopLevel) -> Vec<RawCurve> {
    top.objects_of_kind("AnimationCurve")
        .filter_map(|node| Some(RawCurve { id: object_id(&node)?, curve: read_anim_curve(&node) }))
        .collect()
}

/// A pre-7000 `Take`'s flattened per-property curve triple, already bound
/// to the model it targets by name rather than by connection id (spec
/// §4.10.2: "pre-7000 files synthesize identity from the interned name").
pub struct RawTakeBinding {
    pub model_name: String,
    pub prop_name: &'static str,
    pub curves: [Option<AnimCurve>; 3],
}

/// Decodes a pre-7000 `Channel`'s `Key` node (spec §4.10.2): not one node
/// per key, but a *single* flat heterogeneous `d`-typed array holding
/// `KeyCount` variable-length records (`time, value, mode, ...params`),
/// with mode/slope-mode/weight-mode characters smuggled through as their
/// codepoint cast to `f64`. Grounded on `original_source/ufbx.c`'s
/// `ufbxi_read_take_anim_channel`: `classify.rs` forces `Key` under
/// `ParseState::Channel` to an `f64` array for exactly this reason, so
/// `channel_node.find_child("Key")` (not `find_children`) holds all of a
/// channel's keys at once.
fn read_take_channel_curve(channel_node: &DomNode) -> AnimCurve {
    let default_value = channel_node
        .find_child("Default")
        .and_then(|n| n.scalars().first())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    let Some(key_node) = channel_node.find_child("Key") else {
        return AnimCurve { keyframes: Arc::from(Vec::new()), default_value };
    };
    let data: Vec<f64> = key_node.array().map(|a| a.as_f64_vec()).unwrap_or_default();
    let num_keys = channel_node
        .find_child("KeyCount")
        .and_then(|n| n.scalars().first())
        .and_then(|v| v.as_i64())
        .unwrap_or(0)
        .max(0) as usize;

    let mut keyframes: Vec<Keyframe> = Vec::with_capacity(num_keys);
    let mut cursor = 0usize;
    let mut slope_left = 0.0f64;
    let mut weight_left = 0.333333f64;
    let mut prev_time_secs = 0.0f64;
    let mut next_time = KTime(0);
    let mut next_value = 0.0f64;

    if num_keys > 0 && data.len() >= 2 {
        next_time = KTime(data[0] as i64);
        next_value = data[1];
    }

    for i in 0..num_keys {
        if cursor + 3 > data.len() {
            break;
        }
        let time = next_time;
        let value = next_value;
        let mode = data[cursor + 2] as u8 as char;
        cursor += 3;

        let mut interpolation = Interpolation::Cubic;
        let mut slope_right = 0.0f64;
        let mut weight_right = 0.333333f64;
        let mut next_slope_left = 0.0f64;
        let mut next_weight_left = 0.333333f64;
        let mut auto_tangent = false;

        match mode {
            'U' => {
                let slope_mode = data.get(cursor).copied().unwrap_or(0.0) as u8 as char;
                cursor += 1;
                match slope_mode {
                    's' | 'b' => {
                        slope_right = data.get(cursor).copied().unwrap_or(0.0);
                        next_slope_left = data.get(cursor + 1).copied().unwrap_or(0.0);
                        cursor += 2;
                    }
                    'a' => auto_tangent = true,
                    _ => {}
                }
                let weight_mode = data.get(cursor).copied().unwrap_or(0.0) as u8 as char;
                cursor += 1;
                if weight_mode == 'a' {
                    weight_right = data.get(cursor).copied().unwrap_or(0.333333);
                    next_weight_left = data.get(cursor + 1).copied().unwrap_or(0.333333);
                    cursor += 2;
                }
            }
            'L' => interpolation = Interpolation::Linear,
            'C' => {
                let next_flag = data.get(cursor).copied().unwrap_or(0.0) as u8 as char;
                cursor += 1;
                interpolation = Interpolation::Constant { next: next_flag == 'n' };
            }
            _ => {}
        }

        if i + 1 < num_keys && cursor + 2 <= data.len() {
            next_time = KTime(data[cursor] as i64);
            next_value = data[cursor + 1];
        }

        let time_secs = time.to_seconds();
        let next_secs = next_time.to_seconds();

        if auto_tangent {
            let prev = if i > 0 { Some((prev_time_secs, keyframes[i - 1].value)) } else { None };
            let next = if i + 1 < num_keys { Some((next_secs, next_value)) } else { None };
            let slope = auto_slope(prev, (time_secs, value), next);
            slope_left = slope;
            slope_right = slope;
        }

        if matches!(interpolation, Interpolation::Linear) && next_secs > time_secs {
            let slope = (next_value - value) / (next_secs - time_secs);
            slope_right = slope;
            next_slope_left = slope;
        }

        let (left_dx, left_dy) = if time_secs > prev_time_secs {
            let delta = time_secs - prev_time_secs;
            let dx = weight_left * delta;
            (dx, dx * slope_left)
        } else {
            (0.0, 0.0)
        };
        let (right_dx, right_dy) = if next_secs > time_secs {
            let delta = next_secs - time_secs;
            let dx = weight_right * delta;
            (dx, dx * slope_right)
        } else {
            (0.0, 0.0)
        };

        keyframes.push(Keyframe {
            time,
            value,
            interpolation,
            left_tangent: (-left_dx, -left_dy),
            right_tangent: (right_dx, right_dy),
        });

        slope_left = next_slope_left;
        weight_left = next_weight_left;
        prev_time_secs = time_secs;
    }

    AnimCurve { keyframes: Arc::from(keyframes), default_value }
}

/// Flattens every `Take/Model.../Channel:"T"|"R"|"S"{Channel:"X"|"Y"|"Z"{Key}}`
/// block into the same `{target, prop, curves[3]}` shape post-7000 files
/// produce directly (spec §4.10.2).
pub fn read_take_bindings(take: &DomNode) -> Vec<RawTakeBinding> {
    let mut out = Vec::new();
    for model in take.find_children("Model") {
        let Some(model_name) = model.scalars().first().and_then(|v| v.as_str()) else { continue };
        for trs_channel in model.find_children("Channel") {
            let Some(trs_code) = trs_channel.scalars().first().and_then(|v| v.as_str()) else { continue };
            let prop_name: &'static str = match trs_code {
                "T" => "Lcl Translation",
                "R" => "Lcl Rotation",
                "S" => "Lcl Scaling",
                _ => continue,
            };
            let mut curves: [Option<AnimCurve>; 3] = [None, None, None];
            for axis_channel in trs_channel.find_children("Channel") {
                let Some(axis) = axis_channel.scalars().first().and_then(|v| v.as_str()) else { continue };
                let slot = match axis {
                    "X" => 0,
                    "Y" => 1,
                    "Z" => 2,
                    _ => continue,
                };
                curves[slot] = Some(read_take_channel_curve(axis_channel));
            }
            out.push(RawTakeBinding { model_name: model_name.to_string(), prop_name, curves });
        }
    }
    out
}
