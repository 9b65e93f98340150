//! Animation records (spec §3 "Animation", §4.10, §4.11, GLOSSARY "KTime").

use crate::element::SceneNode;
use crate::index::Index;
use crate::strings::InternedStr;
use std::sync::Arc;
use ufbx_derive::Validate;

/// One second = 46186158000 KTime (spec GLOSSARY).
pub const KTIME_PER_SECOND: i64 = 46_186_158_000;

/// FBX's animation time unit as a typed newtype rather than a bare `i64`,
/// so unit confusion between ticks and seconds is a compile error
/// (`SPEC_FULL` supplement, grounded on `original_source/ufbx.h`'s
/// `ufbx_ktime_to_sec` constant).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KTime(pub i64);

impl KTime {
    pub fn to_seconds(self) -> f64 {
        self.0 as f64 / KTIME_PER_SECOND as f64
    }

    pub fn from_seconds(seconds: f64) -> Self {
        KTime((seconds * KTIME_PER_SECOND as f64).round() as i64)
    }
}

impl crate::validation::Validate for KTime {}

/// Keyframe interpolation kind, decoded from `KeyAttrFlags` (post-7000,
/// §4.10.1) or the `Take` mode character (pre-7000, §4.10.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interpolation {
    Constant { next: bool },
    Linear,
    #[default]
    Cubic,
}

impl crate::validation::Validate for Interpolation {}

/// One keyframe: `{time, value, interpolation, left_tangent, right_tangent}`
/// with tangents expressed as `(dx, dy)` offsets relative to the adjacent
/// key times (spec §3 "Animation").
#[derive(Clone, Copy, Debug, Validate)]
pub struct Keyframe {
    pub time: KTime,
    pub value: f64,
    pub interpolation: Interpolation,
    pub left_tangent: (f64, f64),
    pub right_tangent: (f64, f64),
}

impl crate::validation::Validate for (f64, f64) {}

/// A sorted keyframe array plus a default value (spec §3).
#[derive(Clone, Debug, Validate)]
pub struct AnimCurve {
    pub keyframes: Arc<[Keyframe]>,
    pub default_value: f64,
}

impl AnimCurve {
    /// Binary search for the bracketing pair and evaluate per spec §4.10.3.
    pub fn evaluate(&self, time: KTime) -> f64 {
        let keys = &self.keyframes[..];
        if keys.is_empty() {
            return self.default_value;
        }
        if time <= keys[0].time {
            return keys[0].value;
        }
        if time >= keys[keys.len() - 1].time {
            return keys[keys.len() - 1].value;
        }
        let idx = match keys.binary_search_by_key(&time, |k| k.time) {
            Ok(i) => return keys[i].value,
            Err(i) => i,
        };
        let prev = &keys[idx - 1];
        let next = &keys[idx];
        evaluate_segment(prev, next, time)
    }
}

fn evaluate_segment(prev: &Keyframe, next: &Keyframe, time: KTime) -> f64 {
    let t0 = prev.time.to_seconds();
    let t1 = next.time.to_seconds();
    let dt = t1 - t0;
    if dt <= 0.0 {
        return prev.value;
    }
    let x = (time.to_seconds() - t0) / dt;

    match (prev.interpolation, next.interpolation) {
        (Interpolation::Constant { next: use_next }, _) => {
            if use_next {
                next.value
            } else {
                prev.value
            }
        }
        (Interpolation::Linear, _) => prev.value + (next.value - prev.value) * x,
        _ => {
            // Cubic Bezier: control points from the stored tangent offsets,
            // `dx` relative to the adjacent time delta (spec GLOSSARY).
            let p0 = 0.0_f64;
            let p1 = prev.right_tangent.0 / dt.max(1e-9);
            let p2 = 1.0 - next.left_tangent.0 / dt.max(1e-9);
            let p3 = 1.0_f64;
            let bezier_x = |t: f64| {
                let mt = 1.0 - t;
                mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
            };
            let mut t = x;
            for _ in 0..7 {
                let fx = bezier_x(t) - x;
                if fx.abs() < 1e-5 {
                    break;
                }
                let h = 1e-4;
                let deriv = (bezier_x(t + h) - bezier_x(t - h)) / (2.0 * h);
                if deriv.abs() < 1e-9 {
                    break;
                }
                t -= fx / deriv;
                t = t.clamp(0.0, 1.0);
            }
            let y0 = prev.value;
            let y1 = prev.value + prev.right_tangent.1;
            let y2 = next.value - next.left_tangent.1;
            let y3 = next.value;
            let mt = 1.0 - t;
            mt * mt * mt * y0 + 3.0 * mt * mt * t * y1 + 3.0 * mt * t * t * y2 + t * t * t * y3
        }
    }
}

/// Binds one named property on one target element to up to three
/// component curves (spec §3 "Animation").
#[derive(Clone, Debug, Validate)]
pub struct AnimProp {
    pub target: Option<Index<SceneNode>>,
    pub prop_name: InternedStr,
    pub curves: CurveTriple,
}

/// `curves[0..2]`, chosen by connection property name (`d|X`/`d|Y`/`d|Z`
/// or bare `X`/`Y`/`Z`, spec §4.11).
#[derive(Clone, Copy, Debug, Default)]
pub struct CurveTriple(pub [Option<Index<AnimCurve>>; 3]);

impl crate::validation::Validate for CurveTriple {
    fn validate_minimally<P, R>(&self, root: &crate::Root, path: P, report: &mut R)
    where
        P: Fn() -> crate::Path,
        R: FnMut(&dyn Fn() -> crate::Path, crate::validation::Error),
    {
        for (i, c) in self.0.iter().enumerate() {
            c.validate_minimally(root, || path().index(i), report);
        }
    }
}

/// A sorted `AnimProp` array (spec invariant 6), with the sentinel entry
/// implicit: consumers iterate `props` directly rather than scanning for a
/// `target = INVALID` marker, since Rust's `Vec` already carries its own
/// length.
#[derive(Clone, Debug, Default, Validate)]
pub struct AnimLayer {
    pub name: InternedStr,
    pub props: Vec<AnimProp>,
    pub weight: f64,
}

impl AnimLayer {
    /// Sort key per spec invariant 6: `(target, index, imp_key, name)`.
    pub fn sort_props(&mut self) {
        self.props.sort_by(|a, b| {
            let ta = a.target.map(|t| t.value());
            let tb = b.target.map(|t| t.value());
            ta.cmp(&tb)
                .then_with(|| crate::props::imp_key_of(a.prop_name.as_str()).cmp(&crate::props::imp_key_of(b.prop_name.as_str())))
                .then_with(|| a.prop_name.as_str().cmp(b.prop_name.as_str()))
        });
        self.props.dedup_by(|a, b| {
            a.target.map(|t| t.value()) == b.target.map(|t| t.value()) && a.prop_name == b.prop_name
        });
    }
}

/// Owns layer pointers and a time interval (spec §3 "Animation").
#[derive(Clone, Debug, Validate)]
pub struct AnimStack {
    pub name: InternedStr,
    pub layers: Vec<Index<AnimLayer>>,
    pub time_begin: KTime,
    pub time_end: KTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(t: i64, v: f64) -> Keyframe {
        Keyframe {
            time: KTime(t),
            value: v,
            interpolation: Interpolation::Cubic,
            left_tangent: (0.0, 0.0),
            right_tangent: (0.0, 0.0),
        }
    }

    #[test]
    fn evaluate_at_keyframe_is_exact() {
        let curve = AnimCurve {
            keyframes: Arc::from(vec![
                key(0, 0.0),
                key(KTIME_PER_SECOND, 10.0),
                key(2 * KTIME_PER_SECOND, 0.0),
            ]),
            default_value: 0.0,
        };
        assert_eq!(10.0, curve.evaluate(KTime(KTIME_PER_SECOND)));
    }

    #[test]
    fn linear_interpolates_midpoint() {
        let mut a = key(0, 0.0);
        a.interpolation = Interpolation::Linear;
        let mut b = key(KTIME_PER_SECOND, 10.0);
        b.interpolation = Interpolation::Linear;
        let curve = AnimCurve { keyframes: Arc::from(vec![a, b]), default_value: 0.0 };
        let mid = curve.evaluate(KTime(KTIME_PER_SECOND / 2));
        assert!((mid - 5.0).abs() < 1e-9);
    }
}
