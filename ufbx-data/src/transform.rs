//! Transform math (spec §4.9) plus the dual TRS/matrix representation
//! called out as a `SPEC_FULL` supplement (see `DESIGN.md`).
//!
//! The original keeps `ufbx_transform` (decomposed) and `ufbx_matrix`
//! (composed) side by side so the animation evaluator can interpolate a
//! TRS without re-decomposing a 4x4 matrix every sample. We do the same:
//! [`Transform`] is the decomposed form, [`Matrix4`] the composed one, and
//! [`Node::to_parent`]/[`Node::to_root`] store the latter.

use std::ops::Mul;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn mul_elem(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Zero-safe unit vector; a zero-length input returns `ZERO` rather than
    /// `NaN` (mirrors `ufbxi_normalize`'s guarded reciprocal-length scale).
    pub fn normalize(self) -> Vec3 {
        let len2 = self.dot(self);
        if len2 <= 0.0 {
            return Vec3::ZERO;
        }
        self.scale(1.0 / len2.sqrt())
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3::ZERO
    }
}

/// A unit quaternion, `(x, y, z, w)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Builds a quaternion from a single axis rotation in degrees.
    pub fn from_axis_angle_deg(axis: Vec3, degrees: f64) -> Quat {
        let half = degrees.to_radians() * 0.5;
        let (s, c) = half.sin_cos();
        Quat { x: axis.x * s, y: axis.y * s, z: axis.z * s, w: c }
    }

    /// Composes an euler triple (degrees) in the given axis order into a
    /// single quaternion, as used for `Lcl_Rotation`/`PreRotation`/`PostRotation`.
    pub fn from_euler_deg(euler: Vec3, order: RotationOrder) -> Quat {
        let qx = Quat::from_axis_angle_deg(Vec3::new(1.0, 0.0, 0.0), euler.x);
        let qy = Quat::from_axis_angle_deg(Vec3::new(0.0, 1.0, 0.0), euler.y);
        let qz = Quat::from_axis_angle_deg(Vec3::new(0.0, 0.0, 1.0), euler.z);
        match order {
            RotationOrder::Xyz => qz * qy * qx,
            RotationOrder::Xzy => qy * qz * qx,
            RotationOrder::Yzx => qx * qz * qy,
            RotationOrder::Yxz => qz * qx * qy,
            RotationOrder::Zxy => qy * qx * qz,
            RotationOrder::Zyx => qx * qy * qz,
            RotationOrder::SphericXyz => qz * qy * qx,
        }
    }

    pub fn inverse(self) -> Quat {
        Quat { x: -self.x, y: -self.y, z: -self.z, w: self.w }
    }

    pub fn to_matrix(self) -> Matrix4 {
        let Quat { x, y, z, w } = self;
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);
        Matrix4::from_rows([
            [1.0 - (yy + zz), xy - wz, xz + wy, 0.0],
            [xy + wz, 1.0 - (xx + zz), yz - wx, 0.0],
            [xz - wy, yz + wx, 1.0 - (xx + yy), 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

impl Mul for Quat {
    type Output = Quat;
    fn mul(self, rhs: Quat) -> Quat {
        Quat {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RotationOrder {
    #[default]
    Xyz,
    Xzy,
    Yzx,
    Yxz,
    Zxy,
    Zyx,
    SphericXyz,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InheritType {
    #[default]
    Normal,
    NoScale,
    NoShear,
}

impl crate::validation::Validate for InheritType {}
impl crate::validation::Validate for RotationOrder {}
impl crate::validation::Validate for Transform {}
impl crate::validation::Validate for Matrix4 {}
// Leaf data from the resolver's point of view: holds only property-derived
// TRS/pivot values, no element references.
impl crate::validation::Validate for PivotChain {}

/// The decomposed translation/rotation/scale a node's properties encode
/// before the pivot chain in spec §4.9 is composed into a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn to_matrix(self) -> Matrix4 {
        let r = self.rotation.to_matrix();
        let mut m = r.scale_columns(self.scale);
        m.set_translation(self.translation);
        m
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

/// Full pivot chain from spec §4.9, with every optional pivot property.
#[derive(Clone, Copy, Debug, Default)]
pub struct PivotChain {
    pub translation: Vec3,
    pub rotation_offset: Vec3,
    pub rotation_pivot: Vec3,
    pub pre_rotation: Vec3,
    pub rotation: Vec3,
    pub post_rotation: Vec3,
    pub scaling_offset: Vec3,
    pub scaling_pivot: Vec3,
    pub scaling: Vec3,
    pub rotation_order: RotationOrder,
}

impl PivotChain {
    /// Composes the pivot chain into a single local transform matrix per
    /// spec §4.9:
    /// `T = Tr . RotOff . RotPiv . PreRot . Rot . PostRot^-1 . RotPiv^-1 . ScaleOff . ScalePiv . Scale . ScalePiv^-1`
    pub fn compose(&self) -> Matrix4 {
        let t = Matrix4::translation(self.translation);
        let r_off = Matrix4::translation(self.rotation_offset);
        let r_piv = Matrix4::translation(self.rotation_pivot);
        let pre = Quat::from_euler_deg(self.pre_rotation, RotationOrder::Xyz).to_matrix();
        let rot = Quat::from_euler_deg(self.rotation, self.rotation_order).to_matrix();
        let post = Quat::from_euler_deg(self.post_rotation, RotationOrder::Xyz)
            .to_matrix()
            .inverse_rigid();
        let r_piv_inv = Matrix4::translation(self.rotation_pivot.scale(-1.0));
        let s_off = Matrix4::translation(self.scaling_offset);
        let s_piv = Matrix4::translation(self.scaling_pivot);
        let scale = Matrix4::scaling(self.scaling);
        let s_piv_inv = Matrix4::translation(self.scaling_pivot.scale(-1.0));

        t * r_off * r_piv * pre * rot * post * r_piv_inv * s_off * s_piv * scale * s_piv_inv
    }

    /// The animation-evaluator-friendly decomposed form: translation and
    /// scale taken directly, rotation composed from pre/main/post per the
    /// fixed XYZ pre/post order (spec §4.9).
    pub fn to_transform(&self) -> Transform {
        let pre = Quat::from_euler_deg(self.pre_rotation, RotationOrder::Xyz);
        let rot = Quat::from_euler_deg(self.rotation, self.rotation_order);
        let post = Quat::from_euler_deg(self.post_rotation, RotationOrder::Xyz);
        Transform {
            translation: self.translation,
            rotation: pre * rot * post.inverse(),
            scale: self.scaling,
        }
    }
}

/// A 4x4 row-major affine matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4 {
    pub rows: [[f64; 4]; 4],
}

impl Matrix4 {
    pub const IDENTITY: Matrix4 = Matrix4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Matrix4 { rows }
    }

    pub fn translation(t: Vec3) -> Self {
        let mut m = Matrix4::IDENTITY;
        m.rows[0][3] = t.x;
        m.rows[1][3] = t.y;
        m.rows[2][3] = t.z;
        m
    }

    pub fn scaling(s: Vec3) -> Self {
        let mut m = Matrix4::IDENTITY;
        m.rows[0][0] = s.x;
        m.rows[1][1] = s.y;
        m.rows[2][2] = s.z;
        m
    }

    pub fn set_translation(&mut self, t: Vec3) {
        self.rows[0][3] = t.x;
        self.rows[1][3] = t.y;
        self.rows[2][3] = t.z;
    }

    /// Scales each column of the upper 3x3 block; used to fold a `Transform`'s
    /// scale into its rotation matrix without touching translation.
    pub fn scale_columns(self, s: Vec3) -> Matrix4 {
        let mut m = self;
        for row in 0..3 {
            m.rows[row][0] *= s.x;
            m.rows[row][1] *= s.y;
            m.rows[row][2] *= s.z;
        }
        m
    }

    /// Inverse of a pure rotation (orthogonal) matrix: transpose of the
    /// upper 3x3 block. Used for `PostRotation^-1` in the pivot chain.
    pub fn inverse_rigid(self) -> Matrix4 {
        let mut m = Matrix4::IDENTITY;
        for r in 0..3 {
            for c in 0..3 {
                m.rows[r][c] = self.rows[c][r];
            }
        }
        m
    }

    pub fn transform_position(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z + r[0][3],
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z + r[1][3],
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z + r[2][3],
        )
    }

    pub fn transform_direction(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }

    /// Full 4x4 inverse via Gauss-Jordan elimination with partial pivoting.
    /// Returns `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Matrix4> {
        let mut a = self.rows;
        let mut inv = Matrix4::IDENTITY.rows;

        for col in 0..4 {
            let mut pivot_row = col;
            let mut pivot_val = a[col][col].abs();
            for row in (col + 1)..4 {
                if a[row][col].abs() > pivot_val {
                    pivot_val = a[row][col].abs();
                    pivot_row = row;
                }
            }
            if pivot_val < 1e-12 {
                return None;
            }
            a.swap(col, pivot_row);
            inv.swap(col, pivot_row);

            let div = a[col][col];
            for c in 0..4 {
                a[col][c] /= div;
                inv[col][c] /= div;
            }
            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..4 {
                    a[row][c] -= factor * a[col][c];
                    inv[row][c] -= factor * inv[col][c];
                }
            }
        }
        Some(Matrix4::from_rows(inv))
    }

    /// The transposed-inverse of the upper 3x3 block, for transforming
    /// normals correctly under non-uniform scale (`ufbx_get_normal_matrix`).
    pub fn normal_matrix(&self) -> Matrix4 {
        match self.inverse() {
            Some(inv) => inv.transpose3(),
            None => *self,
        }
    }

    fn transpose3(self) -> Matrix4 {
        let mut m = self;
        for r in 0..3 {
            for c in 0..3 {
                m.rows[r][c] = self.rows[c][r];
            }
        }
        m
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Matrix4::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut out = [[0.0; 4]; 4];
        for r in 0..4 {
            for c in 0..4 {
                let mut acc = 0.0;
                for k in 0..4 {
                    acc += self.rows[r][k] * rhs.rows[k][c];
                }
                out[r][c] = acc;
            }
        }
        Matrix4::from_rows(out)
    }
}

/// Composes `parent.to_root x local.to_parent` under the node's
/// [`InheritType`] (spec §4.9). `parent_scale`/`local_scale` are needed
/// separately for `NoScale`/`NoShear` since those modes decompose the
/// parent matrix rather than multiplying it wholesale.
pub fn compose_world(
    inherit: InheritType,
    parent_to_root: Matrix4,
    parent_rotation: Matrix4,
    local_to_parent: Matrix4,
    local_scale: Vec3,
) -> Matrix4 {
    match inherit {
        InheritType::Normal => parent_to_root * local_to_parent,
        InheritType::NoScale => {
            // Parent contributes rotation only; its scale is dropped so a
            // uniformly-scaled parent doesn't also scale this node's
            // translation offset (spec §4.9 `INHERIT_NO_SCALE`).
            let parent_pos = Vec3::new(
                parent_to_root.rows[0][3],
                parent_to_root.rows[1][3],
                parent_to_root.rows[2][3],
            );
            let local_pos = Vec3::new(
                local_to_parent.rows[0][3],
                local_to_parent.rows[1][3],
                local_to_parent.rows[2][3],
            );
            let mut m = parent_rotation * local_to_parent;
            m.set_translation(parent_pos.add(parent_rotation.transform_direction(local_pos)));
            m
        }
        InheritType::NoShear => {
            let rot = parent_rotation.scale_columns(local_scale);
            rot * local_to_parent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_multiply_is_noop() {
        let m = Matrix4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m, Matrix4::IDENTITY * m);
        assert_eq!(m, m * Matrix4::IDENTITY);
    }

    #[test]
    fn inverse_round_trips_position() {
        let m = Matrix4::translation(Vec3::new(1.0, -2.0, 0.5)) * Quat::from_axis_angle_deg(Vec3::new(0.0, 1.0, 0.0), 33.0).to_matrix();
        let inv = m.inverse().expect("invertible");
        let v = Vec3::new(3.0, 4.0, 5.0);
        let round = inv.transform_position(m.transform_position(v));
        assert!((round.x - v.x).abs() < 1e-9);
        assert!((round.y - v.y).abs() < 1e-9);
        assert!((round.z - v.z).abs() < 1e-9);
    }

    #[test]
    fn pivot_chain_identity_is_identity_matrix() {
        let chain = PivotChain {
            scaling: Vec3::ONE,
            ..Default::default()
        };
        assert_eq!(Matrix4::IDENTITY, chain.compose());
    }
}
