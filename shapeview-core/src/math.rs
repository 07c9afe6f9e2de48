/// Vector aliases and the unit quaternion used for every orientation
use nalgebra::{Matrix4, Quaternion as RawQuaternion, Unit, UnitQuaternion, Vector2, Vector3, Vector4};
use std::f32::consts::PI;

pub type IVec2 = Vector2<i32>;
pub type Vec2 = Vector2<f32>;
pub type Vec3 = Vector3<f32>;
pub type Vec4 = Vector4<f32>;

/// Above this cosine the two rotations are treated as identical and slerp
/// degrades to a normalized lerp.
const SLERP_THRESHOLD: f32 = 1.0 - 1.0e-5;

/// Linear interpolation of integer vectors, rounded to the nearest integer.
///
/// `t` is not clamped.
pub fn lerp_ivec2(a: &IVec2, b: &IVec2, t: f32) -> IVec2 {
    let a = a.cast::<f32>();
    let b = b.cast::<f32>();
    a.lerp(&b, t).map(|c| c.round() as i32)
}

/// A unit quaternion representing an orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion(UnitQuaternion<f32>);

impl Quaternion {
    pub fn identity() -> Self {
        Self(UnitQuaternion::identity())
    }

    pub fn from_unit(rotation: UnitQuaternion<f32>) -> Self {
        Self(rotation)
    }

    pub fn from_axis_angle(axis: &Vec3, angle: f32) -> Self {
        Self(UnitQuaternion::from_axis_angle(&Unit::new_normalize(*axis), angle))
    }

    /// Minimal rotation taking unit vector `u` onto unit vector `v`.
    ///
    /// Antiparallel inputs have no unique answer; a half turn about some axis
    /// orthogonal to `u` is returned.
    pub fn from_vectors(u: &Vec3, v: &Vec3) -> Self {
        let d = u.dot(v);
        if d < -1.0 + 1.0e-6 {
            let mut axis = Vec3::x().cross(u);
            if axis.norm_squared() < 1.0e-6 {
                axis = Vec3::y().cross(u);
            }
            return Self::from_axis_angle(&axis, PI);
        }

        // Half-way quaternion: (cross / s, s / 2) with s = sqrt(2 (1 + d))
        let c = u.cross(v);
        let s = ((1.0 + d) * 2.0).sqrt();
        Self(UnitQuaternion::new_normalize(RawQuaternion::new(
            s / 2.0,
            c.x / s,
            c.y / s,
            c.z / s,
        )))
    }

    /// Compose with `base`: the result applies `base` first, then `self`.
    pub fn rotated(&self, base: &Quaternion) -> Self {
        Self(UnitQuaternion::new_normalize((self.0 * base.0).into_inner()))
    }

    /// Spherical interpolation along the shorter arc. `t` is not clamped.
    pub fn slerp(&self, other: &Quaternion, t: f32) -> Self {
        let start = self.0.coords;
        let mut end = other.0.coords;

        let mut cos_theta = start.dot(&end);
        if cos_theta < 0.0 {
            cos_theta = -cos_theta;
            end = -end;
        }

        let coords = if cos_theta > SLERP_THRESHOLD {
            start.lerp(&end, t)
        } else {
            let theta = cos_theta.acos();
            let sin_theta = theta.sin();
            start * (((1.0 - t) * theta).sin() / sin_theta) + end * ((t * theta).sin() / sin_theta)
        };

        Self(UnitQuaternion::new_normalize(RawQuaternion::from_vector(coords)))
    }

    /// Homogeneous rotation matrix for the renderer
    pub fn to_matrix(&self) -> Matrix4<f32> {
        self.0.to_homogeneous()
    }

    pub fn rotate_vector(&self, v: &Vec3) -> Vec3 {
        self.0 * v
    }

    pub fn norm(&self) -> f32 {
        self.0.quaternion().norm()
    }

    /// Angle of the rotation separating `self` from `other`, in radians
    pub fn angle_to(&self, other: &Quaternion) -> f32 {
        self.0.angle_to(&other.0)
    }

    pub fn as_unit(&self) -> &UnitQuaternion<f32> {
        &self.0
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}
