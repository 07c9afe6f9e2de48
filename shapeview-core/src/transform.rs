/// Model-view matrices for drawing an oriented surface
use nalgebra::{Matrix4, Vector3};

use crate::math::Quaternion;

/// Distance from the eye to the centre of every drawn surface
pub const MODEL_DISTANCE: f32 = 7.0;

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotate by `orientation`, then push the surface into the view volume
    pub fn model_view(orientation: &Quaternion) -> Matrix4<f32> {
        Self::translation_matrix(0.0, 0.0, -MODEL_DISTANCE) * orientation.to_matrix()
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_model_view_is_translation() {
        let matrix = Transform::model_view(&Quaternion::identity());
        assert!((matrix - Transform::translation_matrix(0.0, 0.0, -7.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_applies_before_translation() {
        let orientation = Quaternion::from_axis_angle(&Vec3::y(), FRAC_PI_2);
        let matrix = Transform::model_view(&orientation);
        let p = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, -8.0), epsilon = 1e-5);
    }
}
