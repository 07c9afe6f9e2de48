/// Per-viewport camera frustum and projection into viewport coordinates
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

use crate::math::{IVec2, Vec3, Vec4};

/// Half-width of the frustum at the near plane
const HALF_WIDTH: f32 = 2.0;
const NEAR: f32 = 5.0;
const FAR: f32 = 10.0;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    Orthographic,
    #[default]
    Perspective,
}

/// View volume of one viewport.
///
/// The frustum is always 4 units wide at the near plane; its height follows
/// the viewport's physical aspect ratio so shapes are not stretched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    /// `pixel_aspect` is the width of one pixel divided by its height; 1.0
    /// for square pixels, about 0.5 for terminal cells.
    pub fn for_viewport(viewport_size: IVec2, pixel_aspect: f32, mode: ProjectionMode) -> Self {
        let width = viewport_size.x.max(1) as f32 * pixel_aspect;
        let height = viewport_size.y.max(1) as f32;
        let half_height = HALF_WIDTH * height / width;

        Self {
            left: -HALF_WIDTH,
            right: HALF_WIDTH,
            bottom: -half_height,
            top: half_height,
            near: NEAR,
            far: FAR,
            mode,
        }
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => self.frustum(),
            ProjectionMode::Orthographic => {
                // Match the perspective extent at the model's depth
                let scale = crate::transform::MODEL_DISTANCE / self.near;
                Matrix4::new_orthographic(
                    self.left * scale,
                    self.right * scale,
                    self.bottom * scale,
                    self.top * scale,
                    self.near,
                    self.far,
                )
            }
        }
    }

    fn frustum(&self) -> Matrix4<f32> {
        let (l, r, b, t, n, f) = (self.left, self.right, self.bottom, self.top, self.near, self.far);
        Matrix4::new(
            2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
            0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
            0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n),
            0.0, 0.0, -1.0, 0.0,
        )
    }

    /// Project a model-space point into viewport coordinates.
    ///
    /// Returns `(x, y, depth)` with `x` growing right and `y` growing down
    /// from the viewport's top-left corner, and depth in `[-1, 1]` (smaller is
    /// nearer). Points outside the near/far range give `None`; points outside
    /// the sides are returned so partially visible primitives can be clipped
    /// per pixel.
    pub fn project(&self, point: &Point3<f32>, model_view: &Matrix4<f32>, viewport_size: IVec2) -> Option<Vec3> {
        let mvp = self.projection_matrix() * model_view;
        let clip = mvp * Vec4::new(point.x, point.y, point.z, 1.0);

        // Prevent division by near-zero w values
        if clip.w.abs() < 1e-6 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        let x = (ndc.x + 1.0) * 0.5 * viewport_size.x as f32;
        let y = (1.0 - ndc.y) * 0.5 * viewport_size.y as f32;
        Some(Vec3::new(x, y, ndc.z))
    }
}
