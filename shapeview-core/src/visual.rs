/// Per-slot render descriptors and the swap tween between two layouts
use crate::math::{lerp_ivec2, IVec2, Quaternion, Vec3};

/// Where and how one surface slot is drawn this frame.
///
/// `lower_left` is measured from the bottom-left corner of the screen, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visual {
    pub color: Vec3,
    pub lower_left: IVec2,
    pub viewport_size: IVec2,
    pub orientation: Quaternion,
}

impl Visual {
    /// Interpolate every field; colour and rectangle linearly, orientation
    /// spherically. `t` is not clamped.
    pub fn lerp(&self, other: &Visual, t: f32) -> Visual {
        Visual {
            color: self.color.lerp(&other.color, t),
            lower_left: lerp_ivec2(&self.lower_left, &other.lower_left, t),
            viewport_size: lerp_ivec2(&self.viewport_size, &other.viewport_size, t),
            orientation: self.orientation.slerp(&other.orientation, t),
        }
    }
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            color: Vec3::zeros(),
            lower_left: IVec2::zeros(),
            viewport_size: IVec2::zeros(),
            orientation: Quaternion::identity(),
        }
    }
}

/// An in-flight swap transition between two full layouts
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub elapsed: f32,
    pub duration: f32,
    pub starting_visuals: Vec<Visual>,
    pub ending_visuals: Vec<Visual>,
}

impl Animation {
    pub fn new(duration: f32, starting_visuals: Vec<Visual>, ending_visuals: Vec<Visual>) -> Self {
        assert!(duration >= 0.0, "animation duration must not be negative, got {duration}");
        assert_eq!(starting_visuals.len(), ending_visuals.len());
        Self {
            elapsed: 0.0,
            duration,
            starting_visuals,
            ending_visuals,
        }
    }

    /// Progress in `[0, 1]`; a zero-length animation stays on its first frame
    pub fn progress(&self) -> f32 {
        if self.duration == 0.0 {
            return 0.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Advance by `time_step`; returns whether the animation is still running
    pub fn advance(&mut self, time_step: f32) -> bool {
        self.elapsed += time_step;
        self.elapsed < self.duration
    }

    pub fn tweened_visuals(&self) -> Vec<Visual> {
        let t = self.progress();
        self.starting_visuals
            .iter()
            .zip(&self.ending_visuals)
            .map(|(start, end)| start.lerp(end, t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn visual(x: i32, color: f32) -> Visual {
        Visual {
            color: Vec3::new(color, color, color),
            lower_left: IVec2::new(x, 0),
            viewport_size: IVec2::new(60, 60),
            orientation: Quaternion::identity(),
        }
    }

    #[test]
    fn test_visual_lerp_midpoint() {
        let a = visual(0, 0.0);
        let b = Visual {
            orientation: Quaternion::from_axis_angle(&Vec3::y(), 1.0),
            ..visual(100, 1.0)
        };
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.lower_left, IVec2::new(50, 0));
        assert_relative_eq!(mid.color, Vec3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(mid.orientation.angle_to(&a.orientation), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut animation = Animation::new(0.3, vec![visual(0, 0.0)], vec![visual(100, 1.0)]);
        assert_eq!(animation.progress(), 0.0);
        animation.elapsed = 0.45;
        assert_eq!(animation.progress(), 1.0);
        assert_eq!(animation.tweened_visuals(), vec![visual(100, 1.0)]);
    }

    #[test]
    fn test_zero_duration_stays_on_start() {
        let mut animation = Animation::new(0.0, vec![visual(0, 0.0)], vec![visual(100, 1.0)]);
        animation.elapsed = 5.0;
        assert_eq!(animation.progress(), 0.0);
        assert_eq!(animation.tweened_visuals(), vec![visual(0, 0.0)]);
    }

    #[test]
    fn test_advance_reports_completion() {
        let mut animation = Animation::new(0.3, vec![], vec![]);
        assert!(animation.advance(0.1));
        assert!(animation.advance(0.1));
        assert!(!animation.advance(0.15));
    }

    #[test]
    #[should_panic(expected = "must not be negative")]
    fn test_negative_duration_panics() {
        Animation::new(-1.0, vec![], vec![]);
    }
}
