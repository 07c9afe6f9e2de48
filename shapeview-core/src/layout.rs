/// Screen geometry: the button strip along the bottom edge and the virtual
/// trackball over the rest of the screen.
///
/// Touch points use screen coordinates with the origin at the top-left and y
/// growing downwards.
use crate::math::{IVec2, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    screen_size: IVec2,
    button_size: IVec2,
    button_count: usize,
    center: IVec2,
    trackball_radius: f32,
}

impl ScreenLayout {
    /// Tile `button_count` buttons across the bottom of a `width` x `height`
    /// screen. Buttons are `width / button_count` wide and `button_aspect`
    /// times as tall.
    ///
    /// # Panics
    /// If the screen is empty, there are no buttons, or the buttons would be
    /// narrower than one pixel.
    pub fn new(width: i32, height: i32, button_count: usize, button_aspect: f32) -> Self {
        assert!(width > 0 && height > 0, "screen must not be empty, got {width}x{height}");
        assert!(button_count > 0, "layout needs at least one button");
        assert!(
            width as usize >= button_count,
            "{width} pixels cannot hold {button_count} buttons"
        );
        assert!(button_aspect > 0.0, "button aspect must be positive");

        let button_width = width / button_count as i32;
        let button_height = ((button_width as f32 * button_aspect).round() as i32).clamp(1, height);
        let screen_size = IVec2::new(width, height);

        Self {
            screen_size,
            button_size: IVec2::new(button_width, button_height),
            button_count,
            center: screen_size / 2,
            trackball_radius: width as f32 / 3.0,
        }
    }

    pub fn screen_size(&self) -> IVec2 {
        self.screen_size
    }

    pub fn button_size(&self) -> IVec2 {
        self.button_size
    }

    pub fn button_count(&self) -> usize {
        self.button_count
    }

    pub fn trackball_radius(&self) -> f32 {
        self.trackball_radius
    }

    /// The button under `point`, if any
    pub fn map_to_button(&self, point: IVec2) -> Option<usize> {
        let strip_top = self.screen_size.y - self.button_size.y;
        if point.y < strip_top || point.y > self.screen_size.y || point.x < 0 {
            return None;
        }
        let index = (point.x / self.button_size.x) as usize;
        (index < self.button_count).then_some(index)
    }

    /// Project `point` onto the unit trackball hemisphere facing the viewer.
    ///
    /// Points beyond the ball are pulled onto its rim (one pixel inside), so
    /// every touch maps to a well-defined direction.
    pub fn map_to_sphere(&self, point: IVec2) -> Vec3 {
        let offset = point - self.center;
        let mut p = Vec2::new(offset.x as f32, -offset.y as f32);

        let radius = self.trackball_radius;
        let safe_radius = (radius - 1.0).max(0.0);
        let length = p.norm();
        if length > safe_radius {
            p *= safe_radius / length;
        }

        let z = (radius * radius - p.norm_squared()).max(0.0).sqrt();
        Vec3::new(p.x, p.y, z).normalize()
    }

    /// Centre pixel of button `index`, for synthesizing taps
    pub fn button_center(&self, index: usize) -> IVec2 {
        IVec2::new(
            index as i32 * self.button_size.x + self.button_size.x / 2,
            self.screen_size.y - self.button_size.y / 2 - 1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn phone() -> ScreenLayout {
        ScreenLayout::new(300, 480, 5, 1.0)
    }

    #[test]
    fn test_button_geometry() {
        let layout = phone();
        assert_eq!(layout.button_size(), IVec2::new(60, 60));
        assert_relative_eq!(layout.trackball_radius(), 100.0);
    }

    #[test]
    fn test_map_to_button() {
        let layout = phone();
        assert_eq!(layout.map_to_button(IVec2::new(10, 479)), Some(0));
        assert_eq!(layout.map_to_button(IVec2::new(299, 479)), Some(4));
        assert_eq!(layout.map_to_button(IVec2::new(10, 100)), None);
    }

    #[test]
    fn test_map_to_button_strip_edges() {
        let layout = phone();
        assert_eq!(layout.map_to_button(IVec2::new(60, 420)), Some(1));
        assert_eq!(layout.map_to_button(IVec2::new(60, 419)), None);
        assert_eq!(layout.map_to_button(IVec2::new(59, 480)), Some(0));
        assert_eq!(layout.map_to_button(IVec2::new(59, 481)), None);
        assert_eq!(layout.map_to_button(IVec2::new(-1, 450)), None);
    }

    #[test]
    fn test_map_to_button_past_last_button() {
        // 302 / 5 leaves two pixels of dead space on the right
        let layout = ScreenLayout::new(302, 480, 5, 1.0);
        assert_eq!(layout.map_to_button(IVec2::new(299, 479)), Some(4));
        assert_eq!(layout.map_to_button(IVec2::new(301, 479)), None);
    }

    #[test]
    fn test_button_aspect() {
        let layout = ScreenLayout::new(80, 24, 5, 0.5);
        assert_eq!(layout.button_size(), IVec2::new(16, 8));
        assert_eq!(layout.map_to_button(layout.button_center(3)), Some(3));
    }

    #[test]
    fn test_map_to_sphere_center() {
        let layout = phone();
        let p = layout.map_to_sphere(IVec2::new(150, 240));
        assert_relative_eq!(p, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_map_to_sphere_flips_vertical_axis() {
        let layout = phone();
        let up = layout.map_to_sphere(IVec2::new(150, 190));
        assert!(up.y > 0.0);
        assert_relative_eq!(up.x, 0.0);
        let right = layout.map_to_sphere(IVec2::new(200, 240));
        assert!(right.x > 0.0);
    }

    #[test]
    fn test_map_to_sphere_clamps_far_points() {
        let layout = phone();
        for point in [IVec2::new(5000, 240), IVec2::new(-800, -900), IVec2::new(150, 480)] {
            let p = layout.map_to_sphere(point);
            assert!(p.iter().all(|c| c.is_finite()));
            assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-5);
            assert!(p.z > 0.0);
        }
        // Clamping preserves the direction of the drag
        let far_right = layout.map_to_sphere(IVec2::new(5000, 240));
        assert!(far_right.x > 0.98 && far_right.y.abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn test_rejects_empty_screen() {
        ScreenLayout::new(0, 480, 5, 1.0);
    }
}
