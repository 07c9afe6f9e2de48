/// The interaction engine: turns touches and frame time into a scene.
///
/// One surface is shown full-screen and can be spun with a virtual
/// trackball; every other surface sits on a button along the bottom edge.
/// Tapping a button swaps its surface with the shown one, animated over a
/// fixed duration. The engine never owns the renderer; the caller lends it
/// one for each frame.
use tracing::{debug, info, trace, warn};

use crate::config::{EngineConfig, Palette};
use crate::layout::ScreenLayout;
use crate::math::{IVec2, Quaternion};
use crate::render::RenderingEngine;
use crate::visual::{Animation, Visual};

/// What the finger currently on the screen is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Spinning,
    ButtonPressed(usize),
}

pub struct ApplicationEngine {
    config: EngineConfig,
    layout: ScreenLayout,
    gesture: Gesture,
    orientation: Quaternion,
    previous_orientation: Quaternion,
    finger_start: IVec2,
    current_surface: usize,
    button_surfaces: Vec<usize>,
    animation: Option<Animation>,
}

impl ApplicationEngine {
    /// # Panics
    /// If the configuration is invalid (see [`EngineConfig::validate`]) or the
    /// screen cannot hold the buttons.
    pub fn new(config: EngineConfig, width: i32, height: i32) -> Self {
        if let Err(e) = config.validate() {
            panic!("{e}");
        }

        let current_surface = config.initial_surface;
        let button_surfaces = (0..config.surface_count())
            .filter(|&slot| slot != current_surface)
            .collect();
        let layout = ScreenLayout::new(width, height, config.button_count(), config.button_aspect);

        Self {
            config,
            layout,
            gesture: Gesture::Idle,
            orientation: Quaternion::identity(),
            previous_orientation: Quaternion::identity(),
            finger_start: IVec2::zeros(),
            current_surface,
            button_surfaces,
            animation: None,
        }
    }

    /// Establish (or re-establish after a resize) the touch coordinate space
    pub fn initialize(&mut self, width: i32, height: i32) {
        self.layout = ScreenLayout::new(width, height, self.config.button_count(), self.config.button_aspect);
        info!(width, height, button_size = ?self.layout.button_size(), "screen layout");
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn current_surface(&self) -> usize {
        self.current_surface
    }

    /// Surface slot shown on each button, left to right
    pub fn button_surfaces(&self) -> &[usize] {
        &self.button_surfaces
    }

    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn on_finger_down(&mut self, location: IVec2) {
        self.finger_start = location;
        self.previous_orientation = self.orientation;
        self.gesture = match self.layout.map_to_button(location) {
            Some(button) => Gesture::ButtonPressed(button),
            None => Gesture::Spinning,
        };
        debug!(x = location.x, y = location.y, gesture = ?self.gesture, "finger down");
    }

    pub fn on_finger_move(&mut self, _old_location: IVec2, new_location: IVec2) {
        match self.gesture {
            Gesture::Spinning => {
                // Always relative to the touch-down orientation, so no drift builds up
                let start = self.layout.map_to_sphere(self.finger_start);
                let end = self.layout.map_to_sphere(new_location);
                let delta = Quaternion::from_vectors(&start, &end);
                self.orientation = delta.rotated(&self.previous_orientation);
                trace!(x = new_location.x, y = new_location.y, "spin");
            }
            Gesture::ButtonPressed(button) => {
                if self.layout.map_to_button(new_location) != Some(button) {
                    debug!(button, "button press cancelled");
                    self.gesture = Gesture::Idle;
                }
            }
            Gesture::Idle => {}
        }
    }

    pub fn on_finger_up(&mut self, location: IVec2) {
        if let Gesture::ButtonPressed(button) = self.gesture {
            if self.layout.map_to_button(location) == Some(button) {
                if self.animation.is_some() {
                    warn!(button, "swap refused while an animation is running");
                } else {
                    self.swap_with_button(button);
                }
            }
        }
        self.gesture = Gesture::Idle;
    }

    fn swap_with_button(&mut self, button: usize) {
        let starting_visuals = self.populate_visuals();
        std::mem::swap(&mut self.button_surfaces[button], &mut self.current_surface);
        // The button press is over; the end frame must not show it highlighted
        self.gesture = Gesture::Idle;
        let ending_visuals = self.populate_visuals();

        debug!(
            button,
            current_surface = self.current_surface,
            "swapping surfaces"
        );
        self.animation = Some(Animation::new(
            self.config.animation_duration,
            starting_visuals,
            ending_visuals,
        ));
    }

    pub fn update_animation(&mut self, time_step: f32) {
        if let Some(animation) = &mut self.animation {
            if !animation.advance(time_step) {
                debug!(elapsed = animation.elapsed, "animation finished");
                self.animation = None;
            }
        }
    }

    /// The resting layout for the current state; no side effects
    pub fn populate_visuals(&self) -> Vec<Visual> {
        let mut visuals = vec![Visual::default(); self.config.surface_count()];
        let palette = &self.config.palette;
        let button_size = self.layout.button_size();
        let screen_size = self.layout.screen_size();

        for (button, &slot) in self.button_surfaces.iter().enumerate() {
            let color = if self.gesture == Gesture::ButtonPressed(button) {
                palette.button_pressed
            } else {
                palette.button
            };
            visuals[slot] = Visual {
                color: Palette::color(color),
                lower_left: IVec2::new(button as i32 * button_size.x, 0),
                viewport_size: button_size,
                orientation: Quaternion::identity(),
            };
        }

        let color = if self.gesture == Gesture::Spinning {
            palette.spinning
        } else {
            palette.idle
        };
        visuals[self.current_surface] = Visual {
            color: Palette::color(color),
            lower_left: IVec2::new(0, button_size.y),
            viewport_size: IVec2::new(screen_size.x, screen_size.y - button_size.y),
            orientation: self.orientation,
        };

        visuals
    }

    /// What to draw this frame: the resting layout, or the tween while a
    /// swap is animating
    pub fn visuals(&self) -> Vec<Visual> {
        match &self.animation {
            Some(animation) => animation.tweened_visuals(),
            None => self.populate_visuals(),
        }
    }

    pub fn render(&self, renderer: &mut dyn RenderingEngine) {
        renderer.render(&self.visuals());
    }
}
