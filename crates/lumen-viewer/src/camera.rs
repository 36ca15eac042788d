//! Orbit camera framed on the scene bounds.

use lumen_engine::input::{InputFrame, InputState, MouseButton};
use lumen_engine::math::{self, Aabb, Float3};

/// Radians of yaw per second while auto-orbiting.
const AUTO_ORBIT_SPEED: f32 = 0.4;
const PITCH_LIMIT: f32 = 1.5;

/// Camera circling a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Float3,
    pub distance: f32,
    /// Horizontal angle in radians (around the Y axis).
    pub yaw: f32,
    /// Vertical angle in radians.
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per logical pixel of drag.
    pub rotate_sensitivity: f32,
    /// Distance multiplier per wheel line.
    pub zoom_step: f32,
    pub auto_orbit: bool,
}

impl OrbitCamera {
    pub fn new(auto_orbit: bool) -> Self {
        Self {
            target: Float3::ZERO,
            distance: 3.0,
            yaw: 0.0,
            pitch: 0.3,
            min_distance: 0.05,
            max_distance: 100.0,
            rotate_sensitivity: 0.005,
            zoom_step: 0.9,
            auto_orbit,
        }
    }

    /// Points the camera at `bounds` from far enough that the bounding
    /// sphere fits the vertical field of view. Empty bounds reset to the origin.
    pub fn frame(&mut self, bounds: &Aabb, fov_y: f32) {
        if bounds.is_empty() {
            self.target = Float3::ZERO;
            self.distance = 3.0;
        } else {
            let radius = bounds.radius().max(1e-3);
            self.target = bounds.center();
            self.distance = radius / (fov_y * 0.5).sin() * 1.1;
        }
        self.min_distance = self.distance * 0.05;
        self.max_distance = self.distance * 20.0;
    }

    /// Applies drag, wheel and auto-orbit for one frame.
    pub fn update(&mut self, input: &InputState, frame: &InputFrame, dt: Option<f32>) {
        let dragging = input.button_down(MouseButton::Left);
        if dragging {
            let (dx, dy) = frame.pointer_delta;
            self.yaw -= dx * self.rotate_sensitivity;
            self.pitch = (self.pitch + dy * self.rotate_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        } else if self.auto_orbit {
            self.yaw += AUTO_ORBIT_SPEED * dt.unwrap_or(0.0);
        }

        if frame.wheel_lines != 0.0 {
            self.distance = (self.distance * self.zoom_step.powf(frame.wheel_lines))
                .clamp(self.min_distance, self.max_distance);
        }
    }

    pub fn eye(&self) -> Float3 {
        math::orbit_position(self.target, self.distance, self.yaw, self.pitch)
    }

    /// Near and far planes bracketing the zoom range.
    pub fn clip_planes(&self) -> (f32, f32) {
        (self.min_distance * 0.1, self.max_distance * 4.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_engine::input::{ButtonState, InputEvent, MouseWheelDelta};

    fn unit_cube() -> Aabb {
        Aabb::new(Float3::splat(-1.0), Float3::splat(1.0))
    }

    #[test]
    fn framing_fits_the_bounding_sphere() {
        let mut cam = OrbitCamera::new(false);
        let fov = 60f32.to_radians();
        cam.frame(&Aabb::new(Float3::new(1.0, 1.0, 1.0), Float3::new(3.0, 3.0, 3.0)), fov);
        assert_eq!(cam.target, Float3::splat(2.0));

        let radius = 3f32.sqrt();
        assert!(cam.distance * (fov * 0.5).sin() >= radius);
        assert!((cam.eye().distance(cam.target) - cam.distance).abs() < 1e-4);

        let (near, far) = cam.clip_planes();
        assert!(near < cam.distance - radius);
        assert!(far > cam.distance + radius);
    }

    #[test]
    fn empty_bounds_reset_to_origin() {
        let mut cam = OrbitCamera::new(false);
        cam.frame(&unit_cube(), 1.0);
        cam.frame(&Aabb::empty(), 1.0);
        assert_eq!(cam.target, Float3::ZERO);
        assert_eq!(cam.distance, 3.0);
    }

    #[test]
    fn auto_orbit_needs_a_delta() {
        let state = InputState::default();
        let frame = InputFrame::default();

        let mut cam = OrbitCamera::new(true);
        cam.update(&state, &frame, None);
        assert_eq!(cam.yaw, 0.0);
        cam.update(&state, &frame, Some(0.5));
        assert!((cam.yaw - 0.2).abs() < 1e-6);

        let mut fixed = OrbitCamera::new(false);
        fixed.update(&state, &frame, Some(0.5));
        assert_eq!(fixed.yaw, 0.0);
    }

    #[test]
    fn drag_rotates_and_clamps_pitch() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        for ev in [
            InputEvent::PointerMoved { x: 0.0, y: 0.0 },
            InputEvent::PointerButton { button: MouseButton::Left, state: ButtonState::Pressed },
            InputEvent::PointerMoved { x: 100.0, y: 10_000.0 },
        ] {
            state.apply_event(&mut frame, ev);
        }

        let mut cam = OrbitCamera::new(true);
        cam.update(&state, &frame, Some(1.0));
        assert!((cam.yaw + 0.5).abs() < 1e-6);
        assert_eq!(cam.pitch, PITCH_LIMIT);
    }

    #[test]
    fn wheel_zooms_within_limits() {
        let state = InputState::default();
        let mut frame = InputFrame::default();
        let mut cam = OrbitCamera::new(false);
        cam.frame(&unit_cube(), 1.0);
        let start = cam.distance;

        InputState::default().apply_event(&mut frame, InputEvent::Wheel(MouseWheelDelta::Line { x: 0.0, y: 1.0 }));
        cam.update(&state, &frame, None);
        assert!((cam.distance - start * 0.9).abs() < 1e-4);

        frame.wheel_lines = 1000.0;
        cam.update(&state, &frame, None);
        assert_eq!(cam.distance, cam.min_distance);
    }
}
