//! Keyboard flight and pointer orbiting for the scene [`Camera`].
//!
//! ```ignore
//! let controls = CameraControls::default();
//! controls.fly(&mut camera, &input, dt);
//! if let Some(drag) = input.take_drag() {
//!     controls.orbit(&mut camera, drag.x, drag.y);
//! }
//! ```

use std::f32::consts::PI;

use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::input::Input;
use crate::quaternion;

/// Below this summed-direction length no movement is applied.
const MOVE_DEADZONE: f32 = 0.1;

#[derive(Clone, Copy, Debug)]
pub struct CameraControls {
    /// World units per second.
    pub speed: f32,
    /// Radians per pixel of drag.
    pub orbit_sensitivity: f32,
}

impl Default for CameraControls {
    fn default() -> Self {
        Self {
            speed: 5.0,
            orbit_sensitivity: PI / 720.0,
        }
    }
}

impl CameraControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Sum of the held movement keys' directions.
    pub fn movement_direction(camera: &Camera, input: &Input) -> Vec3 {
        let mut direction = Vec3::ZERO;
        if input.key_down(KeyCode::KeyW) {
            direction += camera.look();
        }
        if input.key_down(KeyCode::KeyS) {
            direction -= camera.look();
        }
        if input.key_down(KeyCode::KeyA) {
            direction += camera.left();
        }
        if input.key_down(KeyCode::KeyD) {
            direction += camera.right();
        }
        if input.key_down(KeyCode::Space) {
            direction += Vec3::Y;
        }
        if input.key_down(KeyCode::ControlLeft) || input.key_down(KeyCode::ControlRight) {
            direction -= Vec3::Y;
        }
        direction
    }

    /// Moves the camera along the held keys' direction, scaled by `dt` seconds.
    ///
    /// Returns whether the camera moved.
    pub fn fly(&self, camera: &mut Camera, input: &Input, dt: f32) -> bool {
        let direction = Self::movement_direction(camera, input);
        if direction.length() <= MOVE_DEADZONE {
            return false;
        }
        let position = camera.position() + dt * self.speed * direction.normalize();
        camera.set_translation(position);
        camera.update_view();
        true
    }

    /// Rotates the camera's look and up for a pointer drag of `(dx, dy)` pixels.
    ///
    /// Yaw turns about world +Y; pitch turns about the camera's current left
    /// axis. Both are folded into one quaternion before it is applied.
    pub fn orbit(&self, camera: &mut Camera, dx: f32, dy: f32) {
        let k = self.orbit_sensitivity;
        let yaw = quaternion::from_axis_angle(Vec3::Y, -dx * k);
        let pitch = quaternion::from_axis_angle(camera.left(), dy * k);

        let mut q = quaternion::IDENTITY;
        q = quaternion::multiply(q, yaw).normalize();
        q = quaternion::multiply(q, pitch).normalize();

        let look = quaternion::rotate(camera.look(), q);
        let up = quaternion::rotate(camera.up(), q);
        camera.set_rotation(look, up);
        camera.update_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn forward_moves_along_look_at_speed() {
        let mut camera = Camera::default();
        let mut input = Input::new();
        input.set_key_down(KeyCode::KeyW, true);

        assert!(CameraControls::default().fly(&mut camera, &input, 0.5));
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, -2.5), 1e-6));
        // The view follows the translation.
        assert!(camera.view().transform_point3(camera.position()).abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut camera = Camera::default();
        let mut input = Input::new();
        input.set_key_down(KeyCode::KeyA, true);
        input.set_key_down(KeyCode::KeyD, true);

        assert!(!CameraControls::default().fly(&mut camera, &input, 1.0));
        assert_eq!(camera.position(), Vec3::ZERO);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut camera = Camera::default();
        let mut input = Input::new();
        input.set_key_down(KeyCode::KeyD, true);
        input.set_key_down(KeyCode::Space, true);

        CameraControls::default().fly(&mut camera, &input, 1.0);
        assert_relative_eq!(camera.position().length(), 5.0, epsilon = 1e-5);
        assert!(camera.position().x > 0.0 && camera.position().y > 0.0);
    }

    #[test]
    fn horizontal_drag_yaws_about_world_up() {
        let mut camera = Camera::default();
        // 360 pixels at pi/720 per pixel is a quarter turn.
        CameraControls::default().orbit(&mut camera, 360.0, 0.0);
        assert!(camera.look().abs_diff_eq(Vec3::X, 1e-5), "{:?}", camera.look());
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn vertical_drag_pitches_about_left() {
        let mut camera = Camera::default();
        // Dragging down tips the view towards the floor.
        CameraControls::default().orbit(&mut camera, 0.0, 360.0);
        assert!(camera.look().abs_diff_eq(Vec3::NEG_Y, 1e-5), "{:?}", camera.look());
        assert!(camera.up().abs_diff_eq(Vec3::NEG_Z, 1e-5), "{:?}", camera.up());
    }

    #[test]
    fn combined_drag_does_not_roll() {
        let mut camera = Camera::default();
        let controls = CameraControls::default();
        controls.orbit(&mut camera, 360.0, 360.0);
        assert!(camera.look().abs_diff_eq(Vec3::NEG_Y, 1e-5), "{:?}", camera.look());
        assert!(camera.up().abs_diff_eq(Vec3::X, 1e-5), "{:?}", camera.up());
        assert_relative_eq!(camera.right().y, 0.0, epsilon = 1e-5);

        let mut camera = Camera::default();
        for i in 0..200 {
            let s = if i % 2 == 0 { 1.0 } else { -1.0 };
            controls.orbit(&mut camera, 20.0 * s, 20.0 * s);
        }
        assert_relative_eq!(camera.right().y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn either_control_key_descends() {
        let mut camera = Camera::default();
        let mut input = Input::new();
        input.set_key_down(KeyCode::ControlRight, true);

        assert!(CameraControls::default().fly(&mut camera, &input, 1.0));
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, -5.0, 0.0), 1e-5));
    }

    #[test]
    fn orbit_keeps_rotation_orthonormal() {
        let mut camera = Camera::default();
        let controls = CameraControls::default();
        for (dx, dy) in [(13.0, -7.0), (-120.0, 44.0), (3.0, 90.0)] {
            controls.orbit(&mut camera, dx, dy);
            let r = camera.rotation();
            assert!((r * r.transpose()).abs_diff_eq(glam::Mat4::IDENTITY, 1e-5));
        }
    }
}
