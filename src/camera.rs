//! Perspective camera with separately maintained rotation and translation.
//!
//! The view matrix is always `rotation · translation`. Each half is rebuilt
//! independently ([`Camera::set_translation`], [`Camera::set_rotation`]) and
//! then recombined by [`Camera::update_view`]; movement code must never skip
//! the recombination.
//!
//! [`Camera::projection`] follows the OpenGL clip convention (depth in
//! `[-1, 1]`). [`Camera::clip_projection`] remaps depth to wgpu's `[0, 1]`
//! for upload.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::scene::SceneCameraData;

/// Remaps OpenGL clip depth `[-1, 1]` to wgpu's `[0, 1]`.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    look: Vec3,
    up: Vec3,
    left: Vec3,
    right: Vec3,

    /// Vertical field of view in radians.
    height_angle: f32,
    aspect: f32,
    near: f32,
    far: f32,

    rotation: Mat4,
    inverse_rotation: Mat4,
    translation: Mat4,
    inverse_translation: Mat4,

    view: Mat4,
    inverse_view: Mat4,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            FRAC_PI_2,
            1.0,
            0.1,
            10.0,
        )
    }
}

impl Camera {
    /// Builds a camera and derives every matrix.
    ///
    /// With `near == far` the projection is left as identity until valid
    /// planes arrive through [`Self::set_clip_planes`].
    pub fn new(
        position: Vec3,
        look: Vec3,
        up: Vec3,
        height_angle: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            look,
            up,
            left: Vec3::NEG_X,
            right: Vec3::X,
            height_angle,
            aspect,
            near,
            far,
            rotation: Mat4::IDENTITY,
            inverse_rotation: Mat4::IDENTITY,
            translation: Mat4::IDENTITY,
            inverse_translation: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.set_translation(position);
        camera.set_rotation(look, up);
        camera.update_view();
        if near != far {
            camera.generate_projection();
        }
        camera
    }

    /// Camera placed as described by a scene file.
    pub fn from_scene(data: &SceneCameraData, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(
            data.position.truncate(),
            data.look.truncate(),
            data.up.truncate(),
            data.height_angle,
            aspect,
            near,
            far,
        )
    }

    /// Rebuilds the translation half of the view. Call [`Self::update_view`] after.
    pub fn set_translation(&mut self, position: Vec3) {
        self.position = position;
        self.translation = Mat4::from_translation(-position);
        self.inverse_translation = Mat4::from_translation(position);
    }

    /// Rebuilds the rotation half of the view from a look and up direction.
    ///
    /// `look` and `up` must not be parallel. Call [`Self::update_view`] after.
    pub fn set_rotation(&mut self, look: Vec3, up: Vec3) {
        let look = look.normalize();
        let up = up.normalize();
        self.look = look;
        self.up = up;

        self.right = look.cross(up).normalize();
        self.left = -self.right;

        let w = -look;
        let v = (up - up.dot(w) * w).normalize();
        let u = v.cross(w);

        // u, v, w are the rows.
        let basis = Mat3::from_cols(u, v, w).transpose();
        self.rotation = Mat4::from_mat3(basis);
        self.inverse_rotation = self.rotation.transpose();
    }

    /// Recombines the view from the current rotation and translation.
    pub fn update_view(&mut self) {
        self.view = self.rotation * self.translation;
        self.inverse_view = self.inverse_rotation * self.inverse_translation;
    }

    /// Derives the perspective projection from fov, aspect and clip planes.
    ///
    /// Callers must not invoke this with `near == far`.
    pub fn generate_projection(&mut self) {
        debug_assert!(self.near != self.far, "degenerate clip planes");

        let height_ratio = (self.height_angle / 2.0).tan();
        let width_ratio = height_ratio * self.aspect;

        let scale = Mat4::from_diagonal(Vec4::new(
            1.0 / (self.far * width_ratio),
            1.0 / (self.far * height_ratio),
            1.0 / self.far,
            1.0,
        ));

        // Unhinge the normalized frustum into a parallel view volume.
        let c = -self.near / self.far;
        let unhinge = Mat4::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0 / (1.0 + c), -1.0),
            Vec4::new(0.0, 0.0, -c / (1.0 + c), 0.0),
        );

        // Map view depth [0, -1] onto clip depth [-1, 1].
        let clip_space = Mat4::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -2.0, 0.0),
            Vec4::new(0.0, 0.0, -1.0, 1.0),
        );

        self.projection = clip_space * unhinge * scale;
    }

    /// Updates the aspect ratio from pixel dimensions and re-derives the projection.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        if self.near != self.far {
            self.generate_projection();
        }
    }

    /// Stores new clip planes. The projection is only re-derived when they differ.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        if near != far {
            self.generate_projection();
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look(&self) -> Vec3 {
        self.look
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn left(&self) -> Vec3 {
        self.left
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn height_angle(&self) -> f32 {
        self.height_angle
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn rotation(&self) -> Mat4 {
        self.rotation
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn inverse_view(&self) -> Mat4 {
        self.inverse_view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Projection with wgpu's depth range, ready for upload.
    pub fn clip_projection(&self) -> Mat4 {
        OPENGL_TO_WGPU * self.projection
    }

    /// The view with its translation stripped, for drawing the skybox.
    pub fn view_without_translation(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view))
    }
}
