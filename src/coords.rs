//! Coordinate conversions and small geometric helpers used by the primitive
//! tessellators.
//!
//! All primitives are built in a canonical unit-sized frame with +Y up. The
//! angular parameter `theta` sweeps from +Z towards +X.

use glam::Vec3;

use crate::mesh::MeshVertex;

/// Converts cylindrical coordinates to cartesian.
///
/// `theta` is the angle around the Y axis, `r` the distance from it and `h`
/// the height along it.
#[inline]
pub fn cylinder_to_cartesian(theta: f32, r: f32, h: f32) -> Vec3 {
    Vec3::new(theta.sin() * r, h, theta.cos() * r)
}

/// Converts spherical coordinates to cartesian.
///
/// `phi` is measured from the +Y pole, so `phi = 0` is the top of the sphere.
#[inline]
pub fn spherical_to_cartesian(theta: f32, phi: f32, r: f32) -> Vec3 {
    Vec3::new(
        theta.sin() * phi.sin() * r,
        phi.cos() * r,
        theta.cos() * phi.sin() * r,
    )
}

/// Appends one interleaved position/normal record.
#[inline]
pub fn push_vertex(buffer: &mut Vec<MeshVertex>, position: Vec3, normal: Vec3) {
    buffer.push(MeshVertex::new(position, normal));
}

/// Flat normal of a planar quad given three of its corners.
///
/// Computed as `normalize(cross(a - pivot, b - pivot))`.
#[inline]
pub fn tile_normal(a: Vec3, b: Vec3, pivot: Vec3) -> Vec3 {
    (a - pivot).cross(b - pivot).normalize()
}

/// The four corners of a quadrilateral tile.
///
/// "Top" and "left" are relative to the tile's own parameterization, not to
/// world space.
#[derive(Clone, Copy, Debug)]
pub struct Quad {
    pub top_left: Vec3,
    pub top_right: Vec3,
    pub bottom_left: Vec3,
    pub bottom_right: Vec3,
}

impl Quad {
    pub fn new(top_left: Vec3, top_right: Vec3, bottom_left: Vec3, bottom_right: Vec3) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Normal of the tile's plane, `normalize(cross(TL - BR, BL - BR))`.
    pub fn flat_normal(&self) -> Vec3 {
        tile_normal(self.top_left, self.bottom_left, self.bottom_right)
    }

    /// Emits `(TL, BL, BR)` then `(TR, TL, BR)`, each vertex shaded by `normal_of`.
    pub fn emit_diagonal(&self, buffer: &mut Vec<MeshVertex>, normal_of: impl Fn(Vec3) -> Vec3) {
        for p in [
            self.top_left,
            self.bottom_left,
            self.bottom_right,
            self.top_right,
            self.top_left,
            self.bottom_right,
        ] {
            push_vertex(buffer, p, normal_of(p));
        }
    }

    /// Emits `(TL, BL, TR)` then `(TR, BL, BR)`, each vertex shaded by `normal_of`.
    pub fn emit_fan(&self, buffer: &mut Vec<MeshVertex>, normal_of: impl Fn(Vec3) -> Vec3) {
        for p in [
            self.top_left,
            self.bottom_left,
            self.top_right,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ] {
            push_vertex(buffer, p, normal_of(p));
        }
    }
}
