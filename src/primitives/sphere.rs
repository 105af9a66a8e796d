use std::f32::consts::{PI, TAU};

use crate::coords::{Quad, spherical_to_cartesian};
use crate::mesh::MeshVertex;

use super::{RADIUS, ShapeParams, Tessellate};

/// A UV sphere of diameter 1.
///
/// `p1` latitude bands run pole to pole; `p2` wedges split the longitude.
/// Bands touching a pole keep their degenerate edge rather than collapsing
/// into a fan, so every band emits two triangles per wedge.
pub struct Sphere;

impl Tessellate for Sphere {
    fn clamp(params: ShapeParams) -> ShapeParams {
        ShapeParams::new(params.p1.max(2), params.p2.max(3))
    }

    fn tessellate(params: ShapeParams) -> Vec<MeshVertex> {
        let mut buffer = Vec::with_capacity(Self::triangle_count(params) as usize * 3);
        let wedge_angle = TAU / params.p2 as f32;

        for wedge in 0..params.p2 {
            let theta = wedge as f32 * wedge_angle;
            make_wedge(&mut buffer, theta, theta + wedge_angle, params.p1);
        }

        buffer
    }

    fn triangle_count(params: ShapeParams) -> u32 {
        2u32.saturating_mul(params.p1).saturating_mul(params.p2)
    }
}

fn make_wedge(buffer: &mut Vec<MeshVertex>, theta: f32, next_theta: f32, bands: u32) {
    let band_angle = PI / bands as f32;

    for band in 0..bands {
        let phi = band as f32 * band_angle;
        let next_phi = phi + band_angle;

        let quad = Quad::new(
            spherical_to_cartesian(theta, phi, RADIUS),
            spherical_to_cartesian(next_theta, phi, RADIUS),
            spherical_to_cartesian(theta, next_phi, RADIUS),
            spherical_to_cartesian(next_theta, next_phi, RADIUS),
        );
        quad.emit_diagonal(buffer, |p| p.normalize());
    }
}
