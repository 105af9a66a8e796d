use std::f32::consts::TAU;

use glam::Vec3;

use crate::coords::{Quad, cylinder_to_cartesian, push_vertex};
use crate::mesh::MeshVertex;

use super::{HALF_HEIGHT, RADIUS, ShapeParams, Tessellate};

/// A unit cylinder along the Y axis.
///
/// Each of the `p2` wedges carries a top cap of `p1` rings, `p1` side bands
/// and a bottom cap mirroring the top.
pub struct Cylinder;

impl Tessellate for Cylinder {
    fn clamp(params: ShapeParams) -> ShapeParams {
        ShapeParams::new(params.p1.max(1), params.p2.max(3))
    }

    fn tessellate(params: ShapeParams) -> Vec<MeshVertex> {
        let mut buffer = Vec::with_capacity(Self::triangle_count(params) as usize * 3);
        let wedge_angle = TAU / params.p2 as f32;

        for wedge in 0..params.p2 {
            let theta = wedge as f32 * wedge_angle;
            let next_theta = theta + wedge_angle;
            top_cap(&mut buffer, theta, next_theta, params.p1);
            side(&mut buffer, theta, next_theta, params.p1);
            bottom_cap(&mut buffer, theta, next_theta, params.p1);
        }

        buffer
    }

    fn triangle_count(params: ShapeParams) -> u32 {
        params
            .p2
            .saturating_mul(params.p1.saturating_mul(6).saturating_sub(2))
    }
}

fn top_cap(buffer: &mut Vec<MeshVertex>, theta: f32, next_theta: f32, rings: u32) {
    let ring_width = RADIUS / rings as f32;
    let at = |angle: f32, ring: u32| cylinder_to_cartesian(angle, ring_width * ring as f32, HALF_HEIGHT);

    push_vertex(buffer, Vec3::new(0.0, HALF_HEIGHT, 0.0), Vec3::Y);
    push_vertex(buffer, at(theta, 1), Vec3::Y);
    push_vertex(buffer, at(next_theta, 1), Vec3::Y);

    for ring in 1..rings {
        let quad = Quad::new(
            at(theta, ring),
            at(next_theta, ring),
            at(theta, ring + 1),
            at(next_theta, ring + 1),
        );
        quad.emit_fan(buffer, |_| Vec3::Y);
    }
}

fn side(buffer: &mut Vec<MeshVertex>, theta: f32, next_theta: f32, bands: u32) {
    let band_height = -2.0 * HALF_HEIGHT / bands as f32;
    let at = |angle: f32, band: u32| {
        cylinder_to_cartesian(angle, RADIUS, HALF_HEIGHT + band_height * band as f32)
    };

    for band in 0..bands {
        let quad = Quad::new(
            at(theta, band),
            at(next_theta, band),
            at(theta, band + 1),
            at(next_theta, band + 1),
        );
        quad.emit_fan(buffer, |p| Vec3::new(p.x, 0.0, p.z).normalize());
    }
}

/// Bottom disc at `y = -0.5`, facing -Y. Shared with [`super::Cone`].
pub(super) fn bottom_cap(buffer: &mut Vec<MeshVertex>, theta: f32, next_theta: f32, rings: u32) {
    let ring_width = RADIUS / rings as f32;
    let at = |angle: f32, ring: u32| cylinder_to_cartesian(angle, ring_width * ring as f32, -HALF_HEIGHT);

    push_vertex(buffer, Vec3::new(0.0, -HALF_HEIGHT, 0.0), Vec3::NEG_Y);
    push_vertex(buffer, at(next_theta, 1), Vec3::NEG_Y);
    push_vertex(buffer, at(theta, 1), Vec3::NEG_Y);

    for ring in 1..rings {
        let quad = Quad::new(
            at(theta, ring + 1),
            at(next_theta, ring + 1),
            at(theta, ring),
            at(next_theta, ring),
        );
        quad.emit_fan(buffer, |_| Vec3::NEG_Y);
    }
}
