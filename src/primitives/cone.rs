use std::f32::consts::TAU;

use glam::Vec3;

use crate::coords::{Quad, cylinder_to_cartesian, push_vertex};
use crate::mesh::MeshVertex;

use super::cylinder::bottom_cap;
use super::{HALF_HEIGHT, RADIUS, ShapeParams, Tessellate};

/// A unit cone with its apex at `y = 0.5` and base disc at `y = -0.5`.
///
/// Side vertices use the smooth lateral normal from [`Cone::lateral_normal`]
/// instead of per-facet normals. The apex has no single normal, so the apex
/// vertex of each wedge borrows the one at the wedge's mid-angle on the first
/// ring.
pub struct Cone;

impl Cone {
    /// `normalize(2x, (0.5 - y) / 2, 2z)`, the gradient of the cone surface.
    pub fn lateral_normal(p: Vec3) -> Vec3 {
        Vec3::new(2.0 * p.x, (0.5 - p.y) / 2.0, 2.0 * p.z).normalize()
    }
}

impl Tessellate for Cone {
    fn clamp(params: ShapeParams) -> ShapeParams {
        ShapeParams::new(params.p1.max(1), params.p2.max(3))
    }

    fn tessellate(params: ShapeParams) -> Vec<MeshVertex> {
        let mut buffer = Vec::with_capacity(Self::triangle_count(params) as usize * 3);
        let wedge_angle = TAU / params.p2 as f32;

        for wedge in 0..params.p2 {
            let theta = wedge as f32 * wedge_angle;
            let next_theta = theta + wedge_angle;
            lateral(&mut buffer, theta, next_theta, params.p1);
            bottom_cap(&mut buffer, theta, next_theta, params.p1);
        }

        buffer
    }

    fn triangle_count(params: ShapeParams) -> u32 {
        params
            .p2
            .saturating_mul(params.p1.saturating_mul(4).saturating_sub(2))
    }
}

fn lateral(buffer: &mut Vec<MeshVertex>, theta: f32, next_theta: f32, bands: u32) {
    let band_height = -2.0 * HALF_HEIGHT / bands as f32;
    let ring_width = RADIUS / bands as f32;
    let at = |angle: f32, band: u32| {
        cylinder_to_cartesian(
            angle,
            ring_width * band as f32,
            HALF_HEIGHT + band_height * band as f32,
        )
    };

    let apex = Vec3::new(0.0, HALF_HEIGHT, 0.0);
    let left = at(theta, 1);
    let right = at(next_theta, 1);
    let apex_normal = Cone::lateral_normal(at((theta + next_theta) / 2.0, 1));

    push_vertex(buffer, apex, apex_normal);
    push_vertex(buffer, left, Cone::lateral_normal(left));
    push_vertex(buffer, right, Cone::lateral_normal(right));

    for band in 1..bands {
        let quad = Quad::new(
            at(theta, band),
            at(next_theta, band),
            at(theta, band + 1),
            at(next_theta, band + 1),
        );
        quad.emit_fan(buffer, Cone::lateral_normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lateral_normals_follow_gradient_formula() {
        let vertices = Cone::tessellate(ShapeParams::new(4, 6));
        for v in vertices.iter().filter(|v| v.normal().y > -0.5) {
            let p = v.position();
            if p.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6) {
                continue;
            }
            assert!(v.normal().abs_diff_eq(Cone::lateral_normal(p), 1e-6));
        }
    }

    #[test]
    fn apex_normal_is_finite_and_points_up_and_out() {
        let vertices = Cone::tessellate(ShapeParams::new(2, 4));
        let apex = vertices
            .iter()
            .find(|v| v.position().abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6))
            .map(|v| v.normal());
        let Some(n) = apex else {
            panic!("cone has no apex vertex");
        };
        assert!(n.is_finite());
        assert!(n.y > 0.0);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    /// The smooth lateral normal deliberately differs from the facet normal;
    /// the difference is largest on the coarse triangles that meet the apex.
    #[test]
    fn smooth_normal_differs_from_facet_normal_near_apex() {
        let vertices = Cone::tessellate(ShapeParams::new(1, 3));
        let apex_tri = &vertices[0..3];
        let (a, b, c) = (
            apex_tri[0].position(),
            apex_tri[1].position(),
            apex_tri[2].position(),
        );
        let facet = (b - a).cross(c - a).normalize();
        let smooth = apex_tri[0].normal();

        assert!(facet.dot(smooth) > 0.0);
        assert!(facet.angle_between(smooth) > 1e-3);
    }
}
