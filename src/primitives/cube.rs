use glam::Vec3;

use crate::coords::Quad;
use crate::mesh::MeshVertex;

use super::{ShapeParams, Tessellate};

/// An axis-aligned unit cube, each face split into a `p1 × p1` grid.
///
/// `p2` is ignored and normalized to 1 so cached parameters compare equal.
pub struct Cube;

impl Tessellate for Cube {
    fn clamp(params: ShapeParams) -> ShapeParams {
        ShapeParams::new(params.p1.max(1), 1)
    }

    fn tessellate(params: ShapeParams) -> Vec<MeshVertex> {
        let n = params.p1;
        let mut buffer = Vec::with_capacity(Self::triangle_count(params) as usize * 3);

        let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z) * 0.5;
        let pt1 = c(1.0, 1.0, 1.0);
        let pt2 = c(1.0, 1.0, -1.0);
        let pt3 = c(1.0, -1.0, 1.0);
        let pt4 = c(1.0, -1.0, -1.0);
        let pt5 = c(-1.0, 1.0, 1.0);
        let pt6 = c(-1.0, 1.0, -1.0);
        let pt7 = c(-1.0, -1.0, 1.0);
        let pt8 = c(-1.0, -1.0, -1.0);

        // +Y, +X, -Y, -X, +Z, -Z
        make_face(&mut buffer, n, pt6, pt2, pt5, pt1);
        make_face(&mut buffer, n, pt1, pt2, pt3, pt4);
        make_face(&mut buffer, n, pt7, pt3, pt8, pt4);
        make_face(&mut buffer, n, pt6, pt5, pt8, pt7);
        make_face(&mut buffer, n, pt5, pt1, pt7, pt3);
        make_face(&mut buffer, n, pt2, pt6, pt4, pt8);

        buffer
    }

    fn triangle_count(params: ShapeParams) -> u32 {
        12u32.saturating_mul(params.p1).saturating_mul(params.p1)
    }

    fn is_renderable(params: ShapeParams) -> bool {
        params.p1 >= 1
    }
}

/// Subdivides one face by bilinear stepping from its top-left corner.
fn make_face(
    buffer: &mut Vec<MeshVertex>,
    n: u32,
    top_left: Vec3,
    top_right: Vec3,
    bottom_left: Vec3,
    bottom_right: Vec3,
) {
    let across = (top_right - top_left) / n as f32;
    let down = (bottom_left - top_left) / n as f32;
    debug_assert!(across.abs_diff_eq((bottom_right - bottom_left) / n as f32, 1e-6));

    for row in 0..n {
        for col in 0..n {
            let origin = top_left + across * col as f32 + down * row as f32;
            let quad = Quad::new(origin, origin + across, origin + down, origin + across + down);
            let normal = quad.flat_normal();
            quad.emit_diagonal(buffer, |_| normal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_face_has_constant_axis_normal() {
        let vertices = Cube::tessellate(ShapeParams::new(3, 1));
        let per_face = 3 * 3 * 6;
        let expected = [Vec3::Y, Vec3::X, Vec3::NEG_Y, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];

        for (face, normal) in vertices.chunks_exact(per_face).zip(expected) {
            for v in face {
                assert!(v.normal().abs_diff_eq(normal, 1e-6));
                // Every vertex lies on the face plane.
                assert!((v.position().dot(normal) - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn second_parameter_is_ignored() {
        assert_eq!(Cube::clamp(ShapeParams::new(4, 0)), Cube::clamp(ShapeParams::new(4, 99)));
        assert_eq!(Cube::tessellate(Cube::clamp(ShapeParams::new(2, 40))).len(), 12 * 4 * 3);
    }
}
