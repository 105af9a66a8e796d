//! Procedural primitive solids.
//!
//! Each primitive tessellates a canonical unit-sized shape centered at the
//! origin into a non-indexed triangle list of [`MeshVertex`] records. The
//! density is driven by a pair of [`ShapeParams`] whose meaning depends on
//! the shape:
//!
//! | Kind     | `p1`                        | `p2`            | Minimum  |
//! |----------|-----------------------------|-----------------|----------|
//! | Sphere   | latitude bands              | longitude wedges| (2, 3)   |
//! | Cube     | tiles per face edge         | unused          | (1, -)   |
//! | Cylinder | cap rings / side bands      | wedges          | (1, 3)   |
//! | Cone     | side bands / base rings     | wedges          | (1, 3)   |
//!
//! All triangles wind counter-clockwise when seen from outside the shape.
//!
//! One vertex buffer per kind is shared by every instance of that kind; see
//! [`MeshRegistry`].

mod cone;
mod cube;
mod cylinder;
mod instance;
mod registry;
mod sphere;

pub use cone::Cone;
pub use cube::Cube;
pub use cylinder::Cylinder;
pub use instance::{InstanceUniforms, Material, PrimitiveInstance};
pub use registry::{MeshBackend, MeshRegistry, MeshSlot};
pub use sphere::Sphere;

use serde::{Deserialize, Serialize};

use crate::mesh::MeshVertex;

/// Radius of the canonical round primitives.
pub(crate) const RADIUS: f32 = 0.5;
/// Half the height of the canonical primitives.
pub(crate) const HALF_HEIGHT: f32 = 0.5;

/// Tessellation density for a primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeParams {
    pub p1: u32,
    pub p2: u32,
}

impl ShapeParams {
    pub const fn new(p1: u32, p2: u32) -> Self {
        Self { p1, p2 }
    }
}

/// Capability shared by the four parametric primitives.
pub trait Tessellate {
    /// Raises `params` to this shape's minimum.
    fn clamp(params: ShapeParams) -> ShapeParams;

    /// Builds the triangle list for already-clamped `params`.
    fn tessellate(params: ShapeParams) -> Vec<MeshVertex>;

    /// Number of triangles [`Self::tessellate`] emits for `params`.
    fn triangle_count(params: ShapeParams) -> u32;

    /// Whether `params` describe a drawable mesh.
    fn is_renderable(params: ShapeParams) -> bool {
        Self::clamp(params) == params
    }
}

/// The closed set of parametric primitive kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Sphere,
    Cube,
    Cylinder,
    Cone,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 4] = [
        PrimitiveKind::Sphere,
        PrimitiveKind::Cube,
        PrimitiveKind::Cylinder,
        PrimitiveKind::Cone,
    ];

    /// Stable index into per-kind tables.
    pub const fn index(self) -> usize {
        match self {
            PrimitiveKind::Sphere => 0,
            PrimitiveKind::Cube => 1,
            PrimitiveKind::Cylinder => 2,
            PrimitiveKind::Cone => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Sphere => "Sphere",
            PrimitiveKind::Cube => "Cube",
            PrimitiveKind::Cylinder => "Cylinder",
            PrimitiveKind::Cone => "Cone",
        }
    }

    pub fn clamp(self, params: ShapeParams) -> ShapeParams {
        match self {
            PrimitiveKind::Sphere => Sphere::clamp(params),
            PrimitiveKind::Cube => Cube::clamp(params),
            PrimitiveKind::Cylinder => Cylinder::clamp(params),
            PrimitiveKind::Cone => Cone::clamp(params),
        }
    }

    pub fn tessellate(self, params: ShapeParams) -> Vec<MeshVertex> {
        match self {
            PrimitiveKind::Sphere => Sphere::tessellate(params),
            PrimitiveKind::Cube => Cube::tessellate(params),
            PrimitiveKind::Cylinder => Cylinder::tessellate(params),
            PrimitiveKind::Cone => Cone::tessellate(params),
        }
    }

    pub fn triangle_count(self, params: ShapeParams) -> u32 {
        match self {
            PrimitiveKind::Sphere => Sphere::triangle_count(params),
            PrimitiveKind::Cube => Cube::triangle_count(params),
            PrimitiveKind::Cylinder => Cylinder::triangle_count(params),
            PrimitiveKind::Cone => Cone::triangle_count(params),
        }
    }

    pub fn is_renderable(self, params: ShapeParams) -> bool {
        match self {
            PrimitiveKind::Sphere => Sphere::is_renderable(params),
            PrimitiveKind::Cube => Cube::is_renderable(params),
            PrimitiveKind::Cylinder => Cylinder::is_renderable(params),
            PrimitiveKind::Cone => Cone::is_renderable(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Analytic outward normal of `kind` near surface point `p`.
    fn outward(kind: PrimitiveKind, p: Vec3) -> Vec3 {
        const EPS: f32 = 1e-5;
        match kind {
            PrimitiveKind::Sphere => p,
            PrimitiveKind::Cube => {
                let a = p.abs();
                if a.x >= a.y && a.x >= a.z {
                    Vec3::X * p.x.signum()
                } else if a.y >= a.z {
                    Vec3::Y * p.y.signum()
                } else {
                    Vec3::Z * p.z.signum()
                }
            }
            PrimitiveKind::Cylinder => {
                if (p.y - HALF_HEIGHT).abs() < EPS {
                    Vec3::Y
                } else if (p.y + HALF_HEIGHT).abs() < EPS {
                    Vec3::NEG_Y
                } else {
                    Vec3::new(p.x, 0.0, p.z)
                }
            }
            PrimitiveKind::Cone => {
                if (p.y + HALF_HEIGHT).abs() < EPS {
                    Vec3::NEG_Y
                } else {
                    Vec3::new(2.0 * p.x, (0.5 - p.y) / 2.0, 2.0 * p.z)
                }
            }
        }
    }

    fn assert_outward_winding(kind: PrimitiveKind, params: ShapeParams) {
        let vertices = kind.tessellate(kind.clamp(params));
        assert_eq!(vertices.len() % 3, 0);

        let mut checked = 0;
        for tri in vertices.chunks_exact(3) {
            let (a, b, c) = (tri[0].position(), tri[1].position(), tri[2].position());
            let face = (b - a).cross(c - a);
            // Sphere poles collapse one edge of the first and last bands.
            if face.length() < 1e-7 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            let expected = outward(kind, centroid);
            assert!(
                face.dot(expected) > 0.0,
                "{} {:?}: triangle {:?} winds inward",
                kind.name(),
                params,
                [a, b, c]
            );
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn all_primitives_wind_outward() {
        for kind in PrimitiveKind::ALL {
            for params in [
                ShapeParams::new(1, 3),
                ShapeParams::new(2, 3),
                ShapeParams::new(3, 7),
                ShapeParams::new(8, 16),
            ] {
                assert_outward_winding(kind, params);
            }
        }
    }

    #[test]
    fn triangle_counts_match_emitted_vertices() {
        for kind in PrimitiveKind::ALL {
            for params in [ShapeParams::new(1, 3), ShapeParams::new(4, 5), ShapeParams::new(7, 9)] {
                let clamped = kind.clamp(params);
                let vertices = kind.tessellate(clamped);
                assert_eq!(
                    vertices.len() as u32,
                    kind.triangle_count(clamped) * 3,
                    "{} {:?}",
                    kind.name(),
                    clamped
                );
            }
        }
    }

    #[test]
    fn zero_params_clamp_to_minimums() {
        let zero = ShapeParams::new(0, 0);
        assert_eq!(PrimitiveKind::Sphere.clamp(zero), ShapeParams::new(2, 3));
        assert_eq!(PrimitiveKind::Cylinder.clamp(zero), ShapeParams::new(1, 3));
        assert_eq!(PrimitiveKind::Cone.clamp(zero), ShapeParams::new(1, 3));
        assert_eq!(PrimitiveKind::Cube.clamp(zero).p1, 1);

        assert_eq!(PrimitiveKind::Sphere.triangle_count(PrimitiveKind::Sphere.clamp(zero)), 12);
        assert_eq!(PrimitiveKind::Cube.triangle_count(PrimitiveKind::Cube.clamp(zero)), 12);
        assert_eq!(PrimitiveKind::Cylinder.triangle_count(PrimitiveKind::Cylinder.clamp(zero)), 12);
        assert_eq!(PrimitiveKind::Cone.triangle_count(PrimitiveKind::Cone.clamp(zero)), 6);
    }

    #[test]
    fn normals_are_unit_length() {
        for kind in PrimitiveKind::ALL {
            for v in kind.tessellate(kind.clamp(ShapeParams::new(4, 6))) {
                let len = v.normal().length();
                assert!((len - 1.0).abs() < 1e-4, "{}: normal length {len}", kind.name());
            }
        }
    }

    #[test]
    fn shapes_fit_unit_box() {
        for kind in PrimitiveKind::ALL {
            for v in kind.tessellate(kind.clamp(ShapeParams::new(5, 9))) {
                let p = v.position().abs();
                assert!(p.max_element() <= 0.5 + 1e-5, "{}: {:?}", kind.name(), p);
            }
        }
    }

    #[test]
    fn below_minimum_is_not_renderable() {
        assert!(!PrimitiveKind::Sphere.is_renderable(ShapeParams::new(1, 3)));
        assert!(!PrimitiveKind::Cone.is_renderable(ShapeParams::new(1, 2)));
        assert!(PrimitiveKind::Cylinder.is_renderable(ShapeParams::new(1, 3)));
    }

    #[test]
    fn huge_params_saturate_the_triangle_count() {
        let huge = ShapeParams::new(u32::MAX / 2, u32::MAX / 2);
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.triangle_count(huge), u32::MAX, "{}", kind.name());
        }
        assert_eq!(PrimitiveKind::Cone.triangle_count(ShapeParams::new(3, 8)), 80);
    }
}
