//! Quaternion and rotation helpers for camera orbiting.
//!
//! Quaternions are packed as `Vec4(x, y, z, w)` with the imaginary part in
//! `xyz` and the real part in `w`, the same layout glam's [`glam::Quat`] uses.
//! The free functions here spell the algebra out so the orbit controller can
//! accumulate rotations exactly as written.

use glam::{Vec3, Vec4, Vec4Swizzles};

/// The identity rotation.
pub const IDENTITY: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Hamilton product `a · b`.
pub fn multiply(a: Vec4, b: Vec4) -> Vec4 {
    let (va, wa) = (a.xyz(), a.w);
    let (vb, wb) = (b.xyz(), b.w);

    let real = wa * wb - va.dot(vb);
    let imaginary = vb * wa + va * wb + va.cross(vb);
    imaginary.extend(real)
}

/// Conjugate; equals the inverse for unit quaternions.
pub fn conjugate(q: Vec4) -> Vec4 {
    Vec4::new(-q.x, -q.y, -q.z, q.w)
}

/// Rotates `v` by the unit quaternion `q` as `q · v · q*`.
pub fn rotate(v: Vec3, q: Vec4) -> Vec3 {
    let pure = v.extend(0.0);
    multiply(multiply(q, pure), conjugate(q)).xyz()
}

/// Encodes a rotation of `angle` radians about `axis`.
///
/// `axis` is normalized first; a zero axis yields the identity.
pub fn from_axis_angle(axis: Vec3, angle: f32) -> Vec4 {
    let Some(axis) = axis.try_normalize() else {
        return IDENTITY;
    };
    let half = angle * 0.5;
    (axis * half.sin()).extend(half.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::{Mat3, Quat};
    use std::f32::consts::{FRAC_PI_2, PI};

    /// Rodrigues rotation matrix for `angle` radians about the unit `axis`.
    fn rodrigues(axis: Vec3, angle: f32) -> Mat3 {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let Vec3 { x, y, z } = axis;

        Mat3::from_cols(
            Vec3::new(t * x * x + c, t * x * y + s * z, t * x * z - s * y),
            Vec3::new(t * x * y - s * z, t * y * y + c, t * y * z + s * x),
            Vec3::new(t * x * z + s * y, t * y * z - s * x, t * z * z + c),
        )
    }

    fn as_quat(q: Vec4) -> Quat {
        Quat::from_vec4(q)
    }

    #[test]
    fn product_matches_glam() {
        let a = from_axis_angle(Vec3::new(1.0, 2.0, 3.0), 0.7);
        let b = from_axis_angle(Vec3::new(-2.0, 0.5, 1.0), -1.3);
        let ours = multiply(a, b);
        let theirs = as_quat(a) * as_quat(b);
        assert!(as_quat(ours).abs_diff_eq(theirs, 1e-6));
    }

    #[test]
    fn rotation_about_y_turns_z_into_x() {
        let q = from_axis_angle(Vec3::Y, FRAC_PI_2);
        let v = rotate(Vec3::Z, q);
        assert!(v.abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn rotate_matches_glam_and_rodrigues() {
        let axis = Vec3::new(0.3, -1.0, 0.4).normalize();
        let angle = 2.1;
        let q = from_axis_angle(axis, angle);
        let v = Vec3::new(1.5, -0.25, 2.0);

        let ours = rotate(v, q);
        assert!(ours.abs_diff_eq(Quat::from_axis_angle(axis, angle) * v, 1e-5));
        assert!(ours.abs_diff_eq(rodrigues(axis, angle) * v, 1e-5));
    }

    #[test]
    fn conjugate_undoes_rotation() {
        let q = from_axis_angle(Vec3::new(1.0, 1.0, 0.0), PI / 3.0);
        let v = Vec3::new(0.2, 0.4, -0.9);
        let back = rotate(rotate(v, q), conjugate(q));
        assert!(back.abs_diff_eq(v, 1e-6));
    }

    #[test]
    fn unit_quaternion_stays_unit_under_composition() {
        let mut q = IDENTITY;
        for i in 0..100 {
            let step = from_axis_angle(Vec3::new(1.0, i as f32, 2.0), 0.05);
            q = multiply(q, step).normalize();
        }
        assert_abs_diff_eq!(q.length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_axis_is_identity() {
        assert_eq!(from_axis_angle(Vec3::ZERO, 1.0), IDENTITY);
    }
}
