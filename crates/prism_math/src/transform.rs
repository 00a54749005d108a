// Rotation convention shared by every shape kind and the tracing kernel.

use glam::{EulerRot, Quat, Vec3};

/// Convert Euler angles in degrees to a rotation.
///
/// Angles are applied Z first, then X, then Y (rotation = Ry * Rx * Rz).
pub fn euler_degrees_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_zero_degrees_is_identity() {
        let q = euler_degrees_to_quat(Vec3::ZERO);
        for v in [Vec3::X, Vec3::Y, Vec3::Z] {
            assert!(approx(q * v, v));
        }
    }

    #[test]
    fn test_euler_single_axis_matches_glam() {
        let q = euler_degrees_to_quat(Vec3::new(0.0, 90.0, 0.0));
        assert!(approx(q * Vec3::X, Quat::from_rotation_y(90f32.to_radians()) * Vec3::X));

        let q = euler_degrees_to_quat(Vec3::new(90.0, 0.0, 0.0));
        assert!(approx(q * Vec3::Y, Vec3::Z));

        // Roll: X rotates onto Y
        let q = euler_degrees_to_quat(Vec3::new(0.0, 0.0, 90.0));
        assert!(approx(q * Vec3::X, Vec3::Y));
    }

    #[test]
    fn test_euler_order_is_z_then_x_then_y() {
        let degrees = Vec3::new(30.0, 45.0, 60.0);
        let expected = Quat::from_rotation_y(45f32.to_radians())
            * Quat::from_rotation_x(30f32.to_radians())
            * Quat::from_rotation_z(60f32.to_radians());
        let actual = euler_degrees_to_quat(degrees);

        for v in [Vec3::X, Vec3::Y, Vec3::Z] {
            assert!(approx(actual * v, expected * v));
        }
    }

    #[test]
    fn test_full_turn_wraps() {
        let a = euler_degrees_to_quat(Vec3::new(10.0, 20.0, 370.0));
        let b = euler_degrees_to_quat(Vec3::new(10.0, 20.0, 10.0));
        for v in [Vec3::X, Vec3::Y, Vec3::Z] {
            assert!(approx(a * v, b * v));
        }
    }
}
