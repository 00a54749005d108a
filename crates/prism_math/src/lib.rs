// Re-export glam for convenience
pub use glam::*;

// Prism math types
mod aabb;
mod transform;

pub use aabb::Aabb;
pub use transform::euler_degrees_to_quat;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_corners_fit_in_union() {
        let rotation = euler_degrees_to_quat(Vec3::new(0.0, 45.0, 0.0));
        let m = Mat4::from_scale_rotation_translation(Vec3::ONE, rotation, Vec3::X);
        let b = [Vec3::splat(-0.5), Vec3::splat(0.5)]
            .into_iter()
            .fold(Aabb::EMPTY, |acc, corner| acc.union_point(m.transform_point3(corner)));

        assert!((b.center() - Vec3::X).length() < 1e-5);
        assert!((b.half_extent().y - 0.5).abs() < 1e-5);
    }
}
