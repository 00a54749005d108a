//! Random scene population.

use prism_math::{Vec3, Vec4};
use prism_scene::{Material, MaterialType, Primitive};
use rand::Rng;

/// Region spheres are placed in.
#[derive(Debug, Clone, Copy)]
pub struct ScatterBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for ScatterBounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(-10.0, 0.5, -10.0),
            max: Vec3::new(10.0, 4.0, 10.0),
        }
    }
}

/// `count` spheres at uniform positions inside `bounds`, each with a random
/// diffuse or glossy material.
pub fn random_spheres<R: Rng>(rng: &mut R, count: usize, bounds: ScatterBounds) -> Vec<Primitive> {
    (0..count)
        .map(|_| {
            let center = Vec3::new(
                rng.gen_range(bounds.min.x..=bounds.max.x),
                rng.gen_range(bounds.min.y..=bounds.max.y),
                rng.gen_range(bounds.min.z..=bounds.max.z),
            );
            Primitive::sphere(center, 0.5, random_material(rng))
        })
        .collect()
}

pub fn random_material<R: Rng>(rng: &mut R) -> Material {
    let material_type = if rng.gen_bool(0.5) {
        MaterialType::Diffuse
    } else {
        MaterialType::Glossy
    };
    let color = hsv_to_rgba(
        rng.gen_range(0.0..=1.0),
        rng.gen_range(0.9..=1.0),
        rng.gen_range(0.5..=1.0),
    );

    let mut material = Material::default();
    material.set(material_type, color, rng.gen_range(0.0..=1.0), rng.gen_range(0.0..=1.0));
    material
}

/// Static scenery: a ground plane and a few boxes.
pub fn scenery() -> Vec<Primitive> {
    let grey = Material::diffuse(Vec4::new(0.6, 0.6, 0.6, 1.0));
    vec![
        Primitive::plane(Vec3::ZERO, Vec3::ZERO, grey.clone()),
        Primitive::cuboid(
            Vec3::new(-4.0, 1.0, 0.0),
            Vec3::splat(2.0),
            Vec3::new(0.0, 30.0, 0.0),
            grey.clone(),
        ),
        Primitive::cuboid(
            Vec3::new(4.0, 0.5, 3.0),
            Vec3::new(3.0, 1.0, 1.0),
            Vec3::ZERO,
            grey,
        ),
    ]
}

fn hsv_to_rgba(h: f32, s: f32, v: f32) -> Vec4 {
    let h = (h.fract() * 6.0).max(0.0);
    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    Vec4::new(r + m, g + m, b + m, 1.0)
}
