//! Scene primitives: spheres, boxes and planes with a transform and material.

use std::fmt;

use prism_math::{euler_degrees_to_quat, Aabb, Mat4, Quat, Vec3};

use crate::material::Material;

/// Stable identifier of a primitive inside a [`PrimitiveStore`](crate::PrimitiveStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub u64);

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape kind. The discriminants are the shape tags the kernel reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Shape {
    Sphere = 1,
    Box = 2,
    Plane = 3,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Sphere, Shape::Box, Shape::Plane];

    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Shape::Sphere => "sphere",
            Shape::Box => "box",
            Shape::Plane => "plane",
        }
    }
}

/// World-space transform with rotation kept as Euler degrees.
///
/// See [`euler_degrees_to_quat`] for the rotation convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,

    /// Euler angles in degrees (Z, then X, then Y)
    pub rotation: Vec3,

    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with only translation.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation_quat(&self) -> Quat {
        euler_degrees_to_quat(self.rotation)
    }

    /// Convert to a 4x4 transformation matrix.
    ///
    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }

    /// Local +Y rotated into world space.
    pub fn up(&self) -> Vec3 {
        self.rotation_quat() * Vec3::Y
    }
}

/// One scene object.
///
/// The material is optional so that a primitive can be authored before one is
/// assigned; registries refuse primitives without a material.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub transform: Transform,
    pub material: Option<Material>,
}

impl Primitive {
    pub fn new(shape: Shape, transform: Transform, material: Material) -> Self {
        Self {
            shape,
            transform,
            material: Some(material),
        }
    }

    /// Sphere of the given radius; the transform scale is the diameter.
    pub fn sphere(center: Vec3, radius: f32, material: Material) -> Self {
        let transform = Transform::from_position(center).with_scale(Vec3::splat(radius * 2.0));
        Self::new(Shape::Sphere, transform, material)
    }

    /// Unit cube scaled by `size` and rotated by Euler `degrees`.
    pub fn cuboid(center: Vec3, size: Vec3, degrees: Vec3, material: Material) -> Self {
        let transform = Transform::from_position(center)
            .with_scale(size)
            .with_rotation(degrees);
        Self::new(Shape::Box, transform, material)
    }

    pub fn plane(point: Vec3, degrees: Vec3, material: Material) -> Self {
        let transform = Transform::from_position(point).with_rotation(degrees);
        Self::new(Shape::Plane, transform, material)
    }

    /// Plane normal (world up of the primitive).
    pub fn normal(&self) -> Vec3 {
        self.transform.up()
    }

    /// World-space bounds, or `None` for unbounded shapes.
    ///
    /// Spheres ignore rotation and use half the scale per axis. Planes are
    /// infinite and are left out of the bounding tree.
    pub fn bounds(&self) -> Option<Aabb> {
        match self.shape {
            Shape::Sphere => Some(sphere_bounds(&self.transform)),
            Shape::Box => Some(box_bounds(&self.transform)),
            Shape::Plane => None,
        }
    }
}

fn sphere_bounds(transform: &Transform) -> Aabb {
    Aabb::from_center_half_extent(transform.position, transform.scale * 0.5)
}

fn box_bounds(transform: &Transform) -> Aabb {
    let m = transform.to_matrix();

    // The other four corners are negations of these, so they add nothing
    // to the per-axis maximum.
    let half_extent = [
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(0.5, 0.5, -0.5),
    ]
    .iter()
    .map(|&corner| m.transform_vector3(corner).abs())
    .fold(Vec3::ZERO, Vec3::max);

    Aabb::from_center_half_extent(transform.position, half_extent)
}
