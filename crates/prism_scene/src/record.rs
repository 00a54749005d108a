//! Fixed-layout GPU records.
//!
//! Every record is `#[repr(C)]`, built only from 32-bit fields and therefore
//! free of padding. The field order is the wire layout the tracing kernel
//! reads; reordering any field is a breaking change, which the stride
//! assertions at the bottom of this file guard.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};

use crate::material::Material;
use crate::primitive::{Primitive, Shape};

/// A record type that a registry can rebuild into a GPU buffer.
pub trait GpuRecord: Pod {
    /// Size in bytes of one element as the kernel sees it.
    const STRIDE: usize;

    /// Whether a registry of this record type may hold the given shape.
    fn accepts(shape: Shape) -> bool;

    /// Encode one primitive. Pure and deterministic.
    fn encode(primitive: &Primitive) -> Self;
}

/// Shading inputs shared by every shape record.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialRecord {
    pub albedo: [f32; 4],
    pub specular: [f32; 4],
    pub material_type: i32,
}

impl MaterialRecord {
    pub const STRIDE: usize = 9 * 4;

    pub fn from_material(material: &Material) -> Self {
        Self {
            albedo: material.albedo().to_array(),
            specular: material.specular().to_array(),
            material_type: material.material_type().tag(),
        }
    }
}

/// Unified record for spheres and boxes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GeometryRecord {
    pub position: [f32; 3],
    /// Euler degrees, see [`prism_math::euler_degrees_to_quat`]
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub shape: i32,
    pub material: MaterialRecord,
}

impl GpuRecord for GeometryRecord {
    const STRIDE: usize = 9 * 4 + 4 + MaterialRecord::STRIDE;

    fn accepts(shape: Shape) -> bool {
        matches!(shape, Shape::Sphere | Shape::Box)
    }

    fn encode(primitive: &Primitive) -> Self {
        let t = &primitive.transform;
        Self {
            position: t.position.to_array(),
            rotation: t.rotation.to_array(),
            scale: t.scale.to_array(),
            shape: primitive.shape.tag(),
            material: MaterialRecord::from_material(&material_or_neutral(primitive)),
        }
    }
}

/// Plane record: a point on the plane and its normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PlaneRecord {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub albedo: [f32; 4],
    pub specular: [f32; 4],
    pub material_type: i32,
}

impl GpuRecord for PlaneRecord {
    // (3 + 3 + 4 + 4 + 1) * 4
    const STRIDE: usize = 15 * 4;

    fn accepts(shape: Shape) -> bool {
        shape == Shape::Plane
    }

    fn encode(primitive: &Primitive) -> Self {
        let material = MaterialRecord::from_material(&material_or_neutral(primitive));
        Self {
            position: primitive.transform.position.to_array(),
            normal: primitive.normal().to_array(),
            albedo: material.albedo,
            specular: material.specular,
            material_type: material.material_type,
        }
    }
}

/// One sample direction.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SampleRecord {
    pub direction: [f32; 3],
}

impl SampleRecord {
    pub const STRIDE: usize = 3 * 4;
}

/// Registries refuse unbound materials, so reaching the fallback means the
/// material was removed by an edit after registration.
fn material_or_neutral(primitive: &Primitive) -> Cow<'_, Material> {
    match &primitive.material {
        Some(material) => Cow::Borrowed(material),
        None => {
            log::warn!(
                "{:?} at {} has no material, encoding neutral diffuse",
                primitive.shape,
                primitive.transform.position
            );
            Cow::Owned(Material::neutral())
        }
    }
}

const _: () = assert!(std::mem::size_of::<MaterialRecord>() == MaterialRecord::STRIDE);
const _: () = assert!(std::mem::size_of::<GeometryRecord>() == GeometryRecord::STRIDE);
const _: () = assert!(std::mem::size_of::<GeometryRecord>() == 19 * 4);
const _: () = assert!(std::mem::size_of::<PlaneRecord>() == PlaneRecord::STRIDE);
const _: () = assert!(std::mem::size_of::<SampleRecord>() == SampleRecord::STRIDE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialKind;
    use prism_math::{Vec3, Vec4};

    #[test]
    fn test_strides_match_kernel_layout() {
        assert_eq!(MaterialRecord::STRIDE, 36);
        assert_eq!(GeometryRecord::STRIDE, 76);
        assert_eq!(PlaneRecord::STRIDE, 60);
        assert_eq!(SampleRecord::STRIDE, 12);
    }

    #[test]
    fn test_geometry_record_copies_transform_verbatim() {
        let box_prim = Primitive::cuboid(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(10.0, 20.0, 370.0),
            Material::default(),
        );
        let record = GeometryRecord::encode(&box_prim);

        assert_eq!(record.position, [1.0, 2.0, 3.0]);
        assert_eq!(record.rotation, [10.0, 20.0, 370.0]);
        assert_eq!(record.scale, [4.0, 5.0, 6.0]);
        assert_eq!(record.shape, 2);
    }

    #[test]
    fn test_geometry_record_embeds_material() {
        let material = Material::new(
            MaterialKind::Translucent { refractive_index: 1.5 },
            Vec4::new(0.25, 0.5, 0.75, 1.0),
        )
        .with_metallic(0.0)
        .with_glossiness(0.9);
        let record = GeometryRecord::encode(&Primitive::sphere(Vec3::ZERO, 0.5, material.clone()));

        assert_eq!(record.shape, 1);
        assert_eq!(record.scale, [1.0, 1.0, 1.0]);
        assert_eq!(record.material, MaterialRecord::from_material(&material));
        assert_eq!(record.material.albedo, [0.25, 0.5, 0.75, 1.5]);
        assert_eq!(record.material.material_type, 3);
        assert!((record.material.specular[3] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_plane_record_uses_normal() {
        let plane = Primitive::plane(Vec3::new(0.0, -1.0, 0.0), Vec3::ZERO, Material::default());
        let record = PlaneRecord::encode(&plane);

        assert_eq!(record.position, [0.0, -1.0, 0.0]);
        assert!((Vec3::from_array(record.normal) - Vec3::Y).length() < 1e-6);
        assert_eq!(record.material_type, 1);
    }

    #[test]
    fn test_unbound_material_encodes_neutral() {
        let mut sphere = Primitive::sphere(Vec3::ZERO, 1.0, Material::default());
        sphere.material = None;
        let record = GeometryRecord::encode(&sphere);

        assert_eq!(record.material, MaterialRecord::from_material(&Material::neutral()));
        assert_ne!(record.material, MaterialRecord::zeroed());
    }

    #[test]
    fn test_accepts_partitions_shapes() {
        assert!(GeometryRecord::accepts(Shape::Sphere));
        assert!(GeometryRecord::accepts(Shape::Box));
        assert!(!GeometryRecord::accepts(Shape::Plane));
        assert!(PlaneRecord::accepts(Shape::Plane));
        assert!(!PlaneRecord::accepts(Shape::Sphere));
    }

    #[test]
    fn test_records_cast_to_bytes() {
        let records = [
            GeometryRecord::encode(&Primitive::sphere(Vec3::ZERO, 1.0, Material::default())),
            GeometryRecord::encode(&Primitive::sphere(Vec3::X, 1.0, Material::default())),
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&records);
        assert_eq!(bytes.len(), 2 * GeometryRecord::STRIDE);
    }
}
