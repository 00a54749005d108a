//! Ray tracing material description.
//!
//! A material carries a type tag, a base color and two PBR sliders. The
//! fourth GPU channel is overloaded per type (refractive index, density or
//! light boost); [`MaterialKind`] makes exactly one of those representable.

use prism_math::{Vec3, Vec4};

/// Dielectric reflectance used as the fully-metallic albedo target.
pub const DIELECTRIC_ALBEDO: Vec3 = Vec3::splat(0.04);

/// Specular tint of a fully non-metallic surface.
pub const DIELECTRIC_SPECULAR: Vec3 = Vec3::ONE;

/// Material type tags as the kernel reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MaterialType {
    Diffuse = 1,
    Glossy = 2,
    Translucent = 3,
    Volume = 4,
    Light = 10,
}

impl MaterialType {
    pub fn tag(self) -> i32 {
        self as i32
    }
}

/// Material type together with its type-dependent fourth channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    Diffuse { refractive_index: f32 },
    Glossy { refractive_index: f32 },
    Translucent { refractive_index: f32 },
    Volume { density: f32 },
    Light { boost: f32 },
}

impl MaterialKind {
    /// Refractive index range exposed to authors.
    pub const REFRACTIVE_INDEX_RANGE: (f32, f32) = (1.0, 10.0);

    /// Build a kind from a bare type tag, using the default fourth channel.
    pub fn from_type(material_type: MaterialType) -> Self {
        match material_type {
            MaterialType::Diffuse => MaterialKind::Diffuse { refractive_index: 1.0 },
            MaterialType::Glossy => MaterialKind::Glossy { refractive_index: 1.0 },
            MaterialType::Translucent => MaterialKind::Translucent { refractive_index: 1.0 },
            MaterialType::Volume => MaterialKind::Volume { density: 1.0 },
            MaterialType::Light => MaterialKind::Light { boost: 1.0 },
        }
    }

    pub fn material_type(&self) -> MaterialType {
        match self {
            MaterialKind::Diffuse { .. } => MaterialType::Diffuse,
            MaterialKind::Glossy { .. } => MaterialType::Glossy,
            MaterialKind::Translucent { .. } => MaterialType::Translucent,
            MaterialKind::Volume { .. } => MaterialType::Volume,
            MaterialKind::Light { .. } => MaterialType::Light,
        }
    }

    /// The value written into `albedo.w`.
    pub fn fourth_channel(&self) -> f32 {
        match *self {
            MaterialKind::Diffuse { refractive_index }
            | MaterialKind::Glossy { refractive_index }
            | MaterialKind::Translucent { refractive_index } => refractive_index,
            MaterialKind::Volume { density } => density,
            MaterialKind::Light { boost } => boost,
        }
    }

    fn clamped(self) -> Self {
        let (lo, hi) = Self::REFRACTIVE_INDEX_RANGE;
        match self {
            MaterialKind::Diffuse { refractive_index } => MaterialKind::Diffuse {
                refractive_index: refractive_index.clamp(lo, hi),
            },
            MaterialKind::Glossy { refractive_index } => MaterialKind::Glossy {
                refractive_index: refractive_index.clamp(lo, hi),
            },
            MaterialKind::Translucent { refractive_index } => MaterialKind::Translucent {
                refractive_index: refractive_index.clamp(lo, hi),
            },
            MaterialKind::Volume { density } => MaterialKind::Volume {
                density: density.max(0.0),
            },
            MaterialKind::Light { boost } => MaterialKind::Light {
                boost: boost.max(0.0),
            },
        }
    }
}

/// A ray tracing material bound to one primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    kind: MaterialKind,

    /// Base color (RGBA, 0-1)
    color: Vec4,

    /// Metallic factor (0=dielectric, 1=metal)
    metallic: f32,

    /// Glossiness (0=rough, 1=mirror)
    glossiness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Diffuse { refractive_index: 1.0 },
            color: Vec4::ONE,
            metallic: 0.02,
            glossiness: 0.5,
        }
    }
}

impl Material {
    /// Create a material with the given kind and color and default sliders.
    pub fn new(kind: MaterialKind, color: Vec4) -> Self {
        Self {
            kind: kind.clamped(),
            color,
            ..Default::default()
        }
    }

    /// Plain diffuse material of the given color.
    pub fn diffuse(color: Vec4) -> Self {
        Self::new(MaterialKind::from_type(MaterialType::Diffuse), color)
    }

    /// Emissive material; `boost` scales the emitted color.
    pub fn light(color: Vec4, boost: f32) -> Self {
        Self::new(MaterialKind::Light { boost }, color)
    }

    /// Fallback used when a primitive lost its material after registration.
    pub fn neutral() -> Self {
        Self {
            kind: MaterialKind::Diffuse { refractive_index: 1.0 },
            color: Vec4::new(0.5, 0.5, 0.5, 1.0),
            metallic: 0.0,
            glossiness: 0.5,
        }
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    pub fn with_glossiness(mut self, glossiness: f32) -> Self {
        self.glossiness = glossiness.clamp(0.0, 1.0);
        self
    }

    /// Replace type, color and sliders in one go. Sliders are clamped to [0, 1].
    /// The fourth channel is reset to the default for the new type unless the
    /// type is unchanged.
    pub fn set(
        &mut self,
        material_type: MaterialType,
        color: Vec4,
        metallic: f32,
        glossiness: f32,
    ) {
        if self.kind.material_type() != material_type {
            self.kind = MaterialKind::from_type(material_type);
        }
        self.color = color;
        self.metallic = metallic.clamp(0.0, 1.0);
        self.glossiness = glossiness.clamp(0.0, 1.0);
    }

    pub fn set_kind(&mut self, kind: MaterialKind) {
        self.kind = kind.clamped();
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn material_type(&self) -> MaterialType {
        self.kind.material_type()
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn metallic(&self) -> f32 {
        self.metallic
    }

    pub fn glossiness(&self) -> f32 {
        self.glossiness
    }

    /// GPU albedo: color lerped toward dielectric reflectance by metallic,
    /// with the type-dependent fourth channel in `w`.
    pub fn albedo(&self) -> Vec4 {
        let rgb = self.color.truncate().lerp(DIELECTRIC_ALBEDO, self.metallic);
        rgb.extend(self.kind.fourth_channel())
    }

    /// GPU specular: white lerped toward color by metallic, roughness in `w`.
    pub fn specular(&self) -> Vec4 {
        let rgb = DIELECTRIC_SPECULAR.lerp(self.color.truncate(), self.metallic);
        rgb.extend(1.0 - self.glossiness)
    }
}
