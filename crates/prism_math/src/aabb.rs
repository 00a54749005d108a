use crate::Vec3;

/// Axis-aligned bounding box used by the scene bounding tree.
///
/// Stored as two corners. `union` is the only merge primitive: it is
/// commutative, associative and idempotent, and [`Aabb::EMPTY`] is its identity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from its min and max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB centered at `center` reaching `half_extent` along each axis.
    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        let half_extent = half_extent.abs();
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box to include a point.
    pub fn union_point(&self, p: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full edge lengths (max - min).
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn half_extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// True when min > max on any axis (the box contains nothing).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.size();

        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Inclusive box-box overlap test.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Empty box: inverted infinite extents, so any union replaces it.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}
