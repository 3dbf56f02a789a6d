//! Axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box.
///
/// A box is valid when `min <= max` on every axis. [`BoundingBox::EMPTY`]
/// holds the `+inf/-inf` sentinel and is the identity for [`merge`].
///
/// [`merge`]: BoundingBox::merge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// The empty box; never valid.
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// The post-projective unit cube `[-1, 1]^3`.
    pub const UNIT_CUBE: Self = Self {
        min: Vec3::NEG_ONE,
        max: Vec3::ONE,
    };

    /// Create a new box.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box from a set of points. Returns [`BoundingBox::EMPTY`] for no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.include(p);
        }
        aabb
    }

    /// Whether `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Grow the box to include a point.
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Get the center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Corner selected by a 3-bit code: bit 0/1/2 picks `max` on x/y/z.
    #[inline]
    pub fn corner(&self, code: u8) -> Vec3 {
        Vec3::new(
            if code & 1 != 0 { self.max.x } else { self.min.x },
            if code & 2 != 0 { self.max.y } else { self.min.y },
            if code & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    /// Get all 8 corners, indexed by [`BoundingBox::corner`] code.
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| self.corner(i as u8))
    }

    /// Check if a point is inside the box.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Merge two boxes. Merging with an invalid box yields the other one.
    pub fn merge(&self, other: &BoundingBox) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlap of two boxes; invalid when they do not overlap.
    pub fn intersection(&self, other: &BoundingBox) -> Self {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Box around all 8 corners after an affine transform.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self::from_points(self.corners().map(|c| matrix.transform_point3(c)))
    }

    /// Box around all 8 corners after a projective transform with perspective divide.
    ///
    /// Only meaningful when every corner lies in front of the projection center.
    pub fn projected(&self, matrix: &Mat4) -> Self {
        Self::from_points(self.corners().map(|c| matrix.project_point3(c)))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}
