//! Bounding spheres.

use super::BoundingBox;
use glam::Vec3;

/// Bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Sphere through the corners of a box.
    pub fn from_box(aabb: &BoundingBox) -> Self {
        Self::new(aabb.center(), aabb.size().length() * 0.5)
    }

    /// Incremental fit: start at the first point and grow minimally for each
    /// point that falls outside.
    ///
    /// Not the minimal sphere, but at most a few percent larger in practice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut sphere = Self::new(*first, 0.0);
        for &p in rest {
            sphere.grow(p);
        }
        Some(sphere)
    }

    /// Expand to include a point, keeping the far side of the sphere fixed.
    pub fn grow(&mut self, point: Vec3) {
        let offset = point - self.center;
        let dist = offset.length();
        if dist <= self.radius {
            return;
        }
        let new_radius = (self.radius + dist) * 0.5;
        self.center += offset * ((new_radius - self.radius) / dist);
        self.radius = new_radius;
    }

    /// Check if a point is inside the sphere.
    pub fn contains(&self, point: Vec3) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }
}
