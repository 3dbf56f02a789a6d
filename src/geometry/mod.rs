//! Bounding volumes
//!
//! Boxes, spheres and cones used by the caster classifier and the projection
//! builders. The frustum lives in [`crate::culling`].

mod aabb;
mod cone;
mod sphere;

pub use aabb::BoundingBox;
pub use cone::BoundingCone;
pub use sphere::BoundingSphere;

use crate::culling::Frustum;
use glam::Vec3;

/// Any of the bounding volumes the calculator works with.
#[derive(Debug, Clone, Copy)]
pub enum BoundingVolume {
    Box(BoundingBox),
    Sphere(BoundingSphere),
    Frustum(Frustum),
    Cone(BoundingCone),
}

impl BoundingVolume {
    /// Check if a point is inside the volume.
    pub fn contains_point(&self, point: Vec3) -> bool {
        match self {
            BoundingVolume::Box(b) => b.contains(point),
            BoundingVolume::Sphere(s) => s.contains(point),
            BoundingVolume::Frustum(f) => f.contains_point(point),
            BoundingVolume::Cone(c) => c.contains(point),
        }
    }

    /// Axis-aligned box enclosing the volume.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            BoundingVolume::Box(b) => *b,
            BoundingVolume::Sphere(s) => {
                BoundingBox::new(s.center - Vec3::splat(s.radius), s.center + Vec3::splat(s.radius))
            }
            BoundingVolume::Frustum(f) => BoundingBox::from_points(f.corners),
            BoundingVolume::Cone(c) => {
                let inverse = c.look_at.inverse();
                let (tx, ty) = (c.fov_x.tan(), c.fov_y.tan());
                BoundingBox::from_points([c.near, c.far].into_iter().flat_map(|depth| {
                    [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)].map(|(sx, sy)| {
                        let local = Vec3::new(sx * tx * depth, sy * ty * depth, -depth);
                        inverse.transform_point3(local)
                    })
                }))
            }
        }
    }
}

impl From<BoundingBox> for BoundingVolume {
    fn from(b: BoundingBox) -> Self {
        BoundingVolume::Box(b)
    }
}

impl From<BoundingSphere> for BoundingVolume {
    fn from(s: BoundingSphere) -> Self {
        BoundingVolume::Sphere(s)
    }
}

impl From<Frustum> for BoundingVolume {
    fn from(f: Frustum) -> Self {
        BoundingVolume::Frustum(f)
    }
}

impl From<BoundingCone> for BoundingVolume {
    fn from(c: BoundingCone) -> Self {
        BoundingVolume::Cone(c)
    }
}
