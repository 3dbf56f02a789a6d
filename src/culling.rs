//! Frustum culling for shadow caster and receiver classification
//!
//! Provides frustum extraction from view-projection matrices and
//! intersection tests with boxes, spheres, and swept spheres.

use crate::geometry::{BoundingBox, BoundingSphere};
use glam::{Mat4, Vec3, Vec4};

/// Radius inflation applied to displaced spheres in the swept-sphere test.
const SWEPT_SPHERE_SLACK: f32 = 1.1;

/// Triple products below this are treated as parallel planes.
const PLANE_TRIPLE_EPSILON: f32 = 1e-6;

/// A plane in 3D space defined by the equation `normal . x + distance = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (a, b, c).
    pub normal: Vec3,
    /// Offset from origin (d).
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance.
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Create a plane from a Vec4 (xyz = normal, w = distance).
    pub fn from_vec4(v: Vec4) -> Self {
        Self {
            normal: v.truncate(),
            distance: v.w,
        }
    }

    /// Normalize the plane equation.
    pub fn normalize(&self) -> Self {
        let len = self.normal.length();
        if len > 0.0 {
            Self {
                normal: self.normal / len,
                distance: self.distance / len,
            }
        } else {
            *self
        }
    }

    /// Get the signed distance from a point to the plane.
    /// Positive = in front (same side as normal), Negative = behind.
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Point shared by three planes, or `None` if any two are (nearly) parallel.
    pub fn intersect3(a: &Plane, b: &Plane, c: &Plane) -> Option<Vec3> {
        let bc = b.normal.cross(c.normal);
        let denom = a.normal.dot(bc);
        if denom.abs() < PLANE_TRIPLE_EPSILON {
            return None;
        }
        let ca = c.normal.cross(a.normal);
        let ab = a.normal.cross(b.normal);
        Some(-(bc * a.distance + ca * b.distance + ab * c.distance) / denom)
    }

    /// Lookup code of the box corner nearest to the plane's negative side.
    ///
    /// Bit 0/1/2 is set when the normal's x/y/z component is negative, so that
    /// [`BoundingBox::corner`] picks `max` on exactly those axes.
    #[inline]
    fn nearest_corner_code(&self) -> u8 {
        (self.normal.x < 0.0) as u8
            | ((self.normal.y < 0.0) as u8) << 1
            | ((self.normal.z < 0.0) as u8) << 2
    }
}

/// Result of a frustum intersection test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersection {
    /// Completely outside the frustum.
    Outside,
    /// Completely inside the frustum.
    Inside,
    /// Partially inside (intersecting a plane).
    Intersecting,
}

/// Index of each plane in [`Frustum::planes`].
pub mod plane {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;
}

/// View frustum defined by 6 planes.
///
/// The planes are oriented so that their normals point inward.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Left, Right, Bottom, Top, Near, Far planes.
    pub planes: [Plane; 6],
    /// Corners indexed by a 3-bit code: bit 0 = right, bit 1 = top, bit 2 = far.
    pub corners: [Vec3; 8],
    /// Per plane, the [`BoundingBox::corner`] code of the most negative corner.
    vertex_lut: [u8; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb/Hartmann method on the matrix rows. Clip space is the
    /// OpenGL unit cube, so the near plane is `row3 + row2`.
    pub fn from_view_projection(vp: Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let planes = [
            Plane::from_vec4(row3 + row0).normalize(),
            Plane::from_vec4(row3 - row0).normalize(),
            Plane::from_vec4(row3 + row1).normalize(),
            Plane::from_vec4(row3 - row1).normalize(),
            Plane::from_vec4(row3 + row2).normalize(),
            Plane::from_vec4(row3 - row2).normalize(),
        ];

        let vertex_lut = planes.map(|p| p.nearest_corner_code());

        let corners = std::array::from_fn(|code| {
            let x = if code & 1 != 0 { plane::RIGHT } else { plane::LEFT };
            let y = if code & 2 != 0 { plane::TOP } else { plane::BOTTOM };
            let z = if code & 4 != 0 { plane::FAR } else { plane::NEAR };
            Plane::intersect3(&planes[z], &planes[y], &planes[x]).unwrap_or_else(|| {
                tracing::warn!(code, "degenerate frustum corner, plane triple is parallel");
                Vec3::ZERO
            })
        });

        Self {
            planes,
            corners,
            vertex_lut,
        }
    }

    /// Test if a point is inside the frustum.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }

    /// Classify a box against the frustum.
    ///
    /// Returns `Outside` if completely outside, `Inside` if completely inside,
    /// or `Intersecting` if partially inside.
    pub fn test_box(&self, aabb: &BoundingBox) -> Intersection {
        let mut result = Intersection::Inside;

        for (plane, &code) in self.planes.iter().zip(&self.vertex_lut) {
            let nearest = aabb.corner(code);
            let farthest = aabb.corner(code ^ 0b111);

            if plane.signed_distance(farthest) < 0.0 {
                return Intersection::Outside;
            }
            if plane.signed_distance(nearest) < 0.0 {
                result = Intersection::Intersecting;
            }
        }

        result
    }

    /// Test if a box is at least partially inside the frustum.
    pub fn contains_box(&self, aabb: &BoundingBox) -> bool {
        self.test_box(aabb) != Intersection::Outside
    }

    /// Test if a sphere is at least partially inside the frustum.
    pub fn test_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|p| p.signed_distance(sphere.center) + sphere.radius >= 0.0)
    }

    /// Test whether a sphere swept along `direction` ever reaches the frustum.
    ///
    /// Collects the sweep parameters where the sphere touches each plane and
    /// checks the displaced (slightly inflated) sphere at every non-negative one.
    pub fn test_swept_sphere(&self, sphere: &BoundingSphere, direction: Vec3) -> bool {
        let mut displacements = [0.0f32; 12];
        let mut count = 0;

        for plane in &self.planes {
            let start = plane.signed_distance(sphere.center);
            let rate = plane.normal.dot(direction);

            if rate.abs() <= f32::EPSILON {
                // Parallel sweep: the plane is satisfied everywhere or nowhere.
                if start + sphere.radius < 0.0 {
                    return false;
                }
                displacements[count] = 0.0;
                count += 1;
                continue;
            }

            for t in [
                (sphere.radius - start) / rate,
                (-sphere.radius - start) / rate,
            ] {
                if t >= 0.0 {
                    displacements[count] = t;
                    count += 1;
                }
            }
        }

        displacements[..count].iter().any(|&t| {
            let displaced = BoundingSphere::new(
                sphere.center + direction * t,
                sphere.radius * SWEPT_SPHERE_SLACK,
            );
            self.test_sphere(&displaced)
        })
    }
}
