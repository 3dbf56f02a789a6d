//! Bounding cones for fitting perspective projections.

use super::{BoundingBox, BoundingSphere};
use crate::error::{Result, ShadowError};
use glam::{Mat4, Vec3};

/// Depths at or below this are considered behind the apex.
const MIN_CONE_DEPTH: f32 = 1e-6;

/// Cone around a set of boxes, opening from `apex` along `direction`.
///
/// Points are measured in the cone's own look-at space, where the cone
/// axis is the view -Z axis.
#[derive(Debug, Clone, Copy)]
pub struct BoundingCone {
    pub apex: Vec3,
    /// Normalized cone axis.
    pub direction: Vec3,
    /// Horizontal half-angle in radians.
    pub fov_x: f32,
    /// Vertical half-angle in radians.
    pub fov_y: f32,
    /// Smallest depth along the axis.
    pub near: f32,
    /// Largest depth along the axis.
    pub far: f32,
    /// View matrix looking from the apex along the axis.
    pub look_at: Mat4,
}

impl BoundingCone {
    /// Fit a cone around `boxes` after transforming their corners by `projection`.
    ///
    /// `projection` may be projective; corners are divided by `w`. When
    /// `direction` is `None` the axis points from the apex at the center of a
    /// sphere around all corners.
    pub fn from_boxes(
        boxes: &[BoundingBox],
        projection: &Mat4,
        apex: Vec3,
        direction: Option<Vec3>,
    ) -> Result<Self> {
        let points: Vec<Vec3> = boxes
            .iter()
            .filter(|b| b.is_valid())
            .flat_map(|b| b.corners())
            .map(|c| projection.project_point3(c))
            .collect();

        let direction = match direction {
            Some(dir) => dir.try_normalize().ok_or(ShadowError::DegenerateDirection)?,
            None => {
                let sphere = BoundingSphere::from_points(&points).ok_or(ShadowError::EmptyBody)?;
                (sphere.center - apex)
                    .try_normalize()
                    .ok_or(ShadowError::DegenerateDirection)?
            }
        };

        let up = if direction.dot(Vec3::Y).abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let look_at = Mat4::look_at_rh(apex, apex + direction, up);

        let mut max_slope_x = 0.0f32;
        let mut max_slope_y = 0.0f32;
        let mut near = f32::INFINITY;
        let mut far = 0.0f32;

        for p in &points {
            let q = look_at.transform_point3(*p);
            let depth = -q.z;
            if depth <= MIN_CONE_DEPTH {
                continue;
            }
            max_slope_x = max_slope_x.max((q.x / depth).abs());
            max_slope_y = max_slope_y.max((q.y / depth).abs());
            near = near.min(depth);
            far = far.max(depth);
        }

        if !near.is_finite() {
            return Err(ShadowError::NoVisiblePoints);
        }

        Ok(Self {
            apex,
            direction,
            fov_x: max_slope_x.atan(),
            fov_y: max_slope_y.atan(),
            near,
            far,
            look_at,
        })
    }

    /// Check if a point lies within the cone's angular extent and depth range.
    pub fn contains(&self, point: Vec3) -> bool {
        let q = self.look_at.transform_point3(point);
        let depth = -q.z;
        depth >= self.near
            && depth <= self.far
            && q.x.abs() <= self.fov_x.tan() * depth
            && q.y.abs() <= self.fov_y.tan() * depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_direction() {
        let boxes = [BoundingBox::new(
            Vec3::new(-1.0, -2.0, -10.0),
            Vec3::new(1.0, 2.0, -5.0),
        )];
        let cone =
            BoundingCone::from_boxes(&boxes, &Mat4::IDENTITY, Vec3::ZERO, Some(Vec3::NEG_Z))
                .unwrap();
        assert!((cone.near - 5.0).abs() < 1e-4);
        assert!((cone.far - 10.0).abs() < 1e-4);
        assert!((cone.fov_x.tan() - 0.2).abs() < 1e-4);
        assert!((cone.fov_y.tan() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_auto_direction_contains_corners() {
        let boxes = [
            BoundingBox::new(Vec3::new(4.0, 1.0, 1.0), Vec3::new(5.0, 2.0, 2.0)),
            BoundingBox::new(Vec3::new(6.0, -2.0, 0.0), Vec3::new(8.0, 0.0, 1.0)),
        ];
        let cone = BoundingCone::from_boxes(&boxes, &Mat4::IDENTITY, Vec3::ZERO, None).unwrap();
        assert!(cone.direction.x > 0.9);
        let mid = cone.apex + cone.direction * (cone.near + cone.far) * 0.5;
        for b in &boxes {
            for c in b.corners() {
                // Small slack for the boundary points themselves.
                let pulled = c + (mid - c) * 1e-3;
                assert!(cone.contains(pulled));
            }
        }
    }

    #[test]
    fn test_empty_boxes() {
        let err = BoundingCone::from_boxes(&[], &Mat4::IDENTITY, Vec3::ZERO, None).unwrap_err();
        assert_eq!(err, ShadowError::EmptyBody);
    }

    #[test]
    fn test_everything_behind_apex() {
        let boxes = [BoundingBox::new(Vec3::splat(1.0), Vec3::splat(2.0))];
        let err = BoundingCone::from_boxes(&boxes, &Mat4::IDENTITY, Vec3::ZERO, Some(Vec3::NEG_X))
            .unwrap_err();
        assert_eq!(err, ShadowError::NoVisiblePoints);
    }
}
