//! Camera and viewer abstractions
//!
//! The calculator only sees a camera through the [`Viewer`] trait; [`Camera`]
//! is a plain perspective implementation of it.

use glam::{Mat4, Vec3};

/// What the shadow calculator needs to know about the viewing camera.
pub trait Viewer {
    /// Get the camera position in world space.
    fn position(&self) -> Vec3;

    /// Get the view matrix (world to view space, looking down -Z).
    fn view_matrix(&self) -> Mat4;

    /// Get the projection matrix (view to OpenGL clip space).
    fn projection_matrix(&self) -> Mat4;

    /// Near clipping distance.
    fn near_z(&self) -> f32;

    /// Far clipping distance.
    fn far_z(&self) -> f32;

    /// Vertical field of view in radians.
    fn fov_y(&self) -> f32;

    /// Aspect ratio (width / height).
    fn aspect(&self) -> f32;

    /// Get the combined view-projection matrix.
    fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the world-to-view inverse (view to world).
    fn inverse_view_matrix(&self) -> Mat4 {
        self.view_matrix().inverse()
    }

    /// Unit forward direction in world space.
    fn forward(&self) -> Vec3 {
        self.inverse_view_matrix()
            .transform_vector3(Vec3::NEG_Z)
            .normalize_or_zero()
    }
}

/// A perspective camera.
///
/// The engine is Z-up and cameras conventionally look along +X.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera.
    pub fn new_perspective(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        fov_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov_y: fov_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    /// Update the aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Get the right direction.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }
}

impl Viewer for Camera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    fn near_z(&self) -> f32 {
        self.near
    }

    fn far_z(&self) -> f32 {
        self.far
    }

    fn fov_y(&self) -> f32 {
        self.fov_y
    }

    fn aspect(&self) -> f32 {
        self.aspect
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_matches_view_matrix() {
        let camera = Camera::new_perspective(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(5.0, 2.0, 3.0),
            Vec3::Z,
            60.0,
            16.0 / 9.0,
            0.1,
            100.0,
        );
        let from_matrix = camera.inverse_view_matrix().transform_vector3(Vec3::NEG_Z);
        assert!((camera.forward() - Vec3::X).length() < 1e-5);
        assert!((from_matrix - Vec3::X).length() < 1e-5);
        assert!((camera.right() - Vec3::NEG_Y).length() < 1e-5);
    }
}
