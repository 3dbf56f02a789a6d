//! Light types
//!
//! Only the parts of a light that shape its shadow: orientation, position,
//! cone angle and range.
//!
//! # Orientation convention
//!
//! A light's local frame shines along its local -Z axis, and the engine is
//! Z-up, so a light with identity rotation shines straight down. Shadow maps
//! of rotated lights are rolled half a turn about the shine axis; see
//! [`DirectionalLight::view_matrix`].

use glam::{Mat4, Quat, Vec3};
use std::f32::consts::PI;

/// Light type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

/// Directional light that illuminates from a direction.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// World rotation of the light. Identity shines along -Z.
    pub rotation: Quat,
}

impl DirectionalLight {
    /// Create a new directional light from its world rotation.
    pub fn new(rotation: Quat) -> Self {
        Self {
            rotation: rotation.normalize(),
        }
    }

    /// Create a directional light shining along `direction`.
    ///
    /// Falls back to straight down for a zero direction.
    pub fn from_direction(direction: Vec3) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec3::NEG_Z);
        Self::new(Quat::from_rotation_arc(Vec3::NEG_Z, direction))
    }

    /// Direction the light travels (normalized).
    pub fn direction(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Light-space rotation used by cascaded shadow maps.
    ///
    /// The inverse of the world rotation composed with a fixed half-turn roll
    /// about the shine axis. This is the engine's light-orientation
    /// convention; the light looks down its view -Z axis.
    pub fn view_matrix(&self) -> Mat4 {
        let corrected = self.rotation * Quat::from_rotation_z(PI);
        Mat4::from_quat(corrected.inverse())
    }

    pub fn light_type(&self) -> LightType {
        LightType::Directional
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Quat::IDENTITY)
    }
}

/// Point light casting omnidirectional shadows.
#[derive(Debug, Clone)]
pub struct PointLight {
    /// Light position.
    pub position: Vec3,
    /// Distance beyond which nothing is lit or shadowed.
    pub range: f32,
}

impl PointLight {
    /// Create a new point light.
    pub fn new(position: Vec3, range: f32) -> Self {
        Self { position, range }
    }

    pub fn light_type(&self) -> LightType {
        LightType::Point
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 2.0), 20.0)
    }
}

/// Spot light with cone-shaped illumination.
#[derive(Debug, Clone)]
pub struct SpotLight {
    /// Light position.
    pub position: Vec3,
    /// Light direction (normalized).
    pub direction: Vec3,
    /// Outer cone angle (radians) - light fades to zero at this angle.
    pub outer_angle: f32,
    /// Distance beyond which nothing is lit or shadowed.
    pub range: f32,
}

impl SpotLight {
    /// Create a new spot light.
    pub fn new(position: Vec3, direction: Vec3, outer_angle: f32, range: f32) -> Self {
        Self {
            position,
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Z),
            outer_angle,
            range,
        }
    }

    /// Create a spot light with the outer cone angle in degrees.
    pub fn with_cone(position: Vec3, direction: Vec3, outer_degrees: f32, range: f32) -> Self {
        Self::new(position, direction, outer_degrees.to_radians(), range)
    }

    pub fn light_type(&self) -> LightType {
        LightType::Spot
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::with_cone(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 45.0, 20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_points_down() {
        let light = DirectionalLight::default();
        assert!((light.direction() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_from_direction() {
        let dir = Vec3::new(1.0, 0.5, -2.0).normalize();
        let light = DirectionalLight::from_direction(dir);
        assert!((light.direction() - dir).length() < 1e-5);
    }

    #[test]
    fn test_view_looks_along_light() {
        let dir = Vec3::new(0.3, -0.4, -1.0).normalize();
        let light = DirectionalLight::from_direction(dir);
        let view_dir = light.view_matrix().transform_vector3(dir);
        assert!((view_dir - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_view_is_rolled_half_turn() {
        let view = DirectionalLight::default().view_matrix();
        assert!((view.transform_vector3(Vec3::X) - Vec3::NEG_X).length() < 1e-5);
        assert!((view.transform_vector3(Vec3::Y) - Vec3::NEG_Y).length() < 1e-5);
    }
}
