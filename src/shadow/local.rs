//! Shadow projections for spot and point lights.

use super::projection::stable_up;
use super::LightTransform;
use crate::light::{PointLight, SpotLight};
use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

/// Narrowest and widest spot shadow frustum.
const MIN_SPOT_FOV: f32 = 0.01;
const MAX_SPOT_FOV: f32 = PI - 0.01;

/// Perspective light transform covering a spot light's outer cone.
pub fn spot_light_transform(light: &SpotLight, near: f32) -> LightTransform {
    let direction = light.direction.try_normalize().unwrap_or(Vec3::NEG_Z);
    let up = stable_up(direction, Vec3::Z, Vec3::X);
    let view = Mat4::look_at_rh(light.position, light.position + direction, up);

    let fov = (light.outer_angle * 2.0).clamp(MIN_SPOT_FOV, MAX_SPOT_FOV);
    let (near, far) = depth_range(near, light.range);
    LightTransform {
        view,
        proj: Mat4::perspective_rh_gl(fov, 1.0, near, far),
    }
}

/// Cube-map face directions and up vectors, in +X, -X, +Y, -Y, +Z, -Z order.
const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// One light transform per cube-map face of a point light.
pub fn point_light_transforms(light: &PointLight, near: f32) -> [LightTransform; 6] {
    let (near, far) = depth_range(near, light.range);
    let proj = Mat4::perspective_rh_gl(FRAC_PI_2, 1.0, near, far);
    CUBE_FACES.map(|(direction, up)| LightTransform {
        view: Mat4::look_at_rh(light.position, light.position + direction, up),
        proj,
    })
}

fn depth_range(near: f32, range: f32) -> (f32, f32) {
    let near = near.max(1e-3);
    (near, range.max(near * 2.0))
}
