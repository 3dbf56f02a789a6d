//! Uniform (orthographic) shadow projection.

use super::classify::ShadowCasterSet;
use super::projection::{ortho_fit, stable_up, view_frustum_corners};
use super::{LightTransform, ShadowProjectionParameters};
use crate::geometry::BoundingBox;
use crate::viewer::Viewer;
use glam::{Mat4, Vec3};

/// Orthographic projection of the scene along the light direction.
///
/// The scene box is the receiver union when `unit_cube_clip` is set, and the
/// camera frustum over `[z_near, z_far]` otherwise. Casters widen the box so
/// that nothing between the light and the receivers is clipped.
pub fn build_uniform(
    light_direction: Vec3,
    camera: &dyn Viewer,
    scene: &ShadowCasterSet,
    params: &ShadowProjectionParameters,
) -> LightTransform {
    let scene_box = if params.unit_cube_clip && scene.world_receivers.is_valid() {
        scene.world_receivers
    } else {
        BoundingBox::from_points(view_frustum_corners(camera, params.z_near, params.z_far))
    };

    let center = scene_box.center();
    let radius = scene_box.size().length() * 0.5;

    // Light view matrix - looking from outside the scene along the light direction
    let light_pos = center - light_direction * (radius * 2.0 + 1.0);
    let up = stable_up(light_direction, Vec3::Z, Vec3::X);
    let view = Mat4::look_at_rh(light_pos, center, up);

    let mut light_box = scene_box.transformed(&view);
    let casters = scene.world_caster_bounds();
    if casters.is_valid() {
        light_box = light_box.merge(&casters.transformed(&view));
    }

    tracing::trace!(?light_box, "uniform shadow bounds");

    LightTransform {
        view,
        proj: ortho_fit(&light_box),
    }
}
