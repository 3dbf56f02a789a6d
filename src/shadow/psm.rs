//! Perspective shadow maps.
//!
//! The shadow map is rendered in the post-projective space of a virtual
//! camera derived from the viewer. A directional light becomes a point
//! there, so the light projection is a perspective one, except when the
//! light lands on the plane at infinity (uniform fallback) or behind the
//! virtual eye (inverted depth test).

use super::classify::ShadowCasterSet;
use super::projection::{frustum_gl, ortho_fit, stable_up};
use super::uniform::build_uniform;
use super::{LightTransform, ShadowProjectionParameters};
use crate::geometry::{BoundingBox, BoundingCone};
use crate::viewer::Viewer;
use glam::{Mat4, Vec3};
use tracing::{debug, trace};

/// Extra distance added past the slide-back threshold.
const Z_EPSILON: f32 = 1e-4;
/// Post-projective light `w` at or below this is treated as infinitely far.
const W_EPSILON: f32 = 1e-3;
/// Closest light-space near plane in post-projective space.
const MIN_PP_NEAR: f32 = 1e-3;
/// Inverted projections only keep this fraction of the cone's near distance.
const INVERTED_NEAR_SCALE: f32 = 0.3;
/// Largest half-angle any perspective fit may use (89 degrees).
const MAX_HALF_ANGLE: f32 = 1.553_343;
/// Smallest tangent of a half-angle, so aspect ratios stay finite.
const MIN_HALF_TAN: f32 = 1e-3;
/// Radius of the post-projective unit cube around its center.
const UNIT_CUBE_RADIUS: f32 = 1.732_050_8;

/// Virtual camera enclosing the receivers, possibly slid back from the viewer.
struct VirtualCamera {
    view: Mat4,
    proj: Mat4,
    slide_back: f32,
}

impl VirtualCamera {
    /// View space to post-projective space.
    fn eye_to_post_projective(&self) -> Mat4 {
        self.proj * self.view
    }
}

/// Perspective shadow map projection.
///
/// Falls back to [`build_uniform`] when the light maps onto the plane at
/// infinity or the receivers cannot be enclosed. Writes `slide_back`,
/// `pp_near`, `pp_far` and `shadow_test_inverted` into `params`.
pub fn build_psm(
    light_direction: Vec3,
    camera: &dyn Viewer,
    scene: &ShadowCasterSet,
    params: &mut ShadowProjectionParameters,
) -> LightTransform {
    // Receivers trimmed to the depth range so every corner is in front of the eye.
    let depth_slab = BoundingBox::new(
        Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, -params.z_far),
        Vec3::new(f32::INFINITY, f32::INFINITY, -params.z_near),
    );
    let receivers: Vec<BoundingBox> = scene
        .receivers
        .iter()
        .map(|b| b.intersection(&depth_slab))
        .filter(BoundingBox::is_valid)
        .collect();

    let Some(virtual_camera) = virtual_camera(camera, &receivers, params) else {
        return uniform_fallback(light_direction, camera, scene, params);
    };
    let eye_to_pp = virtual_camera.eye_to_post_projective();

    //  directional light becomes a point on the infinity plane in post-projective space
    let eye_to_light = camera.view_matrix().transform_vector3(-light_direction);
    let pp_light = virtual_camera.proj * eye_to_light.extend(0.0);

    if pp_light.w.abs() <= W_EPSILON {
        debug!(w = pp_light.w, "light at infinity in post-projective space");
        return uniform_fallback(light_direction, camera, scene, params);
    }

    let pp_light_pos = pp_light.truncate() / pp_light.w;
    let inverted = pp_light.w < 0.0;

    let fit = if inverted {
        fit_inverted(pp_light_pos, params.unit_cube_clip)
    } else {
        fit_regular(pp_light_pos, &receivers, &eye_to_pp, params.unit_cube_clip)
    };

    params.slide_back = virtual_camera.slide_back;
    params.shadow_test_inverted = inverted;
    params.pp_near = fit.near;
    params.pp_far = fit.far;

    trace!(
        ?pp_light_pos,
        inverted,
        slide_back = virtual_camera.slide_back,
        "perspective shadow map"
    );

    LightTransform {
        view: fit.view * eye_to_pp * camera.view_matrix(),
        proj: fit.proj,
    }
}

fn uniform_fallback(
    light_direction: Vec3,
    camera: &dyn Viewer,
    scene: &ShadowCasterSet,
    params: &mut ShadowProjectionParameters,
) -> LightTransform {
    params.slide_back = 0.0;
    params.shadow_test_inverted = false;
    build_uniform(light_direction, camera, scene, params)
}

fn virtual_camera(
    camera: &dyn Viewer,
    receivers: &[BoundingBox],
    params: &ShadowProjectionParameters,
) -> Option<VirtualCamera> {
    let mut z_near = params.z_near;
    let mut z_far = params.z_far;

    // compute a slide back that forces some distance between the infinity plane and the view box
    let mut slide_back = 0.0;
    let infinity = z_far / (z_far - z_near);
    if params.slide_back_enabled && infinity <= params.min_infinity_z {
        slide_back = params.min_infinity_z * (z_far - z_near) - z_far + Z_EPSILON;
        z_far += slide_back;
        z_near += slide_back;
    }

    // Camera frustum as seen from the slid-back eye; the far plane is the tight side.
    let half_y = ((camera.fov_y() * 0.5).tan() * (z_far - slide_back) / z_far).atan();
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -slide_back));

    let proj = if params.unit_cube_clip {
        let axis = Some(Vec3::NEG_Z);
        let cone = match BoundingCone::from_boxes(receivers, &view, Vec3::ZERO, axis) {
            Ok(cone) => cone,
            Err(err) => {
                debug!(%err, "cannot enclose receivers for the virtual camera");
                return None;
            }
        };
        let half_x_limit = (half_y.tan() * camera.aspect()).atan();
        let tan_y = cone.fov_y.min(half_y).tan().max(MIN_HALF_TAN);
        let tan_x = cone.fov_x.min(half_x_limit).tan().max(MIN_HALF_TAN);
        Mat4::perspective_rh_gl(2.0 * tan_y.atan(), tan_x / tan_y, z_near, z_far)
    } else {
        Mat4::perspective_rh_gl(2.0 * half_y, camera.aspect(), z_near, z_far)
    };

    Some(VirtualCamera {
        view,
        proj,
        slide_back,
    })
}

/// Light view and projection in post-projective space.
struct PostProjectiveFit {
    view: Mat4,
    proj: Mat4,
    near: f32,
    far: f32,
}

/// Perspective from a light in front of the virtual eye.
fn fit_regular(
    pp_light_pos: Vec3,
    receivers: &[BoundingBox],
    eye_to_pp: &Mat4,
    unit_cube_clip: bool,
) -> PostProjectiveFit {
    if unit_cube_clip {
        //  the unit cube clip discards everything outside the view volume
        let pp_boxes: Vec<BoundingBox> = receivers
            .iter()
            .map(|b| b.projected(eye_to_pp).intersection(&BoundingBox::UNIT_CUBE))
            .filter(BoundingBox::is_valid)
            .collect();

        match BoundingCone::from_boxes(&pp_boxes, &Mat4::IDENTITY, pp_light_pos, None) {
            Ok(cone) => {
                let near = cone.near.max(MIN_PP_NEAR);
                let far = cone.far.max(near + MIN_PP_NEAR);
                return PostProjectiveFit {
                    view: cone.look_at,
                    proj: perspective_from_half_angles(cone.fov_x, cone.fov_y, near, far),
                    near,
                    far,
                };
            }
            Err(err) => {
                debug!(%err, "cannot enclose post-projective receivers, using the unit cube")
            }
        }
    }

    let center = BoundingBox::UNIT_CUBE.center();
    let to_center = center - pp_light_pos;
    let distance = to_center.length();
    let direction = to_center.try_normalize().unwrap_or(Vec3::NEG_Z);
    let up = stable_up(direction, Vec3::Y, Vec3::Z);
    let view = Mat4::look_at_rh(pp_light_pos, pp_light_pos + direction, up);

    let half_angle = (UNIT_CUBE_RADIUS / distance.max(MIN_PP_NEAR)).atan();
    let near = (distance - UNIT_CUBE_RADIUS).max(MIN_PP_NEAR);
    let far = distance + UNIT_CUBE_RADIUS;
    PostProjectiveFit {
        view,
        proj: perspective_from_half_angles(half_angle, half_angle, near, far),
        near,
        far,
    }
}

/// Projection for a light behind the virtual eye.
///
/// With unit-cube clipping the whole cube goes through an inverted
/// perspective (negative near plane); otherwise an orthographic projection
/// along the light-to-cube axis.
fn fit_inverted(pp_light_pos: Vec3, unit_cube_clip: bool) -> PostProjectiveFit {
    if unit_cube_clip {
        let cube = [BoundingBox::UNIT_CUBE];
        match BoundingCone::from_boxes(&cube, &Mat4::IDENTITY, pp_light_pos, None) {
            Ok(cone) => {
                // Clamped for sanity: too small a near value underflows a 24-bit depth buffer.
                let near = (cone.near * INVERTED_NEAR_SCALE).max(MIN_PP_NEAR);
                let (pp_near, pp_far) = (-near, near);
                let tan_x = cone.fov_x.min(MAX_HALF_ANGLE).tan().max(MIN_HALF_TAN);
                let tan_y = cone.fov_y.min(MAX_HALF_ANGLE).tan().max(MIN_HALF_TAN);
                return PostProjectiveFit {
                    view: cone.look_at,
                    proj: frustum_gl(
                        -tan_x * pp_near,
                        tan_x * pp_near,
                        -tan_y * pp_near,
                        tan_y * pp_near,
                        pp_near,
                        pp_far,
                    ),
                    near: pp_near,
                    far: pp_far,
                };
            }
            Err(err) => debug!(%err, "cannot enclose the unit cube, using an orthographic fit"),
        }
    }

    let center = BoundingBox::UNIT_CUBE.center();
    let direction = (center - pp_light_pos).try_normalize().unwrap_or(Vec3::NEG_Z);
    let eye = center - direction * (UNIT_CUBE_RADIUS * 2.0);
    let view = Mat4::look_at_rh(eye, center, stable_up(direction, Vec3::Y, Vec3::Z));
    let light_box = BoundingBox::UNIT_CUBE.transformed(&view);
    PostProjectiveFit {
        view,
        proj: ortho_fit(&light_box),
        near: -light_box.max.z,
        far: -light_box.min.z,
    }
}

fn perspective_from_half_angles(fov_x: f32, fov_y: f32, near: f32, far: f32) -> Mat4 {
    let tan_x = fov_x.min(MAX_HALF_ANGLE).tan().max(MIN_HALF_TAN);
    let tan_y = fov_y.min(MAX_HALF_ANGLE).tan().max(MIN_HALF_TAN);
    frustum_gl(-tan_x * near, tan_x * near, -tan_y * near, tan_y * near, near, far)
}
