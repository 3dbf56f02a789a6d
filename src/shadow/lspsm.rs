//! Light-space perspective shadow maps.
//!
//! Works in world space: a basis whose Y axis is the light direction is
//! anchored at the camera, a perspective warp stretches that Y axis, and an
//! orthographic fit squeezes the warped body into the unit cube.
//!
//! The warp is known to be incomplete; when the light runs (anti-)parallel to
//! the view direction the builder refuses and the calculator substitutes
//! identity matrices.

use super::classify::ShadowCasterSet;
use super::projection::ortho_fit;
use super::{LightTransform, ShadowProjectionParameters};
use crate::error::{Result, ShadowError};
use crate::geometry::BoundingBox;
use crate::viewer::Viewer;
use glam::{Mat4, Vec3, Vec4};

/// `|cos(gamma)|` at or above this counts as parallel.
pub const PARALLEL_COS_GAMMA: f32 = 0.999;
/// Floor for `sin(gamma)` in the near-distance division.
const MIN_SIN_GAMMA: f32 = 1e-4;
/// Floor for the light-space Y extent of the body.
const MIN_BODY_DEPTH: f32 = 1e-6;
/// Warp ranges thinner than this are rejected.
const MIN_WARP_RANGE: f32 = 1e-5;
/// Homogeneous `w` at or below this is behind the warp center.
const MIN_WARP_W: f32 = 1e-6;

/// Near and far distances of the perspective warp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpRange {
    /// Distance from the warp center to the body.
    pub n: f32,
    /// `n` plus the body depth.
    pub f: f32,
}

/// Closed-form warp distances for a body of light-space depth `body_depth`.
pub fn warp_range(
    view_near: f32,
    sin_gamma: f32,
    body_depth: f32,
    n_opt_weight: f32,
) -> Result<WarpRange> {
    let sin_gamma = sin_gamma.max(MIN_SIN_GAMMA);
    let d = body_depth.abs().max(MIN_BODY_DEPTH);

    let z_near = view_near / sin_gamma;
    let z_far = z_near + d * sin_gamma;
    let n = n_opt_weight * (z_near + (z_far * z_near).sqrt()) / sin_gamma;
    let f = n + d;

    let extent = f - n;
    if !extent.is_finite() || extent < MIN_WARP_RANGE {
        return Err(ShadowError::CollapsedDepthRange { extent });
    }
    Ok(WarpRange { n, f })
}

/// Perspective along +Y mapping `y = n` to -1 and `y = f` to +1; `w = y`.
pub fn warp_matrix(range: WarpRange) -> Mat4 {
    let WarpRange { n, f } = range;
    Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, (f + n) / (f - n), 0.0, 1.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, -2.0 * f * n / (f - n), 0.0, 0.0),
    )
}

/// World-to-light matrix for a basis `(left, light, view)` anchored at `eye`.
fn basis_view(left: Vec3, up: Vec3, view: Vec3, eye: Vec3) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(left.x, up.x, view.x, 0.0),
        Vec4::new(left.y, up.y, view.y, 0.0),
        Vec4::new(left.z, up.z, view.z, 0.0),
        Vec4::new(-left.dot(eye), -up.dot(eye), -view.dot(eye), 1.0),
    )
}

/// Light-space perspective shadow map projection.
///
/// Body B is every non-hidden mesh's world box. The returned view is
/// identity; the projection carries light view, warp and unit-cube fit.
pub fn try_build_lspsm(
    light_direction: Vec3,
    camera: &dyn Viewer,
    scene: &ShadowCasterSet,
    params: &ShadowProjectionParameters,
) -> Result<LightTransform> {
    let light = light_direction
        .try_normalize()
        .ok_or(ShadowError::DegenerateDirection)?;
    let view_dir = camera
        .forward()
        .try_normalize()
        .ok_or(ShadowError::DegenerateDirection)?;

    let cos_gamma = light.dot(view_dir);
    if cos_gamma.abs() >= PARALLEL_COS_GAMMA {
        return Err(ShadowError::ParallelLightView { cos_gamma });
    }

    let left = light.cross(view_dir).normalize();
    let view = left.cross(light).normalize();
    let eye = camera.position();
    let light_view = basis_view(left, light, view, eye);

    let body: Vec<Vec3> = scene
        .world_meshes
        .iter()
        .flat_map(|b| b.corners())
        .collect();
    if body.is_empty() {
        return Err(ShadowError::EmptyBody);
    }

    let light_body =
        BoundingBox::from_points(body.iter().map(|p| light_view.transform_point3(*p)));
    let sin_gamma = (1.0 - cos_gamma * cos_gamma).max(0.0).sqrt();
    let range = warp_range(
        camera.near_z(),
        sin_gamma,
        light_body.size().y,
        params.lspsm_n_opt_weight,
    )?;

    // Move the warp center back along the light axis.
    let corrected_eye = eye - light * (range.n - camera.near_z());
    let corrected_view = basis_view(left, light, view, corrected_eye);
    let warp = warp_matrix(range);
    let to_warped = warp * corrected_view;

    let mut warped = BoundingBox::EMPTY;
    let mut behind = 0;
    for p in &body {
        let clip = to_warped * p.extend(1.0);
        if clip.w > MIN_WARP_W {
            warped.include(clip.truncate() / clip.w);
        } else {
            behind += 1;
        }
    }
    if !warped.is_valid() {
        return Err(ShadowError::NoVisiblePoints);
    }
    // A partial fit would clip the points behind the warp center.
    if behind > 0 {
        return Err(ShadowError::PointsBehindCenter { count: behind });
    }

    tracing::trace!(cos_gamma, ?range, ?warped, "light-space perspective shadow map");

    Ok(LightTransform {
        view: Mat4::IDENTITY,
        proj: ortho_fit(&warped) * to_warped,
    })
}
