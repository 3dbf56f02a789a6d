//! Matrix helpers shared by the projection builders.

use crate::geometry::BoundingBox;
use crate::viewer::Viewer;
use glam::{Mat4, Vec3, Vec4};

/// Smallest extent an orthographic fit is allowed to have on any axis.
const MIN_ORTHO_EXTENT: f32 = 1e-4;

/// Up vector for a look-at along `direction`, switching to `fallback` when
/// `direction` is within ~8 degrees of `preferred`.
pub(crate) fn stable_up(direction: Vec3, preferred: Vec3, fallback: Vec3) -> Vec3 {
    if direction.dot(preferred).abs() > 0.99 {
        fallback
    } else {
        preferred
    }
}

/// Off-center orthographic projection mapping a view-space box onto the unit cube.
///
/// The view looks down -Z, so the box's `max.z` is the near plane. Flat axes
/// are padded so the matrix stays invertible.
pub(crate) fn ortho_fit(light_box: &BoundingBox) -> Mat4 {
    let pad = (Vec3::splat(MIN_ORTHO_EXTENT) - light_box.size()).max(Vec3::ZERO) * 0.5;
    let min = light_box.min - pad;
    let max = light_box.max + pad;
    Mat4::orthographic_rh_gl(min.x, max.x, min.y, max.y, -max.z, -min.z)
}

/// Off-center perspective frustum in OpenGL clip conventions.
///
/// Unlike glam's constructors this accepts a negative `near`, which the
/// inverted PSM projection relies on.
pub(crate) fn frustum_gl(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let inv_width = 1.0 / (right - left);
    let inv_height = 1.0 / (top - bottom);
    let inv_depth = 1.0 / (far - near);
    Mat4::from_cols(
        Vec4::new(2.0 * near * inv_width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * inv_height, 0.0, 0.0),
        Vec4::new(
            (right + left) * inv_width,
            (top + bottom) * inv_height,
            -(far + near) * inv_depth,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, -2.0 * far * near * inv_depth, 0.0),
    )
}

/// World-space corners of the camera frustum between two view depths.
///
/// Codes match [`crate::culling::Frustum::corners`]: bit 0 = right,
/// bit 1 = top, bit 2 = far.
pub fn view_frustum_corners(camera: &dyn Viewer, near: f32, far: f32) -> [Vec3; 8] {
    let tan_y = (camera.fov_y() * 0.5).tan();
    let tan_x = tan_y * camera.aspect();
    let to_world = camera.inverse_view_matrix();

    std::array::from_fn(|code| {
        let depth = if code & 4 != 0 { far } else { near };
        let x = if code & 1 != 0 { tan_x } else { -tan_x };
        let y = if code & 2 != 0 { tan_y } else { -tan_y };
        to_world.transform_point3(Vec3::new(x * depth, y * depth, -depth))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::Camera;

    #[test]
    fn test_ortho_fit_maps_box_to_unit_cube() {
        let b = BoundingBox::new(Vec3::new(-3.0, 1.0, -20.0), Vec3::new(5.0, 4.0, -2.0));
        let m = ortho_fit(&b);
        let lo = m.project_point3(b.min);
        let hi = m.project_point3(b.max);
        assert!((lo - Vec3::new(-1.0, -1.0, 1.0)).length() < 1e-5);
        assert!((hi - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_ortho_fit_flat_box_is_finite() {
        let b = BoundingBox::new(Vec3::new(-1.0, -1.0, -5.0), Vec3::new(1.0, 1.0, -5.0));
        assert!(ortho_fit(&b).is_finite());
    }

    #[test]
    fn test_frustum_gl_matches_glam() {
        let ours = frustum_gl(-0.5, 0.5, -0.25, 0.25, 1.0, 10.0);
        let theirs = Mat4::perspective_rh_gl(2.0 * 0.25f32.atan(), 2.0, 1.0, 10.0);
        assert!(ours.abs_diff_eq(theirs, 1e-5));
    }

    #[test]
    fn test_view_frustum_corners() {
        let camera = Camera::new_perspective(Vec3::ZERO, Vec3::X, Vec3::Z, 90.0, 1.0, 1.0, 10.0);
        let corners = view_frustum_corners(&camera, 1.0, 10.0);
        // Near bottom-left: one unit ahead, left (+Y) and down (-Z).
        assert!((corners[0] - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-5);
        assert!((corners[7] - Vec3::new(10.0, -10.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_stable_up() {
        assert_eq!(stable_up(Vec3::NEG_Z, Vec3::Z, Vec3::X), Vec3::X);
        assert_eq!(stable_up(Vec3::X, Vec3::Z, Vec3::Y), Vec3::Z);
    }
}
