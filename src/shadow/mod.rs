//! Shadow projection module
//!
//! Classifies meshes into shadow casters and receivers and builds the light
//! view and projection matrices for each shadow-mapping mode.

mod cascade;
mod classify;
mod local;
mod lspsm;
mod projection;
mod psm;
mod uniform;

pub use cascade::{CascadeConfig, CascadeManager, CascadeShadowMapData, CascadeUniform, MAX_SPLITS};
pub use classify::{MeshBounds, ShadowCasterSet};
pub use local::{point_light_transforms, spot_light_transform};
pub use lspsm::{try_build_lspsm, PARALLEL_COS_GAMMA};
pub use projection::view_frustum_corners;
pub use psm::build_psm;
pub use uniform::build_uniform;

use crate::viewer::Viewer;
use glam::{Mat4, Vec3};

/// Shadow projection technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowProjectionMode {
    /// Orthographic projection along the light direction.
    #[default]
    Uniform,
    /// Perspective shadow map.
    Psm,
    /// Light-space perspective shadow map.
    Lspsm,
    /// Trapezoidal shadow map.
    Tsm,
}

/// Per-light input/output record of the projection builders.
///
/// `z_near`, `z_far` and `cos_gamma` are written by classification; the PSM
/// builder writes `slide_back`, `pp_near`, `pp_far` and
/// `shadow_test_inverted`.
#[derive(Debug, Clone)]
pub struct ShadowProjectionParameters {
    /// Receiver near depth in camera view space.
    pub z_near: f32,
    /// Receiver far depth in camera view space.
    pub z_far: f32,
    /// Distance the PSM virtual camera was moved back.
    pub slide_back: f32,
    /// Minimum post-projective depth of the infinity plane.
    pub min_infinity_z: f32,
    /// Clip post-projective bounds to the unit cube.
    pub unit_cube_clip: bool,
    /// Allow the PSM virtual camera to slide back.
    pub slide_back_enabled: bool,
    /// Scale applied to the LSPSM optimal warp distance.
    pub lspsm_n_opt_weight: f32,
    /// Trapezoid focus region, as a fraction of the view depth.
    pub tsm_delta: f32,
    /// Post-projective light near plane.
    pub pp_near: f32,
    /// Post-projective light far plane.
    pub pp_far: f32,
    /// Cosine of the angle between light and view directions.
    pub cos_gamma: f32,
    /// The depth comparison must be inverted when sampling.
    pub shadow_test_inverted: bool,
}

impl Default for ShadowProjectionParameters {
    fn default() -> Self {
        Self {
            z_near: 0.1,
            z_far: 1000.0,
            slide_back: 0.0,
            min_infinity_z: 1.5,
            unit_cube_clip: true,
            slide_back_enabled: true,
            lspsm_n_opt_weight: 1.0,
            tsm_delta: 0.52,
            pp_near: 0.0,
            pp_far: 0.0,
            cos_gamma: 0.0,
            shadow_test_inverted: false,
        }
    }
}

/// Light view and projection matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTransform {
    /// World to light view.
    pub view: Mat4,
    /// Light view to clip.
    pub proj: Mat4,
}

impl LightTransform {
    /// Both matrices identity.
    pub const IDENTITY: Self = Self {
        view: Mat4::IDENTITY,
        proj: Mat4::IDENTITY,
    };

    /// World to light clip space.
    pub fn view_projection(&self) -> Mat4 {
        self.proj * self.view
    }
}

impl Default for LightTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compute light matrices for a directional light.
///
/// `light_direction` is the direction light travels. Never fails: degenerate
/// inputs fall back to [`build_uniform`] or [`LightTransform::IDENTITY`].
pub fn calculate_shadow_projection(
    mode: ShadowProjectionMode,
    light_direction: Vec3,
    camera: &dyn Viewer,
    meshes: &[MeshBounds],
    params: &mut ShadowProjectionParameters,
) -> LightTransform {
    let light = light_direction.try_normalize().unwrap_or_else(|| {
        tracing::warn!(%light_direction, "degenerate light direction, shining straight down");
        Vec3::NEG_Z
    });

    let scene = ShadowCasterSet::classify(camera, light, meshes);
    scene.update_parameters(camera, light, params);

    match mode {
        ShadowProjectionMode::Uniform => build_uniform(light, camera, &scene, params),
        ShadowProjectionMode::Psm => build_psm(light, camera, &scene, params),
        ShadowProjectionMode::Lspsm => match try_build_lspsm(light, camera, &scene, params) {
            Ok(transform) => transform,
            Err(err) => {
                tracing::debug!(%err, "light-space perspective shadow map unavailable");
                LightTransform::IDENTITY
            }
        },
        ShadowProjectionMode::Tsm => build_tsm(light, camera, &scene, params),
    }
}

/// Trapezoidal shadow map projection.
///
/// The trapezoid fit is not implemented; this returns the uniform projection.
pub fn build_tsm(
    light_direction: Vec3,
    camera: &dyn Viewer,
    scene: &ShadowCasterSet,
    params: &ShadowProjectionParameters,
) -> LightTransform {
    build_uniform(light_direction, camera, scene, params)
}

/// Shadow map configuration.
#[derive(Debug, Clone, Copy)]
pub struct ShadowConfig {
    /// Shadow map resolution (width and height).
    pub resolution: u32,
    /// Shadow bias to prevent shadow acne.
    pub bias: f32,
    /// Normal offset bias.
    pub normal_bias: f32,
    /// PCF kernel size (1 = 3x3, 2 = 5x5, etc.).
    pub pcf_radius: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 2048,
            bias: 0.005,
            normal_bias: 0.02,
            pcf_radius: 1,
        }
    }
}

/// Shadow uniform data for GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    /// Light space matrix (world to light clip space).
    pub light_matrix: [[f32; 4]; 4],
    /// Shadow bias.
    pub bias: f32,
    /// Normal offset bias.
    pub normal_bias: f32,
    /// PCF kernel radius.
    pub pcf_radius: f32,
    /// Nonzero when the depth comparison is inverted.
    pub inverted: f32,
    /// Shadow map size (for texel size calculation).
    pub shadow_map_size: f32,
    pub _padding: [f32; 3],
}

impl ShadowUniform {
    /// Pack a light transform with the configured bias terms.
    pub fn new(transform: &LightTransform, config: &ShadowConfig) -> Self {
        Self {
            light_matrix: transform.view_projection().to_cols_array_2d(),
            bias: config.bias,
            normal_bias: config.normal_bias,
            pcf_radius: config.pcf_radius as f32,
            inverted: 0.0,
            shadow_map_size: config.resolution as f32,
            _padding: [0.0; 3],
        }
    }

    /// Flag the depth comparison as inverted, as reported by the PSM builder.
    pub fn with_inverted_test(mut self, inverted: bool) -> Self {
        self.inverted = if inverted { 1.0 } else { 0.0 };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::viewer::Camera;

    fn camera() -> Camera {
        Camera::new_perspective(Vec3::ZERO, Vec3::X, Vec3::Z, 60.0, 1.0, 0.5, 200.0)
    }

    fn mesh(min: Vec3, max: Vec3) -> MeshBounds {
        MeshBounds::new(BoundingBox::new(min, max))
    }

    fn meshes() -> Vec<MeshBounds> {
        vec![
            mesh(Vec3::new(5.0, -10.0, -2.0), Vec3::new(80.0, 10.0, -1.0)),
            mesh(Vec3::new(20.0, -1.0, -1.0), Vec3::new(22.0, 1.0, 3.0)),
        ]
    }

    #[test]
    fn test_tsm_matches_uniform() {
        let light = Vec3::new(0.4, 0.3, -1.0);
        let mut tsm_params = ShadowProjectionParameters::default();
        let mut uniform_params = ShadowProjectionParameters::default();
        let tsm = calculate_shadow_projection(
            ShadowProjectionMode::Tsm,
            light,
            &camera(),
            &meshes(),
            &mut tsm_params,
        );
        let uniform = calculate_shadow_projection(
            ShadowProjectionMode::Uniform,
            light,
            &camera(),
            &meshes(),
            &mut uniform_params,
        );
        assert_eq!(tsm, uniform);
    }

    #[test]
    fn test_lspsm_parallel_falls_back_to_identity() {
        let mut params = ShadowProjectionParameters::default();
        let transform = calculate_shadow_projection(
            ShadowProjectionMode::Lspsm,
            Vec3::X,
            &camera(),
            &meshes(),
            &mut params,
        );
        assert_eq!(transform, LightTransform::IDENTITY);
        assert!(params.cos_gamma > 0.999);
    }

    #[test]
    fn test_zero_direction_shines_down() {
        let mut zero_params = ShadowProjectionParameters::default();
        let mut down_params = ShadowProjectionParameters::default();
        let zero = calculate_shadow_projection(
            ShadowProjectionMode::Uniform,
            Vec3::ZERO,
            &camera(),
            &meshes(),
            &mut zero_params,
        );
        let down = calculate_shadow_projection(
            ShadowProjectionMode::Uniform,
            Vec3::NEG_Z,
            &camera(),
            &meshes(),
            &mut down_params,
        );
        assert_eq!(zero, down);
    }

    #[test]
    fn test_every_mode_is_finite() {
        let camera = camera();
        for mode in [
            ShadowProjectionMode::Uniform,
            ShadowProjectionMode::Psm,
            ShadowProjectionMode::Lspsm,
            ShadowProjectionMode::Tsm,
        ] {
            for light in [
                Vec3::NEG_Z,
                Vec3::new(1.0, 0.2, -1.0),
                Vec3::new(-1.0, 0.2, -1.0),
                Vec3::X,
            ] {
                let mut params = ShadowProjectionParameters::default();
                let transform =
                    calculate_shadow_projection(mode, light, &camera, &meshes(), &mut params);
                assert!(transform.view_projection().is_finite(), "{mode:?} {light}");
            }
        }
    }

    #[test]
    fn test_classification_updates_depth_range() {
        let mut params = ShadowProjectionParameters::default();
        calculate_shadow_projection(
            ShadowProjectionMode::Uniform,
            Vec3::NEG_Z,
            &camera(),
            &meshes(),
            &mut params,
        );
        assert!((params.z_near - 5.0).abs() < 1e-3);
        assert!((params.z_far - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_shadow_uniform() {
        let transform = LightTransform {
            view: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            proj: Mat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0),
        };
        let config = ShadowConfig::default();
        let uniform = ShadowUniform::new(&transform, &config).with_inverted_test(true);
        assert_eq!(uniform.light_matrix, transform.view_projection().to_cols_array_2d());
        assert_eq!(uniform.shadow_map_size, 2048.0);
        assert_eq!(uniform.inverted, 1.0);
        assert_eq!(std::mem::size_of::<ShadowUniform>() % 16, 0);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), std::mem::size_of::<ShadowUniform>());
    }
}
