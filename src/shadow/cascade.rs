//! Cascaded shadow maps for directional lights.
//!
//! The camera frustum is cut into depth slices; every slice gets its own
//! orthographic crop in a light space shared by all slices.

use super::projection::{ortho_fit, view_frustum_corners};
use crate::geometry::BoundingBox;
use crate::light::DirectionalLight;
use crate::viewer::Viewer;
use glam::{Mat4, Vec4};

/// Maximum number of cascade splits.
pub const MAX_SPLITS: usize = 8;

/// Cascade split configuration.
///
/// Setters clamp out-of-range values.
#[derive(Debug, Clone, Copy)]
pub struct CascadeConfig {
    split_count: usize,
    blend: f32,
    /// Distance the near plane of every crop is pulled toward the light, so
    /// that casters in front of a slice still land in its shadow map.
    pub near_bias: f32,
}

impl CascadeConfig {
    /// Create a configuration; values are clamped like the setters do.
    pub fn new(split_count: usize, blend: f32, near_bias: f32) -> Self {
        let mut config = Self {
            split_count: 1,
            blend: 0.0,
            near_bias,
        };
        config.set_split_count(split_count);
        config.set_blend(blend);
        config
    }

    /// Number of splits, in `1..=MAX_SPLITS`.
    pub fn split_count(&self) -> usize {
        self.split_count
    }

    /// Set the number of splits, clamped to `1..=MAX_SPLITS`.
    pub fn set_split_count(&mut self, split_count: usize) {
        self.split_count = split_count.clamp(1, MAX_SPLITS);
    }

    /// Blend between logarithmic (0) and uniform (1) split placement.
    pub fn blend(&self) -> f32 {
        self.blend
    }

    /// Set the blend factor, clamped to `[0, 1]`.
    pub fn set_blend(&mut self, blend: f32) {
        self.blend = if blend.is_nan() { 0.0 } else { blend.clamp(0.0, 1.0) };
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            split_count: 4,
            blend: 0.5,
            near_bias: 10.0,
        }
    }
}

/// Per-frame cascade matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeShadowMapData {
    /// Number of populated splits.
    pub split_count: usize,
    /// Far view depth of each split. Only the first `split_count` are used.
    pub split_distances: [f32; MAX_SPLITS],
    /// Light-space rotation shared by all splits.
    pub view: Mat4,
    /// Orthographic crop of each split.
    pub proj: [Mat4; MAX_SPLITS],
}

impl CascadeShadowMapData {
    /// Populated split distances.
    pub fn splits(&self) -> &[f32] {
        &self.split_distances[..self.split_count]
    }

    /// World to light clip space for split `index`.
    pub fn view_projection(&self, index: usize) -> Mat4 {
        self.proj[index] * self.view
    }
}

/// Cascade split calculator.
#[derive(Debug, Clone, Default)]
pub struct CascadeManager {
    /// Split configuration.
    pub config: CascadeConfig,
}

impl CascadeManager {
    /// Create a new cascade manager.
    pub fn new(config: CascadeConfig) -> Self {
        Self { config }
    }

    /// Far view depth of split `index` for a camera range `[near, far]`.
    pub fn split_distance(&self, index: usize, near: f32, far: f32) -> f32 {
        let fraction = (index + 1) as f32 / self.config.split_count as f32;
        let log_split = near * (far / near).powf(fraction);
        let uniform_split = near + (far - near) * fraction;
        let blend = self.config.blend;
        (1.0 - blend) * log_split + blend * uniform_split
    }

    /// Compute the light view and one crop matrix per split.
    pub fn cascade_shadow_map_data(
        &self,
        camera: &dyn Viewer,
        light: &DirectionalLight,
    ) -> CascadeShadowMapData {
        let near = camera.near_z();
        let far = camera.far_z();
        let view = light.view_matrix();

        let mut data = CascadeShadowMapData {
            split_count: self.config.split_count,
            split_distances: [0.0; MAX_SPLITS],
            view,
            proj: [Mat4::IDENTITY; MAX_SPLITS],
        };

        let mut split_near = near;
        for i in 0..self.config.split_count {
            let split_far = self.split_distance(i, near, far);

            let corners = view_frustum_corners(camera, split_near, split_far);
            let mut light_box =
                BoundingBox::from_points(corners.iter().map(|c| view.transform_point3(*c)));
            // The light looks down -Z, so its near plane is at max.z.
            light_box.max.z += self.config.near_bias;

            data.split_distances[i] = split_far;
            data.proj[i] = ortho_fit(&light_box);
            split_near = split_far;
        }

        tracing::trace!(splits = ?data.splits(), "cascade splits");

        data
    }
}

/// Cascade uniform data for GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CascadeUniform {
    /// World to light clip space per split.
    pub view_proj: [[[f32; 4]; 4]; MAX_SPLITS],
    /// Split far distances, packed four per vector.
    pub splits: [[f32; 4]; 2],
    /// Number of populated splits.
    pub count: u32,
    pub _padding: [u32; 3],
}

impl CascadeUniform {
    /// Pack cascade matrices and split distances.
    pub fn from_cascades(data: &CascadeShadowMapData) -> Self {
        let view_proj = std::array::from_fn(|i| data.view_projection(i).to_cols_array_2d());
        let d = &data.split_distances;
        Self {
            view_proj,
            splits: [
                Vec4::new(d[0], d[1], d[2], d[3]).to_array(),
                Vec4::new(d[4], d[5], d[6], d[7]).to_array(),
            ],
            count: data.split_count as u32,
            _padding: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::Camera;
    use glam::Vec3;

    fn manager(split_count: usize, blend: f32) -> CascadeManager {
        CascadeManager::new(CascadeConfig::new(split_count, blend, 10.0))
    }

    #[test]
    fn test_config_clamps() {
        let mut config = CascadeConfig::new(0, -1.0, 0.0);
        assert_eq!(config.split_count(), 1);
        assert_eq!(config.blend(), 0.0);

        config.set_split_count(20);
        config.set_blend(3.0);
        assert_eq!(config.split_count(), MAX_SPLITS);
        assert_eq!(config.blend(), 1.0);
    }

    #[test]
    fn test_splits_increase() {
        for count in 2..=MAX_SPLITS {
            for blend in [0.0, 0.25, 0.5, 1.0] {
                let m = manager(count, blend);
                let mut prev = 0.1;
                for i in 0..count {
                    let d = m.split_distance(i, 0.1, 1000.0);
                    assert!(d > prev, "count {count} blend {blend}: {d} <= {prev}");
                    prev = d;
                }
                assert!((prev - 1000.0).abs() < 0.1);
            }
        }
    }

    #[test]
    fn test_blend_extremes() {
        let log = manager(4, 0.0);
        let uniform = manager(4, 1.0);
        for i in 0..4 {
            let fraction = (i + 1) as f32 / 4.0;
            let expected_log = 1.0 * 100.0f32.powf(fraction);
            let expected_uniform = 1.0 + 99.0 * fraction;
            assert!((log.split_distance(i, 1.0, 100.0) - expected_log).abs() < 1e-2);
            assert!((uniform.split_distance(i, 1.0, 100.0) - expected_uniform).abs() < 1e-2);
        }
    }

    #[test]
    fn test_cascades_cover_frustum() {
        let camera = Camera::new_perspective(Vec3::ZERO, Vec3::X, Vec3::Z, 60.0, 1.0, 0.1, 1000.0);
        let light = DirectionalLight::default();
        let data = manager(4, 0.5).cascade_shadow_map_data(&camera, &light);

        assert_eq!(data.splits().len(), 4);
        let mut prev = 0.1;
        for &d in data.splits() {
            assert!(d > prev && d <= 1000.1);
            prev = d;
        }

        // Sample the whole frustum; every point must fall inside some crop.
        let tan = (30.0f32).to_radians().tan();
        for step in 0..=50 {
            let depth = 0.1 + (1000.0 - 0.1) * (step as f32 / 50.0).powi(3);
            for (sx, sy) in [(-1.0, -1.0), (1.0, 1.0), (0.0, 0.0), (-1.0, 0.5), (0.7, -1.0)] {
                let view_point = Vec3::new(sx * tan * depth, sy * tan * depth, -depth);
                let world = camera.inverse_view_matrix().transform_point3(view_point);
                let covered = (0..data.split_count).any(|i| {
                    let ndc = data.view_projection(i).project_point3(world);
                    ndc.abs().max_element() <= 1.0 + 1e-3
                });
                assert!(covered, "{world} not covered by any cascade");
            }
        }
    }

    #[test]
    fn test_near_bias_extends_toward_light() {
        let camera = Camera::new_perspective(Vec3::ZERO, Vec3::X, Vec3::Z, 60.0, 1.0, 0.1, 100.0);
        let light = DirectionalLight::default();
        let data = manager(1, 0.5).cascade_shadow_map_data(&camera, &light);
        let tan = (30.0f32).to_radians().tan();

        // Highest frustum point, then a caster 5 units above it.
        let top = Vec3::new(100.0, 0.0, 100.0 * tan);
        let caster = top + Vec3::Z * 5.0;
        assert!(data.view_projection(0).project_point3(caster).abs().max_element() <= 1.0 + 1e-3);
    }

    #[test]
    fn test_uniform_layout() {
        let camera = Camera::new_perspective(Vec3::ZERO, Vec3::X, Vec3::Z, 60.0, 1.0, 0.1, 100.0);
        let data = manager(3, 0.5).cascade_shadow_map_data(&camera, &DirectionalLight::default());
        let uniform = CascadeUniform::from_cascades(&data);
        assert_eq!(uniform.count, 3);
        assert_eq!(uniform.splits[0][2], data.split_distances[2]);
        assert_eq!(uniform.splits[0][3], 0.0);
        assert_eq!(std::mem::size_of::<CascadeUniform>(), 16 * 4 * 8 + 32 + 16);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), std::mem::size_of::<CascadeUniform>());
    }
}
