//! Shadow caster and receiver classification.
//!
//! Receivers are meshes the camera can see; casters are receivers plus any
//! off-screen mesh whose shadow can reach the view frustum.

use super::ShadowProjectionParameters;
use crate::culling::{Frustum, Intersection};
use crate::geometry::{BoundingBox, BoundingSphere};
use crate::viewer::Viewer;
use glam::Vec3;

/// Smallest depth range handed to the projection builders.
const MIN_DEPTH_RANGE: f32 = 0.01;

/// World bounds of one mesh, as handed over by the scene.
#[derive(Debug, Clone, Copy)]
pub struct MeshBounds {
    /// World-space axis-aligned bounds.
    pub world_aabb: BoundingBox,
    /// Hidden meshes neither cast nor receive.
    pub hidden: bool,
}

impl MeshBounds {
    /// Bounds of a visible mesh.
    pub fn new(world_aabb: BoundingBox) -> Self {
        Self {
            world_aabb,
            hidden: false,
        }
    }
}

/// Result of classifying a mesh list against a camera.
#[derive(Debug, Clone, Default)]
pub struct ShadowCasterSet {
    /// Caster bounds in camera view space.
    pub casters: Vec<BoundingBox>,
    /// Receiver bounds in camera view space.
    pub receivers: Vec<BoundingBox>,
    /// Caster bounds in world space, in the same order as `casters`.
    pub world_casters: Vec<BoundingBox>,
    /// Union of all receivers in world space.
    pub world_receivers: BoundingBox,
    /// World bounds of every non-hidden mesh, casting or not.
    pub world_meshes: Vec<BoundingBox>,
}

impl ShadowCasterSet {
    /// Partition `meshes` into casters and receivers for the given camera.
    ///
    /// `light_direction` is the normalized direction the light travels.
    pub fn classify(camera: &dyn Viewer, light_direction: Vec3, meshes: &[MeshBounds]) -> Self {
        let view = camera.view_matrix();
        let frustum = Frustum::from_view_projection(camera.view_projection_matrix());
        let mut set = Self {
            world_receivers: BoundingBox::EMPTY,
            ..Default::default()
        };

        for mesh in meshes.iter().filter(|m| !m.hidden) {
            let aabb = mesh.world_aabb;
            if !aabb.is_valid() {
                continue;
            }
            set.world_meshes.push(aabb);

            match frustum.test_box(&aabb) {
                Intersection::Inside | Intersection::Intersecting => {
                    let view_box = aabb.transformed(&view);
                    set.casters.push(view_box);
                    set.receivers.push(view_box);
                    set.world_casters.push(aabb);
                    set.world_receivers = set.world_receivers.merge(&aabb);
                }
                Intersection::Outside => {
                    let sphere = BoundingSphere::from_box(&aabb);
                    if frustum.test_swept_sphere(&sphere, light_direction) {
                        set.casters.push(aabb.transformed(&view));
                        set.world_casters.push(aabb);
                    }
                }
            }
        }

        tracing::trace!(
            meshes = meshes.len(),
            casters = set.casters.len(),
            receivers = set.receivers.len(),
            "classified shadow casters"
        );

        set
    }

    /// Union of all casters in world space.
    pub fn world_caster_bounds(&self) -> BoundingBox {
        self.world_casters
            .iter()
            .fold(BoundingBox::EMPTY, |acc, b| acc.merge(b))
    }

    /// Receiver view depth range `(near, far)`, clamped into the camera's range.
    pub fn depth_range(&self, camera: &dyn Viewer) -> (f32, f32) {
        let (cam_near, cam_far) = (camera.near_z(), camera.far_z());
        if self.receivers.is_empty() {
            return (cam_near, cam_far);
        }

        let (min_depth, max_depth) = self
            .receivers
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), b| {
                (lo.min(-b.max.z), hi.max(-b.min.z))
            });

        let near = min_depth.clamp(cam_near, cam_far);
        let far = max_depth.min(cam_far).max(near + MIN_DEPTH_RANGE);
        (near, far)
    }

    /// Write the classification-derived fields of `params`.
    pub fn update_parameters(
        &self,
        camera: &dyn Viewer,
        light_direction: Vec3,
        params: &mut ShadowProjectionParameters,
    ) {
        let (near, far) = self.depth_range(camera);
        params.z_near = near;
        params.z_far = far;
        params.cos_gamma = light_direction.dot(camera.forward());
    }
}
