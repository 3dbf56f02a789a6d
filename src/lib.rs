//! Umbra shadow projections
//!
//! Computes the light view and projection matrices a renderer needs to draw
//! shadow maps. Nothing here touches the GPU; the results are plain `glam`
//! matrices plus `bytemuck` uniform records.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **geometry** - Bounding boxes, spheres, cones
//! 2. **culling** - Planes and view frusta
//! 3. **viewer** / **light** - What the calculator reads from a camera and a light
//! 4. **shadow** - Caster classification, projection builders, cascades
//!
//! # Conventions
//!
//! Right-handed, Z-up world. View spaces look down -Z and clip space is the
//! OpenGL unit cube `[-1, 1]^3`. A light direction is the direction light
//! travels.

pub mod culling;
pub mod error;
pub mod geometry;
pub mod light;
pub mod shadow;
pub mod viewer;

// Re-export commonly used types
pub use culling::{Frustum, Intersection, Plane};
pub use error::{Result, ShadowError};
pub use geometry::{BoundingBox, BoundingCone, BoundingSphere, BoundingVolume};
pub use light::{DirectionalLight, LightType, PointLight, SpotLight};
pub use shadow::{
    calculate_shadow_projection, CascadeConfig, CascadeManager, CascadeShadowMapData,
    CascadeUniform, LightTransform, MeshBounds, ShadowCasterSet, ShadowConfig,
    ShadowProjectionMode, ShadowProjectionParameters, ShadowUniform,
};
pub use viewer::{Camera, Viewer};

// Re-export glam for convenience
pub use glam;
