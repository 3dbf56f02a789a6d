//! Error types for the fallible projection builders.
//!
//! None of these escape [`crate::shadow::calculate_shadow_projection`]; the
//! calculator turns each one into its fallback and logs it.

use thiserror::Error;

/// Why a projection could not be built from the given inputs.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ShadowError {
    /// A direction vector had zero (or non-finite) length.
    #[error("direction vector is zero or not finite")]
    DegenerateDirection,

    /// The light is (anti-)parallel to the view direction.
    #[error("light direction is parallel to the view direction (cos gamma = {cos_gamma})")]
    ParallelLightView {
        /// Cosine between the light and view directions.
        cos_gamma: f32,
    },

    /// There were no points to fit a volume around.
    #[error("no geometry to fit the projection to")]
    EmptyBody,

    /// The warp depth range collapsed.
    #[error("warp depth range collapsed to {extent}")]
    CollapsedDepthRange {
        /// Remaining `far - near` distance.
        extent: f32,
    },

    /// Every point ended up behind the projection center.
    #[error("no point lies in front of the projection center")]
    NoVisiblePoints,

    /// Some points ended up behind the projection center and would be clipped.
    #[error("{count} points lie behind the projection center")]
    PointsBehindCenter {
        /// Number of rejected points.
        count: usize,
    },
}

/// Result alias for shadow projection builders.
pub type Result<T> = std::result::Result<T, ShadowError>;
