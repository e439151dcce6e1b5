//! Runtime scalar type and shared tolerances.
//!
//! Waypoint data is stored as [`Float`], which is `f64` unless the
//! `single-precision` feature selects `f32`. Serialized streams always use a
//! single scalar width; mixing widths within one stream is not supported.

/// Runtime numeric scalar for waypoint channels.
#[cfg(not(feature = "single-precision"))]
pub type Float = f64;

/// Runtime numeric scalar for waypoint channels.
#[cfg(feature = "single-precision")]
pub type Float = f32;

/// Smallest time/value magnitude treated as nonzero by the sampling engine.
#[cfg(not(feature = "single-precision"))]
pub const EPSILON: Float = 1e-15;

/// Smallest time/value magnitude treated as nonzero by the sampling engine.
#[cfg(feature = "single-precision")]
pub const EPSILON: Float = 2e-7;

/// One full turn. Segment validation exempts errors of this magnitude to
/// accommodate circular joints.
pub const TWO_PI: Float = 6.283_185_307_179_586;

/// Tolerance used when validating linear segment reconstruction.
#[must_use]
pub fn epsilon_linear() -> Float {
    EPSILON.powf(0.9)
}
