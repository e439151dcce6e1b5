//! Error types for the trajectory-core crate.

use thiserror::Error;
use trajectory_types::{Float, SpecError};

/// Broad classification of trajectory errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A precondition on a public operation failed.
    InvalidArguments,
    /// Derived data violated an integrity constraint.
    InvalidState,
    /// The requested reconstruction is not supported for this data shape.
    NotImplemented,
}

/// Errors that can occur while mutating or sampling a trajectory.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    /// The trajectory has not been initialized with a specification.
    #[error("trajectory is not initialized")]
    NotInitialized,

    /// The specification has no `deltatime` group, so time-based operations
    /// are unavailable.
    #[error("specification has no deltatime group")]
    NoTimeGroup,

    /// Waypoint data length is not a whole number of rows.
    #[error("data length {len} is not a multiple of the specification dof {dof}")]
    MisalignedData {
        /// Length of the offered data.
        len: usize,
        /// Total channels per row.
        dof: usize,
    },

    /// A waypoint index exceeds the waypoint count.
    #[error("waypoint index {index} is out of bounds for {count} waypoints")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Current number of waypoints.
        count: usize,
    },

    /// A waypoint range is inverted or exceeds the waypoint count.
    #[error("invalid waypoint range [{start}, {end}) for {count} waypoints")]
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Current number of waypoints.
        count: usize,
    },

    /// A sample time is negative.
    #[error("sample time {time} is negative")]
    NegativeSampleTime {
        /// The offending time.
        time: Float,
    },

    /// A sampling time range is inverted.
    #[error("sample range [{start}, {stop}) is inverted")]
    InvalidTimeRange {
        /// Range start.
        start: Float,
        /// Range stop.
        stop: Float,
    },

    /// A sampling step is zero or negative.
    #[error("sample step {step} must be positive")]
    NonPositiveStep {
        /// The offending step.
        step: Float,
    },

    /// The trajectory holds no waypoints to sample from.
    #[error("trajectory needs at least one waypoint to sample from")]
    NoWaypoints,

    /// A stored `deltatime` value is negative.
    #[error("deltatime ({value:.15e}) is < 0 at waypoint {index}/{count}")]
    NegativeDeltaTime {
        /// Index of the offending waypoint.
        index: usize,
        /// Total number of waypoints.
        count: usize,
        /// The offending value.
        value: Float,
    },

    /// A group needs derivative or integral data that the specification
    /// does not provide.
    #[error("{interpolation} interpolation group '{name}' needs derivatives/integrals for sampling")]
    UnsamplableGroup {
        /// Name of the offending group.
        name: String,
        /// Its interpolation label.
        interpolation: String,
    },

    /// A group's interpolator was invoked without all required auxiliary data.
    #[error("{interpolation} interpolation group '{name}' does not have all data")]
    MissingInterpolationData {
        /// Name of the offending group.
        name: String,
        /// Its interpolation label.
        interpolation: String,
    },

    /// Segment validation recomputed an endpoint outside tolerance.
    #[error(
        "segment starting at waypoint {segment} of group '{name}' ({interpolation}) deviates by {error:.3e} at dof {dof}"
    )]
    SegmentValidation {
        /// Name of the offending group.
        name: String,
        /// Its interpolation label.
        interpolation: String,
        /// Index of the segment's first waypoint.
        segment: usize,
        /// Channel within the group.
        dof: usize,
        /// Absolute reconstruction error.
        error: Float,
    },

    /// The requested reconstruction exists but is not implemented for this
    /// data shape.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A specification-level failure.
    #[error(transparent)]
    Spec(#[from] SpecError),
}

impl TrajectoryError {
    /// Classifies this error into one of the three trajectory error kinds.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NegativeDeltaTime { .. } | Self::SegmentValidation { .. } => {
                ErrorKind::InvalidState
            }
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            _ => ErrorKind::InvalidArguments,
        }
    }
}

/// Result type for trajectory operations.
pub type Result<T> = std::result::Result<T, TrajectoryError>;
