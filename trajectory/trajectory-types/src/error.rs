//! Error types for the trajectory-types crate.

use thiserror::Error;

/// Errors that can occur while building or converting specifications.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Two groups cover overlapping channel ranges.
    #[error("groups '{first}' and '{second}' cover overlapping channels")]
    OverlappingGroups {
        /// Name of the first offending group.
        first: String,
        /// Name of the second offending group.
        second: String,
    },

    /// A group declares zero degrees of freedom.
    #[error("group '{name}' has zero dof")]
    EmptyGroup {
        /// Name of the offending group.
        name: String,
    },

    /// A conversion buffer is smaller than the requested row count requires.
    #[error("conversion buffer too small: need {needed} values, got {got}")]
    BufferTooSmall {
        /// Number of values the conversion needs.
        needed: usize,
        /// Number of values available.
        got: usize,
    },

    /// An affine DOF bitmask selects more than one rotation representation.
    #[error("invalid affine dof mask {mask:#x}")]
    InvalidAffineMask {
        /// The offending bitmask.
        mask: u32,
    },
}

impl SpecError {
    /// Creates an overlapping-groups error.
    #[must_use]
    pub fn overlapping(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::OverlappingGroups {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Result type for specification operations.
pub type Result<T> = std::result::Result<T, SpecError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_overlapping() {
        let err = SpecError::overlapping("joint_values", "deltatime");
        assert!(err.to_string().contains("overlapping"));
        assert!(err.to_string().contains("joint_values"));
    }

    #[test]
    fn error_buffer_too_small() {
        let err = SpecError::BufferTooSmall { needed: 6, got: 4 };
        assert!(err.to_string().contains('6'));
        assert!(err.to_string().contains('4'));
    }
}
