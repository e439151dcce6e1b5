//! Named channel groups and the relationships between interpolation labels
//! and group categories.

use serde::{Deserialize, Serialize};

use crate::scalar::Float;

/// One named slice of a waypoint row.
///
/// The name is a space-separated token list. The first token is the category
/// (`deltatime`, `joint_values`, `affine_transform`, ...); the rest is
/// parameter data such as a robot name or an integer tag and is never
/// interpreted here.
///
/// # Example
///
/// ```
/// use trajectory_types::Group;
///
/// let g = Group::new("joint_velocities arm 0 1", 3, 2, "linear");
/// assert_eq!(g.category(), "joint_velocities");
/// assert_eq!(g.parameter_data(), "arm 0 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    /// Space-separated token list; the first token is the category.
    pub name: String,

    /// Index of the group's first channel within a row.
    pub offset: usize,

    /// Number of contiguous channels the group covers.
    pub dof: usize,

    /// Interpolation label (`linear`, `cubic`, ...); may be empty.
    pub interpolation: String,
}

impl Group {
    /// Creates a new group.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        offset: usize,
        dof: usize,
        interpolation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            offset,
            dof,
            interpolation: interpolation.into(),
        }
    }

    /// Returns the category (the first space-separated token of the name).
    #[must_use]
    pub fn category(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// Returns the parameter data (everything after the category token).
    #[must_use]
    pub fn parameter_data(&self) -> &str {
        match self.name.split_once(char::is_whitespace) {
            Some((_, rest)) => rest.trim(),
            None => "",
        }
    }

    /// Returns the channel range `[offset, offset + dof)` covered by this group.
    #[must_use]
    pub fn channels(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.dof
    }

    /// Returns true if the value at `row[offset]` carries segment traversal time.
    #[must_use]
    pub fn is_deltatime(&self) -> bool {
        self.name == "deltatime"
    }
}

/// Per-category default fill value used when converting between
/// specifications with no matching source group.
#[must_use]
pub(crate) fn category_padding(category: &str) -> Float {
    if category == "outputSignals" {
        -1.0
    } else {
        0.0
    }
}

/// Returns the interpolation label expected on the time derivative of a
/// group labeled `label`.
///
/// Sampling only treats a candidate derivative group as usable when its
/// label matches this table; a mismatch demotes the relation to "no
/// derivative available".
#[must_use]
pub fn derivative_interpolation(label: &str) -> Option<&'static str> {
    match label {
        "linear" => Some("next"),
        "quadratic" => Some("linear"),
        "cubic" => Some("quadratic"),
        "quartic" => Some("cubic"),
        "quintic" => Some("quartic"),
        "sextic" => Some("quintic"),
        _ => None,
    }
}

/// Returns the interpolation label expected on the time integral of a group
/// labeled `label`. Inverse of [`derivative_interpolation`].
#[must_use]
pub fn integral_interpolation(label: &str) -> Option<&'static str> {
    match label {
        "next" => Some("linear"),
        "linear" => Some("quadratic"),
        "quadratic" => Some("cubic"),
        "cubic" => Some("quartic"),
        "quartic" => Some("quintic"),
        "quintic" => Some("sextic"),
        _ => None,
    }
}

/// Maps a group category to the category holding its time derivative.
#[must_use]
pub fn derivative_category(category: &str) -> Option<&'static str> {
    match category {
        "joint_values" => Some("joint_velocities"),
        "joint_velocities" => Some("joint_accelerations"),
        "joint_accelerations" => Some("joint_jerks"),
        "joint_jerks" => Some("joint_snaps"),
        "affine_transform" => Some("affine_velocities"),
        "affine_velocities" => Some("affine_accelerations"),
        "affine_accelerations" => Some("affine_jerks"),
        "affine_jerks" => Some("affine_snaps"),
        "ikparam_values" => Some("ikparam_velocities"),
        "ikparam_velocities" => Some("ikparam_accelerations"),
        _ => None,
    }
}

/// Maps a group category to the category holding its time integral.
/// Inverse of [`derivative_category`].
#[must_use]
pub fn integral_category(category: &str) -> Option<&'static str> {
    match category {
        "joint_velocities" => Some("joint_values"),
        "joint_accelerations" => Some("joint_velocities"),
        "joint_jerks" => Some("joint_accelerations"),
        "joint_snaps" => Some("joint_jerks"),
        "affine_velocities" => Some("affine_transform"),
        "affine_accelerations" => Some("affine_velocities"),
        "affine_jerks" => Some("affine_accelerations"),
        "affine_snaps" => Some("affine_jerks"),
        "ikparam_velocities" => Some("ikparam_values"),
        "ikparam_accelerations" => Some("ikparam_velocities"),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn category_is_first_token() {
        let g = Group::new("joint_values robot 0 1 2", 0, 3, "linear");
        assert_eq!(g.category(), "joint_values");
        assert_eq!(g.parameter_data(), "robot 0 1 2");
    }

    #[test]
    fn bare_name_has_empty_parameter_data() {
        let g = Group::new("deltatime", 4, 1, "");
        assert_eq!(g.category(), "deltatime");
        assert_eq!(g.parameter_data(), "");
        assert!(g.is_deltatime());
    }

    #[test]
    fn channel_range() {
        let g = Group::new("joint_values", 2, 3, "linear");
        assert_eq!(g.channels(), 2..5);
    }

    #[test]
    fn derivative_labels_chain_down() {
        assert_eq!(derivative_interpolation("cubic"), Some("quadratic"));
        assert_eq!(derivative_interpolation("linear"), Some("next"));
        assert_eq!(derivative_interpolation("next"), None);
        assert_eq!(derivative_interpolation(""), None);
    }

    #[test]
    fn integral_labels_invert_derivative_labels() {
        for label in ["next", "linear", "quadratic", "cubic", "quartic", "quintic"] {
            let up = integral_interpolation(label).unwrap();
            assert_eq!(derivative_interpolation(up), Some(label));
        }
    }

    #[test]
    fn category_chains_are_inverses() {
        for cat in [
            "joint_values",
            "joint_velocities",
            "affine_transform",
            "ikparam_values",
        ] {
            let deriv = derivative_category(cat).unwrap();
            assert_eq!(integral_category(deriv), Some(cat));
        }
        assert_eq!(derivative_category("joint_snaps"), None);
        assert_eq!(integral_category("joint_values"), None);
    }

    #[test]
    fn output_signals_pad_with_negative_one() {
        assert_eq!(category_padding("outputSignals"), -1.0);
        assert_eq!(category_padding("joint_values"), 0.0);
    }
}
