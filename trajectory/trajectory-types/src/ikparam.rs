//! Rotation/direction subtypes for `ikparam_values` groups.

use serde::{Deserialize, Serialize};

use crate::group::Group;

/// Rotation or direction subtype of an `ikparam_values` group, encoded as a
/// small integer tag in the group's parameter data.
///
/// The tag determines how many leading channels of the group carry the
/// rotation-like quantity and how the sampling engine reconstructs it:
///
/// | Tag | Kind | Leading channels |
/// |-----|------|------------------|
/// | 4 | [`Rotation3D`](Self::Rotation3D) | unit quaternion `w x y z` |
/// | 5 | [`TranslationDirection5D`](Self::TranslationDirection5D) | unit direction `x y z` |
/// | 6 | [`Transform6D`](Self::Transform6D) | unit quaternion `w x y z` |
///
/// Groups with any other tag fall back to plain scalar interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IkParamKind {
    /// Pure rotation stored as a unit quaternion.
    Rotation3D,
    /// Translation plus a unit direction (5 degrees of freedom).
    TranslationDirection5D,
    /// Full rigid transform: quaternion followed by translation.
    Transform6D,
}

impl IkParamKind {
    /// Returns the integer tag used in group names.
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::Rotation3D => 4,
            Self::TranslationDirection5D => 5,
            Self::Transform6D => 6,
        }
    }

    /// Parses an integer tag.
    #[must_use]
    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            4 => Some(Self::Rotation3D),
            5 => Some(Self::TranslationDirection5D),
            6 => Some(Self::Transform6D),
            _ => None,
        }
    }

    /// Number of leading channels the rotation-like quantity occupies.
    #[must_use]
    pub const fn rotation_channels(self) -> usize {
        match self {
            Self::Rotation3D | Self::Transform6D => 4,
            Self::TranslationDirection5D => 3,
        }
    }

    /// Total number of channels a group of this kind carries.
    #[must_use]
    pub const fn value_count(self) -> usize {
        match self {
            Self::Rotation3D => 4,
            Self::TranslationDirection5D => 6,
            Self::Transform6D => 7,
        }
    }

    /// Extracts the kind from a group's parameter data.
    ///
    /// The tag is the first parameter token; missing or unknown tags return
    /// `None`.
    #[must_use]
    pub fn from_group(group: &Group) -> Option<Self> {
        let tag = group
            .parameter_data()
            .split_whitespace()
            .next()?
            .parse::<u32>()
            .ok()?;
        Self::from_tag(tag)
    }
}
