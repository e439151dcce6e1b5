//! Ordered channel layouts with derivative/integral queries.

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::group::{derivative_category, integral_category, Group};

/// Fixed precedence of known categories in the canonical group order.
///
/// Derivative groups sort before the groups they derive so that sampling can
/// resolve auxiliary data in a single pass. Unknown categories sort
/// lexicographically after all known ones.
fn category_rank(category: &str) -> Option<u32> {
    match category {
        "deltatime" => Some(0),
        "joint_snaps" => Some(1),
        "affine_snaps" => Some(2),
        "joint_jerks" => Some(3),
        "affine_jerks" => Some(4),
        "joint_accelerations" => Some(5),
        "affine_accelerations" => Some(6),
        "joint_velocities" => Some(7),
        "affine_velocities" => Some(8),
        "joint_values" => Some(9),
        "affine_transform" => Some(10),
        "joint_torques" => Some(11),
        _ => None,
    }
}

/// An ordered sequence of named channel groups.
///
/// Groups are held in a canonical computation order assigned at construction
/// time: known categories by fixed precedence, unknown categories
/// lexicographically after them. Channel offsets are left exactly as
/// declared; ordering only affects iteration.
///
/// Rows described by a specification are `dof()` channels wide, where the
/// total DOF is the highest covered channel index plus one. Layouts with
/// uncovered gaps are permitted; gap channels are zero-initialized on
/// conversion.
///
/// # Example
///
/// ```
/// use trajectory_types::{ConfigurationSpecification, Group};
///
/// let spec = ConfigurationSpecification::new(vec![
///     Group::new("joint_values", 0, 2, "quadratic"),
///     Group::new("joint_velocities", 2, 2, "linear"),
///     Group::new("deltatime", 4, 1, ""),
/// ])
/// .unwrap();
///
/// let vals = &spec.groups()[spec.groups().len() - 1];
/// assert_eq!(vals.category(), "joint_values");
/// let deriv = spec.find_time_derivative_group(vals).unwrap();
/// assert_eq!(deriv.category(), "joint_velocities");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Group>", into = "Vec<Group>")]
pub struct ConfigurationSpecification {
    groups: Vec<Group>,
    dof: usize,
    time_offset: Option<usize>,
}

impl ConfigurationSpecification {
    /// Builds a specification from groups, assigning the canonical order.
    ///
    /// # Errors
    ///
    /// Returns an error if any group has zero dof or two groups cover
    /// overlapping channels.
    pub fn new(mut groups: Vec<Group>) -> Result<Self, SpecError> {
        for group in &groups {
            if group.dof == 0 {
                return Err(SpecError::EmptyGroup {
                    name: group.name.clone(),
                });
            }
        }
        groups.sort_by(|a, b| {
            let (ca, cb) = (a.category(), b.category());
            match (category_rank(ca), category_rank(cb)) {
                (Some(ra), Some(rb)) => ra.cmp(&rb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => ca.cmp(cb),
            }
        });

        let mut by_offset: Vec<&Group> = groups.iter().collect();
        by_offset.sort_by_key(|g| g.offset);
        for pair in by_offset.windows(2) {
            if pair[1].offset < pair[0].offset + pair[0].dof {
                return Err(SpecError::overlapping(&pair[0].name, &pair[1].name));
            }
        }

        let dof = groups.iter().map(|g| g.offset + g.dof).max().unwrap_or(0);
        let time_offset = groups.iter().find(|g| g.is_deltatime()).map(|g| g.offset);
        Ok(Self {
            groups,
            dof,
            time_offset,
        })
    }

    /// Returns the groups in canonical order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Returns the total number of channels per row.
    #[must_use]
    pub fn dof(&self) -> usize {
        self.dof
    }

    /// Returns the channel offset of the `deltatime` group, if present.
    #[must_use]
    pub fn time_offset(&self) -> Option<usize> {
        self.time_offset
    }

    /// Returns true if the specification has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Finds a group compatible with `other`.
    ///
    /// Prefers a group with the identical name; otherwise matches on the
    /// category token. In both cases the dof must agree.
    #[must_use]
    pub fn find_compatible_group(&self, other: &Group) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.name == other.name && g.dof == other.dof)
            .or_else(|| {
                self.groups
                    .iter()
                    .find(|g| g.category() == other.category() && g.dof == other.dof)
            })
    }

    /// Finds the group holding the time derivative of `group`, preserving
    /// its trailing parameter data.
    ///
    /// The match is structural only; the sampling engine separately demotes
    /// derivative groups whose interpolation label does not agree with the
    /// parent's.
    #[must_use]
    pub fn find_time_derivative_group(&self, group: &Group) -> Option<&Group> {
        let category = derivative_category(group.category())?;
        self.find_related_group(group, category)
    }

    /// Finds the group holding the time integral of `group`, preserving its
    /// trailing parameter data.
    #[must_use]
    pub fn find_time_integral_group(&self, group: &Group) -> Option<&Group> {
        let category = integral_category(group.category())?;
        self.find_related_group(group, category)
    }

    fn find_related_group(&self, group: &Group, category: &str) -> Option<&Group> {
        let parameter_data = group.parameter_data();
        let name = if parameter_data.is_empty() {
            category.to_owned()
        } else {
            format!("{category} {parameter_data}")
        };
        let target = Group::new(name, 0, group.dof, "");
        self.find_compatible_group(&target)
    }
}

impl TryFrom<Vec<Group>> for ConfigurationSpecification {
    type Error = SpecError;

    fn try_from(groups: Vec<Group>) -> Result<Self, Self::Error> {
        Self::new(groups)
    }
}

impl From<ConfigurationSpecification> for Vec<Group> {
    fn from(spec: ConfigurationSpecification) -> Self {
        spec.groups
    }
}
