//! Per-group kernel selection and auxiliary-offset resolution.
//!
//! Runs once per [`Trajectory::init`]: every group gets an interpolation
//! kernel tag picked from its label and category, and the channels of groups
//! whose kernels consume neighboring derivative/integral data get the
//! offsets of those source channels resolved through the specification's
//! category chains.

use trajectory_types::{
    derivative_interpolation, integral_interpolation, ConfigurationSpecification, Group,
    IkParamKind,
};

use crate::trajectory::Trajectory;

/// Interpolation kernel resolved for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InterpKernel {
    Previous,
    Next,
    Max,
    Linear,
    LinearIk(IkParamKind),
    Quadratic,
    QuadraticIk(IkParamKind),
    Cubic,
    CubicIk(IkParamKind),
    Quartic,
    Quintic,
    Sextic,
}

/// Endpoint validation kernel resolved for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidateKernel {
    Linear,
    Quadratic,
}

/// Kernel bindings for one group, indexed in parallel with the
/// specification's group list.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct GroupRuntime {
    pub kernel: Option<InterpKernel>,
    pub validator: Option<ValidateKernel>,
}

/// Returns the rotation-aware subtype of an `ikparam_values` group, if its
/// tag is known and the group is wide enough to hold the rotation channels.
fn rotation_kind(group: &Group) -> Option<IkParamKind> {
    if group.category() != "ikparam_values" {
        return None;
    }
    let kind = IkParamKind::from_group(group)?;
    if group.dof < kind.rotation_channels() {
        return None;
    }
    Some(kind)
}

/// Picks kernels for one group and reports how many neighboring waypoints
/// its reconstruction consumes (0, 2, or 3).
fn bind_kernels(group: &Group) -> (GroupRuntime, i32) {
    let mut runtime = GroupRuntime::default();
    let mut needs_neighbors = 0;
    match group.interpolation.as_str() {
        "previous" => runtime.kernel = Some(InterpKernel::Previous),
        // No interpolation defaults to "next"; the deltatime group is such
        // a group, but its slot is overwritten by sampling.
        "next" | "" => runtime.kernel = Some(InterpKernel::Next),
        "max" => runtime.kernel = Some(InterpKernel::Max),
        "linear" => {
            match rotation_kind(group) {
                Some(kind) => runtime.kernel = Some(InterpKernel::LinearIk(kind)),
                None => {
                    runtime.kernel = Some(InterpKernel::Linear);
                    runtime.validator = Some(ValidateKernel::Linear);
                }
            }
            needs_neighbors = 2;
        }
        "quadratic" => {
            match rotation_kind(group) {
                Some(kind) => runtime.kernel = Some(InterpKernel::QuadraticIk(kind)),
                None => {
                    runtime.kernel = Some(InterpKernel::Quadratic);
                    runtime.validator = Some(ValidateKernel::Quadratic);
                }
            }
            needs_neighbors = 3;
        }
        "cubic" => {
            runtime.kernel = Some(match rotation_kind(group) {
                Some(kind) => InterpKernel::CubicIk(kind),
                None => InterpKernel::Cubic,
            });
            needs_neighbors = 3;
        }
        "quartic" => {
            runtime.kernel = Some(InterpKernel::Quartic);
            needs_neighbors = 3;
        }
        "quintic" => {
            runtime.kernel = Some(InterpKernel::Quintic);
            needs_neighbors = 3;
        }
        "sextic" => {
            runtime.kernel = Some(InterpKernel::Sextic);
            needs_neighbors = 3;
        }
        _ => {}
    }
    (runtime, needs_neighbors)
}

/// Finds the time derivative of `group` whose interpolation label matches
/// the expected derivative of the parent label.
///
/// A label mismatch demotes the candidate: specifications in the wild
/// decouple e.g. linear positions from linear velocities.
fn matching_derivative<'a>(
    spec: &'a ConfigurationSpecification,
    group: &Group,
) -> Option<&'a Group> {
    spec.find_time_derivative_group(group).filter(|candidate| {
        derivative_interpolation(&group.interpolation) == Some(candidate.interpolation.as_str())
    })
}

/// Finds the time integral of `group`, with the same label-match rule.
fn matching_integral<'a>(
    spec: &'a ConfigurationSpecification,
    group: &Group,
) -> Option<&'a Group> {
    spec.find_time_integral_group(group).filter(|candidate| {
        integral_interpolation(&group.interpolation) == Some(candidate.interpolation.as_str())
    })
}

fn fill_missing(offsets: &mut [i32], group: &Group, needs: i32) {
    for channel in group.channels() {
        offsets[channel] = -needs;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn fill_source(offsets: &mut [i32], group: &Group, source: &Group) {
    for dof in 0..group.dof {
        offsets[group.offset + dof] = (source.offset + dof) as i32;
    }
}

/// Walks values -> derivative -> second -> third, recording resolved channel
/// offsets or the needed-but-missing sentinel.
fn resolve_derivative_chain(
    spec: &ConfigurationSpecification,
    group: &Group,
    needs: i32,
    deriv_offsets: &mut [i32],
    dd_offsets: &mut [i32],
    ddd_offsets: &mut [i32],
) {
    let Some(deriv) = matching_derivative(spec, group) else {
        fill_missing(deriv_offsets, group, needs);
        return;
    };
    fill_source(deriv_offsets, group, deriv);

    let Some(dd) = matching_derivative(spec, deriv) else {
        fill_missing(dd_offsets, group, needs);
        return;
    };
    fill_source(dd_offsets, group, dd);

    match matching_derivative(spec, dd) {
        Some(ddd) => fill_source(ddd_offsets, group, ddd),
        None => fill_missing(ddd_offsets, group, needs),
    }
}

/// Walks values -> integral -> second integral, as above.
fn resolve_integral_chain(
    spec: &ConfigurationSpecification,
    group: &Group,
    needs: i32,
    integral_offsets: &mut [i32],
    ii_offsets: &mut [i32],
) {
    let Some(integral) = matching_integral(spec, group) else {
        fill_missing(integral_offsets, group, needs);
        return;
    };
    fill_source(integral_offsets, group, integral);

    match matching_integral(spec, integral) {
        Some(ii) => fill_source(ii_offsets, group, ii),
        None => fill_missing(ii_offsets, group, needs),
    }
}

impl Trajectory {
    /// Re-binds every group's kernels and resolves auxiliary offsets.
    pub(crate) fn resolve_group_functions(&mut self) {
        let dof = self.spec.dof();
        self.runtime.clear();
        self.deriv_offsets = vec![-1; dof];
        self.dd_offsets = vec![-1; dof];
        self.ddd_offsets = vec![-1; dof];
        self.integral_offsets = vec![-1; dof];
        self.ii_offsets = vec![-1; dof];

        for group in self.spec.groups() {
            let (runtime, needs_neighbors) = bind_kernels(group);
            self.runtime.push(runtime);
            if needs_neighbors > 0 {
                resolve_derivative_chain(
                    &self.spec,
                    group,
                    needs_neighbors,
                    &mut self.deriv_offsets,
                    &mut self.dd_offsets,
                    &mut self.ddd_offsets,
                );
                resolve_integral_chain(
                    &self.spec,
                    group,
                    needs_neighbors,
                    &mut self.integral_offsets,
                    &mut self.ii_offsets,
                );
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn init(groups: Vec<Group>) -> Trajectory {
        let mut traj = Trajectory::new();
        traj.init(ConfigurationSpecification::new(groups).unwrap());
        traj
    }

    fn group_index(traj: &Trajectory, category: &str) -> usize {
        traj.spec()
            .groups()
            .iter()
            .position(|g| g.category() == category)
            .unwrap()
    }

    #[test]
    fn linear_with_matching_derivative_resolves() {
        let traj = init(vec![
            Group::new("joint_values", 0, 2, "linear"),
            Group::new("joint_velocities", 2, 2, "next"),
            Group::new("deltatime", 4, 1, ""),
        ]);
        assert_eq!(traj.deriv_offsets[0], 2);
        assert_eq!(traj.deriv_offsets[1], 3);
        let gi = group_index(&traj, "joint_values");
        assert_eq!(traj.runtime[gi].kernel, Some(InterpKernel::Linear));
        assert_eq!(traj.runtime[gi].validator, Some(ValidateKernel::Linear));
    }

    #[test]
    fn label_mismatch_demotes_derivative() {
        // Velocities labeled "linear" are not the derivative of linear
        // positions (that would be "next"), so the relation is dropped and
        // the channels get the needed-but-missing sentinel for need = 2.
        let traj = init(vec![
            Group::new("joint_values", 0, 1, "linear"),
            Group::new("joint_velocities", 1, 1, "linear"),
            Group::new("deltatime", 2, 1, ""),
        ]);
        assert_eq!(traj.deriv_offsets[0], -2);
    }

    #[test]
    fn quadratic_resolves_derivative_and_integral_sentinels() {
        let traj = init(vec![
            Group::new("joint_values", 0, 1, "quadratic"),
            Group::new("joint_velocities", 1, 1, "linear"),
            Group::new("deltatime", 2, 1, ""),
        ]);
        // Derivative of quadratic values is the linear velocity group.
        assert_eq!(traj.deriv_offsets[0], 1);
        // Velocities in turn integrate to the quadratic values.
        assert_eq!(traj.integral_offsets[1], 0);
        // No accelerations: the velocity channels mark a missing derivative.
        assert_eq!(traj.deriv_offsets[1], -2);
        // Values have no integral group at all.
        assert_eq!(traj.integral_offsets[0], -3);
    }

    #[test]
    fn cubic_without_aux_marks_both_chains_missing() {
        let traj = init(vec![
            Group::new("joint_values", 0, 1, "cubic"),
            Group::new("deltatime", 1, 1, ""),
        ]);
        assert_eq!(traj.deriv_offsets[0], -3);
        assert_eq!(traj.integral_offsets[0], -3);
    }

    #[test]
    fn sextic_resolves_three_derivative_levels() {
        let traj = init(vec![
            Group::new("joint_values", 0, 1, "sextic"),
            Group::new("joint_velocities", 1, 1, "quintic"),
            Group::new("joint_accelerations", 2, 1, "quartic"),
            Group::new("joint_jerks", 3, 1, "cubic"),
            Group::new("deltatime", 4, 1, ""),
        ]);
        assert_eq!(traj.deriv_offsets[0], 1);
        assert_eq!(traj.dd_offsets[0], 2);
        assert_eq!(traj.ddd_offsets[0], 3);
    }

    #[test]
    fn unknown_label_gets_no_kernel() {
        let traj = init(vec![
            Group::new("joint_values", 0, 1, "spline"),
            Group::new("deltatime", 1, 1, ""),
        ]);
        let gi = group_index(&traj, "joint_values");
        assert!(traj.runtime[gi].kernel.is_none());
    }

    #[test]
    fn empty_label_defaults_to_next() {
        let traj = init(vec![
            Group::new("joint_torques", 0, 1, ""),
            Group::new("deltatime", 1, 1, ""),
        ]);
        let gi = group_index(&traj, "joint_torques");
        assert_eq!(traj.runtime[gi].kernel, Some(InterpKernel::Next));
    }

    #[test]
    fn rotation_tag_selects_ik_kernel() {
        let traj = init(vec![
            Group::new("ikparam_values 4", 0, 4, "linear"),
            Group::new("deltatime", 4, 1, ""),
        ]);
        let gi = group_index(&traj, "ikparam_values");
        assert_eq!(
            traj.runtime[gi].kernel,
            Some(InterpKernel::LinearIk(IkParamKind::Rotation3D))
        );
        // Rotation kernels have no scalar validator.
        assert!(traj.runtime[gi].validator.is_none());
    }

    #[test]
    fn unknown_rotation_tag_falls_back_to_scalar() {
        let traj = init(vec![
            Group::new("ikparam_values 99", 0, 4, "linear"),
            Group::new("deltatime", 4, 1, ""),
        ]);
        let gi = group_index(&traj, "ikparam_values");
        assert_eq!(traj.runtime[gi].kernel, Some(InterpKernel::Linear));
    }

    #[test]
    fn narrow_rotation_group_falls_back_to_scalar() {
        let traj = init(vec![
            Group::new("ikparam_values 4", 0, 2, "linear"),
            Group::new("deltatime", 2, 1, ""),
        ]);
        let gi = group_index(&traj, "ikparam_values");
        assert_eq!(traj.runtime[gi].kernel, Some(InterpKernel::Linear));
    }
}
