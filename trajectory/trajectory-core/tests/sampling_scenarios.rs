//! End-to-end sampling scenarios across interpolation degrees and the
//! rotation-aware kernels.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use trajectory_core::{Trajectory, TrajectoryError};
use trajectory_types::{ConfigurationSpecification, Float, Group};

fn build(groups: Vec<Group>, rows: &[Float]) -> Trajectory {
    let spec = ConfigurationSpecification::new(groups).unwrap();
    let mut traj = Trajectory::new();
    traj.init(spec);
    traj.insert(0, rows, false).unwrap();
    traj
}

#[test]
fn linear_one_dof_round_trip() {
    // Velocity on the end waypoint is consistent with (x1 - x0) / d, so any
    // sample must lie on x0 + t * v1.
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "linear"),
            Group::new("joint_velocities", 1, 1, "next"),
            Group::new("deltatime", 2, 1, ""),
        ],
        &[0.0, 0.0, 0.0, 1.0, 2.0, 0.5],
    );
    assert_eq!(traj.duration().unwrap(), 0.5);
    traj.verify_sampling().unwrap();
    let row = traj.sample_at(0.25).unwrap();
    assert_relative_eq!(row[0], 0.5);
    assert_eq!(row[1], 2.0);
    assert_eq!(row[2], 0.25);
    for i in 0..=10 {
        let t = 0.05 * Float::from(i);
        let row = traj.sample_at(t).unwrap();
        assert_relative_eq!(row[0], 2.0 * t, epsilon = 1e-12);
    }
}

#[test]
fn quadratic_one_dof_midpoint() {
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "quadratic"),
            Group::new("joint_velocities", 1, 1, "linear"),
            Group::new("deltatime", 2, 1, ""),
        ],
        &[0.0, 0.0, 0.0, 1.0, 2.0, 1.0],
    );
    let row = traj.sample_at(0.5).unwrap();
    // c = 0.5 * (1/d) * (v1 - v0) = 1, x = 0 + 0.5*(0 + 0.5*1) = 0.25.
    assert_relative_eq!(row[0], 0.25);
    // Endpoint reproduction within the quadratic tolerance.
    let end = traj.sample_at(1.0 - 1e-12).unwrap();
    assert!((end[0] - 1.0).abs() < 1e-4);
}

#[test]
fn next_step_jumps_after_epsilon() {
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "next"),
            Group::new("deltatime", 1, 1, ""),
        ],
        &[0.0, 0.0, 1.0, 1.0],
    );
    assert_eq!(traj.sample_at(1e-16).unwrap()[0], 0.0);
    assert_eq!(traj.sample_at(0.5).unwrap()[0], 1.0);
}

#[test]
fn previous_step_holds_until_segment_end() {
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "previous"),
            Group::new("deltatime", 1, 1, ""),
        ],
        &[5.0, 0.0, 7.0, 1.0],
    );
    assert_eq!(traj.sample_at(0.5).unwrap()[0], 5.0);
    assert_eq!(traj.sample_at(0.999_999_999_999_999_9).unwrap()[0], 7.0);
}

#[test]
fn max_takes_componentwise_maximum() {
    let traj = build(
        vec![
            Group::new("outputSignals io 2", 0, 2, "max"),
            Group::new("deltatime", 2, 1, ""),
        ],
        &[1.0, 8.0, 0.0, 4.0, 2.0, 1.0],
    );
    let row = traj.sample_at(0.5).unwrap();
    assert_eq!(&row[..2], &[4.0, 8.0]);
}

#[test]
fn quadratic_from_integral_reconstructs_velocity_profile() {
    // v(t) = t^2 sampled from positions x(t) = t^3 / 3 alone: the velocity
    // group has no acceleration group, so the integral form kicks in.
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "cubic"),
            Group::new("joint_velocities", 1, 1, "quadratic"),
            Group::new("deltatime", 2, 1, ""),
        ],
        &[0.0, 0.0, 0.0, 1.0 / 3.0, 1.0, 1.0],
    );
    let row = traj.sample_at(0.5).unwrap();
    assert_relative_eq!(row[1], 0.25, epsilon = 1e-12);
    // The cubic position group uses the Hermite form with those velocities.
    assert_relative_eq!(row[0], 0.125 / 3.0, epsilon = 1e-12);
}

#[test]
fn cubic_from_double_integral_reconstructs_acceleration() {
    // a(t) = 6t with v = 3t^2 and x = t^3 as its first and second
    // integrals; the acceleration group has no jerk group, so it is
    // reconstructed from the integral pair.
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "quintic"),
            Group::new("joint_velocities", 1, 1, "quartic"),
            Group::new("joint_accelerations", 2, 1, "cubic"),
            Group::new("deltatime", 3, 1, ""),
        ],
        &[0.0, 0.0, 0.0, 0.0, 1.0, 3.0, 6.0, 1.0],
    );
    let row = traj.sample_at(0.5).unwrap();
    assert_relative_eq!(row[2], 3.0, epsilon = 1e-9);
    // The quartic velocity group resolves derivative + integral.
    assert_relative_eq!(row[1], 0.75, epsilon = 1e-9);
    // The quintic position group resolves derivative + second derivative.
    assert_relative_eq!(row[0], 0.125, epsilon = 1e-9);
}

#[test]
fn sextic_reconstructs_quartic_motion() {
    // x(t) = t^4 with v, a, j groups carrying its exact derivatives.
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "sextic"),
            Group::new("joint_velocities", 1, 1, "quintic"),
            Group::new("joint_accelerations", 2, 1, "quartic"),
            Group::new("joint_jerks", 3, 1, "cubic"),
            Group::new("deltatime", 4, 1, ""),
        ],
        &[
            0.0, 0.0, 0.0, 0.0, 0.0, //
            1.0, 4.0, 12.0, 24.0, 1.0,
        ],
    );
    for t in [0.25, 0.5, 0.75] {
        let row = traj.sample_at(t).unwrap();
        assert_relative_eq!(row[0], t.powi(4), epsilon = 1e-9);
    }
}

#[test]
fn slerp_hits_great_circle_midpoint() {
    let half_angle = std::f64::consts::FRAC_PI_4;
    let traj = build(
        vec![
            Group::new("ikparam_values 4", 0, 4, "linear"),
            Group::new("deltatime", 4, 1, ""),
        ],
        &[
            1.0,
            0.0,
            0.0,
            0.0,
            0.0,
            half_angle.cos(),
            0.0,
            0.0,
            half_angle.sin(),
            1.0,
        ],
    );
    let row = traj.sample_at(0.5).unwrap();
    let expected = std::f64::consts::FRAC_PI_8;
    assert_relative_eq!(row[0], expected.cos(), epsilon = 1e-9);
    assert_relative_eq!(row[1], 0.0, epsilon = 1e-9);
    assert_relative_eq!(row[2], 0.0, epsilon = 1e-9);
    assert_relative_eq!(row[3], expected.sin(), epsilon = 1e-9);
}

#[test]
fn direction_5d_follows_great_arc() {
    // Direction swings from +X to +Y; translation drifts linearly.
    let traj = build(
        vec![
            Group::new("ikparam_values 5", 0, 6, "linear"),
            Group::new("deltatime", 6, 1, ""),
        ],
        &[
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0,
        ],
    );
    let row = traj.sample_at(0.5).unwrap();
    let cos45 = std::f64::consts::FRAC_PI_4.cos();
    assert_relative_eq!(row[0], cos45, epsilon = 1e-9);
    assert_relative_eq!(row[1], cos45, epsilon = 1e-9);
    assert_relative_eq!(row[2], 0.0, epsilon = 1e-9);
    // Translation channels stay on the scalar linear result.
    assert_relative_eq!(row[3], 1.0, epsilon = 1e-9);
}

#[test]
fn quadratic_rotation_integrates_angular_velocity() {
    // Constant spin about Z at rate pi: q(t) = (cos(pi t/2), 0, 0,
    // sin(pi t/2)), with quaternion derivatives stored alongside.
    let half_pi = std::f64::consts::FRAC_PI_2;
    let traj = build(
        vec![
            Group::new("ikparam_values 4", 0, 4, "quadratic"),
            Group::new("ikparam_velocities 4", 4, 4, "linear"),
            Group::new("deltatime", 8, 1, ""),
        ],
        &[
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, half_pi, 0.0, //
            0.0, 0.0, 0.0, 1.0, -half_pi, 0.0, 0.0, 0.0, 1.0,
        ],
    );
    let row = traj.sample_at(0.5).unwrap();
    let quarter = std::f64::consts::FRAC_PI_4;
    assert_relative_eq!(row[0], quarter.cos(), epsilon = 1e-9);
    assert_relative_eq!(row[3], quarter.sin(), epsilon = 1e-9);
}

#[test]
fn direction_5d_cubic_is_not_implemented() {
    let traj = build(
        vec![
            Group::new("ikparam_values 5", 0, 6, "cubic"),
            Group::new("ikparam_velocities 5", 6, 6, "quadratic"),
            Group::new("ikparam_accelerations 5", 12, 6, "linear"),
            Group::new("deltatime", 18, 1, ""),
        ],
        &[
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            1.0,
        ],
    );
    let err = traj.sample_at(0.5).unwrap_err();
    assert!(matches!(err, TrajectoryError::NotImplemented(_)));
}

#[test]
fn sampled_rows_reinsert_cleanly() {
    // The deltatime channel carries the segment-relative offset, so a
    // sample can be pushed back as a waypoint without re-basing time.
    let mut traj = build(
        vec![
            Group::new("joint_values", 0, 1, "linear"),
            Group::new("joint_velocities", 1, 1, "next"),
            Group::new("deltatime", 2, 1, ""),
        ],
        &[0.0, 0.0, 0.0, 1.0, 2.0, 0.5],
    );
    let row = traj.sample_at(0.25).unwrap();
    traj.insert(1, &row, false).unwrap();
    // Row 1 now splits the old segment; total duration is unchanged only
    // after adjusting the following delta, which callers own. Here we just
    // check the inserted stamp.
    assert_eq!(traj.waypoint(1).unwrap()[2], 0.25);
    assert_eq!(traj.num_waypoints(), 3);
}

#[test]
fn duration_accumulates_and_monotone() {
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "next"),
            Group::new("deltatime", 1, 1, ""),
        ],
        &[0.0, 0.0, 1.0, 0.25, 2.0, 0.25, 3.0, 0.5],
    );
    assert_relative_eq!(traj.duration().unwrap(), 1.0);
    assert_eq!(traj.first_waypoint_index_after(0.3).unwrap(), 2);
}

#[test]
fn with_spec_sampling_converts_whole_sweep() {
    let traj = build(
        vec![
            Group::new("joint_values", 0, 1, "linear"),
            Group::new("joint_velocities", 1, 1, "next"),
            Group::new("deltatime", 2, 1, ""),
        ],
        &[0.0, 0.0, 0.0, 1.0, 2.0, 0.5],
    );
    let target = ConfigurationSpecification::new(vec![
        Group::new("joint_values", 0, 1, "linear"),
    ])
    .unwrap();
    let rows = traj
        .sample_points_same_delta_with_spec(0.25, true, &target)
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_relative_eq!(rows[0], 0.0);
    assert_relative_eq!(rows[1], 0.5);
    assert_relative_eq!(rows[2], 1.0);
}
