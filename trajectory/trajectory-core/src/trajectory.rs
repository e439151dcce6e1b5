//! The trajectory container: waypoint storage, lifecycle, and annotations.

use std::cell::{Cell, RefCell};

use trajectory_types::{convert_data, ConfigurationSpecification, Float, Readable};

use crate::error::{Result, TrajectoryError};
use crate::resolver::GroupRuntime;
use crate::timeline::Timeline;

/// A multi-channel, time-stamped waypoint container with piecewise
/// polynomial sampling.
///
/// A trajectory is constructed empty, initialized with a
/// [`ConfigurationSpecification`], and then filled with waypoints. Each
/// waypoint is one row of `spec.dof()` channels; the value in the
/// `deltatime` channel of waypoint `i` is the time to traverse from waypoint
/// `i - 1` (the starting time for waypoint 0). Sampling reconstructs
/// continuous values at any time within the duration, picking a polynomial
/// per group from its interpolation label and the derivative/integral groups
/// present in the specification.
///
/// Instances are single-threaded: the derived time index is rebuilt lazily
/// behind interior mutability, so concurrent reads of one instance are not
/// supported. Distinct instances are independent.
///
/// # Example
///
/// ```
/// use trajectory_core::Trajectory;
/// use trajectory_types::{ConfigurationSpecification, Group};
///
/// let spec = ConfigurationSpecification::new(vec![
///     Group::new("joint_values", 0, 1, "linear"),
///     Group::new("joint_velocities", 1, 1, "linear"),
///     Group::new("deltatime", 2, 1, ""),
/// ])
/// .unwrap();
///
/// let mut traj = Trajectory::new();
/// traj.init(spec);
/// traj.insert(0, &[0.0, 0.0, 0.0, 1.0, 2.0, 0.5], false).unwrap();
///
/// assert_eq!(traj.num_waypoints(), 2);
/// let row = traj.sample_at(0.25).unwrap();
/// assert!((row[0] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub(crate) spec: ConfigurationSpecification,
    pub(crate) data: Vec<Float>,
    description: String,
    readables: Vec<(String, Readable)>,

    // Resolved at init: one runtime entry per group plus, per output
    // channel, the offsets of the channels holding its derivatives and
    // integrals (>= 0 source offset, -1 not needed, -need needed but
    // unavailable).
    pub(crate) runtime: Vec<GroupRuntime>,
    pub(crate) deriv_offsets: Vec<i32>,
    pub(crate) dd_offsets: Vec<i32>,
    pub(crate) ddd_offsets: Vec<i32>,
    pub(crate) integral_offsets: Vec<i32>,
    pub(crate) ii_offsets: Vec<i32>,

    // Lazily rebuilt time index; any mutation marks it stale.
    pub(crate) timeline: RefCell<Timeline>,
    pub(crate) stale: Cell<bool>,
    pub(crate) sampling_verified: Cell<bool>,
    initialized: bool,
}

impl Trajectory {
    /// Creates an empty, uninitialized trajectory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes the trajectory with a specification and clears all
    /// waypoints.
    ///
    /// Group interpolators and auxiliary offsets are resolved here, once.
    /// Re-initializing with a specification equal to the current one skips
    /// re-resolution but still clears the waypoints.
    pub fn init(&mut self, spec: ConfigurationSpecification) {
        if !(self.initialized && self.spec == spec) {
            self.spec = spec;
            self.resolve_group_functions();
            self.initialized = true;
        }
        self.data.clear();
        self.mark_changed();
    }

    /// Reserves buffer capacity for `num_waypoints` rows.
    pub fn reserve_waypoints(&mut self, num_waypoints: usize) {
        self.data.reserve(num_waypoints * self.spec.dof());
        let mut timeline = self.timeline.borrow_mut();
        timeline.accum.reserve(num_waypoints);
        timeline.inv_delta.reserve(num_waypoints);
    }

    /// Returns the specification the trajectory was initialized with.
    #[must_use]
    pub fn spec(&self) -> &ConfigurationSpecification {
        &self.spec
    }

    /// Returns the raw row-major waypoint buffer.
    #[must_use]
    pub fn data(&self) -> &[Float] {
        &self.data
    }

    /// Returns true once [`init`](Self::init) has been called.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the number of stored waypoints.
    #[must_use]
    pub fn num_waypoints(&self) -> usize {
        let dof = self.spec.dof();
        if dof == 0 {
            0
        } else {
            self.data.len() / dof
        }
    }

    /// Returns the free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replaces the free-form description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Returns the readable annotations in insertion order.
    #[must_use]
    pub fn readables(&self) -> &[(String, Readable)] {
        &self.readables
    }

    /// Returns the readable annotation with the given id.
    #[must_use]
    pub fn readable(&self, id: &str) -> Option<&Readable> {
        self.readables
            .iter()
            .find(|(rid, _)| rid == id)
            .map(|(_, r)| r)
    }

    /// Inserts or replaces a readable annotation.
    pub fn set_readable(&mut self, id: impl Into<String>, readable: Readable) {
        let id = id.into();
        match self.readables.iter_mut().find(|(rid, _)| *rid == id) {
            Some((_, slot)) => *slot = readable,
            None => self.readables.push((id, readable)),
        }
    }

    /// Removes all readable annotations.
    pub fn clear_readables(&mut self) {
        self.readables.clear();
    }

    /// Inserts waypoint rows at `index`, or overwrites starting there.
    ///
    /// `data` must be a whole number of rows. With `overwrite` set and
    /// `index` inside the buffer, the leading rows replace existing ones and
    /// any remainder is appended behind them; otherwise all rows are
    /// inserted before the current row `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory is uninitialized, `data` is not a
    /// whole number of rows, or `index` exceeds the waypoint count.
    pub fn insert(&mut self, index: usize, data: &[Float], overwrite: bool) -> Result<()> {
        self.require_init()?;
        if data.is_empty() {
            return Ok(());
        }
        let dof = self.spec.dof();
        if dof == 0 || data.len() % dof != 0 {
            return Err(TrajectoryError::MisalignedData {
                len: data.len(),
                dof,
            });
        }
        let count = self.num_waypoints();
        if index > count {
            return Err(TrajectoryError::IndexOutOfBounds { index, count });
        }
        let at = index * dof;
        if overwrite && at < self.data.len() {
            let copy = data.len().min(self.data.len() - at);
            self.data[at..at + copy].copy_from_slice(&data[..copy]);
            if copy < data.len() {
                self.data.extend_from_slice(&data[copy..]);
            }
        } else {
            self.data.splice(at..at, data.iter().copied());
        }
        self.mark_changed();
        Ok(())
    }

    /// Inserts waypoint rows laid out per a foreign specification.
    ///
    /// Rows are translated into the internal layout group by group.
    /// Overwritten rows keep their old values in channels the source does
    /// not provide; purely inserted rows get category defaults there.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`insert`](Self::insert),
    /// with row alignment checked against `src_spec`.
    pub fn insert_with_spec(
        &mut self,
        index: usize,
        data: &[Float],
        src_spec: &ConfigurationSpecification,
        overwrite: bool,
    ) -> Result<()> {
        self.require_init()?;
        if *src_spec == self.spec {
            return self.insert(index, data, overwrite);
        }
        if data.is_empty() {
            return Ok(());
        }
        let src_dof = src_spec.dof();
        if src_dof == 0 || data.len() % src_dof != 0 {
            return Err(TrajectoryError::MisalignedData {
                len: data.len(),
                dof: src_dof,
            });
        }
        let count = self.num_waypoints();
        if index > count {
            return Err(TrajectoryError::IndexOutOfBounds { index, count });
        }

        let dof = self.spec.dof();
        let num_points = data.len() / src_dof;
        let mut insert_at = index;
        let mut consumed = 0;
        if overwrite && index < count {
            let overwritten = num_points.min(count - index);
            let at = index * dof;
            convert_data(
                &mut self.data[at..at + overwritten * dof],
                &self.spec,
                &data[..overwritten * src_dof],
                src_spec,
                overwritten,
                false,
            )?;
            consumed = overwritten;
            insert_at += overwritten;
        }
        if consumed < num_points {
            let fresh = num_points - consumed;
            let mut rows = vec![0.0; fresh * dof];
            convert_data(
                &mut rows,
                &self.spec,
                &data[consumed * src_dof..],
                src_spec,
                fresh,
                true,
            )?;
            let at = insert_at * dof;
            self.data.splice(at..at, rows);
        }
        self.mark_changed();
        Ok(())
    }

    /// Removes waypoints `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory is uninitialized or the range is
    /// inverted or out of bounds.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<()> {
        self.require_init()?;
        if start == end {
            return Ok(());
        }
        let count = self.num_waypoints();
        if start > end || end > count {
            return Err(TrajectoryError::InvalidRange { start, end, count });
        }
        let dof = self.spec.dof();
        self.data.drain(start * dof..end * dof);
        self.mark_changed();
        Ok(())
    }

    /// Removes all waypoints.
    pub fn clear_waypoints(&mut self) {
        if self.initialized && !self.data.is_empty() {
            self.data.clear();
            self.mark_changed();
        }
    }

    /// Copies waypoint `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn waypoint(&self, index: usize) -> Result<Vec<Float>> {
        let count = self.num_waypoints();
        if index >= count {
            return Err(TrajectoryError::IndexOutOfBounds { index, count });
        }
        let dof = self.spec.dof();
        Ok(self.data[index * dof..(index + 1) * dof].to_vec())
    }

    /// Copies waypoints `[start, end)` as a flat row sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn waypoints(&self, start: usize, end: usize) -> Result<Vec<Float>> {
        self.require_init()?;
        let count = self.num_waypoints();
        if start > end || end > count {
            return Err(TrajectoryError::InvalidRange { start, end, count });
        }
        let dof = self.spec.dof();
        Ok(self.data[start * dof..end * dof].to_vec())
    }

    /// Copies waypoints `[start, end)` translated into a caller-supplied
    /// specification, filling unmatched channels with category defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid.
    pub fn waypoints_with_spec(
        &self,
        start: usize,
        end: usize,
        spec: &ConfigurationSpecification,
    ) -> Result<Vec<Float>> {
        self.require_init()?;
        let count = self.num_waypoints();
        if start > end || end > count {
            return Err(TrajectoryError::InvalidRange { start, end, count });
        }
        let rows = end - start;
        let mut out = vec![0.0; rows * spec.dof()];
        let dof = self.spec.dof();
        convert_data(
            &mut out,
            spec,
            &self.data[start * dof..end * dof],
            &self.spec,
            rows,
            true,
        )?;
        Ok(out)
    }

    /// Exchanges the complete state of two trajectories.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    pub(crate) fn require_init(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(TrajectoryError::NotInitialized)
        }
    }

    pub(crate) fn mark_changed(&mut self) {
        self.stale.set(true);
        self.sampling_verified.set(false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use trajectory_types::Group;

    fn linear_spec() -> ConfigurationSpecification {
        ConfigurationSpecification::new(vec![
            Group::new("joint_values", 0, 1, "linear"),
            Group::new("joint_velocities", 1, 1, "linear"),
            Group::new("deltatime", 2, 1, ""),
        ])
        .unwrap()
    }

    fn linear_traj() -> Trajectory {
        let mut traj = Trajectory::new();
        traj.init(linear_spec());
        traj
    }

    #[test]
    fn uninitialized_operations_fail() {
        let mut traj = Trajectory::new();
        assert!(matches!(
            traj.insert(0, &[1.0], false),
            Err(TrajectoryError::NotInitialized)
        ));
        assert!(matches!(
            traj.remove(0, 1),
            Err(TrajectoryError::NotInitialized)
        ));
    }

    #[test]
    fn insert_appends_rows() {
        let mut traj = linear_traj();
        traj.insert(0, &[0.0, 0.0, 0.0, 1.0, 2.0, 0.5], false).unwrap();
        assert_eq!(traj.num_waypoints(), 2);
        assert_eq!(traj.waypoint(1).unwrap(), vec![1.0, 2.0, 0.5]);
    }

    #[test]
    fn insert_rejects_misaligned_data() {
        let mut traj = linear_traj();
        let err = traj.insert(0, &[1.0, 2.0], false).unwrap_err();
        assert!(matches!(err, TrajectoryError::MisalignedData { len: 2, dof: 3 }));
        // Buffer invariant holds after the failed call.
        assert_eq!(traj.data().len() % traj.spec().dof(), 0);
    }

    #[test]
    fn insert_rejects_out_of_bounds_index() {
        let mut traj = linear_traj();
        let err = traj.insert(1, &[0.0, 0.0, 0.0], false).unwrap_err();
        assert!(matches!(err, TrajectoryError::IndexOutOfBounds { index: 1, count: 0 }));
    }

    #[test]
    fn overwrite_keeps_surrounding_rows() {
        let mut traj = linear_traj();
        let rows: Vec<Float> = (0..5)
            .flat_map(|i| {
                let i = Float::from(i);
                [i, i, 0.1]
            })
            .collect();
        traj.insert(0, &rows, false).unwrap();

        let replacement = [10.0, 10.0, 0.1, 11.0, 11.0, 0.1, 12.0, 12.0, 0.1];
        traj.insert(1, &replacement, true).unwrap();
        assert_eq!(traj.num_waypoints(), 5);
        assert_eq!(traj.waypoint(0).unwrap()[0], 0.0);
        assert_eq!(traj.waypoint(1).unwrap()[0], 10.0);
        assert_eq!(traj.waypoint(3).unwrap()[0], 12.0);
        assert_eq!(traj.waypoint(4).unwrap()[0], 4.0);
    }

    #[test]
    fn overwrite_past_end_appends_remainder() {
        let mut traj = linear_traj();
        traj.insert(0, &[0.0, 0.0, 0.0], false).unwrap();
        traj.insert(0, &[5.0, 5.0, 0.0, 6.0, 6.0, 0.5], true).unwrap();
        assert_eq!(traj.num_waypoints(), 2);
        assert_eq!(traj.waypoint(0).unwrap()[0], 5.0);
        assert_eq!(traj.waypoint(1).unwrap()[0], 6.0);
    }

    #[test]
    fn insert_with_spec_translates_channels() {
        let mut traj = linear_traj();
        let src = ConfigurationSpecification::new(vec![
            Group::new("deltatime", 0, 1, ""),
            Group::new("joint_values", 1, 1, "linear"),
        ])
        .unwrap();
        traj.insert_with_spec(0, &[0.5, 7.0], &src, false).unwrap();
        // joint_values lands at offset 0, deltatime at offset 2, and the
        // missing velocity channel defaults to zero.
        assert_eq!(traj.waypoint(0).unwrap(), vec![7.0, 0.0, 0.5]);
    }

    #[test]
    fn insert_with_spec_overwrite_preserves_unmatched_channels() {
        let mut traj = linear_traj();
        traj.insert(0, &[1.0, 9.0, 0.5], false).unwrap();
        let src = ConfigurationSpecification::new(vec![Group::new(
            "joint_values",
            0,
            1,
            "linear",
        )])
        .unwrap();
        traj.insert_with_spec(0, &[2.0], &src, true).unwrap();
        // Velocity and deltatime survive the overwrite.
        assert_eq!(traj.waypoint(0).unwrap(), vec![2.0, 9.0, 0.5]);
    }

    #[test]
    fn remove_middle_rows() {
        let mut traj = linear_traj();
        let rows: Vec<Float> = (0..4)
            .flat_map(|i| {
                let i = Float::from(i);
                [i, 0.0, 0.1]
            })
            .collect();
        traj.insert(0, &rows, false).unwrap();
        traj.remove(1, 3).unwrap();
        assert_eq!(traj.num_waypoints(), 2);
        assert_eq!(traj.waypoint(0).unwrap()[0], 0.0);
        assert_eq!(traj.waypoint(1).unwrap()[0], 3.0);
    }

    #[test]
    fn remove_rejects_bad_ranges() {
        let mut traj = linear_traj();
        traj.insert(0, &[0.0, 0.0, 0.0], false).unwrap();
        assert!(traj.remove(1, 0).is_err());
        assert!(traj.remove(0, 2).is_err());
        traj.remove(1, 1).unwrap();
        assert_eq!(traj.num_waypoints(), 1);
    }

    #[test]
    fn waypoints_with_spec_fills_defaults() {
        let mut traj = linear_traj();
        traj.insert(0, &[1.0, 2.0, 0.5], false).unwrap();
        let target = ConfigurationSpecification::new(vec![
            Group::new("joint_values", 0, 1, "linear"),
            Group::new("outputSignals io 1", 1, 1, "next"),
        ])
        .unwrap();
        let out = traj.waypoints_with_spec(0, 1, &target).unwrap();
        assert_eq!(out, vec![1.0, -1.0]);
    }

    #[test]
    fn readables_keep_insertion_order_and_replace_by_id() {
        let mut traj = linear_traj();
        traj.set_readable("b", Readable::text("1"));
        traj.set_readable("a", Readable::text("2"));
        traj.set_readable("b", Readable::text("3"));
        let ids: Vec<&str> = traj.readables().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(traj.readable("b"), Some(&Readable::text("3")));
        traj.clear_readables();
        assert!(traj.readables().is_empty());
    }

    #[test]
    fn reinit_clears_waypoints_but_keeps_annotations() {
        let mut traj = linear_traj();
        traj.insert(0, &[0.0, 0.0, 0.0], false).unwrap();
        traj.set_description("test");
        traj.init(linear_spec());
        assert_eq!(traj.num_waypoints(), 0);
        assert_eq!(traj.description(), "test");
    }

    #[test]
    fn swap_exchanges_full_state() {
        let mut a = linear_traj();
        a.insert(0, &[1.0, 2.0, 0.5], false).unwrap();
        a.set_description("a");
        let mut b = Trajectory::new();
        a.swap(&mut b);
        assert!(!a.is_initialized());
        assert_eq!(b.num_waypoints(), 1);
        assert_eq!(b.description(), "a");
    }

    #[test]
    fn clone_is_deep() {
        let mut a = linear_traj();
        a.insert(0, &[1.0, 2.0, 0.5], false).unwrap();
        let b = a.clone();
        a.clear_waypoints();
        assert_eq!(b.num_waypoints(), 1);
    }
}
