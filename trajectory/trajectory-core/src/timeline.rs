//! Lazily rebuilt time index derived from per-waypoint `deltatime` values.

use trajectory_types::Float;

use crate::error::{Result, TrajectoryError};
use crate::trajectory::Trajectory;

/// Prefix sums of `deltatime` values and their reciprocals.
///
/// `accum[i]` is the absolute time of waypoint `i`; `inv_delta[i]` is
/// `1 / deltatime[i]`. Entry 0 of `inv_delta` is the reciprocal of the
/// starting time and must not be read where that time may be zero.
#[derive(Debug, Clone, Default)]
pub(crate) struct Timeline {
    pub accum: Vec<Float>,
    pub inv_delta: Vec<Float>,
}

impl Trajectory {
    /// Rebuilds the time index if a mutation has invalidated it.
    ///
    /// Without a `deltatime` group the index is emptied and only raw
    /// waypoint access remains possible.
    pub(crate) fn ensure_timeline(&self) -> Result<()> {
        if !self.stale.get() {
            return Ok(());
        }
        let mut timeline = self.timeline.borrow_mut();
        timeline.accum.clear();
        timeline.inv_delta.clear();
        if let Some(time_offset) = self.spec.time_offset() {
            let count = self.num_waypoints();
            let dof = self.spec.dof();
            if count > 0 {
                timeline.accum.reserve(count);
                timeline.inv_delta.reserve(count);
                let start = self.data[time_offset];
                timeline.accum.push(start);
                timeline.inv_delta.push(1.0 / start);
                for index in 1..count {
                    let delta = self.data[index * dof + time_offset];
                    if delta < 0.0 {
                        return Err(TrajectoryError::NegativeDeltaTime {
                            index,
                            count,
                            value: delta,
                        });
                    }
                    let previous = timeline.accum[index - 1];
                    timeline.accum.push(previous + delta);
                    timeline.inv_delta.push(1.0 / delta);
                }
            }
        }
        self.stale.set(false);
        self.sampling_verified.set(false);
        Ok(())
    }

    /// Returns the total duration, or zero for an empty trajectory.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory is uninitialized or a stored
    /// `deltatime` is negative.
    pub fn duration(&self) -> Result<Float> {
        self.require_init()?;
        self.ensure_timeline()?;
        Ok(self.timeline.borrow().accum.last().copied().unwrap_or(0.0))
    }

    /// Returns the index of the first waypoint whose absolute time is at or
    /// after `time`, or the waypoint count when `time` is past the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory is uninitialized, the
    /// specification has no `deltatime` group, or the time index cannot be
    /// rebuilt.
    pub fn first_waypoint_index_after(&self, time: Float) -> Result<usize> {
        self.require_init()?;
        if self.spec.time_offset().is_none() {
            return Err(TrajectoryError::NoTimeGroup);
        }
        self.ensure_timeline()?;
        let timeline = self.timeline.borrow();
        let accum = &timeline.accum;
        match (accum.first(), accum.last()) {
            (None, _) | (_, None) => Ok(0),
            (Some(&first), _) if time < first => Ok(0),
            (_, Some(&last)) if time >= last => Ok(accum.len()),
            _ => Ok(accum.partition_point(|&t| t < time)),
        }
    }
}
