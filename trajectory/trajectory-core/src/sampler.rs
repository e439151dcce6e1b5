//! Continuous sampling of the trajectory at arbitrary times.

use tracing::warn;
use trajectory_types::{convert_data, ConfigurationSpecification, Float, EPSILON};

use crate::error::{Result, TrajectoryError};
use crate::trajectory::Trajectory;

impl Trajectory {
    /// Samples one row at time `time`.
    ///
    /// Times at or past the duration return the terminal waypoint verbatim.
    /// Times before the first waypoint's start return the first row with the
    /// requested time in the `deltatime` channel. Everywhere else each
    /// group's kernel reconstructs its channels over the containing segment,
    /// and the `deltatime` channel receives the offset into that segment
    /// (not the absolute time) so that samples can be re-inserted as
    /// waypoints without re-basing time. Channels of groups without a
    /// resolved kernel are zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory is uninitialized or empty, has no
    /// `deltatime` group, `time` is negative beyond epsilon, the time index
    /// cannot be rebuilt, or a group's kernel lacks required data.
    pub fn sample_at(&self, time: Float) -> Result<Vec<Float>> {
        self.prepare_sampling()?;
        let time_offset = self.spec.time_offset().ok_or(TrajectoryError::NoTimeGroup)?;
        if time < -EPSILON {
            return Err(TrajectoryError::NegativeSampleTime { time });
        }
        let time = time.max(0.0);

        let dof = self.spec.dof();
        let mut out = vec![0.0; dof];
        let timeline = self.timeline.borrow();
        let duration = timeline.accum.last().copied().unwrap_or(0.0);
        if time >= duration {
            out.copy_from_slice(&self.data[self.data.len() - dof..]);
            return Ok(out);
        }
        let index = timeline.accum.partition_point(|&t| t < time);
        if index == 0 {
            out.copy_from_slice(&self.data[..dof]);
            out[time_offset] = time;
        } else {
            // Floating-point error can push the local offset slightly
            // outside the segment.
            let segment_delta = self.data[dof * index + time_offset];
            let delta = (time - timeline.accum[index - 1]).clamp(0.0, segment_delta);
            for gi in 0..self.runtime.len() {
                self.interpolate_group(gi, index - 1, delta, &timeline.inv_delta, &mut out)?;
            }
            out[time_offset] = delta;
        }
        Ok(out)
    }

    /// Samples one row at `time`, translated into `spec`.
    ///
    /// # Errors
    ///
    /// As [`sample_at`](Self::sample_at).
    pub fn sample_at_with_spec(
        &self,
        time: Float,
        spec: &ConfigurationSpecification,
    ) -> Result<Vec<Float>> {
        let row = self.sample_at(time)?;
        if *spec == self.spec {
            return Ok(row);
        }
        let mut out = vec![0.0; spec.dof()];
        convert_data(&mut out, spec, &row, &self.spec, 1, true)?;
        Ok(out)
    }

    /// Samples one row per entry of `times`, returned as a flat sequence.
    ///
    /// # Errors
    ///
    /// As [`sample_at`](Self::sample_at).
    pub fn sample_points(&self, times: &[Float]) -> Result<Vec<Float>> {
        let dof = self.spec.dof();
        let mut out = Vec::with_capacity(times.len() * dof);
        for &time in times {
            out.extend_from_slice(&self.sample_at(time)?);
        }
        Ok(out)
    }

    /// Samples `times` rows translated into `spec`.
    ///
    /// # Errors
    ///
    /// As [`sample_at`](Self::sample_at).
    pub fn sample_points_with_spec(
        &self,
        times: &[Float],
        spec: &ConfigurationSpecification,
    ) -> Result<Vec<Float>> {
        let rows = self.sample_points(times)?;
        self.convert_rows(rows, times.len(), spec)
    }

    /// Samples rows every `step` seconds over the whole duration.
    ///
    /// The sample count is `ceil(duration / step)`, matching a half-open
    /// `[0, duration)` range. With `ensure_last` set, a row holding the
    /// terminal waypoint verbatim is appended when the last step would fall
    /// short of the duration.
    ///
    /// # Errors
    ///
    /// As [`sample_range_same_delta`](Self::sample_range_same_delta).
    pub fn sample_points_same_delta(&self, step: Float, ensure_last: bool) -> Result<Vec<Float>> {
        let duration = self.duration()?;
        self.sample_range_same_delta(step, 0.0, duration, ensure_last)
    }

    /// Samples rows every `step` seconds, translated into `spec`.
    ///
    /// # Errors
    ///
    /// As [`sample_range_same_delta`](Self::sample_range_same_delta).
    pub fn sample_points_same_delta_with_spec(
        &self,
        step: Float,
        ensure_last: bool,
        spec: &ConfigurationSpecification,
    ) -> Result<Vec<Float>> {
        let rows = self.sample_points_same_delta(step, ensure_last)?;
        let count = rows.len() / self.spec.dof();
        self.convert_rows(rows, count, spec)
    }

    /// Samples rows every `step` seconds over `[start, stop)`.
    ///
    /// An ascending cursor walks the time index, so a full sweep costs one
    /// pass regardless of the waypoint count.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory is uninitialized or empty, has no
    /// `deltatime` group, `step` is not positive, `start` is negative, or
    /// the range is inverted.
    pub fn sample_range_same_delta(
        &self,
        step: Float,
        start: Float,
        stop: Float,
        ensure_last: bool,
    ) -> Result<Vec<Float>> {
        self.prepare_sampling()?;
        let time_offset = self.spec.time_offset().ok_or(TrajectoryError::NoTimeGroup)?;
        if step <= 0.0 {
            return Err(TrajectoryError::NonPositiveStep { step });
        }
        if start < 0.0 {
            return Err(TrajectoryError::NegativeSampleTime { time: start });
        }
        if stop < start {
            return Err(TrajectoryError::InvalidTimeRange { start, stop });
        }

        let span = stop - start;
        // Matches the open-right semantics of numpy's arange.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut count = (span / step).ceil() as usize;
        #[allow(clippy::cast_precision_loss)]
        if ensure_last && (count as Float - 1.0) * step + EPSILON < span {
            count += 1;
        }

        let dof = self.spec.dof();
        let mut out = vec![0.0; count * dof];
        let timeline = self.timeline.borrow();
        let duration = timeline.accum.last().copied().unwrap_or(0.0);
        let interpolated = if ensure_last { count - 1 } else { count };
        let mut cursor = 0;
        for i in 0..interpolated {
            #[allow(clippy::cast_precision_loss)]
            let time = start + i as Float * step;
            let row = &mut out[i * dof..(i + 1) * dof];
            if time >= duration {
                row.copy_from_slice(&self.data[self.data.len() - dof..]);
                continue;
            }
            // Sample times only increase, so the search can resume where
            // the previous one stopped.
            cursor += timeline.accum[cursor..].partition_point(|&t| t < time);
            if cursor == 0 {
                row.copy_from_slice(&self.data[..dof]);
                row[time_offset] = time;
            } else {
                let segment_delta = self.data[dof * cursor + time_offset];
                let delta = (time - timeline.accum[cursor - 1]).clamp(0.0, segment_delta);
                for gi in 0..self.runtime.len() {
                    self.interpolate_group(gi, cursor - 1, delta, &timeline.inv_delta, row)?;
                }
                row[time_offset] = delta;
            }
        }
        if ensure_last {
            out[(count - 1) * dof..].copy_from_slice(&self.data[self.data.len() - dof..]);
        }
        Ok(out)
    }

    /// Samples rows every `step` seconds over `[start, stop)`, translated
    /// into `spec`.
    ///
    /// # Errors
    ///
    /// As [`sample_range_same_delta`](Self::sample_range_same_delta).
    pub fn sample_range_same_delta_with_spec(
        &self,
        step: Float,
        start: Float,
        stop: Float,
        ensure_last: bool,
        spec: &ConfigurationSpecification,
    ) -> Result<Vec<Float>> {
        let rows = self.sample_range_same_delta(step, start, stop, ensure_last)?;
        let count = rows.len() / self.spec.dof();
        self.convert_rows(rows, count, spec)
    }

    /// Validates that every group can actually be sampled, including the
    /// per-segment endpoint reconstruction check.
    ///
    /// The cheap structural checks also run automatically before the first
    /// sample after a mutation; the segment sweep runs automatically only
    /// when debug logging is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if a group needs derivative/integral data the
    /// specification cannot provide, or a segment's endpoint reconstruction
    /// disagrees with the stored waypoint beyond tolerance.
    pub fn verify_sampling(&self) -> Result<()> {
        self.require_init()?;
        self.ensure_timeline()?;
        self.verify_structure()?;
        self.verify_segments()?;
        self.sampling_verified.set(true);
        Ok(())
    }

    fn convert_rows(
        &self,
        rows: Vec<Float>,
        count: usize,
        spec: &ConfigurationSpecification,
    ) -> Result<Vec<Float>> {
        if *spec == self.spec {
            return Ok(rows);
        }
        let mut out = vec![0.0; count * spec.dof()];
        convert_data(&mut out, spec, &rows, &self.spec, count, true)?;
        Ok(out)
    }

    /// Shared sampling preconditions plus the once-per-mutation checks.
    fn prepare_sampling(&self) -> Result<()> {
        self.require_init()?;
        self.ensure_timeline()?;
        let dof = self.spec.dof();
        if dof == 0 || self.data.len() < dof {
            return Err(TrajectoryError::NoWaypoints);
        }
        if !self.sampling_verified.get() {
            self.verify_structure()?;
            if tracing::enabled!(tracing::Level::DEBUG) {
                self.verify_segments()?;
            }
            self.sampling_verified.set(true);
        }
        Ok(())
    }

    fn verify_structure(&self) -> Result<()> {
        let time_offset = self.spec.time_offset();
        for (group, runtime) in self.spec.groups().iter().zip(&self.runtime) {
            if Some(group.offset) != time_offset && runtime.kernel.is_none() {
                warn!(
                    group = group.name.as_str(),
                    interpolation = group.interpolation.as_str(),
                    "unknown interpolation method, group will sample as zero"
                );
            }
        }
        for group in self.spec.groups() {
            for channel in group.channels() {
                if self.deriv_offsets[channel] < -2 && self.integral_offsets[channel] < -2 {
                    return Err(TrajectoryError::UnsamplableGroup {
                        name: group.name.clone(),
                        interpolation: group.interpolation.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn verify_segments(&self) -> Result<()> {
        let timeline = self.timeline.borrow();
        for ipoint in 0..timeline.accum.len().saturating_sub(1) {
            let delta = timeline.accum[ipoint + 1] - timeline.accum[ipoint];
            for gi in 0..self.runtime.len() {
                self.validate_group(gi, ipoint, delta, &timeline.inv_delta)?;
            }
        }
        Ok(())
    }
}
