//! Rotation-aware reconstruction for `ikparam_values` groups.
//!
//! These kernels run after the scalar kernel for the same group and replace
//! the leading rotation channels of the output: quaternions (stored scalar
//! first, `w x y z`) are reconstructed on the unit sphere, unit directions
//! along their great arc. Degenerate segments (`delta` below epsilon, null
//! rotation axes, unnormalizable quaternions) keep the scalar result.

// Float/f64 conversions below are identity in the default double build.
#![allow(clippy::useless_conversion)]

use glam::{DQuat, DVec3};
use trajectory_types::{Float, IkParamKind, EPSILON};

use crate::error::{Result, TrajectoryError};
use crate::trajectory::Trajectory;

// glam 0.29's `DQuat` has no `try_normalize`; this mirrors the semantics of
// `DVec3::try_normalize` (see glam's dvec3.rs) for quaternions.
fn try_normalize_quat(q: DQuat) -> Option<DQuat> {
    let rcp = q.length_recip();
    if rcp.is_finite() && rcp > 0.0 {
        Some(q * rcp)
    } else {
        None
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_float(value: f64) -> Float {
    value as Float
}

/// Reads a scalar-first quaternion from four consecutive channels.
fn read_quat(channels: &[Float]) -> DQuat {
    DQuat::from_xyzw(
        f64::from(channels[1]),
        f64::from(channels[2]),
        f64::from(channels[3]),
        f64::from(channels[0]),
    )
}

/// Writes a quaternion back as scalar-first channels.
fn write_quat(channels: &mut [Float], q: DQuat) {
    channels[0] = to_float(q.w);
    channels[1] = to_float(q.x);
    channels[2] = to_float(q.y);
    channels[3] = to_float(q.z);
}

fn read_vec3(channels: &[Float]) -> DVec3 {
    DVec3::new(
        f64::from(channels[0]),
        f64::from(channels[1]),
        f64::from(channels[2]),
    )
}

fn write_vec3(channels: &mut [Float], v: DVec3) {
    channels[0] = to_float(v.x);
    channels[1] = to_float(v.y);
    channels[2] = to_float(v.z);
}

/// Angular rate quaternion `2 * dq * q^-1`; the vector part is the body
/// angular velocity (or acceleration) when `dq` is the raw channel
/// derivative of the unit quaternion `q`.
fn angular_rate(dq: DQuat, q: DQuat) -> DQuat {
    (dq * q.conjugate()) * 2.0
}

impl Trajectory {
    /// Rotation part of linear interpolation: slerp between the endpoint
    /// quaternions, or a great-arc rotation between endpoint directions.
    pub(crate) fn interp_linear_rotation(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
        kind: IkParamKind,
    ) -> Result<()> {
        if delta <= EPSILON {
            return Ok(());
        }
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof + group.offset;
        let fraction = f64::from(inv_delta[ipoint + 1] * delta);
        match kind {
            IkParamKind::Rotation3D | IkParamKind::Transform6D => {
                let q0 = read_quat(&self.data[row..]);
                let q1 = read_quat(&self.data[dof + row..]);
                let (Some(q0), Some(q1)) = (try_normalize_quat(q0), try_normalize_quat(q1)) else {
                    return Ok(());
                };
                write_quat(&mut out[group.offset..], q0.slerp(q1, fraction));
            }
            IkParamKind::TranslationDirection5D => {
                let dir0 = read_vec3(&self.data[row..]);
                let dir1 = read_vec3(&self.data[dof + row..]);
                let axis = dir0.cross(dir1);
                let sin_angle = axis.length();
                if sin_angle > f64::from(EPSILON) {
                    let scaled = axis * (fraction * sin_angle.min(1.0).asin() / sin_angle);
                    let dir = DQuat::from_scaled_axis(scaled) * dir0;
                    write_vec3(&mut out[group.offset..], dir);
                }
            }
        }
        Ok(())
    }

    /// Rotation part of quadratic interpolation: integrate a linearly
    /// varying angular velocity over the segment and rotate the start
    /// orientation by the accumulated axis-angle.
    pub(crate) fn interp_quadratic_rotation(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
        kind: IkParamKind,
    ) -> Result<()> {
        if delta <= EPSILON {
            return Ok(());
        }
        let group = &self.spec.groups()[gi];
        let deriv_offset = self.deriv_offsets[group.offset];
        if deriv_offset < 0 {
            return Err(TrajectoryError::NotImplemented(format!(
                "quadratic rotation interpolation of group '{}' without a derivative group",
                group.name
            )));
        }
        let deriv_offset = deriv_offset.unsigned_abs() as usize;
        let dof = self.spec.dof();
        let row = ipoint * dof;
        let delta = f64::from(delta);
        let half_inv = 0.5 * f64::from(inv_delta[ipoint + 1]);
        match kind {
            IkParamKind::Rotation3D | IkParamKind::Transform6D => {
                let q0 = read_quat(&self.data[row + group.offset..]);
                let q0_vel = read_quat(&self.data[row + deriv_offset..]);
                let q1 = read_quat(&self.data[dof + row + group.offset..]);
                let q1_vel = read_quat(&self.data[dof + row + deriv_offset..]);
                let omega0 = angular_rate(q0_vel, q0);
                let omega1 = angular_rate(q1_vel, q1);
                let coeff = (omega1 - omega0) * half_inv;
                let total = omega0 * delta + coeff * (delta * delta);
                let q = DQuat::from_scaled_axis(DVec3::new(total.x, total.y, total.z)) * q0;
                write_quat(&mut out[group.offset..], q);
            }
            IkParamKind::TranslationDirection5D => {
                let dir0 = read_vec3(&self.data[row + group.offset..]);
                let dir1 = read_vec3(&self.data[dof + row + group.offset..]);
                if dir0.cross(dir1).length_squared() > f64::from(EPSILON) {
                    let omega0 = read_vec3(&self.data[row + deriv_offset..]);
                    let omega1 = read_vec3(&self.data[dof + row + deriv_offset..]);
                    let coeff = (omega1 - omega0) * half_inv;
                    let total = omega0 * delta + coeff * (delta * delta);
                    let dir = DQuat::from_scaled_axis(total) * dir0;
                    write_vec3(&mut out[group.offset..], dir);
                }
            }
        }
        Ok(())
    }

    /// Rotation part of cubic interpolation: integrate a linearly varying
    /// angular acceleration. Requires derivative and second-derivative
    /// groups; the 5D direction variant is an open gap.
    pub(crate) fn interp_cubic_rotation(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
        kind: IkParamKind,
    ) -> Result<()> {
        if delta <= EPSILON {
            return Ok(());
        }
        let group = &self.spec.groups()[gi];
        let deriv_offset = self.deriv_offsets[group.offset];
        let dd_offset = self.dd_offsets[group.offset];
        if deriv_offset < 0 || dd_offset < 0 {
            return Err(TrajectoryError::NotImplemented(format!(
                "cubic rotation interpolation of group '{}' without derivative \
                 and second-derivative groups",
                group.name
            )));
        }
        if kind == IkParamKind::TranslationDirection5D {
            return Err(TrajectoryError::NotImplemented(
                "cubic interpolation of 5D translation-direction groups".into(),
            ));
        }
        let deriv_offset = deriv_offset.unsigned_abs() as usize;
        let dd_offset = dd_offset.unsigned_abs() as usize;
        let dof = self.spec.dof();
        let row = ipoint * dof;
        let next = row + dof;
        let delta = f64::from(delta);
        let inv = f64::from(inv_delta[ipoint + 1]);

        let q0 = read_quat(&self.data[row + group.offset..]);
        let q0_vel = read_quat(&self.data[row + deriv_offset..]);
        let q0_acc = read_quat(&self.data[row + dd_offset..]);
        let q1 = read_quat(&self.data[next + group.offset..]);
        let q1_acc = read_quat(&self.data[next + dd_offset..]);

        let omega0 = angular_rate(q0_vel, q0);
        let alpha0 = angular_rate(q0_acc, q0);
        let alpha1 = angular_rate(q1_acc, q1);
        let jerk = (alpha1 - alpha0) * inv;
        let total = (omega0 + (alpha0 * 0.5 + jerk * (delta / 6.0)) * delta) * delta;
        let q = DQuat::from_scaled_axis(DVec3::new(total.x, total.y, total.z)) * q0;
        write_quat(&mut out[group.offset..], q);
        Ok(())
    }
}
