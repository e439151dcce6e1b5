//! Scalar polynomial reconstruction kernels and segment validators.
//!
//! Every kernel reconstructs the channels of one group over the segment
//! `[ipoint, ipoint + 1]` at intra-segment time `delta` in `[0, d]`, where
//! `d` is the `deltatime` stored on waypoint `ipoint + 1`. Coefficients are
//! derived from the segment endpoints and, where the group's label requires
//! them, from the resolved derivative/integral channels.

use trajectory_types::{epsilon_linear, Float, EPSILON, TWO_PI};

use crate::error::{Result, TrajectoryError};
use crate::resolver::{InterpKernel, ValidateKernel};
use crate::trajectory::Trajectory;

impl Trajectory {
    /// Reconstructs group `gi` into `out` for the given segment.
    ///
    /// Groups without a resolved kernel are skipped; their channels keep
    /// whatever the caller initialized them to.
    pub(crate) fn interpolate_group(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
    ) -> Result<()> {
        let Some(kernel) = self.runtime[gi].kernel else {
            return Ok(());
        };
        match kernel {
            InterpKernel::Previous => self.interp_previous(gi, ipoint, delta, inv_delta, out),
            InterpKernel::Next => self.interp_next(gi, ipoint, delta, out),
            InterpKernel::Max => self.interp_max(gi, ipoint, out),
            InterpKernel::Linear => self.interp_linear(gi, ipoint, delta, inv_delta, out),
            InterpKernel::LinearIk(kind) => {
                self.interp_linear(gi, ipoint, delta, inv_delta, out)?;
                self.interp_linear_rotation(gi, ipoint, delta, inv_delta, out, kind)
            }
            InterpKernel::Quadratic => self.interp_quadratic(gi, ipoint, delta, inv_delta, out),
            InterpKernel::QuadraticIk(kind) => {
                self.interp_quadratic(gi, ipoint, delta, inv_delta, out)?;
                self.interp_quadratic_rotation(gi, ipoint, delta, inv_delta, out, kind)
            }
            InterpKernel::Cubic => self.interp_cubic(gi, ipoint, delta, inv_delta, out),
            InterpKernel::CubicIk(kind) => {
                self.interp_cubic(gi, ipoint, delta, inv_delta, out)?;
                self.interp_cubic_rotation(gi, ipoint, delta, inv_delta, out, kind)
            }
            InterpKernel::Quartic => self.interp_quartic(gi, ipoint, delta, inv_delta, out),
            InterpKernel::Quintic => self.interp_quintic(gi, ipoint, delta, inv_delta, out),
            InterpKernel::Sextic => self.interp_sextic(gi, ipoint, delta, inv_delta, out),
        }
    }

    /// Runs group `gi`'s validator over the segment, if one is bound.
    pub(crate) fn validate_group(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
    ) -> Result<()> {
        match self.runtime[gi].validator {
            None => Ok(()),
            Some(ValidateKernel::Linear) => self.validate_linear(gi, ipoint, delta),
            Some(ValidateKernel::Quadratic) => {
                self.validate_quadratic(gi, ipoint, delta, inv_delta)
            }
        }
    }

    fn missing_data(&self, gi: usize) -> TrajectoryError {
        let group = &self.spec.groups()[gi];
        TrajectoryError::MissingInterpolationData {
            name: group.name.clone(),
            interpolation: group.interpolation.clone(),
        }
    }

    /// Copies the group's channels of waypoint `source` into `out`.
    fn copy_waypoint(&self, gi: usize, source: usize, out: &mut [Float]) {
        let group = &self.spec.groups()[gi];
        let at = source * self.spec.dof() + group.offset;
        out[group.offset..group.offset + group.dof]
            .copy_from_slice(&self.data[at..at + group.dof]);
    }

    fn interp_previous(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
    ) -> Result<()> {
        let dof = self.spec.dof();
        let mut source = ipoint;
        if (ipoint + 1) * dof < self.data.len() {
            // So close to the segment end that the next waypoint wins.
            let fraction = inv_delta[ipoint + 1] * delta;
            if fraction > 1.0 - EPSILON {
                source += 1;
            }
        }
        self.copy_waypoint(gi, source, out);
        Ok(())
    }

    fn interp_next(&self, gi: usize, ipoint: usize, delta: Float, out: &mut [Float]) -> Result<()> {
        let dof = self.spec.dof();
        let mut source = ipoint;
        if (ipoint + 1) * dof < self.data.len() {
            source += 1;
        }
        if delta <= EPSILON && source > 0 {
            // So close to the segment start that the previous waypoint wins.
            source -= 1;
        }
        self.copy_waypoint(gi, source, out);
        Ok(())
    }

    fn interp_max(&self, gi: usize, ipoint: usize, out: &mut [Float]) -> Result<()> {
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let at = ipoint * dof + group.offset;
        for i in 0..group.dof {
            out[group.offset + i] = self.data[at + i].max(self.data[dof + at + i]);
        }
        Ok(())
    }

    fn interp_linear(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
    ) -> Result<()> {
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof;
        let deriv_offset = self.deriv_offsets[group.offset];
        if deriv_offset < 0 {
            let fraction = inv_delta[ipoint + 1] * delta;
            for i in 0..group.dof {
                let x0 = self.data[row + group.offset + i];
                let x1 = self.data[dof + row + group.offset + i];
                out[group.offset + i] = x0 * (1.0 - fraction) + fraction * x1;
            }
        } else {
            // Published convention: advance from the segment start along the
            // velocity stored on the segment's end waypoint.
            let deriv_offset = deriv_offset.unsigned_abs() as usize;
            for i in 0..group.dof {
                let v1 = self.data[dof + row + deriv_offset + i];
                out[group.offset + i] = self.data[row + group.offset + i] + delta * v1;
            }
        }
        Ok(())
    }

    fn interp_quadratic(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
    ) -> Result<()> {
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof;
        if delta <= EPSILON {
            self.copy_waypoint(gi, ipoint, out);
            return Ok(());
        }
        let deriv_offset = self.deriv_offsets[group.offset];
        if deriv_offset >= 0 {
            let deriv_offset = deriv_offset.unsigned_abs() as usize;
            for i in 0..group.dof {
                // coeff*t^2 + v0*t + x0
                let v0 = self.data[row + deriv_offset + i];
                let v1 = self.data[dof + row + deriv_offset + i];
                let coeff = 0.5 * inv_delta[ipoint + 1] * (v1 - v0);
                out[group.offset + i] =
                    self.data[row + group.offset + i] + delta * (v0 + delta * coeff);
            }
        } else {
            let integral_offset = self.integral_offsets[group.offset];
            if integral_offset < 0 {
                return Err(self.missing_data(gi));
            }
            let integral_offset = integral_offset.unsigned_abs() as usize;
            let inv = inv_delta[ipoint + 1];
            let inv2 = inv * inv;
            for i in 0..group.dof {
                // v = c2*t^2 + c1*t + v0 with the segment's integral deltas
                // as boundary values: c1*d = 6*(I1 - I0)/d - 4*v0 - 2*v1.
                let integral0 = self.data[row + integral_offset + i];
                let integral1 = self.data[dof + row + integral_offset + i];
                let value0 = self.data[row + group.offset + i];
                let value1 = self.data[dof + row + group.offset + i];
                let c1_times_d = 6.0 * (integral1 - integral0) * inv - 4.0 * value0 - 2.0 * value1;
                let c1 = c1_times_d * inv;
                let c2 = (value1 - value0 - c1_times_d) * inv2;
                out[group.offset + i] = value0 + delta * (c1 + delta * c2);
            }
        }
        Ok(())
    }

    fn interp_cubic(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
    ) -> Result<()> {
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof;
        if delta <= EPSILON {
            self.copy_waypoint(gi, ipoint, out);
            return Ok(());
        }
        let deriv_offset = self.deriv_offsets[group.offset];
        let integral_offset = self.integral_offsets[group.offset];
        let ii_offset = self.ii_offsets[group.offset];
        if deriv_offset >= 0 {
            // Hermite form from p(0), p(d), dp(0), dp(d):
            //   c3 = (v1 + v0)/d^2 - 2*(x1 - x0)/d^3
            //   c2 = 3*(x1 - x0)/d^2 - (2*v0 + v1)/d
            let deriv_offset = deriv_offset.unsigned_abs() as usize;
            let inv = inv_delta[ipoint + 1];
            let inv2 = inv * inv;
            let inv3 = inv2 * inv;
            for i in 0..group.dof {
                let v0 = self.data[row + deriv_offset + i];
                let v1 = self.data[dof + row + deriv_offset + i];
                let px = self.data[dof + row + group.offset + i] - self.data[row + group.offset + i];
                let c3 = (v1 + v0) * inv2 - 2.0 * px * inv3;
                let c2 = 3.0 * px * inv2 - (2.0 * v0 + v1) * inv;
                out[group.offset + i] =
                    self.data[row + group.offset + i] + delta * (v0 + delta * (c2 + delta * c3));
            }
        } else if integral_offset >= 0 && ii_offset >= 0 {
            // From p(0), p(d) and the first/second integral deltas:
            //   c3 = (10*px*d^2 - 60*di*d + 120*dii)/d^5
            //   c2 = ((18*x0 - 12*x1)*d^2 + 84*di*d - 180*dii)/d^4
            //   c1 = ((3*x1 - 9*x0)*d^2 - 24*di*d + 60*dii)/d^3
            // with dii = ii1 - ii0 - i0*d.
            let integral_offset = integral_offset.unsigned_abs() as usize;
            let ii_offset = ii_offset.unsigned_abs() as usize;
            let inv = inv_delta[ipoint + 1];
            let inv2 = inv * inv;
            let inv3 = inv2 * inv;
            let inv4 = inv3 * inv;
            let inv5 = inv4 * inv;
            for i in 0..group.dof {
                let integral0 = self.data[row + integral_offset + i];
                let idiff = self.data[dof + row + integral_offset + i] - integral0;
                let iidiff = self.data[dof + row + ii_offset + i]
                    - self.data[row + ii_offset + i]
                    - integral0 * delta;
                let x0 = self.data[row + group.offset + i];
                let x1 = self.data[dof + row + group.offset + i];
                let c3 = 10.0 * (x1 - x0) * inv3 - 60.0 * idiff * inv4 + 120.0 * iidiff * inv5;
                let c2 = (18.0 * x0 - 12.0 * x1) * inv2 + 84.0 * idiff * inv3
                    - 180.0 * iidiff * inv4;
                let c1 = (3.0 * x1 - 9.0 * x0) * inv - 24.0 * idiff * inv2 + 60.0 * iidiff * inv3;
                out[group.offset + i] = x0 + delta * (c1 + delta * (c2 + delta * c3));
            }
        } else {
            return Err(self.missing_data(gi));
        }
        Ok(())
    }

    fn interp_quartic(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
    ) -> Result<()> {
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof;
        if delta <= EPSILON {
            self.copy_waypoint(gi, ipoint, out);
            return Ok(());
        }
        let deriv_offset = self.deriv_offsets[group.offset];
        let dd_offset = self.dd_offsets[group.offset];
        let integral_offset = self.integral_offsets[group.offset];
        if deriv_offset >= 0 && dd_offset >= 0 {
            // From dp and ddp at both ends:
            //   c4 = (-2*(v1 - v0) + (a0 + a1)*d)/(4*d^3)
            //   c3 = (3*(v1 - v0) - (2*a0 + a1)*d)/(3*d^2)
            let deriv_offset = deriv_offset.unsigned_abs() as usize;
            let dd_offset = dd_offset.unsigned_abs() as usize;
            let inv = inv_delta[ipoint + 1];
            let inv2 = inv * inv;
            let inv3 = inv2 * inv;
            for i in 0..group.dof {
                let v0 = self.data[row + deriv_offset + i];
                let v1 = self.data[dof + row + deriv_offset + i];
                let a0 = self.data[row + dd_offset + i];
                let a1 = self.data[dof + row + dd_offset + i];
                let c4 = -0.5 * (v1 - v0) * inv3 + (a0 + a1) * inv2 * 0.25;
                let c3 = (v1 - v0) * inv2 - (2.0 * a0 + a1) * inv / 3.0;
                out[group.offset + i] = self.data[row + group.offset + i]
                    + delta * (v0 + delta * (0.5 * a0 + delta * (c3 + delta * c4)));
            }
        } else if deriv_offset >= 0 && integral_offset >= 0 {
            //   c4 = 2.5*(v1 - v0)/d^3 - 15*(x0 + x1)/d^4 + 30*di/d^5
            //   c3 = (6*v0 - 4*v1)/d^2 + (32*x0 + 28*x1)/d^3 - 60*di/d^4
            //   c2 = (-4.5*v0 + 1.5*v1)/d - (18*x0 + 12*x1)/d^2 + 30*di/d^3
            let deriv_offset = deriv_offset.unsigned_abs() as usize;
            let integral_offset = integral_offset.unsigned_abs() as usize;
            let inv = inv_delta[ipoint + 1];
            let inv2 = inv * inv;
            let inv3 = inv2 * inv;
            let inv4 = inv3 * inv;
            let inv5 = inv4 * inv;
            for i in 0..group.dof {
                let v0 = self.data[row + deriv_offset + i];
                let v1 = self.data[dof + row + deriv_offset + i];
                let x0 = self.data[row + group.offset + i];
                let x1 = self.data[dof + row + group.offset + i];
                let idiff =
                    self.data[dof + row + integral_offset + i] - self.data[row + integral_offset + i];
                let c4 = 2.5 * (v1 - v0) * inv3 - 15.0 * (x0 + x1) * inv4 + 30.0 * idiff * inv5;
                let c3 =
                    (6.0 * v0 - 4.0 * v1) * inv2 + (32.0 * x0 + 28.0 * x1) * inv3
                        - 60.0 * idiff * inv4;
                let c2 = (-4.5 * v0 + 1.5 * v1) * inv - (18.0 * x0 + 12.0 * x1) * inv2
                    + 30.0 * idiff * inv3;
                out[group.offset + i] =
                    x0 + delta * (v0 + delta * (c2 + delta * (c3 + delta * c4)));
            }
        } else {
            return Err(self.missing_data(gi));
        }
        Ok(())
    }

    fn interp_quintic(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
    ) -> Result<()> {
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof;
        if delta <= EPSILON {
            self.copy_waypoint(gi, ipoint, out);
            return Ok(());
        }
        let deriv_offset = self.deriv_offsets[group.offset];
        let dd_offset = self.dd_offsets[group.offset];
        if deriv_offset < 0 || dd_offset < 0 {
            return Err(self.missing_data(gi));
        }
        //   c5 = (a1 - a0)/(2*d^3) - 3*(v0 + v1)/d^4 + 6*px/d^5
        //   c4 = (1.5*a0 - a1)/d^2 + (8*v0 + 7*v1)/d^3 - 15*px/d^4
        //   c3 = (a1/2 - 1.5*a0)/d - (6*v0 + 4*v1)/d^2 + 10*px/d^3
        let deriv_offset = deriv_offset.unsigned_abs() as usize;
        let dd_offset = dd_offset.unsigned_abs() as usize;
        let inv = inv_delta[ipoint + 1];
        let inv2 = inv * inv;
        let inv3 = inv2 * inv;
        let inv4 = inv2 * inv2;
        let inv5 = inv4 * inv;
        for i in 0..group.dof {
            let x0 = self.data[row + group.offset + i];
            let px = self.data[dof + row + group.offset + i] - x0;
            let v0 = self.data[row + deriv_offset + i];
            let v1 = self.data[dof + row + deriv_offset + i];
            let a0 = self.data[row + dd_offset + i];
            let a1 = self.data[dof + row + dd_offset + i];
            let c5 = (-0.5 * a0 + 0.5 * a1) * inv3 - (3.0 * v0 + 3.0 * v1) * inv4 + px * 6.0 * inv5;
            let c4 = (1.5 * a0 - a1) * inv2 + (8.0 * v0 + 7.0 * v1) * inv3 - px * 15.0 * inv4;
            let c3 =
                (-1.5 * a0 + 0.5 * a1) * inv + (-6.0 * v0 - 4.0 * v1) * inv2 + px * 10.0 * inv3;
            out[group.offset + i] = x0
                + delta * (v0 + delta * (0.5 * a0 + delta * (c3 + delta * (c4 + delta * c5))));
        }
        Ok(())
    }

    fn interp_sextic(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
        out: &mut [Float],
    ) -> Result<()> {
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof;
        if delta <= EPSILON {
            self.copy_waypoint(gi, ipoint, out);
            return Ok(());
        }
        let deriv_offset = self.deriv_offsets[group.offset];
        let dd_offset = self.dd_offsets[group.offset];
        let ddd_offset = self.ddd_offsets[group.offset];
        if deriv_offset < 0 || dd_offset < 0 || ddd_offset < 0 {
            return Err(self.missing_data(gi));
        }
        //   c6 = -(a0 + a1)/(2*d^4) + (j1 - j0)/(12*d^3) + (v1 - v0)/d^5
        //   c5 = (1.6*a0 + 1.4*a1)/d^3 + (0.3*j0 - 0.2*j1)/d^2 + 3*(v0 - v1)/d^4
        //   c4 = -(1.5*a0 + a1)/d^2 + (j1/8 - 3*j0/8)/d + 2.5*(v1 - v0)/d^3
        let deriv_offset = deriv_offset.unsigned_abs() as usize;
        let dd_offset = dd_offset.unsigned_abs() as usize;
        let ddd_offset = ddd_offset.unsigned_abs() as usize;
        let inv = inv_delta[ipoint + 1];
        let inv2 = inv * inv;
        let inv3 = inv2 * inv;
        let inv4 = inv2 * inv2;
        let inv5 = inv4 * inv;
        for i in 0..group.dof {
            let x0 = self.data[row + group.offset + i];
            let v0 = self.data[row + deriv_offset + i];
            let v1 = self.data[dof + row + deriv_offset + i];
            let a0 = self.data[row + dd_offset + i];
            let a1 = self.data[dof + row + dd_offset + i];
            let j0 = self.data[row + ddd_offset + i];
            let j1 = self.data[dof + row + ddd_offset + i];
            let c6 = (-a0 - a1) * 0.5 * inv4 + (-j0 + j1) / 12.0 * inv3 + (-v0 + v1) * inv5;
            let c5 = (1.6 * a0 + 1.4 * a1) * inv3 + (0.3 * j0 - 0.2 * j1) * inv2
                + (3.0 * v0 - 3.0 * v1) * inv4;
            let c4 = (-1.5 * a0 - a1) * inv2 + (-0.375 * j0 + 0.125 * j1) * inv
                + (-2.5 * v0 + 2.5 * v1) * inv3;
            out[group.offset + i] = x0
                + delta
                    * (v0
                        + delta
                            * (0.5 * a0
                                + delta
                                    * (j0 / 6.0
                                        + delta * (c4 + delta * (c5 + delta * c6)))));
        }
        Ok(())
    }

    fn validate_linear(&self, gi: usize, ipoint: usize, delta: Float) -> Result<()> {
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof;
        let deriv_offset = self.deriv_offsets[group.offset];
        if deriv_offset < 0 {
            return Ok(());
        }
        let deriv_offset = deriv_offset.unsigned_abs() as usize;
        let tolerance = epsilon_linear();
        for i in 0..group.dof {
            let v1 = self.data[dof + row + deriv_offset + i];
            let expected = self.data[row + group.offset + i] + delta * v1;
            let error = (self.data[dof + row + group.offset + i] - expected).abs();
            // Errors of one full turn are tolerated for circular joints.
            if (error - TWO_PI).abs() > tolerance && error > tolerance {
                return Err(TrajectoryError::SegmentValidation {
                    name: group.name.clone(),
                    interpolation: group.interpolation.clone(),
                    segment: ipoint,
                    dof: i,
                    error,
                });
            }
        }
        Ok(())
    }

    fn validate_quadratic(
        &self,
        gi: usize,
        ipoint: usize,
        delta: Float,
        inv_delta: &[Float],
    ) -> Result<()> {
        if delta <= EPSILON {
            return Ok(());
        }
        let group = &self.spec.groups()[gi];
        let dof = self.spec.dof();
        let row = ipoint * dof;
        let deriv_offset = self.deriv_offsets[group.offset];
        if deriv_offset < 0 {
            // Only the integral form is available; not enough constraints to
            // recompute the endpoint.
            return Ok(());
        }
        let deriv_offset = deriv_offset.unsigned_abs() as usize;
        for i in 0..group.dof {
            let v0 = self.data[row + deriv_offset + i];
            let coeff =
                0.5 * inv_delta[ipoint + 1] * (self.data[dof + row + deriv_offset + i] - v0);
            let expected = self.data[row + group.offset + i] + delta * (v0 + delta * coeff);
            let error = (self.data[dof + row + group.offset + i] - expected).abs();
            if (error - TWO_PI).abs() > 1e-5 && error > 1e-4 {
                return Err(TrajectoryError::SegmentValidation {
                    name: group.name.clone(),
                    interpolation: group.interpolation.clone(),
                    segment: ipoint,
                    dof: i,
                    error,
                });
            }
        }
        Ok(())
    }
}
