//! Waypoint storage and piecewise-polynomial sampling for multi-channel
//! trajectories.
//!
//! This crate provides [`Trajectory`]: a dense, row-major buffer of
//! time-stamped waypoints described by a
//! [`ConfigurationSpecification`](trajectory_types::ConfigurationSpecification),
//! plus the sampling engine that reconstructs continuous values at any time
//! within the duration. Reconstruction degree is chosen per channel group
//! from its interpolation label (`previous`, `next`, `max`, `linear`,
//! `quadratic`, `cubic`, `quartic`, `quintic`, `sextic`), drawing boundary
//! data from the derivative and integral groups present in the
//! specification. `ikparam_values` groups with a rotation or direction tag
//! are reconstructed on the unit sphere instead of channel-wise.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no engine dependencies. It can be used in:
//! - Robot controllers
//! - Planning pipelines
//! - Offline trajectory analysis
//!
//! # Concurrency
//!
//! A trajectory is single-threaded: sampling lazily rebuilds a cached time
//! index, so even read-only use of one instance must not be concurrent.
//! Separate instances are fully independent.
//!
//! # Example
//!
//! ```
//! use trajectory_core::Trajectory;
//! use trajectory_types::{ConfigurationSpecification, Group};
//!
//! let spec = ConfigurationSpecification::new(vec![
//!     Group::new("joint_values", 0, 1, "quadratic"),
//!     Group::new("joint_velocities", 1, 1, "linear"),
//!     Group::new("deltatime", 2, 1, ""),
//! ])
//! .unwrap();
//!
//! let mut traj = Trajectory::new();
//! traj.init(spec);
//! traj.insert(0, &[0.0, 0.0, 0.0, 1.0, 2.0, 1.0], false).unwrap();
//!
//! assert_eq!(traj.duration().unwrap(), 1.0);
//! let row = traj.sample_at(0.5).unwrap();
//! assert!((row[0] - 0.25).abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod interp;
mod resolver;
mod rotation;
mod sampler;
mod timeline;
mod trajectory;

pub use error::{ErrorKind, Result, TrajectoryError};
pub use trajectory::Trajectory;
