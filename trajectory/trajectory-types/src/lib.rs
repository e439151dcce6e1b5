//! Channel-layout types for piecewise-polynomial trajectories.
//!
//! This crate provides the data model shared by the trajectory crates:
//!
//! - [`Group`] - One named, contiguous slice of a waypoint row
//! - [`ConfigurationSpecification`] - An ordered collection of groups with a
//!   canonical computation order and cross-group derivative/integral queries
//! - [`convert_data`] - Channel-by-channel translation between specifications
//! - [`Readable`] - Opaque annotations carried alongside the waypoint data
//! - [`IkParamKind`] - Rotation/direction subtypes for `ikparam_values` groups
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no engine dependencies. It can be used in:
//! - CLI tools
//! - Servers
//! - Offline trajectory analysis
//! - Language bindings
//!
//! # Channel Layout
//!
//! A specification describes rows of [`Float`] channels. Each group covers
//! `[offset, offset + dof)` of a row; groups never overlap. The group name's
//! first space-separated token is its category (`joint_values`, `deltatime`,
//! `affine_transform`, ...) and determines semantics; the remainder is
//! opaque parameter data such as a robot name or an integer tag.
//!
//! # Example
//!
//! ```
//! use trajectory_types::{ConfigurationSpecification, Group};
//!
//! let spec = ConfigurationSpecification::new(vec![
//!     Group::new("joint_values robot", 0, 2, "linear"),
//!     Group::new("deltatime", 2, 1, ""),
//! ])
//! .unwrap();
//!
//! assert_eq!(spec.dof(), 3);
//! assert_eq!(spec.time_offset(), Some(2));
//! // Canonical order puts deltatime first.
//! assert_eq!(spec.groups()[0].name, "deltatime");
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod affine;
mod convert;
mod error;
mod group;
mod ikparam;
mod readable;
mod scalar;
mod spec;

pub use affine::{
    affine_dof_count, affine_identity_values, AFFINE_ROTATION_3D, AFFINE_ROTATION_AXIS,
    AFFINE_ROTATION_QUAT, AFFINE_X, AFFINE_Y, AFFINE_Z,
};
pub use convert::{convert_data, default_group_values};
pub use error::{Result, SpecError};
pub use group::{
    derivative_category, derivative_interpolation, integral_category, integral_interpolation,
    Group,
};
pub use ikparam::IkParamKind;
pub use readable::{HierarchicalReadable, Readable};
pub use scalar::{epsilon_linear, Float, EPSILON, TWO_PI};
pub use spec::ConfigurationSpecification;
