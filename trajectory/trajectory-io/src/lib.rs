//! Trajectory serialization for the trajectory crates.
//!
//! This crate round-trips [`Trajectory`](trajectory_core::Trajectory) values
//! through two on-disk forms:
//!
//! - **Binary** - A compact little-endian stream opened by the magic
//!   [`BINARY_MAGIC`], carrying the specification, the raw waypoint block,
//!   the description, and the readable annotations
//! - **Textual** - A markup document with the same fields
//!
//! # Format Detection
//!
//! Readers detect the format from the first two bytes: streams opening with
//! the binary magic parse as binary, everything else is handed to the
//! textual parser.
//!
//! ```no_run
//! use trajectory_io::{load_trajectory, save_trajectory};
//!
//! // Format detected from the stream content.
//! let traj = load_trajectory("grasp.traj").unwrap();
//!
//! // Write back in binary form.
//! save_trajectory(&traj, "grasp.traj", true).unwrap();
//! ```
//!
//! # URI Resolution
//!
//! [`UriResolver`] maps `scheme:path#fragment` references to local files for
//! loaders that accept trajectory URIs.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod binary;
mod error;
mod markup;
mod text;
mod uri;

pub use binary::{
    load_trajectory, read_trajectory, save_trajectory, trajectory_from_bytes, write_binary,
    BINARY_MAGIC, BINARY_VERSION,
};
pub use error::{IoError, IoResult};
pub use markup::{parse_markup, to_markup};
pub use text::{parse_text, write_text};
pub use uri::{parse_uri, ParsedUri, UriResolver};
