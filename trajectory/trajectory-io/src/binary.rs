//! Binary trajectory stream format.
//!
//! All integers are little-endian; strings are UTF-8 with a `u16` byte-length
//! prefix; waypoint values use the runtime scalar width. The layout is:
//!
//! ```text
//! u16  magic = 0x62FF
//! u16  version in {1, 2, 3}
//! u16  group count
//! foreach group
//!     string  name
//!     i32     offset
//!     i32     dof
//!     string  interpolation
//! end
//! u32  value count
//! value count * size_of::<Float>() bytes of row-major waypoint data
//! string  description
//! // version >= 2:
//! u16  readable count
//! foreach readable
//!     string  id
//!     string  payload
//!     string  reader-type tag        // version >= 3 only
//! end
//! ```
//!
//! Streams that do not open with the magic are handed to the textual reader.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::warn;
use trajectory_core::Trajectory;
use trajectory_types::{ConfigurationSpecification, Float, Group, Readable};

use crate::error::{IoError, IoResult};
use crate::markup;
use crate::text;

/// First two bytes of every binary trajectory stream.
pub const BINARY_MAGIC: u16 = 0x62FF;

/// Newest binary format version, and the one written by [`write_binary`].
pub const BINARY_VERSION: u16 = 0x0003;

/// Oldest binary format version still accepted.
const BINARY_VERSION_MIN: u16 = 0x0001;

/// Reader-type tag for opaque string payloads.
const TAG_STRING: &str = "StringReadable";

/// Reader-type tag for hierarchical markup payloads.
const TAG_HIERARCHICAL: &str = "HierarchicalXMLReadable";

const FLOAT_SIZE: usize = std::mem::size_of::<Float>();

/// Load a trajectory from a file, auto-detecting binary vs textual format.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content is not a
/// valid trajectory in either format.
///
/// # Example
///
/// ```no_run
/// use trajectory_io::load_trajectory;
///
/// let traj = load_trajectory("grasp.traj").unwrap();
/// println!("{} waypoints", traj.num_waypoints());
/// ```
pub fn load_trajectory<P: AsRef<Path>>(path: P) -> IoResult<Trajectory> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    read_trajectory(BufReader::new(file))
}

/// Save a trajectory to a file.
///
/// # Arguments
///
/// * `traj` - The trajectory to save
/// * `path` - Output file path
/// * `binary` - If true, write the binary format; if false, the textual one
///
/// # Errors
///
/// Returns an error if the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use trajectory_io::{load_trajectory, save_trajectory};
///
/// let traj = load_trajectory("grasp.traj").unwrap();
/// save_trajectory(&traj, "copy.traj", true).unwrap();
/// ```
pub fn save_trajectory<P: AsRef<Path>>(traj: &Trajectory, path: P, binary: bool) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    if binary {
        write_binary(traj, &mut writer)?;
    } else {
        text::write_text(traj, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a trajectory from a stream, auto-detecting the format.
///
/// # Errors
///
/// Returns an error if the stream cannot be read or holds no valid
/// trajectory.
pub fn read_trajectory<R: Read>(mut reader: R) -> IoResult<Trajectory> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    trajectory_from_bytes(&bytes)
}

/// Read a trajectory from raw bytes, auto-detecting the format.
///
/// # Errors
///
/// Returns an error if the bytes hold no valid trajectory.
pub fn trajectory_from_bytes(bytes: &[u8]) -> IoResult<Trajectory> {
    if bytes.len() < 2 {
        return Err(IoError::invalid_content(
            "cannot read first 2 bytes, stream might be empty",
        ));
    }
    let header = u16::from_le_bytes([bytes[0], bytes[1]]);
    if header == BINARY_MAGIC {
        read_binary_bytes(bytes)
    } else {
        // Not a binary stream; reparse from the start as markup.
        text::parse_text(std::str::from_utf8(bytes)?)
    }
}

/// Write a trajectory in the current binary format version.
///
/// # Errors
///
/// Returns an error if the stream cannot be written or a field exceeds its
/// wire encoding.
pub fn write_binary<W: Write>(traj: &Trajectory, writer: &mut W) -> IoResult<()> {
    write_u16(writer, BINARY_MAGIC)?;
    write_u16(writer, BINARY_VERSION)?;

    let groups = traj.spec().groups();
    write_u16(writer, count_u16("group", groups.len())?)?;
    for group in groups {
        write_string(writer, &group.name)?;
        write_i32(writer, offset_i32("group offset", group.offset)?)?;
        write_i32(writer, offset_i32("group dof", group.dof)?)?;
        write_string(writer, &group.interpolation)?;
    }

    let values = traj.data();
    let count = u32::try_from(values.len()).map_err(|_| IoError::TooLarge {
        what: "waypoint value",
        count: values.len(),
    })?;
    writer.write_all(&count.to_le_bytes())?;
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }

    write_string(writer, traj.description())?;

    write_u16(writer, count_u16("readable", traj.readables().len())?)?;
    for (id, readable) in traj.readables() {
        write_string(writer, id)?;
        match readable {
            Readable::Text(payload) => {
                write_string(writer, payload)?;
                write_string(writer, TAG_STRING)?;
            }
            Readable::Json(value) => {
                write_string(writer, &serde_json::to_string(value)?)?;
                write_string(writer, TAG_STRING)?;
            }
            Readable::Hierarchy(node) => {
                write_string(writer, &markup::to_markup_wrapped(node)?)?;
                write_string(writer, TAG_HIERARCHICAL)?;
            }
        }
    }
    Ok(())
}

fn read_binary_bytes(bytes: &[u8]) -> IoResult<Trajectory> {
    let mut reader = ByteReader { bytes, at: 2 };
    let version = reader.read_u16()?;
    if !(BINARY_VERSION_MIN..=BINARY_VERSION).contains(&version) {
        return Err(IoError::UnsupportedVersion { version });
    }

    let group_count = reader.read_u16()?;
    let mut groups = Vec::with_capacity(usize::from(group_count));
    for _ in 0..group_count {
        let name = reader.read_string()?;
        let offset = reader.read_usize()?;
        let dof = reader.read_usize()?;
        let interpolation = reader.read_string()?;
        groups.push(Group::new(name, offset, dof, interpolation));
    }

    let mut traj = Trajectory::new();
    traj.init(ConfigurationSpecification::new(groups)?);

    let values = reader.read_values()?;
    traj.insert(0, &values, false)?;
    let description = reader.read_string()?;
    traj.set_description(description);

    // Versions before 2 predate readable annotations.
    if version >= 0x0002 {
        let readable_count = reader.read_u16()?;
        for _ in 0..readable_count {
            let id = reader.read_string()?;
            let payload = reader.read_string()?;
            let readable = if version >= 0x0003 {
                let tag = reader.read_string()?;
                if tag == TAG_HIERARCHICAL {
                    promote_hierarchical(&id, payload)
                } else {
                    Readable::Text(payload)
                }
            } else {
                Readable::Text(payload)
            };
            traj.set_readable(id, readable);
        }
    }
    Ok(traj)
}

/// Rebuilds a hierarchical readable from its wrapped markup payload.
///
/// The payload carries a synthetic root; a single child is promoted to be
/// the readable, while any other shape keeps the root itself.
fn promote_hierarchical(id: &str, payload: String) -> Readable {
    match markup::parse_markup(&payload) {
        Ok(mut root) => {
            if root.children.len() == 1 {
                match root.children.pop() {
                    Some(child) => Readable::Hierarchy(child),
                    None => Readable::Hierarchy(root),
                }
            } else {
                warn!(id, "hierarchical readable does not have exactly one root child");
                Readable::Hierarchy(root)
            }
        }
        Err(error) => {
            warn!(id, %error, "failed to parse hierarchical readable, storing raw payload");
            Readable::Text(payload)
        }
    }
}

fn write_u16<W: Write>(writer: &mut W, value: u16) -> IoResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> IoResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> IoResult<()> {
    write_u16(writer, count_u16("string byte", value.len())?)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn count_u16(what: &'static str, count: usize) -> IoResult<u16> {
    u16::try_from(count).map_err(|_| IoError::TooLarge { what, count })
}

fn offset_i32(what: &'static str, value: usize) -> IoResult<i32> {
    i32::try_from(value).map_err(|_| IoError::TooLarge { what, count: value })
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl ByteReader<'_> {
    fn take(&mut self, len: usize) -> IoResult<&[u8]> {
        let end = self.at.checked_add(len).filter(|&end| end <= self.bytes.len());
        let Some(end) = end else {
            return Err(IoError::UnexpectedEof { position: self.at });
        };
        let slice = &self.bytes[self.at..end];
        self.at = end;
        Ok(slice)
    }

    fn read_u16(&mut self) -> IoResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> IoResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_usize(&mut self) -> IoResult<usize> {
        let bytes = self.take(4)?;
        let value = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        usize::try_from(value).map_err(|_| {
            IoError::invalid_content(format!("negative field value {value} in group table"))
        })
    }

    fn read_string(&mut self) -> IoResult<String> {
        let len = usize::from(self.read_u16()?);
        let bytes = self.take(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    fn read_values(&mut self) -> IoResult<Vec<Float>> {
        let position = self.at;
        let count = usize::try_from(self.read_u32()?)
            .map_err(|_| IoError::UnexpectedEof { position })?;
        let byte_len = count
            .checked_mul(FLOAT_SIZE)
            .ok_or(IoError::UnexpectedEof { position })?;
        let bytes = self.take(byte_len)?;
        let mut values = Vec::with_capacity(count);
        for chunk in bytes.chunks_exact(FLOAT_SIZE) {
            let raw = chunk
                .try_into()
                .map_err(|_| IoError::UnexpectedEof { position })?;
            values.push(Float::from_le_bytes(raw));
        }
        Ok(values)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use trajectory_types::{ConfigurationSpecification, HierarchicalReadable};

    fn sample_trajectory() -> Trajectory {
        let spec = ConfigurationSpecification::new(vec![
            Group::new("joint_values", 0, 1, "linear"),
            Group::new("joint_velocities", 1, 1, "linear"),
            Group::new("deltatime", 2, 1, ""),
        ])
        .unwrap();
        let mut traj = Trajectory::new();
        traj.init(spec);
        traj.insert(0, &[0.0, 0.0, 0.0, 1.0, 2.0, 0.5], false).unwrap();
        traj.set_description("t");
        traj.set_readable("x", Readable::text("p"));
        traj
    }

    fn round_trip(traj: &Trajectory) -> Trajectory {
        let mut bytes = Vec::new();
        write_binary(traj, &mut bytes).unwrap();
        trajectory_from_bytes(&bytes).unwrap()
    }

    #[test]
    fn binary_round_trip_preserves_everything() {
        let traj = sample_trajectory();
        let back = round_trip(&traj);
        assert_eq!(back.spec(), traj.spec());
        assert_eq!(back.data(), traj.data());
        assert_eq!(back.description(), "t");
        assert_eq!(back.readables(), traj.readables());
    }

    #[test]
    fn stream_opens_with_magic_and_version() {
        let mut bytes = Vec::new();
        write_binary(&sample_trajectory(), &mut bytes).unwrap();
        assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), BINARY_MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), BINARY_VERSION);
    }

    #[test]
    fn unknown_version_rejected() {
        let mut bytes = Vec::new();
        write_binary(&sample_trajectory(), &mut bytes).unwrap();
        bytes[2] = 0x04;
        bytes[3] = 0x00;
        assert!(matches!(
            trajectory_from_bytes(&bytes),
            Err(IoError::UnsupportedVersion { version: 4 })
        ));
        bytes[2] = 0x00;
        assert!(matches!(
            trajectory_from_bytes(&bytes),
            Err(IoError::UnsupportedVersion { version: 0 })
        ));
    }

    #[test]
    fn version_one_stream_has_no_readables() {
        // Serialize, then rewrite the version and truncate after the
        // description to emulate an old stream.
        let mut traj = sample_trajectory();
        traj.clear_readables();
        let mut bytes = Vec::new();
        write_binary(&traj, &mut bytes).unwrap();
        bytes[2] = 0x01;
        // Drop the trailing zero readable count.
        bytes.truncate(bytes.len() - 2);
        let back = trajectory_from_bytes(&bytes).unwrap();
        assert!(back.readables().is_empty());
        assert_eq!(back.description(), "t");
    }

    #[test]
    fn hierarchical_readable_round_trips() {
        let mut traj = sample_trajectory();
        let node = HierarchicalReadable::new("tool")
            .with_attribute("name", "gripper")
            .with_child(HierarchicalReadable::new("mass").with_text("0.2"));
        traj.set_readable("tool", Readable::Hierarchy(node.clone()));
        let back = round_trip(&traj);
        assert_eq!(back.readable("tool"), Some(&Readable::Hierarchy(node)));
    }

    #[test]
    fn json_readable_comes_back_as_text() {
        let mut traj = sample_trajectory();
        traj.set_readable("meta", Readable::Json(serde_json::json!({"a": 1})));
        let back = round_trip(&traj);
        assert_eq!(back.readable("meta"), Some(&Readable::text("{\"a\":1}")));
    }

    #[test]
    fn truncated_stream_reports_eof() {
        let mut bytes = Vec::new();
        write_binary(&sample_trajectory(), &mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            trajectory_from_bytes(&bytes),
            Err(IoError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn empty_stream_rejected() {
        assert!(trajectory_from_bytes(&[]).is_err());
        assert!(trajectory_from_bytes(&[0x62]).is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.traj");
        let traj = sample_trajectory();
        save_trajectory(&traj, &path, true).unwrap();
        let back = load_trajectory(&path).unwrap();
        assert_eq!(back.data(), traj.data());
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_trajectory("nonexistent_file_12345.traj");
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }
}
