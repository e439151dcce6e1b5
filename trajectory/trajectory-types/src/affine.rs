//! Affine DOF bitmasks and identity-pose packing.
//!
//! `affine_transform` groups carry a trailing integer bitmask in their name
//! that selects which pose components the channels hold, in this order:
//! translation X/Y/Z, then exactly one rotation representation.

use crate::error::SpecError;
use crate::scalar::Float;

/// Translation along X (1 channel).
pub const AFFINE_X: u32 = 0x01;
/// Translation along Y (1 channel).
pub const AFFINE_Y: u32 = 0x02;
/// Translation along Z (1 channel).
pub const AFFINE_Z: u32 = 0x04;
/// Rotation angle about a fixed axis (1 channel).
pub const AFFINE_ROTATION_AXIS: u32 = 0x08;
/// Axis-angle rotation vector (3 channels).
pub const AFFINE_ROTATION_3D: u32 = 0x10;
/// Unit quaternion, scalar first (4 channels).
pub const AFFINE_ROTATION_QUAT: u32 = 0x20;

/// Returns the number of channels selected by an affine DOF mask.
///
/// # Errors
///
/// Returns an error if more than one rotation representation is selected.
pub fn affine_dof_count(mask: u32) -> Result<usize, SpecError> {
    let mut count = 0;
    for translation in [AFFINE_X, AFFINE_Y, AFFINE_Z] {
        if mask & translation != 0 {
            count += 1;
        }
    }
    let rotations = [
        (AFFINE_ROTATION_AXIS, 1),
        (AFFINE_ROTATION_3D, 3),
        (AFFINE_ROTATION_QUAT, 4),
    ];
    let mut selected = 0;
    for (flag, channels) in rotations {
        if mask & flag != 0 {
            selected += 1;
            count += channels;
        }
    }
    if selected > 1 {
        return Err(SpecError::InvalidAffineMask { mask });
    }
    Ok(count)
}

/// Packs the identity pose into the channel layout selected by `mask`.
///
/// Translations and axis-angle components are zero; a quaternion is the
/// identity `(1, 0, 0, 0)`.
///
/// # Errors
///
/// Returns an error if the mask is invalid.
pub fn affine_identity_values(mask: u32) -> Result<Vec<Float>, SpecError> {
    let count = affine_dof_count(mask)?;
    let mut values = vec![0.0; count];
    if mask & AFFINE_ROTATION_QUAT != 0 {
        // Quaternion sits after any selected translation channels.
        let quat_start = count - 4;
        values[quat_start] = 1.0;
    }
    Ok(values)
}
