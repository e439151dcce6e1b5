//! Channel-by-channel conversion between specifications.

use crate::affine::affine_identity_values;
use crate::error::SpecError;
use crate::group::{category_padding, Group};
use crate::scalar::Float;
use crate::spec::ConfigurationSpecification;

/// Default values written into a destination group that has no source.
///
/// `affine_transform` groups whose parameter data carries a robot name and a
/// valid affine DOF mask matching the group's dof receive the identity pose;
/// `outputSignals` groups are filled with `-1`; everything else is zero.
#[must_use]
pub fn default_group_values(group: &Group) -> Vec<Float> {
    if group.category() == "affine_transform" {
        let mut tokens = group.parameter_data().split_whitespace();
        let _robot = tokens.next();
        if let Some(mask) = tokens.next().and_then(|t| t.parse::<u32>().ok()) {
            if let Ok(values) = affine_identity_values(mask) {
                if values.len() == group.dof {
                    return values;
                }
            }
        }
    }
    vec![category_padding(group.category()); group.dof]
}

/// Copies `num_points` rows from `src` (laid out per `src_spec`) into `dst`
/// (laid out per `dst_spec`), translating channel positions group by group.
///
/// For every destination group a compatible source group is looked up by
/// name and dof. Destination groups without a source are left untouched when
/// `fill_uninitialized` is false, or filled with [`default_group_values`]
/// otherwise. Mismatched total DOF between the two layouts is not an error;
/// unmatched groups are simply skipped.
///
/// # Errors
///
/// Returns an error if either buffer holds fewer than `num_points` rows.
pub fn convert_data(
    dst: &mut [Float],
    dst_spec: &ConfigurationSpecification,
    src: &[Float],
    src_spec: &ConfigurationSpecification,
    num_points: usize,
    fill_uninitialized: bool,
) -> Result<(), SpecError> {
    let dst_dof = dst_spec.dof();
    let src_dof = src_spec.dof();
    if dst.len() < num_points * dst_dof {
        return Err(SpecError::BufferTooSmall {
            needed: num_points * dst_dof,
            got: dst.len(),
        });
    }
    if src.len() < num_points * src_dof {
        return Err(SpecError::BufferTooSmall {
            needed: num_points * src_dof,
            got: src.len(),
        });
    }

    for group in dst_spec.groups() {
        if let Some(source) = src_spec.find_compatible_group(group) {
            let width = group.dof.min(source.dof);
            for row in 0..num_points {
                let dst_at = row * dst_dof + group.offset;
                let src_at = row * src_dof + source.offset;
                dst[dst_at..dst_at + width].copy_from_slice(&src[src_at..src_at + width]);
            }
        } else if fill_uninitialized {
            let defaults = default_group_values(group);
            for row in 0..num_points {
                let dst_at = row * dst_dof + group.offset;
                dst[dst_at..dst_at + group.dof].copy_from_slice(&defaults);
            }
        }
    }
    Ok(())
}
