//! Migration set validation
//!
//! A set is valid for `max_version` when it forms the exact chain
//! `1_up, 2_up, 2_down, 3_up, 3_down, ...` with no gaps or duplicates, so a
//! rollback path exists for every version that can be applied.

use super::{Direction, MigrationDescriptor};
use crate::errors::SequenceError;

/// Minimum number of files needed to reach `max_version`
pub fn expected_file_count(max_version: u32) -> u64 {
    (u64::from(max_version) * 2).saturating_sub(1)
}

/// Validate `descriptors` for completeness up to `max_version`.
///
/// Sorts the slice by `(version, direction)` in place.
pub fn validate(
    descriptors: &mut [MigrationDescriptor],
    max_version: u32,
) -> Result<(), SequenceError> {
    let expected = expected_file_count(max_version);
    if (descriptors.len() as u64) < expected {
        return Err(SequenceError::InsufficientFiles {
            expected,
            actual: descriptors.len(),
        });
    }

    if descriptors.len() % 2 == 0 {
        return Err(SequenceError::InvalidCount {
            actual: descriptors.len(),
        });
    }

    descriptors.sort_by_key(MigrationDescriptor::identity);

    if let Some(pair) = descriptors
        .windows(2)
        .find(|pair| pair[0].identity() == pair[1].identity())
    {
        let (version, direction) = pair[0].identity();
        return Err(SequenceError::DuplicateMigration {
            version,
            direction,
            files: descriptors
                .iter()
                .filter(|d| d.identity() == (version, direction))
                .map(MigrationDescriptor::file_name)
                .collect(),
        });
    }

    // Odd and non-empty from here on
    let initial = &descriptors[0];
    if initial.identity() != (1, Direction::Up) {
        return Err(SequenceError::MissingInitialMigration {
            found: initial.file_name(),
        });
    }

    for (index, pair) in descriptors[1..].chunks_exact(2).enumerate() {
        let expected_version = index as u32 + 2;
        for (descriptor, expected_direction) in pair.iter().zip([Direction::Up, Direction::Down]) {
            if descriptor.identity() != (expected_version, expected_direction) {
                return Err(SequenceError::MissingOrMisorderedMigration {
                    expected_version,
                    expected_direction,
                    found: descriptor.file_name(),
                });
            }
        }
    }

    Ok(())
}
