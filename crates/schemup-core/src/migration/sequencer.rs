//! Migration sequencing
//!
//! Selects and orders the files needed to move between two schema versions.

use super::{scan, validate, Direction, MigrationDescriptor};
use crate::errors::Result;
use std::path::Path;

/// Filter and order `descriptors` for a run from `current` to `target`.
///
/// Keeps files of `direction` whose version lies in
/// `[min(current, target) + 1, max(current, target)]`. Up runs are ordered by
/// ascending version, down runs by descending version.
pub fn sequence(
    descriptors: Vec<MigrationDescriptor>,
    direction: Direction,
    current: u32,
    target: u32,
) -> Vec<MigrationDescriptor> {
    let lowest = current.min(target).saturating_add(1);
    let highest = current.max(target);

    let mut selected: Vec<_> = descriptors
        .into_iter()
        .filter(|d| d.direction() == direction && (lowest..=highest).contains(&d.version()))
        .collect();

    match direction {
        Direction::Up => selected.sort_by_key(|d| d.version()),
        Direction::Down => selected.sort_by_key(|d| std::cmp::Reverse(d.version())),
    }

    selected
}

/// Scan, validate and sequence the migrations in `directory`.
///
/// Returns an empty plan when `current == target`. Performs no database I/O.
pub fn plan(directory: &Path, current: u32, target: u32) -> Result<Vec<MigrationDescriptor>> {
    let Some(direction) = Direction::between(current, target) else {
        return Ok(Vec::new());
    };

    let mut descriptors = scan(directory)?;

    tracing::debug!(file_count = descriptors.len(), "Migration list:");
    for descriptor in &descriptors {
        tracing::debug!("{}", descriptor);
    }

    validate(&mut descriptors, current.max(target))?;

    let selected = sequence(descriptors, direction, current, target);

    tracing::info!(file_count = selected.len(), "Migration files to apply:");
    for descriptor in &selected {
        tracing::info!("{}", descriptor);
    }

    Ok(selected)
}
