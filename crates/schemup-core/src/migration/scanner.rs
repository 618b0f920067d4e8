//! Migration directory scanner
//!
//! Reads the files directly inside a migration directory and parses names of
//! the form `<version>_<up|down>[-<description>].sql`.

use super::{Direction, MigrationDescriptor};
use crate::errors::{MigrationError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

static FILE_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn file_name_pattern() -> &'static Regex {
    FILE_NAME_PATTERN.get_or_init(|| {
        // [1] = version, [2] = direction, [3] = description or empty
        Regex::new(r"^([0-9]+)_(up|down)(-[ \S]+|)\.sql$").expect("migration file pattern is valid")
    })
}

/// Parse a migration file name into `(version, direction)`.
///
/// Returns `Ok(None)` for names that are not migration files and
/// `VersionNumberOverflow` when the version digits do not fit a `u32`.
pub fn parse_file_name(file_name: &str) -> Result<Option<(u32, Direction)>> {
    let Some(captures) = file_name_pattern().captures(file_name) else {
        return Ok(None);
    };

    let version = captures[1]
        .parse::<u32>()
        .map_err(|_| MigrationError::VersionNumberOverflow {
            file: file_name.to_string(),
        })?;
    let direction = match &captures[2] {
        "up" => Direction::Up,
        _ => Direction::Down,
    };

    Ok(Some((version, direction)))
}

/// Scan `directory` for migration files.
///
/// Only regular, non-empty files directly inside the directory are
/// considered. The order of the returned descriptors is unspecified.
pub fn scan(directory: &Path) -> Result<Vec<MigrationDescriptor>> {
    let io_error = |e: std::io::Error| MigrationError::Io {
        path: directory.to_path_buf(),
        reason: e.to_string(),
    };

    let mut descriptors = Vec::new();

    for entry in fs::read_dir(directory).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();

        // Follows symlinks; dangling links are skipped like any other non-file
        let is_candidate = fs::metadata(&path)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false);
        if !is_candidate {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        if let Some((version, direction)) = parse_file_name(file_name)? {
            descriptors.push(MigrationDescriptor::new(path.clone(), version, direction));
        }
    }

    Ok(descriptors)
}
