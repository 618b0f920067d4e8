//! Migration descriptor model

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Direction of a migration file
///
/// `Up` orders before `Down` so a sorted set reads `1_up, 2_up, 2_down, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply a schema step
    Up,
    /// Revert a schema step
    Down,
}

impl Direction {
    /// Direction needed to move from `current` to `target`.
    ///
    /// Returns `None` when the versions are equal and nothing needs to run.
    pub fn between(current: u32, target: u32) -> Option<Self> {
        match target.cmp(&current) {
            std::cmp::Ordering::Greater => Some(Direction::Up),
            std::cmp::Ordering::Less => Some(Direction::Down),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single migration file found on disk
///
/// Identity is `(version, direction)`; the path only locates the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDescriptor {
    file_location: PathBuf,
    version: u32,
    direction: Direction,
}

impl MigrationDescriptor {
    pub fn new(file_location: impl Into<PathBuf>, version: u32, direction: Direction) -> Self {
        Self {
            file_location: file_location.into(),
            version,
            direction,
        }
    }

    pub fn file_location(&self) -> &Path {
        &self.file_location
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// `(version, direction)` sort and identity key
    pub fn identity(&self) -> (u32, Direction) {
        (self.version, self.direction)
    }

    /// File name for diagnostics, falling back to the full path
    pub fn file_name(&self) -> String {
        self.file_location
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_location.display().to_string())
    }

    /// Read the full SQL text of this migration
    pub fn read_sql(&self) -> std::io::Result<String> {
        std::fs::read_to_string(&self.file_location)
    }
}

impl fmt::Display for MigrationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Migration file [{}] version {}, path: {}",
            self.direction,
            self.version,
            self.file_location.display()
        )
    }
}
