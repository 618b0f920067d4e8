use crate::migration::Direction;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using MigrationError
pub type Result<T> = std::result::Result<T, MigrationError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Run preconditions
    InvalidTarget,
    DirectoryNotFound,
    OpenFailed,

    // Migration set
    SequenceInvalid,
    VersionNumberOverflow,

    // Application
    MigrationApplyFailed,
    CommitFailed,

    // Collaborator
    NotOpen,
    Io,
    Persistence,
    Timeout,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidTarget => "ERR_INVALID_TARGET",
            ExErrorKind::DirectoryNotFound => "ERR_DIRECTORY_NOT_FOUND",
            ExErrorKind::OpenFailed => "ERR_OPEN_FAILED",
            ExErrorKind::SequenceInvalid => "ERR_SEQUENCE_INVALID",
            ExErrorKind::VersionNumberOverflow => "ERR_VERSION_NUMBER_OVERFLOW",
            ExErrorKind::MigrationApplyFailed => "ERR_MIGRATION_APPLY_FAILED",
            ExErrorKind::CommitFailed => "ERR_COMMIT_FAILED",
            ExErrorKind::NotOpen => "ERR_NOT_OPEN",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Used at the collaborator boundary (every `Database` method reports an
/// `ExError`) and as the logged form of every `MigrationError`.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    file: Option<PathBuf>,
    version: Option<u32>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            file: None,
            version: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add migration file context
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add schema version context
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn file(&self) -> Option<&std::path::Path> {
        self.file.as_deref()
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(file) = &self.file {
            write!(f, " (file: {})", file.display())?;
        }
        if let Some(version) = self.version {
            write!(f, " (version: {})", version)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Reasons a migration file set is rejected before any SQL runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// Fewer files than `2 * max_version - 1`
    #[error("Expected {expected} migration files but only found {actual}")]
    InsufficientFiles { expected: u64, actual: usize },

    /// A valid set is always odd: one initial up file plus whole pairs
    #[error("Number of migration files must be odd (1 initial file + n pairs), found {actual}")]
    InvalidCount { actual: usize },

    /// Two files share the same version and direction
    #[error("Duplicate migration files for version {version} [{direction}]: {files:?}")]
    DuplicateMigration {
        version: u32,
        direction: Direction,
        files: Vec<String>,
    },

    /// The lowest file is not `1_up`
    #[error("Invalid initial migration file: expected 1_up.sql but got {found}")]
    MissingInitialMigration { found: String },

    /// A gap or a broken up/down pair in the chain
    #[error("Expected migration file {expected_version}_{expected_direction}.sql but got {found}")]
    MissingOrMisorderedMigration {
        expected_version: u32,
        expected_direction: Direction,
        found: String,
    },
}

/// Failure taxonomy of a migration run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// Version 0 means "unmigrated" and is never a valid target
    #[error("Migration target version 0 is invalid")]
    InvalidTarget,

    #[error("Migration files must be in a directory: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Opening the connection or reading the current version failed
    #[error("Could not open database for migration: {reason}")]
    OpenFailed { reason: String },

    #[error("Missing migration files in sequence, no actions performed: {0}")]
    SequenceInvalid(#[from] SequenceError),

    #[error("Could not apply migration file {}: {reason}", file.display())]
    MigrationApplyFailed { file: PathBuf, reason: String },

    #[error("Could not commit migration transaction: {reason}")]
    CommitFailed { reason: String },

    #[error("Migration version number out of range in file {file}")]
    VersionNumberOverflow { file: String },

    /// Reading the migration directory failed
    #[error("I/O error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// Beginning the transaction or persisting the new version failed
    #[error("Migration transaction failed: {reason}")]
    Transaction { reason: String },
}

impl From<MigrationError> for ExError {
    fn from(err: MigrationError) -> Self {
        let message = err.to_string();
        match err {
            MigrationError::InvalidTarget => ExError::new(ExErrorKind::InvalidTarget)
                .with_version(0)
                .with_message(message),

            MigrationError::DirectoryNotFound { path } => {
                ExError::new(ExErrorKind::DirectoryNotFound)
                    .with_file(path)
                    .with_message(message)
            }

            MigrationError::OpenFailed { .. } => ExError::new(ExErrorKind::OpenFailed)
                .with_op("open")
                .with_message(message),

            MigrationError::SequenceInvalid(reason) => {
                let err = ExError::new(ExErrorKind::SequenceInvalid)
                    .with_op("validate")
                    .with_message(message);
                match reason {
                    SequenceError::DuplicateMigration { version, .. }
                    | SequenceError::MissingOrMisorderedMigration {
                        expected_version: version,
                        ..
                    } => err.with_version(version),
                    SequenceError::MissingInitialMigration { .. } => err.with_version(1),
                    _ => err,
                }
            }

            MigrationError::MigrationApplyFailed { file, .. } => {
                ExError::new(ExErrorKind::MigrationApplyFailed)
                    .with_op("execute")
                    .with_file(file)
                    .with_message(message)
            }

            MigrationError::CommitFailed { .. } => ExError::new(ExErrorKind::CommitFailed)
                .with_op("commit")
                .with_message(message),

            MigrationError::VersionNumberOverflow { file } => {
                ExError::new(ExErrorKind::VersionNumberOverflow)
                    .with_op("scan")
                    .with_file(file)
                    .with_message(message)
            }

            MigrationError::Io { path, .. } => ExError::new(ExErrorKind::Io)
                .with_file(path)
                .with_message(message),

            MigrationError::Transaction { .. } => ExError::new(ExErrorKind::Persistence)
                .with_op("transaction")
                .with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::MigrationApplyFailed)
            .with_op("execute")
            .with_file("migrations/3_up.sql")
            .with_message("syntax error");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_MIGRATION_APPLY_FAILED]"));
        assert!(rendered.contains("'execute'"));
        assert!(rendered.contains("3_up.sql"));
    }

    #[test]
    fn test_sequence_error_converts_with_version() {
        let err: ExError = MigrationError::from(SequenceError::MissingOrMisorderedMigration {
            expected_version: 4,
            expected_direction: Direction::Down,
            found: "5_up.sql".to_string(),
        })
        .into();

        assert_eq!(err.kind(), ExErrorKind::SequenceInvalid);
        assert_eq!(err.version(), Some(4));
        assert!(err.message().contains("4_down.sql"));
    }
}
