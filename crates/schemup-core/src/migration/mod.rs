//! Migration engine
//!
//! Provides:
//! - Filename scanning into `MigrationDescriptor`s
//! - Strict up/down pairing validation
//! - Direction selection and range sequencing
//! - Content checksums for applied files

mod checksums;
mod descriptor;
mod scanner;
mod sequencer;
mod validator;

pub use checksums::compute_checksum;
pub use descriptor::{Direction, MigrationDescriptor};
pub use scanner::{parse_file_name, scan};
pub use sequencer::{plan, sequence};
pub use validator::{expected_file_count, validate};
