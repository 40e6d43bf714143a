//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error, including a batch that finished with failed resources
pub const ERROR: i32 = 1;

/// Input error - a required input has no value
pub const INPUT_ERROR: i32 = 2;

/// Extension error - missing extension or invalid manifest.yaml
pub const EXTENSION_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
