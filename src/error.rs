// SPDX-License-Identifier: MIT
//! Error types for the employee database

use std::path::PathBuf;

use crate::format::FormatError;

/// Errors that can occur while operating on a database file
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Database file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Truncated read: expected {expected} bytes, got {actual}")]
    TruncatedRead { expected: usize, actual: usize },

    #[error("Invalid format: {0}")]
    Format(#[from] FormatError),

    #[error("Corrupt header: invalid magic 0x{found:08x} (expected 0x{expected:08x})")]
    CorruptHeader { found: u32, expected: u32 },

    #[error("Unsupported version: expected {expected}, got {found}")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("Invalid employee spec: {0}")]
    InvalidSpec(String),

    #[error("Employee not found: {0}")]
    KeyNotFound(String),

    #[error("Employee key is not unique: {key} matches {matches} records")]
    DuplicateKey { key: String, matches: usize },

    #[error("Database is full: at most {max} employees can be stored")]
    CapacityExceeded { max: usize },

    #[error("Invalid arguments: {0}")]
    Argument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias used throughout the crate
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_header_message() {
        let err = DbError::CorruptHeader {
            found: 0xdeadbeef,
            expected: 0x4c4c4144,
        };
        assert_eq!(
            err.to_string(),
            "Corrupt header: invalid magic 0xdeadbeef (expected 0x4c4c4144)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DbError = io.into();
        assert!(matches!(err, DbError::Io(_)));
    }
}
