//! Error types for registry operations.
//!
//! Three families of failure are represented here: configuration errors raised
//! while validating hives, key paths, architectures and value types; process
//! errors raised when `REG.exe` cannot be spawned or exits unsuccessfully; and
//! output errors raised when the tool's text does not contain what was asked for.

use std::io;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Exit code `REG.exe` uses when a key or value does not exist.
///
/// This is a heuristic: the tool also exits with 1 for other failures such as
/// access denied, so a not-found answer derived from it may hide another cause.
pub const NOT_FOUND_EXIT_CODE: i32 = 1;

/// Errors that can occur during registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The tool could not be spawned or its output could not be collected.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unknown hive name.
    #[error("Invalid hive: {0:?}")]
    InvalidHive(String),

    /// Key path does not look like `\Segment\Segment`.
    #[error("Invalid key path: {0:?}")]
    InvalidKeyPath(String),

    /// Host name cannot be placed in a `\\host\` prefix.
    #[error("Invalid host: {0:?}")]
    InvalidHost(String),

    /// Unknown architecture view.
    #[error("Invalid architecture: {0:?} (expected x86 or x64)")]
    InvalidArch(String),

    /// Unknown value type tag.
    #[error("Invalid value type: {0:?}")]
    InvalidValueType(String),

    /// Unknown output encoding label.
    #[error("Invalid output encoding: {0:?}")]
    InvalidEncoding(String),

    /// The tool exited with a non-zero status.
    #[error("Process exited with code: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}", display_code(.code))]
    ProcessExit {
        /// Exit code, `None` when the process was terminated by a signal.
        code: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// Key or value not found in the tool's output.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Value text could not be interpreted as its declared type.
    #[error("Invalid value data: {0}")]
    InvalidData(String),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl RegistryError {
    /// Creates a not found error with context about what was being searched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use reg_exec::error::RegistryError;
    /// let err = RegistryError::not_found("value", "DisplayName");
    /// assert!(err.is_not_found());
    /// ```
    pub fn not_found(item_type: &str, name: &str) -> Self {
        Self::NotFound(format!("{} '{}'", item_type, name))
    }

    /// Returns the tool's exit code for process errors.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ProcessExit { code, .. } => *code,
            _ => None,
        }
    }

    /// Returns true when the error means the key or value does not exist.
    ///
    /// Covers unmatched output and process exits with [`NOT_FOUND_EXIT_CODE`].
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::ProcessExit { code, .. } => *code == Some(NOT_FOUND_EXIT_CODE),
            _ => false,
        }
    }

    /// Returns true for errors raised while validating input, before any process runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidHive(_)
                | Self::InvalidKeyPath(_)
                | Self::InvalidHost(_)
                | Self::InvalidArch(_)
                | Self::InvalidValueType(_)
                | Self::InvalidEncoding(_)
        )
    }
}
