//! Error types for the bootstrap sequence

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort construction of a runtime context.
///
/// Every variant is fatal to the invocation. Nothing is retried internally;
/// the message carries the offending path or flag value so the failure can be
/// diagnosed without a backtrace.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// No home directory could be determined and no environment override applied
    #[error("could not determine home directory (set HOME or BOOTKIT_HOME)")]
    HomeDirectoryUnavailable,

    /// A path value references an environment variable that is not set
    #[error("cannot expand '{value}': environment variable {variable} is not set")]
    UnsetVariable { value: String, variable: String },

    /// Config file exists but cannot be read or parsed
    #[error("config file {path} is unreadable: {source}")]
    ConfigFileUnreadable {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Merged configuration does not match the expected shape
    #[error("invalid configuration (file {path} plus environment overrides): {source}")]
    ConfigInvalid {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Writing the default config document failed
    #[error("failed to write default config to {path}: {source}")]
    ConfigWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A data or state directory could not be created
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configured log file could not be opened for append
    #[error("failed to open log file {path}: {source}")]
    LogFileOpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `--color` value outside auto/always/never
    #[error("invalid --color value '{value}' (expected auto, always, or never)")]
    InvalidColorPolicy { value: String },

    /// Both JSON and YAML output were requested
    #[error("--json and --yaml cannot be used together")]
    ConflictingOutputFormat,
}

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, BootstrapError>;
