//! Configuration types

use crate::logging::LogLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Profile used when nothing else selects one.
pub const DEFAULT_PROFILE: &str = "default";
/// Log level used when nothing else selects one.
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;
/// Timeout substituted when `runtime.timeout` is absent after merging.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default for `runtime.fail_fast`.
pub const DEFAULT_FAIL_FAST: bool = true;

/// Complete configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(
    title = "bootkit configuration",
    extend("additionalProperties" = false)
)]
pub struct AppConfig {
    /// JSON Schema reference for editor support; ignored by the loader
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Active profile name
    pub profile: String,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Runtime tuning passed through to command handlers
    pub runtime: RuntimeConfig,
    /// Data/state directory overrides
    pub paths: PathsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema: None,
            profile: DEFAULT_PROFILE.to_string(),
            logging: LoggingConfig::default(),
            runtime: RuntimeConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Override the profile if a non-empty value is provided.
    #[must_use]
    pub fn with_profile_override(mut self, profile: Option<String>) -> Self {
        if let Some(profile) = profile.filter(|p| !p.is_empty()) {
            self.profile = profile;
        }
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(extend("additionalProperties" = false))]
pub struct LoggingConfig {
    /// Log level; unknown names fall back to `info`
    pub level: LogLevel,
    /// Optional log file. Supports `~` and environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            file: None,
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(extend("additionalProperties" = false))]
pub struct RuntimeConfig {
    /// Worker pool size; handlers fall back to the logical CPU count
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub parallelism: Option<usize>,
    /// Timeout in seconds for long-running operations
    #[serde(rename = "timeout", skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub timeout_seconds: Option<u64>,
    /// Stop on the first failing task
    pub fail_fast: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECS),
            fail_fast: DEFAULT_FAIL_FAST,
        }
    }
}

impl RuntimeConfig {
    /// Configured timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Data/state directory overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(extend("additionalProperties" = false))]
pub struct PathsConfig {
    /// Persistent data directory. Supports `~` and environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// State directory. Supports `~` and environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<String>,
}

/// Logical CPU count, or 1 when it cannot be determined.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
