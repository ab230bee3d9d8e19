//! Commented default config document written on first run

use super::types::{DEFAULT_FAIL_FAST, DEFAULT_LOG_LEVEL, DEFAULT_PROFILE, DEFAULT_TIMEOUT_SECS};
use crate::error::{BootstrapError, Result};
use std::fs;
use std::path::Path;

/// Render the default config document for `app`, stamped with its `path`.
///
/// Live values come from the same constants as `AppConfig::default()`;
/// optional fields appear as commented-out examples.
pub fn default_config_document(app: &str, path: &Path) -> String {
    format!(
        r#"# Configuration for {app}
# File: {path}

profile = "{DEFAULT_PROFILE}"

[logging]
# Valid levels: error, warn, info, debug, trace
level = "{DEFAULT_LOG_LEVEL}"
# Optional path for log file output; supports ~ and environment variables.
# file = "~/.local/state/{app}/{app}.log"

[runtime]
# Override the worker pool size; defaults to logical CPU count when unset.
# parallelism = 8
# Timeout in seconds for long-running operations.
timeout = {DEFAULT_TIMEOUT_SECS}
fail_fast = {DEFAULT_FAIL_FAST}

[paths]
# Uncomment to move persistent data/state to custom directories.
# data_dir = "$XDG_DATA_HOME/{app}"
# state_dir = "$XDG_STATE_HOME/{app}"
"#,
        path = path.display(),
    )
}

/// Write the default config document, creating parent directories.
///
/// Overwrites an existing file; callers decide whether that is allowed.
///
/// # Errors
///
/// Returns [`BootstrapError::ConfigWriteFailed`] if a parent directory or
/// the file itself cannot be written.
pub fn write_default_config(app: &str, path: &Path) -> Result<()> {
    let write_failed = |source| BootstrapError::ConfigWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    fs::write(path, default_config_document(app, path)).map_err(write_failed)
}
