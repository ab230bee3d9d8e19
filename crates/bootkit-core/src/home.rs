//! Canonical home directory resolution
//!
//! Every `~` substitution and every home-relative fallback directory goes
//! through [`home_dir`], so behavior is identical for the path resolver and
//! the path expander.
//!
//! # Precedence
//!
//! 1. `BOOTKIT_HOME` environment variable (if set and non-empty after trimming)
//! 2. `dirs::home_dir()` platform default
//!
//! On Windows `dirs::home_dir()` ignores `HOME` and `USERPROFILE`, so
//! integration tests must redirect the home directory with `BOOTKIT_HOME`:
//!
//! ```ignore
//! let temp_dir = tempfile::TempDir::new().unwrap();
//! let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("bootkit");
//! cmd.env("BOOTKIT_HOME", temp_dir.path());
//! ```

use crate::error::{BootstrapError, Result};
use std::path::PathBuf;

/// Environment variable that overrides the home directory.
pub const HOME_OVERRIDE_ENV: &str = "BOOTKIT_HOME";

/// Get the home directory.
///
/// # Errors
///
/// Returns [`BootstrapError::HomeDirectoryUnavailable`] when `BOOTKIT_HOME`
/// is unset or blank and the platform home directory cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_OVERRIDE_ENV) {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().ok_or(BootstrapError::HomeDirectoryUnavailable)
}
