//! XDG-style path discovery for config, data, state, and cache locations
//!
//! Each directory is resolved independently, in this order:
//!
//! | location | 1st                    | 2nd (Windows)            | 3rd                       | fallback                |
//! |----------|------------------------|--------------------------|---------------------------|-------------------------|
//! | config   | `$XDG_CONFIG_HOME/app` | `%APPDATA%\app`          | `dirs::config_dir()/app`  | `~/.config/app`         |
//! | data     | `$XDG_DATA_HOME/app`   | `%LOCALAPPDATA%\app`     | macOS `dirs::cache_dir()` | `~/.local/share/app`    |
//! | state    | `$XDG_STATE_HOME/app`  | `%LOCALAPPDATA%\app`     |                           | `~/.local/state/app`    |
//! | cache    | `$XDG_CACHE_HOME/app`  | `%LOCALAPPDATA%\app\cache` | `dirs::cache_dir()/app` | `~/.cache/app`          |

use crate::config::PathsConfig;
use crate::error::{BootstrapError, Result};
use crate::expand::{absolutize, expand_path};
use crate::home::home_dir;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the config document inside the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Resolved filesystem locations for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    /// Config document path (always set)
    pub config_file: PathBuf,
    /// Persistent data directory
    pub data_dir: PathBuf,
    /// State directory (history, locks, run records)
    pub state_dir: PathBuf,
    /// Cache directory, only filled by [`ResolvedPaths::with_cache_dir`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl ResolvedPaths {
    /// Discover paths for `app`, optionally overriding the config location.
    ///
    /// A non-empty override naming an existing directory resolves to
    /// `<override>/config.toml`; anything else is taken as the config file
    /// itself, after `~`/environment expansion.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::HomeDirectoryUnavailable`] when a
    /// home-relative fallback is required and no home directory exists, or
    /// [`BootstrapError::UnsetVariable`] when the override references an
    /// unset variable.
    pub fn discover(app: &str, override_path: Option<&Path>) -> Result<Self> {
        let expanded = match override_path.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => match path.to_str() {
                Some(text) => non_empty_expansion("--config", text)?,
                None => Some(absolutize(path)),
            },
            None => None,
        };
        let config_file = match expanded {
            Some(path) if path.is_dir() => path.join(CONFIG_FILENAME),
            Some(path) => path,
            None => default_config_dir(app)?.join(CONFIG_FILENAME),
        };

        let paths = Self {
            config_file,
            data_dir: default_data_dir(app)?,
            state_dir: default_state_dir(app)?,
            cache_dir: None,
        };
        debug!(config = %paths.config_file.display(), "discovered paths");
        Ok(paths)
    }

    /// Fill in the cache directory for callers that need one.
    pub fn with_cache_dir(mut self, app: &str) -> Result<Self> {
        self.cache_dir = Some(default_cache_dir(app)?);
        Ok(self)
    }

    /// Replace data/state directories with non-empty values from the config.
    ///
    /// A value that expands to nothing (for example `"${EMPTY}"`) keeps the
    /// discovered default. Pure: no filesystem access beyond the
    /// current-directory lookup used to absolutize relative overrides.
    ///
    /// # Errors
    ///
    /// Expansion errors from [`expand_path`], such as an unset variable.
    pub fn apply_overrides(mut self, overrides: &PathsConfig) -> Result<Self> {
        if let Some(dir) = overrides.data_dir.as_deref() {
            if let Some(dir) = non_empty_expansion("paths.data_dir", dir)? {
                self.data_dir = dir;
            }
        }
        if let Some(dir) = overrides.state_dir.as_deref() {
            if let Some(dir) = non_empty_expansion("paths.state_dir", dir)? {
                self.state_dir = dir;
            }
        }
        Ok(self)
    }

    /// Create the data and state directories.
    ///
    /// A no-op under dry-run. Creation is recursive and succeeds when the
    /// directory already exists; newly created directories are owner-only
    /// on Unix.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::DirectoryCreateFailed`] naming the first
    /// directory that could not be created.
    pub fn ensure_directories(&self, dry_run: bool) -> Result<()> {
        if dry_run {
            return Ok(());
        }

        for dir in [&self.data_dir, &self.state_dir] {
            if dir.as_os_str().is_empty() {
                continue;
            }
            create_dir_restricted(dir).map_err(|source| BootstrapError::DirectoryCreateFailed {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ResolvedPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "config: {}, data: {}, state: {}",
            self.config_file.display(),
            self.data_dir.display(),
            self.state_dir.display()
        )?;
        if let Some(cache) = &self.cache_dir {
            write!(f, ", cache: {}", cache.display())?;
        }
        Ok(())
    }
}

/// Expand, absolutize and clean `value`, or `None` when it is empty before or
/// after expansion.
fn non_empty_expansion(key: &str, value: &str) -> Result<Option<PathBuf>> {
    if value.is_empty() {
        return Ok(None);
    }
    let expanded = expand_path(value)?;
    if expanded.as_os_str().is_empty() {
        warn!(key, value, "path expands to nothing; keeping the default");
        return Ok(None);
    }
    Ok(Some(absolutize(&expanded)))
}

fn create_dir_restricted(dir: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

fn env_dir(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn windows_dir(name: &str) -> Option<PathBuf> {
    if cfg!(windows) { env_dir(name) } else { None }
}

fn home_fallback(segments: &[&str], app: &str) -> Result<PathBuf> {
    let mut path = home_dir()?;
    for segment in segments {
        path.push(segment);
    }
    path.push(app);
    Ok(absolutize(&path))
}

/// Default configuration directory for `app`.
pub fn default_config_dir(app: &str) -> Result<PathBuf> {
    if let Some(dir) = env_dir("XDG_CONFIG_HOME").or_else(|| windows_dir("APPDATA")) {
        return Ok(absolutize(&dir.join(app)));
    }
    if let Some(dir) = dirs::config_dir() {
        return Ok(absolutize(&dir.join(app)));
    }
    home_fallback(&[".config"], app)
}

/// Default data directory for `app`.
pub fn default_data_dir(app: &str) -> Result<PathBuf> {
    if let Some(dir) = env_dir("XDG_DATA_HOME").or_else(|| windows_dir("LOCALAPPDATA")) {
        return Ok(absolutize(&dir.join(app)));
    }
    if cfg!(target_os = "macos") {
        if let Some(dir) = dirs::cache_dir() {
            return Ok(absolutize(&dir.join(app)));
        }
    }
    home_fallback(&[".local", "share"], app)
}

/// Default state directory for `app`.
pub fn default_state_dir(app: &str) -> Result<PathBuf> {
    if let Some(dir) = env_dir("XDG_STATE_HOME").or_else(|| windows_dir("LOCALAPPDATA")) {
        return Ok(absolutize(&dir.join(app)));
    }
    home_fallback(&[".local", "state"], app)
}

/// Default cache directory for `app`.
pub fn default_cache_dir(app: &str) -> Result<PathBuf> {
    if let Some(dir) = env_dir("XDG_CACHE_HOME") {
        return Ok(absolutize(&dir.join(app)));
    }
    if let Some(dir) = windows_dir("LOCALAPPDATA") {
        return Ok(absolutize(&dir.join(app).join("cache")));
    }
    if let Some(dir) = dirs::cache_dir() {
        return Ok(absolutize(&dir.join(app)));
    }
    home_fallback(&[".cache"], app)
}
