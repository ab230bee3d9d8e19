//! Layered configuration loading
//!
//! Layers, lowest to highest priority:
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. The TOML config file (written from the default template on first run)
//! 3. `<PREFIX>__SECTION__KEY` environment variables
//!
//! Layers are merged as TOML tables before a single typed decode, so each
//! field is taken from the highest layer that sets it.

use super::template::write_default_config;
use super::types::{AppConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{BootstrapError, Result};
use crate::expand::expand_path;
use crate::schema;
use std::io::ErrorKind;
use std::path::Path;
use toml::{Table, Value};
use tracing::{debug, warn};

/// What happened to the config file while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigInit {
    /// The file already existed
    Existing,
    /// The file was missing and the default document was written
    Created,
    /// The file was missing and dry-run prevented writing it
    DryRunSkipped,
}

/// Merged configuration plus the first-run outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub init: ConfigInit,
}

/// Environment prefix for `app`: upper-cased, non-alphanumerics mapped to `_`.
///
/// `env_prefix("bootkit")` is `BOOTKIT`, so `logging.level` is read from
/// `BOOTKIT__LOGGING__LEVEL`.
pub fn env_prefix(app: &str) -> String {
    app.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

impl AppConfig {
    /// Load the effective configuration, writing the default file if missing.
    ///
    /// Under dry-run a missing file is reported as
    /// [`ConfigInit::DryRunSkipped`] and loading proceeds from defaults and
    /// environment only.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::ConfigFileUnreadable`] if the file cannot be
    ///   inspected, read, or parsed as TOML
    /// - [`BootstrapError::ConfigWriteFailed`] if the default file cannot be
    ///   written
    /// - [`BootstrapError::ConfigInvalid`] if the merged document does not fit
    ///   the expected shape
    pub fn load_or_init(app: &str, config_file: &Path, dry_run: bool) -> Result<LoadedConfig> {
        let init = match std::fs::metadata(config_file) {
            Ok(_) => ConfigInit::Existing,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if dry_run {
                    ConfigInit::DryRunSkipped
                } else {
                    write_default_config(app, config_file)?;
                    debug!(path = %config_file.display(), "wrote default config");
                    ConfigInit::Created
                }
            }
            Err(e) => {
                return Err(BootstrapError::ConfigFileUnreadable {
                    path: config_file.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        let config = Self::load_layers(config_file, &env_prefix(app), env_vars())?;
        Ok(LoadedConfig { config, init })
    }

    /// Merge defaults, the file at `config_file`, and `vars` filtered by
    /// `prefix`. A missing file contributes nothing.
    ///
    /// After merging, `logging.file` is expanded and an absent
    /// `runtime.timeout` becomes the default.
    pub fn load_layers<I>(config_file: &Path, prefix: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = default_layer();
        merge_tables(&mut merged, file_layer(config_file)?);
        merge_tables(&mut merged, env_layer(prefix, vars));

        for key in schema::unknown_keys(&merged) {
            warn!(key = %key, path = %config_file.display(), "ignoring unknown config key");
        }

        let mut config: AppConfig =
            Value::Table(merged)
                .try_into()
                .map_err(|source| BootstrapError::ConfigInvalid {
                    path: config_file.to_path_buf(),
                    source,
                })?;

        config.logging.file = match config.logging.file.take().filter(|f| !f.is_empty()) {
            Some(file) => Some(expand_path(&file)?.display().to_string()),
            None => None,
        };
        config
            .runtime
            .timeout_seconds
            .get_or_insert(DEFAULT_TIMEOUT_SECS);

        Ok(config)
    }
}

/// Process environment as UTF-8 pairs; non-UTF-8 entries are skipped.
fn env_vars() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

fn default_layer() -> Table {
    match Value::try_from(AppConfig::default()) {
        Ok(Value::Table(table)) => table,
        Ok(_) => Table::new(),
        Err(e) => {
            warn!(error = %e, "failed to render default config layer");
            Table::new()
        }
    }
}

fn file_layer(path: &Path) -> Result<Table> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Table::new()),
        Err(e) => {
            return Err(BootstrapError::ConfigFileUnreadable {
                path: path.to_path_buf(),
                source: Box::new(e),
            });
        }
    };

    contents
        .parse::<Table>()
        .map_err(|e| BootstrapError::ConfigFileUnreadable {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
}

/// Build a table from `<prefix>__SECTION__KEY=value` pairs.
///
/// Segments are lower-cased; empty values and malformed keys are skipped.
/// Values are typed after the schema entry for their key, falling back to
/// integer, then boolean, then string.
fn env_layer<I>(prefix: &str, vars: I) -> Table
where
    I: IntoIterator<Item = (String, String)>,
{
    let marker = format!("{prefix}__");
    let mut table = Table::new();

    for (key, raw) in vars {
        let Some(rest) = key.strip_prefix(&marker) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        let segments: Vec<String> = rest.split("__").map(str::to_ascii_lowercase).collect();
        if segments.iter().any(String::is_empty) {
            debug!(var = %key, "skipping malformed config environment variable");
            continue;
        }

        let path: Vec<&str> = segments.iter().map(String::as_str).collect();
        let value = typed_value(&raw, schema::property_type(&path));
        debug!(var = %key, key = %path.join("."), "config override from environment");
        insert_path(&mut table, &path, value);
    }

    table
}

fn typed_value(raw: &str, kind: Option<&str>) -> Value {
    let string = || Value::String(raw.to_string());
    match kind {
        Some("string") => string(),
        Some("integer") => raw.trim().parse().map(Value::Integer).unwrap_or_else(|_| string()),
        Some("boolean") => parse_bool(raw).map(Value::Boolean).unwrap_or_else(string),
        _ => raw
            .trim()
            .parse()
            .map(Value::Integer)
            .ok()
            .or_else(|| parse_bool(raw).map(Value::Boolean))
            .unwrap_or_else(string),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn insert_path(table: &mut Table, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = table;
    for segment in parents {
        let entry = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        let Value::Table(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert((*last).to_string(), value);
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; any other
/// value replaces what was there.
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        if let Value::Table(incoming) = value {
            if let Some(Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}
