//! Configuration loading
//!
//! Resolves configuration from multiple sources with priority:
//! 1. `<PREFIX>__SECTION__KEY` environment variables
//! 2. The config file (`config.toml`, created from a template on first run)
//! 3. Defaults

mod loader;
mod template;
mod types;

pub use loader::{ConfigInit, LoadedConfig, env_prefix};
pub use template::{default_config_document, write_default_config};
pub use types::{
    AppConfig, DEFAULT_FAIL_FAST, DEFAULT_LOG_LEVEL, DEFAULT_PROFILE, DEFAULT_TIMEOUT_SECS,
    LoggingConfig, PathsConfig, RuntimeConfig, default_parallelism,
};
