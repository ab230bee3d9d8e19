//! Application bootstrap for the `bootkit` command-line tool
//!
//! This crate turns the global command-line flags into a ready
//! [`RuntimeContext`]:
//!
//! - [`paths`] resolves XDG-style config, data, state, and cache locations
//! - [`expand`] handles `~` and `$VAR` expansion in path-like values
//! - [`config`] layers defaults, the TOML config file, and `BOOTKIT__*`
//!   environment variables into one [`AppConfig`]
//! - [`logging`] derives log settings from flags and config and builds the
//!   invocation [`Logger`]
//! - [`context`] runs those stages in order and owns the result
//!
//! ```no_run
//! use bootkit_core::{CommonFlags, RuntimeContext};
//!
//! let mut ctx = RuntimeContext::bootstrap(CommonFlags::default())?;
//! ctx.logger().info(format_args!("profile {}", ctx.config().profile));
//! ctx.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod expand;
pub mod flags;
pub mod home;
pub mod logging;
pub mod paths;
pub mod schema;

pub use config::{AppConfig, ConfigInit, LoggingConfig, PathsConfig, RuntimeConfig};
pub use context::{RuntimeContext, Stage};
pub use error::{BootstrapError, Result};
pub use flags::{ColorPolicy, CommonFlags, OutputFormat};
pub use logging::{LogLevel, LogSettings, LogTarget, Logger};
pub use paths::ResolvedPaths;

/// Application name used for directory names and the environment prefix.
pub const APP_NAME: &str = "bootkit";
