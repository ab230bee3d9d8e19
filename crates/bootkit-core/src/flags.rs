//! Global command-line flags shared by every subcommand

use crate::error::{BootstrapError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// When to colorize log output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorPolicy {
    /// Colorize only when the primary log sink is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        }
    }
}

impl FromStr for ColorPolicy {
    type Err = BootstrapError;

    /// Case-insensitive; an empty value means `auto`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(BootstrapError::InvalidColorPolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ColorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable output selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

/// Flags accepted before any subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonFlags {
    /// Config file or directory override
    pub config_path: Option<PathBuf>,
    /// Repeat count of `-v`
    pub verbose: u8,
    pub quiet: bool,
    pub debug: bool,
    pub trace: bool,
    /// Emit JSON output
    pub json: bool,
    /// Emit YAML output
    pub yaml: bool,
    pub no_color: bool,
    pub color: ColorPolicy,
    /// Skip every filesystem write during bootstrap
    pub dry_run: bool,
    /// Answer yes to confirmations (`--yes` / `--force`)
    pub assume_yes: bool,
    /// Handler timeout override, in seconds
    pub timeout_seconds: Option<u64>,
    /// Handler worker-pool override
    pub parallelism: Option<usize>,
    pub no_progress: bool,
    /// Timestamp every log line
    pub diagnostics: bool,
}

impl CommonFlags {
    /// Reject flag combinations that can never be satisfied.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::ConflictingOutputFormat`] when both `json`
    /// and `yaml` are set.
    pub fn validate(&self) -> Result<()> {
        if self.json && self.yaml {
            return Err(BootstrapError::ConflictingOutputFormat);
        }
        Ok(())
    }

    /// Requested output format; JSON wins if validation was skipped.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.yaml {
            OutputFormat::Yaml
        } else {
            OutputFormat::Human
        }
    }

    /// Color policy after `no_color`, which forces [`ColorPolicy::Never`].
    pub fn color_policy(&self) -> ColorPolicy {
        if self.no_color {
            ColorPolicy::Never
        } else {
            self.color
        }
    }
}
