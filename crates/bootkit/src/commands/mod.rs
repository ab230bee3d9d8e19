//! CLI command dispatch and execution

use anyhow::{Result, anyhow};
use bootkit_core::{BootstrapError, ColorPolicy, CommonFlags, RuntimeContext};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

mod config_cmd;
mod init;
mod output;
mod run;

/// bootkit - opinionated starting point for command-line tools
#[derive(Parser, Debug)]
#[command(
    name = "bootkit",
    version,
    about = "Opinionated starting point for command-line tools",
    long_about = "bootkit demonstrates structured commands, layered TOML configuration, \
                  XDG-style paths, and leveled logging"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand
#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    /// Override the config file path (a directory selects `<dir>/config.toml`)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Reduce output to only errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase logging verbosity (stackable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Enable trace logging (overrides other levels)
    #[arg(long, global = true)]
    trace: bool,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Output machine-readable YAML
    #[arg(long, global = true)]
    yaml: bool,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Color policy: auto, always, or never
    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    color: String,

    /// Do not change anything on disk
    #[arg(long, global = true)]
    dry_run: bool,

    /// Assume yes for confirmations (same as `init --force`)
    #[arg(short = 'y', long = "yes", global = true)]
    assume_yes: bool,

    /// Maximum seconds to allow an operation to run
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Override the degree of parallelism
    #[arg(long, global = true, value_name = "N")]
    parallel: Option<usize>,

    /// Disable progress indicators
    #[arg(long, global = true)]
    no_progress: bool,

    /// Prefix log lines with timestamps for troubleshooting
    #[arg(long, global = true)]
    diagnostics: bool,
}

impl GlobalArgs {
    fn into_flags(self) -> Result<CommonFlags, BootstrapError> {
        Ok(CommonFlags {
            config_path: self.config,
            verbose: self.verbose,
            quiet: self.quiet,
            debug: self.debug,
            trace: self.trace,
            json: self.json,
            yaml: self.yaml,
            no_color: self.no_color,
            color: self.color.parse::<ColorPolicy>()?,
            dry_run: self.dry_run,
            assume_yes: self.assume_yes,
            timeout_seconds: self.timeout,
            parallelism: self.parallel,
            no_progress: self.no_progress,
            diagnostics: self.diagnostics,
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute the primary behavior
    Run(run::RunArgs),

    /// Create the default config file
    Init(init::InitArgs),

    /// Inspect and manage configuration
    Config(config_cmd::ConfigArgs),
}

impl Cli {
    /// Bootstrap the runtime context, run the command, then close the context
    pub fn execute(self) -> Result<()> {
        let flags = self.global.into_flags()?;
        let mut ctx = RuntimeContext::bootstrap(flags)?;
        debug!(
            app = ctx.app(),
            config = %ctx.paths().config_file.display(),
            "dispatching command"
        );

        let result = match self.command {
            Commands::Run(args) => run::execute(&ctx, args),
            Commands::Init(args) => init::execute(&ctx, args),
            Commands::Config(args) => config_cmd::execute(&ctx, args),
        };
        if let Err(e) = &result {
            ctx.logger().debug(format_args!("command failed: {e}"));
        }

        let closed = ctx.close();
        if let Err(e) = &closed {
            debug!(error = %e, "closing runtime context failed");
        }
        result?;
        closed.map_err(|e| anyhow!("failed to close log output: {e}"))
    }
}
