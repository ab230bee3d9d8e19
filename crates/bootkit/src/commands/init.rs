//! Init command implementation

use anyhow::{Result, bail};
use bootkit_core::config::write_default_config;
use bootkit_core::{ConfigInit, RuntimeContext};
use clap::Args;

/// Create the default config file
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Recreate the configuration even if it already exists
    #[arg(long)]
    force: bool,
}

/// Execute the init command
pub fn execute(ctx: &RuntimeContext, args: InitArgs) -> Result<()> {
    let path = &ctx.paths().config_file;

    // Bootstrap already wrote (or would have written) a missing file.
    match ctx.config_init() {
        ConfigInit::Created | ConfigInit::DryRunSkipped => return Ok(()),
        ConfigInit::Existing => {}
    }

    if !(args.force || ctx.flags().assume_yes) {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if ctx.flags().dry_run {
        ctx.logger().info(format_args!(
            "dry-run: would write default config to {}",
            path.display()
        ));
        return Ok(());
    }

    write_default_config(ctx.app(), path)?;
    ctx.logger()
        .info(format_args!("wrote default config to {}", path.display()));
    Ok(())
}
