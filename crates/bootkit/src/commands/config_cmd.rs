//! Config command implementation

use anyhow::{Context, Result};
use bootkit_core::config::write_default_config;
use bootkit_core::schema::config_schema;
use bootkit_core::{OutputFormat, RuntimeContext};
use clap::{Args, Subcommand};

use super::output::{emit, render};

/// Inspect and manage configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Output the effective configuration
    Show,

    /// Print the resolved config file path
    Path,

    /// Print all resolved paths (config, data, state, cache)
    Paths,

    /// Print the JSON schema for the config file
    Schema,

    /// Regenerate the default configuration file
    Reset,
}

/// Execute a config subcommand
pub fn execute(ctx: &RuntimeContext, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Path => {
            println!("{}", ctx.paths().config_file.display());
            Ok(())
        }
        ConfigCommand::Paths => paths(ctx),
        ConfigCommand::Schema => schema(ctx),
        ConfigCommand::Reset => reset(ctx),
    }
}

fn show(ctx: &RuntimeContext) -> Result<()> {
    let config = ctx.config();
    match render(ctx.flags().output_format(), config)? {
        Some(text) => print!("{text}"),
        None => print!(
            "{}",
            toml::to_string_pretty(config).context("failed to render config as TOML")?
        ),
    }
    Ok(())
}

fn paths(ctx: &RuntimeContext) -> Result<()> {
    let paths = ctx.paths().clone().with_cache_dir(ctx.app())?;
    emit(ctx.flags().output_format(), &paths, || {
        let cache = paths
            .cache_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        format!(
            "config: {}\ndata:   {}\nstate:  {}\ncache:  {}",
            paths.config_file.display(),
            paths.data_dir.display(),
            paths.state_dir.display(),
            cache
        )
    })
}

fn schema(ctx: &RuntimeContext) -> Result<()> {
    let schema = config_schema();
    match ctx.flags().output_format() {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(schema)?),
        OutputFormat::Json | OutputFormat::Human => {
            println!("{}", serde_json::to_string_pretty(schema)?);
        }
    }
    Ok(())
}

fn reset(ctx: &RuntimeContext) -> Result<()> {
    let path = &ctx.paths().config_file;
    if ctx.flags().dry_run {
        ctx.logger()
            .info(format_args!("dry-run: would reset config at {}", path.display()));
        return Ok(());
    }

    write_default_config(ctx.app(), path)?;
    ctx.logger()
        .info(format_args!("reset config at {}", path.display()));
    Ok(())
}
