//! Run command implementation

use anyhow::Result;
use bootkit_core::config::{DEFAULT_TIMEOUT_SECS, default_parallelism};
use bootkit_core::{AppConfig, CommonFlags, RuntimeContext};
use clap::Args;
use serde::Serialize;

use super::output::emit;

/// Execute the primary behavior
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task to run
    #[arg(default_value = "default")]
    task: String,

    /// Override the profile to run under
    #[arg(long)]
    profile: Option<String>,
}

/// Effective settings for one run
#[derive(Debug, PartialEq, Eq, Serialize)]
struct RunPlan {
    task: String,
    profile: String,
    parallelism: usize,
    timeout: u64,
}

/// Resolve the run settings: flags beat config, config beats defaults.
fn plan(config: &AppConfig, flags: &CommonFlags, args: RunArgs) -> RunPlan {
    let effective = config.clone().with_profile_override(args.profile);
    RunPlan {
        task: args.task,
        profile: effective.profile,
        parallelism: flags
            .parallelism
            .or(effective.runtime.parallelism)
            .unwrap_or_else(default_parallelism),
        timeout: flags
            .timeout_seconds
            .or(effective.runtime.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    }
}

/// Execute the run command
pub fn execute(ctx: &RuntimeContext, args: RunArgs) -> Result<()> {
    let plan = plan(ctx.config(), ctx.flags(), args);

    ctx.logger().info(format_args!(
        "running task {} with profile {}",
        plan.task, plan.profile
    ));

    emit(ctx.flags().output_format(), &plan, || {
        format!(
            "Running task {:?} with profile {:?} (parallelism: {}, timeout: {}s)",
            plan.task, plan.profile, plan.parallelism, plan.timeout
        )
    })
}
