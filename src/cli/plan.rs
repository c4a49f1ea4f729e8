//! Plan inspection (`cartonize plan`).

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use cartonize::Wizard;
use clap::Args;

use crate::cli::common::JobArgs;
use crate::cli::utils::{commit_all, write_output};

/// Arguments for `cartonize plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub job: JobArgs,
    /// Print the plan as JSON instead of a listing.
    #[arg(long)]
    pub json: bool,
    /// Destination file, or `-` for stdout.
    #[arg(long, default_value = "-")]
    pub out: PathBuf,
}

pub fn handle(args: PlanArgs) -> Result<()> {
    let ctx = commit_all(Wizard::new(args.job.steps()))?;
    let plan = ctx
        .plan()
        .ok_or_else(|| anyhow!("job and mode must be committed before planning"))??;

    let mut content = if args.json {
        serde_json::to_string_pretty(&plan).context("failed to serialize plan")?
    } else {
        let mut listing = plan.render_listing();
        listing.push_str(&format!("fingerprint {}", plan.fingerprint()?));
        listing
    };
    content.push('\n');
    write_output(&args.out, &content)
}
