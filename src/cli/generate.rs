//! Output generation (`cartonize generate`).

use std::path::PathBuf;

use anyhow::Result;
use cartonize::session::write_report;
use cartonize::wizard::ChooseTemplate;
use cartonize::{GenerationLock, GenerationOptions, Wizard, WizardStep, generate};
use clap::Args;

use crate::cli::common::JobArgs;
use crate::cli::utils::issue_report;

/// Arguments for `cartonize generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub job: JobArgs,
    /// Output directory for labels and summary.
    #[arg(long)]
    pub out: PathBuf,
    /// Label template name (see `cartonize template list`).
    #[arg(long, default_value = "single")]
    pub template: String,
    /// Skip the box and case label PDFs.
    #[arg(long)]
    pub no_labels: bool,
    /// Skip the carton summary workbook.
    #[arg(long)]
    pub no_summary: bool,
    /// Also write the generation report as JSON to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn handle(args: GenerateArgs) -> Result<()> {
    let mut steps = args.job.steps();
    steps.push(WizardStep::ChooseTemplate(ChooseTemplate::new(Some(
        args.template.clone(),
    ))));
    let ctx = Wizard::new(steps)
        .run()
        .map_err(|issues| issue_report("cannot generate:", &issues))?;

    let options = GenerationOptions {
        out_dir: args.out.clone(),
        labels: !args.no_labels,
        summary: !args.no_summary,
    };
    let report = generate(&GenerationLock::new(), &ctx, &options)?;

    println!(
        "Generated {} boxes, {} small cases, {} large cases ({} template)",
        report.totals.box_count,
        report.totals.small_case_count,
        report.totals.large_case_count,
        report.template
    );
    for path in &report.files {
        println!("  {}", path.display());
    }
    println!("fingerprint {}", report.fingerprint);
    if let Some(path) = &args.report {
        write_report(&report, path)?;
        println!("report {}", path.display());
    }
    Ok(())
}
