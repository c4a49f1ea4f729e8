//! Shared clap helper types for CLI commands.

use std::path::PathBuf;

use cartonize::PackagingMode;
use cartonize::wizard::{ChooseMode, ParamOverrides, Parameters, SelectJob, WizardStep};
use clap::{Args, ValueEnum};

/// Packaging modes accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    Regular,
    Separate,
    Set,
}

impl From<ModeArg> for PackagingMode {
    fn from(value: ModeArg) -> PackagingMode {
        match value {
            ModeArg::Regular => PackagingMode::Regular,
            ModeArg::Separate => PackagingMode::Separate,
            ModeArg::Set => PackagingMode::Set,
        }
    }
}

/// Job file plus per-field overrides, shared by `plan` and `generate`.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Production job file (JSON).
    #[arg(long)]
    pub job: PathBuf,
    /// Override the seed serial.
    #[arg(long)]
    pub seed: Option<String>,
    /// Override the total sheet count.
    #[arg(long = "sheets", allow_negative_numbers = true)]
    pub total_sheets: Option<i64>,
    /// Override the packaging mode.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    #[arg(long, allow_negative_numbers = true)]
    pub sheets_per_box: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub boxes_per_small_case: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub small_cases_per_large_case: Option<i64>,
    /// Mark the job as overweight (set mode only).
    #[arg(long)]
    pub overweight: bool,
}

impl JobArgs {
    pub fn overrides(&self) -> ParamOverrides {
        ParamOverrides {
            seed: self.seed.clone(),
            total_sheets: self.total_sheets,
            sheets_per_box: self.sheets_per_box,
            boxes_per_small_case: self.boxes_per_small_case,
            small_cases_per_large_case: self.small_cases_per_large_case,
            is_overweight: self.overweight.then_some(true),
        }
    }

    /// Job, mode and parameter steps in the order they are committed.
    pub fn steps(&self) -> Vec<WizardStep> {
        let mode = self
            .mode
            .map(|m| PackagingMode::from(m).as_str().to_string());
        vec![
            WizardStep::SelectJob(SelectJob::from_path(Some(self.job.clone()))),
            WizardStep::ChooseMode(ChooseMode::new(mode)),
            WizardStep::Parameters(Parameters::new(self.overrides())),
        ]
    }
}
