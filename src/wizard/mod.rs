//! Step-by-step collection of a generation request.
//!
//! Each step sees the committed [`WizardContext`] read-only. Advancing
//! validates the current step and replaces the context wholesale with the
//! value returned by [`Step::save_data`]; nothing mutates a context in place.

mod steps;

pub use steps::{ChooseMode, ChooseTemplate, ParamOverrides, Parameters, SelectJob, WizardStep};

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::core::error::ValidationError;
use crate::core::job::ProductionJob;
use crate::core::params::PackagingMode;
use crate::core::plan::{PackagingPlan, plan};
use crate::labels::TemplateSpec;

/// Reasons generation cannot start, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationIssue {
    #[error("no job file selected")]
    MissingFile,
    #[error("job file is not usable: {0}")]
    InvalidFile(String),
    #[error("no packaging mode selected")]
    MissingMode,
    #[error("packaging mode '{0}' is not one of regular, separate, set")]
    InvalidMode(String),
    #[error("invalid packaging parameters: {0}")]
    InvalidParameters(String),
    #[error("no label template selected")]
    MissingTemplate,
    #[error("label template '{0}' does not exist")]
    InvalidTemplate(String),
}

/// What a step presents before it is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepContent {
    pub title: &'static str,
    pub lines: Vec<String>,
}

/// Capability shared by every wizard step.
pub trait Step {
    fn setup_content(&self, ctx: &WizardContext) -> StepContent;
    fn validate(&self, ctx: &WizardContext) -> Vec<GenerationIssue>;
    fn save_data(&self, ctx: &WizardContext) -> WizardContext;
}

/// Committed answers so far. Cloned and replaced, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct WizardContext {
    pub job_path: Option<PathBuf>,
    pub job: Option<ProductionJob>,
    pub mode: Option<PackagingMode>,
    pub template: Option<&'static TemplateSpec>,
}

impl WizardContext {
    /// Everything that still blocks generation; empty means ready.
    pub fn generation_issues(&self) -> Vec<GenerationIssue> {
        let mut issues = Vec::new();
        match &self.job {
            None => issues.push(GenerationIssue::MissingFile),
            Some(job) => {
                if let Some(mode) = self.mode {
                    issues.extend(parameter_issues(job, mode));
                }
            }
        }
        if self.mode.is_none() {
            issues.push(GenerationIssue::MissingMode);
        }
        if self.template.is_none() {
            issues.push(GenerationIssue::MissingTemplate);
        }
        issues
    }

    pub fn is_ready(&self) -> bool {
        self.generation_issues().is_empty()
    }

    /// Plan the committed job; `None` until a job and mode are committed.
    pub fn plan(&self) -> Option<Result<PackagingPlan, ValidationError>> {
        let job = self.job.as_ref()?;
        let mode = self.mode?;
        Some(plan(job.total_sheets, &job.seed_serial(), &job.params, mode))
    }
}

pub(crate) fn parameter_issues(job: &ProductionJob, mode: PackagingMode) -> Vec<GenerationIssue> {
    let mut issues = Vec::new();
    if job.total_sheets < 0 {
        issues.push(GenerationIssue::InvalidParameters(format!(
            "total sheet count must not be negative (got {})",
            job.total_sheets
        )));
    }
    issues.extend(
        job.params
            .issues(mode)
            .into_iter()
            .map(|issue| GenerationIssue::InvalidParameters(issue.to_string())),
    );
    issues
}

/// Ordered list of steps plus the committed context.
#[derive(Debug, Clone)]
pub struct Wizard {
    steps: Vec<WizardStep>,
    position: usize,
    context: WizardContext,
}

impl Wizard {
    pub fn new(steps: Vec<WizardStep>) -> Self {
        Self {
            steps,
            position: 0,
            context: WizardContext::default(),
        }
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    pub fn current(&self) -> Option<&WizardStep> {
        self.steps.get(self.position)
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.steps.len()
    }

    /// Content of the current step, rendered against the committed context.
    pub fn current_content(&self) -> Option<StepContent> {
        self.current().map(|step| step.setup_content(&self.context))
    }

    /// Validate the current step and commit it. On failure the context and
    /// position are left unchanged.
    pub fn advance(&mut self) -> Result<(), Vec<GenerationIssue>> {
        let Some(step) = self.steps.get(self.position) else {
            return Ok(());
        };
        let issues = step.validate(&self.context);
        if !issues.is_empty() {
            debug!(step = step.title(), issues = issues.len(), "wizard step rejected");
            return Err(issues);
        }
        let next = step.save_data(&self.context);
        info!(step = step.title(), "wizard step committed");
        self.context = next;
        self.position += 1;
        Ok(())
    }

    /// Go back one step. The committed context is kept.
    pub fn back(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Advance through every remaining step, then apply the final gate.
    pub fn run(mut self) -> Result<WizardContext, Vec<GenerationIssue>> {
        while !self.is_finished() {
            self.advance()?;
        }
        let issues = self.context.generation_issues();
        if issues.is_empty() {
            Ok(self.context)
        } else {
            Err(issues)
        }
    }
}
