use std::path::PathBuf;

use crate::core::job::ProductionJob;
use crate::core::params::PackagingMode;
use crate::labels::TemplateRegistry;
use crate::wizard::{GenerationIssue, Step, StepContent, WizardContext, parameter_issues};

/// Picks the production record to generate from.
#[derive(Debug, Clone)]
pub struct SelectJob {
    path: Option<PathBuf>,
    loaded: Option<Result<ProductionJob, String>>,
}

impl SelectJob {
    /// Load the job at `path` now; a load failure is reported by `validate`.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        let loaded = path
            .as_deref()
            .map(|p| ProductionJob::load(p).map_err(|err| format!("{err:#}")));
        Self { path, loaded }
    }

    pub fn from_job<P: Into<PathBuf>>(path: P, job: ProductionJob) -> Self {
        Self {
            path: Some(path.into()),
            loaded: Some(Ok(job)),
        }
    }
}

impl Step for SelectJob {
    fn setup_content(&self, ctx: &WizardContext) -> StepContent {
        let mut lines = vec![match &self.path {
            Some(path) => format!("selected: {}", path.display()),
            None => "selected: (none)".to_string(),
        }];
        if let Some(previous) = &ctx.job_path {
            lines.push(format!("previously committed: {}", previous.display()));
        }
        StepContent {
            title: "Job file",
            lines,
        }
    }

    fn validate(&self, _ctx: &WizardContext) -> Vec<GenerationIssue> {
        match &self.loaded {
            None => vec![GenerationIssue::MissingFile],
            Some(Err(message)) => vec![GenerationIssue::InvalidFile(message.clone())],
            Some(Ok(_)) => Vec::new(),
        }
    }

    /// A new job invalidates the mode chosen for the previous one.
    fn save_data(&self, ctx: &WizardContext) -> WizardContext {
        WizardContext {
            job_path: self.path.clone(),
            job: self.loaded.as_ref().and_then(|r| r.as_ref().ok()).cloned(),
            mode: None,
            ..ctx.clone()
        }
    }
}

/// Confirms the packaging mode, optionally overriding the job's value.
#[derive(Debug, Clone)]
pub struct ChooseMode {
    requested: Option<String>,
}

impl ChooseMode {
    pub fn new(requested: Option<String>) -> Self {
        Self { requested }
    }

    fn raw_mode<'a>(&'a self, ctx: &'a WizardContext) -> Option<&'a str> {
        self.requested
            .as_deref()
            .or_else(|| ctx.job.as_ref().map(|job| job.mode.as_str()))
            .filter(|raw| !raw.trim().is_empty())
    }
}

impl Step for ChooseMode {
    fn setup_content(&self, ctx: &WizardContext) -> StepContent {
        let current = self.raw_mode(ctx).unwrap_or("(none)");
        let options = PackagingMode::ALL
            .iter()
            .map(PackagingMode::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        StepContent {
            title: "Packaging mode",
            lines: vec![format!("mode: {current}"), format!("options: {options}")],
        }
    }

    fn validate(&self, ctx: &WizardContext) -> Vec<GenerationIssue> {
        match self.raw_mode(ctx) {
            None => vec![GenerationIssue::MissingMode],
            Some(raw) => match raw.parse::<PackagingMode>() {
                Ok(_) => Vec::new(),
                Err(_) => vec![GenerationIssue::InvalidMode(raw.to_string())],
            },
        }
    }

    fn save_data(&self, ctx: &WizardContext) -> WizardContext {
        let mode = self
            .raw_mode(ctx)
            .and_then(|raw| raw.parse::<PackagingMode>().ok());
        let job = match (&ctx.job, mode) {
            (Some(job), Some(mode)) => Some(ProductionJob {
                mode: mode.as_str().to_string(),
                ..job.clone()
            }),
            (job, _) => job.clone(),
        };
        WizardContext {
            job,
            mode,
            ..ctx.clone()
        }
    }
}

/// Operator overrides applied on top of the job's stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOverrides {
    pub seed: Option<String>,
    pub total_sheets: Option<i64>,
    pub sheets_per_box: Option<i64>,
    pub boxes_per_small_case: Option<i64>,
    pub small_cases_per_large_case: Option<i64>,
    pub is_overweight: Option<bool>,
}

impl ParamOverrides {
    pub fn apply(&self, job: &ProductionJob) -> ProductionJob {
        let mut next = job.clone();
        if let Some(seed) = &self.seed {
            next.seed = seed.clone();
        }
        if let Some(total) = self.total_sheets {
            next.total_sheets = total;
        }
        if let Some(value) = self.sheets_per_box {
            next.params.sheets_per_box = value;
        }
        if let Some(value) = self.boxes_per_small_case {
            next.params.boxes_per_small_case = value;
        }
        if let Some(value) = self.small_cases_per_large_case {
            next.params.small_cases_per_large_case = value;
        }
        if let Some(value) = self.is_overweight {
            next.params.is_overweight = value;
        }
        next
    }
}

/// Reviews sheet count, seed and packaging parameters.
#[derive(Debug, Clone)]
pub struct Parameters {
    overrides: ParamOverrides,
}

impl Parameters {
    pub fn new(overrides: ParamOverrides) -> Self {
        Self { overrides }
    }
}

impl Step for Parameters {
    fn setup_content(&self, ctx: &WizardContext) -> StepContent {
        let lines = match &ctx.job {
            Some(job) => {
                let job = self.overrides.apply(job);
                let p = job.params;
                vec![
                    format!("seed: {} -> {}", job.seed, job.seed_serial()),
                    format!("total sheets: {}", job.total_sheets),
                    format!("sheets per box: {}", p.sheets_per_box),
                    format!("boxes per small case: {}", p.boxes_per_small_case),
                    format!("small cases per large case: {}", p.small_cases_per_large_case),
                    format!("overweight: {}", p.is_overweight),
                ]
            }
            None => vec!["no job committed".to_string()],
        };
        StepContent {
            title: "Packaging parameters",
            lines,
        }
    }

    fn validate(&self, ctx: &WizardContext) -> Vec<GenerationIssue> {
        let Some(job) = &ctx.job else {
            return vec![GenerationIssue::MissingFile];
        };
        let Some(mode) = ctx.mode else {
            return vec![GenerationIssue::MissingMode];
        };
        parameter_issues(&self.overrides.apply(job), mode)
    }

    fn save_data(&self, ctx: &WizardContext) -> WizardContext {
        WizardContext {
            job: ctx.job.as_ref().map(|job| self.overrides.apply(job)),
            ..ctx.clone()
        }
    }
}

/// Selects the label layout by registry name.
#[derive(Debug, Clone)]
pub struct ChooseTemplate {
    name: Option<String>,
}

impl ChooseTemplate {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

impl Step for ChooseTemplate {
    fn setup_content(&self, _ctx: &WizardContext) -> StepContent {
        let mut lines = vec![format!("template: {}", self.name().unwrap_or("(none)"))];
        lines.extend(
            TemplateRegistry::list()
                .into_iter()
                .map(|tpl| format!("  {}: {}", tpl.name, tpl.description)),
        );
        StepContent {
            title: "Label template",
            lines,
        }
    }

    fn validate(&self, _ctx: &WizardContext) -> Vec<GenerationIssue> {
        match self.name() {
            None => vec![GenerationIssue::MissingTemplate],
            Some(name) if TemplateRegistry::get(name).is_err() => {
                vec![GenerationIssue::InvalidTemplate(name.to_string())]
            }
            Some(_) => Vec::new(),
        }
    }

    fn save_data(&self, ctx: &WizardContext) -> WizardContext {
        let template = self
            .name()
            .and_then(|name| TemplateRegistry::get(name).ok())
            .or(ctx.template);
        WizardContext {
            template,
            ..ctx.clone()
        }
    }
}

/// Step variants; the order comes from the list a `Wizard` is built with.
#[derive(Debug, Clone)]
pub enum WizardStep {
    SelectJob(SelectJob),
    ChooseMode(ChooseMode),
    Parameters(Parameters),
    ChooseTemplate(ChooseTemplate),
}

impl WizardStep {
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectJob(_) => "Job file",
            WizardStep::ChooseMode(_) => "Packaging mode",
            WizardStep::Parameters(_) => "Packaging parameters",
            WizardStep::ChooseTemplate(_) => "Label template",
        }
    }
}

impl Step for WizardStep {
    fn setup_content(&self, ctx: &WizardContext) -> StepContent {
        match self {
            WizardStep::SelectJob(s) => s.setup_content(ctx),
            WizardStep::ChooseMode(s) => s.setup_content(ctx),
            WizardStep::Parameters(s) => s.setup_content(ctx),
            WizardStep::ChooseTemplate(s) => s.setup_content(ctx),
        }
    }

    fn validate(&self, ctx: &WizardContext) -> Vec<GenerationIssue> {
        match self {
            WizardStep::SelectJob(s) => s.validate(ctx),
            WizardStep::ChooseMode(s) => s.validate(ctx),
            WizardStep::Parameters(s) => s.validate(ctx),
            WizardStep::ChooseTemplate(s) => s.validate(ctx),
        }
    }

    fn save_data(&self, ctx: &WizardContext) -> WizardContext {
        match self {
            WizardStep::SelectJob(s) => s.save_data(ctx),
            WizardStep::ChooseMode(s) => s.save_data(ctx),
            WizardStep::Parameters(s) => s.save_data(ctx),
            WizardStep::ChooseTemplate(s) => s.save_data(ctx),
        }
    }
}
