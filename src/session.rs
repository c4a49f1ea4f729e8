//! Running a committed wizard context to files on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::error::{OutputError, ValidationError};
use crate::core::params::PackagingMode;
use crate::core::plan::{PackagingPlan, PlanTotals};
use crate::labels::{LabelRenderer, TemplateRegistry};
use crate::summary::{CartonSummary, CartonSummaryWriter};
use crate::wizard::{GenerationIssue, WizardContext};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("a generation is already running")]
    Busy,
    #[error("generation is blocked: {}", join_issues(.0))]
    Blocked(Vec<GenerationIssue>),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("failed to fingerprint plan: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

fn join_issues(issues: &[GenerationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Application-level "is generating" flag.
///
/// The planner itself is re-entrant; this only stops one front end from
/// starting a second run against the same record while one is in flight.
#[derive(Debug, Clone, Default)]
pub struct GenerationLock {
    busy: Arc<AtomicBool>,
}

impl GenerationLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag, or `None` when a run is already in progress.
    pub fn try_acquire(&self) -> Option<GenerationGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GenerationGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_generating(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears the flag when dropped.
#[derive(Debug)]
pub struct GenerationGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Which outputs to produce and where.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub out_dir: PathBuf,
    pub labels: bool,
    pub summary: bool,
}

impl GenerationOptions {
    pub fn new<P: Into<PathBuf>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.into(),
            labels: true,
            summary: true,
        }
    }
}

/// Outcome of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generated_at: DateTime<Utc>,
    pub mode: PackagingMode,
    pub template: String,
    pub fingerprint: String,
    pub totals: PlanTotals,
    pub summary: Option<CartonSummary>,
    pub files: Vec<PathBuf>,
}

/// Plan the committed job and write the requested outputs.
///
/// The plan is built before anything is written; an output failure leaves
/// no shared state behind, so the call can simply be repeated.
pub fn generate(
    lock: &GenerationLock,
    ctx: &WizardContext,
    options: &GenerationOptions,
) -> Result<GenerationReport, GenerateError> {
    let _guard = lock.try_acquire().ok_or(GenerateError::Busy)?;

    let issues = ctx.generation_issues();
    if !issues.is_empty() {
        return Err(GenerateError::Blocked(issues));
    }
    let (Some(job), Some(plan_result)) = (ctx.job.as_ref(), ctx.plan()) else {
        return Err(GenerateError::Blocked(vec![GenerationIssue::MissingFile]));
    };
    let plan = plan_result?;
    let template = ctx.template.unwrap_or(TemplateRegistry::default_template());

    info!(
        mode = %plan.mode(),
        boxes = plan.totals().box_count,
        large_cases = plan.totals().large_case_count,
        template = template.name,
        "generating outputs"
    );

    let mut files = Vec::new();
    if options.labels {
        let renderer = LabelRenderer::from_spec(template);
        files.extend(renderer.write(&plan, &job.names, &options.out_dir)?);
    }
    let summary = if options.summary {
        let summary = CartonSummary::from_plan(&plan, &job.names);
        files.push(CartonSummaryWriter::new(&options.out_dir).write(&summary, &job.names)?);
        Some(summary)
    } else {
        None
    };
    if files.is_empty() {
        warn!("generation produced no files");
    }

    Ok(report(&plan, template.name, summary, files)?)
}

fn report(
    plan: &PackagingPlan,
    template: &str,
    summary: Option<CartonSummary>,
    files: Vec<PathBuf>,
) -> Result<GenerationReport, serde_json::Error> {
    Ok(GenerationReport {
        generated_at: Utc::now(),
        mode: plan.mode(),
        template: template.to_string(),
        fingerprint: plan.fingerprint()?,
        totals: plan.totals(),
        summary,
        files,
    })
}

/// Write `report` as pretty JSON next to the outputs.
pub fn write_report(report: &GenerationReport, path: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, json).map_err(|err| OutputError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::ProductionJob;
    use crate::core::naming::ProductNames;
    use crate::core::params::PackageParams;
    use crate::wizard::{
        ChooseMode, ChooseTemplate, ParamOverrides, Parameters, SelectJob, Wizard, WizardStep,
    };
    use pretty_assertions::assert_eq;

    fn ready_context(mode: &str) -> WizardContext {
        let job = ProductionJob {
            names: ProductNames {
                customer: "ACME".into(),
                theme: "Spring".into(),
                chinese_name: "春日".into(),
                english_name: "Spring".into(),
                product_code: "P1".into(),
            },
            seed: "DSK01001".into(),
            total_sheets: 28500,
            mode: mode.into(),
            params: PackageParams::grouped(2850, 1, 2),
        };
        Wizard::new(vec![
            WizardStep::SelectJob(SelectJob::from_job("job.json", job)),
            WizardStep::ChooseMode(ChooseMode::new(None)),
            WizardStep::Parameters(Parameters::new(ParamOverrides::default())),
            WizardStep::ChooseTemplate(ChooseTemplate::new(Some("grid".into()))),
        ])
        .run()
        .unwrap()
    }

    #[test]
    fn lock_is_exclusive_until_guard_drops() {
        let lock = GenerationLock::new();
        let guard = lock.try_acquire().unwrap();
        assert!(lock.is_generating());
        assert!(lock.clone().try_acquire().is_none());
        drop(guard);
        assert!(!lock.is_generating());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn busy_lock_rejects_generation() {
        let dir = tempfile::tempdir().unwrap();
        let lock = GenerationLock::new();
        let _held = lock.try_acquire().unwrap();
        let err = generate(
            &lock,
            &ready_context("separate"),
            &GenerationOptions::new(dir.path()),
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::Busy));
    }

    #[test]
    fn blocked_context_reports_issues() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate(
            &GenerationLock::new(),
            &WizardContext::default(),
            &GenerationOptions::new(dir.path()),
        )
        .unwrap_err();
        match err {
            GenerateError::Blocked(issues) => assert_eq!(issues.len(), 3),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn generate_writes_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let lock = GenerationLock::new();
        let report = generate(
            &lock,
            &ready_context("separate"),
            &GenerationOptions::new(dir.path()),
        )
        .unwrap();
        assert!(!lock.is_generating());
        assert_eq!(
            report.files,
            vec![
                dir.path().join("ACME+Spring+盒标.pdf"),
                dir.path().join("ACME+Spring+箱标.pdf"),
                dir.path().join("外箱汇总-P1-Spring.xlsx"),
            ]
        );
        assert!(report.files.iter().all(|p| p.exists()));
        assert_eq!(
            report.summary,
            Some(CartonSummary::new("春日 Spring", 2850, 5, 2))
        );
        assert_eq!(report.fingerprint.len(), 64);
        assert_eq!(report.template, "grid");
    }

    #[test]
    fn outputs_can_be_switched_off() {
        let dir = tempfile::tempdir().unwrap();
        let options = GenerationOptions {
            out_dir: dir.path().to_path_buf(),
            labels: false,
            summary: true,
        };
        let report = generate(&GenerationLock::new(), &ready_context("regular"), &options).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.summary.map(|s| s.total_large_boxes), Some(10));
    }

    #[test]
    fn reports_serialize_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = generate(
            &GenerationLock::new(),
            &ready_context("set"),
            &GenerationOptions::new(dir.path()),
        )
        .unwrap();
        let path = dir.path().join("report.json");
        write_report(&report, &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["mode"], "set");
        assert_eq!(value["totals"]["box_count"], 10);
    }

    #[test]
    fn report_write_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let report = generate(
            &GenerationLock::new(),
            &ready_context("regular"),
            &GenerationOptions::new(dir.path()),
        )
        .unwrap();
        let path = dir.path().join("missing").join("report.json");
        match write_report(&report, &path).unwrap_err() {
            OutputError::Io { path: failed, .. } => assert!(failed.ends_with("report.json")),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn serde_failures_have_their_own_variant() {
        let err: OutputError = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(matches!(err, OutputError::Serialize(_)));
        assert!(err.to_string().starts_with("failed to serialize"));
    }
}
