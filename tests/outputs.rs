use std::fs;
use std::io::Read;
use std::path::Path;

use cartonize::wizard::{ChooseMode, ChooseTemplate, ParamOverrides, Parameters, SelectJob};
use cartonize::{
    GenerationIssue, GenerationLock, GenerationOptions, Wizard, WizardStep, generate,
};
use lopdf::Document;
use pretty_assertions::assert_eq;
use zip::ZipArchive;

const JOB: &str = r#"{
    "customer": "ACME/EU",
    "theme": "Spring Tarot",
    "chinese_name": "春日塔罗",
    "english_name": "Spring Tarot",
    "product_code": "ST-01",
    "seed": "MCH0102",
    "total_sheets": 28500,
    "mode": "separate",
    "params": {
        "sheets_per_box": 2850,
        "boxes_per_small_case": 1,
        "small_cases_per_large_case": 2
    }
}"#;

fn write_job(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("job.json");
    fs::write(&path, body).unwrap();
    path
}

fn steps(job: &Path, mode: Option<&str>, overrides: ParamOverrides) -> Vec<WizardStep> {
    vec![
        WizardStep::SelectJob(SelectJob::from_path(Some(job.to_path_buf()))),
        WizardStep::ChooseMode(ChooseMode::new(mode.map(String::from))),
        WizardStep::Parameters(Parameters::new(overrides)),
        WizardStep::ChooseTemplate(ChooseTemplate::new(Some("grid".into()))),
    ]
}

fn sheet_xml(path: &Path) -> String {
    let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut xml = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[test]
fn job_file_generates_labels_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(dir.path(), JOB);
    let out = dir.path().join("out");

    let ctx = Wizard::new(steps(&job, None, ParamOverrides::default()))
        .run()
        .unwrap();
    let report = generate(&GenerationLock::new(), &ctx, &GenerationOptions::new(&out)).unwrap();

    assert_eq!(
        report.files,
        vec![
            out.join("ACME_EU+Spring Tarot+盒标.pdf"),
            out.join("ACME_EU+Spring Tarot+箱标.pdf"),
            out.join("外箱汇总-ST-01-Spring Tarot.xlsx"),
        ]
    );

    let boxes = Document::load(&report.files[0]).unwrap();
    assert_eq!(boxes.get_pages().len(), 1);

    let xml = sheet_xml(&report.files[2]);
    assert!(xml.contains("春日塔罗 Spring Tarot"));
    assert!(xml.contains("<v>2850</v>"));
    assert!(xml.contains("<v>5</v>"));
    assert!(xml.contains("<v>2</v>"));
    assert_eq!(xml.matches("<row ").count(), 2);
}

#[test]
fn overrides_flow_into_the_plan() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(dir.path(), JOB);
    let overrides = ParamOverrides {
        total_sheets: Some(100),
        sheets_per_box: Some(10),
        ..ParamOverrides::default()
    };
    let ctx = Wizard::new(steps(&job, Some("regular"), overrides))
        .run()
        .unwrap();
    let plan = ctx.plan().unwrap().unwrap();
    assert_eq!(plan.totals().box_count, 10);
    assert_eq!(plan.large_cases().len(), 0);

    let out = dir.path().join("out");
    let report = generate(&GenerationLock::new(), &ctx, &GenerationOptions::new(&out)).unwrap();
    // no case labels in regular mode
    assert_eq!(report.files.len(), 2);
    assert!(!out.join("ACME_EU+Spring Tarot+箱标.pdf").exists());
}

#[test]
fn broken_job_file_is_reported_as_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(dir.path(), "{ not json");
    let err = Wizard::new(steps(&job, None, ParamOverrides::default()))
        .run()
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(matches!(
        &err[0],
        GenerationIssue::InvalidFile(msg) if msg.contains("failed to parse")
    ));
}

#[test]
fn invalid_parameters_block_generation() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(dir.path(), JOB);
    let overrides = ParamOverrides {
        boxes_per_small_case: Some(0),
        ..ParamOverrides::default()
    };
    let err = Wizard::new(steps(&job, None, overrides)).run().unwrap_err();
    assert_eq!(
        err,
        vec![GenerationIssue::InvalidParameters(
            "boxes_per_small_case must be greater than zero (got 0)".into()
        )]
    );
}

#[test]
fn failed_write_leaves_plan_reusable() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(dir.path(), JOB);
    let ctx = Wizard::new(steps(&job, None, ParamOverrides::default()))
        .run()
        .unwrap();

    // a regular file where the output directory should be
    let blocked = dir.path().join("blocked");
    fs::write(&blocked, b"").unwrap();
    let lock = GenerationLock::new();
    assert!(generate(&lock, &ctx, &GenerationOptions::new(&blocked)).is_err());
    assert!(!lock.is_generating());

    let retry = generate(&lock, &ctx, &GenerationOptions::new(dir.path().join("out"))).unwrap();
    assert_eq!(retry.files.len(), 3);
}
