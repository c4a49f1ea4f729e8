//! Box and carton label rendering.
//!
//! A plan is first flattened into [`LabelSheet`]s (plain text per label),
//! then laid out by a [`LabelTemplate`] into PDF pages.

mod paint;
mod templates;

pub use paint::{POINTS_PER_MM, mm_to_pt, pdf_text};
pub use templates::{
    GridLabel, LabelTemplate, SingleLabel, TemplateKind, TemplateRegistry, TemplateSpec,
};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::info;

use crate::core::error::OutputError;
use crate::core::naming::ProductNames;
use crate::core::plan::PackagingPlan;

/// Text printed on one label: a prominent title and detail lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub title: String,
    pub lines: Vec<String>,
}

/// Ordered labels destined for one PDF file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSheet {
    pub labels: Vec<Label>,
}

impl LabelSheet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// One label per box, in plan order.
    pub fn for_boxes(plan: &PackagingPlan) -> Self {
        let total = plan.totals().box_count;
        let labels = plan
            .boxes()
            .map(|b| Label {
                title: b.serial.clone(),
                lines: vec![
                    format!("BOX {}/{}", b.index, total),
                    format!("{} SHEETS", b.sheet_count),
                ],
            })
            .collect();
        Self { labels }
    }

    /// One label per large case; empty for regular plans.
    pub fn for_cases(plan: &PackagingPlan) -> Self {
        let total = plan.totals().large_case_count;
        let labels = plan
            .large_cases()
            .iter()
            .map(|case| Label {
                title: format!("CASE {}/{}", case.index, total),
                lines: vec![
                    format!("FROM {}", case.serial_range.first),
                    format!("TO {}", case.serial_range.last),
                    format!("{} BOXES", case.total_box_count),
                ],
            })
            .collect();
        Self { labels }
    }
}

/// Label documents for a plan, before they are written anywhere.
#[derive(Debug, Clone)]
pub struct RenderedLabels {
    pub boxes: Option<Document>,
    pub cases: Option<Document>,
}

/// Renders plans through one template and writes the filed PDFs.
#[derive(Debug, Clone, Copy)]
pub struct LabelRenderer {
    template: TemplateKind,
}

impl LabelRenderer {
    pub fn new(template: TemplateKind) -> Self {
        Self { template }
    }

    pub fn from_spec(spec: &TemplateSpec) -> Self {
        Self::new(spec.kind)
    }

    /// Build documents; sheets without labels produce no document.
    pub fn render(&self, plan: &PackagingPlan) -> Result<RenderedLabels, OutputError> {
        let boxes = LabelSheet::for_boxes(plan);
        let cases = LabelSheet::for_cases(plan);
        Ok(RenderedLabels {
            boxes: self.build_non_empty(&boxes)?,
            cases: self.build_non_empty(&cases)?,
        })
    }

    fn build_non_empty(&self, sheet: &LabelSheet) -> Result<Option<Document>, OutputError> {
        if sheet.is_empty() {
            return Ok(None);
        }
        self.template.build(sheet).map(Some)
    }

    /// Write `{customer}+{theme}+盒标.pdf` and, when the plan has cases,
    /// `{customer}+{theme}+箱标.pdf`. Returns the paths written.
    pub fn write(
        &self,
        plan: &PackagingPlan,
        names: &ProductNames,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, OutputError> {
        let rendered = self.render(plan)?;
        fs::create_dir_all(out_dir).map_err(|err| OutputError::io(out_dir, err))?;

        let mut written = Vec::new();
        let targets = [
            (rendered.boxes, names.box_label_file_name()),
            (rendered.cases, names.case_label_file_name()),
        ];
        for (document, file_name) in targets {
            let path = out_dir.join(file_name);
            match document {
                Some(mut doc) => {
                    save_document(&mut doc, &path)?;
                    info!(path = %path.display(), template = self.template.name(), "wrote labels");
                    written.push(path);
                }
                None => info!(path = %path.display(), "no labels to write; skipped"),
            }
        }
        Ok(written)
    }
}

fn save_document(doc: &mut Document, path: &Path) -> Result<(), OutputError> {
    doc.compress();
    let mut file = BufWriter::new(File::create(path).map_err(|err| OutputError::io(path, err))?);
    doc.save_to(&mut file)?;
    file.flush().map_err(|err| OutputError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::{PackageParams, PackagingMode};
    use crate::core::plan::plan;
    use crate::core::serial::parse;
    use pretty_assertions::assert_eq;

    fn names() -> ProductNames {
        ProductNames {
            customer: "ACME".into(),
            theme: "Spring".into(),
            ..ProductNames::default()
        }
    }

    fn separate_plan() -> PackagingPlan {
        plan(
            100,
            &parse("MCH0102"),
            &PackageParams::grouped(10, 4, 2),
            PackagingMode::Separate,
        )
        .unwrap()
    }

    #[test]
    fn box_sheet_follows_plan_order() {
        let sheet = LabelSheet::for_boxes(&separate_plan());
        assert_eq!(sheet.len(), 10);
        assert_eq!(sheet.labels[0].title, "MCH0102-01");
        assert_eq!(sheet.labels[9].title, "MCH0104-02");
        assert_eq!(sheet.labels[9].lines, vec!["BOX 10/10", "10 SHEETS"]);
    }

    #[test]
    fn case_sheet_carries_ranges() {
        let sheet = LabelSheet::for_cases(&separate_plan());
        assert_eq!(
            sheet.labels[0],
            Label {
                title: "CASE 1/2".into(),
                lines: vec![
                    "FROM MCH0102-01".into(),
                    "TO MCH0103-04".into(),
                    "8 BOXES".into()
                ],
            }
        );
    }

    #[test]
    fn regular_plan_has_no_case_document() {
        let plan = plan(
            30,
            &parse("DSK01001"),
            &PackageParams::regular(10),
            PackagingMode::Regular,
        )
        .unwrap();
        let rendered = LabelRenderer::from_spec(TemplateRegistry::default_template())
            .render(&plan)
            .unwrap();
        assert_eq!(rendered.boxes.map(|d| d.get_pages().len()), Some(3));
        assert!(rendered.cases.is_none());
    }

    #[test]
    fn write_uses_filing_names() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = LabelRenderer::from_spec(TemplateRegistry::get("grid").unwrap());
        let written = renderer.write(&separate_plan(), &names(), dir.path()).unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join("ACME+Spring+盒标.pdf"),
                dir.path().join("ACME+Spring+箱标.pdf"),
            ]
        );
        let boxes = Document::load(&written[0]).unwrap();
        assert_eq!(boxes.get_pages().len(), 1);
        let cases = Document::load(&written[1]).unwrap();
        assert_eq!(cases.get_pages().len(), 1);
    }

    #[test]
    fn serial_outside_font_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(
            10,
            &parse("盒A007"),
            &PackageParams::regular(10),
            PackagingMode::Regular,
        )
        .unwrap();
        assert_eq!(plan.boxes().next().map(|b| b.serial.as_str()), Some("盒A007"));

        let renderer = LabelRenderer::from_spec(TemplateRegistry::default_template());
        let err = renderer.write(&plan, &names(), dir.path()).unwrap_err();
        assert!(matches!(&err, OutputError::Layout(msg) if msg.contains("盒A007")));
        assert!(!dir.path().join("ACME+Spring+盒标.pdf").exists());
    }

    #[test]
    fn empty_plan_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(
            0,
            &parse("DSK01001"),
            &PackageParams::grouped(10, 2, 2),
            PackagingMode::Set,
        )
        .unwrap();
        let written = LabelRenderer::from_spec(TemplateRegistry::default_template())
            .write(&plan, &names(), dir.path())
            .unwrap();
        assert!(written.is_empty());
    }
}
