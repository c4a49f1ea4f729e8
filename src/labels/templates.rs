use anyhow::{Result, anyhow};
use lopdf::Document;
use lopdf::content::Operation;

use crate::core::error::OutputError;
use crate::labels::paint::{
    A4_HEIGHT_MM, A4_WIDTH_MM, BOLD_FONT, PdfBuilder, REGULAR_FONT, border_ops, fit_font_size,
    mm_to_pt, text_ops,
};
use crate::labels::{Label, LabelSheet};

const TITLE_MAX_PT: f32 = 22.0;
const LINE_MAX_PT: f32 = 11.0;
const PADDING_MM: f32 = 4.0;

/// A way of laying out a [`LabelSheet`] as a PDF document.
pub trait LabelTemplate {
    fn name(&self) -> &'static str;
    fn build(&self, sheet: &LabelSheet) -> Result<Document, OutputError>;
}

/// One label per page, page sized to the label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleLabel {
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Labels tiled across A4 pages, left to right then top to bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLabel {
    pub columns: usize,
    pub rows: usize,
    pub margin_mm: f32,
}

/// Every template variant known at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateKind {
    Single(SingleLabel),
    Grid(GridLabel),
}

impl LabelTemplate for TemplateKind {
    fn name(&self) -> &'static str {
        match self {
            TemplateKind::Single(t) => t.name(),
            TemplateKind::Grid(t) => t.name(),
        }
    }

    fn build(&self, sheet: &LabelSheet) -> Result<Document, OutputError> {
        match self {
            TemplateKind::Single(t) => t.build(sheet),
            TemplateKind::Grid(t) => t.build(sheet),
        }
    }
}

impl LabelTemplate for SingleLabel {
    fn name(&self) -> &'static str {
        "single"
    }

    fn build(&self, sheet: &LabelSheet) -> Result<Document, OutputError> {
        if self.width_mm <= 0.0 || self.height_mm <= 0.0 {
            return Err(OutputError::Layout(format!(
                "label size {}x{} mm is not printable",
                self.width_mm, self.height_mm
            )));
        }
        let width = mm_to_pt(self.width_mm);
        let height = mm_to_pt(self.height_mm);
        let mut builder = PdfBuilder::new();
        for label in &sheet.labels {
            builder.add_page(width, height, label_ops(label, 0.0, 0.0, width, height)?)?;
        }
        Ok(builder.finish())
    }
}

impl LabelTemplate for GridLabel {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn build(&self, sheet: &LabelSheet) -> Result<Document, OutputError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(OutputError::Layout(format!(
                "grid {}x{} has no cells",
                self.columns, self.rows
            )));
        }
        let page_width = mm_to_pt(A4_WIDTH_MM);
        let page_height = mm_to_pt(A4_HEIGHT_MM);
        let margin = mm_to_pt(self.margin_mm);
        let cell_width = (page_width - 2.0 * margin) / self.columns as f32;
        let cell_height = (page_height - 2.0 * margin) / self.rows as f32;
        if cell_width <= 0.0 || cell_height <= 0.0 {
            return Err(OutputError::Layout(format!(
                "margin {} mm leaves no room for labels",
                self.margin_mm
            )));
        }

        let mut builder = PdfBuilder::new();
        for page in sheet.labels.chunks(self.columns * self.rows) {
            let mut operations = Vec::new();
            for (slot, label) in page.iter().enumerate() {
                let column = slot % self.columns;
                let row = slot / self.columns;
                let x = margin + column as f32 * cell_width;
                let y = page_height - margin - (row + 1) as f32 * cell_height;
                operations.extend(label_ops(label, x, y, cell_width, cell_height)?);
            }
            builder.add_page(page_width, page_height, operations)?;
        }
        Ok(builder.finish())
    }
}

/// Bordered box with a bold title line followed by detail lines.
fn label_ops(
    label: &Label,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> Result<Vec<Operation>, OutputError> {
    let padding = mm_to_pt(PADDING_MM).min(width / 4.0).min(height / 4.0);
    let inner_width = width - 2.0 * padding;
    let mut ops = border_ops(
        x + padding / 2.0,
        y + padding / 2.0,
        width - padding,
        height - padding,
    );

    let title_size = fit_font_size(&label.title, inner_width, TITLE_MAX_PT.min(height / 3.0));
    let mut baseline = y + height - padding - title_size;
    ops.extend(text_ops(BOLD_FONT, title_size, x + padding, baseline, &label.title)?);

    let line_count = label.lines.len().max(1) as f32;
    let line_budget = (baseline - y - padding) / line_count;
    for line in &label.lines {
        let size = fit_font_size(line, inner_width, LINE_MAX_PT.min(line_budget * 0.8));
        baseline -= line_budget.max(size);
        ops.extend(text_ops(REGULAR_FONT, size, x + padding, baseline, line)?);
    }
    Ok(ops)
}

/// Describes a named label layout the CLI can select.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: TemplateKind,
}

/// Registry of built-in label templates.
pub struct TemplateRegistry;

impl TemplateRegistry {
    /// Return the set of available templates.
    pub fn list() -> Vec<&'static TemplateSpec> {
        vec![&SINGLE, &GRID, &GRID_LARGE]
    }

    /// Resolve a template by name (case-insensitive).
    pub fn get(name: &str) -> Result<&'static TemplateSpec> {
        let wanted = name.trim();
        Self::list()
            .into_iter()
            .find(|tpl| tpl.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow!("unknown template '{}'", name))
    }

    pub fn default_template() -> &'static TemplateSpec {
        &SINGLE
    }
}

static SINGLE: TemplateSpec = TemplateSpec {
    name: "single",
    description: "One 100x70 mm label per page, for roll label printers.",
    kind: TemplateKind::Single(SingleLabel {
        width_mm: 100.0,
        height_mm: 70.0,
    }),
};

static GRID: TemplateSpec = TemplateSpec {
    name: "grid",
    description: "A4 sheet of 3x8 labels.",
    kind: TemplateKind::Grid(GridLabel {
        columns: 3,
        rows: 8,
        margin_mm: 8.0,
    }),
};

static GRID_LARGE: TemplateSpec = TemplateSpec {
    name: "grid-large",
    description: "A4 sheet of 2x5 labels.",
    kind: TemplateKind::Grid(GridLabel {
        columns: 2,
        rows: 5,
        margin_mm: 10.0,
    }),
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(count: usize) -> LabelSheet {
        LabelSheet {
            labels: (1..=count)
                .map(|i| Label {
                    title: format!("DSK{i:05}"),
                    lines: vec![format!("BOX {i}/{count}"), "2850 SHEETS".into()],
                })
                .collect(),
        }
    }

    fn page_text(doc: &Document, page: u32) -> String {
        let pages = doc.get_pages();
        let id = pages[&page];
        String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned()
    }

    #[test]
    fn registry_lookup_is_case_insensitive() {
        assert_eq!(TemplateRegistry::get("GRID").unwrap().name, "grid");
        assert_eq!(TemplateRegistry::get(" single ").unwrap().name, "single");
        assert!(TemplateRegistry::get("poster").is_err());
        assert_eq!(TemplateRegistry::default_template().name, "single");
    }

    #[test]
    fn single_template_puts_one_label_per_page() {
        let doc = TemplateRegistry::get("single").unwrap().kind.build(&sheet(3)).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        assert!(page_text(&doc, 2).contains("(DSK00002)"));
        assert!(page_text(&doc, 3).contains("(BOX 3/3)"));
    }

    #[test]
    fn grid_template_tiles_labels() {
        let doc = TemplateRegistry::get("grid").unwrap().kind.build(&sheet(25)).unwrap();
        // 24 per page
        assert_eq!(doc.get_pages().len(), 2);
        let first = page_text(&doc, 1);
        assert!(first.contains("(DSK00001)"));
        assert!(first.contains("(DSK00024)"));
        assert!(page_text(&doc, 2).contains("(DSK00025)"));
    }

    #[test]
    fn empty_sheet_builds_empty_document() {
        let doc = TemplateKind::Grid(GridLabel {
            columns: 2,
            rows: 2,
            margin_mm: 5.0,
        })
        .build(&LabelSheet::default())
        .unwrap();
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn degenerate_layouts_are_rejected() {
        let grid = GridLabel {
            columns: 0,
            rows: 3,
            margin_mm: 5.0,
        };
        assert!(matches!(grid.build(&sheet(1)), Err(OutputError::Layout(_))));
        let single = SingleLabel {
            width_mm: 0.0,
            height_mm: 50.0,
        };
        assert!(matches!(single.build(&sheet(1)), Err(OutputError::Layout(_))));
    }

    #[test]
    fn unprintable_label_text_fails_instead_of_substituting() {
        let sheet = LabelSheet {
            labels: vec![Label {
                title: "盒A007".into(),
                lines: vec!["BOX 1/1".into()],
            }],
        };
        for spec in TemplateRegistry::list() {
            let err = spec.kind.build(&sheet).unwrap_err();
            assert!(matches!(&err, OutputError::Layout(msg) if msg.contains("盒A007")));
        }
    }

    #[test]
    fn kind_dispatch_reports_variant_name() {
        assert_eq!(TemplateRegistry::get("grid-large").unwrap().kind.name(), "grid");
        assert_eq!(TemplateRegistry::get("single").unwrap().kind.name(), "single");
    }
}
