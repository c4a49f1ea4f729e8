//! One-row carton summary workbook.
//!
//! The workbook is assembled directly as an OOXML package: a handful of XML
//! parts inside a zip container, with the single data row written as inline
//! strings and numbers.

use std::fs::{self, File};
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use serde::Serialize;
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::OutputError;
use crate::core::naming::ProductNames;
use crate::core::plan::PackagingPlan;

/// Column headers, in output order.
pub const SUMMARY_HEADERS: [&str; 4] = ["名称", "每盒数量", "总箱数", "每箱盒数"];

const SHEET_NAME: &str = "外箱汇总";
const COLUMN_WIDTHS: [f32; 4] = [40.0, 12.0, 12.0, 12.0];

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

const WORKBOOK_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"</Relationships>"#
);

/// Aggregate totals for outer-carton paperwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartonSummary {
    pub display_name: String,
    pub pieces_per_box: u64,
    pub total_large_boxes: u64,
    pub boxes_per_large_box: u64,
}

impl CartonSummary {
    pub fn new<S: Into<String>>(
        display_name: S,
        pieces_per_box: u64,
        total_large_boxes: u64,
        boxes_per_large_box: u64,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            pieces_per_box,
            total_large_boxes,
            boxes_per_large_box,
        }
    }

    /// Derive totals from a plan.
    ///
    /// Grouped plans report large cases and their configured box capacity.
    /// In regular mode every box ships as its own carton.
    pub fn from_plan(plan: &PackagingPlan, names: &ProductNames) -> Self {
        let totals = plan.totals();
        let (total_large_boxes, boxes_per_large_box) = match plan.capacity() {
            Some(capacity) => (
                totals.large_case_count as u64,
                capacity.boxes_per_large_case() as u64,
            ),
            None => (totals.box_count as u64, 1),
        };
        Self::new(
            names.display_name(),
            plan.sheets_per_box(),
            total_large_boxes,
            boxes_per_large_box,
        )
    }

    /// Encode the summary as an `.xlsx` package in memory.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>, OutputError> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_xlsx(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    pub fn write_xlsx<W: Write + Seek>(&self, out: W) -> Result<(), OutputError> {
        let mut writer = ZipWriter::new(out);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", ROOT_RELS_XML.to_string()),
            ("xl/workbook.xml", workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
            ("xl/worksheets/sheet1.xml", self.sheet_xml()),
        ];
        for (name, body) in parts {
            writer.start_file(name, options)?;
            writer.write_all(body.as_bytes())?;
        }
        writer.finish()?;
        Ok(())
    }

    fn sheet_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );
        xml.push_str("<cols>");
        for (idx, width) in COLUMN_WIDTHS.iter().enumerate() {
            xml.push_str(&format!(
                r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#,
                n = idx + 1
            ));
        }
        xml.push_str("</cols><sheetData>");

        xml.push_str(r#"<row r="1">"#);
        for (idx, header) in SUMMARY_HEADERS.iter().enumerate() {
            xml.push_str(&text_cell(idx, 1, header));
        }
        xml.push_str("</row>");

        xml.push_str(r#"<row r="2">"#);
        xml.push_str(&text_cell(0, 2, &self.display_name));
        xml.push_str(&number_cell(1, 2, self.pieces_per_box));
        xml.push_str(&number_cell(2, 2, self.total_large_boxes));
        xml.push_str(&number_cell(3, 2, self.boxes_per_large_box));
        xml.push_str("</row>");

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

fn workbook_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        ),
        escape(SHEET_NAME)
    )
}

fn cell_ref(column: usize, row: usize) -> String {
    let letter = char::from(b'A' + column as u8);
    format!("{letter}{row}")
}

fn text_cell(column: usize, row: usize, value: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        cell_ref(column, row),
        escape(value)
    )
}

fn number_cell(column: usize, row: usize, value: u64) -> String {
    format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref(column, row), value)
}

/// Writes carton summaries into an output directory.
#[derive(Debug, Clone)]
pub struct CartonSummaryWriter {
    out_dir: PathBuf,
}

impl CartonSummaryWriter {
    pub fn new<P: Into<PathBuf>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Write `外箱汇总-{product_code}-{english_name}.xlsx` and return its path.
    ///
    /// A failed write may leave a partial file behind; the summary itself
    /// is untouched and can be written again.
    pub fn write(
        &self,
        summary: &CartonSummary,
        names: &ProductNames,
    ) -> Result<PathBuf, OutputError> {
        let path = self.out_dir.join(names.summary_file_name());
        write_file(&path, summary)?;
        info!(path = %path.display(), "wrote carton summary");
        Ok(path)
    }
}

fn write_file(path: &Path, summary: &CartonSummary) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| OutputError::io(parent, err))?;
    }
    let file = File::create(path).map_err(|err| OutputError::io(path, err))?;
    summary.write_xlsx(file)
}
