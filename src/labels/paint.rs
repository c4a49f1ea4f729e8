use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::core::error::OutputError;

/// Points per millimeter (1 inch = 72 points = 25.4 mm).
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

pub const REGULAR_FONT: &str = "F1";
pub const BOLD_FONT: &str = "F2";

/// Average Helvetica glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.56;
const BORDER_WIDTH: f32 = 0.75;

#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Accumulates pages into a PDF with two standard Type1 fonts.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
        });
        Self {
            doc,
            pages_id,
            resources_id,
            kids: Vec::new(),
        }
    }

    pub fn add_page(
        &mut self,
        width_pt: f32,
        height_pt: f32,
        operations: Vec<Operation>,
    ) -> Result<(), OutputError> {
        let content = Content { operations };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => self.resources_id,
            "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    pub fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that `raw` stays within the printable ASCII range the base fonts
/// can show. Labels must print exactly what the plan holds, so anything else
/// is a layout error rather than a substitution.
pub fn pdf_text(raw: &str) -> Result<&str, OutputError> {
    match raw.chars().find(|ch| !(' '..='~').contains(ch)) {
        None => Ok(raw),
        Some(ch) => Err(OutputError::Layout(format!(
            "label text '{raw}' contains '{ch}', which the label font cannot print"
        ))),
    }
}

/// Largest font size (up to `max_size`) at which `text` fits `width_pt`.
pub fn fit_font_size(text: &str, width_pt: f32, max_size: f32) -> f32 {
    let chars = text.chars().count().max(1) as f32;
    (width_pt / (chars * GLYPH_ADVANCE)).min(max_size).max(4.0)
}

pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * GLYPH_ADVANCE * size
}

/// Single line of text with its baseline starting at (`x`, `y`).
pub fn text_ops(
    font: &str,
    size: f32,
    x: f32,
    y: f32,
    text: &str,
) -> Result<Vec<Operation>, OutputError> {
    let text = pdf_text(text)?;
    Ok(vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ])
}

pub fn border_ops(x: f32, y: f32, width: f32, height: f32) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("w", vec![BORDER_WIDTH.into()]),
        Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ),
        Operation::new("S", vec![]),
        Operation::new("Q", vec![]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_text_rejects_unprintable_characters() {
        assert_eq!(pdf_text("DSK01001-02").unwrap(), "DSK01001-02");
        let err = pdf_text("盒A1").unwrap_err();
        assert!(matches!(&err, OutputError::Layout(msg) if msg.contains('盒')));
        assert!(pdf_text("A\tB").is_err());
    }

    #[test]
    fn fit_font_size_shrinks_long_text() {
        assert_eq!(fit_font_size("AB", 1000.0, 24.0), 24.0);
        let size = fit_font_size("ABCDEFGHIJKLMNOPQRSTUVWXYZ", 100.0, 24.0);
        assert!(size < 24.0);
        assert!(text_width("ABCDEFGHIJKLMNOPQRSTUVWXYZ", size) <= 100.01);
    }

    #[test]
    fn builder_counts_pages() {
        let mut builder = PdfBuilder::new();
        builder
            .add_page(
                100.0,
                100.0,
                text_ops(REGULAR_FONT, 12.0, 10.0, 10.0, "hi").unwrap(),
            )
            .unwrap();
        builder.add_page(100.0, 100.0, Vec::new()).unwrap();
        let doc = builder.finish();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
