//! PDF layout of a [`ResumeDocument`] with the standard Helvetica fonts.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use thiserror::Error;

use crate::resume::metrics::{get_metrics, FontWeight};
use crate::resume::{Block, RenderConfig, ResumeDocument};

const PT_TO_MM: f32 = 25.4 / 72.0;
const TITLE_SCALE: f32 = 24.0 / 11.0;
const SUBTITLE_SCALE: f32 = 14.0 / 11.0;
const HEADING_SCALE: f32 = 14.0 / 11.0;
const FOOTER_SCALE: f32 = 9.0 / 11.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf backend error: {0}")]
    Pdf(String),

    #[error("invalid render config: {0}")]
    Config(String),
}

fn accent() -> Color {
    Color::Rgb(Rgb::new(0.08, 0.25, 0.60, None))
}

fn muted() -> Color {
    Color::Rgb(Rgb::new(0.38, 0.38, 0.38, None))
}

fn ink() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

/// Tracks the write position and starts a new page when the current one is
/// full. `y` is measured from the bottom edge, as PDF does.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    config: &'a RenderConfig,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    footer: &'a str,
    y: f32,
    pages: usize,
}

impl<'a> PageWriter<'a> {
    fn content_width_mm(&self) -> f32 {
        self.config.page_width_mm - 2.0 * self.config.margin_mm
    }

    fn top(&self) -> f32 {
        self.config.page_height_mm - self.config.margin_mm
    }

    /// Lowest baseline allowed for body text; the footer sits below it.
    fn bottom(&self) -> f32 {
        self.config.margin_mm + self.line_height(1.0) * 2.0
    }

    fn line_height(&self, scale: f32) -> f32 {
        self.config.font_size_pt * scale * self.config.line_spacing * PT_TO_MM
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height >= self.bottom() {
            return;
        }
        self.write_footer();
        let (page, layer) = self.doc.add_page(
            Mm(self.config.page_width_mm),
            Mm(self.config.page_height_mm),
            format!("Page {}", self.pages + 1),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.y = self.top();
    }

    fn text(&mut self, text: &str, scale: f32, weight: FontWeight, color: Color) {
        let height = self.line_height(scale);
        self.ensure_space(height);
        self.y -= height;
        let font = match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        };
        self.layer.set_fill_color(color);
        self.layer.use_text(
            text,
            self.config.font_size_pt * scale,
            Mm(self.config.margin_mm),
            Mm(self.y),
            font,
        );
    }

    /// Word-wrapped paragraph at the body size.
    fn paragraph(&mut self, text: &str, weight: FontWeight) {
        let em_mm = self.config.font_size_pt * PT_TO_MM;
        let width_em = self.content_width_mm() / em_mm;
        for line in get_metrics(weight).wrap(text, width_em) {
            self.text(&line, 1.0, weight, ink());
        }
    }

    fn rule(&mut self, thickness: f32, color: Color) {
        self.y -= 1.5;
        let line = Line {
            points: vec![
                (Point::new(Mm(self.config.margin_mm), Mm(self.y)), false),
                (
                    Point::new(Mm(self.config.page_width_mm - self.config.margin_mm), Mm(self.y)),
                    false,
                ),
            ],
            is_closed: false,
        };
        self.layer.set_outline_color(color);
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(line);
        self.y -= 2.0;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn write_footer(&self) {
        let size = self.config.font_size_pt * FOOTER_SCALE;
        let width_mm = get_metrics(FontWeight::Regular).measure_str(self.footer) * size * PT_TO_MM;
        let x = ((self.config.page_width_mm - width_mm) / 2.0).max(self.config.margin_mm);
        self.layer.set_fill_color(muted());
        self.layer
            .use_text(self.footer, size, Mm(x), Mm(self.config.margin_mm), &self.regular);
    }
}

fn validate(config: &RenderConfig) -> Result<(), RenderError> {
    if config.font_size_pt <= 0.0 || config.line_spacing <= 0.0 {
        return Err(RenderError::Config("font size and line spacing must be positive".into()));
    }
    if config.page_width_mm <= 4.0 * config.margin_mm || config.page_height_mm <= 4.0 * config.margin_mm {
        return Err(RenderError::Config("margins leave no room for content".into()));
    }
    Ok(())
}

/// Renders the document to PDF bytes.
pub fn render(doc: &ResumeDocument, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    validate(config)?;

    let (pdf, page, layer) = PdfDocument::new(
        format!("CV - {}", doc.title),
        Mm(config.page_width_mm),
        Mm(config.page_height_mm),
        "Page 1",
    );
    let regular = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let bold = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    {
        let mut writer = PageWriter {
            doc: &pdf,
            config,
            layer: pdf.get_page(page).get_layer(layer),
            regular,
            bold,
            footer: &doc.footer,
            y: config.page_height_mm - config.margin_mm,
            pages: 1,
        };

        writer.text(&doc.title, TITLE_SCALE, FontWeight::Bold, accent());
        if !doc.subtitle.trim().is_empty() {
            writer.text(&doc.subtitle, SUBTITLE_SCALE, FontWeight::Regular, muted());
        }
        writer.rule(1.5, accent());

        for section in &doc.sections {
            writer.gap(4.0);
            // Keep the heading with at least one line of its content.
            let needed = writer.line_height(HEADING_SCALE) + writer.line_height(1.0) + 3.5;
            writer.ensure_space(needed);
            writer.text(&section.title, HEADING_SCALE, FontWeight::Bold, accent());
            writer.rule(0.5, muted());
            match &section.block {
                Block::Fields(fields) => {
                    for (label, value) in fields {
                        writer.paragraph(&format!("{label}: {value}"), FontWeight::Regular);
                    }
                }
                Block::Paragraph(text) => writer.paragraph(text, FontWeight::Regular),
            }
        }

        writer.write_footer();
    }

    pdf.save_to_bytes().map_err(|e| RenderError::Pdf(e.to_string()))
}
