//! PDF capture of the live document surface.
//!
//! The capture reads the `RenderedView` the user is looking at, never the model. The
//! surface is laid out at `scale`× device resolution, paginated onto US-letter pages
//! with a fixed margin, and mapped back to points by a `cm` transform in each page's
//! content stream. Text stays vector text: Helvetica where WinAnsi can encode it, the
//! embedded fallback font everywhere else. Text no available font covers fails the
//! export rather than being replaced.

pub mod layout;
pub mod writer;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::export::ExportError;
use crate::layout::fallback_font::FallbackFont;
use crate::templates::view::RenderedView;

use layout::{flow, paginate, Line, Rgb, RunFont};
use writer::{fmt_num, literal_string, win_ansi, EmbeddedFont, PdfWriter, FALLBACK_RESOURCE};

/// US letter, in points.
pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;
pub const MIN_SCALE: f32 = 2.0;

#[derive(Debug, Clone, Serialize)]
pub struct PdfSettings {
    /// Oversampling factor of the capture. Never below [`MIN_SCALE`].
    pub scale: f32,
    pub margin_in: f32,
    /// Font for text outside WinAnsi.
    #[serde(skip)]
    pub fallback_font: Option<Arc<FallbackFont>>,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            scale: MIN_SCALE,
            margin_in: 0.5,
            fallback_font: None,
        }
    }
}

impl PartialEq for PdfSettings {
    fn eq(&self, other: &Self) -> bool {
        let same_font = match (&self.fallback_font, &other.fallback_font) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.scale == other.scale && self.margin_in == other.margin_in && same_font
    }
}

impl PdfSettings {
    pub fn margin_pt(&self) -> f32 {
        self.margin_in * 72.0
    }
}

/// Captures `surface` into a complete PDF file.
pub fn capture(surface: &RenderedView, settings: &PdfSettings) -> Result<Vec<u8>, ExportError> {
    let scale = settings.scale.max(MIN_SCALE);
    let margin = settings.margin_pt() * scale;
    let page_w = PAGE_WIDTH_PT * scale;
    let page_h = PAGE_HEIGHT_PT * scale;
    let content_w = page_w - 2.0 * margin;
    let content_h = page_h - 2.0 * margin;
    if content_w <= 0.0 || content_h <= 0.0 {
        return Err(ExportError::Serialization(format!(
            "margin of {}in leaves no printable area",
            settings.margin_in
        )));
    }

    let fallback = settings.fallback_font.as_deref();
    let pages = paginate(flow(surface, fallback, scale, content_w), content_h);
    let mut builder = ContentBuilder {
        scale,
        margin,
        page_h,
        content_w,
        fallback,
        used_glyphs: BTreeMap::new(),
    };
    let streams = pages
        .iter()
        .map(|lines| builder.content(lines))
        .collect::<Result<Vec<_>, _>>()?;

    let embedded = match fallback {
        Some(font) if !builder.used_glyphs.is_empty() => Some(EmbeddedFont {
            font,
            glyphs: &builder.used_glyphs,
        }),
        _ => None,
    };
    PdfWriter::new()
        .write_document((PAGE_WIDTH_PT, PAGE_HEIGHT_PT), &surface.title, &streams, embedded)
        .map_err(|e| ExportError::Serialization(format!("failed to write PDF: {e}")))
}

/// Writes the content streams of one capture and records the fallback glyphs drawn.
struct ContentBuilder<'a> {
    scale: f32,
    margin: f32,
    page_h: f32,
    content_w: f32,
    fallback: Option<&'a FallbackFont>,
    used_glyphs: BTreeMap<u16, char>,
}

impl ContentBuilder<'_> {
    /// Content stream for one page. Coordinates are device units, bottom-left origin.
    fn content(&mut self, lines: &[Line]) -> Result<Vec<u8>, ExportError> {
        let (scale, margin, page_h, content_w) =
            (self.scale, self.margin, self.page_h, self.content_w);
        let mut ops = String::new();
        let inv = format!("{:.6}", 1.0 / scale);
        let inv = inv.trim_end_matches('0').trim_end_matches('.');
        ops.push_str(&format!("q\n{inv} 0 0 {inv} 0 0 cm\n"));

        let mut top = margin;
        for line in lines {
            if let Some(fill) = line.fill {
                ops.push_str(&format!(
                    "{} rg\n{} {} {} {} re f\n",
                    color(fill),
                    fmt_num(0.0),
                    fmt_num(page_h - top - line.height),
                    fmt_num(content_w + 2.0 * margin),
                    fmt_num(line.height)
                ));
            }
            for rule in &line.rules {
                ops.push_str(&format!(
                    "{} rg\n{} {} {} {} re f\n",
                    color(rule.color),
                    fmt_num(margin + rule.x),
                    fmt_num(page_h - top - rule.y - rule.thickness),
                    fmt_num(rule.width),
                    fmt_num(rule.thickness)
                ));
            }
            for run in &line.runs {
                let (resource, shown) = match run.font {
                    RunFont::Standard(face) => {
                        let encoded: Vec<u8> = run.text.chars().filter_map(win_ansi).collect();
                        (face.resource_name(), literal_string(&encoded))
                    }
                    RunFont::Fallback => (FALLBACK_RESOURCE, self.glyph_string(&run.text)?),
                };
                ops.push_str(&format!(
                    "BT\n/{resource} {} Tf\n{} rg\n1 0 0 1 {} {} Tm\n{shown} Tj\nET\n",
                    fmt_num(run.size),
                    color(run.color),
                    fmt_num(margin + run.x),
                    fmt_num(page_h - top - line.baseline),
                ));
            }
            top += line.height;
        }
        ops.push_str("Q\n");
        Ok(ops.into_bytes())
    }

    /// Hex string of two-byte glyph ids for the Identity-H fallback font.
    fn glyph_string(&mut self, text: &str) -> Result<String, ExportError> {
        let Some(font) = self.fallback else {
            let missing = text.chars().find(|c| win_ansi(*c).is_none()).unwrap_or('?');
            return Err(uncovered(missing));
        };
        let mut hex = String::with_capacity(text.len() * 4 + 2);
        hex.push('<');
        for c in text.chars() {
            let glyph = font.glyph(c).ok_or_else(|| uncovered(c))?;
            self.used_glyphs.entry(glyph).or_insert(c);
            hex.push_str(&format!("{glyph:04X}"));
        }
        hex.push('>');
        Ok(hex)
    }
}

fn uncovered(c: char) -> ExportError {
    ExportError::Serialization(format!(
        "no available font has a glyph for U+{:04X} '{c}'; set PDF_UNICODE_FONT to a font that covers it",
        c as u32
    ))
}

fn color(c: Rgb) -> String {
    format!("{} {} {}", fmt_num(c.0), fmt_num(c.1), fmt_num(c.2))
}
