//! Flows a `RenderedView` into positioned lines for the PDF capture.
//!
//! All measurements are device units: points multiplied by the capture scale. The
//! page writer maps them back to points with a single `cm` transform.
//!
//! Text WinAnsi can encode is set in Helvetica. Any other text is measured and set in
//! the fallback font.

use super::writer::win_ansi;
use crate::layout::fallback_font::FallbackFont;
use crate::layout::font_metrics::{get_metrics, Face, GlyphWidths};
use crate::templates::view::{
    Align, Block, BulletNode, Emphasis, HeadingStyle, ItemStyle, RenderedView, Theme,
};

/// Line height as a multiple of the font size.
const LEADING: f32 = 1.35;
/// Bullet text indent, in points.
const BULLET_INDENT_PT: f32 = 12.0;
/// Gap between sidebar and main column, in points.
const COLUMN_GAP_PT: f32 = 18.0;
const SIDEBAR_FRACTION: f32 = 0.32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);

    /// Parses `#rrggbb`; anything else is black.
    pub fn from_hex(hex: &str) -> Rgb {
        let parse = |range: std::ops::Range<usize>| {
            hex.strip_prefix('#')
                .filter(|h| h.len() == 6)
                .and_then(|h| h.get(range))
                .and_then(|c| u8::from_str_radix(c, 16).ok())
        };
        match (parse(0..2), parse(2..4), parse(4..6)) {
            (Some(r), Some(g), Some(b)) => {
                Rgb(f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0)
            }
            _ => Rgb::BLACK,
        }
    }
}

/// Font a run is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunFont {
    Standard(Face),
    /// The embedded fallback font.
    Fallback,
}

impl RunFont {
    /// Picks Helvetica when every character of `text` has a WinAnsi code.
    pub fn for_text(text: &str, face: Face) -> RunFont {
        if text.chars().all(|c| win_ansi(c).is_some()) {
            RunFont::Standard(face)
        } else {
            RunFont::Fallback
        }
    }
}

/// A text run positioned on its line. `x` is relative to the line's left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub font: RunFont,
    pub size: f32,
    pub color: Rgb,
    pub text: String,
}

/// A horizontal rule. `y` is measured down from the top of the line.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMark {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub thickness: f32,
    pub color: Rgb,
}

/// One row of the flowed surface. Rows are never split across pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub height: f32,
    /// Distance from the top of the line to the text baseline.
    pub baseline: f32,
    pub runs: Vec<TextRun>,
    pub rules: Vec<RuleMark>,
    /// Full-width background.
    pub fill: Option<Rgb>,
}

impl Line {
    fn gap(height: f32) -> Line {
        Line {
            height,
            ..Default::default()
        }
    }

    fn shifted(mut self, dx: f32) -> Line {
        for run in &mut self.runs {
            run.x += dx;
        }
        for rule in &mut self.rules {
            rule.x += dx;
        }
        self
    }

    /// Overlays `other` onto this line; the taller line decides height and baseline.
    fn merge(mut self, other: Line) -> Line {
        if other.height > self.height {
            self.height = other.height;
            self.baseline = other.baseline;
        }
        self.runs.extend(other.runs);
        self.rules.extend(other.rules);
        self.fill = self.fill.or(other.fill);
        self
    }
}

struct Style {
    face: Face,
    size: f32,
    color: Rgb,
}

/// Accumulates lines for one column of a given width.
struct Flow<'a> {
    theme: &'a Theme,
    fallback: Option<&'a FallbackFont>,
    scale: f32,
    width: f32,
    lines: Vec<Line>,
    /// Set while laying out a banner masthead.
    fill: Option<Rgb>,
}

impl<'a> Flow<'a> {
    fn new(theme: &'a Theme, fallback: Option<&'a FallbackFont>, scale: f32, width: f32) -> Self {
        Self {
            theme,
            fallback,
            scale,
            width,
            lines: Vec::new(),
            fill: None,
        }
    }

    fn pt(&self, points: f32) -> f32 {
        points * self.scale
    }

    fn style(&self, emphasis: Emphasis, size_pt: f32) -> Style {
        let text = Rgb::from_hex(self.theme.text);
        let (face, color) = match emphasis {
            Emphasis::Regular => (Face::Regular, text),
            Emphasis::Strong => (Face::Bold, text),
            Emphasis::Italic => (Face::Oblique, text),
            Emphasis::Muted => (Face::Regular, Rgb::from_hex(self.theme.muted)),
        };
        Style {
            face,
            size: self.pt(size_pt),
            color: if self.fill.is_some() { Rgb::WHITE } else { color },
        }
    }

    /// Widths for `font`. Without a fallback font, Regular stands in so layout can
    /// finish; the capture then refuses the run.
    fn metrics(&self, font: RunFont) -> &'a dyn GlyphWidths {
        match (font, self.fallback) {
            (RunFont::Standard(face), _) => get_metrics(face),
            (RunFont::Fallback, Some(fallback)) => fallback,
            (RunFont::Fallback, None) => get_metrics(Face::Regular),
        }
    }

    fn push(&mut self, mut line: Line) {
        line.fill = line.fill.or(self.fill);
        self.lines.push(line);
    }

    fn gap(&mut self, points: f32) {
        let line = Line::gap(self.pt(points));
        self.push(line);
    }

    fn text_line(&self, text: String, font: RunFont, style: &Style, x: f32) -> Line {
        Line {
            height: style.size * LEADING,
            baseline: style.size,
            runs: vec![TextRun {
                x,
                font,
                size: style.size,
                color: style.color,
                text,
            }],
            ..Default::default()
        }
    }

    /// Wraps `text` into the column with the given alignment and left indent.
    fn paragraph(&mut self, text: &str, style: &Style, align: Align, indent: f32) {
        let font = RunFont::for_text(text, style.face);
        let metrics = self.metrics(font);
        let available = (self.width - indent).max(style.size);
        for wrapped in metrics.wrap(text, style.size, available) {
            let w = metrics.measure_str(&wrapped, style.size);
            let x = match align {
                Align::Left | Align::Justify => indent,
                Align::Center => indent + (available - w) / 2.0,
                Align::Right => indent + available - w,
            };
            let line = self.text_line(wrapped, font, style, x.max(indent));
            self.push(line);
        }
    }

    /// A wrapped left-hand text with a right-aligned `trailing` on its first line.
    fn with_trailing(&mut self, text: &str, style: &Style, trailing: Option<(&str, Style)>) {
        let Some((trailing, trailing_style)) = trailing.filter(|(t, _)| !t.is_empty()) else {
            self.paragraph(text, style, Align::Left, 0.0);
            return;
        };
        let t_font = RunFont::for_text(trailing, trailing_style.face);
        let t_width = self.metrics(t_font).measure_str(trailing, trailing_style.size);
        let available = (self.width - t_width - self.pt(8.0)).max(style.size);

        let font = RunFont::for_text(text, style.face);
        let mut lines = self.metrics(font).wrap(text, style.size, available);
        if lines.is_empty() {
            lines.push(String::new());
        }
        for (i, wrapped) in lines.into_iter().enumerate() {
            let mut line = self.text_line(wrapped, font, style, 0.0);
            if i == 0 {
                line = line.merge(self.text_line(
                    trailing.to_string(),
                    t_font,
                    &trailing_style,
                    self.width - t_width,
                ));
            }
            line.runs.retain(|r| !r.text.is_empty());
            self.push(line);
        }
    }

    fn rule(&mut self, thickness_pt: f32, color: Rgb) {
        let thickness = self.pt(thickness_pt);
        let line = Line {
            height: thickness + self.pt(4.0),
            rules: vec![RuleMark {
                x: 0.0,
                y: self.pt(2.0),
                width: self.width,
                thickness,
                color,
            }],
            ..Default::default()
        };
        self.push(line);
    }

    fn blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.block(block);
        }
    }

    fn block(&mut self, block: &Block) {
        let body = self.theme.body_size_pt;
        match block {
            Block::Masthead {
                name,
                contact,
                links,
                align,
                banner,
            } => {
                if *banner {
                    self.fill = Some(Rgb::from_hex(self.theme.accent));
                    self.gap(12.0);
                }
                let name_style = self.style(Emphasis::Strong, self.theme.name_size_pt);
                self.paragraph(name, &name_style, *align, 0.0);
                let muted = self.style(Emphasis::Muted, body);
                if !contact.is_empty() {
                    self.paragraph(&contact.join("  •  "), &muted, *align, 0.0);
                }
                for link in links {
                    self.paragraph(link, &muted, *align, 0.0);
                }
                if *banner {
                    self.gap(12.0);
                    self.fill = None;
                }
                self.gap(body);
            }
            Block::Section {
                heading,
                style,
                body: children,
            } => {
                let text = if style.uppercase() {
                    heading.to_uppercase()
                } else {
                    heading.clone()
                };
                let size = match style {
                    HeadingStyle::Quiet => body - 1.0,
                    _ => self.theme.heading_size_pt,
                };
                let mut heading_style = self.style(Emphasis::Strong, size);
                match style {
                    HeadingStyle::Accent | HeadingStyle::Colored => {
                        heading_style.color = Rgb::from_hex(self.theme.accent)
                    }
                    HeadingStyle::Quiet => heading_style.color = Rgb::from_hex(self.theme.muted),
                    HeadingStyle::Ruled => {}
                }
                self.paragraph(&text, &heading_style, Align::Left, 0.0);
                if *style == HeadingStyle::Ruled {
                    self.rule(1.0, Rgb::from_hex(self.theme.text));
                } else {
                    self.gap(3.0);
                }
                self.blocks(children);
                self.gap(body);
            }
            Block::Paragraph {
                text,
                emphasis,
                align,
            } => {
                let style = self.style(*emphasis, body);
                self.paragraph(text, &style, *align, 0.0);
                self.gap(body * 0.4);
            }
            Block::Items { items, style } => {
                let regular = self.style(Emphasis::Regular, body);
                match style {
                    ItemStyle::Chips => self.paragraph(&items.join("  ·  "), &regular, Align::Left, 0.0),
                    ItemStyle::Inline { separator } => {
                        self.paragraph(&items.join(separator), &regular, Align::Left, 0.0)
                    }
                    ItemStyle::Stacked => {
                        for item in items {
                            self.paragraph(item, &regular, Align::Left, 0.0);
                        }
                    }
                }
            }
            Block::Role {
                title,
                company,
                dates,
                bullets,
            } => {
                let strong = self.style(Emphasis::Strong, body + 0.5);
                let muted = self.style(Emphasis::Muted, body);
                self.with_trailing(title, &strong, Some((dates.as_str(), muted)));
                if !company.is_empty() {
                    let italic = self.style(Emphasis::Italic, body);
                    self.paragraph(company, &italic, Align::Left, 0.0);
                }
                let regular = self.style(Emphasis::Regular, body);
                let indent = self.pt(BULLET_INDENT_PT);
                for bullet in bullets {
                    self.bullet(bullet, &regular, indent);
                }
                self.gap(body * 0.6);
            }
            Block::Record {
                primary,
                secondary,
                trailing,
            } => {
                let strong = self.style(Emphasis::Strong, body);
                let muted = self.style(Emphasis::Muted, body);
                self.with_trailing(primary, &strong, trailing.as_deref().map(|t| (t, muted)));
                if !secondary.is_empty() {
                    let regular = self.style(Emphasis::Regular, body);
                    self.paragraph(&secondary.join(" | "), &regular, Align::Left, 0.0);
                }
                self.gap(body * 0.3);
            }
            Block::Columns { sidebar, main } => {
                let gap = self.pt(COLUMN_GAP_PT);
                let side_width = self.width * SIDEBAR_FRACTION;
                let mut side = Flow::new(self.theme, self.fallback, self.scale, side_width);
                side.blocks(sidebar);
                let main_width = self.width - side_width - gap;
                let mut primary = Flow::new(self.theme, self.fallback, self.scale, main_width);
                primary.blocks(main);

                let offset = side_width + gap;
                let mut side_lines = side.lines.into_iter();
                let mut main_lines = primary.lines.into_iter();
                loop {
                    let line = match (side_lines.next(), main_lines.next()) {
                        (None, None) => break,
                        (Some(s), None) => s,
                        (None, Some(m)) => m.shifted(offset),
                        (Some(s), Some(m)) => s.merge(m.shifted(offset)),
                    };
                    self.push(line);
                }
            }
            Block::Spacer => self.gap(body),
        }
    }

    fn bullet(&mut self, bullet: &BulletNode, style: &Style, indent: f32) {
        let text = bullet.text().trim();
        if text.is_empty() {
            return;
        }
        let first = self.lines.len();
        self.paragraph(text, style, Align::Left, indent);
        if let Some(line) = self.lines.get_mut(first) {
            line.runs.push(TextRun {
                x: indent / 3.0,
                font: RunFont::Standard(style.face),
                size: style.size,
                color: style.color,
                text: "•".to_string(),
            });
        }
    }
}

/// Flows the whole view into lines `width` device units wide.
pub fn flow(
    view: &RenderedView,
    fallback: Option<&FallbackFont>,
    scale: f32,
    width: f32,
) -> Vec<Line> {
    let mut flow = Flow::new(&view.theme, fallback, scale, width);
    flow.blocks(&view.blocks);
    while flow.lines.last().is_some_and(|l| l.runs.is_empty() && l.rules.is_empty()) {
        flow.lines.pop();
    }
    flow.lines
}

/// Splits lines into pages of at most `page_height`. A line taller than a page gets a
/// page of its own. Leading blank lines on a new page are dropped.
pub fn paginate(lines: Vec<Line>, page_height: f32) -> Vec<Vec<Line>> {
    let mut pages: Vec<Vec<Line>> = Vec::new();
    let mut current: Vec<Line> = Vec::new();
    let mut used = 0.0_f32;

    for line in lines {
        let blank = line.runs.is_empty() && line.rules.is_empty() && line.fill.is_none();
        if used + line.height > page_height && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            used = 0.0;
        }
        if current.is_empty() && blank && !pages.is_empty() {
            continue;
        }
        used += line.height;
        current.push(line);
    }
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}
