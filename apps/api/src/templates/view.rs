//! The rendered view: the display surface a template produces.
//!
//! A `RenderedView` is a typed block tree, not markup. The display HTML
//! (`templates::html`), the print page (`templates::print`) and the PDF capture
//! (`export::pdf`) all read the same tree, so what the user sees is what gets printed
//! and captured.

use serde::Serialize;

use crate::models::document::DocumentKind;
use crate::templates::TemplateId;

/// Position of one bullet in the canonical model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BulletAddress {
    pub experience_index: usize,
    pub bullet_index: usize,
}

/// A single experience bullet as presented.
///
/// `Editable` carries its address so a rewrite request names exactly this bullet.
/// `Static` is a plain leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BulletNode {
    Editable { address: BulletAddress, text: String },
    Static { text: String },
}

impl BulletNode {
    pub fn text(&self) -> &str {
        match self {
            BulletNode::Editable { text, .. } | BulletNode::Static { text } => text,
        }
    }

    #[cfg(test)]
    pub fn address(&self) -> Option<BulletAddress> {
        match self {
            BulletNode::Editable { address, .. } => Some(*address),
            BulletNode::Static { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

/// Visual weight of a text run. Maps onto the three Helvetica faces in the PDF capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Regular,
    Strong,
    Muted,
    Italic,
}

/// Variant-specific look of section headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    /// Bold heading with a left accent bar.
    Accent,
    /// Uppercase heading over a full-width rule.
    Ruled,
    /// Small, letter-spaced, muted heading.
    Quiet,
    /// Heading in the variant's accent colour, no rule.
    Colored,
}

impl HeadingStyle {
    /// Ruled and quiet headings are displayed in capitals.
    pub fn uppercase(&self) -> bool {
        matches!(self, HeadingStyle::Ruled | HeadingStyle::Quiet)
    }
}

/// How a list of short items (skills, certifications) is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum ItemStyle {
    /// Pill-shaped tags.
    Chips,
    /// A single run joined by `separator`.
    Inline { separator: String },
    /// One item per line.
    Stacked,
}

/// Colour and typography shared by every block of one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub accent: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub font_stack: &'static str,
    pub bordered: bool,
    /// Base body size in points.
    pub body_size_pt: f32,
    pub name_size_pt: f32,
    pub heading_size_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    /// Name plus contact lines at the top of the document.
    Masthead {
        name: String,
        contact: Vec<String>,
        links: Vec<String>,
        align: Align,
        banner: bool,
    },
    Section {
        heading: String,
        style: HeadingStyle,
        body: Vec<Block>,
    },
    Paragraph {
        text: String,
        emphasis: Emphasis,
        align: Align,
    },
    Items {
        items: Vec<String>,
        style: ItemStyle,
    },
    /// One experience entry.
    Role {
        title: String,
        company: String,
        dates: String,
        bullets: Vec<BulletNode>,
    },
    /// A line with up to three fields (education, projects).
    Record {
        primary: String,
        secondary: Vec<String>,
        trailing: Option<String>,
    },
    /// Executive layout: narrow sidebar left, main column right.
    Columns {
        sidebar: Vec<Block>,
        main: Vec<Block>,
    },
    Spacer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    pub kind: DocumentKind,
    pub template: TemplateId,
    pub editable: bool,
    pub title: String,
    pub theme: Theme,
    pub blocks: Vec<Block>,
}

impl RenderedView {
    /// Depth-first walk over every block, descending into sections and columns.
    #[cfg(test)]
    pub fn walk(&self) -> Vec<&Block> {
        fn visit<'a>(blocks: &'a [Block], out: &mut Vec<&'a Block>) {
            for block in blocks {
                out.push(block);
                match block {
                    Block::Section { body, .. } => visit(body, out),
                    Block::Columns { sidebar, main } => {
                        visit(sidebar, out);
                        visit(main, out);
                    }
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        visit(&self.blocks, &mut out);
        out
    }

    /// Every bullet node in document order.
    #[cfg(test)]
    pub fn bullets(&self) -> Vec<&BulletNode> {
        self.walk()
            .into_iter()
            .flat_map(|b| match b {
                Block::Role { bullets, .. } => bullets.iter().collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// Section headings in document order.
    #[cfg(test)]
    pub fn headings(&self) -> Vec<&str> {
        self.walk()
            .into_iter()
            .filter_map(|b| match b {
                Block::Section { heading, .. } => Some(heading.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All visible text of the surface, one run per entry, in reading order.
    #[cfg(test)]
    pub fn text_runs(&self) -> Vec<String> {
        let mut runs = Vec::new();
        for block in self.walk() {
            match block {
                Block::Masthead {
                    name,
                    contact,
                    links,
                    ..
                } => {
                    runs.push(name.clone());
                    runs.extend(contact.iter().cloned());
                    runs.extend(links.iter().cloned());
                }
                Block::Section { heading, .. } => runs.push(heading.clone()),
                Block::Paragraph { text, .. } => runs.push(text.clone()),
                Block::Items { items, .. } => runs.extend(items.iter().cloned()),
                Block::Role {
                    title,
                    company,
                    dates,
                    bullets,
                } => {
                    runs.push(title.clone());
                    runs.push(company.clone());
                    runs.push(dates.clone());
                    runs.extend(bullets.iter().map(|b| b.text().to_string()));
                }
                Block::Record {
                    primary,
                    secondary,
                    trailing,
                } => {
                    runs.push(primary.clone());
                    runs.extend(secondary.iter().cloned());
                    runs.extend(trailing.iter().cloned());
                }
                Block::Columns { .. } | Block::Spacer => {}
            }
        }
        runs.retain(|r| !r.is_empty());
        runs
    }
}
