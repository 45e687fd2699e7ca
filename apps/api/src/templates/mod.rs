// Template resolution and rendering.
// Resolver: static lookup table per document kind with an explicit default entry.
// Renderers are pure: document + options in, RenderedView out. No mutation.

pub mod cover_letter;
pub mod handlers;
pub mod html;
pub mod print;
pub mod resume;
pub mod view;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::models::document::{CoverLetterDocument, Document, DocumentKind, ResumeDocument};
use crate::templates::view::RenderedView;

// ────────────────────────────────────────────────────────────────────────────
// Template identifiers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeTemplate {
    Modern,
    Classic,
    Minimalist,
    Executive,
    Creative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverLetterTemplate {
    Professional,
    Modern,
    Formal,
}

/// A resolved template, always belonging to exactly one document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    Resume(ResumeTemplate),
    CoverLetter(CoverLetterTemplate),
}

impl ResumeTemplate {
    pub fn id(&self) -> &'static str {
        match self {
            ResumeTemplate::Modern => "modern",
            ResumeTemplate::Classic => "classic",
            ResumeTemplate::Minimalist => "minimalist",
            ResumeTemplate::Executive => "executive",
            ResumeTemplate::Creative => "creative",
        }
    }
}

impl CoverLetterTemplate {
    pub fn id(&self) -> &'static str {
        match self {
            CoverLetterTemplate::Professional => "professional",
            CoverLetterTemplate::Modern => "modern",
            CoverLetterTemplate::Formal => "formal",
        }
    }
}

impl TemplateId {
    pub fn id(&self) -> &'static str {
        match self {
            TemplateId::Resume(t) => t.id(),
            TemplateId::CoverLetter(t) => t.id(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            TemplateId::Resume(_) => DocumentKind::Resume,
            TemplateId::CoverLetter(_) => DocumentKind::CoverLetter,
        }
    }
}

impl Serialize for TemplateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Render options and function types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Bullets become individually addressable rewrite targets when true.
    pub editable: bool,
    /// Date printed on cover letters. Passed in so renders are reproducible.
    pub letter_date: NaiveDate,
}

impl RenderOptions {
    pub fn new(editable: bool, letter_date: NaiveDate) -> Self {
        Self {
            editable,
            letter_date,
        }
    }
}

pub type ResumeRenderFn = fn(&ResumeDocument, &RenderOptions) -> RenderedView;
pub type CoverLetterRenderFn = fn(&CoverLetterDocument, &RenderOptions) -> RenderedView;

#[derive(Clone, Copy)]
enum RenderFn {
    Resume(ResumeRenderFn),
    CoverLetter(CoverLetterRenderFn),
}

// ────────────────────────────────────────────────────────────────────────────
// Lookup tables
// ────────────────────────────────────────────────────────────────────────────

struct TemplateEntry {
    template: TemplateId,
    name: &'static str,
    description: &'static str,
    render: RenderFn,
}

struct TemplateTable {
    entries: &'static [TemplateEntry],
    /// Index of the fallback entry for unrecognized identifiers.
    default: usize,
}

impl TemplateTable {
    fn default_entry(&self) -> &'static TemplateEntry {
        &self.entries[self.default]
    }

    fn lookup(&self, template_id: &str) -> Option<&'static TemplateEntry> {
        let wanted = template_id.trim();
        self.entries
            .iter()
            .find(|e| e.template.id().eq_ignore_ascii_case(wanted))
    }
}

static RESUME_TEMPLATES: TemplateTable = TemplateTable {
    entries: &[
        TemplateEntry {
            template: TemplateId::Resume(ResumeTemplate::Modern),
            name: "Modern",
            description: "Clean design with colored accents",
            render: RenderFn::Resume(resume::render_modern),
        },
        TemplateEntry {
            template: TemplateId::Resume(ResumeTemplate::Classic),
            name: "Classic",
            description: "Traditional format with borders",
            render: RenderFn::Resume(resume::render_classic),
        },
        TemplateEntry {
            template: TemplateId::Resume(ResumeTemplate::Minimalist),
            name: "Minimalist",
            description: "Ultra-clean and simple design",
            render: RenderFn::Resume(resume::render_minimalist),
        },
        TemplateEntry {
            template: TemplateId::Resume(ResumeTemplate::Executive),
            name: "Executive",
            description: "Professional sidebar layout",
            render: RenderFn::Resume(resume::render_executive),
        },
        TemplateEntry {
            template: TemplateId::Resume(ResumeTemplate::Creative),
            name: "Creative",
            description: "Unique design with gradients",
            render: RenderFn::Resume(resume::render_creative),
        },
    ],
    default: 0,
};

static COVER_LETTER_TEMPLATES: TemplateTable = TemplateTable {
    entries: &[
        TemplateEntry {
            template: TemplateId::CoverLetter(CoverLetterTemplate::Professional),
            name: "Professional",
            description: "Standard business format",
            render: RenderFn::CoverLetter(cover_letter::render_professional),
        },
        TemplateEntry {
            template: TemplateId::CoverLetter(CoverLetterTemplate::Modern),
            name: "Modern",
            description: "Contemporary with accent colors",
            render: RenderFn::CoverLetter(cover_letter::render_modern),
        },
        TemplateEntry {
            template: TemplateId::CoverLetter(CoverLetterTemplate::Formal),
            name: "Formal",
            description: "Traditional formal format",
            render: RenderFn::CoverLetter(cover_letter::render_formal),
        },
    ],
    default: 0,
};

fn table_for(kind: DocumentKind) -> &'static TemplateTable {
    match kind {
        DocumentKind::Resume => &RESUME_TEMPLATES,
        DocumentKind::CoverLetter => &COVER_LETTER_TEMPLATES,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolver
// ────────────────────────────────────────────────────────────────────────────

/// A renderer bound to one template variant.
#[derive(Clone, Copy)]
pub struct Renderer {
    template: TemplateId,
    render: RenderFn,
}

impl PartialEq for Renderer {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for Renderer {}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("template", &self.template.id())
            .finish()
    }
}

impl Renderer {
    pub fn template(&self) -> TemplateId {
        self.template
    }

    /// Renders `document` with this variant.
    ///
    /// A document of the other kind is rendered with the same identifier resolved in
    /// its own family, so a mismatch still yields a view.
    pub fn render(&self, document: &Document, options: &RenderOptions) -> RenderedView {
        match (self.render, document) {
            (RenderFn::Resume(render), Document::Resume(resume)) => render(resume, options),
            (RenderFn::CoverLetter(render), Document::CoverLetter(letter)) => {
                render(letter, options)
            }
            _ => resolve(document.kind(), self.template.id()).render(document, options),
        }
    }
}

/// Maps a template identifier to a renderer. Total: unknown identifiers resolve to the
/// kind's default (`modern` for resumes, `professional` for cover letters).
pub fn resolve(kind: DocumentKind, template_id: &str) -> Renderer {
    let table = table_for(kind);
    let entry = table.lookup(template_id).unwrap_or_else(|| {
        let fallback = table.default_entry();
        debug!(
            kind = kind.as_str(),
            requested = template_id,
            fallback = fallback.template.id(),
            "Unknown template identifier, using default"
        );
        fallback
    });
    Renderer {
        template: entry.template,
        render: entry.render,
    }
}

/// One row of the template picker.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub is_default: bool,
}

pub fn catalog(kind: DocumentKind) -> Vec<TemplateInfo> {
    let table = table_for(kind);
    table
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| TemplateInfo {
            id: e.template.id(),
            name: e.name,
            description: e.description,
            is_default: i == table.default,
        })
        .collect()
}
