//! Canonical document model, the single source of truth for resume and cover-letter content.
//!
//! Snapshots arrive from an upstream producer as JSON. Every field is `#[serde(default)]`:
//! types are trusted, but any field may be absent or empty.

use serde::{Deserialize, Serialize};

/// Presented in place of an empty `end_date`.
pub const PRESENT: &str = "Present";

/// Paragraph boundary inside cover-letter body text.
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDocument {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
    /// Context handed to the bullet rewriter. Never exported.
    pub target_role: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    /// Order is significant: edits address bullets by position.
    pub bullet_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub school: String,
    pub graduation_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
}

/// Returns the trimmed value when it carries content.
pub fn populated(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn populated_opt(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(populated)
}

impl ResumeDocument {
    /// Email, phone and location, in that order, skipping the empty ones.
    pub fn contact_items(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .filter_map(|v| populated(v))
            .collect()
    }

    pub fn linkedin(&self) -> Option<&str> {
        populated_opt(&self.linkedin)
    }

    pub fn website(&self) -> Option<&str> {
        populated_opt(&self.website)
    }

    pub fn summary(&self) -> Option<&str> {
        populated_opt(&self.summary)
    }

    pub fn populated_skills(&self) -> Vec<&str> {
        self.skills.iter().filter_map(|s| populated(s)).collect()
    }

    pub fn populated_experience(&self) -> impl Iterator<Item = &ExperienceEntry> {
        self.experience.iter().filter(|e| e.is_populated())
    }

    pub fn populated_education(&self) -> impl Iterator<Item = &EducationEntry> {
        self.education.iter().filter(|e| e.is_populated())
    }

    pub fn populated_projects(&self) -> impl Iterator<Item = &ProjectEntry> {
        self.projects.iter().filter(|p| p.is_populated())
    }

    pub fn populated_certifications(&self) -> Vec<&str> {
        self.certifications
            .iter()
            .filter_map(|c| populated(c))
            .collect()
    }

    pub fn has_experience(&self) -> bool {
        self.populated_experience().next().is_some()
    }

    pub fn has_education(&self) -> bool {
        self.populated_education().next().is_some()
    }

    pub fn has_projects(&self) -> bool {
        self.populated_projects().next().is_some()
    }
}

impl ExperienceEntry {
    /// An entry is shown when any of its fields carries content.
    pub fn is_populated(&self) -> bool {
        populated(&self.title).is_some()
            || populated(&self.company).is_some()
            || populated(&self.start_date).is_some()
            || populated(&self.end_date).is_some()
            || self.bullet_points.iter().any(|b| populated(b).is_some())
    }

    /// `end_date`, or [`PRESENT`] when it is empty.
    pub fn end_label(&self) -> &str {
        populated(&self.end_date).unwrap_or(PRESENT)
    }

    /// `"{start}{separator}{end}"`; only the end label when the start date is missing.
    pub fn date_range(&self, separator: &str) -> String {
        match populated(&self.start_date) {
            Some(start) => format!("{start}{separator}{}", self.end_label()),
            None => self.end_label().to_string(),
        }
    }

    /// `"title | company"` with absent halves dropped.
    pub fn heading(&self) -> String {
        [&self.title, &self.company]
            .into_iter()
            .filter_map(|v| populated(v))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub fn populated_bullets(&self) -> impl Iterator<Item = &str> {
        self.bullet_points.iter().filter_map(|b| populated(b))
    }
}

impl EducationEntry {
    pub fn is_populated(&self) -> bool {
        self.fields().next().is_some()
    }

    /// Degree, school and graduation year, skipping the empty ones.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        [&self.degree, &self.school, &self.graduation_year]
            .into_iter()
            .filter_map(|v| populated(v))
    }
}

impl ProjectEntry {
    pub fn is_populated(&self) -> bool {
        populated(&self.name).is_some() || populated(&self.description).is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverLetterDocument {
    pub applicant_name: String,
    /// Free-form body. Paragraphs are separated by [`PARAGRAPH_DELIMITER`].
    pub content: String,
    pub company_name: Option<String>,
    pub position: Option<String>,
}

impl CoverLetterDocument {
    /// Splits the body on the blank-line delimiter, preserving order.
    ///
    /// Segments that are only whitespace (e.g. from three consecutive newlines) are
    /// dropped; surviving paragraphs are never merged.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.content
            .split(PARAGRAPH_DELIMITER)
            .map(|p| p.trim_matches('\n'))
            .filter(|p| !p.trim().is_empty())
            .collect()
    }

    pub fn company_name(&self) -> Option<&str> {
        populated_opt(&self.company_name)
    }

    pub fn position(&self) -> Option<&str> {
        populated_opt(&self.position)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tagged union
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }
}

/// A document snapshot as supplied by the upstream producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Document {
    Resume(ResumeDocument),
    CoverLetter(CoverLetterDocument),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Resume(_) => DocumentKind::Resume,
            Document::CoverLetter(_) => DocumentKind::CoverLetter,
        }
    }

    /// `full_name` or `applicant_name`, whichever this kind carries.
    pub fn owner_name(&self) -> &str {
        match self {
            Document::Resume(r) => &r.full_name,
            Document::CoverLetter(c) => &c.applicant_name,
        }
    }
}
