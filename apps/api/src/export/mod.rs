//! Export serializers and the orchestrator that dispatches them.
//!
//! Text, HTML and Word read the canonical document. PDF reads the live surface.

pub mod handlers;
pub mod html;
pub mod orchestrator;
pub mod pdf;
pub mod text;
pub mod word;

use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::document::{populated, Document, DocumentKind};

pub use orchestrator::export;
pub use pdf::PdfSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Word,
    Html,
    Txt,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Word,
        ExportFormat::Html,
        ExportFormat::Txt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "word",
            ExportFormat::Html => "html",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "doc",
            ExportFormat::Html => "html",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Word => "application/msword",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let canonical = match wanted.as_str() {
            "doc" => "word",
            "text" => "txt",
            other => other,
        };
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == canonical)
            .ok_or_else(|| {
                format!("unsupported export format '{wanted}' (expected pdf, word, html or txt)")
            })
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// The PDF capture has no rendered surface to read.
    #[error("{0}")]
    MissingSurface(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ExportError {
    pub fn missing_surface() -> Self {
        ExportError::MissingSurface(
            "No rendered document is available to capture. Open the document view, then export to PDF again."
                .to_string(),
        )
    }
}

/// A finished export, ready to be delivered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedArtifact {
    pub format: ExportFormat,
    pub payload: Bytes,
    pub suggested_filename: String,
    pub content_type: &'static str,
}

impl ExportedArtifact {
    pub fn new(document: &Document, format: ExportFormat, payload: impl Into<Bytes>) -> Self {
        Self {
            format,
            payload: payload.into(),
            suggested_filename: suggested_filename(document, format),
            content_type: format.content_type(),
        }
    }
}

/// `"{name}_Resume.{ext}"` or `"{name}_Cover_Letter.{ext}"`.
///
/// Characters that are illegal in file names are removed. A missing name becomes
/// `Resume` or `Applicant`.
pub fn suggested_filename(document: &Document, format: ExportFormat) -> String {
    let (placeholder, suffix) = match document.kind() {
        DocumentKind::Resume => ("Resume", "Resume"),
        DocumentKind::CoverLetter => ("Applicant", "Cover_Letter"),
    };
    let name = sanitize_filename(document.owner_name());
    let name = populated(&name).unwrap_or(placeholder);
    format!("{name}_{suffix}.{}", format.extension())
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}
