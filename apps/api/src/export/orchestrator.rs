//! Export dispatch.
//!
//! Text, HTML and Word are cheap and run inline. The PDF capture is CPU-bound and runs
//! on the blocking pool so the runtime keeps serving requests.

use std::sync::Arc;

use tracing::debug;

use crate::export::{html, pdf, text, word, ExportError, ExportFormat, ExportedArtifact, PdfSettings};
use crate::models::document::Document;
use crate::templates::view::RenderedView;

/// Serializes `document` (or, for PDF, `live_surface`) into `format`.
///
/// Never returns an artifact with an empty payload.
pub async fn export(
    document: &Document,
    live_surface: Option<Arc<RenderedView>>,
    format: ExportFormat,
    settings: &PdfSettings,
) -> Result<ExportedArtifact, ExportError> {
    let payload: Vec<u8> = match format {
        ExportFormat::Txt => text::serialize(document).into_bytes(),
        ExportFormat::Html => html::serialize(document).into_bytes(),
        ExportFormat::Word => word::serialize(document),
        ExportFormat::Pdf => {
            let surface = live_surface.ok_or_else(ExportError::missing_surface)?;
            let settings = settings.clone();
            tokio::task::spawn_blocking(move || pdf::capture(&surface, &settings))
                .await
                .map_err(|e| ExportError::Serialization(format!("PDF capture task failed: {e}")))??
        }
    };

    if payload.is_empty() {
        return Err(ExportError::Serialization(format!(
            "{} serializer produced an empty payload",
            format.as_str()
        )));
    }

    let artifact = ExportedArtifact::new(document, format, payload);
    debug!(
        "Exported {} ({} bytes) as {}",
        artifact.format.as_str(),
        artifact.payload.len(),
        artifact.suggested_filename
    );
    Ok(artifact)
}
