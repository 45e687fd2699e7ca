use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::Response,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{export, ExportFormat, ExportedArtifact};
use crate::session::handlers::session_handle;
use crate::state::AppState;

/// RFC 5987 `attr-char` set: everything but unreserved characters is escaped.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// GET /api/v1/sessions/:id/export/:format
///
/// The session stays locked for the whole export, so a concurrent edit lands either
/// before the capture or after it, never halfway through.
pub async fn handle_export(
    State(state): State<AppState>,
    Path((id, format)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse().map_err(AppError::Validation)?;
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;

    let committed = session.committed();
    let artifact = export(
        &committed.document,
        Some(session.surface()),
        format,
        &state.config.pdf,
    )
    .await?;
    drop(session);

    info!(
        "Session {id} exported revision {} as {}",
        committed.revision,
        format.as_str()
    );
    attachment(artifact)
}

fn attachment(artifact: ExportedArtifact) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&content_disposition(&artifact.suggested_filename))
        .map_err(|e| anyhow::anyhow!("invalid Content-Disposition: {e}"))?;
    Response::builder()
        .header(header::CONTENT_TYPE, artifact.content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(artifact.payload))
        .map_err(|e| AppError::Internal(e.into()))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}
