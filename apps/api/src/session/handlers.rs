use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::editing::rewrite::RewriteProposal;
use crate::errors::AppError;
use crate::models::document::Document;
use crate::session::{Session, SessionError, SessionSummary};
use crate::state::AppState;
use crate::templates::html::display_page;
use crate::templates::print::print_document;
use crate::templates::view::BulletAddress;
use crate::templates::RenderOptions;

#[derive(Deserialize)]
pub struct TemplateQuery {
    pub template: Option<String>,
}

#[derive(Deserialize)]
pub struct TemplateRequest {
    pub template: String,
}

#[derive(Deserialize)]
pub struct BulletEditRequest {
    pub text: String,
    /// Text the client last displayed; the edit is refused if the bullet changed since.
    pub expected_text: Option<String>,
}

#[derive(Serialize)]
pub struct BulletEditResponse {
    pub revision: u64,
    pub address: BulletAddress,
    pub text: String,
}

pub(crate) async fn session_handle(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<Mutex<Session>>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))
}

fn edit_response(session: &Session, address: BulletAddress) -> Result<BulletEditResponse, AppError> {
    Ok(BulletEditResponse {
        revision: session.context().revision(),
        address,
        text: session.context().bullet_text(address)?.to_string(),
    })
}

/// POST /api/v1/sessions?template=
pub async fn handle_create_session(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
    Json(snapshot): Json<Document>,
) -> Result<(StatusCode, Json<SessionSummary>), AppError> {
    let options = RenderOptions::new(true, Utc::now().date_naive());
    let template = query.template.unwrap_or_default();
    let session = Session::new(snapshot, &template, options);
    let handle = state.sessions.insert(session).await?;
    let summary = handle.lock().await.summary();
    info!("Rendering {} with template '{}'", summary.kind, summary.template);
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(session.summary()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("session {id} not found")))
    }
}

/// PUT /api/v1/sessions/:id/document
pub async fn handle_replace_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(snapshot): Json<Document>,
) -> Result<Json<SessionSummary>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.reseed(snapshot);
    Ok(Json(session.summary()))
}

/// PUT /api/v1/sessions/:id/template
pub async fn handle_set_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.set_template(&req.template);
    Ok(Json(session.summary()))
}

/// GET /api/v1/sessions/:id/view
pub async fn handle_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let handle = session_handle(&state, id).await?;
    let surface = handle.lock().await.surface();
    Ok(Html(display_page(&surface)))
}

/// GET /api/v1/sessions/:id/print
pub async fn handle_print(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let handle = session_handle(&state, id).await?;
    let surface = handle.lock().await.surface();
    Ok(Html(print_document(&surface)))
}

/// PATCH /api/v1/sessions/:id/experience/:exp/bullets/:bullet
pub async fn handle_edit_bullet(
    State(state): State<AppState>,
    Path((id, experience_index, bullet_index)): Path<(Uuid, usize, usize)>,
    Json(req): Json<BulletEditRequest>,
) -> Result<Json<BulletEditResponse>, AppError> {
    let address = BulletAddress {
        experience_index,
        bullet_index,
    };
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.edit_bullet(address, req.expected_text.as_deref(), &req.text)?;
    Ok(Json(edit_response(&session, address)?))
}

/// POST /api/v1/sessions/:id/experience/:exp/bullets/:bullet/rewrite
///
/// The session lock is released while the rewriter runs. The suggestion is discarded
/// with 409 if the session was deleted or reseeded in the meantime. The proposal
/// records the bullet text it was based on so a later accept can detect edits.
pub async fn handle_request_rewrite(
    State(state): State<AppState>,
    Path((id, experience_index, bullet_index)): Path<(Uuid, usize, usize)>,
) -> Result<(StatusCode, Json<RewriteProposal>), AppError> {
    let rewriter = state.rewriter.clone().ok_or(AppError::RewriteUnavailable)?;
    let address = BulletAddress {
        experience_index,
        bullet_index,
    };
    let handle = session_handle(&state, id).await?;
    let pending = handle.lock().await.begin_rewrite(address)?;

    let suggestion = rewriter.rewrite(&pending.request).await?;

    let current = state.sessions.get(id).await;
    if !current.is_some_and(|current| Arc::ptr_eq(&current, &handle)) {
        return Err(SessionError::RewriteSuperseded.into());
    }
    let proposal = handle.lock().await.propose(pending, suggestion)?;
    debug!("Rewrite proposal {} for {:?}", proposal.id, address);
    Ok((StatusCode::CREATED, Json(proposal)))
}

/// POST /api/v1/sessions/:id/rewrites/:proposal/accept
pub async fn handle_accept_rewrite(
    State(state): State<AppState>,
    Path((id, proposal_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BulletEditResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    let address = session.accept(proposal_id)?;
    Ok(Json(edit_response(&session, address)?))
}

/// DELETE /api/v1/sessions/:id/rewrites/:proposal
pub async fn handle_cancel_rewrite(
    State(state): State<AppState>,
    Path((id, proposal_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let handle = session_handle(&state, id).await?;
    handle.lock().await.cancel(proposal_id)?;
    Ok(StatusCode::NO_CONTENT)
}
