pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::export::handlers as export;
use crate::session::handlers as sessions;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(templates::handle_list_templates))
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/document",
            put(sessions::handle_replace_document),
        )
        .route(
            "/api/v1/sessions/:id/template",
            put(sessions::handle_set_template),
        )
        .route("/api/v1/sessions/:id/view", get(sessions::handle_view))
        .route("/api/v1/sessions/:id/print", get(sessions::handle_print))
        // Editing
        .route(
            "/api/v1/sessions/:id/experience/:exp/bullets/:bullet",
            patch(sessions::handle_edit_bullet),
        )
        .route(
            "/api/v1/sessions/:id/experience/:exp/bullets/:bullet/rewrite",
            post(sessions::handle_request_rewrite),
        )
        .route(
            "/api/v1/sessions/:id/rewrites/:proposal/accept",
            post(sessions::handle_accept_rewrite),
        )
        .route(
            "/api/v1/sessions/:id/rewrites/:proposal",
            axum::routing::delete(sessions::handle_cancel_rewrite),
        )
        // Export
        .route(
            "/api/v1/sessions/:id/export/:format",
            get(export::handle_export),
        )
        .with_state(state)
}
