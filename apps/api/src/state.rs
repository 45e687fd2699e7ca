use std::sync::Arc;

use crate::config::Config;
use crate::editing::rewrite::BulletRewriter;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    /// `None` when no API key is configured; rewrite requests then fail with 503.
    pub rewriter: Option<Arc<dyn BulletRewriter>>,
    pub config: Config,
}
