mod config;
mod editing;
mod errors;
mod export;
mod layout;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;
mod templates;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::editing::rewrite::{BulletRewriter, LlmBulletRewriter};
use crate::layout::fallback_font::FallbackFont;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let mut config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting folio v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the rewrite service, if configured
    let rewriter: Option<Arc<dyn BulletRewriter>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.rewrite_timeout)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(LlmBulletRewriter(llm)))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; bullet rewriting disabled");
            None
        }
    };

    // Font for PDF text outside WinAnsi. A configured font must load.
    let fallback_font = match &config.pdf_unicode_font {
        Some(path) => Some(FallbackFont::load(path)?),
        None => FallbackFont::discover(),
    };
    match &fallback_font {
        Some(font) => info!(
            "PDF fallback font: {} ({})",
            font.postscript_name, font.source
        ),
        None => warn!("No PDF fallback font found; PDF export of non-Latin text will fail"),
    }
    config.pdf.fallback_font = fallback_font.map(Arc::new);

    info!(
        "PDF capture at {}x, {}in margins; up to {} sessions",
        config.pdf.scale, config.pdf.margin_in, config.max_sessions
    );

    // Build app state
    let state = AppState {
        sessions: Arc::new(SessionStore::new(config.max_sessions)),
        rewriter,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
