//! Bullet rewrite round trip.
//!
//! The replacement text comes from an external generator behind `BulletRewriter`.
//! A suggestion becomes a `RewriteProposal` held by the session; nothing reaches the
//! document until the user accepts it.
//!
//! `AppState` carries an `Option<Arc<dyn BulletRewriter>>`; `None` when no API key is
//! configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::editing::prompts::{build_rewrite_prompt, REWRITE_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::templates::view::BulletAddress;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("rewrite service failed: {0}")]
    Llm(#[from] LlmError),

    #[error("rewrite service returned an empty bullet")]
    EmptySuggestion,
}

/// What the generator is asked to improve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    pub original_bullet: String,
    pub target_role: Option<String>,
    /// Free-form hint, e.g. "Eng at Acme".
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSuggestion {
    pub improved_bullet: String,
    #[serde(default)]
    pub improvements_made: Vec<String>,
    #[serde(default)]
    pub keywords_added: Vec<String>,
}

/// A suggestion waiting for accept or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteProposal {
    pub id: Uuid,
    pub address: BulletAddress,
    /// Bullet text when the rewrite was requested. Accepting fails if it changed.
    pub original_text: String,
    pub suggestion: RewriteSuggestion,
    pub created_at: DateTime<Utc>,
}

impl RewriteProposal {
    pub fn new(address: BulletAddress, original_text: String, suggestion: RewriteSuggestion) -> Self {
        Self {
            id: Uuid::new_v4(),
            address,
            original_text,
            suggestion,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait BulletRewriter: Send + Sync {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<RewriteSuggestion, RewriteError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmBulletRewriter
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmBulletRewriter(pub LlmClient);

#[async_trait]
impl BulletRewriter for LlmBulletRewriter {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<RewriteSuggestion, RewriteError> {
        let prompt = build_rewrite_prompt(request);
        let mut suggestion: RewriteSuggestion =
            self.0.complete_json(&prompt, REWRITE_SYSTEM).await?;

        suggestion.improved_bullet = suggestion.improved_bullet.trim().to_string();
        if suggestion.improved_bullet.is_empty() {
            return Err(RewriteError::EmptySuggestion);
        }
        debug!(
            "Bullet rewrite: {} improvements, {} keywords",
            suggestion.improvements_made.len(),
            suggestion.keywords_added.len()
        );
        Ok(suggestion)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm_client::tests::replying;
    use std::time::Duration;

    /// Deterministic rewriter for session and router tests.
    pub(crate) struct StubRewriter;

    #[async_trait]
    impl BulletRewriter for StubRewriter {
        async fn rewrite(
            &self,
            request: &RewriteRequest,
        ) -> Result<RewriteSuggestion, RewriteError> {
            Ok(RewriteSuggestion {
                improved_bullet: format!("Improved: {}", request.original_bullet),
                improvements_made: vec!["Stronger verb".to_string()],
                keywords_added: vec![],
            })
        }
    }

    #[test]
    fn test_suggestion_tolerates_missing_lists() {
        let s: RewriteSuggestion =
            serde_json::from_str(r#"{"improved_bullet": "Shipped X"}"#).unwrap();
        assert_eq!(s.improved_bullet, "Shipped X");
        assert!(s.improvements_made.is_empty());
        assert!(s.keywords_added.is_empty());
    }

    #[test]
    fn test_proposal_ids_are_unique() {
        let address = BulletAddress {
            experience_index: 0,
            bullet_index: 0,
        };
        let suggestion = RewriteSuggestion {
            improved_bullet: "x".to_string(),
            improvements_made: vec![],
            keywords_added: vec![],
        };
        let a = RewriteProposal::new(address, "a".into(), suggestion.clone());
        let b = RewriteProposal::new(address, "a".into(), suggestion);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_stub_rewriter_round_trip() {
        let request = RewriteRequest {
            original_bullet: "Built X".to_string(),
            target_role: None,
            context: None,
        };
        let s = StubRewriter.rewrite(&request).await.unwrap();
        assert_eq!(s.improved_bullet, "Improved: Built X");
    }

    fn llm_rewriter(endpoint: String) -> LlmBulletRewriter {
        let client = LlmClient::new("test-key".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_endpoint(endpoint);
        LlmBulletRewriter(client)
    }

    fn request() -> RewriteRequest {
        RewriteRequest {
            original_bullet: "Built X".to_string(),
            target_role: Some("Staff Engineer".to_string()),
            context: None,
        }
    }

    #[tokio::test]
    async fn test_llm_rewriter_accepts_fenced_reply() {
        let url = replying(
            "```json\n{\"improved_bullet\": \"  Shipped X to 2M users \", \
             \"improvements_made\": [\"Quantified reach\"]}\n```",
        )
        .await;
        let suggestion = llm_rewriter(url).rewrite(&request()).await.unwrap();
        assert_eq!(suggestion.improved_bullet, "Shipped X to 2M users");
        assert_eq!(suggestion.improvements_made, vec!["Quantified reach"]);
        assert!(suggestion.keywords_added.is_empty());
    }

    #[tokio::test]
    async fn test_llm_rewriter_rejects_blank_bullet() {
        let url = replying("```json\n{\"improved_bullet\": \"   \"}\n```").await;
        let err = llm_rewriter(url).rewrite(&request()).await.unwrap_err();
        assert!(matches!(err, RewriteError::EmptySuggestion));
    }

    #[tokio::test]
    async fn test_llm_rewriter_reports_non_json_reply() {
        let url = replying("Sure! Here is a better bullet.").await;
        let err = llm_rewriter(url).rewrite(&request()).await.unwrap_err();
        assert!(matches!(err, RewriteError::Llm(LlmError::Parse(_))));
    }
}
