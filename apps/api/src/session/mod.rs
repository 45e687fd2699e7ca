//! Sessions: the owning context of one rendering context.
//!
//! A session is created when a snapshot is supplied and discarded on delete. Its
//! mutex serializes state transitions: an edit or export settles before the next one
//! begins.

pub mod context;
pub mod handlers;
pub mod store;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::editing::controller::AddressingError;
use crate::editing::rewrite::{RewriteProposal, RewriteRequest, RewriteSuggestion};
use crate::models::document::{populated, Document};
use crate::templates::view::{BulletAddress, RenderedView};
use crate::templates::RenderOptions;

pub use context::{Committed, RenderContext};
pub use store::SessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("bullet edits apply to resumes only")]
    NotResume,

    #[error(transparent)]
    Addressing(#[from] AddressingError),

    #[error("rewrite proposal {0} not found")]
    ProposalNotFound(Uuid),

    #[error("session limit of {0} reached")]
    Capacity(usize),

    #[error("the document was replaced or closed while the rewrite ran; request it again")]
    RewriteSuperseded,
}

/// A rewrite in flight: what was sent to the rewriter and the seed it was taken from.
#[derive(Debug, Clone)]
pub struct PendingRewrite {
    pub address: BulletAddress,
    pub seed: u64,
    pub request: RewriteRequest,
}

pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    context: RenderContext,
    /// Latest commit published by the rendering context.
    committed: watch::Receiver<Committed>,
    proposals: HashMap<Uuid, RewriteProposal>,
    /// Counts reseeds. A rewrite started under an older seed is discarded.
    seed: u64,
}

/// Session state as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub kind: &'static str,
    pub template: String,
    pub revision: u64,
    pub document: Document,
    pub pending_rewrites: Vec<RewriteProposal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(snapshot: Document, template_id: &str, options: RenderOptions) -> Self {
        let (context, committed) = RenderContext::new(snapshot, template_id, options);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            context,
            committed,
            proposals: HashMap::new(),
            seed: 0,
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn surface(&self) -> std::sync::Arc<RenderedView> {
        self.context.surface()
    }

    /// The document as last published by the rendering context.
    pub fn committed(&self) -> Committed {
        self.committed.borrow().clone()
    }

    pub fn summary(&self) -> SessionSummary {
        let committed = self.committed();
        let mut pending: Vec<RewriteProposal> = self.proposals.values().cloned().collect();
        pending.sort_by_key(|p| p.created_at);
        SessionSummary {
            id: self.id,
            kind: committed.document.kind().as_str(),
            template: self.context.template().id().to_string(),
            revision: committed.revision,
            document: committed.document,
            pending_rewrites: pending,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Replaces the working copy. Pending proposals address the old copy and are dropped.
    pub fn reseed(&mut self, snapshot: Document) {
        self.context.reseed(snapshot);
        self.proposals.clear();
        self.seed += 1;
        self.touch();
    }

    pub fn set_template(&mut self, template_id: &str) {
        self.context.set_template(template_id);
        self.touch();
    }

    pub fn edit_bullet(
        &mut self,
        address: BulletAddress,
        expected_text: Option<&str>,
        new_text: &str,
    ) -> Result<std::sync::Arc<RenderedView>, SessionError> {
        let surface = self.context.edit_bullet(address, expected_text, new_text)?;
        self.touch();
        Ok(surface)
    }

    /// Starts a rewrite of the bullet at `address`. The session lock need not be held
    /// while the rewriter runs; `propose` checks the seed afterwards.
    pub fn begin_rewrite(&self, address: BulletAddress) -> Result<PendingRewrite, SessionError> {
        Ok(PendingRewrite {
            address,
            seed: self.seed,
            request: self.rewrite_request(address)?,
        })
    }

    /// What to send to the rewriter for the bullet at `address`.
    fn rewrite_request(&self, address: BulletAddress) -> Result<RewriteRequest, SessionError> {
        let original = self.context.bullet_text(address)?.to_string();
        let resume = self.context.resume()?;
        let entry = &resume.experience[address.experience_index];
        let context = match (populated(&entry.title), populated(&entry.company)) {
            (Some(title), Some(company)) => Some(format!("{title} at {company}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        };
        Ok(RewriteRequest {
            original_bullet: original,
            target_role: resume.target_role.clone(),
            context,
        })
    }

    /// Stores a suggestion for later accept or cancel. Fails if the session was
    /// reseeded after the rewrite began.
    pub fn propose(
        &mut self,
        pending: PendingRewrite,
        suggestion: RewriteSuggestion,
    ) -> Result<RewriteProposal, SessionError> {
        if pending.seed != self.seed {
            return Err(SessionError::RewriteSuperseded);
        }
        let proposal =
            RewriteProposal::new(pending.address, pending.request.original_bullet, suggestion);
        self.proposals.insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    /// Applies a proposal and returns the address it edited.
    /// Fails with `Stale` if the bullet changed since the rewrite was requested.
    pub fn accept(&mut self, proposal_id: Uuid) -> Result<BulletAddress, SessionError> {
        let proposal = self
            .proposals
            .remove(&proposal_id)
            .ok_or(SessionError::ProposalNotFound(proposal_id))?;
        self.edit_bullet(
            proposal.address,
            Some(&proposal.original_text),
            &proposal.suggestion.improved_bullet,
        )?;
        Ok(proposal.address)
    }

    pub fn cancel(&mut self, proposal_id: Uuid) -> Result<RewriteProposal, SessionError> {
        let proposal = self
            .proposals
            .remove(&proposal_id)
            .ok_or(SessionError::ProposalNotFound(proposal_id))?;
        self.touch();
        Ok(proposal)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
