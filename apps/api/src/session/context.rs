//! Rendering context: the local working copy of one snapshot and its live surface.
//!
//! Every commit re-renders before returning, so the surface always reflects the latest
//! committed edit. Commits are published on a `watch` channel held by the owning
//! session.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::editing::controller::{apply_guarded_bullet_edit, locate_bullet};
use crate::models::document::{Document, ResumeDocument};
use crate::session::SessionError;
use crate::templates::view::{BulletAddress, RenderedView};
use crate::templates::{resolve, RenderOptions, Renderer, TemplateId};

/// What the owning context sees after each commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Committed {
    pub revision: u64,
    pub document: Document,
}

pub struct RenderContext {
    working: Document,
    renderer: Renderer,
    options: RenderOptions,
    revision: u64,
    surface: Arc<RenderedView>,
    notifier: watch::Sender<Committed>,
}

impl RenderContext {
    /// Seeds a working copy from `snapshot` and renders it once.
    pub fn new(
        snapshot: Document,
        template_id: &str,
        options: RenderOptions,
    ) -> (Self, watch::Receiver<Committed>) {
        let renderer = resolve(snapshot.kind(), template_id);
        let surface = Arc::new(renderer.render(&snapshot, &options));
        let (notifier, receiver) = watch::channel(Committed {
            revision: 0,
            document: snapshot.clone(),
        });
        (
            Self {
                working: snapshot,
                renderer,
                options,
                revision: 0,
                surface,
                notifier,
            },
            receiver,
        )
    }

    pub fn document(&self) -> &Document {
        &self.working
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn template(&self) -> TemplateId {
        self.renderer.template()
    }

    /// The surface most recently rendered. This is what print and PDF capture read.
    pub fn surface(&self) -> Arc<RenderedView> {
        Arc::clone(&self.surface)
    }

    pub fn resume(&self) -> Result<&ResumeDocument, SessionError> {
        match &self.working {
            Document::Resume(resume) => Ok(resume),
            Document::CoverLetter(_) => Err(SessionError::NotResume),
        }
    }

    /// Current text of the bullet at `address`.
    pub fn bullet_text(&self, address: BulletAddress) -> Result<&str, SessionError> {
        Ok(locate_bullet(self.resume()?, address)?)
    }

    /// Replaces the working copy with a fresh external snapshot.
    ///
    /// A snapshot of another kind switches the template family as well.
    pub fn reseed(&mut self, snapshot: Document) {
        if snapshot.kind() != self.working.kind() {
            self.renderer = resolve(snapshot.kind(), self.renderer.template().id());
        }
        self.working = snapshot;
        self.commit();
    }

    /// Switches the template variant. Unknown identifiers fall back to the default.
    pub fn set_template(&mut self, template_id: &str) -> TemplateId {
        self.renderer = resolve(self.working.kind(), template_id);
        self.surface = Arc::new(self.renderer.render(&self.working, &self.options));
        self.renderer.template()
    }

    /// Applies a bullet edit to the working copy.
    ///
    /// On failure nothing changes: the working copy, revision and surface stay as
    /// they were.
    pub fn edit_bullet(
        &mut self,
        address: BulletAddress,
        expected_text: Option<&str>,
        new_text: &str,
    ) -> Result<Arc<RenderedView>, SessionError> {
        let edited = match apply_guarded_bullet_edit(self.resume()?, address, expected_text, new_text)
        {
            Ok(edited) => edited,
            Err(e) => {
                warn!("Bullet edit rejected: {e}");
                return Err(e.into());
            }
        };
        self.working = Document::Resume(edited);
        self.commit();
        Ok(self.surface())
    }

    fn commit(&mut self) {
        self.revision += 1;
        self.surface = Arc::new(self.renderer.render(&self.working, &self.options));
        debug!(
            "Committed revision {} ({})",
            self.revision,
            self.renderer.template().id()
        );
        // The owning session keeps a receiver for its whole lifetime.
        self.notifier.send_replace(Committed {
            revision: self.revision,
            document: self.working.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::controller::AddressingError;
    use crate::models::document::{CoverLetterDocument, ExperienceEntry};
    use crate::templates::view::BulletNode;
    use crate::templates::ResumeTemplate;
    use chrono::NaiveDate;

    fn options() -> RenderOptions {
        RenderOptions::new(true, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    fn snapshot(bullets: &[&str]) -> Document {
        Document::Resume(ResumeDocument {
            full_name: "Jane Doe".to_string(),
            experience: vec![ExperienceEntry {
                title: "Eng".to_string(),
                company: "Acme".to_string(),
                bullet_points: bullets.iter().map(|b| b.to_string()).collect(),
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    fn address(bullet_index: usize) -> BulletAddress {
        BulletAddress {
            experience_index: 0,
            bullet_index,
        }
    }

    #[test]
    fn test_edit_rerenders_and_notifies() {
        let (mut ctx, rx) = RenderContext::new(snapshot(&["a", "b"]), "modern", options());
        let surface = ctx.edit_bullet(address(1), None, "B!").unwrap();

        assert_eq!(ctx.revision(), 1);
        let texts: Vec<&str> = surface.bullets().iter().map(|b| b.text()).collect();
        assert_eq!(texts, vec!["a", "B!"]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow().revision, 1);
        assert_eq!(rx.borrow().document, *ctx.document());
    }

    #[test]
    fn test_failed_edit_leaves_state_untouched() {
        let (mut ctx, rx) = RenderContext::new(snapshot(&["a"]), "modern", options());
        let before = ctx.surface();

        let err = ctx.edit_bullet(address(3), None, "x").unwrap_err();
        assert!(matches!(err, SessionError::Addressing(_)));
        assert_eq!(ctx.revision(), 0);
        assert!(Arc::ptr_eq(&before, &ctx.surface()));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_stale_expected_text_is_rejected() {
        let (mut ctx, _rx) = RenderContext::new(snapshot(&["a"]), "modern", options());
        let err = ctx.edit_bullet(address(0), Some("z"), "x").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Addressing(AddressingError::Stale { .. })
        ));
    }

    #[test]
    fn test_reseed_replaces_working_copy() {
        let (mut ctx, rx) = RenderContext::new(snapshot(&["a"]), "classic", options());
        ctx.edit_bullet(address(0), None, "edited").unwrap();
        ctx.reseed(snapshot(&["fresh", "copy"]));

        assert_eq!(ctx.revision(), 2);
        assert_eq!(ctx.template(), TemplateId::Resume(ResumeTemplate::Classic));
        let texts: Vec<String> = ctx
            .surface()
            .bullets()
            .iter()
            .map(|b| b.text().to_string())
            .collect();
        assert_eq!(texts, vec!["fresh", "copy"]);
        assert_eq!(rx.borrow().document, snapshot(&["fresh", "copy"]));
    }

    #[test]
    fn test_surface_addresses_match_model() {
        let (ctx, _rx) = RenderContext::new(snapshot(&["a", "", "c"]), "executive", options());
        let addresses: Vec<Option<BulletAddress>> =
            ctx.surface().bullets().iter().map(|b| b.address()).collect();
        assert_eq!(
            addresses,
            vec![Some(address(0)), Some(address(1)), Some(address(2))]
        );
    }

    #[test]
    fn test_cover_letter_rejects_bullet_edits() {
        let letter = Document::CoverLetter(CoverLetterDocument {
            applicant_name: "Jane".to_string(),
            content: "Hi.".to_string(),
            ..Default::default()
        });
        let (mut ctx, _rx) = RenderContext::new(letter, "formal", options());
        assert!(matches!(
            ctx.edit_bullet(address(0), None, "x"),
            Err(SessionError::NotResume)
        ));
    }

    #[test]
    fn test_set_template_falls_back_and_rerenders() {
        let (mut ctx, _rx) = RenderContext::new(snapshot(&["a"]), "modern", options());
        let chosen = ctx.set_template("nonexistent");
        assert_eq!(chosen, TemplateId::Resume(ResumeTemplate::Modern));
        ctx.set_template("Creative");
        assert_eq!(ctx.surface().template, TemplateId::Resume(ResumeTemplate::Creative));
        assert!(matches!(
            ctx.surface().bullets()[0],
            BulletNode::Editable { .. }
        ));
    }
}
