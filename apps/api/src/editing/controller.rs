//! Bullet-level edits against the canonical resume model.
//!
//! `apply_bullet_edit` is pure: it returns a new document with exactly one bullet
//! replaced, or an `AddressingError` and leaves the input alone.

use serde::Serialize;
use thiserror::Error;

use crate::models::document::ResumeDocument;
use crate::templates::view::BulletAddress;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AddressingError {
    #[error("experience entry {experience_index} does not exist ({len} entries)")]
    ExperienceOutOfRange { experience_index: usize, len: usize },

    #[error(
        "bullet {bullet_index} does not exist in experience entry {experience_index} ({len} bullets)"
    )]
    BulletOutOfRange {
        experience_index: usize,
        bullet_index: usize,
        len: usize,
    },

    #[error(
        "bullet {bullet_index} of experience entry {experience_index} changed since it was displayed"
    )]
    Stale {
        experience_index: usize,
        bullet_index: usize,
    },
}

/// Checks that `address` names an existing bullet and returns its current text.
pub fn locate_bullet(
    document: &ResumeDocument,
    address: BulletAddress,
) -> Result<&str, AddressingError> {
    let entry = document.experience.get(address.experience_index).ok_or(
        AddressingError::ExperienceOutOfRange {
            experience_index: address.experience_index,
            len: document.experience.len(),
        },
    )?;
    entry
        .bullet_points
        .get(address.bullet_index)
        .map(String::as_str)
        .ok_or(AddressingError::BulletOutOfRange {
            experience_index: address.experience_index,
            bullet_index: address.bullet_index,
            len: entry.bullet_points.len(),
        })
}

/// Replaces the bullet at (`experience_index`, `bullet_index`) with `new_text`.
///
/// Empty replacement text is legal. Every other field and every sequence order is
/// carried over unchanged.
pub fn apply_bullet_edit(
    document: &ResumeDocument,
    experience_index: usize,
    bullet_index: usize,
    new_text: &str,
) -> Result<ResumeDocument, AddressingError> {
    locate_bullet(
        document,
        BulletAddress {
            experience_index,
            bullet_index,
        },
    )?;

    let mut edited = document.clone();
    edited.experience[experience_index].bullet_points[bullet_index] = new_text.to_string();
    Ok(edited)
}

/// Like [`apply_bullet_edit`], but refuses to write when the bullet no longer reads
/// `expected_text`.
pub fn apply_guarded_bullet_edit(
    document: &ResumeDocument,
    address: BulletAddress,
    expected_text: Option<&str>,
    new_text: &str,
) -> Result<ResumeDocument, AddressingError> {
    let current = locate_bullet(document, address)?;
    if let Some(expected) = expected_text {
        if current != expected {
            return Err(AddressingError::Stale {
                experience_index: address.experience_index,
                bullet_index: address.bullet_index,
            });
        }
    }
    apply_bullet_edit(
        document,
        address.experience_index,
        address.bullet_index,
        new_text,
    )
}
