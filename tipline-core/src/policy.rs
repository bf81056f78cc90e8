//! Access policy checker.
//!
//! Pure rules over `(Story, Actor)` deciding who may view or mutate a
//! record. Ownership is required whenever a story is non-public; restricted
//! types and statuses are visible to the owner or a privileged role only,
//! and a soft-deleted record is visible to privileged roles alone.

use crate::entities::{Actor, Story};
use crate::enums::StoryStatus;
use crate::error::PolicyError;

/// Whether `actor` may view `story` at all.
///
/// Privileged roles see everything, including soft-deleted records. Owners
/// see their own records unless deleted. Everyone else sees only publicly
/// visible records.
pub fn can_view(story: &Story, actor: &Actor) -> bool {
    if actor.is_privileged() {
        return true;
    }
    if story.status == StoryStatus::Deleted || story.deleted_at.is_some() {
        return false;
    }
    if actor.owns(story) {
        return true;
    }
    story.is_publicly_visible()
}

/// Validate view access, erring on denial.
pub fn ensure_can_view(story: &Story, actor: &Actor) -> Result<(), PolicyError> {
    if can_view(story, actor) {
        Ok(())
    } else {
        Err(PolicyError::denied(format!(
            "user {} may not view story {}",
            actor.user_id, story.id
        )))
    }
}

/// Mutation policy: the owner may mutate, and privileged roles may mutate
/// any record.
pub fn ensure_owner(story: &Story, actor: &Actor) -> Result<(), PolicyError> {
    if actor.owns(story) || actor.is_privileged() {
        Ok(())
    } else {
        Err(PolicyError::denied(format!(
            "user {} is not the owner of story {}",
            actor.user_id, story.id
        )))
    }
}

/// Strict ownership: the caller must be the literal owner, with no role
/// bypass. Used by the permanent-delete path.
pub fn ensure_owner_strict(story: &Story, actor: &Actor) -> Result<(), PolicyError> {
    if actor.owns(story) {
        Ok(())
    } else {
        Err(PolicyError::denied(format!(
            "user {} is not the owner of story {} (strict ownership required)",
            actor.user_id, story.id
        )))
    }
}
