//! Core entity structures.

use crate::{
    AttachmentId, CountryId, Priority, StoryId, StoryStatus, StoryType, TagId, Timestamp, UserId,
    UserRole,
};
use serde::{Deserialize, Serialize};

/// Story - the central entity. A user-submitted report moving through the
/// editorial workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub details: String,
    pub story_type: StoryType,
    pub priority: Priority,
    pub status: StoryStatus,
    /// Owner, set at creation. Not transferable through normal update paths.
    pub user_id: UserId,
    pub last_modified_by: Option<UserId>,
    /// Optimistic-lock token. Starts at 1, +1 per successful mutation.
    pub version: i64,
    pub is_public: bool,
    pub country_id: Option<CountryId>,
    /// Parent linkage for follow-up stories. Restricted field.
    pub parent_id: Option<StoryId>,
    pub location: Option<StoryLocation>,
    pub deleted_at: Option<Timestamp>,
    pub deleted_by: Option<UserId>,
    pub deletion_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Story {
    /// A story is soft-deleted once `deleted_at` is set; the row stays in
    /// storage but is hidden from normal reads.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some() || self.status == StoryStatus::Deleted
    }

    /// Whether the record is visible to arbitrary callers: the visibility
    /// flag is on, the type is not restricted, and the story has reached a
    /// post-publication status. Everything earlier in the pipeline requires
    /// ownership or privilege to view.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_public
            && !self.story_type.is_restricted()
            && matches!(
                self.status,
                StoryStatus::Published | StoryStatus::Archived
            )
    }
}

/// Optional geolocation attached to a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

/// Tag - reusable label, many-to-many with stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Normalized lookup key (trimmed, lower-cased).
    pub slug: String,
    pub created_at: Timestamp,
}

/// Attachment - independently owned file record. Stories hold only a
/// relation to it, never ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub owner_id: UserId,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
}

/// Tag and attachment associations loaded alongside a story.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryRelations {
    pub tag_ids: Vec<TagId>,
    pub attachment_ids: Vec<AttachmentId>,
}

/// Authenticated caller identity, as resolved by the (external) auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Whether this caller bypasses ownership scoping.
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    /// Whether this caller owns the given story.
    pub fn owns(&self, story: &Story) -> bool {
        story.user_id == self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_story(status: StoryStatus) -> Story {
        Story {
            id: StoryId::new(1),
            title: "Flood in X".to_string(),
            details: "River burst its banks overnight".to_string(),
            story_type: StoryType::Story,
            priority: Priority::Medium,
            status,
            user_id: UserId::new(10),
            last_modified_by: None,
            version: 1,
            is_public: true,
            country_id: None,
            parent_id: None,
            location: None,
            deleted_at: None,
            deleted_by: None,
            deletion_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_deleted_checks_both_marker_and_status() {
        let mut story = sample_story(StoryStatus::Submitted);
        assert!(!story.is_deleted());

        story.deleted_at = Some(Utc::now());
        assert!(story.is_deleted());

        let mut story = sample_story(StoryStatus::Deleted);
        story.deleted_at = None;
        assert!(story.is_deleted());
    }

    #[test]
    fn test_public_visibility() {
        assert!(sample_story(StoryStatus::Published).is_publicly_visible());
        assert!(!sample_story(StoryStatus::Draft).is_publicly_visible());

        let mut private = sample_story(StoryStatus::Published);
        private.is_public = false;
        assert!(!private.is_publicly_visible());

        let mut internal = sample_story(StoryStatus::Published);
        internal.story_type = StoryType::Internal;
        assert!(!internal.is_publicly_visible());
    }

    #[test]
    fn test_actor_ownership() {
        let story = sample_story(StoryStatus::Draft);
        let owner = Actor::new(UserId::new(10), UserRole::Reporter);
        let other = Actor::new(UserId::new(11), UserRole::Reporter);
        assert!(owner.owns(&story));
        assert!(!other.owns(&story));
    }
}
