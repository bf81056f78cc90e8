//! Request and response types for the lifecycle operations.

use serde::{Deserialize, Serialize};
use tipline_core::{
    Actor, AttachmentId, CountryId, Priority, Story, StoryId, StoryLocation, StoryRelations,
    StoryStatus, StoryType, TagId, Timestamp, UserId,
};

/// Scalar-or-array query parameter: `?status=DRAFT` and
/// `?status=DRAFT&status=SUBMITTED` both deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

// ============================================================================
// REQUESTS
// ============================================================================

/// Payload for creating a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStoryRequest {
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub story_type: Option<StoryType>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Defaults to `Draft`; restricted statuses need a privileged role.
    #[serde(default)]
    pub status: Option<StoryStatus>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub country_id: Option<CountryId>,
    #[serde(default)]
    pub parent_id: Option<StoryId>,
    #[serde(default)]
    pub location: Option<StoryLocation>,
    /// Tag names; unknown tags are minted.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Must reference existing attachments owned by the caller.
    #[serde(default)]
    pub attachment_ids: Vec<i64>,
}

impl CreateStoryRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            details: None,
            story_type: None,
            priority: None,
            status: None,
            is_public: None,
            country_id: None,
            parent_id: None,
            location: None,
            tags: Vec::new(),
            attachment_ids: Vec::new(),
        }
    }
}

/// Payload for updating a story. Absent fields are left untouched; present
/// tag/attachment sets replace the existing associations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateStoryRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<StoryStatus>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub country_id: Option<CountryId>,
    /// Restricted field: privileged roles only.
    #[serde(default)]
    pub story_type: Option<StoryType>,
    /// Restricted field: privileged roles only.
    #[serde(default)]
    pub parent_id: Option<StoryId>,
    #[serde(default)]
    pub location: Option<StoryLocation>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub attachment_ids: Option<Vec<i64>>,
    /// Optimistic-lock token; must match the stored version when present.
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl UpdateStoryRequest {
    /// Whether any mutating field is set.
    pub fn has_any_updates(&self) -> bool {
        self.title.is_some()
            || self.details.is_some()
            || self.priority.is_some()
            || self.status.is_some()
            || self.is_public.is_some()
            || self.country_id.is_some()
            || self.story_type.is_some()
            || self.parent_id.is_some()
            || self.location.is_some()
            || self.tags.is_some()
            || self.attachment_ids.is_some()
    }
}

/// Query parameters for listing stories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListStoriesQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// Sort field; must be on the allow-list.
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_dir: Option<tipline_storage::SortDir>,
    /// Free-text search term. Always bypasses the cache.
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub status: Option<OneOrMany<StoryStatus>>,
    #[serde(default)]
    pub story_type: Option<OneOrMany<StoryType>>,
    #[serde(default)]
    pub priority: Option<OneOrMany<Priority>>,
    /// Honored for privileged roles only; other callers are always scoped
    /// to their own stories.
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub country_id: Option<CountryId>,
    #[serde(default)]
    pub created_from: Option<Timestamp>,
    #[serde(default)]
    pub created_to: Option<Timestamp>,
    /// Relation hints: `tags`, `attachments`, `stats`.
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub no_cache: bool,
}

/// Query parameters for a detail read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetStoryQuery {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub shape: ResponseShape,
}

/// Response shaping for detail reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    Minimal,
    Summary,
    #[default]
    Full,
}

/// Query parameters for deletion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoveStoryQuery {
    #[serde(default)]
    pub permanent: bool,
    /// Required when soft-deleting a published story.
    #[serde(default)]
    pub reason: Option<String>,
}

// ============================================================================
// RESPONSES
// ============================================================================

/// API-safe story representation with permission-aware field stripping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryResponse {
    pub id: StoryId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub story_type: StoryType,
    pub priority: Priority,
    pub status: StoryStatus,
    pub user_id: UserId,
    pub version: i64,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<CountryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<StoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<StoryLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<TagId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachment_ids: Vec<AttachmentId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    // Privileged-only fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_reason: Option<String>,
}

impl StoryResponse {
    /// Transform a stored record into its API-safe shape for `actor`.
    ///
    /// Moderation fields (`last_modified_by`, the deletion triple) are
    /// stripped for non-privileged callers; `minimal` drops the free-text
    /// body and location, `summary` keeps a truncated body.
    pub fn from_story(
        story: &Story,
        relations: &StoryRelations,
        actor: &Actor,
        shape: ResponseShape,
    ) -> Self {
        let privileged = actor.is_privileged();
        let details = match shape {
            ResponseShape::Minimal => None,
            ResponseShape::Summary => Some(summarize(&story.details, 280)),
            ResponseShape::Full => Some(story.details.clone()),
        };
        Self {
            id: story.id,
            title: story.title.clone(),
            details,
            story_type: story.story_type,
            priority: story.priority,
            status: story.status,
            user_id: story.user_id,
            version: story.version,
            is_public: story.is_public,
            country_id: story.country_id,
            parent_id: story.parent_id,
            location: match shape {
                ResponseShape::Minimal => None,
                _ => story.location.clone(),
            },
            tag_ids: relations.tag_ids.clone(),
            attachment_ids: relations.attachment_ids.clone(),
            created_at: story.created_at,
            updated_at: story.updated_at,
            last_modified_by: if privileged {
                story.last_modified_by
            } else {
                None
            },
            deleted_at: if privileged { story.deleted_at } else { None },
            deleted_by: if privileged { story.deleted_by } else { None },
            deletion_reason: if privileged {
                story.deletion_reason.clone()
            } else {
                None
            },
        }
    }
}

fn summarize(details: &str, max_chars: usize) -> String {
    if details.chars().count() <= max_chars {
        details.to_string()
    } else {
        let mut summary: String = details.chars().take(max_chars).collect();
        summary.push('…');
        summary
    }
}

/// Pagination metadata returned alongside list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn compute(total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(limit as u64) as u32
        };
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1 && total_pages > 0,
        }
    }
}

/// One page of listed stories. This whole structure is what gets cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryListPage {
    pub items: Vec<StoryResponse>,
    pub meta: PaginationMeta,
}

/// How a story was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionType {
    Soft,
    Permanent,
}

/// Outcome of a remove operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionResult {
    pub story_id: StoryId,
    pub deletion_type: DeletionType,
    /// Only soft deletes can be recovered.
    pub can_recover: bool,
}
