//! Story persistence port.
//!
//! The port separates reads (on the store itself) from writes (on a
//! transaction handle). A transaction is atomic over the story row and its
//! tag/attachment relation rows: either `commit` makes everything visible or
//! nothing persists. Dropping a transaction without committing rolls it
//! back, so an abandoned request cannot leave half-applied state.

use crate::query::{PageSpec, QueryPage, RelationHints, SortSpec, StoryFilter};
use crate::StorageResult;
use async_trait::async_trait;
use tipline_core::{
    AttachmentId, CountryId, Priority, Story, StoryId, StoryLocation, StoryRelations, StoryStatus,
    StoryType, TagId, Timestamp, UserId,
};

/// Payload for inserting a story. The store assigns `id`, sets `version` to
/// 1 and stamps both timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStory {
    pub title: String,
    pub details: String,
    pub story_type: StoryType,
    pub priority: Priority,
    pub status: StoryStatus,
    pub user_id: UserId,
    pub is_public: bool,
    pub country_id: Option<CountryId>,
    pub parent_id: Option<StoryId>,
    pub location: Option<StoryLocation>,
}

/// Read side of the persistence port.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Load a story (deleted rows included - callers decide visibility).
    async fn find_by_id(
        &self,
        id: StoryId,
        hints: &RelationHints,
    ) -> StorageResult<Option<(Story, StoryRelations)>>;

    /// Filtered, sorted, paginated listing with the unpaginated total.
    async fn query(
        &self,
        filter: &StoryFilter,
        sort: &SortSpec,
        page: &PageSpec,
    ) -> StorageResult<QueryPage>;

    /// First story by the same owner with the same title created at or after
    /// `since`, for duplicate suppression.
    async fn find_duplicate(
        &self,
        owner: UserId,
        title: &str,
        since: Timestamp,
    ) -> StorageResult<Option<StoryId>>;

    /// Number of stories referencing `id` as their parent.
    async fn count_children(&self, id: StoryId) -> StorageResult<i64>;

    /// Open a write transaction.
    async fn begin(&self) -> StorageResult<Box<dyn StoryTx>>;
}

/// Write side of the persistence port, scoped to one transaction.
#[async_trait]
pub trait StoryTx: Send {
    /// Insert a story together with its tag and attachment relation rows.
    async fn insert(
        &mut self,
        story: NewStory,
        tags: &[TagId],
        attachments: &[AttachmentId],
    ) -> StorageResult<Story>;

    /// Persist a merged record under the optimistic-lock contract: the write
    /// applies only where the stored `version` equals `expected_version`,
    /// atomically, and stores the record with `version = expected_version +
    /// 1`. Zero rows affected is reported as
    /// [`StorageError::VersionConflict`](crate::StorageError::VersionConflict).
    async fn update(&mut self, merged: &Story, expected_version: i64) -> StorageResult<Story>;

    /// Replace (not merge) the story's tag relation set.
    async fn replace_tags(&mut self, id: StoryId, tags: &[TagId]) -> StorageResult<()>;

    /// Replace (not merge) the story's attachment relation set.
    async fn replace_attachments(
        &mut self,
        id: StoryId,
        attachments: &[AttachmentId],
    ) -> StorageResult<()>;

    /// Link one attachment. Returns `false` if the link already existed.
    async fn link_attachment(
        &mut self,
        id: StoryId,
        attachment: AttachmentId,
    ) -> StorageResult<bool>;

    /// Unlink one attachment. Returns `false` if no such link existed.
    async fn unlink_attachment(
        &mut self,
        id: StoryId,
        attachment: AttachmentId,
    ) -> StorageResult<bool>;

    /// Permanently remove the story row after cascading its tag and
    /// attachment relation rows. Tag and attachment records survive.
    async fn delete_story(&mut self, id: StoryId) -> StorageResult<()>;

    /// Make the transaction's writes visible.
    async fn commit(self: Box<Self>) -> StorageResult<()>;

    /// Discard the transaction's writes. Dropping without commit has the
    /// same effect.
    async fn rollback(self: Box<Self>) -> StorageResult<()>;
}
