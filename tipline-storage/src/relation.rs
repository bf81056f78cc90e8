//! Tag and attachment ports - bulk existence checks and slug resolution.

use crate::StorageResult;
use async_trait::async_trait;
use tipline_core::{Attachment, AttachmentId, Tag, TagId};

/// Tag lookup and minting.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Resolve a tag by its normalized slug.
    async fn find_by_slug(&self, slug: &str) -> StorageResult<Option<Tag>>;

    /// Mint a new tag. Idempotent by slug: re-creating an existing slug
    /// returns the existing record.
    async fn create(&self, name: &str, slug: &str) -> StorageResult<Tag>;

    /// Subset of `ids` that exist, preserving input order.
    async fn existing_ids(&self, ids: &[TagId]) -> StorageResult<Vec<TagId>>;
}

/// Attachment lookup. Attachments are independently owned file records; the
/// story engine only ever checks existence and ownership here.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Load the given attachments; absent ids are simply missing from the
    /// result (callers diff against the request to find them).
    async fn find_by_ids(&self, ids: &[AttachmentId]) -> StorageResult<Vec<Attachment>>;
}
