//! In-memory tag and attachment stores.

use crate::relation::{AttachmentStore, TagStore};
use crate::StorageResult;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tipline_core::{Attachment, AttachmentId, Tag, TagId, UserId};

#[derive(Debug, Default)]
struct TagState {
    next_id: i64,
    by_id: BTreeMap<i64, Tag>,
}

/// In-memory [`TagStore`].
#[derive(Default)]
pub struct MemoryTagStore {
    state: RwLock<TagState>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All tags currently minted, in id order. Test helper.
    pub fn all(&self) -> Vec<Tag> {
        self.state.read().by_id.values().cloned().collect()
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn find_by_slug(&self, slug: &str) -> StorageResult<Option<Tag>> {
        Ok(self
            .state
            .read()
            .by_id
            .values()
            .find(|t| t.slug == slug)
            .cloned())
    }

    async fn create(&self, name: &str, slug: &str) -> StorageResult<Tag> {
        let mut state = self.state.write();
        if let Some(existing) = state.by_id.values().find(|t| t.slug == slug) {
            return Ok(existing.clone());
        }
        state.next_id += 1;
        let next_id = state.next_id;
        let tag = Tag {
            id: TagId::new(next_id),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: Utc::now(),
        };
        state.by_id.insert(next_id, tag.clone());
        Ok(tag)
    }

    async fn existing_ids(&self, ids: &[TagId]) -> StorageResult<Vec<TagId>> {
        let state = self.state.read();
        Ok(ids
            .iter()
            .copied()
            .filter(|id| state.by_id.contains_key(&id.as_i64()))
            .collect())
    }
}

/// In-memory [`AttachmentStore`].
#[derive(Default)]
pub struct MemoryAttachmentStore {
    state: RwLock<BTreeMap<i64, Attachment>>,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attachment record, assigning its id. Test helper standing
    /// in for the (out-of-scope) upload pipeline.
    pub fn seed(&self, owner: UserId, file_name: &str) -> Attachment {
        let mut state = self.state.write();
        let id = state.keys().next_back().copied().unwrap_or(0) + 1;
        let attachment = Attachment {
            id: AttachmentId::new(id),
            owner_id: owner,
            file_name: file_name.to_string(),
            content_type: "application/octet-stream".to_string(),
            size_bytes: 0,
            created_at: Utc::now(),
        };
        state.insert(id, attachment.clone());
        attachment
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn find_by_ids(&self, ids: &[AttachmentId]) -> StorageResult<Vec<Attachment>> {
        let state = self.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.get(&id.as_i64()).cloned())
            .collect())
    }
}
