//! In-memory story store with transactional writes.

use crate::query::{PageSpec, QueryPage, RelationHints, SortDir, SortField, SortSpec, StoryFilter};
use crate::story::{NewStory, StoryStore, StoryTx};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tipline_core::{
    AttachmentId, Story, StoryId, StoryRelations, StoryStatus, TagId, Timestamp, UserId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct StoreState {
    next_id: i64,
    stories: BTreeMap<i64, Story>,
    tags_by_story: BTreeMap<i64, Vec<TagId>>,
    attachments_by_story: BTreeMap<i64, Vec<AttachmentId>>,
}

impl StoreState {
    fn relations(&self, id: i64, hints: &RelationHints) -> StoryRelations {
        StoryRelations {
            tag_ids: if hints.tags {
                self.tags_by_story.get(&id).cloned().unwrap_or_default()
            } else {
                Vec::new()
            },
            attachment_ids: if hints.attachments {
                self.attachments_by_story
                    .get(&id)
                    .cloned()
                    .unwrap_or_default()
            } else {
                Vec::new()
            },
        }
    }
}

/// In-memory [`StoryStore`] implementation.
///
/// Carries a query call counter so tests can assert whether a read was
/// served from cache or hit persistence.
#[derive(Clone, Default)]
pub struct MemoryStoryStore {
    state: Arc<Mutex<StoreState>>,
    query_calls: Arc<AtomicU64>,
}

impl MemoryStoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `query` round-trips served so far.
    pub fn query_count(&self) -> u64 {
        self.query_calls.load(Ordering::Relaxed)
    }
}

fn status_rank(status: StoryStatus) -> usize {
    StoryStatus::all()
        .iter()
        .position(|s| *s == status)
        .unwrap_or(usize::MAX)
}

fn matches_filter(story: &Story, filter: &StoryFilter) -> bool {
    if !filter.include_deleted && story.is_deleted() {
        return false;
    }
    if let Some(user_id) = filter.user_id {
        if story.user_id != user_id {
            return false;
        }
    }
    if !filter.statuses.is_empty() && !filter.statuses.contains(&story.status) {
        return false;
    }
    if !filter.story_types.is_empty() && !filter.story_types.contains(&story.story_type) {
        return false;
    }
    if !filter.priorities.is_empty() && !filter.priorities.contains(&story.priority) {
        return false;
    }
    if let Some(country_id) = filter.country_id {
        if story.country_id != Some(country_id) {
            return false;
        }
    }
    if let Some(from) = filter.created_from {
        if story.created_at < from {
            return false;
        }
    }
    if let Some(to) = filter.created_to {
        if story.created_at > to {
            return false;
        }
    }
    if let Some(term) = &filter.term {
        let needle = term.to_lowercase();
        if !story.title.to_lowercase().contains(&needle)
            && !story.details.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

fn sort_rows(rows: &mut [Story], sort: &SortSpec) {
    rows.sort_by(|a, b| {
        let ord = match sort.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Status => status_rank(a.status).cmp(&status_rank(b.status)),
        };
        // Stable tiebreak on id keeps pagination deterministic.
        let ord = ord.then(a.id.cmp(&b.id));
        match sort.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

#[async_trait]
impl StoryStore for MemoryStoryStore {
    async fn find_by_id(
        &self,
        id: StoryId,
        hints: &RelationHints,
    ) -> StorageResult<Option<(Story, StoryRelations)>> {
        let state = self.state.lock().await;
        Ok(state
            .stories
            .get(&id.as_i64())
            .cloned()
            .map(|story| {
                let relations = state.relations(id.as_i64(), hints);
                (story, relations)
            }))
    }

    async fn query(
        &self,
        filter: &StoryFilter,
        sort: &SortSpec,
        page: &PageSpec,
    ) -> StorageResult<QueryPage> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        let state = self.state.lock().await;

        let mut matched: Vec<Story> = state
            .stories
            .values()
            .filter(|s| matches_filter(s, filter))
            .cloned()
            .collect();
        sort_rows(&mut matched, sort);

        let total = matched.len() as u64;
        let hints = RelationHints::all();
        let rows = matched
            .into_iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .map(|story| {
                let relations = state.relations(story.id.as_i64(), &hints);
                (story, relations)
            })
            .collect();

        Ok(QueryPage { rows, total })
    }

    async fn find_duplicate(
        &self,
        owner: UserId,
        title: &str,
        since: Timestamp,
    ) -> StorageResult<Option<StoryId>> {
        let state = self.state.lock().await;
        Ok(state
            .stories
            .values()
            .find(|s| {
                s.user_id == owner
                    && !s.is_deleted()
                    && s.created_at >= since
                    && s.title.eq_ignore_ascii_case(title)
            })
            .map(|s| s.id))
    }

    async fn count_children(&self, id: StoryId) -> StorageResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .stories
            .values()
            .filter(|s| s.parent_id == Some(id) && !s.is_deleted())
            .count() as i64)
    }

    async fn begin(&self) -> StorageResult<Box<dyn StoryTx>> {
        let guard = self.state.clone().lock_owned().await;
        let snapshot = guard.clone();
        Ok(Box::new(MemoryStoryTx {
            guard: Some(guard),
            snapshot,
            committed: false,
        }))
    }
}

/// Transaction over the in-memory store. Holds the store lock for its whole
/// lifetime; rollback (explicit or by drop) restores the pre-transaction
/// snapshot.
struct MemoryStoryTx {
    guard: Option<OwnedMutexGuard<StoreState>>,
    snapshot: StoreState,
    committed: bool,
}

impl MemoryStoryTx {
    fn state(&mut self) -> &mut StoreState {
        self.guard
            .as_mut()
            .expect("transaction already finished")
    }
}

impl Drop for MemoryStoryTx {
    fn drop(&mut self) {
        if let Some(mut guard) = self.guard.take() {
            if !self.committed {
                *guard = std::mem::take(&mut self.snapshot);
            }
        }
    }
}

#[async_trait]
impl StoryTx for MemoryStoryTx {
    async fn insert(
        &mut self,
        story: NewStory,
        tags: &[TagId],
        attachments: &[AttachmentId],
    ) -> StorageResult<Story> {
        let now = Utc::now();
        let state = self.state();
        state.next_id += 1;
        let id = state.next_id;

        let record = Story {
            id: StoryId::new(id),
            title: story.title,
            details: story.details,
            story_type: story.story_type,
            priority: story.priority,
            status: story.status,
            user_id: story.user_id,
            last_modified_by: None,
            version: 1,
            is_public: story.is_public,
            country_id: story.country_id,
            parent_id: story.parent_id,
            location: story.location,
            deleted_at: None,
            deleted_by: None,
            deletion_reason: None,
            created_at: now,
            updated_at: now,
        };

        state.stories.insert(id, record.clone());
        state.tags_by_story.insert(id, tags.to_vec());
        state.attachments_by_story.insert(id, attachments.to_vec());
        Ok(record)
    }

    async fn update(&mut self, merged: &Story, expected_version: i64) -> StorageResult<Story> {
        let state = self.state();
        let id = merged.id.as_i64();
        let stored = state
            .stories
            .get_mut(&id)
            .ok_or(StorageError::NotFound { id: merged.id })?;

        if stored.version != expected_version {
            return Err(StorageError::VersionConflict {
                id: merged.id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        let mut next = merged.clone();
        next.version = expected_version + 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn replace_tags(&mut self, id: StoryId, tags: &[TagId]) -> StorageResult<()> {
        let state = self.state();
        if !state.stories.contains_key(&id.as_i64()) {
            return Err(StorageError::NotFound { id });
        }
        state.tags_by_story.insert(id.as_i64(), tags.to_vec());
        Ok(())
    }

    async fn replace_attachments(
        &mut self,
        id: StoryId,
        attachments: &[AttachmentId],
    ) -> StorageResult<()> {
        let state = self.state();
        if !state.stories.contains_key(&id.as_i64()) {
            return Err(StorageError::NotFound { id });
        }
        state
            .attachments_by_story
            .insert(id.as_i64(), attachments.to_vec());
        Ok(())
    }

    async fn link_attachment(
        &mut self,
        id: StoryId,
        attachment: AttachmentId,
    ) -> StorageResult<bool> {
        let state = self.state();
        if !state.stories.contains_key(&id.as_i64()) {
            return Err(StorageError::NotFound { id });
        }
        let links = state.attachments_by_story.entry(id.as_i64()).or_default();
        if links.contains(&attachment) {
            return Ok(false);
        }
        links.push(attachment);
        Ok(true)
    }

    async fn unlink_attachment(
        &mut self,
        id: StoryId,
        attachment: AttachmentId,
    ) -> StorageResult<bool> {
        let state = self.state();
        if !state.stories.contains_key(&id.as_i64()) {
            return Err(StorageError::NotFound { id });
        }
        let links = state.attachments_by_story.entry(id.as_i64()).or_default();
        let before = links.len();
        links.retain(|a| *a != attachment);
        Ok(links.len() < before)
    }

    async fn delete_story(&mut self, id: StoryId) -> StorageResult<()> {
        let state = self.state();
        if state.stories.remove(&id.as_i64()).is_none() {
            return Err(StorageError::NotFound { id });
        }
        state.tags_by_story.remove(&id.as_i64());
        state.attachments_by_story.remove(&id.as_i64());
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> StorageResult<()> {
        self.committed = true;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        // Drop restores the snapshot.
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tipline_core::{Priority, StoryType};

    fn new_story(title: &str, owner: i64) -> NewStory {
        NewStory {
            title: title.to_string(),
            details: "details".to_string(),
            story_type: StoryType::Story,
            priority: Priority::Medium,
            status: StoryStatus::Draft,
            user_id: UserId::new(owner),
            is_public: true,
            country_id: None,
            parent_id: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_version_one() {
        let store = MemoryStoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let story = tx
            .insert(new_story("First", 1), &[TagId::new(5)], &[])
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(story.id.is_valid());
        assert_eq!(story.version, 1);

        let (loaded, relations) = store
            .find_by_id(story.id, &RelationHints::all())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.title, "First");
        assert_eq!(relations.tag_ids, vec![TagId::new(5)]);
    }

    #[tokio::test]
    async fn test_update_applies_version_predicate() {
        let store = MemoryStoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let story = tx.insert(new_story("First", 1), &[], &[]).await.unwrap();
        tx.commit().await.unwrap();

        let mut merged = story.clone();
        merged.title = "Updated".to_string();

        let mut tx = store.begin().await.unwrap();
        let updated = tx.update(&merged, 1).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(updated.version, 2);

        // A stale expected_version loses the race and changes nothing.
        let mut tx = store.begin().await.unwrap();
        let err = tx.update(&merged, 1).await.unwrap_err();
        tx.rollback().await.unwrap();
        assert_eq!(
            err,
            StorageError::VersionConflict {
                id: story.id,
                expected: 1,
                actual: 2,
            }
        );
        let (loaded, _) = store
            .find_by_id(story.id, &RelationHints::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.title, "Updated");
    }

    #[tokio::test]
    async fn test_dropping_transaction_rolls_back() {
        let store = MemoryStoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert(new_story("Ghost", 1), &[], &[]).await.unwrap();
            // Neither commit nor rollback - the request was abandoned.
        }
        let page = store
            .query(
                &StoryFilter::default(),
                &SortSpec::default(),
                &PageSpec::new(1, 10),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_explicit_rollback_discards_writes() {
        let store = MemoryStoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert(new_story("Ghost", 1), &[], &[]).await.unwrap();
        tx.rollback().await.unwrap();

        let page = store
            .query(
                &StoryFilter::default(),
                &SortSpec::default(),
                &PageSpec::new(1, 10),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_delete_story_cascades_relation_rows() {
        let store = MemoryStoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let story = tx
            .insert(
                new_story("Doomed", 1),
                &[TagId::new(1)],
                &[AttachmentId::new(2)],
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.delete_story(story.id).await.unwrap();
        tx.commit().await.unwrap();

        assert!(store
            .find_by_id(story.id, &RelationHints::all())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_link_attachment_is_idempotent() {
        let store = MemoryStoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let story = tx.insert(new_story("Linked", 1), &[], &[]).await.unwrap();
        assert!(tx
            .link_attachment(story.id, AttachmentId::new(9))
            .await
            .unwrap());
        assert!(!tx
            .link_attachment(story.id, AttachmentId::new(9))
            .await
            .unwrap());
        assert!(tx
            .unlink_attachment(story.id, AttachmentId::new(9))
            .await
            .unwrap());
        assert!(!tx
            .unlink_attachment(story.id, AttachmentId::new(9))
            .await
            .unwrap());
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_query_filters_sorts_and_paginates() {
        let store = MemoryStoryStore::new();
        let mut tx = store.begin().await.unwrap();
        for i in 0..5 {
            let mut s = new_story(&format!("Story {}", i), 1);
            if i % 2 == 0 {
                s.status = StoryStatus::Submitted;
            }
            tx.insert(s, &[], &[]).await.unwrap();
        }
        tx.commit().await.unwrap();

        let filter = StoryFilter {
            statuses: vec![StoryStatus::Submitted],
            ..Default::default()
        };
        let page = store
            .query(&filter, &SortSpec::default(), &PageSpec::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn test_find_duplicate_matches_title_case_insensitively() {
        let store = MemoryStoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let story = tx
            .insert(new_story("Flood in X", 7), &[], &[])
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let since = Utc::now() - chrono::Duration::hours(24);
        let hit = store
            .find_duplicate(UserId::new(7), "flood in x", since)
            .await
            .unwrap();
        assert_eq!(hit, Some(story.id));

        let miss = store
            .find_duplicate(UserId::new(8), "flood in x", since)
            .await
            .unwrap();
        assert_eq!(miss, None);
    }
}
