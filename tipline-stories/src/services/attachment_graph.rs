//! Attachment graph validation and idempotent link management.
//!
//! `prepare_attachment_graph` is the all-or-nothing gate run before a story
//! transaction touches attachment relations: every id must be a positive
//! integer and must reference an existing attachment the caller may use.
//! Partial acceptance is not permitted - one bad id fails the whole call.

use crate::error::{StoryError, StoryResult};
use serde::{Deserialize, Serialize};
use tipline_core::{Actor, AttachmentId, StoryId};
use tipline_storage::{keys, AttachmentStore, CacheBackend, RelationHints, StoryStore};

/// Validate raw attachment ids into a relation-insertion payload.
///
/// Non-privileged callers may only link attachments they own.
pub async fn prepare_attachment_graph(
    store: &dyn AttachmentStore,
    actor: &Actor,
    raw_ids: &[i64],
) -> StoryResult<Vec<AttachmentId>> {
    let mut ids = Vec::with_capacity(raw_ids.len());
    for raw in raw_ids {
        if *raw <= 0 {
            return Err(StoryError::invalid_argument(format!(
                "Attachment id {} is not a positive integer",
                raw
            )));
        }
        let id = AttachmentId::new(*raw);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Ok(ids);
    }

    let found = store.find_by_ids(&ids).await?;
    for id in &ids {
        let attachment = found
            .iter()
            .find(|a| a.id == *id)
            .ok_or_else(|| StoryError::not_found(format!("Attachment {} not found", id)))?;
        if !actor.is_privileged() && attachment.owner_id != actor.user_id {
            return Err(StoryError::permission_denied(format!(
                "Attachment {} is not owned by user {}",
                id, actor.user_id
            )));
        }
    }

    Ok(ids)
}

/// Outcome of an assign operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignResult {
    /// `false` when the link already existed (idempotent success).
    pub assigned: bool,
}

/// Link a single attachment to a story. Idempotent: re-assigning an
/// existing link reports `assigned: false` rather than erroring.
pub async fn assign_story_attachment(
    stories: &dyn StoryStore,
    attachments: &dyn AttachmentStore,
    cache: &dyn CacheBackend,
    actor: &Actor,
    story_id: StoryId,
    attachment_id: i64,
) -> StoryResult<AssignResult> {
    let validated = prepare_attachment_graph(attachments, actor, &[attachment_id]).await?;
    let attachment_id = validated[0];

    let (story, _) = stories
        .find_by_id(story_id, &RelationHints::default())
        .await?
        .ok_or_else(|| StoryError::story_not_found(story_id))?;
    if story.is_deleted() {
        return Err(StoryError::gone(story_id));
    }
    tipline_core::policy::ensure_owner(&story, actor)?;

    let mut tx = stories.begin().await?;
    let assigned = match tx.link_attachment(story_id, attachment_id).await {
        Ok(assigned) => assigned,
        Err(err) => {
            let _ = tx.rollback().await;
            return Err(err.into());
        }
    };
    tx.commit().await?;

    invalidate_story_detail(cache, story_id).await;
    Ok(AssignResult { assigned })
}

/// Unlink a single attachment from a story. Removing a link that does not
/// exist reports `NotFound`.
pub async fn remove_story_attachment(
    stories: &dyn StoryStore,
    cache: &dyn CacheBackend,
    actor: &Actor,
    story_id: StoryId,
    attachment_id: i64,
) -> StoryResult<()> {
    if attachment_id <= 0 {
        return Err(StoryError::invalid_argument(format!(
            "Attachment id {} is not a positive integer",
            attachment_id
        )));
    }
    let attachment_id = AttachmentId::new(attachment_id);

    let (story, _) = stories
        .find_by_id(story_id, &RelationHints::default())
        .await?
        .ok_or_else(|| StoryError::story_not_found(story_id))?;
    if story.is_deleted() {
        return Err(StoryError::gone(story_id));
    }
    tipline_core::policy::ensure_owner(&story, actor)?;

    let mut tx = stories.begin().await?;
    let removed = match tx.unlink_attachment(story_id, attachment_id).await {
        Ok(removed) => removed,
        Err(err) => {
            let _ = tx.rollback().await;
            return Err(err.into());
        }
    };
    if !removed {
        tx.rollback().await?;
        return Err(StoryError::not_found(format!(
            "Attachment {} is not linked to story {}",
            attachment_id, story_id
        )));
    }
    tx.commit().await?;

    invalidate_story_detail(cache, story_id).await;
    Ok(())
}

async fn invalidate_story_detail(cache: &dyn CacheBackend, story_id: StoryId) {
    if let Err(err) = cache.delete(&keys::story_key(story_id)).await {
        tracing::warn!(%story_id, %err, "story cache invalidation failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tipline_core::{UserId, UserRole};
    use tipline_storage::MemoryAttachmentStore;

    fn reporter(id: i64) -> Actor {
        Actor::new(UserId::new(id), UserRole::Reporter)
    }

    #[tokio::test]
    async fn test_rejects_non_positive_ids_wholesale() {
        let store = MemoryAttachmentStore::new();
        let good = store.seed(UserId::new(1), "a.jpg");
        let err = prepare_attachment_graph(&store, &reporter(1), &[good.id.as_i64(), 0])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn test_rejects_missing_attachments() {
        let store = MemoryAttachmentStore::new();
        let err = prepare_attachment_graph(&store, &reporter(1), &[42])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_ownership_enforced_for_reporters_not_editors() {
        let store = MemoryAttachmentStore::new();
        let theirs = store.seed(UserId::new(2), "theirs.jpg");

        let err = prepare_attachment_graph(&store, &reporter(1), &[theirs.id.as_i64()])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let editor = Actor::new(UserId::new(1), UserRole::Editor);
        let ids = prepare_attachment_graph(&store, &editor, &[theirs.id.as_i64()])
            .await
            .unwrap();
        assert_eq!(ids, vec![theirs.id]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_collapse() {
        let store = MemoryAttachmentStore::new();
        let mine = store.seed(UserId::new(1), "mine.jpg");
        let ids = prepare_attachment_graph(
            &store,
            &reporter(1),
            &[mine.id.as_i64(), mine.id.as_i64()],
        )
        .await
        .unwrap();
        assert_eq!(ids.len(), 1);
    }
}
