//! Story lifecycle manager - the orchestrator behind the five operations.
//!
//! Composes the persistence port, the tag/attachment graph validators, the
//! workflow state machine, the access policy, the cache gateway, the
//! creation rate limiter and the event sink. Every collaborator is
//! constructor-injected; there is no ambient state.
//!
//! Ordering contract for writes: validation and permission checks run
//! before a transaction is opened; failures inside the transaction roll
//! back before the error propagates; cache invalidation and event emission
//! happen only after a successful commit, and neither can fail the call.

use crate::context::RequestContext;
use crate::error::{StoryError, StoryResult};
use crate::events::{EventEnvelope, EventSink, StoryEvent};
use crate::services::attachment_graph::prepare_attachment_graph;
use crate::services::rate_limit::{CreationRateLimiter, RateDecision};
use crate::services::tag_graph::prepare_tag_graph;
use crate::types::{
    CreateStoryRequest, DeletionResult, DeletionType, GetStoryQuery, ListStoriesQuery,
    PaginationMeta, ResponseShape, StoryListPage, StoryResponse, RemoveStoryQuery,
    UpdateStoryRequest,
};
use crate::validation::{sanitize_text, ValidateNonEmpty, ValidatePositive};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tipline_core::{
    policy, workflow, CountryId, Priority, Story, StoryId, StoryRelations, StoryStatus,
    StoryType, TiplineConfig, UserId,
};
use tipline_storage::{
    keys, AttachmentStore, CacheBackend, CacheStats, NewStory, PageSpec, RelationHints, SortDir,
    SortField, SortSpec, StoryFilter, StoryStore, TagStore,
};

const DEFAULT_PAGE_SIZE: u32 = 20;

/// The story lifecycle manager.
pub struct StoryService {
    store: Arc<dyn StoryStore>,
    tags: Arc<dyn TagStore>,
    attachments: Arc<dyn AttachmentStore>,
    cache: Arc<dyn CacheBackend>,
    events: Arc<dyn EventSink>,
    limiter: CreationRateLimiter,
    config: TiplineConfig,
}

/// Serialized form of a cached detail read.
#[derive(Serialize, Deserialize)]
struct CachedStory {
    story: Story,
    relations: StoryRelations,
}

impl StoryService {
    /// Build a service from its collaborators. The configuration is
    /// validated here so an invalid one never reaches a running engine.
    pub fn new(
        store: Arc<dyn StoryStore>,
        tags: Arc<dyn TagStore>,
        attachments: Arc<dyn AttachmentStore>,
        cache: Arc<dyn CacheBackend>,
        events: Arc<dyn EventSink>,
        config: TiplineConfig,
    ) -> StoryResult<Self> {
        config
            .validate()
            .map_err(|err| StoryError::invalid_argument(err.to_string()))?;
        Ok(Self {
            store,
            tags,
            attachments,
            cache: cache.clone(),
            events,
            limiter: CreationRateLimiter::new(cache),
            config,
        })
    }

    /// Cache statistics, off the hot path.
    pub async fn cache_stats(&self) -> StoryResult<CacheStats> {
        Ok(self.cache.stats().await?)
    }

    // ========================================================================
    // LIST
    // ========================================================================

    /// List stories visible to the caller, cache-first.
    pub async fn list_stories(
        &self,
        query: &ListStoriesQuery,
        ctx: &RequestContext,
    ) -> StoryResult<StoryListPage> {
        let actor = ctx.actor;

        let page = query.page.unwrap_or(1);
        page.validate_positive("page")?;
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        limit.validate_positive("limit")?;
        if limit > self.config.max_page_size {
            return Err(StoryError::invalid_argument(format!(
                "Field 'limit' must be at most {}",
                self.config.max_page_size
            )));
        }

        let sort = resolve_sort(query)?;
        let hints = parse_includes(&query.include)?;
        let term = query
            .term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        // Non-privileged callers are always scoped to their own stories; an
        // explicit user filter is honored for privileged roles only.
        let user_scope = if actor.is_privileged() {
            query.user_id
        } else {
            Some(actor.user_id)
        };
        let include_deleted = query.include_deleted && actor.is_privileged();

        let filter = StoryFilter {
            user_id: user_scope,
            statuses: query
                .status
                .clone()
                .map(|s| s.into_vec())
                .unwrap_or_default(),
            story_types: query
                .story_type
                .clone()
                .map(|s| s.into_vec())
                .unwrap_or_default(),
            priorities: query
                .priority
                .clone()
                .map(|s| s.into_vec())
                .unwrap_or_default(),
            country_id: query.country_id,
            created_from: query.created_from,
            created_to: query.created_to,
            term: term.clone(),
            include_deleted,
        };
        let page_spec = PageSpec::new(page, limit);

        let bypass = query.no_cache
            || term.is_some()
            || hints.stats
            || limit > self.config.cache_bypass_limit;
        let cache_key = if bypass {
            None
        } else {
            let params = cache_params(&filter, &sort, &page_spec, &hints);
            Some(keys::list_key(&actor, &params))
        };

        if let Some(key) = &cache_key {
            match self.cache.get(key).await {
                Ok(Some(raw)) => match serde_json::from_str::<StoryListPage>(&raw) {
                    Ok(cached) => {
                        tracing::debug!(%key, "list served from cache");
                        return Ok(cached);
                    }
                    Err(err) => {
                        tracing::warn!(%key, %err, "dropping undecodable list cache entry")
                    }
                },
                Ok(None) => {}
                Err(err) => tracing::warn!(%key, %err, "list cache read failed, bypassing"),
            }
        }

        let result = self.store.query(&filter, &sort, &page_spec).await?;
        let items: Vec<StoryResponse> = result
            .rows
            .iter()
            .map(|(story, relations)| {
                StoryResponse::from_story(story, relations, &actor, ResponseShape::Full)
            })
            .collect();
        let meta = PaginationMeta::compute(result.total, page, limit);
        let response = StoryListPage { items, meta };

        // Empty result sets are not worth a cache slot.
        if let Some(key) = &cache_key {
            if !response.items.is_empty() {
                match serde_json::to_string(&response) {
                    Ok(raw) => {
                        if let Err(err) =
                            self.cache.set(key, &raw, self.config.cache_ttl).await
                        {
                            tracing::warn!(%key, %err, "list cache write failed");
                        }
                    }
                    Err(err) => tracing::warn!(%err, "list page serialization failed"),
                }
            }
        }

        Ok(response)
    }

    // ========================================================================
    // GET
    // ========================================================================

    /// Load one story, enforcing soft-delete visibility and access policy.
    pub async fn get_story(
        &self,
        id: i64,
        query: &GetStoryQuery,
        ctx: &RequestContext,
    ) -> StoryResult<StoryResponse> {
        id.validate_positive("id")?;
        parse_includes(&query.include)?;
        let actor = ctx.actor;
        let story_id = StoryId::new(id);

        let Some((story, relations)) = self.load_story_cached(story_id).await? else {
            return Err(StoryError::story_not_found(story_id));
        };

        if story.is_deleted() && !(query.include_deleted && actor.is_privileged()) {
            return Err(StoryError::story_not_found(story_id));
        }
        policy::ensure_can_view(&story, &actor)?;

        Ok(StoryResponse::from_story(
            &story,
            &relations,
            &actor,
            query.shape,
        ))
    }

    // ========================================================================
    // CREATE
    // ========================================================================

    /// Create a story with its tag and attachment relations, atomically.
    pub async fn create_story(
        &self,
        payload: CreateStoryRequest,
        ctx: &RequestContext,
    ) -> StoryResult<StoryResponse> {
        let actor = ctx.actor;

        let title = sanitize_text(&payload.title, self.config.title_max_chars);
        title.validate_non_empty("title")?;
        let details = sanitize_text(
            payload.details.as_deref().unwrap_or(""),
            self.config.details_max_chars,
        );

        let story_type = payload.story_type.unwrap_or(StoryType::Story);
        let status = payload.status.unwrap_or(StoryStatus::Draft);
        let priority = payload.priority.unwrap_or(Priority::Medium);

        if story_type.is_restricted() && !actor.is_privileged() {
            return Err(StoryError::permission_denied(format!(
                "Creating {} stories requires a privileged role",
                story_type
            )));
        }
        if status.is_restricted() && !actor.is_privileged() {
            return Err(StoryError::permission_denied(format!(
                "Creating stories in status {} requires a privileged role",
                status
            )));
        }
        if let Some(parent_id) = payload.parent_id {
            parent_id.as_i64().validate_positive("parent_id")?;
        }
        validate_business_rules(status, &details, payload.country_id)?;

        // Quota check. A broken counter store fails open with a warning;
        // a confirmed over-limit always blocks.
        let ceiling = if actor.is_privileged() {
            self.config.rate_limit_per_window_privileged
        } else {
            self.config.rate_limit_per_window
        };
        match self
            .limiter
            .check_and_count(actor.user_id, ceiling, self.config.rate_limit_window)
            .await
        {
            RateDecision::Allowed => {}
            RateDecision::Limited { limit } => {
                return Err(StoryError::rate_limited(
                    limit,
                    self.config.rate_limit_window.as_secs(),
                ))
            }
            RateDecision::Unavailable => {
                tracing::warn!(user = %actor.user_id, "rate limiter unavailable, allowing creation")
            }
        }

        // Duplicate suppression, same fail-open contract as the limiter.
        let since = Utc::now()
            - chrono::Duration::from_std(self.config.duplicate_window)
                .unwrap_or_else(|_| chrono::Duration::hours(24));
        match self
            .store
            .find_duplicate(actor.user_id, &title, since)
            .await
        {
            Ok(Some(existing)) => return Err(StoryError::duplicate_detected(existing)),
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "duplicate check failed, allowing creation"),
        }

        let tag_ids = prepare_tag_graph(self.tags.as_ref(), &payload.tags).await?;
        let attachment_ids =
            prepare_attachment_graph(self.attachments.as_ref(), &actor, &payload.attachment_ids)
                .await?;

        let new_story = NewStory {
            title,
            details,
            story_type,
            priority,
            status,
            user_id: actor.user_id,
            is_public: payload.is_public.unwrap_or(true),
            country_id: payload.country_id,
            parent_id: payload.parent_id,
            location: payload.location,
        };

        let mut tx = self.store.begin().await?;
        let story = match tx.insert(new_story, &tag_ids, &attachment_ids).await {
            Ok(story) => story,
            Err(err) => {
                let _ = tx.rollback().await;
                return Err(err.into());
            }
        };
        tx.commit().await?;

        self.invalidate_after_write(story.id, story.user_id, actor.user_id)
            .await;
        self.emit(
            actor.user_id,
            StoryEvent::StoryCreated {
                id: story.id,
                owner: story.user_id,
                status: story.status,
                story_type: story.story_type,
            },
        )
        .await;

        let relations = StoryRelations {
            tag_ids,
            attachment_ids,
        };
        Ok(StoryResponse::from_story(
            &story,
            &relations,
            &actor,
            ResponseShape::Full,
        ))
    }

    // ========================================================================
    // UPDATE
    // ========================================================================

    /// Update a story under the optimistic-lock and workflow contracts.
    pub async fn update_story(
        &self,
        id: i64,
        payload: UpdateStoryRequest,
        ctx: &RequestContext,
    ) -> StoryResult<StoryResponse> {
        let actor = ctx.actor;
        id.validate_positive("id")?;
        let story_id = StoryId::new(id);

        if let Some(expected) = payload.expected_version {
            expected.validate_positive("expected_version")?;
        }
        if !payload.has_any_updates() {
            return Err(StoryError::invalid_argument(
                "At least one field must be provided for update",
            ));
        }

        // Deleted records load here so the error classification is right.
        let Some((story, relations)) = self
            .store
            .find_by_id(story_id, &RelationHints::all())
            .await?
        else {
            return Err(StoryError::story_not_found(story_id));
        };
        if story.is_deleted() {
            return Err(StoryError::gone(story_id));
        }

        policy::ensure_owner(&story, &actor)?;

        if (payload.story_type.is_some() || payload.parent_id.is_some()) && !actor.is_privileged()
        {
            return Err(StoryError::permission_denied(
                "Changing the story type or parent linkage requires a privileged role",
            ));
        }

        // Optimistic-lock pre-check; the port re-evaluates the predicate
        // atomically at write time, this just classifies early.
        if let Some(expected) = payload.expected_version {
            if expected != story.version {
                return Err(StoryError::version_conflict(
                    story_id,
                    expected,
                    story.version,
                ));
            }
        }

        // The workflow graph decides reachability first; privilege then
        // gates the editorial tail of the reachable statuses.
        if let Some(next_status) = payload.status {
            workflow::ensure_transition(story.status, next_status)?;
            if next_status.is_restricted() && !actor.is_privileged() {
                return Err(StoryError::permission_denied(format!(
                    "Setting status {} requires a privileged role",
                    next_status
                )));
            }
        }

        let mut merged = story.clone();
        if let Some(title) = &payload.title {
            let title = sanitize_text(title, self.config.title_max_chars);
            title.validate_non_empty("title")?;
            merged.title = title;
        }
        if let Some(details) = &payload.details {
            merged.details = sanitize_text(details, self.config.details_max_chars);
        }
        if let Some(priority) = payload.priority {
            merged.priority = priority;
        }
        if let Some(status) = payload.status {
            merged.status = status;
        }
        if let Some(is_public) = payload.is_public {
            merged.is_public = is_public;
        }
        if let Some(country_id) = payload.country_id {
            merged.country_id = Some(country_id);
        }
        if let Some(story_type) = payload.story_type {
            merged.story_type = story_type;
        }
        if let Some(parent_id) = payload.parent_id {
            parent_id.as_i64().validate_positive("parent_id")?;
            merged.parent_id = Some(parent_id);
        }
        if let Some(location) = &payload.location {
            merged.location = Some(location.clone());
        }
        merged.updated_at = Utc::now();
        merged.last_modified_by = Some(actor.user_id);

        validate_business_rules(merged.status, &merged.details, merged.country_id)?;

        let new_tags = match &payload.tags {
            Some(names) => Some(prepare_tag_graph(self.tags.as_ref(), names).await?),
            None => None,
        };
        let new_attachments = match &payload.attachment_ids {
            Some(ids) => {
                Some(prepare_attachment_graph(self.attachments.as_ref(), &actor, ids).await?)
            }
            None => None,
        };

        let expected_version = payload.expected_version.unwrap_or(story.version);
        let previous_status = story.status;

        let mut tx = self.store.begin().await?;
        let updated = match tx.update(&merged, expected_version).await {
            Ok(updated) => updated,
            Err(err) => {
                let _ = tx.rollback().await;
                return Err(err.into());
            }
        };
        if let Some(tags) = &new_tags {
            if let Err(err) = tx.replace_tags(story_id, tags).await {
                let _ = tx.rollback().await;
                return Err(err.into());
            }
        }
        if let Some(attachments) = &new_attachments {
            if let Err(err) = tx.replace_attachments(story_id, attachments).await {
                let _ = tx.rollback().await;
                return Err(err.into());
            }
        }
        tx.commit().await?;

        self.invalidate_after_write(story_id, updated.user_id, actor.user_id)
            .await;
        self.emit(
            actor.user_id,
            StoryEvent::StoryUpdated {
                id: story_id,
                previous_status,
                new_status: updated.status,
                version: updated.version,
            },
        )
        .await;

        let relations = StoryRelations {
            tag_ids: new_tags.unwrap_or(relations.tag_ids),
            attachment_ids: new_attachments.unwrap_or(relations.attachment_ids),
        };
        Ok(StoryResponse::from_story(
            &updated,
            &relations,
            &actor,
            ResponseShape::Full,
        ))
    }

    // ========================================================================
    // REMOVE
    // ========================================================================

    /// Soft- or permanently delete a story.
    pub async fn remove_story(
        &self,
        id: i64,
        query: &RemoveStoryQuery,
        ctx: &RequestContext,
    ) -> StoryResult<DeletionResult> {
        let actor = ctx.actor;
        id.validate_positive("id")?;
        let story_id = StoryId::new(id);

        // Deleted records load here to distinguish AlreadyDeleted from
        // NotFound.
        let Some((story, _)) = self
            .store
            .find_by_id(story_id, &RelationHints::default())
            .await?
        else {
            return Err(StoryError::story_not_found(story_id));
        };

        let permanent = query.permanent;
        if permanent {
            policy::ensure_owner_strict(&story, &actor)?;
            if !actor.is_privileged() {
                return Err(StoryError::permission_denied(
                    "Permanent deletion requires a privileged role",
                ));
            }
        } else {
            policy::ensure_owner(&story, &actor)?;
        }

        if story.is_deleted() && !permanent {
            return Err(StoryError::already_deleted(story_id));
        }

        let reason = query
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        if !permanent {
            if !actor.is_privileged()
                && !self.config.soft_deletable_statuses.contains(&story.status)
            {
                return Err(StoryError::business_validation(format!(
                    "Stories in status {} cannot be deleted",
                    story.status
                )));
            }
            let children = self.store.count_children(story_id).await?;
            if children > 0 {
                return Err(StoryError::has_dependents(story_id, children));
            }
            if story.status == StoryStatus::Published && reason.is_none() {
                return Err(StoryError::invalid_argument(
                    "A deletion reason is required for published stories",
                ));
            }
        }

        let mut tx = self.store.begin().await?;
        let deletion_type = if permanent {
            if let Err(err) = tx.delete_story(story_id).await {
                let _ = tx.rollback().await;
                return Err(err.into());
            }
            DeletionType::Permanent
        } else {
            let now = Utc::now();
            let mut merged = story.clone();
            merged.status = StoryStatus::Deleted;
            merged.deleted_at = Some(now);
            merged.deleted_by = Some(actor.user_id);
            merged.deletion_reason = reason;
            merged.updated_at = now;
            merged.last_modified_by = Some(actor.user_id);
            if let Err(err) = tx.update(&merged, story.version).await {
                let _ = tx.rollback().await;
                return Err(err.into());
            }
            DeletionType::Soft
        };
        tx.commit().await?;

        self.invalidate_after_write(story_id, story.user_id, actor.user_id)
            .await;
        self.emit(
            actor.user_id,
            StoryEvent::StoryDeleted {
                id: story_id,
                deletion_type,
                deleted_by: actor.user_id,
            },
        )
        .await;

        Ok(DeletionResult {
            story_id,
            deletion_type,
            can_recover: deletion_type == DeletionType::Soft,
        })
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Detail read through the cache. Deleted records are cached too; the
    /// caller applies visibility rules afterwards.
    async fn load_story_cached(
        &self,
        id: StoryId,
    ) -> StoryResult<Option<(Story, StoryRelations)>> {
        let key = keys::story_key(id);
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<CachedStory>(&raw) {
                Ok(hit) => {
                    tracing::debug!(%key, "story served from cache");
                    return Ok(Some((hit.story, hit.relations)));
                }
                Err(err) => tracing::warn!(%key, %err, "dropping undecodable story cache entry"),
            },
            Ok(None) => {}
            Err(err) => tracing::warn!(%key, %err, "story cache read failed, bypassing"),
        }

        let loaded = self.store.find_by_id(id, &RelationHints::all()).await?;
        if let Some((story, relations)) = &loaded {
            let cached = CachedStory {
                story: story.clone(),
                relations: relations.clone(),
            };
            match serde_json::to_string(&cached) {
                Ok(raw) => {
                    if let Err(err) = self.cache.set(&key, &raw, self.config.cache_ttl).await {
                        tracing::warn!(%key, %err, "story cache write failed");
                    }
                }
                Err(err) => tracing::warn!(%err, "story serialization failed"),
            }
        }
        Ok(loaded)
    }

    /// Targeted post-write invalidation: the detail key plus the list
    /// prefixes of the story's owner and of the acting user. Other callers'
    /// cached lists age out with the TTL.
    async fn invalidate_after_write(&self, id: StoryId, owner: UserId, actor: UserId) {
        if let Err(err) = self.cache.delete(&keys::story_key(id)).await {
            tracing::warn!(%id, %err, "story cache invalidation failed");
        }
        for user in [owner, actor] {
            if let Err(err) = self
                .cache
                .delete_prefix(&keys::list_prefix_for_user(user))
                .await
            {
                tracing::warn!(%user, %err, "list cache invalidation failed");
            }
            if owner == actor {
                break;
            }
        }
    }

    /// Fire-and-forget event emission; sink failures never fail the call.
    async fn emit(&self, actor: UserId, event: StoryEvent) {
        let envelope = EventEnvelope::new(actor, event);
        if let Err(err) = self.events.emit(envelope).await {
            tracing::warn!(%err, "event emission failed");
        }
    }
}

/// Business rules evaluated against the (merged) record as it will be
/// stored: publishing requires a body and a country.
fn validate_business_rules(
    status: StoryStatus,
    details: &str,
    country_id: Option<CountryId>,
) -> StoryResult<()> {
    if status == StoryStatus::Published {
        if details.trim().is_empty() {
            return Err(StoryError::business_validation(
                "Published stories require non-empty details",
            ));
        }
        if country_id.is_none() {
            return Err(StoryError::business_validation(
                "Published stories require a country",
            ));
        }
    }
    Ok(())
}

fn resolve_sort(query: &ListStoriesQuery) -> StoryResult<SortSpec> {
    let field = match &query.sort_by {
        Some(raw) => raw
            .parse::<SortField>()
            .map_err(|err| StoryError::invalid_argument(err.to_string()))?,
        None => SortField::CreatedAt,
    };
    let dir = query.sort_dir.unwrap_or(match field {
        SortField::Title => SortDir::Asc,
        _ => SortDir::Desc,
    });
    Ok(SortSpec { field, dir })
}

fn parse_includes(include: &[String]) -> StoryResult<RelationHints> {
    let mut hints = RelationHints {
        tags: true,
        attachments: true,
        stats: false,
    };
    for entry in include {
        match entry.to_lowercase().as_str() {
            "tags" => hints.tags = true,
            "attachments" => hints.attachments = true,
            "stats" => hints.stats = true,
            other => {
                return Err(StoryError::invalid_argument(format!(
                    "Unknown include relation: {}",
                    other
                )))
            }
        }
    }
    Ok(hints)
}

/// Canonical cache parameters for a resolved list query. Everything that
/// affects the result set must appear here.
fn cache_params(
    filter: &StoryFilter,
    sort: &SortSpec,
    page: &PageSpec,
    hints: &RelationHints,
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("page".to_string(), page.page.to_string());
    params.insert("limit".to_string(), page.limit.to_string());
    params.insert("sort".to_string(), sort.field.to_string());
    params.insert(
        "dir".to_string(),
        match sort.dir {
            SortDir::Asc => "asc".to_string(),
            SortDir::Desc => "desc".to_string(),
        },
    );
    if let Some(user_id) = filter.user_id {
        params.insert("user".to_string(), user_id.to_string());
    }
    if !filter.statuses.is_empty() {
        let mut statuses: Vec<&str> =
            filter.statuses.iter().map(|s| s.as_db_str()).collect();
        statuses.sort_unstable();
        params.insert("status".to_string(), statuses.join(","));
    }
    if !filter.story_types.is_empty() {
        let mut types: Vec<&str> =
            filter.story_types.iter().map(|t| t.as_db_str()).collect();
        types.sort_unstable();
        params.insert("type".to_string(), types.join(","));
    }
    if !filter.priorities.is_empty() {
        let mut priorities: Vec<&str> =
            filter.priorities.iter().map(|p| p.as_db_str()).collect();
        priorities.sort_unstable();
        params.insert("priority".to_string(), priorities.join(","));
    }
    if let Some(country_id) = filter.country_id {
        params.insert("country".to_string(), country_id.to_string());
    }
    if let Some(from) = filter.created_from {
        params.insert("from".to_string(), from.to_rfc3339());
    }
    if let Some(to) = filter.created_to {
        params.insert("to".to_string(), to.to_rfc3339());
    }
    if filter.include_deleted {
        params.insert("deleted".to_string(), "1".to_string());
    }
    if hints.tags {
        params.insert("inc_tags".to_string(), "1".to_string());
    }
    if hints.attachments {
        params.insert("inc_att".to_string(), "1".to_string());
    }
    params
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rules_gate_publishing() {
        assert!(validate_business_rules(StoryStatus::Draft, "", None).is_ok());
        assert!(validate_business_rules(StoryStatus::Published, "", Some(CountryId::new(1)))
            .is_err());
        assert!(validate_business_rules(StoryStatus::Published, "body", None).is_err());
        assert!(
            validate_business_rules(StoryStatus::Published, "body", Some(CountryId::new(1)))
                .is_ok()
        );
    }

    #[test]
    fn test_parse_includes_rejects_unknown() {
        assert!(parse_includes(&["tags".to_string()]).is_ok());
        let hints = parse_includes(&["stats".to_string()]).unwrap();
        assert!(hints.stats);
        assert!(parse_includes(&["comments".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_sort_defaults_per_field() {
        let mut query = ListStoriesQuery::default();
        let sort = resolve_sort(&query).unwrap();
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.dir, SortDir::Desc);

        query.sort_by = Some("title".to_string());
        let sort = resolve_sort(&query).unwrap();
        assert_eq!(sort.dir, SortDir::Asc);

        query.sort_by = Some("nope".to_string());
        assert!(resolve_sort(&query).is_err());
    }

    #[test]
    fn test_cache_params_are_order_insensitive_for_multi_values() {
        let filter_a = StoryFilter {
            statuses: vec![StoryStatus::Draft, StoryStatus::Submitted],
            ..Default::default()
        };
        let filter_b = StoryFilter {
            statuses: vec![StoryStatus::Submitted, StoryStatus::Draft],
            ..Default::default()
        };
        let sort = SortSpec::default();
        let page = PageSpec::new(1, 20);
        let hints = RelationHints::all();
        assert_eq!(
            cache_params(&filter_a, &sort, &page, &hints),
            cache_params(&filter_b, &sort, &page, &hints)
        );
    }
}
