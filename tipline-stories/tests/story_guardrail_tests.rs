//! Guardrail tests: rate limiting, duplicate suppression, restricted
//! types/statuses, list scoping and the attachment/tag graphs.

use tipline_core::{StoryStatus, StoryType, TiplineConfig, UserId};
use tipline_stories::{
    CreateStoryRequest, ErrorCode, ListStoriesQuery, OneOrMany, UpdateStoryRequest,
};
use tipline_storage::{PageSpec, SortSpec, StoryFilter, StoryStore};

use test_support::{editor, harness, harness_with_config, reporter};

#[tokio::test]
async fn test_creation_rate_limit_blocks_the_eleventh() {
    let h = harness();
    let ctx = reporter(1);

    for i in 0..10 {
        h.service
            .create_story(CreateStoryRequest::titled(format!("Story {}", i)), &ctx)
            .await
            .unwrap();
    }

    let err = h
        .service
        .create_story(CreateStoryRequest::titled("One too many"), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RateLimitExceeded);

    // Nothing was inserted for the rejected attempt.
    let page = h
        .store
        .query(
            &StoryFilter::default(),
            &SortSpec::default(),
            &PageSpec::new(1, 100),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 10);

    // Another user is unaffected.
    h.service
        .create_story(CreateStoryRequest::titled("Fresh quota"), &reporter(2))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_privileged_roles_get_the_higher_ceiling() {
    let config = TiplineConfig {
        rate_limit_per_window: 2,
        rate_limit_per_window_privileged: 4,
        ..Default::default()
    };
    let h = harness_with_config(config);
    let ctx = editor(1);

    for i in 0..4 {
        h.service
            .create_story(CreateStoryRequest::titled(format!("Editorial {}", i)), &ctx)
            .await
            .unwrap();
    }
    let err = h
        .service
        .create_story(CreateStoryRequest::titled("Editorial 4"), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RateLimitExceeded);
}

#[tokio::test]
async fn test_duplicate_title_within_window_conflicts() {
    let h = harness();
    let ctx = reporter(1);

    let original = h
        .service
        .create_story(CreateStoryRequest::titled("Flood in X"), &ctx)
        .await
        .unwrap();

    // Same title (case-insensitively) by the same owner within 24h.
    let err = h
        .service
        .create_story(CreateStoryRequest::titled("flood in x"), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateDetected);
    assert_eq!(
        err.details.unwrap()["existing_id"],
        original.id.as_i64()
    );

    // A different owner is not a duplicate.
    h.service
        .create_story(CreateStoryRequest::titled("Flood in X"), &reporter(2))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_restricted_type_and_status_need_privilege_at_creation() {
    let h = harness();

    let internal = CreateStoryRequest {
        story_type: Some(StoryType::Internal),
        ..CreateStoryRequest::titled("Internal memo")
    };
    let err = h
        .service
        .create_story(internal.clone(), &reporter(1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    h.service.create_story(internal, &editor(2)).await.unwrap();

    let archived = CreateStoryRequest {
        status: Some(StoryStatus::Archived),
        ..CreateStoryRequest::titled("Pre-archived")
    };
    let err = h
        .service
        .create_story(archived, &reporter(1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    // A non-restricted non-default status is fine for anyone.
    let submitted = CreateStoryRequest {
        status: Some(StoryStatus::Submitted),
        ..CreateStoryRequest::titled("Straight to triage")
    };
    let story = h.service.create_story(submitted, &reporter(1)).await.unwrap();
    assert_eq!(story.status, StoryStatus::Submitted);
}

#[tokio::test]
async fn test_restricted_fields_on_update_need_privilege() {
    let h = harness();
    let ctx = reporter(1);
    let story = h
        .service
        .create_story(CreateStoryRequest::titled("Typed"), &ctx)
        .await
        .unwrap();

    let retype = UpdateStoryRequest {
        story_type: Some(StoryType::Report),
        ..Default::default()
    };
    let err = h
        .service
        .update_story(story.id.as_i64(), retype.clone(), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let updated = h
        .service
        .update_story(story.id.as_i64(), retype, &editor(2))
        .await
        .unwrap();
    assert_eq!(updated.story_type, StoryType::Report);
}

#[tokio::test]
async fn test_list_scopes_reporters_to_their_own_stories() {
    let h = harness();
    h.service
        .create_story(CreateStoryRequest::titled("Mine"), &reporter(1))
        .await
        .unwrap();
    h.service
        .create_story(CreateStoryRequest::titled("Theirs"), &reporter(2))
        .await
        .unwrap();

    // Reporter 1 sees only their own story, even when asking for user 2.
    let sneaky = ListStoriesQuery {
        user_id: Some(UserId::new(2)),
        ..Default::default()
    };
    let page = h.service.list_stories(&sneaky, &reporter(1)).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.items[0].title, "Mine");

    // A privileged caller can filter by owner...
    let filtered = ListStoriesQuery {
        user_id: Some(UserId::new(2)),
        ..Default::default()
    };
    let page = h.service.list_stories(&filtered, &editor(9)).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.items[0].title, "Theirs");

    // ...or see everything.
    let page = h
        .service
        .list_stories(&ListStoriesQuery::default(), &editor(9))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);
}

#[tokio::test]
async fn test_list_bounds_and_filters() {
    let h = harness();
    let ctx = reporter(1);
    h.service
        .create_story(CreateStoryRequest::titled("Any"), &ctx)
        .await
        .unwrap();

    let err = h
        .service
        .list_stories(
            &ListStoriesQuery {
                limit: Some(0),
                ..Default::default()
            },
            &ctx,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);

    let err = h
        .service
        .list_stories(
            &ListStoriesQuery {
                limit: Some(10_000),
                ..Default::default()
            },
            &ctx,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);

    let err = h
        .service
        .list_stories(
            &ListStoriesQuery {
                sort_by: Some("password_hash".to_string()),
                ..Default::default()
            },
            &ctx,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);

    // Scalar-or-array status filter.
    let one = ListStoriesQuery {
        status: Some(OneOrMany::One(StoryStatus::Draft)),
        ..Default::default()
    };
    let page = h.service.list_stories(&one, &ctx).await.unwrap();
    assert_eq!(page.meta.total, 1);

    let many = ListStoriesQuery {
        status: Some(OneOrMany::Many(vec![
            StoryStatus::Submitted,
            StoryStatus::Assigned,
        ])),
        ..Default::default()
    };
    let page = h.service.list_stories(&many, &ctx).await.unwrap();
    assert_eq!(page.meta.total, 0);
}

#[tokio::test]
async fn test_create_with_tags_and_attachments_is_atomic() {
    let h = harness();
    let ctx = reporter(1);
    let mine = h.attachments.seed(ctx.actor.user_id, "mine.jpg");

    let create = CreateStoryRequest {
        tags: vec!["Flooding".to_string(), "Roads".to_string()],
        attachment_ids: vec![mine.id.as_i64()],
        ..CreateStoryRequest::titled("Tagged")
    };
    let story = h.service.create_story(create, &ctx).await.unwrap();
    assert_eq!(story.tag_ids.len(), 2);
    assert_eq!(story.attachment_ids, vec![mine.id]);
    assert_eq!(h.tags.all().len(), 2);

    // A bad attachment id fails the whole call before any insert.
    let bad = CreateStoryRequest {
        attachment_ids: vec![9999],
        ..CreateStoryRequest::titled("Broken graph")
    };
    let err = h.service.create_story(bad, &ctx).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let page = h
        .store
        .query(
            &StoryFilter::default(),
            &SortSpec::default(),
            &PageSpec::new(1, 10),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_update_replaces_association_sets() {
    let h = harness();
    let ctx = reporter(1);
    let create = CreateStoryRequest {
        tags: vec!["one".to_string(), "two".to_string()],
        ..CreateStoryRequest::titled("Retagged")
    };
    let story = h.service.create_story(create, &ctx).await.unwrap();
    assert_eq!(story.tag_ids.len(), 2);

    let update = UpdateStoryRequest {
        tags: Some(vec!["three".to_string()]),
        ..Default::default()
    };
    let updated = h
        .service
        .update_story(story.id.as_i64(), update, &ctx)
        .await
        .unwrap();
    // Replacement, not merge.
    assert_eq!(updated.tag_ids.len(), 1);
}

#[tokio::test]
async fn test_foreign_attachment_is_rejected_for_reporters() {
    let h = harness();
    let ctx = reporter(1);
    let theirs = h.attachments.seed(UserId::new(2), "theirs.jpg");

    let create = CreateStoryRequest {
        attachment_ids: vec![theirs.id.as_i64()],
        ..CreateStoryRequest::titled("Borrowed evidence")
    };
    let err = h.service.create_story(create, &ctx).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}
