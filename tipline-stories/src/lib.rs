//! Tipline Stories - the story lifecycle manager.
//!
//! Implements the five lifecycle operations (list, get, create, update,
//! remove) over constructor-injected ports: persistence, tag/attachment
//! stores, the cache gateway and an event sink. The crate owns the
//! guardrails around those operations - optimistic locking, the status
//! workflow, access policy enforcement, per-user creation rate limiting,
//! duplicate suppression and targeted cache invalidation.

pub mod context;
pub mod error;
pub mod events;
pub mod services;
pub mod types;
pub mod validation;

pub use context::RequestContext;
pub use error::{ErrorCode, StoryError, StoryResult};
pub use events::{EventEnvelope, EventSink, MemoryEventSink, NullEventSink, StoryEvent};
pub use services::attachment_graph::{
    assign_story_attachment, prepare_attachment_graph, remove_story_attachment, AssignResult,
};
pub use services::rate_limit::{CreationRateLimiter, RateDecision};
pub use services::story_service::StoryService;
pub use services::tag_graph::{prepare_tag_graph, slugify};
pub use types::{
    CreateStoryRequest, DeletionResult, DeletionType, GetStoryQuery, ListStoriesQuery, OneOrMany,
    PaginationMeta, RemoveStoryQuery, ResponseShape, StoryListPage, StoryResponse,
    UpdateStoryRequest,
};
