//! Domain events emitted after successful mutations.
//!
//! The lifecycle manager publishes through an injected [`EventSink`] rather
//! than inheriting emitter behavior; side effects are visible at the call
//! site. Emission is fire-and-forget: a failing sink is logged and never
//! propagates back into the mutation's result.

use crate::types::DeletionType;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tipline_core::{StoryId, StoryStatus, StoryType, Timestamp, UserId};
use uuid::Uuid;

/// Mutation events for story records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoryEvent {
    /// A new story was created.
    StoryCreated {
        id: StoryId,
        owner: UserId,
        status: StoryStatus,
        story_type: StoryType,
    },

    /// An existing story was updated.
    StoryUpdated {
        id: StoryId,
        previous_status: StoryStatus,
        new_status: StoryStatus,
        version: i64,
    },

    /// A story was soft- or permanently deleted.
    StoryDeleted {
        id: StoryId,
        deletion_type: DeletionType,
        deleted_by: UserId,
    },
}

impl StoryEvent {
    /// Get the event type as a string for logging/debugging.
    pub fn event_type(&self) -> &'static str {
        match self {
            StoryEvent::StoryCreated { .. } => "StoryCreated",
            StoryEvent::StoryUpdated { .. } => "StoryUpdated",
            StoryEvent::StoryDeleted { .. } => "StoryDeleted",
        }
    }
}

/// Envelope stamped onto every emitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// UUIDv7, timestamp-sortable.
    pub event_id: Uuid,
    pub occurred_at: Timestamp,
    /// The user whose request produced this event.
    pub actor: UserId,
    #[serde(flatten)]
    pub event: StoryEvent,
}

impl EventEnvelope {
    pub fn new(actor: UserId, event: StoryEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: chrono::Utc::now(),
            actor,
            event,
        }
    }
}

/// Error raised by a failing event sink. Callers log and move on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventSinkError {
    #[error("Event delivery failed: {reason}")]
    Delivery { reason: String },
}

/// Downstream event consumer (message bus, websocket fan-out, audit log).
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, envelope: EventEnvelope) -> Result<(), EventSinkError>;
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn emit(&self, _envelope: EventEnvelope) -> Result<(), EventSinkError> {
        Ok(())
    }
}

/// Sink that records events in memory for assertions.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<EventEnvelope>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Take everything recorded so far.
    pub fn drain(&self) -> Vec<EventEnvelope> {
        std::mem::take(&mut *self.events.lock())
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn emit(&self, envelope: EventEnvelope) -> Result<(), EventSinkError> {
        self.events.lock().push(envelope);
        Ok(())
    }
}
