//! Tipline Storage - ports and reference backends.
//!
//! This crate defines the abstract contracts the lifecycle manager consumes:
//! the story persistence port with transactional writes and an atomic
//! version predicate, tag/attachment existence ports, and the cache gateway
//! (key generation, TTL entries, prefix invalidation, statistics).
//!
//! Alongside the traits it ships in-memory implementations. They serialize
//! transactions behind an owned async mutex guard and evaluate the version
//! predicate atomically at write time, which makes them both the test
//! substrate and a correct single-process backend.

pub mod cache;
pub mod memory;
pub mod query;
pub mod relation;
pub mod story;

use thiserror::Error;
use tipline_core::StoryId;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Story not found: {id}")]
    NotFound { id: StoryId },

    #[error("Version conflict on story {id}: expected {expected}, actual {actual}")]
    VersionConflict {
        id: StoryId,
        expected: i64,
        actual: i64,
    },

    #[error("Insert failed: {reason}")]
    InsertFailed { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Backend error: {reason}")]
    Backend { reason: String },
}

impl StorageError {
    pub fn backend(reason: impl Into<String>) -> Self {
        StorageError::Backend {
            reason: reason.into(),
        }
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

pub use cache::{keys, CacheBackend, CacheStats, MemoryCacheBackend};
pub use memory::{MemoryAttachmentStore, MemoryStoryStore, MemoryTagStore};
pub use query::{PageSpec, QueryPage, RelationHints, SortDir, SortField, SortSpec, StoryFilter};
pub use relation::{AttachmentStore, TagStore};
pub use story::{NewStory, StoryStore, StoryTx};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::VersionConflict {
            id: StoryId::new(7),
            expected: 2,
            actual: 3,
        };
        let msg = format!("{}", err);
        assert!(msg.contains('7'));
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("actual 3"));
    }
}
