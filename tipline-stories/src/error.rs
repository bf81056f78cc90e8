//! Error types for the story lifecycle manager.
//!
//! Every operation returns a [`StoryError`] carrying a machine-readable
//! [`ErrorCode`] and an HTTP-status-like severity hint. Raw storage or
//! policy errors never cross the service boundary unclassified.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use tipline_core::{PolicyError, StoryId, StoryStatus, WorkflowError};
use tipline_storage::StorageError;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed id, version or query parameter
    InvalidArgument,

    /// Story absent, or hidden by soft-delete visibility rules
    NotFound,

    /// Operation attempted on a deleted story
    Gone,

    /// Non-permanent delete of an already-deleted story
    AlreadyDeleted,

    /// Optimistic-lock mismatch between expected and stored version
    VersionConflict,

    /// Status change not present in the workflow graph
    InvalidStatusTransition,

    /// Ownership or role check failed, including restricted types/statuses
    PermissionDenied,

    /// Per-user creation quota exhausted
    RateLimitExceeded,

    /// Same owner and title within the duplicate-suppression window
    DuplicateDetected,

    /// Delete blocked by child records referencing this story
    HasDependents,

    /// Merged record violates a business invariant
    BusinessValidationFailed,

    /// Unexpected infrastructure failure
    Internal,
}

impl ErrorCode {
    /// HTTP-status-like severity hint for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Gone | ErrorCode::AlreadyDeleted => StatusCode::GONE,
            ErrorCode::VersionConflict
            | ErrorCode::InvalidStatusTransition
            | ErrorCode::DuplicateDetected
            | ErrorCode::HasDependents => StatusCode::CONFLICT,
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorCode::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::BusinessValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// STORY ERROR STRUCT
// ============================================================================

/// Structured error returned by every lifecycle operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryError {
    /// Error code categorizing the failure
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Optional structured details (conflicting versions, existing ids, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StoryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// HTTP-status-like severity hint.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn story_not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::NotFound, format!("Story {} not found", id))
    }

    pub fn gone(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::Gone,
            format!("Story {} has been deleted", id),
        )
    }

    pub fn already_deleted(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AlreadyDeleted,
            format!("Story {} is already deleted", id),
        )
    }

    pub fn version_conflict(id: StoryId, expected: i64, actual: i64) -> Self {
        Self::new(
            ErrorCode::VersionConflict,
            format!(
                "Story {} was modified concurrently: expected version {}, found {}",
                id, expected, actual
            ),
        )
        .with_details(serde_json::json!({
            "expected_version": expected,
            "actual_version": actual,
        }))
    }

    pub fn invalid_transition(from: StoryStatus, to: StoryStatus) -> Self {
        Self::new(
            ErrorCode::InvalidStatusTransition,
            format!("Illegal status transition: {} -> {}", from, to),
        )
        .with_details(serde_json::json!({
            "from": from,
            "to": to,
        }))
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    pub fn rate_limited(limit: u32, window_secs: u64) -> Self {
        Self::new(
            ErrorCode::RateLimitExceeded,
            format!(
                "Creation limit of {} per {} seconds exceeded",
                limit, window_secs
            ),
        )
        .with_details(serde_json::json!({
            "limit": limit,
            "window_seconds": window_secs,
        }))
    }

    pub fn duplicate_detected(existing_id: StoryId) -> Self {
        Self::new(
            ErrorCode::DuplicateDetected,
            format!(
                "A story with the same title was created recently (story {})",
                existing_id
            ),
        )
        .with_details(serde_json::json!({ "existing_id": existing_id }))
    }

    pub fn has_dependents(id: StoryId, child_count: i64) -> Self {
        Self::new(
            ErrorCode::HasDependents,
            format!(
                "Story {} has {} dependent stories and cannot be soft-deleted",
                id, child_count
            ),
        )
        .with_details(serde_json::json!({ "child_count": child_count }))
    }

    pub fn business_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BusinessValidationFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for StoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for StoryError {}

// ============================================================================
// CONVERSIONS FROM COLLABORATOR ERRORS
// ============================================================================

impl From<StorageError> for StoryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => StoryError::story_not_found(id),
            StorageError::VersionConflict {
                id,
                expected,
                actual,
            } => StoryError::version_conflict(id, expected, actual),
            other => {
                tracing::error!("storage error: {}", other);
                StoryError::internal("Storage operation failed")
            }
        }
    }
}

impl From<PolicyError> for StoryError {
    fn from(err: PolicyError) -> Self {
        let PolicyError::Denied { reason } = err;
        StoryError::permission_denied(reason)
    }
}

impl From<WorkflowError> for StoryError {
    fn from(err: WorkflowError) -> Self {
        let WorkflowError::InvalidTransition { from, to } = err;
        StoryError::invalid_transition(from, to)
    }
}

/// Result type alias for lifecycle operations.
pub type StoryResult<T> = Result<T, StoryError>;
