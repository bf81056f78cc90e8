//! Error types for core rule evaluation.

use crate::enums::StoryStatus;
use thiserror::Error;

/// Workflow rule violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Illegal status transition: {from} -> {to}")]
    InvalidTransition { from: StoryStatus, to: StoryStatus },
}

/// Access policy denials.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Access denied: {reason}")]
    Denied { reason: String },
}

impl PolicyError {
    pub fn denied(reason: impl Into<String>) -> Self {
        PolicyError::Denied {
            reason: reason.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================
