//! Story status workflow - the directed graph of legal status transitions.
//!
//! This is a pure function over `(from, to)` pairs; enforcement happens in
//! the lifecycle manager on every status-bearing update. `Deleted` is not
//! part of the graph at all: it is entered exclusively through the
//! soft-delete path and never left.
//!
//! ```text
//! Draft ⇄ Submitted → Assigned ⇄ InProgress ⇄ ForReviewSe → Approved → Published → Archived
//!   ↑         ↓                                    ↓
//!   └──── Rejected ←──────────────────────────────┘
//! ```

use crate::enums::StoryStatus;
use crate::error::WorkflowError;

/// Statuses reachable in a single legal transition from `from`.
///
/// A self-transition only appears where the table allows it (`Draft` may be
/// re-saved as `Draft`); everywhere else re-asserting the current status is
/// rejected like any other illegal move.
pub fn allowed_transitions(from: StoryStatus) -> &'static [StoryStatus] {
    match from {
        StoryStatus::Draft => &[StoryStatus::Submitted, StoryStatus::Draft],
        StoryStatus::Submitted => &[
            StoryStatus::Assigned,
            StoryStatus::Draft,
            StoryStatus::Rejected,
        ],
        StoryStatus::Assigned => &[StoryStatus::InProgress, StoryStatus::Submitted],
        StoryStatus::InProgress => &[StoryStatus::ForReviewSe, StoryStatus::Assigned],
        StoryStatus::ForReviewSe => &[
            StoryStatus::Approved,
            StoryStatus::InProgress,
            StoryStatus::Rejected,
        ],
        StoryStatus::Approved => &[StoryStatus::Published],
        StoryStatus::Published => &[StoryStatus::Archived],
        StoryStatus::Rejected => &[StoryStatus::Draft],
        // Terminal states.
        StoryStatus::Archived => &[],
        StoryStatus::Deleted => &[],
    }
}

/// Whether `from → to` is a legal workflow transition.
pub fn can_transition(from: StoryStatus, to: StoryStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Validate a transition, erring with both endpoints on an illegal move.
pub fn ensure_transition(from: StoryStatus, to: StoryStatus) -> Result<(), WorkflowError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition { from, to })
    }
}

// =============================================================================
// TESTS
// =============================================================================
