//! Enumerations shared across the Tipline engine.
//!
//! Each enum carries a stable database string representation (`as_db_str` /
//! `from_db_str`) alongside its serde form, so records round-trip through
//! storage and cached JSON without drift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// STORY STATUS
// ============================================================================

/// Workflow status of a story.
///
/// Legal transitions between statuses are defined in [`crate::workflow`];
/// `Deleted` is only ever entered through the soft-delete path, never through
/// a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoryStatus {
    Draft,
    Submitted,
    Assigned,
    InProgress,
    ForReviewSe,
    Approved,
    Published,
    Rejected,
    Archived,
    Deleted,
}

impl StoryStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            StoryStatus::Draft => "DRAFT",
            StoryStatus::Submitted => "SUBMITTED",
            StoryStatus::Assigned => "ASSIGNED",
            StoryStatus::InProgress => "IN_PROGRESS",
            StoryStatus::ForReviewSe => "FOR_REVIEW_SE",
            StoryStatus::Approved => "APPROVED",
            StoryStatus::Published => "PUBLISHED",
            StoryStatus::Rejected => "REJECTED",
            StoryStatus::Archived => "ARCHIVED",
            StoryStatus::Deleted => "DELETED",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, StoryStatusParseError> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Ok(StoryStatus::Draft),
            "SUBMITTED" => Ok(StoryStatus::Submitted),
            "ASSIGNED" => Ok(StoryStatus::Assigned),
            "IN_PROGRESS" => Ok(StoryStatus::InProgress),
            "FOR_REVIEW_SE" => Ok(StoryStatus::ForReviewSe),
            "APPROVED" => Ok(StoryStatus::Approved),
            "PUBLISHED" => Ok(StoryStatus::Published),
            "REJECTED" => Ok(StoryStatus::Rejected),
            "ARCHIVED" => Ok(StoryStatus::Archived),
            "DELETED" => Ok(StoryStatus::Deleted),
            _ => Err(StoryStatusParseError(s.to_string())),
        }
    }

    /// Statuses that only privileged roles may set directly (at creation or
    /// via a status update): the editorial tail of the workflow plus the
    /// soft-delete marker.
    pub fn is_restricted(&self) -> bool {
        matches!(
            self,
            StoryStatus::Approved
                | StoryStatus::Published
                | StoryStatus::Archived
                | StoryStatus::Deleted
        )
    }

    /// All statuses, in workflow order.
    pub fn all() -> [StoryStatus; 10] {
        [
            StoryStatus::Draft,
            StoryStatus::Submitted,
            StoryStatus::Assigned,
            StoryStatus::InProgress,
            StoryStatus::ForReviewSe,
            StoryStatus::Approved,
            StoryStatus::Published,
            StoryStatus::Rejected,
            StoryStatus::Archived,
            StoryStatus::Deleted,
        ]
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for StoryStatus {
    type Err = StoryStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid story status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryStatusParseError(pub String);

impl fmt::Display for StoryStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid story status: {}", self.0)
    }
}

impl std::error::Error for StoryStatusParseError {}

// ============================================================================
// STORY TYPE
// ============================================================================

/// Kind of submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoryType {
    Story,
    Report,
    Internal,
}

impl StoryType {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            StoryType::Story => "STORY",
            StoryType::Report => "REPORT",
            StoryType::Internal => "INTERNAL",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, StoryTypeParseError> {
        match s.to_uppercase().as_str() {
            "STORY" => Ok(StoryType::Story),
            "REPORT" => Ok(StoryType::Report),
            "INTERNAL" => Ok(StoryType::Internal),
            _ => Err(StoryTypeParseError(s.to_string())),
        }
    }

    /// Internal records are visible to and creatable by privileged roles only.
    pub fn is_restricted(&self) -> bool {
        matches!(self, StoryType::Internal)
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for StoryType {
    type Err = StoryTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid story type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryTypeParseError(pub String);

impl fmt::Display for StoryTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid story type: {}", self.0)
    }
}

impl std::error::Error for StoryTypeParseError {}

// ============================================================================
// PRIORITY
// ============================================================================

/// Triage priority assigned to a story.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, PriorityParseError> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(PriorityParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid priority string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityParseError(pub String);

impl fmt::Display for PriorityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid priority: {}", self.0)
    }
}

impl std::error::Error for PriorityParseError {}

// ============================================================================
// USER ROLE
// ============================================================================

/// Role attached to an authenticated caller.
///
/// Reporters are ordinary submitters; editors and admins are the privileged
/// roles that bypass ownership scoping and may operate on restricted types
/// and statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Reporter,
    Editor,
    Admin,
}

impl UserRole {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            UserRole::Reporter => "REPORTER",
            UserRole::Editor => "EDITOR",
            UserRole::Admin => "ADMIN",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, UserRoleParseError> {
        match s.to_uppercase().as_str() {
            "REPORTER" => Ok(UserRole::Reporter),
            "EDITOR" => Ok(UserRole::Editor),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(UserRoleParseError(s.to_string())),
        }
    }

    /// Whether this role bypasses ownership scoping and restricted-field
    /// checks.
    pub fn is_privileged(&self) -> bool {
        matches!(self, UserRole::Editor | UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for UserRole {
    type Err = UserRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid user role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleParseError(pub String);

impl fmt::Display for UserRoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid user role: {}", self.0)
    }
}

impl std::error::Error for UserRoleParseError {}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_status_roundtrip() {
        for status in StoryStatus::all() {
            let db_str = status.as_db_str();
            let parsed = StoryStatus::from_db_str(db_str).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_story_status_parse_is_case_insensitive() {
        assert_eq!(
            StoryStatus::from_db_str("in_progress").unwrap(),
            StoryStatus::InProgress
        );
        assert_eq!(
            StoryStatus::from_db_str("for_review_se").unwrap(),
            StoryStatus::ForReviewSe
        );
    }

    #[test]
    fn test_story_status_parse_rejects_unknown() {
        let err = StoryStatus::from_db_str("LIMBO").unwrap_err();
        assert_eq!(err, StoryStatusParseError("LIMBO".to_string()));
    }

    #[test]
    fn test_restricted_statuses() {
        assert!(StoryStatus::Published.is_restricted());
        assert!(StoryStatus::Deleted.is_restricted());
        assert!(!StoryStatus::Draft.is_restricted());
        assert!(!StoryStatus::Submitted.is_restricted());
    }

    #[test]
    fn test_story_type_roundtrip_and_restriction() {
        for ty in [StoryType::Story, StoryType::Report, StoryType::Internal] {
            assert_eq!(StoryType::from_db_str(ty.as_db_str()).unwrap(), ty);
        }
        assert!(StoryType::Internal.is_restricted());
        assert!(!StoryType::Report.is_restricted());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Critical);
    }

    #[test]
    fn test_role_privilege() {
        assert!(!UserRole::Reporter.is_privileged());
        assert!(UserRole::Editor.is_privileged());
        assert!(UserRole::Admin.is_privileged());
    }

    #[test]
    fn test_status_serde_matches_db_strings() {
        let json = serde_json::to_string(&StoryStatus::ForReviewSe).unwrap();
        assert_eq!(json, "\"FOR_REVIEW_SE\"");
        let back: StoryStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StoryStatus::ForReviewSe);
    }
}
