//! Query, sort and pagination types for the story persistence port.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tipline_core::{
    CountryId, Priority, Story, StoryRelations, StoryStatus, StoryType, Timestamp, UserId,
};

/// Resolved filter handed to the persistence port. Empty vectors mean "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryFilter {
    pub user_id: Option<UserId>,
    pub statuses: Vec<StoryStatus>,
    pub story_types: Vec<StoryType>,
    pub priorities: Vec<Priority>,
    pub country_id: Option<CountryId>,
    pub created_from: Option<Timestamp>,
    pub created_to: Option<Timestamp>,
    /// Case-insensitive substring match on title and details.
    pub term: Option<String>,
    pub include_deleted: bool,
}

/// Sortable fields - the allow-list callers may order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Priority,
    Status,
}

impl SortField {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Priority => "priority",
            SortField::Status => "status",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for SortField {
    type Err = SortFieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created_at" | "createdat" => Ok(SortField::CreatedAt),
            "updated_at" | "updatedat" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "status" => Ok(SortField::Status),
            _ => Err(SortFieldParseError(s.to_string())),
        }
    }
}

/// Error when a caller asks to sort by a field outside the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortFieldParseError(pub String);

impl fmt::Display for SortFieldParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported sort field: {}", self.0)
    }
}

impl std::error::Error for SortFieldParseError {}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

/// Resolved ordering. Defaults to newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub dir: SortDir,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            dir: SortDir::Desc,
        }
    }
}

/// Bounded pagination. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: u32,
    pub limit: u32,
}

impl PageSpec {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Zero-based row offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

/// One page of query results plus the unpaginated total.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub rows: Vec<(Story, StoryRelations)>,
    pub total: u64,
}

/// Relation hints controlling what is loaded alongside a story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationHints {
    pub tags: bool,
    pub attachments: bool,
    /// Aggregate counters; expensive, and a cache-bypass condition on lists.
    pub stats: bool,
}

impl RelationHints {
    pub fn all() -> Self {
        Self {
            tags: true,
            attachments: true,
            stats: false,
        }
    }
}
