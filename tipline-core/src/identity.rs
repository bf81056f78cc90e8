//! Identity types for Tipline entities.
//!
//! Story, user, tag and attachment identifiers are persistence-assigned
//! positive integers. Each gets its own newtype so that a `TagId` can never
//! be passed where a `StoryId` is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw integer value as stored in the database.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }

            /// Persistence-assigned identifiers are always positive.
            pub const fn is_valid(&self) -> bool {
                self.0 > 0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a story record.
    StoryId
);
id_type!(
    /// Identifier of a user account.
    UserId
);
id_type!(
    /// Identifier of a tag.
    TagId
);
id_type!(
    /// Identifier of an attachment (file record).
    AttachmentId
);
id_type!(
    /// Identifier of a country.
    CountryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_validity() {
        assert!(StoryId::new(1).is_valid());
        assert!(!StoryId::new(0).is_valid());
        assert!(!StoryId::new(-5).is_valid());
    }

    #[test]
    fn test_id_display_and_conversion() {
        let id = UserId::new(42);
        assert_eq!(format!("{}", id), "42");
        assert_eq!(i64::from(id), 42);
        assert_eq!(UserId::from(42), id);
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = TagId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
