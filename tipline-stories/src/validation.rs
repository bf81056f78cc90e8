//! Validation and sanitization helpers.
//!
//! Common patterns extracted from the lifecycle operations. The traits keep
//! call sites terse and the error messages consistent.

use crate::error::{StoryError, StoryResult};

/// Trait for validating non-empty strings.
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty after trimming.
    fn validate_non_empty(&self, field_name: &str) -> StoryResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> StoryResult<()> {
        if self.trim().is_empty() {
            return Err(StoryError::invalid_argument(format!(
                "Required field '{}' is missing or empty",
                field_name
            )));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for &str {
    fn validate_non_empty(&self, field_name: &str) -> StoryResult<()> {
        (*self).validate_non_empty(field_name)
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> StoryResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> StoryResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(StoryError::invalid_argument(format!(
                "Required field '{}' is missing or empty",
                field_name
            ))),
        }
    }
}

/// Trait for validating positive integers (ids, versions, pages).
pub trait ValidatePositive {
    fn validate_positive(&self, field_name: &str) -> StoryResult<()>;
}

macro_rules! impl_validate_positive {
    ($($t:ty),*) => {
        $(
            impl ValidatePositive for $t {
                fn validate_positive(&self, field_name: &str) -> StoryResult<()> {
                    if *self <= 0 as $t {
                        return Err(StoryError::invalid_argument(format!(
                            "Field '{}' must be a positive integer",
                            field_name
                        )));
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_validate_positive!(i32, i64, u32, u64);

/// Trim free text and cap it at `max_chars` characters, respecting char
/// boundaries.
pub fn sanitize_text(input: &str, max_chars: usize) -> String {
    let trimmed = input.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    trimmed.chars().take(max_chars).collect()
}
