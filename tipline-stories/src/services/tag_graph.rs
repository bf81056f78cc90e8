//! Tag graph resolution.
//!
//! Tag names arriving on create/update requests are normalized to slugs,
//! resolved against the tag store, and minted when unknown. Minting is
//! idempotent by slug, so a retried request converges on the same tag set.

use crate::error::{StoryError, StoryResult};
use tipline_core::TagId;
use tipline_storage::TagStore;

const SLUG_MAX_CHARS: usize = 50;

/// Normalize a tag name into its lookup slug: trimmed, lower-cased, inner
/// whitespace collapsed to single hyphens, capped in length.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(SLUG_MAX_CHARS)
        .collect()
}

/// Resolve a list of tag names into tag ids, minting unknown tags.
///
/// Duplicate names (after normalization) collapse to one relation; an
/// empty name anywhere aborts the whole call.
pub async fn prepare_tag_graph(
    store: &dyn TagStore,
    names: &[String],
) -> StoryResult<Vec<TagId>> {
    let mut resolved = Vec::with_capacity(names.len());
    let mut seen = Vec::with_capacity(names.len());

    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(StoryError::invalid_argument("Tag names must be non-empty"));
        }
        let slug = slugify(trimmed);
        if seen.contains(&slug) {
            continue;
        }

        let tag = match store.find_by_slug(&slug).await? {
            Some(tag) => tag,
            None => store.create(trimmed, &slug).await?,
        };
        resolved.push(tag.id);
        seen.push(slug);
    }

    Ok(resolved)
}
