//! Deterministic cache key generation.
//!
//! List keys fold the caller identity (id and role) and the canonicalized
//! query parameters into a SHA-256 digest, so identical inputs for the same
//! caller always land on the same key, and no parameter ordering or
//! whitespace difference can split the cache. All story keys share the
//! `stories:` prefix family, which is what write-path invalidation targets.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tipline_core::{Actor, StoryId, UserId};

/// Prefix under which every list page is cached.
pub const LIST_PREFIX: &str = "stories:list:";

/// Prefix under which story detail records are cached.
pub const STORY_PREFIX: &str = "stories:id:";

/// Prefix for the creation rate-limit counters.
pub const RATE_PREFIX: &str = "ratelimit:create:";

/// Key for a cached story detail record.
pub fn story_key(id: StoryId) -> String {
    format!("{}{}", STORY_PREFIX, id)
}

/// Key for a cached list page: caller identity plus a digest of the
/// canonicalized query parameters.
pub fn list_key(actor: &Actor, params: &BTreeMap<String, String>) -> String {
    let mut canonical = String::new();
    for (k, v) in params {
        canonical.push_str(k);
        canonical.push('=');
        canonical.push_str(v);
        canonical.push('&');
    }
    let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
    format!(
        "{}u{}:r{}:{}",
        LIST_PREFIX,
        actor.user_id,
        actor.role.as_db_str(),
        digest
    )
}

/// Prefix covering every cached list page of one caller.
pub fn list_prefix_for_user(user_id: UserId) -> String {
    format!("{}u{}:", LIST_PREFIX, user_id)
}

/// Key for a caller's creation counter in the given rate-limit window.
pub fn creation_rate_key(user_id: UserId, window_index: u64) -> String {
    format!("{}u{}:w{}", RATE_PREFIX, user_id, window_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tipline_core::UserRole;

    fn actor(id: i64, role: UserRole) -> Actor {
        Actor::new(UserId::new(id), role)
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_identical_inputs_identical_keys() {
        let a = actor(1, UserRole::Reporter);
        let p = params(&[("page", "1"), ("limit", "20"), ("status", "SUBMITTED")]);
        assert_eq!(list_key(&a, &p), list_key(&a, &p));
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = actor(1, UserRole::Reporter);
        let mut forward = BTreeMap::new();
        forward.insert("page".to_string(), "1".to_string());
        forward.insert("status".to_string(), "DRAFT".to_string());
        let mut reverse = BTreeMap::new();
        reverse.insert("status".to_string(), "DRAFT".to_string());
        reverse.insert("page".to_string(), "1".to_string());
        assert_eq!(list_key(&a, &forward), list_key(&a, &reverse));
    }

    #[test]
    fn test_different_callers_get_different_keys() {
        let p = params(&[("page", "1")]);
        let reporter = list_key(&actor(1, UserRole::Reporter), &p);
        let other = list_key(&actor(2, UserRole::Reporter), &p);
        let editor = list_key(&actor(1, UserRole::Editor), &p);
        assert_ne!(reporter, other);
        assert_ne!(reporter, editor);
    }

    #[test]
    fn test_keys_live_under_their_prefixes() {
        let a = actor(7, UserRole::Reporter);
        let p = params(&[("page", "2")]);
        assert!(list_key(&a, &p).starts_with(LIST_PREFIX));
        assert!(list_key(&a, &p).starts_with(&list_prefix_for_user(UserId::new(7))));
        assert!(story_key(StoryId::new(9)).starts_with(STORY_PREFIX));
        assert!(creation_rate_key(UserId::new(9), 3).starts_with(RATE_PREFIX));
    }

    proptest! {
        /// Any parameter difference produces a different digest.
        #[test]
        fn prop_param_changes_change_key(
            value_a in "[a-z0-9]{1,12}",
            value_b in "[a-z0-9]{1,12}",
        ) {
            prop_assume!(value_a != value_b);
            let a = actor(1, UserRole::Reporter);
            let pa = params(&[("term", &value_a)]);
            let pb = params(&[("term", &value_b)]);
            prop_assert_ne!(list_key(&a, &pa), list_key(&a, &pb));
        }
    }
}
