//! Request context carried into every lifecycle operation.

use tipline_core::{Actor, UserId, UserRole};

/// Per-request context: the authenticated caller as resolved by the
/// (external) auth layer. Collaborator handles live on the service itself,
/// injected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: Actor,
}

impl RequestContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    /// Shorthand used all over the tests.
    pub fn for_user(user_id: i64, role: UserRole) -> Self {
        Self::new(Actor::new(UserId::new(user_id), role))
    }
}
