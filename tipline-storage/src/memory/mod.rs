//! In-memory reference backends for the storage ports.
//!
//! Transactions are serialized behind an owned async mutex guard: the guard
//! is taken at `begin` and held until commit or rollback, and a snapshot of
//! the pre-transaction state is restored if the transaction is rolled back
//! or dropped. The version predicate on `update` is therefore evaluated
//! atomically with the write, which is exactly the contract a SQL backend
//! provides with `UPDATE ... WHERE id = $1 AND version = $2`.

mod relation;
mod story;

pub use relation::{MemoryAttachmentStore, MemoryTagStore};
pub use story::MemoryStoryStore;
