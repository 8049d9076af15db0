//! Per-user persisted state: wishlists and reminder logs.
//!
//! This module defines the contract every backend implements, so the
//! router never depends on how or where a user's partitions are kept.

pub mod json_store;
pub mod locks;
pub mod memory;
pub mod sqlite_store;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{Frequency, ReminderEntry, UserIdentity, Wishlist};

pub use json_store::JsonUserStore;
pub use locks::PartitionLocks;
pub use memory::InMemoryUserStore;
pub use sqlite_store::SqliteUserStore;

/// Formal contract for per-user state.
///
/// Each user owns two independent partitions, a wishlist and a reminder
/// log. Absence of a partition is a valid empty state. Mutations of one
/// partition are serialized so that concurrent writers never lose updates.
#[async_trait]
pub trait UserStateStore: Send + Sync {
    /// The user's wishlist, empty if none was ever saved or it cannot be read.
    async fn load_wishlist(&self, user: &UserIdentity) -> Wishlist;

    /// Adds `airdrop_id` if absent. Returns whether the wishlist changed.
    async fn add_to_wishlist(&self, user: &UserIdentity, airdrop_id: &str) -> StoreResult<bool>;

    /// Removes `airdrop_id` if present. Returns whether the wishlist changed.
    async fn remove_from_wishlist(
        &self,
        user: &UserIdentity,
        airdrop_id: &str,
    ) -> StoreResult<bool>;

    /// The user's reminder log, oldest first.
    async fn load_reminders(&self, user: &UserIdentity) -> Vec<ReminderEntry>;

    /// Appends a new entry stamped with the current time. Never deduplicates.
    async fn append_reminder(
        &self,
        user: &UserIdentity,
        airdrop_id: &str,
        remind_time: &str,
        frequency: Frequency,
    ) -> StoreResult<ReminderEntry>;

    /// Health check for the storage backend.
    async fn health_check(&self) -> bool;
}

/// The two partitions a user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Wishlist,
    Reminders,
}

impl Partition {
    /// Lock key for this partition of `user`.
    pub fn key(self, user: &UserIdentity) -> String {
        match self {
            Partition::Wishlist => format!("wishlist:{}", user),
            Partition::Reminders => format!("reminders:{}", user),
        }
    }
}
