//! In-memory storage implementation for tests and demos.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::StoreResult;
use crate::state::UserStateStore;
use crate::types::{Frequency, ReminderEntry, UserIdentity, Wishlist};

/// Process-local user state. A single lock guards all users.
#[derive(Default)]
pub struct InMemoryUserStore {
    wishlists: Mutex<HashMap<UserIdentity, Wishlist>>,
    reminders: Mutex<HashMap<UserIdentity, Vec<ReminderEntry>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStateStore for InMemoryUserStore {
    async fn load_wishlist(&self, user: &UserIdentity) -> Wishlist {
        self.wishlists
            .lock()
            .await
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    async fn add_to_wishlist(&self, user: &UserIdentity, airdrop_id: &str) -> StoreResult<bool> {
        let mut wishlists = self.wishlists.lock().await;
        Ok(wishlists.entry(user.clone()).or_default().insert(airdrop_id))
    }

    async fn remove_from_wishlist(
        &self,
        user: &UserIdentity,
        airdrop_id: &str,
    ) -> StoreResult<bool> {
        let mut wishlists = self.wishlists.lock().await;
        Ok(wishlists
            .get_mut(user)
            .map(|wishlist| wishlist.remove(airdrop_id))
            .unwrap_or(false))
    }

    async fn load_reminders(&self, user: &UserIdentity) -> Vec<ReminderEntry> {
        self.reminders
            .lock()
            .await
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    async fn append_reminder(
        &self,
        user: &UserIdentity,
        airdrop_id: &str,
        remind_time: &str,
        frequency: Frequency,
    ) -> StoreResult<ReminderEntry> {
        let entry = ReminderEntry::new(airdrop_id, remind_time, frequency);
        self.reminders
            .lock()
            .await
            .entry(user.clone())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
