//! JSON document implementation of the UserStateStore trait.
//!
//! Each partition is its own file: `<user_drops_dir>/<user>.json` holds the
//! wishlist under `airdrops`, `<reminders_dir>/<user>_reminders.json` holds
//! the reminder log under `reminders`. Writes go to a temporary file that is
//! renamed over the document, so a reader or a crash only ever observes the
//! old or the new state.

use async_trait::async_trait;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, error, info, instrument, warn};

use crate::config::AppConfig;
use crate::error::{StoreError, StoreResult};
use crate::state::{Partition, PartitionLocks, UserStateStore};
use crate::types::{Frequency, ReminderEntry, UserIdentity, Wishlist};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReminderDocument {
    #[serde(default)]
    reminders: Vec<ReminderEntry>,
}

/// Retry and cache settings for a [`JsonUserStore`].
#[derive(Debug, Clone)]
pub struct JsonStoreOptions {
    pub write_retry_attempts: usize,
    pub write_retry_base_ms: u64,
    pub cache_entries: u64,
    pub cache_ttl: Duration,
}

impl Default for JsonStoreOptions {
    fn default() -> Self {
        Self {
            write_retry_attempts: 3,
            write_retry_base_ms: 10,
            cache_entries: 1000,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Per-user JSON documents with per-partition locking and a small cache.
///
/// Cache entries are only read and written while the partition lock is
/// held, so they never run ahead of or behind the file on disk.
pub struct JsonUserStore {
    user_drops_dir: PathBuf,
    reminders_dir: PathBuf,
    options: JsonStoreOptions,
    locks: PartitionLocks,
    wishlists: Cache<UserIdentity, Wishlist>,
    reminders: Cache<UserIdentity, Arc<Vec<ReminderEntry>>>,
}

impl JsonUserStore {
    /// Creates the partition directories if needed.
    pub async fn new(
        user_drops_dir: impl Into<PathBuf>,
        reminders_dir: impl Into<PathBuf>,
        options: JsonStoreOptions,
    ) -> StoreResult<Self> {
        let user_drops_dir = user_drops_dir.into();
        let reminders_dir = reminders_dir.into();

        for dir in [&user_drops_dir, &reminders_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir.as_path(), e))?;
        }

        info!(
            user_drops = %user_drops_dir.display(),
            reminders = %reminders_dir.display(),
            "JsonUserStore initialized"
        );

        Ok(Self {
            wishlists: Cache::builder()
                .max_capacity(options.cache_entries)
                .time_to_live(options.cache_ttl)
                .build(),
            reminders: Cache::builder()
                .max_capacity(options.cache_entries)
                .time_to_live(options.cache_ttl)
                .build(),
            user_drops_dir,
            reminders_dir,
            options,
            locks: PartitionLocks::new(),
        })
    }

    pub async fn from_config(config: &AppConfig) -> StoreResult<Self> {
        let options = JsonStoreOptions {
            write_retry_attempts: config.write_retry_attempts,
            write_retry_base_ms: config.write_retry_base_ms,
            cache_entries: config.partition_cache_entries,
            cache_ttl: Duration::from_secs(config.partition_cache_ttl_seconds),
        };
        Self::new(&config.user_drops_dir, &config.reminders_dir, options).await
    }

    pub fn wishlist_path(&self, user: &UserIdentity) -> PathBuf {
        self.user_drops_dir.join(format!("{}.json", user))
    }

    pub fn reminders_path(&self, user: &UserIdentity) -> PathBuf {
        self.reminders_dir.join(format!("{}_reminders.json", user))
    }

    /// Wishlist as currently persisted. Caller must hold the partition lock.
    async fn current_wishlist(&self, user: &UserIdentity) -> StoreResult<Wishlist> {
        if let Some(cached) = self.wishlists.get(user).await {
            return Ok(cached);
        }
        let wishlist: Wishlist = read_document(&self.wishlist_path(user)).await?;
        // Older documents may repeat an id; collapse to set semantics.
        let wishlist: Wishlist = wishlist.ids().iter().cloned().collect();
        self.wishlists.insert(user.clone(), wishlist.clone()).await;
        Ok(wishlist)
    }

    /// Reminder log as currently persisted. Caller must hold the partition lock.
    async fn current_reminders(&self, user: &UserIdentity) -> StoreResult<Arc<Vec<ReminderEntry>>> {
        if let Some(cached) = self.reminders.get(user).await {
            return Ok(cached);
        }
        let document: ReminderDocument = read_document(&self.reminders_path(user)).await?;
        let log = Arc::new(document.reminders);
        self.reminders.insert(user.clone(), Arc::clone(&log)).await;
        Ok(log)
    }

    async fn save_wishlist(&self, user: &UserIdentity, wishlist: Wishlist) -> StoreResult<()> {
        let path = self.wishlist_path(user);
        if let Err(e) = self.write_document(&path, &wishlist).await {
            self.wishlists.invalidate(user).await;
            return Err(e);
        }
        self.wishlists.insert(user.clone(), wishlist).await;
        Ok(())
    }

    /// Serialize and atomically replace `path`, retrying transient failures.
    async fn write_document<T: Serialize>(&self, path: &Path, value: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let strategy = ExponentialBackoff::from_millis(self.options.write_retry_base_ms.max(1))
            .max_delay(Duration::from_secs(1))
            .take(self.options.write_retry_attempts);

        Retry::spawn(strategy, || write_atomic(path, &bytes))
            .await
            .map_err(|e| {
                error!(path = %path.display(), error = %e, "Partition write failed");
                e
            })
    }
}

#[async_trait]
impl UserStateStore for JsonUserStore {
    #[instrument(skip(self, user), fields(user = %user))]
    async fn load_wishlist(&self, user: &UserIdentity) -> Wishlist {
        let _guard = self.locks.acquire(&Partition::Wishlist.key(user)).await;
        match self.current_wishlist(user).await {
            Ok(wishlist) => wishlist,
            Err(e) => {
                warn!(error = %e, "Wishlist unreadable, treating as empty");
                Wishlist::new()
            }
        }
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn add_to_wishlist(&self, user: &UserIdentity, airdrop_id: &str) -> StoreResult<bool> {
        let _guard = self.locks.acquire(&Partition::Wishlist.key(user)).await;
        let mut wishlist = self.current_wishlist(user).await?;
        if !wishlist.insert(airdrop_id) {
            debug!("Already wishlisted");
            return Ok(false);
        }
        self.save_wishlist(user, wishlist).await?;
        debug!("Added to wishlist");
        Ok(true)
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn remove_from_wishlist(
        &self,
        user: &UserIdentity,
        airdrop_id: &str,
    ) -> StoreResult<bool> {
        let _guard = self.locks.acquire(&Partition::Wishlist.key(user)).await;
        let mut wishlist = self.current_wishlist(user).await?;
        if !wishlist.remove(airdrop_id) {
            debug!("Not wishlisted");
            return Ok(false);
        }
        self.save_wishlist(user, wishlist).await?;
        debug!("Removed from wishlist");
        Ok(true)
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn load_reminders(&self, user: &UserIdentity) -> Vec<ReminderEntry> {
        let _guard = self.locks.acquire(&Partition::Reminders.key(user)).await;
        match self.current_reminders(user).await {
            Ok(log) => log.as_ref().clone(),
            Err(e) => {
                warn!(error = %e, "Reminder log unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn append_reminder(
        &self,
        user: &UserIdentity,
        airdrop_id: &str,
        remind_time: &str,
        frequency: Frequency,
    ) -> StoreResult<ReminderEntry> {
        let _guard = self.locks.acquire(&Partition::Reminders.key(user)).await;
        let current = self.current_reminders(user).await?;

        let entry = ReminderEntry::new(airdrop_id, remind_time, frequency);
        let mut reminders = current.as_ref().clone();
        reminders.push(entry.clone());
        let document = ReminderDocument { reminders };

        let path = self.reminders_path(user);
        if let Err(e) = self.write_document(&path, &document).await {
            self.reminders.invalidate(user).await;
            return Err(e);
        }
        self.reminders
            .insert(user.clone(), Arc::new(document.reminders))
            .await;

        debug!(total = current.len() + 1, "Reminder appended");
        Ok(entry)
    }

    async fn health_check(&self) -> bool {
        fs::try_exists(&self.user_drops_dir).await.unwrap_or(false)
            && fs::try_exists(&self.reminders_dir).await.unwrap_or(false)
    }
}

/// Missing file is the default (empty) value; anything else must parse.
async fn read_document<T: DeserializeOwned + Default>(path: &Path) -> StoreResult<T> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `bytes` next to `path` and rename over it.
async fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StoreError::InvalidValue(format!("not a file path: {}", path.display())))?;
    let suffix = rand::random::<u64>();
    let tmp_path = path.with_file_name(format!(".{}.{:016x}.tmp", file_name, suffix));

    let result = async {
        let mut file = fs::File::create(&tmp_path)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(&tmp_path, e))?;
        drop(file);
        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| StoreError::io(path, e))
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path).await;
    }
    result
}
