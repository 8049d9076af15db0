//! Application configuration loaded from environment variables.
//!
//! Every setting has a default so the catalog browser starts with zero
//! configuration against a local `data/` directory.

use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A selectable reminder time offered on the reminder options screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderOption {
    /// Display label, e.g. "1 hour"
    pub label: String,
    pub minutes: u32,
}

impl ReminderOption {
    pub fn new(label: &str, minutes: u32) -> Self {
        Self {
            label: label.to_string(),
            minutes,
        }
    }

    /// Label as carried inside a token, spaces replaced by `_`.
    pub fn token_label(&self) -> String {
        self.label.replace(' ', "_")
    }
}

/// Which `UserStateStore` implementation backs per-user data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// One JSON document per user partition
    Json,
    /// A single SQLite database
    Sqlite,
    /// Process-local only; nothing survives a restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of all persisted data.
    /// Env: `AIRDROP_DATA_DIR`
    /// Default: `data`
    pub data_dir: PathBuf,

    /// Catalog document, `<data_dir>/alldrops.json`.
    pub catalog_file: PathBuf,

    /// Banner images, `<data_dir>/AirdropBanners`.
    pub banners_dir: PathBuf,

    /// Wishlist documents, `<data_dir>/UserDrops`.
    pub user_drops_dir: PathBuf,

    /// Reminder documents, `<data_dir>/Reminders`.
    pub reminders_dir: PathBuf,

    /// SQLite database used by the `sqlite` backend, `<data_dir>/airdrops.db`.
    pub database_file: PathBuf,

    /// Records per list page.
    /// Env: `AIRDROP_PAGE_SIZE`
    /// Default: `5`
    pub page_size: NonZeroUsize,

    /// How many of the most recent reminders the overview shows.
    /// Env: `AIRDROP_REMINDERS_SHOWN`
    /// Default: `10`
    pub reminders_shown: usize,

    /// Ordered reminder choices.
    pub reminder_options: Vec<ReminderOption>,

    /// Env: `AIRDROP_STORAGE` (json/sqlite/memory)
    /// Default: `json`
    pub storage_backend: StorageBackend,

    /// Attempts per partition write before the mutation is reported failed.
    /// Env: `AIRDROP_WRITE_RETRIES`
    /// Default: `3`
    pub write_retry_attempts: usize,

    /// Base delay of the write retry backoff.
    pub write_retry_base_ms: u64,

    /// Env: `AIRDROP_PARTITION_CACHE`
    /// Default: `1000`
    pub partition_cache_entries: u64,

    pub partition_cache_ttl_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

impl AppConfig {
    /// Defaults with every derived path rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            catalog_file: data_dir.join("alldrops.json"),
            banners_dir: data_dir.join("AirdropBanners"),
            user_drops_dir: data_dir.join("UserDrops"),
            reminders_dir: data_dir.join("Reminders"),
            database_file: data_dir.join("airdrops.db"),
            data_dir,
            page_size: NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN),
            reminders_shown: 10,
            reminder_options: default_reminder_options(),
            storage_backend: StorageBackend::Json,
            write_retry_attempts: 3,
            write_retry_base_ms: 50,
            partition_cache_entries: 1000,
            partition_cache_ttl_seconds: 300,
        }
    }

    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = match std::env::var("AIRDROP_DATA_DIR") {
            Ok(dir) if !dir.is_empty() => Self::with_data_dir(dir),
            _ => Self::default(),
        };

        if let Some(size) = parse_env::<usize>("AIRDROP_PAGE_SIZE") {
            match NonZeroUsize::new(size) {
                Some(size) => config.page_size = size,
                None => tracing::warn!("AIRDROP_PAGE_SIZE must be positive, using default"),
            }
        }

        if let Some(shown) = parse_env::<usize>("AIRDROP_REMINDERS_SHOWN") {
            config.reminders_shown = shown;
        }

        if let Some(backend) = parse_env::<StorageBackend>("AIRDROP_STORAGE") {
            config.storage_backend = backend;
        }

        if let Some(attempts) = parse_env::<usize>("AIRDROP_WRITE_RETRIES") {
            config.write_retry_attempts = attempts;
        }

        if let Some(entries) = parse_env::<u64>("AIRDROP_PARTITION_CACHE") {
            config.partition_cache_entries = entries;
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }
}

fn default_reminder_options() -> Vec<ReminderOption> {
    vec![
        ReminderOption::new("15 minutes", 15),
        ReminderOption::new("1 hour", 60),
        ReminderOption::new("6 hours", 360),
        ReminderOption::new("1 day", 1440),
        ReminderOption::new("3 days", 4320),
        ReminderOption::new("1 week", 10080),
    ]
}

fn parse_env<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(var = name, value = %raw, error = %e, "Invalid value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.page_size.get(), 5);
        assert_eq!(config.reminders_shown, 10);
        assert_eq!(config.catalog_file, PathBuf::from("data").join("alldrops.json"));
        assert_eq!(config.storage_backend, StorageBackend::Json);
        assert_eq!(config.reminder_options.len(), 6);
        assert_eq!(config.reminder_options[0].label, "15 minutes");
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let config = AppConfig::with_data_dir("/srv/airdrops");
        assert_eq!(config.user_drops_dir, PathBuf::from("/srv/airdrops/UserDrops"));
        assert_eq!(config.reminders_dir, PathBuf::from("/srv/airdrops/Reminders"));
    }

    #[test]
    fn test_reminder_option_token_label() {
        let config = AppConfig::default();
        let week = &config.reminder_options[5];
        assert_eq!(week.token_label(), "1_week");
        assert_eq!(week.minutes, 10080);
    }

    #[test]
    fn test_parse_storage_backend() {
        assert_eq!("SQLite".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert!("redis".parse::<StorageBackend>().is_err());
    }
}
