//! SQLite implementation of the UserStateStore trait.
//!
//! Every mutation is a single statement, so SQLite's own write lock is the
//! per-partition serialization point and no read-modify-write happens in
//! application code.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Pool, Sqlite};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::state::UserStateStore;
use crate::types::{created_at_format, Frequency, ReminderEntry, UserIdentity, Wishlist};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS wishlist_items (
        position INTEGER PRIMARY KEY AUTOINCREMENT,
        user_key TEXT NOT NULL,
        airdrop_id TEXT NOT NULL,
        UNIQUE (user_key, airdrop_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reminders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_key TEXT NOT NULL,
        airdrop_id TEXT NOT NULL,
        remind_time TEXT NOT NULL,
        frequency TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_reminders_user ON reminders (user_key, id);",
];

#[derive(FromRow)]
struct ReminderRow {
    airdrop_id: String,
    remind_time: String,
    frequency: String,
    created_at: String,
}

impl TryFrom<ReminderRow> for ReminderEntry {
    type Error = StoreError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        let frequency = match row.frequency.as_str() {
            "once" => Frequency::Once,
            other => return Err(StoreError::InvalidValue(format!("unknown frequency '{}'", other))),
        };
        let created_at =
            created_at_format::parse(&row.created_at).map_err(StoreError::InvalidValue)?;
        Ok(ReminderEntry {
            airdrop_id: row.airdrop_id,
            remind_time: row.remind_time,
            frequency,
            created_at,
        })
    }
}

/// User state kept in one SQLite database.
pub struct SqliteUserStore {
    pool: Pool<Sqlite>,
}

impl SqliteUserStore {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self::with_pool(pool).await?;
        info!(path = %path.display(), "SqliteUserStore initialized");
        Ok(store)
    }

    /// Private in-memory database. One connection, since each in-memory
    /// connection would otherwise see its own empty database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: Pool<Sqlite>) -> StoreResult<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    async fn fetch_wishlist(&self, user: &UserIdentity) -> StoreResult<Wishlist> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT airdrop_id FROM wishlist_items WHERE user_key = ? ORDER BY position ASC;",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn fetch_reminders(&self, user: &UserIdentity) -> StoreResult<Vec<ReminderEntry>> {
        let rows: Vec<ReminderRow> = sqlx::query_as(
            r#"
            SELECT airdrop_id, remind_time, frequency, created_at
            FROM reminders
            WHERE user_key = ?
            ORDER BY id ASC;
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match ReminderEntry::try_from(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(user = %user, error = %e, "Skipping unreadable reminder row"),
            }
        }
        Ok(entries)
    }
}

#[async_trait]
impl UserStateStore for SqliteUserStore {
    async fn load_wishlist(&self, user: &UserIdentity) -> Wishlist {
        match self.fetch_wishlist(user).await {
            Ok(wishlist) => wishlist,
            Err(e) => {
                warn!(user = %user, error = %e, "Wishlist unreadable, treating as empty");
                Wishlist::new()
            }
        }
    }

    async fn add_to_wishlist(&self, user: &UserIdentity, airdrop_id: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO wishlist_items (user_key, airdrop_id) VALUES (?, ?);",
        )
        .bind(user.as_str())
        .bind(airdrop_id)
        .execute(&self.pool)
        .await?;

        debug!(user = %user, airdrop_id, changed = result.rows_affected() > 0, "Wishlist add");
        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_wishlist(
        &self,
        user: &UserIdentity,
        airdrop_id: &str,
    ) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM wishlist_items WHERE user_key = ? AND airdrop_id = ?;")
                .bind(user.as_str())
                .bind(airdrop_id)
                .execute(&self.pool)
                .await?;

        debug!(user = %user, airdrop_id, changed = result.rows_affected() > 0, "Wishlist remove");
        Ok(result.rows_affected() > 0)
    }

    async fn load_reminders(&self, user: &UserIdentity) -> Vec<ReminderEntry> {
        match self.fetch_reminders(user).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(user = %user, error = %e, "Reminder log unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    async fn append_reminder(
        &self,
        user: &UserIdentity,
        airdrop_id: &str,
        remind_time: &str,
        frequency: Frequency,
    ) -> StoreResult<ReminderEntry> {
        let entry = ReminderEntry::new(airdrop_id, remind_time, frequency);

        sqlx::query(
            r#"
            INSERT INTO reminders (user_key, airdrop_id, remind_time, frequency, created_at)
            VALUES (?, ?, ?, ?, ?);
            "#,
        )
        .bind(user.as_str())
        .bind(entry.airdrop_id.as_str())
        .bind(entry.remind_time.as_str())
        .bind(entry.frequency.as_str())
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(user = %user, airdrop_id, "Reminder appended");
        Ok(entry)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
