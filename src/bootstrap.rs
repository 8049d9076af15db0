//! Process start-up: data directory layout, first-run seed, store wiring.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::catalog::{seed_banners, seed_catalog_if_absent, CatalogStore};
use crate::config::{AppConfig, StorageBackend};
use crate::router::NavigationRouter;
use crate::state::{InMemoryUserStore, JsonUserStore, SqliteUserStore, UserStateStore};

/// Create the data directories. On the very first run, when the data
/// directory itself does not exist yet, also write the starter catalog and
/// placeholder banners. Returns whether this was a first run.
pub async fn prepare_data_dir(config: &AppConfig) -> Result<bool> {
    let first_run = !tokio::fs::try_exists(&config.data_dir)
        .await
        .with_context(|| format!("Failed to inspect {}", config.data_dir.display()))?;

    for dir in [
        &config.data_dir,
        &config.banners_dir,
        &config.user_drops_dir,
        &config.reminders_dir,
    ] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    if first_run {
        let seeded = seed_catalog_if_absent(&config.catalog_file)
            .await
            .context("Failed to seed catalog")?;
        let banners = seed_banners(&config.banners_dir)
            .await
            .context("Failed to create placeholder banners")?;
        info!(seeded, banners, "First run, data directory initialized");
    }

    Ok(first_run)
}

/// Construct the configured user state backend.
pub async fn open_user_store(config: &AppConfig) -> Result<Arc<dyn UserStateStore>> {
    let store: Arc<dyn UserStateStore> = match config.storage_backend {
        StorageBackend::Json => Arc::new(
            JsonUserStore::from_config(config)
                .await
                .context("Failed to open JSON user store")?,
        ),
        StorageBackend::Sqlite => Arc::new(
            SqliteUserStore::open(&config.database_file)
                .await
                .context("Failed to open SQLite user store")?,
        ),
        StorageBackend::Memory => Arc::new(InMemoryUserStore::new()),
    };
    Ok(store)
}

/// Everything a transport needs: one router over shared stores.
pub async fn build_router(config: &AppConfig) -> Result<Arc<NavigationRouter>> {
    prepare_data_dir(config).await?;

    let catalog = Arc::new(CatalogStore::open(&config.catalog_file, &config.banners_dir).await);
    let users = open_user_store(config).await?;

    Ok(Arc::new(NavigationRouter::new(catalog, users, config)))
}
