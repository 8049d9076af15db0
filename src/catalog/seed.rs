//! First-run starter content for an empty data directory.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::catalog::store::CatalogDocument;
use crate::error::{StoreError, StoreResult};
use crate::types::{AirdropRecord, Difficulty, Links, Status};

/// Illustrative records written on first initialization.
pub fn sample_airdrops() -> Vec<AirdropRecord> {
    vec![
        AirdropRecord {
            id: "airdrop_001".to_string(),
            title: "MetaMask Airdrop".to_string(),
            description: "Complete tasks to earn META tokens. Connect wallet and perform swaps."
                .to_string(),
            category: "DeFi".to_string(),
            status: Status::Active,
            end_date: "2025-07-30".to_string(),
            reward: "Up to 1000 META".to_string(),
            difficulty: Difficulty::Easy,
            links: Links {
                website: Some("https://metamask.io".to_string()),
                twitter: Some("https://twitter.com/metamask".to_string()),
                discord: Some("https://discord.gg/metamask".to_string()),
                ..Links::default()
            },
            tasks: vec![
                "Connect MetaMask wallet".to_string(),
                "Perform 3 swaps".to_string(),
                "Hold 0.1 ETH for 30 days".to_string(),
            ],
            banner: Some("metamask_banner.jpg".to_string()),
        },
        AirdropRecord {
            id: "airdrop_002".to_string(),
            title: "Arbitrum ARB Tokens".to_string(),
            description: "Claim your ARB tokens if you used Arbitrum before the snapshot."
                .to_string(),
            category: "Layer 2".to_string(),
            status: Status::Hot,
            end_date: "2025-08-15".to_string(),
            reward: "500-10000 ARB".to_string(),
            difficulty: Difficulty::Medium,
            links: Links {
                website: Some("https://arbitrum.io".to_string()),
                twitter: Some("https://twitter.com/arbitrum".to_string()),
                ..Links::default()
            },
            tasks: vec![
                "Check eligibility".to_string(),
                "Connect eligible wallet".to_string(),
                "Claim tokens".to_string(),
            ],
            banner: Some("arbitrum_banner.jpg".to_string()),
        },
    ]
}

/// Write the sample catalog to `path` unless a document already exists.
///
/// Creation is exclusive, so an existing document is never replaced.
/// Returns whether the seed was written.
pub async fn seed_catalog_if_absent(path: &Path) -> StoreResult<bool> {
    let document = CatalogDocument {
        airdrops: sample_airdrops(),
    };
    let bytes = serde_json::to_vec_pretty(&document)?;

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    file.write_all(&bytes)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.sync_all().await.map_err(|e| StoreError::io(path, e))?;

    info!(
        path = %path.display(),
        records = document.airdrops.len(),
        "Seeded catalog with sample airdrops"
    );
    Ok(true)
}

/// Create empty placeholder files for the sample banners that are missing.
pub async fn seed_banners(banners_dir: &Path) -> StoreResult<usize> {
    let mut created = 0;
    for banner in sample_airdrops().iter().filter_map(|record| record.banner.clone()) {
        let path = banners_dir.join(&banner);
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(mut file) => {
                file.write_all(b"# Placeholder banner file\n")
                    .await
                    .map_err(|e| StoreError::io(&path, e))?;
                created += 1;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(StoreError::io(&path, e)),
        }
    }
    Ok(created)
}
