//! CatalogStore - snapshot-based access to the catalog document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::types::AirdropRecord;

/// On-disk shape of the catalog document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct CatalogDocument {
    #[serde(default)]
    pub airdrops: Vec<AirdropRecord>,
}

/// Catalog document as read, so one bad record cannot hide the rest.
#[derive(Debug, Default, Deserialize)]
struct RawCatalogDocument {
    #[serde(default)]
    airdrops: Vec<serde_json::Value>,
}

/// One immutable view of the catalog.
///
/// Ids are unique within a snapshot: when the document repeats an id the
/// last occurrence wins and takes the position of the first.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    records: Vec<AirdropRecord>,
    index: HashMap<String, usize>,
}

impl CatalogSnapshot {
    pub fn from_records(records: Vec<AirdropRecord>) -> Self {
        let mut snapshot = CatalogSnapshot::default();
        for record in records {
            match snapshot.index.get(&record.id) {
                Some(&position) => {
                    warn!(id = %record.id, "Duplicate catalog id, keeping the later record");
                    snapshot.records[position] = record;
                }
                None => {
                    snapshot.index.insert(record.id.clone(), snapshot.records.len());
                    snapshot.records.push(record);
                }
            }
        }
        snapshot
    }

    /// All records in document order.
    pub fn records(&self) -> &[AirdropRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&AirdropRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only store over the catalog document.
pub struct CatalogStore {
    path: Option<PathBuf>,
    banners_dir: Option<PathBuf>,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    /// Open the catalog at `path`. A missing or unreadable document yields
    /// an empty catalog.
    pub async fn open(path: impl Into<PathBuf>, banners_dir: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = read_snapshot(&path).await;
        info!(path = %path.display(), records = snapshot.len(), "Catalog loaded");

        Self {
            path: Some(path),
            banners_dir: Some(banners_dir.into()),
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Catalog not backed by any document, mainly for tests.
    pub fn from_records(records: Vec<AirdropRecord>) -> Self {
        Self {
            path: None,
            banners_dir: None,
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::from_records(records))),
        }
    }

    /// Current snapshot. Holding it keeps a consistent view across reloads.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<AirdropRecord> {
        self.snapshot().get(id).cloned()
    }

    /// Re-read the whole document and swap it in. Returns the record count.
    pub async fn reload(&self) -> usize {
        let Some(path) = &self.path else {
            return self.snapshot().len();
        };

        let fresh = Arc::new(read_snapshot(path).await);
        let count = fresh.len();
        match self.snapshot.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }

        info!(path = %path.display(), records = count, "Catalog reloaded");
        count
    }

    /// Path of the record's banner image, if it names one that exists.
    pub async fn banner_path(&self, record: &AirdropRecord) -> Option<PathBuf> {
        let dir = self.banners_dir.as_ref()?;
        let filename = record.banner.as_deref().filter(|name| !name.is_empty())?;
        let bare_name = Path::new(filename).file_name() == Some(OsStr::new(filename));
        if !bare_name || filename.contains('\\') {
            warn!(
                id = %record.id,
                banner = filename,
                "Ignoring banner outside the banner directory"
            );
            return None;
        }

        let path = dir.join(filename);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }
}

async fn read_snapshot(path: &Path) -> CatalogSnapshot {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No catalog document, using empty catalog");
            return CatalogSnapshot::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Catalog unreadable, using empty catalog");
            return CatalogSnapshot::default();
        }
    };

    let document = match serde_json::from_slice::<RawCatalogDocument>(&bytes) {
        Ok(document) => document,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Catalog corrupt, using empty catalog");
            return CatalogSnapshot::default();
        }
    };

    let mut records = Vec::with_capacity(document.airdrops.len());
    for (position, raw) in document.airdrops.into_iter().enumerate() {
        match serde_json::from_value::<AirdropRecord>(raw) {
            Ok(record) => records.push(record),
            Err(e) => warn!(position, error = %e, "Skipping unreadable catalog record"),
        }
    }
    CatalogSnapshot::from_records(records)
}
