/// Repository layer over the JSON blob store
use crate::domain::{AircraftDatabase, DailySummary, Detection};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Directory of `<key>.json` blobs. Every write replaces the whole blob.
#[derive(Clone, Debug)]
pub struct BlobStore {
    dir: Arc<PathBuf>,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir.into()),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load a blob, failing with `MissingStore` if it does not exist
    pub async fn load_required<T: DeserializeOwned>(&self, key: &str) -> AppResult<T> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::MissingStore(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a blob, substituting the empty default when it does not exist
    pub async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> AppResult<T> {
        match self.load_required(key).await {
            Err(AppError::MissingStore(key)) => {
                debug!("blob {} not found, starting empty", key);
                Ok(T::default())
            }
            other => other,
        }
    }

    /// Write a blob through a temp file and rename it into place
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        tokio::fs::create_dir_all(self.dir.as_path()).await?;
        let bytes = serde_json::to_vec_pretty(value)?;
        let target = self.path(key);
        let tmp = tmp_path(&target);
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }
}

fn tmp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

pub fn detection_log_key(month: &str) -> String {
    format!("ice_airports_{}", month)
}

pub fn alert_log_key(month: &str) -> String {
    format!("ALERTS_{}", month)
}

pub const AIRCRAFT_DB_KEY: &str = "aircraft_database";

pub fn daily_summary_key(day: &str) -> String {
    format!("daily_summary_{}", day)
}

/// Monthly detection and alert logs
#[derive(Clone)]
pub struct DetectionRepo {
    store: BlobStore,
}

impl DetectionRepo {
    pub fn new(store: BlobStore) -> Self {
        Self { store }
    }

    /// Append detections to the month's log, returning how many were written
    pub async fn append_detections(&self, month: &str, detections: &[Detection]) -> AppResult<usize> {
        append(&self.store, &detection_log_key(month), detections.iter()).await
    }

    /// Append the alerting subset to the month's alert log
    pub async fn append_alerts(&self, month: &str, detections: &[Detection]) -> AppResult<usize> {
        let alerts = detections.iter().filter(|d| d.is_alert);
        append(&self.store, &alert_log_key(month), alerts).await
    }

    pub async fn load_month(&self, month: &str) -> AppResult<Vec<Detection>> {
        self.store.load(&detection_log_key(month)).await
    }

    pub async fn load_month_required(&self, month: &str) -> AppResult<Vec<Detection>> {
        self.store.load_required(&detection_log_key(month)).await
    }
}

async fn append<'a>(
    store: &BlobStore,
    key: &str,
    new: impl Iterator<Item = &'a Detection>,
) -> AppResult<usize> {
    let new: Vec<&Detection> = new.collect();
    if new.is_empty() {
        return Ok(0);
    }
    let mut log: Vec<Detection> = store.load(key).await?;
    log.extend(new.iter().map(|d| (*d).clone()));
    store.save(key, &log).await?;
    Ok(new.len())
}

/// Per-aircraft profile database
#[derive(Clone)]
pub struct AircraftRepo {
    store: BlobStore,
}

impl AircraftRepo {
    pub fn new(store: BlobStore) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> AppResult<AircraftDatabase> {
        self.store.load(AIRCRAFT_DB_KEY).await
    }

    pub async fn save(&self, db: &AircraftDatabase) -> AppResult<()> {
        self.store.save(AIRCRAFT_DB_KEY, db).await
    }
}

/// Daily gap summaries
#[derive(Clone)]
pub struct SummaryRepo {
    store: BlobStore,
}

impl SummaryRepo {
    pub fn new(store: BlobStore) -> Self {
        Self { store }
    }

    /// Overwrite the summary for `date`'s day, returning the key written
    pub async fn write(&self, date: DateTime<Utc>, summary: &DailySummary) -> AppResult<String> {
        let key = daily_summary_key(&crate::utils::day_stamp(date));
        self.store.save(&key, summary).await?;
        Ok(key)
    }
}
