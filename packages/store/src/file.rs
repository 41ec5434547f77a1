//! Record store backed by a CSV snapshot on local disk.
//!
//! The ingestion job rewrites the snapshot with [`write_snapshot`], which
//! writes to a sibling temp file and renames it into place, so a concurrent
//! [`CsvFileStore::fetch_all`] sees either the old or the new table.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use flu_finder_outbreak_models::OutbreakTable;

use crate::csv_table::{parse_outbreak_csv, write_outbreak_csv};
use crate::{RecordStore, StoreError, paths};

/// A [`RecordStore`] reading a CSV snapshot file.
#[derive(Debug)]
pub struct CsvFileStore {
    path: PathBuf,
    closed: AtomicBool,
}

impl CsvFileStore {
    /// Opens a store over the snapshot at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the file does not exist.
    pub async fn connect(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(StoreError::Unavailable {
                    message: format!("{} is not a file", path.display()),
                });
            }
            Err(e) => {
                return Err(StoreError::Unavailable {
                    message: format!("cannot open snapshot {}: {e}", path.display()),
                });
            }
        }

        log::info!("Using outbreak snapshot at {}", path.display());

        Ok(Self {
            path,
            closed: AtomicBool::new(false),
        })
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for CsvFileStore {
    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }

    async fn fetch_all(&self) -> Result<OutbreakTable, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed {
                name: self.describe(),
            });
        }

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("failed to read {}: {e}", self.path.display()),
            })?;

        parse_outbreak_csv(&bytes)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// Writes `table` to `path`, replacing any existing snapshot atomically.
///
/// # Errors
///
/// Returns [`StoreError`] if the parent directory cannot be created or the
/// file cannot be written or renamed.
pub fn write_snapshot(table: &OutbreakTable, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        paths::ensure_dir(parent)?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    {
        let file = File::create(&tmp_path)?;
        write_outbreak_csv(table, BufWriter::new(file))?;
    }
    std::fs::rename(&tmp_path, path)?;

    log::info!("Wrote {} records to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flu_finder_outbreak_models::OutbreakRecord;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "flu_finder_store_{}_{name}.csv",
            std::process::id()
        ))
    }

    fn sample_table() -> OutbreakTable {
        OutbreakTable::new(vec![OutbreakRecord {
            outbreak_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 5),
            county: "Weld".to_string(),
            state: "Colorado".to_string(),
            flock_size: 1_780_000,
            flock_type: "Commercial Table Egg Layer".to_string(),
            latitude: Some(40.55),
            longitude: Some(-104.4),
        }])
    }

    #[tokio::test]
    async fn connect_fails_for_missing_file() {
        let err = CsvFileStore::connect(temp_path("missing")).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn reads_written_snapshot() {
        let path = temp_path("roundtrip");
        write_snapshot(&sample_table(), &path).unwrap();

        let store = CsvFileStore::connect(&path).await.unwrap();
        let table = store.fetch_all().await.unwrap();
        assert_eq!(table, sample_table());

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn fetch_after_close_fails() {
        let path = temp_path("closed");
        write_snapshot(&sample_table(), &path).unwrap();

        let store = CsvFileStore::connect(&path).await.unwrap();
        store.close().await.unwrap();
        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Closed { .. }));

        std::fs::remove_file(&path).unwrap();
    }
}
