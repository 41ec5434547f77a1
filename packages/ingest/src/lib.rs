#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for syncing the upstream avian influenza outbreak feed into a
//! local snapshot.
//!
//! The feed is a single CSV of confirmed outbreaks in commercial and
//! backyard flocks. A sync downloads it, checks the column layout, sorts
//! it by outbreak date and replaces the snapshot file atomically, so the
//! server never reads a half-written table.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use flu_finder_outbreak_models::OutbreakTable;
use flu_finder_store::csv_table::parse_outbreak_csv;
use flu_finder_store::file::write_snapshot;
use flu_finder_store::{CsvFileStore, RecordStore, StoreError, retry};
use thiserror::Error;

/// Upstream CSV of confirmed outbreaks in commercial and backyard flocks.
pub const CDC_FEED_URL: &str =
    "https://www.cdc.gov/bird-flu/modules/situation-summary/commercial-backyard-flocks.csv";

/// Per-request download timeout.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors that can occur during a sync or inspection.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading, parsing or writing the table failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The HTTP client could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed parsed but held no rows.
    #[error("Feed at {url} contained no records")]
    EmptyFeed {
        /// The feed URL.
        url: String,
    },
}

/// Totals describing a table, reported after a sync or inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    /// Number of rows.
    pub records: usize,
    /// Rows without a parsable date.
    pub undated: usize,
    /// Birds affected across every row.
    pub flock_size: u64,
    /// Earliest and latest outbreak dates.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl TableStats {
    /// Computes the stats for `table`.
    #[must_use]
    pub fn of(table: &OutbreakTable) -> Self {
        Self {
            records: table.len(),
            undated: table.iter().filter(|r| r.outbreak_date.is_none()).count(),
            flock_size: table.total_flock_size(),
            date_range: table.date_range(),
        }
    }
}

impl std::fmt::Display for TableStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records ({} undated), {} birds affected",
            self.records, self.undated, self.flock_size
        )?;
        if let Some((first, last)) = self.date_range {
            write!(f, ", {first} to {last}")?;
        }
        Ok(())
    }
}

/// Parses a downloaded feed and sorts it by outbreak date, undated rows
/// last.
///
/// # Errors
///
/// Returns [`IngestError::Store`] if required columns are missing.
pub fn prepare_feed(bytes: &[u8]) -> Result<OutbreakTable, IngestError> {
    let mut table = parse_outbreak_csv(bytes)?;
    table.sort_by_outbreak_date();
    Ok(table)
}

/// Downloads the feed at `url` and replaces the snapshot at `output`.
///
/// The existing snapshot is left untouched if the download fails or the
/// feed is empty.
///
/// # Errors
///
/// Returns [`IngestError`] if the download fails after retries, the feed
/// lacks required columns or holds no rows, or the snapshot cannot be
/// written.
pub async fn sync_feed(url: &str, output: &Path) -> Result<TableStats, IngestError> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .user_agent(concat!("flu_finder_ingest/", env!("CARGO_PKG_VERSION")))
        .build()?;

    log::info!("Downloading {url}...");
    let bytes = retry::send_bytes(|| client.get(url), retry::MAX_RETRIES).await?;
    log::info!("Downloaded {} bytes", bytes.len());

    let table = prepare_feed(&bytes)?;
    if table.is_empty() {
        return Err(IngestError::EmptyFeed {
            url: url.to_string(),
        });
    }

    persist_feed(table, output).await
}

/// Writes `table` to the snapshot at `output` on the blocking pool.
///
/// # Errors
///
/// Returns [`IngestError::Store`] if the snapshot cannot be written.
pub async fn persist_feed(table: OutbreakTable, output: &Path) -> Result<TableStats, IngestError> {
    let stats = TableStats::of(&table);
    let output = output.to_path_buf();
    tokio::task::spawn_blocking(move || write_snapshot(&table, &output))
        .await
        .map_err(|e| StoreError::from(std::io::Error::other(e)))??;
    Ok(stats)
}

/// Loads the snapshot at `path` and computes its stats.
///
/// # Errors
///
/// Returns [`IngestError::Store`] if the snapshot cannot be read or lacks
/// required columns.
pub async fn inspect_snapshot(path: &Path) -> Result<TableStats, IngestError> {
    let store = CsvFileStore::connect(path).await?;
    let table = store.fetch_all().await?;
    store.close().await?;
    Ok(TableStats::of(&table))
}
