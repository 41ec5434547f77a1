#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record store adapters for the outbreak table.
//!
//! A record store exposes one operation that matters to the query layer:
//! fetch the complete current outbreak table. There is no query pushdown;
//! filtering and aggregation happen in memory on the fetched snapshot.
//!
//! Adapters are constructed once per process through their `connect`
//! function and shared as an `Arc<dyn RecordStore>`. The snapshot behind a
//! store may change between fetches (the ingestion job rewrites it daily),
//! so callers must not assume two fetches return the same table.

pub mod csv_table;
pub mod file;
pub mod memory;
pub mod paths;
pub mod retry;
pub mod sheet;

use async_trait::async_trait;
use flu_finder_outbreak_models::OutbreakTable;
use thiserror::Error;

pub use file::CsvFileStore;
pub use memory::MemoryStore;
pub use sheet::PublishedSheetStore;

/// Errors that can occur while reading or writing outbreak snapshots.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Source unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// The store was used after [`RecordStore::close`].
    #[error("Store '{name}' is closed")]
    Closed {
        /// Name of the closed store.
        name: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The table is missing one or more required columns.
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// The absent column names.
        columns: Vec<String>,
    },
}

impl StoreError {
    /// Whether the error means the backing store could not be read at all,
    /// as opposed to the store returning malformed content.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Closed { .. } | Self::Http(_) | Self::Io(_)
        )
    }
}

/// A source of the full outbreak table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short human-readable description used in logs.
    fn describe(&self) -> String;

    /// Fetches every outbreak record currently in the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be reached, has been
    /// closed, or holds a table without the required columns.
    async fn fetch_all(&self) -> Result<OutbreakTable, StoreError>;

    /// Releases the store. Subsequent fetches fail with
    /// [`StoreError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if releasing underlying resources fails.
    async fn close(&self) -> Result<(), StoreError>;
}
