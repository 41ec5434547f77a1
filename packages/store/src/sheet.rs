//! Record store backed by a spreadsheet published as CSV.
//!
//! The production table lives in a spreadsheet that the ingestion job keeps
//! in sync with the upstream feed. Publishing the sheet as CSV gives a
//! stable export URL, so reading it needs nothing beyond an HTTP GET.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use flu_finder_outbreak_models::OutbreakTable;

use crate::csv_table::parse_outbreak_csv;
use crate::{RecordStore, StoreError, retry};

/// Per-request timeout for the export download.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A [`RecordStore`] downloading a published spreadsheet CSV export.
#[derive(Debug)]
pub struct PublishedSheetStore {
    url: String,
    client: reqwest::Client,
    closed: AtomicBool,
}

impl PublishedSheetStore {
    /// Creates a store for the CSV export at `url`.
    ///
    /// No request is made until the first [`RecordStore::fetch_all`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if `url` is not a valid HTTP(S)
    /// URL, or [`StoreError::Http`] if the client cannot be built.
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| StoreError::Unavailable {
            message: format!("invalid sheet URL '{url}': {e}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::Unavailable {
                message: format!("unsupported URL scheme '{}'", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("flu_finder/", env!("CARGO_PKG_VERSION")))
            .build()?;

        log::info!("Using published sheet at {url}");

        Ok(Self {
            url: url.to_owned(),
            client,
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl RecordStore for PublishedSheetStore {
    fn describe(&self) -> String {
        format!("published sheet {}", self.url)
    }

    async fn fetch_all(&self) -> Result<OutbreakTable, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed {
                name: self.describe(),
            });
        }

        let bytes = retry::send_bytes(|| self.client.get(&self.url), retry::MAX_RETRIES).await?;
        log::debug!("Downloaded {} bytes from {}", bytes.len(), self.url);

        parse_outbreak_csv(&bytes)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
