//! In-memory record store.
//!
//! Used by tests and by callers that already hold a table (for example the
//! ingestion job serving its freshly downloaded feed).

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use flu_finder_outbreak_models::OutbreakTable;

use crate::{RecordStore, StoreError};

/// A [`RecordStore`] holding its table in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<OutbreakTable>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Creates a store serving `table`.
    #[must_use]
    pub fn new(table: OutbreakTable) -> Self {
        Self {
            table: RwLock::new(table),
            closed: AtomicBool::new(false),
        }
    }

    /// Replaces the served table. Later fetches see the new rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the lock is poisoned.
    pub fn replace(&self, table: OutbreakTable) -> Result<(), StoreError> {
        let mut guard = self.table.write().map_err(|e| StoreError::Unavailable {
            message: format!("memory store lock poisoned: {e}"),
        })?;
        *guard = table;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn describe(&self) -> String {
        "in-memory table".to_string()
    }

    async fn fetch_all(&self) -> Result<OutbreakTable, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed {
                name: self.describe(),
            });
        }

        let guard = self.table.read().map_err(|e| StoreError::Unavailable {
            message: format!("memory store lock poisoned: {e}"),
        })?;
        Ok(guard.clone())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
