#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Outbreak analytics engine.
//!
//! Filters the outbreak table by scope and time window, aggregates it into
//! ranked groups, and shapes the results into chart and choropleth
//! payloads. [`service::OutbreakService`] composes these steps over an
//! injected record store for the HTTP layer.

pub mod aggregate;
pub mod chart;
pub mod choropleth;
pub mod filter;
pub mod service;
pub mod summary;
pub mod title;

use flu_finder_analytics_models::{InvalidDateBoundError, InvalidScopeError};
use flu_finder_store::StoreError;
use thiserror::Error;

pub use service::OutbreakService;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// County given without a state, or a blank name.
    #[error(transparent)]
    InvalidScope(#[from] InvalidScopeError),

    /// Chart selector outside the known set.
    #[error("Unknown chart type: {kind}")]
    InvalidChartKind {
        /// The rejected selector.
        kind: String,
    },

    /// Unparsable start or end bound.
    #[error(transparent)]
    InvalidTimeWindow(#[from] InvalidDateBoundError),

    /// The input table has no rows.
    #[error("No data to aggregate")]
    EmptyInput,

    /// The record store could not be read.
    #[error("Data source unavailable: {message}")]
    SourceUnavailable {
        /// Underlying store failure.
        message: String,
    },
}

impl AnalyticsError {
    /// Whether the caller supplied bad input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidScope(_) | Self::InvalidChartKind { .. } | Self::InvalidTimeWindow(_)
        )
    }

    /// Whether repeating the request later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

impl From<StoreError> for AnalyticsError {
    fn from(e: StoreError) -> Self {
        Self::SourceUnavailable {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_retryable() {
        let err = AnalyticsError::from(StoreError::Closed {
            name: "memory".to_string(),
        });
        assert!(err.is_retryable());
        assert!(!err.is_client_error());
    }

    #[test]
    fn bad_input_is_client_error() {
        let err = AnalyticsError::InvalidChartKind {
            kind: "donut".to_string(),
        };
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Unknown chart type: donut");
        assert!(!AnalyticsError::EmptyInput.is_client_error());
    }
}
