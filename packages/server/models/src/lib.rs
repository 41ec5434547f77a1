#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the outbreak server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the analytics types so the API contract can evolve on its own.

use flu_finder_analytics_models::{ChartParams, FormattedSummary};
use flu_finder_outbreak_models::{
    COL_COUNTY, COL_FLOCK_SIZE, COL_FLOCK_TYPE, COL_OUTBREAK_DATE, COL_STATE, OutbreakRecord,
    OutbreakTable,
};
use serde::{Deserialize, Serialize};

/// Value of the `status` field on successful summary responses.
pub const STATUS_SUCCESS: &str = "success";

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Wraps `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// The outbreak table in column-major form, keyed by the feed's column
/// names.
///
/// Missing dates are serialized as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRecordColumns {
    /// Dates as `MM/DD/YYYY`.
    #[serde(rename = "Outbreak Date")]
    pub outbreak_date: Vec<String>,
    /// County names.
    #[serde(rename = "County")]
    pub county: Vec<String>,
    /// State names.
    #[serde(rename = "State")]
    pub state: Vec<String>,
    /// Birds affected.
    #[serde(rename = "Flock Size")]
    pub flock_size: Vec<u64>,
    /// Flock categories.
    #[serde(rename = "Flock Type")]
    pub flock_type: Vec<String>,
}

impl ApiRecordColumns {
    /// Column names in serialization order.
    pub const COLUMNS: [&'static str; 5] = [
        COL_OUTBREAK_DATE,
        COL_COUNTY,
        COL_STATE,
        COL_FLOCK_SIZE,
        COL_FLOCK_TYPE,
    ];

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    fn push(&mut self, record: &OutbreakRecord) {
        self.outbreak_date.push(
            record
                .outbreak_date
                .map(|d| d.format("%m/%d/%Y").to_string())
                .unwrap_or_default(),
        );
        self.county.push(record.county.clone());
        self.state.push(record.state.clone());
        self.flock_size.push(record.flock_size);
        self.flock_type.push(record.flock_type.clone());
    }
}

impl From<&OutbreakTable> for ApiRecordColumns {
    fn from(table: &OutbreakTable) -> Self {
        let mut columns = Self::default();
        for record in table {
            columns.push(record);
        }
        columns
    }
}

/// Summary totals for a scope, optionally with its records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummaryResponse {
    /// Always [`STATUS_SUCCESS`].
    pub status: String,
    /// State name, for state and county scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// County name, for county scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    /// Totals with grouping separators.
    pub summary: FormattedSummary,
    /// The scope's records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ApiRecordColumns>,
}

impl ApiSummaryResponse {
    /// A successful response carrying `summary`.
    #[must_use]
    pub fn success(summary: FormattedSummary) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            state: None,
            county: None,
            summary,
            data: None,
        }
    }
}

/// One latest-outbreak row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLatestOutbreak {
    /// State name.
    pub state: String,
    /// County name.
    pub county: String,
    /// Date as `YYYY-MM-DD`, if known.
    pub outbreak_date: Option<String>,
    /// Birds affected.
    pub flock_size: u64,
    /// Flock category.
    pub flock_type: String,
}

impl From<OutbreakRecord> for ApiLatestOutbreak {
    fn from(record: OutbreakRecord) -> Self {
        Self {
            state: record.state,
            county: record.county,
            outbreak_date: record.outbreak_date.map(|d| d.format("%Y-%m-%d").to_string()),
            flock_size: record.flock_size,
            flock_type: record.flock_type,
        }
    }
}

/// Query parameters for the chart endpoint.
///
/// Keys match the web client's query string (`show_top_n`, not camelCase).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQueryParams {
    /// Chart selector. Defaults to the time series when absent.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// State filter.
    pub state: Option<String>,
    /// County filter. Requires `state`.
    pub county: Option<String>,
    /// Keep only the largest N groups.
    pub show_top_n: Option<usize>,
    /// Window start.
    pub start: Option<String>,
    /// Window end.
    pub end: Option<String>,
}

/// Treats blank query values as absent.
fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ChartQueryParams {
    /// Chart selector used when `type` is absent.
    pub const DEFAULT_KIND: &'static str = "vbar";

    /// The requested chart selector, or [`Self::DEFAULT_KIND`].
    #[must_use]
    pub fn kind(&self) -> String {
        non_blank(self.kind.as_ref()).unwrap_or_else(|| Self::DEFAULT_KIND.to_string())
    }

    /// Converts to analytics chart parameters, dropping blank values.
    #[must_use]
    pub fn to_chart_params(&self) -> ChartParams {
        ChartParams {
            top_n: self.show_top_n,
            state: non_blank(self.state.as_ref()),
            county: non_blank(self.county.as_ref()),
            start: non_blank(self.start.as_ref()),
            end: non_blank(self.end.as_ref()),
        }
    }
}

/// Optional state and county filters shared by the map and latest
/// endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeQueryParams {
    /// State filter.
    pub state: Option<String>,
    /// County filter. Requires `state`.
    pub county: Option<String>,
}

impl ScopeQueryParams {
    /// The state filter, if non-blank.
    #[must_use]
    pub fn state(&self) -> Option<String> {
        non_blank(self.state.as_ref())
    }

    /// The county filter, if non-blank.
    #[must_use]
    pub fn county(&self) -> Option<String> {
        non_blank(self.county.as_ref())
    }
}
