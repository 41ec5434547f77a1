#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query, aggregation and chart types for the outbreak service.
//!
//! Defines the scope and time window inputs, the aggregation result shape,
//! and the chart and choropleth outputs consumed by the web client's
//! renderer.

pub mod chart;
pub mod choropleth;
pub mod window;

use flu_finder_outbreak_models::title_case;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use chart::{
    ChartKind, ChartMark, ChartMeasure, ChartOutcome, ChartParams, ChartPoint, ChartShape,
    RenderConfig,
};
pub use choropleth::{Choropleth, ChoroplethFigure, ChoroplethRegion, ColorStop};
pub use window::{DateBound, InvalidDateBoundError, TimeWindow};

/// Scope name used for the national view.
pub const NATIONAL_SCOPE_NAME: &str = "USA";

/// The hierarchical location filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "camelCase")]
pub enum ScopeKey {
    /// Every record.
    National,
    /// Records in one state.
    State {
        /// Title-cased state name.
        state: String,
    },
    /// Records in one county of one state.
    County {
        /// Title-cased state name.
        state: String,
        /// Title-cased county name.
        county: String,
    },
}

/// Error returned for a malformed scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidScopeError {
    /// What is wrong with the scope.
    pub reason: &'static str,
}

impl std::fmt::Display for InvalidScopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid scope: {}", self.reason)
    }
}

impl std::error::Error for InvalidScopeError {}

fn non_blank(value: &str, reason: &'static str) -> Result<String, InvalidScopeError> {
    if value.trim().is_empty() {
        Err(InvalidScopeError { reason })
    } else {
        Ok(title_case(value))
    }
}

impl ScopeKey {
    /// State scope.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScopeError`] if `state` is blank.
    pub fn state(state: &str) -> Result<Self, InvalidScopeError> {
        Ok(Self::State {
            state: non_blank(state, "state is blank")?,
        })
    }

    /// County scope.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScopeError`] if either name is blank.
    pub fn county(state: &str, county: &str) -> Result<Self, InvalidScopeError> {
        Ok(Self::County {
            state: non_blank(state, "state is blank")?,
            county: non_blank(county, "county is blank")?,
        })
    }

    /// Builds a scope from optional state and county filters.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScopeError`] if a county is given without a state,
    /// or if a given name is blank.
    pub fn from_parts(state: Option<&str>, county: Option<&str>) -> Result<Self, InvalidScopeError> {
        match (state, county) {
            (None, None) => Ok(Self::National),
            (Some(state), None) => Self::state(state),
            (Some(state), Some(county)) => Self::county(state, county),
            (None, Some(_)) => Err(InvalidScopeError {
                reason: "county requires a state",
            }),
        }
    }

    /// The state this scope narrows to, if any.
    #[must_use]
    pub fn state_name(&self) -> Option<&str> {
        match self {
            Self::National => None,
            Self::State { state } | Self::County { state, .. } => Some(state),
        }
    }

    /// The county this scope narrows to, if any.
    #[must_use]
    pub fn county_name(&self) -> Option<&str> {
        match self {
            Self::County { county, .. } => Some(county),
            _ => None,
        }
    }

    /// Human-readable name: `"USA"`, `"Georgia"` or `"Elbert, Georgia"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::National => NATIONAL_SCOPE_NAME.to_string(),
            Self::State { state } => state.clone(),
            Self::County { state, county } => format!("{county}, {state}"),
        }
    }
}

/// The column a table is grouped by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    /// State name.
    State,
    /// County name.
    County,
    /// Flock category.
    FlockType,
    /// Outbreak date, keyed as `YYYY-MM-DD`.
    OutbreakDate,
}

impl Dimension {
    /// Singular column label for titles and axes.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::State => "State",
            Self::County => "County",
            Self::FlockType => "Flock Type",
            Self::OutbreakDate => "Outbreak Date",
        }
    }

    /// Plural label for "Top N" title prefixes.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::State => "States",
            Self::County => "Counties",
            Self::FlockType => "Flock Types",
            Self::OutbreakDate => "Dates",
        }
    }
}

/// The reduction applied to each group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Number of records.
    Count,
    /// Sum of flock sizes.
    SumFlockSize,
}

/// One group of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRow {
    /// Group key.
    pub key: String,
    /// Reduced value.
    pub value: u64,
    /// Share of the grand total in percent, rounded to 3 decimals.
    pub percentage: f64,
}

/// Grouped, ranked totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    /// Grouping column.
    pub dimension: Dimension,
    /// Reduction.
    pub metric: Metric,
    /// Rows sorted by descending value, possibly truncated.
    pub rows: Vec<AggregationRow>,
    /// Grand total over every group, including truncated ones.
    pub total: u64,
    /// Number of groups before truncation.
    pub group_count: usize,
}

impl AggregationResult {
    /// Whether top-N truncation dropped any group.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.group_count
    }
}

/// Outbreak totals for a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of outbreak records.
    pub outbreaks: u64,
    /// Birds affected.
    pub flock_size: u64,
}

/// [`Summary`] with grouping separators, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedSummary {
    /// e.g. `"1,234"`.
    pub outbreaks: String,
    /// e.g. `"12,108,000"`.
    pub flock_size: String,
}

impl Summary {
    /// Formats both totals with thousands separators.
    #[must_use]
    pub fn formatted(&self) -> FormattedSummary {
        FormattedSummary {
            outbreaks: format_grouped(self.outbreaks),
            flock_size: format_grouped(self.flock_size),
        }
    }
}

/// Formats an integer with comma thousands separators.
#[must_use]
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
