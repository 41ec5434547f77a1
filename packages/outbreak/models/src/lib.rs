#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Avian influenza outbreak record types.
//!
//! This crate defines the row type shared by every other flu finder crate.
//! Raw cells from the upstream CSV feed are coerced into an
//! [`OutbreakRecord`] here, so malformed values (unparsable dates,
//! non-numeric flock sizes) never reach the query layer as errors.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Column holding the outbreak confirmation date.
pub const COL_OUTBREAK_DATE: &str = "Outbreak Date";
/// Column holding the county (or county-equivalent) name.
pub const COL_COUNTY: &str = "County";
/// Column holding the full state name.
pub const COL_STATE: &str = "State";
/// Column holding the number of birds affected.
pub const COL_FLOCK_SIZE: &str = "Flock Size";
/// Column holding the flock category.
pub const COL_FLOCK_TYPE: &str = "Flock Type";
/// Optional latitude column.
pub const COL_LATITUDE: &str = "Latitude";
/// Optional longitude column.
pub const COL_LONGITUDE: &str = "Longitude";

/// Columns every outbreak table must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_OUTBREAK_DATE,
    COL_COUNTY,
    COL_STATE,
    COL_FLOCK_SIZE,
    COL_FLOCK_TYPE,
];

/// Placeholder used for missing categorical values.
pub const UNKNOWN: &str = "Unknown";

/// Date formats accepted for the outbreak date cell, tried in order.
///
/// The upstream feed uses `MM-DD-YYYY`.
const DATE_FORMATS: &[&str] = &["%m-%d-%Y", "%m/%d/%Y", "%Y-%m-%d"];

/// A single outbreak row after cell coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutbreakRecord {
    /// Confirmation date. `None` when the cell was missing or unparsable.
    pub outbreak_date: Option<NaiveDate>,
    /// County name as published.
    pub county: String,
    /// State name as published.
    pub state: String,
    /// Birds affected.
    pub flock_size: u64,
    /// Flock category (e.g. "Commercial Table Egg Layer").
    pub flock_type: String,
    /// Latitude, when the source row carries a numeric one.
    pub latitude: Option<f64>,
    /// Longitude, when the source row carries a numeric one.
    pub longitude: Option<f64>,
}

impl OutbreakRecord {
    /// Returns the `(longitude, latitude)` pair if both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.longitude?, self.latitude?))
    }
}

/// An outbreak row exactly as it appears in the CSV feed.
///
/// Every cell is optional text; [`OutbreakRecord::from`] applies the
/// documented defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawOutbreakRow {
    /// Raw date cell.
    #[serde(rename = "Outbreak Date", default)]
    pub outbreak_date: Option<String>,
    /// Raw county cell.
    #[serde(rename = "County", default)]
    pub county: Option<String>,
    /// Raw state cell.
    #[serde(rename = "State", default)]
    pub state: Option<String>,
    /// Raw flock size cell.
    #[serde(rename = "Flock Size", default)]
    pub flock_size: Option<String>,
    /// Raw flock type cell.
    #[serde(rename = "Flock Type", default)]
    pub flock_type: Option<String>,
    /// Raw latitude cell.
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<String>,
    /// Raw longitude cell.
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<String>,
}

impl From<RawOutbreakRow> for OutbreakRecord {
    fn from(row: RawOutbreakRow) -> Self {
        Self {
            outbreak_date: row.outbreak_date.as_deref().and_then(parse_outbreak_date),
            county: text_or_unknown(row.county),
            state: text_or_unknown(row.state),
            flock_size: row.flock_size.as_deref().map_or(0, parse_flock_size),
            flock_type: text_or_unknown(row.flock_type),
            latitude: row.latitude.as_deref().and_then(parse_coordinate),
            longitude: row.longitude.as_deref().and_then(parse_coordinate),
        }
    }
}

impl From<&OutbreakRecord> for RawOutbreakRow {
    fn from(record: &OutbreakRecord) -> Self {
        Self {
            outbreak_date: record
                .outbreak_date
                .map(|d| d.format(DATE_FORMATS[0]).to_string()),
            county: Some(record.county.clone()),
            state: Some(record.state.clone()),
            flock_size: Some(record.flock_size.to_string()),
            flock_type: Some(record.flock_type.clone()),
            latitude: record.latitude.map(|v| v.to_string()),
            longitude: record.longitude.map(|v| v.to_string()),
        }
    }
}

fn text_or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Parses an outbreak date cell.
///
/// Accepts `MM-DD-YYYY`, `MM/DD/YYYY`, `YYYY-MM-DD` and an ISO 8601
/// datetime (the time part is dropped).
#[must_use]
pub fn parse_outbreak_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Largest flock size accepted from a cell. Larger values are treated as
/// malformed.
pub const MAX_FLOCK_SIZE: u64 = 1_000_000_000;

/// Parses a flock size cell, returning 0 for anything that is not a
/// non-negative number up to [`MAX_FLOCK_SIZE`].
///
/// Grouping commas are ignored and fractional parts are truncated.
#[must_use]
pub fn parse_flock_size(s: &str) -> u64 {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return 0;
    }
    let value = cleaned.parse::<u64>().ok().or_else(|| {
        match cleaned.parse::<f64>() {
            // saturates, so out-of-range values land above the cap
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(value) if value.is_finite() && value >= 0.0 => Some(value.trunc() as u64),
            _ => None,
        }
    });
    value.filter(|v| *v <= MAX_FLOCK_SIZE).unwrap_or(0)
}

/// Parses a coordinate cell. Returns `None` if missing or non-numeric.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Title-cases a place name: the first letter of every alphabetic run is
/// uppercased and the rest lowercased.
///
/// `"st. croix"` becomes `"St. Croix"` and `"MATANUSKA-SUSITNA"` becomes
/// `"Matanuska-Susitna"`.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_alpha = false;
    for c in s.trim().chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

/// The full outbreak table as fetched from a record store.
///
/// Filtering produces a new table; the source table is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutbreakTable {
    records: Vec<OutbreakRecord>,
}

impl OutbreakTable {
    /// Wraps a list of records.
    #[must_use]
    pub const fn new(records: Vec<OutbreakRecord>) -> Self {
        Self { records }
    }

    /// Returns the records in table order.
    #[must_use]
    pub fn records(&self) -> &[OutbreakRecord] {
        &self.records
    }

    /// Consumes the table, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<OutbreakRecord> {
        self.records
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, OutbreakRecord> {
        self.records.iter()
    }

    /// Returns a new table holding the rows that satisfy `predicate`.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&OutbreakRecord) -> bool) -> Self {
        self.records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    /// Sum of the flock size column.
    #[must_use]
    pub fn total_flock_size(&self) -> u64 {
        self.records
            .iter()
            .fold(0, |total, r| total.saturating_add(r.flock_size))
    }

    /// Earliest and latest outbreak dates, ignoring undated rows.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.outbreak_date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Sorts rows by outbreak date ascending. Undated rows move to the end;
    /// rows sharing a date keep their relative order.
    pub fn sort_by_outbreak_date(&mut self) {
        self.records
            .sort_by_key(|r| (r.outbreak_date.is_none(), r.outbreak_date));
    }
}

impl FromIterator<OutbreakRecord> for OutbreakTable {
    fn from_iter<T: IntoIterator<Item = OutbreakRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for OutbreakTable {
    type Item = OutbreakRecord;
    type IntoIter = std::vec::IntoIter<OutbreakRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a OutbreakTable {
    type Item = &'a OutbreakRecord;
    type IntoIter = std::slice::Iter<'a, OutbreakRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl From<Vec<OutbreakRecord>> for OutbreakTable {
    fn from(records: Vec<OutbreakRecord>) -> Self {
        Self::new(records)
    }
}
