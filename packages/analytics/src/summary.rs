//! Scope totals and the date-ordered views behind the latest-outbreak list
//! and the time series.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use flu_finder_analytics_models::{ScopeKey, Summary};
use flu_finder_outbreak_models::{OutbreakRecord, OutbreakTable, title_case};

/// A scope's totals together with the records they were computed from.
#[derive(Debug, Clone)]
pub struct ScopedSummary {
    /// The validated scope.
    pub scope: ScopeKey,
    /// Outbreak count and flock size total.
    pub summary: Summary,
    /// Records in the scope.
    pub records: OutbreakTable,
}

impl ScopedSummary {
    /// Summarizes `records`, which must already be filtered to `scope`.
    #[must_use]
    pub fn new(scope: ScopeKey, records: OutbreakTable) -> Self {
        Self {
            summary: summarize(&records),
            scope,
            records,
        }
    }
}

/// Outbreak count and flock size total.
#[must_use]
pub fn summarize(table: &OutbreakTable) -> Summary {
    Summary {
        outbreaks: table.len() as u64,
        flock_size: table.total_flock_size(),
    }
}

/// Flock size summed per outbreak date, ascending. Undated rows are
/// skipped.
#[must_use]
pub fn sum_by_date(table: &OutbreakTable) -> Vec<(NaiveDate, u64)> {
    let mut sums: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in table {
        if let Some(date) = record.outbreak_date {
            let sum = sums.entry(date).or_default();
            *sum = sum.saturating_add(record.flock_size);
        }
    }
    sums.into_iter().collect()
}

/// The newest outbreak in every county, newest first.
///
/// Counties are distinguished by title-cased state and county. Undated
/// records only represent a county that has no dated record, and sort
/// last.
#[must_use]
pub fn latest_by_county(table: &OutbreakTable) -> Vec<OutbreakRecord> {
    let mut sorted = table.clone();
    sorted.sort_by_outbreak_date();

    let mut latest: HashMap<(String, String), OutbreakRecord> = HashMap::new();
    let mut order: Vec<(String, String)> = Vec::new();

    // walk newest first; the first record seen per county wins
    let dated = sorted.iter().filter(|r| r.outbreak_date.is_some()).rev();
    let undated = sorted.iter().filter(|r| r.outbreak_date.is_none());
    for record in dated.chain(undated) {
        let key = (title_case(&record.state), title_case(&record.county));
        if !latest.contains_key(&key) {
            order.push(key.clone());
            latest.insert(key, record.clone());
        }
    }

    order
        .into_iter()
        .filter_map(|key| latest.remove(&key))
        .collect()
}

/// Records dated within `weeks` weeks after `start`, both ends inclusive.
#[must_use]
pub fn recurrences(table: &OutbreakTable, start: NaiveDate, weeks: u32) -> OutbreakTable {
    let end = start + Duration::weeks(i64::from(weeks));
    table.filter(|r| r.outbreak_date.is_some_and(|d| d >= start && d <= end))
}
