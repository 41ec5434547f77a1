//! Grouping, ranking and percentage computation.

use std::collections::HashMap;

use flu_finder_analytics_models::{AggregationResult, AggregationRow, Dimension, Metric};
use flu_finder_outbreak_models::{OutbreakRecord, OutbreakTable, UNKNOWN, title_case};

use crate::AnalyticsError;

/// Groups `table` by `dimension`, reduces each group with `metric`, and
/// ranks the groups by descending value.
///
/// Percentages are computed against the grand total before `top_n`
/// truncation. Groups with equal values keep the order in which they were
/// first seen.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyInput`] if `table` has no rows.
pub fn aggregate(
    table: &OutbreakTable,
    dimension: Dimension,
    metric: Metric,
    top_n: Option<usize>,
) -> Result<AggregationResult, AnalyticsError> {
    if table.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, u64)> = Vec::new();

    for record in table {
        let key = group_key(record, dimension);
        let amount = match metric {
            Metric::Count => 1,
            Metric::SumFlockSize => record.flock_size,
        };
        if let Some(&i) = index.get(&key) {
            groups[i].1 = groups[i].1.saturating_add(amount);
        } else {
            index.insert(key.clone(), groups.len());
            groups.push((key, amount));
        }
    }

    let total = groups
        .iter()
        .fold(0_u64, |total, (_, value)| total.saturating_add(*value));
    let group_count = groups.len();

    // stable: ties keep first-seen order
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    let mut rows: Vec<AggregationRow> = groups
        .into_iter()
        .map(|(key, value)| AggregationRow {
            key,
            value,
            percentage: percentage(value, total),
        })
        .collect();

    if let Some(n) = top_n {
        rows.truncate(n);
    }

    Ok(AggregationResult {
        dimension,
        metric,
        rows,
        total,
        group_count,
    })
}

fn group_key(record: &OutbreakRecord, dimension: Dimension) -> String {
    match dimension {
        Dimension::State => title_case(&record.state),
        Dimension::County => title_case(&record.county),
        Dimension::FlockType => record.flock_type.clone(),
        Dimension::OutbreakDate => record
            .outbreak_date
            .map_or_else(|| UNKNOWN.to_string(), |d| d.format("%Y-%m-%d").to_string()),
    }
}

/// `value / total * 100` rounded to 3 decimals, or 0 when `total` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(value: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round3(value as f64 / total as f64 * 100.0)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(state: &str, county: &str, flock_size: u64, date: Option<(i32, u32, u32)>) -> OutbreakRecord {
        OutbreakRecord {
            outbreak_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            county: county.to_string(),
            state: state.to_string(),
            flock_size,
            flock_type: "WOAH Poultry".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn georgia_texas() -> OutbreakTable {
        OutbreakTable::new(vec![
            record("Georgia", "Elbert", 100, Some((2024, 1, 1))),
            record("Georgia", "Elbert", 50, Some((2024, 1, 2))),
            record("Texas", "Parmer", 200, Some((2024, 1, 1))),
        ])
    }

    #[test]
    fn sums_and_ranks_states() {
        let result =
            aggregate(&georgia_texas(), Dimension::State, Metric::SumFlockSize, None).unwrap();
        let rows: Vec<(&str, u64, f64)> = result
            .rows
            .iter()
            .map(|r| (r.key.as_str(), r.value, r.percentage))
            .collect();
        assert_eq!(rows, [("Texas", 200, 57.143), ("Georgia", 150, 42.857)]);
        assert_eq!(result.total, 350);
        assert!(!result.is_truncated());
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let table = OutbreakTable::new(vec![
            record("Georgia", "A", 1, None),
            record("Texas", "B", 1, None),
            record("Iowa", "C", 1, None),
        ]);
        let result = aggregate(&table, Dimension::State, Metric::Count, None).unwrap();
        let sum: f64 = result.rows.iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() < 0.01, "sum was {sum}");
    }

    #[test]
    fn zero_total_gives_zero_percentages() {
        let table = OutbreakTable::new(vec![
            record("Georgia", "A", 0, None),
            record("Texas", "B", 0, None),
        ]);
        let result = aggregate(&table, Dimension::State, Metric::SumFlockSize, None).unwrap();
        assert!(result.rows.iter().all(|r| r.percentage == 0.0));
    }

    #[test]
    fn oversized_flock_size_cell_does_not_abort_aggregation() {
        let malformed = OutbreakRecord::from(flu_finder_outbreak_models::RawOutbreakRow {
            state: Some("Georgia".to_string()),
            county: Some("Elbert".to_string()),
            flock_size: Some("1e30".to_string()),
            ..Default::default()
        });
        let table = OutbreakTable::new(vec![malformed, record("Texas", "Parmer", 100, None)]);
        let result = aggregate(&table, Dimension::State, Metric::SumFlockSize, None).unwrap();
        assert_eq!(result.total, 100);
        assert_eq!(result.rows[0].key, "Texas");
        assert_eq!(result.rows[1].value, 0);
    }

    #[test]
    fn group_sums_saturate() {
        let table = OutbreakTable::new(vec![
            record("Georgia", "Elbert", u64::MAX, None),
            record("Georgia", "Elbert", 10, None),
            record("Texas", "Parmer", 10, None),
        ]);
        let result = aggregate(&table, Dimension::State, Metric::SumFlockSize, None).unwrap();
        assert_eq!(result.rows[0].value, u64::MAX);
        assert_eq!(result.total, u64::MAX);
    }

    #[test]
    fn top_n_keeps_the_largest_groups() {
        let table = OutbreakTable::new(vec![
            record("Iowa", "A", 10, None),
            record("Texas", "B", 30, None),
            record("Georgia", "C", 20, None),
            record("Ohio", "D", 5, None),
        ]);
        let result = aggregate(&table, Dimension::State, Metric::SumFlockSize, Some(2)).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.group_count, 4);
        assert!(result.is_truncated());

        let smallest_kept = result.rows.iter().map(|r| r.value).min().unwrap();
        assert!(smallest_kept >= 10);
        // percentages use the untruncated total
        assert!((result.rows[0].percentage - 46.154).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let table = OutbreakTable::new(vec![
            record("Ohio", "A", 10, None),
            record("Iowa", "B", 10, None),
            record("Utah", "C", 10, None),
        ]);
        let result = aggregate(&table, Dimension::State, Metric::SumFlockSize, Some(2)).unwrap();
        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["Ohio", "Iowa"]);
    }

    #[test]
    fn missing_dates_group_as_unknown() {
        let table = OutbreakTable::new(vec![
            record("Ohio", "A", 10, None),
            record("Ohio", "A", 10, Some((2023, 2, 1))),
        ]);
        let result = aggregate(&table, Dimension::OutbreakDate, Metric::Count, None).unwrap();
        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["Unknown", "2023-02-01"]);
    }

    #[test]
    fn empty_table_is_empty_input() {
        let err = aggregate(&OutbreakTable::default(), Dimension::State, Metric::Count, None)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyInput));
    }
}
