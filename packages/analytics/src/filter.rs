//! Scope and time window filtering.

use flu_finder_analytics_models::{ScopeKey, TimeWindow};
use flu_finder_outbreak_models::{OutbreakRecord, OutbreakTable, title_case};

/// Whether `record` falls inside `scope`.
///
/// Names are compared after title-casing, so `"GEORGIA"` in the feed
/// matches a `Georgia` scope.
#[must_use]
pub fn matches_scope(record: &OutbreakRecord, scope: &ScopeKey) -> bool {
    match scope {
        ScopeKey::National => true,
        ScopeKey::State { state } => title_case(&record.state) == *state,
        ScopeKey::County { state, county } => {
            title_case(&record.state) == *state && title_case(&record.county) == *county
        }
    }
}

/// Returns the records inside `scope`. A name that matches nothing yields
/// an empty table.
#[must_use]
pub fn filter_by_scope(table: &OutbreakTable, scope: &ScopeKey) -> OutbreakTable {
    match scope {
        ScopeKey::National => table.clone(),
        _ => table.filter(|r| matches_scope(r, scope)),
    }
}

/// Returns the records inside `window`.
///
/// An unbounded window returns the table unchanged, undated rows included.
/// Otherwise undated rows never match.
#[must_use]
pub fn filter_by_time(table: &OutbreakTable, window: &TimeWindow) -> OutbreakTable {
    if window.is_unbounded() {
        return table.clone();
    }
    table.filter(|r| r.outbreak_date.is_some_and(|d| window.contains(d)))
}

/// Applies both filters.
#[must_use]
pub fn filter_table(table: &OutbreakTable, scope: &ScopeKey, window: &TimeWindow) -> OutbreakTable {
    let scoped = filter_by_scope(table, scope);
    filter_by_time(&scoped, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: Option<(i32, u32, u32)>, state: &str, county: &str) -> OutbreakRecord {
        OutbreakRecord {
            outbreak_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            county: county.to_string(),
            state: state.to_string(),
            flock_size: 100,
            flock_type: "WOAH Poultry".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn table() -> OutbreakTable {
        OutbreakTable::new(vec![
            record(Some((2022, 3, 1)), "Georgia", "Elbert"),
            record(Some((2024, 6, 15)), "GEORGIA", "elbert"),
            record(None, "Georgia", "Jackson"),
            record(Some((2025, 1, 19)), "Texas", "Parmer"),
            record(Some((2019, 5, 5)), "Iowa", "Sioux"),
        ])
    }

    #[test]
    fn unbounded_window_is_identity() {
        let table = table();
        assert_eq!(filter_by_time(&table, &TimeWindow::unbounded()), table);
    }

    #[test]
    fn bounded_window_drops_undated_rows() {
        let window = TimeWindow::parse(Some("2024"), None).unwrap();
        let filtered = filter_by_time(&table(), &window);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.outbreak_date.is_some()));
    }

    #[test]
    fn end_only_window_uses_default_start() {
        let window = TimeWindow::parse(None, Some("2022")).unwrap();
        let filtered = filter_by_time(&table(), &window);
        // 2019 predates the default start
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.records()[0].state, "Georgia");
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = TimeWindow::parse(Some("06/15/2024"), Some("2025-01-19")).unwrap();
        assert_eq!(filter_by_time(&table(), &window).len(), 2);
    }

    #[test]
    fn state_scope_is_case_insensitive() {
        let scope = ScopeKey::state("georgia").unwrap();
        assert_eq!(filter_by_scope(&table(), &scope).len(), 3);
    }

    #[test]
    fn county_scope_needs_both_names() {
        let scope = ScopeKey::county("Georgia", "Elbert").unwrap();
        assert_eq!(filter_by_scope(&table(), &scope).len(), 2);

        let elsewhere = ScopeKey::county("Texas", "Elbert").unwrap();
        assert!(filter_by_scope(&table(), &elsewhere).is_empty());
    }

    #[test]
    fn unknown_state_yields_empty_table() {
        let scope = ScopeKey::state("Atlantis").unwrap();
        assert!(filter_by_scope(&table(), &scope).is_empty());
    }
}
