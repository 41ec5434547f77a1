//! Chart titles.

use std::fmt;

use flu_finder_analytics_models::{ChartMeasure, Dimension, ScopeKey, TimeWindow};

/// A chart title, rendered through [`fmt::Display`].
///
/// Size and frequency charts read
/// `[Top N <plural> - ]<prefix> by <group> - <scope>`. Flock type charts
/// drop the `by` clause, and the time series also drops the top-N prefix.
/// All gain a ` (<start> to <end>)` suffix when a window bound was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTitle {
    /// What is measured.
    pub measure: ChartMeasure,
    /// Grouping column, named only by size and frequency titles.
    pub dimension: Dimension,
    /// Scope display name, e.g. `"USA"` or `"Elbert, Georgia"`.
    pub scope: String,
    /// `Some(n)` when rows were truncated to the top `n`.
    pub top_n: Option<usize>,
    /// Start and end labels, when a bound was given.
    pub window: Option<(String, String)>,
}

impl ChartTitle {
    /// Builds a title for `scope` and `window`.
    #[must_use]
    pub fn new(
        measure: ChartMeasure,
        dimension: Dimension,
        scope: &ScopeKey,
        window: &TimeWindow,
    ) -> Self {
        Self {
            measure,
            dimension,
            scope: scope.display_name(),
            top_n: None,
            window: (!window.is_unbounded())
                .then(|| (window.start_label().to_string(), window.end_label().to_string())),
        }
    }

    /// Marks the title as truncated to `n` rows.
    #[must_use]
    pub const fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }
}

impl fmt::Display for ChartTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.top_n
            && self.measure != ChartMeasure::History
        {
            write!(f, "Top {n} {} - ", self.dimension.plural())?;
        }
        match self.measure {
            ChartMeasure::FlockSize | ChartMeasure::Frequency => write!(
                f,
                "{} by {} - {}",
                self.measure.title_prefix(),
                self.dimension.label(),
                self.scope
            )?,
            ChartMeasure::FlockType | ChartMeasure::History => {
                write!(f, "{} - {}", self.measure.title_prefix(), self.scope)?;
            }
        }
        if let Some((start, end)) = &self.window {
            write!(f, " ({start} to {end})")?;
        }
        Ok(())
    }
}

/// Recovers the start and end labels from a rendered title.
///
/// Returns `None` if the title has no window suffix.
#[must_use]
pub fn parse_title_window(title: &str) -> Option<(String, String)> {
    let inner = title.strip_suffix(')')?;
    let open = inner.rfind(" (")?;
    let (start, end) = inner[open + 2..].split_once(" to ")?;
    Some((start.to_string(), end.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn georgia() -> ScopeKey {
        ScopeKey::state("Georgia").unwrap()
    }

    #[test]
    fn national_title_without_window() {
        let title = ChartTitle::new(
            ChartMeasure::FlockSize,
            Dimension::State,
            &ScopeKey::National,
            &TimeWindow::unbounded(),
        );
        assert_eq!(title.to_string(), "Affected Flock Size by State - USA");
    }

    #[test]
    fn top_n_prefix_uses_plural() {
        let title = ChartTitle::new(
            ChartMeasure::Frequency,
            Dimension::County,
            &georgia(),
            &TimeWindow::unbounded(),
        )
        .with_top_n(5);
        assert_eq!(
            title.to_string(),
            "Top 5 Counties - Outbreak Frequency by County - Georgia"
        );
    }

    #[test]
    fn missing_bounds_use_defaults() {
        let window = TimeWindow::parse(None, Some("2024")).unwrap();
        let title = ChartTitle::new(ChartMeasure::FlockSize, Dimension::County, &georgia(), &window);
        assert_eq!(
            title.to_string(),
            "Affected Flock Size by County - Georgia (2022 to 2024)"
        );

        let window = TimeWindow::parse(Some("2023-06"), None).unwrap();
        let title = ChartTitle::new(ChartMeasure::FlockSize, Dimension::County, &georgia(), &window);
        assert!(title.to_string().ends_with("(2023-06 to Present)"));
    }

    #[test]
    fn history_title_has_no_grouping() {
        let scope = ScopeKey::county("Georgia", "Elbert").unwrap();
        let title = ChartTitle::new(
            ChartMeasure::History,
            Dimension::OutbreakDate,
            &scope,
            &TimeWindow::unbounded(),
        );
        assert_eq!(title.to_string(), "Outbreak History - Elbert, Georgia");
    }

    #[test]
    fn flock_type_title_has_no_by_clause() {
        let title = ChartTitle::new(
            ChartMeasure::FlockType,
            Dimension::FlockType,
            &georgia(),
            &TimeWindow::unbounded(),
        )
        .with_top_n(3);
        assert_eq!(
            title.to_string(),
            "Top 3 Flock Types - Affected Flock Type - Georgia"
        );
    }

    #[test]
    fn window_labels_round_trip() {
        let window = TimeWindow::parse(Some("01/15/2023"), Some("2024-03")).unwrap();
        let title = ChartTitle::new(
            ChartMeasure::FlockType,
            Dimension::FlockType,
            &ScopeKey::National,
            &window,
        )
        .with_top_n(3)
        .to_string();
        assert_eq!(
            parse_title_window(&title),
            Some(("01/15/2023".to_string(), "2024-03".to_string()))
        );
    }

    #[test]
    fn title_without_window_parses_to_none() {
        assert_eq!(parse_title_window("Outbreak History - USA"), None);
    }
}
