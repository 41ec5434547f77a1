//! Chart shape builders.
//!
//! Each [`ChartKind`] resolves to a scope-filtered, time-filtered table, an
//! aggregation and a [`ChartShape`] the web client draws without further
//! computation.

use flu_finder_analytics_models::chart::{EMPTY_INPUT_MESSAGE, EMPTY_WINDOW_MESSAGE};
use flu_finder_analytics_models::{
    AggregationResult, ChartKind, ChartMark, ChartMeasure, ChartOutcome, ChartParams, ChartPoint,
    ChartShape, Dimension, Metric, RenderConfig, ScopeKey, TimeWindow, format_grouped,
};
use flu_finder_outbreak_models::OutbreakTable;

use crate::AnalyticsError;
use crate::aggregate::aggregate;
use crate::filter::filter_table;
use crate::summary::sum_by_date;
use crate::title::ChartTitle;

/// Minimum bar chart height in pixels.
pub const MIN_BAR_HEIGHT: u32 = 400;

/// Height added per bar.
pub const BAR_ROW_HEIGHT: u32 = 30;

/// Builds the chart `kind` over `table`.
///
/// An empty `table`, or a table emptied by the scope and window filters,
/// yields [`ChartOutcome::Empty`] with a message telling the two apart.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidScope`] if a county is given without a state
///   or a name is blank
/// * [`AnalyticsError::InvalidTimeWindow`] if a bound cannot be parsed
pub fn build_chart(
    table: &OutbreakTable,
    kind: ChartKind,
    params: &ChartParams,
) -> Result<ChartOutcome, AnalyticsError> {
    let scope = ScopeKey::from_parts(params.state.as_deref(), params.county.as_deref())?;
    let window = TimeWindow::parse(params.start.as_deref(), params.end.as_deref())?;

    if table.is_empty() {
        return Ok(empty(EMPTY_INPUT_MESSAGE));
    }

    let filtered = filter_table(table, &scope, &window);
    if filtered.is_empty() {
        log::debug!("chart {kind} for {} has no rows after filtering", scope.display_name());
        return Ok(empty(EMPTY_WINDOW_MESSAGE));
    }

    let measure = kind.measure();
    if measure == ChartMeasure::History {
        return Ok(time_series(&filtered, &scope, &window));
    }

    let dimension = match (measure, &scope) {
        (ChartMeasure::FlockType, _) => Dimension::FlockType,
        (_, ScopeKey::National) => Dimension::State,
        _ => Dimension::County,
    };
    let metric = match measure {
        ChartMeasure::FlockSize => Metric::SumFlockSize,
        _ => Metric::Count,
    };
    let top_n = params.top_n.filter(|&n| n > 0);

    let result = match aggregate(&filtered, dimension, metric, top_n) {
        Ok(result) => result,
        Err(AnalyticsError::EmptyInput) => return Ok(empty(EMPTY_WINDOW_MESSAGE)),
        Err(e) => return Err(e),
    };

    let mut title = ChartTitle::new(measure, dimension, &scope, &window);
    if let Some(n) = top_n
        && result.is_truncated()
    {
        title = title.with_top_n(n);
    }

    Ok(ChartOutcome::Chart(grouped_shape(kind, &result, &title)))
}

fn empty(message: &str) -> ChartOutcome {
    ChartOutcome::Empty {
        message: message.to_string(),
    }
}

fn grouped_shape(kind: ChartKind, result: &AggregationResult, title: &ChartTitle) -> ChartShape {
    let mark = kind.mark();
    let measure = kind.measure();
    let group = result.dimension.label();

    let points = result
        .rows
        .iter()
        .map(|row| ChartPoint {
            label: row.key.clone(),
            value: row.value,
            percentage: Some(row.percentage),
            hover: hover_text(kind, group, &row.key, row.value, row.percentage),
        })
        .collect::<Vec<_>>();

    let value_label = match (mark, measure) {
        (ChartMark::Pie, ChartMeasure::FlockSize) => "Birds",
        (ChartMark::Pie, ChartMeasure::Frequency) => "Outbreaks",
        (ChartMark::Pie, _) => "Count",
        (_, ChartMeasure::Frequency) => "Frequency of Outbreaks (%)",
        (_, ChartMeasure::FlockType) => "Flock Type Percentage",
        _ => "Percentage",
    };

    let (height, config) = match mark {
        ChartMark::Pie => (None, RenderConfig::pie()),
        ChartMark::HorizontalBar | ChartMark::VerticalBar => {
            (Some(bar_height(points.len())), RenderConfig::bar())
        }
    };

    ChartShape {
        kind,
        mark,
        title: title.to_string(),
        category_label: group.to_string(),
        value_label: value_label.to_string(),
        points,
        height,
        config,
    }
}

fn hover_text(kind: ChartKind, group: &str, label: &str, value: u64, percentage: f64) -> String {
    let value = format_grouped(value);
    match kind {
        ChartKind::BarBySize => format!("Birds: {value}<br>Percentage: {percentage:.2}%"),
        ChartKind::BarByFrequency => format!("Outbreaks: {value}<br>Frequency: {percentage:.2}%"),
        ChartKind::BarByType => format!("Count: {value}<br>Percentage: {percentage:.2}%"),
        ChartKind::PieBySize => {
            format!("{group}: {label}<br>Birds: {value}<br>Percentage: {percentage:.2}%")
        }
        ChartKind::PieByFrequency => {
            format!("{label}<br>Outbreaks: {value}<br>Frequency: {percentage:.2}%")
        }
        ChartKind::PieByType => format!("{label}<br>Count: {value}<br>Percentage: {percentage:.2}%"),
        ChartKind::TimeSeries => format!("Date: {label}<br>Size: {value}"),
    }
}

fn time_series(table: &OutbreakTable, scope: &ScopeKey, window: &TimeWindow) -> ChartOutcome {
    let sums = sum_by_date(table);
    if sums.is_empty() {
        return empty(EMPTY_WINDOW_MESSAGE);
    }

    let points = sums
        .into_iter()
        .map(|(date, size)| ChartPoint {
            label: date.format("%Y-%m-%d").to_string(),
            value: size,
            percentage: None,
            hover: format!("Date: {}<br>Size: {}", date.format("%m/%d/%Y"), format_grouped(size)),
        })
        .collect();

    let title = ChartTitle::new(ChartMeasure::History, Dimension::OutbreakDate, scope, window);

    ChartOutcome::Chart(ChartShape {
        kind: ChartKind::TimeSeries,
        mark: ChartMark::VerticalBar,
        title: title.to_string(),
        category_label: Dimension::OutbreakDate.label().to_string(),
        value_label: "Outbreak Size".to_string(),
        points,
        height: None,
        config: RenderConfig::bar(),
    })
}

/// `max(400, 30 * rows)` pixels.
#[must_use]
pub fn bar_height(rows: usize) -> u32 {
    u32::try_from(rows)
        .unwrap_or(u32::MAX)
        .saturating_mul(BAR_ROW_HEIGHT)
        .max(MIN_BAR_HEIGHT)
}
