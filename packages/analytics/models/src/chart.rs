//! Chart kinds, parameters and the renderer-facing chart shape.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Message returned when the source table itself is empty.
pub const EMPTY_INPUT_MESSAGE: &str = "No data to visualize. Check your input data and try again";

/// Message returned when filtering left no rows.
pub const EMPTY_WINDOW_MESSAGE: &str = "No data to visualize. Check your time range and try again";

/// File name offered by the renderer's image export button.
pub const EXPORT_FILENAME: &str = "flufinder_chart";

/// The closed set of chart selectors.
///
/// Each kind accepts its short wire name (`hbar_sizes`) and a descriptive
/// alias (`grouped-bar-by-size`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum ChartKind {
    /// Horizontal bars of summed flock size per group.
    #[serde(rename = "hbar_sizes")]
    #[strum(to_string = "hbar_sizes", serialize = "grouped-bar-by-size")]
    BarBySize,
    /// Horizontal bars of outbreak count per group.
    #[serde(rename = "hbar_freqs")]
    #[strum(to_string = "hbar_freqs", serialize = "grouped-bar-by-frequency")]
    BarByFrequency,
    /// Horizontal bars of outbreak count per flock type.
    #[serde(rename = "hbar_types")]
    #[strum(to_string = "hbar_types", serialize = "grouped-bar-by-type")]
    BarByType,
    /// Pie of summed flock size per group.
    #[serde(rename = "pie_sizes")]
    #[strum(to_string = "pie_sizes", serialize = "pie-by-size")]
    PieBySize,
    /// Pie of outbreak count per group.
    #[serde(rename = "pie_freqs")]
    #[strum(to_string = "pie_freqs", serialize = "pie-by-frequency")]
    PieByFrequency,
    /// Pie of outbreak count per flock type.
    #[serde(rename = "pie_types")]
    #[strum(to_string = "pie_types", serialize = "pie-by-type")]
    PieByType,
    /// Vertical bars of flock size per outbreak date.
    #[serde(rename = "vbar")]
    #[strum(to_string = "vbar", serialize = "time-series-bar")]
    TimeSeries,
}

/// How a chart is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChartMark {
    /// Bars growing left to right, one per group.
    HorizontalBar,
    /// Pie slices, one per group.
    Pie,
    /// Bars growing upward, one per date.
    VerticalBar,
}

/// The quantity a grouped chart measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMeasure {
    /// Birds affected, grouped by state or county.
    FlockSize,
    /// Outbreak count, grouped by state or county.
    Frequency,
    /// Outbreak count, grouped by flock type.
    FlockType,
    /// Birds affected per outbreak date.
    History,
}

impl ChartKind {
    /// How the chart is drawn.
    #[must_use]
    pub const fn mark(self) -> ChartMark {
        match self {
            Self::BarBySize | Self::BarByFrequency | Self::BarByType => ChartMark::HorizontalBar,
            Self::PieBySize | Self::PieByFrequency | Self::PieByType => ChartMark::Pie,
            Self::TimeSeries => ChartMark::VerticalBar,
        }
    }

    /// What the chart measures.
    #[must_use]
    pub const fn measure(self) -> ChartMeasure {
        match self {
            Self::BarBySize | Self::PieBySize => ChartMeasure::FlockSize,
            Self::BarByFrequency | Self::PieByFrequency => ChartMeasure::Frequency,
            Self::BarByType | Self::PieByType => ChartMeasure::FlockType,
            Self::TimeSeries => ChartMeasure::History,
        }
    }
}

impl ChartMeasure {
    /// Leading phrase of the chart title.
    #[must_use]
    pub const fn title_prefix(self) -> &'static str {
        match self {
            Self::FlockSize => "Affected Flock Size",
            Self::Frequency => "Outbreak Frequency",
            Self::FlockType => "Affected Flock Type",
            Self::History => "Outbreak History",
        }
    }
}

/// Recognized chart options.
///
/// Every field defaults to "not set": all groups, national scope, no time
/// window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartParams {
    /// Keep only the largest `top_n` groups.
    pub top_n: Option<usize>,
    /// Narrow to one state.
    pub state: Option<String>,
    /// Narrow to one county. Requires `state`.
    pub county: Option<String>,
    /// Window start bound.
    pub start: Option<String>,
    /// Window end bound.
    pub end: Option<String>,
}

/// One bar, slice or date column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Group label or date (`YYYY-MM-DD`).
    pub label: String,
    /// Raw value: birds or outbreaks.
    pub value: u64,
    /// Share of the grand total, rounded to 3 decimals. `None` for the
    /// time series.
    pub percentage: Option<f64>,
    /// Pre-rendered hover text.
    pub hover: String,
}

/// Image export options for the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageExportOptions {
    /// File name without extension.
    pub filename: String,
}

/// Renderer configuration, keyed the way the client renderer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Whether scroll-wheel zoom is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_zoom: Option<bool>,
    /// Toolbar buttons to hide.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub mode_bar_buttons_to_remove: Vec<String>,
    /// Image export settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_image_button_options: Option<ImageExportOptions>,
    /// Whether the renderer's logo is shown.
    #[serde(rename = "displaylogo")]
    pub display_logo: bool,
}

impl RenderConfig {
    /// Configuration for bar charts: zoomable, trimmed toolbar.
    #[must_use]
    pub fn bar() -> Self {
        Self {
            scroll_zoom: Some(true),
            mode_bar_buttons_to_remove: ["autoScale", "select2d", "lasso2d"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            to_image_button_options: Some(ImageExportOptions {
                filename: EXPORT_FILENAME.to_string(),
            }),
            display_logo: false,
        }
    }

    /// Configuration for pie charts: logo hidden only.
    #[must_use]
    pub const fn pie() -> Self {
        Self {
            scroll_zoom: None,
            mode_bar_buttons_to_remove: Vec::new(),
            to_image_button_options: None,
            display_logo: false,
        }
    }
}

/// Everything the renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartShape {
    /// The requested kind.
    pub kind: ChartKind,
    /// How to draw it.
    pub mark: ChartMark,
    /// Title text.
    pub title: String,
    /// Category axis label (the grouping column).
    pub category_label: String,
    /// Value axis label.
    pub value_label: String,
    /// Data points in display order.
    pub points: Vec<ChartPoint>,
    /// Suggested height in pixels (bar charts only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Renderer configuration.
    pub config: RenderConfig,
}

/// The result of a chart request: a chart or a descriptive empty result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ChartOutcome {
    /// A drawable chart.
    Chart(ChartShape),
    /// Nothing to draw.
    Empty {
        /// Why the chart is empty.
        message: String,
    },
}

impl ChartOutcome {
    /// Whether this is the empty result.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator as _;

    #[test]
    fn parses_wire_names_and_aliases() {
        assert_eq!("hbar_sizes".parse::<ChartKind>().unwrap(), ChartKind::BarBySize);
        assert_eq!("pie-by-size".parse::<ChartKind>().unwrap(), ChartKind::PieBySize);
        assert_eq!("vbar".parse::<ChartKind>().unwrap(), ChartKind::TimeSeries);
        assert!("donut".parse::<ChartKind>().is_err());
    }

    #[test]
    fn every_kind_round_trips_through_its_wire_name() {
        for kind in ChartKind::iter() {
            assert_eq!(kind.to_string().parse::<ChartKind>().unwrap(), kind);
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
        assert_eq!(ChartKind::iter().count(), 7);
    }

    #[test]
    fn bar_config_matches_renderer_keys() {
        let json = serde_json::to_value(RenderConfig::bar()).unwrap();
        assert_eq!(json["scrollZoom"], true);
        assert_eq!(json["displaylogo"], false);
        assert_eq!(json["toImageButtonOptions"]["filename"], "flufinder_chart");
        assert_eq!(json["modeBarButtonsToRemove"][2], "lasso2d");
    }

    #[test]
    fn pie_config_only_hides_logo() {
        let json = serde_json::to_value(RenderConfig::pie()).unwrap();
        assert_eq!(json, serde_json::json!({ "displaylogo": false }));
    }

    #[test]
    fn empty_outcome_serializes_with_status() {
        let outcome = ChartOutcome::Empty {
            message: EMPTY_WINDOW_MESSAGE.to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "empty");
        assert!(outcome.is_empty());
    }
}
