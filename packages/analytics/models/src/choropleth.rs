//! Choropleth figure types.

use flu_finder_geography_models::{GeoAggregateRow, ViewBounds};
use serde::{Deserialize, Serialize};

/// White for zero, then blues darkening to navy at the global maximum.
pub const COLOR_SCALE: &[(f64, &str)] = &[
    (0.0, "#ffffff"),
    (0.001, "#4a90c2"),
    (0.2, "#5a9bd4"),
    (0.4, "#3a7bbf"),
    (0.6, "#2b6ca3"),
    (0.8, "#1f4e79"),
    (1.0, "#0b2e59"),
];

/// A `[position, color]` stop, serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop(pub f64, pub String);

/// Returns [`COLOR_SCALE`] as serializable stops.
#[must_use]
pub fn color_scale() -> Vec<ColorStop> {
    COLOR_SCALE
        .iter()
        .map(|(position, color)| ColorStop(*position, (*color).to_string()))
        .collect()
}

/// One shaded county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethRegion {
    /// Five-digit county FIPS code, the renderer's location key.
    pub fips: String,
    /// State name.
    pub state: String,
    /// County name.
    pub county: String,
    /// Birds affected.
    pub flock_size: u64,
    /// Whether any outbreak matched this county.
    pub outbreak_exists: bool,
}

impl From<&GeoAggregateRow> for ChoroplethRegion {
    fn from(row: &GeoAggregateRow) -> Self {
        Self {
            fips: row.fips.clone(),
            state: row.state.clone(),
            county: row.county.clone(),
            flock_size: row.flock_size,
            outbreak_exists: row.outbreak_exists,
        }
    }
}

/// Data and color domain for a county choropleth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethFigure {
    /// Regions to shade.
    pub regions: Vec<ChoroplethRegion>,
    /// Color stops over the normalized value.
    pub color_scale: Vec<ColorStop>,
    /// Value domain `[0, global_max]`, taken from the national view so
    /// drill-down views share its colors.
    pub range: [u64; 2],
    /// State whose outline the renderer should highlight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_state: Option<String>,
    /// County the renderer should highlight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_county: Option<String>,
    /// Outbreak records that could not be placed on a county.
    pub unmatched_records: u64,
}

/// A choropleth figure plus the zoom target for narrowed views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choropleth {
    /// The figure data.
    pub figure: ChoroplethFigure,
    /// Zoom bounds, present only for state or county scopes.
    pub bounds: Option<ViewBounds>,
}
