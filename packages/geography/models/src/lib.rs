#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County boundary and map view types.
//!
//! Outbreak rows name their location by free-text state and county, while
//! boundary files key regions by five-digit county FIPS code. The types here
//! describe both sides of that join and its result.

pub mod fips;

use serde::{Deserialize, Serialize};

/// A county-equivalent region from the boundary reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryRegion {
    /// Five-digit zero-padded county FIPS code (e.g. "13105").
    pub fips: String,
    /// Full state name (e.g. "Georgia").
    pub state: String,
    /// Title-cased county name without a " County" suffix.
    pub county: String,
}

/// Outbreak totals for one boundary region.
///
/// Every region in the reference gets a row, including regions with no
/// matched outbreaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoAggregateRow {
    /// Five-digit zero-padded county FIPS code.
    pub fips: String,
    /// Full state name.
    pub state: String,
    /// County name as spelled in the boundary reference.
    pub county: String,
    /// Birds affected across all matched outbreaks.
    pub flock_size: u64,
    /// Number of matched outbreak records.
    pub outbreak_count: u64,
    /// Whether at least one outbreak matched this region.
    pub outbreak_exists: bool,
}

/// An outbreak location that matched no boundary region, even after
/// patching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedLocation {
    /// Normalized state name.
    pub state: String,
    /// Normalized (and patched) county name.
    pub county: String,
    /// Number of outbreak records at this location.
    pub records: u64,
    /// Birds affected across those records.
    pub flock_size: u64,
}

/// Result of joining outbreak records onto the boundary reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoJoin {
    /// One row per distinct valid FIPS code, in reference order.
    pub rows: Vec<GeoAggregateRow>,
    /// Outbreak locations without a boundary match.
    pub unmatched: Vec<UnmatchedLocation>,
}

impl GeoJoin {
    /// Largest per-region flock size, or 0 when no region has outbreaks.
    #[must_use]
    pub fn max_flock_size(&self) -> u64 {
        self.rows.iter().map(|r| r.flock_size).max().unwrap_or(0)
    }

    /// Total number of outbreak records that could not be placed.
    #[must_use]
    pub fn unmatched_records(&self) -> u64 {
        self.unmatched.iter().map(|u| u.records).sum()
    }

    /// Rows belonging to one state.
    #[must_use]
    pub fn rows_in_state(&self, state: &str) -> Vec<&GeoAggregateRow> {
        self.rows.iter().filter(|r| r.state == state).collect()
    }
}

/// A county spelling correction applied to outbreak rows before the join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyNamePatch {
    /// County name as it appears in the outbreak feed (after title-casing).
    pub from: String,
    /// County name as it appears in the boundary reference.
    pub to: String,
    /// Restricts the patch to one state. `None` applies it everywhere.
    #[serde(default)]
    pub state: Option<String>,
}

/// Longitude/latitude extent of a map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl MapBounds {
    /// East-west extent in degrees.
    #[must_use]
    pub fn lon_range(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// North-south extent in degrees.
    #[must_use]
    pub fn lat_range(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Center point of a map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
}

/// Zoom target for a state-level choropleth view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    /// Padded extent of the state outline.
    pub bounds: MapBounds,
    /// Mean of the outline's exterior ring vertices.
    pub center: MapCenter,
    /// Projection scale hint for the renderer.
    pub projection_scale: f64,
}
