//! State outline polygons and zoom bounds for state-level map views.

use std::collections::BTreeMap;
use std::path::Path;

use flu_finder_geography_models::{MapBounds, MapCenter, ViewBounds};
use geo::{BoundingRect, Coord, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};

use crate::GeoError;

/// Property holding the state name in the outline file.
const NAME_PROPERTY: &str = "NAME";

/// Parsed state outline geometry.
#[derive(Debug, Clone)]
struct StateOutline {
    name: String,
    polygons: MultiPolygon<f64>,
}

impl StateOutline {
    /// Vertices of every exterior ring, closing vertices included.
    fn exterior_coords(&self) -> impl Iterator<Item = &Coord<f64>> {
        self.polygons.iter().flat_map(|p| p.exterior().coords())
    }
}

/// State outlines keyed by upper-cased state name.
#[derive(Debug, Clone, Default)]
pub struct StateOutlines {
    states: BTreeMap<String, StateOutline>,
}

impl StateOutlines {
    /// Parses a `GeoJSON` feature collection of state outlines.
    ///
    /// Features without a `NAME` property or without polygon geometry are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::GeoJson`] if the document is not a valid
    /// feature collection.
    pub fn parse(geojson_str: &str) -> Result<Self, GeoError> {
        let geojson: GeoJson = geojson_str.parse()?;
        let collection = FeatureCollection::try_from(geojson)?;

        let mut states = BTreeMap::new();
        for feature in collection.features {
            let Some(name) = feature
                .property(NAME_PROPERTY)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
            else {
                continue;
            };

            let Some(geometry) = feature.geometry else {
                continue;
            };

            let polygons = match geo::Geometry::<f64>::try_from(geometry)? {
                geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
                geo::Geometry::MultiPolygon(mp) => mp,
                _ => {
                    log::warn!("State outline for {name} is not a polygon");
                    continue;
                }
            };

            states.insert(name.to_uppercase(), StateOutline { name, polygons });
        }

        Ok(Self { states })
    }

    /// Number of states with an outline.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no outlines were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Computes the zoom target for `state` (matched case-insensitively).
    ///
    /// Returns `None` when the state has no outline.
    #[must_use]
    pub fn view_for_state(&self, state: &str) -> Option<ViewBounds> {
        let outline = self.states.get(&state.trim().to_uppercase())?;

        let mut count = 0_u32;
        let (mut sum_lon, mut sum_lat) = (0.0, 0.0);
        for coord in outline.exterior_coords() {
            sum_lon += coord.x;
            sum_lat += coord.y;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let center = MapCenter {
            lon: sum_lon / f64::from(count),
            lat: sum_lat / f64::from(count),
        };

        let rect = outline.polygons.bounding_rect()?;
        let extent = MapBounds {
            min_lon: rect.min().x,
            max_lon: rect.max().x,
            min_lat: rect.min().y,
            max_lat: rect.max().y,
        };

        let (padding, projection_scale) = padding_for(&outline.name, &extent);
        let lon_padding = extent.lon_range() * padding;
        let lat_padding = extent.lat_range() * padding;

        Some(ViewBounds {
            bounds: MapBounds {
                min_lon: extent.min_lon - lon_padding,
                max_lon: extent.max_lon + lon_padding,
                min_lat: extent.min_lat - lat_padding,
                max_lat: extent.max_lat + lat_padding,
            },
            center,
            projection_scale,
        })
    }
}

/// Padding factor and projection scale for a state view.
///
/// Alaska needs a wider margin and a smaller scale to fit the Aleutians;
/// Louisiana's coastline reads better slightly zoomed in. Wide states get
/// less padding so they fill the horizontal space.
fn padding_for(name: &str, extent: &MapBounds) -> (f64, f64) {
    if name.eq_ignore_ascii_case("Alaska") {
        (0.3, 0.8)
    } else if name.eq_ignore_ascii_case("Louisiana") {
        (0.15, 1.2)
    } else if extent.lon_range() > extent.lat_range() * 1.5 {
        (0.1, 1.0)
    } else {
        (0.2, 1.0)
    }
}

/// Loads state outlines from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`GeoError::Io`] if the file cannot be read, or
/// [`GeoError::GeoJson`] if it cannot be parsed.
pub fn load_state_outlines(path: &Path) -> Result<StateOutlines, GeoError> {
    let contents = std::fs::read_to_string(path)?;
    let outlines = StateOutlines::parse(&contents)?;
    log::info!(
        "Loaded {} state outlines from {}",
        outlines.len(),
        path.display()
    );
    Ok(outlines)
}
