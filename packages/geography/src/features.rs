//! `GeoJSON` feature builders for the map endpoints.

use std::collections::BTreeMap;
use std::path::Path;

use flu_finder_geography_models::{GeoJoin, fips};
use flu_finder_outbreak_models::OutbreakTable;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};

use crate::GeoError;

/// Builds one point feature per outbreak record that has numeric
/// coordinates. Records without coordinates are skipped.
#[must_use]
pub fn map_points(table: &OutbreakTable) -> FeatureCollection {
    let features: Vec<Feature> = table
        .iter()
        .filter_map(|record| {
            let (lon, lat) = record.coordinates()?;
            let point = geo::Point::new(lon, lat);

            let mut properties = JsonObject::new();
            properties.insert("state".to_string(), JsonValue::from(record.state.clone()));
            properties.insert("county".to_string(), JsonValue::from(record.county.clone()));
            properties.insert("flockSize".to_string(), JsonValue::from(record.flock_size));
            properties.insert(
                "flockType".to_string(),
                JsonValue::from(record.flock_type.clone()),
            );
            properties.insert(
                "outbreakDate".to_string(),
                record
                    .outbreak_date
                    .map_or(JsonValue::Null, |d| JsonValue::from(d.to_string())),
            );

            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&point))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();

    let skipped = table.len() - features.len();
    if skipped > 0 {
        log::debug!("Skipped {skipped} record(s) without coordinates");
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// County boundary features keyed by FIPS feature id.
#[derive(Debug, Clone)]
pub struct CountyFeatures {
    collection: FeatureCollection,
}

impl Default for CountyFeatures {
    fn default() -> Self {
        Self {
            collection: FeatureCollection {
                bbox: None,
                features: Vec::new(),
                foreign_members: None,
            },
        }
    }
}

impl CountyFeatures {
    /// Parses a county `GeoJSON` feature collection.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::GeoJson`] if the document is not a valid
    /// feature collection.
    pub fn parse(geojson_str: &str) -> Result<Self, GeoError> {
        let geojson: GeoJson = geojson_str.parse()?;
        Ok(Self {
            collection: FeatureCollection::try_from(geojson)?,
        })
    }

    /// Number of county features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }

    /// Returns a copy of the features with `outbreak_count`, `flock_size`
    /// and `outbreak_exists` properties taken from `join`.
    ///
    /// Features whose id matches no joined region get zero values.
    #[must_use]
    pub fn annotate(&self, join: &GeoJoin) -> FeatureCollection {
        let by_fips: BTreeMap<&str, (u64, u64)> = join
            .rows
            .iter()
            .map(|r| (r.fips.as_str(), (r.outbreak_count, r.flock_size)))
            .collect();

        let features = self
            .collection
            .features
            .iter()
            .cloned()
            .map(|mut feature| {
                let (outbreak_count, flock_size) = feature_fips(&feature)
                    .and_then(|code| by_fips.get(code.as_str()).copied())
                    .unwrap_or_default();
                feature.set_property("outbreak_count", outbreak_count);
                feature.set_property("flock_size", flock_size);
                feature.set_property("outbreak_exists", outbreak_count > 0);
                feature
            })
            .collect();

        FeatureCollection {
            bbox: self.collection.bbox.clone(),
            features,
            foreign_members: None,
        }
    }
}

/// Reads a feature's FIPS code from its id, which boundary files publish
/// as either a string or a number.
fn feature_fips(feature: &Feature) -> Option<String> {
    match feature.id.as_ref()? {
        Id::String(s) => Some(fips::pad_fips(s)),
        Id::Number(n) => Some(fips::pad_fips(&n.to_string())),
    }
}

/// Loads county boundary features from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`GeoError::Io`] if the file cannot be read, or
/// [`GeoError::GeoJson`] if it cannot be parsed.
pub fn load_county_features(path: &Path) -> Result<CountyFeatures, GeoError> {
    let contents = std::fs::read_to_string(path)?;
    let features = CountyFeatures::parse(&contents)?;
    log::info!(
        "Loaded {} county features from {}",
        features.len(),
        path.display()
    );
    Ok(features)
}
