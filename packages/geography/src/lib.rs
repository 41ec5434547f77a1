#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County boundary reference data and the outbreak geography join.
//!
//! Loads the FIPS lookup table, the county name patch table, state outline
//! polygons and county boundary features from disk, and joins outbreak
//! records onto county regions for choropleth rendering.

pub mod boundaries;
pub mod features;
pub mod join;
pub mod patches;
pub mod states;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use boundaries::{BoundaryReference, load_boundaries};
pub use features::{CountyFeatures, load_county_features, map_points};
pub use join::join_with_geography;
pub use patches::NamePatchTable;
pub use states::{StateOutlines, load_state_outlines};

/// Errors that can occur while loading geography reference data.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing or conversion failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// File locations of the geography reference data.
#[derive(Debug, Clone)]
pub struct GeographyPaths {
    /// FIPS lookup CSV (required).
    pub fips_lookup: PathBuf,
    /// State outline `GeoJSON`.
    pub state_outlines: PathBuf,
    /// County boundary `GeoJSON`.
    pub county_features: PathBuf,
    /// Patch table override. `None` uses the embedded table.
    pub patches: Option<PathBuf>,
}

/// All static reference data needed by the map operations.
#[derive(Debug, Clone, Default)]
pub struct GeographyReference {
    /// County regions keyed by FIPS and name.
    pub boundaries: BoundaryReference,
    /// County spelling corrections and extra regions.
    pub patches: NamePatchTable,
    /// State outlines for zoom bounds.
    pub outlines: StateOutlines,
    /// County boundary features for the annotated map.
    pub counties: CountyFeatures,
}

impl GeographyReference {
    /// Loads every reference file.
    ///
    /// The FIPS lookup is required. Missing outline or county feature
    /// files are logged and leave the corresponding data empty, so the
    /// summary and chart endpoints keep working without map assets.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the FIPS lookup or an explicitly configured
    /// patch file cannot be loaded, or if an existing outline or feature
    /// file is malformed.
    pub fn load(paths: &GeographyPaths) -> Result<Self, GeoError> {
        let boundaries = load_boundaries(&paths.fips_lookup)?;

        let patches = match &paths.patches {
            Some(path) => NamePatchTable::load(path)?,
            None => NamePatchTable::builtin(),
        };

        let outlines = load_optional(&paths.state_outlines, load_state_outlines)?;
        let counties = load_optional(&paths.county_features, load_county_features)?;

        Ok(Self {
            boundaries,
            patches,
            outlines,
            counties,
        })
    }
}

fn load_optional<T: Default>(
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, GeoError>,
) -> Result<T, GeoError> {
    if path.is_file() {
        load(path)
    } else {
        log::warn!("{} not found; continuing without it", path.display());
        Ok(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "flu_finder_geography_{}_{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_with_missing_map_assets() {
        let lookup = temp_file("fips.csv", "fips,name,state\n13105,Elbert County,GA\n");
        let paths = GeographyPaths {
            fips_lookup: lookup.clone(),
            state_outlines: PathBuf::from("/nonexistent/states.json"),
            county_features: PathBuf::from("/nonexistent/counties.json"),
            patches: None,
        };

        let reference = GeographyReference::load(&paths).unwrap();
        assert_eq!(reference.boundaries.len(), 1);
        assert!(reference.outlines.is_empty());
        assert!(reference.counties.is_empty());
        assert!(!reference.patches.county_patches().is_empty());

        std::fs::remove_file(lookup).unwrap();
    }

    #[test]
    fn missing_lookup_is_an_error() {
        let paths = GeographyPaths {
            fips_lookup: PathBuf::from("/nonexistent/fips.csv"),
            state_outlines: PathBuf::from("/nonexistent/states.json"),
            county_features: PathBuf::from("/nonexistent/counties.json"),
            patches: None,
        };
        assert!(matches!(
            GeographyReference::load(&paths),
            Err(GeoError::Io(_))
        ));
    }
}
