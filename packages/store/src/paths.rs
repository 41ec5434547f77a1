#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the `data/` directory.
//!
//! All paths are relative to the data directory, which defaults to the
//! project root's `data/` and can be moved with `FLU_FINDER_DATA_DIR`.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "FLU_FINDER_DATA_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// current directory if the manifest directory has no grandparent.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV).map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the path of the outbreak snapshot written by the ingestion job.
#[must_use]
pub fn snapshot_path() -> PathBuf {
    data_dir().join("outbreaks.csv")
}

/// Returns the path of the county FIPS lookup table.
#[must_use]
pub fn fips_lookup_path() -> PathBuf {
    data_dir().join("fips_lookup.csv")
}

/// Returns the path of the state outline `GeoJSON`.
#[must_use]
pub fn state_outlines_path() -> PathBuf {
    data_dir().join("states.json")
}

/// Returns the path of the county boundary `GeoJSON`.
#[must_use]
pub fn county_features_path() -> PathBuf {
    data_dir().join("geojson-counties-fips.json")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
