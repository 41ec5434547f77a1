//! County name patch table.
//!
//! The default table is `config/geography_patches.toml`, baked into the
//! binary at compile time via [`include_str!`]. Deployments can point
//! [`NamePatchTable::load`] at an edited copy without rebuilding.

use std::path::Path;

use flu_finder_geography_models::{BoundaryRegion, CountyNamePatch};
use flu_finder_outbreak_models::title_case;
use serde::Deserialize;

use crate::GeoError;
use crate::boundaries::{normalize_region, normalize_state_name};

/// Patch config embedded at compile time.
const DEFAULT_PATCHES: &str = include_str!("../config/geography_patches.toml");

#[derive(Debug, Deserialize)]
struct PatchFile {
    #[serde(default)]
    county: Vec<CountyNamePatch>,
    #[serde(default)]
    boundary: Vec<BoundaryRow>,
}

#[derive(Debug, Deserialize)]
struct BoundaryRow {
    fips: String,
    county: String,
    state: String,
}

/// Outbreak-to-boundary county spellings plus boundary rows missing from
/// the primary reference file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePatchTable {
    counties: Vec<CountyNamePatch>,
    extra_boundaries: Vec<BoundaryRegion>,
}

impl NamePatchTable {
    /// Returns the embedded default patch table.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (the config is compiled
    /// in, so this is caught by the test suite).
    #[must_use]
    pub fn builtin() -> Self {
        parse_patch_toml(DEFAULT_PATCHES)
            .unwrap_or_else(|e| panic!("Failed to parse geography_patches.toml: {e}"))
    }

    /// Loads a patch table from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Io`] if the file cannot be read, or
    /// [`GeoError::Toml`] if it is not a valid patch file.
    pub fn load(path: &Path) -> Result<Self, GeoError> {
        let contents = std::fs::read_to_string(path)?;
        let table = parse_patch_toml(&contents)?;
        log::info!(
            "Loaded {} county patches and {} extra boundaries from {}",
            table.counties.len(),
            table.extra_boundaries.len(),
            path.display()
        );
        Ok(table)
    }

    /// County spelling corrections.
    #[must_use]
    pub fn county_patches(&self) -> &[CountyNamePatch] {
        &self.counties
    }

    /// Boundary regions to union into the reference.
    #[must_use]
    pub fn extra_boundaries(&self) -> &[BoundaryRegion] {
        &self.extra_boundaries
    }

    /// Returns the boundary spelling for `county` in `state`, or `county`
    /// itself when no patch applies. Both inputs must already be
    /// title-cased.
    #[must_use]
    pub fn patch_county<'a>(&'a self, state: &str, county: &'a str) -> &'a str {
        self.counties
            .iter()
            .find(|p| p.from == county && p.state.as_deref().is_none_or(|s| s == state))
            .map_or(county, |p| p.to.as_str())
    }

    /// Title-cases an outbreak location and applies the county patches.
    #[must_use]
    pub fn normalize_location(&self, state: &str, county: &str) -> (String, String) {
        let state = title_case(state);
        let county = title_case(county);
        let patched = self.patch_county(&state, &county).to_string();
        (state, patched)
    }
}

/// Parses a patch table from TOML.
///
/// Patch spellings are title-cased and state names expanded so entries
/// compare equal to normalized outbreak and boundary names.
///
/// # Errors
///
/// Returns [`GeoError::Toml`] if the TOML is malformed.
pub fn parse_patch_toml(contents: &str) -> Result<NamePatchTable, GeoError> {
    let file: PatchFile = toml::from_str(contents)?;

    let counties = file
        .county
        .into_iter()
        .map(|p| CountyNamePatch {
            from: title_case(&p.from),
            to: title_case(&p.to),
            state: p.state.as_deref().map(normalize_state_name),
        })
        .collect();

    let extra_boundaries = file
        .boundary
        .iter()
        .map(|b| normalize_region(&b.fips, &b.county, &b.state))
        .collect();

    Ok(NamePatchTable {
        counties,
        extra_boundaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses() {
        let table = NamePatchTable::builtin();
        assert_eq!(table.county_patches().len(), 8);
        assert_eq!(table.extra_boundaries().len(), 3);
        assert!(
            table
                .extra_boundaries()
                .iter()
                .any(|b| b.fips == "02020" && b.state == "Alaska")
        );
    }

    #[test]
    fn patches_known_mismatches() {
        let table = NamePatchTable::builtin();
        assert_eq!(table.patch_county("Louisiana", "Bossier"), "Bossier Parish");
        assert_eq!(table.patch_county("Louisiana", "Jefferson Davis"), "Jeff Davis");
        assert_eq!(table.patch_county("Georgia", "Elbert"), "Elbert");
    }

    #[test]
    fn normalizes_before_patching() {
        let table = NamePatchTable::builtin();
        assert_eq!(
            table.normalize_location("ALASKA", "matanuska susitna"),
            ("Alaska".to_string(), "Matanuska-Susitna".to_string())
        );
    }

    #[test]
    fn state_restricted_patch() {
        let table = parse_patch_toml(
            r#"
            [[county]]
            from = "Lasalle"
            to = "La Salle"
            state = "IL"
            "#,
        )
        .unwrap();
        assert_eq!(table.patch_county("Illinois", "Lasalle"), "La Salle");
        assert_eq!(table.patch_county("Texas", "Lasalle"), "Lasalle");
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            parse_patch_toml("[[county]]\nfrom = 3"),
            Err(GeoError::Toml(_))
        ));
    }

    #[test]
    fn empty_file_means_no_patches() {
        assert_eq!(parse_patch_toml("").unwrap(), NamePatchTable::default());
    }
}
