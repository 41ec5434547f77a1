//! County boundary reference table.
//!
//! The reference is read from `fips_lookup.csv` (`fips,name,state` with
//! postal abbreviations) and normalized so its names line up with the
//! title-cased outbreak feed.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use flu_finder_geography_models::{BoundaryRegion, fips};
use flu_finder_outbreak_models::title_case;
use serde::Deserialize;

use crate::GeoError;

/// One row of the FIPS lookup CSV as published.
#[derive(Debug, Deserialize)]
struct FipsLookupRow {
    fips: String,
    name: String,
    state: String,
}

/// Boundary regions keyed by FIPS code and by `(state, county)` name.
///
/// Each FIPS code appears once. When a second row carries a FIPS code that
/// is already present, its name is kept as an alias for the first region.
#[derive(Debug, Clone, Default)]
pub struct BoundaryReference {
    regions: Vec<BoundaryRegion>,
    by_fips: BTreeMap<String, usize>,
    by_name: BTreeMap<(String, String), usize>,
}

impl BoundaryReference {
    /// Builds a reference from already-normalized regions.
    #[must_use]
    pub fn from_regions(regions: impl IntoIterator<Item = BoundaryRegion>) -> Self {
        let mut reference = Self::default();
        reference.extend(regions);
        reference
    }

    /// Adds a region. Returns `true` if its FIPS code was new.
    ///
    /// Regions whose FIPS code is not five digits, or is `"00000"`, are
    /// dropped.
    pub fn insert(&mut self, region: BoundaryRegion) -> bool {
        if !fips::is_valid_county_fips(&region.fips) {
            log::debug!(
                "Dropping boundary row '{}' ({}, {}): invalid FIPS",
                region.fips,
                region.county,
                region.state
            );
            return false;
        }

        let name_key = (region.state.clone(), region.county.clone());

        if let Some(&index) = self.by_fips.get(&region.fips) {
            self.by_name.entry(name_key).or_insert(index);
            return false;
        }

        let index = self.regions.len();
        self.by_fips.insert(region.fips.clone(), index);
        self.by_name.entry(name_key).or_insert(index);
        self.regions.push(region);
        true
    }

    /// Regions in insertion order, one per FIPS code.
    #[must_use]
    pub fn regions(&self) -> &[BoundaryRegion] {
        &self.regions
    }

    /// Number of distinct FIPS codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the reference holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Index into [`Self::regions`] of the region named `(state, county)`.
    #[must_use]
    pub fn position(&self, state: &str, county: &str) -> Option<usize> {
        self.by_name
            .get(&(state.to_string(), county.to_string()))
            .copied()
    }

    /// Looks up a region by normalized state and county name.
    #[must_use]
    pub fn lookup(&self, state: &str, county: &str) -> Option<&BoundaryRegion> {
        self.position(state, county).map(|i| &self.regions[i])
    }

    /// Looks up a region by FIPS code.
    #[must_use]
    pub fn by_fips(&self, code: &str) -> Option<&BoundaryRegion> {
        self.by_fips.get(code).map(|&i| &self.regions[i])
    }
}

impl Extend<BoundaryRegion> for BoundaryReference {
    fn extend<T: IntoIterator<Item = BoundaryRegion>>(&mut self, iter: T) {
        for region in iter {
            self.insert(region);
        }
    }
}

/// Title-cases a county name and strips a trailing `" County"`.
#[must_use]
pub fn normalize_county_name(raw: &str) -> String {
    let titled = title_case(raw);
    match titled.strip_suffix(" County") {
        Some(stripped) => stripped.trim_end().to_string(),
        None => titled,
    }
}

/// Expands a postal abbreviation to the full state name, or title-cases
/// the value when it is not a known abbreviation.
#[must_use]
pub fn normalize_state_name(raw: &str) -> String {
    fips::state_full_name(raw).map_or_else(|| title_case(raw), str::to_string)
}

/// Builds a normalized [`BoundaryRegion`] from raw cells.
#[must_use]
pub fn normalize_region(raw_fips: &str, county: &str, state: &str) -> BoundaryRegion {
    BoundaryRegion {
        fips: fips::pad_fips(raw_fips),
        state: normalize_state_name(state),
        county: normalize_county_name(county),
    }
}

/// Parses the FIPS lookup CSV.
///
/// # Errors
///
/// Returns [`GeoError::Csv`] if the CSV is malformed or lacks the
/// `fips`, `name` or `state` columns.
pub fn parse_boundaries<R: Read>(reader: R) -> Result<BoundaryReference, GeoError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut reference = BoundaryReference::default();
    let mut duplicates = 0_usize;

    for result in reader.deserialize::<FipsLookupRow>() {
        let row = result?;
        if !reference.insert(normalize_region(&row.fips, &row.name, &row.state)) {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        log::debug!("{duplicates} boundary row(s) were duplicates or invalid");
    }

    Ok(reference)
}

/// Loads the FIPS lookup CSV from disk.
///
/// # Errors
///
/// Returns [`GeoError::Io`] if the file cannot be opened, or
/// [`GeoError::Csv`] if it cannot be parsed.
pub fn load_boundaries(path: &Path) -> Result<BoundaryReference, GeoError> {
    let file = std::fs::File::open(path)?;
    let reference = parse_boundaries(std::io::BufReader::new(file))?;
    log::info!(
        "Loaded {} boundary regions from {}",
        reference.len(),
        path.display()
    );
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUP: &str = "\
fips,name,state
13105,Elbert County,GA
1001,Autauga County,AL
22015,Bossier Parish,LA
08039,Elbert County,CO
00000,Placeholder,XX
13105,Elbert,GA
";

    #[test]
    fn normalizes_rows() {
        let reference = parse_boundaries(LOOKUP.as_bytes()).unwrap();
        let autauga = reference.by_fips("01001").unwrap();
        assert_eq!(autauga.county, "Autauga");
        assert_eq!(autauga.state, "Alabama");

        let bossier = reference.lookup("Louisiana", "Bossier Parish").unwrap();
        assert_eq!(bossier.fips, "22015");
    }

    #[test]
    fn one_region_per_fips() {
        let reference = parse_boundaries(LOOKUP.as_bytes()).unwrap();
        assert_eq!(reference.len(), 4);
        assert!(reference.by_fips("00000").is_none());
    }

    #[test]
    fn same_county_name_in_different_states() {
        let reference = parse_boundaries(LOOKUP.as_bytes()).unwrap();
        assert_eq!(reference.lookup("Georgia", "Elbert").unwrap().fips, "13105");
        assert_eq!(reference.lookup("Colorado", "Elbert").unwrap().fips, "08039");
    }

    #[test]
    fn later_names_become_aliases() {
        let mut reference = parse_boundaries(LOOKUP.as_bytes()).unwrap();
        let added = reference.insert(normalize_region("22053", "Jefferson Davis", "LA"));
        assert!(added);
        let added = reference.insert(normalize_region("22053", "Jeff Davis", "Louisiana"));
        assert!(!added);
        assert_eq!(reference.len(), 5);
        assert_eq!(
            reference.position("Louisiana", "Jeff Davis"),
            reference.position("Louisiana", "Jefferson Davis")
        );
        assert_eq!(reference.by_fips("22053").unwrap().county, "Jefferson Davis");
    }

    #[test]
    fn county_suffix_is_stripped() {
        assert_eq!(normalize_county_name("ELBERT COUNTY"), "Elbert");
        assert_eq!(normalize_county_name("Bethel Census Area"), "Bethel Census Area");
        assert_eq!(normalize_state_name("pr"), "Puerto Rico");
        assert_eq!(normalize_state_name("new york"), "New York");
    }
}
