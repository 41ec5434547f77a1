//! County choropleth builder.

use flu_finder_analytics_models::choropleth::color_scale;
use flu_finder_analytics_models::{Choropleth, ChoroplethFigure, ChoroplethRegion, ScopeKey};
use flu_finder_geography::{GeographyReference, join_with_geography};
use flu_finder_outbreak_models::OutbreakTable;

/// Builds the county choropleth for `scope`.
///
/// The join always runs over the full national table so that the color
/// domain `[0, global_max]` stays fixed as the user drills down. Only the
/// displayed regions narrow to the scope: every county of the selected
/// state, or the single selected county. Zoom bounds come from the state
/// outline and are present only when a state is selected and its outline is
/// known.
#[must_use]
pub fn build_choropleth(
    table: &OutbreakTable,
    geography: &GeographyReference,
    scope: &ScopeKey,
) -> Choropleth {
    let join = join_with_geography(table, &geography.boundaries, &geography.patches);
    let global_max = join.max_flock_size();

    let regions: Vec<ChoroplethRegion> = match (scope.state_name(), scope.county_name()) {
        (None, _) => join.rows.iter().map(ChoroplethRegion::from).collect(),
        (Some(state), None) => join
            .rows_in_state(state)
            .into_iter()
            .map(ChoroplethRegion::from)
            .collect(),
        (Some(state), Some(county)) => {
            let (state, county) = geography.patches.normalize_location(state, county);
            // aliases resolve through the reference to the reported FIPS
            let fips = geography
                .boundaries
                .lookup(&state, &county)
                .map(|r| r.fips.as_str());
            join
                .rows_in_state(&state)
                .into_iter()
                .filter(|r| fips.map_or(r.county == county, |fips| r.fips == fips))
                .map(ChoroplethRegion::from)
                .collect()
        }
    };

    let bounds = scope.state_name().and_then(|state| {
        let view = geography.outlines.view_for_state(state);
        if view.is_none() {
            log::debug!("no outline for {state}; returning unbounded view");
        }
        view
    });

    Choropleth {
        figure: ChoroplethFigure {
            regions,
            color_scale: color_scale(),
            range: [0, global_max],
            highlight_state: scope.state_name().map(str::to_string),
            highlight_county: scope.county_name().map(str::to_string),
            unmatched_records: join.unmatched_records(),
        },
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flu_finder_geography::{BoundaryReference, NamePatchTable, StateOutlines};
    use flu_finder_geography_models::BoundaryRegion;
    use flu_finder_outbreak_models::OutbreakRecord;

    const GEORGIA_OUTLINE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "NAME": "Georgia" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-85.0, 31.0], [-81.0, 31.0], [-81.0, 35.0], [-85.0, 35.0], [-85.0, 31.0]]]
            }
        }]
    }"#;

    fn region(fips: &str, state: &str, county: &str) -> BoundaryRegion {
        BoundaryRegion {
            fips: fips.to_string(),
            state: state.to_string(),
            county: county.to_string(),
        }
    }

    fn record(state: &str, county: &str, flock_size: u64) -> OutbreakRecord {
        OutbreakRecord {
            outbreak_date: None,
            county: county.to_string(),
            state: state.to_string(),
            flock_size,
            flock_type: "WOAH Poultry".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn geography() -> GeographyReference {
        GeographyReference {
            boundaries: BoundaryReference::from_regions(vec![
                region("13105", "Georgia", "Elbert"),
                region("13195", "Georgia", "Madison"),
                region("48369", "Texas", "Parmer"),
            ]),
            patches: NamePatchTable::default(),
            outlines: StateOutlines::parse(GEORGIA_OUTLINE).unwrap(),
            ..GeographyReference::default()
        }
    }

    fn table() -> OutbreakTable {
        OutbreakTable::new(vec![
            record("Georgia", "Elbert", 100),
            record("Texas", "Parmer", 2_000),
            record("Georgia", "Nowhere", 5),
        ])
    }

    #[test]
    fn national_view_has_every_region_and_no_bounds() {
        let map = build_choropleth(&table(), &geography(), &ScopeKey::National);
        assert_eq!(map.figure.regions.len(), 3);
        assert_eq!(map.figure.range, [0, 2_000]);
        assert_eq!(map.figure.unmatched_records, 1);
        assert!(map.bounds.is_none());
        assert!(map.figure.highlight_state.is_none());
    }

    #[test]
    fn state_view_keeps_national_color_domain() {
        let scope = ScopeKey::state("georgia").unwrap();
        let map = build_choropleth(&table(), &geography(), &scope);

        let fips: Vec<&str> = map.figure.regions.iter().map(|r| r.fips.as_str()).collect();
        assert_eq!(fips, ["13105", "13195"]);
        assert_eq!(map.figure.range, [0, 2_000]);
        assert_eq!(map.figure.highlight_state.as_deref(), Some("Georgia"));
        assert!(map.figure.regions[0].outbreak_exists);
        assert!(!map.figure.regions[1].outbreak_exists);

        let bounds = map.bounds.unwrap();
        assert!((bounds.center.lon - -83.4).abs() < 1e-9);
    }

    #[test]
    fn county_view_highlights_county() {
        let scope = ScopeKey::county("Georgia", "Elbert").unwrap();
        let map = build_choropleth(&table(), &geography(), &scope);
        assert_eq!(map.figure.highlight_county.as_deref(), Some("Elbert"));
        assert!(map.bounds.is_some());

        let fips: Vec<&str> = map.figure.regions.iter().map(|r| r.fips.as_str()).collect();
        assert_eq!(fips, ["13105"]);
        assert_eq!(map.figure.range, [0, 2_000]);
    }

    #[test]
    fn county_view_follows_name_patches() {
        let mut geography = geography();
        geography.boundaries = BoundaryReference::from_regions(vec![
            region("22015", "Louisiana", "Bossier Parish"),
            region("22017", "Louisiana", "Caddo Parish"),
        ]);
        geography.patches = NamePatchTable::builtin();

        let scope = ScopeKey::county("Louisiana", "Bossier").unwrap();
        let map = build_choropleth(&table(), &geography, &scope);
        let fips: Vec<&str> = map.figure.regions.iter().map(|r| r.fips.as_str()).collect();
        assert_eq!(fips, ["22015"]);
    }

    #[test]
    fn state_without_outline_has_no_bounds() {
        let scope = ScopeKey::state("Texas").unwrap();
        let map = build_choropleth(&table(), &geography(), &scope);
        assert_eq!(map.figure.regions.len(), 1);
        assert!(map.bounds.is_none());
    }
}
