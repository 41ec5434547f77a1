//! Outbreak-to-boundary join.

use std::borrow::Cow;
use std::collections::BTreeMap;

use flu_finder_geography_models::{GeoAggregateRow, GeoJoin, UnmatchedLocation};
use flu_finder_outbreak_models::OutbreakTable;

use crate::boundaries::BoundaryReference;
use crate::patches::NamePatchTable;

/// Joins outbreak records onto the boundary reference.
///
/// Every region in the reference (plus the patch table's extra boundary
/// rows) yields exactly one row, so regions without outbreaks appear with a
/// zero flock size. Records whose location matches no region, even after
/// patching, are collected in [`GeoJoin::unmatched`] and otherwise ignored.
#[must_use]
pub fn join_with_geography(
    table: &OutbreakTable,
    boundaries: &BoundaryReference,
    patches: &NamePatchTable,
) -> GeoJoin {
    let reference = with_extra_boundaries(boundaries, patches);

    // (flock_size, outbreak_count) per region index
    let mut totals = vec![(0_u64, 0_u64); reference.len()];
    let mut unmatched: BTreeMap<(String, String), (u64, u64)> = BTreeMap::new();

    for record in table {
        let (state, county) = patches.normalize_location(&record.state, &record.county);
        if let Some(index) = reference.position(&state, &county) {
            totals[index].0 = totals[index].0.saturating_add(record.flock_size);
            totals[index].1 += 1;
        } else {
            let entry = unmatched.entry((state, county)).or_default();
            entry.0 += 1;
            entry.1 = entry.1.saturating_add(record.flock_size);
        }
    }

    let rows = reference
        .regions()
        .iter()
        .zip(totals)
        .map(|(region, (flock_size, outbreak_count))| GeoAggregateRow {
            fips: region.fips.clone(),
            state: region.state.clone(),
            county: region.county.clone(),
            flock_size,
            outbreak_count,
            outbreak_exists: outbreak_count > 0,
        })
        .collect();

    let unmatched: Vec<UnmatchedLocation> = unmatched
        .into_iter()
        .map(|((state, county), (records, flock_size))| {
            log::debug!("No boundary match for {county}, {state} ({records} record(s))");
            UnmatchedLocation {
                state,
                county,
                records,
                flock_size,
            }
        })
        .collect();

    if !unmatched.is_empty() {
        log::warn!(
            "{} outbreak location(s) did not match a county boundary",
            unmatched.len()
        );
    }

    GeoJoin { rows, unmatched }
}

/// Returns the reference with the patch table's extra rows unioned in.
///
/// Borrows when every extra row is already present by name.
fn with_extra_boundaries<'a>(
    boundaries: &'a BoundaryReference,
    patches: &NamePatchTable,
) -> Cow<'a, BoundaryReference> {
    let missing: Vec<_> = patches
        .extra_boundaries()
        .iter()
        .filter(|r| boundaries.position(&r.state, &r.county).is_none())
        .cloned()
        .collect();

    if missing.is_empty() {
        Cow::Borrowed(boundaries)
    } else {
        let mut extended = boundaries.clone();
        extended.extend(missing);
        Cow::Owned(extended)
    }
}
