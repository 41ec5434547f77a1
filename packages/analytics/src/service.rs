//! The outbreak service: every operation the presentation layer calls.
//!
//! Each call fetches the current table from the injected store and
//! computes its answer in memory. Nothing is cached between calls.

use std::sync::Arc;

use flu_finder_analytics_models::{ChartKind, ChartOutcome, ChartParams, Choropleth, ScopeKey, Summary};
use flu_finder_geography::{GeographyReference, join_with_geography, map_points};
use flu_finder_outbreak_models::{OutbreakRecord, OutbreakTable};
use flu_finder_store::RecordStore;
use geojson::FeatureCollection;

use crate::AnalyticsError;
use crate::chart::build_chart;
use crate::choropleth::build_choropleth;
use crate::filter::filter_by_scope;
use crate::summary::{ScopedSummary, latest_by_county, summarize};

/// Outbreak queries over a shared record store and geography reference.
#[derive(Clone)]
pub struct OutbreakService {
    store: Arc<dyn RecordStore>,
    geography: Arc<GeographyReference>,
}

impl std::fmt::Debug for OutbreakService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutbreakService")
            .field("store", &self.store.describe())
            .finish_non_exhaustive()
    }
}

impl OutbreakService {
    /// Creates a service reading from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, geography: Arc<GeographyReference>) -> Self {
        Self { store, geography }
    }

    /// The geography reference used by the map operations.
    #[must_use]
    pub fn geography(&self) -> &GeographyReference {
        &self.geography
    }

    /// Every record, unfiltered.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceUnavailable`] if the store cannot be
    /// read.
    pub async fn records(&self) -> Result<OutbreakTable, AnalyticsError> {
        let table = self.store.fetch_all().await.map_err(|e| {
            log::error!("Failed to fetch from {}: {e}", self.store.describe());
            AnalyticsError::from(e)
        })?;
        log::debug!("Fetched {} records from {}", table.len(), self.store.describe());
        Ok(table)
    }

    /// The records inside `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceUnavailable`] if the store cannot be
    /// read.
    pub async fn scoped_records(&self, scope: &ScopeKey) -> Result<OutbreakTable, AnalyticsError> {
        let table = self.records().await?;
        Ok(filter_by_scope(&table, scope))
    }

    /// Totals for the whole country.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceUnavailable`] if the store cannot be
    /// read.
    pub async fn national_summary(&self) -> Result<Summary, AnalyticsError> {
        let table = self.records().await?;
        Ok(summarize(&table))
    }

    /// Totals for one state, with the state's records.
    ///
    /// # Errors
    ///
    /// * [`AnalyticsError::InvalidScope`] if `state` is blank
    /// * [`AnalyticsError::SourceUnavailable`] if the store cannot be read
    pub async fn state_summary(&self, state: &str) -> Result<ScopedSummary, AnalyticsError> {
        let scope = ScopeKey::state(state)?;
        let table = self.scoped_records(&scope).await?;
        Ok(ScopedSummary::new(scope, table))
    }

    /// Totals for one county, with the county's records.
    ///
    /// # Errors
    ///
    /// * [`AnalyticsError::InvalidScope`] if either name is blank
    /// * [`AnalyticsError::SourceUnavailable`] if the store cannot be read
    pub async fn county_summary(
        &self,
        state: &str,
        county: &str,
    ) -> Result<ScopedSummary, AnalyticsError> {
        let scope = ScopeKey::county(state, county)?;
        let table = self.scoped_records(&scope).await?;
        Ok(ScopedSummary::new(scope, table))
    }

    /// Builds the chart named by `kind` (a wire name or alias).
    ///
    /// # Errors
    ///
    /// * [`AnalyticsError::InvalidChartKind`] if `kind` is not a known chart
    /// * [`AnalyticsError::InvalidScope`] or
    ///   [`AnalyticsError::InvalidTimeWindow`] for malformed parameters
    /// * [`AnalyticsError::SourceUnavailable`] if the store cannot be read
    pub async fn chart_data(
        &self,
        kind: &str,
        params: &ChartParams,
    ) -> Result<ChartOutcome, AnalyticsError> {
        let kind: ChartKind = kind
            .trim()
            .parse()
            .map_err(|_| AnalyticsError::InvalidChartKind {
                kind: kind.to_string(),
            })?;
        let table = self.records().await?;
        build_chart(&table, kind, params)
    }

    /// The county choropleth, zoomed to `scope` when it names a state.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceUnavailable`] if the store cannot be
    /// read.
    pub async fn choropleth(&self, scope: &ScopeKey) -> Result<Choropleth, AnalyticsError> {
        let table = self.records().await?;
        Ok(build_choropleth(&table, &self.geography, scope))
    }

    /// One point feature per record with coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceUnavailable`] if the store cannot be
    /// read.
    pub async fn map_points(&self) -> Result<FeatureCollection, AnalyticsError> {
        let table = self.records().await?;
        Ok(map_points(&table))
    }

    /// County boundary features annotated with outbreak totals.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceUnavailable`] if the store cannot be
    /// read.
    pub async fn annotated_counties(&self) -> Result<FeatureCollection, AnalyticsError> {
        let table = self.records().await?;
        let join = join_with_geography(&table, &self.geography.boundaries, &self.geography.patches);
        Ok(self.geography.counties.annotate(&join))
    }

    /// The newest outbreak in every county inside `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceUnavailable`] if the store cannot be
    /// read.
    pub async fn latest_outbreaks(
        &self,
        scope: &ScopeKey,
    ) -> Result<Vec<OutbreakRecord>, AnalyticsError> {
        let table = self.scoped_records(scope).await?;
        Ok(latest_by_county(&table))
    }

    /// Releases the underlying store.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::SourceUnavailable`] if closing fails.
    pub async fn close(&self) -> Result<(), AnalyticsError> {
        log::info!("Closing {}", self.store.describe());
        self.store.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flu_finder_geography::BoundaryReference;
    use flu_finder_geography_models::BoundaryRegion;
    use flu_finder_store::MemoryStore;

    fn record(state: &str, county: &str, flock_size: u64, date: Option<(i32, u32, u32)>) -> OutbreakRecord {
        OutbreakRecord {
            outbreak_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            county: county.to_string(),
            state: state.to_string(),
            flock_size,
            flock_type: "WOAH Poultry".to_string(),
            latitude: Some(34.1),
            longitude: Some(-82.8),
        }
    }

    fn service() -> OutbreakService {
        let table = OutbreakTable::new(vec![
            record("Georgia", "Elbert", 100, Some((2024, 1, 1))),
            record("GEORGIA", "elbert", 50, Some((2025, 1, 19))),
            record("Texas", "Parmer", 200, Some((2024, 1, 1))),
        ]);
        let geography = GeographyReference {
            boundaries: BoundaryReference::from_regions(vec![BoundaryRegion {
                fips: "13105".to_string(),
                state: "Georgia".to_string(),
                county: "Elbert".to_string(),
            }]),
            ..GeographyReference::default()
        };
        OutbreakService::new(Arc::new(MemoryStore::new(table)), Arc::new(geography))
    }

    #[tokio::test]
    async fn summaries_per_scope() {
        let service = service();
        assert_eq!(
            service.national_summary().await.unwrap(),
            Summary {
                outbreaks: 3,
                flock_size: 350
            }
        );
        let georgia = service.state_summary("georgia").await.unwrap();
        assert_eq!(georgia.summary.flock_size, 150);
        assert_eq!(georgia.records.len(), 2);
        assert_eq!(georgia.scope.state_name(), Some("Georgia"));

        let elbert = service.county_summary("Georgia", "Elbert").await.unwrap();
        assert_eq!(elbert.summary.outbreaks, 2);
        assert_eq!(elbert.scope.county_name(), Some("Elbert"));

        let atlantis = service.state_summary("Atlantis").await.unwrap();
        assert_eq!(atlantis.summary, Summary::default());
        assert!(atlantis.records.is_empty());
    }

    #[tokio::test]
    async fn blank_state_is_invalid_scope() {
        let err = service().state_summary(" ").await.unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidScope(_)));
    }

    #[tokio::test]
    async fn chart_accepts_wire_names_and_aliases() {
        let service = service();
        let params = ChartParams::default();
        assert!(!service.chart_data("hbar_sizes", &params).await.unwrap().is_empty());
        assert!(!service.chart_data("time-series-bar", &params).await.unwrap().is_empty());

        let err = service.chart_data("donut", &params).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidChartKind { kind } if kind == "donut"));
    }

    #[tokio::test]
    async fn latest_outbreak_per_county_in_scope() {
        let scope = ScopeKey::state("Georgia").unwrap();
        let latest = service().latest_outbreaks(&scope).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].flock_size, 50);
    }

    #[tokio::test]
    async fn map_points_and_choropleth() {
        let service = service();
        assert_eq!(service.map_points().await.unwrap().features.len(), 3);

        let map = service.choropleth(&ScopeKey::National).await.unwrap();
        assert_eq!(map.figure.regions.len(), 1);
        assert_eq!(map.figure.range, [0, 150]);
        assert_eq!(map.figure.unmatched_records, 1);
    }

    #[tokio::test]
    async fn closed_store_is_source_unavailable() {
        let service = service();
        service.close().await.unwrap();
        let err = service.national_summary().await.unwrap_err();
        assert!(err.is_retryable());
    }
}
