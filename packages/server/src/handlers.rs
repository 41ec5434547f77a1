//! HTTP handler functions for the outbreak API.

use actix_web::{HttpResponse, web};
use flu_finder_analytics::AnalyticsError;
use flu_finder_analytics::summary::ScopedSummary;
use flu_finder_analytics_models::ScopeKey;
use flu_finder_server_models::{
    ApiError, ApiHealth, ApiLatestOutbreak, ApiRecordColumns, ApiSummaryResponse,
    ChartQueryParams, ScopeQueryParams,
};

use crate::AppState;

/// Maps an analytics failure onto a status code and `{"error": ...}` body.
fn error_response(context: &str, e: &AnalyticsError) -> HttpResponse {
    let body = ApiError::new(e.to_string());
    if e.is_client_error() {
        log::debug!("{context}: {e}");
        HttpResponse::BadRequest().json(body)
    } else if e.is_retryable() {
        log::warn!("{context}: {e}");
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        log::error!("{context}: {e}");
        HttpResponse::InternalServerError().json(body)
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/cdc/data`
///
/// Returns every record in column-major form.
pub async fn records(state: web::Data<AppState>) -> HttpResponse {
    match state.service.records().await {
        Ok(table) => HttpResponse::Ok().json(ApiRecordColumns::from(&table)),
        Err(e) => error_response("Failed to fetch records", &e),
    }
}

/// `GET /api/country/data`
pub async fn country_data(state: web::Data<AppState>) -> HttpResponse {
    match state.service.national_summary().await {
        Ok(summary) => HttpResponse::Ok().json(ApiSummaryResponse::success(summary.formatted())),
        Err(e) => error_response("Failed to summarize national data", &e),
    }
}

/// `GET /api/state/{state}/data`
///
/// Returns the state's totals and its records.
pub async fn state_data(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let result = state.service.state_summary(&path).await;
    summary_response(&format!("Failed to summarize {}", path.as_str()), result)
}

/// `GET /api/county/{state}/{county}/data`
///
/// Returns the county's totals and its records.
pub async fn county_data(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (state_name, county_name) = path.into_inner();
    let result = state
        .service
        .county_summary(&state_name, &county_name)
        .await;
    summary_response(
        &format!("Failed to summarize {county_name}, {state_name}"),
        result,
    )
}

fn summary_response(context: &str, result: Result<ScopedSummary, AnalyticsError>) -> HttpResponse {
    match result {
        Ok(scoped) => {
            let mut response = ApiSummaryResponse::success(scoped.summary.formatted());
            response.state = scoped.scope.state_name().map(str::to_string);
            response.county = scoped.scope.county_name().map(str::to_string);
            response.data = Some(ApiRecordColumns::from(&scoped.records));
            HttpResponse::Ok().json(response)
        }
        Err(e) => error_response(context, &e),
    }
}

/// `GET /api/latest`
///
/// Returns the newest outbreak per county, optionally within a state.
pub async fn latest(
    state: web::Data<AppState>,
    params: web::Query<ScopeQueryParams>,
) -> HttpResponse {
    let scope = match ScopeKey::from_parts(params.state().as_deref(), params.county().as_deref()) {
        Ok(scope) => scope,
        Err(e) => return error_response("Invalid scope", &e.into()),
    };
    match state.service.latest_outbreaks(&scope).await {
        Ok(records) => {
            let rows: Vec<ApiLatestOutbreak> =
                records.into_iter().map(ApiLatestOutbreak::from).collect();
            HttpResponse::Ok().json(rows)
        }
        Err(e) => error_response("Failed to list latest outbreaks", &e),
    }
}

/// `GET /api/chart`
///
/// Returns chart data, or an empty result with a message when the filters
/// leave nothing to draw.
pub async fn chart(
    state: web::Data<AppState>,
    params: web::Query<ChartQueryParams>,
) -> HttpResponse {
    let kind = params.kind();
    match state
        .service
        .chart_data(&kind, &params.to_chart_params())
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&format!("Failed to build {kind} chart"), &e),
    }
}

/// `GET /api/map/choropleth`
pub async fn choropleth(
    state: web::Data<AppState>,
    params: web::Query<ScopeQueryParams>,
) -> HttpResponse {
    let scope = match ScopeKey::from_parts(params.state().as_deref(), params.county().as_deref()) {
        Ok(scope) => scope,
        Err(e) => return error_response("Invalid scope", &e.into()),
    };
    match state.service.choropleth(&scope).await {
        Ok(map) => HttpResponse::Ok().json(map),
        Err(e) => error_response("Failed to build choropleth", &e),
    }
}

/// `GET /api/map/data`
///
/// Returns one point feature per record with coordinates.
pub async fn map_data(state: web::Data<AppState>) -> HttpResponse {
    match state.service.map_points().await {
        Ok(features) => HttpResponse::Ok().json(features),
        Err(e) => error_response("Failed to build map points", &e),
    }
}

/// `GET /api/map/initialize`
///
/// Returns the county boundary features annotated with outbreak totals.
pub async fn map_initialize(state: web::Data<AppState>) -> HttpResponse {
    if state.service.geography().counties.is_empty() {
        log::error!("County boundary features are not loaded");
        return HttpResponse::InternalServerError()
            .json(ApiError::new("County boundary features not found"));
    }
    match state.service.annotated_counties().await {
        Ok(features) => HttpResponse::Ok().json(features),
        Err(e) => error_response("Failed to annotate counties", &e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use chrono::NaiveDate;
    use flu_finder_analytics::OutbreakService;
    use flu_finder_geography::{BoundaryReference, GeographyReference};
    use flu_finder_geography_models::BoundaryRegion;
    use flu_finder_outbreak_models::{OutbreakRecord, OutbreakTable};
    use flu_finder_store::{MemoryStore, RecordStore};
    use serde_json::Value;

    use crate::{AppState, configure};

    fn record(state: &str, county: &str, flock_size: u64, date: (i32, u32, u32)) -> OutbreakRecord {
        OutbreakRecord {
            outbreak_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            county: county.to_string(),
            state: state.to_string(),
            flock_size,
            flock_type: "WOAH Poultry".to_string(),
            latitude: Some(34.1),
            longitude: Some(-82.8),
        }
    }

    fn app_state(store: Arc<dyn RecordStore>) -> actix_web::web::Data<AppState> {
        let geography = GeographyReference {
            boundaries: BoundaryReference::from_regions(vec![BoundaryRegion {
                fips: "13105".to_string(),
                state: "Georgia".to_string(),
                county: "Elbert".to_string(),
            }]),
            ..GeographyReference::default()
        };
        actix_web::web::Data::new(AppState {
            service: OutbreakService::new(store, Arc::new(geography)),
        })
    }

    fn memory_store() -> Arc<dyn RecordStore> {
        Arc::new(MemoryStore::new(OutbreakTable::new(vec![
            record("Georgia", "Elbert", 1_000, (2024, 1, 1)),
            record("Georgia", "Elbert", 234, (2025, 1, 19)),
            record("Texas", "Parmer", 1_000_000, (2024, 1, 1)),
        ])))
    }

    async fn get(store: Arc<dyn RecordStore>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(app_state(store))
                .configure(configure),
        )
        .await;
        let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        let body: Value = test::read_body_json(response).await;
        (status, body)
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let (status, body) = get(memory_store(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
    }

    #[actix_web::test]
    async fn country_summary_is_formatted() {
        let (status, body) = get(memory_store(), "/api/country/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["summary"]["outbreaks"], "3");
        assert_eq!(body["summary"]["flock_size"], "1,001,234");
    }

    #[actix_web::test]
    async fn state_summary_includes_rows() {
        let (status, body) = get(memory_store(), "/api/state/georgia/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "Georgia");
        assert_eq!(body["summary"]["flock_size"], "1,234");
        assert_eq!(body["data"]["County"], serde_json::json!(["Elbert", "Elbert"]));
    }

    #[actix_web::test]
    async fn both_county_paths_agree() {
        let (_, legacy) = get(memory_store(), "/api/county/Georgia/Elbert/data").await;
        let (_, nested) = get(memory_store(), "/api/state/Georgia/county/Elbert/data").await;
        assert_eq!(legacy, nested);
        assert_eq!(legacy["county"], "Elbert");
    }

    #[actix_web::test]
    async fn blank_county_is_bad_request() {
        let (status, body) = get(memory_store(), "/api/county/Georgia/%20/data").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("county"));
    }

    #[actix_web::test]
    async fn columnar_dump() {
        let (status, body) = get(memory_store(), "/api/cdc/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Outbreak Date"][1], "01/19/2025");
        assert_eq!(body["Flock Size"][2], 1_000_000);
    }

    #[actix_web::test]
    async fn unknown_chart_type_is_bad_request() {
        let (status, body) = get(memory_store(), "/api/chart?type=donut").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown chart type: donut");
    }

    #[actix_web::test]
    async fn county_without_state_is_bad_request() {
        let (status, _) = get(memory_store(), "/api/chart?type=hbar_sizes&county=Elbert").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn empty_window_is_ok_with_message() {
        let (status, body) =
            get(memory_store(), "/api/chart?type=pie_sizes&start=2030&end=2031").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "empty");
        assert!(body["message"].as_str().unwrap().contains("time range"));
    }

    #[actix_web::test]
    async fn chart_defaults_to_time_series() {
        let (status, body) = get(memory_store(), "/api/chart?state=&end=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "chart");
        assert_eq!(body["kind"], "vbar");
    }

    #[actix_web::test]
    async fn latest_per_county() {
        let (status, body) = get(memory_store(), "/api/latest?state=Georgia").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["outbreakDate"], "2025-01-19");
    }

    #[actix_web::test]
    async fn choropleth_national_range() {
        let (status, body) = get(memory_store(), "/api/map/choropleth").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["figure"]["range"], serde_json::json!([0, 1234]));
        assert_eq!(body["figure"]["unmatchedRecords"], 1);
    }

    #[actix_web::test]
    async fn map_points_are_geojson() {
        let (status, body) = get(memory_store(), "/api/map/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn map_initialize_without_features_is_error() {
        let (status, _) = get(memory_store(), "/api/map/initialize").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn closed_store_is_service_unavailable() {
        let store = memory_store();
        store.close().await.unwrap();
        let (status, body) = get(store, "/api/country/data").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("closed"));
    }
}
