use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::db::TemperatureSummary;
use crate::services::ClimateService;

#[derive(Clone)]
pub struct AppState {
    pub climate_service: ClimateService,
}

// Served from `/` so the API enumerates itself; the dataset ships with no
// other documentation surface.
const ROUTE_LISTING: &str = "\
Available Routes:<br/>
/api/v1.0/precipitation (precipitation readings for the final year of data)<br/>
/api/v1.0/stations (station ids with recorded measurements)<br/>
/api/v1.0/tobs (temperature observations for the most active station)<br/>
/api/v1.0/start_date (min, max and average temperature from the given yyyy-mm-dd date onward)<br/>
/api/v1.0/start_date/end_date (min, max and average temperature over the inclusive yyyy-mm-dd date range)";

pub fn create_router(state: AppState) -> Router {
    // Static segments win over the {start_date} capture, so the summary
    // routes can share the /api/v1.0 prefix with the named endpoints.
    let api_routes = Router::new()
        .route("/precipitation", get(get_precipitation))
        .route("/stations", get(get_stations))
        .route("/tobs", get(get_most_active_observations))
        .route("/{start_date}", get(get_summary_from_start))
        .route("/{start_date}/{end_date}", get(get_summary_for_range))
        .with_state(state);

    Router::new()
        .route("/", get(list_routes))
        .nest("/api/v1.0", api_routes)
}

#[instrument]
async fn list_routes() -> Html<&'static str> {
    debug!("Route listing requested");
    Html(ROUTE_LISTING)
}

#[instrument(skip(state))]
async fn get_precipitation(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    debug!("Fetching precipitation readings for the lookback window");
    let entries = state
        .climate_service
        .get_lookback_precipitation()
        .await
        .map_err(|e| {
            error!("Failed to fetch precipitation readings: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!("Retrieved {} precipitation entries", entries.len());

    Ok(Json(entries))
}

#[instrument(skip(state))]
async fn get_stations(State(state): State<AppState>) -> Result<Json<Vec<String>>, StatusCode> {
    debug!("Fetching station ids");
    let station_ids = state.climate_service.get_station_ids().await.map_err(|e| {
        error!("Failed to fetch station ids: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    info!("Retrieved {} stations", station_ids.len());

    Ok(Json(station_ids))
}

#[instrument(skip(state))]
async fn get_most_active_observations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    debug!("Fetching temperature observations for the most active station");
    let observations = state
        .climate_service
        .get_most_active_observations()
        .await
        .map_err(|e| {
            error!("Failed to fetch temperature observations: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!(
        "Retrieved {} temperature observation entries",
        observations.len()
    );

    Ok(Json(observations))
}

#[instrument(skip(state), fields(start_date = %start_date))]
async fn get_summary_from_start(
    State(state): State<AppState>,
    Path(start_date): Path<String>,
) -> Result<Json<(String, TemperatureSummary)>, StatusCode> {
    debug!("Fetching temperature summary from {}", start_date);
    let summary = state
        .climate_service
        .get_temperature_summary_since(&start_date)
        .await
        .map_err(|e| {
            error!("Failed to fetch temperature summary from {}: {}", start_date, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!("Computed temperature summary from {}", start_date);

    Ok(Json(summary))
}

#[instrument(skip(state), fields(start_date = %start_date, end_date = %end_date))]
async fn get_summary_for_range(
    State(state): State<AppState>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<(String, TemperatureSummary)>, StatusCode> {
    debug!(
        "Fetching temperature summary from {} to {}",
        start_date, end_date
    );
    let summary = state
        .climate_service
        .get_temperature_summary_between(&start_date, &end_date)
        .await
        .map_err(|e| {
            error!(
                "Failed to fetch temperature summary from {} to {}: {}",
                start_date, end_date, e
            );
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!(
        "Computed temperature summary from {} to {}",
        start_date, end_date
    );

    Ok(Json(summary))
}
