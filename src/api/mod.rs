use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::config::DefaultsConfig;
use crate::models::{Location, PressureReport};
use crate::pressure::{PressureQuery, SurfacePressureService};
use crate::{PressureError, VERSION};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SurfacePressureService>,
}

impl AppState {
    #[must_use]
    pub fn new(service: SurfacePressureService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Query string of `GET /api/surface-pressure`; anything missing comes from config
#[derive(Debug, Default, Deserialize)]
pub struct SurfacePressureParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub hours_back: Option<u32>,
    pub hours_forward: Option<u32>,
    pub include_forecast: Option<bool>,
    pub include_observations: Option<bool>,
}

impl SurfacePressureParams {
    #[must_use]
    pub fn into_query(self, defaults: &DefaultsConfig) -> PressureQuery {
        PressureQuery {
            location: Location::new(
                self.lat.unwrap_or(defaults.latitude),
                self.lon.unwrap_or(defaults.longitude),
            ),
            hours_back: self.hours_back.unwrap_or(defaults.hours_back),
            hours_forward: self.hours_forward.unwrap_or(defaults.hours_forward),
            include_forecast: self.include_forecast.unwrap_or(true),
            include_observations: self.include_observations.unwrap_or(true),
        }
    }
}

#[derive(Serialize)]
pub struct ApiInfo {
    pub endpoint: &'static str,
    pub data_sources: Vec<&'static str>,
    pub time_resolution: &'static str,
    pub spatial_coverage: &'static str,
    pub data_quality: &'static str,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            endpoint: "/api/surface-pressure",
            data_sources: vec!["NOAA gridded forecast", "NOAA station observations"],
            time_resolution: "hourly",
            spatial_coverage: "United States (NOAA weather.gov coverage)",
            data_quality: "observations filtered to quality codes V, C and S",
        }
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    pub data: PressureReport,
    pub api_info: ApiInfo,
}

/// JSON error body `{ "detail": ... }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }
}

impl From<PressureError> for ApiError {
    fn from(err: PressureError) -> Self {
        if err.is_validation() {
            return Self::unprocessable(err.user_message());
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("Failed to retrieve surface pressure data: {}", err.root_cause()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/surface-pressure", get(get_surface_pressure))
        .route("/health", get(get_health))
        .with_state(state)
}

async fn get_surface_pressure(
    State(state): State<AppState>,
    params: Result<Query<SurfacePressureParams>, QueryRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        warn!("Rejected surface pressure parameters: {}", rejection.body_text());
        ApiError::unprocessable(rejection.body_text())
    })?;

    let query = params.into_query(&state.service.config().defaults);
    let report = state.service.query(&query).await?;

    Ok(Json(ApiResponse {
        success: true,
        message: format!(
            "Surface pressure data retrieved for {}, {}",
            query.location.latitude, query.location.longitude
        ),
        data: report,
        api_info: ApiInfo::default(),
    }))
}

async fn get_health() -> Json<Value> {
    Json(json!({ "status": "healthy", "version": VERSION }))
}
