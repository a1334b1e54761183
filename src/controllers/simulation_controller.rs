use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::models::climate::{AnalyzeResponse, UsageInfo};
use crate::models::simulation::SimulationResponse;
use crate::services::simulation_service::{self, SimulationRequest};
use crate::shared_state::AppState;

fn default_capacity() -> f64 { 5.0 }

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SimulateQuery {
    /// Latitude (−90 … 90)
    pub lat: f64,
    /// Longitude (−180 … 180)
    pub lon: f64,
    /// Rated DC capacity in kW (> 0, default 5)
    #[serde(default = "default_capacity")]
    pub panel_capacity_kw: f64,
    /// Panel tilt in degrees (0 … 90, default |lat|)
    pub tilt: Option<f64>,
    /// Panel azimuth in degrees (0 … 360, default equator-facing)
    pub azimuth: Option<f64>,
    /// Price per kWh; enables `estimated_savings`
    pub electricity_rate: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyzeQuery {
    /// Latitude (−90 … 90)
    pub lat: f64,
    /// Longitude (−180 … 180)
    pub lon: f64,
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), ApiError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("{name} must be between {min} and {max}, got {value}")))
    }
}

fn check_location(lat: f64, lon: f64) -> Result<(), ApiError> {
    check_range("lat", lat, -90.0, 90.0)?;
    check_range("lon", lon, -180.0, 180.0)
}

impl TryFrom<SimulateQuery> for SimulationRequest {
    type Error = ApiError;

    fn try_from(q: SimulateQuery) -> Result<Self, Self::Error> {
        check_location(q.lat, q.lon)?;
        if !(q.panel_capacity_kw.is_finite() && q.panel_capacity_kw > 0.0) {
            return Err(ApiError::Validation(format!(
                "panel_capacity_kw must be greater than 0, got {}",
                q.panel_capacity_kw
            )));
        }
        if let Some(tilt) = q.tilt {
            check_range("tilt", tilt, 0.0, 90.0)?;
        }
        if let Some(azimuth) = q.azimuth {
            check_range("azimuth", azimuth, 0.0, 360.0)?;
        }
        if let Some(rate) = q.electricity_rate.filter(|r| !(r.is_finite() && *r >= 0.0)) {
            return Err(ApiError::Validation(format!(
                "electricity_rate must be 0 or greater, got {rate}"
            )));
        }
        Ok(SimulationRequest {
            lat: q.lat,
            lon: q.lon,
            capacity_kw: q.panel_capacity_kw,
            tilt: q.tilt,
            azimuth: q.azimuth,
            electricity_rate: q.electricity_rate,
        })
    }
}

/// GET /api/simulate
/// Estimate a year of PV yield for a site
///
/// Fetches the last complete calendar year of daily climate data and the site
/// elevation, then returns monthly and annual energy plus a loss breakdown.
#[utoipa::path(
    get,
    path = "/api/simulate",
    params(SimulateQuery),
    responses(
        (status = 200, description = "Simulation result", body = SimulationResponse),
        (status = 422, description = "Parameter out of range"),
        (status = 502, description = "Climate archive unavailable")
    )
)]
pub async fn simulate(
    State(state): State<AppState>,
    query: Result<Query<SimulateQuery>, QueryRejection>,
) -> Result<Json<SimulationResponse>, ApiError> {
    let Query(q) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let req = SimulationRequest::try_from(q)?;
    let today = chrono::Utc::now().date_naive();
    let resp = simulation_service::run_simulation(&state.climate, &state.engine, &req, today).await?;
    Ok(Json(resp))
}

/// GET /api/analyze
/// Annual climate means for a site
///
/// Returns the mean daily temperature and radiation of the last complete
/// calendar year, with the temperature corrected for site elevation.
#[utoipa::path(
    get,
    path = "/api/analyze",
    params(AnalyzeQuery),
    responses(
        (status = 200, description = "Climate summary", body = AnalyzeResponse),
        (status = 422, description = "Parameter out of range"),
        (status = 502, description = "Climate archive unavailable")
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Query(q) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    check_location(q.lat, q.lon)?;
    let today = chrono::Utc::now().date_naive();
    let resp = simulation_service::run_analysis(&state.climate, &state.engine, q.lat, q.lon, today).await?;
    Ok(Json(resp))
}

/// GET /api
/// Usage hint
#[utoipa::path(
    get,
    path = "/api",
    responses(
        (status = 200, description = "Usage hint", body = UsageInfo)
    )
)]
pub async fn usage() -> Json<UsageInfo> {
    Json(UsageInfo {
        message: "Solar Yield Simulation API".to_string(),
        usage: "GET /api/simulate?lat=35.68&lon=139.69&panel_capacity_kw=5".to_string(),
    })
}
