use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::simulation::Reading;

// ─── Open-Meteo archive wire types ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ArchiveResponse {
    pub daily: ArchiveDaily,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveDaily {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_mean: Vec<Reading>,
    #[serde(default)]
    pub shortwave_radiation_sum: Vec<Reading>,
}

// ─── Open-Elevation wire types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ElevationResponse {
    pub results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
pub struct ElevationResult {
    pub elevation: f64,
}

// ─── Climate analysis ────────────────────────────────────────────────────────

/// Annual climate means for a site, before and after elevation correction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateSummary {
    pub avg_temperature_c: Option<f64>,
    pub avg_radiation_mj_m2: Option<f64>,
    pub corrected_avg_temperature_c: Option<f64>,
    pub correction_applied_c: f64,
    pub method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RawClimate {
    pub avg_temperature_c: Option<f64>,
    pub avg_radiation_mj_m2: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CorrectedClimate {
    pub avg_temperature_c: Option<f64>,
    pub correction_applied_c: f64,
    pub method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub location: AnalyzeLocation,
    pub elevation_m: f64,
    pub raw: RawClimate,
    pub corrected: CorrectedClimate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsageInfo {
    pub message: String,
    pub usage: String,
}
