use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Daily inputs ────────────────────────────────────────────────────────────

/// A single daily measurement that the climate provider may have left out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Reading {
    Present(f64),
    #[default]
    Absent,
}

impl Reading {
    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Present(v) => Some(v),
            Reading::Absent => None,
        }
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Reading {
        match self {
            Reading::Present(v) => Reading::Present(f(v)),
            Reading::Absent => Reading::Absent,
        }
    }
}

impl From<Option<f64>> for Reading {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => Reading::Present(v),
            None => Reading::Absent,
        }
    }
}

impl From<Reading> for Option<f64> {
    fn from(r: Reading) -> Self {
        r.value()
    }
}

/// One day of the climate series as delivered by the archive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub temperature_c: Reading,
    pub irradiance_mj_m2: Reading,
}

// ─── Site / system parameters ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteParameters {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SystemParameters {
    pub capacity_kw: f64,
    #[serde(rename = "tilt")]
    pub tilt_deg: f64,
    #[serde(rename = "azimuth")]
    pub azimuth_deg: f64,
}

impl SystemParameters {
    /// Fills in the hemisphere-dependent defaults: tilt = |latitude|,
    /// azimuth facing the equator (180° north, 0° south).
    pub fn resolve(latitude: f64, capacity_kw: f64, tilt: Option<f64>, azimuth: Option<f64>) -> Self {
        let default_azimuth = if latitude >= 0.0 { 180.0 } else { 0.0 };
        Self {
            capacity_kw,
            tilt_deg: tilt.unwrap_or(latitude.abs()),
            azimuth_deg: azimuth.unwrap_or(default_azimuth),
        }
    }
}

// ─── Engine constants ────────────────────────────────────────────────────────

/// Fractional efficiency retained after each loss (not the loss itself).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LossCoefficients {
    pub soiling: f64,
    pub wiring: f64,
    pub inverter: f64,
}

impl LossCoefficients {
    pub fn combined(&self) -> f64 {
        self.soiling * self.wiring * self.inverter
    }
}

impl Default for LossCoefficients {
    fn default() -> Self {
        Self {
            soiling: 0.95,
            wiring: 0.97,
            inverter: 0.96,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConstants {
    /// Ambient cooling per 100 m of elevation (°C)
    pub lapse_rate_c_per_100m: f64,
    /// MJ/m² → kWh/m²
    pub mj_to_kwh: f64,
    /// Cell temperature rise above ambient (°C)
    pub noct_offset_c: f64,
    /// Power temperature coefficient (1/°C), c-Si
    pub temp_coeff_per_c: f64,
    /// Standard test condition cell temperature (°C)
    pub stc_temp_c: f64,
    pub losses: LossCoefficients,
}

impl Default for EngineConstants {
    fn default() -> Self {
        Self {
            lapse_rate_c_per_100m: 0.6,
            mj_to_kwh: 0.2778,
            noct_offset_c: 25.0,
            temp_coeff_per_c: -0.004,
            stc_temp_c: 25.0,
            losses: LossCoefficients::default(),
        }
    }
}

// ─── Engine outputs ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub energy_kwh: f64,
    pub temp_derate_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct MonthlyAggregate {
    /// Calendar month, 1..=12
    pub month: u32,
    pub total_kwh: f64,
    pub avg_daily_kwh: f64,
    /// Valid days observed, or the calendar length when none were
    pub days: u32,
    pub avg_temp_c: f64,
    pub avg_radiation_kwh_m2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct AnnualSummary {
    pub total_kwh: f64,
    pub avg_daily_kwh: f64,
    pub capacity_factor: f64,
    /// Only present when an electricity rate was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_savings: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LossBreakdown {
    #[serde(rename = "soiling_loss")]
    pub soiling_loss_pct: f64,
    #[serde(rename = "wiring_loss")]
    pub wiring_loss_pct: f64,
    #[serde(rename = "inverter_loss")]
    pub inverter_loss_pct: f64,
    /// Negative when cool cells boosted yield on average
    #[serde(rename = "temp_loss_avg")]
    pub temp_loss_avg_pct: f64,
    #[serde(rename = "total_system_efficiency")]
    pub total_system_efficiency_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub monthly: [MonthlyAggregate; 12],
    pub annual: AnnualSummary,
    pub loss_breakdown: LossBreakdown,
    pub mean_temp_derate: f64,
}

// ─── REST API response types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct SimulationLocation {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SimulationResponse {
    pub location: SimulationLocation,
    pub elevation_m: f64,
    pub system: SystemParameters,
    pub annual: AnnualSummary,
    pub monthly: Vec<MonthlyAggregate>,
    pub loss_breakdown: LossBreakdown,
}
