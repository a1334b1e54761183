// ============================================================
//  Annual PV Yield Engine
//
//  Pipeline (every step is a pure function of its inputs):
//   1. Elevation correction – lapse-rate cooling of daily means
//   2. Solar geometry       – per-month beam ratio on the tilted
//                             plane (Liu & Jordan, isotropic sky)
//   3. Daily yield          – peak-sun-hours × derate chain
//   4. Monthly aggregation  – fixed 12-slot accumulation, gaps
//                             excluded, calendar fallback for
//                             empty months
//   5. Annual summary       – totals, capacity factor, savings
//   6. Loss breakdown       – per-contributor percentages
// ============================================================

use chrono::Datelike;
use std::f64::consts::PI;
use tracing::{debug, trace};

use crate::models::simulation::{
    AnnualSummary, DailyObservation, DailyResult, EngineConstants, LossBreakdown,
    LossCoefficients, MonthlyAggregate, Reading, SimulationOutcome, SiteParameters,
    SystemParameters,
};

// ─── Constants ───────────────────────────────────────────────
const DEG: f64 = PI / 180.0;
const HOURS_PER_YEAR: f64 = 8760.0;

/// Representative day-of-year for each month.
const MONTH_MIDPOINT_DOY: [f64; 12] = [
    17.0, 47.0, 75.0, 105.0, 135.0, 162.0, 198.0, 228.0, 258.0, 288.0, 318.0, 344.0,
];

/// Calendar month lengths; February is taken from a leap year.
const DAYS_IN_MONTH: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Below this the beam ratio blows up and the correction is skipped.
const MIN_COS_ZENITH: f64 = 0.01;

// Empirical beam / sky-diffuse / ground-reflected shares. They do not sum to
// the plane-of-array total for Rb = 1 and are kept as-is for compatibility.
const BEAM_WEIGHT: f64 = 0.75;
const DIFFUSE_WEIGHT: f64 = 0.20;
const GROUND_WEIGHT: f64 = 0.05;

// ─── 1. Elevation correction ─────────────────────────────────

/// Cools every present temperature by `lapse_rate` °C per 100 m of
/// `elevation_m`. Absent readings stay absent.
pub fn correct_for_elevation(temperatures: &[Reading], elevation_m: f64, lapse_rate: f64) -> Vec<Reading> {
    let delta = (elevation_m / 100.0) * lapse_rate;
    temperatures.iter().map(|t| t.map(|v| v - delta)).collect()
}

// ─── 2. Solar geometry ───────────────────────────────────────

/// Tilt/orientation correction for the representative day of `month`.
///
/// * `lat_deg`  – site latitude (−90 … +90)
/// * `tilt_deg` – panel tilt from horizontal (0 … 90)
/// * `month`    – 1 … 12; out-of-range values are clamped
pub fn tilt_factor(lat_deg: f64, tilt_deg: f64, month: u32) -> f64 {
    let n = MONTH_MIDPOINT_DOY[(month.clamp(1, 12) - 1) as usize];

    // Cooper's declination
    let decl = 23.45 * (360.0 * (284.0 + n) / 365.0 * DEG).sin() * DEG;

    let lat = lat_deg * DEG;
    let tilt = tilt_deg * DEG;

    // Noon incidence on horizontal vs. equator-facing tilted surface
    let cos_zenith = lat.sin() * decl.sin() + lat.cos() * decl.cos();
    let cos_incidence = (lat - tilt).sin() * decl.sin() + (lat - tilt).cos() * decl.cos();

    if cos_zenith <= MIN_COS_ZENITH {
        return 1.0;
    }

    let rb = (cos_incidence / cos_zenith).max(0.0);

    // Isotropic view factors
    let diffuse = (1.0 + tilt.cos()) / 2.0;
    let ground = (1.0 - tilt.cos()) / 2.0;

    rb * BEAM_WEIGHT + diffuse * DIFFUSE_WEIGHT + ground * GROUND_WEIGHT
}

/// The twelve monthly factors for a site, index `month - 1`.
pub fn monthly_tilt_factors(lat_deg: f64, tilt_deg: f64) -> [f64; 12] {
    std::array::from_fn(|i| tilt_factor(lat_deg, tilt_deg, i as u32 + 1))
}

// ─── 3. Daily yield ──────────────────────────────────────────

/// Returns `(energy_kwh, temp_derate)` for one day.
///
/// P = capacity × PSH × K_soiling × K_wiring × K_inverter × K_pt
pub fn daily_energy(
    irradiance_mj_m2: f64,
    temperature_c: f64,
    capacity_kw: f64,
    tilt_factor: f64,
    constants: &EngineConstants,
) -> (f64, f64) {
    let psh = irradiance_mj_m2 * constants.mj_to_kwh * tilt_factor;

    let cell_temp = temperature_c + constants.noct_offset_c;
    let kpt = 1.0 + constants.temp_coeff_per_c * (cell_temp - constants.stc_temp_c);

    let energy_kwh = (capacity_kw * psh * constants.losses.combined() * kpt).max(0.0);
    (energy_kwh, kpt)
}

/// Splits out the two readings of a day that can be simulated; `None` when
/// either is missing.
fn valid_readings(obs: &DailyObservation) -> Option<(f64, f64)> {
    match (obs.temperature_c, obs.irradiance_mj_m2) {
        (Reading::Present(temp), Reading::Present(irr)) => Some((temp, irr)),
        _ => None,
    }
}

// ─── 4. Monthly aggregation ──────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct MonthAccumulator {
    total_kwh: f64,
    days: u32,
    temp_sum: f64,
    irradiance_sum: f64,
}

impl MonthAccumulator {
    const EMPTY: Self = Self {
        total_kwh: 0.0,
        days: 0,
        temp_sum: 0.0,
        irradiance_sum: 0.0,
    };

    fn finish(&self, month: u32, mj_to_kwh: f64) -> MonthlyAggregate {
        if self.days == 0 {
            return MonthlyAggregate {
                month,
                total_kwh: 0.0,
                avg_daily_kwh: 0.0,
                days: DAYS_IN_MONTH[(month - 1) as usize],
                avg_temp_c: 0.0,
                avg_radiation_kwh_m2: 0.0,
            };
        }
        let n = self.days as f64;
        MonthlyAggregate {
            month,
            total_kwh: self.total_kwh,
            avg_daily_kwh: self.total_kwh / n,
            days: self.days,
            avg_temp_c: self.temp_sum / n,
            avg_radiation_kwh_m2: self.irradiance_sum / n * mj_to_kwh,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub months: [MonthlyAggregate; 12],
    /// Mean temperature derate over every valid day of the year; 1.0 if none
    pub mean_temp_derate: f64,
    pub valid_days: usize,
}

/// Buckets the series by calendar month. `observations` must already carry
/// elevation-corrected temperatures.
pub fn aggregate_monthly(
    observations: &[DailyObservation],
    site: &SiteParameters,
    system: &SystemParameters,
    constants: &EngineConstants,
) -> MonthlyReport {
    let factors = monthly_tilt_factors(site.latitude, system.tilt_deg);
    let mut acc = [MonthAccumulator::EMPTY; 12];
    let mut kpt_sum = 0.0;
    let mut valid_days = 0usize;

    for obs in observations {
        let Some((temp, irr)) = valid_readings(obs) else {
            continue;
        };
        let idx = obs.date.month0() as usize;
        let (energy_kwh, temp_derate_factor) =
            daily_energy(irr, temp, system.capacity_kw, factors[idx], constants);
        let day = DailyResult {
            date: obs.date,
            energy_kwh,
            temp_derate_factor,
        };

        trace!(date = %day.date, energy_kwh = day.energy_kwh, kpt = day.temp_derate_factor, "day simulated");

        let slot = &mut acc[idx];
        slot.total_kwh += day.energy_kwh;
        slot.days += 1;
        slot.temp_sum += temp;
        slot.irradiance_sum += irr;

        kpt_sum += day.temp_derate_factor;
        valid_days += 1;
    }

    let months = std::array::from_fn(|i| acc[i].finish(i as u32 + 1, constants.mj_to_kwh));
    let mean_temp_derate = if valid_days > 0 {
        kpt_sum / valid_days as f64
    } else {
        1.0
    };

    debug!(
        valid_days,
        skipped = observations.len() - valid_days,
        mean_temp_derate,
        "monthly aggregation complete"
    );

    MonthlyReport {
        months,
        mean_temp_derate,
        valid_days,
    }
}

// ─── 5. Annual summary ───────────────────────────────────────

pub fn summarize_annual(
    months: &[MonthlyAggregate],
    capacity_kw: f64,
    electricity_rate: Option<f64>,
) -> AnnualSummary {
    let total_kwh: f64 = months.iter().map(|m| m.total_kwh).sum();
    let total_days: u32 = months.iter().map(|m| m.days).sum();

    let avg_daily_kwh = if total_days > 0 {
        total_kwh / total_days as f64
    } else {
        0.0
    };
    let capacity_factor = if capacity_kw > 0.0 {
        total_kwh / (capacity_kw * HOURS_PER_YEAR)
    } else {
        0.0
    };

    AnnualSummary {
        total_kwh,
        avg_daily_kwh,
        capacity_factor,
        estimated_savings: electricity_rate.map(|rate| total_kwh * rate),
    }
}

// ─── 6. Loss breakdown ───────────────────────────────────────

pub fn loss_breakdown(losses: &LossCoefficients, mean_temp_derate: f64) -> LossBreakdown {
    let total_efficiency = losses.combined() * mean_temp_derate;
    LossBreakdown {
        soiling_loss_pct: (1.0 - losses.soiling) * 100.0,
        wiring_loss_pct: (1.0 - losses.wiring) * 100.0,
        inverter_loss_pct: (1.0 - losses.inverter) * 100.0,
        temp_loss_avg_pct: (1.0 - mean_temp_derate) * 100.0,
        total_system_efficiency_pct: total_efficiency * 100.0,
    }
}

// ─── Entry point ─────────────────────────────────────────────

/// Runs the full pipeline over one calendar year of raw observations.
pub fn simulate(
    observations: &[DailyObservation],
    site: &SiteParameters,
    system: &SystemParameters,
    electricity_rate: Option<f64>,
    constants: &EngineConstants,
) -> SimulationOutcome {
    let raw_temps: Vec<Reading> = observations.iter().map(|o| o.temperature_c).collect();
    let corrected = correct_for_elevation(&raw_temps, site.elevation_m, constants.lapse_rate_c_per_100m);

    let corrected_series: Vec<DailyObservation> = observations
        .iter()
        .zip(corrected)
        .map(|(obs, temperature_c)| DailyObservation { temperature_c, ..*obs })
        .collect();

    debug!(
        lat = site.latitude,
        lon = site.longitude,
        elevation_m = site.elevation_m,
        days = observations.len(),
        "simulating yield"
    );

    let report = aggregate_monthly(&corrected_series, site, system, constants);
    let annual = summarize_annual(&report.months, system.capacity_kw, electricity_rate);
    let loss_breakdown = loss_breakdown(&constants.losses, report.mean_temp_derate);

    SimulationOutcome {
        monthly: report.months,
        annual,
        loss_breakdown,
        mean_temp_derate: report.mean_temp_derate,
    }
}
