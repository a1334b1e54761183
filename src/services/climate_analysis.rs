use crate::models::climate::ClimateSummary;
use crate::models::simulation::{DailyObservation, EngineConstants, Reading};
use crate::services::yield_engine::correct_for_elevation;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn mean_present(values: impl Iterator<Item = Reading>) -> Option<f64> {
    let (sum, n) = values
        .filter_map(Reading::value)
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Annual means of the raw series plus the elevation-corrected temperature.
pub fn summarize_climate(
    observations: &[DailyObservation],
    elevation_m: f64,
    constants: &EngineConstants,
) -> ClimateSummary {
    let lapse = constants.lapse_rate_c_per_100m;

    let avg_temperature_c = mean_present(observations.iter().map(|o| o.temperature_c)).map(round2);
    let avg_radiation_mj_m2 = mean_present(observations.iter().map(|o| o.irradiance_mj_m2)).map(round2);

    let corrected_avg_temperature_c = correct_for_elevation(&[Reading::from(avg_temperature_c)], elevation_m, lapse)
        .first()
        .and_then(|r| r.value())
        .map(round2);

    let correction_applied_c = if elevation_m == 0.0 {
        0.0
    } else {
        round2(-elevation_m / 100.0 * lapse)
    };

    ClimateSummary {
        avg_temperature_c,
        avg_radiation_mj_m2,
        corrected_avg_temperature_c,
        correction_applied_c,
        method: format!("-{}°C per 100m elevation", lapse),
    }
}
