use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::ClimateError;
use crate::models::climate::{AnalyzeLocation, AnalyzeResponse, CorrectedClimate, RawClimate};
use crate::models::simulation::{
    EngineConstants, SimulationLocation, SimulationResponse, SiteParameters, SystemParameters,
};
use crate::services::climate_analysis::summarize_climate;
use crate::services::climate_service::{last_complete_year, ClimateClient};
use crate::services::yield_engine;

/// A validated simulation request. Optional fields fall back to the
/// hemisphere defaults of [`SystemParameters::resolve`].
#[derive(Debug, Clone, Copy)]
pub struct SimulationRequest {
    pub lat: f64,
    pub lon: f64,
    pub capacity_kw: f64,
    pub tilt: Option<f64>,
    pub azimuth: Option<f64>,
    pub electricity_rate: Option<f64>,
}

/// A failed elevation lookup is not fatal: the site is treated as sea level.
/// Sites below sea level are also treated as 0 m, since the lapse-rate
/// correction only cools with altitude.
fn elevation_or_sea_level(result: Result<f64, ClimateError>, lat: f64, lon: f64) -> f64 {
    match result {
        Ok(e) if e < 0.0 => {
            debug!(lat, lon, elevation_m = e, "site below sea level, clamping to 0 m");
            0.0
        }
        Ok(e) => e,
        Err(e) => {
            warn!(lat, lon, error = %e, "elevation lookup failed, assuming 0 m");
            0.0
        }
    }
}

pub async fn run_simulation(
    client: &ClimateClient,
    constants: &EngineConstants,
    req: &SimulationRequest,
    today: NaiveDate,
) -> Result<SimulationResponse, ClimateError> {
    let (start, end) = last_complete_year(today);

    let (series, elevation) = tokio::join!(
        client.fetch_daily_series(req.lat, req.lon, start, end),
        client.fetch_elevation(req.lat, req.lon),
    );
    let series = series?;
    let elevation_m = elevation_or_sea_level(elevation, req.lat, req.lon);

    let site = SiteParameters {
        latitude: req.lat,
        longitude: req.lon,
        elevation_m,
    };
    let system = SystemParameters::resolve(req.lat, req.capacity_kw, req.tilt, req.azimuth);

    let outcome = yield_engine::simulate(&series, &site, &system, req.electricity_rate, constants);

    info!(
        lat = req.lat,
        lon = req.lon,
        elevation_m,
        capacity_kw = system.capacity_kw,
        tilt = system.tilt_deg,
        days = series.len(),
        total_kwh = outcome.annual.total_kwh,
        capacity_factor = outcome.annual.capacity_factor,
        mean_temp_derate = outcome.mean_temp_derate,
        "simulation complete"
    );

    Ok(SimulationResponse {
        location: SimulationLocation {
            lat: req.lat,
            lon: req.lon,
        },
        elevation_m,
        system,
        annual: outcome.annual,
        monthly: outcome.monthly.to_vec(),
        loss_breakdown: outcome.loss_breakdown,
    })
}

pub async fn run_analysis(
    client: &ClimateClient,
    constants: &EngineConstants,
    lat: f64,
    lon: f64,
    today: NaiveDate,
) -> Result<AnalyzeResponse, ClimateError> {
    let (start, end) = last_complete_year(today);

    let (series, elevation) = tokio::join!(
        client.fetch_daily_series(lat, lon, start, end),
        client.fetch_elevation(lat, lon),
    );
    let series = series?;
    let elevation_m = elevation_or_sea_level(elevation, lat, lon);

    let summary = summarize_climate(&series, elevation_m, constants);
    info!(lat, lon, elevation_m, avg_temperature_c = ?summary.avg_temperature_c, "climate analysis complete");

    Ok(AnalyzeResponse {
        location: AnalyzeLocation {
            latitude: lat,
            longitude: lon,
        },
        elevation_m,
        raw: RawClimate {
            avg_temperature_c: summary.avg_temperature_c,
            avg_radiation_mj_m2: summary.avg_radiation_mj_m2,
        },
        corrected: CorrectedClimate {
            avg_temperature_c: summary.corrected_avg_temperature_c,
            correction_applied_c: summary.correction_applied_c,
            method: summary.method,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClimateConfig;
    use chrono::Datelike;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Mounts a full 2024 archive with constant readings.
    async fn mount_archive(server: &MockServer, temp: f64, rad: f64) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let days: Vec<String> = start
            .iter_days()
            .take_while(|d| d.year() == 2024)
            .map(|d| d.to_string())
            .collect();
        let n = days.len();
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": days,
                    "temperature_2m_mean": vec![temp; n],
                    "shortwave_radiation_sum": vec![rad; n],
                }
            })))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> ClimateClient {
        ClimateClient::new(&ClimateConfig {
            archive_url: format!("{}/v1/archive", server.uri()),
            elevation_url: format!("{}/api/v1/lookup", server.uri()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn request(electricity_rate: Option<f64>) -> SimulationRequest {
        SimulationRequest {
            lat: 35.68,
            lon: 139.69,
            capacity_kw: 5.0,
            tilt: None,
            azimuth: None,
            electricity_rate,
        }
    }

    #[tokio::test]
    async fn test_simulation_end_to_end() {
        let server = MockServer::start().await;
        mount_archive(&server, 16.0, 14.0).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "elevation": 100.0 }]
            })))
            .mount(&server)
            .await;

        let resp = run_simulation(&client_for(&server), &EngineConstants::default(), &request(Some(30.0)), today())
            .await
            .unwrap();

        assert_eq!(resp.elevation_m, 100.0);
        assert_eq!(resp.system.tilt_deg, 35.68);
        assert_eq!(resp.system.azimuth_deg, 180.0);
        assert_eq!(resp.monthly.len(), 12);
        assert_eq!(resp.monthly[1].days, 29);
        let days: u32 = resp.monthly.iter().map(|m| m.days).sum();
        assert_eq!(days, 366);
        assert!(resp.annual.total_kwh > 0.0);
        assert!(resp.annual.capacity_factor > 0.0 && resp.annual.capacity_factor < 1.0);
        let savings = resp.annual.estimated_savings.unwrap();
        assert!((savings - resp.annual.total_kwh * 30.0).abs() < 1e-6);

        // 15.4 °C corrected ambient → 40.4 °C cell
        assert!((resp.monthly[0].avg_temp_c - 15.4).abs() < 1e-9);
        let expected_temp_loss = 0.004 * 15.4 * 100.0;
        assert!((resp.loss_breakdown.temp_loss_avg_pct - expected_temp_loss).abs() < 1e-6);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["location"]["lat"], 35.68);
        assert_eq!(json["system"]["capacity_kw"], 5.0);
        assert!(json["annual"]["estimated_savings"].is_number());
        assert!(json["loss_breakdown"]["soiling_loss"].is_number());
    }

    #[tokio::test]
    async fn test_elevation_failure_falls_back_to_sea_level() {
        let server = MockServer::start().await;
        mount_archive(&server, 10.0, 12.0).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/lookup"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let resp = run_simulation(&client_for(&server), &EngineConstants::default(), &request(None), today())
            .await
            .unwrap();
        assert_eq!(resp.elevation_m, 0.0);
        assert!(resp.annual.estimated_savings.is_none());
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["annual"].get("estimated_savings").is_none());
    }

    #[tokio::test]
    async fn test_below_sea_level_is_clamped() {
        let server = MockServer::start().await;
        mount_archive(&server, 20.0, 12.0).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "elevation": -430.0 }]
            })))
            .mount(&server)
            .await;

        let resp = run_simulation(&client_for(&server), &EngineConstants::default(), &request(None), today())
            .await
            .unwrap();
        assert_eq!(resp.elevation_m, 0.0);
        assert!((resp.monthly[0].avg_temp_c - 20.0).abs() < 1e-9, "got {}", resp.monthly[0].avg_temp_c);

        let analysis = run_analysis(&client_for(&server), &EngineConstants::default(), 31.5, 35.5, today())
            .await
            .unwrap();
        assert_eq!(analysis.elevation_m, 0.0);
        assert_eq!(analysis.corrected.avg_temperature_c, Some(20.0));
        assert_eq!(analysis.corrected.correction_applied_c, 0.0);
    }

    #[test]
    fn test_elevation_fallbacks() {
        assert_eq!(elevation_or_sea_level(Ok(250.0), 0.0, 0.0), 250.0);
        assert_eq!(elevation_or_sea_level(Ok(-12.5), 0.0, 0.0), 0.0);
        assert_eq!(elevation_or_sea_level(Err(ClimateError::EmptySeries), 0.0, 0.0), 0.0);
    }

    #[tokio::test]
    async fn test_archive_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "elevation": 10.0 }]
            })))
            .mount(&server)
            .await;

        let result = run_simulation(&client_for(&server), &EngineConstants::default(), &request(None), today()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_analysis() {
        let server = MockServer::start().await;
        mount_archive(&server, 20.0, 15.0).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "elevation": 1000.0 }]
            })))
            .mount(&server)
            .await;

        let resp = run_analysis(&client_for(&server), &EngineConstants::default(), 46.5, 8.0, today())
            .await
            .unwrap();
        assert_eq!(resp.raw.avg_temperature_c, Some(20.0));
        assert_eq!(resp.raw.avg_radiation_mj_m2, Some(15.0));
        assert_eq!(resp.corrected.avg_temperature_c, Some(14.0));
        assert_eq!(resp.corrected.correction_applied_c, -6.0);
    }
}
