use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use tracing::debug;

use crate::config::ClimateConfig;
use crate::error::ClimateError;
use crate::models::climate::{ArchiveResponse, ElevationResponse};
use crate::models::simulation::DailyObservation;

const ARCHIVE: &str = "climate archive";
const ELEVATION: &str = "elevation service";

/// HTTP client for the Open-Meteo archive and Open-Elevation lookups.
#[derive(Clone, Debug)]
pub struct ClimateClient {
    http: Client,
    archive_url: String,
    elevation_url: String,
}

impl ClimateClient {
    pub fn new(cfg: &ClimateConfig) -> Result<Self, ClimateError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(ClimateError::Client)?;
        Ok(Self {
            http,
            archive_url: cfg.archive_url.clone(),
            elevation_url: cfg.elevation_url.clone(),
        })
    }

    /// Daily mean temperature and shortwave radiation sum for `[start, end]`.
    pub async fn fetch_daily_series(
        &self,
        lat: f64,
        lon: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyObservation>, ClimateError> {
        debug!(lat, lon, %start, %end, "fetching daily climate series");

        let resp = self
            .http
            .get(&self.archive_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
                ("daily", "temperature_2m_mean,shortwave_radiation_sum".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| ClimateError::Http { service: ARCHIVE, source })?;

        let body: ArchiveResponse = resp
            .json()
            .await
            .map_err(|source| ClimateError::Http { service: ARCHIVE, source })?;

        into_observations(body)
    }

    /// Site elevation in metres.
    pub async fn fetch_elevation(&self, lat: f64, lon: f64) -> Result<f64, ClimateError> {
        let resp = self
            .http
            .get(&self.elevation_url)
            .query(&[("locations", format!("{},{}", lat, lon))])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| ClimateError::Http { service: ELEVATION, source })?;

        let body: ElevationResponse = resp
            .json()
            .await
            .map_err(|source| ClimateError::Http { service: ELEVATION, source })?;

        body.results
            .first()
            .map(|r| r.elevation)
            .ok_or_else(|| ClimateError::BadResponse {
                service: ELEVATION,
                reason: "empty results".to_string(),
            })
    }
}

/// Zips the archive's parallel arrays into one observation per day.
fn into_observations(body: ArchiveResponse) -> Result<Vec<DailyObservation>, ClimateError> {
    let daily = body.daily;
    if daily.time.is_empty() {
        return Err(ClimateError::EmptySeries);
    }
    let n = daily.time.len();
    if daily.temperature_2m_mean.len() != n || daily.shortwave_radiation_sum.len() != n {
        return Err(ClimateError::BadResponse {
            service: ARCHIVE,
            reason: format!(
                "{} dates but {} temperatures and {} radiation values",
                n,
                daily.temperature_2m_mean.len(),
                daily.shortwave_radiation_sum.len()
            ),
        });
    }

    daily
        .time
        .into_iter()
        .zip(daily.temperature_2m_mean)
        .zip(daily.shortwave_radiation_sum)
        .map(|((time, temperature_c), irradiance_mj_m2)| {
            let date = NaiveDate::parse_from_str(&time, "%Y-%m-%d")
                .map_err(|_| ClimateError::BadDate(time))?;
            Ok(DailyObservation {
                date,
                temperature_c,
                irradiance_mj_m2,
            })
        })
        .collect()
}

/// Jan 1 – Dec 31 of the last calendar year that has fully elapsed.
pub fn last_complete_year(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year = today.year() - 1;
    // Both dates exist in every year
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::simulation::Reading;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ClimateClient {
        ClimateClient::new(&ClimateConfig {
            archive_url: format!("{}/v1/archive", server.uri()),
            elevation_url: format!("{}/api/v1/lookup", server.uri()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_last_complete_year() {
        let (start, end) = last_complete_year(d(2025, 3, 14));
        assert_eq!(start, d(2024, 1, 1));
        assert_eq!(end, d(2024, 12, 31));
    }

    #[tokio::test]
    async fn test_daily_series_with_gaps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .and(query_param("start_date", "2024-01-01"))
            .and(query_param("daily", "temperature_2m_mean,shortwave_radiation_sum"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2024-01-01", "2024-01-02", "2024-01-03"],
                    "temperature_2m_mean": [5.2, null, 4.0],
                    "shortwave_radiation_sum": [8.1, 7.5, null]
                }
            })))
            .mount(&server)
            .await;

        let series = client_for(&server)
            .fetch_daily_series(35.68, 139.69, d(2024, 1, 1), d(2024, 1, 3))
            .await
            .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].temperature_c, Reading::Present(5.2));
        assert_eq!(series[1].temperature_c, Reading::Absent);
        assert_eq!(series[1].irradiance_mj_m2, Reading::Present(7.5));
        assert_eq!(series[2].irradiance_mj_m2, Reading::Absent);
        assert_eq!(series[2].date, d(2024, 1, 3));
    }

    #[tokio::test]
    async fn test_mismatched_arrays_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2024-01-01", "2024-01-02"],
                    "temperature_2m_mean": [5.2],
                    "shortwave_radiation_sum": [8.1, 7.5]
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_daily_series(0.0, 0.0, d(2024, 1, 1), d(2024, 1, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::BadResponse { .. }));
    }

    #[tokio::test]
    async fn test_empty_series_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": { "time": [], "temperature_2m_mean": [], "shortwave_radiation_sum": [] }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_daily_series(0.0, 0.0, d(2024, 1, 1), d(2024, 12, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::EmptySeries));
    }

    #[tokio::test]
    async fn test_archive_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_daily_series(0.0, 0.0, d(2024, 1, 1), d(2024, 12, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::Http { service: ARCHIVE, .. }));
    }

    #[tokio::test]
    async fn test_elevation_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/lookup"))
            .and(query_param("locations", "35.68,139.69"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "latitude": 35.68, "longitude": 139.69, "elevation": 40.0 }]
            })))
            .mount(&server)
            .await;

        let elevation = client_for(&server).fetch_elevation(35.68, 139.69).await.unwrap();
        assert_eq!(elevation, 40.0);
    }

    #[tokio::test]
    async fn test_elevation_empty_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_elevation(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, ClimateError::BadResponse { service: ELEVATION, .. }));
    }
}
