//! End-to-end surface pressure queries against recorded NOAA responses

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use zeus_pressure::models::{PressureKind, SampleOrigin};
use zeus_pressure::noaa::{GridpointResponse, ObservationCollection, PointResponse, StationCollection};
use zeus_pressure::pressure::StationListSource;
use zeus_pressure::{
    Location, PressureConfig, PressureError, PressureQuery, Provenance, Result, SurfacePressureService,
    WeatherGovApi,
};

const POINTS: &str = include_str!("fixtures/points_okx.json");
const STATIONS: &str = include_str!("fixtures/stations_okx.json");
const GRIDPOINT: &str = include_str!("fixtures/gridpoint_okx.json");
const GRIDPOINT_NO_PRESSURE: &str = include_str!("fixtures/gridpoint_no_pressure.json");
const OBSERVATIONS_KNYC: &str = include_str!("fixtures/observations_knyc.json");
const OBSERVATIONS_KLGA: &str = include_str!("fixtures/observations_klga.json");

/// Canned upstream response: a JSON body or a failing status
#[derive(Clone)]
enum Reply {
    Body(Value),
    Status(u16),
}

impl Reply {
    fn fixture(raw: &str) -> Self {
        Self::Body(serde_json::from_str(raw).unwrap())
    }

    fn decode<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        match self {
            Self::Body(body) => serde_json::from_value(body.clone())
                .map_err(|e| PressureError::http(url, Some(200), format!("JSON parse error: {e}"))),
            Self::Status(status) => Err(PressureError::http(
                url,
                Some(*status),
                format!("NOAA returned {status}"),
            )),
        }
    }
}

/// Upstream served from fixtures, recording every call
struct FixtureApi {
    point: Reply,
    stations: Reply,
    gridpoint: Reply,
    observations: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl FixtureApi {
    fn new() -> Self {
        let observations = HashMap::from([
            ("KNYC".to_string(), Reply::fixture(OBSERVATIONS_KNYC)),
            ("KLGA".to_string(), Reply::fixture(OBSERVATIONS_KLGA)),
        ]);
        Self {
            point: Reply::fixture(POINTS),
            stations: Reply::fixture(STATIONS),
            gridpoint: Reply::fixture(GRIDPOINT),
            observations,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_point(mut self, reply: Reply) -> Self {
        self.point = reply;
        self
    }

    fn with_stations(mut self, reply: Reply) -> Self {
        self.stations = reply;
        self
    }

    fn with_gridpoint(mut self, reply: Reply) -> Self {
        self.gridpoint = reply;
        self
    }

    fn with_observations(mut self, station: &str, reply: Reply) -> Self {
        self.observations.insert(station.to_string(), reply);
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn observation_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix("observations ").map(ToString::to_string))
            .collect()
    }
}

#[async_trait]
impl WeatherGovApi for FixtureApi {
    async fn point(&self, location: Location) -> Result<PointResponse> {
        self.record(format!("point {},{}", location.latitude, location.longitude));
        self.point.decode("points")
    }

    async fn stations(&self, url: &str) -> Result<StationCollection> {
        self.record(format!("stations {url}"));
        self.stations.decode(url)
    }

    async fn gridpoint_data(&self, url: &str) -> Result<GridpointResponse> {
        self.record(format!("gridpoint {url}"));
        self.gridpoint.decode(url)
    }

    async fn observations(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ObservationCollection> {
        self.record(format!(
            "observations {station_id} {} {}",
            start.to_rfc3339(),
            end.to_rfc3339()
        ));
        self.observations
            .get(station_id)
            .cloned()
            .unwrap_or_else(|| Reply::Body(json!({"type": "FeatureCollection", "features": []})))
            .decode(station_id)
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
}

fn service() -> SurfacePressureService {
    SurfacePressureService::new(PressureConfig::default())
}

fn nyc() -> PressureQuery {
    PressureQuery::new(Location::new(40.7128, -74.006))
}

#[tokio::test]
async fn test_full_query_merges_both_sources() {
    let api = FixtureApi::new();
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    assert_eq!(report.forecast_data.len(), 3);
    assert_eq!(report.observation_data.len(), 3);
    assert_eq!(report.combined_timeseries.len(), 5);

    let combined: Vec<(DateTime<Utc>, f64, Provenance)> = report
        .combined_timeseries
        .iter()
        .map(|s| (s.timestamp, s.pressure_pa, s.provenance))
        .collect();
    assert_eq!(
        combined,
        vec![
            (now() - Duration::hours(1), 101_300.0, Provenance::Observation),
            (now() - Duration::minutes(30), 101_290.0, Provenance::Observation),
            (now(), 101_280.0, Provenance::Observation),
            (now() + Duration::hours(1), 101_250.0, Provenance::Forecast),
            (now() + Duration::hours(2), 101_200.0, Provenance::Forecast),
        ]
    );

    let summary = report.summary.unwrap();
    assert_eq!(summary.total_points, 5);
    assert_eq!(summary.observation_points, 3);
    assert_eq!(summary.forecast_points, 2);
    assert_eq!(summary.pressure_stats.min_hpa, 1012.0);
    assert_eq!(summary.pressure_stats.max_hpa, 1013.0);
    assert_eq!(summary.time_range.start, now() - Duration::hours(1));
    assert_eq!(summary.time_range.end, now() + Duration::hours(2));
}

#[tokio::test]
async fn test_observation_takes_precedence_over_forecast() {
    let api = FixtureApi::new();
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    let at_now: Vec<_> = report
        .combined_timeseries
        .iter()
        .filter(|s| s.timestamp == now())
        .collect();
    assert_eq!(at_now.len(), 1);
    assert_eq!(at_now[0].provenance, Provenance::Observation);
    assert_eq!(at_now[0].source_locator(), "KNYC");

    // The forecast sample at the same instant is still reported on its own
    assert!(
        report
            .forecast_data
            .iter()
            .any(|s| s.timestamp == now() && s.pressure_pa == 101_300.0)
    );
}

#[tokio::test]
async fn test_observation_fields_and_measurement_type() {
    let api = FixtureApi::new();
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    let sea_level = report
        .observation_data
        .iter()
        .find(|s| s.timestamp == now() - Duration::hours(1))
        .unwrap();
    assert_eq!(
        sea_level.origin,
        SampleOrigin::Observation {
            station: "KNYC".to_string(),
            quality: "C".to_string(),
            pressure_type: PressureKind::SeaLevel,
        }
    );

    let json = serde_json::to_value(sea_level).unwrap();
    assert_eq!(json["source"], "observation");
    assert_eq!(json["pressure_hpa"], 1013.0);
    assert_eq!(json["pressure_inhg"], 29.914);
    assert_eq!(json["pressure_type"], "sea_level");
}

#[tokio::test]
async fn test_rejected_quality_flags_never_appear() {
    let api = FixtureApi::new();
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    for sample in &report.observation_data {
        match &sample.origin {
            SampleOrigin::Observation { quality, .. } => {
                assert!(["V", "C", "S"].contains(&quality.as_str()), "quality {quality}");
            }
            other => panic!("observation with forecast origin: {other:?}"),
        }
    }
    assert!(
        report
            .observation_data
            .iter()
            .all(|s| s.pressure_pa != 101_320.0 && s.pressure_pa != 101_310.0)
    );
}

#[tokio::test]
async fn test_priority_stations_are_ranked_first() {
    let api = FixtureApi::new();
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    let stations: Vec<&str> = report
        .metadata
        .grid
        .stations
        .iter()
        .map(|s| s.as_str())
        .collect();
    assert_eq!(stations, vec!["KLGA", "KNYC", "KXYZ", "KABC", "KDEF"]);
    assert_eq!(report.metadata.grid.station_source, StationListSource::Upstream);
}

#[tokio::test]
async fn test_at_most_three_stations_are_queried() {
    let api = FixtureApi::new();
    service().query_with(&api, &nyc(), now()).await.unwrap();

    let queried: Vec<String> = api
        .observation_calls()
        .iter()
        .filter_map(|call| call.split_whitespace().next().map(ToString::to_string))
        .collect();
    assert_eq!(queried, vec!["KLGA", "KNYC", "KXYZ"]);
}

#[tokio::test]
async fn test_observation_window_uses_short_lookahead() {
    let api = FixtureApi::new();
    service().query_with(&api, &nyc(), now()).await.unwrap();

    let calls = api.observation_calls();
    let expected_start = (now() - Duration::hours(24)).to_rfc3339();
    let expected_end = (now() + Duration::hours(1)).to_rfc3339();
    assert!(!calls.is_empty());
    for call in calls {
        assert!(call.ends_with(&format!("{expected_start} {expected_end}")), "{call}");
    }
}

#[tokio::test]
async fn test_failing_stations_yield_empty_observations() {
    let api = FixtureApi::new()
        .with_observations("KLGA", Reply::Status(500))
        .with_observations("KNYC", Reply::Status(500))
        .with_observations("KXYZ", Reply::Status(500));
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    assert!(report.observation_data.is_empty());
    assert_eq!(report.forecast_data.len(), 3);
    assert!(
        report
            .combined_timeseries
            .iter()
            .all(|s| s.provenance == Provenance::Forecast)
    );
    assert_eq!(api.observation_calls().len(), 3);
}

#[tokio::test]
async fn test_one_failing_station_does_not_affect_others() {
    let api = FixtureApi::new().with_observations("KLGA", Reply::Status(503));
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    assert_eq!(report.observation_data.len(), 2);
    assert!(report.observation_data.iter().all(|s| s.source_locator() == "KNYC"));
}

#[tokio::test]
async fn test_forecast_without_pressure_layer() {
    let api = FixtureApi::new().with_gridpoint(Reply::fixture(GRIDPOINT_NO_PRESSURE));
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    assert!(report.forecast_data.is_empty());
    assert_eq!(report.observation_data.len(), 3);
}

#[tokio::test]
async fn test_forecast_endpoint_failure_is_recovered() {
    let api = FixtureApi::new().with_gridpoint(Reply::Status(500));
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    assert!(report.forecast_data.is_empty());
    assert_eq!(report.combined_timeseries.len(), 3);
}

#[tokio::test]
async fn test_point_lookup_failure_aborts_query() {
    let api = FixtureApi::new().with_point(Reply::Status(404));
    let err = service().query_with(&api, &nyc(), now()).await.unwrap_err();

    assert!(matches!(err, PressureError::PressureQueryFailed { .. }));
    assert!(matches!(
        err.root_cause(),
        PressureError::UpstreamUnavailable {
            status: Some(404),
            ..
        }
    ));
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn test_incomplete_grid_data_aborts_query() {
    let api = FixtureApi::new().with_point(Reply::Body(json!({
        "properties": {"gridId": "OKX", "gridY": 35}
    })));
    let err = service().query_with(&api, &nyc(), now()).await.unwrap_err();

    assert!(matches!(
        err.root_cause(),
        PressureError::IncompleteGridData { field: "gridX" }
    ));
}

#[tokio::test]
async fn test_station_list_failure_uses_fallback_stations() {
    let api = FixtureApi::new().with_stations(Reply::Status(500));
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    let stations: Vec<&str> = report
        .metadata
        .grid
        .stations
        .iter()
        .map(|s| s.as_str())
        .collect();
    assert_eq!(stations, vec!["KNYC", "KLGA", "KEWR"]);
    assert_eq!(report.metadata.grid.station_source, StationListSource::Fallback);
    assert_eq!(report.observation_data.len(), 3);
}

#[tokio::test]
async fn test_missing_station_url_uses_fallback_stations() {
    let api = FixtureApi::new().with_point(Reply::Body(json!({
        "properties": {
            "gridId": "OKX",
            "gridX": 33,
            "gridY": 35,
            "forecastGridData": "https://api.weather.gov/gridpoints/OKX/33,35"
        }
    })));
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();

    assert_eq!(report.metadata.grid.station_source, StationListSource::Fallback);
    assert!(!api.calls().iter().any(|call| call.starts_with("stations ")));
}

#[tokio::test]
async fn test_forecast_only_query() {
    let api = FixtureApi::new();
    let query = nyc().with_sources(true, false);
    let report = service().query_with(&api, &query, now()).await.unwrap();

    assert!(report.observation_data.is_empty());
    assert!(
        report
            .combined_timeseries
            .iter()
            .all(|s| s.provenance == Provenance::Forecast)
    );
    assert!(api.observation_calls().is_empty());
}

#[tokio::test]
async fn test_observation_only_query() {
    let api = FixtureApi::new();
    let query = nyc().with_sources(false, true);
    let report = service().query_with(&api, &query, now()).await.unwrap();

    assert!(report.forecast_data.is_empty());
    assert!(report.combined_timeseries.iter().all(|s| s.is_observation()));
    assert!(!api.calls().iter().any(|call| call.starts_with("gridpoint ")));
}

#[tokio::test]
async fn test_no_sources_gives_empty_envelope() {
    let api = FixtureApi::new();
    let query = nyc().with_sources(false, false);
    let report = service().query_with(&api, &query, now()).await.unwrap();

    assert!(report.combined_timeseries.is_empty());
    assert!(report.summary.is_none());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["summary"].is_null());
}

#[tokio::test]
async fn test_combined_series_is_chronological() {
    let api = FixtureApi::new();
    let query = nyc().with_window(168, 168);
    let report = service().query_with(&api, &query, now()).await.unwrap();

    let timestamps: Vec<_> = report.combined_timeseries.iter().map(|s| s.timestamp).collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    // The 72 h forecast entry is inside a 168 h horizon
    assert_eq!(report.forecast_data.len(), 4);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_envelopes() {
    let first = service().query_with(&FixtureApi::new(), &nyc(), now()).await.unwrap();
    let second = service().query_with(&FixtureApi::new(), &nyc(), now()).await.unwrap();

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn test_envelope_shape() {
    let api = FixtureApi::new();
    let report = service().query_with(&api, &nyc(), now()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["location"], json!({"lat": 40.7128, "lon": -74.006}));
    assert_eq!(
        json["time_range"],
        json!({"hours_back": 24, "hours_forward": 48, "requested_at": "2025-01-15T12:00:00Z"})
    );
    assert_eq!(json["metadata"]["grid"]["gridId"], "OKX");
    assert_eq!(json["metadata"]["grid"]["gridX"], 33);
    assert_eq!(json["metadata"]["grid"]["gridY"], 35);
    assert_eq!(
        json["metadata"]["grid"]["forecast_grid_url"],
        "https://api.weather.gov/gridpoints/OKX/33,35"
    );
    assert_eq!(json["units"]["pressure_inhg"], "inHg");
    assert_eq!(json["forecast_data"][0]["grid_point"], "OKX (33, 35)");
    assert!(json["combined_timeseries"].is_array());
}

#[tokio::test]
async fn test_batch_results_keep_request_order() {
    let api = FixtureApi::new();
    let queries = vec![
        nyc(),
        nyc().with_window(0, 48),
        nyc().with_sources(true, false),
    ];
    let results = service().query_batch_with(&api, &queries, now()).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().combined_timeseries.len(), 5);
    assert!(results[1].as_ref().unwrap_err().is_validation());
    assert!(results[2].as_ref().unwrap().observation_data.is_empty());
}
