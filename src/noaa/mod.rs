//! NOAA weather.gov API boundary
//!
//! The [`WeatherGovApi`] trait is the seam between the pressure engine and the
//! network. [`NoaaClient`] talks to api.weather.gov; tests plug in fixtures.
//!
//! List payloads keep their entries as raw JSON so a single malformed entry
//! can be dropped without losing the rest of the document.

pub mod client;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::models::Location;

pub use client::NoaaClient;

/// Upstream calls the pressure engine depends on
#[async_trait]
pub trait WeatherGovApi: Send + Sync {
    /// `GET /points/{lat},{lon}`
    async fn point(&self, location: Location) -> Result<PointResponse>;

    /// `GET {observationStations}`
    async fn stations(&self, url: &str) -> Result<StationCollection>;

    /// `GET {forecastGridData}`
    async fn gridpoint_data(&self, url: &str) -> Result<GridpointResponse>;

    /// `GET /stations/{id}/observations?start=..&end=..`
    async fn observations(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ObservationCollection>;
}

/// Response from `/points/{lat},{lon}`
#[derive(Debug, Default, Deserialize)]
pub struct PointResponse {
    #[serde(default)]
    pub properties: PointProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointProperties {
    #[serde(default)]
    pub grid_id: Option<String>,
    #[serde(default)]
    pub grid_x: Option<i64>,
    #[serde(default)]
    pub grid_y: Option<i64>,
    #[serde(default)]
    pub forecast_grid_data: Option<String>,
    #[serde(default)]
    pub observation_stations: Option<String>,
}

/// Station list response
#[derive(Debug, Default, Deserialize)]
pub struct StationCollection {
    #[serde(default)]
    pub features: Vec<StationFeature>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StationFeature {
    #[serde(default)]
    pub properties: StationProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationProperties {
    #[serde(default)]
    pub station_identifier: Option<String>,
}

/// Raw gridpoint forecast data from `/gridpoints/{wfo}/{x},{y}`
#[derive(Debug, Default, Deserialize)]
pub struct GridpointResponse {
    #[serde(default)]
    pub properties: GridpointProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct GridpointProperties {
    #[serde(default)]
    pub pressure: Option<GridpointLayer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GridpointLayer {
    #[serde(default)]
    pub uom: Option<String>,
    /// Raw `{ validTime, value }` entries
    #[serde(default)]
    pub values: Vec<Value>,
}

/// One `{ validTime, value }` entry of a gridpoint layer
#[derive(Debug, Deserialize)]
pub struct GridpointValue {
    #[serde(rename = "validTime")]
    pub valid_time: String,
    pub value: Option<f64>,
}

/// Station observation history
#[derive(Debug, Default, Deserialize)]
pub struct ObservationCollection {
    /// Raw observation features
    #[serde(default)]
    pub features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ObservationFeature {
    pub properties: ObservationProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationProperties {
    pub timestamp: String,
    #[serde(default)]
    pub barometric_pressure: Option<QuantitativeValue>,
    #[serde(default)]
    pub sea_level_pressure: Option<QuantitativeValue>,
}

/// NOAA quantitative value with its unit and quality-control code
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeValue {
    #[serde(default)]
    pub unit_code: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub quality_control: Option<String>,
}
