use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use super::{
    GridpointResponse, ObservationCollection, PointResponse, StationCollection, WeatherGovApi,
};
use crate::config::NoaaConfig;
use crate::models::Location;
use crate::pressure::timestamp::format_query_instant;
use crate::{PressureError, Result};

/// api.weather.gov client. One instance is built per query and dropped with it.
#[derive(Debug, Clone)]
pub struct NoaaClient {
    client: Client,
    base_url: String,
}

impl NoaaClient {
    /// Create a new client with the configured timeout and User-Agent
    pub fn new(config: &NoaaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PressureError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the observations URL for a station and time window
    pub fn observations_url(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Url> {
        let url = format!("{}/stations/{}/observations", self.base_url, station_id);
        Url::parse_with_params(
            &url,
            &[
                ("start", format_query_instant(start)),
                ("end", format_query_instant(end)),
            ],
        )
        .map_err(|e| PressureError::http(url.clone(), None, format!("invalid URL: {e}")))
    }

    /// GET a URL and decode its JSON body; anything but 200 is an error
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let started = Instant::now();
        let url_text = url.to_string();
        debug!("GET {}", url_text);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/geo+json")
            .send()
            .await
            .map_err(|e| PressureError::http(url_text.clone(), None, e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(PressureError::http(
                url_text,
                Some(status.as_u16()),
                format!("NOAA returned {}: {}", status, truncate(&body, 300)),
            ));
        }

        let decoded = response.json::<T>().await.map_err(|e| {
            PressureError::http(url_text.clone(), Some(status.as_u16()), format!("JSON parse error: {e}"))
        })?;

        let elapsed = started.elapsed();
        if elapsed.as_secs() > 5 {
            warn!("Slow NOAA response from {}: {:.3}s", url_text, elapsed.as_secs_f64());
        } else {
            debug!("NOAA response from {} in {:.3}s", url_text, elapsed.as_secs_f64());
        }

        Ok(decoded)
    }

    fn parse_url(raw: &str) -> Result<Url> {
        Url::parse(raw).map_err(|e| PressureError::http(raw, None, format!("invalid URL: {e}")))
    }
}

#[async_trait]
impl WeatherGovApi for NoaaClient {
    #[instrument(skip(self), fields(lat = location.latitude, lon = location.longitude))]
    async fn point(&self, location: Location) -> Result<PointResponse> {
        let url = format!(
            "{}/points/{},{}",
            self.base_url, location.latitude, location.longitude
        );
        self.get_json(Self::parse_url(&url)?).await
    }

    #[instrument(skip(self))]
    async fn stations(&self, url: &str) -> Result<StationCollection> {
        self.get_json(Self::parse_url(url)?).await
    }

    #[instrument(skip(self))]
    async fn gridpoint_data(&self, url: &str) -> Result<GridpointResponse> {
        self.get_json(Self::parse_url(url)?).await
    }

    #[instrument(skip(self, start, end))]
    async fn observations(
        &self,
        station_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ObservationCollection> {
        let url = self.observations_url(station_id, start, end)?;
        self.get_json(url).await
    }
}

fn truncate(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
