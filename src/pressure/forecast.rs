//! Gridded forecast pressure retrieval
//!
//! Forecast pressure is not published for every grid cell, so a missing
//! layer or a failed request yields an empty series instead of an error.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::grid::GridReference;
use super::timestamp::parse_valid_time;
use super::units::PressureUnit;
use crate::models::PressureSample;
use crate::noaa::{GridpointLayer, GridpointValue, WeatherGovApi};
use crate::{PressureError, Result};

/// Fetches the forecast pressure series for a grid cell
pub struct ForecastFetcher;

impl ForecastFetcher {
    /// Forecast samples with `now <= t <= now + hours_forward`, sorted ascending
    pub async fn fetch<A: WeatherGovApi + ?Sized>(
        api: &A,
        grid: &GridReference,
        hours_forward: u32,
        now: DateTime<Utc>,
    ) -> Vec<PressureSample> {
        let Some(url) = grid.forecast_grid_url.as_deref() else {
            warn!("No forecast grid URL available for {}", grid.grid_point());
            return Vec::new();
        };

        let response = match api.gridpoint_data(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{}", PressureError::partial(grid.grid_point(), e.to_string()));
                return Vec::new();
            }
        };

        let Some(layer) = response.properties.pressure else {
            warn!("No pressure data in forecast grid {}", grid.grid_point());
            return Vec::new();
        };

        let end = now + Duration::hours(i64::from(hours_forward));
        let samples = extract_samples(layer, &grid.grid_point(), now, end);
        info!("Forecast points: {}", samples.len());
        samples
    }
}

/// Convert a gridpoint pressure layer into samples inside `[start, end]`.
/// Entries that cannot be read are logged and skipped.
pub fn extract_samples(
    layer: GridpointLayer,
    grid_point: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<PressureSample> {
    let unit = PressureUnit::resolve(layer.uom.as_deref());

    let mut samples: Vec<PressureSample> = layer
        .values
        .into_iter()
        .filter_map(|raw| match parse_entry(raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping forecast entry for {}: {}", grid_point, e);
                None
            }
        })
        .filter(|(timestamp, _)| start <= *timestamp && *timestamp <= end)
        .map(|(timestamp, value)| {
            PressureSample::forecast(timestamp, unit.to_pascals(value), grid_point)
        })
        .collect();

    samples.sort_by_key(|sample| sample.timestamp);
    samples
}

fn parse_entry(raw: Value) -> Result<(DateTime<Utc>, f64)> {
    let entry: GridpointValue = serde_json::from_value(raw)
        .map_err(|e| PressureError::malformed(format!("invalid gridpoint entry: {e}")))?;
    let value = entry
        .value
        .ok_or_else(|| PressureError::malformed(format!("null value at {}", entry.valid_time)))?;
    let timestamp = parse_valid_time(&entry.valid_time)?;
    Ok((timestamp, value))
}
