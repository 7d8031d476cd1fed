//! Station observation retrieval and quality filtering

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::grid::StationRef;
use super::timestamp::parse_instant;
use super::units::PressureUnit;
use crate::config::QualityConfig;
use crate::models::{PressureKind, PressureSample};
use crate::noaa::{ObservationCollection, ObservationFeature, QuantitativeValue, WeatherGovApi};
use crate::{PressureError, Result};

/// Accepted NOAA quality-control codes.
///
/// The default accepts `V` (valid), `C` (corrected) and `S` (suspect but
/// usable). Accepting suspect readings is a policy choice kept configurable.
#[derive(Debug, Clone)]
pub struct QualityPolicy {
    accepted: Vec<String>,
}

impl QualityPolicy {
    #[must_use]
    pub fn new<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: flags.into_iter().map(Into::into).collect(),
        }
    }

    /// A missing flag is never accepted
    #[must_use]
    pub fn accepts(&self, flag: Option<&str>) -> bool {
        flag.is_some_and(|flag| self.accepted.iter().any(|accepted| accepted == flag))
    }
}

impl From<&QualityConfig> for QualityPolicy {
    fn from(config: &QualityConfig) -> Self {
        Self::new(config.accepted_flags.iter().cloned())
    }
}

/// Time window requested from every station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationWindow {
    pub hours_back: u32,
    pub hours_forward: u32,
}

impl ObservationWindow {
    #[must_use]
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            now - Duration::hours(i64::from(self.hours_back)),
            now + Duration::hours(i64::from(self.hours_forward)),
        )
    }
}

/// Fetches and filters observation series from the highest-ranked stations
#[derive(Debug, Clone)]
pub struct ObservationFetcher {
    quality: QualityPolicy,
    max_stations: usize,
}

impl ObservationFetcher {
    #[must_use]
    pub fn new(quality: QualityPolicy, max_stations: usize) -> Self {
        Self {
            quality,
            max_stations,
        }
    }

    /// Query at most `max_stations` stations in order. A failing station is
    /// skipped; the result is sorted by timestamp.
    pub async fn fetch<A: WeatherGovApi + ?Sized>(
        &self,
        api: &A,
        stations: &[StationRef],
        window: ObservationWindow,
        now: DateTime<Utc>,
    ) -> Vec<PressureSample> {
        if stations.is_empty() {
            warn!("No observation stations available");
            return Vec::new();
        }

        let (start, end) = window.bounds(now);
        let mut samples = Vec::new();

        for station in stations.iter().take(self.max_stations) {
            debug!("Getting observations from {}", station);
            match api.observations(station.as_str(), start, end).await {
                Ok(collection) => {
                    let accepted = self.extract_station_samples(station, collection);
                    debug!("{}: {} accepted observations", station, accepted.len());
                    samples.extend(accepted);
                }
                Err(e) => {
                    warn!("{}", PressureError::partial(station.as_str(), e.to_string()));
                }
            }
        }

        samples.sort_by_key(|sample| sample.timestamp);
        info!("Observation points: {}", samples.len());
        samples
    }

    /// Accepted samples of one station's observation history, in arrival order
    #[must_use]
    pub fn extract_station_samples(
        &self,
        station: &StationRef,
        collection: ObservationCollection,
    ) -> Vec<PressureSample> {
        collection
            .features
            .into_iter()
            .filter_map(|raw| match self.parse_feature(station, raw) {
                Ok(sample) => sample,
                Err(e) => {
                    debug!("Skipping observation from {}: {}", station, e);
                    None
                }
            })
            .collect()
    }

    /// `Ok(None)` means the record was readable but carries no usable reading
    fn parse_feature(&self, station: &StationRef, raw: Value) -> Result<Option<PressureSample>> {
        let feature: ObservationFeature = serde_json::from_value(raw)
            .map_err(|e| PressureError::malformed(format!("invalid observation record: {e}")))?;
        let properties = feature.properties;

        let Some((reading, value, kind)) = select_reading(
            properties.barometric_pressure.as_ref(),
            properties.sea_level_pressure.as_ref(),
        ) else {
            return Ok(None);
        };

        let quality = reading.quality_control.as_deref();
        if !self.quality.accepts(quality) {
            debug!(
                "Dropping {} reading at {} with quality {:?}",
                station, properties.timestamp, quality
            );
            return Ok(None);
        }

        let timestamp = parse_instant(&properties.timestamp)?;
        let pressure_pa = PressureUnit::resolve(reading.unit_code.as_deref()).to_pascals(value);

        Ok(Some(PressureSample::observation(
            timestamp,
            pressure_pa,
            station.as_str(),
            quality.unwrap_or_default(),
            kind,
        )))
    }
}

/// Prefer barometric pressure; fall back to sea-level pressure when the
/// barometric reading is absent or null.
fn select_reading<'a>(
    barometric: Option<&'a QuantitativeValue>,
    sea_level: Option<&'a QuantitativeValue>,
) -> Option<(&'a QuantitativeValue, f64, PressureKind)> {
    barometric
        .and_then(|reading| reading.value.map(|v| (reading, v, PressureKind::Barometric)))
        .or_else(|| {
            sea_level.and_then(|reading| reading.value.map(|v| (reading, v, PressureKind::SeaLevel)))
        })
}
