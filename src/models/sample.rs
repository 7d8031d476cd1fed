//! Pressure sample model

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::pressure::units::{pa_to_hpa, pa_to_inhg};

/// Which upstream source a sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Forecast,
    Observation,
}

/// Which observation field a station reading was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureKind {
    Barometric,
    SeaLevel,
}

/// Where a sample was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SampleOrigin {
    Forecast {
        /// Human-readable grid cell, e.g. `OKX (33, 35)`
        grid_point: String,
    },
    Observation {
        station: String,
        /// NOAA quality-control code of the reading
        quality: String,
        pressure_type: PressureKind,
    },
}

/// One surface pressure reading, normalised to pascals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressureSample {
    pub timestamp: DateTime<Utc>,
    pub pressure_pa: f64,
    pub pressure_hpa: f64,
    pub pressure_inhg: f64,
    #[serde(rename = "source")]
    pub provenance: Provenance,
    #[serde(flatten)]
    pub origin: SampleOrigin,
}

impl PressureSample {
    /// Build a forecast sample for a grid cell
    #[must_use]
    pub fn forecast(timestamp: DateTime<Utc>, pressure_pa: f64, grid_point: impl Into<String>) -> Self {
        Self {
            timestamp,
            pressure_pa,
            pressure_hpa: pa_to_hpa(pressure_pa),
            pressure_inhg: pa_to_inhg(pressure_pa),
            provenance: Provenance::Forecast,
            origin: SampleOrigin::Forecast {
                grid_point: grid_point.into(),
            },
        }
    }

    /// Build an observation sample for a station
    #[must_use]
    pub fn observation(
        timestamp: DateTime<Utc>,
        pressure_pa: f64,
        station: impl Into<String>,
        quality: impl Into<String>,
        pressure_type: PressureKind,
    ) -> Self {
        Self {
            timestamp,
            pressure_pa,
            pressure_hpa: pa_to_hpa(pressure_pa),
            pressure_inhg: pa_to_inhg(pressure_pa),
            provenance: Provenance::Observation,
            origin: SampleOrigin::Observation {
                station: station.into(),
                quality: quality.into(),
                pressure_type,
            },
        }
    }

    #[must_use]
    pub fn is_observation(&self) -> bool {
        self.provenance == Provenance::Observation
    }

    /// Grid point or station identifier the sample came from
    #[must_use]
    pub fn source_locator(&self) -> &str {
        match &self.origin {
            SampleOrigin::Forecast { grid_point } => grid_point,
            SampleOrigin::Observation { station, .. } => station,
        }
    }
}

impl fmt::Display for PressureSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2} hPa ({:?} from {})",
            self.timestamp.to_rfc3339(),
            self.pressure_hpa,
            self.provenance,
            self.source_locator()
        )
    }
}
