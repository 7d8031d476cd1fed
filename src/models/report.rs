//! Result envelope of a surface pressure query

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Location, PressureSample};
use crate::pressure::{GridLocation, PressureUnit, ReconciledSeries, Summary};

/// Requested window and the instant the query was evaluated at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryWindow {
    pub hours_back: u32,
    pub hours_forward: u32,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Grid cell, upstream URLs and the ranked station list
    pub grid: GridLocation,
}

/// Unit labels of the sample fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitLabels {
    pub pressure: &'static str,
    pub pressure_hpa: &'static str,
    pub pressure_inhg: &'static str,
}

impl Default for UnitLabels {
    fn default() -> Self {
        Self {
            pressure: PressureUnit::Pascal.label(),
            pressure_hpa: PressureUnit::Hectopascal.label(),
            pressure_inhg: PressureUnit::InchesOfMercury.label(),
        }
    }
}

/// Everything a single query produces
#[derive(Debug, Clone, Serialize)]
pub struct PressureReport {
    pub location: Location,
    pub time_range: QueryWindow,
    pub forecast_data: Vec<PressureSample>,
    pub observation_data: Vec<PressureSample>,
    pub combined_timeseries: ReconciledSeries,
    pub summary: Option<Summary>,
    pub metadata: ReportMetadata,
    pub units: UnitLabels,
}

impl PressureReport {
    /// Short description for logs
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{}: {} forecast, {} observation, {} combined",
            self.location.format_coordinates(),
            self.forecast_data.len(),
            self.observation_data.len(),
            self.combined_timeseries.len()
        )
    }
}
