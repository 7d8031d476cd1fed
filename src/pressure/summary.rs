//! Summary statistics over a reconciled series

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::reconcile::ReconciledSeries;
use super::units::round_to;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressureStats {
    pub min_hpa: f64,
    pub max_hpa: f64,
    pub avg_hpa: f64,
    pub range_hpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Counts and hPa statistics of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_points: usize,
    pub observation_points: usize,
    pub forecast_points: usize,
    pub pressure_stats: PressureStats,
    pub time_range: TimeSpan,
}

impl Summary {
    /// `None` for an empty series
    #[must_use]
    pub fn compute(series: &ReconciledSeries) -> Option<Self> {
        let samples = series.samples();
        let first = samples.first()?;
        let last = samples.last()?;

        let observation_points = samples.iter().filter(|s| s.is_observation()).count();

        let (min, max, sum) = samples.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), s| (min.min(s.pressure_hpa), max.max(s.pressure_hpa), sum + s.pressure_hpa),
        );

        #[allow(clippy::cast_precision_loss)]
        let avg = sum / samples.len() as f64;

        Some(Self {
            total_points: samples.len(),
            observation_points,
            forecast_points: samples.len() - observation_points,
            pressure_stats: PressureStats {
                min_hpa: min,
                max_hpa: max,
                avg_hpa: round_to(avg, 2),
                range_hpa: round_to(max - min, 2),
            },
            time_range: TimeSpan {
                start: first.timestamp,
                end: last.timestamp,
            },
        })
    }
}
