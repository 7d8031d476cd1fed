//! Surface pressure query orchestration
//!
//! A query resolves the grid cell and stations, runs the forecast and
//! observation branches concurrently, reconciles both series and attaches
//! summary statistics. Only grid resolution and input validation can fail a
//! query; source failures leave that source's contribution empty.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{error, info, instrument};

use super::forecast::ForecastFetcher;
use super::grid::{GridLocator, StationPolicy};
use super::observations::{ObservationFetcher, ObservationWindow, QualityPolicy};
use super::reconcile::reconcile;
use super::summary::Summary;
use crate::config::PressureConfig;
use crate::models::{Location, PressureReport, QueryWindow, ReportMetadata, UnitLabels};
use crate::noaa::{NoaaClient, WeatherGovApi};
use crate::{PressureError, Result};

/// Longest supported backward or forward horizon, in hours
pub const MAX_HORIZON_HOURS: u32 = 168;

/// Parameters of a single pressure query
#[derive(Debug, Clone, PartialEq)]
pub struct PressureQuery {
    pub location: Location,
    pub hours_back: u32,
    pub hours_forward: u32,
    pub include_forecast: bool,
    pub include_observations: bool,
}

impl PressureQuery {
    /// Query with the default 24 h back / 48 h forward window and both sources
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self {
            location,
            hours_back: 24,
            hours_forward: 48,
            include_forecast: true,
            include_observations: true,
        }
    }

    #[must_use]
    pub fn with_window(mut self, hours_back: u32, hours_forward: u32) -> Self {
        self.hours_back = hours_back;
        self.hours_forward = hours_forward;
        self
    }

    #[must_use]
    pub fn with_sources(mut self, include_forecast: bool, include_observations: bool) -> Self {
        self.include_forecast = include_forecast;
        self.include_observations = include_observations;
        self
    }

    /// Check the window bounds and coordinate ranges
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_HORIZON_HOURS).contains(&self.hours_back) {
            return Err(PressureError::validation(format!(
                "hours_back must be between 1 and {MAX_HORIZON_HOURS}, got {}",
                self.hours_back
            )));
        }
        if self.hours_forward > MAX_HORIZON_HOURS {
            return Err(PressureError::validation(format!(
                "hours_forward must be between 0 and {MAX_HORIZON_HOURS}, got {}",
                self.hours_forward
            )));
        }
        if !self.location.is_valid() {
            return Err(PressureError::validation(format!(
                "coordinates out of range: {}, {}",
                self.location.latitude, self.location.longitude
            )));
        }
        Ok(())
    }
}

/// Entry point for surface pressure queries
#[derive(Debug, Clone)]
pub struct SurfacePressureService {
    config: PressureConfig,
    locator: GridLocator,
    observations: ObservationFetcher,
}

impl SurfacePressureService {
    #[must_use]
    pub fn new(config: PressureConfig) -> Self {
        let locator = GridLocator::new(StationPolicy::from(&config.stations));
        let observations = ObservationFetcher::new(
            QualityPolicy::from(&config.quality),
            config.stations.max_queried,
        );
        Self {
            config,
            locator,
            observations,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PressureConfig {
        &self.config
    }

    /// Run a query against api.weather.gov with a client scoped to this query
    #[instrument(skip(self, query), fields(lat = query.location.latitude, lon = query.location.longitude))]
    pub async fn query(&self, query: &PressureQuery) -> Result<PressureReport> {
        let client = NoaaClient::new(&self.config.noaa).map_err(PressureError::query_failed)?;
        self.query_with(&client, query, Utc::now()).await
    }

    /// Run a query against any upstream implementation at a fixed instant
    pub async fn query_with<A: WeatherGovApi + ?Sized>(
        &self,
        api: &A,
        query: &PressureQuery,
        now: DateTime<Utc>,
    ) -> Result<PressureReport> {
        match self.run(api, query, now).await {
            Ok(report) => {
                info!("Surface pressure query done for {}", report.describe());
                Ok(report)
            }
            Err(e) => {
                let e = PressureError::query_failed(e);
                error!("{}", e);
                Err(e)
            }
        }
    }

    /// Run independent queries concurrently; results keep the request order
    pub async fn query_batch(&self, queries: &[PressureQuery]) -> Vec<Result<PressureReport>> {
        join_all(queries.iter().map(|query| self.query(query))).await
    }

    /// Batch form of [`Self::query_with`]
    pub async fn query_batch_with<A: WeatherGovApi + ?Sized>(
        &self,
        api: &A,
        queries: &[PressureQuery],
        now: DateTime<Utc>,
    ) -> Vec<Result<PressureReport>> {
        join_all(queries.iter().map(|query| self.query_with(api, query, now))).await
    }

    async fn run<A: WeatherGovApi + ?Sized>(
        &self,
        api: &A,
        query: &PressureQuery,
        now: DateTime<Utc>,
    ) -> Result<PressureReport> {
        query.validate()?;

        let located = self.locator.locate(api, query.location).await?;

        let forecast_branch = async {
            if query.include_forecast {
                ForecastFetcher::fetch(api, &located.grid, query.hours_forward, now).await
            } else {
                Vec::new()
            }
        };

        let observation_branch = async {
            if query.include_observations {
                let window = ObservationWindow {
                    hours_back: query.hours_back,
                    hours_forward: query
                        .hours_forward
                        .min(self.config.observations.lookahead_hours),
                };
                self.observations
                    .fetch(api, &located.stations, window, now)
                    .await
            } else {
                Vec::new()
            }
        };

        let (forecast_data, observation_data) = futures::join!(forecast_branch, observation_branch);

        let combined_timeseries = reconcile(&forecast_data, &observation_data);
        let summary = Summary::compute(&combined_timeseries);

        Ok(PressureReport {
            location: query.location,
            time_range: QueryWindow {
                hours_back: query.hours_back,
                hours_forward: query.hours_forward,
                requested_at: now,
            },
            forecast_data,
            observation_data,
            combined_timeseries,
            summary,
            metadata: ReportMetadata { grid: located },
            units: UnitLabels::default(),
        })
    }
}
