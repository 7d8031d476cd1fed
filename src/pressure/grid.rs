//! Grid and station resolution for a query location

use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::StationConfig;
use crate::models::Location;
use crate::noaa::{PointProperties, WeatherGovApi};
use crate::{PressureError, Result};

/// Forecast grid cell resolved for a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridReference {
    #[serde(rename = "gridId")]
    pub grid_id: String,
    #[serde(rename = "gridX")]
    pub grid_x: i64,
    #[serde(rename = "gridY")]
    pub grid_y: i64,
    pub forecast_grid_url: Option<String>,
    pub stations_url: Option<String>,
}

impl GridReference {
    /// Human-readable grid cell, e.g. `OKX (33, 35)`
    #[must_use]
    pub fn grid_point(&self) -> String {
        format!("{} ({}, {})", self.grid_id, self.grid_x, self.grid_y)
    }

    fn from_point(properties: PointProperties) -> Result<Self> {
        let grid_id = properties
            .grid_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(PressureError::IncompleteGridData { field: "gridId" })?;
        let grid_x = properties
            .grid_x
            .ok_or(PressureError::IncompleteGridData { field: "gridX" })?;
        let grid_y = properties
            .grid_y
            .ok_or(PressureError::IncompleteGridData { field: "gridY" })?;

        Ok(Self {
            grid_id,
            grid_x,
            grid_y,
            forecast_grid_url: properties.forecast_grid_data,
            stations_url: properties.observation_stations,
        })
    }
}

/// Upstream-assigned observation station identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StationRef(String);

impl StationRef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the station list of a query came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StationListSource {
    Upstream,
    Fallback,
}

/// Result of resolving a location
#[derive(Debug, Clone, Serialize)]
pub struct GridLocation {
    #[serde(flatten)]
    pub grid: GridReference,
    pub stations: Vec<StationRef>,
    pub station_source: StationListSource,
}

/// Station ranking rules
#[derive(Debug, Clone)]
pub struct StationPolicy {
    pub priority: Vec<String>,
    pub fallback: Vec<String>,
    pub max_resolved: usize,
}

impl From<&StationConfig> for StationPolicy {
    fn from(config: &StationConfig) -> Self {
        Self {
            priority: config.priority.clone(),
            fallback: config.fallback.clone(),
            max_resolved: config.max_resolved,
        }
    }
}

impl StationPolicy {
    /// Move allow-listed stations to the front, keeping the relative upstream
    /// order inside both groups, then truncate.
    #[must_use]
    pub fn rank(&self, station_ids: Vec<String>) -> Vec<StationRef> {
        let (mut ranked, rest): (Vec<String>, Vec<String>) = station_ids
            .into_iter()
            .partition(|id| self.priority.iter().any(|p| p == id));
        ranked.extend(rest);
        ranked.truncate(self.max_resolved);
        ranked.into_iter().map(StationRef::new).collect()
    }

    #[must_use]
    pub fn fallback_stations(&self) -> Vec<StationRef> {
        self.fallback
            .iter()
            .take(self.max_resolved)
            .map(StationRef::new)
            .collect()
    }
}

/// Resolves a location to its forecast grid cell and nearby stations
#[derive(Debug, Clone)]
pub struct GridLocator {
    policy: StationPolicy,
}

impl GridLocator {
    #[must_use]
    pub fn new(policy: StationPolicy) -> Self {
        Self { policy }
    }

    /// Resolve the grid cell (fatal on failure) and the ranked station list
    /// (best effort, falls back to the configured stations).
    pub async fn locate<A: WeatherGovApi + ?Sized>(
        &self,
        api: &A,
        location: Location,
    ) -> Result<GridLocation> {
        debug!("Resolving grid for {}", location.format_coordinates());

        let point = api.point(location).await.map_err(|e| {
            let status = match &e {
                PressureError::Http { status, .. } => *status,
                _ => None,
            };
            PressureError::upstream(format!("grid point lookup failed: {e}"), status)
        })?;

        let grid = GridReference::from_point(point.properties)?;
        info!("Resolved grid {}", grid.grid_point());

        let (stations, station_source) = self.resolve_stations(api, &grid).await;
        debug!("Stations for {}: {:?}", grid.grid_point(), stations);

        Ok(GridLocation {
            grid,
            stations,
            station_source,
        })
    }

    async fn resolve_stations<A: WeatherGovApi + ?Sized>(
        &self,
        api: &A,
        grid: &GridReference,
    ) -> (Vec<StationRef>, StationListSource) {
        let Some(url) = grid.stations_url.as_deref() else {
            warn!("No station list URL for {}, using fallback stations", grid.grid_point());
            return (self.policy.fallback_stations(), StationListSource::Fallback);
        };

        match api.stations(url).await {
            Ok(collection) => {
                let ids = collection
                    .features
                    .into_iter()
                    .filter_map(|feature| feature.properties.station_identifier)
                    .filter(|id| !id.trim().is_empty())
                    .collect();
                (self.policy.rank(ids), StationListSource::Upstream)
            }
            Err(e) => {
                warn!("Could not get stations: {}, using fallback stations", e);
                (self.policy.fallback_stations(), StationListSource::Fallback)
            }
        }
    }
}
