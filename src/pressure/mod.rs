//! Surface pressure reconciliation engine
//!
//! Leaf first: units and timestamps, grid resolution, the two source
//! fetchers, the reconciler and summary, and the query service on top.

pub mod forecast;
pub mod grid;
pub mod observations;
pub mod reconcile;
pub mod service;
pub mod summary;
pub mod timestamp;
pub mod units;

pub use forecast::ForecastFetcher;
pub use grid::{GridLocation, GridLocator, GridReference, StationListSource, StationPolicy, StationRef};
pub use observations::{ObservationFetcher, ObservationWindow, QualityPolicy};
pub use reconcile::{ReconciledSeries, reconcile};
pub use service::{MAX_HORIZON_HOURS, PressureQuery, SurfacePressureService};
pub use summary::{PressureStats, Summary, TimeSpan};
pub use units::PressureUnit;
