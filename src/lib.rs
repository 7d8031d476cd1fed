//! `zeus-pressure` - surface pressure time series for a map client
//!
//! Fetches NOAA gridded forecast pressure and nearby station observations
//! for a location, normalises them to pascals, filters by quality and merges
//! them into one chronological series with summary statistics.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod noaa;
pub mod pressure;
pub mod web;

// Re-export core types for public API
pub use config::PressureConfig;
pub use error::PressureError;
pub use models::{Location, PressureReport, PressureSample, Provenance};
pub use noaa::{NoaaClient, WeatherGovApi};
pub use pressure::{PressureQuery, ReconciledSeries, Summary, SurfacePressureService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PressureError>;
