//! Data models for the surface pressure service
//!
//! - Location: query coordinates
//! - Sample: one normalised pressure reading and its provenance
//! - Report: the envelope returned for a query

pub mod location;
pub mod report;
pub mod sample;

pub use location::Location;
pub use report::{PressureReport, QueryWindow, ReportMetadata, UnitLabels};
pub use sample::{PressureKind, PressureSample, Provenance, SampleOrigin};
