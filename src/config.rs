//! Configuration management for the surface pressure service
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates every setting before the service starts.

use crate::PressureError;
use crate::models::Location;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    /// NOAA weather.gov API settings
    pub noaa: NoaaConfig,
    /// Station ranking and fan-out settings
    pub stations: StationConfig,
    /// Observation quality policy
    pub quality: QualityConfig,
    /// Observation window settings
    pub observations: ObservationConfig,
    /// HTTP server settings
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Default query parameters for the HTTP endpoint
    pub defaults: DefaultsConfig,
}

/// NOAA API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoaaConfig {
    /// Base URL for api.weather.gov
    #[serde(default = "default_noaa_base_url")]
    pub base_url: String,
    /// Total request timeout in seconds, per query client
    #[serde(default = "default_noaa_timeout")]
    pub timeout_seconds: u32,
    /// User-Agent sent to NOAA, which rejects anonymous clients
    #[serde(default = "default_noaa_user_agent")]
    pub user_agent: String,
}

/// Station selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Stations promoted to the front of the resolved list
    #[serde(default = "default_priority_stations")]
    pub priority: Vec<String>,
    /// Stations used when the station list cannot be retrieved
    #[serde(default = "default_fallback_stations")]
    pub fallback: Vec<String>,
    /// Maximum number of stations kept after ranking
    #[serde(default = "default_max_resolved")]
    pub max_resolved: usize,
    /// Maximum number of stations queried for observations
    #[serde(default = "default_max_queried")]
    pub max_queried: usize,
}

/// Observation quality-control policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Accepted NOAA quality-control codes
    #[serde(default = "default_accepted_flags")]
    pub accepted_flags: Vec<String>,
}

/// Observation window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationConfig {
    /// Upper bound on how far past `now` observations are requested
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_hours_back")]
    pub hours_back: u32,
    #[serde(default = "default_hours_forward")]
    pub hours_forward: u32,
}

// Default value functions
fn default_noaa_base_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_noaa_timeout() -> u32 {
    60
}

fn default_noaa_user_agent() -> String {
    format!(
        "zeus-pressure/{} (surface pressure service; ops@zeus-air.example)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_priority_stations() -> Vec<String> {
    ["KNYC", "KLGA", "KEWR", "KJFK", "KTEB"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_fallback_stations() -> Vec<String> {
    ["KNYC", "KLGA", "KEWR"].into_iter().map(String::from).collect()
}

fn default_max_resolved() -> usize {
    10
}

fn default_max_queried() -> usize {
    3
}

fn default_accepted_flags() -> Vec<String> {
    ["V", "C", "S"].into_iter().map(String::from).collect()
}

fn default_lookahead_hours() -> u32 {
    1
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_latitude() -> f64 {
    40.7128
}

fn default_longitude() -> f64 {
    -74.0060
}

fn default_hours_back() -> u32 {
    24
}

fn default_hours_forward() -> u32 {
    48
}

impl Default for NoaaConfig {
    fn default() -> Self {
        Self {
            base_url: default_noaa_base_url(),
            timeout_seconds: default_noaa_timeout(),
            user_agent: default_noaa_user_agent(),
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            priority: default_priority_stations(),
            fallback: default_fallback_stations(),
            max_resolved: default_max_resolved(),
            max_queried: default_max_queried(),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            accepted_flags: default_accepted_flags(),
        }
    }
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            lookahead_hours: default_lookahead_hours(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            hours_back: default_hours_back(),
            hours_forward: default_hours_forward(),
        }
    }
}

impl PressureConfig {
    /// Load configuration from `config.toml` (if present) and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_from_sources(config_path, environment_source())
    }

    fn load_from_sources(config_path: Option<PathBuf>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(environment);

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: PressureConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.noaa.timeout_seconds == 0 || self.noaa.timeout_seconds > 300 {
            return Err(PressureError::config(
                "NOAA timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.stations.max_queried == 0 {
            return Err(PressureError::config("At least one station must be queried").into());
        }

        if self.stations.max_resolved < self.stations.max_queried {
            return Err(PressureError::config(format!(
                "stations.max_resolved ({}) cannot be smaller than stations.max_queried ({})",
                self.stations.max_resolved, self.stations.max_queried
            ))
            .into());
        }

        if self.observations.lookahead_hours > 168 {
            return Err(PressureError::config(
                "Observation lookahead cannot exceed 168 hours",
            )
            .into());
        }

        if self.server.port == 0 {
            return Err(PressureError::config("Server port cannot be 0").into());
        }

        if !(1..=168).contains(&self.defaults.hours_back) {
            return Err(PressureError::config(
                "defaults.hours_back must be between 1 and 168",
            )
            .into());
        }

        if self.defaults.hours_forward > 168 {
            return Err(PressureError::config(
                "defaults.hours_forward must be between 0 and 168",
            )
            .into());
        }

        if !Location::new(self.defaults.latitude, self.defaults.longitude).is_valid() {
            return Err(PressureError::config(format!(
                "defaults location ({}, {}) is outside WGS84 ranges",
                self.defaults.latitude, self.defaults.longitude
            ))
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PressureError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PressureError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.noaa.base_url.starts_with("http://") && !self.noaa.base_url.starts_with("https://")
        {
            return Err(PressureError::config(
                "NOAA base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if self.quality.accepted_flags.is_empty() {
            return Err(PressureError::config(
                "quality.accepted_flags cannot be empty; no observation would ever be accepted",
            )
            .into());
        }

        Ok(())
    }
}

/// Environment overrides, e.g. `ZEUS_NOAA__TIMEOUT_SECONDS=30` or
/// `ZEUS_STATIONS__PRIORITY=KBOS,KJFK`
fn environment_source() -> Environment {
    Environment::with_prefix("ZEUS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("stations.priority")
        .with_list_parse_key("stations.fallback")
        .with_list_parse_key("quality.accepted_flags")
}
