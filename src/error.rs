//! Error types for the surface pressure service
//!
//! Only grid resolution failures abort a query. Partial source failures and
//! malformed samples are recovered where they happen and only surface in
//! logs; they are still modelled here so every failure has one vocabulary.

use thiserror::Error;

/// Main error type for the surface pressure service
#[derive(Error, Debug)]
pub enum PressureError {
    /// Grid point lookup failed outright (fatal)
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable {
        message: String,
        status: Option<u16>,
    },

    /// Grid point lookup succeeded but lacked a required field (fatal)
    #[error("Incomplete grid data: missing {field}")]
    IncompleteGridData { field: &'static str },

    /// A station or the forecast endpoint failed; its contribution is empty
    #[error("Partial source failure from {origin}: {message}")]
    PartialSourceFailure { origin: String, message: String },

    /// A single upstream record could not be parsed
    #[error("Malformed sample: {message}")]
    MalformedSample { message: String },

    /// Transport or status failure reported by the HTTP client
    #[error("HTTP error for {url}: {message}")]
    Http {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Any unrecovered failure of a pressure query, with its cause
    #[error("Failed to fetch surface pressure data: {cause}")]
    PressureQueryFailed {
        #[source]
        cause: Box<PressureError>,
    },
}

impl PressureError {
    /// Create a new upstream-unavailable error
    pub fn upstream<S: Into<String>>(message: S, status: Option<u16>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
            status,
        }
    }

    /// Create a new partial source failure
    pub fn partial<O: Into<String>, S: Into<String>>(origin: O, message: S) -> Self {
        Self::PartialSourceFailure {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Create a new malformed sample error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedSample {
            message: message.into(),
        }
    }

    /// Create a new HTTP error
    pub fn http<U: Into<String>, S: Into<String>>(url: U, status: Option<u16>, message: S) -> Self {
        Self::Http {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wrap an unrecovered error as a failed pressure query.
    ///
    /// Already-wrapped errors are returned unchanged so the cause chain
    /// stays one level deep.
    #[must_use]
    pub fn query_failed(cause: PressureError) -> Self {
        match cause {
            wrapped @ Self::PressureQueryFailed { .. } => wrapped,
            other => Self::PressureQueryFailed {
                cause: Box::new(other),
            },
        }
    }

    /// The innermost cause of this error
    #[must_use]
    pub fn root_cause(&self) -> &PressureError {
        match self {
            Self::PressureQueryFailed { cause } => cause.root_cause(),
            other => other,
        }
    }

    /// Whether the root cause is a caller mistake rather than an upstream one
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self.root_cause(), Self::Validation { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.root_cause() {
            PressureError::UpstreamUnavailable { .. } | PressureError::Http { .. } => {
                "Unable to reach the NOAA weather service for this location.".to_string()
            }
            PressureError::IncompleteGridData { field } => {
                format!("NOAA returned incomplete grid data for this location (missing {field}).")
            }
            PressureError::Validation { message } => format!("Invalid input: {message}"),
            PressureError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            other => other.to_string(),
        }
    }
}
