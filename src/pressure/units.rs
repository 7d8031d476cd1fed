//! Pressure unit conversions between pascals, hectopascals and inches of mercury

use serde::Serialize;
use tracing::warn;

/// Pascals per hectopascal (millibar)
pub const PA_PER_HPA: f64 = 100.0;
/// Pascals per kilopascal
pub const PA_PER_KPA: f64 = 1000.0;
/// Inches of mercury per pascal, the factor the NOAA client apps use
pub const INHG_PER_PA: f64 = 0.000_295_3;

/// A pressure unit that may appear in upstream unit metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PressureUnit {
    Pascal,
    Hectopascal,
    Kilopascal,
    InchesOfMercury,
}

impl PressureUnit {
    /// Parse a unit-of-measure code such as `wmoUnit:Pa` or `hPa`
    #[must_use]
    pub fn from_uom(uom: &str) -> Option<Self> {
        let code = uom.rsplit(':').next().unwrap_or(uom).trim();
        match code.to_ascii_lowercase().as_str() {
            "pa" => Some(Self::Pascal),
            "hpa" | "mbar" | "mb" => Some(Self::Hectopascal),
            "kpa" => Some(Self::Kilopascal),
            "inhg" | "in_hg" => Some(Self::InchesOfMercury),
            _ => None,
        }
    }

    /// Resolve optional unit metadata; values are pascals unless stated otherwise
    #[must_use]
    pub fn resolve(uom: Option<&str>) -> Self {
        match uom.map(str::trim).filter(|u| !u.is_empty()) {
            None => Self::Pascal,
            Some(code) => Self::from_uom(code).unwrap_or_else(|| {
                warn!("Unrecognised pressure unit '{}', assuming Pa", code);
                Self::Pascal
            }),
        }
    }

    /// Convert a value in this unit to pascals
    #[must_use]
    pub fn to_pascals(self, value: f64) -> f64 {
        match self {
            Self::Pascal => value,
            Self::Hectopascal => hpa_to_pa(value),
            Self::Kilopascal => value * PA_PER_KPA,
            Self::InchesOfMercury => inhg_to_pa(value),
        }
    }

    /// Short label used in the response `units` block
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pascal => "Pa",
            Self::Hectopascal => "hPa",
            Self::Kilopascal => "kPa",
            Self::InchesOfMercury => "inHg",
        }
    }
}

/// Round to a fixed number of decimal places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let multiplier = 10_f64.powi(decimals);
    (value * multiplier).round() / multiplier
}

/// Pascals to hectopascals, rounded to 2 decimals
#[must_use]
pub fn pa_to_hpa(pa: f64) -> f64 {
    round_to(pa / PA_PER_HPA, 2)
}

/// Pascals to inches of mercury, rounded to 3 decimals
#[must_use]
pub fn pa_to_inhg(pa: f64) -> f64 {
    round_to(pa * INHG_PER_PA, 3)
}

#[must_use]
pub fn hpa_to_pa(hpa: f64) -> f64 {
    hpa * PA_PER_HPA
}

#[must_use]
pub fn inhg_to_pa(inhg: f64) -> f64 {
    inhg / INHG_PER_PA
}
