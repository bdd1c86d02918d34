//! Emissions calculator.
//!
//! Pure functions from `(bytes, green)` to CO2, energy and the cleaner-than
//! percentile. The factors and tiers are policy constants from `config`.

use crate::config::{
    CO2_PER_BYTE_GREEN, CO2_PER_BYTE_STANDARD, ENERGY_PER_BYTE_WH, GREEN_PERCENTILE_BONUS,
    GREEN_PERCENTILE_CAP, HEAVIEST_TIER_PERCENT, PERCENTILE_TIERS,
};
use crate::error_handling::AnalysisError;

/// CO2 and energy of one page view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emissions {
    /// Grams of CO2, rounded to 3 decimals
    pub co2_grams: f64,
    /// Watt-hours, rounded to 3 decimals
    pub energy_wh: f64,
}

/// Rounds to 3 decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Grams of CO2 per byte for the given hosting type.
pub fn co2_per_byte(green: bool) -> f64 {
    if green {
        CO2_PER_BYTE_GREEN
    } else {
        CO2_PER_BYTE_STANDARD
    }
}

/// Computes emissions for a page of `bytes` bytes.
///
/// Green hosting lowers the emission factor; energy draw is the same for both.
pub fn compute(bytes: u64, green: bool) -> Emissions {
    let bytes = bytes as f64;
    Emissions {
        co2_grams: round3(bytes * co2_per_byte(green)),
        energy_wh: round3(bytes * ENERGY_PER_BYTE_WH),
    }
}

/// Like [`compute`], for byte counts coming from signed sources.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a negative byte count.
pub fn compute_checked(bytes: i64, green: bool) -> Result<Emissions, AnalysisError> {
    let bytes = u64::try_from(bytes).map_err(|_| {
        AnalysisError::invalid_input(&bytes.to_string(), "byte count must not be negative")
    })?;
    Ok(compute(bytes, green))
}

/// Percentage of measured sites this page is cleaner than.
///
/// Table-driven by page weight, plus `GREEN_PERCENTILE_BONUS` for green hosting,
/// never above `GREEN_PERCENTILE_CAP`.
pub fn cleaner_than_percent(bytes: u64, green: bool) -> u8 {
    let base = PERCENTILE_TIERS
        .iter()
        .find(|(upper, _)| bytes < *upper)
        .map(|(_, percent)| *percent)
        .unwrap_or(HEAVIEST_TIER_PERCENT);

    if green {
        base.saturating_add(GREEN_PERCENTILE_BONUS)
            .min(GREEN_PERCENTILE_CAP)
    } else {
        base
    }
}
