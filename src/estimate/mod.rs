//! Carbon estimation and scoring engine.
//!
//! - [`bytes`]: page weight from a HEAD probe or the hostname table
//! - [`green`]: green hosting classification
//! - [`emissions`]: CO2, energy and percentile from `(bytes, green)`
//! - [`grade`]: letter grade from the percentile

pub mod bytes;
pub mod emissions;
pub mod grade;
pub mod green;

use serde::Serialize;

use crate::error_handling::AnalysisError;

pub use bytes::{heuristic_bytes, ByteEstimate, ByteEstimator, ByteSource};
pub use emissions::{cleaner_than_percent, compute, compute_checked, round3, Emissions};
pub use grade::{grade, EcoScore};
pub use green::{on_green_platform, GreenClassifier, GreenSource, GreenVerdict};

/// Carbon metrics of one page view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonMetrics {
    pub bytes: u64,
    pub green: bool,
    pub co2_grams: f64,
    pub energy_wh: f64,
    pub cleaner_than_percent: u8,
}

impl CarbonMetrics {
    /// Metrics computed locally from a page weight and hosting flag.
    pub fn from_page(bytes: u64, green: bool) -> Self {
        let Emissions {
            co2_grams,
            energy_wh,
        } = compute(bytes, green);
        Self {
            bytes,
            green,
            co2_grams,
            energy_wh,
            cleaner_than_percent: cleaner_than_percent(bytes, green),
        }
    }

    /// Like [`CarbonMetrics::from_page`], for byte counts from signed sources
    /// such as query strings.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for a negative byte count.
    pub fn from_signed(bytes: i64, green: bool) -> Result<Self, AnalysisError> {
        let Emissions {
            co2_grams,
            energy_wh,
        } = compute_checked(bytes, green)?;
        let bytes = bytes.unsigned_abs();
        Ok(Self {
            bytes,
            green,
            co2_grams,
            energy_wh,
            cleaner_than_percent: cleaner_than_percent(bytes, green),
        })
    }

    /// Grade for these metrics.
    pub fn eco_score(&self) -> EcoScore {
        grade(self.cleaner_than_percent)
    }
}
