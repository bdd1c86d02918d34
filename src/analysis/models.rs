//! The analysis result and its stored and reported forms.

use serde::Serialize;
use url::Url;

use crate::estimate::{grade, CarbonMetrics, EcoScore};
use crate::narrative::Narrative;
use crate::provider::MetricsSource;

/// One website analysis. Immutable once built.
///
/// The grade is always derived from `cleaner_than_percent` inside the
/// constructors and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    url: String,
    bytes: u64,
    green: bool,
    co2_grams: f64,
    energy_wh: f64,
    cleaner_than_percent: u8,
    eco_score: EcoScore,
    ai_summary: String,
    suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<String>,
}

impl AnalysisResult {
    pub fn new(
        url: &Url,
        metrics: CarbonMetrics,
        narrative: Narrative,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            url: url.to_string(),
            bytes: metrics.bytes,
            green: metrics.green,
            co2_grams: metrics.co2_grams,
            energy_wh: metrics.energy_wh,
            cleaner_than_percent: metrics.cleaner_than_percent,
            eco_score: metrics.eco_score(),
            ai_summary: narrative.summary,
            suggestions: narrative.suggestions,
            owner_id,
        }
    }

    /// Rebuilds a result read back from storage; the grade is re-derived.
    pub(crate) fn restore(
        url: String,
        metrics: CarbonMetrics,
        ai_summary: String,
        suggestions: Vec<String>,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            url,
            bytes: metrics.bytes,
            green: metrics.green,
            co2_grams: metrics.co2_grams,
            energy_wh: metrics.energy_wh,
            cleaner_than_percent: metrics.cleaner_than_percent,
            eco_score: grade(metrics.cleaner_than_percent),
            ai_summary,
            suggestions,
            owner_id,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn green(&self) -> bool {
        self.green
    }

    pub fn co2_grams(&self) -> f64 {
        self.co2_grams
    }

    pub fn energy_wh(&self) -> f64 {
        self.energy_wh
    }

    pub fn cleaner_than_percent(&self) -> u8 {
        self.cleaner_than_percent
    }

    pub fn eco_score(&self) -> EcoScore {
        self.eco_score
    }

    pub fn ai_summary(&self) -> &str {
        &self.ai_summary
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    /// The carbon figures of this result.
    pub fn metrics(&self) -> CarbonMetrics {
        CarbonMetrics {
            bytes: self.bytes,
            green: self.green,
            co2_grams: self.co2_grams,
            energy_wh: self.energy_wh,
            cleaner_than_percent: self.cleaner_than_percent,
        }
    }
}

/// A persisted result with its row id and insertion time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub id: i64,
    pub created_at_ms: i64,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// What an analysis request returns.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    /// False when the result could not be persisted.
    pub saved: bool,
    pub source: MetricsSource,
}
