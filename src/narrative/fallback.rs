//! Deterministic narrative used when the model is unavailable.

use crate::config::{FALLBACK_SUGGESTIONS, MAX_SUGGESTIONS, MIN_SUGGESTIONS, SMS_PER_GRAM_CO2};
use crate::estimate::CarbonMetrics;

/// Template summary for `metrics`.
pub(crate) fn template_summary(metrics: &CarbonMetrics) -> String {
    let sms = (metrics.co2_grams * SMS_PER_GRAM_CO2).round() as u64;
    format!(
        "This website generates {}g of CO2 per visit, equivalent to {} SMS messages. \
         It performs better than {}% of websites tested.",
        metrics.co2_grams, sms, metrics.cleaner_than_percent
    )
}

pub(crate) fn fallback_suggestions() -> Vec<String> {
    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

/// Truncates to the maximum, then pads from the fixed list up to the minimum,
/// skipping entries already present.
pub(crate) fn bound_suggestions(mut suggestions: Vec<String>) -> Vec<String> {
    suggestions.truncate(MAX_SUGGESTIONS);
    for fallback in FALLBACK_SUGGESTIONS {
        if suggestions.len() >= MIN_SUGGESTIONS {
            break;
        }
        if !suggestions.iter().any(|s| s.eq_ignore_ascii_case(fallback)) {
            suggestions.push(fallback.to_string());
        }
    }
    suggestions
}
