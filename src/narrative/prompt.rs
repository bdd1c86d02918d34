//! Prompts sent to the language model.

use url::Url;

use crate::estimate::CarbonMetrics;

/// Prompt asking for a short impact summary and 3-5 suggestions.
pub(crate) fn analysis_prompt(url: &Url, metrics: &CarbonMetrics) -> String {
    format!(
        "Analyze this website's environmental impact and provide insights:\n\
         \n\
         URL: {url}\n\
         CO2 per visit: {co2}g\n\
         Energy consumption: {energy} Wh\n\
         Cleaner than: {cleaner}% of websites\n\
         Green hosting: {green}\n\
         Page size: {kb}KB\n\
         \n\
         Please provide:\n\
         1. A personalized, engaging summary of the environmental impact (2-3 sentences)\n\
         2. 3-5 specific, actionable suggestions for improvement, as a numbered list under a \"Suggestions:\" heading\n\
         \n\
         Make it educational but not preachy. Use relatable comparisons \
         (like \"equivalent to X SMS messages\" or \"like boiling Y kettles\").",
        co2 = metrics.co2_grams,
        energy = metrics.energy_wh,
        cleaner = metrics.cleaner_than_percent,
        green = if metrics.green { "Yes" } else { "No" },
        kb = (metrics.bytes as f64 / 1024.0).round() as u64,
    )
}

/// Prompt for a free-form sustainability question.
pub(crate) fn question_prompt(question: &str) -> String {
    format!(
        "You are an expert assistant on Corporate Social Responsibility (CSR) and \
         sustainable web development. Provide a clear, concise and helpful answer to \
         the following user question: \"{}\"",
        question.trim()
    )
}
