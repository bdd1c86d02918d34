//! AI-generated summary and suggestions, with a deterministic fallback.
//!
//! The narrative never aborts an analysis: any model failure (no key, network
//! error, timeout, bad status, unparseable answer) yields the template text.

mod client;
mod fallback;
mod parse;
mod prompt;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use url::Url;

use crate::error_handling::UpstreamError;
use crate::estimate::CarbonMetrics;

pub use client::ChatClient;
pub(crate) use fallback::{bound_suggestions, fallback_suggestions, template_summary};
pub(crate) use parse::parse_model_text;

/// Summary text plus 3-5 suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub summary: String,
    pub suggestions: Vec<String>,
}

impl Narrative {
    /// The template narrative for `metrics`.
    pub fn fallback(metrics: &CarbonMetrics) -> Self {
        Self {
            summary: template_summary(metrics),
            suggestions: fallback_suggestions(),
        }
    }

    /// Builds a narrative from raw model text, or `None` when no suggestion
    /// could be parsed from it.
    pub fn from_model_text(text: &str, metrics: &CarbonMetrics) -> Option<Self> {
        let (summary, suggestions) = parse_model_text(text);
        if suggestions.is_empty() {
            return None;
        }
        let summary = if summary.is_empty() {
            template_summary(metrics)
        } else {
            summary
        };
        Some(Self {
            summary,
            suggestions: bound_suggestions(suggestions),
        })
    }
}

/// Result of a narration and whether the template was used.
#[derive(Debug, Clone)]
pub struct NarrativeOutput {
    pub narrative: Narrative,
    pub fell_back: bool,
}

/// Produces the narrative for an analysis.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Always returns a narrative; failures select the template.
    async fn narrate(&self, url: &Url, metrics: &CarbonMetrics) -> NarrativeOutput;

    /// Free-form sustainability question. No fallback.
    async fn ask(&self, question: &str) -> Result<String, UpstreamError>;
}

/// Narrator backed by the chat-completion model.
#[derive(Clone)]
pub struct ModelNarrator {
    client: ChatClient,
}

impl ModelNarrator {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Narrator for ModelNarrator {
    async fn narrate(&self, url: &Url, metrics: &CarbonMetrics) -> NarrativeOutput {
        if !self.client.is_configured() {
            debug!("No narrative API key configured, using template narrative");
            return NarrativeOutput {
                narrative: Narrative::fallback(metrics),
                fell_back: true,
            };
        }

        let prompt = prompt::analysis_prompt(url, metrics);
        let parsed = match self.client.complete(&prompt).await {
            Ok(text) => {
                let narrative = Narrative::from_model_text(&text, metrics);
                if narrative.is_none() {
                    warn!("Narrative model answer for {url} had no suggestions, using template");
                }
                narrative
            }
            Err(e) => {
                warn!("Narrative model failed for {url}, using template: {e}");
                None
            }
        };

        match parsed {
            Some(narrative) => NarrativeOutput {
                narrative,
                fell_back: false,
            },
            None => NarrativeOutput {
                narrative: Narrative::fallback(metrics),
                fell_back: true,
            },
        }
    }

    async fn ask(&self, question: &str) -> Result<String, UpstreamError> {
        self.client
            .complete(&prompt::question_prompt(question))
            .await
    }
}

/// Narrator that never calls out. Used when no model is configured and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

#[async_trait]
impl Narrator for TemplateNarrator {
    async fn narrate(&self, _url: &Url, metrics: &CarbonMetrics) -> NarrativeOutput {
        NarrativeOutput {
            narrative: Narrative::fallback(metrics),
            fell_back: true,
        }
    }

    async fn ask(&self, _question: &str) -> Result<String, UpstreamError> {
        Err(UpstreamError::NotConfigured {
            service: client::SERVICE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_deterministic() {
        let metrics = CarbonMetrics::from_page(650_000, false);
        let a = Narrative::fallback(&metrics);
        let b = Narrative::fallback(&metrics);
        assert_eq!(a, b);
        assert_eq!(a.suggestions.len(), 5);
        assert!(a.summary.contains("0.321g"));
        assert!(a.summary.contains("6 SMS messages"));
    }

    #[test]
    fn test_from_model_text_without_suggestions() {
        let metrics = CarbonMetrics::from_page(650_000, false);
        assert!(Narrative::from_model_text("Just prose, no list.", &metrics).is_none());
    }

    #[test]
    fn test_from_model_text_empty_summary_uses_template() {
        let metrics = CarbonMetrics::from_page(650_000, false);
        let narrative =
            Narrative::from_model_text("Suggestions:\n1. Compress images", &metrics).unwrap();
        assert_eq!(narrative.summary, template_summary(&metrics));
        assert_eq!(narrative.suggestions.len(), 3);
        assert_eq!(narrative.suggestions[0], "Compress images");
    }

    #[tokio::test]
    async fn test_template_narrator() {
        let url = Url::parse("https://example.com").unwrap();
        let metrics = CarbonMetrics::from_page(100_000, true);
        let output = TemplateNarrator.narrate(&url, &metrics).await;
        assert!(output.fell_back);
        assert_eq!(output.narrative, Narrative::fallback(&metrics));
        assert!(TemplateNarrator.ask("why?").await.is_err());
    }
}
