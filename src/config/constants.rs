//! Configuration constants.
//!
//! This module defines the operational parameters (timeouts, retry policy, limits)
//! and the calibration policy of the estimation engine (emission factors, the
//! hostname heuristic table, percentile tiers, green hosting allowlist).

use std::time::Duration;

// Network operation timeouts
/// Per-request timeout for every outbound call, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Outbound stages an analysis waits on in sequence: carbon API, then the
/// internal chain (HEAD probe and registry lookup run concurrently), then the
/// narrative model.
pub const SEQUENTIAL_OUTBOUND_STAGES: u64 = 3;
/// Slack added to the analysis deadline for scoring and persistence, in seconds
pub const ANALYSIS_DEADLINE_MARGIN_SECS: u64 = 5;

/// Default User-Agent string for outbound requests.
pub const DEFAULT_USER_AGENT: &str = concat!("eco_web_analyzer/", env!("CARGO_PKG_VERSION"));

// Retry strategy
/// Initial delay in milliseconds before the retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 250;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 2;
/// Number of retries after the initial attempt.
/// Outbound calls are advisory, so one retry is enough before falling back.
pub const RETRY_MAX_RETRIES: usize = 1;

/// Upper bound for one whole analysis given the per-call timeout.
///
/// Covers every sequential stage running all of its attempts to the timeout,
/// plus the longest backoff between attempts. An analysis still running past
/// this point is answered from the offline heuristic.
pub fn analysis_deadline(timeout_secs: u64) -> Duration {
    let attempts = RETRY_MAX_RETRIES as u64 + 1;
    let backoff = RETRY_MAX_RETRIES as u64 * RETRY_MAX_DELAY_SECS;
    let per_stage = attempts * timeout_secs + backoff;
    Duration::from_secs(SEQUENTIAL_OUTBOUND_STAGES * per_stage + ANALYSIS_DEADLINE_MARGIN_SECS)
}

// URL validation
/// Maximum accepted URL length in characters
pub const MAX_URL_LENGTH: usize = 2048;
/// Redirect hops followed by outbound requests
pub const MAX_REDIRECTS: usize = 10;

// Emission factors
/// Grams of CO2 per transferred byte on renewable-powered hosting
pub const CO2_PER_BYTE_GREEN: f64 = 0.000000233;
/// Grams of CO2 per transferred byte on standard grid hosting
pub const CO2_PER_BYTE_STANDARD: f64 = 0.000000494;
/// Watt-hours per transferred byte (independent of hosting type)
pub const ENERGY_PER_BYTE_WH: f64 = 0.000000006;
/// SMS messages per gram of CO2, used in narrative comparisons
pub const SMS_PER_GRAM_CO2: f64 = 20.0;

/// Page weight assumed for hosts that match no heuristic category
pub const DEFAULT_PAGE_BYTES: u64 = 300_000;

/// A hostname category of the byte heuristic.
#[derive(Debug, Clone, Copy)]
pub struct SiteCategory {
    /// Category name (for logs)
    pub name: &'static str,
    /// Substrings matched against the lowercased hostname
    pub patterns: &'static [&'static str],
    /// Representative page weight in bytes
    pub bytes: u64,
}

/// Hostname categories, evaluated in order; the first match wins.
pub const SITE_CATEGORIES: &[SiteCategory] = &[
    SiteCategory {
        name: "search",
        patterns: &["google", "search"],
        bytes: 50_000,
    },
    SiteCategory {
        name: "news",
        patterns: &["news", "blog"],
        bytes: 800_000,
    },
    SiteCategory {
        name: "ecommerce",
        patterns: &["shop", "store", "amazon"],
        bytes: 1_200_000,
    },
    SiteCategory {
        name: "video",
        patterns: &["video", "youtube", "netflix"],
        bytes: 2_500_000,
    },
    SiteCategory {
        name: "social",
        patterns: &["social", "facebook", "instagram"],
        bytes: 1_500_000,
    },
];

/// Hosting platforms known to run on renewable infrastructure.
/// Matched as hostname suffixes.
pub const GREEN_HOSTING_SUFFIXES: &[&str] = &[
    "github.io",
    "netlify.app",
    "vercel.app",
    "surge.sh",
    "pages.dev",
];

/// Percentile tiers as `(exclusive upper byte bound, cleaner-than percent)`.
/// Pages above the last bound get `HEAVIEST_TIER_PERCENT`.
pub const PERCENTILE_TIERS: &[(u64, u8)] = &[
    (500_000, 80),
    (1_000_000, 65),
    (2_000_000, 45),
    (4_000_001, 25),
];
/// Percentile for pages heavier than 4MB
pub const HEAVIEST_TIER_PERCENT: u8 = 10;
/// Percentile bonus for green hosting
pub const GREEN_PERCENTILE_BONUS: u8 = 15;
/// Ceiling for the green-boosted percentile
pub const GREEN_PERCENTILE_CAP: u8 = 95;

// Narrative model
/// Default chat-completion model
pub const DEFAULT_NARRATIVE_MODEL: &str = "gpt-4.1-nano";
/// Token budget for one narrative completion
pub const NARRATIVE_MAX_TOKENS: u32 = 500;
/// Maximum number of suggestions kept from a model response
pub const MAX_SUGGESTIONS: usize = 5;
/// Minimum number of suggestions in a result
pub const MIN_SUGGESTIONS: usize = 3;

/// Suggestions used when the model is unavailable or returns none.
pub const FALLBACK_SUGGESTIONS: &[&str] = &[
    "Optimize and compress images to reduce file sizes",
    "Minify CSS and JavaScript files",
    "Consider switching to green web hosting",
    "Remove unused fonts and scripts",
    "Implement lazy loading for images",
];

// Upstream endpoints
pub const DEFAULT_CARBON_API_URL: &str = "https://api.websitecarbon.com/site";
pub const DEFAULT_GREEN_REGISTRY_URL: &str =
    "https://api.thegreenwebfoundation.org/api/v3/greencheck";
pub const DEFAULT_NARRATIVE_API_URL: &str = "https://api.openai.com/v1";

// History
/// Records returned by "my analyses" when no limit is given
pub const OWNER_HISTORY_LIMIT: usize = 10;
/// Records returned by "recent analyses" when no limit is given
pub const GLOBAL_HISTORY_LIMIT: usize = 5;
/// Hard ceiling for any history query
pub const MAX_HISTORY_LIMIT: usize = 100;
/// Default capacity of the in-memory recent analyses ring buffer
pub const RECENT_CACHE_CAPACITY: usize = 50;

// Server
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DB_PATH: &str = "./eco_web_analyzer.db";
/// Header carrying the authenticated owner identifier, set by the auth layer in front
pub const OWNER_ID_HEADER: &str = "x-owner-id";

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
