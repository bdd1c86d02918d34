//! Configuration types and CLI options.
//!
//! `Config` doubles as the command-line parser of the binary and as the plain
//! configuration struct of the library (`Config::default()` needs no CLI).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    analysis_deadline, DB_PATH, DEFAULT_CARBON_API_URL, DEFAULT_GREEN_REGISTRY_URL, DEFAULT_LISTEN_ADDR,
    DEFAULT_NARRATIVE_API_URL, DEFAULT_NARRATIVE_MODEL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, RECENT_CACHE_CAPACITY,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Service configuration.
///
/// # Examples
///
/// ```no_run
/// use eco_web_analyzer::Config;
///
/// let config = Config {
///     use_external_api: false,
///     narrative_api_key: None,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "eco_web_analyzer", version, about)]
pub struct Config {
    /// Address the HTTP API listens on
    #[arg(long, env = "ECO_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Database path (SQLite file)
    #[arg(long, env = "ECO_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Per-request timeout for outbound calls, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value for outbound calls
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Query the external carbon metrics API before the internal estimate
    #[arg(long, env = "ECO_USE_EXTERNAL_API", default_value_t = true, action = clap::ArgAction::Set)]
    pub use_external_api: bool,

    /// Carbon metrics API endpoint
    #[arg(long, env = "ECO_CARBON_API_URL", default_value = DEFAULT_CARBON_API_URL)]
    pub carbon_api_url: String,

    /// Probe target pages with a HEAD request to measure their size
    #[arg(long, env = "ECO_PROBE_PAGES", default_value_t = true, action = clap::ArgAction::Set)]
    pub probe_pages: bool,

    /// Allow page probes to reach loopback, private and link-local addresses
    #[arg(long, env = "ECO_ALLOW_PRIVATE_TARGETS", default_value_t = false, action = clap::ArgAction::Set)]
    pub allow_private_targets: bool,

    /// Green hosting registry endpoint (hostname is appended as a path segment)
    #[arg(long, env = "ECO_GREEN_REGISTRY_URL", default_value = DEFAULT_GREEN_REGISTRY_URL)]
    pub green_registry_url: String,

    /// Base URL of the chat-completion API used for narratives
    #[arg(long, env = "ECO_NARRATIVE_API_URL", default_value = DEFAULT_NARRATIVE_API_URL)]
    pub narrative_api_url: String,

    /// API key for the narrative model (narratives use the local template when unset)
    #[arg(long, env = "ECO_NARRATIVE_API_KEY", hide_env_values = true)]
    pub narrative_api_key: Option<String>,

    /// Chat-completion model name
    #[arg(long, env = "ECO_NARRATIVE_MODEL", default_value = DEFAULT_NARRATIVE_MODEL)]
    pub narrative_model: String,

    /// Number of recent analyses kept in memory
    #[arg(long, default_value_t = RECENT_CACHE_CAPACITY)]
    pub recent_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            db_path: PathBuf::from(DB_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            use_external_api: true,
            carbon_api_url: DEFAULT_CARBON_API_URL.to_string(),
            probe_pages: true,
            allow_private_targets: false,
            green_registry_url: DEFAULT_GREEN_REGISTRY_URL.to_string(),
            narrative_api_url: DEFAULT_NARRATIVE_API_URL.to_string(),
            narrative_api_key: None,
            narrative_model: DEFAULT_NARRATIVE_MODEL.to_string(),
            recent_cache_capacity: RECENT_CACHE_CAPACITY,
        }
    }
}

impl Config {
    /// Overall deadline of one analysis under this configuration.
    pub fn analysis_deadline(&self) -> Duration {
        analysis_deadline(self.timeout_seconds)
    }
}
