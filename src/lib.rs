//! Guidefeed: a polite TV guide crawler
//!
//! This crate crawls a public web-based TV guide, extracting upcoming
//! broadcast programs from time-windowed chart pages and per-program detail
//! pages, and publishes the collected programs as an Atom feed.

pub mod config;
pub mod crawler;
pub mod feed;
pub mod program;

use thiserror::Error;

/// Main error type for guidefeed operations
#[derive(Debug, Error)]
pub enum GuideError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Chart fetching aborted after {failures} consecutive failures")]
    ChartFailures { failures: u32 },

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("Page error for {url}: {source}")]
    Page { url: String, source: PageError },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Pipeline worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Feed serialization error: {0}")]
    Feed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Recoverable per-page errors. A detail page that cannot be parsed is
/// logged and skipped, never fatal to the run.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("missing expected node: {0}")]
    MissingNode(&'static str),

    #[error("no numeric token in schedule text {0:?}")]
    NoDuration(String),

    #[error("numeric token in {0:?} is not a valid duration")]
    BadDuration(String),

    #[error("program link {0:?} is too short for an identity prefix")]
    BadIdentity(String),

    #[error("invalid channel code in {0:?}")]
    BadChannel(String),

    #[error("invalid start time in {0:?}")]
    BadStartTime(String),
}

/// Result type alias for guidefeed operations
pub type Result<T> = std::result::Result<T, GuideError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use program::Program;
