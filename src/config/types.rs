use serde::Deserialize;

/// Main configuration structure for guidefeed
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub feed: FeedConfig,
}

/// Guide site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the guide site; relative detail links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Chart page paths tracked per window (e.g. terrestrial and satellite)
    #[serde(rename = "chart-paths")]
    pub chart_paths: Vec<String>,

    /// Fixed UTC offset of the guide site's local time, in hours
    #[serde(rename = "utc-offset-hours", default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

impl SourceConfig {
    /// The guide site's fixed local zone
    pub fn zone(&self) -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .expect("utc-offset-hours is range-checked at config load")
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of time-window offsets to enumerate
    #[serde(rename = "window-count")]
    pub window_count: u32,

    /// Hours between consecutive window offsets
    #[serde(rename = "window-hours")]
    pub window_hours: u32,

    /// Politeness interval between consecutive chart fetches (milliseconds)
    #[serde(rename = "chart-interval-ms")]
    pub chart_interval_ms: u64,

    /// Politeness interval between consecutive detail fetches (milliseconds)
    #[serde(rename = "detail-interval-ms")]
    pub detail_interval_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Capacity of the hand-off queues between pipeline stages
    #[serde(rename = "queue-capacity", default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Consecutive chart fetch failures that abort the run
    #[serde(rename = "max-chart-failures", default = "default_max_chart_failures")]
    pub max_chart_failures: u32,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Atom feed output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Path the Atom document is written to
    pub path: String,

    /// Feed title
    pub title: String,

    /// Feed description
    #[serde(default)]
    pub description: String,

    /// Optional cap on feed entries, first N by discovery order
    #[serde(rename = "max-items")]
    pub max_items: Option<usize>,
}

fn default_utc_offset() -> i32 {
    9
}

fn default_request_timeout() -> u64 {
    30
}

fn default_queue_capacity() -> usize {
    100
}

fn default_max_chart_failures() -> u32 {
    3
}
