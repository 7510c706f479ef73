//! Crawler module for guide page fetching and processing
//!
//! The crawl is a three-stage pipeline:
//! - window enumeration (time-offset chart URLs)
//! - chart fetching (schedule-link extraction)
//! - detail fetching (program parsing and dedup)
//!
//! Stages run as independent workers wired together by the pipeline
//! coordinator over bounded hand-off queues.

mod chart;
mod detail;
mod pipeline;
mod windows;

pub use chart::extract_schedule_links;
pub use detail::{extract_duration_minutes, parse_detail_page, ParsedDetail};
pub use pipeline::{run_crawl, Pipeline};
pub use windows::chart_urls;

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client shared by the chart and detail stages.
///
/// Identification format: `CrawlerName/Version (+ContactURL; ContactEmail)`.
/// The per-request timeout bounds every GET so a hung response cannot block
/// its worker indefinitely.
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent string from the identification config
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}
