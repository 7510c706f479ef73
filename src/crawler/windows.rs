//! Window enumeration: the first pipeline stage
//!
//! The guide site serves chart pages parameterized by a `head=YYYYMMDDHHMM`
//! query carrying the window start in site-local time. Enumerating
//! `window-count` offsets of `window-hours` each from a single crawl-start
//! instant covers the crawl horizon; each offset yields one URL per tracked
//! chart path.

use crate::config::{CrawlerConfig, SourceConfig};
use chrono::{DateTime, Duration, FixedOffset};

/// Strftime format of the `head=` query value
const HEAD_FORMAT: &str = "%Y%m%d%H%M";

/// Enumerates every chart URL for one crawl run.
///
/// The crawl-start instant is captured once by the caller and all offsets
/// are computed relative to it, so the produced windows are consistent with
/// each other no matter how long enumeration takes. The sequence is finite
/// and one-shot: `window-count * chart-paths.len()` URLs, grouped by offset
/// in ascending order.
pub fn chart_urls<'a>(
    source: &'a SourceConfig,
    crawler: &CrawlerConfig,
    started_at: DateTime<FixedOffset>,
) -> impl Iterator<Item = String> + 'a {
    let window_count = crawler.window_count as i64;
    let window_hours = crawler.window_hours as i64;
    let base = source.base_url.trim_end_matches('/').to_string();

    (0..window_count).flat_map(move |i| {
        let head = (started_at + Duration::hours(i * window_hours)).format(HEAD_FORMAT);
        let param = format!("head={}", head);
        let base = base.clone();
        source
            .chart_paths
            .iter()
            .map(move |path| format!("{}{}?{}", base, path, param))
    })
}
