//! Chart fetching: the second pipeline stage
//!
//! Consumes chart URLs, fetches each page, and extracts the detail link of
//! every anchor flagged with the `schedule-link` class, in document order.
//! A politeness interval separates consecutive chart fetches.
//!
//! A failed chart fetch is recoverable per URL: the URL is logged and
//! skipped. Only `max-chart-failures` *consecutive* failures abort the run,
//! since an unbroken failure streak means the guide itself is unreachable
//! and the rest of the crawl is meaningless.

use crate::config::Config;
use crate::GuideError;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use super::pipeline::cancelled;

/// Markup contract: anchors carrying the schedule-link class hold relative
/// detail-page hrefs.
static SCHEDULE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.schedule-link").expect("static selector"));

/// Extracts every schedule-link href from a chart page, in document order
pub fn extract_schedule_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&SCHEDULE_LINK)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Fetches one chart page and returns its detail links
async fn fetch_chart(client: &Client, url: &str) -> Result<Vec<String>, GuideError> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|source| GuideError::Http {
            url: url.to_string(),
            source,
        })?;

    let body = response.text().await.map_err(|source| GuideError::Http {
        url: url.to_string(),
        source,
    })?;

    // Html is not Send; parse and drop it before the next await point
    Ok(extract_schedule_links(&body))
}

/// Chart stage worker: chart URLs in, detail links out.
///
/// Returning `Err` aborts the whole run; dropping `links_tx` on return
/// closes the downstream queue in dependency order.
pub(super) async fn chart_stage(
    client: Client,
    config: Arc<Config>,
    mut charts_rx: mpsc::Receiver<String>,
    links_tx: mpsc::Sender<String>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), GuideError> {
    let interval = Duration::from_millis(config.crawler.chart_interval_ms);
    let mut consecutive_failures = 0u32;

    loop {
        let chart_url = tokio::select! {
            _ = cancelled(&mut shutdown) => return Ok(()),
            maybe = charts_rx.recv() => match maybe {
                Some(url) => url,
                None => return Ok(()),
            },
        };

        // Politeness wait before every chart request
        tokio::select! {
            _ = cancelled(&mut shutdown) => return Ok(()),
            _ = tokio::time::sleep(interval) => {}
        }

        match fetch_chart(&client, &chart_url).await {
            Ok(links) => {
                consecutive_failures = 0;
                tracing::debug!(chart = %chart_url, links = links.len(), "Fetched chart page");

                for link in links {
                    if links_tx.send(link).await.is_err() {
                        // Downstream is gone; nothing left to produce for
                        return Ok(());
                    }
                }
            }
            Err(e) => {
                consecutive_failures += 1;
                tracing::warn!(
                    chart = %chart_url,
                    error = %e,
                    consecutive_failures,
                    "Chart fetch failed, skipping"
                );

                if consecutive_failures >= config.crawler.max_chart_failures {
                    return Err(GuideError::ChartFailures {
                        failures: consecutive_failures,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_schedule_links_in_document_order() {
        let html = r#"
            <html><body>
                <a class="schedule-link" href="/schedule/101048201511291800.action">News</a>
                <a class="schedule-link" href="/schedule/101048201511291900.action">Drama</a>
                <a class="schedule-link" href="/schedule/102022201511291800.action">Sports</a>
            </body></html>
        "#;

        let links = extract_schedule_links(html);
        assert_eq!(
            links,
            vec![
                "/schedule/101048201511291800.action",
                "/schedule/101048201511291900.action",
                "/schedule/102022201511291800.action",
            ]
        );
    }

    #[test]
    fn test_ignores_other_anchors() {
        let html = r#"
            <html><body>
                <a href="/about">About</a>
                <a class="nav-link" href="/chart/23.action">Chart</a>
                <a class="schedule-link" href="/schedule/101048201511291800.action">News</a>
            </body></html>
        "#;

        let links = extract_schedule_links(html);
        assert_eq!(links, vec!["/schedule/101048201511291800.action"]);
    }

    #[test]
    fn test_schedule_link_without_href_skipped() {
        let html = r#"<html><body><a class="schedule-link">broken</a></body></html>"#;
        assert!(extract_schedule_links(html).is_empty());
    }

    #[test]
    fn test_empty_chart_page() {
        assert!(extract_schedule_links("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_duplicate_links_preserved() {
        // Dedup is the detail stage's job; the chart stage reports every
        // occurrence it sees.
        let html = r#"
            <html><body>
                <a class="schedule-link" href="/schedule/101048201511291800.action">News</a>
                <a class="schedule-link" href="/schedule/101048201511291800.action">News</a>
            </body></html>
        "#;

        assert_eq!(extract_schedule_links(html).len(), 2);
    }
}
