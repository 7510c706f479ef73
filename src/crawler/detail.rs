//! Detail fetching and parsing: the third pipeline stage
//!
//! Consumes detail-page links, deduplicates them by identity key, fetches
//! and parses each page into a [`Program`], and emits the records
//! downstream. This stage exclusively owns the run's dedup set; it is a
//! single sequential worker, so the set needs no lock. Were this stage ever
//! fanned out, the check-and-insert would have to become atomic to keep
//! at-most-once processing per identity.
//!
//! Markup contract (versioned against the guide site): the detail page
//! carries a `dl.basicTxt` definition list whose first `dd` holds the title
//! and whose second `dd` holds free-text schedule/duration text ending in
//! the minute count ("放送 ... 60分" patterns).

use crate::config::Config;
use crate::program::{identity_key, Program, ProgramIdentity};
use crate::{GuideError, PageError};
use chrono::FixedOffset;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use url::Url;

use super::pipeline::cancelled;

static INFO_BLOCKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("dl.basicTxt dd").expect("static selector"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static pattern"));

/// Title and schedule text extracted from a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDetail {
    pub title: String,
    pub schedule_text: String,
}

/// Parses a detail page body into its title and schedule text
pub fn parse_detail_page(html: &str) -> Result<ParsedDetail, PageError> {
    let document = Html::parse_document(html);
    let mut infos = document.select(&INFO_BLOCKS);

    let title = infos
        .next()
        .map(|dd| dd.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or(PageError::MissingNode("dl.basicTxt dd (title)"))?;

    let schedule_text = infos
        .next()
        .map(|dd| dd.text().collect::<String>().trim().to_string())
        .ok_or(PageError::MissingNode("dl.basicTxt dd (schedule)"))?;

    Ok(ParsedDetail {
        title,
        schedule_text,
    })
}

/// Extracts the duration in minutes from free-text schedule description.
///
/// The guide's markup habitually ends the schedule sentence with the minute
/// count, so the *last* maximal digit run is the duration. Dates and clock
/// times earlier in the text must never be selected. Any drift in that
/// markup habit surfaces here as an explicit parse error, not silent
/// corruption.
pub fn extract_duration_minutes(schedule_text: &str) -> Result<i64, PageError> {
    let token = DIGIT_RUN
        .find_iter(schedule_text)
        .last()
        .ok_or_else(|| PageError::NoDuration(schedule_text.to_string()))?;

    token
        .as_str()
        .parse::<i64>()
        .map_err(|_| PageError::BadDuration(schedule_text.to_string()))
}

/// Fetches one detail page and assembles the full program record
async fn fetch_program(
    client: &Client,
    link: &Url,
    zone: FixedOffset,
) -> Result<Program, GuideError> {
    let http_err = |source| GuideError::Http {
        url: link.to_string(),
        source,
    };
    let page_err = |source| GuideError::Page {
        url: link.to_string(),
        source,
    };

    let response = client
        .get(link.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(http_err)?;
    let body = response.text().await.map_err(http_err)?;

    // Html is not Send; everything parsed is owned before the function
    // yields again
    let detail = parse_detail_page(&body).map_err(page_err)?;
    let duration_minutes = extract_duration_minutes(&detail.schedule_text).map_err(page_err)?;
    let identity = ProgramIdentity::from_link(link, zone).map_err(page_err)?;

    Ok(Program {
        channel_id: identity.channel_id,
        title: detail.title,
        start_time: identity.start_time,
        duration_minutes,
        link: link.to_string(),
    })
}

/// Detail stage worker: detail links in, program records out.
///
/// Every recoverable failure (transport or parse) skips the single link and
/// leaves its dedup entry in place, so a permanently malformed page is
/// never retried within the run.
pub(super) async fn detail_stage(
    client: Client,
    config: Arc<Config>,
    mut links_rx: mpsc::Receiver<String>,
    programs_tx: mpsc::Sender<Program>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), GuideError> {
    let base = Url::parse(&config.source.base_url)?;
    let zone = config.source.zone();
    let interval = Duration::from_millis(config.crawler.detail_interval_ms);

    // Identities seen this run; owned by this worker alone
    let mut seen: HashSet<String> = HashSet::new();

    loop {
        let href = tokio::select! {
            _ = cancelled(&mut shutdown) => return Ok(()),
            maybe = links_rx.recv() => match maybe {
                Some(href) => href,
                None => return Ok(()),
            },
        };

        let link = match base.join(&href) {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(href = %href, error = %e, "Unresolvable detail link, skipping");
                continue;
            }
        };

        let key = match identity_key(&link) {
            Ok(key) => key.to_string(),
            Err(e) => {
                tracing::warn!(link = %link, error = %e, "Detail link has no identity, skipping");
                continue;
            }
        };

        // Insert before fetching: a second occurrence must never be
        // re-processed, even if this one fails to parse
        if !seen.insert(key) {
            tracing::trace!(link = %link, "Already seen, skipping");
            continue;
        }

        // Politeness wait before every detail request
        tokio::select! {
            _ = cancelled(&mut shutdown) => return Ok(()),
            _ = tokio::time::sleep(interval) => {}
        }

        match fetch_program(&client, &link, zone).await {
            Ok(program) => {
                tracing::debug!(
                    link = %link,
                    channel_id = program.channel_id,
                    title = %program.title,
                    "Parsed program"
                );

                if programs_tx.send(program).await.is_err() {
                    return Ok(());
                }
            }
            Err(e) => {
                tracing::warn!(link = %link, error = %e, "Detail page skipped");
            }
        }
    }
}
