//! Pipeline coordinator
//!
//! Wires the three crawl stages together over bounded hand-off queues:
//!
//! ```text
//! windows ──charts──▶ chart stage ──links──▶ detail stage ──programs──▶ Vec
//! ```
//!
//! Every queue is bounded by `queue-capacity`, so a producer running ahead
//! of a slower consumer blocks on enqueue instead of growing memory; that
//! backpressure, together with the per-stage politeness intervals, bounds
//! the crawl's pace against the guide site. Each stage closes its output by
//! dropping the sender once its input is exhausted, so end-of-stream
//! propagates strictly downstream.

use crate::config::Config;
use crate::program::Program;
use crate::{GuideError, Result};
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use super::chart::chart_stage;
use super::detail::detail_stage;
use super::windows::chart_urls;

/// Resolves once the shutdown signal is raised.
///
/// Pends forever if the sender side is gone, so a dropped signal handle
/// never reads as a cancellation.
pub(super) async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Pipeline coordinator: owns the shared HTTP client and runs one crawl
pub struct Pipeline {
    config: Arc<Config>,
    client: Client,
}

impl Pipeline {
    /// Creates a pipeline from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        let client = super::build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Runs one crawl and returns the collected programs in discovery order.
    ///
    /// `started_at` is the crawl-start instant every window offset is
    /// computed from; capturing it here (rather than sampling "now" per
    /// window) keeps the run's temporal behavior a pure function of its
    /// inputs.
    ///
    /// A chart-stage abort or a raised shutdown signal fails the whole run;
    /// per-page failures in the detail stage only shrink the result.
    pub async fn run(
        &self,
        started_at: DateTime<FixedOffset>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Vec<Program>> {
        let capacity = self.config.crawler.queue_capacity;
        let (charts_tx, charts_rx) = mpsc::channel::<String>(capacity);
        let (links_tx, links_rx) = mpsc::channel::<String>(capacity);
        let (programs_tx, mut programs_rx) = mpsc::channel::<Program>(capacity);

        tracing::info!(
            windows = self.config.crawler.window_count,
            window_hours = self.config.crawler.window_hours,
            charts = self.config.source.chart_paths.len(),
            started_at = %started_at,
            "Starting crawl"
        );

        let windows = {
            let config = Arc::clone(&self.config);
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                for url in chart_urls(&config.source, &config.crawler, started_at) {
                    tokio::select! {
                        _ = cancelled(&mut shutdown) => return,
                        sent = charts_tx.send(url) => {
                            if sent.is_err() {
                                return;
                            }
                        }
                    }
                }
            })
        };

        let charts = tokio::spawn(chart_stage(
            self.client.clone(),
            Arc::clone(&self.config),
            charts_rx,
            links_tx,
            shutdown.clone(),
        ));

        let details = tokio::spawn(detail_stage(
            self.client.clone(),
            Arc::clone(&self.config),
            links_rx,
            programs_tx,
            shutdown.clone(),
        ));

        // The coordinator's own termination condition: exhaustion of the
        // program sequence, which follows the stages closing in dependency
        // order.
        let mut programs = Vec::new();
        while let Some(program) = programs_rx.recv().await {
            programs.push(program);
        }

        windows.await?;
        charts.await??;
        details.await??;

        if *shutdown.borrow() {
            return Err(GuideError::Cancelled);
        }

        tracing::info!(programs = programs.len(), "Crawl complete");
        Ok(programs)
    }
}

/// Runs a complete crawl with a fresh pipeline and no external shutdown
/// signal
pub async fn run_crawl(
    config: Config,
    started_at: DateTime<FixedOffset>,
) -> Result<Vec<Program>> {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let pipeline = Pipeline::new(config)?;
    pipeline.run(started_at, shutdown_rx).await
}
