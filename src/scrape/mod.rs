//! Scrape orchestration: one full cycle and the supervisor loop around it.
//!
//! A cycle opens a page, loads the persisted state fresh, runs discovery and
//! extraction, persists the results, and closes the page in a guaranteed
//! cleanup step. The supervisor runs cycles forever on a fixed interval and
//! treats any cycle-level fault as a logged no-op; the process never exits
//! because a cycle failed.

pub mod discovery;
pub mod extract;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::{debug, error, info};

use crate::config::CollectorConfig;
use crate::page::{Browser, Page};
use crate::pacing::Pacer;
use crate::store::{NewsStore, VisitedState};
use extract::VisitOutcome;

/// One-time metrics registration (so series show up for any exporter the
/// embedding process installs).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scrape_cycles_total", "Completed scrape cycles.");
        describe_counter!(
            "scrape_cycle_failures_total",
            "Cycles aborted by a cycle-level fault."
        );
        describe_counter!(
            "scrape_articles_collected_total",
            "Articles classified and persisted."
        );
        describe_counter!(
            "scrape_articles_discarded_total",
            "Visits discarded as noise (short headline)."
        );
        describe_counter!(
            "scrape_article_failures_total",
            "Per-article faults, permanently skipped."
        );
        describe_gauge!(
            "scrape_last_cycle_ts",
            "Unix ts when the last cycle finished."
        );
    });
}

/// Stages a cycle moves through, surfaced as structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Idle,
    Navigating,
    Scrolling,
    ExtractingLinks,
    ProcessingArticles,
    Persisting,
}

impl CycleStage {
    pub fn as_str(self) -> &'static str {
        match self {
            CycleStage::Idle => "idle",
            CycleStage::Navigating => "navigating",
            CycleStage::Scrolling => "scrolling",
            CycleStage::ExtractingLinks => "extracting_links",
            CycleStage::ProcessingArticles => "processing_articles",
            CycleStage::Persisting => "persisting",
        }
    }

    pub(crate) fn enter(self) {
        debug!(stage = self.as_str(), "cycle stage");
    }
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub discovered: usize,
    pub collected: usize,
    pub discarded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Long-lived collector context: the browser handle, the pacing provider,
/// and the configuration. Constructed once at startup and passed through
/// every cycle, with no process-wide singletons behind it.
pub struct Collector {
    config: CollectorConfig,
    browser: Box<dyn Browser>,
    pacer: Box<dyn Pacer>,
}

impl Collector {
    pub fn new(config: CollectorConfig, browser: Box<dyn Browser>, pacer: Box<dyn Pacer>) -> Self {
        ensure_metrics_described();
        Self {
            config,
            browser,
            pacer,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Run one full cycle. The page acquired here is closed before this
    /// returns, success or failure.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let started = Instant::now();
        let mut page = self
            .browser
            .open_page()
            .await
            .context("opening browser page")?;

        let result = self.drive(page.as_mut()).await;

        if let Err(e) = page.close().await {
            debug!(error = ?e, "page close failed");
        }

        let mut report = result?;
        report.elapsed = started.elapsed();
        Ok(report)
    }

    async fn drive(&mut self, page: &mut dyn Page) -> Result<CycleReport> {
        // State is re-loaded every cycle so operators can inspect or edit
        // the files between runs.
        let mut visited = VisitedState::load(&self.config.state_path);

        let candidates = discovery::discover_links(
            page,
            self.pacer.as_mut(),
            &self.config.homepage_url,
            &visited,
        )
        .await?;

        CycleStage::ProcessingArticles.enter();
        let visits = extract::process_candidates(page, self.pacer.as_mut(), &candidates).await;

        CycleStage::Persisting.enter();
        let mut report = CycleReport {
            discovered: candidates.len(),
            ..CycleReport::default()
        };
        let mut articles = Vec::new();
        for visit in visits {
            visited.mark(&visit.url);
            match visit.outcome {
                VisitOutcome::Collected(article) => articles.push(article),
                VisitOutcome::Discarded => report.discarded += 1,
                VisitOutcome::Failed => report.failed += 1,
            }
        }
        report.collected = articles.len();

        if !articles.is_empty() {
            let mut news = NewsStore::load(&self.config.news_path);
            news.append(articles);
            news.save(&self.config.news_path)
                .context("saving news store")?;
        }
        // Visited URLs are persisted even when every visit was noise or a
        // failure, so they are never retried in a later cycle.
        visited
            .save(&self.config.state_path)
            .context("saving visited state")?;

        Ok(report)
    }

    /// Supervisor loop: run a cycle, log its outcome, sleep the fixed
    /// interval, repeat. Cycle faults are contained here; only startup
    /// faults (before this is called) terminate the process.
    pub async fn run_forever(&mut self) -> Result<()> {
        let interval = Duration::from_secs(self.config.scan_interval_secs);
        loop {
            match self.run_cycle().await {
                Ok(report) => {
                    counter!("scrape_cycles_total").increment(1);
                    counter!("scrape_articles_collected_total")
                        .increment(report.collected as u64);
                    counter!("scrape_articles_discarded_total")
                        .increment(report.discarded as u64);
                    counter!("scrape_article_failures_total").increment(report.failed as u64);
                    info!(
                        discovered = report.discovered,
                        collected = report.collected,
                        discarded = report.discarded,
                        failed = report.failed,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "scrape cycle complete"
                    );
                }
                Err(e) => {
                    counter!("scrape_cycle_failures_total").increment(1);
                    error!(error = ?e, "scrape cycle failed; continuing after interval");
                }
            }
            gauge!("scrape_last_cycle_ts")
                .set(chrono::Utc::now().timestamp().max(0) as f64);

            // The sleep strictly follows cycle completion, persistence
            // writes included.
            debug!(stage = CycleStage::Idle.as_str(), secs = interval.as_secs(), "sleeping");
            tokio::time::sleep(interval).await;
        }
    }
}
