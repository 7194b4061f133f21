//! Per-article extraction.
//!
//! Visits each candidate serially, resolves a headline and byline from
//! prioritized selector lists, and classifies what survives the noise gate.
//! A failing article never aborts the batch: its URL still counts as
//! visited, so it is permanently skipped rather than retried.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::classify::categorize;
use crate::page::{collapse_ws, AnchorPreview, Page};
use crate::pacing::Pacer;
use crate::store::NewsArticle;

const ARTICLE_TIMEOUT: Duration = Duration::from_secs(15);
const SETTLE_MS: u64 = 1_500;
const ARTICLE_PAUSE_MS: (u64, u64) = (800, 1_500);

/// Resolved headlines shorter than this are listing noise, not articles.
const MIN_HEADLINE_CHARS: usize = 10;

/// Byline fallback when the article page exposes none.
pub const FALLBACK_SOURCE: &str = "Yahoo Finance";

const HEADLINE_SELECTORS: &[&str] = &[
    "h1[data-test-locator=\"headline\"]",
    ".caas-title-wrapper h1",
    "header h1",
    "article h1",
    "h1",
];

const BYLINE_SELECTORS: &[&str] = &[
    ".caas-attr-provider",
    "[data-test-locator=\"byline\"]",
    ".caas-attr-meta a",
    ".byline",
];

/// What happened to one candidate URL. Every variant marks the URL visited;
/// the persisted marker does not distinguish them, this enum exists so logs
/// and counters can.
#[derive(Debug, Clone)]
pub enum VisitOutcome {
    /// Classified and emitted.
    Collected(NewsArticle),
    /// Resolved headline under the noise gate; dropped without an article.
    Discarded,
    /// Navigation or extraction fault, caught locally.
    Failed,
}

#[derive(Debug, Clone)]
pub struct Visit {
    pub url: String,
    pub outcome: VisitOutcome,
}

/// Visit every candidate in listing order. Per-article faults are captured
/// in the returned outcomes; this function itself does not fail.
pub async fn process_candidates(
    page: &mut dyn Page,
    pacer: &mut dyn Pacer,
    candidates: &[AnchorPreview],
) -> Vec<Visit> {
    let mut visits = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let outcome = match visit_article(page, pacer, candidate).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(url = %candidate.href, error = ?e, "article visit failed, skipping permanently");
                VisitOutcome::Failed
            }
        };
        visits.push(Visit {
            url: candidate.href.clone(),
            outcome,
        });
        pacer.pause(ARTICLE_PAUSE_MS.0, ARTICLE_PAUSE_MS.1).await;
    }
    visits
}

async fn visit_article(
    page: &mut dyn Page,
    pacer: &mut dyn Pacer,
    candidate: &AnchorPreview,
) -> Result<VisitOutcome> {
    page.goto(&candidate.href, ARTICLE_TIMEOUT)
        .await
        .context("navigating to article")?;
    pacer.sleep_ms(SETTLE_MS).await;

    let extracted = page
        .first_text(HEADLINE_SELECTORS)
        .await
        .context("extracting headline")?;
    let headline = match extracted {
        Some(text) if !text.is_empty() => collapse_ws(&text),
        _ => collapse_ws(&candidate.text),
    };

    if headline.chars().count() < MIN_HEADLINE_CHARS {
        debug!(url = %candidate.href, headline = %headline, "headline under noise gate, discarding");
        return Ok(VisitOutcome::Discarded);
    }

    let source = page
        .first_text(BYLINE_SELECTORS)
        .await
        .context("extracting byline")?
        .map(|text| collapse_ws(&text))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_SOURCE.to_string());

    let category = categorize(&headline);
    debug!(url = %candidate.href, tag = category.tag(), "collected article");
    Ok(VisitOutcome::Collected(NewsArticle::new(
        category,
        headline,
        candidate.href.clone(),
        source,
    )))
}
