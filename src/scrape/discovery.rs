//! Link discovery on the listing page.
//!
//! Loads the homepage, nudges lazy-loaded content in with a few humanized
//! scroll passes, then scans anchors for article candidates the visited set
//! has not seen yet.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::page::{AnchorPreview, Page};
use crate::pacing::Pacer;
use crate::scrape::CycleStage;
use crate::store::VisitedState;

const HOMEPAGE_TIMEOUT: Duration = Duration::from_secs(30);
const CONSENT_TIMEOUT: Duration = Duration::from_secs(2);
const CONSENT_SELECTORS: &[&str] = &[
    "button[name=\"agree\"]",
    "#consent-page button.accept-all",
    ".con-wizard button.agree",
];

const SCROLL_FRACTION: f64 = 0.8;
const SCROLL_PASSES: (u64, u64) = (3, 4);
const SCROLL_PAUSE_MS: (u64, u64) = (1_500, 3_000);
const TOP_SETTLE_MS: u64 = 1_000;

/// Href fragments that mark an article link on the listing page.
const ARTICLE_HREF_MARKERS: &[&str] = &["/news/", "/m/"];
/// Anchors with shorter preview text are chrome links, not headlines.
const MIN_PREVIEW_CHARS: usize = 15;

/// Produce the deduplicated candidate list for one cycle. Navigation and
/// scan failures propagate; only consent dismissal is best-effort.
pub async fn discover_links(
    page: &mut dyn Page,
    pacer: &mut dyn Pacer,
    listing_url: &str,
    visited: &VisitedState,
) -> Result<Vec<AnchorPreview>> {
    CycleStage::Navigating.enter();
    page.goto(listing_url, HOMEPAGE_TIMEOUT)
        .await
        .with_context(|| format!("loading listing page {listing_url}"))?;

    dismiss_consent(page).await;

    // Scroll passes trigger lazy-loaded cards and keep the request pattern
    // human-shaped; the pacing is part of the behavior, not cosmetics.
    CycleStage::Scrolling.enter();
    let passes = pacer.pick(SCROLL_PASSES.0, SCROLL_PASSES.1);
    for _ in 0..passes {
        page.scroll_by_viewport(SCROLL_FRACTION)
            .await
            .context("scrolling listing page")?;
        pacer.pause(SCROLL_PAUSE_MS.0, SCROLL_PAUSE_MS.1).await;
    }
    page.scroll_to_top().await.context("scrolling back to top")?;
    pacer.sleep_ms(TOP_SETTLE_MS).await;

    CycleStage::ExtractingLinks.enter();
    let anchors = page.anchors().await.context("scanning listing anchors")?;
    let scanned = anchors.len();

    let mut seen_hrefs = HashSet::new();
    let mut candidates = Vec::new();
    for anchor in anchors {
        if !looks_like_article(&anchor.href) {
            continue;
        }
        if anchor.text.chars().count() < MIN_PREVIEW_CHARS {
            continue;
        }
        if !seen_hrefs.insert(anchor.href.clone()) {
            continue;
        }
        if visited.contains(&anchor.href) {
            continue;
        }
        candidates.push(anchor);
    }

    info!(
        scanned,
        candidates = candidates.len(),
        listing = listing_url,
        "link discovery complete"
    );
    Ok(candidates)
}

fn looks_like_article(href: &str) -> bool {
    ARTICLE_HREF_MARKERS.iter().any(|m| href.contains(m))
}

/// Try the consent selectors within a short budget; absence and failure are
/// both ignored.
async fn dismiss_consent(page: &mut dyn Page) {
    for selector in CONSENT_SELECTORS.iter().copied() {
        match page.click_if_visible(selector, CONSENT_TIMEOUT).await {
            Ok(true) => {
                debug!(selector, "dismissed consent overlay");
                return;
            }
            Ok(false) => {}
            Err(e) => {
                debug!(selector, error = %e, "consent dismissal skipped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_hrefs_match_news_and_m_paths() {
        assert!(looks_like_article("https://example.test/news/abc.html"));
        assert!(looks_like_article("https://example.test/m/xyz"));
        assert!(!looks_like_article("https://example.test/quote/TSLA"));
    }
}
