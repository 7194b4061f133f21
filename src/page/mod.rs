//! Browser-page capability seam.
//!
//! The pipeline only needs a handful of page operations: navigate with a
//! timeout, a best-effort click for consent overlays, scrolling, an anchor
//! scan, and a prioritized text query. They live behind [`Page`] /
//! [`Browser`] traits so the scraping logic runs unchanged against the
//! HTTP-backed implementation, a scripted fixture, or a future CDP-driven
//! browser.

pub mod fixture;
pub mod http;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

pub use http::HttpBrowser;

/// Candidate link surfaced by an anchor scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPreview {
    /// Absolute URL the anchor points at.
    pub href: String,
    /// The anchor's own visible text, or the text of a descendant heading
    /// when the anchor itself carries none. Whitespace-collapsed.
    pub text: String,
}

/// One live page. Acquired per scrape cycle and closed before the next.
#[async_trait]
pub trait Page: Send {
    /// Navigate to `url` and wait for DOM-ready (not full load) within
    /// `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Click the first visible element matching `selector`, waiting at most
    /// `timeout` for it to appear. Returns whether anything was clicked.
    async fn click_if_visible(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Scroll down by `fraction` of the viewport height.
    async fn scroll_by_viewport(&mut self, fraction: f64) -> Result<()>;

    /// Scroll back to the top of the page.
    async fn scroll_to_top(&mut self) -> Result<()>;

    /// All anchors on the current page in DOM order, hrefs resolved to
    /// absolute URLs.
    async fn anchors(&self) -> Result<Vec<AnchorPreview>>;

    /// Text of the first element matching any of `selectors`, tried in
    /// order. `None` when nothing matches or every match is empty.
    async fn first_text(&self, selectors: &[&str]) -> Result<Option<String>>;

    /// Release the page. Called exactly once per cycle, success or failure.
    async fn close(&mut self) -> Result<()>;
}

/// Long-lived browser handle owned by the collector for the process
/// lifetime.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn Page>>;
}

/// Collapse runs of whitespace to single spaces and trim.
pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
