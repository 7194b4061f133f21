//! HTTP-backed page capability.
//!
//! Each navigation fetches the URL once and later queries run against the
//! parsed document. The document is static, so scroll operations accept and
//! return immediately; the pacing around them still applies upstream. A
//! driven-browser implementation can be swapped in behind the same trait.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{collapse_ws, AnchorPreview, Browser, Page};

/// Shared HTTP client behind the [`Browser`] seam.
pub struct HttpBrowser {
    client: reqwest::Client,
}

impl HttpBrowser {
    /// Build the process-wide client. Failure here is fatal to the process.
    pub fn launch(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn open_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            base: None,
            html: None,
        }))
    }
}

pub struct HttpPage {
    client: reqwest::Client,
    base: Option<Url>,
    html: Option<String>,
}

impl HttpPage {
    fn loaded(&self) -> Result<(&Url, Html)> {
        let base = self.base.as_ref().ok_or_else(|| anyhow!("no page loaded"))?;
        let html = self.html.as_deref().ok_or_else(|| anyhow!("no page loaded"))?;
        Ok((base, Html::parse_document(html)))
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("navigating to {url}"))?
            .error_for_status()
            .with_context(|| format!("navigating to {url}"))?;
        // Resolve the base against the final URL so relative hrefs survive
        // redirects.
        let base = Url::parse(response.url().as_str())
            .with_context(|| format!("resolving final url for {url}"))?;
        let body = response
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        self.base = Some(base);
        self.html = Some(body);
        Ok(())
    }

    async fn click_if_visible(&mut self, selector: &str, _timeout: Duration) -> Result<bool> {
        let (_, document) = self.loaded()?;
        let selector = parse_selector(selector)?;
        // A fetched document has no live overlay to dismiss; report presence
        // so callers log what a driven browser would have clicked.
        Ok(document.select(&selector).next().is_some())
    }

    async fn scroll_by_viewport(&mut self, _fraction: f64) -> Result<()> {
        Ok(())
    }

    async fn scroll_to_top(&mut self) -> Result<()> {
        Ok(())
    }

    async fn anchors(&self) -> Result<Vec<AnchorPreview>> {
        let (base, document) = self.loaded()?;
        let selector = parse_selector("a[href]")?;
        let mut out = Vec::new();
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            if resolved.scheme() != "http" && resolved.scheme() != "https" {
                continue;
            }
            out.push(AnchorPreview {
                href: resolved.to_string(),
                text: anchor_text(&element),
            });
        }
        Ok(out)
    }

    async fn first_text(&self, selectors: &[&str]) -> Result<Option<String>> {
        let (_, document) = self.loaded()?;
        for raw in selectors {
            let selector = parse_selector(raw)?;
            if let Some(element) = document.select(&selector).next() {
                let text = collapse_ws(&element.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty() {
                    return Ok(Some(text));
                }
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<()> {
        self.base = None;
        self.html = None;
        Ok(())
    }
}

/// Anchor's own text nodes, falling back to a descendant heading.
fn anchor_text(element: &ElementRef) -> String {
    let own: String = element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect();
    let own = collapse_ws(&own);
    if !own.is_empty() {
        return own;
    }
    for heading in ["h1", "h2", "h3", "h4"] {
        let Ok(selector) = Selector::parse(heading) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            let text = collapse_ws(&found.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| anyhow!("invalid selector {raw:?}: {e}"))
}
