//! Scripted in-memory page capability.
//!
//! Drives the pipeline against a fixed listing page and per-URL article
//! bodies, with fault injection for navigation and extraction. Shipped in
//! the lib (not behind `cfg(test)`) so integration tests and offline
//! dry-runs can use it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{AnchorPreview, Browser, Page};

/// Scripted article behind a candidate URL.
#[derive(Debug, Clone, Default)]
pub struct FixtureArticle {
    /// Headline the page exposes; `None` leaves extraction empty so the
    /// caller falls back to the discovery preview.
    pub headline: Option<String>,
    pub source: Option<String>,
    /// Fail the navigation to this article.
    pub fail_navigation: bool,
    /// Fail text extraction after a successful navigation.
    pub fail_extraction: bool,
}

impl FixtureArticle {
    pub fn with_headline(headline: &str) -> Self {
        Self {
            headline: Some(headline.to_string()),
            ..Self::default()
        }
    }

    pub fn broken_navigation() -> Self {
        Self {
            fail_navigation: true,
            ..Self::default()
        }
    }

    pub fn broken_extraction() -> Self {
        Self {
            fail_extraction: true,
            ..Self::default()
        }
    }
}

/// Scripted site: one listing page plus its articles.
#[derive(Debug, Clone, Default)]
pub struct FixtureSite {
    pub listing_url: String,
    pub anchors: Vec<AnchorPreview>,
    pub articles: HashMap<String, FixtureArticle>,
    /// Fail navigation to the listing page (simulates homepage timeout).
    pub fail_listing: bool,
}

impl FixtureSite {
    pub fn new(listing_url: &str) -> Self {
        Self {
            listing_url: listing_url.to_string(),
            ..Self::default()
        }
    }

    pub fn anchor(&mut self, href: &str, text: &str) -> &mut Self {
        self.anchors.push(AnchorPreview {
            href: href.to_string(),
            text: text.to_string(),
        });
        self
    }

    pub fn article(&mut self, url: &str, article: FixtureArticle) -> &mut Self {
        self.articles.insert(url.to_string(), article);
        self
    }
}

/// What the fixture observed; assert against this in tests.
#[derive(Debug, Default)]
pub struct FixtureLog {
    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
    pub scroll_passes: usize,
    pub closed_pages: usize,
}

pub struct FixtureBrowser {
    site: Arc<Mutex<FixtureSite>>,
    log: Arc<Mutex<FixtureLog>>,
}

impl FixtureBrowser {
    pub fn new(site: FixtureSite) -> Self {
        Self {
            site: Arc::new(Mutex::new(site)),
            log: Arc::new(Mutex::new(FixtureLog::default())),
        }
    }

    /// Handle for mutating the site between cycles.
    pub fn site(&self) -> Arc<Mutex<FixtureSite>> {
        Arc::clone(&self.site)
    }

    pub fn log(&self) -> Arc<Mutex<FixtureLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Browser for FixtureBrowser {
    async fn open_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(FixturePage {
            site: Arc::clone(&self.site),
            log: Arc::clone(&self.log),
            current: Loaded::Nothing,
        }))
    }
}

#[derive(Debug, Clone)]
enum Loaded {
    Nothing,
    Listing,
    Article(FixtureArticle),
}

pub struct FixturePage {
    site: Arc<Mutex<FixtureSite>>,
    log: Arc<Mutex<FixtureLog>>,
    current: Loaded,
}

#[async_trait]
impl Page for FixturePage {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.log.lock().unwrap().navigations.push(url.to_string());
        let site = self.site.lock().unwrap();
        if url == site.listing_url {
            if site.fail_listing {
                bail!("simulated navigation timeout: {url}");
            }
            self.current = Loaded::Listing;
            return Ok(());
        }
        match site.articles.get(url) {
            Some(article) if article.fail_navigation => {
                bail!("simulated navigation failure: {url}")
            }
            Some(article) => {
                self.current = Loaded::Article(article.clone());
                Ok(())
            }
            None => bail!("fixture has no page for {url}"),
        }
    }

    async fn click_if_visible(&mut self, selector: &str, _timeout: Duration) -> Result<bool> {
        self.log.lock().unwrap().clicks.push(selector.to_string());
        Ok(false)
    }

    async fn scroll_by_viewport(&mut self, _fraction: f64) -> Result<()> {
        self.log.lock().unwrap().scroll_passes += 1;
        Ok(())
    }

    async fn scroll_to_top(&mut self) -> Result<()> {
        Ok(())
    }

    async fn anchors(&self) -> Result<Vec<AnchorPreview>> {
        match self.current {
            Loaded::Listing => Ok(self.site.lock().unwrap().anchors.clone()),
            _ => Ok(Vec::new()),
        }
    }

    /// Selector lists that name a heading are answered with the scripted
    /// headline; any other list gets the scripted byline.
    async fn first_text(&self, selectors: &[&str]) -> Result<Option<String>> {
        let Loaded::Article(article) = &self.current else {
            return Ok(None);
        };
        if article.fail_extraction {
            bail!("simulated extraction failure");
        }
        if is_heading_query(selectors) {
            Ok(article.headline.clone())
        } else {
            Ok(article.source.clone())
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closed_pages += 1;
        self.current = Loaded::Nothing;
        Ok(())
    }
}

fn is_heading_query(selectors: &[&str]) -> bool {
    selectors
        .iter()
        .any(|s| s.starts_with("h1") || s.ends_with("h1"))
}
