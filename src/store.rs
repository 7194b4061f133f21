//! Persisted pipeline state: the visited-URL memory and the bounded news
//! store.
//!
//! Both documents load to a well-formed default when the file is missing or
//! corrupt; prior-state absence is never an error. Every save is a
//! full-document overwrite through a sibling temp file plus rename, so the
//! external dashboard never observes a partially written file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::Category;

/// Most recent visited URLs retained on save.
pub const VISITED_CAP: usize = 500;
/// Most recent articles retained on save.
pub const ARTICLES_CAP: usize = 100;

/// One collected headline, in the shape the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub tag: Category,
    pub tag_label: String,
    pub headline: String,
    pub url: String,
    pub source: String,
}

impl NewsArticle {
    pub fn new(category: Category, headline: String, url: String, source: String) -> Self {
        Self {
            tag: category,
            tag_label: category.label().to_string(),
            headline,
            url,
            source,
        }
    }
}

/// URL memory carried across cycles. Insertion order is preserved only so
/// trimming can keep the most recent entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitedState {
    pub visited_urls: Vec<String>,
}

impl VisitedState {
    /// Load from `path`; a missing or corrupt file yields an empty state.
    pub fn load(path: &Path) -> Self {
        load_or_default(path)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.visited_urls.iter().any(|u| u == url)
    }

    /// Append `url` unless already present. Re-marking is a no-op.
    pub fn mark(&mut self, url: &str) {
        if !self.contains(url) {
            self.visited_urls.push(url.to_string());
        }
    }

    /// Trim to the most recent [`VISITED_CAP`] URLs and overwrite `path`.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        trim_to_tail(&mut self.visited_urls, VISITED_CAP);
        write_document(path, self)
    }
}

/// Bounded article store read by the external dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsStore {
    pub articles: Vec<NewsArticle>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl NewsStore {
    /// Load from `path`; a missing or corrupt file yields an empty store.
    pub fn load(path: &Path) -> Self {
        load_or_default(path)
    }

    pub fn append(&mut self, articles: impl IntoIterator<Item = NewsArticle>) {
        self.articles.extend(articles);
    }

    /// Trim to the most recent [`ARTICLES_CAP`] articles, stamp
    /// `lastUpdated`, and overwrite `path`. The stamp happens on every call.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        trim_to_tail(&mut self.articles, ARTICLES_CAP);
        self.last_updated = Some(Utc::now());
        write_document(path, self)
    }
}

fn load_or_default<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> T {
    let Ok(raw) = fs::read_to_string(path) else {
        debug!(path = %path.display(), "state file absent, starting empty");
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "state file unreadable, starting empty");
            T::default()
        }
    }
}

fn trim_to_tail<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(0..excess);
    }
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing state document")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}
