//! Collector configuration.
//!
//! Defaults cover the common case; an optional TOML file pointed at by
//! `COLLECTOR_CONFIG_PATH` overrides them, and individual env vars override
//! the file. `.env` loading happens in the binary entrypoint.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const ENV_CONFIG_PATH: &str = "COLLECTOR_CONFIG_PATH";
const ENV_HOMEPAGE_URL: &str = "COLLECTOR_HOMEPAGE_URL";
const ENV_STATE_PATH: &str = "COLLECTOR_STATE_PATH";
const ENV_NEWS_PATH: &str = "COLLECTOR_NEWS_PATH";
const ENV_INTERVAL_SECS: &str = "COLLECTOR_INTERVAL_SECS";
const ENV_USER_AGENT: &str = "COLLECTOR_USER_AGENT";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Listing page scanned for article links.
    pub homepage_url: String,
    /// Visited-URL memory, read by nothing else.
    pub state_path: PathBuf,
    /// News store, read by the external dashboard.
    pub news_path: PathBuf,
    /// Pause between cycles; the sleep follows cycle completion.
    pub scan_interval_secs: u64,
    pub user_agent: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            homepage_url: "https://finance.yahoo.com/news/".to_string(),
            state_path: PathBuf::from("data/visited.json"),
            news_path: PathBuf::from("data/news.json"),
            scan_interval_secs: 120,
            user_agent: concat!(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/124.0 Safari/537.36"
            )
            .to_string(),
        }
    }
}

impl CollectorConfig {
    /// Load order: `$COLLECTOR_CONFIG_PATH` TOML file when set (missing or
    /// unparsable file is an error), defaults otherwise, then per-field env
    /// overrides on top.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config from {path}"))?;
                toml::from_str(&raw).with_context(|| format!("parsing config from {path}"))?
            }
            Err(_) => Self::default(),
        };
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var(ENV_HOMEPAGE_URL) {
            self.homepage_url = v;
        }
        if let Ok(v) = std::env::var(ENV_STATE_PATH) {
            self.state_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var(ENV_NEWS_PATH) {
            self.news_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var(ENV_INTERVAL_SECS) {
            self.scan_interval_secs = v
                .parse()
                .context("COLLECTOR_INTERVAL_SECS must be a whole number of seconds")?;
        }
        if let Ok(v) = std::env::var(ENV_USER_AGENT) {
            self.user_agent = v;
        }
        Ok(())
    }
}
