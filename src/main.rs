//! Collector binary entrypoint.
//! Boots tracing, loads configuration, launches the browser capability, and
//! hands control to the supervisor loop.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use market_news_collector::config::CollectorConfig;
use market_news_collector::page::HttpBrowser;
use market_news_collector::pacing::JitterPacer;
use market_news_collector::scrape::Collector;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_news_collector=info,warn"));
    fmt().with_env_filter(filter).compact().init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = CollectorConfig::load().context("loading collector configuration")?;
    info!(
        listing = %config.homepage_url,
        interval_secs = config.scan_interval_secs,
        "collector starting"
    );

    // Browser launch failure is the one fatal startup fault: bail out with a
    // non-zero exit instead of entering the loop.
    let browser =
        HttpBrowser::launch(&config.user_agent).context("launching browser capability")?;

    let mut collector = Collector::new(config, Box::new(browser), Box::new(JitterPacer::new()));
    collector.run_forever().await
}
