// tests/cycle_supervisor.rs
// Whole-cycle behavior through the collector context: persistence of both
// documents, cycle-level fault isolation, and cross-cycle dedup.

use std::fs;
use std::path::PathBuf;

use market_news_collector::page::fixture::{FixtureArticle, FixtureBrowser, FixtureSite};
use market_news_collector::pacing::InstantPacer;
use market_news_collector::{Collector, CollectorConfig, NewsStore, VisitedState};
use tempfile::TempDir;

const LISTING: &str = "https://example.test/news/";

fn config_in(dir: &TempDir) -> CollectorConfig {
    CollectorConfig {
        homepage_url: LISTING.to_string(),
        state_path: dir.path().join("visited.json"),
        news_path: dir.path().join("news.json"),
        ..CollectorConfig::default()
    }
}

fn populated_site() -> FixtureSite {
    let mut site = FixtureSite::new(LISTING);
    site.anchor(
        "https://example.test/news/earnings.html",
        "Quarterly earnings report lands",
    );
    site.anchor(
        "https://example.test/news/broken.html",
        "This article will fail to load",
    );
    site.anchor("https://example.test/news/tiny.html", "A long enough preview");
    site.article(
        "https://example.test/news/earnings.html",
        FixtureArticle::with_headline("Quarterly earnings report lands"),
    );
    site.article(
        "https://example.test/news/broken.html",
        FixtureArticle::broken_navigation(),
    );
    site.article(
        "https://example.test/news/tiny.html",
        FixtureArticle::with_headline("Tiny"),
    );
    site
}

#[tokio::test]
async fn a_cycle_persists_articles_and_every_visited_url() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let browser = FixtureBrowser::new(populated_site());
    let log = browser.log();

    let mut collector = Collector::new(config, Box::new(browser), Box::new(InstantPacer::new()));
    let report = collector.run_cycle().await.unwrap();

    assert_eq!(report.discovered, 3);
    assert_eq!(report.collected, 1);
    assert_eq!(report.discarded, 1);
    assert_eq!(report.failed, 1);

    let news = NewsStore::load(&collector.config().news_path);
    assert_eq!(news.articles.len(), 1);
    assert_eq!(news.articles[0].headline, "Quarterly earnings report lands");
    assert_eq!(news.articles[0].tag.tag(), "earnings");
    assert!(news.last_updated.is_some());

    // Collected, discarded, and failed URLs all land in the visited set.
    let visited = VisitedState::load(&collector.config().state_path);
    for url in [
        "https://example.test/news/earnings.html",
        "https://example.test/news/broken.html",
        "https://example.test/news/tiny.html",
    ] {
        assert!(visited.contains(url), "missing visited url {url}");
    }

    assert_eq!(log.lock().unwrap().closed_pages, 1);
}

#[tokio::test]
async fn a_noise_only_cycle_writes_state_but_not_news() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let mut site = FixtureSite::new(LISTING);
    site.anchor("https://example.test/news/tiny.html", "A long enough preview");
    site.article(
        "https://example.test/news/tiny.html",
        FixtureArticle::with_headline("Tiny"),
    );
    let browser = FixtureBrowser::new(site);

    let mut collector = Collector::new(config, Box::new(browser), Box::new(InstantPacer::new()));
    let report = collector.run_cycle().await.unwrap();

    assert_eq!(report.collected, 0);
    assert_eq!(report.discarded, 1);
    assert!(collector.config().state_path.exists());
    assert!(
        !collector.config().news_path.exists(),
        "news file must not be written when nothing was collected"
    );
}

#[tokio::test]
async fn a_failed_homepage_leaves_both_files_untouched() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let state_path = config.state_path.clone();
    let news_path = config.news_path.clone();

    let state_bytes = br#"{"visitedUrls":["https://example.test/news/old.html"]}"#.to_vec();
    let news_bytes = br#"{"articles":[],"lastUpdated":null}"#.to_vec();
    fs::write(&state_path, &state_bytes).unwrap();
    fs::write(&news_path, &news_bytes).unwrap();

    let mut site = populated_site();
    site.fail_listing = true;
    let browser = FixtureBrowser::new(site);
    let site_handle = browser.site();
    let log = browser.log();

    let mut collector = Collector::new(config, Box::new(browser), Box::new(InstantPacer::new()));
    let err = collector.run_cycle().await.unwrap_err();
    assert!(format!("{err:#}").contains("listing page"));

    assert_eq!(fs::read(&state_path).unwrap(), state_bytes);
    assert_eq!(fs::read(&news_path).unwrap(), news_bytes);
    // The page still went through the guaranteed close.
    assert_eq!(log.lock().unwrap().closed_pages, 1);

    // The supervisor would run the next cycle after the interval; once the
    // page recovers, the same collector proceeds normally.
    site_handle.lock().unwrap().fail_listing = false;
    let report = collector.run_cycle().await.unwrap();
    assert_eq!(report.discovered, 3);
}

#[tokio::test]
async fn urls_visited_in_one_cycle_are_not_candidates_in_the_next() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let browser = FixtureBrowser::new(populated_site());

    let mut collector = Collector::new(config, Box::new(browser), Box::new(InstantPacer::new()));
    let first = collector.run_cycle().await.unwrap();
    assert_eq!(first.discovered, 3);

    let second = collector.run_cycle().await.unwrap();
    assert_eq!(second.discovered, 0);
    assert_eq!(second.collected, 0);

    // Unchanged news store from the first cycle.
    let news = NewsStore::load(&collector.config().news_path);
    assert_eq!(news.articles.len(), 1);
}

#[tokio::test]
async fn visited_state_path_parents_are_created_on_demand() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.state_path = dir.path().join("nested/dir/visited.json");
    config.news_path = dir.path().join("nested/dir/news.json");
    let nested: PathBuf = config.state_path.clone();

    let browser = FixtureBrowser::new(populated_site());
    let mut collector = Collector::new(config, Box::new(browser), Box::new(InstantPacer::new()));
    collector.run_cycle().await.unwrap();

    assert!(nested.exists());
}
