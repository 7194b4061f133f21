// tests/store_persistence.rs
// Retention caps, silent-default loading, and the on-disk file shape the
// dashboard depends on.

use std::fs;

use market_news_collector::store::{
    NewsArticle, NewsStore, VisitedState, ARTICLES_CAP, VISITED_CAP,
};
use market_news_collector::Category;
use tempfile::tempdir;

fn article(n: usize) -> NewsArticle {
    NewsArticle::new(
        Category::Market,
        format!("Stocks close mixed in session number {n}"),
        format!("https://example.test/news/{n}.html"),
        "Example Wire".to_string(),
    )
}

#[test]
fn missing_and_corrupt_files_load_as_empty_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("visited.json");

    let state = VisitedState::load(&path);
    assert!(state.visited_urls.is_empty());

    fs::write(&path, "{ not json ").unwrap();
    let state = VisitedState::load(&path);
    assert!(state.visited_urls.is_empty());

    let news_path = dir.path().join("news.json");
    fs::write(&news_path, "[]").unwrap(); // wrong shape, still not an error
    let news = NewsStore::load(&news_path);
    assert!(news.articles.is_empty());
    assert!(news.last_updated.is_none());
}

#[test]
fn visited_save_caps_at_500_keeping_most_recent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("visited.json");

    let mut state = VisitedState::default();
    for n in 0..(VISITED_CAP + 40) {
        state.mark(&format!("https://example.test/news/{n}.html"));
    }
    state.save(&path).unwrap();

    let reloaded = VisitedState::load(&path);
    assert_eq!(reloaded.visited_urls.len(), VISITED_CAP);
    // Oldest dropped, most recent retained.
    assert_eq!(
        reloaded.visited_urls.first().unwrap(),
        "https://example.test/news/40.html"
    );
    assert_eq!(
        reloaded.visited_urls.last().unwrap(),
        &format!("https://example.test/news/{}.html", VISITED_CAP + 39)
    );
}

#[test]
fn news_save_caps_at_100_and_stamps_last_updated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("news.json");

    let mut store = NewsStore::default();
    store.append((0..ARTICLES_CAP + 5).map(article));
    assert!(store.last_updated.is_none());
    store.save(&path).unwrap();
    assert!(store.last_updated.is_some());

    let reloaded = NewsStore::load(&path);
    assert_eq!(reloaded.articles.len(), ARTICLES_CAP);
    assert_eq!(
        reloaded.articles.first().unwrap().url,
        "https://example.test/news/5.html"
    );
    assert!(reloaded.last_updated.is_some());
}

#[test]
fn last_updated_is_stamped_on_every_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("news.json");

    let mut store = NewsStore::default();
    store.save(&path).unwrap();
    let first = store.last_updated.unwrap();

    store.append([article(1)]);
    store.save(&path).unwrap();
    let second = store.last_updated.unwrap();
    assert!(second >= first);
}

#[test]
fn persisted_documents_keep_the_dashboard_shape() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("visited.json");
    let news_path = dir.path().join("news.json");

    let mut state = VisitedState::default();
    state.mark("https://example.test/news/shape.html");
    state.save(&state_path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&state_path).unwrap()).unwrap();
    assert!(raw["visitedUrls"].is_array());

    let mut store = NewsStore::default();
    store.append([NewsArticle::new(
        Category::Fed,
        "Fed raises interest rates".to_string(),
        "https://example.test/news/fed.html".to_string(),
        "Example Wire".to_string(),
    )]);
    store.save(&news_path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&news_path).unwrap()).unwrap();
    let entry = &raw["articles"][0];
    assert_eq!(entry["tag"], "fed");
    assert_eq!(entry["tagLabel"], "FED");
    assert_eq!(entry["headline"], "Fed raises interest rates");
    assert_eq!(entry["url"], "https://example.test/news/fed.html");
    assert_eq!(entry["source"], "Example Wire");
    // ISO-8601 timestamp, parseable by the dashboard.
    assert!(raw["lastUpdated"].is_string());
    let stamp = raw["lastUpdated"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
}

#[test]
fn save_replaces_the_whole_document_and_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("visited.json");

    let mut state = VisitedState::default();
    state.mark("https://example.test/news/a.html");
    state.save(&path).unwrap();

    let mut state = VisitedState::default();
    state.mark("https://example.test/news/b.html");
    state.save(&path).unwrap();

    let reloaded = VisitedState::load(&path);
    assert_eq!(reloaded.visited_urls, vec!["https://example.test/news/b.html"]);

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}
