//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the content provider and drive
//! the full crawl cycle end-to-end: seed file, fetch, extraction, relevance,
//! article files and checkpoint.

use article_ripple::config::{Config, CrawlerConfig, OutputConfig, ProviderConfig};
use article_ripple::crawler::{
    load_frontier, run_crawl, ApiFetcher, Coordinator, CrawlSettings, RelevanceFilter, Shutdown,
};
use article_ripple::storage::{load_checkpoint, FileArticleStore, SeedFile, SeedRecord};
use article_ripple::{CrawlState, FrontierItem};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration against the mock server
fn create_test_config(base_url: &str, dir: &Path, max_depth: u32, article_limit: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            article_limit,
            politeness_delay: 0,
            keywords: vec!["neural".to_string()],
            progress_interval: 10,
        },
        provider: ProviderConfig {
            base_url: base_url.to_string(),
            provider: "wikipedia".to_string(),
            language: "en".to_string(),
            requests_per_hour: 0,
            max_retries: 2,
            backoff_base: 1,
            request_timeout: 5,
            user_agent: "TestCrawler/1.0 (test@example.com)".to_string(),
            access_token: None,
            action_api_url: None,
        },
        output: OutputConfig {
            data_dir: dir.join("data"),
            checkpoint_path: dir.join("checkpoint.json"),
            seed_path: dir.join("seed.json"),
        },
    }
}

fn write_seeds(config: &Config, keys: &[&str]) {
    let mut seeds = SeedFile::default();
    for (i, key) in keys.iter().enumerate() {
        seeds.insert(SeedRecord {
            id: json!(i),
            key: key.to_string(),
        });
    }
    seeds.save(&config.output.seed_path).unwrap();
}

/// Mounts a rendered article at the page endpoint
async fn mount_article(server: &MockServer, key: &str, paragraph: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="./{}">{}</a> "#, link, link))
        .collect();
    let html = format!(
        "<html><head><title>{}</title></head><body><p>{}</p><p>{}</p></body></html>",
        key, paragraph, anchors
    );

    Mock::given(method("GET"))
        .and(path(format!("/wikipedia/en/page/{}/with_html", key)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "key": key, "html": html })),
        )
        .mount(server)
        .await;
}

fn article_path(config: &Config, key: &str) -> std::path::PathBuf {
    config.output.data_dir.join(format!("data_{}.txt", key))
}

#[tokio::test]
async fn test_full_crawl_relevance_and_failures() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 1, 100);
    write_seeds(&config, &["A"]);

    mount_article(&server, "A", "A neural network learns.", &["B", "C", "Category:Stuff"]).await;
    mount_article(&server, "B", "Banana bread recipe.", &["D"]).await;
    Mock::given(method("GET"))
        .and(path("/wikipedia/en/page/C/with_html"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let report = run_crawl(&config, false).await.unwrap();

    assert_eq!(report.state, CrawlState::StoppedQueueEmpty);
    assert_eq!(report.persisted, 1);
    assert_eq!(report.irrelevant, 1);
    assert_eq!(report.failed, 1);

    let text = std::fs::read_to_string(article_path(&config, "A")).unwrap();
    assert!(text.contains("A neural network learns."));
    assert!(!article_path(&config, "B").exists());

    let checkpoint = load_checkpoint(&config.output.checkpoint_path)
        .unwrap()
        .unwrap();
    assert_eq!(checkpoint.visited, vec!["A", "B", "C"]);
    assert!(checkpoint.queue.is_empty());

    // B was irrelevant, so D was never discovered
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().contains("/page/D/")));
}

#[tokio::test]
async fn test_limit_then_resume_continues_queue() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 2, 3);
    write_seeds(&config, &["S1", "S2", "S3", "S4", "S5"]);

    for key in ["S1", "S2", "S3", "S4", "S5"] {
        mount_article(&server, key, "neural", &[]).await;
    }

    let first = run_crawl(&config, false).await.unwrap();
    assert_eq!(first.state, CrawlState::StoppedBoundReached);
    assert_eq!(first.persisted, 3);

    let checkpoint = load_checkpoint(&config.output.checkpoint_path)
        .unwrap()
        .unwrap();
    assert_eq!(
        checkpoint.queue,
        vec![FrontierItem::new("S4", 0), FrontierItem::new("S5", 0)]
    );

    // Raising the limit lets the resumed run drain the queue without refetching
    let config = create_test_config(&server.uri(), dir.path(), 2, 10);
    let second = run_crawl(&config, false).await.unwrap();
    assert_eq!(second.state, CrawlState::StoppedQueueEmpty);
    assert_eq!(second.processed, 2);
    assert_eq!(second.visited_total, 5);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
}

#[tokio::test]
async fn test_fresh_start_ignores_checkpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 0, 10);
    write_seeds(&config, &["A"]);
    mount_article(&server, "A", "neural", &["B"]).await;

    run_crawl(&config, false).await.unwrap();
    let resumed = run_crawl(&config, false).await.unwrap();
    assert_eq!(resumed.processed, 0);

    // The article file already exists; a fresh run keeps it and carries on
    let fresh = run_crawl(&config, true).await.unwrap();
    assert_eq!(fresh.processed, 1);
    assert_eq!(fresh.state, CrawlState::StoppedQueueEmpty);
}

#[tokio::test]
async fn test_depth_zero_does_not_expand() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 0, 10);
    write_seeds(&config, &["A"]);
    mount_article(&server, "A", "neural", &["B", "C"]).await;

    let report = run_crawl(&config, false).await.unwrap();
    assert_eq!(report.enqueued, 0);
    assert_eq!(report.visited_total, 1);
}

#[tokio::test]
async fn test_missing_seed_file_stops_empty() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 1, 10);

    let report = run_crawl(&config, false).await.unwrap();
    assert_eq!(report.state, CrawlState::StoppedQueueEmpty);
    assert_eq!(report.processed, 0);
    assert!(config.output.checkpoint_path.exists());
}

#[tokio::test]
async fn test_interrupt_before_start_saves_untouched_frontier() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 1, 10);
    write_seeds(&config, &["A", "B"]);

    let shutdown = Shutdown::new();
    shutdown.trigger();

    let frontier = load_frontier(&config.output, false).unwrap();
    let mut coordinator = Coordinator::new(
        CrawlSettings::from(&config),
        ApiFetcher::new(&config.provider).unwrap(),
        FileArticleStore::open(&config.output.data_dir).unwrap(),
        RelevanceFilter::new(&config.crawler.keywords),
        frontier,
    )
    .with_shutdown(shutdown);

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.state, CrawlState::StoppedInterrupted);
    assert!(server.received_requests().await.unwrap().is_empty());

    let checkpoint = load_checkpoint(&config.output.checkpoint_path)
        .unwrap()
        .unwrap();
    assert_eq!(checkpoint.queue.len(), 2);
}
