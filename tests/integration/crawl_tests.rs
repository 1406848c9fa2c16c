//! End-to-end crawls: coordinator, channel and sink writer against a mock catalog

use crate::fixtures::{
    book_page, create_test_config, listing_page, menu_page, mount_html, mount_html_delayed,
    RecordingStore,
};
use folio_crawler::crawler::{run_crawl, run_pipeline, CrawlMode};
use folio_crawler::storage::SqliteDocumentStore;
use folio_crawler::FolioError;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Root page with three categories, the second one nested
fn nested_menu_page() -> String {
    r#"<html><head><title>Catalog</title></head><body>
    <div id="menu-categories"><ul>
        <li><a href="/category/fiction/">Fiction</a></li>
        <li><a href="/category/programming/">Programming</a>
            <ul>
                <li><a href="/category/programming/rust/">Rust</a></li>
                <li><a href="/category/programming/go/">Go</a></li>
            </ul>
        </li>
        <li><a href="/category/history/">History</a></li>
    </ul></div>
    </body></html>"#
        .to_string()
}

/// Mounts a two-category catalog with four books, one of them lacking a language
async fn mount_catalog(server: &MockServer) {
    mount_html(
        server,
        "/",
        menu_page(&[("/category/fiction/", "Fiction"), ("/category/history/", "History")]),
    )
    .await;

    for (category, books) in [
        ("fiction", ["/book/dune/", "/book/emma/"]),
        ("history", ["/book/rome/", "/book/troy/"]),
    ] {
        let listing = listing_page(1, &books);
        mount_html(server, &format!("/category/{}/", category), listing.clone()).await;
        mount_html(server, &format!("/category/{}/page/1/", category), listing).await;
    }

    mount_html(server, "/book/dune/", book_page("Dune", Some("English"))).await;
    mount_html(server, "/book/emma/", book_page("Emma", Some("English"))).await;
    mount_html(server, "/book/rome/", book_page("Rome", Some("Italian"))).await;
    mount_html(server, "/book/troy/", book_page("Troy", None)).await;
}

#[tokio::test]
async fn test_books_crawl_end_to_end() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let config = create_test_config(&format!("{}/", server.uri()), "unused.db");
    let store = RecordingStore::default();

    let report = run_pipeline(&config, CrawlMode::Books, store.clone())
        .await
        .unwrap();

    assert_eq!(report.summary.categories, 2);
    assert_eq!(report.summary.book_links, 4);
    assert_eq!(report.summary.book_pages_attempted, 4);
    assert_eq!(report.summary.fetch_failures, 0);
    assert_eq!(report.summary.extraction_failures, 1);
    assert_eq!(report.summary.items_sent, 3);

    assert!(report.sink.finished_cleanly);
    assert_eq!(report.sink.inserted, 3);
    assert_eq!(report.sink.failed, 0);

    let titles: HashSet<_> = store.field("title").into_iter().collect();
    let expected: HashSet<_> = ["Dune", "Emma", "Rome"].map(String::from).into_iter().collect();
    assert_eq!(titles, expected);

    let documents = store.documents.lock().unwrap();
    let dune = documents
        .iter()
        .find(|d| d["title"] == "Dune")
        .expect("Dune should be stored");
    assert_eq!(dune["year"], 2019);
    assert_eq!(dune["pages"], 320);
    assert_eq!(dune["fileFormat"], "PDF");
    assert_eq!(dune["downloadUrls"], serde_json::json!(["/files/Dune.pdf"]));
    assert_eq!(dune["description"], "About Dune.");
}

#[tokio::test]
async fn test_books_crawl_survives_failed_book_page() {
    let server = MockServer::start().await;

    mount_html(&server, "/", menu_page(&[("/category/fiction/", "Fiction")])).await;
    let listing = listing_page(1, &["/book/dune/", "/book/gone/"]);
    mount_html(&server, "/category/fiction/", listing.clone()).await;
    mount_html(&server, "/category/fiction/page/1/", listing).await;
    mount_html(&server, "/book/dune/", book_page("Dune", Some("English"))).await;
    Mock::given(method("GET"))
        .and(path("/book/gone/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", server.uri()), "unused.db");
    let store = RecordingStore::default();

    let report = run_pipeline(&config, CrawlMode::Books, store.clone())
        .await
        .unwrap();

    assert_eq!(report.summary.book_pages_attempted, 2);
    assert_eq!(report.summary.fetch_failures, 1);
    assert_eq!(report.sink.inserted, 1);
    assert_eq!(store.field("title"), vec!["Dune"]);
}

#[tokio::test]
async fn test_book_batch_stored_in_completion_order() {
    let server = MockServer::start().await;

    mount_html(&server, "/", menu_page(&[("/category/fiction/", "Fiction")])).await;
    let listing = listing_page(1, &["/book/slow/", "/book/fast/"]);
    mount_html(&server, "/category/fiction/", listing.clone()).await;
    mount_html(&server, "/category/fiction/page/1/", listing).await;
    mount_html_delayed(
        &server,
        "/book/slow/",
        book_page("Slow", Some("English")),
        Duration::from_millis(800),
    )
    .await;
    mount_html(&server, "/book/fast/", book_page("Fast", Some("English"))).await;

    let config = create_test_config(&format!("{}/", server.uri()), "unused.db");
    let store = RecordingStore::default();

    let report = run_pipeline(&config, CrawlMode::Books, store.clone())
        .await
        .unwrap();

    assert_eq!(report.summary.items_sent, 2);
    assert_eq!(store.field("title"), vec!["Fast", "Slow"]);
}

#[tokio::test]
async fn test_slow_writer_does_not_time_out_answered_fetches() {
    let server = MockServer::start().await;

    let books = ["/book/a/", "/book/b/", "/book/c/", "/book/d/"];
    mount_html(&server, "/", menu_page(&[("/category/fiction/", "Fiction")])).await;
    let listing = listing_page(1, &books);
    mount_html(&server, "/category/fiction/", listing.clone()).await;
    mount_html(&server, "/category/fiction/page/1/", listing).await;
    mount_html(&server, "/book/a/", book_page("A", Some("English"))).await;
    mount_html(&server, "/book/b/", book_page("B", Some("English"))).await;
    for (route, title) in [("/book/c/", "C"), ("/book/d/", "D")] {
        mount_html_delayed(
            &server,
            route,
            book_page(title, Some("English")),
            Duration::from_millis(500),
        )
        .await;
    }

    // One batch, a one-slot channel and a writer slower than the request timeout
    let mut config = create_test_config(&format!("{}/", server.uri()), "unused.db");
    config.crawler.book_batch_size = 4;
    config.crawler.channel_capacity = 1;
    config.crawler.request_timeout_secs = 1;
    let store = RecordingStore::slow(Duration::from_millis(1200));

    let report = run_pipeline(&config, CrawlMode::Books, store.clone())
        .await
        .unwrap();

    assert_eq!(report.summary.book_pages_attempted, 4);
    assert_eq!(report.summary.fetch_failures, 0);
    assert_eq!(report.summary.items_sent, 4);
    assert_eq!(report.sink.inserted, 4);

    let titles: HashSet<_> = store.field("title").into_iter().collect();
    let expected: HashSet<_> = ["A", "B", "C", "D"].map(String::from).into_iter().collect();
    assert_eq!(titles, expected);
}

#[tokio::test]
async fn test_categories_crawl_in_menu_order_with_delay() {
    let server = MockServer::start().await;
    mount_html(&server, "/", nested_menu_page()).await;

    let config = create_test_config(&format!("{}/", server.uri()), "unused.db");
    let delay = config.crawler.category_delay();
    let store = RecordingStore::default();

    let started = Instant::now();
    let report = run_pipeline(&config, CrawlMode::Categories, store.clone())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.summary.categories, 3);
    assert_eq!(report.summary.items_sent, 3);
    assert!(report.sink.finished_cleanly);
    assert!(elapsed >= delay * 3, "finished too quickly: {:?}", elapsed);

    let documents = store.documents.lock().unwrap();
    assert_eq!(
        *documents,
        vec![
            serde_json::json!({ "name": "Fiction", "subcategories": [] }),
            serde_json::json!({ "name": "Programming", "subcategories": ["Rust", "Go"] }),
            serde_json::json!({ "name": "History", "subcategories": [] }),
        ]
    );
}

#[tokio::test]
async fn test_root_fetch_failure_still_stops_writer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", server.uri()), "unused.db");
    let store = RecordingStore::default();

    // A writer left waiting would hang the pipeline past the timeout
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        run_pipeline(&config, CrawlMode::Books, store.clone()),
    )
    .await
    .expect("pipeline should finish");

    match result {
        Err(FolioError::Fetch(e)) => assert!(e.url.ends_with('/')),
        other => panic!("expected fetch error, got {:?}", other.map(|r| r.summary)),
    }
    assert!(store.documents.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_crawl_writes_requested_collection() {
    let server = MockServer::start().await;
    mount_html(&server, "/", nested_menu_page()).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("folio.db");
    let config = create_test_config(&format!("{}/", server.uri()), db_path.to_str().unwrap());

    let report = run_crawl(&config, CrawlMode::Categories, Some("menu_snapshot"))
        .await
        .unwrap();
    assert_eq!(report.sink.inserted, 3);

    let store = SqliteDocumentStore::open(&db_path, "menu_snapshot").unwrap();
    assert_eq!(store.count().unwrap(), 3);

    let default_collection = SqliteDocumentStore::open(&db_path, "categories").unwrap();
    assert_eq!(default_collection.count().unwrap(), 0);
}

#[tokio::test]
async fn test_run_crawl_rejects_invalid_collection_name() {
    let config = create_test_config("http://127.0.0.1:9/", "unused.db");

    let result = run_crawl(&config, CrawlMode::Categories, Some("bad name;")).await;
    assert!(matches!(result, Err(FolioError::Config(_))));
}
