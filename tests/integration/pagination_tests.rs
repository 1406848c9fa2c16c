//! Category expansion against a mock catalog

use crate::fixtures::{create_test_config, listing_page, mount_html, mount_html_delayed};
use folio_crawler::crawler::{expand_category, Fetcher, PageUrlTemplate};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_fetcher(server: &MockServer) -> Fetcher {
    let config = create_test_config(&format!("{}/", server.uri()), "unused.db");
    Fetcher::new(&config.crawler, &config.user_agent).unwrap()
}

fn template() -> PageUrlTemplate {
    PageUrlTemplate::new("{url}page/{n}/")
}

#[tokio::test]
async fn test_expand_category_fetches_every_page_once() {
    let server = MockServer::start().await;
    let category_url = format!("{}/category/fiction/", server.uri());

    Mock::given(method("GET"))
        .and(path("/category/fiction/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(3, &[])))
        .expect(1)
        .mount(&server)
        .await;

    for n in 1..=3 {
        let first = format!("/book/fiction-{n}-a/");
        let second = format!("/book/fiction-{n}-b/");
        let body = listing_page(3, &[first.as_str(), second.as_str()]);
        Mock::given(method("GET"))
            .and(path(format!("/category/fiction/page/{n}/")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let links = expand_category(&create_fetcher(&server), &category_url, &template()).await;

    let expected: HashSet<String> = (1..=3)
        .flat_map(|n| {
            [
                format!("{}/book/fiction-{n}-a/", server.uri()),
                format!("{}/book/fiction-{n}-b/", server.uri()),
            ]
        })
        .collect();
    assert_eq!(links.len(), 6);
    assert_eq!(links.into_iter().collect::<HashSet<_>>(), expected);
    // Mock expectations are verified when the server drops
}

#[tokio::test]
async fn test_expand_category_skips_failed_page() {
    let server = MockServer::start().await;
    let category_url = format!("{}/category/history/", server.uri());

    mount_html(&server, "/category/history/", listing_page(3, &[])).await;
    mount_html(&server, "/category/history/page/1/", listing_page(3, &["/book/rome/"])).await;
    Mock::given(method("GET"))
        .and(path("/category/history/page/2/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(&server, "/category/history/page/3/", listing_page(3, &["/book/troy/"])).await;

    let links = expand_category(&create_fetcher(&server), &category_url, &template()).await;

    let links: HashSet<_> = links.into_iter().collect();
    let expected: HashSet<_> = [
        format!("{}/book/rome/", server.uri()),
        format!("{}/book/troy/", server.uri()),
    ]
    .into_iter()
    .collect();
    assert_eq!(links, expected);
}

#[tokio::test]
async fn test_expand_category_unreachable_first_page() {
    let server = MockServer::start().await;
    let category_url = format!("{}/category/missing/", server.uri());

    Mock::given(method("GET"))
        .and(path("/category/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let links = expand_category(&create_fetcher(&server), &category_url, &template()).await;
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_expand_category_without_pagination_reads_single_page() {
    let server = MockServer::start().await;
    let category_url = format!("{}/category/poetry/", server.uri());

    let no_pagination = r#"<html><body><article class="post"><a href="/book/odes/">Odes</a></article></body></html>"#;
    mount_html(&server, "/category/poetry/", no_pagination.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/category/poetry/page/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(no_pagination))
        .expect(1)
        .mount(&server)
        .await;

    let links = expand_category(&create_fetcher(&server), &category_url, &template()).await;
    assert_eq!(links, vec![format!("{}/book/odes/", server.uri())]);
}

#[tokio::test]
async fn test_expand_category_collects_in_completion_order() {
    let server = MockServer::start().await;
    let category_url = format!("{}/category/drama/", server.uri());

    mount_html(&server, "/category/drama/", listing_page(2, &[])).await;
    mount_html_delayed(
        &server,
        "/category/drama/page/1/",
        listing_page(2, &["/book/first/"]),
        Duration::from_millis(800),
    )
    .await;
    mount_html(&server, "/category/drama/page/2/", listing_page(2, &["/book/second/"])).await;

    let links = expand_category(&create_fetcher(&server), &category_url, &template()).await;

    assert_eq!(
        links,
        vec![
            format!("{}/book/second/", server.uri()),
            format!("{}/book/first/", server.uri()),
        ]
    );
}
