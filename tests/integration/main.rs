//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog site and run the
//! crawl pipeline against it end-to-end.

mod crawl_tests;
mod pagination_tests;
