//! Category pagination
//!
//! Expands one category URL into the book links of all of its listing pages.
//! Page 1 is fetched first to learn the page count, then every page is
//! fetched concurrently and processed as it completes.

use crate::crawler::document::resolve_links;
use crate::crawler::extract::{book_links_from_listing_page, last_page_number};
use crate::crawler::fetcher::Fetcher;
use crate::ExtractError;
use futures::stream::{FuturesUnordered, StreamExt};

/// Upper bound on listing pages fetched for one category
///
/// The page count is read from remote HTML; larger values are clamped.
pub const MAX_LISTING_PAGES: u32 = 1_000;

/// Rule turning a category URL and page number into a listing page URL
///
/// `{url}` is replaced by the category URL and `{n}` by the page number. A
/// template without `{url}` is appended to the category URL as a suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrlTemplate(String);

impl PageUrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn render(&self, category_url: &str, page: u32) -> String {
        let page = page.to_string();
        if self.0.contains("{url}") {
            self.0.replace("{url}", category_url).replace("{n}", &page)
        } else {
            format!("{}{}", category_url, self.0.replace("{n}", &page))
        }
    }
}

/// Collects the book links of every listing page of a category
///
/// Never fails: an unreachable first page yields no links, and an unreachable
/// later page only loses its own links. Links come back in page completion
/// order, resolved against the page they were found on.
pub async fn expand_category(
    fetcher: &Fetcher,
    category_url: &str,
    template: &PageUrlTemplate,
) -> Vec<String> {
    let first_page = match fetcher.fetch(category_url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(url = %e.url, cause = %e.cause, "Failed to fetch category page");
            return Vec::new();
        }
    };

    let last_page = match last_page_number(&first_page) {
        Ok(n) => n,
        Err(ExtractError::MissingElement { .. }) => {
            tracing::debug!(category = category_url, "No pagination, treating as a single page");
            1
        }
        Err(e) => {
            tracing::error!(category = category_url, error = %e, "Unreadable pagination");
            return Vec::new();
        }
    };

    let last_page = clamp_page_count(category_url, last_page);
    tracing::debug!(category = category_url, pages = last_page, "Expanding category");

    let mut pending: FuturesUnordered<_> = (1..=last_page)
        .map(|page| {
            let page_url = template.render(category_url, page);
            async move {
                let result = fetcher.fetch(&page_url).await;
                (page_url, result)
            }
        })
        .collect();

    let mut links = Vec::new();
    while let Some((page_url, result)) = pending.next().await {
        match result {
            Ok(body) => {
                let found = resolve_links(book_links_from_listing_page(&body), &page_url);
                tracing::debug!(page = %page_url, links = found.len(), "Listing page parsed");
                links.extend(found);
            }
            Err(e) => {
                tracing::error!(url = %e.url, cause = %e.cause, "Raised error during page request");
            }
        }
    }

    links
}

fn clamp_page_count(category_url: &str, reported: u32) -> u32 {
    if reported > MAX_LISTING_PAGES {
        tracing::warn!(
            category = category_url,
            reported,
            limit = MAX_LISTING_PAGES,
            "Implausible page count, clamping"
        );
        MAX_LISTING_PAGES
    } else {
        reported
    }
}
