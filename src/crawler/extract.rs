//! Catalog page extraction
//!
//! Pure functions from one HTML document to URLs or records. They do no I/O
//! and never panic: structural mismatches give an empty result or an
//! [`ExtractError`]. Every selector used lives in [`markers`] and every
//! book-detail label in [`labels`].

use crate::crawler::document::{HtmlDocument, HtmlNode};
use crate::crawler::records::{BookRecord, Category};
use crate::ExtractError;
use std::collections::HashMap;

/// CSS markers of the catalog's page layout
pub mod markers {
    /// Category navigation menu (a `<ul>` of `<li>` entries)
    pub const CATEGORY_MENU: &str = "#menu-categories";
    pub const MENU_ENTRY: &str = "li";
    pub const NESTED_MENU: &str = "ul";
    pub const ANCHOR: &str = "a";

    /// One book teaser on a listing page
    pub const LISTING_POST: &str = ".post";
    pub const PAGINATION: &str = ".pagination";

    /// Book detail page
    pub const BOOK_TITLE: &str = ".single-title";
    pub const DETAILS: &str = "body dl";
    pub const DETAIL_LABEL: &str = "dt";
    pub const DETAIL_VALUE: &str = "dd";
    pub const DOWNLOAD_LINKS: &str = ".download-links";
    pub const COVER_IMAGE: &str = "body img";
    pub const ENTRY_CONTENT: &str = ".entry-content";
}

/// Labels of the book details list, matched exactly after trimming
pub mod labels {
    pub const AUTHOR: &str = "Author:";
    pub const ISBN_10: &str = "ISBN-10:";
    pub const YEAR: &str = "Year:";
    pub const PAGES: &str = "Pages:";
    pub const LANGUAGE: &str = "Language:";
    pub const FILE_SIZE: &str = "File size:";
    pub const FILE_FORMAT: &str = "File format:";
    pub const CATEGORY: &str = "Category:";
}

/// Category page URLs from the navigation menu, in document order
///
/// Each menu entry contributes the href of its first anchor; entries without
/// one are skipped. Returns an empty list when the menu is missing.
pub fn category_menu_urls(html: &str) -> Vec<String> {
    let document = HtmlDocument::parse(html);
    let Some(menu) = document.select_first(markers::CATEGORY_MENU) else {
        return Vec::new();
    };

    menu.select_all(markers::MENU_ENTRY)
        .iter()
        .filter_map(|entry| first_href(entry))
        .collect()
}

/// The category menu as a tree one level deep
///
/// Each top-level entry becomes a [`Category`] named after its anchor text;
/// the anchors of its nested list, if any, become its subcategories.
pub fn category_tree(html: &str) -> Vec<Category> {
    let document = HtmlDocument::parse(html);
    let Some(menu) = document.select_first(markers::CATEGORY_MENU) else {
        return Vec::new();
    };

    // The marker may sit on a wrapper around the list rather than the list itself
    let list = if menu.name() == "ul" {
        menu
    } else {
        match menu.select_first(markers::NESTED_MENU) {
            Some(list) => list,
            None => return Vec::new(),
        }
    };

    list.children(markers::MENU_ENTRY)
        .iter()
        .filter_map(|entry| {
            let name = entry.select_first(markers::ANCHOR)?.text().trim().to_string();
            let subcategories = entry
                .children(markers::NESTED_MENU)
                .first()
                .map(|nested| {
                    nested
                        .select_all(markers::ANCHOR)
                        .iter()
                        .map(|anchor| anchor.text().trim().to_string())
                        .collect()
                })
                .unwrap_or_default();
            Some(Category {
                name,
                subcategories,
            })
        })
        .collect()
}

/// Book page URLs on a category listing page, in document order
pub fn book_links_from_listing_page(html: &str) -> Vec<String> {
    let document = HtmlDocument::parse(html);
    document
        .select_all(markers::LISTING_POST)
        .iter()
        .filter_map(|post| first_href(post))
        .collect()
}

/// Number of listing pages, read from the last pagination link
pub fn last_page_number(html: &str) -> Result<u32, ExtractError> {
    let document = HtmlDocument::parse(html);
    let missing = |marker| ExtractError::MissingElement {
        marker,
        title: document.title(),
    };

    let pagination = document
        .select_first(markers::PAGINATION)
        .ok_or_else(|| missing(markers::PAGINATION))?;
    let last = pagination
        .select_all(markers::ANCHOR)
        .last()
        .copied()
        .ok_or_else(|| missing(markers::ANCHOR))?;

    let text = last.text();
    text.trim()
        .parse()
        .map_err(|_| ExtractError::InvalidNumber {
            label: markers::PAGINATION,
            value: text.trim().to_string(),
            title: document.title(),
        })
}

/// Builds a [`BookRecord`] from a book detail page
///
/// `Language:` is required; `Year:` and `Pages:` default to 0 when absent but
/// must be numeric when present. The title heading, download block, cover
/// image and entry content must all exist. Errors carry the document title
/// (heading, else `<title>`) so callers can say which page failed.
pub fn book_record(html: &str) -> Result<BookRecord, ExtractError> {
    let document = HtmlDocument::parse(html);

    let heading = document
        .select_first(markers::BOOK_TITLE)
        .map(|node| node.text().trim().to_string());
    let title = heading.clone().or_else(|| document.title());
    let missing = |marker| ExtractError::MissingElement {
        marker,
        title: title.clone(),
    };

    let details = book_details(&document, &title)?;
    let field = |label: &str| details.get(label).cloned().unwrap_or_default();

    let language = details
        .get(labels::LANGUAGE)
        .cloned()
        .ok_or_else(|| ExtractError::MissingField {
            label: labels::LANGUAGE,
            title: title.clone(),
        })?;
    let year = numeric_field(&details, labels::YEAR, &title)?;
    let pages = numeric_field(&details, labels::PAGES, &title)?;

    let heading = heading.ok_or_else(|| missing(markers::BOOK_TITLE))?;

    let download_urls = document
        .select_first(markers::DOWNLOAD_LINKS)
        .ok_or_else(|| missing(markers::DOWNLOAD_LINKS))?
        .select_all(markers::ANCHOR)
        .iter()
        .filter_map(|anchor| anchor.attr("href"))
        .map(str::to_string)
        .collect();

    let cover_image_url = document
        .select_first(markers::COVER_IMAGE)
        .ok_or_else(|| missing(markers::COVER_IMAGE))?
        .attr("src")
        .unwrap_or_default()
        .to_string();

    let description = document
        .select_first(markers::ENTRY_CONTENT)
        .ok_or_else(|| missing(markers::ENTRY_CONTENT))?
        .text()
        .trim()
        .to_string();

    Ok(BookRecord {
        title: heading,
        author: field(labels::AUTHOR),
        isbn10: field(labels::ISBN_10),
        year,
        pages,
        language,
        file_size: field(labels::FILE_SIZE),
        file_format: field(labels::FILE_FORMAT),
        category: field(labels::CATEGORY),
        download_urls,
        cover_image_url,
        description,
    })
}

/// Label → value map of the first definition list, paired by position
fn book_details(
    document: &HtmlDocument,
    title: &Option<String>,
) -> Result<HashMap<String, String>, ExtractError> {
    let list = document
        .select_first(markers::DETAILS)
        .ok_or_else(|| ExtractError::MissingElement {
            marker: markers::DETAILS,
            title: title.clone(),
        })?;

    let labels = list.select_all(markers::DETAIL_LABEL);
    let values = list.select_all(markers::DETAIL_VALUE);
    if labels.len() != values.len() {
        return Err(ExtractError::MismatchedDetails {
            labels: labels.len(),
            values: values.len(),
            title: title.clone(),
        });
    }

    Ok(labels
        .iter()
        .zip(values.iter())
        .map(|(label, value)| (label.text().trim().to_string(), value.text().trim().to_string()))
        .collect())
}

fn numeric_field(
    details: &HashMap<String, String>,
    label: &'static str,
    title: &Option<String>,
) -> Result<u32, ExtractError> {
    match details.get(label) {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| ExtractError::InvalidNumber {
            label,
            value: value.clone(),
            title: title.clone(),
        }),
    }
}

fn first_href(node: &HtmlNode<'_>) -> Option<String> {
    node.select_first(markers::ANCHOR)?
        .attr("href")
        .map(str::to_string)
}
