// src/exchange/scrape.rs
//! HTML helpers shared by the markup-scraped exchanges: CSS-selector link
//! harvesting and page-to-text flattening for the extractors.

use scraper::{Html, Selector};

/// Collect `(title, href)` pairs for every anchor matched by `selector`.
/// Anchors without an `href` are skipped.
pub(crate) fn select_links(html: &str, selector: &Selector) -> Vec<(String, String)> {
    let doc = Html::parse_document(html);
    doc.select(selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let title = a.text().collect::<Vec<_>>().join(" ").trim().to_string();
            Some((title, href.to_string()))
        })
        .collect()
}

/// Flatten a detail page to newline-separated visible text for the
/// pattern-based extractors.
pub(crate) fn page_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    doc.root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolve a possibly-relative `href` against the exchange base URL.
pub(crate) fn resolve_url(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{base}{href}")
    }
}
