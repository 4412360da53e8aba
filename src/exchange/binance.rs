// src/exchange/binance.rs
//! Binance strategy: scrape the announcement index, follow listing-flavored
//! entries, extract the pair and open time from the detail text.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::Selector;
use tracing::{error, info, warn};

use crate::exchange::{
    keep_upcoming, normalize_pair, scrape, title_matches, Announcement, Exchange, Listing,
};
use crate::fetch::HttpFetcher;

const BASE_URL: &str = "https://www.binance.com";
const ANNOUNCEMENTS_PATH: &str = "/en/support/announcement/c-48";
// Defends against unrelated links the entry selector happens to match.
const ANNOUNCEMENT_URL_MARKER: &str = "/en/support/announcement/";
const TITLE_TRIGGERS: &[&str] = &["will list", "will be listed"];

pub struct Binance {
    fetcher: HttpFetcher,
    base_url: String,
}

impl Binance {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self::with_base_url(fetcher, BASE_URL)
    }

    /// Test seam: point the scraper at a local server.
    pub fn with_base_url(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    /// Pull announcement candidates out of the index page markup.
    pub fn parse_index(&self, html: &str) -> Vec<Announcement> {
        // Entry class observed on the index page; may rot without notice.
        static SEL: OnceCell<Selector> = OnceCell::new();
        let sel = SEL.get_or_init(|| Selector::parse("a.css-1ej4hfo").unwrap());

        scrape::select_links(html, sel)
            .into_iter()
            .filter(|(_, href)| href.contains(ANNOUNCEMENT_URL_MARKER))
            .map(|(title, href)| Announcement {
                title,
                url: scrape::resolve_url(&self.base_url, &href),
            })
            .collect()
    }
}

/// Extract a normalized listing record from announcement detail text.
/// Example phrasing: "Trading will open for ABC/USDT trading pair at
/// 2025-06-01 10:00 (UTC)". The text states UTC, so the parsed time is
/// tagged with an explicit offset.
pub fn extract(detail: &str) -> Option<Listing> {
    static RE_PAIR: OnceCell<Regex> = OnceCell::new();
    static RE_DATE: OnceCell<Regex> = OnceCell::new();
    let re_pair =
        RE_PAIR.get_or_init(|| Regex::new(r"(?i)trading will open for (\w+/\w+)").unwrap());
    let re_date =
        RE_DATE.get_or_init(|| Regex::new(r"at\s+(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2})").unwrap());

    let (Some(pair), Some(date)) = (re_pair.captures(detail), re_date.captures(detail)) else {
        warn!(exchange = "Binance", "could not parse trading pair or open time");
        return None;
    };

    let date_str = date[1].split_whitespace().collect::<Vec<_>>().join(" ");
    let opens_at = match NaiveDateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M") {
        Ok(dt) => dt.and_utc(),
        Err(_) => {
            warn!(exchange = "Binance", %date_str, "invalid date format in announcement");
            return None;
        }
    };

    Some(Listing {
        symbol: normalize_pair(&pair[1], '/')?,
        opens_at,
    })
}

#[async_trait]
impl Exchange for Binance {
    fn name(&self) -> &'static str {
        "Binance"
    }

    async fn upcoming_listings(&self) -> Result<Vec<Listing>> {
        info!("fetching upcoming listings from Binance announcements");
        let index_url = format!("{}{}", self.base_url, ANNOUNCEMENTS_PATH);
        let html = match self.fetcher.get_text(&index_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(error = ?e, "failed to fetch Binance announcements");
                return Ok(Vec::new());
            }
        };

        let candidates = self.parse_index(&html);
        info!(count = candidates.len(), "found Binance announcements");

        let mut found = Vec::new();
        for cand in candidates
            .iter()
            .filter(|c| title_matches(&c.title, TITLE_TRIGGERS))
        {
            let detail = match self.fetcher.get_text(&cand.url).await {
                Ok(body) => body,
                Err(e) => {
                    error!(url = %cand.url, error = ?e, "failed to fetch Binance announcement detail");
                    continue;
                }
            };
            if let Some(listing) = extract(&scrape::page_text(&detail)) {
                found.push(listing);
            }
        }

        Ok(keep_upcoming(found, Utc::now()))
    }
}
