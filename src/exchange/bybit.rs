// src/exchange/bybit.rs
//! Bybit strategy. Same index -> detail -> extract shape as Binance, with
//! Bybit's own selector, trigger phrases and month-name date format.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::Selector;
use tracing::{error, info, warn};

use crate::exchange::{
    join_pair, keep_upcoming, scrape, title_matches, Announcement, Exchange, Listing,
};
use crate::fetch::HttpFetcher;

const BASE_URL: &str = "https://announcements.bybit.com";
const ANNOUNCEMENTS_PATH: &str = "/en-US/";
const TITLE_TRIGGERS: &[&str] = &["will list", "new spot listing"];

pub struct Bybit {
    fetcher: HttpFetcher,
    base_url: String,
}

impl Bybit {
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

    pub fn parse_index(&self, html: &str) -> Vec<Announcement> {
        // The attribute filter keeps only links into the en-US announcement
        // section, which weeds out nav and footer anchors.
        static SEL: OnceCell<Selector> = OnceCell::new();
        let sel =
            SEL.get_or_init(|| Selector::parse(".announcement-item a[href*='/en-US/']").unwrap());

        scrape::select_links(html, sel)
            .into_iter()
            .map(|(title, href)| Announcement {
                title,
                url: scrape::resolve_url(&self.base_url, &href),
            })
            .collect()
    }
}

/// Extract a normalized listing record from announcement detail text.
/// Example phrasing: "trading for ABC/USDT will start on June 1, 2025 at
/// 10:00 UTC".
pub fn extract(detail: &str) -> Option<Listing> {
    static RE_PAIR: OnceCell<Regex> = OnceCell::new();
    static RE_DATE: OnceCell<Regex> = OnceCell::new();
    let re_pair = RE_PAIR.get_or_init(|| Regex::new(r"(?i)trading for (\w+)/(\w+)").unwrap());
    let re_date = RE_DATE.get_or_init(|| {
        Regex::new(r"will start on ([A-Za-z]+ \d{1,2}, \d{4}) at (\d{2}:\d{2}) UTC").unwrap()
    });

    let (Some(pair), Some(date)) = (re_pair.captures(detail), re_date.captures(detail)) else {
        warn!(exchange = "Bybit", "could not parse trading pair or open time");
        return None;
    };

    let date_str = format!("{} {}", &date[1], &date[2]);
    let opens_at = match NaiveDateTime::parse_from_str(&date_str, "%B %d, %Y %H:%M") {
        Ok(dt) => dt.and_utc(),
        Err(_) => {
            warn!(exchange = "Bybit", %date_str, "invalid date format in announcement");
            return None;
        }
    };

    Some(Listing {
        symbol: join_pair(&pair[1], &pair[2]),
        opens_at,
    })
}

#[async_trait]
impl Exchange for Bybit {
    fn name(&self) -> &'static str {
        "Bybit"
    }

    async fn upcoming_listings(&self) -> Result<Vec<Listing>> {
        info!("fetching upcoming listings from Bybit");
        let index_url = format!("{}{}", self.base_url, ANNOUNCEMENTS_PATH);
        let html = match self.fetcher.get_text(&index_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(error = ?e, "failed to fetch Bybit announcements");
                return Ok(Vec::new());
            }
        };

        let candidates = self.parse_index(&html);
        info!(count = candidates.len(), "found Bybit announcements");

        let mut found = Vec::new();
        for cand in candidates
            .iter()
            .filter(|c| title_matches(&c.title, TITLE_TRIGGERS))
        {
            let detail = match self.fetcher.get_text(&cand.url).await {
                Ok(body) => body,
                Err(e) => {
                    error!(url = %cand.url, error = ?e, "failed to fetch Bybit announcement detail");
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
