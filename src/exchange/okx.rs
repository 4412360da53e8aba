// src/exchange/okx.rs
//! OKX strategy. OKX announcements state pair and open time in one sentence,
//! so a single combined pattern covers both.

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

const BASE_URL: &str = "https://www.okx.com";
const ANNOUNCEMENTS_PATH: &str = "/en-us/help/section/announcements-new-listings";
const TITLE_TRIGGERS: &[&str] = &["will list", "new listing"];

pub struct Okx {
    fetcher: HttpFetcher,
    base_url: String,
}

impl Okx {
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
        static SEL: OnceCell<Selector> = OnceCell::new();
        let sel = SEL.get_or_init(|| Selector::parse(".announcement-list-item a").unwrap());

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
/// Example phrasing: "OKX will list ABC/USDT at 2025-06-01 10:00 UTC".
pub fn extract(detail: &str) -> Option<Listing> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)will list (\w+)/(\w+) at (\d{4}-\d{2}-\d{2} \d{2}:\d{2}) UTC").unwrap()
    });

    let Some(caps) = re.captures(detail) else {
        warn!(exchange = "OKX", "could not parse listing details");
        return None;
    };

    let opens_at = match NaiveDateTime::parse_from_str(&caps[3], "%Y-%m-%d %H:%M") {
        Ok(dt) => dt.and_utc(),
        Err(_) => {
            warn!(exchange = "OKX", date_str = &caps[3], "invalid date format in announcement");
            return None;
        }
    };

    Some(Listing {
        symbol: join_pair(&caps[1], &caps[2]),
        opens_at,
    })
}

#[async_trait]
impl Exchange for Okx {
    fn name(&self) -> &'static str {
        "OKX"
    }

    async fn upcoming_listings(&self) -> Result<Vec<Listing>> {
        info!("fetching upcoming listings from OKX");
        let index_url = format!("{}{}", self.base_url, ANNOUNCEMENTS_PATH);
        let html = match self.fetcher.get_text(&index_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(error = ?e, "failed to fetch OKX announcements");
                return Ok(Vec::new());
            }
        };

        let candidates = self.parse_index(&html);
        info!(count = candidates.len(), "found OKX announcements");

        let mut found = Vec::new();
        for cand in candidates
            .iter()
            .filter(|c| title_matches(&c.title, TITLE_TRIGGERS))
        {
            let detail = match self.fetcher.get_text(&cand.url).await {
                Ok(body) => body,
                Err(e) => {
                    error!(url = %cand.url, error = ?e, "failed to fetch OKX announcement detail");
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
