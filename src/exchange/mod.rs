// src/exchange/mod.rs
//! Exchange capability surface: the `Exchange` trait, the normalized listing
//! record, and the shared filtering/normalization primitives the per-exchange
//! strategies are built from.

pub mod binance;
pub mod bitget;
pub mod bybit;
pub mod okx;

pub(crate) mod scrape;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A provisional announcement entry discovered on an exchange's index page,
/// before its content has been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub title: String,
    pub url: String,
}

/// A normalized upcoming-listing record. `symbol` is always `BASE-QUOTE`,
/// uppercase; `opens_at` always carries an explicit UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Listing {
    pub symbol: String,
    pub opens_at: DateTime<Utc>,
}

/// Uniform per-exchange capability. The scheduler depends only on this trait,
/// never on the concrete exchange types.
#[async_trait]
pub trait Exchange: Send + Sync {
    fn name(&self) -> &'static str;

    /// Listings announced to become tradable, filtered and validated.
    /// Expected failure modes (fetch errors, parse mismatches) are absorbed
    /// here: they are logged and produce an empty list, never an `Err`.
    async fn upcoming_listings(&self) -> Result<Vec<Listing>>;

    /// Historical listings. Not tracked yet, but the capability stays
    /// callable without error.
    async fn past_listings(&self) -> Result<Vec<Listing>> {
        Ok(Vec::new())
    }
}

// --- symbol normalization ---

// Quote assets recognized when a pair arrives concatenated (`ABCUSDT`).
// Longest-match order matters: USDT before USD.
const QUOTE_ASSETS: &[&str] = &["USDT", "USDC", "BUSD", "USD", "BTC", "ETH", "EUR"];

pub fn join_pair(base: &str, quote: &str) -> String {
    format!("{}-{}", base.to_uppercase(), quote.to_uppercase())
}

/// Normalize a raw pair token to canonical `BASE-QUOTE` form. `sep` is the
/// separator this source is expected to use; a token without it is split on
/// a known quote-asset suffix instead.
pub fn normalize_pair(raw: &str, sep: char) -> Option<String> {
    let raw = raw.trim().to_uppercase();
    if let Some((base, quote)) = raw.split_once(sep) {
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        return Some(join_pair(base, quote));
    }
    for quote in QUOTE_ASSETS {
        if let Some(base) = raw.strip_suffix(quote) {
            if !base.is_empty() {
                return Some(join_pair(base, quote));
            }
        }
    }
    None
}

// --- candidate / record filters ---

/// Title pre-filter: does this announcement look like a new-listing notice?
/// Saves a detail fetch for delistings, maintenance notices and the like.
pub fn title_matches(title: &str, triggers: &[&str]) -> bool {
    let title = title.to_lowercase();
    triggers.iter().any(|t| title.contains(t))
}

/// Keep only records strictly in the future. The boundary is exclusive: a
/// record opening exactly at `now` is not upcoming.
pub fn keep_upcoming(listings: Vec<Listing>, now: DateTime<Utc>) -> Vec<Listing> {
    listings.into_iter().filter(|l| l.opens_at > now).collect()
}
