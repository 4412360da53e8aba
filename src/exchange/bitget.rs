// src/exchange/bitget.rs
//! Bitget strategy. Bitget exposes a structured symbols endpoint rather than
//! an announcement feed, so there is nothing to text-extract: each cycle's
//! snapshot is diffed against the previously seen symbol set and only newly
//! appeared pairs are reported, stamped with the observation time.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::exchange::{join_pair, Exchange, Listing};
use crate::fetch::HttpFetcher;

const BASE_URL: &str = "https://api.bitget.com";
const SYMBOLS_PATH: &str = "/api/v2/spot/public/symbols";

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    #[serde(default)]
    data: Vec<SymbolEntry>,
}

#[derive(Debug, Deserialize)]
struct SymbolEntry {
    #[serde(rename = "baseAsset")]
    base_asset: String,
    #[serde(rename = "quoteAsset")]
    quote_asset: String,
    status: String,
}

pub struct Bitget {
    fetcher: HttpFetcher,
    base_url: String,
    // Symbols already observed; survives across cycles within the process.
    seen: RwLock<HashSet<String>>,
}

impl Bitget {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self::with_base_url(fetcher, BASE_URL)
    }

    /// Test seam: point the client at a local server.
    pub fn with_base_url(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            seen: RwLock::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl Exchange for Bitget {
    fn name(&self) -> &'static str {
        "Bitget"
    }

    async fn upcoming_listings(&self) -> Result<Vec<Listing>> {
        info!("fetching tradable symbols from Bitget");
        let url = format!("{}{}", self.base_url, SYMBOLS_PATH);
        let resp: SymbolsResponse = match self.fetcher.get_json(&url).await {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = ?e, "failed to fetch Bitget symbols");
                return Ok(Vec::new());
            }
        };

        let tradable: Vec<String> = resp
            .data
            .iter()
            .filter(|s| s.status == "TRADING")
            .map(|s| join_pair(&s.base_asset, &s.quote_asset))
            .collect();

        let mut seen = self.seen.write().await;

        // An empty snapshot never counts as a baseline; seeding waits for the
        // first poll that actually returns symbols.
        if seen.is_empty() {
            seen.extend(tradable);
            info!(count = seen.len(), "seeded Bitget symbol snapshot");
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut fresh = Vec::new();
        for symbol in tradable {
            if seen.insert(symbol.clone()) {
                info!(%symbol, "new Bitget pair detected");
                fresh.push(Listing {
                    symbol,
                    opens_at: now,
                });
            }
        }
        Ok(fresh)
    }
}
