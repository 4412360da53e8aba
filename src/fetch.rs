// src/fetch.rs
//! Shared outbound HTTP layer: one client, bounded timeout, bounded retries.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Total attempts per call, not retries-after-failure.
pub const MAX_ATTEMPTS: u32 = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Some announcement hosts reject requests without a browser-like UA.
const USER_AGENT: &str = "Mozilla/5.0";

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }

    /// GET a page and return its body as text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.get_with_retry(url).await?;
        resp.text()
            .await
            .with_context(|| format!("reading body from {url}"))
    }

    /// GET a JSON endpoint and deserialize the body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.get_with_retry(url).await?;
        resp.json::<T>()
            .await
            .with_context(|| format!("decoding json from {url}"))
    }

    // Timeouts, connection errors and non-2xx statuses are treated as
    // transient and retried immediately; anything else fails the call.
    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.client.get(url).send().await {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => return Ok(resp),
                    Err(e) => {
                        if attempt >= MAX_ATTEMPTS {
                            return Err(e)
                                .with_context(|| format!("GET {url} after {attempt} attempts"));
                        }
                        warn!(
                            %url,
                            attempt,
                            max = MAX_ATTEMPTS,
                            status = ?e.status(),
                            "request returned error status, retrying"
                        );
                    }
                },
                Err(e) if e.is_timeout() || e.is_connect() => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(e)
                            .with_context(|| format!("GET {url} after {attempt} attempts"));
                    }
                    warn!(%url, attempt, max = MAX_ATTEMPTS, error = %e, "transient fetch error, retrying");
                }
                Err(e) => return Err(e).with_context(|| format!("GET {url}")),
            }
        }
    }
}
