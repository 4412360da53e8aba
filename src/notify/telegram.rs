// src/notify/telegram.rs
//! Telegram Bot API notifier with multi-chat fan-out. A delivery failure for
//! one chat is logged and never blocks the others.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

use super::Notifier;
use crate::config::TelegramConfig;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramNotifier {
    bot_token: String,
    chat_ids: Vec<String>,
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

impl TelegramNotifier {
    pub fn new(cfg: &TelegramConfig) -> Self {
        Self::with_base_url(cfg, API_BASE)
    }

    /// Test seam: point the notifier at a local server.
    pub fn with_base_url(cfg: &TelegramConfig, base_url: impl Into<String>) -> Self {
        Self {
            bot_token: cfg.bot_token.clone(),
            chat_ids: cfg.chat_ids.clone(),
            client: Client::new(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        for chat_id in &self.chat_ids {
            let payload = SendMessage {
                chat_id,
                text,
                parse_mode: "HTML",
            };
            let res = self
                .client
                .post(&url)
                .timeout(self.timeout)
                .form(&payload)
                .send()
                .await;
            match res {
                Ok(resp) => {
                    if let Err(e) = resp.error_for_status() {
                        error!(%chat_id, error = %e, "telegram message rejected");
                    }
                }
                Err(e) => {
                    error!(%chat_id, error = %e, "failed to send telegram message");
                }
            }
        }
        Ok(())
    }
}
