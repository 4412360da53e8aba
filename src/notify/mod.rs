// src/notify/mod.rs
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// Delivery of one human-readable message to a messaging channel. The
/// destinations live inside the implementation; callers hand over text only.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

pub use telegram::TelegramNotifier;
