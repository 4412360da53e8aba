//! Listing Watcher binary entrypoint.
//! Wires configuration, logging, the exchange strategies and the Telegram
//! notifier, then hands off to the scheduler loop.

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use listing_watcher::config::Config;
use listing_watcher::exchange::{
    binance::Binance, bitget::Bitget, bybit::Bybit, okx::Okx, Exchange,
};
use listing_watcher::fetch::HttpFetcher;
use listing_watcher::notify::TelegramNotifier;
use listing_watcher::scheduler;

/// Console plus append-style file logging; `RUST_LOG` narrows the filter.
/// The log file is diagnostics only, separate from the output sink.
fn init_tracing(cfg: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_path)
        .with_context(|| format!("opening log file {}", cfg.log_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(log_file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cfg = Config::from_env()?;
    init_tracing(&cfg)?;
    info!("starting listing watcher");

    let fetcher = HttpFetcher::new()?;
    let exchanges: Vec<Box<dyn Exchange>> = vec![
        Box::new(Binance::new(fetcher.clone())),
        Box::new(Bybit::new(fetcher.clone())),
        Box::new(Okx::new(fetcher.clone())),
        Box::new(Bitget::new(fetcher)),
    ];
    let notifier = TelegramNotifier::new(&cfg.telegram);

    scheduler::run_loop(&exchanges, &notifier, &cfg).await;
    Ok(())
}
