// src/scheduler.rs
//! One poll cycle across all configured exchanges: collect, format, stream
//! notifications, write the snapshot sink. Plus the unbounded loop driving
//! cycles at a fixed interval.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::Config;
use crate::exchange::{Exchange, Listing};
use crate::notify::Notifier;

const CYCLE_START_MESSAGE: &str = "🔍 Checking for new listings across all exchanges...";

pub fn format_listing(exchange: &str, listing: &Listing) -> String {
    format!(
        "{} : {} ({})",
        exchange,
        listing.symbol,
        listing.opens_at.to_rfc3339()
    )
}

/// Run one poll cycle. Returns the formatted lines (positive results first,
/// then no-update notices, both in exchange order) that were written to the
/// sink. No single exchange failure aborts the cycle.
pub async fn run_cycle(
    exchanges: &[Box<dyn Exchange>],
    notifier: &dyn Notifier,
    output_path: &Path,
) -> Result<Vec<String>> {
    if let Err(e) = notifier.send(CYCLE_START_MESSAGE).await {
        error!(error = ?e, "failed to send cycle-start notification");
    }

    let mut lines = Vec::new();
    let mut emitted = HashSet::new();
    let mut quiet = Vec::new();

    for exchange in exchanges {
        let name = exchange.name();
        info!(exchange = name, "fetching upcoming listings");
        let listings = match exchange.upcoming_listings().await {
            Ok(listings) => listings,
            Err(e) => {
                error!(exchange = name, error = ?e, "unexpected exchange failure");
                Vec::new()
            }
        };

        let mut found_any = false;
        for listing in &listings {
            let line = format_listing(name, listing);
            // Repeated announcements for the same pair collapse to one line.
            if !emitted.insert(line.clone()) {
                continue;
            }
            info!("{line}");
            if let Err(e) = notifier.send(&format!("📢 New listing!\n{line}")).await {
                error!(error = ?e, "failed to send listing notification");
            }
            lines.push(line);
            found_any = true;
        }
        if !found_any {
            quiet.push(name);
        }
    }

    // No-update notices go to the log and the sink, never to the notifier.
    for name in quiet {
        let line = format!("{name} -> no new listings at the moment");
        info!("{line}");
        lines.push(line);
    }

    write_snapshot(output_path, &lines).await?;
    Ok(lines)
}

/// Overwrite the sink with this cycle's findings. The file is a snapshot,
/// not an append-only log.
async fn write_snapshot(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("writing snapshot to {}", path.display()))
}

/// Poll forever: one cycle, a fixed sleep, repeat. A slow cycle delays the
/// next start by cycle time + interval; the loop ends only with the process.
pub async fn run_loop(exchanges: &[Box<dyn Exchange>], notifier: &dyn Notifier, cfg: &Config) {
    loop {
        info!("starting fetch cycle");
        if let Err(e) = run_cycle(exchanges, notifier, &cfg.output_path).await {
            error!(error = ?e, "poll cycle failed");
        }
        info!(seconds = cfg.interval.as_secs(), "sleeping until next cycle");
        tokio::time::sleep(cfg.interval).await;
    }
}
