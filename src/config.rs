// src/config.rs
//! Runtime configuration: environment variables (optionally seeded from a
//! `.env` file) with a TOML overlay for the non-secret knobs. Secrets are
//! env-only; their absence is a startup error, not a mid-cycle crash.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const ENV_CONFIG_PATH: &str = "LISTING_WATCHER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/watcher.toml";

const DEFAULT_INTERVAL_SECS: u64 = 300;
const DEFAULT_OUTPUT_FILE: &str = "output/listings.txt";
const DEFAULT_LOG_FILE: &str = "listings.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub interval: Duration,
    pub output_path: PathBuf,
    pub log_path: PathBuf,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_ids: Vec<String>,
}

/// Non-secret knobs the overlay file may supply.
#[derive(Debug, Default, Deserialize)]
struct Overlay {
    interval_seconds: Option<u64>,
    output_file: Option<String>,
    log_file: Option<String>,
}

impl Config {
    /// Resolve configuration: overlay file first, env vars override.
    pub fn from_env() -> Result<Self> {
        let overlay = load_overlay()?;

        let interval_secs = match env::var("FETCH_INTERVAL_SECONDS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .context("FETCH_INTERVAL_SECONDS must be an integer number of seconds")?,
            Err(_) => overlay.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECS),
        };

        let output_path = env::var("OUTPUT_FILE")
            .ok()
            .or(overlay.output_file)
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());

        let log_path = env::var("LOG_FILE")
            .ok()
            .or(overlay.log_file)
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        let bot_token =
            env::var("TELEGRAM_BOT_TOKEN").map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;
        let chat_ids = parse_chat_ids(&env::var("TELEGRAM_CHAT_IDS").unwrap_or_default())?;

        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            output_path: PathBuf::from(output_path),
            log_path: PathBuf::from(log_path),
            telegram: TelegramConfig { bot_token, chat_ids },
        })
    }
}

fn parse_chat_ids(raw: &str) -> Result<Vec<String>> {
    let ids: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if ids.is_empty() {
        return Err(anyhow!(
            "TELEGRAM_CHAT_IDS must list at least one chat id (comma-separated)"
        ));
    }
    Ok(ids)
}

/// Overlay lookup: $LISTING_WATCHER_CONFIG, else config/watcher.toml, else
/// built-in defaults.
fn load_overlay() -> Result<Overlay> {
    if let Ok(p) = env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to a non-existent path"));
        }
        return read_overlay(&pb);
    }
    let default = Path::new(DEFAULT_CONFIG_PATH);
    if default.exists() {
        return read_overlay(default);
    }
    Ok(Overlay::default())
}

fn read_overlay(path: &Path) -> Result<Overlay> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config from {}", path.display()))
}
