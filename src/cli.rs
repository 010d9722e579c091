//! Command-line interface parsing for matchday
//!
//! This module handles parsing of CLI arguments using clap and converts
//! them into the startup configuration consumed by `main`.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::refresh::{DEFAULT_CACHE_TTL, DEFAULT_REFRESH_INTERVAL};

/// Default fixtures endpoint
pub const DEFAULT_FIXTURES_URL: &str = "https://api.fixturefeed.io/v1/fixtures";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The refresh interval cannot be zero; the background timer needs a
    /// positive period
    #[error("Invalid refresh interval: {0} seconds. Must be at least 1.")]
    InvalidInterval(u64),
}

/// Matchday - live sports fixtures in your terminal
#[derive(Parser, Debug)]
#[command(name = "matchday")]
#[command(about = "Upcoming sports fixtures with cached, auto-refreshing data")]
#[command(version)]
pub struct Cli {
    /// Fixtures endpoint URL
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Background refresh period in seconds (default 300)
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Cache entry time-to-live in seconds (default 300)
    #[arg(long, value_name = "SECONDS")]
    pub ttl: Option<u64>,

    /// Keep the cache in memory only, skipping the on-disk store
    #[arg(long)]
    pub no_cache: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Fixtures endpoint URL
    pub url: String,
    /// Period between background revalidations
    pub interval: Duration,
    /// Time-to-live for cache entries
    pub cache_ttl: Duration,
    /// Whether to skip the on-disk store
    pub ephemeral_cache: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FIXTURES_URL.to_string(),
            interval: DEFAULT_REFRESH_INTERVAL,
            cache_ttl: DEFAULT_CACHE_TTL,
            ephemeral_cache: false,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with defaults applied for omitted flags
    /// * `Err(CliError)` if a zero interval was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if let Some(0) = cli.interval {
            return Err(CliError::InvalidInterval(0));
        }

        let mut config = StartupConfig::default();
        if let Some(ref url) = cli.url {
            config.url = url.clone();
        }
        if let Some(interval) = cli.interval {
            config.interval = Duration::from_secs(interval);
        }
        if let Some(ttl) = cli.ttl {
            config.cache_ttl = Duration::from_secs(ttl);
        }
        config.ephemeral_cache = cli.no_cache;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["matchday"]);
        assert!(cli.url.is_none());
        assert!(cli.interval.is_none());
        assert!(cli.ttl.is_none());
        assert!(!cli.no_cache);
    }

    #[test]
    fn test_startup_config_defaults() {
        let cli = Cli::parse_from(["matchday"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.url, DEFAULT_FIXTURES_URL);
        assert_eq!(config.interval, DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.cache_ttl, DEFAULT_CACHE_TTL);
        assert!(!config.ephemeral_cache);
    }

    #[test]
    fn test_url_override() {
        let cli = Cli::parse_from(["matchday", "--url", "https://example.com/fixtures"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.url, "https://example.com/fixtures");
    }

    #[test]
    fn test_interval_and_ttl_override() {
        let cli = Cli::parse_from(["matchday", "--interval", "60", "--ttl", "120"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.cache_ttl, Duration::from_secs(120));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let cli = Cli::parse_from(["matchday", "--interval", "0"]);
        let result = StartupConfig::from_cli(&cli);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid refresh interval"));
    }

    #[test]
    fn test_zero_ttl_is_allowed() {
        // A zero TTL just means entries expire immediately; that is a valid,
        // if unusual, configuration.
        let cli = Cli::parse_from(["matchday", "--ttl", "0"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_no_cache_flag() {
        let cli = Cli::parse_from(["matchday", "--no-cache"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.ephemeral_cache);
    }
}
