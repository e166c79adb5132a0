//! Command-line interface parsing for Pricebook
//!
//! This module defines the clap command tree and the translation of CLI
//! overrides onto loaded settings. Parsing of interval names is shared with
//! the `watch` command.

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Settings;
use crate::sync::SyncInterval;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified interval name is not recognized
    #[error("Invalid interval: '{0}'. Valid intervals: hourly, twicedaily, daily")]
    InvalidInterval(String),
}

/// Pricebook - browse service and price listings with offline caching
#[derive(Parser, Debug)]
#[command(name = "pricebook")]
#[command(about = "Browse service and price listings from a Pocket Price API")]
#[command(version)]
pub struct Cli {
    /// Override the API base URL from settings
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the API key from settings
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Override the cache TTL in seconds
    #[arg(long, value_name = "SECONDS")]
    pub ttl: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all services
    Services {
        /// Bypass the cache and fetch fresh data
        #[arg(long)]
        force: bool,

        /// Group the listing by category
        #[arg(long)]
        by_category: bool,

        /// Include service descriptions
        #[arg(long)]
        descriptions: bool,
    },

    /// List all categories
    Categories {
        /// Bypass the cache and fetch fresh data
        #[arg(long)]
        force: bool,
    },

    /// Show a single service
    Service {
        /// Service id
        id: String,
    },

    /// List the services in one category
    Category {
        /// Category id
        id: String,

        /// Include service descriptions
        #[arg(long)]
        descriptions: bool,
    },

    /// Flush the cache and re-fetch both resources now
    Sync,

    /// Check upstream API health
    Health,

    /// Discard cached entries (fallback data is kept)
    Flush {
        /// Also discard fallback data and disk snapshots
        #[arg(long)]
        purge: bool,
    },

    /// Run in the foreground, re-syncing on an interval
    Watch {
        /// Sync interval: hourly, twicedaily or daily
        #[arg(long, value_name = "INTERVAL")]
        every: Option<String>,
    },
}

impl Cli {
    /// Applies command-line overrides onto loaded settings
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(ref api_url) = self.api_url {
            settings.api_url = api_url.clone();
        }
        if let Some(ref api_key) = self.api_key {
            settings.api_key = Some(api_key.clone());
        }
        if let Some(ttl) = self.ttl {
            settings.cache_ttl_secs = ttl;
        }
    }
}

/// Parses an interval string argument into a SyncInterval
pub fn parse_interval_arg(s: &str) -> Result<SyncInterval, CliError> {
    SyncInterval::from_str(s).ok_or_else(|| CliError::InvalidInterval(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_arg_valid_names() {
        assert_eq!(parse_interval_arg("hourly").unwrap(), SyncInterval::Hourly);
        assert_eq!(
            parse_interval_arg("twicedaily").unwrap(),
            SyncInterval::TwiceDaily
        );
        assert_eq!(parse_interval_arg("daily").unwrap(), SyncInterval::Daily);
    }

    #[test]
    fn test_parse_interval_arg_invalid() {
        let result = parse_interval_arg("weekly");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid interval"));
        assert!(err.to_string().contains("weekly"));
    }

    #[test]
    fn test_cli_parse_services_flags() {
        let cli = Cli::parse_from(["pricebook", "services", "--force", "--by-category"]);

        match cli.command {
            Command::Services {
                force,
                by_category,
                descriptions,
            } => {
                assert!(force);
                assert!(by_category);
                assert!(!descriptions);
            }
            other => panic!("Expected services command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_service_requires_id() {
        assert!(Cli::try_parse_from(["pricebook", "service"]).is_err());

        let cli = Cli::parse_from(["pricebook", "service", "svc-1"]);
        match cli.command {
            Command::Service { id } => assert_eq!(id, "svc-1"),
            other => panic!("Expected service command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_flush_purge() {
        let cli = Cli::parse_from(["pricebook", "flush", "--purge"]);
        match cli.command {
            Command::Flush { purge } => assert!(purge),
            other => panic!("Expected flush command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_watch_interval() {
        let cli = Cli::parse_from(["pricebook", "watch", "--every", "daily"]);
        match cli.command {
            Command::Watch { every } => assert_eq!(every.as_deref(), Some("daily")),
            other => panic!("Expected watch command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["pricebook"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_settings() {
        let cli = Cli::parse_from([
            "pricebook",
            "--api-url",
            "https://staging.pocketprice.ru",
            "--api-key",
            "secret",
            "--ttl",
            "60",
            "sync",
        ]);

        let mut settings = Settings::default();
        cli.apply_to(&mut settings);

        assert_eq!(settings.api_url, "https://staging.pocketprice.ru");
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.cache_ttl_secs, 60);
    }

    #[test]
    fn test_no_overrides_keep_settings() {
        let cli = Cli::parse_from(["pricebook", "sync"]);

        let mut settings = Settings::default();
        cli.apply_to(&mut settings);

        assert_eq!(settings.api_url, "https://api.pocketprice.ru");
        assert!(settings.api_key.is_none());
        assert_eq!(settings.cache_ttl_secs, 3600);
    }
}
