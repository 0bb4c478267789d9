//! Configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::errors::{BotError, Result};
use crate::strategy::StrategyConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Venue and wallet configuration
    #[serde(default)]
    pub venue: VenueConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
    /// Strategy rows, in the order they are evaluated
    #[serde(default)]
    pub strategies: Vec<StrategyRow>,
}

impl AppConfig {
    /// Validate the whole configuration and return the parsed strategies
    ///
    /// Every problem found here is fatal at startup.
    pub fn validate(&self) -> Result<Vec<StrategyConfig>> {
        url::Url::parse(&self.venue.api_url).map_err(|e| {
            BotError::Configuration(format!("Invalid api_url {}: {}", self.venue.api_url, e))
        })?;
        if let Some(rpc_url) = &self.venue.rpc_url {
            url::Url::parse(rpc_url).map_err(|e| {
                BotError::Configuration(format!("Invalid rpc_url {}: {}", rpc_url, e))
            })?;
        }

        if !is_address(&self.venue.wallet_address) {
            return Err(BotError::Configuration(format!(
                "Invalid wallet address: {:?}",
                self.venue.wallet_address
            )));
        }

        if self.settings.poll_delay_seconds == 0 {
            return Err(BotError::Configuration(
                "poll_delay_seconds must be at least 1".to_string(),
            ));
        }

        if self.strategies.is_empty() {
            return Err(BotError::Configuration(
                "At least one strategy must be configured".to_string(),
            ));
        }

        self.strategies
            .iter()
            .enumerate()
            .map(|(index, row)| {
                StrategyConfig::try_from(row).map_err(|e| {
                    BotError::Configuration(format!("Strategy #{}: {}", index + 1, e))
                })
            })
            .collect()
    }
}

fn is_address(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Venue and wallet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Base URL of the Saturn ticker API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Address of the trading wallet
    #[serde(default)]
    pub wallet_address: String,
    /// JSON-RPC node used for receipt checks, replacing the chain's default
    #[serde(default)]
    pub rpc_url: Option<String>,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            wallet_address: String::new(),
            rpc_url: None,
        }
    }
}

fn default_api_url() -> String {
    "https://ticker.saturn.network/api/v2".to_string()
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Delay between the end of one poll cycle and the start of the next
    #[serde(default = "default_poll_delay")]
    pub poll_delay_seconds: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// How long to wait for a submitted trade to be indexed
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_seconds: u64,
    /// Interval between confirmation polls in milliseconds
    #[serde(default = "default_confirmation_poll_interval")]
    pub confirmation_poll_interval_ms: u64,
    /// Record trades instead of signing and broadcasting them
    #[serde(default = "default_paper_trading")]
    pub paper_trading: bool,
}

impl AppSettings {
    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(self.poll_delay_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_seconds)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            poll_delay_seconds: default_poll_delay(),
            request_timeout_seconds: default_request_timeout(),
            confirmation_timeout_seconds: default_confirmation_timeout(),
            confirmation_poll_interval_ms: default_confirmation_poll_interval(),
            paper_trading: default_paper_trading(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_delay() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

fn default_confirmation_timeout() -> u64 {
    600
}

fn default_confirmation_poll_interval() -> u64 {
    5000
}

fn default_paper_trading() -> bool {
    true
}

/// One strategy row as written in the config file
///
/// Prices and limits are kept as text so they reach `Decimal` without
/// passing through a float.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRow {
    /// Token contract address
    pub token: String,
    /// Chain symbol (ETC or ETH)
    pub blockchain: String,
    /// "buy" or "sell"
    pub action: String,
    /// Price threshold in ether per token
    pub price: String,
    /// Maximum ether volume per trailing hour
    #[serde(alias = "hourly_ether_limit")]
    pub houretherlimit: String,
}
