//! Configuration types

use serde::{Deserialize, Serialize};

use crate::common::errors::{ClientError, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bitfinex venue configuration
    #[serde(default)]
    pub bitfinex: BitfinexConfig,
    /// Allocation strategy policy constants
    #[serde(default)]
    pub strategy: StrategySettings,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Bitfinex venue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitfinexConfig {
    /// API key for authenticated requests
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signing requests
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Base URL for the REST API
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// WebSocket URL for the public trades feed
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Funding symbol to trade (fUSD, fUST, ...)
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Primary wallet currency backing the symbol
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for BitfinexConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            rest_url: default_rest_url(),
            ws_url: default_ws_url(),
            symbol: default_symbol(),
            currency: default_currency(),
        }
    }
}

impl BitfinexConfig {
    /// Extract credentials, failing when either half is missing.
    ///
    /// Missing credentials are fatal: the bot cannot read balances or place
    /// offers without them.
    pub fn credentials(&self) -> Result<ApiCredentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Ok(ApiCredentials::new(key.clone(), secret.clone()))
            }
            _ => Err(ClientError::Configuration(
                "API key and secret must be set".to_string(),
            )),
        }
    }
}

fn default_rest_url() -> String {
    "https://api.bitfinex.com".to_string()
}

fn default_ws_url() -> String {
    "wss://api-pub.bitfinex.com/ws/2".to_string()
}

fn default_symbol() -> String {
    "fUSD".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Policy constants consumed by the allocation engine.
///
/// `fix_ratio` and `predict_ratio` conventionally sum to 1.0 but the sum is
/// never enforced; the loader logs a warning when it drifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySettings {
    /// Share of the total balance targeted by the fixed leg
    #[serde(default = "default_fix_ratio")]
    pub fix_ratio: f64,
    /// Share of the total balance targeted by the predictive leg
    #[serde(default = "default_predict_ratio")]
    pub predict_ratio: f64,
    /// Multiplier applied to the FRR for predictive offers
    #[serde(default = "default_frr_multiplier")]
    pub frr_multiplier: f64,
    /// Minimum order size; smaller remainders are skipped for the cycle
    #[serde(default = "default_min_order_amount")]
    pub min_order_amount: f64,
    /// Fixed tenor for predictive offers, in days
    #[serde(default = "default_predict_period_days")]
    pub predict_period_days: u32,
    /// Seconds to sleep between decision cycles
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            fix_ratio: default_fix_ratio(),
            predict_ratio: default_predict_ratio(),
            frr_multiplier: default_frr_multiplier(),
            min_order_amount: default_min_order_amount(),
            predict_period_days: default_predict_period_days(),
            cycle_interval_secs: default_cycle_interval_secs(),
        }
    }
}

fn default_fix_ratio() -> f64 {
    0.5
}

fn default_predict_ratio() -> f64 {
    0.5
}

fn default_frr_multiplier() -> f64 {
    1.3
}

fn default_min_order_amount() -> f64 {
    150.0
}

fn default_predict_period_days() -> u32 {
    2
}

fn default_cycle_interval_secs() -> u64 {
    300
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// API credentials for authenticated requests
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}
