//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;
use tracing::warn;

use super::types::AppConfig;
use crate::common::errors::{ClientError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    // Add default config file if it exists
    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    // Add environment variables with APP_ prefix
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    let config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ClientError::Configuration(e.to_string()))?;

    warn_on_ratio_drift(&config);
    Ok(config)
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();

    let bitfinex_config = super::types::BitfinexConfig {
        api_key: std::env::var("BITFINEX_API_KEY").ok(),
        api_secret: std::env::var("BITFINEX_API_SECRET").ok(),
        rest_url: std::env::var("BITFINEX_REST_URL")
            .unwrap_or_else(|_| "https://api.bitfinex.com".to_string()),
        ws_url: std::env::var("BITFINEX_WS_URL")
            .unwrap_or_else(|_| "wss://api-pub.bitfinex.com/ws/2".to_string()),
        symbol: std::env::var("BITFINEX_SYMBOL").unwrap_or_else(|_| "fUSD".to_string()),
        currency: std::env::var("BITFINEX_CURRENCY").unwrap_or_else(|_| "USD".to_string()),
    };

    let config = AppConfig {
        bitfinex: bitfinex_config,
        strategy: super::types::StrategySettings::default(),
        settings: super::types::AppSettings::default(),
    };

    warn_on_ratio_drift(&config);
    Ok(config)
}

/// The two allocation ratios conventionally sum to 1.0 but nothing enforces
/// it; the engine runs with whatever is configured. Surface drift at load
/// time so a misconfiguration is at least visible.
fn warn_on_ratio_drift(config: &AppConfig) {
    let sum = config.strategy.fix_ratio + config.strategy.predict_ratio;
    if (sum - 1.0).abs() > 1e-9 {
        warn!(
            fix_ratio = config.strategy.fix_ratio,
            predict_ratio = config.strategy.predict_ratio,
            "allocation ratios sum to {sum}, not 1.0"
        );
    }
}
