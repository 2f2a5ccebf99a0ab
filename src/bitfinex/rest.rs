//! REST API client for the Bitfinex funding market

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use std::collections::HashMap;

use super::auth::generate_auth_headers;
use super::decode;
use crate::common::coerce;
use crate::common::errors::{ClientError, Result};
use crate::common::traits::FundingTransport;
use crate::common::types::{BookOffer, RateStat, TradeUpdate};
use crate::config::types::ApiCredentials;

/// Path for authenticated wallet reads
pub const WALLETS_PATH: &str = "v2/auth/r/wallets";
/// Path for funding offer submission
pub const OFFER_SUBMIT_PATH: &str = "v2/auth/w/funding/offer/submit";
/// Path for funding offer cancellation
pub const OFFER_CANCEL_PATH: &str = "v2/auth/w/funding/offer/cancel";

/// Raw-book path for a funding symbol
pub fn book_path(symbol: &str) -> String {
    format!("v2/book/{}/R0?len=100", symbol)
}

/// Funding statistics history path for a symbol
pub fn funding_stats_path(symbol: &str) -> String {
    format!("v2/funding/stats/{}/hist", symbol)
}

/// Recent trades path for a symbol, newest first
pub fn trades_path(symbol: &str) -> String {
    format!("v2/trades/{}/hist?limit=125&sort=-1", symbol)
}

/// REST API client for Bitfinex
///
/// Every request is signed, public endpoints included; the venue tolerates
/// auth headers on public paths and one code path keeps the client simple.
#[derive(Debug, Clone)]
pub struct BitfinexRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the API
    base_url: String,
    /// API credentials for request signing
    credentials: ApiCredentials,
}

impl BitfinexRestClient {
    /// Create a new REST client with the default 10 second timeout
    pub fn new(base_url: &str, credentials: ApiCredentials) -> Result<Self> {
        Self::with_timeout(base_url, credentials, Duration::from_secs(10))
    }

    /// Create a new REST client with a custom timeout
    pub fn with_timeout(
        base_url: &str,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Fetch funding wallet total balances, keyed by currency
    #[instrument(skip(self))]
    pub async fn get_wallet_totals(&self) -> Result<HashMap<String, f64>> {
        let raw = self.signed_request("POST", WALLETS_PATH, None).await?;
        decode::decode_wallet_totals(&raw)
    }

    /// Fetch available funding balances, keyed by currency
    #[instrument(skip(self))]
    pub async fn get_available_funding(&self) -> Result<HashMap<String, f64>> {
        let raw = self.signed_request("POST", WALLETS_PATH, None).await?;
        decode::decode_available_funding(&raw)
    }

    /// Fetch the raw funding order book for a symbol
    #[instrument(skip(self))]
    pub async fn get_book(&self, symbol: &str) -> Result<Vec<BookOffer>> {
        let raw = self.signed_request("GET", &book_path(symbol), None).await?;
        decode::decode_book_offers(&raw)
    }

    /// Fetch funding statistics history, most recent sample first
    #[instrument(skip(self))]
    pub async fn get_funding_stats(&self, symbol: &str) -> Result<Vec<RateStat>> {
        let raw = self
            .signed_request("GET", &funding_stats_path(symbol), None)
            .await?;
        decode::decode_rate_stats(&raw)
    }

    /// Fetch the most recent funding trades, newest first
    #[instrument(skip(self))]
    pub async fn get_recent_trades(&self, symbol: &str) -> Result<Vec<TradeUpdate>> {
        let raw = self
            .signed_request("GET", &trades_path(symbol), None)
            .await?;
        decode::decode_trade_history(&raw)
    }
}

#[async_trait]
impl FundingTransport for BitfinexRestClient {
    #[instrument(skip(self, body))]
    async fn signed_request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<Vec<u8>> {
        let body_str = body.map(|b| b.to_string()).unwrap_or_default();

        let headers = generate_auth_headers(
            &self.credentials.api_key,
            &self.credentials.api_secret,
            path,
            &body_str,
        )?;

        let method: reqwest::Method = method
            .parse()
            .map_err(|_| ClientError::Internal(format!("invalid HTTP method: {}", method)))?;

        let url = format!("{}/{}", self.base_url, path);
        debug!("Sending {} {}", method, url);

        let request = headers
            .apply_to_request(self.client.request(method, &url))
            .body(body_str);

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?.to_vec();

        if !status.is_success() {
            return Err(venue_error(status.as_u16(), &bytes));
        }

        Ok(bytes)
    }
}

/// Build a transport error from a non-2xx response.
///
/// Venue errors come back as `["error", CODE, MESSAGE]`; anything else falls
/// back to the raw body.
fn venue_error(status: u16, body: &[u8]) -> ClientError {
    if let Ok(Value::Array(fields)) = serde_json::from_slice::<Value>(body) {
        if fields.len() >= 3 {
            let code = fields
                .get(1)
                .and_then(|v| coerce::as_i64(v).map(|c| c.to_string()).or_else(|| coerce::as_str(v).map(String::from)));
            if let Some(message) = fields.get(2).and_then(coerce::as_str) {
                return ClientError::Transport {
                    status,
                    code,
                    message: message.to_string(),
                };
            }
        }
    }

    ClientError::Transport {
        status,
        code: None,
        message: String::from_utf8_lossy(body).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> ApiCredentials {
        ApiCredentials::new("key".to_string(), "secret".to_string())
    }

    #[test]
    fn test_client_creation() {
        let client = BitfinexRestClient::new("https://api.bitfinex.com", test_credentials());
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_normalization() {
        let client =
            BitfinexRestClient::new("https://api.bitfinex.com/", test_credentials()).unwrap();
        assert!(!client.base_url.ends_with('/'));
    }

    #[test]
    fn test_paths() {
        assert_eq!(book_path("fUSD"), "v2/book/fUSD/R0?len=100");
        assert_eq!(funding_stats_path("fUSD"), "v2/funding/stats/fUSD/hist");
        assert_eq!(trades_path("fUSD"), "v2/trades/fUSD/hist?limit=125&sort=-1");
    }

    #[test]
    fn test_venue_error_decoding() {
        let err = venue_error(500, br#"["error", 10100, "apikey: invalid"]"#);
        match err {
            ClientError::Transport {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 500);
                assert_eq!(code.as_deref(), Some("10100"));
                assert_eq!(message, "apikey: invalid");
            }
            other => panic!("expected Transport, got {:?}", other),
        }

        let fallback = venue_error(502, b"Bad Gateway");
        match fallback {
            ClientError::Transport { code, message, .. } => {
                assert!(code.is_none());
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected Transport, got {:?}", other),
        }
    }
}
