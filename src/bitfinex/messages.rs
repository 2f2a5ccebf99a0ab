//! Bitfinex-specific wire message types

use serde::{Deserialize, Serialize};

use crate::common::errors::{ClientError, Result};

/// Default offer type when none is specified
pub const OFFER_TYPE_LIMIT: &str = "LIMIT";

/// Minimum tenor accepted by the venue, in days
pub const MIN_PERIOD_DAYS: u32 = 2;
/// Maximum tenor accepted by the venue, in days
pub const MAX_PERIOD_DAYS: u32 = 120;

/// An outgoing funding offer submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingOfferRequest {
    /// Order type (LIMIT, FRRDELTAVAR, FRRDELTAFIX)
    #[serde(rename = "type")]
    pub offer_type: String,
    /// Funding symbol (fUSD, fBTC, ...)
    pub symbol: String,
    /// Amount as a decimal string; positive for an offer, negative for a bid
    pub amount: String,
    /// Daily rate as a decimal string
    pub rate: String,
    /// Tenor in days (2-120)
    pub period: u32,
    /// Optional venue flags
    pub flags: i64,
}

impl FundingOfferRequest {
    /// Build a limit lending offer, formatting amount and rate the way the
    /// venue expects (two and six decimal places respectively).
    pub fn limit(symbol: impl Into<String>, amount: f64, rate: f64, period: u32) -> Self {
        Self {
            offer_type: OFFER_TYPE_LIMIT.to_string(),
            symbol: symbol.into(),
            amount: format!("{:.2}", amount),
            rate: format!("{:.6}", rate),
            period,
            flags: 0,
        }
    }

    /// Validate the request before it touches the network.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.is_empty() {
            return Err(ClientError::Validation("symbol cannot be empty".to_string()));
        }
        if self.amount.is_empty() {
            return Err(ClientError::Validation("amount cannot be empty".to_string()));
        }
        if self.rate.is_empty() {
            return Err(ClientError::Validation("rate cannot be empty".to_string()));
        }
        if self.period < MIN_PERIOD_DAYS || self.period > MAX_PERIOD_DAYS {
            return Err(ClientError::Validation(format!(
                "period must be between {} and {} days, got {}",
                MIN_PERIOD_DAYS, MAX_PERIOD_DAYS, self.period
            )));
        }
        Ok(())
    }
}

/// An outgoing funding offer cancellation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOfferRequest {
    /// Id of the offer to cancel
    pub id: i64,
}

/// Subscription message for the public WebSocket feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsSubscribeMessage {
    pub event: String,
    pub channel: String,
    pub symbol: String,
}

impl WsSubscribeMessage {
    /// Subscribe to the trades channel for a funding symbol
    pub fn trades(symbol: impl Into<String>) -> Self {
        Self {
            event: "subscribe".to_string(),
            channel: "trades".to_string(),
            symbol: symbol.into(),
        }
    }
}
