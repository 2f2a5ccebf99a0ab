//! Domain types shared across the decoder, selectors and the allocation engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Funding wallet balances for a single currency, taken fresh each cycle.
///
/// `available` is the unencumbered portion of `total`; the difference is
/// capital currently deployed in open offers or matched loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Currency code (e.g. "USD")
    pub currency: String,
    /// Total funding wallet balance
    pub total: f64,
    /// Available (unlent) balance; never exceeds `total`
    pub available: f64,
}

impl WalletSnapshot {
    /// Capital already deployed into the funding market.
    pub fn already_lent(&self) -> f64 {
        self.total - self.available
    }
}

/// A single entry from the raw funding order book.
///
/// The venue encodes supply/demand in the sign of `amount`: negative entries
/// are posted lending supply (ask offers), positive entries are borrow
/// requests. Selection algorithms only consider negative amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookOffer {
    /// Venue-assigned offer id
    pub offer_id: i64,
    /// Tenor in days
    pub period_days: u32,
    /// Daily rate as a decimal fraction
    pub rate: f64,
    /// Signed amount; negative = lending supply
    pub amount: f64,
}

/// One historical funding statistics sample; position 0 is the most recent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateStat {
    /// Sample timestamp in milliseconds
    pub timestamp_ms: i64,
    /// Flash Return Rate, the venue's reference lending rate
    pub frr: f64,
    /// Average tenor of recent loans in days
    pub average_period: f64,
    /// Total funding outstanding
    pub funding_amount: f64,
    /// Funding currently in use
    pub funding_amount_used: f64,
    /// Funding posted below the reference threshold
    pub funding_below_threshold: f64,
}

/// A funding offer as confirmed by the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingOfferResult {
    pub id: i64,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Remaining amount
    pub amount: f64,
    /// Amount at submission time
    pub amount_original: f64,
    /// Offer type (LIMIT, FRRDELTAVAR, FRRDELTAFIX)
    pub offer_type: String,
    pub flags: i64,
    pub status: String,
    pub rate: f64,
    pub period: u32,
    pub notify: bool,
    pub hidden: i64,
    pub renew: bool,
}

/// The engine's own record of an outstanding predictive offer.
///
/// Lives only in process memory, owned exclusively by the allocation engine's
/// cycle state; created on successful submission and removed when the order
/// is cancelled on the next cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPredictiveOrder {
    pub id: i64,
    pub rate: f64,
    pub period_days: u32,
    pub since: DateTime<Utc>,
}

/// A funding trade execution from the public trades feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeUpdate {
    pub id: i64,
    pub timestamp_ms: i64,
    pub amount: f64,
    /// Daily rate the loan was matched at
    pub rate: f64,
    /// Tenor in days
    pub period: u32,
}
