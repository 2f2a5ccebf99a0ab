//! LendingBot Library
//!
//! A Rust library for allocating an idle funding-wallet balance between a
//! fixed-rate lending strategy and an FRR-tracking predictive strategy on
//! the Bitfinex funding market.

pub mod bitfinex;
pub mod common;
pub mod config;
pub mod strategy;

// Re-export commonly used types
pub use bitfinex::messages::{CancelOfferRequest, FundingOfferRequest};
pub use bitfinex::rest::BitfinexRestClient;
pub use bitfinex::websocket::TradeStream;
pub use common::errors::{ClientError, Result};
pub use common::traits::FundingTransport;
pub use common::types::{
    BookOffer, FundingOfferResult, OpenPredictiveOrder, RateStat, TradeUpdate, WalletSnapshot,
};
pub use config::types::AppConfig;

// Strategy types
pub use strategy::{
    best_rate_for_shortest_period, best_rate_meeting_min_period, predictive_rate,
    AllocationEngine, CycleReport, OfferTracker,
};
