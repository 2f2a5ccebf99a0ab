//! Decoders for the venue's positionally-encoded payloads
//!
//! Bitfinex v2 responses are JSON arrays of heterogeneous scalars at fixed
//! positions. Per-record decoding is deliberately lenient: a row shorter than
//! the minimum field count, or with a required field that fails coercion, is
//! dropped silently so schema drift in optional trailing fields never takes
//! the bot down. A payload that is not valid JSON, or not an array at the top
//! level, is a hard decode failure.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

use crate::common::coerce;
use crate::common::errors::{ClientError, Result};
use crate::common::types::{BookOffer, FundingOfferResult, RateStat, TradeUpdate};

/// Wallet type eligible for lending
const FUNDING_WALLET: &str = "funding";

fn parse_rows(raw: &[u8]) -> Result<Vec<Value>> {
    let payload: Value = serde_json::from_slice(raw)?;
    match payload {
        Value::Array(rows) => Ok(rows),
        other => Err(ClientError::Decode(format!(
            "expected a top-level array, got {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode_err(what: &str) -> ClientError {
    ClientError::Decode(what.to_string())
}

// ============================================================================
// Order book
// ============================================================================

/// Decode raw book rows `[OFFER_ID, PERIOD, RATE, AMOUNT, ...]`.
///
/// Input order is preserved; malformed rows are dropped.
pub fn decode_book_offers(raw: &[u8]) -> Result<Vec<BookOffer>> {
    let rows = parse_rows(raw)?;
    Ok(rows.iter().filter_map(book_offer_from_row).collect())
}

fn book_offer_from_row(row: &Value) -> Option<BookOffer> {
    let fields = row.as_array()?;
    if fields.len() < 4 {
        return None;
    }
    Some(BookOffer {
        offer_id: coerce::as_i64(&fields[0])?,
        period_days: coerce::as_u32(&fields[1])?,
        rate: coerce::as_f64(&fields[2])?,
        amount: coerce::as_f64(&fields[3])?,
    })
}

// ============================================================================
// Funding statistics
// ============================================================================

/// Decode funding statistics rows; position 0 is the most recent sample.
///
/// Row layout: `[MTS, _, _, FRR, AVG_PERIOD, _, _, AMOUNT, AMOUNT_USED, _, _,
/// BELOW_THRESHOLD, ...]`, minimum length 12.
pub fn decode_rate_stats(raw: &[u8]) -> Result<Vec<RateStat>> {
    let rows = parse_rows(raw)?;
    Ok(rows.iter().filter_map(rate_stat_from_row).collect())
}

fn rate_stat_from_row(row: &Value) -> Option<RateStat> {
    let fields = row.as_array()?;
    if fields.len() < 12 {
        return None;
    }
    Some(RateStat {
        timestamp_ms: coerce::as_i64(&fields[0])?,
        frr: coerce::as_f64(&fields[3])?,
        average_period: coerce::as_f64(&fields[4])?,
        funding_amount: coerce::as_f64(&fields[7])?,
        funding_amount_used: coerce::as_f64(&fields[8])?,
        funding_below_threshold: coerce::as_f64(&fields[11])?,
    })
}

// ============================================================================
// Wallets
// ============================================================================

/// Decode wallet rows into a currency -> available balance map, keeping only
/// funding wallets.
///
/// Row layout: `[WALLET_TYPE, CURRENCY, BALANCE, UNSETTLED_INTEREST,
/// AVAILABLE_BALANCE, ...]`, minimum length 5.
pub fn decode_available_funding(raw: &[u8]) -> Result<HashMap<String, f64>> {
    let rows = parse_rows(raw)?;
    let mut balances = HashMap::new();

    for row in &rows {
        let Some(fields) = row.as_array() else {
            continue;
        };
        if fields.len() < 5 {
            continue;
        }
        let (Some(wallet_type), Some(currency), Some(available)) = (
            coerce::as_str(&fields[0]),
            coerce::as_str(&fields[1]),
            coerce::as_f64(&fields[4]),
        ) else {
            continue;
        };
        if wallet_type == FUNDING_WALLET {
            balances.insert(currency.to_string(), available);
        }
    }

    Ok(balances)
}

/// Decode wallet rows into a currency -> total balance map (funding wallets
/// only). The total-only variant needs just the first three positions.
pub fn decode_wallet_totals(raw: &[u8]) -> Result<HashMap<String, f64>> {
    let rows = parse_rows(raw)?;
    let mut balances = HashMap::new();

    for row in &rows {
        let Some(fields) = row.as_array() else {
            continue;
        };
        if fields.len() < 3 {
            continue;
        }
        let (Some(wallet_type), Some(currency), Some(balance)) = (
            coerce::as_str(&fields[0]),
            coerce::as_str(&fields[1]),
            coerce::as_f64(&fields[2]),
        ) else {
            continue;
        };
        if wallet_type == FUNDING_WALLET {
            balances.insert(currency.to_string(), balance);
        }
    }

    Ok(balances)
}

// ============================================================================
// Offer submission / cancellation
// ============================================================================

/// Decode a funding offer submission notification.
///
/// The notification is a top-level array of at least 8 fields with the offer
/// payload at index 4, itself at least 20 fields long. Unlike row decoding
/// this is strict: a confirmed offer we cannot read is a hard failure.
pub fn decode_offer_result(raw: &[u8]) -> Result<FundingOfferResult> {
    let outer: Value = serde_json::from_slice(raw)?;
    let outer = outer
        .as_array()
        .filter(|fields| fields.len() >= 8)
        .ok_or_else(|| decode_err("offer notification too short"))?;

    let payload = outer[4]
        .as_array()
        .filter(|fields| fields.len() >= 20)
        .ok_or_else(|| decode_err("offer payload missing or too short"))?;

    Ok(FundingOfferResult {
        id: coerce::as_i64(&payload[0]).ok_or_else(|| decode_err("offer id missing"))?,
        symbol: coerce::as_str(&payload[1])
            .ok_or_else(|| decode_err("offer symbol missing"))?
            .to_string(),
        created_at: datetime_from_ms(&payload[2], "mts_create")?,
        updated_at: datetime_from_ms(&payload[3], "mts_update")?,
        amount: coerce::as_f64(&payload[4]).ok_or_else(|| decode_err("offer amount missing"))?,
        amount_original: coerce::as_f64(&payload[5])
            .ok_or_else(|| decode_err("offer original amount missing"))?,
        offer_type: coerce::as_str(&payload[6])
            .ok_or_else(|| decode_err("offer type missing"))?
            .to_string(),
        flags: coerce::as_i64(&payload[9]).unwrap_or(0),
        status: coerce::as_str(&payload[10])
            .ok_or_else(|| decode_err("offer status missing"))?
            .to_string(),
        rate: coerce::as_f64(&payload[14]).ok_or_else(|| decode_err("offer rate missing"))?,
        period: coerce::as_u32(&payload[15]).ok_or_else(|| decode_err("offer period missing"))?,
        notify: coerce::as_bool(&payload[16]).unwrap_or(false),
        hidden: coerce::as_i64(&payload[17]).unwrap_or(0),
        renew: coerce::as_bool(&payload[19]).unwrap_or(false),
    })
}

fn datetime_from_ms(value: &Value, what: &str) -> Result<DateTime<Utc>> {
    let ms = coerce::as_i64(value).ok_or_else(|| decode_err(&format!("{what} missing")))?;
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| ClientError::Decode(format!("{what} out of range: {ms}")))
}

/// Check a cancel acknowledgement for the fixed "SUCCESS" status marker at
/// index 6; any other value is a failure carrying the message at index 7.
pub fn decode_cancel_ack(raw: &[u8]) -> Result<()> {
    let outer: Value = serde_json::from_slice(raw)?;
    let fields = outer
        .as_array()
        .ok_or_else(|| decode_err("cancel acknowledgement is not an array"))?;

    if fields.len() >= 7 {
        match coerce::as_str(&fields[6]) {
            Some("SUCCESS") => {}
            _ => {
                let message = fields
                    .get(7)
                    .and_then(coerce::as_str)
                    .unwrap_or("unknown cancellation failure");
                return Err(ClientError::Rejected(message.to_string()));
            }
        }
    }

    Ok(())
}

// ============================================================================
// Trades
// ============================================================================

/// Decode historical funding trade rows `[ID, MTS, AMOUNT, RATE, PERIOD]`.
pub fn decode_trade_history(raw: &[u8]) -> Result<Vec<TradeUpdate>> {
    let rows = parse_rows(raw)?;
    Ok(rows.iter().filter_map(trade_from_row).collect())
}

fn trade_from_row(row: &Value) -> Option<TradeUpdate> {
    let fields = row.as_array()?;
    if fields.len() < 5 {
        return None;
    }
    Some(TradeUpdate {
        id: coerce::as_i64(&fields[0])?,
        timestamp_ms: coerce::as_i64(&fields[1])?,
        amount: coerce::as_f64(&fields[2])?,
        rate: coerce::as_f64(&fields[3])?,
        period: coerce::as_u32(&fields[4])?,
    })
}

/// Extract a trade execution from a WebSocket channel frame.
///
/// Trade executions arrive as `[CHANNEL_ID, "te", [ID, MTS, AMOUNT, RATE,
/// PERIOD]]`; every other frame (heartbeats, snapshots, "tu" updates) yields
/// `None`.
pub fn decode_trade_frame(frame: &Value) -> Option<TradeUpdate> {
    let fields = frame.as_array()?;
    if fields.len() < 3 || fields[1].as_str() != Some("te") {
        return None;
    }
    trade_from_row(&fields[2])
}
