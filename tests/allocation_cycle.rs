//! Integration tests driving full decision cycles against a scripted
//! transport, without the network or the timer loop.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

use lending_bot::bitfinex::rest::{
    book_path, funding_stats_path, OFFER_CANCEL_PATH, OFFER_SUBMIT_PATH, WALLETS_PATH,
};
use lending_bot::common::errors::{ClientError, Result};
use lending_bot::config::types::StrategySettings;
use lending_bot::{AllocationEngine, FundingTransport};

/// Scripted venue: canned payloads per path, plus a call log.
struct MockVenue {
    wallets: Value,
    book: Value,
    stats: Value,
    fail_wallets: bool,
    fail_submits: bool,
    fail_cancel_ids: Vec<i64>,
    next_offer_id: AtomicI64,
    calls: Mutex<Vec<(String, Option<Value>)>>,
}

impl MockVenue {
    fn new(wallets: Value, book: Value, stats: Value) -> Self {
        Self {
            wallets,
            book,
            stats,
            fail_wallets: false,
            fail_submits: false,
            fail_cancel_ids: Vec::new(),
            next_offer_id: AtomicI64::new(1001),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn paths(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn submitted_bodies(&self) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path == OFFER_SUBMIT_PATH)
            .filter_map(|(_, body)| body.clone())
            .collect()
    }

    /// Echo the submitted offer back as a confirmation notification
    fn confirm(&self, body: &Value) -> Value {
        let id = self.next_offer_id.fetch_add(1, Ordering::SeqCst);
        let amount: f64 = body["amount"].as_str().unwrap_or("0").parse().unwrap();
        let rate: f64 = body["rate"].as_str().unwrap_or("0").parse().unwrap();
        let period = body["period"].as_i64().unwrap_or(2);
        json!([
            0, "fon-req", null, null,
            [
                id, body["symbol"], 1700000000000i64, 1700000000000i64, amount, amount,
                "LIMIT", null, null, 0, "ACTIVE", null, null, null, rate, period,
                false, 0, null, false
            ],
            null, "SUCCESS", "Submitting funding offer"
        ])
    }
}

#[async_trait]
impl FundingTransport for MockVenue {
    async fn signed_request(
        &self,
        _method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));

        if path == WALLETS_PATH {
            if self.fail_wallets {
                return Err(ClientError::Transport {
                    status: 500,
                    code: None,
                    message: "venue unavailable".to_string(),
                });
            }
            return Ok(self.wallets.to_string().into_bytes());
        }
        if path == book_path("fUSD") {
            return Ok(self.book.to_string().into_bytes());
        }
        if path == funding_stats_path("fUSD") {
            return Ok(self.stats.to_string().into_bytes());
        }
        if path == OFFER_SUBMIT_PATH {
            if self.fail_submits {
                return Err(ClientError::Rejected("amount: invalid".to_string()));
            }
            let body = body.expect("submit requires a body");
            return Ok(self.confirm(&body).to_string().into_bytes());
        }
        if path == OFFER_CANCEL_PATH {
            let id = body
                .as_ref()
                .and_then(|b| b["id"].as_i64())
                .unwrap_or_default();
            let ack = if self.fail_cancel_ids.contains(&id) {
                json!([0, "foc-req", null, null, null, null, "ERROR", "Offer not found"])
            } else {
                json!([0, "foc-req", null, null, null, null, "SUCCESS", "Offer cancelled"])
            };
            return Ok(ack.to_string().into_bytes());
        }

        panic!("unexpected request to {}", path);
    }
}

fn wallets(total: f64, available: f64) -> Value {
    json!([
        ["exchange", "USD", 42.0, 0, 42.0],
        ["funding", "USD", total, 0, available]
    ])
}

fn book() -> Value {
    json!([
        [1, 30, 0.0009, -100.0],
        [2, 2, 0.0002, -500.0],
        [3, 2, 0.0003, -200.0],
        [4, 5, 0.0008, 50.0]
    ])
}

fn stats(frr: f64) -> Value {
    json!([[1700000000000i64, 0, 0, frr, 30.0, 0, 0, 2.5e9, 1.9e9, 0, 0, 1.0e7]])
}

fn engine(settings: StrategySettings) -> AllocationEngine {
    AllocationEngine::new(settings, "fUSD", "USD")
}

#[test_log::test(tokio::test)]
async fn test_full_cycle_splits_and_submits_both_legs() {
    let venue = MockVenue::new(wallets(1000.0, 1000.0), book(), stats(0.0002));
    let mut engine = engine(StrategySettings::default());

    let report = engine.run_cycle(&venue).await.unwrap();

    assert_eq!(report.total, 1000.0);
    assert_eq!(report.fixed_submitted, Some(500.0));
    assert_eq!(report.predictive_submitted, Some(500.0));

    let submits = venue.submitted_bodies();
    assert_eq!(submits.len(), 2);

    // fixed leg takes the best rate at the shortest tenor (offer 3)
    assert_eq!(submits[0]["amount"], "500.00");
    assert_eq!(submits[0]["rate"], "0.000300");
    assert_eq!(submits[0]["period"], 2);

    // predictive leg prices off FRR x multiplier at the fixed tenor
    assert_eq!(submits[1]["amount"], "500.00");
    assert_eq!(submits[1]["rate"], "0.000260");
    assert_eq!(submits[1]["period"], 2);

    // the new predictive offer is tracked for replacement next cycle
    assert_eq!(engine.tracked_orders().len(), 1);
    assert_eq!(engine.tracked_orders()[0].id, 1002);
}

#[test_log::test(tokio::test)]
async fn test_remainders_below_threshold_skip_both_legs() {
    // 280 split 50/50 leaves 140 per leg, below the 150 minimum
    let venue = MockVenue::new(wallets(280.0, 280.0), book(), stats(0.0002));
    let mut engine = engine(StrategySettings::default());

    let report = engine.run_cycle(&venue).await.unwrap();

    assert_eq!(report.fixed_submitted, None);
    assert_eq!(report.predictive_submitted, None);
    assert!(engine.tracked_orders().is_empty());

    // two wallet reads and nothing else
    assert_eq!(
        venue.paths(),
        vec![WALLETS_PATH.to_string(), WALLETS_PATH.to_string()]
    );
}

#[test_log::test(tokio::test)]
async fn test_insufficient_available_clamps_then_skips() {
    // Ratios summing past 1.0 are never validated; this configuration makes
    // the fixed leg drain available below what the predictive leg wants.
    let settings = StrategySettings {
        fix_ratio: 0.7,
        predict_ratio: 0.7,
        ..Default::default()
    };
    let venue = MockVenue::new(wallets(1000.0, 300.0), book(), stats(0.0002));
    let mut engine = engine(settings);

    let report = engine.run_cycle(&venue).await.unwrap();

    // remaining per leg = 700 - 700 * 0.7 = 210; fixed submits it and
    // leaves 90 available, which clamps the predictive leg below minimum
    assert!((report.fixed_submitted.unwrap() - 210.0).abs() < 1e-9);
    assert_eq!(report.predictive_submitted, None);

    let submits = venue.submitted_bodies();
    assert_eq!(submits.len(), 1);
    assert_eq!(submits[0]["amount"], "210.00");
}

#[test_log::test(tokio::test)]
async fn test_predictive_offer_is_replaced_each_cycle() {
    let venue = MockVenue::new(wallets(1000.0, 1000.0), book(), stats(0.0002));
    let mut engine = engine(StrategySettings::default());

    engine.run_cycle(&venue).await.unwrap();
    let first_id = engine.tracked_orders()[0].id;

    engine.run_cycle(&venue).await.unwrap();

    // the second cycle cancelled the first order before submitting anew,
    // even though the computed rate did not change
    let cancels: Vec<i64> = venue
        .calls
        .lock()
        .unwrap()
        .iter()
        .filter(|(path, _)| path == OFFER_CANCEL_PATH)
        .filter_map(|(_, body)| body.as_ref().and_then(|b| b["id"].as_i64()))
        .collect();
    assert_eq!(cancels, vec![first_id]);

    assert_eq!(engine.tracked_orders().len(), 1);
    assert_ne!(engine.tracked_orders()[0].id, first_id);
}

#[test_log::test(tokio::test)]
async fn test_failed_cancel_still_clears_and_resubmits() {
    let mut venue = MockVenue::new(wallets(1000.0, 1000.0), book(), stats(0.0002));
    let mut engine = engine(StrategySettings::default());

    engine.run_cycle(&venue).await.unwrap();
    let first_id = engine.tracked_orders()[0].id;

    // make the cancel of the tracked order fail on the next cycle
    venue.fail_cancel_ids = vec![first_id];
    engine.run_cycle(&venue).await.unwrap();

    // the stuck order is dropped from tracking anyway and a replacement
    // was submitted; reconciliation happens via the next wallet snapshot
    assert_eq!(engine.tracked_orders().len(), 1);
    assert_ne!(engine.tracked_orders()[0].id, first_id);
}

#[test_log::test(tokio::test)]
async fn test_missing_funding_wallet_is_fatal() {
    let venue = MockVenue::new(
        json!([["exchange", "USD", 1000.0, 0, 1000.0]]),
        book(),
        stats(0.0002),
    );
    let mut engine = engine(StrategySettings::default());

    let result = engine.run_cycle(&venue).await;
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[test_log::test(tokio::test)]
async fn test_run_terminates_on_missing_funding_wallet() {
    let venue = MockVenue::new(
        json!([["exchange", "USD", 1000.0, 0, 1000.0]]),
        book(),
        stats(0.0002),
    );
    let mut engine = engine(StrategySettings::default());

    // keep the sender alive: the loop must stop on its own, not via shutdown
    let (_shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine.run(&venue, shutdown_rx),
    )
    .await
    .expect("run must terminate without a shutdown signal");

    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[test_log::test(tokio::test)]
async fn test_rejected_submissions_do_not_abort_the_cycle() {
    let settings = StrategySettings {
        fix_ratio: 0.5,
        predict_ratio: 0.7,
        ..Default::default()
    };
    let mut venue = MockVenue::new(wallets(1000.0, 1000.0), book(), stats(0.0002));
    venue.fail_submits = true;
    let mut engine = engine(settings);

    let report = engine.run_cycle(&venue).await.unwrap();

    // both legs attempted their submission despite the first rejection
    let submits = venue.submitted_bodies();
    assert_eq!(submits.len(), 2);
    assert_eq!(report.fixed_submitted, None);
    assert_eq!(report.predictive_submitted, None);
    assert!(engine.tracked_orders().is_empty());

    // the fixed leg's failed attempt still encumbers the working balance,
    // so the predictive leg's 700 remainder is clamped to the 500 left
    assert_eq!(submits[0]["amount"], "500.00");
    assert_eq!(submits[1]["amount"], "500.00");
}

#[test_log::test(tokio::test)]
async fn test_transport_failure_aborts_the_cycle() {
    let mut venue = MockVenue::new(wallets(1000.0, 1000.0), book(), stats(0.0002));
    venue.fail_wallets = true;
    let mut engine = engine(StrategySettings::default());

    let result = engine.run_cycle(&venue).await;
    assert!(matches!(result, Err(ClientError::Transport { .. })));
    assert!(venue.submitted_bodies().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_empty_statistics_skip_predictive_leg_only() {
    let venue = MockVenue::new(wallets(1000.0, 1000.0), book(), json!([]));
    let mut engine = engine(StrategySettings::default());

    let report = engine.run_cycle(&venue).await.unwrap();

    assert_eq!(report.fixed_submitted, Some(500.0));
    assert_eq!(report.predictive_submitted, None);
    assert!(engine.tracked_orders().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_allocation_identity_when_ratios_sum_to_one() {
    // remaining_fixed + remaining_predictive == total - already_lent
    let venue = MockVenue::new(wallets(1000.0, 400.0), book(), stats(0.0002));
    let mut engine = engine(StrategySettings::default());

    let report = engine.run_cycle(&venue).await.unwrap();

    // already_lent = 600, so each leg has 500 - 300 = 200 remaining and
    // the two submissions together equal total - already_lent = 400
    let submitted = report.fixed_submitted.unwrap() + report.predictive_submitted.unwrap();
    assert_eq!(submitted, 400.0);
}
