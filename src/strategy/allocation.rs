//! Allocation engine: the per-cycle decision state machine
//!
//! One cycle reads balances, splits the total between the fixed and
//! predictive legs, and turns each leg's remainder into an offer submission.
//! The engine owns all cycle state (settings plus the tracked predictive
//! orders) so a single cycle can be driven deterministically in tests; the
//! repeating loop with its sleep cadence lives in [`AllocationEngine::run`].

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use super::offers::{self, OfferTracker};
use super::selector;
use crate::bitfinex::decode;
use crate::bitfinex::messages::FundingOfferRequest;
use crate::bitfinex::rest::{book_path, funding_stats_path, WALLETS_PATH};
use crate::common::errors::{ClientError, Result};
use crate::common::traits::FundingTransport;
use crate::common::types::{OpenPredictiveOrder, WalletSnapshot};
use crate::config::types::StrategySettings;

/// Outcome of a single decision cycle, for logging and assertions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Total funding balance at the start of the cycle
    pub total: f64,
    /// Available balance at the start of the cycle
    pub available: f64,
    /// Amount submitted by the fixed leg, if any
    pub fixed_submitted: Option<f64>,
    /// Amount submitted by the predictive leg, if any
    pub predictive_submitted: Option<f64>,
}

/// Long-lived engine owning the cycle state for one funding symbol
pub struct AllocationEngine {
    settings: StrategySettings,
    /// Funding symbol offers are placed on (fUSD, ...)
    symbol: String,
    /// Wallet currency backing the symbol (USD, ...)
    currency: String,
    tracker: OfferTracker,
}

impl AllocationEngine {
    pub fn new(
        settings: StrategySettings,
        symbol: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            symbol: symbol.into(),
            currency: currency.into(),
            tracker: OfferTracker::new(),
        }
    }

    /// Predictive orders currently tracked by the engine
    pub fn tracked_orders(&self) -> &[OpenPredictiveOrder] {
        self.tracker.tracked()
    }

    /// Run decision cycles until the shutdown channel fires.
    ///
    /// A failed cycle is logged and the loop continues; the next cycle
    /// starts from a fresh wallet snapshot. Configuration errors are the
    /// exception: without a usable funding wallet there is no reasonable
    /// continuation, so the loop stops and surfaces the error to the caller.
    pub async fn run<T: FundingTransport + ?Sized>(
        &mut self,
        transport: &T,
        mut shutdown: mpsc::Receiver<()>,
    ) -> Result<()> {
        let interval = Duration::from_secs(self.settings.cycle_interval_secs);

        loop {
            match self.run_cycle(transport).await {
                Ok(report) => info!(?report, "decision cycle complete"),
                Err(e @ ClientError::Configuration(_)) => {
                    error!(error = %e, "unrecoverable configuration error, stopping");
                    return Err(e);
                }
                Err(e) => error!(error = %e, "decision cycle aborted"),
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.recv() => {
                    info!("shutdown requested, stopping allocation loop");
                    return Ok(());
                }
            }
        }
    }

    /// Execute one decision cycle.
    ///
    /// Failures reading balances, the book or the statistics feed abort the
    /// remaining steps and surface here; failures submitting or cancelling a
    /// specific offer are logged inside the legs and do not abort the cycle.
    #[instrument(skip(self, transport), fields(symbol = %self.symbol))]
    pub async fn run_cycle<T: FundingTransport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Result<CycleReport> {
        let wallet = self.fetch_wallet_snapshot(transport).await?;
        info!(
            currency = %wallet.currency,
            total = wallet.total,
            available = wallet.available,
            "funding wallet snapshot"
        );

        let target_fixed = wallet.total * self.settings.fix_ratio;
        let target_predictive = wallet.total * self.settings.predict_ratio;

        // Already-lent capital is apportioned proportionally across both
        // legs rather than tracked per leg. This is a known approximation
        // that can drift when one leg's loans mature before the other's.
        let already_lent = wallet.already_lent();
        let remaining_fixed = target_fixed - already_lent * self.settings.fix_ratio;
        let remaining_predictive = target_predictive - already_lent * self.settings.predict_ratio;

        info!(
            target_fixed,
            target_predictive, already_lent, remaining_fixed, remaining_predictive,
            "allocation targets"
        );

        let mut report = CycleReport {
            total: wallet.total,
            available: wallet.available,
            ..Default::default()
        };

        let mut available = wallet.available;
        self.run_fixed_leg(transport, remaining_fixed, &mut available, &mut report)
            .await?;
        self.run_predictive_leg(transport, remaining_predictive, &mut available, &mut report)
            .await?;

        Ok(report)
    }

    /// Read the funding wallet totals and available balances for the
    /// primary currency.
    async fn fetch_wallet_snapshot<T: FundingTransport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<WalletSnapshot> {
        let raw = transport.signed_request("POST", WALLETS_PATH, None).await?;
        let totals = decode::decode_wallet_totals(&raw)?;
        let total = totals.get(&self.currency).copied().unwrap_or(0.0);

        let raw = transport.signed_request("POST", WALLETS_PATH, None).await?;
        let available_map = decode::decode_available_funding(&raw)?;
        let available = available_map.get(&self.currency).copied().ok_or_else(|| {
            // cannot proceed without knowing available capital
            ClientError::Configuration(format!(
                "no funding wallet found for {}",
                self.currency
            ))
        })?;

        Ok(WalletSnapshot {
            currency: self.currency.clone(),
            total,
            available,
        })
    }

    /// Clamp a leg's remainder to the available balance and re-check the
    /// minimum order threshold. Returns `None` when the leg should skip.
    fn clamp_to_threshold(&self, leg: &str, mut remaining: f64, available: f64) -> Option<f64> {
        if remaining <= self.settings.min_order_amount {
            info!(leg, remaining, "below minimum order amount, skipping");
            return None;
        }
        if available < remaining {
            warn!(
                leg,
                available, remaining, "available balance is insufficient, clamping"
            );
            remaining = available;
        }
        if remaining <= self.settings.min_order_amount {
            info!(leg, remaining, "clamped amount below minimum, skipping");
            return None;
        }
        Some(remaining)
    }

    /// Fixed leg: lend at the best rate available at the shortest tenor.
    async fn run_fixed_leg<T: FundingTransport + ?Sized>(
        &mut self,
        transport: &T,
        remaining: f64,
        available: &mut f64,
        report: &mut CycleReport,
    ) -> Result<()> {
        let Some(amount) = self.clamp_to_threshold("fixed", remaining, *available) else {
            return Ok(());
        };

        let raw = transport
            .signed_request("GET", &book_path(&self.symbol), None)
            .await?;
        let book = decode::decode_book_offers(&raw)?;

        let best = match selector::best_rate_for_shortest_period(&book) {
            Ok(best) => best,
            Err(ClientError::NoOffersAvailable) => {
                warn!("no eligible book offers for the fixed leg");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        info!(
            offer_id = best.offer_id,
            rate = best.rate,
            period = best.period_days,
            amount,
            "submitting fixed lending offer"
        );

        let request = FundingOfferRequest::limit(&self.symbol, amount, best.rate, best.period_days);
        match offers::submit_offer(transport, request).await {
            Ok(result) => {
                info!(id = result.id, status = %result.status, "fixed lending offer accepted");
                report.fixed_submitted = Some(amount);
            }
            Err(e) => error!(error = %e, "failed to submit fixed lending offer"),
        }

        // the offer encumbers the balance whether or not the venue
        // confirmed in time; the next snapshot reconciles
        *available -= amount;

        Ok(())
    }

    /// Predictive leg: replace the tracked offer with one priced off the
    /// latest FRR sample.
    async fn run_predictive_leg<T: FundingTransport + ?Sized>(
        &mut self,
        transport: &T,
        remaining: f64,
        available: &mut f64,
        report: &mut CycleReport,
    ) -> Result<()> {
        let Some(amount) = self.clamp_to_threshold("predictive", remaining, *available) else {
            return Ok(());
        };

        let raw = transport
            .signed_request("GET", &funding_stats_path(&self.symbol), None)
            .await?;
        let stats = decode::decode_rate_stats(&raw)?;

        let Some(latest) = stats.first() else {
            warn!("no funding statistics available, skipping predictive leg");
            return Ok(());
        };

        // unconditional replace-on-cycle: the old offer goes regardless of
        // whether the newly computed rate differs
        self.tracker.cancel_all(transport).await;

        info!(
            frr = latest.frr,
            average_period = latest.average_period,
            funding_amount = latest.funding_amount,
            funding_amount_used = latest.funding_amount_used,
            "latest funding statistics"
        );

        let rate = selector::predictive_rate(latest, self.settings.frr_multiplier);
        let period = self.settings.predict_period_days;

        info!(rate, period, amount, "submitting predictive lending offer");

        let request = FundingOfferRequest::limit(&self.symbol, amount, rate, period);
        match offers::submit_offer(transport, request).await {
            Ok(result) => {
                info!(id = result.id, status = %result.status, "predictive lending offer accepted");
                self.tracker.track(OpenPredictiveOrder {
                    id: result.id,
                    rate: result.rate,
                    period_days: result.period,
                    since: result.created_at,
                });
                report.predictive_submitted = Some(amount);
            }
            Err(e) => error!(error = %e, "failed to submit predictive lending offer"),
        }

        // same reconcile-next-cycle rule as the fixed leg: the attempt
        // encumbers the working balance either way
        *available -= amount;

        Ok(())
    }
}
