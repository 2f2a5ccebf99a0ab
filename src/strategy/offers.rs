//! Offer lifecycle: submission, cancellation and tracking of open
//! predictive orders

use serde_json::to_value;
use tracing::{info, warn};

use crate::bitfinex::decode;
use crate::bitfinex::messages::{CancelOfferRequest, FundingOfferRequest, OFFER_TYPE_LIMIT};
use crate::bitfinex::rest::{OFFER_CANCEL_PATH, OFFER_SUBMIT_PATH};
use crate::common::errors::Result;
use crate::common::traits::FundingTransport;
use crate::common::types::{FundingOfferResult, OpenPredictiveOrder};

/// Validate and submit a funding offer.
///
/// Validation fails fast, before any network call. An unspecified offer type
/// defaults to LIMIT. Success requires the venue response to decode into a
/// confirmed offer with a populated id.
pub async fn submit_offer<T: FundingTransport + ?Sized>(
    transport: &T,
    mut request: FundingOfferRequest,
) -> Result<FundingOfferResult> {
    if request.offer_type.is_empty() {
        request.offer_type = OFFER_TYPE_LIMIT.to_string();
    }
    request.validate()?;

    let body = to_value(&request)?;
    let raw = transport
        .signed_request("POST", OFFER_SUBMIT_PATH, Some(body))
        .await?;

    decode::decode_offer_result(&raw)
}

/// Cancel a single funding offer by id.
pub async fn cancel_offer<T: FundingTransport + ?Sized>(transport: &T, id: i64) -> Result<()> {
    let body = to_value(&CancelOfferRequest { id })?;
    let raw = transport
        .signed_request("POST", OFFER_CANCEL_PATH, Some(body))
        .await?;

    decode::decode_cancel_ack(&raw)
}

/// The engine's record of outstanding predictive offers.
///
/// Owned exclusively by the allocation engine's cycle state; cycles are
/// strictly sequential so no synchronization is needed.
#[derive(Debug, Default)]
pub struct OfferTracker {
    tracked: Vec<OpenPredictiveOrder>,
}

impl OfferTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently tracked predictive orders
    pub fn tracked(&self) -> &[OpenPredictiveOrder] {
        &self.tracked
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Record a newly confirmed predictive order
    pub fn track(&mut self, order: OpenPredictiveOrder) {
        self.tracked.push(order);
    }

    /// Attempt to cancel every tracked order, then clear the set.
    ///
    /// Individual failures are logged and skipped so one stuck cancel does
    /// not block the rest. The set is cleared regardless of outcomes: the
    /// next cycle reconciles against a fresh wallet snapshot instead of
    /// tracking per-order acknowledgments.
    pub async fn cancel_all<T: FundingTransport + ?Sized>(&mut self, transport: &T) {
        for order in &self.tracked {
            match cancel_offer(transport, order.id).await {
                Ok(()) => {
                    info!(order_id = order.id, "cancelled predictive offer");
                }
                Err(e) => {
                    warn!(
                        order_id = order.id,
                        error = %e,
                        "failed to cancel predictive offer, skipping"
                    );
                }
            }
        }
        self.tracked.clear();
    }
}
