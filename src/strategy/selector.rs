//! Pure rate-selection algorithms over decoded book and statistics records
//!
//! Only entries with a negative signed amount are eligible: that sign marks
//! posted lending supply, and the counter-rate on supply is what a new lender
//! has to beat.

use crate::common::errors::{ClientError, Result};
use crate::common::types::{BookOffer, RateStat};

/// Select the highest-rate offer at the shortest available tenor.
///
/// Used by the fixed leg: minimizes capital lock-up while taking the best
/// rate obtainable at that minimal tenor. Ties on rate keep the first entry
/// in input order.
pub fn best_rate_for_shortest_period(offers: &[BookOffer]) -> Result<BookOffer> {
    let eligible: Vec<&BookOffer> = offers.iter().filter(|o| o.amount < 0.0).collect();

    let shortest = match eligible.iter().map(|o| o.period_days).min() {
        Some(period) => period,
        None => return Err(ClientError::NoOffersAvailable),
    };

    let mut best: Option<&BookOffer> = None;
    for offer in eligible.iter().copied().filter(|o| o.period_days == shortest) {
        // strict comparison keeps the first encountered on rate ties
        if best.map_or(true, |b| offer.rate > b.rate) {
            best = Some(offer);
        }
    }

    best.cloned().ok_or(ClientError::NoOffersAvailable)
}

/// Select the highest-rate offer with a tenor of at least `min_period` days.
///
/// Ties on rate prefer the shorter tenor. The returned amount is the absolute
/// value: the sign was only a supply/demand discriminator and downstream
/// wants the magnitude of available capacity.
pub fn best_rate_meeting_min_period(offers: &[BookOffer], min_period: u32) -> Result<BookOffer> {
    let mut best: Option<BookOffer> = None;

    for offer in offers
        .iter()
        .filter(|o| o.amount < 0.0 && o.period_days >= min_period)
    {
        let candidate = BookOffer {
            amount: offer.amount.abs(),
            ..offer.clone()
        };
        let replace = match &best {
            None => true,
            Some(current) => {
                candidate.rate > current.rate
                    || (candidate.rate == current.rate
                        && candidate.period_days < current.period_days)
            }
        };
        if replace {
            best = Some(candidate);
        }
    }

    best.ok_or(ClientError::NoOffersAvailable)
}

/// Compute the predictive offer rate from the most recent statistics sample.
///
/// A plain multiple of the Flash Return Rate; a single noisy sample directly
/// drives the next offer's rate, with no historical smoothing.
pub fn predictive_rate(stat: &RateStat, multiplier: f64) -> f64 {
    stat.frr * multiplier
}
