//! Lending strategy: rate selection, offer lifecycle and the allocation
//! engine
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  DECISION CYCLE (sequential)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  fetch wallet snapshot                                      │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  split total × {fix_ratio, predict_ratio}                   │
//! │       │                                                     │
//! │       ├── fixed leg ──── book ──▶ shortest period,          │
//! │       │                          highest rate ──▶ submit    │
//! │       │                                                     │
//! │       └── predictive leg ─ stats ─▶ cancel tracked,         │
//! │                                     FRR × multiplier        │
//! │                                     ──▶ submit + track      │
//! │       ▼                                                     │
//! │  sleep cycle_interval, repeat                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`selector`]: pure rate-selection algorithms over decoded records
//! - [`OfferTracker`]: submission, cancellation and tracking of open
//!   predictive orders
//! - [`AllocationEngine`]: the per-cycle state machine and the repeating
//!   loop driving it

pub mod allocation;
pub mod offers;
pub mod selector;

pub use allocation::{AllocationEngine, CycleReport};
pub use offers::{cancel_offer, submit_offer, OfferTracker};
pub use selector::{best_rate_for_shortest_period, best_rate_meeting_min_period, predictive_rate};
