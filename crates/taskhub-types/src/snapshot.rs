//! Market snapshots
//!
//! A [`MarketSnapshot`] is the point-in-time view of competition on one
//! task, handed to bidding strategies. It is a plain value, not a live
//! subscription; a bid submitted after the snapshot was taken is simply not
//! in it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Observed bidding conditions on a single task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Mean bid price (zero when no bids)
    pub avg_price: Decimal,
    /// Lowest bid price (zero when no bids)
    pub min_price: Decimal,
    /// Highest bid price (zero when no bids)
    pub max_price: Decimal,
    /// Number of bids observed
    pub total_bids: usize,
    /// Task complexity on [0, 1], derived from expected cost units
    pub task_complexity: Decimal,
}

impl MarketSnapshot {
    /// Snapshot of a task nobody has bid on yet.
    pub fn empty(task_complexity: Decimal) -> Self {
        Self {
            avg_price: Decimal::ZERO,
            min_price: Decimal::ZERO,
            max_price: Decimal::ZERO,
            total_bids: 0,
            task_complexity,
        }
    }
}
