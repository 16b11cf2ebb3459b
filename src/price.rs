use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of ticks per unit of quoted price. Four decimal places is enough
/// headroom for the fractional cents agents in this simulation quote
/// (spreads, fees, and fundamental drift are all sub-cent).
const TICKS_PER_UNIT: f64 = 10_000.0;

/// A price expressed as a fixed-point integer number of ticks.
///
/// Prices in this simulation are never parsed from untrusted input, only
/// constructed arithmetically (drift, spreads, fees), so rounding to the
/// nearest tick on construction and comparing ticks exactly afterwards gives
/// the bit-exact, reproducible ordering the matching engine's invariants
/// require — a plain `f64` would need an epsilon-based `Ord` impl instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(i64);

impl Price {
    /// Sentinel returned for `best_bid`/`best_ask` on an empty side.
    pub const ZERO: Price = Price(0);

    pub fn from_f64(value: f64) -> Self {
        Price((value * TICKS_PER_UNIT).round() as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / TICKS_PER_UNIT
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn mid(bid: Price, ask: Price) -> f64 {
        (bid.to_f64() + ask.to_f64()) / 2.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}
