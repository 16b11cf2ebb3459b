use serde::{Deserialize, Serialize};

use crate::orders::{OrderId, Symbol};
use crate::price::Price;

/// A trade represents a matched transaction between two orders.
///
/// The price is always the resting (maker) order's price; the aggressor
/// (taker) is whichever side submitted last. Trades are never mutated after
/// emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: u64,
}
