use serde::{Deserialize, Serialize};

use crate::price::Price;

pub type OrderId = String;
pub type ClientId = String;
pub type Symbol = String;

/// Owner tag used for infrastructure orders that have no agent account.
pub const SEEDER: &str = "seeder";
/// Owner tag used for the per-tick fundamental-drift orders.
pub const FUND: &str = "fund";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

/// An order is immutable after creation except for `remaining_quantity`
/// (decremented by fills) and `sequence` (assigned once, on admission to a
/// book — `0` until then).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub client_id: ClientId,
    pub symbol: Symbol,
    pub side: Side,
    /// Ignored when `order_type == Market`.
    pub price: Option<Price>,
    pub quantity: u64,
    pub remaining_quantity: u64,
    pub order_type: OrderType,
    pub sequence: u64,
}

impl Order {
    pub fn new_limit(
        order_id: impl Into<OrderId>,
        client_id: impl Into<ClientId>,
        symbol: impl Into<Symbol>,
        side: Side,
        price: Price,
        quantity: u64,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            client_id: client_id.into(),
            symbol: symbol.into(),
            side,
            price: Some(price),
            quantity,
            remaining_quantity: quantity,
            order_type: OrderType::Limit,
            sequence: 0,
        }
    }

    pub fn new_market(
        order_id: impl Into<OrderId>,
        client_id: impl Into<ClientId>,
        symbol: impl Into<Symbol>,
        side: Side,
        quantity: u64,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            client_id: client_id.into(),
            symbol: symbol.into(),
            side,
            price: None,
            quantity,
            remaining_quantity: quantity,
            order_type: OrderType::Market,
            sequence: 0,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }
}
