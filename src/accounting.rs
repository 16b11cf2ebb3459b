//! Per-agent P&L, inventory, and NAV, derived from emitted trades.

use std::collections::HashMap;

use serde::Serialize;

use crate::orders::{ClientId, OrderId, Symbol};
use crate::trade::Trade;

/// One agent's running book. Infrastructure owners (`"seeder"`, `"fund"`)
/// never get one of these — trades against them only move the agent side.
#[derive(Debug, Clone, Serialize)]
pub struct AgentAccount {
    pub client_id: ClientId,
    pub symbol: Symbol,
    pub pnl: f64,
    pub inventory: i64,
    pub trade_count: u64,
}

impl AgentAccount {
    pub fn new(client_id: impl Into<ClientId>, symbol: impl Into<Symbol>) -> Self {
        Self {
            client_id: client_id.into(),
            symbol: symbol.into(),
            pnl: 0.0,
            inventory: 0,
            trade_count: 0,
        }
    }

    pub fn nav(&self, mid: f64) -> f64 {
        self.pnl + self.inventory as f64 * mid
    }
}

/// Applies one trade's accounting to the buy- and sell-side agents, looked up
/// by `order_map`. Orders owned by an id absent from `accounts` (the
/// infrastructure tags, or any order whose owner's account was never
/// registered) are silently skipped on that side.
pub fn apply_trade(
    trade: &Trade,
    order_map: &HashMap<OrderId, ClientId>,
    accounts: &mut HashMap<ClientId, AgentAccount>,
    fee_per_share: f64,
) {
    let notional = trade.quantity as f64 * trade.price.to_f64();
    let fee = fee_per_share * trade.quantity as f64;

    if let Some(buyer_id) = order_map.get(&trade.buy_order_id) {
        if let Some(buyer) = accounts.get_mut(buyer_id) {
            buyer.pnl -= notional + fee;
            buyer.inventory += trade.quantity as i64;
            buyer.trade_count += 1;
        }
    }
    if let Some(seller_id) = order_map.get(&trade.sell_order_id) {
        if let Some(seller) = accounts.get_mut(seller_id) {
            seller.pnl += notional - fee;
            seller.inventory -= trade.quantity as i64;
            seller.trade_count += 1;
        }
    }
}
