//! Keyed façade over a collection of [`OrderBook`]s, one per symbol.

use std::collections::HashMap;

use tracing::info;

use crate::errors::EngineError;
use crate::orderbook::OrderBook;
use crate::orders::{Order, Side, Symbol};
use crate::price::Price;
use crate::trade::Trade;

/// Owns one [`OrderBook`] per registered symbol and batches trade emission.
///
/// Matching happens eagerly inside [`BookManager::place_order`] (so a
/// placement's `insufficient_liquidity` signal is visible to the caller
/// immediately), but the resulting [`Trade`]s are buffered here rather than
/// returned directly: the contract to agents is that **all** trades for a
/// tick are observable only after [`BookManager::process_orders`] returns.
pub struct BookManager {
    books: HashMap<Symbol, OrderBook>,
    pending_trades: Vec<Trade>,
}

impl BookManager {
    pub fn new() -> Self {
        Self {
            books: HashMap::new(),
            pending_trades: Vec::new(),
        }
    }

    pub fn add_book(&mut self, symbol: impl Into<Symbol>) {
        let symbol = symbol.into();
        self.books.entry(symbol.clone()).or_insert_with(|| OrderBook::new(symbol));
    }

    /// Routes `order` to its symbol's book, matches it eagerly, and buffers
    /// any trades for the next [`BookManager::process_orders`]. Returns
    /// whether the order signalled `InsufficientLiquidity`.
    pub fn place_order(&mut self, order: Order) -> Result<bool, EngineError> {
        let book = self
            .books
            .get_mut(&order.symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(order.symbol.clone()))?;
        let outcome = book.submit(order)?;
        if !outcome.trades.is_empty() {
            info!(count = outcome.trades.len(), "trades buffered for next process_orders");
        }
        self.pending_trades.extend(outcome.trades);
        Ok(outcome.insufficient_liquidity)
    }

    pub fn cancel_order(&mut self, symbol: &str, order_id: &str) -> Result<(), EngineError> {
        let book = self
            .books
            .get_mut(symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.to_string()))?;
        book.cancel(order_id)
    }

    pub fn best_bid(&self, symbol: &str) -> Price {
        self.books.get(symbol).map(OrderBook::best_bid).unwrap_or(Price::ZERO)
    }

    pub fn best_ask(&self, symbol: &str) -> Price {
        self.books.get(symbol).map(OrderBook::best_ask).unwrap_or(Price::ZERO)
    }

    pub fn depth(&self, symbol: &str, side: Side) -> Vec<(Price, u64)> {
        self.books.get(symbol).map(|b| b.depth(side)).unwrap_or_default()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }

    pub fn has_book(&self, symbol: &str) -> bool {
        self.books.contains_key(symbol)
    }

    /// Drains and returns every trade generated since the last call.
    pub fn process_orders(&mut self) -> Vec<Trade> {
        std::mem::take(&mut self.pending_trades)
    }

    pub fn is_any_crossed(&self) -> bool {
        self.books.values().any(OrderBook::is_crossed)
    }
}

impl Default for BookManager {
    fn default() -> Self {
        Self::new()
    }
}
