//! Price-time priority matching engine for a single symbol.
//!
//! The matching engine knows nothing about wall time, latency, or fees — it
//! only ever sees a totally ordered stream of `submit`/`cancel` calls and is
//! deterministic given that stream. Latency and accounting live one layer up,
//! in the scheduler (see `crate::scheduler`).

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::EngineError;
use crate::orders::{Order, OrderId, OrderType, Side, Symbol};
use crate::price::Price;
use crate::price_level::PriceLevel;
use crate::trade::Trade;

/// Result of a single `submit` call.
#[derive(Debug, Default)]
pub struct SubmitOutcome {
    pub trades: Vec<Trade>,
    /// Set when a MARKET order could not be fully filled because the
    /// opposite side of the book ran out of liquidity. Market-normal, not an
    /// error (see `crate::errors::EngineError`'s doc comment).
    pub insufficient_liquidity: bool,
}

/// Two sorted price-level ladders for one symbol, plus the bookkeeping
/// needed for O(log n) cancellation and permanent order-id rejection.
pub struct OrderBook {
    symbol: Symbol,
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    /// Where a currently-resting order lives, for cancellation.
    resting: HashMap<OrderId, (Side, Price)>,
    /// Every order id this book has ever admitted. Never shrinks: per I3,
    /// cancelled and filled ids are tombstoned, not recycled (see §8 scenario
    /// 6 of the spec this book implements).
    known_ids: HashSet<OrderId>,
    next_sequence: u64,
}

impl OrderBook {
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            resting: HashMap::new(),
            known_ids: HashSet::new(),
            next_sequence: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Admits `order`, matches what it can against the opposite side, and
    /// rests any LIMIT remainder. See the module doc and the spec's §4.1 for
    /// the algorithm this implements.
    pub fn submit(&mut self, mut order: Order) -> Result<SubmitOutcome, EngineError> {
        if order.quantity == 0 {
            return Err(EngineError::BadOrder(format!(
                "order '{}' has non-positive quantity",
                order.order_id
            )));
        }
        if order.order_type == OrderType::Limit {
            match order.price {
                Some(p) if p.is_positive() => {}
                _ => {
                    return Err(EngineError::BadOrder(format!(
                        "limit order '{}' has non-positive price",
                        order.order_id
                    )));
                }
            }
        }
        if self.known_ids.contains(&order.order_id) {
            return Err(EngineError::DuplicateId(order.order_id));
        }
        self.known_ids.insert(order.order_id.clone());

        info!(order_id = %order.order_id, side = ?order.side, order_type = ?order.order_type, "matching incoming order");

        let side = order.side;
        let reversed = side == Side::Buy;
        let opposite = match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };
        let trades = match_against(&mut order, opposite, reversed, &mut self.resting);

        let mut insufficient_liquidity = false;
        if order.remaining_quantity > 0 {
            match order.order_type {
                OrderType::Limit => {
                    order.sequence = self.next_sequence;
                    self.next_sequence += 1;
                    let price = order.price.expect("validated above");
                    let order_id = order.order_id.clone();
                    let side_map = match side {
                        Side::Buy => &mut self.bids,
                        Side::Sell => &mut self.asks,
                    };
                    side_map
                        .entry(price)
                        .or_insert_with(|| PriceLevel::new(price))
                        .push_back(order);
                    self.resting.insert(order_id, (side, price));
                }
                OrderType::Market => {
                    warn!(order_id = %order.order_id, remaining = order.remaining_quantity, "market order exhausted opposite side");
                    insufficient_liquidity = true;
                }
            }
        }

        Ok(SubmitOutcome {
            trades,
            insufficient_liquidity,
        })
    }

    /// Removes a resting order by id. `Ok(())` if it was resting and is now
    /// gone; `Err(NotFound)` if unknown or already fully filled/cancelled.
    pub fn cancel(&mut self, order_id: &str) -> Result<(), EngineError> {
        let Some((side, price)) = self.resting.remove(order_id) else {
            return Err(EngineError::NotFound(order_id.to_string()));
        };
        let side_map = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = side_map.get_mut(&price) {
            level.remove(order_id);
            if level.is_empty() {
                side_map.remove(&price);
            }
        }
        Ok(())
    }

    /// Highest resting bid, or [`Price::ZERO`] if the bid side is empty.
    pub fn best_bid(&self) -> Price {
        self.bids.keys().next_back().copied().unwrap_or(Price::ZERO)
    }

    /// Lowest resting ask, or [`Price::ZERO`] if the ask side is empty.
    pub fn best_ask(&self) -> Price {
        self.asks.keys().next().copied().unwrap_or(Price::ZERO)
    }

    /// Aggregate resting quantity per price level, in the side's priority
    /// order (bids descending, asks ascending).
    pub fn depth(&self, side: Side) -> Vec<(Price, u64)> {
        match side {
            Side::Buy => self
                .bids
                .iter()
                .rev()
                .map(|(p, level)| (*p, level.total_quantity()))
                .collect(),
            Side::Sell => self
                .asks
                .iter()
                .map(|(p, level)| (*p, level.total_quantity()))
                .collect(),
        }
    }

    pub fn is_crossed(&self) -> bool {
        let bid = self.best_bid();
        let ask = self.best_ask();
        bid.is_positive() && ask.is_positive() && bid >= ask
    }
}

/// Matches `incoming` against `opposite` (the book side on the other side of
/// `incoming.side`), iterating best-price-first, and returns the trades
/// generated. `resting` is updated as resting orders are fully consumed.
fn match_against(
    incoming: &mut Order,
    opposite: &mut BTreeMap<Price, PriceLevel>,
    reversed: bool,
    resting: &mut HashMap<OrderId, (Side, Price)>,
) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut drained_levels = Vec::new();

    'outer: loop {
        if incoming.remaining_quantity == 0 {
            break;
        }
        let Some(top_price) = (if reversed {
            opposite.keys().next_back().copied()
        } else {
            opposite.keys().next().copied()
        }) else {
            break;
        };

        if incoming.order_type == OrderType::Limit {
            let limit_price = incoming.price.expect("validated in submit");
            let crosses = match incoming.side {
                Side::Buy => top_price <= limit_price,
                Side::Sell => top_price >= limit_price,
            };
            if !crosses {
                break;
            }
        }

        let level = opposite.get_mut(&top_price).expect("key came from this map");
        loop {
            let Some(head) = level.front_mut() else {
                drained_levels.push(top_price);
                continue 'outer;
            };
            let fill = incoming.remaining_quantity.min(head.remaining_quantity);

            let (buy_order_id, sell_order_id) = match incoming.side {
                Side::Buy => (incoming.order_id.clone(), head.order_id.clone()),
                Side::Sell => (head.order_id.clone(), incoming.order_id.clone()),
            };
            trades.push(Trade {
                trade_id: Uuid::new_v4().to_string(),
                buy_order_id,
                sell_order_id,
                symbol: incoming.symbol.clone(),
                price: top_price,
                quantity: fill,
            });

            incoming.remaining_quantity -= fill;
            head.remaining_quantity -= fill;

            if head.remaining_quantity == 0 {
                let filled = level.pop_front().expect("front_mut just returned Some");
                resting.remove(&filled.order_id);
            }
            if level.is_empty() {
                drained_levels.push(top_price);
            }
            if incoming.remaining_quantity == 0 {
                break 'outer;
            }
            if level.is_empty() {
                continue 'outer;
            }
        }
    }

    for price in drained_levels {
        opposite.remove(&price);
    }
    trades
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(id: &str, side: Side, price: f64, qty: u64) -> Order {
        Order::new_limit(id, "c", "FOO", side, Price::from_f64(price), qty)
    }

    fn market(id: &str, side: Side, qty: u64) -> Order {
        Order::new_market(id, "c", "FOO", side, qty)
    }

    #[test]
    fn single_match() {
        let mut ob = OrderBook::new("FOO");
        ob.submit(limit("b1", Side::Buy, 100.0, 2)).unwrap();
        let outcome = ob.submit(limit("s1", Side::Sell, 100.0, 2)).unwrap();

        assert_eq!(outcome.trades.len(), 1);
        let t = &outcome.trades[0];
        assert_eq!(t.price, Price::from_f64(100.0));
        assert_eq!(t.quantity, 2);
        assert_eq!(t.buy_order_id, "b1");
        assert_eq!(t.sell_order_id, "s1");
        assert_eq!(ob.best_bid(), Price::ZERO);
        assert_eq!(ob.best_ask(), Price::ZERO);
    }

    #[test]
    fn partial_fill_rests_remainder() {
        let mut ob = OrderBook::new("FOO");
        ob.submit(limit("b1", Side::Buy, 100.0, 5)).unwrap();
        let outcome = ob.submit(limit("s1", Side::Sell, 100.0, 2)).unwrap();

        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].quantity, 2);
        assert_eq!(ob.depth(Side::Buy), vec![(Price::from_f64(100.0), 3)]);
    }

    #[test]
    fn aggressor_gets_price_improvement() {
        let mut ob = OrderBook::new("FOO");
        ob.submit(limit("s1", Side::Sell, 99.0, 1)).unwrap();
        let outcome = ob.submit(limit("b1", Side::Buy, 100.0, 1)).unwrap();

        assert_eq!(outcome.trades[0].price, Price::from_f64(99.0));
    }

    #[test]
    fn fifo_within_price_level() {
        let mut ob = OrderBook::new("FOO");
        ob.submit(limit("s1", Side::Sell, 100.0, 1)).unwrap();
        ob.submit(limit("s2", Side::Sell, 100.0, 1)).unwrap();
        let outcome = ob.submit(market("m1", Side::Buy, 1)).unwrap();

        assert_eq!(outcome.trades[0].sell_order_id, "s1");
    }

    #[test]
    fn market_order_exhausts_book_and_signals() {
        let mut ob = OrderBook::new("FOO");
        ob.submit(limit("s1", Side::Sell, 100.0, 3)).unwrap();
        let outcome = ob.submit(market("m1", Side::Buy, 5)).unwrap();

        let filled: u64 = outcome.trades.iter().map(|t| t.quantity).sum();
        assert_eq!(filled, 3);
        assert!(outcome.insufficient_liquidity);
        assert_eq!(ob.depth(Side::Sell), Vec::new());
    }

    #[test]
    fn cancel_then_resubmit_same_id_is_rejected() {
        let mut ob = OrderBook::new("FOO");
        ob.submit(limit("x", Side::Buy, 50.0, 1)).unwrap();
        ob.cancel("x").unwrap();
        ob.submit(limit("y", Side::Buy, 50.0, 1)).unwrap();

        assert_eq!(ob.depth(Side::Buy), vec![(Price::from_f64(50.0), 1)]);
        let err = ob.submit(limit("x", Side::Buy, 50.0, 1)).unwrap_err();
        assert_eq!(err, EngineError::DuplicateId("x".to_string()));
    }

    #[test]
    fn cancel_unknown_id_fails() {
        let mut ob = OrderBook::new("FOO");
        let err = ob.cancel("ghost").unwrap_err();
        assert_eq!(err, EngineError::NotFound("ghost".to_string()));
    }

    #[test]
    fn bad_order_rejected() {
        let mut ob = OrderBook::new("FOO");
        let err = ob.submit(limit("b1", Side::Buy, 0.0, 1)).unwrap_err();
        assert!(matches!(err, EngineError::BadOrder(_)));
        let err = ob.submit(market("m1", Side::Buy, 0)).unwrap_err();
        assert!(matches!(err, EngineError::BadOrder(_)));
    }

    #[test]
    fn never_rests_crossed() {
        let mut ob = OrderBook::new("FOO");
        ob.submit(limit("b1", Side::Buy, 100.0, 5)).unwrap();
        ob.submit(limit("s1", Side::Sell, 90.0, 5)).unwrap();
        assert!(!ob.is_crossed());
    }
}
