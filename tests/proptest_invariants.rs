//! Property-based checks for the book's quantified invariants (P1 no
//! crossed book, P2 conservation of signed inventory, P6 the remaining-
//! quantity bound) under randomized sequences of placements and
//! cancellations.

use std::collections::HashMap;

use market_sim_engine::accounting::{apply_trade, AgentAccount};
use market_sim_engine::manager::BookManager;
use market_sim_engine::orders::{ClientId, Order, OrderId, Side};
use market_sim_engine::price::Price;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Limit { buy: bool, price_ticks: i64, qty: u64 },
    Market { buy: bool, qty: u64 },
    Cancel { target: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<bool>(), 1i64..20, 1u64..10)
            .prop_map(|(buy, price_ticks, qty)| Op::Limit { buy, price_ticks, qty }),
        1 => (any::<bool>(), 1u64..10).prop_map(|(buy, qty)| Op::Market { buy, qty }),
        1 => (0usize..50).prop_map(|target| Op::Cancel { target }),
    ]
}

fn side_of(buy: bool) -> Side {
    if buy {
        Side::Buy
    } else {
        Side::Sell
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn book_invariants_hold_under_random_sequences(ops in proptest::collection::vec(op_strategy(), 1..80)) {
        let mut mgr = BookManager::new();
        mgr.add_book("FOO");

        let mut order_map: HashMap<OrderId, ClientId> = HashMap::new();
        let mut accounts: HashMap<ClientId, AgentAccount> = HashMap::new();
        for n in 0..4 {
            let cid = format!("c{n}");
            accounts.insert(cid.clone(), AgentAccount::new(cid, "FOO"));
        }

        let mut issued: Vec<String> = Vec::new();
        let mut next_id = 0u64;

        for op in ops {
            match op {
                Op::Limit { buy, price_ticks, qty } => {
                    let id = format!("o{next_id}");
                    let cid = format!("c{}", next_id % 4);
                    next_id += 1;
                    let price = Price::from_f64(price_ticks as f64);
                    let order = Order::new_limit(id.clone(), cid.clone(), "FOO", side_of(buy), price, qty);
                    if mgr.place_order(order).is_ok() {
                        order_map.insert(id.clone(), cid);
                        issued.push(id);
                    }
                }
                Op::Market { buy, qty } => {
                    let id = format!("o{next_id}");
                    let cid = format!("c{}", next_id % 4);
                    next_id += 1;
                    let order = Order::new_market(id.clone(), cid.clone(), "FOO", side_of(buy), qty);
                    if mgr.place_order(order).is_ok() {
                        order_map.insert(id.clone(), cid);
                        issued.push(id);
                    }
                }
                Op::Cancel { target } => {
                    if !issued.is_empty() {
                        let id = &issued[target % issued.len()];
                        let _ = mgr.cancel_order("FOO", id);
                    }
                }
            }

            // P1: the book is never crossed after any operation.
            prop_assert!(!mgr.is_any_crossed());

            for trade in mgr.process_orders() {
                apply_trade(&trade, &order_map, &mut accounts, 0.0);
            }
        }

        // P2: signed inventory across all agents sums to zero — every trade
        // moves equal and opposite quantity between its two sides.
        let total_inventory: i64 = accounts.values().map(|a| a.inventory).sum();
        prop_assert_eq!(total_inventory, 0);

        // P6 / I2: no resting order is ever left at zero remaining quantity.
        for side in [Side::Buy, Side::Sell] {
            for (_, qty) in mgr.depth("FOO", side) {
                prop_assert!(qty > 0);
            }
        }
    }
}
