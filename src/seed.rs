//! Infrastructure order flow that never originates from an agent: initial
//! book seeding and per-tick fundamental-price drift (§4.8).

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::error;

use crate::manager::BookManager;
use crate::orders::{Order, Side, Symbol, FUND, SEEDER};
use crate::price::Price;

/// Seeds `symbol`'s book with `levels` resting price levels on each side
/// around `starting_mid`, owned by `"seeder"`, so agents never face a
/// completely empty book at step 0. Grounded on the source harness's
/// `seed_order_book` (5 levels/side, size 10, around mid 100.0).
pub fn seed_book(
    manager: &mut BookManager,
    symbol: &Symbol,
    levels: u32,
    size: u64,
    tick: f64,
    starting_mid: f64,
) {
    for i in 1..=levels {
        let offset = i as f64 * tick;
        let bid = Order::new_limit(
            format!("seed-b-{symbol}-{i}"),
            SEEDER,
            symbol.clone(),
            Side::Buy,
            Price::from_f64(starting_mid - offset),
            size,
        );
        let ask = Order::new_limit(
            format!("seed-s-{symbol}-{i}"),
            SEEDER,
            symbol.clone(),
            Side::Sell,
            Price::from_f64(starting_mid + offset),
            size,
        );
        // Seed orders are constructed with fresh, never-before-used ids, so
        // failures here indicate a programming error, not a market outcome.
        if let Err(e) = manager.place_order(bid) {
            error!(%symbol, error = %e, "failed to seed bid level");
        }
        if let Err(e) = manager.place_order(ask) {
            error!(%symbol, error = %e, "failed to seed ask level");
        }
    }
}

/// Drifts `base_mid[symbol]` by `Normal(0, fund_volatility)` and injects a
/// 1-share BUY at `mid - 0.05` / SELL at `mid + 0.05` under owner `"fund"`,
/// directly to the manager (bypassing the latency queue — fundamental flow
/// is infrastructure, not agent-originated). Per §9's design notes, these
/// orders accumulate as resting liquidity across the whole run; that is
/// preserved, not capped.
pub fn fundamental_drift(
    manager: &mut BookManager,
    base_mid: &mut f64,
    symbol: &Symbol,
    step: u64,
    fund_volatility: f64,
    rng: &mut StdRng,
) {
    let dist = Normal::new(0.0, fund_volatility).expect("fund_volatility must be >= 0");
    *base_mid += dist.sample(rng);
    let mid = *base_mid;

    let buy = Order::new_limit(
        format!("fund-b-{symbol}-{step}"),
        FUND,
        symbol.clone(),
        Side::Buy,
        Price::from_f64(mid - 0.05),
        1,
    );
    let sell = Order::new_limit(
        format!("fund-s-{symbol}-{step}"),
        FUND,
        symbol.clone(),
        Side::Sell,
        Price::from_f64(mid + 0.05),
        1,
    );

    // A drifted mid can in principle go non-positive; that degrades to a
    // BadOrder rejection here rather than aborting the whole run, since
    // fundamental flow is scheduler bookkeeping, not an agent-facing
    // placement (see DESIGN.md's resolution of this open question).
    if let Err(e) = manager.place_order(buy) {
        error!(%symbol, step, error = %e, "fundamental buy rejected");
    }
    if let Err(e) = manager.place_order(sell) {
        error!(%symbol, step, error = %e, "fundamental sell rejected");
    }
}
