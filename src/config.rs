//! Typed, explicit simulation configuration (§6/§12). No process-global
//! constants and no environment/CLI surface — a `SimConfig` is built or
//! deserialized by the caller and handed to [`crate::scheduler::Scheduler`].

use serde::{Deserialize, Serialize};

/// Every knob that drives a run, plus the initial seeding parameters used by
/// `crate::seed::seed_book`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Symbol keys to instantiate books for.
    pub symbols: Vec<String>,
    /// Number of ticks to simulate.
    pub num_steps: u64,
    /// Seconds of logical time per tick.
    pub dt: f64,
    /// Flat fee debited on each placement, regardless of fill.
    pub fee_per_order: f64,
    /// Fee per filled share, debited on execution.
    pub fee_per_share: f64,
    /// Mean of the Gaussian order-release latency, in seconds.
    pub latency_mean: f64,
    /// Std-dev of the Gaussian order-release latency, in seconds. Negative
    /// samples are clamped to zero.
    pub latency_std: f64,
    /// Std-dev of each symbol's per-tick fundamental mid drift.
    pub fund_volatility: f64,
    /// Seed for every stochastic component (latency sampling, fundamental
    /// drift); the same seed reproduces an identical run (P7).
    pub rng_seed: u64,
    /// Resting price levels seeded on each side of each symbol's book before
    /// step 0.
    pub seed_levels: u32,
    /// Resting quantity per seeded level.
    pub seed_size: u64,
    /// Price spacing between consecutive seeded levels.
    pub seed_tick: f64,
    /// Starting mid used both for seeding and as the initial fundamental
    /// base mid, per symbol index (round-robin if fewer entries than
    /// symbols).
    pub starting_mid: f64,
}

impl SimConfig {
    /// A configuration matching the source harness's defaults: single
    /// symbol, 1000 steps of 0.1s, and the fee/latency/drift constants
    /// documented in §6.
    pub fn default_single_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbols: vec![symbol.into()],
            num_steps: 1000,
            dt: 0.1,
            fee_per_order: 0.01,
            fee_per_share: 0.002,
            latency_mean: 0.02,
            latency_std: 0.01,
            fund_volatility: 0.1,
            rng_seed: 42,
            seed_levels: 5,
            seed_size: 10,
            seed_tick: 1.0,
            starting_mid: 100.0,
        }
    }
}
