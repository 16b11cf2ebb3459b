//! The capability contract the scheduler calls agents through.
//!
//! Agents are external collaborators (market maker, trend follower, mean
//! reverter, liquidity taker, supervised predictor, RL agent policies are all
//! out of scope here) — this module only defines the trait they implement
//! and the proxy the scheduler hands them, so that any policy can be plugged
//! in uniformly.

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::warn;

use crate::accounting::AgentAccount;
use crate::errors::EngineError;
use crate::latency::LatencyQueue;
use crate::manager::BookManager;
use crate::orders::{ClientId, Order};
use crate::price::Price;

/// Anything the scheduler can step once per tick. Agents read book state and
/// submit/cancel orders exclusively through the [`ManagerProxy`] they are
/// constructed with; they must not reach into the `BookManager` directly or
/// observe other agents' accounts.
pub trait Agent {
    fn client_id(&self) -> &str;
    fn step(&mut self, proxy: &mut ManagerProxy<'_>);
}

/// Per-agent wrapper around the real [`BookManager`] that enforces latency
/// and fee side effects the engine itself knows nothing about (see §9 of the
/// spec this simulator implements: "latency is a scheduler concern, not an
/// engine concern").
pub struct ManagerProxy<'a> {
    manager: &'a mut BookManager,
    latency_queue: &'a mut LatencyQueue,
    rng: &'a mut StdRng,
    account: &'a mut AgentAccount,
    owner: ClientId,
    current_time: f64,
    fee_per_order: f64,
    latency_mean: f64,
    latency_std: f64,
}

impl<'a> ManagerProxy<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        manager: &'a mut BookManager,
        latency_queue: &'a mut LatencyQueue,
        rng: &'a mut StdRng,
        account: &'a mut AgentAccount,
        owner: ClientId,
        current_time: f64,
        fee_per_order: f64,
        latency_mean: f64,
        latency_std: f64,
    ) -> Self {
        Self {
            manager,
            latency_queue,
            rng,
            account,
            owner,
            current_time,
            fee_per_order,
            latency_mean,
            latency_std,
        }
    }

    /// Queues `order` for release after a sampled latency and debits the
    /// flat per-order fee immediately, regardless of whether the order ever
    /// fills (preserved verbatim from the source system; see DESIGN.md).
    pub fn place_order(&mut self, order: Order) {
        let dist = Normal::new(self.latency_mean, self.latency_std)
            .expect("latency_std must be finite and non-negative");
        let latency = dist.sample(self.rng).max(0.0);
        let release_time = self.current_time + latency;
        self.latency_queue.push(release_time, order, self.owner.clone());
        self.account.pnl -= self.fee_per_order;
    }

    /// Forwards to the book. A `NotFound` (already filled, already
    /// cancelled, or never existed) is swallowed: cancellation is idempotent
    /// from the agent's point of view.
    pub fn cancel_order(&mut self, symbol: &str, order_id: &str) {
        match self.manager.cancel_order(symbol, order_id) {
            Ok(()) | Err(EngineError::NotFound(_)) => {}
            Err(other) => warn!(%symbol, order_id, error = %other, "cancel_order failed"),
        }
    }

    pub fn best_bid(&self, symbol: &str) -> Price {
        self.manager.best_bid(symbol)
    }

    pub fn best_ask(&self, symbol: &str) -> Price {
        self.manager.best_ask(symbol)
    }
}
