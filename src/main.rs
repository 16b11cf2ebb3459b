//! Thin driver binary: installs structured logging and runs one demo
//! simulation. Agent policies are external collaborators (see the crate's
//! top-level spec) — this binary wires in a single minimal noise trader
//! just to exercise the scheduler end to end; real policies are expected to
//! be supplied by callers of the library crate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use market_sim_engine::agent::{Agent, ManagerProxy};
use market_sim_engine::config::SimConfig;
use market_sim_engine::orders::{Order, Side};
use market_sim_engine::price::Price;
use market_sim_engine::scheduler::{AgentPlanEntry, Scheduler};

/// Places a random small LIMIT order near the current best quotes each
/// tick, with even odds of either side. Demo only.
struct NoiseTrader {
    id: String,
    symbol: String,
    rng: StdRng,
}

impl Agent for NoiseTrader {
    fn client_id(&self) -> &str {
        &self.id
    }

    fn step(&mut self, proxy: &mut ManagerProxy<'_>) {
        let side = if self.rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
        let bid = proxy.best_bid(&self.symbol).to_f64();
        let ask = proxy.best_ask(&self.symbol).to_f64();
        let mid = if bid > 0.0 && ask > 0.0 { (bid + ask) / 2.0 } else { 100.0 };
        let offset = self.rng.random_range(-0.5..0.5);
        let price = Price::from_f64(mid + offset);
        let order_id = format!("{}-{}", self.id, self.rng.random::<u32>());

        proxy.place_order(Order::new_limit(order_id, self.id.clone(), self.symbol.clone(), side, price, 1));
    }
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = SimConfig::default_single_symbol("FOO");
    let rng_seed = config.rng_seed;

    let plan = vec![AgentPlanEntry {
        tag: "noise".to_string(),
        count: 4,
        factory: Box::new(move |id, symbol| {
            Box::new(NoiseTrader {
                rng: StdRng::seed_from_u64(rng_seed ^ id.len() as u64),
                id,
                symbol,
            }) as Box<dyn Agent>
        }),
    }];

    let mut scheduler = Scheduler::new(config, plan);
    let history = scheduler.run()?;

    info!(ticks = history.len(), "simulation complete");
    if let Some(last) = history.last() {
        for agent in &last.agents {
            info!(client_id = %agent.client_id, pnl = agent.pnl, inventory = agent.inventory, nav = agent.nav, "final agent state");
        }
    }

    Ok(())
}
