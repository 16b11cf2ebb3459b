//! Per-tick accounting snapshot, accumulated in-memory by the scheduler.
//! Turning this into a CSV or any other on-disk form is explicitly out of
//! scope (§1) — `Vec<TickMetrics>` is the full surface this crate offers.

use serde::Serialize;

/// One row per tick: the step index, current time, and every agent's
/// `(pnl, inventory, nav)` as of that tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickMetrics {
    pub step: u64,
    pub current_time: f64,
    pub agents: Vec<AgentSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub client_id: String,
    pub pnl: f64,
    pub inventory: i64,
    pub nav: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_json() {
        let row = TickMetrics {
            step: 0,
            current_time: 0.0,
            agents: vec![AgentSnapshot {
                client_id: "a1".to_string(),
                pnl: -0.01,
                inventory: 0,
                nav: -0.01,
            }],
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"client_id\":\"a1\""));
    }
}
