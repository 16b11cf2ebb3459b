//! Priority queue holding agent placements until their modeled release time.
//!
//! Grounded on the same min-heap-of-`Reverse`-with-sequence-tiebreak shape
//! used for deterministic event merging elsewhere in this codebase's lineage:
//! entries compare by `release_time` first, then by insertion sequence, so
//! two orders queued for the same tick always drain in submission order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::orders::{ClientId, Order};

#[derive(Debug)]
struct DelayedOrder {
    release_time: f64,
    seq: u64,
    order: Order,
    owner: ClientId,
}

impl PartialEq for DelayedOrder {
    fn eq(&self, other: &Self) -> bool {
        self.release_time == other.release_time && self.seq == other.seq
    }
}
impl Eq for DelayedOrder {}

impl PartialOrd for DelayedOrder {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DelayedOrder {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.release_time
            .partial_cmp(&other.release_time)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap ordered by `release_time`, ties broken by insertion order.
pub struct LatencyQueue {
    heap: BinaryHeap<Reverse<DelayedOrder>>,
    next_seq: u64,
}

impl LatencyQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, release_time: f64, order: Order, owner: ClientId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(DelayedOrder {
            release_time,
            seq,
            order,
            owner,
        }));
    }

    /// Removes and returns every entry with `release_time <= now`, in
    /// release-time order (ties in insertion order).
    pub fn drain_due(&mut self, now: f64) -> Vec<(Order, ClientId)> {
        let mut due = Vec::new();
        while let Some(Reverse(top)) = self.heap.peek() {
            if top.release_time > now {
                break;
            }
            let Reverse(entry) = self.heap.pop().expect("just peeked");
            due.push((entry.order, entry.owner));
        }
        due
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for LatencyQueue {
    fn default() -> Self {
        Self::new()
    }
}
