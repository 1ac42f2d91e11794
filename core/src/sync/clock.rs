//! Logical clocks for causality tracking

use crate::ActorId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lamport timestamp used to allocate operation counters
///
/// # Properties
///
/// - Monotonically increasing: clock never decreases
/// - Starts at 0 (0 is never assigned to an operation)
/// - Update on merge: clock = max(local, remote)
///
/// # Example
///
/// ```rust
/// use convergent_core::sync::LamportClock;
///
/// let mut clock = LamportClock::new();
/// assert_eq!(clock.tick(), 1);
///
/// clock.update(5);  // Ops seen from a remote replica
/// assert_eq!(clock.tick(), 6);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LamportClock {
    value: u64,
}

impl LamportClock {
    /// Create a new Lamport clock starting at 0
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Get the current clock value
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Increment clock and return new value (for local operations)
    pub fn tick(&mut self) -> u64 {
        self.value += 1;
        self.value
    }

    /// Update clock from remote timestamp
    pub fn update(&mut self, remote: u64) {
        self.value = self.value.max(remote);
    }
}

/// Highest change sequence number applied per actor
///
/// A document has applied change `(actor, seq)` iff `get(actor) >= seq`,
/// because each actor's changes are applied in sequence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock {
    clocks: BTreeMap<ActorId, u64>,
}

impl VectorClock {
    /// Create a new empty vector clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number for an actor (0 if never seen)
    pub fn get(&self, actor: &str) -> u64 {
        self.clocks.get(actor).copied().unwrap_or(0)
    }

    /// Raise the clock for an actor to at least `seq`
    pub fn update(&mut self, actor: &str, seq: u64) {
        let entry = self.clocks.entry(actor.to_string()).or_insert(0);
        *entry = (*entry).max(seq);
    }

    /// Component-wise maximum
    pub fn merge(&mut self, other: &VectorClock) {
        for (actor, &seq) in &other.clocks {
            self.update(actor, seq);
        }
    }

    /// Whether every entry of `other` is covered by this clock
    pub fn includes(&self, other: &VectorClock) -> bool {
        other
            .clocks
            .iter()
            .all(|(actor, &seq)| self.get(actor) >= seq)
    }

    /// Actors with at least one applied change
    pub fn actors(&self) -> impl Iterator<Item = &ActorId> {
        self.clocks.keys()
    }
}
