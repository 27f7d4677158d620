//! Liveness tracking for PvP participants.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Last-seen times per player, in unix milliseconds.
pub trait Presence: Send + Sync {
    fn heartbeat(&self, player_id: &str, at_ms: u64);
    fn last_seen(&self, player_id: &str) -> Option<u64>;
}

#[derive(Debug, Default)]
pub struct HeartbeatTracker {
    seen: RwLock<HashMap<String, u64>>,
}

impl HeartbeatTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presence for HeartbeatTracker {
    fn heartbeat(&self, player_id: &str, at_ms: u64) {
        let mut seen = self.seen.write().unwrap_or_else(PoisonError::into_inner);
        let entry = seen.entry(player_id.to_string()).or_insert(at_ms);
        // Out-of-order heartbeats never move the clock backwards.
        *entry = (*entry).max(at_ms);
    }

    fn last_seen(&self, player_id: &str) -> Option<u64> {
        self.seen
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(player_id)
            .copied()
    }
}
