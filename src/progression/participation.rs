use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which of the player's creatures have faced each opposing creature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationTracker {
    faced: BTreeMap<usize, BTreeSet<usize>>,
}

impl ParticipationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the two active creatures faced each other.
    pub fn record(&mut self, player_index: usize, opponent_index: usize) {
        self.faced.entry(opponent_index).or_default().insert(player_index);
    }

    /// Player team indices that faced `opponent_index`, in team order.
    pub fn participants_against(&self, opponent_index: usize) -> Vec<usize> {
        self.faced
            .get(&opponent_index)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}
