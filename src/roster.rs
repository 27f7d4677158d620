use crate::creature::Creature;
use crate::errors::{BattleResult, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_TEAM_SIZE: usize = 6;

/// Where a newly acquired creature ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Team { index: usize },
    Storage { index: usize },
}

/// A player's team of 1 to 6 creatures plus unbounded reserve storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    team: Vec<Creature>,
    storage: Vec<Creature>,
}

impl Roster {
    pub fn new(team: Vec<Creature>) -> BattleResult<Self> {
        if team.is_empty() || team.len() > MAX_TEAM_SIZE {
            return Err(ValidationError::TeamSize(team.len()).into());
        }
        Ok(Self { team, storage: Vec::new() })
    }

    pub fn team(&self) -> &[Creature] {
        &self.team
    }

    pub fn team_mut(&mut self) -> &mut [Creature] {
        &mut self.team
    }

    pub fn storage(&self) -> &[Creature] {
        &self.storage
    }

    pub fn is_team_full(&self) -> bool {
        self.team.len() >= MAX_TEAM_SIZE
    }

    /// Join the team if there is room, otherwise go to storage.
    pub fn add(&mut self, creature: Creature) -> Placement {
        if self.is_team_full() {
            self.storage.push(creature);
            Placement::Storage { index: self.storage.len() - 1 }
        } else {
            self.team.push(creature);
            Placement::Team { index: self.team.len() - 1 }
        }
    }

    /// Replace the team with updated copies, e.g. after a battle. Size rules still apply.
    pub fn replace_team(&mut self, team: Vec<Creature>) -> BattleResult<()> {
        if team.is_empty() || team.len() > MAX_TEAM_SIZE {
            return Err(ValidationError::TeamSize(team.len()).into());
        }
        self.team = team;
        Ok(())
    }

    /// Move a creature from storage into the team, sending the team member at `team_index` to storage.
    pub fn swap_with_storage(&mut self, team_index: usize, storage_index: usize) -> BattleResult<()> {
        if team_index >= self.team.len() {
            return Err(ValidationError::InvalidTeamIndex { index: team_index }.into());
        }
        if storage_index >= self.storage.len() {
            return Err(ValidationError::InvalidTeamIndex { index: storage_index }.into());
        }
        std::mem::swap(&mut self.team[team_index], &mut self.storage[storage_index]);
        Ok(())
    }

    /// Fully restored copies of the team, as used for battle snapshots.
    pub fn restored_team(&self) -> Vec<Creature> {
        self.team
            .iter()
            .cloned()
            .map(|mut creature| {
                creature.restore_fully();
                creature
            })
            .collect()
    }

    /// Any owned creature, team first, then storage.
    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut Creature> {
        self.team
            .iter_mut()
            .chain(self.storage.iter_mut())
            .find(|creature| creature.id == id)
    }

    pub fn heal_all(&mut self) {
        for creature in &mut self.team {
            creature.restore_fully();
        }
    }
}
