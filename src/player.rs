//! The persistent side of a player: roster, wallet, badges, bag and discovery ledger.

use crate::battle::turn_orchestrator::SideEffect;
use crate::catalog::Catalog;
use crate::creature::Creature;
use crate::errors::{BattleResult, NotFoundError, StateError, ValidationError};
use crate::inventory::{Inventory, InventoryService};
use crate::progression::{apply_evolution, apply_item_evolution};
use crate::roster::Roster;
use schema::{Item, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;
use uuid::Uuid;

/// Species a player has encountered and captured. Caught implies seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    seen: BTreeSet<SpeciesId>,
    caught: BTreeSet<SpeciesId>,
}

impl Discovery {
    pub fn mark_seen(&mut self, species: SpeciesId) {
        self.seen.insert(species);
    }

    pub fn mark_caught(&mut self, species: SpeciesId) {
        self.seen.insert(species);
        self.caught.insert(species);
    }

    pub fn has_seen(&self, species: SpeciesId) -> bool {
        self.seen.contains(&species)
    }

    pub fn has_caught(&self, species: SpeciesId) -> bool {
        self.caught.contains(&species)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn caught_count(&self) -> usize {
        self.caught.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    pub username: String,
    pub roster: Roster,
    pub currency: u32,
    pub badges: BTreeSet<String>,
    pub inventory: Inventory,
    pub discovery: Discovery,
    /// Evolutions reported by battles and not yet accepted, by creature id.
    pub pending_evolutions: BTreeMap<Uuid, SpeciesId>,
}

impl PlayerProfile {
    pub fn new(id: impl Into<String>, username: impl Into<String>, roster: Roster) -> Self {
        let mut discovery = Discovery::default();
        for creature in roster.team() {
            discovery.mark_caught(creature.species);
        }
        Self {
            id: id.into(),
            username: username.into(),
            roster,
            currency: 0,
            badges: BTreeSet::new(),
            inventory: Inventory::new(),
            discovery,
            pending_evolutions: BTreeMap::new(),
        }
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Commit one side effect produced by a local battle.
    pub fn apply_effect(&mut self, effect: &SideEffect) -> BattleResult<()> {
        match effect {
            SideEffect::ConsumeItem(item) => self.inventory.consume(*item)?,
            SideEffect::GrantCurrency(amount) => self.currency = self.currency.saturating_add(*amount),
            SideEffect::GrantBadge(badge) => {
                self.badges.insert(badge.clone());
            }
            SideEffect::CaptureCreature(creature) => {
                let placement = self.roster.add(creature.clone());
                info!(player = %self.id, species = %creature.species, ?placement, "creature captured");
            }
            SideEffect::DiscoverySeen(species) => self.discovery.mark_seen(*species),
            SideEffect::DiscoveryCaught(species) => self.discovery.mark_caught(*species),
            SideEffect::EvolutionCandidate { creature, into } => {
                self.pending_evolutions.insert(*creature, *into);
            }
        }
        Ok(())
    }

    pub fn apply_effects<'a>(&mut self, effects: impl IntoIterator<Item = &'a SideEffect>) -> BattleResult<()> {
        effects.into_iter().try_for_each(|effect| self.apply_effect(effect))
    }

    /// Write a battle's end state back over the team members it started with.
    pub fn commit_team(&mut self, team: &[Creature]) {
        for updated in team {
            if let Some(owned) = self.roster.find_mut(updated.id) {
                *owned = updated.clone();
            }
        }
    }

    /// Accept a pending evolution reported after a battle.
    pub fn evolve(&mut self, creature_id: Uuid, catalog: &Catalog) -> BattleResult<SpeciesId> {
        let creature = self
            .roster
            .find_mut(creature_id)
            .ok_or(NotFoundError::Creature(creature_id))?;
        let into = self
            .pending_evolutions
            .get(&creature_id)
            .copied()
            .ok_or(StateError::NoEvolutionAvailable { species: creature.species })?;
        *creature = apply_evolution(creature, into, catalog)?;
        self.pending_evolutions.remove(&creature_id);
        self.discovery.mark_caught(into);
        Ok(into)
    }

    /// Use an evolution stone from the bag on a team member.
    pub fn use_evolution_stone(&mut self, team_index: usize, item: Item, catalog: &Catalog) -> BattleResult<SpeciesId> {
        if !item.is_evolution_stone() {
            return Err(ValidationError::NoEffect(item).into());
        }
        self.inventory.require(item)?;
        let creature = self
            .roster
            .team_mut()
            .get_mut(team_index)
            .ok_or(ValidationError::InvalidTeamIndex { index: team_index })?;
        let evolved = apply_item_evolution(creature, item, catalog)?;
        let into = evolved.species;
        *creature = evolved;
        self.inventory.consume(item)?;
        self.discovery.mark_caught(into);
        Ok(into)
    }
}
