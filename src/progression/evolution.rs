use crate::catalog::Catalog;
use crate::creature::Creature;
use crate::errors::{BattleResult, StateError};
use schema::{Item, SpeciesId};
use tracing::info;

/// Turn `creature` into `into`. Level, IVs, EVs, nature, moves, nickname and
/// experience carry over; species-derived fields and stats are replaced.
pub fn apply_evolution(creature: &Creature, into: SpeciesId, catalog: &Catalog) -> BattleResult<Creature> {
    let data = catalog.species(into)?;
    let mut evolved = creature.clone();
    evolved.species = into;
    evolved.types = data.types.clone();
    evolved.base_stats = data.base_stats;
    evolved.sprite = data.sprite.clone();
    evolved.recalculate_stats();
    info!(from = %creature.species, into = %into, level = creature.level, "evolved");
    Ok(evolved)
}

/// Species `creature` would become if `item` were used on it.
pub fn item_evolution_candidate(creature: &Creature, item: Item, catalog: &Catalog) -> BattleResult<Option<SpeciesId>> {
    Ok(catalog.species(creature.species)?.item_evolution(item))
}

pub fn apply_item_evolution(creature: &Creature, item: Item, catalog: &Catalog) -> BattleResult<Creature> {
    match item_evolution_candidate(creature, item, catalog)? {
        Some(into) => apply_evolution(creature, into, catalog),
        None => Err(StateError::NoEvolutionAvailable { species: creature.species }.into()),
    }
}
