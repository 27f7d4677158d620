use crate::catalog::Catalog;
use crate::creature::{Creature, MAX_LEVEL};
use crate::errors::BattleResult;
use crate::progression::moves::{learn_move, LearnedMove};
use schema::SpeciesId;
use tracing::info;

/// Result of granting experience: the updated creature plus what happened on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionOutcome {
    pub creature: Creature,
    pub levels_gained: u8,
    pub learned: Vec<LearnedMove>,
    /// Species the creature may now evolve into. Reported, never applied.
    pub evolution: Option<SpeciesId>,
}

fn total_for_level(level: u8) -> u32 {
    (level as u32).pow(3)
}

/// Add `amount` experience on the cubic curve, levelling up as many times as it allows.
/// Experience beyond `max_level` is discarded.
pub fn grant_experience(
    creature: &Creature,
    amount: u32,
    catalog: &Catalog,
    max_level: u8,
) -> BattleResult<ProgressionOutcome> {
    let cap = max_level.min(MAX_LEVEL);
    let mut next = creature.clone();
    let mut learned = Vec::new();
    let mut levels_gained = 0;

    next.experience = next.experience.saturating_add(amount);
    while next.level < cap {
        let gap = total_for_level(next.level + 1) - total_for_level(next.level);
        if next.experience < gap {
            break;
        }
        next.experience -= gap;
        next.level += 1;
        levels_gained += 1;
        next.recalculate_stats();

        let species = catalog.species(next.species)?;
        for move_id in species.learnset.learns_at_level(next.level) {
            let outcome = learn_move(&mut next, *move_id, catalog)?;
            learned.push(LearnedMove { move_id: *move_id, level: next.level, outcome });
        }
        info!(species = %next.species, level = next.level, "level up");
    }
    if next.level >= cap {
        next.experience = 0;
    }

    let evolution = if levels_gained > 0 {
        catalog.species(next.species)?.level_evolution(next.level)
    } else {
        None
    };

    Ok(ProgressionOutcome { creature: next, levels_gained, learned, evolution })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestCreatureBuilder;
    use crate::progression::moves::LearnOutcome;
    use pretty_assertions::assert_eq;
    use schema::MoveId;

    #[test]
    fn exact_gap_reaches_next_level_and_reports_evolution() {
        let catalog = Catalog::builtin().unwrap();
        let creature = TestCreatureBuilder::new(SpeciesId::Cindrake, 15).build();
        let outcome = grant_experience(&creature, 721, &catalog, 100).unwrap();

        assert_eq!(outcome.creature.level, 16);
        assert_eq!(outcome.creature.experience, 0);
        assert_eq!(outcome.levels_gained, 1);
        assert_eq!(outcome.evolution, Some(SpeciesId::Pyrodrake));
    }

    #[test]
    fn short_of_gap_stays_put() {
        let catalog = Catalog::builtin().unwrap();
        let creature = TestCreatureBuilder::new(SpeciesId::Cindrake, 14).build();
        let outcome = grant_experience(&creature, 500, &catalog, 100).unwrap();
        // 14³ = 2744, 15³ = 3375: 631 needed.
        assert_eq!(outcome.creature.level, 14);
        assert_eq!(outcome.creature.experience, 500);
        assert_eq!(outcome.evolution, None);
    }

    #[test]
    fn reaching_a_level_below_the_threshold_reports_no_candidate() {
        let catalog = Catalog::builtin().unwrap();
        let creature = TestCreatureBuilder::new(SpeciesId::Cindrake, 14).build();
        let outcome = grant_experience(&creature, 631, &catalog, 100).unwrap();
        assert_eq!(outcome.creature.level, 15);
        assert_eq!(outcome.evolution, None);
    }

    #[test]
    fn multi_level_gain_carries_remainder_and_hp_delta() {
        let catalog = Catalog::builtin().unwrap();
        let creature = TestCreatureBuilder::new(SpeciesId::Pebblit, 10).with_hp(5).build();
        let old_max = creature.max_hp();
        // 10³ = 1000, 12³ = 1728: 728 reaches 12 with 10 left over.
        let outcome = grant_experience(&creature, 738, &catalog, 100).unwrap();

        assert_eq!(outcome.creature.level, 12);
        assert_eq!(outcome.creature.experience, 10);
        let delta = outcome.creature.max_hp() - old_max;
        assert_eq!(outcome.creature.current_hp(), 5 + delta);
    }

    #[test]
    fn learnset_moves_are_taught_per_level() {
        let catalog = Catalog::builtin().unwrap();
        let creature = TestCreatureBuilder::new(SpeciesId::Cindrake, 19)
            .with_moves(vec![MoveId::Scratch, MoveId::Tackle, MoveId::Ember, MoveId::FireFang])
            .build();
        let outcome = grant_experience(&creature, 8000 - 6859, &catalog, 100).unwrap();

        assert_eq!(outcome.creature.level, 20);
        assert_eq!(
            outcome.learned,
            vec![LearnedMove {
                move_id: MoveId::Flamethrower,
                level: 20,
                outcome: LearnOutcome::Replaced { forgotten: MoveId::Scratch },
            }]
        );
    }

    #[test]
    fn level_cap_discards_extra_experience() {
        let catalog = Catalog::builtin().unwrap();
        let creature = TestCreatureBuilder::new(SpeciesId::Pebblit, 99).build();
        let outcome = grant_experience(&creature, 1_000_000, &catalog, 100).unwrap();
        assert_eq!(outcome.creature.level, 100);
        assert_eq!(outcome.creature.experience, 0);
        assert_eq!(outcome.levels_gained, 1);
    }

    #[test]
    fn configured_cap_is_respected() {
        let catalog = Catalog::builtin().unwrap();
        let creature = TestCreatureBuilder::new(SpeciesId::Pebblit, 50).build();
        let outcome = grant_experience(&creature, 1_000_000, &catalog, 50).unwrap();
        assert_eq!(outcome.creature.level, 50);
        assert_eq!(outcome.levels_gained, 0);
    }
}
