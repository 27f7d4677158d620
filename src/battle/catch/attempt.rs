use crate::battle::catch::calculation::{roll_capture, CaptureRoll};
use crate::battle::rng::BattleRng;
use crate::catalog::Catalog;
use crate::creature::Creature;
use crate::errors::BattleResult;
use schema::Item;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureAttempt {
    pub roll: CaptureRoll,
    /// The fully restored creature when the capture succeeded.
    pub captured: Option<Creature>,
}

/// Throw `device` at `target`. Validation is the caller's job.
pub fn attempt_capture(
    target: &Creature,
    device: Item,
    catalog: &Catalog,
    rng: &mut dyn BattleRng,
) -> BattleResult<CaptureAttempt> {
    let catch_rate = catalog.species(target.species)?.catch_rate;
    let roll = roll_capture(catch_rate, target.hp_ratio(), device, rng);
    info!(
        species = %target.species,
        device = %device,
        chance = roll.chance,
        success = roll.success,
        "capture attempted"
    );
    let captured = roll.success.then(|| {
        let mut creature = target.clone();
        creature.restore_fully();
        creature
    });
    Ok(CaptureAttempt { roll, captured })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::rng::TurnRng;
    use crate::battle::tests::common::TestCreatureBuilder;
    use schema::{SpeciesId, StatusCondition};

    #[test]
    fn captured_creature_is_fully_restored() {
        let catalog = Catalog::builtin().unwrap();
        let mut target = TestCreatureBuilder::new(SpeciesId::Pebblit, 7)
            .with_hp(3)
            .with_status(StatusCondition::Sleep)
            .build();
        target.moves[0].uses = 0;

        let attempt = attempt_capture(&target, Item::GuaranteedCapsule, &catalog, &mut TurnRng::new_for_test(vec![])).unwrap();
        let captured = attempt.captured.unwrap();
        assert_eq!(captured.current_hp(), captured.max_hp());
        assert_eq!(captured.status, None);
        assert!(captured.moves.iter().all(|m| m.uses == m.max_uses));
        assert_eq!(captured.id, target.id);
    }

    #[test]
    fn failed_capture_returns_nothing() {
        let catalog = Catalog::builtin().unwrap();
        let target = TestCreatureBuilder::new(SpeciesId::Cindrake, 30).build();
        let attempt = attempt_capture(&target, Item::StandardCapsule, &catalog, &mut TurnRng::new_for_test(vec![100])).unwrap();
        assert!(!attempt.roll.success);
        assert!(attempt.captured.is_none());
    }
}
