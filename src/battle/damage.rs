use crate::battle::rng::BattleRng;
use crate::creature::Creature;
use schema::{CreatureType, MoveCategory, MoveData, StatusCondition, WeatherKind};

pub const CRITICAL_MULTIPLIER: f64 = 1.5;
pub const STAB_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    pub critical: bool,
    /// Product of the type chart over every defender type.
    pub effectiveness: f32,
    /// Move power after weather modifiers.
    pub effective_power: f64,
}

impl DamageOutcome {
    fn none() -> Self {
        Self { damage: 0, critical: false, effectiveness: 1.0, effective_power: 0.0 }
    }
}

/// Move power after sun or rain boosts and dampens fire and water moves.
pub fn weather_power(power: u16, move_type: CreatureType, weather: WeatherKind) -> f64 {
    let power = power as f64;
    match (weather, move_type) {
        (WeatherKind::Sun, CreatureType::Fire) | (WeatherKind::Rain, CreatureType::Water) => power * 1.5,
        (WeatherKind::Sun, CreatureType::Water) | (WeatherKind::Rain, CreatureType::Fire) => power * 0.5,
        _ => power,
    }
}

/// Attack and defense values a move of `category` pits against each other.
fn battle_stats(attacker: &Creature, defender: &Creature, category: MoveCategory) -> (f64, f64) {
    let (attack, defense) = match category {
        MoveCategory::Physical => (attacker.stats.attack, defender.stats.defense),
        _ => (attacker.stats.special_attack, defender.stats.special_defense),
    };
    let mut attack = attack as f64;
    if category == MoveCategory::Physical && attacker.status == Some(StatusCondition::Burn) {
        attack /= 2.0;
    }
    (attack, (defense as f64).max(1.0))
}

/// Resolve the damage a single hit deals. Status moves deal nothing and consume no randomness.
/// Damaging moves always draw the critical roll first, then the random factor.
pub fn resolve_damage(
    attacker: &Creature,
    defender: &Creature,
    move_data: &MoveData,
    weather: WeatherKind,
    rng: &mut dyn BattleRng,
) -> DamageOutcome {
    if !move_data.is_damaging() {
        return DamageOutcome::none();
    }

    let (attack, defense) = battle_stats(attacker, defender, move_data.category);
    let power = weather_power(move_data.power, move_data.move_type, weather);
    let level = attacker.level as f64;
    let base = ((2.0 * level / 5.0 + 2.0) * power * attack / defense) / 50.0 + 2.0;

    let critical = rng.one_in(16, "critical hit");
    let crit = if critical { CRITICAL_MULTIPLIER } else { 1.0 };
    let random = rng.range_inclusive(85, 100, "damage roll") as f64 / 100.0;
    let stab = if attacker.has_type(move_data.move_type) { STAB_MULTIPLIER } else { 1.0 };
    let effectiveness = CreatureType::effectiveness_against(move_data.move_type, &defender.types);

    let damage = (base * crit * random * stab * effectiveness as f64).floor();
    DamageOutcome {
        damage: damage.clamp(0.0, u16::MAX as f64) as u16,
        critical,
        effectiveness,
        effective_power: power,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::rng::TurnRng;
    use crate::battle::tests::common::{move_data, TestCreatureBuilder};
    use rstest::rstest;
    use schema::{MoveId, SpeciesId};

    #[rstest]
    #[case(WeatherKind::Sun, CreatureType::Fire, 135.0)]
    #[case(WeatherKind::Sun, CreatureType::Water, 45.0)]
    #[case(WeatherKind::Rain, CreatureType::Water, 135.0)]
    #[case(WeatherKind::Rain, CreatureType::Fire, 45.0)]
    #[case(WeatherKind::Sandstorm, CreatureType::Fire, 90.0)]
    #[case(WeatherKind::Clear, CreatureType::Grass, 90.0)]
    fn weather_scales_power(#[case] weather: WeatherKind, #[case] move_type: CreatureType, #[case] expected: f64) {
        assert_eq!(weather_power(90, move_type, weather), expected);
    }

    #[test]
    fn sun_effective_power_reported_by_resolver() {
        let attacker = TestCreatureBuilder::new(SpeciesId::Cindrake, 20).build();
        let defender = TestCreatureBuilder::new(SpeciesId::Sproutling, 20).build();
        let mut rng = TurnRng::new_for_test(vec![100, 100, 100, 100]);

        let fire = resolve_damage(&attacker, &defender, &move_data(MoveId::Flamethrower), WeatherKind::Sun, &mut rng);
        assert_eq!(fire.effective_power, 90.0 * 1.5);
        let water = resolve_damage(&attacker, &defender, &move_data(MoveId::WaterGun), WeatherKind::Sun, &mut rng);
        assert_eq!(water.effective_power, 40.0 * 0.5);
    }

    #[test]
    fn status_moves_deal_nothing_and_roll_nothing() {
        let attacker = TestCreatureBuilder::new(SpeciesId::Voltmouse, 20).build();
        let defender = TestCreatureBuilder::new(SpeciesId::Shellpup, 20).build();
        let mut rng = TurnRng::new_for_test(vec![]);
        let outcome = resolve_damage(&attacker, &defender, &move_data(MoveId::ThunderWave), WeatherKind::Clear, &mut rng);
        assert_eq!(outcome.damage, 0);
        assert_eq!(outcome.effectiveness, 1.0);
        assert!(!outcome.critical);
    }

    #[test]
    fn damage_formula_with_max_roll() {
        // L16 Cindrake (spa 29) Ember into a rock type: STAB and a resisted hit.
        let attacker = TestCreatureBuilder::new(SpeciesId::Cindrake, 16).build();
        let defender = TestCreatureBuilder::new(SpeciesId::Pebblit, 16).build();
        let mut rng = TurnRng::new_for_test(vec![100, 100]);
        let outcome = resolve_damage(&attacker, &defender, &move_data(MoveId::Ember), WeatherKind::Clear, &mut rng);

        let spd = defender.stats.special_defense as f64;
        let base = ((2.0 * 16.0 / 5.0 + 2.0) * 40.0 * 29.0 / spd) / 50.0 + 2.0;
        let expected = (base * 1.0 * 1.0 * 1.5 * 0.5).floor() as u16;
        assert!(!outcome.critical);
        assert_eq!(outcome.effectiveness, 0.5);
        assert_eq!(outcome.damage, expected);
    }

    #[test]
    fn critical_hit_multiplies_damage() {
        let attacker = TestCreatureBuilder::new(SpeciesId::Gustling, 30).build();
        let defender = TestCreatureBuilder::new(SpeciesId::Toxitoad, 30).build();
        let tackle = move_data(MoveId::Tackle);

        let mut plain = TurnRng::new_for_test(vec![100, 100]);
        let mut crit = TurnRng::new_for_test(vec![1, 100]);
        let normal = resolve_damage(&attacker, &defender, &tackle, WeatherKind::Clear, &mut plain);
        let critical = resolve_damage(&attacker, &defender, &tackle, WeatherKind::Clear, &mut crit);

        assert!(critical.critical);
        assert!(critical.damage > normal.damage);
    }

    #[test]
    fn burn_halves_physical_attack_only() {
        let healthy = TestCreatureBuilder::new(SpeciesId::Pebblit, 40).build();
        let burned = TestCreatureBuilder::new(SpeciesId::Pebblit, 40)
            .with_status(StatusCondition::Burn)
            .build();
        let defender = TestCreatureBuilder::new(SpeciesId::Toxitoad, 40).build();

        let physical = move_data(MoveId::Tackle);
        let a = resolve_damage(&healthy, &defender, &physical, WeatherKind::Clear, &mut TurnRng::new_for_test(vec![100, 100]));
        let b = resolve_damage(&burned, &defender, &physical, WeatherKind::Clear, &mut TurnRng::new_for_test(vec![100, 100]));
        assert!(b.damage < a.damage);

        let special = move_data(MoveId::MudSlap);
        let c = resolve_damage(&healthy, &defender, &special, WeatherKind::Clear, &mut TurnRng::new_for_test(vec![100, 100]));
        let d = resolve_damage(&burned, &defender, &special, WeatherKind::Clear, &mut TurnRng::new_for_test(vec![100, 100]));
        assert_eq!(c.damage, d.damage);
    }

    #[test]
    fn immune_defender_takes_zero() {
        let attacker = TestCreatureBuilder::new(SpeciesId::Voltmouse, 20).build();
        let defender = TestCreatureBuilder::new(SpeciesId::Pebblit, 20).build();
        let mut rng = TurnRng::new_for_test(vec![100, 100]);
        let outcome = resolve_damage(&attacker, &defender, &move_data(MoveId::Thunderbolt), WeatherKind::Clear, &mut rng);
        assert_eq!(outcome.effectiveness, 0.0);
        assert_eq!(outcome.damage, 0);
    }
}
