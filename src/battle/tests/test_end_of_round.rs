#[cfg(test)]
mod tests {
    use crate::battle::engine::{resolve_round, EndReason, RoundAction, RoundOutcome};
    use crate::battle::rng::TurnRng;
    use crate::battle::state::{Arena, BattleEvent, Side, Weather};
    use crate::battle::tests::common::{create_test_arena, TestCreatureBuilder};
    use crate::catalog::Catalog;
    use crate::config::BattleRules;
    use pretty_assertions::assert_eq;
    use schema::{SpeciesId, StatusCondition, WeatherKind};

    const PASS: [RoundAction; 2] = [RoundAction::Pass, RoundAction::Pass];

    fn idle_round(arena: &Arena, rules: &BattleRules) -> crate::battle::engine::RoundResolution {
        let catalog = Catalog::builtin().unwrap();
        let mut rng = TurnRng::new_for_test(vec![]);
        resolve_round(arena, PASS, 1, &catalog, rules, &mut rng).unwrap()
    }

    fn arena_in(weather: WeatherKind, turns: u8, p1: SpeciesId, p2: SpeciesId) -> Arena {
        let mut arena = create_test_arena(
            TestCreatureBuilder::new(p1, 30).build(),
            TestCreatureBuilder::new(p2, 30).build(),
        );
        arena.weather = Weather { kind: weather, turns_remaining: turns };
        arena
    }

    #[test]
    fn test_sandstorm_chips_non_immune_creatures() {
        let arena = arena_in(WeatherKind::Sandstorm, 3, SpeciesId::Cindrake, SpeciesId::Pebblit);
        let cindrake_max = arena.active(Side::Player1).max_hp();
        let result = idle_round(&arena, &BattleRules::default());

        assert_eq!(result.arena.weather.turns_remaining, 2);
        assert_eq!(result.arena.active(Side::Player1).current_hp(), cindrake_max - cindrake_max / 16);
        assert_eq!(
            result.arena.active(Side::Player2).current_hp(),
            result.arena.active(Side::Player2).max_hp(),
            "rock and ground types shrug off sand"
        );
        let chip: Vec<&BattleEvent> = result
            .events
            .events()
            .iter()
            .filter(|e| matches!(e, BattleEvent::WeatherDamage { .. }))
            .collect();
        assert_eq!(chip.len(), 1);
    }

    #[test]
    fn test_hail_spares_ice_types() {
        let arena = arena_in(WeatherKind::Hail, 3, SpeciesId::Frostfin, SpeciesId::Gustling);
        let result = idle_round(&arena, &BattleRules::default());

        let p1 = result.arena.active(Side::Player1);
        let p2 = result.arena.active(Side::Player2);
        assert_eq!(p1.current_hp(), p1.max_hp());
        assert_eq!(p2.current_hp(), p2.max_hp() - p2.max_hp() / 16);
    }

    #[test]
    fn test_chip_damage_can_be_disabled() {
        let arena = arena_in(WeatherKind::Sandstorm, 3, SpeciesId::Cindrake, SpeciesId::Gustling);
        let rules = BattleRules { weather_chip_damage: false, ..BattleRules::default() };
        let result = idle_round(&arena, &rules);

        for side in Side::BOTH {
            let creature = result.arena.active(side);
            assert_eq!(creature.current_hp(), creature.max_hp());
        }
        assert_eq!(result.arena.weather.turns_remaining, 2);
    }

    #[test]
    fn test_weather_clears_when_duration_runs_out() {
        let arena = arena_in(WeatherKind::Sandstorm, 1, SpeciesId::Cindrake, SpeciesId::Gustling);
        let result = idle_round(&arena, &BattleRules::default());

        assert!(result.arena.weather.is_clear());
        assert!(result
            .events
            .events()
            .contains(&BattleEvent::WeatherEnded { weather: WeatherKind::Sandstorm }));
        let p1 = result.arena.active(Side::Player1);
        assert_eq!(p1.current_hp(), p1.max_hp(), "no chip on the round the weather ends");
    }

    #[test]
    fn test_sun_and_rain_never_chip() {
        let arena = arena_in(WeatherKind::Rain, 4, SpeciesId::Cindrake, SpeciesId::Gustling);
        let result = idle_round(&arena, &BattleRules::default());
        for side in Side::BOTH {
            let creature = result.arena.active(side);
            assert_eq!(creature.current_hp(), creature.max_hp());
        }
    }

    #[test]
    fn test_poison_and_burn_deal_an_eighth() {
        let p1 = TestCreatureBuilder::new(SpeciesId::Gustling, 40)
            .with_status(StatusCondition::Poison)
            .build();
        let p2 = TestCreatureBuilder::new(SpeciesId::Shellpup, 40)
            .with_status(StatusCondition::Burn)
            .build();
        let (p1_max, p2_max) = (p1.max_hp(), p2.max_hp());
        let result = idle_round(&create_test_arena(p1, p2), &BattleRules::default());

        assert_eq!(result.arena.active(Side::Player1).current_hp(), p1_max - p1_max / 8);
        assert_eq!(result.arena.active(Side::Player2).current_hp(), p2_max - p2_max / 8);
    }

    #[test]
    fn test_sleep_and_paralysis_deal_no_residual_damage() {
        let p1 = TestCreatureBuilder::new(SpeciesId::Gustling, 40)
            .with_status(StatusCondition::Sleep)
            .build();
        let p2 = TestCreatureBuilder::new(SpeciesId::Shellpup, 40)
            .with_status(StatusCondition::Paralysis)
            .build();
        let result = idle_round(&create_test_arena(p1, p2), &BattleRules::default());
        assert!(!result
            .events
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::StatusDamage { .. })));
    }

    #[test]
    fn test_residual_damage_can_end_the_battle() {
        let p1 = TestCreatureBuilder::new(SpeciesId::Gustling, 40)
            .with_status(StatusCondition::Poison)
            .with_hp(1)
            .build();
        let p2 = TestCreatureBuilder::new(SpeciesId::Shellpup, 40).build();
        let result = idle_round(&create_test_arena(p1, p2), &BattleRules::default());

        assert_eq!(
            result.outcome,
            RoundOutcome::Finished { winner: Some(Side::Player2), reason: EndReason::Knockout }
        );
        let tail: Vec<&BattleEvent> = result.events.events().iter().rev().take(2).collect();
        assert_eq!(tail[0], &BattleEvent::BattleEnded { winner: Some(Side::Player2) });
        assert!(matches!(tail[1], BattleEvent::CreatureFainted { side: Side::Player1, .. }));
    }
}
