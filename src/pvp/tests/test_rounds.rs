#[cfg(test)]
mod tests {
    use crate::battle::state::BattleEvent;
    use crate::errors::{BattleError, StateError, ValidationError};
    use crate::pvp::record::{BattleStatus, FinishReason, SubmittedAction};
    use crate::pvp::tests::common::{relaxed_config, Fixture, ASH, BROCK, ERIKA, MISTY, SABRINA};
    use pretty_assertions::assert_eq;
    use std::sync::Barrier;

    const TACKLE: SubmittedAction = SubmittedAction::Move { move_index: 0 };

    #[test]
    fn test_round_waits_for_both_submissions() {
        let fixture = Fixture::with_config(relaxed_config());
        let battle_id = fixture.active_battle(ASH, MISTY);

        let view = fixture.coordinator.submit_action(ASH, battle_id, TACKLE).unwrap();
        assert_eq!(view.round, 1);
        assert!(view.players[0].submitted);
        assert!(view.last_events.is_empty());

        // The opponent sees that a choice exists, never which one.
        let theirs = fixture.coordinator.state(MISTY, battle_id).unwrap();
        assert!(theirs.players[0].submitted);
        assert!(!theirs.players[1].submitted);
    }

    #[test]
    fn test_resubmitting_replaces_the_pending_choice() {
        let fixture = Fixture::with_config(relaxed_config());
        let battle_id = fixture.active_battle(ASH, MISTY);

        fixture.coordinator.submit_action(ASH, battle_id, TACKLE).unwrap();
        let view = fixture
            .coordinator
            .submit_action(ASH, battle_id, SubmittedAction::Move { move_index: 1 })
            .unwrap();
        assert_eq!(view.round, 1, "a second submission from the same side never resolves the round");

        let view = fixture.coordinator.submit_action(MISTY, battle_id, TACKLE).unwrap();
        assert_eq!(view.round, 2);
        assert!(view.last_events.iter().any(|event| matches!(
            event,
            BattleEvent::MoveUsed { move_id: schema::MoveId::RockThrow, .. }
        )));
    }

    #[test]
    fn test_knockout_forces_a_switch_before_the_next_round() {
        let fixture = Fixture::with_config(relaxed_config());
        let battle_id = fixture.active_battle(ASH, MISTY);

        fixture.coordinator.submit_action(ASH, battle_id, TACKLE).unwrap();
        let view = fixture.coordinator.submit_action(MISTY, battle_id, TACKLE).unwrap();
        assert_eq!(view.status, BattleStatus::Active);
        assert!(view.players[1].must_switch);
        assert!(view.narration.iter().any(|line| line.contains("fainted")));

        let err = fixture.coordinator.submit_action(ASH, battle_id, TACKLE).unwrap_err();
        assert!(matches!(err, BattleError::State(StateError::AwaitingOpponentSwitch)));
        let err = fixture.coordinator.submit_action(MISTY, battle_id, TACKLE).unwrap_err();
        assert!(matches!(err, BattleError::State(StateError::SwitchRequired)));
        let err = fixture
            .coordinator
            .submit_action(MISTY, battle_id, SubmittedAction::Switch { team_index: 0 })
            .unwrap_err();
        assert!(matches!(err, BattleError::State(StateError::SwitchTargetActive { index: 0 })));

        let view = fixture
            .coordinator
            .submit_action(MISTY, battle_id, SubmittedAction::Switch { team_index: 1 })
            .unwrap();
        assert_eq!(view.players[1].active, 1);
        assert!(!view.players[1].must_switch);
        assert_eq!(view.round, 2, "a forced switch does not consume a round");
    }

    #[test]
    fn test_last_knockout_finishes_the_battle() {
        let fixture = Fixture::with_config(relaxed_config());
        let battle_id = fixture.active_battle(ASH, BROCK);

        fixture.coordinator.submit_action(BROCK, battle_id, TACKLE).unwrap();
        let view = fixture.coordinator.submit_action(ASH, battle_id, TACKLE).unwrap();
        assert_eq!(view.status, BattleStatus::Finished);
        assert_eq!(view.winner.as_deref(), Some(ASH));
        assert_eq!(view.finish_reason, Some(FinishReason::Normal));

        let err = fixture.coordinator.submit_action(ASH, battle_id, TACKLE).unwrap_err();
        assert!(matches!(err, BattleError::State(StateError::BattleFinished)));
    }

    #[test]
    fn test_spent_moves_still_allow_a_move_submission() {
        let fixture = Fixture::with_config(relaxed_config());
        let battle_id = fixture.active_battle(ERIKA, SABRINA);

        fixture.coordinator.submit_action(ERIKA, battle_id, TACKLE).unwrap();
        let view = fixture.coordinator.submit_action(SABRINA, battle_id, TACKLE).unwrap();
        assert_eq!(view.round, 2);
        assert!(view.players.iter().all(|player| player.team[0].moves[0].uses == 0));

        fixture.coordinator.submit_action(ERIKA, battle_id, TACKLE).unwrap();
        let view = fixture.coordinator.submit_action(SABRINA, battle_id, TACKLE).unwrap();
        assert_eq!(view.round, 3);
        let struggles = view
            .last_events
            .iter()
            .filter(|event| matches!(event, BattleEvent::MoveUsed { move_id: schema::MoveId::Struggle, .. }))
            .count();
        assert_eq!(struggles, 2);
    }

    #[test]
    fn test_forfeit_and_surrender_hand_the_win_over() {
        let fixture = Fixture::with_config(relaxed_config());
        let battle_id = fixture.active_battle(ASH, MISTY);
        let view = fixture
            .coordinator
            .submit_action(ASH, battle_id, SubmittedAction::Forfeit)
            .unwrap();
        assert_eq!(view.winner.as_deref(), Some(MISTY));
        assert_eq!(view.finish_reason, Some(FinishReason::Surrender));

        let battle_id = fixture.active_battle(ASH, BROCK);
        let view = fixture.coordinator.surrender(BROCK, battle_id).unwrap();
        assert_eq!(view.winner.as_deref(), Some(ASH));
        let err = fixture.coordinator.surrender(ASH, battle_id).unwrap_err();
        assert!(matches!(err, BattleError::State(StateError::BattleFinished)));
    }

    #[test]
    fn test_actions_rejected_before_acceptance_or_when_invalid() {
        let fixture = Fixture::with_config(relaxed_config());
        let battle_id = fixture.coordinator.challenge(ASH, MISTY).unwrap();
        let err = fixture.coordinator.submit_action(ASH, battle_id, TACKLE).unwrap_err();
        assert!(matches!(err, BattleError::State(StateError::NotActive)));
        let err = fixture.coordinator.surrender(ASH, battle_id).unwrap_err();
        assert!(matches!(err, BattleError::State(StateError::NotActive)));

        fixture.coordinator.accept(MISTY, battle_id).unwrap();
        let err = fixture
            .coordinator
            .submit_action(MISTY, battle_id, SubmittedAction::Move { move_index: 3 })
            .unwrap_err();
        assert!(matches!(err, BattleError::Validation(ValidationError::InvalidMoveIndex { index: 3 })));
        let err = fixture
            .coordinator
            .submit_action(MISTY, battle_id, SubmittedAction::Switch { team_index: 0 })
            .unwrap_err();
        assert!(matches!(err, BattleError::State(StateError::SwitchTargetActive { index: 0 })));

        let view = fixture.coordinator.state(MISTY, battle_id).unwrap();
        assert!(!view.players[1].submitted, "rejected submissions leave no trace");
    }

    #[test]
    fn test_simultaneous_submissions_resolve_exactly_once() {
        let fixture = Fixture::with_config(relaxed_config());
        let battle_id = fixture.active_battle(ASH, MISTY);
        let barrier = Barrier::new(2);

        let rounds: Vec<u32> = std::thread::scope(|scope| {
            let handles: Vec<_> = [ASH, MISTY]
                .into_iter()
                .map(|player| {
                    let coordinator = &fixture.coordinator;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        coordinator.submit_action(player, battle_id, TACKLE).unwrap().round
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        // Whichever submission landed second resolved the round.
        let mut sorted = rounds.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2]);
        let view = fixture.coordinator.state(ASH, battle_id).unwrap();
        assert_eq!(view.round, 2);
        assert_eq!(
            view.last_events
                .iter()
                .filter(|event| matches!(event, BattleEvent::RoundStarted { .. }))
                .count(),
            1
        );
    }
}
