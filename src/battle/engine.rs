//! The per-round resolution algorithm shared by local sessions and PvP battles.
//!
//! Everything here is a pure transform: it takes an [`Arena`] by reference and returns a
//! new one alongside the narrated events. Randomness only enters through [`BattleRng`].

use crate::battle::damage::resolve_damage;
use crate::battle::rng::BattleRng;
use crate::battle::state::{ActionFailureReason, Arena, BattleEvent, EventBus, Side, Weather};
use crate::battle::stats::effective_speed;
use crate::catalog::Catalog;
use crate::config::BattleRules;
use crate::errors::{BattleResult, StateError, ValidationError};
use schema::{MoveCategory, MoveData, MoveId, SecondaryEffect, StatusCondition};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// What one side does in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundAction {
    UseMove { move_index: usize },
    Switch { team_index: usize },
    /// The side spent its turn outside the arena (an item, a failed capture).
    Pass,
    Forfeit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Knockout,
    Forfeit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Ongoing,
    /// These sides must replace a fainted active creature before the next round.
    NeedsReplacement(Vec<Side>),
    Finished { winner: Option<Side>, reason: EndReason },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundResolution {
    pub arena: Arena,
    pub events: EventBus,
    pub outcome: RoundOutcome,
}

/// Check that `action` is legal for `side` in the current arena.
pub fn validate_action(arena: &Arena, side: Side, action: RoundAction) -> BattleResult<()> {
    let battle_side = arena.side(side);
    match action {
        RoundAction::UseMove { move_index } => {
            let active = battle_side.active_creature();
            if active.is_fainted() {
                return Err(StateError::SwitchRequired.into());
            }
            // With every move spent, any move choice becomes Struggle.
            if !active.has_usable_move() {
                return Ok(());
            }
            let slot = active
                .moves
                .get(move_index)
                .ok_or(ValidationError::InvalidMoveIndex { index: move_index })?;
            if !slot.has_uses() {
                return Err(ValidationError::NoUsesRemaining { move_id: slot.move_id }.into());
            }
            Ok(())
        }
        RoundAction::Switch { team_index } => battle_side.validate_switch_target(team_index),
        RoundAction::Pass | RoundAction::Forfeit => Ok(()),
    }
}

/// Resolve one full round. Both actions are validated first; an invalid action
/// leaves nothing changed.
pub fn resolve_round(
    arena: &Arena,
    actions: [RoundAction; 2],
    round: u32,
    catalog: &Catalog,
    rules: &BattleRules,
    rng: &mut dyn BattleRng,
) -> BattleResult<RoundResolution> {
    for side in Side::BOTH {
        validate_action(arena, side, actions[side.index()])?;
    }

    let mut next = arena.clone();
    let mut bus = EventBus::new();
    bus.push(BattleEvent::RoundStarted { round });

    let forfeits: Vec<Side> = Side::BOTH
        .into_iter()
        .filter(|side| actions[side.index()] == RoundAction::Forfeit)
        .collect();
    if !forfeits.is_empty() {
        for side in &forfeits {
            bus.push(BattleEvent::Forfeited { side: *side });
        }
        let winner = match forfeits.as_slice() {
            [only] => Some(only.opponent()),
            _ => None,
        };
        bus.push(BattleEvent::BattleEnded { winner });
        return Ok(RoundResolution {
            arena: next,
            events: bus,
            outcome: RoundOutcome::Finished { winner, reason: EndReason::Forfeit },
        });
    }

    let order = determine_action_order(&next, &actions, catalog, rng);
    for side in order {
        match actions[side.index()] {
            RoundAction::Switch { team_index } => execute_switch(&mut next, side, team_index, &mut bus),
            RoundAction::UseMove { move_index } => {
                execute_move(&mut next, side, move_index, catalog, rules, rng, &mut bus)?
            }
            RoundAction::Pass | RoundAction::Forfeit => {}
        }
    }

    execute_end_of_round(&mut next, rules, &mut bus);
    let outcome = check_win_conditions(&next, &mut bus);
    debug!(round, ?outcome, events = bus.len(), "round resolved");

    Ok(RoundResolution { arena: next, events: bus, outcome })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActionPriority {
    action_priority: i8, // Switch: 6, everything else 0
    move_priority: i8,   // Only relevant for moves
}

fn calculate_action_priority(arena: &Arena, side: Side, action: RoundAction, catalog: &Catalog) -> ActionPriority {
    match action {
        RoundAction::Switch { .. } => ActionPriority { action_priority: 6, move_priority: 0 },
        RoundAction::UseMove { move_index } => {
            let move_priority = arena
                .active(side)
                .moves
                .get(move_index)
                .and_then(|slot| catalog.move_data(slot.move_id).ok())
                .map(|data| data.priority)
                .unwrap_or(0);
            ActionPriority { action_priority: 0, move_priority }
        }
        RoundAction::Pass | RoundAction::Forfeit => ActionPriority { action_priority: 0, move_priority: 0 },
    }
}

/// Order in which the two sides act: switches first, then higher move priority, then
/// higher effective speed. Two moves tied on both are settled by a coin flip.
pub fn determine_action_order(
    arena: &Arena,
    actions: &[RoundAction; 2],
    catalog: &Catalog,
    rng: &mut dyn BattleRng,
) -> [Side; 2] {
    const PLAYER1_FIRST: [Side; 2] = [Side::Player1, Side::Player2];
    const PLAYER2_FIRST: [Side; 2] = [Side::Player2, Side::Player1];

    let p1 = calculate_action_priority(arena, Side::Player1, actions[0], catalog);
    let p2 = calculate_action_priority(arena, Side::Player2, actions[1], catalog);

    let priority_cmp = p1
        .action_priority
        .cmp(&p2.action_priority)
        .then(p1.move_priority.cmp(&p2.move_priority));
    match priority_cmp {
        Ordering::Greater => return PLAYER1_FIRST,
        Ordering::Less => return PLAYER2_FIRST,
        Ordering::Equal => {}
    }

    let both_moves = matches!(
        actions,
        [RoundAction::UseMove { .. }, RoundAction::UseMove { .. }]
    );
    if !both_moves {
        return PLAYER1_FIRST;
    }

    let speed1 = effective_speed(arena.active(Side::Player1));
    let speed2 = effective_speed(arena.active(Side::Player2));
    match speed1.cmp(&speed2) {
        Ordering::Greater => PLAYER1_FIRST,
        Ordering::Less => PLAYER2_FIRST,
        Ordering::Equal => {
            if rng.coin_flip("speed tie") {
                PLAYER1_FIRST
            } else {
                PLAYER2_FIRST
            }
        }
    }
}

fn execute_switch(arena: &mut Arena, side: Side, team_index: usize, bus: &mut EventBus) {
    let battle_side = arena.side_mut(side);
    let from = battle_side.active_creature().display_name();
    battle_side.active = team_index;
    let to = battle_side.active_creature().display_name();
    bus.push(BattleEvent::CreatureSwitched { side, from, to });
}

/// Sleep, freeze and paralysis checks. Returns true when the creature may act.
fn check_action_preventing_conditions(
    arena: &mut Arena,
    side: Side,
    rng: &mut dyn BattleRng,
    bus: &mut EventBus,
) -> bool {
    let creature = arena.active_mut(side);
    let name = creature.display_name();
    let (status, recover_chance, failure) = match creature.status {
        Some(StatusCondition::Sleep) => (StatusCondition::Sleep, 33, ActionFailureReason::FastAsleep),
        Some(StatusCondition::Freeze) => (StatusCondition::Freeze, 20, ActionFailureReason::FrozenSolid),
        Some(StatusCondition::Paralysis) => {
            if rng.chance(25, "full paralysis") {
                bus.push(BattleEvent::ActionFailed {
                    side,
                    creature: name,
                    reason: ActionFailureReason::FullyParalyzed,
                });
                return false;
            }
            return true;
        }
        _ => return true,
    };

    let reason = match status {
        StatusCondition::Sleep => "wake up",
        _ => "thaw",
    };
    if rng.chance(recover_chance, reason) {
        creature.status = None;
        bus.push(BattleEvent::StatusRemoved { side, creature: name, status });
        true
    } else {
        bus.push(BattleEvent::ActionFailed { side, creature: name, reason: failure });
        false
    }
}

fn execute_move(
    arena: &mut Arena,
    side: Side,
    move_index: usize,
    catalog: &Catalog,
    rules: &BattleRules,
    rng: &mut dyn BattleRng,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let target_side = side.opponent();
    if arena.active(side).is_fainted() || arena.active(target_side).is_fainted() {
        return Ok(());
    }
    if !check_action_preventing_conditions(arena, side, rng, bus) {
        return Ok(());
    }

    let attacker = arena.active_mut(side);
    let move_id = if attacker.has_usable_move() {
        let slot = &mut attacker.moves[move_index];
        slot.uses = slot.uses.saturating_sub(1);
        slot.move_id
    } else {
        MoveId::Struggle
    };
    let move_data = catalog.move_data(move_id)?;
    let attacker_name = attacker.display_name();
    bus.push(BattleEvent::MoveUsed { side, creature: attacker_name.clone(), move_id: move_data.id });

    if let Some(accuracy) = move_data.accuracy {
        if accuracy < 100 && !rng.chance(accuracy, "accuracy") {
            bus.push(BattleEvent::MoveMissed { side, creature: attacker_name });
            return Ok(());
        }
    }

    if move_data.is_damaging() {
        let outcome = resolve_damage(
            arena.active(side),
            arena.active(target_side),
            move_data,
            arena.weather.kind,
            rng,
        );
        if outcome.effectiveness == 0.0 {
            bus.push(BattleEvent::AttackTypeEffectiveness { multiplier: 0.0 });
            return Ok(());
        }
        if outcome.critical {
            bus.push(BattleEvent::CriticalHit);
        }
        if outcome.effectiveness != 1.0 {
            bus.push(BattleEvent::AttackTypeEffectiveness { multiplier: outcome.effectiveness });
        }

        let defender = arena.active_mut(target_side);
        let dealt = defender.take_damage(outcome.damage);
        let defender_name = defender.display_name();
        bus.push(BattleEvent::DamageDealt {
            side: target_side,
            creature: defender_name.clone(),
            damage: dealt,
            remaining_hp: defender.current_hp(),
        });
        if defender.is_fainted() {
            bus.push(BattleEvent::CreatureFainted { side: target_side, creature: defender_name });
        }
        apply_recoil(arena, side, move_data, dealt, bus);
    }

    apply_secondary_effects(arena, target_side, move_data, rules, rng, bus);
    Ok(())
}

fn apply_recoil(arena: &mut Arena, side: Side, move_data: &MoveData, dealt: u16, bus: &mut EventBus) {
    if dealt == 0 {
        return;
    }
    for effect in &move_data.effects {
        let SecondaryEffect::Recoil { percent } = effect else { continue };
        let attacker = arena.active_mut(side);
        if attacker.is_fainted() {
            return;
        }
        let recoil = ((dealt as u32 * *percent as u32) / 100).max(1) as u16;
        let taken = attacker.take_damage(recoil);
        let name = attacker.display_name();
        bus.push(BattleEvent::DamageDealt { side, creature: name.clone(), damage: taken, remaining_hp: attacker.current_hp() });
        if attacker.is_fainted() {
            bus.push(BattleEvent::CreatureFainted { side, creature: name });
        }
    }
}

fn apply_secondary_effects(
    arena: &mut Arena,
    target_side: Side,
    move_data: &MoveData,
    rules: &BattleRules,
    rng: &mut dyn BattleRng,
    bus: &mut EventBus,
) {
    let primary = move_data.category == MoveCategory::Status;
    for effect in &move_data.effects {
        match effect {
            SecondaryEffect::InflictStatus { status, chance } => {
                let target = arena.active_mut(target_side);
                if target.is_fainted() {
                    continue;
                }
                if target.status.is_some() || status.blocked_by(&target.types) {
                    if primary {
                        bus.push(BattleEvent::StatusFailed { side: target_side, creature: target.display_name() });
                    }
                    continue;
                }
                if *chance < 100 && !rng.chance(*chance, "secondary status") {
                    continue;
                }
                target.status = Some(*status);
                bus.push(BattleEvent::StatusApplied {
                    side: target_side,
                    creature: target.display_name(),
                    status: *status,
                });
            }
            SecondaryEffect::SetWeather { weather, turns } => {
                let turns = if *turns == 0 { rules.weather_turns } else { *turns };
                arena.weather = Weather { kind: *weather, turns_remaining: turns };
                bus.push(BattleEvent::WeatherStarted { weather: *weather, turns });
            }
            // Applied alongside the damage that caused it.
            SecondaryEffect::Recoil { .. } => {}
        }
    }
}

/// Weather countdown and chip damage, then burn and poison damage.
pub fn execute_end_of_round(arena: &mut Arena, rules: &BattleRules, bus: &mut EventBus) {
    if !arena.weather.is_clear() {
        let kind = arena.weather.kind;
        arena.weather.turns_remaining = arena.weather.turns_remaining.saturating_sub(1);
        if arena.weather.turns_remaining == 0 {
            arena.weather = Weather::clear();
            bus.push(BattleEvent::WeatherEnded { weather: kind });
        } else {
            bus.push(BattleEvent::WeatherContinues { weather: kind });
            if rules.weather_chip_damage && kind.deals_chip_damage() {
                for side in Side::BOTH {
                    let creature = arena.active_mut(side);
                    if creature.is_fainted() || kind.chip_immune_types().iter().any(|t| creature.has_type(*t)) {
                        continue;
                    }
                    let damage = creature.take_damage(creature.max_hp() / 16);
                    if damage == 0 {
                        continue;
                    }
                    let name = creature.display_name();
                    bus.push(BattleEvent::WeatherDamage {
                        side,
                        creature: name.clone(),
                        weather: kind,
                        damage,
                        remaining_hp: creature.current_hp(),
                    });
                    if creature.is_fainted() {
                        bus.push(BattleEvent::CreatureFainted { side, creature: name });
                    }
                }
            }
        }
    }

    for side in Side::BOTH {
        let creature = arena.active_mut(side);
        if creature.is_fainted() {
            continue;
        }
        let status = match creature.status {
            Some(status) if status.deals_residual_damage() => status,
            _ => continue,
        };
        let damage = creature.take_damage(creature.max_hp() / 8);
        if damage == 0 {
            continue;
        }
        let name = creature.display_name();
        bus.push(BattleEvent::StatusDamage {
            side,
            creature: name.clone(),
            status,
            damage,
            remaining_hp: creature.current_hp(),
        });
        if creature.is_fainted() {
            bus.push(BattleEvent::CreatureFainted { side, creature: name });
        }
    }
}

/// A side with no creature left standing loses; both at once is a draw.
pub fn check_win_conditions(arena: &Arena, bus: &mut EventBus) -> RoundOutcome {
    let p1_alive = arena.side(Side::Player1).has_remaining();
    let p2_alive = arena.side(Side::Player2).has_remaining();
    let winner = match (p1_alive, p2_alive) {
        (true, true) => {
            let needs: Vec<Side> = Side::BOTH
                .into_iter()
                .filter(|side| arena.active(*side).is_fainted())
                .collect();
            if needs.is_empty() {
                return RoundOutcome::Ongoing;
            }
            return RoundOutcome::NeedsReplacement(needs);
        }
        (true, false) => Some(Side::Player1),
        (false, true) => Some(Side::Player2),
        (false, false) => None,
    };
    bus.push(BattleEvent::BattleEnded { winner });
    RoundOutcome::Finished { winner, reason: EndReason::Knockout }
}

/// Send in a replacement for a fainted active creature. Does not consume a round.
pub fn apply_replacement(arena: &Arena, side: Side, team_index: usize) -> BattleResult<(Arena, EventBus)> {
    let battle_side = arena.side(side);
    if !battle_side.active_creature().is_fainted() {
        return Err(StateError::NoReplacementNeeded.into());
    }
    battle_side.validate_switch_target(team_index)?;

    let mut next = arena.clone();
    let mut bus = EventBus::new();
    let battle_side = next.side_mut(side);
    battle_side.active = team_index;
    bus.push(BattleEvent::CreatureSentOut { side, creature: battle_side.active_creature().display_name() });
    Ok((next, bus))
}

/// Sides whose fainted active creature must be replaced before the next round.
pub fn pending_replacements(arena: &Arena) -> Vec<Side> {
    Side::BOTH
        .into_iter()
        .filter(|side| arena.side(*side).needs_replacement())
        .collect()
}
