//! Move selection for the environment side of a local battle.

use crate::battle::damage::{weather_power, STAB_MULTIPLIER};
use crate::battle::engine::RoundAction;
use crate::battle::state::{Arena, Side};
use crate::catalog::Catalog;
use ordered_float::OrderedFloat;
use schema::{CreatureType, MoveData, SecondaryEffect};

/// A trait for any system that can decide on a battle action.
pub trait Behavior {
    /// Inspects the arena and decides on the next action for `side`.
    fn decide_action(&self, side: Side, arena: &Arena, catalog: &Catalog) -> RoundAction;
}

/// Picks the usable move with the highest expected value against the current target.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoringAI;

impl ScoringAI {
    pub fn new() -> Self {
        Self
    }

    fn score_move(&self, move_data: &MoveData, side: Side, arena: &Arena) -> f64 {
        let attacker = arena.active(side);
        let defender = arena.active(side.opponent());

        let mut score = 0.0;
        if move_data.is_damaging() {
            let effectiveness = CreatureType::effectiveness_against(move_data.move_type, &defender.types) as f64;
            let stab = if attacker.has_type(move_data.move_type) { STAB_MULTIPLIER } else { 1.0 };
            let power = weather_power(move_data.power, move_data.move_type, arena.weather.kind);
            score += power * effectiveness * stab;
        }

        for effect in &move_data.effects {
            match effect {
                SecondaryEffect::InflictStatus { status, chance } => {
                    if defender.status.is_none() && !status.blocked_by(&defender.types) {
                        score += 40.0 * (*chance as f64) / 100.0;
                    }
                }
                SecondaryEffect::SetWeather { weather, .. } => {
                    if arena.weather.kind != *weather {
                        score += 30.0;
                    }
                }
                SecondaryEffect::Recoil { .. } => {}
            }
        }
        score
    }
}

impl Behavior for ScoringAI {
    fn decide_action(&self, side: Side, arena: &Arena, catalog: &Catalog) -> RoundAction {
        let attacker = arena.active(side);
        attacker
            .moves
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.has_uses())
            .filter_map(|(index, slot)| {
                let data = catalog.move_data(slot.move_id).ok()?;
                Some((index, self.score_move(data, side, arena)))
            })
            // Ties go to the earliest slot.
            .max_by_key(|(index, score)| (OrderedFloat(*score), std::cmp::Reverse(*index)))
            .map(|(move_index, _)| RoundAction::UseMove { move_index })
            .unwrap_or_else(|| {
                // Out of uses everywhere: any move choice resolves as Struggle.
                if attacker.moves.is_empty() {
                    RoundAction::Pass
                } else {
                    RoundAction::UseMove { move_index: 0 }
                }
            })
    }
}
