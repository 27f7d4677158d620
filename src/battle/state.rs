use crate::creature::Creature;
use crate::errors::{BattleResult, StateError, ValidationError};
use schema::{Item, MoveId, SpeciesId, StatusCondition, WeatherKind};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player1, Side::Player2];

    pub fn index(self) -> usize {
        match self {
            Side::Player1 => 0,
            Side::Player2 => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Weather {
    pub kind: WeatherKind,
    pub turns_remaining: u8,
}

impl Weather {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn is_clear(&self) -> bool {
        self.kind == WeatherKind::Clear
    }
}

/// One participant's half of the field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleSide {
    pub name: String,
    pub team: Vec<Creature>,
    pub active: usize,
}

impl BattleSide {
    pub fn new(name: impl Into<String>, team: Vec<Creature>) -> Self {
        Self { name: name.into(), team, active: 0 }
    }

    pub fn active_creature(&self) -> &Creature {
        &self.team[self.active]
    }

    pub fn active_creature_mut(&mut self) -> &mut Creature {
        &mut self.team[self.active]
    }

    /// True while at least one creature can still fight.
    pub fn has_remaining(&self) -> bool {
        self.team.iter().any(|c| !c.is_fainted())
    }

    /// The active creature fainted but a replacement exists.
    pub fn needs_replacement(&self) -> bool {
        self.active_creature().is_fainted() && self.has_remaining()
    }

    pub fn first_available(&self) -> Option<usize> {
        self.team.iter().position(|c| !c.is_fainted())
    }

    pub fn validate_switch_target(&self, index: usize) -> BattleResult<()> {
        let target = self
            .team
            .get(index)
            .ok_or(ValidationError::InvalidTeamIndex { index })?;
        if index == self.active {
            return Err(StateError::SwitchTargetActive { index }.into());
        }
        if target.is_fainted() {
            return Err(StateError::SwitchTargetFainted { index }.into());
        }
        Ok(())
    }
}

/// The live two-sided state a round is resolved against.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Arena {
    pub sides: [BattleSide; 2],
    pub weather: Weather,
}

impl Arena {
    pub fn new(player1: BattleSide, player2: BattleSide) -> Self {
        Self { sides: [player1, player2], weather: Weather::clear() }
    }

    pub fn side(&self, side: Side) -> &BattleSide {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BattleSide {
        &mut self.sides[side.index()]
    }

    pub fn active(&self, side: Side) -> &Creature {
        self.side(side).active_creature()
    }

    pub fn active_mut(&mut self, side: Side) -> &mut Creature {
        self.side_mut(side).active_creature_mut()
    }
}

/// Why a creature could not act this round.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    FastAsleep,
    FrozenSolid,
    FullyParalyzed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Round management
    RoundStarted {
        round: u32,
    },
    CreatureSwitched {
        side: Side,
        from: String,
        to: String,
    },
    CreatureSentOut {
        side: Side,
        creature: String,
    },
    Forfeited {
        side: Side,
    },

    // Moves
    MoveUsed {
        side: Side,
        creature: String,
        move_id: MoveId,
    },
    MoveMissed {
        side: Side,
        creature: String,
    },
    CriticalHit,
    AttackTypeEffectiveness {
        multiplier: f32,
    },
    DamageDealt {
        side: Side,
        creature: String,
        damage: u16,
        remaining_hp: u16,
    },
    CreatureHealed {
        side: Side,
        creature: String,
        amount: u16,
        new_hp: u16,
    },
    CreatureFainted {
        side: Side,
        creature: String,
    },
    ActionFailed {
        side: Side,
        creature: String,
        reason: ActionFailureReason,
    },

    // Status conditions
    StatusApplied {
        side: Side,
        creature: String,
        status: StatusCondition,
    },
    StatusFailed {
        side: Side,
        creature: String,
    },
    StatusRemoved {
        side: Side,
        creature: String,
        status: StatusCondition,
    },
    StatusDamage {
        side: Side,
        creature: String,
        status: StatusCondition,
        damage: u16,
        remaining_hp: u16,
    },

    // Weather
    WeatherStarted {
        weather: WeatherKind,
        turns: u8,
    },
    WeatherContinues {
        weather: WeatherKind,
    },
    WeatherEnded {
        weather: WeatherKind,
    },
    WeatherDamage {
        side: Side,
        creature: String,
        weather: WeatherKind,
        damage: u16,
        remaining_hp: u16,
    },

    // Items and capture
    ItemUsed {
        side: Side,
        item: Item,
    },
    CaptureAttempted {
        item: Item,
        target: SpeciesId,
    },
    CaptureSucceeded {
        target: SpeciesId,
    },
    CaptureFailed {
        target: SpeciesId,
    },
    Fled,

    // Progression
    ExperienceGained {
        creature: String,
        amount: u32,
    },
    LevelUp {
        creature: String,
        level: u8,
    },
    MoveLearned {
        creature: String,
        move_id: MoveId,
        forgot: Option<MoveId>,
    },
    EvolutionAvailable {
        creature: String,
        into: SpeciesId,
    },
    RewardGranted {
        currency: u32,
        badge: Option<String>,
    },

    BattleEnded {
        winner: Option<Side>,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable line using the arena for side names.
    /// Returns None for silent events.
    pub fn format(&self, arena: &Arena) -> Option<String> {
        let owner = |side: &Side| arena.side(*side).name.clone();
        match self {
            BattleEvent::RoundStarted { round } => Some(format!("=== Round {} ===", round)),
            BattleEvent::CreatureSwitched { side, from, to } => Some(format!(
                "{} recalled {} and sent out {}!",
                owner(side),
                from,
                to
            )),
            BattleEvent::CreatureSentOut { side, creature } => {
                Some(format!("{} sent out {}!", owner(side), creature))
            }
            BattleEvent::Forfeited { side } => Some(format!("{} forfeited the battle!", owner(side))),

            BattleEvent::MoveUsed { side, creature, move_id } => Some(format!(
                "{}'s {} used {}!",
                owner(side),
                creature,
                move_id
            )),
            BattleEvent::MoveMissed { creature, .. } => Some(format!("{}'s attack missed!", creature)),
            BattleEvent::CriticalHit => Some("A critical hit!".to_string()),
            BattleEvent::AttackTypeEffectiveness { multiplier } => {
                if *multiplier == 0.0 {
                    Some("It had no effect!".to_string())
                } else if *multiplier > 1.0 {
                    Some("It's super effective!".to_string())
                } else if *multiplier < 1.0 {
                    Some("It's not very effective...".to_string())
                } else {
                    None
                }
            }
            BattleEvent::DamageDealt { creature, damage, .. } => {
                Some(format!("{} took {} damage!", creature, damage))
            }
            BattleEvent::CreatureHealed { creature, amount, .. } => {
                Some(format!("{} recovered {} HP!", creature, amount))
            }
            BattleEvent::CreatureFainted { creature, .. } => Some(format!("{} fainted!", creature)),
            BattleEvent::ActionFailed { creature, reason, .. } => Some(match reason {
                ActionFailureReason::FastAsleep => format!("{} is fast asleep.", creature),
                ActionFailureReason::FrozenSolid => format!("{} is frozen solid!", creature),
                ActionFailureReason::FullyParalyzed => {
                    format!("{} is paralyzed! It can't move!", creature)
                }
            }),

            BattleEvent::StatusApplied { creature, status, .. } => Some(match status {
                StatusCondition::Burn => format!("{} was burned!", creature),
                StatusCondition::Paralysis => format!("{} is paralyzed! It may be unable to move!", creature),
                StatusCondition::Sleep => format!("{} fell asleep!", creature),
                StatusCondition::Poison => format!("{} was poisoned!", creature),
                StatusCondition::Freeze => format!("{} was frozen solid!", creature),
            }),
            BattleEvent::StatusFailed { .. } => Some("But it failed!".to_string()),
            BattleEvent::StatusRemoved { creature, status, .. } => Some(match status {
                StatusCondition::Sleep => format!("{} woke up!", creature),
                StatusCondition::Freeze => format!("{} thawed out!", creature),
                other => format!("{} was cured of its {}!", creature, other),
            }),
            BattleEvent::StatusDamage { creature, status, .. } => Some(format!(
                "{} is hurt by its {}!",
                creature, status
            )),

            BattleEvent::WeatherStarted { weather, .. } => Some(match weather {
                WeatherKind::Sun => "The sunlight turned harsh!".to_string(),
                WeatherKind::Rain => "It started to rain!".to_string(),
                WeatherKind::Sandstorm => "A sandstorm kicked up!".to_string(),
                WeatherKind::Hail => "It started to hail!".to_string(),
                WeatherKind::Clear => "The skies cleared.".to_string(),
            }),
            BattleEvent::WeatherContinues { weather } => Some(match weather {
                WeatherKind::Sandstorm => "The sandstorm is raging.".to_string(),
                WeatherKind::Hail => "Hail continues to fall.".to_string(),
                other => format!("The {} continues.", other),
            }),
            BattleEvent::WeatherEnded { weather } => Some(format!("The {} subsided.", weather)),
            BattleEvent::WeatherDamage { creature, weather, .. } => {
                Some(format!("{} is buffeted by the {}!", creature, weather))
            }

            BattleEvent::ItemUsed { side, item } => Some(format!("{} used a {}!", owner(side), item)),
            BattleEvent::CaptureAttempted { item, .. } => Some(format!("You threw a {}!", item)),
            BattleEvent::CaptureSucceeded { target } => Some(format!("Gotcha! {} was caught!", target)),
            BattleEvent::CaptureFailed { target } => Some(format!("Oh no! {} broke free!", target)),
            BattleEvent::Fled => Some("Got away safely!".to_string()),

            BattleEvent::ExperienceGained { creature, amount } => {
                Some(format!("{} gained {} experience!", creature, amount))
            }
            BattleEvent::LevelUp { creature, level } => {
                Some(format!("{} grew to level {}!", creature, level))
            }
            BattleEvent::MoveLearned { creature, move_id, forgot } => Some(match forgot {
                Some(old) => format!("{} forgot {} and learned {}!", creature, old, move_id),
                None => format!("{} learned {}!", creature, move_id),
            }),
            BattleEvent::EvolutionAvailable { creature, into } => {
                Some(format!("{} is ready to evolve into {}!", creature, into))
            }
            BattleEvent::RewardGranted { currency, badge } => Some(match badge {
                Some(badge) => format!("You received {} coins and the {}!", currency, badge),
                None => format!("You received {} coins!", currency),
            }),

            BattleEvent::BattleEnded { winner } => Some(match winner {
                Some(side) => format!("{} won the battle!", owner(side)),
                None => "The battle ended in a draw!".to_string(),
            }),
        }
    }
}

/// Ordered log of everything that happened while resolving an action.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, other: EventBus) {
        self.events.extend(other.events);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// Narrated lines for every non-silent event.
    pub fn narrate(&self, arena: &Arena) -> Vec<String> {
        self.events.iter().filter_map(|e| e.format(arena)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}
