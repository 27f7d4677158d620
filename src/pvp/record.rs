//! The stored form of a PvP battle and the per-player view rendered from it.

use crate::battle::engine::RoundAction;
use crate::battle::state::{Arena, BattleEvent, BattleSide, Side, Weather};
use crate::creature::Creature;
use crate::errors::{AuthorizationError, BattleResult};
use schema::{MoveId, SpeciesId, StatusCondition};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    Pending,
    Active,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Normal,
    Surrender,
    Disconnect,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Not accepted within the accept window.
    Expired,
    /// Withdrawn by the challenger.
    Withdrawn,
    Rejected,
    /// No activity for the stale window.
    Stale,
}

/// An action as submitted over the request surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmittedAction {
    Move {
        #[serde(rename = "moveIndex")]
        move_index: usize,
    },
    Switch {
        #[serde(rename = "switchToIndex")]
        team_index: usize,
    },
    Forfeit,
}

impl SubmittedAction {
    pub fn to_round_action(self) -> RoundAction {
        match self {
            SubmittedAction::Move { move_index } => RoundAction::UseMove { move_index },
            SubmittedAction::Switch { team_index } => RoundAction::Switch { team_index },
            SubmittedAction::Forfeit => RoundAction::Forfeit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub username: String,
}

/// The parts of a creature that change during a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureState {
    pub hp: u16,
    pub max_hp: u16,
    pub status: Option<StatusCondition>,
    pub move_uses: Vec<u8>,
}

impl CreatureState {
    fn of(creature: &Creature) -> Self {
        Self {
            hp: creature.current_hp(),
            max_hp: creature.max_hp(),
            status: creature.status,
            move_uses: creature.moves.iter().map(|slot| slot.uses).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvpBattleRecord {
    pub id: Uuid,
    /// Challenger first, challenged second. Index matches [`Side::index`].
    pub participants: [Participant; 2],
    pub status: BattleStatus,
    pub winner: Option<String>,
    pub finish_reason: Option<FinishReason>,
    pub cancel_reason: Option<CancelReason>,
    pub teams: [Vec<Creature>; 2],
    pub states: [Vec<CreatureState>; 2],
    pub active: [usize; 2],
    pub pending: [Option<SubmittedAction>; 2],
    pub round: u32,
    pub weather: Weather,
    pub created_at: u64,
    pub accepted_at: Option<u64>,
    pub last_activity: u64,
    pub submitted_at: [Option<u64>; 2],
    /// Latest accepted submission or replacement per side. Survives round resolution.
    pub last_action_at: [Option<u64>; 2],
    pub last_events: Vec<BattleEvent>,
}

impl PvpBattleRecord {
    pub fn new(challenger: Participant, challenged: Participant, now: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            participants: [challenger, challenged],
            status: BattleStatus::Pending,
            winner: None,
            finish_reason: None,
            cancel_reason: None,
            teams: [Vec::new(), Vec::new()],
            states: [Vec::new(), Vec::new()],
            active: [0, 0],
            pending: [None, None],
            round: 0,
            weather: Weather::clear(),
            created_at: now,
            accepted_at: None,
            last_activity: now,
            submitted_at: [None, None],
            last_action_at: [None, None],
            last_events: Vec::new(),
        }
    }

    pub fn side_of(&self, player_id: &str) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|side| self.participants[side.index()].id == player_id)
    }

    pub fn require_side(&self, player_id: &str) -> BattleResult<Side> {
        self.side_of(player_id).ok_or_else(|| {
            AuthorizationError::NotParticipant { player_id: player_id.to_string() }.into()
        })
    }

    pub fn involves_pair(&self, a: &str, b: &str) -> bool {
        let ids = [self.participants[0].id.as_str(), self.participants[1].id.as_str()];
        ids == [a, b] || ids == [b, a]
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, BattleStatus::Pending | BattleStatus::Active)
    }

    /// Start the battle with fully restored team snapshots.
    pub fn activate(&mut self, teams: [Vec<Creature>; 2], now: u64) {
        self.states = [
            teams[0].iter().map(CreatureState::of).collect(),
            teams[1].iter().map(CreatureState::of).collect(),
        ];
        self.teams = teams;
        self.active = [0, 0];
        self.round = 1;
        self.status = BattleStatus::Active;
        self.accepted_at = Some(now);
        self.last_activity = now;
    }

    /// Rebuild the live arena from the snapshots and their mutable state.
    pub fn to_arena(&self) -> Arena {
        let build_side = |side: Side| {
            let index = side.index();
            let team = self.teams[index]
                .iter()
                .zip(&self.states[index])
                .map(|(creature, state)| {
                    let mut creature = creature.clone();
                    creature.set_hp(state.hp);
                    creature.status = state.status;
                    for (slot, uses) in creature.moves.iter_mut().zip(&state.move_uses) {
                        slot.uses = *uses;
                    }
                    creature
                })
                .collect();
            let mut battle_side = BattleSide::new(self.participants[index].username.clone(), team);
            battle_side.active = self.active[index];
            battle_side
        };
        let mut arena = Arena::new(build_side(Side::Player1), build_side(Side::Player2));
        arena.weather = self.weather;
        arena
    }

    /// Store the mutable parts of `arena` back into the record.
    pub fn absorb(&mut self, arena: &Arena) {
        for side in Side::BOTH {
            let battle_side = arena.side(side);
            self.states[side.index()] = battle_side.team.iter().map(CreatureState::of).collect();
            self.active[side.index()] = battle_side.active;
        }
        self.weather = arena.weather;
    }

    fn active_state(&self, side: Side) -> Option<&CreatureState> {
        self.states[side.index()].get(self.active[side.index()])
    }

    /// The side's active creature fainted and a replacement is still available.
    pub fn must_switch(&self, side: Side) -> bool {
        self.status == BattleStatus::Active
            && self.active_state(side).is_some_and(|state| state.hp == 0)
            && self.states[side.index()].iter().any(|state| state.hp > 0)
    }

    pub fn finish(&mut self, winner: Option<Side>, reason: FinishReason, now: u64) {
        self.status = BattleStatus::Finished;
        self.winner = winner.map(|side| self.participants[side.index()].id.clone());
        self.finish_reason = Some(reason);
        self.pending = [None, None];
        self.submitted_at = [None, None];
        self.last_activity = now;
    }

    pub fn cancel(&mut self, reason: CancelReason, now: u64) {
        self.status = BattleStatus::Cancelled;
        self.cancel_reason = Some(reason);
        self.pending = [None, None];
        self.submitted_at = [None, None];
        self.last_activity = now;
    }

    pub fn view(&self, viewer: Side) -> BattleView {
        let arena = self.to_arena();
        let players = Side::BOTH.map(|side| {
            let battle_side = arena.side(side);
            PlayerView {
                id: self.participants[side.index()].id.clone(),
                username: self.participants[side.index()].username.clone(),
                active: battle_side.active,
                team: battle_side.team.iter().map(CreatureView::of).collect(),
                submitted: self.pending[side.index()].is_some(),
                must_switch: self.must_switch(side),
            }
        });
        BattleView {
            id: self.id,
            status: self.status,
            round: self.round,
            viewer,
            players,
            weather: self.weather,
            winner: self.winner.clone(),
            finish_reason: self.finish_reason,
            cancel_reason: self.cancel_reason,
            narration: self
                .last_events
                .iter()
                .filter_map(|event| event.format(&arena))
                .collect(),
            last_events: self.last_events.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveView {
    pub move_id: MoveId,
    pub uses: u8,
    pub max_uses: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatureView {
    pub species: SpeciesId,
    pub name: String,
    pub level: u8,
    pub hp: u16,
    pub max_hp: u16,
    pub status: Option<StatusCondition>,
    pub moves: Vec<MoveView>,
}

impl CreatureView {
    fn of(creature: &Creature) -> Self {
        Self {
            species: creature.species,
            name: creature.display_name(),
            level: creature.level,
            hp: creature.current_hp(),
            max_hp: creature.max_hp(),
            status: creature.status,
            moves: creature
                .moves
                .iter()
                .map(|slot| MoveView { move_id: slot.move_id, uses: slot.uses, max_uses: slot.max_uses })
                .collect(),
        }
    }
}

/// One participant as the viewer sees them. Pending choices are never revealed, only whether one exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub username: String,
    pub active: usize,
    pub team: Vec<CreatureView>,
    pub submitted: bool,
    pub must_switch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleView {
    pub id: Uuid,
    pub status: BattleStatus,
    pub round: u32,
    pub viewer: Side,
    pub players: [PlayerView; 2],
    pub weather: Weather,
    pub winner: Option<String>,
    pub finish_reason: Option<FinishReason>,
    pub cancel_reason: Option<CancelReason>,
    pub narration: Vec<String>,
    pub last_events: Vec<BattleEvent>,
}

/// A pending challenge as listed for the player who must answer it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeSummary {
    pub battle_id: Uuid,
    pub challenger: Participant,
    pub challenged: Participant,
    pub created_at: u64,
    pub expires_at: u64,
}

/// An open battle with no activity for the stale window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StuckBattle {
    pub battle_id: Uuid,
    pub status: BattleStatus,
    pub last_activity: u64,
}
