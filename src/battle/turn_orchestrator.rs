//! Local single-player battle sessions against a wild creature or an AI trainer.
//!
//! [`LocalBattleSession::apply`] is a reducer: it never mutates the session it is called
//! on. It returns the next session, the narrated events and the side effects the caller
//! must commit to the player's profile (items, currency, captures, discovery).

use crate::battle::ai::{Behavior, ScoringAI};
use crate::battle::catch::{attempt_capture, can_attempt_capture};
use crate::battle::engine::{apply_replacement, resolve_round, RoundAction, RoundOutcome};
use crate::battle::rng::BattleRng;
use crate::battle::state::{Arena, BattleEvent, BattleSide, EventBus, Side};
use crate::catalog::Catalog;
use crate::config::BattleRules;
use crate::creature::Creature;
use crate::errors::{BattleResult, StateError, ValidationError};
use crate::inventory::InventoryService;
use crate::progression::{experience_share, experience_yield, grant_experience, LearnOutcome, ParticipationTracker, TrainerReward};
use schema::{Healing, Item, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info};
use uuid::Uuid;

const PLAYER: Side = Side::Player1;
const OPPONENT: Side = Side::Player2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterKind {
    Wild,
    Trainer { name: String, reward: TrainerReward },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionResult {
    Victory,
    Defeat,
    Draw,
    Captured,
    Fled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    AwaitingInput,
    /// Only observable inside the reducer while a round is being resolved.
    Resolving,
    /// The player's active creature fainted; only a switch is accepted.
    ForcedSwitch,
    Ended(SessionResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    UseMove { move_index: usize },
    Switch { team_index: usize },
    ThrowCaptureDevice { item: Item },
    UseItem { item: Item, team_index: usize },
    Flee,
    Forfeit,
}

/// Changes the caller must apply to systems outside the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SideEffect {
    ConsumeItem(Item),
    GrantCurrency(u32),
    GrantBadge(String),
    CaptureCreature(Creature),
    DiscoverySeen(SpeciesId),
    DiscoveryCaught(SpeciesId),
    EvolutionCandidate { creature: Uuid, into: SpeciesId },
}

/// Collaborators a session reads from while reducing a command.
pub struct SessionContext<'a> {
    pub catalog: &'a Catalog,
    pub rules: &'a BattleRules,
    pub inventory: &'a dyn InventoryService,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub session: LocalBattleSession,
    pub events: EventBus,
    pub effects: Vec<SideEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalBattleSession {
    pub id: Uuid,
    pub kind: EncounterKind,
    pub status: SessionStatus,
    pub round: u32,
    pub arena: Arena,
    opponent_queue: VecDeque<usize>,
    participation: ParticipationTracker,
    /// Opposing team indices whose experience has already been paid out.
    rewarded_opponents: BTreeSet<usize>,
    reward_granted: bool,
}

impl LocalBattleSession {
    /// Open a battle between the player's team and an opposing team. The player leads with
    /// their first healthy creature.
    pub fn start(player_name: &str, player_team: Vec<Creature>, opponent_team: Vec<Creature>, kind: EncounterKind) -> BattleResult<Transition> {
        let mut player = BattleSide::new(player_name, player_team);
        player.active = player.first_available().ok_or(StateError::NoHealthyCreature)?;
        let opponent_name = match &kind {
            EncounterKind::Wild => "Wild".to_string(),
            EncounterKind::Trainer { name, .. } => name.clone(),
        };
        let opponent = BattleSide::new(opponent_name, opponent_team);
        if !opponent.has_remaining() {
            return Err(StateError::NoHealthyCreature.into());
        }
        let opponent_queue = (1..opponent.team.len()).collect();

        let session = LocalBattleSession {
            id: Uuid::new_v4(),
            kind,
            status: SessionStatus::AwaitingInput,
            round: 1,
            arena: Arena::new(player, opponent),
            opponent_queue,
            participation: ParticipationTracker::new(),
            rewarded_opponents: BTreeSet::new(),
            reward_granted: false,
        };

        let mut events = EventBus::new();
        for side in Side::BOTH {
            events.push(BattleEvent::CreatureSentOut { side, creature: session.arena.active(side).display_name() });
        }
        let effects = vec![SideEffect::DiscoverySeen(session.arena.active(OPPONENT).species)];
        info!(session = %session.id, wild = session.is_wild(), "local battle started");
        Ok(Transition { session, events, effects })
    }

    pub fn is_wild(&self) -> bool {
        self.kind == EncounterKind::Wild
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, SessionStatus::Ended(_))
    }

    /// The player's team in its current state, for committing back to the roster.
    pub fn player_team(&self) -> &[Creature] {
        &self.arena.side(PLAYER).team
    }

    /// Reduce one player command into the next session.
    pub fn apply(&self, command: SessionCommand, ctx: &SessionContext<'_>, rng: &mut dyn BattleRng) -> BattleResult<Transition> {
        let mut next = self.clone();
        let mut events = EventBus::new();
        let mut effects = Vec::new();

        match self.status {
            SessionStatus::Ended(_) => return Err(StateError::BattleFinished.into()),
            SessionStatus::ForcedSwitch => {
                let SessionCommand::Switch { team_index } = command else {
                    return Err(StateError::SwitchRequired.into());
                };
                let (arena, bus) = apply_replacement(&next.arena, PLAYER, team_index)?;
                next.arena = arena;
                events.extend(bus);
                next.status = SessionStatus::AwaitingInput;
            }
            SessionStatus::AwaitingInput | SessionStatus::Resolving => match command {
                SessionCommand::UseMove { move_index } => {
                    next.run_round(RoundAction::UseMove { move_index }, ctx, rng, &mut events, &mut effects)?
                }
                SessionCommand::Switch { team_index } => {
                    next.run_round(RoundAction::Switch { team_index }, ctx, rng, &mut events, &mut effects)?
                }
                SessionCommand::Forfeit => next.run_round(RoundAction::Forfeit, ctx, rng, &mut events, &mut effects)?,
                SessionCommand::Flee => {
                    if !next.is_wild() {
                        return Err(StateError::CannotFlee.into());
                    }
                    events.push(BattleEvent::Fled);
                    next.status = SessionStatus::Ended(SessionResult::Fled);
                }
                SessionCommand::ThrowCaptureDevice { item } => {
                    next.throw_capture_device(item, ctx, rng, &mut events, &mut effects)?
                }
                SessionCommand::UseItem { item, team_index } => {
                    next.use_healing_item(item, team_index, ctx, &mut events, &mut effects)?;
                    next.run_round(RoundAction::Pass, ctx, rng, &mut events, &mut effects)?;
                }
            },
        }

        debug!(session = %next.id, status = ?next.status, round = next.round, "command applied");
        Ok(Transition { session: next, events, effects })
    }

    fn throw_capture_device(
        &mut self,
        item: Item,
        ctx: &SessionContext<'_>,
        rng: &mut dyn BattleRng,
        events: &mut EventBus,
        effects: &mut Vec<SideEffect>,
    ) -> BattleResult<()> {
        let target = self.arena.active(OPPONENT);
        let species = can_attempt_capture(self.is_wild(), target, item).map_err(ValidationError::CaptureRefused)?;
        if ctx.inventory.count(item) == 0 {
            return Err(ValidationError::ItemUnavailable(item).into());
        }

        events.push(BattleEvent::ItemUsed { side: PLAYER, item });
        events.push(BattleEvent::CaptureAttempted { item, target: species });
        effects.push(SideEffect::ConsumeItem(item));

        let attempt = attempt_capture(target, item, ctx.catalog, rng)?;
        match attempt.captured {
            Some(creature) => {
                events.push(BattleEvent::CaptureSucceeded { target: species });
                events.push(BattleEvent::BattleEnded { winner: Some(PLAYER) });
                effects.push(SideEffect::CaptureCreature(creature));
                effects.push(SideEffect::DiscoveryCaught(species));
                self.status = SessionStatus::Ended(SessionResult::Captured);
                Ok(())
            }
            None => {
                events.push(BattleEvent::CaptureFailed { target: species });
                self.run_round(RoundAction::Pass, ctx, rng, events, effects)
            }
        }
    }

    fn use_healing_item(
        &mut self,
        item: Item,
        team_index: usize,
        ctx: &SessionContext<'_>,
        events: &mut EventBus,
        effects: &mut Vec<SideEffect>,
    ) -> BattleResult<()> {
        let healing = item.healing().ok_or(ValidationError::NotAHealingItem(item))?;
        if ctx.inventory.count(item) == 0 {
            return Err(ValidationError::ItemUnavailable(item).into());
        }
        let creature = self
            .arena
            .side_mut(PLAYER)
            .team
            .get_mut(team_index)
            .ok_or(ValidationError::InvalidTeamIndex { index: team_index })?;
        if creature.is_fainted() {
            return Err(ValidationError::NoEffect(item).into());
        }

        let name = creature.display_name();
        let event = match healing {
            Healing::RestoreHp(amount) => {
                if creature.current_hp() == creature.max_hp() {
                    return Err(ValidationError::NoEffect(item).into());
                }
                let restored = creature.heal(amount);
                BattleEvent::CreatureHealed { side: PLAYER, creature: name, amount: restored, new_hp: creature.current_hp() }
            }
            Healing::CureStatus => {
                let status = creature.status.take().ok_or(ValidationError::NoEffect(item))?;
                BattleEvent::StatusRemoved { side: PLAYER, creature: name, status }
            }
        };
        events.push(BattleEvent::ItemUsed { side: PLAYER, item });
        events.push(event);
        effects.push(SideEffect::ConsumeItem(item));
        Ok(())
    }

    fn record_participation(&mut self) {
        let player = self.arena.side(PLAYER);
        let opponent = self.arena.side(OPPONENT);
        if !player.active_creature().is_fainted() && !opponent.active_creature().is_fainted() {
            self.participation.record(player.active, opponent.active);
        }
    }

    fn run_round(
        &mut self,
        player_action: RoundAction,
        ctx: &SessionContext<'_>,
        rng: &mut dyn BattleRng,
        events: &mut EventBus,
        effects: &mut Vec<SideEffect>,
    ) -> BattleResult<()> {
        self.status = SessionStatus::Resolving;
        self.record_participation();

        let opponent_action = ScoringAI::new().decide_action(OPPONENT, &self.arena, ctx.catalog);
        let resolution = resolve_round(&self.arena, [player_action, opponent_action], self.round, ctx.catalog, ctx.rules, rng)?;
        self.arena = resolution.arena;
        events.extend(resolution.events);
        self.round += 1;
        self.record_participation();

        self.pay_out_experience(ctx, events, effects)?;
        self.settle(resolution.outcome, events, effects)
    }

    /// Grant experience for every opposing creature that fainted since the last payout.
    fn pay_out_experience(&mut self, ctx: &SessionContext<'_>, events: &mut EventBus, effects: &mut Vec<SideEffect>) -> BattleResult<()> {
        let trainer_owned = !self.is_wild();
        let newly_fainted: Vec<usize> = self
            .arena
            .side(OPPONENT)
            .team
            .iter()
            .enumerate()
            .filter(|(index, creature)| creature.is_fainted() && !self.rewarded_opponents.contains(index))
            .map(|(index, _)| index)
            .collect();

        for opponent_index in newly_fainted {
            self.rewarded_opponents.insert(opponent_index);
            let defeated = &self.arena.side(OPPONENT).team[opponent_index];
            let total = experience_yield(ctx.catalog.species(defeated.species)?.base_exp, defeated.level, trainer_owned);

            let team = &self.arena.side(PLAYER).team;
            let participants: Vec<usize> = self
                .participation
                .participants_against(opponent_index)
                .into_iter()
                .filter(|index| team.get(*index).is_some_and(|c| !c.is_fainted()))
                .collect();
            let share = experience_share(total, participants.len());
            if share == 0 {
                continue;
            }

            for index in participants {
                let creature = &self.arena.side(PLAYER).team[index];
                let name = creature.display_name();
                let old_level = creature.level;
                let outcome = grant_experience(creature, share, ctx.catalog, ctx.rules.max_level)?;

                events.push(BattleEvent::ExperienceGained { creature: name.clone(), amount: share });
                for level in (old_level + 1)..=outcome.creature.level {
                    events.push(BattleEvent::LevelUp { creature: name.clone(), level });
                }
                for learned in &outcome.learned {
                    let forgot = match learned.outcome {
                        LearnOutcome::AlreadyKnown => continue,
                        LearnOutcome::Learned => None,
                        LearnOutcome::Replaced { forgotten } => Some(forgotten),
                    };
                    events.push(BattleEvent::MoveLearned { creature: name.clone(), move_id: learned.move_id, forgot });
                }
                if let Some(into) = outcome.evolution {
                    events.push(BattleEvent::EvolutionAvailable { creature: name.clone(), into });
                    effects.push(SideEffect::EvolutionCandidate { creature: outcome.creature.id, into });
                }
                self.arena.side_mut(PLAYER).team[index] = outcome.creature;
            }
        }
        Ok(())
    }

    fn settle(&mut self, outcome: RoundOutcome, events: &mut EventBus, effects: &mut Vec<SideEffect>) -> BattleResult<()> {
        match outcome {
            RoundOutcome::Ongoing => self.status = SessionStatus::AwaitingInput,
            RoundOutcome::Finished { winner, .. } => {
                let result = match winner {
                    Some(PLAYER) => SessionResult::Victory,
                    Some(_) => SessionResult::Defeat,
                    None => SessionResult::Draw,
                };
                if result == SessionResult::Victory {
                    self.grant_trainer_reward(events, effects);
                }
                info!(session = %self.id, ?result, round = self.round, "local battle ended");
                self.status = SessionStatus::Ended(result);
            }
            RoundOutcome::NeedsReplacement(sides) => {
                if sides.contains(&OPPONENT) {
                    self.send_next_opponent(events, effects)?;
                }
                self.status = if sides.contains(&PLAYER) {
                    SessionStatus::ForcedSwitch
                } else {
                    SessionStatus::AwaitingInput
                };
            }
        }
        Ok(())
    }

    fn send_next_opponent(&mut self, events: &mut EventBus, effects: &mut Vec<SideEffect>) -> BattleResult<()> {
        let side = self.arena.side(OPPONENT);
        let next_index = loop {
            match self.opponent_queue.pop_front() {
                Some(index) if side.team.get(index).is_some_and(|c| !c.is_fainted()) && index != side.active => break Some(index),
                Some(_) => continue,
                None => break side.first_available(),
            }
        };
        let Some(index) = next_index else {
            return Ok(());
        };
        let (arena, bus) = apply_replacement(&self.arena, OPPONENT, index)?;
        self.arena = arena;
        events.extend(bus);
        effects.push(SideEffect::DiscoverySeen(self.arena.active(OPPONENT).species));
        Ok(())
    }

    fn grant_trainer_reward(&mut self, events: &mut EventBus, effects: &mut Vec<SideEffect>) {
        let EncounterKind::Trainer { reward, .. } = &self.kind else {
            return;
        };
        if self.reward_granted {
            return;
        }
        self.reward_granted = true;
        effects.push(SideEffect::GrantCurrency(reward.currency));
        if let Some(badge) = &reward.badge {
            effects.push(SideEffect::GrantBadge(badge.clone()));
        }
        events.push(BattleEvent::RewardGranted { currency: reward.currency, badge: reward.badge.clone() });
    }
}
