//! Asynchronous player-versus-player battles.
//!
//! Both players submit an action for the round; the round resolves once, when the second
//! submission arrives. Time-based transitions (accept expiry, disconnects, turn timeouts)
//! are applied lazily by [`PvpCoordinator::refresh`] whenever a record is touched.

use crate::battle::engine::{apply_replacement, resolve_round, validate_action, RoundOutcome};
use crate::battle::rng::{BattleRng, SeededRng};
use crate::battle::state::Side;
use crate::catalog::Catalog;
use crate::config::{BattleRules, CoordinatorConfig, GameConfig};
use crate::errors::{
    AuthorizationError, BattleResult, ConflictError, NotFoundError, StateError, TimeoutError, ValidationError,
};
use crate::persistence::ProfileStore;
use crate::presence::Presence;
use crate::pvp::clock::Clock;
use crate::pvp::record::{
    BattleStatus, BattleView, CancelReason, ChallengeSummary, FinishReason, Participant, PvpBattleRecord,
    StuckBattle, SubmittedAction,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

type RecordHandle = Arc<Mutex<PvpBattleRecord>>;

pub struct PvpCoordinator {
    battles: RwLock<HashMap<Uuid, RecordHandle>>,
    profiles: Arc<dyn ProfileStore>,
    presence: Arc<dyn Presence>,
    clock: Arc<dyn Clock>,
    catalog: Arc<Catalog>,
    config: CoordinatorConfig,
    rules: BattleRules,
    rng: Mutex<Box<dyn BattleRng + Send>>,
}

fn lock(handle: &RecordHandle) -> MutexGuard<'_, PvpBattleRecord> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PvpCoordinator {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        presence: Arc<dyn Presence>,
        clock: Arc<dyn Clock>,
        catalog: Arc<Catalog>,
        config: GameConfig,
    ) -> Self {
        Self {
            battles: RwLock::new(HashMap::new()),
            profiles,
            presence,
            clock,
            catalog,
            config: config.coordinator,
            rules: config.rules,
            rng: Mutex::new(Box::new(SeededRng::from_entropy())),
        }
    }

    /// Replace the server-side randomness source.
    pub fn with_rng(mut self, rng: Box<dyn BattleRng + Send>) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn record(&self, battle_id: Uuid) -> BattleResult<RecordHandle> {
        self.battles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&battle_id)
            .cloned()
            .ok_or_else(|| NotFoundError::Battle(battle_id).into())
    }

    fn all_records(&self) -> Vec<RecordHandle> {
        self.battles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn participant(&self, player_id: &str) -> BattleResult<Participant> {
        let profile = self.profiles.load(player_id)?;
        Ok(Participant { id: profile.id, username: profile.username })
    }

    fn last_seen(&self, record: &PvpBattleRecord, side: Side) -> u64 {
        let heartbeat = self.presence.last_seen(&record.participants[side.index()].id).unwrap_or(0);
        let acted = record.last_action_at[side.index()].unwrap_or(0);
        heartbeat.max(acted).max(record.accepted_at.unwrap_or(0))
    }

    /// Apply every time-based transition that is due. Deterministic for a given clock reading.
    pub fn refresh(&self, record: &mut PvpBattleRecord, now: u64) {
        match record.status {
            BattleStatus::Pending => {
                if now.saturating_sub(record.created_at) > self.config.accept_window_ms {
                    record.cancel(CancelReason::Expired, now);
                    info!(battle = %record.id, "challenge expired");
                }
            }
            BattleStatus::Active => {
                let stale = Side::BOTH
                    .map(|side| now.saturating_sub(self.last_seen(record, side)) > self.config.heartbeat_grace_ms);
                match stale {
                    [true, false] => self.finish(record, Some(Side::Player2), FinishReason::Disconnect, now),
                    [false, true] => self.finish(record, Some(Side::Player1), FinishReason::Disconnect, now),
                    _ => {}
                }
                if record.status != BattleStatus::Active {
                    return;
                }

                let switching = Side::BOTH.map(|side| record.must_switch(side));
                let waiting_on = match (switching, record.pending) {
                    ([true, false], _) => Some((Side::Player1, record.last_activity)),
                    ([false, true], _) => Some((Side::Player2, record.last_activity)),
                    ([false, false], [Some(_), None]) => record.submitted_at[0].map(|at| (Side::Player2, at)),
                    ([false, false], [None, Some(_)]) => record.submitted_at[1].map(|at| (Side::Player1, at)),
                    _ => None,
                };
                if let Some((late, since)) = waiting_on {
                    if now.saturating_sub(since) > self.config.turn_timeout_ms {
                        self.finish(record, Some(late.opponent()), FinishReason::Timeout, now);
                    }
                }
            }
            BattleStatus::Finished | BattleStatus::Cancelled => {}
        }
    }

    fn finish(&self, record: &mut PvpBattleRecord, winner: Option<Side>, reason: FinishReason, now: u64) {
        record.finish(winner, reason, now);
        info!(
            battle = %record.id,
            winner = record.winner.as_deref().unwrap_or("draw"),
            ?reason,
            "pvp battle finished"
        );
    }

    /// Lock a record and bring its time-based state up to date.
    fn refreshed<'a>(&self, handle: &'a RecordHandle) -> (MutexGuard<'a, PvpBattleRecord>, u64) {
        let now = self.clock.now_ms();
        let mut guard = lock(handle);
        self.refresh(&mut guard, now);
        (guard, now)
    }

    pub fn challenge(&self, challenger: &str, opponent_id: &str) -> BattleResult<Uuid> {
        if challenger == opponent_id {
            return Err(ValidationError::SelfChallenge.into());
        }
        let challenger = self.participant(challenger)?;
        let opponent = self.participant(opponent_id)?;

        // The index stays write-locked so two racing challenges cannot both pass the duplicate check.
        let mut battles = self.battles.write().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now_ms();
        for handle in battles.values() {
            let mut record = lock(handle);
            self.refresh(&mut record, now);
            if record.status == BattleStatus::Pending && record.involves_pair(&challenger.id, &opponent.id) {
                return Err(ConflictError::PendingChallengeExists { battle_id: record.id }.into());
            }
        }

        let record = PvpBattleRecord::new(challenger, opponent, now);
        let battle_id = record.id;
        info!(
            battle = %battle_id,
            challenger = %record.participants[0].id,
            opponent = %record.participants[1].id,
            "challenge issued"
        );
        battles.insert(battle_id, Arc::new(Mutex::new(record)));
        Ok(battle_id)
    }

    /// Common checks for answering a challenge: the actor is the challenged player and the
    /// record is still pending.
    fn check_response(record: &PvpBattleRecord, actor: &str) -> BattleResult<()> {
        match record.require_side(actor)? {
            Side::Player2 => {}
            Side::Player1 => return Err(AuthorizationError::NotChallenged.into()),
        }
        match (record.status, record.cancel_reason) {
            (BattleStatus::Pending, _) => Ok(()),
            (BattleStatus::Cancelled, Some(CancelReason::Expired)) => {
                Err(TimeoutError::AcceptWindowElapsed { battle_id: record.id }.into())
            }
            (BattleStatus::Active, _) | (BattleStatus::Cancelled, Some(CancelReason::Rejected)) => {
                Err(ConflictError::AlreadyResponded.into())
            }
            _ => Err(StateError::NotPending.into()),
        }
    }

    pub fn accept(&self, actor: &str, battle_id: Uuid) -> BattleResult<BattleView> {
        let handle = self.record(battle_id)?;
        let (mut record, now) = self.refreshed(&handle);
        Self::check_response(&record, actor)?;

        let challenger = self.profiles.load(&record.participants[0].id)?;
        let challenged = self.profiles.load(&record.participants[1].id)?;
        let mut next = record.clone();
        next.activate([challenger.roster.restored_team(), challenged.roster.restored_team()], now);

        *record = next;
        info!(battle = %battle_id, "challenge accepted");
        Ok(record.view(Side::Player2))
    }

    pub fn reject(&self, actor: &str, battle_id: Uuid) -> BattleResult<BattleView> {
        let handle = self.record(battle_id)?;
        let (mut record, now) = self.refreshed(&handle);
        Self::check_response(&record, actor)?;

        record.cancel(CancelReason::Rejected, now);
        info!(battle = %battle_id, "challenge rejected");
        Ok(record.view(Side::Player2))
    }

    pub fn cancel(&self, actor: &str, battle_id: Uuid) -> BattleResult<BattleView> {
        let handle = self.record(battle_id)?;
        let (mut record, now) = self.refreshed(&handle);
        if record.require_side(actor)? != Side::Player1 {
            return Err(AuthorizationError::NotChallenger.into());
        }
        match (record.status, record.cancel_reason) {
            (BattleStatus::Pending, _) => {}
            (BattleStatus::Cancelled, Some(CancelReason::Withdrawn)) => return Err(ConflictError::AlreadyResponded.into()),
            _ => return Err(StateError::NotPending.into()),
        }

        record.cancel(CancelReason::Withdrawn, now);
        info!(battle = %battle_id, "challenge withdrawn");
        Ok(record.view(Side::Player1))
    }

    pub fn state(&self, actor: &str, battle_id: Uuid) -> BattleResult<BattleView> {
        let handle = self.record(battle_id)?;
        let (record, _) = self.refreshed(&handle);
        let side = record.require_side(actor)?;
        Ok(record.view(side))
    }

    fn require_active(record: &PvpBattleRecord) -> BattleResult<()> {
        match record.status {
            BattleStatus::Active => Ok(()),
            BattleStatus::Pending => Err(StateError::NotActive.into()),
            BattleStatus::Finished | BattleStatus::Cancelled => Err(StateError::BattleFinished.into()),
        }
    }

    pub fn submit_action(&self, actor: &str, battle_id: Uuid, action: SubmittedAction) -> BattleResult<BattleView> {
        let handle = self.record(battle_id)?;
        let (mut record, now) = self.refreshed(&handle);
        let side = record.require_side(actor)?;
        Self::require_active(&record)?;

        let mut next = record.clone();
        next.last_action_at[side.index()] = Some(now);
        if action == SubmittedAction::Forfeit {
            self.finish(&mut next, Some(side.opponent()), FinishReason::Surrender, now);
            *record = next;
            return Ok(record.view(side));
        }

        if record.must_switch(side) {
            let SubmittedAction::Switch { team_index } = action else {
                return Err(StateError::SwitchRequired.into());
            };
            let (arena, events) = apply_replacement(&record.to_arena(), side, team_index)?;
            next.absorb(&arena);
            next.last_events = events.into_events();
            next.last_activity = now;
            debug!(battle = %battle_id, ?side, team_index, "replacement sent in");
            *record = next;
            return Ok(record.view(side));
        }
        if record.must_switch(side.opponent()) {
            return Err(StateError::AwaitingOpponentSwitch.into());
        }

        let arena = record.to_arena();
        validate_action(&arena, side, action.to_round_action())?;
        next.pending[side.index()] = Some(action);
        next.submitted_at[side.index()] = Some(now);
        next.last_activity = now;

        if let [Some(first), Some(second)] = next.pending {
            let actions = [first.to_round_action(), second.to_round_action()];
            let resolution = {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                resolve_round(&arena, actions, next.round, &self.catalog, &self.rules, rng.as_mut())?
            };
            next.absorb(&resolution.arena);
            next.last_events = resolution.events.into_events();
            next.pending = [None, None];
            next.submitted_at = [None, None];
            info!(battle = %battle_id, round = next.round, "pvp round resolved");
            next.round += 1;
            if let RoundOutcome::Finished { winner, .. } = resolution.outcome {
                self.finish(&mut next, winner, FinishReason::Normal, now);
            }
        }

        *record = next;
        Ok(record.view(side))
    }

    pub fn surrender(&self, actor: &str, battle_id: Uuid) -> BattleResult<BattleView> {
        let handle = self.record(battle_id)?;
        let (mut record, now) = self.refreshed(&handle);
        let side = record.require_side(actor)?;
        Self::require_active(&record)?;

        self.finish(&mut record, Some(side.opponent()), FinishReason::Surrender, now);
        Ok(record.view(side))
    }

    /// Pending challenges waiting on the actor's answer, oldest first.
    pub fn pending(&self, actor: &str) -> Vec<ChallengeSummary> {
        let mut summaries: Vec<ChallengeSummary> = self
            .all_records()
            .iter()
            .filter_map(|handle| {
                let (record, _) = self.refreshed(handle);
                let incoming = record.side_of(actor) == Some(Side::Player2);
                (incoming && record.status == BattleStatus::Pending).then(|| ChallengeSummary {
                    battle_id: record.id,
                    challenger: record.participants[0].clone(),
                    challenged: record.participants[1].clone(),
                    created_at: record.created_at,
                    expires_at: record.created_at + self.config.accept_window_ms,
                })
            })
            .collect();
        summaries.sort_by_key(|summary| summary.created_at);
        summaries
    }

    fn stuck_for(&self, actor: &str) -> Vec<RecordHandle> {
        self.all_records()
            .into_iter()
            .filter(|handle| {
                let (record, now) = self.refreshed(handle);
                record.side_of(actor).is_some()
                    && record.is_open()
                    && now.saturating_sub(record.last_activity) >= self.config.stale_window_ms
            })
            .collect()
    }

    /// Open battles of the actor's with no activity for the stale window.
    pub fn my_stuck(&self, actor: &str) -> Vec<StuckBattle> {
        self.stuck_for(actor)
            .iter()
            .map(|handle| {
                let record = lock(handle);
                StuckBattle { battle_id: record.id, status: record.status, last_activity: record.last_activity }
            })
            .collect()
    }

    /// Cancel every stuck battle of the actor's. Returns the cancelled ids.
    pub fn cleanup_stuck(&self, actor: &str) -> Vec<Uuid> {
        let cancelled: Vec<Uuid> = self
            .stuck_for(actor)
            .iter()
            .filter_map(|handle| {
                let (mut record, now) = self.refreshed(handle);
                // Re-checked under the lock: activity may have arrived since the scan.
                if !record.is_open() || now.saturating_sub(record.last_activity) < self.config.stale_window_ms {
                    return None;
                }
                record.cancel(CancelReason::Stale, now);
                Some(record.id)
            })
            .collect();
        if !cancelled.is_empty() {
            warn!(player = actor, count = cancelled.len(), "stuck battles cancelled");
        }
        cancelled
    }

    pub fn heartbeat(&self, actor: &str) -> u64 {
        let now = self.clock.now_ms();
        self.presence.heartbeat(actor, now);
        now
    }
}
