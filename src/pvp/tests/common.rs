use crate::battle::rng::TurnRng;
use crate::battle::tests::common::TestCreatureBuilder;
use crate::catalog::Catalog;
use crate::config::{CoordinatorConfig, GameConfig};
use crate::creature::Creature;
use crate::persistence::{MemoryProfileStore, ProfileStore};
use crate::player::PlayerProfile;
use crate::presence::HeartbeatTracker;
use crate::pvp::clock::ManualClock;
use crate::pvp::coordinator::PvpCoordinator;
use crate::roster::Roster;
use schema::{MoveId, SpeciesId};
use std::sync::Arc;

pub const ASH: &str = "ash";
pub const MISTY: &str = "misty";
pub const BROCK: &str = "brock";
pub const ERIKA: &str = "erika";
pub const SABRINA: &str = "sabrina";

/// A coordinator over an in-memory store seeded with three players, a manual clock and
/// a scripted RNG of middling rolls.
pub struct Fixture {
    pub coordinator: Arc<PvpCoordinator>,
    pub clock: Arc<ManualClock>,
}

/// Fast and hard-hitting: wins every speed tie and knocks out low-level opponents in one hit.
pub fn heavy_hitter() -> Creature {
    TestCreatureBuilder::new(SpeciesId::Pebblit, 50)
        .with_moves(vec![MoveId::Tackle, MoveId::RockThrow])
        .with_speed(500)
        .build()
}

pub fn fledgling(level: u8) -> Creature {
    TestCreatureBuilder::new(SpeciesId::Gustling, level)
        .with_moves(vec![MoveId::Tackle])
        .build()
}

/// A sturdy creature whose only move has a single use, so it runs dry after one round.
pub fn one_use_brawler() -> Creature {
    let mut creature = TestCreatureBuilder::new(SpeciesId::Gustling, 20)
        .with_moves(vec![MoveId::Tackle])
        .build();
    creature.moves[0].max_uses = 1;
    creature.moves[0].uses = 1;
    creature
}

fn profile(id: &str, team: Vec<Creature>) -> PlayerProfile {
    let roster = match Roster::new(team) {
        Ok(roster) => roster,
        Err(err) => panic!("bad test roster: {err}"),
    };
    let mut username = id.to_string();
    username[..1].make_ascii_uppercase();
    PlayerProfile::new(id, username, roster)
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    pub fn with_config(coordinator: CoordinatorConfig) -> Self {
        let store = MemoryProfileStore::new();
        for player in [
            profile(ASH, vec![heavy_hitter()]),
            profile(MISTY, vec![fledgling(2), fledgling(10)]),
            profile(BROCK, vec![fledgling(2)]),
            profile(ERIKA, vec![one_use_brawler()]),
            profile(SABRINA, vec![one_use_brawler()]),
        ] {
            store.save(&player).unwrap();
        }

        let clock = Arc::new(ManualClock::new(0));
        let config = GameConfig { coordinator, ..GameConfig::default() };
        let coordinator = PvpCoordinator::new(
            Arc::new(store),
            Arc::new(HeartbeatTracker::new()),
            clock.clone(),
            Catalog::builtin().unwrap(),
            config,
        )
        .with_rng(Box::new(TurnRng::new_for_test(vec![50; 500])));

        Self { coordinator: Arc::new(coordinator), clock }
    }

    /// Challenge and accept, returning the active battle's id.
    pub fn active_battle(&self, challenger: &str, opponent: &str) -> uuid::Uuid {
        let battle_id = self.coordinator.challenge(challenger, opponent).unwrap();
        self.coordinator.accept(opponent, battle_id).unwrap();
        battle_id
    }
}

/// Windows so long they never elapse during a test.
pub fn relaxed_config() -> CoordinatorConfig {
    CoordinatorConfig {
        accept_window_ms: u64::MAX / 2,
        heartbeat_grace_ms: u64::MAX / 2,
        turn_timeout_ms: u64::MAX / 2,
        stale_window_ms: u64::MAX / 2,
    }
}
