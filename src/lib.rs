//! Creature Battle Engine
//!
//! Deterministic turn-based creature battles: stat and damage mechanics, a local
//! encounter session with capture and progression, and an asynchronous coordinator for
//! player-versus-player battles behind a JSON request surface.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod config;
pub mod creature;
pub mod errors;
pub mod inventory;
pub mod persistence;
pub mod player;
pub mod presence;
pub mod progression;
pub mod pvp;
pub mod roster;
pub mod service;

// --- PUBLIC API RE-EXPORTS ---

// Reference data definitions from the `schema` crate.
pub use schema::{
    CreatureType, Item, MoveCategory, MoveData, MoveId, SecondaryEffect, SpeciesData, SpeciesId, StatBlock,
    StatusCondition, WeatherKind,
};

// Round resolution and the local session.
pub use battle::engine::{resolve_round, RoundAction, RoundOutcome, RoundResolution};
pub use battle::rng::{BattleRng, SeededRng, TurnRng};
pub use battle::state::{Arena, BattleEvent, BattleSide, EventBus, Side};
pub use battle::turn_orchestrator::{
    EncounterKind, LocalBattleSession, SessionCommand, SessionContext, SessionResult, SessionStatus, SideEffect,
};

// Runtime types.
pub use catalog::Catalog;
pub use config::{BattleRules, CoordinatorConfig, GameConfig};
pub use creature::{Creature, MoveSlot};
pub use player::PlayerProfile;
pub use roster::Roster;

// PvP.
pub use pvp::{PvpCoordinator, SubmittedAction};
pub use service::BattleService;

// Error and result types.
pub use errors::{BattleError, BattleResult, ErrorKind};
