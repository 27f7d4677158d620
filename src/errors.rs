use crate::battle::catch::CatchError;
use schema::{Item, MoveId, SpeciesId};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for the creature battle engine.
#[derive(Debug, Error)]
pub enum BattleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Malformed or illegal input that no battle state could accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("move index {index} is out of range")]
    InvalidMoveIndex { index: usize },
    #[error("{move_id} has no uses remaining")]
    NoUsesRemaining { move_id: MoveId },
    #[error("team index {index} is out of range")]
    InvalidTeamIndex { index: usize },
    #[error("malformed action: {0}")]
    MalformedAction(String),
    #[error("a player cannot challenge themselves")]
    SelfChallenge,
    #[error("{0} cannot be used on a creature")]
    NotAHealingItem(Item),
    #[error("no {0} left in the bag")]
    ItemUnavailable(Item),
    #[error("{0} would have no effect")]
    NoEffect(Item),
    #[error("capture not possible: {0}")]
    CaptureRefused(CatchError),
    #[error("a team must hold between 1 and 6 creatures, got {0}")]
    TeamSize(usize),
    #[error("level {0} is outside 1..=100")]
    InvalidLevel(u8),
}

/// The request was well formed but the battle is in the wrong state for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("the battle is already over")]
    BattleFinished,
    #[error("the battle is not awaiting a response to its challenge")]
    NotPending,
    #[error("the battle has not started")]
    NotActive,
    #[error("the active creature fainted, a switch is required")]
    SwitchRequired,
    #[error("waiting for the opponent to replace a fainted creature")]
    AwaitingOpponentSwitch,
    #[error("creature in slot {index} is already in battle")]
    SwitchTargetActive { index: usize },
    #[error("creature in slot {index} has fainted")]
    SwitchTargetFainted { index: usize },
    #[error("no fainted creature needs replacing")]
    NoReplacementNeeded,
    #[error("no creature on the team is able to battle")]
    NoHealthyCreature,
    #[error("fleeing is not possible from a trainer battle")]
    CannotFlee,
    #[error("{species} cannot evolve right now")]
    NoEvolutionAvailable { species: SpeciesId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("player {player_id} is not a participant in this battle")]
    NotParticipant { player_id: String },
    #[error("only the challenged player may respond to a challenge")]
    NotChallenged,
    #[error("only the challenger may cancel a challenge")]
    NotChallenger,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("battle {0} not found")]
    Battle(Uuid),
    #[error("species {0} not found in catalog")]
    Species(SpeciesId),
    #[error("move {0} not found in catalog")]
    Move(MoveId),
    #[error("creature {0} not found")]
    Creature(Uuid),
    #[error("player {0} not found")]
    Player(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("a pending challenge {battle_id} already exists between these players")]
    PendingChallengeExists { battle_id: Uuid },
    #[error("the challenge has already been answered")]
    AlreadyResponded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeoutError {
    #[error("challenge {battle_id} was not accepted in time")]
    AcceptWindowElapsed { battle_id: Uuid },
}

/// Failures loading reference data, configuration or persisted profiles.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to parse RON data: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode or decode profile: {0}")]
    Encoding(#[from] postcard::Error),
    #[error("invalid data: {0}")]
    Invalid(String),
}

/// Coarse classification of a [`BattleError`], used by the request surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    State,
    Authorization,
    NotFound,
    Conflict,
    Timeout,
    Data,
}

impl ErrorKind {
    /// HTTP-style status code for this kind.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::State => 409,
            ErrorKind::Authorization => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Timeout => 408,
            ErrorKind::Data => 500,
        }
    }
}

impl BattleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BattleError::Validation(_) => ErrorKind::Validation,
            BattleError::State(_) => ErrorKind::State,
            BattleError::Authorization(_) => ErrorKind::Authorization,
            BattleError::NotFound(_) => ErrorKind::NotFound,
            BattleError::Conflict(_) => ErrorKind::Conflict,
            BattleError::Timeout(_) => ErrorKind::Timeout,
            BattleError::Data(_) => ErrorKind::Data,
        }
    }
}

/// Result type alias for battle engine operations.
pub type BattleResult<T> = Result<T, BattleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ValidationError::SelfChallenge.into(), 400)]
    #[case(StateError::BattleFinished.into(), 409)]
    #[case(AuthorizationError::NotChallenger.into(), 403)]
    #[case(NotFoundError::Player("ghost".to_string()).into(), 404)]
    #[case(ConflictError::AlreadyResponded.into(), 409)]
    #[case(TimeoutError::AcceptWindowElapsed { battle_id: Uuid::nil() }.into(), 408)]
    fn error_kinds_map_to_status_codes(#[case] error: BattleError, #[case] status: u16) {
        assert_eq!(error.kind().status(), status);
    }

    #[test]
    fn transparent_errors_keep_inner_message() {
        let err: BattleError = ValidationError::InvalidMoveIndex { index: 7 }.into();
        assert_eq!(err.to_string(), "move index 7 is out of range");
    }
}
