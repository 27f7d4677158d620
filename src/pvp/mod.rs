//! Asynchronous two-player battles coordinated between remote participants.

pub mod clock;
pub mod coordinator;
pub mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::PvpCoordinator;
pub use record::{
    BattleStatus, BattleView, CancelReason, ChallengeSummary, FinishReason, Participant, PvpBattleRecord,
    StuckBattle, SubmittedAction,
};

#[cfg(test)]
pub(crate) mod tests;
