//! Everything a creature gains after a battle: experience, levels, moves, evolution.

pub mod evolution;
pub mod experience;
pub mod moves;
pub mod participation;
pub mod rewards;

pub use evolution::{apply_evolution, apply_item_evolution, item_evolution_candidate};
pub use experience::{grant_experience, ProgressionOutcome};
pub use moves::{learn_move, LearnOutcome, LearnedMove};
pub use participation::ParticipationTracker;
pub use rewards::{experience_share, experience_yield, TrainerReward};
