// Creature Battle Schema - shared reference-data definitions.
// This crate holds the enums and immutable catalog records that both the battle engine
// and its RON data files agree on.

pub use battle_data::*;
pub use creature_types::*;
pub use items::*;
pub use moves::*;
pub use species::*;
pub use species_data::*;

pub mod battle_data;
pub mod creature_types;
pub mod items;
pub mod moves;
pub mod species;
pub mod species_data;
