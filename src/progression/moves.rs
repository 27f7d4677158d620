use crate::catalog::Catalog;
use crate::creature::{Creature, MoveSlot, MAX_MOVES};
use crate::errors::BattleResult;
use schema::MoveId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearnOutcome {
    AlreadyKnown,
    Learned,
    /// The move set was full; the oldest move was forgotten to make room.
    Replaced { forgotten: MoveId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedMove {
    pub move_id: MoveId,
    pub level: u8,
    pub outcome: LearnOutcome,
}

/// Teach `move_id` to `creature`. A full move set forgets its first slot.
pub fn learn_move(creature: &mut Creature, move_id: MoveId, catalog: &Catalog) -> BattleResult<LearnOutcome> {
    if creature.knows(move_id) {
        return Ok(LearnOutcome::AlreadyKnown);
    }
    let slot = MoveSlot::new(catalog.move_data(move_id)?);
    if creature.moves.len() < MAX_MOVES {
        creature.moves.push(slot);
        return Ok(LearnOutcome::Learned);
    }
    let forgotten = creature.moves.remove(0).move_id;
    creature.moves.push(slot);
    Ok(LearnOutcome::Replaced { forgotten })
}
