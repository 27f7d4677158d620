use crate::battle::rng::TurnRng;
use crate::battle::state::{Arena, BattleSide};
use crate::battle::stats::Nature;
use crate::catalog::Catalog;
use crate::creature::{Creature, MoveSlot};
use crate::errors::BattleResult;
use schema::{MoveData, MoveId, SpeciesId, StatBlock, StatusCondition};

/// A builder for creating test creatures with common defaults.
///
/// # Example
/// ```ignore
/// let creature = TestCreatureBuilder::new(SpeciesId::Voltmouse, 25)
///     .with_moves(vec![MoveId::Tackle])
///     .with_status(StatusCondition::Paralysis)
///     .build();
/// ```
pub struct TestCreatureBuilder {
    species: SpeciesId,
    level: u8,
    moves: Option<Vec<MoveId>>,
    status: Option<StatusCondition>,
    current_hp: Option<u16>,
    nature: Nature,
    speed: Option<u16>,
}

impl TestCreatureBuilder {
    /// Creates a new builder for a given species and level.
    pub fn new(species: SpeciesId, level: u8) -> Self {
        Self {
            species,
            level,
            moves: None,
            status: None,
            current_hp: None,
            nature: Nature::Hardy,
            speed: None,
        }
    }

    /// Sets the moves for the test creature.
    pub fn with_moves(mut self, moves: Vec<MoveId>) -> Self {
        self.moves = Some(moves);
        self
    }

    /// Sets the status condition for the test creature.
    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the current HP for the test creature. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn with_nature(mut self, nature: Nature) -> Self {
        self.nature = nature;
        self
    }

    /// Overrides the derived speed stat directly, for turn-order tests.
    pub fn with_speed(mut self, speed: u16) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn build(self) -> Creature {
        let catalog = assert_ok(Catalog::builtin());
        let data = assert_ok(catalog.species(self.species));
        let moves = match self.moves {
            Some(ids) => ids.into_iter().map(|id| MoveSlot::new(&move_data(id))).collect(),
            None => data
                .learnset
                .moves_known_at(self.level, 4)
                .into_iter()
                .map(|id| MoveSlot::new(&move_data(id)))
                .collect(),
        };

        let mut creature = Creature::new(data, self.level, StatBlock::uniform(31), self.nature, moves);
        creature.status = self.status;
        if let Some(speed) = self.speed {
            creature.stats.speed = speed;
        }
        if let Some(hp) = self.current_hp {
            creature.set_hp(hp);
        }
        creature
    }
}

/// Looks up move data from the built-in catalog.
pub fn move_data(id: MoveId) -> MoveData {
    let catalog = assert_ok(Catalog::builtin());
    assert_ok(catalog.move_data(id)).clone()
}

/// Creates a standard 1v1 arena for testing.
pub fn create_test_arena(p1: Creature, p2: Creature) -> Arena {
    Arena::new(BattleSide::new("Player 1", vec![p1]), BattleSide::new("Player 2", vec![p2]))
}

pub fn create_team_arena(p1: Vec<Creature>, p2: Vec<Creature>) -> Arena {
    Arena::new(BattleSide::new("Player 1", p1), BattleSide::new("Player 2", p2))
}

/// Creates a `TurnRng` with a generous buffer of middling values.
/// Useful for tests where the specific RNG outcome is not important.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 100])
}

/// Asserts that a Result is Ok and returns the value.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
