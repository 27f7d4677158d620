use crate::battle::rng::BattleRng;
use crate::battle::stats::{calculate_stats, Nature};
use crate::catalog::Catalog;
use crate::errors::{BattleResult, ValidationError};
use schema::{CreatureType, MoveData, MoveId, SpeciesData, SpeciesId, StatBlock, StatusCondition};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use uuid::Uuid;

pub const MAX_MOVES: usize = 4;
pub const MAX_LEVEL: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub move_id: MoveId,
    pub uses: u8,
    pub max_uses: u8,
}

impl MoveSlot {
    pub fn new(data: &MoveData) -> Self {
        Self { move_id: data.id, uses: data.max_uses, max_uses: data.max_uses }
    }

    pub fn has_uses(&self) -> bool {
        self.uses > 0
    }
}

/// A single battling creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: Uuid,
    pub species: SpeciesId,
    pub nickname: Option<String>,
    pub level: u8,
    pub types: Vec<CreatureType>,
    pub base_stats: StatBlock,
    pub ivs: StatBlock,
    pub evs: StatBlock,
    pub nature: Nature,
    /// Derived stats; `stats.hp` is max HP.
    pub stats: StatBlock,
    current_hp: u16,
    pub moves: Vec<MoveSlot>,
    pub status: Option<StatusCondition>,
    /// Experience accumulated past `level³`.
    pub experience: u32,
    pub sprite: String,
}

impl Creature {
    /// Create a creature at full health from species data and an explicit move list.
    pub fn new(
        data: &SpeciesData,
        level: u8,
        ivs: StatBlock,
        nature: Nature,
        moves: Vec<MoveSlot>,
    ) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        let evs = StatBlock::default();
        let stats = calculate_stats(&data.base_stats, &ivs, &evs, level, nature);
        let mut moves = moves;
        moves.truncate(MAX_MOVES);
        Self {
            id: Uuid::new_v4(),
            species: data.id,
            nickname: None,
            level,
            types: data.types.clone(),
            base_stats: data.base_stats,
            ivs,
            evs,
            nature,
            stats,
            current_hp: stats.hp,
            moves,
            status: None,
            experience: 0,
            sprite: data.sprite.clone(),
        }
    }

    /// Perfect IVs, neutral nature, and the newest learnset moves for the level.
    pub fn from_catalog(catalog: &Catalog, species: SpeciesId, level: u8) -> BattleResult<Self> {
        if level == 0 || level > MAX_LEVEL {
            return Err(ValidationError::InvalidLevel(level).into());
        }
        let data = catalog.species(species)?;
        let moves = default_moves(catalog, data, level)?;
        Ok(Self::new(data, level, StatBlock::uniform(31), Nature::Hardy, moves))
    }

    /// Random IVs and nature, as met in the wild.
    pub fn wild(
        catalog: &Catalog,
        species: SpeciesId,
        level: u8,
        rng: &mut dyn BattleRng,
    ) -> BattleResult<Self> {
        if level == 0 || level > MAX_LEVEL {
            return Err(ValidationError::InvalidLevel(level).into());
        }
        let data = catalog.species(species)?;
        let moves = default_moves(catalog, data, level)?;
        let mut ivs = StatBlock::default();
        for stat in schema::Stat::ALL {
            ivs = ivs.with(stat, rng.range_inclusive(0, 31, "individual value"));
        }
        let natures: Vec<Nature> = Nature::iter().collect();
        let pick = rng.range_inclusive(0, natures.len() as u16 - 1, "nature") as usize;
        Ok(Self::new(data, level, ivs, natures[pick], moves))
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn display_name(&self) -> String {
        match &self.nickname {
            Some(name) => name.clone(),
            None => self.species.to_string(),
        }
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn current_hp(&self) -> u16 {
        self.current_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp() == 0 {
            return 0.0;
        }
        self.current_hp as f64 / self.max_hp() as f64
    }

    /// Set HP directly, clamped to `0..=max_hp`.
    pub fn set_hp(&mut self, hp: u16) {
        self.current_hp = hp.min(self.max_hp());
    }

    /// Subtract damage and return how much was actually dealt.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Restore HP up to the maximum and return how much was actually restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let restored = amount.min(self.max_hp() - self.current_hp);
        self.current_hp += restored;
        restored
    }

    /// Full HP, no status and every move refilled.
    pub fn restore_fully(&mut self) {
        self.current_hp = self.max_hp();
        self.status = None;
        for slot in &mut self.moves {
            slot.uses = slot.max_uses;
        }
    }

    /// Recompute derived stats and raise current HP by the max-HP delta.
    pub fn recalculate_stats(&mut self) {
        let old_max = self.max_hp();
        self.stats = calculate_stats(&self.base_stats, &self.ivs, &self.evs, self.level, self.nature);
        let new_max = self.max_hp();
        if new_max >= old_max {
            self.current_hp = (self.current_hp + (new_max - old_max)).min(new_max);
        } else {
            self.current_hp = self.current_hp.min(new_max);
        }
    }

    pub fn knows(&self, move_id: MoveId) -> bool {
        self.moves.iter().any(|slot| slot.move_id == move_id)
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().any(MoveSlot::has_uses)
    }

    /// Experience still needed to reach the next level.
    pub fn experience_to_next_level(&self) -> u32 {
        if self.level >= MAX_LEVEL {
            return 0;
        }
        let next = self.level as u32 + 1;
        let gap = next.pow(3) - (self.level as u32).pow(3);
        gap.saturating_sub(self.experience)
    }

    pub fn has_type(&self, creature_type: CreatureType) -> bool {
        self.types.contains(&creature_type)
    }
}

fn default_moves(catalog: &Catalog, data: &SpeciesData, level: u8) -> BattleResult<Vec<MoveSlot>> {
    data.learnset
        .moves_known_at(level, MAX_MOVES)
        .into_iter()
        .map(|id| catalog.move_data(id).map(MoveSlot::new))
        .collect()
}
