use crate::creature::Creature;
use schema::{Stat, StatBlock, StatusCondition};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator};

/// Personality that nudges one stat up by 10% and another down by 10%.
/// The five natures on the diagonal of the grid are neutral.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Nature {
    #[default]
    Hardy,
    Lonely,
    Brave,
    Adamant,
    Naughty,
    Bold,
    Docile,
    Relaxed,
    Impish,
    Lax,
    Timid,
    Hasty,
    Serious,
    Jolly,
    Naive,
    Modest,
    Mild,
    Quiet,
    Bashful,
    Rash,
    Calm,
    Gentle,
    Sassy,
    Careful,
    Quirky,
}

// Row and column order of the nature grid.
const NATURE_GRID: [Stat; 5] = [
    Stat::Attack,
    Stat::Defense,
    Stat::Speed,
    Stat::SpecialAttack,
    Stat::SpecialDefense,
];

impl Nature {
    pub fn all() -> impl Iterator<Item = Nature> {
        Nature::iter()
    }

    /// `(boosted, hindered)` stats, or `None` for neutral natures.
    pub fn modifiers(self) -> Option<(Stat, Stat)> {
        let index = self as usize;
        let (up, down) = (index / 5, index % 5);
        if up == down {
            None
        } else {
            Some((NATURE_GRID[up], NATURE_GRID[down]))
        }
    }

    /// Apply the nature to an already derived stat value, flooring the result.
    pub fn apply(self, stat: Stat, value: u16) -> u16 {
        match self.modifiers() {
            Some((up, _)) if up == stat => (value as u32 * 11 / 10) as u16,
            Some((_, down)) if down == stat => (value as u32 * 9 / 10) as u16,
            _ => value,
        }
    }
}

fn scaled(base: u16, iv: u16, ev: u16, level: u8) -> u32 {
    ((2 * base as u32 + iv as u32 + ev as u32 / 4) * level as u32) / 100
}

/// Derive the full stat block for a creature. The `hp` field of the result is max HP.
pub fn calculate_stats(
    base: &StatBlock,
    ivs: &StatBlock,
    evs: &StatBlock,
    level: u8,
    nature: Nature,
) -> StatBlock {
    let mut derived = StatBlock::default();
    for stat in Stat::ALL {
        let core = scaled(base.get(stat), ivs.get(stat), evs.get(stat), level);
        let value = match stat {
            Stat::Hp => (core + level as u32 + 10) as u16,
            _ => nature.apply(stat, (core + 5) as u16),
        };
        derived = derived.with(stat, value);
    }
    derived
}

/// Speed used for turn order. Paralysis quarters it.
pub fn effective_speed(creature: &Creature) -> u16 {
    let speed = creature.stats.speed;
    if creature.status == Some(StatusCondition::Paralysis) {
        speed / 4
    } else {
        speed
    }
}
