use crate::{CreatureType, Item, MoveId, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
    ];
}

/// Six-stat block used for base stats, individual values, effort values and derived stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBlock {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub special_attack: u16,
    pub special_defense: u16,
    pub speed: u16,
}

impl StatBlock {
    pub const fn new(
        hp: u16,
        attack: u16,
        defense: u16,
        special_attack: u16,
        special_defense: u16,
        speed: u16,
    ) -> Self {
        Self { hp, attack, defense, special_attack, special_defense, speed }
    }

    pub const fn uniform(value: u16) -> Self {
        Self::new(value, value, value, value, value, value)
    }

    pub fn get(&self, stat: Stat) -> u16 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
        }
    }

    pub fn with(mut self, stat: Stat, value: u16) -> Self {
        match stat {
            Stat::Hp => self.hp = value,
            Stat::Attack => self.attack = value,
            Stat::Defense => self.defense = value,
            Stat::SpecialAttack => self.special_attack = value,
            Stat::SpecialDefense => self.special_defense = value,
            Stat::Speed => self.speed = value,
        }
        self
    }

    pub fn total(&self) -> u32 {
        Stat::ALL.iter().map(|s| self.get(*s) as u32).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Learnset {
    /// level -> moves learned on reaching that level
    pub level_up: BTreeMap<u8, Vec<MoveId>>,
}

impl Learnset {
    pub fn learns_at_level(&self, level: u8) -> &[MoveId] {
        self.level_up.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The most recent moves learnable at or below `level`, newest last, capped at `limit`.
    pub fn moves_known_at(&self, level: u8, limit: usize) -> Vec<MoveId> {
        let mut known: Vec<MoveId> = Vec::new();
        for (_, moves) in self.level_up.range(..=level) {
            for move_id in moves {
                if !known.contains(move_id) {
                    known.push(*move_id);
                }
            }
        }
        let skip = known.len().saturating_sub(limit);
        known.into_iter().skip(skip).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionMethod {
    Level(u8),
    Item(Item),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionData {
    pub evolves_into: SpeciesId,
    pub method: EvolutionMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: SpeciesId,
    pub name: String,
    pub types: Vec<CreatureType>,
    pub base_stats: StatBlock,
    pub learnset: Learnset,
    pub catch_rate: u8,
    pub base_exp: u16,
    pub description: String,
    /// Opaque asset reference; never resolved by the engine.
    #[serde(default)]
    pub sprite: String,
    #[serde(default)]
    pub evolutions: Vec<EvolutionData>,
}

impl SpeciesData {
    /// First level-method evolution whose requirement `level` satisfies.
    pub fn level_evolution(&self, level: u8) -> Option<SpeciesId> {
        self.evolutions.iter().find_map(|evo| match evo.method {
            EvolutionMethod::Level(required) if level >= required => Some(evo.evolves_into),
            _ => None,
        })
    }

    pub fn item_evolution(&self, item: Item) -> Option<SpeciesId> {
        self.evolutions.iter().find_map(|evo| match evo.method {
            EvolutionMethod::Item(required) if required == item => Some(evo.evolves_into),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learnset() -> Learnset {
        let mut level_up = BTreeMap::new();
        level_up.insert(1, vec![MoveId::Scratch, MoveId::Tackle]);
        level_up.insert(7, vec![MoveId::Ember]);
        level_up.insert(13, vec![MoveId::FireFang]);
        level_up.insert(20, vec![MoveId::Flamethrower]);
        level_up.insert(30, vec![MoveId::SunnyDay]);
        Learnset { level_up }
    }

    #[test]
    fn moves_known_at_keeps_the_newest() {
        let learnset = learnset();
        assert_eq!(learnset.moves_known_at(5, 4), vec![MoveId::Scratch, MoveId::Tackle]);
        assert_eq!(
            learnset.moves_known_at(30, 4),
            vec![MoveId::Ember, MoveId::FireFang, MoveId::Flamethrower, MoveId::SunnyDay]
        );
    }

    #[test]
    fn learns_at_level_is_empty_between_entries() {
        assert!(learnset().learns_at_level(8).is_empty());
        assert_eq!(learnset().learns_at_level(7), &[MoveId::Ember]);
    }

    #[test]
    fn stat_block_with_replaces_single_stat() {
        let block = StatBlock::uniform(10).with(Stat::Speed, 99);
        assert_eq!(block.speed, 99);
        assert_eq!(block.total(), 50 + 99);
    }
}
