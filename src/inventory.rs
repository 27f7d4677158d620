//! Item counts consumed by battles and granted by rewards.

use crate::errors::{BattleResult, ValidationError};
use schema::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anything that can report and change how many of an item a player holds.
pub trait InventoryService {
    fn count(&self, item: Item) -> u32;
    fn consume(&mut self, item: Item) -> BattleResult<()>;
    fn add(&mut self, item: Item, amount: u32);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<Item, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, item: Item, amount: u32) -> Self {
        self.add(item, amount);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Item, u32)> + '_ {
        self.items.iter().map(|(item, count)| (*item, *count))
    }

    /// Fail unless at least one of `item` is held.
    pub fn require(&self, item: Item) -> BattleResult<()> {
        if self.count(item) == 0 {
            return Err(ValidationError::ItemUnavailable(item).into());
        }
        Ok(())
    }
}

impl InventoryService for Inventory {
    fn count(&self, item: Item) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    fn consume(&mut self, item: Item) -> BattleResult<()> {
        match self.items.get_mut(&item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.items.remove(&item);
                }
                Ok(())
            }
            _ => Err(ValidationError::ItemUnavailable(item).into()),
        }
    }

    fn add(&mut self, item: Item, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.items.entry(item).or_insert(0) += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_decrements_and_drops_empty_entries() {
        let mut bag = Inventory::new().with(Item::Potion, 2);
        bag.consume(Item::Potion).unwrap();
        assert_eq!(bag.count(Item::Potion), 1);
        bag.consume(Item::Potion).unwrap();
        assert!(bag.is_empty());
        assert!(bag.consume(Item::Potion).is_err());
    }

    #[test]
    fn require_reports_missing_item() {
        let bag = Inventory::new();
        let err = bag.require(Item::StandardCapsule).unwrap_err();
        assert_eq!(err.to_string(), "no Standard Capsule left in the bag");
    }
}
