use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum Item {
    // Capture devices
    StandardCapsule,
    ImprovedCapsule,
    SuperiorCapsule,
    GuaranteedCapsule,
    // Healing
    Potion,
    SuperPotion,
    FullHeal,
    // Evolution stones
    FireStone,
    WaterStone,
    ThunderStone,
    LeafStone,
}

/// What a healing item does when used on a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Healing {
    RestoreHp(u16),
    CureStatus,
}

impl Item {
    /// Multiplier applied to the capture chance, or `None` for items that are not capture devices.
    pub fn capture_modifier(self) -> Option<f64> {
        match self {
            Item::StandardCapsule => Some(1.0),
            Item::ImprovedCapsule => Some(1.5),
            Item::SuperiorCapsule => Some(2.0),
            Item::GuaranteedCapsule => Some(255.0),
            _ => None,
        }
    }

    pub fn is_capture_device(self) -> bool {
        self.capture_modifier().is_some()
    }

    pub fn is_guaranteed_capture(self) -> bool {
        self == Item::GuaranteedCapsule
    }

    pub fn healing(self) -> Option<Healing> {
        match self {
            Item::Potion => Some(Healing::RestoreHp(20)),
            Item::SuperPotion => Some(Healing::RestoreHp(50)),
            Item::FullHeal => Some(Healing::CureStatus),
            _ => None,
        }
    }

    pub fn is_evolution_stone(self) -> bool {
        matches!(
            self,
            Item::FireStone | Item::WaterStone | Item::ThunderStone | Item::LeafStone
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Item::StandardCapsule => "Standard Capsule",
            Item::ImprovedCapsule => "Improved Capsule",
            Item::SuperiorCapsule => "Superior Capsule",
            Item::GuaranteedCapsule => "Guaranteed Capsule",
            Item::Potion => "Potion",
            Item::SuperPotion => "Super Potion",
            Item::FullHeal => "Full Heal",
            Item::FireStone => "Fire Stone",
            Item::WaterStone => "Water Stone",
            Item::ThunderStone => "Thunder Stone",
            Item::LeafStone => "Leaf Stone",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
