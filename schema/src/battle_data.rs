use crate::{CreatureType, MoveId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveCategory::Physical => write!(f, "Physical"),
            MoveCategory::Special => write!(f, "Special"),
            MoveCategory::Status => write!(f, "Status"),
        }
    }
}

/// Persistent status conditions. A creature carries at most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCondition {
    Burn,
    Paralysis,
    Sleep,
    Poison,
    Freeze,
}

impl StatusCondition {
    /// Types that can never receive this condition.
    pub fn immune_types(self) -> &'static [CreatureType] {
        match self {
            StatusCondition::Burn => &[CreatureType::Fire],
            StatusCondition::Freeze => &[CreatureType::Ice],
            StatusCondition::Poison => &[CreatureType::Poison],
            StatusCondition::Paralysis => &[CreatureType::Electric],
            StatusCondition::Sleep => &[],
        }
    }

    pub fn blocked_by(self, types: &[CreatureType]) -> bool {
        types.iter().any(|t| self.immune_types().contains(t))
    }

    /// Burn and poison chip their bearer at the end of every round.
    pub fn deals_residual_damage(self) -> bool {
        matches!(self, StatusCondition::Burn | StatusCondition::Poison)
    }
}

impl fmt::Display for StatusCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCondition::Burn => "burn",
            StatusCondition::Paralysis => "paralysis",
            StatusCondition::Sleep => "sleep",
            StatusCondition::Poison => "poison",
            StatusCondition::Freeze => "freeze",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeatherKind {
    #[default]
    Clear,
    Sun,
    Rain,
    Sandstorm,
    Hail,
}

impl WeatherKind {
    /// Types that shrug off the end-of-round chip damage of this weather.
    pub fn chip_immune_types(self) -> &'static [CreatureType] {
        match self {
            WeatherKind::Sandstorm => &[CreatureType::Rock, CreatureType::Ground],
            WeatherKind::Hail => &[CreatureType::Ice],
            _ => &[],
        }
    }

    pub fn deals_chip_damage(self) -> bool {
        matches!(self, WeatherKind::Sandstorm | WeatherKind::Hail)
    }
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeatherKind::Clear => "clear skies",
            WeatherKind::Sun => "harsh sunlight",
            WeatherKind::Rain => "rain",
            WeatherKind::Sandstorm => "sandstorm",
            WeatherKind::Hail => "hail",
        };
        write!(f, "{}", name)
    }
}

/// Extra outcome a move may trigger after it connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SecondaryEffect {
    /// Inflict `status` on the target with `chance` percent probability.
    InflictStatus { status: StatusCondition, chance: u8 },
    /// Replace the field weather for `turns` rounds.
    SetWeather { weather: WeatherKind, turns: u8 },
    /// The user takes `percent` percent of the damage it dealt.
    Recoil { percent: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub id: MoveId,
    pub name: String,
    pub move_type: CreatureType,
    pub category: MoveCategory,
    pub power: u16,
    /// `None` means the move never misses.
    pub accuracy: Option<u8>,
    pub max_uses: u8,
    #[serde(default)]
    pub priority: i8,
    pub description: String,
    #[serde(default)]
    pub effects: Vec<SecondaryEffect>,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status && self.power > 0
    }
}

impl fmt::Display for MoveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} / {})", self.name, self.move_type, self.category)?;
        let power = if self.power > 0 { self.power.to_string() } else { "--".to_string() };
        let accuracy = self.accuracy.map(|a| a.to_string()).unwrap_or_else(|| "--".to_string());
        writeln!(f, "Power: {}  Accuracy: {}  Uses: {}", power, accuracy, self.max_uses)?;
        write!(f, "{}", self.description)
    }
}
