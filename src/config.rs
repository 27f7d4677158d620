//! Tunables for battles and the PvP coordinator, loadable from a RON file.

use crate::errors::{BattleResult, DataError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub coordinator: CoordinatorConfig,
    pub rules: BattleRules,
}

/// Time windows enforced by the PvP coordinator, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub accept_window_ms: u64,
    pub heartbeat_grace_ms: u64,
    pub turn_timeout_ms: u64,
    pub stale_window_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            accept_window_ms: 120_000,
            heartbeat_grace_ms: 30_000,
            turn_timeout_ms: 90_000,
            stale_window_ms: 600_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    /// Duration used when a weather move does not name one.
    pub weather_turns: u8,
    /// Sandstorm and hail chip non-immune creatures for 1/16 max HP each round.
    pub weather_chip_damage: bool,
    pub max_level: u8,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            weather_turns: 5,
            weather_chip_damage: true,
            max_level: 100,
        }
    }
}

impl GameConfig {
    pub fn from_ron(source: &str) -> BattleResult<Self> {
        let config = ron::from_str(source).map_err(DataError::from)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> BattleResult<Self> {
        let source = std::fs::read_to_string(path).map_err(DataError::from)?;
        Self::from_ron(&source)
    }
}
