use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};

/// Identifier for every move in the catalog. The matching records live in `data/moves.ron`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum MoveId {
    // Normal
    Tackle,
    Scratch,
    QuickAttack,
    BodySlam,
    // Fire
    Ember,
    Flamethrower,
    FireFang,
    WillOWisp,
    // Water
    WaterGun,
    BubbleBeam,
    // Grass
    VineWhip,
    RazorLeaf,
    SleepPowder,
    // Electric
    ThunderShock,
    Thunderbolt,
    ThunderWave,
    // Poison
    PoisonPowder,
    PoisonSting,
    // Flying
    Gust,
    WingAttack,
    // Rock / Ground
    RockThrow,
    MudSlap,
    // Ice
    IceBeam,
    PowderSnow,
    // Psychic / Dark
    Confusion,
    Bite,
    // Weather
    SunnyDay,
    RainDance,
    Sandstorm,
    Hail,
    // Used only when nothing else has uses left; never learned.
    Struggle,
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
