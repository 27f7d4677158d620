use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};

/// Identifier for every species in the catalog. The matching records live in `data/species.ron`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum SpeciesId {
    Cindrake,
    Pyrodrake,
    Infernowyrm,
    Shellpup,
    Tidewarden,
    Abyssaur,
    Sproutling,
    Thornback,
    Verdantaur,
    Voltmouse,
    Stormrat,
    Pebblit,
    Gustling,
    Frostfin,
    Toxitoad,
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
