//! Immutable species and move lookup built from the bundled RON data.

use crate::errors::{BattleResult, DataError, NotFoundError};
use schema::{MoveData, MoveId, SpeciesData, SpeciesId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

const SPECIES_RON: &str = include_str!("../data/species.ron");
const MOVES_RON: &str = include_str!("../data/moves.ron");

#[derive(Debug, Clone)]
pub struct Catalog {
    species: HashMap<SpeciesId, SpeciesData>,
    moves: HashMap<MoveId, MoveData>,
}

static BUILTIN: OnceLock<Arc<Catalog>> = OnceLock::new();

impl Catalog {
    /// Parse species and move lists and cross-check every learnset and evolution reference.
    pub fn from_ron(species_src: &str, moves_src: &str) -> BattleResult<Self> {
        let species: Vec<SpeciesData> = ron::from_str(species_src).map_err(DataError::from)?;
        let moves: Vec<MoveData> = ron::from_str(moves_src).map_err(DataError::from)?;

        let catalog = Self {
            species: species.into_iter().map(|s| (s.id, s)).collect(),
            moves: moves.into_iter().map(|m| (m.id, m)).collect(),
        };
        catalog.check_references()?;
        debug!(
            species = catalog.species.len(),
            moves = catalog.moves.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// The catalog compiled into the binary, parsed once per process.
    pub fn builtin() -> BattleResult<Arc<Catalog>> {
        if let Some(catalog) = BUILTIN.get() {
            return Ok(catalog.clone());
        }
        let catalog = Arc::new(Self::from_ron(SPECIES_RON, MOVES_RON)?);
        Ok(BUILTIN.get_or_init(|| catalog).clone())
    }

    fn check_references(&self) -> BattleResult<()> {
        for data in self.species.values() {
            if data.types.is_empty() || data.types.len() > 2 {
                return Err(DataError::Invalid(format!("{} must have one or two types", data.name)).into());
            }
            for move_id in data.learnset.level_up.values().flatten() {
                if !self.moves.contains_key(move_id) {
                    return Err(DataError::Invalid(format!("{} learns unknown move {}", data.name, move_id)).into());
                }
            }
            for evolution in &data.evolutions {
                if !self.species.contains_key(&evolution.evolves_into) {
                    return Err(DataError::Invalid(format!(
                        "{} evolves into unknown species {}",
                        data.name, evolution.evolves_into
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    pub fn species(&self, id: SpeciesId) -> BattleResult<&SpeciesData> {
        self.species.get(&id).ok_or_else(|| NotFoundError::Species(id).into())
    }

    pub fn move_data(&self, id: MoveId) -> BattleResult<&MoveData> {
        self.moves.get(&id).ok_or_else(|| NotFoundError::Move(id).into())
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}
