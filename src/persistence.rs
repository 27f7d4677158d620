//! Profile storage. Profiles are stored as postcard-encoded bytes keyed by player id.

use crate::errors::{BattleResult, DataError, NotFoundError};
use crate::player::PlayerProfile;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

pub trait ProfileStore: Send + Sync {
    fn load(&self, id: &str) -> BattleResult<PlayerProfile>;
    fn save(&self, profile: &PlayerProfile) -> BattleResult<()>;
    fn exists(&self, id: &str) -> bool;
}

pub fn encode_profile(profile: &PlayerProfile) -> BattleResult<Vec<u8>> {
    Ok(postcard::to_allocvec(profile).map_err(DataError::from)?)
}

pub fn decode_profile(bytes: &[u8]) -> BattleResult<PlayerProfile> {
    Ok(postcard::from_bytes(bytes).map_err(DataError::from)?)
}

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, id: &str) -> BattleResult<PlayerProfile> {
        let profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        let bytes = profiles
            .get(id)
            .ok_or_else(|| NotFoundError::Player(id.to_string()))?;
        decode_profile(bytes)
    }

    fn save(&self, profile: &PlayerProfile) -> BattleResult<()> {
        let bytes = encode_profile(profile)?;
        debug!(player = %profile.id, bytes = bytes.len(), "profile saved");
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.id.clone(), bytes);
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}
