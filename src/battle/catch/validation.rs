use crate::creature::Creature;
use schema::{Item, SpeciesId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum CatchError {
    /// Only wild creatures can be captured
    #[error("only wild creatures can be captured")]
    NotWildEncounter,
    /// Target is already fainted
    #[error("{species} has fainted")]
    TargetFainted { species: SpeciesId },
    /// The thrown item is not a capture device
    #[error("{item} is not a capture device")]
    NotACaptureDevice { item: Item },
}

/// Check whether a capture attempt may be made against `target`.
pub fn can_attempt_capture(is_wild: bool, target: &Creature, device: Item) -> Result<SpeciesId, CatchError> {
    if !device.is_capture_device() {
        return Err(CatchError::NotACaptureDevice { item: device });
    }
    if !is_wild {
        return Err(CatchError::NotWildEncounter);
    }
    if target.is_fainted() {
        return Err(CatchError::TargetFainted { species: target.species });
    }
    Ok(target.species)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::TestCreatureBuilder;
    use rstest::rstest;

    #[rstest]
    #[case(true, false, Item::StandardCapsule, Ok(SpeciesId::Gustling), "wild healthy target")]
    #[case(false, false, Item::StandardCapsule, Err(CatchError::NotWildEncounter), "trainer battle")]
    #[case(true, true, Item::SuperiorCapsule, Err(CatchError::TargetFainted { species: SpeciesId::Gustling }), "fainted target")]
    #[case(true, false, Item::Potion, Err(CatchError::NotACaptureDevice { item: Item::Potion }), "not a device")]
    fn capture_validation(
        #[case] is_wild: bool,
        #[case] fainted: bool,
        #[case] device: Item,
        #[case] expected: Result<SpeciesId, CatchError>,
        #[case] description: &str,
    ) {
        let hp = if fainted { 0 } else { 10 };
        let target = TestCreatureBuilder::new(SpeciesId::Gustling, 8).with_hp(hp).build();
        assert_eq!(can_attempt_capture(is_wild, &target, device), expected, "{}", description);
    }
}
