use crate::battle::rng::BattleRng;
use schema::Item;

/// Probability in `[0, ∞)` that a capture device holds the target.
/// Values of 1.0 or more always succeed.
pub fn capture_chance(catch_rate: u8, hp_ratio: f64, modifier: f64) -> f64 {
    let hp_ratio = hp_ratio.clamp(0.0, 1.0);
    (catch_rate as f64 / 255.0) * (1.0 - hp_ratio * 0.5) * modifier
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRoll {
    pub chance: f64,
    /// The uniform draw, absent when the device needs no roll.
    pub roll: Option<f64>,
    pub success: bool,
}

/// Roll for capture. A guaranteed device succeeds without consuming randomness.
pub fn roll_capture(catch_rate: u8, hp_ratio: f64, device: Item, rng: &mut dyn BattleRng) -> CaptureRoll {
    let modifier = device.capture_modifier().unwrap_or(0.0);
    let chance = capture_chance(catch_rate, hp_ratio, modifier);
    if device.is_guaranteed_capture() {
        return CaptureRoll { chance, roll: None, success: true };
    }
    let roll = rng.next_unit("capture roll");
    CaptureRoll { chance, roll: Some(roll), success: roll < chance }
}

/// A descriptive bucket for display purposes.
pub fn capture_chance_description(chance: f64) -> &'static str {
    match chance {
        c if c >= 0.8 => "Excellent",
        c if c >= 0.6 => "Very Good",
        c if c >= 0.4 => "Good",
        c if c >= 0.2 => "Fair",
        c if c >= 0.1 => "Poor",
        _ => "Very Poor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::rng::TurnRng;
    use rstest::rstest;

    #[rstest]
    #[case(255, 1.0, 1.0, 0.5)]
    #[case(255, 0.0, 1.0, 1.0)]
    #[case(45, 1.0, 2.0, 45.0 / 255.0)]
    #[case(190, 0.5, 1.5, 190.0 / 255.0 * 0.75 * 1.5)]
    fn chance_formula(#[case] rate: u8, #[case] hp_ratio: f64, #[case] modifier: f64, #[case] expected: f64) {
        assert!((capture_chance(rate, hp_ratio, modifier) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(1, 1.0)]
    #[case(3, 1.0)]
    #[case(3, 0.01)]
    #[case(255, 1.0)]
    fn guaranteed_device_always_succeeds(#[case] rate: u8, #[case] hp_ratio: f64) {
        let mut rng = TurnRng::new_for_test(vec![]);
        let roll = roll_capture(rate, hp_ratio, Item::GuaranteedCapsule, &mut rng);
        assert!(roll.success);
        assert_eq!(roll.roll, None);
        assert_eq!(rng.consumed(), 0);
    }

    #[rstest]
    #[case(vec![1], true, "lowest draw is under a 0.5 chance")]
    #[case(vec![50], true, "0.49 is under 0.5")]
    #[case(vec![51], false, "0.50 is not strictly under 0.5")]
    #[case(vec![100], false, "highest draw fails")]
    fn standard_device_rolls_against_chance(#[case] rng_values: Vec<u8>, #[case] expected: bool, #[case] description: &str) {
        let mut rng = TurnRng::new_for_test(rng_values);
        let roll = roll_capture(255, 1.0, Item::StandardCapsule, &mut rng);
        assert_eq!(roll.success, expected, "{}", description);
    }

    #[test]
    fn description_buckets() {
        assert_eq!(capture_chance_description(0.95), "Excellent");
        assert_eq!(capture_chance_description(0.05), "Very Poor");
    }
}
