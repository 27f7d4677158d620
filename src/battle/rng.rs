use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of every probability-gated outcome in a battle.
///
/// Implementors only have to supply `next_outcome`, a percentile roll in `1..=100`.
/// The remaining helpers derive from it, and real randomness sources override
/// them for full precision.
pub trait BattleRng {
    /// A percentile roll in `1..=100`. `reason` names what the roll decides.
    fn next_outcome(&mut self, reason: &str) -> u8;

    /// A uniform draw in `[0, 1)`.
    fn next_unit(&mut self, reason: &str) -> f64 {
        (self.next_outcome(reason).clamp(1, 100) as f64 - 1.0) / 100.0
    }

    /// A uniform integer in `[low, high]`.
    fn range_inclusive(&mut self, low: u16, high: u16, reason: &str) -> u16 {
        let outcome = self.next_outcome(reason).clamp(1, 100) as u32;
        let span = (high - low) as u32 + 1;
        low + ((outcome - 1) * span / 100) as u16
    }

    /// True with `percent` percent probability.
    fn chance(&mut self, percent: u8, reason: &str) -> bool {
        self.next_outcome(reason) <= percent
    }

    /// True with probability `1/n`.
    ///
    /// On the default percentile mapping this is coarse: for `n = 16` outcomes 1 to 7 all
    /// hit, so a percentile source fires 7% of the time rather than 6.25%. Scripts force a
    /// hit with outcome 1 and a miss with anything above 7.
    fn one_in(&mut self, n: u16, reason: &str) -> bool {
        self.range_inclusive(1, n, reason) == 1
    }

    fn coin_flip(&mut self, reason: &str) -> bool {
        self.chance(50, reason)
    }
}

/// Scripted outcomes for deterministic tests. Panics when the script runs dry.
#[derive(Debug, Clone)]
pub struct TurnRng {
    outcomes: Vec<u8>,
    index: usize,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self { outcomes, index: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len().saturating_sub(self.index)
    }
}

impl BattleRng for TurnRng {
    fn next_outcome(&mut self, reason: &str) -> u8 {
        if self.index >= self.outcomes.len() {
            panic!(
                "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                reason
            );
        }
        let outcome = self.outcomes[self.index];

        #[cfg(test)]
        println!("[RNG] Consumed {} for: {}", outcome, reason);

        self.index += 1;
        outcome
    }
}

/// Real randomness backed by `StdRng`, optionally seeded for reproducible simulations.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn from_seed(seed: u64) -> Self {
        Self { inner: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { inner: StdRng::from_os_rng() }
    }
}

impl BattleRng for SeededRng {
    fn next_outcome(&mut self, _reason: &str) -> u8 {
        self.inner.random_range(1..=100)
    }

    fn next_unit(&mut self, _reason: &str) -> f64 {
        self.inner.random::<f64>()
    }

    fn range_inclusive(&mut self, low: u16, high: u16, _reason: &str) -> u16 {
        self.inner.random_range(low..=high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_maps_onto_damage_roll_bounds() {
        let mut rng = TurnRng::new_for_test(vec![1, 100, 50]);
        assert_eq!(rng.range_inclusive(85, 100, "low"), 85);
        assert_eq!(rng.range_inclusive(85, 100, "high"), 100);
        assert_eq!(rng.range_inclusive(85, 100, "mid"), 92);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn chance_is_inclusive_of_threshold() {
        let mut rng = TurnRng::new_for_test(vec![25, 26]);
        assert!(rng.chance(25, "hit"));
        assert!(!rng.chance(25, "miss"));
    }

    #[test]
    fn one_in_sixteen_hits_on_the_first_seven_percentiles() {
        let mut rng = TurnRng::new_for_test((1..=100).collect());
        let hits: Vec<u8> = (1..=100u8).filter(|_| rng.one_in(16, "crit")).collect();
        assert_eq!(hits, (1..=7).collect::<Vec<u8>>());
    }

    #[test]
    #[should_panic(expected = "TurnRng exhausted")]
    fn exhausted_script_panics_with_reason() {
        let mut rng = TurnRng::new_for_test(vec![]);
        rng.next_outcome("nothing left");
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = SeededRng::from_seed(7);
        let mut b = SeededRng::from_seed(7);
        for _ in 0..20 {
            assert_eq!(a.range_inclusive(85, 100, "a"), b.range_inclusive(85, 100, "b"));
        }
        let unit = a.next_unit("unit");
        assert!((0.0..1.0).contains(&unit));
    }
}
