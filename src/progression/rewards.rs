use serde::{Deserialize, Serialize};

const TRAINER_MULTIPLIER: f64 = 1.5;

/// Paid out once when a trainer battle is won.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerReward {
    pub currency: u32,
    pub badge: Option<String>,
}

/// Experience a defeated creature is worth in total.
pub fn experience_yield(base_exp: u16, level: u8, trainer_owned: bool) -> u32 {
    let base = (base_exp as f64 * level as f64 / 7.0).floor();
    let total = if trainer_owned { (base * TRAINER_MULTIPLIER).floor() } else { base };
    total as u32
}

/// Each participant's share of `total`. Nobody left standing gets nothing.
pub fn experience_share(total: u32, participants: usize) -> u32 {
    if participants == 0 {
        return 0;
    }
    total / participants as u32
}
