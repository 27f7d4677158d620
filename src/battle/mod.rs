pub mod ai;
pub mod catch;
pub mod damage;
pub mod engine;
pub mod rng;
pub mod state;
pub mod stats;
pub mod turn_orchestrator;

#[cfg(test)]
pub(crate) mod tests;
