pub mod attempt;
pub mod calculation;
pub mod validation;

pub use attempt::*;
pub use calculation::*;
pub use validation::*;
