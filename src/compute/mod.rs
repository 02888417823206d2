//! Compute module - Emission fitting, fitness evaluation and the optimizers.

mod fitness;
mod genetic;
mod gradient;
mod nox;
mod rng;
mod sweep;

pub use fitness::*;
pub use genetic::*;
pub use gradient::*;
pub use nox::*;
pub use rng::*;
pub use sweep::*;
