//! Schema module - Parameter, configuration, dataset and result types.

mod config;
mod dataset;
mod params;
mod result;

pub use config::*;
pub use dataset::*;
pub use params::*;
pub use result::*;
