//! Porous burner design search.
//!
//! Searches burner geometry (two porosities and a preheat length) for the
//! best trade-off between combustion temperature and NOx emissions. An
//! exponential emission model is fitted to calibration data, then a genetic
//! algorithm and a finite-difference gradient ascent each search the
//! bounded parameter box for every trade-off weight in a sweep.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Parameter, configuration, dataset and result types
//! - `compute`: NOx fitting, fitness evaluation, optimizers and the sweep driver
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use porous_burner::{
//!     compute::{LinearBurnerModel, SweepRunner},
//!     schema::{Dataset, SweepConfig},
//! };
//!
//! let config = SweepConfig {
//!     alphas: vec![1.0, 100.0],
//!     random_seed: Some(42),
//!     datasets: vec![Dataset::new(
//!         "run1",
//!         vec![1150.0, 1250.0, 1350.0, 1450.0],
//!         vec![2.1e-6, 3.4e-6, 5.8e-6, 9.9e-6],
//!     )],
//!     ..Default::default()
//! };
//!
//! let mut runner = SweepRunner::new(config, Arc::new(LinearBurnerModel::default()))?;
//! let report = runner.run();
//!
//! for record in &report.records {
//!     println!("{} alpha={} {}: {}", record.sheet, record.alpha, record.method(), record.result.fitness);
//! }
//! # Ok::<(), porous_burner::schema::ConfigError>(())
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{BurnerModel, FitnessEvaluator, SweepRunner};
pub use schema::{Bounds, ParameterVector, SweepConfig, SweepReport};
