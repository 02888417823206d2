//! Fitness evaluation for burner designs.
//!
//! The physics (flame simulation, CFD, or a placeholder formula) sits behind
//! the [`BurnerModel`] trait. [`FitnessEvaluator`] turns a model output into
//! a scalar fitness for a given trade-off weight and emission coefficients:
//!
//! ```text
//! NOx     = c1 * exp(c2 * (T - 1000) / 100)
//! fitness = T / 1000 - alpha * (NOx * 1e6)
//! ```
//!
//! Model failures never reach the optimizers. They become [`FAILURE_FITNESS`],
//! which selection pressure discards on its own.

use std::sync::Arc;

use log::{debug, warn};

use crate::schema::{ConfigError, Interval, NoxCoefficients, ParameterVector};

/// Fitness assigned to candidates whose evaluation failed.
pub const FAILURE_FITNESS: f64 = -1e12;

/// Nominal combustion temperature the emission exponent is centered on (K).
pub const NOMINAL_TEMPERATURE: f64 = 1000.0;

/// Temperature span of one unit of the emission exponent (K).
pub const TEMPERATURE_SCALE: f64 = 100.0;

/// Converts NOx mass fraction to ppm.
pub const NOX_PPM: f64 = 1e6;

/// Penalty per meter of flame anchoring outside the configured window.
pub const FLAME_PENALTY: f64 = 1e6;

/// Output of one burner simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnerOutput {
    /// Heat release, or peak temperature for temperature-based models.
    pub heat_release: f64,
    /// NOx reported by the model itself (informational).
    pub nox: f64,
    /// Flame anchoring position (m).
    pub flame_location: f64,
}

/// Failure of the external simulation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SimulationError {
    #[error("Solver did not converge: {0}")]
    NonConvergence(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Simulation failed: {0}")]
    Other(String),
}

/// The external burner simulation.
///
/// Calls may be slow and are made concurrently from worker threads.
pub trait BurnerModel: Send + Sync {
    fn simulate(&self, params: &ParameterVector) -> Result<BurnerOutput, SimulationError>;
}

impl<F> BurnerModel for F
where
    F: Fn(&ParameterVector) -> Result<BurnerOutput, SimulationError> + Send + Sync,
{
    fn simulate(&self, params: &ParameterVector) -> Result<BurnerOutput, SimulationError> {
        self(params)
    }
}

/// Placeholder analytic model: temperature linear in each parameter.
///
/// Defaults to `T = 1000 + 500*p0 + 300*p1 + 200*p2`. Does not resolve NOx,
/// and reports the flame at the end of the preheat zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearBurnerModel {
    pub base: f64,
    pub weights: [f64; 3],
}

impl Default for LinearBurnerModel {
    fn default() -> Self {
        Self {
            base: 1000.0,
            weights: [500.0, 300.0, 200.0],
        }
    }
}

impl BurnerModel for LinearBurnerModel {
    fn simulate(&self, params: &ParameterVector) -> Result<BurnerOutput, SimulationError> {
        let temperature = self.base
            + self
                .weights
                .iter()
                .zip(params.as_array())
                .map(|(w, p)| w * p)
                .sum::<f64>();
        Ok(BurnerOutput {
            heat_release: temperature,
            nox: 0.0,
            flame_location: params.preheat_length,
        })
    }
}

/// NOx predicted by the fitted emission model at `temperature`.
#[inline]
pub fn nox_emissions(temperature: f64, coefficients: &NoxCoefficients) -> f64 {
    let t_scaled = (temperature - NOMINAL_TEMPERATURE) / TEMPERATURE_SCALE;
    coefficients.c1 * (coefficients.c2 * t_scaled).exp()
}

/// Combine temperature reward and NOx penalty into a fitness.
#[inline]
pub fn combine_fitness(temperature: f64, nox: f64, alpha: f64) -> f64 {
    temperature / 1000.0 - alpha * (nox * NOX_PPM)
}

/// Trapezoid integral of a temperature profile over position.
///
/// `None` if the sequences differ in length or hold fewer than two points.
pub fn heating_value(temperatures: &[f64], positions: &[f64]) -> Option<f64> {
    if temperatures.len() != positions.len() || temperatures.len() < 2 {
        return None;
    }
    let integral = temperatures
        .windows(2)
        .zip(positions.windows(2))
        .map(|(t, x)| 0.5 * (t[0] + t[1]) * (x[1] - x[0]))
        .sum();
    Some(integral)
}

/// Detailed result of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Assessment {
    pub fitness: f64,
    /// Model NOx from the emission fit (`None` on failure).
    pub nox: Option<f64>,
    pub output: Option<BurnerOutput>,
}

impl Assessment {
    fn failed() -> Self {
        Self {
            fitness: FAILURE_FITNESS,
            nox: None,
            output: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.output.is_none()
    }
}

/// Maps parameter vectors to fitness for one `(alpha, c1, c2)` configuration.
///
/// Shared read-only by every worker evaluating candidates.
#[derive(Clone)]
pub struct FitnessEvaluator {
    model: Arc<dyn BurnerModel>,
    alpha: f64,
    coefficients: NoxCoefficients,
    flame_window: Option<Interval>,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(model: Arc<dyn BurnerModel>, alpha: f64, coefficients: NoxCoefficients) -> Self {
        Self {
            model,
            alpha,
            coefficients,
            flame_window: None,
        }
    }

    /// Penalize flames anchored outside `window`.
    ///
    /// The window must be finite with `min < max`.
    pub fn with_flame_window(mut self, window: Option<Interval>) -> Result<Self, ConfigError> {
        if let Some(window) = &window {
            window.validate("flame_window")?;
        }
        self.flame_window = window;
        Ok(self)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn coefficients(&self) -> &NoxCoefficients {
        &self.coefficients
    }

    /// Fitness of `params`; [`FAILURE_FITNESS`] if the model fails.
    pub fn evaluate(&self, params: &ParameterVector) -> f64 {
        self.assess(params).fitness
    }

    /// Evaluate and keep the intermediate quantities.
    pub fn assess(&self, params: &ParameterVector) -> Assessment {
        let output = match self.model.simulate(params) {
            Ok(output) => output,
            Err(e) => {
                warn!("Evaluation failed at {:?}: {}", params.as_array(), e);
                return Assessment::failed();
            }
        };

        let temperature = output.heat_release;
        if !temperature.is_finite() {
            warn!(
                "Non-physical model output at {:?}: heat release {}",
                params.as_array(),
                temperature
            );
            return Assessment::failed();
        }

        let nox = nox_emissions(temperature, &self.coefficients);
        let mut fitness = combine_fitness(temperature, nox, self.alpha);
        if let Some(window) = &self.flame_window {
            fitness -= FLAME_PENALTY * window.distance(output.flame_location);
        }

        if !fitness.is_finite() {
            debug!(
                "Non-finite fitness at {:?} (T={}, NOx={})",
                params.as_array(),
                temperature,
                nox
            );
            return Assessment::failed();
        }

        Assessment {
            fitness,
            nox: Some(nox),
            output: Some(output),
        }
    }
}

impl std::fmt::Debug for FitnessEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitnessEvaluator")
            .field("alpha", &self.alpha)
            .field("coefficients", &self.coefficients)
            .field("flame_window", &self.flame_window)
            .finish_non_exhaustive()
    }
}
