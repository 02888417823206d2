//! Finite-difference gradient ascent from a single random start.
//!
//! `x <- clamp(x + learning_rate * grad f(x))`, with the gradient estimated
//! by central differences. No momentum, no adaptive step and no convergence
//! test beyond the iteration budget. The walk can wander past its peak, so
//! the best point seen is returned rather than the final iterate.

use log::{debug, info};
use rayon::prelude::*;

use crate::schema::{
    Bounds, ConfigError, ConvergenceHistory, DIMENSIONS, GradientConfig, Method,
    OptimizationResult, ParameterVector,
};

use super::fitness::FitnessEvaluator;
use super::rng::ParamRng;

/// Snapshot reported after each iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationProgress {
    pub iteration: usize,
    pub max_iterations: usize,
    /// Iterate after the step and clamp.
    pub params: ParameterVector,
    pub value: f64,
    pub best_value: f64,
}

/// Gradient ascent optimizer for one `(alpha, c1, c2)` configuration.
pub struct GradientDescentOptimizer {
    config: GradientConfig,
    bounds: Bounds,
    rng: ParamRng,
}

impl GradientDescentOptimizer {
    /// Create an optimizer; fails fast on invalid settings.
    pub fn new(config: GradientConfig, bounds: Bounds, rng: ParamRng) -> Result<Self, ConfigError> {
        config.validate()?;
        bounds.validate()?;
        Ok(Self {
            config,
            bounds,
            rng,
        })
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    /// Central-difference gradient at `params`.
    ///
    /// The `2 * DIMENSIONS` probes are evaluated in parallel. Probes are not
    /// clamped, so they may step up to `h` outside the bounds.
    pub fn gradient(&self, evaluator: &FitnessEvaluator, params: &ParameterVector) -> [f64; DIMENSIONS] {
        let h = self.config.step_size;
        let partials: Vec<f64> = (0..DIMENSIONS)
            .into_par_iter()
            .map(|i| {
                let f_plus = evaluator.evaluate(&params.offset(i, h));
                let f_minus = evaluator.evaluate(&params.offset(i, -h));
                (f_plus - f_minus) / (2.0 * h)
            })
            .collect();

        let mut grad = [0.0; DIMENSIONS];
        grad.copy_from_slice(&partials);
        grad
    }

    /// Run the search (blocking).
    pub fn run(&mut self, evaluator: &FitnessEvaluator) -> OptimizationResult {
        self.run_with_callback(evaluator, |_| {})
    }

    /// Run the search, reporting after every iteration.
    ///
    /// The history's first entry is the random starting point.
    pub fn run_with_callback<F>(
        &mut self,
        evaluator: &FitnessEvaluator,
        mut callback: F,
    ) -> OptimizationResult
    where
        F: FnMut(&IterationProgress),
    {
        let max_iterations = self.config.max_iterations;
        let learning_rate = self.config.learning_rate;

        let mut params = self.rng.random_vector(&self.bounds);
        let initial = evaluator.evaluate(&params);

        let mut best = params;
        let mut best_value = initial;

        let mut history = ConvergenceHistory::default();
        history.best_fitness.push(best_value);
        history.current_fitness.push(initial);

        for iteration in 0..max_iterations {
            let grad = self.gradient(evaluator, &params);
            for (i, g) in grad.iter().enumerate() {
                params[i] += learning_rate * g;
            }
            self.bounds.clamp(&mut params);

            let value = evaluator.evaluate(&params);
            if value > best_value {
                best_value = value;
                best = params;
            }

            history.best_fitness.push(best_value);
            history.current_fitness.push(value);

            callback(&IterationProgress {
                iteration,
                max_iterations,
                params,
                value,
                best_value,
            });

            if iteration % 100 == 0 {
                info!("Iteration {}, best value: {}", iteration, best_value);
            } else {
                debug!("Iteration {}: value {} grad {:?}", iteration, value, grad);
            }
        }

        let per_iteration = 2 * DIMENSIONS as u64 + 1;
        OptimizationResult {
            method: Method::GradientDescent,
            best,
            fitness: best_value,
            evaluations: 1 + max_iterations as u64 * per_iteration,
            history: Some(history),
        }
    }
}
