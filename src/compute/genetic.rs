//! Genetic algorithm over burner parameter vectors.
//!
//! Each generation is evaluated, then replaced wholesale by its offspring:
//! tournament selection (size 3, with replacement), single-point crossover on
//! consecutive parent pairs, and single-gene replacement mutation. There is
//! no elitism, so the running best is tracked separately and is what the run
//! returns.

use log::{debug, info};
use rayon::prelude::*;

use crate::schema::{
    Bounds, ConfigError, ConvergenceHistory, DIMENSIONS, GeneticConfig, Method,
    OptimizationResult, ParameterVector,
};

use super::fitness::FitnessEvaluator;
use super::nox::mean_std;
use super::rng::ParamRng;

/// Competitors sampled per tournament.
pub const TOURNAMENT_SIZE: usize = 3;

/// Snapshot reported after each evaluated generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationProgress {
    pub generation: usize,
    pub total_generations: usize,
    pub generation_best: f64,
    pub best_fitness: f64,
    pub mean_fitness: f64,
}

/// Genetic optimizer for one `(alpha, c1, c2)` configuration.
pub struct GeneticOptimizer {
    config: GeneticConfig,
    bounds: Bounds,
    rng: ParamRng,
}

impl GeneticOptimizer {
    /// Create an optimizer; fails fast on invalid settings.
    pub fn new(config: GeneticConfig, bounds: Bounds, rng: ParamRng) -> Result<Self, ConfigError> {
        config.validate()?;
        bounds.validate()?;
        Ok(Self {
            config,
            bounds,
            rng,
        })
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Draw a fresh population, every dimension uniform over its bounds.
    pub fn initialize_population(&mut self) -> Vec<ParameterVector> {
        (0..self.config.population_size)
            .map(|_| self.rng.random_vector(&self.bounds))
            .collect()
    }

    /// Index of the winner of one size-3 tournament.
    ///
    /// Competitors are sampled with replacement; the first competitor with
    /// the highest fitness wins.
    pub fn tournament_select(&mut self, fitness: &[f64]) -> usize {
        let mut best_idx = self.rng.index(fitness.len());
        for _ in 1..TOURNAMENT_SIZE {
            let idx = self.rng.index(fitness.len());
            if fitness[idx] > fitness[best_idx] {
                best_idx = idx;
            }
        }
        best_idx
    }

    /// Same-size parent pool built from repeated tournaments.
    pub fn select_parents(
        &mut self,
        population: &[ParameterVector],
        fitness: &[f64],
    ) -> Vec<ParameterVector> {
        (0..population.len())
            .map(|_| population[self.tournament_select(fitness)])
            .collect()
    }

    /// Cross consecutive parent pairs; an odd trailing parent passes through.
    pub fn recombine(&mut self, parents: &[ParameterVector]) -> Vec<ParameterVector> {
        let mut children = Vec::with_capacity(parents.len());
        for pair in parents.chunks(2) {
            match pair {
                [a, b] => {
                    let point = self.rng.crossover_point();
                    let (c1, c2) = single_point_crossover(a, b, point);
                    children.push(c1);
                    children.push(c2);
                }
                [single] => children.push(*single),
                _ => unreachable!("chunks(2) yields one or two parents"),
            }
        }
        children
    }

    /// With probability `mutation_rate`, replace one gene of each child by a fresh draw.
    pub fn mutate(&mut self, children: &mut [ParameterVector]) {
        for child in children.iter_mut() {
            if self.rng.chance(self.config.mutation_rate) {
                let gene = self.rng.index(DIMENSIONS);
                child[gene] = self.rng.uniform(self.bounds.dimension(gene));
            }
        }
    }

    /// Run the search (blocking).
    pub fn run(&mut self, evaluator: &FitnessEvaluator) -> OptimizationResult {
        self.run_with_callback(evaluator, |_| {})
    }

    /// Run the search, reporting after every evaluated generation.
    pub fn run_with_callback<F>(
        &mut self,
        evaluator: &FitnessEvaluator,
        mut callback: F,
    ) -> OptimizationResult
    where
        F: FnMut(&GenerationProgress),
    {
        let generations = self.config.generations;
        let mut population = self.initialize_population();
        let mut history = ConvergenceHistory::default();

        let mut best = population[0];
        let mut best_fitness = f64::NEG_INFINITY;

        for generation in 0..generations {
            let fitness = evaluate_population(evaluator, &population);

            let (gen_idx, gen_best) = argmax(&fitness);
            if gen_best > best_fitness {
                best_fitness = gen_best;
                best = population[gen_idx];
            }

            let (mean, std) = mean_std(&fitness);
            history.best_fitness.push(best_fitness);
            history.current_fitness.push(gen_best);
            history.mean_fitness.push(mean);
            history.fitness_std.push(std);

            let progress = GenerationProgress {
                generation,
                total_generations: generations,
                generation_best: gen_best,
                best_fitness,
                mean_fitness: mean,
            };
            callback(&progress);

            if generation % 10 == 0 {
                info!("Generation {}, best fitness: {}", generation, best_fitness);
            } else {
                debug!(
                    "Generation {}: best {} mean {} std {}",
                    generation, gen_best, mean, std
                );
            }

            // The last generation's offspring would never be evaluated.
            if generation + 1 == generations {
                break;
            }

            let parents = self.select_parents(&population, &fitness);
            let mut children = self.recombine(&parents);
            self.mutate(&mut children);
            population = children;
        }

        OptimizationResult {
            method: Method::GeneticAlgorithm,
            best,
            fitness: best_fitness,
            evaluations: (generations * self.config.population_size) as u64,
            history: Some(history),
        }
    }
}

/// Evaluate every individual in parallel.
///
/// Returns only once all evaluations of the generation have completed.
fn evaluate_population(evaluator: &FitnessEvaluator, population: &[ParameterVector]) -> Vec<f64> {
    population
        .par_iter()
        .map(|params| evaluator.evaluate(params))
        .collect()
}

/// Single-point crossover at `point` (1 or 2).
///
/// The first child takes `a`'s prefix and `b`'s suffix; the second the reverse.
pub fn single_point_crossover(
    a: &ParameterVector,
    b: &ParameterVector,
    point: usize,
) -> (ParameterVector, ParameterVector) {
    let mut c1 = *a;
    let mut c2 = *b;
    for i in point..DIMENSIONS {
        c1[i] = b[i];
        c2[i] = a[i];
    }
    (c1, c2)
}

/// First index holding the maximum value.
fn argmax(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
            if v > bv { (i, v) } else { (bi, bv) }
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::compute::fitness::{
        BurnerOutput, FAILURE_FITNESS, LinearBurnerModel, SimulationError,
    };
    use crate::schema::NoxCoefficients;

    fn optimizer(population_size: usize, generations: usize, seed: u64) -> GeneticOptimizer {
        let config = GeneticConfig {
            population_size,
            generations,
            mutation_rate: 0.1,
        };
        GeneticOptimizer::new(config, Bounds::default(), ParamRng::new(seed)).unwrap()
    }

    fn linear_evaluator() -> FitnessEvaluator {
        FitnessEvaluator::new(
            Arc::new(LinearBurnerModel::default()),
            100.0,
            NoxCoefficients::new(1e-10, 0.01),
        )
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneticConfig {
            population_size: 0,
            ..Default::default()
        };
        assert!(GeneticOptimizer::new(config, Bounds::default(), ParamRng::new(0)).is_err());
    }

    #[test]
    fn test_initialize_population() {
        let mut ga = optimizer(30, 5, 42);
        let population = ga.initialize_population();
        assert_eq!(population.len(), 30);
        assert!(population.iter().all(|p| Bounds::default().contains(p)));
    }

    #[test]
    fn test_tournament_picks_best_competitor() {
        let mut ga = optimizer(10, 1, 7);
        let fitness = vec![1.0, 5.0];
        // Over many tournaments index 1 must win whenever it is sampled.
        let wins = (0..100).filter(|_| ga.tournament_select(&fitness) == 1).count();
        // P(index 1 absent from 3 draws) = 1/8.
        assert!(wins > 70);

        let single = vec![3.0];
        assert_eq!(ga.tournament_select(&single), 0);
    }

    #[test]
    fn test_crossover_prefix_suffix() {
        let a = ParameterVector::new(1.0, 2.0, 3.0);
        let b = ParameterVector::new(4.0, 5.0, 6.0);

        let (c1, c2) = single_point_crossover(&a, &b, 1);
        assert_eq!(c1, ParameterVector::new(1.0, 5.0, 6.0));
        assert_eq!(c2, ParameterVector::new(4.0, 2.0, 3.0));

        let (c1, c2) = single_point_crossover(&a, &b, 2);
        assert_eq!(c1, ParameterVector::new(1.0, 2.0, 6.0));
        assert_eq!(c2, ParameterVector::new(4.0, 5.0, 3.0));
    }

    #[test]
    fn test_recombine_odd_tail_passes_through() {
        let mut ga = optimizer(3, 1, 1);
        let parents = vec![
            ParameterVector::new(0.75, 0.75, 0.02),
            ParameterVector::new(0.85, 0.85, 0.04),
            ParameterVector::new(0.8, 0.8, 0.03),
        ];
        let children = ga.recombine(&parents);
        assert_eq!(children.len(), 3);
        assert_eq!(children[2], parents[2]);
        // Both parents contribute to each child of the pair.
        assert_eq!(children[0][0], 0.75);
        assert_eq!(children[0][2], 0.04);
        assert_eq!(children[1][0], 0.85);
        assert_eq!(children[1][2], 0.02);
    }

    #[test]
    fn test_mutation_replaces_one_gene_within_bounds() {
        let mut ga = GeneticOptimizer::new(
            GeneticConfig {
                population_size: 50,
                generations: 1,
                mutation_rate: 1.0,
            },
            Bounds::default(),
            ParamRng::new(9),
        )
        .unwrap();
        let original = vec![ParameterVector::new(0.8, 0.8, 0.03); 50];
        let mut children = original.clone();
        ga.mutate(&mut children);

        for (child, parent) in children.iter().zip(&original) {
            let changed = (0..DIMENSIONS).filter(|&i| child[i] != parent[i]).count();
            assert!(changed <= 1);
            assert!(Bounds::default().contains(child));
        }
    }

    #[test]
    fn test_zero_mutation_rate_keeps_children() {
        let mut ga = GeneticOptimizer::new(
            GeneticConfig {
                mutation_rate: 0.0,
                ..Default::default()
            },
            Bounds::default(),
            ParamRng::new(2),
        )
        .unwrap();
        let original = vec![ParameterVector::new(0.8, 0.8, 0.03); 10];
        let mut children = original.clone();
        ga.mutate(&mut children);
        assert_eq!(children, original);
    }

    #[test]
    fn test_running_best_never_decreases() {
        let mut ga = optimizer(20, 15, 11);
        let result = ga.run(&linear_evaluator());
        let history = result.history.unwrap();

        assert_eq!(history.len(), 15);
        assert!(history.best_fitness.windows(2).all(|w| w[1] >= w[0]));
        assert!(result.fitness >= history.current_fitness[0]);
        assert_eq!(result.fitness, *history.best_fitness.last().unwrap());
        assert_eq!(result.evaluations, 300);
        assert!(Bounds::default().contains(&result.best));
    }

    #[test]
    fn test_best_matches_its_fitness() {
        let evaluator = linear_evaluator();
        let mut ga = optimizer(16, 8, 5);
        let result = ga.run(&evaluator);
        assert_eq!(evaluator.evaluate(&result.best), result.fitness);
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let evaluator = linear_evaluator();
        let a = optimizer(12, 6, 99).run(&evaluator);
        let b = optimizer(12, 6, 99).run(&evaluator);
        assert_eq!(a.best, b.best);
        assert_eq!(a.fitness, b.fitness);
    }

    #[test]
    fn test_always_failing_model_returns_sentinel() {
        let failing = |_: &ParameterVector| -> Result<BurnerOutput, SimulationError> {
            Err(SimulationError::InvalidGeometry("negative wall thickness".into()))
        };
        let evaluator = FitnessEvaluator::new(Arc::new(failing), 100.0, NoxCoefficients::FALLBACK);

        let mut generations_seen = 0;
        let result = optimizer(10, 4, 3).run_with_callback(&evaluator, |_| generations_seen += 1);

        assert_eq!(generations_seen, 4);
        assert_eq!(result.fitness, FAILURE_FITNESS);
    }

    #[test]
    fn test_population_of_one() {
        let mut ga = optimizer(1, 3, 4);
        let result = ga.run(&linear_evaluator());
        assert!(Bounds::default().contains(&result.best));
        assert_eq!(result.evaluations, 3);
    }
}
