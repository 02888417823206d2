//! Benchmarks for the burner optimizers.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use porous_burner::{
    compute::{
        FitnessEvaluator, GeneticOptimizer, GradientDescentOptimizer, LinearBurnerModel,
        ParamRng, fit_nox_coefficients,
    },
    schema::{Bounds, GeneticConfig, GradientConfig, NoxCoefficients},
};

fn evaluator() -> FitnessEvaluator {
    FitnessEvaluator::new(
        Arc::new(LinearBurnerModel::default()),
        100.0,
        NoxCoefficients::new(1e-10, 0.01),
    )
}

fn bench_genetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("genetic_run");
    let evaluator = evaluator();

    for population_size in [20, 50, 200] {
        let config = GeneticConfig {
            population_size,
            generations: 50,
            mutation_rate: 0.1,
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(population_size),
            &population_size,
            |b, _| {
                b.iter(|| {
                    let mut ga =
                        GeneticOptimizer::new(config.clone(), Bounds::default(), ParamRng::new(7))
                            .unwrap();
                    black_box(ga.run(&evaluator))
                });
            },
        );
    }

    group.finish();
}

fn bench_gradient(c: &mut Criterion) {
    let evaluator = evaluator();
    let config = GradientConfig {
        max_iterations: 1000,
        ..Default::default()
    };

    c.bench_function("gradient_run_1000", |b| {
        b.iter(|| {
            let mut gd =
                GradientDescentOptimizer::new(config.clone(), Bounds::default(), ParamRng::new(7))
                    .unwrap();
            black_box(gd.run(&evaluator))
        });
    });
}

fn bench_nox_fit(c: &mut Criterion) {
    let temperatures: Vec<f64> = (0..200).map(|i| 1100.0 + 2.0 * i as f64).collect();
    let concentrations: Vec<f64> = temperatures
        .iter()
        .map(|t| 1e-6 * ((t - 1300.0) / 120.0).exp())
        .collect();

    c.bench_function("nox_fit_200", |b| {
        b.iter(|| fit_nox_coefficients(black_box(&temperatures), black_box(&concentrations)))
    });
}

criterion_group!(benches, bench_genetic, bench_gradient, bench_nox_fit);
criterion_main!(benches);
