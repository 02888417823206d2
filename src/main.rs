//! Porous burner CLI - Run a design sweep from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use porous_burner::{
    compute::{LinearBurnerModel, SweepRunner},
    schema::{Dataset, Interval, SweepConfig},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <sweep.json> [--full]", args[0]);
        eprintln!();
        eprintln!("Search porous burner designs over a sweep of NOx trade-off weights.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  sweep.json  Path to sweep configuration file");
        eprintln!("  --full      Print the full report instead of the result records");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let full = args[2..].iter().any(|a| a == "--full");

    let config = SweepConfig::from_json_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading {}: {}", config_path.display(), e);
        std::process::exit(1);
    });

    eprintln!("Porous Burner Sweep");
    eprintln!("===================");
    eprintln!("Datasets: {}", config.datasets.len());
    eprintln!("Alphas: {:?}", config.alphas);
    eprintln!(
        "GA: population {}, {} generations, mutation {}",
        config.genetic.population_size, config.genetic.generations, config.genetic.mutation_rate
    );
    eprintln!(
        "GD: learning rate {}, {} iterations",
        config.gradient.learning_rate, config.gradient.max_iterations
    );
    eprintln!();

    let mut runner = SweepRunner::new(config, Arc::new(LinearBurnerModel::default()))
        .unwrap_or_else(|e| {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        });

    let start = Instant::now();
    let report = runner.run();
    let elapsed = start.elapsed();

    for failure in &report.failures {
        match failure.alpha {
            Some(alpha) => eprintln!("  skipped {} alpha={}: {}", failure.sheet, alpha, failure.reason),
            None => eprintln!("  skipped {}: {}", failure.sheet, failure.reason),
        }
    }
    eprintln!(
        "{} runs in {:.2}s ({} skipped)",
        report.records.len(),
        elapsed.as_secs_f32(),
        report.failures.len()
    );

    let json = if full {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string_pretty(&report.result_records())
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing results: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_example_config() {
    let temperatures = vec![1150.0, 1200.0, 1250.0, 1300.0, 1350.0, 1400.0, 1450.0];
    let concentrations = vec![2.1e-6, 2.6e-6, 3.4e-6, 4.4e-6, 5.8e-6, 7.5e-6, 9.9e-6];
    let positions = vec![0.0, 0.005, 0.01, 0.015, 0.02, 0.025, 0.03];

    let config = SweepConfig {
        flame_window: Some(Interval::new(0.02, 0.04)),
        random_seed: Some(42),
        datasets: vec![Dataset::new("run1", temperatures, concentrations).with_positions(positions)],
        ..Default::default()
    };

    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
