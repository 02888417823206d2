//! Configuration types for the optimizers and the alpha sweep.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Bounds, Dataset, Interval};

/// Genetic algorithm settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Individuals per generation (constant across the run).
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of generations evaluated. There is no early stopping.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Probability that a child has one gene replaced.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generations: default_generations(),
            mutation_rate: default_mutation_rate(),
        }
    }
}

fn default_population_size() -> usize {
    50
}
fn default_generations() -> usize {
    100
}
fn default_mutation_rate() -> f64 {
    0.1
}

impl GeneticConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        Ok(())
    }
}

/// Finite-difference gradient ascent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Central-difference step `h`.
    #[serde(default = "default_step_size")]
    pub step_size: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            max_iterations: default_max_iterations(),
            step_size: default_step_size(),
        }
    }
}

fn default_learning_rate() -> f64 {
    0.01
}
fn default_max_iterations() -> usize {
    1000
}
fn default_step_size() -> f64 {
    1e-6
}

impl GradientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(ConfigError::InvalidStepSize(self.step_size));
        }
        Ok(())
    }
}

/// Top-level configuration for a sweep over datasets and trade-off weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Parameter ranges shared by both optimizers.
    #[serde(default)]
    pub bounds: Bounds,
    /// NOx trade-off weights to sweep.
    #[serde(default = "default_alphas")]
    pub alphas: Vec<f64>,
    #[serde(default)]
    pub genetic: GeneticConfig,
    #[serde(default)]
    pub gradient: GradientConfig,
    /// Admissible flame anchoring window (m). Flames outside are penalized.
    #[serde(default)]
    pub flame_window: Option<Interval>,
    /// Master seed. Every optimizer run derives its own seed from it.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Calibration sheets.
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            alphas: default_alphas(),
            genetic: GeneticConfig::default(),
            gradient: GradientConfig::default(),
            flame_window: None,
            random_seed: None,
            datasets: Vec::new(),
        }
    }
}

fn default_alphas() -> Vec<f64> {
    vec![1.0, 1e2, 1e3, 1e4, 1e5, 1e6]
}

impl SweepConfig {
    /// Validate everything that must hold before any run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate()?;
        self.genetic.validate()?;
        self.gradient.validate()?;
        if self.alphas.is_empty() {
            return Err(ConfigError::NoAlphas);
        }
        if let Some(window) = &self.flame_window {
            window.validate("flame_window")?;
        }
        Ok(())
    }

    /// Read and validate a sweep configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid parameter bounds: {0}")]
    InvalidBounds(String),
    #[error("Population size must be non-zero")]
    EmptyPopulation,
    #[error("Generation count must be non-zero")]
    NoGenerations,
    #[error("Iteration count must be non-zero")]
    NoIterations,
    #[error("Mutation rate {0} must lie in [0, 1]")]
    InvalidMutationRate(f64),
    #[error("Learning rate {0} must be positive and finite")]
    InvalidLearningRate(f64),
    #[error("Finite-difference step {0} must be positive and finite")]
    InvalidStepSize(f64),
    #[error("Alpha sweep must contain at least one value")]
    NoAlphas,
}

/// Errors reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(SweepConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let genetic = GeneticConfig {
            population_size: 0,
            ..Default::default()
        };
        assert_eq!(genetic.validate(), Err(ConfigError::EmptyPopulation));

        let genetic = GeneticConfig {
            generations: 0,
            ..Default::default()
        };
        assert_eq!(genetic.validate(), Err(ConfigError::NoGenerations));

        let gradient = GradientConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert_eq!(gradient.validate(), Err(ConfigError::NoIterations));
    }

    #[test]
    fn test_rates_rejected() {
        let genetic = GeneticConfig {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            genetic.validate(),
            Err(ConfigError::InvalidMutationRate(_))
        ));

        let gradient = GradientConfig {
            learning_rate: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            gradient.validate(),
            Err(ConfigError::InvalidLearningRate(_))
        ));

        let gradient = GradientConfig {
            step_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            gradient.validate(),
            Err(ConfigError::InvalidStepSize(_))
        ));
    }

    #[test]
    fn test_empty_alphas_rejected() {
        let config = SweepConfig {
            alphas: Vec::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoAlphas));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SweepConfig =
            serde_json::from_str(r#"{ "alphas": [10.0], "genetic": { "generations": 5 } }"#)
                .unwrap();
        assert_eq!(config.alphas, vec![10.0]);
        assert_eq!(config.genetic.generations, 5);
        assert_eq!(config.genetic.population_size, 50);
        assert_eq!(config.gradient.max_iterations, 1000);
        assert_eq!(config.bounds, Bounds::default());
        assert!(config.flame_window.is_none());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let config = SweepConfig {
            random_seed: Some(7),
            datasets: vec![Dataset::new("sheet", vec![1200.0, 1400.0], vec![1e-6, 2e-6])],
            ..Default::default()
        };
        write!(file, "{}", serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = SweepConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded.random_seed, Some(7));
        assert_eq!(loaded.datasets.len(), 1);
        assert_eq!(loaded.datasets[0].name, "sheet");
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "genetic": {{ "population_size": 0 }} }}"#).unwrap();
        assert!(matches!(
            SweepConfig::from_json_file(file.path()),
            Err(LoadError::Invalid(ConfigError::EmptyPopulation))
        ));

        let missing = SweepConfig::from_json_file("/nonexistent/sweep.json");
        assert!(matches!(missing, Err(LoadError::Io(_))));
    }
}
