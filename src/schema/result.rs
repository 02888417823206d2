//! Result types produced by the optimizers and the sweep driver.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DIMENSIONS, NoxCoefficients, ParameterVector};

/// Which optimizer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    GeneticAlgorithm,
    GradientDescent,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::GeneticAlgorithm => f.write_str("genetic_algorithm"),
            Method::GradientDescent => f.write_str("gradient_descent"),
        }
    }
}

/// Fitness trace over a run, one entry per generation or iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    /// Running best fitness.
    pub best_fitness: Vec<f64>,
    /// Generation best (GA) or iterate fitness (GD).
    pub current_fitness: Vec<f64>,
    /// Mean population fitness (GA only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mean_fitness: Vec<f64>,
    /// Population fitness standard deviation (GA only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fitness_std: Vec<f64>,
}

impl ConvergenceHistory {
    pub fn len(&self) -> usize {
        self.best_fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_fitness.is_empty()
    }
}

/// Outcome of one optimizer run. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub method: Method,
    /// Best parameter vector observed during the run.
    pub best: ParameterVector,
    /// Fitness of `best`.
    pub fitness: f64,
    /// Number of evaluator calls consumed.
    pub evaluations: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<ConvergenceHistory>,
}

impl OptimizationResult {
    /// Boundary record handed to downstream reporting.
    pub fn record(&self) -> ResultRecord {
        ResultRecord {
            parameters: self.best.as_array(),
            fitness: self.fitness,
        }
    }
}

/// `{parameters: [p0, p1, p2], fitness}` per (dataset, alpha, method).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub parameters: [f64; DIMENSIONS],
    pub fitness: f64,
}

/// Per-sheet calibration summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub name: String,
    /// Paired finite samples used for the fit.
    pub samples: usize,
    pub coefficients: NoxCoefficients,
    /// Trapezoid integral of temperature over position, when positions are known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating_value: Option<f64>,
}

/// One completed optimizer run within a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRecord {
    pub sheet: String,
    pub alpha: f64,
    pub result: OptimizationResult,
}

impl SweepRecord {
    pub fn method(&self) -> Method {
        self.result.method
    }
}

/// A sheet or run that was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepFailure {
    pub sheet: String,
    /// `None` when the whole sheet was skipped.
    pub alpha: Option<f64>,
    pub reason: String,
}

/// Everything a sweep produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    pub datasets: Vec<DatasetSummary>,
    pub records: Vec<SweepRecord>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    /// Look up the run keyed by `(sheet, alpha, method)`.
    pub fn get(&self, sheet: &str, alpha: f64, method: Method) -> Option<&SweepRecord> {
        self.records
            .iter()
            .find(|r| r.sheet == sheet && r.alpha == alpha && r.method() == method)
    }

    /// Nested `sheet -> alpha -> method -> record` map.
    pub fn result_records(&self) -> BTreeMap<String, BTreeMap<String, BTreeMap<Method, ResultRecord>>> {
        let mut out: BTreeMap<String, BTreeMap<String, BTreeMap<Method, ResultRecord>>> =
            BTreeMap::new();
        for record in &self.records {
            out.entry(record.sheet.clone())
                .or_default()
                .entry(record.alpha.to_string())
                .or_default()
                .insert(record.method(), record.result.record());
        }
        out
    }
}
