//! Calibration datasets and the NOx emission coefficients fitted from them.

use serde::{Deserialize, Serialize};

/// One calibration sheet: temperature and NOx concentration samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Sheet name, used as the result key.
    pub name: String,
    /// Temperature samples (K).
    pub temperatures: Vec<f64>,
    /// NOx concentration samples, parallel to `temperatures`.
    pub concentrations: Vec<f64>,
    /// Axial sample positions (m), parallel to `temperatures` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<f64>>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, temperatures: Vec<f64>, concentrations: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            temperatures,
            concentrations,
            positions: None,
        }
    }

    pub fn with_positions(mut self, positions: Vec<f64>) -> Self {
        self.positions = Some(positions);
        self
    }
}

/// Coefficients of the emission model `NOx(T) = c1 * exp(c2 * T_scaled)`.
///
/// Fitted once per dataset and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoxCoefficients {
    pub c1: f64,
    pub c2: f64,
}

impl NoxCoefficients {
    /// Starting point of the least-squares fit.
    pub const INITIAL_GUESS: Self = Self { c1: 1e-7, c2: 1.0 };

    /// Returned when the fit fails to converge.
    pub const FALLBACK: Self = Self { c1: 1e-7, c2: 0.01 };

    pub const fn new(c1: f64, c2: f64) -> Self {
        Self { c1, c2 }
    }
}

impl Default for NoxCoefficients {
    fn default() -> Self {
        Self::FALLBACK
    }
}
