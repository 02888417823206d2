//! NOx emission model fitting.
//!
//! Fits `NOx = c1 * exp(c2 * T_scaled)` to calibration samples, where
//! `T_scaled` is the temperature standardized over the sample set (zero
//! mean, unit variance) to keep the exponent bounded. The two coefficients
//! are solved by Levenberg-Marquardt from [`NoxCoefficients::INITIAL_GUESS`].
//!
//! A fit that does not converge is not an error for the caller: the
//! fixed [`NoxCoefficients::FALLBACK`] pair is returned instead so the
//! sweep can continue with approximate coefficients.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use log::{debug, warn};
use nalgebra::storage::Owned;
use nalgebra::{Const, DVector, Dyn, OMatrix, U2, Vector2};

use crate::schema::NoxCoefficients;

/// Malformed or insufficient calibration data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("Temperature ({temperatures}) and concentration ({concentrations}) sample counts differ")]
    LengthMismatch {
        temperatures: usize,
        concentrations: usize,
    },
    #[error("At least 2 finite samples are required, found {found}")]
    TooFewSamples { found: usize },
}

/// Reasons the least-squares solve gave up. Never surfaced to callers.
#[derive(Debug, thiserror::Error)]
enum FitFailure {
    #[error("temperature samples have zero variance")]
    DegenerateTemperatures,
    #[error("solver stopped without converging: {0}")]
    Terminated(String),
    #[error("solver returned non-finite coefficients")]
    NonFinite,
}

/// Evaluate the emission model at a standardized temperature.
#[inline]
pub fn nox_model(t_scaled: f64, coefficients: &NoxCoefficients) -> f64 {
    coefficients.c1 * (coefficients.c2 * t_scaled).exp()
}

/// Mean and population standard deviation of `values`.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Standardize `values` to zero mean and unit variance.
///
/// Returns `None` when the spread is zero or not finite.
pub fn standardize(values: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    let (mean, std) = mean_std(values);
    if !(std.is_finite() && std > 0.0) {
        return None;
    }
    Some(values.iter().map(|v| (v - mean) / std).collect())
}

/// Fit emission coefficients to paired temperature/concentration samples.
///
/// Pairs with a non-finite member are dropped before fitting. Fewer than
/// two remaining pairs is a [`DataError`]; solver failure is recovered with
/// [`NoxCoefficients::FALLBACK`].
pub fn fit_nox_coefficients(
    temperatures: &[f64],
    concentrations: &[f64],
) -> Result<NoxCoefficients, DataError> {
    if temperatures.len() != concentrations.len() {
        return Err(DataError::LengthMismatch {
            temperatures: temperatures.len(),
            concentrations: concentrations.len(),
        });
    }

    let (temps, concs): (Vec<f64>, Vec<f64>) = temperatures
        .iter()
        .zip(concentrations)
        .filter(|(t, c)| t.is_finite() && c.is_finite())
        .map(|(&t, &c)| (t, c))
        .unzip();

    if temps.len() < 2 {
        return Err(DataError::TooFewSamples { found: temps.len() });
    }

    let fitted = standardize(&temps)
        .ok_or(FitFailure::DegenerateTemperatures)
        .and_then(|scaled| solve(EmissionFit::new(scaled, concs, NoxCoefficients::INITIAL_GUESS)));

    match fitted {
        Ok(coefficients) => Ok(coefficients),
        Err(e) => {
            warn!(
                "NOx fit failed ({}), using fallback c1={:e} c2={}",
                e,
                NoxCoefficients::FALLBACK.c1,
                NoxCoefficients::FALLBACK.c2
            );
            Ok(NoxCoefficients::FALLBACK)
        }
    }
}

/// Least-squares problem `min sum (c1 * exp(c2 * x) - y)^2` over `(c1, c2)`.
struct EmissionFit {
    x: Vec<f64>,
    y: Vec<f64>,
    p: Vector2<f64>,
}

impl EmissionFit {
    fn new(x: Vec<f64>, y: Vec<f64>, start: NoxCoefficients) -> Self {
        Self {
            x,
            y,
            p: Vector2::new(start.c1, start.c2),
        }
    }

    fn coefficients(&self) -> NoxCoefficients {
        NoxCoefficients::new(self.p[0], self.p[1])
    }
}

impl LeastSquaresProblem<f64, Dyn, U2> for EmissionFit {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, U2>;
    type ParameterStorage = Owned<f64, U2>;

    fn set_params(&mut self, p: &Vector2<f64>) {
        self.p = *p;
    }

    fn params(&self) -> Vector2<f64> {
        self.p
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let r = DVector::from_iterator(
            self.x.len(),
            self.x
                .iter()
                .zip(&self.y)
                .map(|(&xi, &yi)| self.p[0] * (self.p[1] * xi).exp() - yi),
        );
        r.iter().all(|v| v.is_finite()).then_some(r)
    }

    fn jacobian(&self) -> Option<OMatrix<f64, Dyn, U2>> {
        let (c1, c2) = (self.p[0], self.p[1]);
        let j = OMatrix::<f64, Dyn, U2>::from_fn_generic(Dyn(self.x.len()), Const::<2>, |row, col| {
            let e = (c2 * self.x[row]).exp();
            if col == 0 { e } else { c1 * self.x[row] * e }
        });
        j.iter().all(|v| v.is_finite()).then_some(j)
    }
}

fn solve(problem: EmissionFit) -> Result<NoxCoefficients, FitFailure> {
    let (fitted, report) = LevenbergMarquardt::new().minimize(problem);
    if !report.termination.was_successful() {
        return Err(FitFailure::Terminated(format!("{:?}", report.termination)));
    }

    let coefficients = fitted.coefficients();
    if !(coefficients.c1.is_finite() && coefficients.c2.is_finite()) {
        return Err(FitFailure::NonFinite);
    }
    debug!(
        "NOx fit converged after {} evaluations ({:?})",
        report.number_of_evaluations, report.termination
    );
    Ok(coefficients)
}
