//! Parameter vectors and their admissible ranges.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Number of design parameters (two porosities and the preheat length).
pub const DIMENSIONS: usize = 3;

/// Human-readable names of the parameter dimensions, in index order.
pub const DIMENSION_NAMES: [&str; DIMENSIONS] = ["porosity_a", "porosity_b", "preheat_length"];

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value into the interval.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Distance from `value` to the nearest point of the interval (0 inside).
    pub fn distance(&self, value: f64) -> f64 {
        (value - self.clamp(value)).abs()
    }

    /// Check that the interval is finite and non-degenerate.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(ConfigError::InvalidBounds(format!(
                "{} min ({}) must be finite and below max ({})",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Per-dimension admissible ranges. Immutable for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Porosity of the first porous layer (SiC3 in the reference burner).
    pub porosity_a: Interval,
    /// Porosity of the second porous layer (SiC10 in the reference burner).
    pub porosity_b: Interval,
    /// Preheat zone length in meters.
    pub preheat_length: Interval,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            porosity_a: Interval::new(0.75, 0.85),
            porosity_b: Interval::new(0.75, 0.85),
            preheat_length: Interval::new(0.02, 0.04),
        }
    }
}

impl Bounds {
    /// Interval of dimension `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= DIMENSIONS`.
    pub fn dimension(&self, index: usize) -> &Interval {
        match index {
            0 => &self.porosity_a,
            1 => &self.porosity_b,
            2 => &self.preheat_length,
            _ => panic!("dimension index {index} out of range"),
        }
    }

    /// Iterate over the intervals in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        [&self.porosity_a, &self.porosity_b, &self.preheat_length].into_iter()
    }

    pub fn contains(&self, params: &ParameterVector) -> bool {
        self.iter()
            .zip(params.as_array())
            .all(|(interval, value)| interval.contains(value))
    }

    /// Clamp every dimension back into its interval.
    pub fn clamp(&self, params: &mut ParameterVector) {
        for i in 0..DIMENSIONS {
            params[i] = self.dimension(i).clamp(params[i]);
        }
    }

    /// Center of the box.
    pub fn midpoint(&self) -> ParameterVector {
        let mut mid = ParameterVector::default();
        for i in 0..DIMENSIONS {
            let interval = self.dimension(i);
            mid[i] = interval.min + 0.5 * interval.width();
        }
        mid
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (interval, name) in self.iter().zip(DIMENSION_NAMES) {
            interval.validate(name)?;
        }
        Ok(())
    }
}

/// A candidate burner design: `(porosity_a, porosity_b, preheat_length)`.
///
/// Serialized as the bare array `[p0, p1, p2]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; DIMENSIONS]", into = "[f64; DIMENSIONS]")]
pub struct ParameterVector {
    pub porosity_a: f64,
    pub porosity_b: f64,
    pub preheat_length: f64,
}

impl ParameterVector {
    pub const fn new(porosity_a: f64, porosity_b: f64, preheat_length: f64) -> Self {
        Self {
            porosity_a,
            porosity_b,
            preheat_length,
        }
    }

    pub fn as_array(&self) -> [f64; DIMENSIONS] {
        [self.porosity_a, self.porosity_b, self.preheat_length]
    }

    /// Copy with dimension `index` shifted by `delta`.
    pub fn offset(&self, index: usize, delta: f64) -> Self {
        let mut shifted = *self;
        shifted[index] += delta;
        shifted
    }
}

impl From<[f64; DIMENSIONS]> for ParameterVector {
    fn from(values: [f64; DIMENSIONS]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

impl From<ParameterVector> for [f64; DIMENSIONS] {
    fn from(params: ParameterVector) -> Self {
        params.as_array()
    }
}

impl Index<usize> for ParameterVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.porosity_a,
            1 => &self.porosity_b,
            2 => &self.preheat_length,
            _ => panic!("dimension index {index} out of range"),
        }
    }
}

impl IndexMut<usize> for ParameterVector {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        match index {
            0 => &mut self.porosity_a,
            1 => &mut self.porosity_b,
            2 => &mut self.preheat_length,
            _ => panic!("dimension index {index} out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds_valid() {
        assert!(Bounds::default().validate().is_ok());
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        let bounds = Bounds {
            preheat_length: Interval::new(0.04, 0.04),
            ..Default::default()
        };
        assert!(matches!(
            bounds.validate(),
            Err(ConfigError::InvalidBounds(_))
        ));

        let inverted = Bounds {
            porosity_a: Interval::new(0.9, 0.1),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_clamp() {
        let bounds = Bounds::default();
        let mut params = ParameterVector::new(0.5, 0.9, 0.03);
        assert!(!bounds.contains(&params));

        bounds.clamp(&mut params);
        assert_eq!(params, ParameterVector::new(0.75, 0.85, 0.03));
        assert!(bounds.contains(&params));
    }

    #[test]
    fn test_indexing_matches_fields() {
        let mut params = ParameterVector::new(1.0, 2.0, 3.0);
        assert_eq!(params[0], params.porosity_a);
        assert_eq!(params[2], params.preheat_length);

        params[1] = 5.0;
        assert_eq!(params.porosity_b, 5.0);
        assert_eq!(params.offset(1, 1.0).porosity_b, 6.0);
    }

    #[test]
    fn test_serializes_as_array() {
        let params = ParameterVector::new(0.8, 0.76, 0.025);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, "[0.8,0.76,0.025]");

        let parsed: ParameterVector = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn test_interval_distance() {
        let window = Interval::new(0.02, 0.04);
        assert_eq!(window.distance(0.03), 0.0);
        assert!((window.distance(0.05) - 0.01).abs() < 1e-12);
        assert!((window.distance(0.01) - 0.01).abs() < 1e-12);
    }
}
