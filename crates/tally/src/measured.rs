//! Tally values with their statistical uncertainty

// r2s modules
use r2s_utils::ValueExt;

// standard library
use std::ops::{Add, Div, Mul};

// external crates
use serde::{Deserialize, Serialize};

/// A mean and its standard deviation
///
/// Arithmetic follows first order propagation assuming distinct values are
/// independent. Scaling by a plain number scales both the mean and the
/// standard deviation.
///
/// ```rust
/// # use r2s_tally::Measured;
/// let a = Measured::new(10.0, 3.0);
/// let b = Measured::new(5.0, 4.0);
///
/// // absolute errors add in quadrature for sums
/// assert_eq!(a + b, Measured::new(15.0, 5.0));
///
/// // scaling is exact
/// assert_eq!(a * 2.0, Measured::new(20.0, 6.0));
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measured {
    /// Mean value
    pub mean: f64,
    /// One standard deviation
    pub std_dev: f64,
}

impl Measured {
    /// New value, the standard deviation is taken as positive
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self {
            mean,
            std_dev: std_dev.abs(),
        }
    }

    /// Value from a mean and a relative error
    pub fn from_relative(mean: f64, rel_err: f64) -> Self {
        Self::new(mean, mean * rel_err)
    }

    /// Exact value with no uncertainty
    pub fn exact(mean: f64) -> Self {
        Self::new(mean, 0.0)
    }

    /// Standard deviation relative to the mean, zero for a zero mean
    pub fn relative_error(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean).abs()
        }
    }

    /// The standard deviation is larger than the mean itself
    pub fn is_noisy(&self) -> bool {
        self.std_dev > self.mean.abs()
    }

    /// Both values are finite
    pub fn is_finite(&self) -> bool {
        self.mean.is_finite() && self.std_dev.is_finite()
    }

    /// Difference of the means lies within `sigmas` combined standard deviations
    ///
    /// ```rust
    /// # use r2s_tally::Measured;
    /// let a = Measured::new(10.0, 0.3);
    /// let b = Measured::new(11.0, 0.4);
    /// assert!(a.agrees_with(&b, 3.0));
    /// assert!(!a.agrees_with(&b, 1.0));
    /// ```
    pub fn agrees_with(&self, other: &Measured, sigmas: f64) -> bool {
        let combined = self.std_dev.hypot(other.std_dev);
        (self.mean - other.mean).abs() <= sigmas * combined
    }
}

impl std::fmt::Display for Measured {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} +/- {}", self.mean.sci(5, 2), self.std_dev.sci(2, 2))
    }
}

impl Add for Measured {
    type Output = Measured;

    fn add(self, rhs: Measured) -> Measured {
        Measured::new(self.mean + rhs.mean, self.std_dev.hypot(rhs.std_dev))
    }
}

impl Mul<f64> for Measured {
    type Output = Measured;

    fn mul(self, rhs: f64) -> Measured {
        Measured::new(self.mean * rhs, self.std_dev * rhs)
    }
}

impl Div<f64> for Measured {
    type Output = Measured;

    fn div(self, rhs: f64) -> Measured {
        Measured::new(self.mean / rhs, self.std_dev / rhs)
    }
}

/// Ratio of two independent values, relative errors in quadrature
impl Div for Measured {
    type Output = Measured;

    fn div(self, rhs: Measured) -> Measured {
        let mean = self.mean / rhs.mean;
        let rel = self.relative_error().hypot(rhs.relative_error());
        Measured::new(mean, mean * rel)
    }
}

impl std::iter::Sum for Measured {
    fn sum<I: Iterator<Item = Measured>>(iter: I) -> Measured {
        iter.fold(Measured::default(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios() {
        let r = Measured::new(10.0, 1.0) / Measured::new(5.0, 0.5);
        assert_eq!(r.mean, 2.0);
        assert!((r.relative_error() - 0.02_f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn noise() {
        assert!(Measured::new(1.0, 1.5).is_noisy());
        assert!(!Measured::new(-1.0, 0.5).is_noisy());
        assert_eq!(Measured::exact(0.0).relative_error(), 0.0);
    }

    #[test]
    fn summation() {
        let total: Measured = [Measured::new(1.0, 3.0), Measured::new(2.0, 4.0)]
            .into_iter()
            .sum();
        assert_eq!(total, Measured::new(3.0, 5.0));
    }
}
