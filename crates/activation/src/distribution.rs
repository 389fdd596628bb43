//! Histogram energy distributions

// crate modules
use crate::error::{Error, Result};

// r2s modules
use r2s_utils::{f, SliceExt, ValueExt};

// external crates
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Histogram distribution over energy groups
///
/// `energies` are the group edges (eV) and `densities` the value per eV in
/// each group, so there is always one more edge than density. For decay
/// photon sources the densities are photons/s/eV and [Tabular::integral()]
/// is the total emission rate in photons/s.
///
/// ```rust
/// # use r2s_activation::Tabular;
/// let spectrum = Tabular::new(vec![0.0, 1.0e5, 1.0e6], vec![2.0, 0.5]).unwrap();
///
/// // 2/eV over 1e5 eV plus 0.5/eV over 9e5 eV
/// assert_eq!(spectrum.integral(), 650000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tabular {
    /// Group edges (eV)
    pub energies: Vec<f64>,
    /// Value per unit energy in each group
    pub densities: Vec<f64>,
}

impl Tabular {
    /// Checked distribution from group edges and densities
    pub fn new(energies: Vec<f64>, densities: Vec<f64>) -> Result<Self> {
        let tabular = Self {
            energies,
            densities,
        };
        tabular.validate()?;
        Ok(tabular)
    }

    /// Distribution from the total in each group rather than the density
    pub fn from_group_totals(energies: Vec<f64>, totals: &[f64]) -> Result<Self> {
        if energies.len() != totals.len() + 1 {
            return Err(Error::InvalidDistribution(f!(
                "{} edges for {} groups",
                energies.len(),
                totals.len()
            )));
        }
        let densities = energies
            .windows(2)
            .zip(totals)
            .map(|(e, t)| if e[1] > e[0] { t / (e[1] - e[0]) } else { 0.0 })
            .collect();
        Self::new(energies, densities)
    }

    /// Zero everywhere on the given structure
    pub fn zeros(energies: Vec<f64>) -> Result<Self> {
        let n = energies.len().saturating_sub(1);
        Self::new(energies, vec![0.0; n])
    }

    fn validate(&self) -> Result<()> {
        if self.energies.len() < 2 || self.energies.len() != self.densities.len() + 1 {
            return Err(Error::InvalidDistribution(f!(
                "{} edges for {} densities",
                self.energies.len(),
                self.densities.len()
            )));
        }
        if !self.energies.is_ascending() {
            return Err(Error::InvalidDistribution("edges not ascending".into()));
        }
        if self.densities.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(Error::InvalidDistribution(
                "densities must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Total in each group
    pub fn group_totals(&self) -> Vec<f64> {
        self.energies
            .windows(2)
            .zip(&self.densities)
            .map(|(e, d)| d * (e[1] - e[0]))
            .collect()
    }

    /// Integral over all energies
    pub fn integral(&self) -> f64 {
        self.group_totals().iter().sum()
    }

    /// Mean energy (eV), zero for an empty distribution
    pub fn mean_energy(&self) -> f64 {
        let total = self.integral();
        if total <= 0.0 {
            return 0.0;
        }
        self.energies
            .windows(2)
            .zip(self.group_totals())
            .map(|(e, t)| 0.5 * (e[0] + e[1]) * t)
            .sum::<f64>()
            / total
    }

    /// Copy with every density multiplied by a constant
    pub fn scaled(&self, factor: f64) -> Tabular {
        Tabular {
            energies: self.energies.clone(),
            densities: self.densities.iter().map(|d| d * factor).collect(),
        }
    }

    /// Sample an energy, uniform within the chosen group
    ///
    /// Returns `None` if the distribution integrates to zero.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<f64> {
        let cdf = self.group_totals().cumulative_sum();
        let total = *cdf.last()?;
        if total <= 0.0 {
            return None;
        }

        let xi = rng.gen::<f64>() * total;
        let g = cdf.partition_point(|c| *c <= xi).min(cdf.len() - 1);
        let (lo, hi) = (self.energies[g], self.energies[g + 1]);
        Some(lo + (hi - lo) * rng.gen::<f64>())
    }
}

impl std::fmt::Display for Tabular {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} groups, {} total, mean {} eV",
            self.densities.len(),
            self.integral().sci(5, 2),
            self.mean_energy().sci(5, 2)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn group_totals_round_trip() {
        let t = Tabular::from_group_totals(vec![0.0, 10.0, 30.0], &[5.0, 10.0]).unwrap();
        assert_eq!(t.densities, vec![0.5, 0.5]);
        assert_eq!(t.group_totals(), vec![5.0, 10.0]);
        assert_eq!(t.scaled(2.0).integral(), 30.0);
    }

    #[test]
    fn invalid() {
        assert!(Tabular::new(vec![0.0], vec![]).is_err());
        assert!(Tabular::new(vec![1.0, 0.0], vec![1.0]).is_err());
        assert!(Tabular::new(vec![0.0, 1.0], vec![-1.0]).is_err());
        assert!(Tabular::from_group_totals(vec![0.0, 1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn samples_follow_groups() {
        // nothing in the first group, so every sample lands in [10, 20)
        let t = Tabular::new(vec![0.0, 10.0, 20.0], vec![0.0, 1.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let e = t.sample(&mut rng).unwrap();
            assert!((10.0..=20.0).contains(&e));
        }
        assert_eq!(t.mean_energy(), 15.0);
    }

    #[test]
    fn empty_cannot_be_sampled() {
        let t = Tabular::zeros(vec![0.0, 1.0, 2.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(t.sample(&mut rng).is_none());
        assert_eq!(t.mean_energy(), 0.0);
    }
}
