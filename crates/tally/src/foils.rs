//! Activation foil reaction rates

// crate modules
use crate::measured::Measured;

// external crates
use log::warn;
use serde::{Deserialize, Serialize};

/// Cylindrical activation foil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Foil {
    /// Label, e.g. the foil position
    pub name: String,
    /// Radius (cm)
    pub radius: f64,
    /// Thickness (cm)
    pub thickness: f64,
}

impl Foil {
    /// New foil from its dimensions
    pub fn new(name: &str, radius: f64, thickness: f64) -> Self {
        Self {
            name: name.to_string(),
            radius,
            thickness,
        }
    }

    /// Foil volume, `pi r^2 t` (cm3)
    pub fn volume(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius * self.thickness
    }

    /// Reaction rate per unit volume from a rate tallied over the whole foil
    ///
    /// ```rust
    /// # use r2s_tally::{Foil, Measured};
    /// let foil = Foil::new("A", 1.0, 1.0 / std::f64::consts::PI);
    /// let rate = foil.rate_density(Measured::new(5.0, 0.5));
    /// assert!((rate.mean - 5.0).abs() < 1e-12);
    /// ```
    pub fn rate_density(&self, tally: Measured) -> Measured {
        tally / self.volume()
    }

    /// Compare a tallied rate with a measured one
    pub fn compare(&self, tally: Measured, experiment: Measured) -> FoilComparison {
        let calculated = self.rate_density(tally);
        let comparison = FoilComparison {
            name: self.name.clone(),
            calculated,
            experiment,
            ratio: calculated / experiment,
            agrees: calculated.agrees_with(&experiment, 1.0),
        };
        if !comparison.agrees {
            warn!(
                "Foil {}: calculated {} against measured {}",
                self.name, calculated, experiment
            );
        }
        comparison
    }
}

/// Calculated against experimental reaction rate for a foil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoilComparison {
    /// Foil label
    pub name: String,
    /// Tallied rate per unit volume
    pub calculated: Measured,
    /// Measured rate per unit volume
    pub experiment: Measured,
    /// Calculated over experiment
    pub ratio: Measured,
    /// Difference within the combined quoted uncertainty
    pub agrees: bool,
}
