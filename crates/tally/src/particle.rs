//! Particle types that deposit energy or carry dose

// crate modules
use crate::error::Error;

// external crates
use serde::{Deserialize, Serialize};

/// Particles that appear in dose and heating tallies
///
/// Conversions accept the usual designators, full names, and numeric ids
/// regardless of case.
///
/// ```rust
/// # use r2s_tally::Particle;
/// assert_eq!(Particle::Photon, Particle::try_from("p").unwrap());
/// assert_eq!(Particle::Photon, Particle::try_from("Photon").unwrap());
/// assert_eq!(Particle::Positron, Particle::try_from(8).unwrap());
/// assert!(Particle::try_from("muon").is_err());
/// ```
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Particle {
    Neutron = 1,
    Photon = 2,
    Electron = 3,
    Positron = 8,
}

impl Particle {
    /// Numeric id of the particle
    #[inline]
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Lowercase name used in tally files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Neutron => "neutron",
            Self::Photon => "photon",
            Self::Electron => "electron",
            Self::Positron => "positron",
        }
    }

    /// True for the particles grouped with photons for heating
    pub fn is_photon_like(&self) -> bool {
        !matches!(self, Self::Neutron)
    }
}

impl std::fmt::Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u8> for Particle {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Neutron),
            2 => Ok(Self::Photon),
            3 => Ok(Self::Electron),
            8 => Ok(Self::Positron),
            _ => Err(Error::FailedToInferParticle(v.to_string())),
        }
    }
}

impl TryFrom<&str> for Particle {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "1" | "n" | "neutron" => Ok(Self::Neutron),
            "2" | "p" | "photon" | "gamma" => Ok(Self::Photon),
            "3" | "e" | "electron" => Ok(Self::Electron),
            "8" | "f" | "positron" => Ok(Self::Positron),
            _ => Err(Error::FailedToInferParticle(s.to_string())),
        }
    }
}

impl TryFrom<String> for Particle {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}
