// r2s modules
use r2s_geometry::BoundingBox;

// external crates
use serde::{Deserialize, Serialize};

/// Controls for the volume estimates
///
/// Only the batch size is required. Everything else has a sensible default.
///
/// ```rust
/// # use r2s_volume::VolumeSettings;
/// let settings = VolumeSettings {
///     rel_err_trigger: Some(0.01),
///     ..VolumeSettings::new(100_000)
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    /// Number of points per batch
    pub samples: u64,
    /// Keep sampling until sigma/V drops below this
    pub rel_err_trigger: Option<f64>,
    /// Hard cap on the total number of points per cell
    pub max_samples: u64,
    /// Global domain substituted for infinite bounding box axes
    pub fallback: Option<BoundingBox>,
    /// Seed for the random number generator
    pub seed: u64,
    /// Show a progress bar over the cells
    pub progress: bool,
}

impl VolumeSettings {
    /// Settings with a batch size and defaults for everything else
    pub fn new(samples: u64) -> Self {
        Self {
            samples,
            max_samples: samples.saturating_mul(100),
            ..Default::default()
        }
    }
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            samples: 1_000_000,
            rel_err_trigger: None,
            max_samples: 100_000_000,
            fallback: None,
            seed: 1,
            progress: false,
        }
    }
}
