//! Stochastic cell volume estimation by rejection sampling
#![doc = include_str!("../readme.md")]

mod error;
mod estimate;
mod settings;

#[doc(inline)]
pub use estimate::{
    estimate_common, estimate_region, estimate_volumes, VolumeEstimate, VolumeResults,
};

#[doc(inline)]
pub use settings::VolumeSettings;

#[doc(inline)]
pub use error::{Error, Result};
