//! Dose and heating tallies with their post-processing
//!
//! Photon transport results come back per source particle. The tally
//! definitions here describe what to ask the engine for, and the conversions
//! turn the results into dose rates or absorbed doses with their standard
//! deviations.
#![doc = include_str!("../readme.md")]

mod dose;
mod error;
mod foils;
mod heating;
mod measured;
mod particle;
mod response;
mod tally;

#[doc(inline)]
pub use dose::{
    flux_dose_rate, heating_dose_rate, read_dose_reports, write_dose_reports, CellDose,
    DoseReport, AGREEMENT_SIGMAS, EV_TO_GY, J_PER_EV, SECONDS_PER_HOUR, SV_PER_MREM,
};

#[doc(inline)]
pub use foils::{Foil, FoilComparison};

#[doc(inline)]
pub use heating::{
    heating_dose, read_heating_csv, write_heating_csv, Calibration, CellHeating, HeatingRow,
};

#[doc(inline)]
pub use measured::Measured;

#[doc(inline)]
pub use particle::Particle;

#[doc(inline)]
pub use response::Response;

#[doc(inline)]
pub use tally::{CellTally, Filter, Score, TallySpec};

#[doc(inline)]
pub use error::{Error, Result};
