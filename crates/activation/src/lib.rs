//! Activation of dose cells and their decay photon sources
//!
//! Each dose cell gets a private copy of its fill material which is depleted
//! under the one-group fluxes and cross sections of that cell over an
//! irradiation schedule. At each requested cooling time the inventory is
//! turned into a decay photon energy distribution.
//!
//! ```rust, no_run
//! # use r2s_activation::*;
//! # use r2s_chain::Chain;
//! # fn model() -> Model { Model::default() }
//! let model = model();
//! let chain = Chain::read_xml("chain_reduced.xml").unwrap();
//! let schedule = Schedule::named("campaign1").unwrap();
//! let mut provider = CsvProvider::new("microxs/");
//!
//! let activation = run_activation(
//!     &model,
//!     &[10, 11, 12],
//!     &schedule,
//!     &chain,
//!     &DEFAULT_COOLING_DAYS,
//!     &mut provider,
//!     &ActivationSettings::default(),
//! )
//! .unwrap();
//!
//! // Decay photons/s of cell 10 one day after shutdown
//! let strength = activation.sources[&1][&10].integral();
//! ```
#![doc = include_str!("../readme.md")]

mod cram;
mod distribution;
mod error;
mod integrator;
mod material;
mod microxs;
mod operator;
mod orchestrator;
mod photon;
mod schedule;

#[doc(inline)]
pub use cram::cram16;

#[doc(inline)]
pub use distribution::Tabular;

#[doc(inline)]
pub use integrator::{DepletionResults, PredictorIntegrator, NEGATIVE_TOLERANCE};

#[doc(inline)]
pub use material::{Material, Model};

#[doc(inline)]
pub use microxs::{collapse, CsvProvider, FluxMicroProvider, FluxMicros, MicroXs, FLUX_FILE};

#[doc(inline)]
pub use operator::{DepletionOperator, IndependentOperator};

#[doc(inline)]
pub use orchestrator::{
    read_sources, run_activation, write_sources, Activation, ActivationSettings, DecaySources,
};

#[doc(inline)]
pub use photon::{decay_photon_energy, DEFAULT_ENERGY_GRID};

#[doc(inline)]
pub use schedule::{Schedule, DEFAULT_COOLING_DAYS, SCHEDULE_NAMES, SECONDS_PER_DAY};

#[doc(inline)]
pub use error::{Error, Result};
