//! Decay photon sources restricted to the cells they came from
#![doc = include_str!("../readme.md")]

mod error;
mod groups;
mod io;
mod source;

#[doc(inline)]
pub use source::{assemble_sources, total_strength, PhotonSource, DEFAULT_MAX_ATTEMPTS};

#[doc(inline)]
pub use groups::CellGroups;

#[doc(inline)]
pub use io::{read_photon_sources, write_photon_sources, PhotonSources};

#[doc(inline)]
pub use error::{Error, Result};
