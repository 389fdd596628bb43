//! Depletion chain reading, writing, and reduction
//!
//! Full depletion chains contain thousands of nuclides, most of which can
//! never be reached from the materials of interest. A reduced chain keeps only
//! the nuclides within a few transmutation or decay hops of a set of seeds.
//!
//! ```rust, no_run
//! # use r2s_chain::Chain;
//! let chain = Chain::read_xml("path/to/chain.xml").unwrap();
//! let reduced = chain.reduce(&["Fe56", "Cr52", "Ni58", "C0"], 4).unwrap();
//! reduced.write_xml("chain_reduced.xml").unwrap();
//! ```
#![doc = include_str!("../readme.md")]

mod chain;
mod error;
mod nuclide;
mod parsers;
mod xml;

#[doc(inline)]
pub use chain::{
    expand_seeds, Chain, ChainNuclide, DecayMode, DecaySource, Interpolation, Reaction, Spectrum,
};

#[doc(inline)]
pub use nuclide::{normalise_name, Nuclide};

#[doc(inline)]
pub use xml::Element;

#[doc(inline)]
pub use error::{Error, Result};
