//! `r2s` is a set of libraries for rigorous two-step shutdown dose
//! calculations
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of workflow crates.
#[doc(inline)]
pub use r2s_geometry as geometry;

#[doc(inline)]
pub use r2s_utils as utils;

#[cfg(feature = "activation")]
#[cfg_attr(docsrs, doc(cfg(feature = "activation")))]
#[doc(inline)]
pub use r2s_activation as activation;

#[cfg(feature = "chain")]
#[cfg_attr(docsrs, doc(cfg(feature = "chain")))]
#[doc(inline)]
pub use r2s_chain as chain;

#[cfg(feature = "source")]
#[cfg_attr(docsrs, doc(cfg(feature = "source")))]
#[doc(inline)]
pub use r2s_source as source;

#[cfg(feature = "tally")]
#[cfg_attr(docsrs, doc(cfg(feature = "tally")))]
#[doc(inline)]
pub use r2s_tally as tally;

#[cfg(feature = "volume")]
#[cfg_attr(docsrs, doc(cfg(feature = "volume")))]
#[doc(inline)]
pub use r2s_volume as volume;

#[cfg(feature = "workflow")]
#[cfg_attr(docsrs, doc(cfg(feature = "workflow")))]
#[doc(inline)]
pub use r2s_workflow as workflow;
