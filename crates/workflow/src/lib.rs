//! Staged shutdown dose workflow around an external transport engine
#![doc = include_str!("../readme.md")]

mod config;
mod engine;
mod error;
mod stage;
mod workflow;

#[doc(inline)]
pub use workflow::{DoseRates, Workflow};

#[doc(inline)]
pub use engine::{EngineSession, PhotonTallies, TransportEngine};

#[doc(inline)]
pub use config::{ActivationConfig, ChainConfig, EngineContext, WorkflowConfig};

#[doc(inline)]
pub use stage::{
    artifacts, ensure_fresh, load_fresh, settings_match, settings_path, statepoint_filename,
    write_settings, Stage, State,
};

#[doc(inline)]
pub use error::{Error, Result};
