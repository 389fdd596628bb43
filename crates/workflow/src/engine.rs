//! Seam to the external transport engine

// crate modules
use crate::config::EngineContext;
use crate::error::Result;

// r2s modules
use r2s_activation::FluxMicroProvider;
use r2s_source::PhotonSource;
use r2s_tally::{CellTally, TallySpec};

// standard library
use std::ops::Deref;
use std::path::PathBuf;

// external crates
use log::{debug, warn};

/// Everything the workflow asks of a Monte Carlo transport engine
///
/// Neutron transport is only ever needed for one-group fluxes and cross
/// sections, so that part is the [FluxMicroProvider] supertrait. The engine
/// must be initialised before either kind of run and finalised afterwards,
/// which [EngineSession] takes care of.
pub trait TransportEngine: FluxMicroProvider {
    /// Load cross sections and the chain for the rest of the run
    fn init(&mut self, context: &EngineContext) -> Result<()>;

    /// Release everything acquired by [TransportEngine::init()]
    fn finalize(&mut self) -> Result<()>;

    /// Fixed source photon transport
    ///
    /// `tallies` are the flux dose tally followed by the heating tally.
    /// Results are per source photon.
    fn run_photons(
        &mut self,
        sources: &[PhotonSource],
        tallies: &[TallySpec],
        batches: u32,
    ) -> Result<PhotonTallies>;
}

/// Results of a photon run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotonTallies {
    /// Statepoint the engine wrote
    pub statepoint: PathBuf,
    /// Response weighted flux per scoring cell
    pub flux: CellTally,
    /// Energy deposition per scoring cell, if the engine scored it
    pub heating: Option<CellTally>,
}

/// Scoped access to an engine
///
/// The engine is initialised on first use, and finalised exactly once when
/// the session is closed or dropped. Nothing is initialised if the engine is
/// never asked for.
pub struct EngineSession<'a, E: TransportEngine + ?Sized> {
    engine: &'a mut E,
    context: &'a EngineContext,
    initialised: bool,
}

impl<'a, E: TransportEngine + ?Sized> EngineSession<'a, E> {
    /// Session over an engine that has not been initialised yet
    pub fn new(engine: &'a mut E, context: &'a EngineContext) -> Self {
        Self {
            engine,
            context,
            initialised: false,
        }
    }

    /// The engine, initialising it first if needed
    pub fn engine(&mut self) -> Result<&mut E> {
        if !self.initialised {
            debug!(
                "Initialising engine with {}",
                self.context.cross_sections.display()
            );
            self.engine.init(self.context)?;
            self.initialised = true;
        }
        Ok(&mut *self.engine)
    }

    /// True once the engine has been initialised
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Finalise now, reporting any failure
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.initialised {
            self.initialised = false;
            debug!("Finalising engine");
            self.engine.finalize()?;
        }
        Ok(())
    }
}

impl<E: TransportEngine + ?Sized> Drop for EngineSession<'_, E> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Failed to finalise engine: {e}");
        }
    }
}

impl<E: TransportEngine + ?Sized> Deref for EngineSession<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &*self.engine
    }
}
