//! Full activation of a set of dose cells

// crate modules
use crate::distribution::Tabular;
use crate::error::{Error, Result};
use crate::integrator::{DepletionResults, PredictorIntegrator};
use crate::material::{Material, Model};
use crate::microxs::FluxMicroProvider;
use crate::operator::IndependentOperator;
use crate::photon::{decay_photon_energy, DEFAULT_ENERGY_GRID};
use crate::schedule::Schedule;

// r2s modules
use r2s_chain::Chain;

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// external crates
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Decay photon distributions keyed by cooling day, then by cell id
pub type DecaySources = BTreeMap<u32, BTreeMap<u32, Tabular>>;

/// Options for [run_activation()]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationSettings {
    /// Photon group edges (eV) for the decay sources
    pub energy_grid: Vec<f64>,
    /// Keep the source on for the state at the end of the schedule
    pub final_step: bool,
}

impl Default for ActivationSettings {
    fn default() -> Self {
        Self {
            energy_grid: DEFAULT_ENERGY_GRID.to_vec(),
            final_step: false,
        }
    }
}

/// Everything produced by an activation run
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    /// Atoms of every dose cell at every state
    pub depletion: DepletionResults,
    /// Decay photon sources at each requested cooling time
    pub sources: DecaySources,
}

/// Activate dose cells over a schedule and collect their decay photon sources
///
/// The steps are:
/// 1. clone the fill material of every dose cell, marked depletable with the
///    cell volume
/// 2. get one-group fluxes and cross sections for the clones from `provider`
/// 3. build an [IndependentOperator] normalised to the schedule source rates
/// 4. integrate with a [PredictorIntegrator] over the whole schedule
/// 5. bin the decay photons of each clone at every cooling checkpoint
///
/// Checkpoints are cooling times in days after the last irradiation step,
/// which must all fall on step boundaries of the schedule.
///
/// Every dose cell needs a valid volume, otherwise this fails with
/// [Error::MissingVolume] before any work is done.
pub fn run_activation<P: FluxMicroProvider + ?Sized>(
    model: &Model,
    dose_cells: &[u32],
    schedule: &Schedule,
    chain: &Chain,
    checkpoints: &[u32],
    provider: &mut P,
    settings: &ActivationSettings,
) -> Result<Activation> {
    schedule.validate()?;
    let positions = schedule.checkpoints(checkpoints)?;
    let materials = depletable_clones(model, dose_cells)?;

    info!("Activating {} dose cells", dose_cells.len());
    let flux_micros = provider.flux_micros(dose_cells, &materials)?;
    let operator = IndependentOperator::new(chain, dose_cells, materials, &flux_micros)?;

    let mut integrator = PredictorIntegrator::new(&operator, schedule);
    integrator.final_step = settings.final_step;
    let depletion = integrator.integrate()?;

    let mut sources = DecaySources::new();
    for (day, position) in positions {
        debug!("Collecting decay photons at {day} days (position {position})");
        let mut by_cell = BTreeMap::new();
        for cell in dose_cells {
            let energy =
                decay_photon_energy(&depletion, position, *cell, chain, &settings.energy_grid)?;
            if energy.integral() == 0.0 {
                warn!("Cell {cell} emits no decay photons at {day} days");
            }
            by_cell.insert(*cell, energy);
        }
        sources.insert(day, by_cell);
    }

    Ok(Activation { depletion, sources })
}

/// Private depletable copy of the fill of each dose cell, in the same order
fn depletable_clones(model: &Model, dose_cells: &[u32]) -> Result<Vec<Material>> {
    dose_cells
        .iter()
        .map(|cid| {
            let volume = model
                .geometry
                .cell(*cid)?
                .valid_volume()
                .ok_or(Error::MissingVolume(*cid))?;
            Ok(model.fill(*cid)?.depletable_clone(volume))
        })
        .collect()
}

/// Write decay sources to a binary file
pub fn write_sources<P: AsRef<Path>>(sources: &DecaySources, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    Ok(bincode::serialize_into(writer, sources)?)
}

/// Read decay sources back from a binary file
pub fn read_sources<P: AsRef<Path>>(path: P) -> Result<DecaySources> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}
