//! Time integration over a schedule and the stored results

// crate modules
use crate::cram::cram16;
use crate::error::{Error, Result};
use crate::operator::DepletionOperator;
use crate::schedule::Schedule;

// r2s modules
use r2s_chain::Chain;
use r2s_utils::{f, ValueExt};

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// external crates
use log::{debug, info, trace};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Negative atoms smaller than this fraction of the total are round-off
pub const NEGATIVE_TOLERANCE: f64 = 1.0e-10;

/// First order predictor over a schedule
///
/// Rates are evaluated at the beginning of each step and held for the whole
/// step, which is exact for an operator without transport feedback.
///
/// A schedule of `n` steps gives `n + 1` states. With `final_step` off the
/// last state is stored with a zero source rate, so the trailing cooling step
/// only exists to put a state at the end of the timeline.
#[derive(Debug)]
pub struct PredictorIntegrator<'a, O: DepletionOperator> {
    operator: &'a O,
    schedule: &'a Schedule,
    /// Keep the source running for the state at the end of the last step
    pub final_step: bool,
}

impl<'a, O: DepletionOperator> PredictorIntegrator<'a, O> {
    /// Integrator with `final_step` off
    pub fn new(operator: &'a O, schedule: &'a Schedule) -> Self {
        Self {
            operator,
            schedule,
            final_step: false,
        }
    }

    /// Deplete every material over the whole schedule
    pub fn integrate(&self) -> Result<DepletionResults> {
        self.schedule.validate()?;
        let cells = self.operator.cells().to_vec();
        let mut states: Vec<Vec<DVector<f64>>> = vec![self.operator.initial_condition()];

        info!(
            "Depleting {} materials over {} steps",
            cells.len(),
            self.schedule.len()
        );

        for (step, (dt, source_rate)) in self.schedule.steps().enumerate() {
            trace!("Step {step}: {} s at {} n/s", dt, source_rate.sci(3, 2));
            let mut next = Vec::with_capacity(cells.len());

            for (i, n) in states[step].iter().enumerate() {
                let matrix = self.operator.matrix(i, source_rate)?;
                let mut n_next = cram16(&matrix, n, dt)?;
                sanitise(&mut n_next).map_err(|reason| {
                    Error::NumericalInstability(f!("cell {} at step {step}: {reason}", cells[i]))
                })?;
                next.push(n_next);
            }
            states.push(next);
        }

        let final_rate = if self.final_step {
            self.schedule.source_rates.last().copied().unwrap_or(0.0)
        } else {
            0.0
        };
        let mut source_rates = self.schedule.source_rates.clone();
        source_rates.push(final_rate);

        Ok(DepletionResults {
            nuclides: self.operator.nuclides().to_vec(),
            cells,
            times: self.schedule.times(),
            source_rates,
            atoms: states
                .into_iter()
                .map(|state| state.into_iter().map(|n| n.as_slice().to_vec()).collect())
                .collect(),
        })
    }
}

/// Clamp round-off negatives, reject anything worse
fn sanitise(n: &mut DVector<f64>) -> std::result::Result<(), String> {
    if let Some(v) = n.iter().find(|v| !v.is_finite()) {
        return Err(f!("non-finite atom count {v}"));
    }

    let total: f64 = n.iter().map(|v| v.abs()).sum();
    for v in n.iter_mut().filter(|v| **v < 0.0) {
        if v.abs() <= NEGATIVE_TOLERANCE * total {
            *v = 0.0;
        } else {
            return Err(f!("negative atom count {v} out of {total}"));
        }
    }
    Ok(())
}

/// Atoms of every nuclide in every material at every state
///
/// State `k` is the inventory at `times[k]`, with state `0` the starting
/// inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepletionResults {
    /// Nuclide names in storage order
    pub nuclides: Vec<String>,
    /// Cell ids in storage order
    pub cells: Vec<u32>,
    /// Time of every state (s)
    pub times: Vec<f64>,
    /// Source rate in effect at every state (n/s)
    pub source_rates: Vec<f64>,
    /// Atoms indexed as `[state][cell][nuclide]`
    pub atoms: Vec<Vec<Vec<f64>>>,
}

impl DepletionResults {
    /// Number of states
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// True if there are no states
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Atoms of every nuclide for a cell at a state, in storage order
    pub fn atoms(&self, state: usize, cell: u32) -> Result<&[f64]> {
        let c = self
            .cells
            .iter()
            .position(|id| *id == cell)
            .ok_or(Error::MissingFluxData(cell))?;
        self.atoms
            .get(state)
            .map(|s| s[c].as_slice())
            .ok_or(Error::UnknownState(state))
    }

    /// Non-zero inventory of a cell at a state
    pub fn inventory(&self, state: usize, cell: u32) -> Result<BTreeMap<String, f64>> {
        Ok(self
            .nuclides
            .iter()
            .zip(self.atoms(state, cell)?)
            .filter(|(_, n)| **n > 0.0)
            .map(|(name, n)| (name.clone(), *n))
            .collect())
    }

    /// Total activity of a cell at a state (Bq)
    pub fn activity(&self, state: usize, cell: u32, chain: &Chain) -> Result<f64> {
        Ok(self
            .nuclides
            .iter()
            .zip(self.atoms(state, cell)?)
            .filter_map(|(name, n)| chain.nuclide(name).ok().map(|c| c.decay_constant() * n))
            .sum())
    }

    /// Write to a binary file
    pub fn write_bin<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("Writing depletion results to {}", path.display());
        let writer = BufWriter::new(File::create(path)?);
        Ok(bincode::serialize_into(writer, self)?)
    }

    /// Read back from a binary file
    pub fn read_bin<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_off_is_clamped() {
        let mut n = DVector::from_vec(vec![1.0e20, -1.0e5, 3.0]);
        sanitise(&mut n).unwrap();
        assert_eq!(n[1], 0.0);

        let mut n = DVector::from_vec(vec![1.0e20, -1.0e15]);
        assert!(sanitise(&mut n).is_err());

        let mut n = DVector::from_vec(vec![f64::NAN]);
        assert!(sanitise(&mut n).is_err());
    }
}
