//! Tally definitions handed to the transport engine and the results it returns

// crate modules
use crate::error::{Error, Result};
use crate::measured::Measured;
use crate::particle::Particle;
use crate::response::Response;

// standard library
use std::collections::BTreeMap;

// external crates
use log::warn;
use serde::{Deserialize, Serialize};

/// Restriction on what a tally scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Only the listed cells, one bin each
    Cell { bins: Vec<u32> },
    /// Weight every score by an energy dependent response
    EnergyFunction {
        energies: Vec<f64>,
        values: Vec<f64>,
    },
    /// Only the listed particle
    Particle { particle: Particle },
}

/// Quantity being scored
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    /// Track length flux (particle-cm per source particle)
    Flux,
    /// Deposited energy (eV per source particle)
    Heating,
}

impl Score {
    /// Name used by the engine
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flux => "flux",
            Self::Heating => "heating",
        }
    }
}

/// Tally as requested from the transport engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallySpec {
    /// Descriptive name
    pub name: String,
    /// All filters applied together
    pub filters: Vec<Filter>,
    /// Quantities scored
    pub scores: Vec<Score>,
}

impl TallySpec {
    /// Photon flux folded with a dose response in each cell
    ///
    /// ```rust
    /// # use r2s_tally::{Filter, Response, Score, TallySpec};
    /// let tally = TallySpec::flux_dose(&[1, 2], &Response::ansi_1977());
    /// assert_eq!(tally.scores, vec![Score::Flux]);
    /// assert_eq!(tally.cells(), vec![1, 2]);
    /// ```
    pub fn flux_dose(cells: &[u32], response: &Response) -> Self {
        Self {
            name: "dose".to_string(),
            filters: vec![
                Filter::Cell {
                    bins: cells.to_vec(),
                },
                Filter::EnergyFunction {
                    energies: response.energies.clone(),
                    values: response.values.clone(),
                },
                Filter::Particle {
                    particle: Particle::Photon,
                },
            ],
            scores: vec![Score::Flux],
        }
    }

    /// Energy deposition in each cell, all particles
    pub fn heating(cells: &[u32]) -> Self {
        Self {
            name: "heating".to_string(),
            filters: vec![Filter::Cell {
                bins: cells.to_vec(),
            }],
            scores: vec![Score::Heating],
        }
    }

    /// Cells of the cell filter, if there is one
    pub fn cells(&self) -> Vec<u32> {
        self.filters
            .iter()
            .find_map(|f| match f {
                Filter::Cell { bins } => Some(bins.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Results of a single score per cell, normalised per source particle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellTally {
    /// Quantity scored
    pub score: Option<Score>,
    /// Result for every cell bin
    pub results: BTreeMap<u32, Measured>,
}

impl CellTally {
    /// New set of results for a score
    pub fn new(score: Score, results: BTreeMap<u32, Measured>) -> Self {
        let tally = Self {
            score: Some(score),
            results,
        };
        tally.warn_noisy();
        tally
    }

    /// Result for a cell
    pub fn get(&self, cell: u32) -> Result<Measured> {
        self.results
            .get(&cell)
            .copied()
            .ok_or_else(|| Error::MissingResult {
                score: self.score.map(|s| s.name()).unwrap_or("unknown").to_string(),
                cell,
            })
    }

    /// Results with a standard deviation above the mean are kept but flagged
    fn warn_noisy(&self) {
        for (cell, value) in self.results.iter().filter(|(_, v)| v.is_noisy()) {
            warn!(
                "Noisy {} tally in cell {cell}: {value}",
                self.score.map(|s| s.name()).unwrap_or("unknown")
            );
        }
    }
}
