//! One-group fluxes and microscopic cross sections per cell
//!
//! The transport engine computes these, so the core only defines the contract
//! in [FluxMicroProvider] and a way of persisting and replaying the results.

// crate modules
use crate::error::{Error, Result};
use crate::material::Material;

// r2s modules
use r2s_utils::f;

// standard library
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// File name of the persisted flux table
pub const FLUX_FILE: &str = "fluxes.csv";

/// One-group microscopic cross sections for a single cell
///
/// Keyed by nuclide then reaction type, values in barns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MicroXs {
    data: BTreeMap<String, BTreeMap<String, f64>>,
}

impl MicroXs {
    /// Empty set of cross sections
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cross section (b)
    pub fn insert(&mut self, nuclide: &str, reaction: &str, xs: f64) {
        self.data
            .entry(nuclide.to_string())
            .or_default()
            .insert(reaction.to_string(), xs);
    }

    /// Cross section (b) of a reaction, if known
    pub fn get(&self, nuclide: &str, reaction: &str) -> Option<f64> {
        self.data.get(nuclide)?.get(reaction).copied()
    }

    /// Number of nuclide/reaction pairs
    pub fn len(&self) -> usize {
        self.data.values().map(|r| r.len()).sum()
    }

    /// True if there are no cross sections
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(nuclide, reaction, xs)` in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.data.iter().flat_map(|(nuclide, reactions)| {
            reactions
                .iter()
                .map(move |(reaction, xs)| (nuclide.as_str(), reaction.as_str(), *xs))
        })
    }
}

/// Ordered one-group results for a list of cells
///
/// Entry `i` of both vectors belongs to cell `i` of the list the provider was
/// given. The flux is the engine's track-length tally, in particle-cm per
/// source neutron.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxMicros {
    /// Scalar flux per cell
    pub fluxes: Vec<f64>,
    /// Cross sections per cell
    pub micros: Vec<MicroXs>,
}

impl FluxMicros {
    /// Check ordering and values against the requested cells
    ///
    /// Negative or NaN fluxes are a [Error::NumericalInstability].
    pub fn validate(&self, cells: &[u32]) -> Result<()> {
        for found in [self.fluxes.len(), self.micros.len()] {
            if found != cells.len() {
                return Err(Error::OrderMismatch {
                    expected: cells.len(),
                    found,
                });
            }
        }

        for (cell, flux) in cells.iter().zip(&self.fluxes) {
            if !flux.is_finite() || *flux < 0.0 {
                return Err(Error::NumericalInstability(f!(
                    "flux of {flux} in cell {cell}"
                )));
            }
        }

        for (cell, micros) in cells.iter().zip(&self.micros) {
            if let Some((n, r, xs)) = micros.iter().find(|(_, _, xs)| !xs.is_finite() || *xs < 0.0) {
                return Err(Error::NumericalInstability(f!(
                    "{n} {r} cross section of {xs} b in cell {cell}"
                )));
            }
        }
        Ok(())
    }

    /// Persist to the flux table plus a cross section table per cell
    pub fn write_csv<P: AsRef<Path>>(&self, dir: P, cells: &[u32]) -> Result<()> {
        self.validate(cells)?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut writer = csv::Writer::from_path(dir.join(FLUX_FILE))?;
        for (cell, flux) in cells.iter().zip(&self.fluxes) {
            writer.serialize(FluxRow {
                cell: *cell,
                flux: *flux,
            })?;
        }
        writer.flush()?;

        for (cell, micros) in cells.iter().zip(&self.micros) {
            let mut writer = csv::Writer::from_path(micros_path(dir, *cell))?;
            for (nuclide, reaction, xs) in micros.iter() {
                writer.serialize(MicroRow {
                    nuclide: nuclide.to_string(),
                    reaction: reaction.to_string(),
                    xs,
                })?;
            }
            writer.flush()?;
        }

        debug!("Wrote flux and cross sections for {} cells", cells.len());
        Ok(())
    }
}

/// Anything able to produce one-group fluxes and cross sections for cells
///
/// Normally this is a neutron transport run over the model. `materials` are
/// the depletable clones, in the same order as `cells`, and the output must
/// keep that order.
pub trait FluxMicroProvider {
    /// Fluxes and cross sections for every cell, in order
    fn flux_micros(&mut self, cells: &[u32], materials: &[Material]) -> Result<FluxMicros>;
}

/// Replays fluxes and cross sections persisted with [FluxMicros::write_csv()]
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    /// Provider reading from a directory of tables
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl FluxMicroProvider for CsvProvider {
    fn flux_micros(&mut self, cells: &[u32], _materials: &[Material]) -> Result<FluxMicros> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(self.dir.join(FLUX_FILE))?;

        let fluxes = reader
            .deserialize::<FluxRow>()
            .map(|row| row.map(|r| (r.cell, r.flux)))
            .collect::<std::result::Result<BTreeMap<u32, f64>, csv::Error>>()?;

        let mut result = FluxMicros::default();
        for cell in cells {
            let flux = fluxes.get(cell).ok_or(Error::MissingFluxData(*cell))?;
            let path = micros_path(&self.dir, *cell);
            if !path.exists() {
                return Err(Error::MissingFluxData(*cell));
            }

            let mut micros = MicroXs::new();
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(path)?;
            for row in reader.deserialize::<MicroRow>() {
                let row = row?;
                micros.insert(&row.nuclide, &row.reaction, row.xs);
            }

            result.fluxes.push(*flux);
            result.micros.push(micros);
        }

        result.validate(cells)?;
        Ok(result)
    }
}

/// Collapse multigroup cross sections with a multigroup flux
///
/// `sum(sigma_g * phi_g) / sum(phi_g)`, zero if there is no flux at all.
///
/// ```rust
/// # use r2s_activation::collapse;
/// let xs = collapse(&[1.0, 3.0], &[1.0, 1.0]).unwrap();
/// assert_eq!(xs, 2.0);
/// ```
pub fn collapse(sigma: &[f64], flux: &[f64]) -> Result<f64> {
    if sigma.len() != flux.len() {
        return Err(Error::OrderMismatch {
            expected: flux.len(),
            found: sigma.len(),
        });
    }
    if flux.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(Error::NumericalInstability(
            "multigroup flux must be finite and non-negative".into(),
        ));
    }

    let total: f64 = flux.iter().sum();
    if total == 0.0 {
        warn!("Collapsing cross sections with zero flux");
        return Ok(0.0);
    }
    Ok(sigma.iter().zip(flux).map(|(s, p)| s * p).sum::<f64>() / total)
}

fn micros_path(dir: &Path, cell: u32) -> PathBuf {
    dir.join(f!("micros_{cell}.csv"))
}

#[derive(Debug, Serialize, Deserialize)]
struct FluxRow {
    cell: u32,
    flux: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct MicroRow {
    nuclide: String,
    reaction: String,
    xs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FluxMicros {
        let mut a = MicroXs::new();
        a.insert("Co59", "(n,gamma)", 37.2);
        a.insert("Fe56", "(n,p)", 1.1e-3);
        let mut b = MicroXs::new();
        b.insert("Ni58", "(n,p)", 0.11);
        FluxMicros {
            fluxes: vec![12.5, 3.2],
            micros: vec![a, b],
        }
    }

    #[test]
    fn persisted_tables_replay_in_requested_order() {
        let dir = tempfile::tempdir().unwrap();
        sample().write_csv(dir.path(), &[10, 20]).unwrap();

        let mut provider = CsvProvider::new(dir.path());
        let replay = provider.flux_micros(&[20, 10], &[]).unwrap();
        assert_eq!(replay.fluxes, vec![3.2, 12.5]);
        assert_eq!(replay.micros[1].get("Co59", "(n,gamma)"), Some(37.2));
        assert_eq!(replay.micros[0].len(), 1);

        assert!(matches!(
            provider.flux_micros(&[30], &[]),
            Err(Error::MissingFluxData(30))
        ));
    }

    #[test]
    fn bad_fluxes() {
        let mut data = sample();
        assert!(matches!(
            data.validate(&[1]),
            Err(Error::OrderMismatch { expected: 1, found: 2 })
        ));
        data.fluxes[0] = f64::NAN;
        assert!(matches!(
            data.validate(&[1, 2]),
            Err(Error::NumericalInstability(_))
        ));
    }

    #[test]
    fn collapse_checks() {
        assert_eq!(collapse(&[5.0], &[0.0]).unwrap(), 0.0);
        assert!(collapse(&[5.0, 1.0], &[1.0]).is_err());
        assert!(collapse(&[5.0], &[-1.0]).is_err());
    }
}
