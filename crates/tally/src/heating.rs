//! Absorbed dose from particle resolved heating tallies

// crate modules
use crate::dose::EV_TO_GY;
use crate::error::{Error, Result};
use crate::measured::Measured;
use crate::particle::Particle;

// r2s modules
use r2s_utils::f;

// standard library
use std::collections::BTreeMap;
use std::path::Path;

// external crates
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// A single row of a heating table
///
/// Means are eV per source neutron.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatingRow {
    pub particle: Particle,
    pub cell: u32,
    pub mean: f64,
    pub std_dev: f64,
}

impl HeatingRow {
    /// Mean and standard deviation of the row
    pub fn value(&self) -> Measured {
        Measured::new(self.mean, self.std_dev)
    }
}

/// Read a heating table with `particle,cell,mean,std_dev` columns
///
/// Any extra columns, such as a nuclide, are ignored.
pub fn read_heating_csv<P: AsRef<Path>>(path: P) -> Result<Vec<HeatingRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let rows = reader
        .deserialize::<HeatingRow>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
    debug!("Read {} heating rows", rows.len());
    Ok(rows)
}

/// Detector calibration coefficients
///
/// The total deposited energy is `q_n * neutron * energy + q_p * photon`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Neutron response coefficient
    pub neutron: f64,
    /// Photon response coefficient
    pub photon: f64,
    /// Neutron energy calibration coefficient
    pub energy: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            neutron: 1.0,
            photon: 1.0,
            energy: 1.0,
        }
    }
}

/// Heating and absorbed dose of a single detector cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellHeating {
    /// Detector cell
    pub cell: u32,
    /// Neutron heating (eV per source neutron)
    pub neutron: Measured,
    /// Photon, electron, and positron heating (eV per source neutron)
    pub photon: Measured,
    /// Calibrated total heating (eV per source neutron)
    pub total: Measured,
    /// Absorbed dose (Gy per source neutron)
    pub dose: Measured,
}

/// Combine particle resolved heating into an absorbed dose per detector
///
/// Rows are grouped by cell. Neutron heating is kept apart from the sum of
/// photon, electron, and positron heating. The three channels are separate
/// tallies taken as uncorrelated, so their standard deviations add in
/// quadrature. The calibrated total is converted to Gy per source neutron
/// with the detector `density` (g/cm3) and `volume` (cm3).
///
/// Repeated rows for the same particle and cell are dropped with a warning,
/// so each particle counts once per cell. The output has one entry per cell
/// in ascending order.
///
/// ```rust
/// # use r2s_tally::{heating_dose, Calibration, HeatingRow, Particle};
/// let rows = vec![
///     HeatingRow { particle: Particle::Neutron, cell: 1, mean: 2.0e5, std_dev: 1.0e3 },
///     HeatingRow { particle: Particle::Photon, cell: 1, mean: 1.0e5, std_dev: 1.0e3 },
/// ];
/// let results = heating_dose(&rows, &Calibration::default(), 10.0, 1.0).unwrap();
///
/// // 3e5 eV in 10 g
/// assert!((results[0].dose.mean - 3.0e5 * 1.60217733e-16 / 10.0).abs() < 1e-25);
/// ```
pub fn heating_dose(
    rows: &[HeatingRow],
    calibration: &Calibration,
    density: f64,
    volume: f64,
) -> Result<Vec<CellHeating>> {
    let mass = density * volume;
    if !(mass.is_finite() && mass > 0.0) {
        return Err(Error::InvalidValue(f!(
            "detector mass of {mass} g from {density} g/cm3 and {volume} cm3"
        )));
    }

    let mut by_cell: BTreeMap<u32, BTreeMap<Particle, Measured>> = BTreeMap::new();
    for row in rows {
        let particles = by_cell.entry(row.cell).or_default();
        if particles.contains_key(&row.particle) {
            warn!("Dropping repeated {} heating row for cell {}", row.particle, row.cell);
            continue;
        }
        particles.insert(row.particle, row.value());
    }

    Ok(by_cell
        .into_iter()
        .map(|(cell, particles)| {
            let neutron = particles
                .get(&Particle::Neutron)
                .copied()
                .unwrap_or_default();
            let photon = particles
                .iter()
                .filter(|(p, _)| p.is_photon_like())
                .map(|(_, m)| *m)
                .sum::<Measured>();

            let total = neutron * (calibration.neutron * calibration.energy)
                + photon * calibration.photon;
            let dose = total * EV_TO_GY / mass;

            CellHeating {
                cell,
                neutron,
                photon,
                total,
                dose,
            }
        })
        .collect_vec())
}

/// Write heating results with one row per cell
pub fn write_heating_csv<P: AsRef<Path>>(results: &[CellHeating], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["cell", "dose", "dose_std_dev", "total", "total_std_dev"])?;
    for r in results {
        writer.write_record([
            r.cell.to_string(),
            r.dose.mean.to_string(),
            r.dose.std_dev.to_string(),
            r.total.mean.to_string(),
            r.total.std_dev.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
