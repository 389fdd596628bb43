//! Conversion of photon tallies to shutdown dose rates

// crate modules
use crate::error::{Error, Result};
use crate::measured::Measured;
use crate::tally::CellTally;

// r2s modules
use r2s_utils::f;

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// external crates
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Joules per electronvolt
pub const J_PER_EV: f64 = 1.602_176_634e-19;

/// Sieverts per millirem
pub const SV_PER_MREM: f64 = 1.0e-5;

/// eV/g to Gy
pub const EV_TO_GY: f64 = 1.602_177_33e-16;

/// Seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Number of combined standard deviations the two dose estimates may differ by
pub const AGREEMENT_SIGMAS: f64 = 3.0;

/// Dose rate (Sv/h) from a response weighted flux tally
///
/// The tally is per source photon in mrem cm3 per second of response, so it
/// is scaled by the total source `strength` (photons/s), divided by the cell
/// `volume` (cm3), and converted from mrem/s to Sv/h. The conversion is
/// linear, including the standard deviation.
///
/// ```rust
/// # use r2s_tally::{flux_dose_rate, Measured};
/// let tally = Measured::new(2.0e-6, 1.0e-7);
/// let dose = flux_dose_rate(tally, 1.0e10, 100.0).unwrap();
///
/// // 2e-6 * 1e10 / 100 * 3600 * 1e-5
/// assert!((dose.mean - 7.2).abs() < 1e-12);
/// ```
pub fn flux_dose_rate(tally: Measured, strength: f64, volume: f64) -> Result<Measured> {
    if !(volume.is_finite() && volume > 0.0) {
        return Err(Error::InvalidValue(f!("scoring volume of {volume} cm3")));
    }
    Ok(tally * strength / volume * SECONDS_PER_HOUR * SV_PER_MREM)
}

/// Dose rate (Sv/h) from an energy deposition tally
///
/// The tally is eV per source photon, scaled by the source `strength`
/// (photons/s) and divided by the cell `mass` (kg). For photons the absorbed
/// dose in Gy is numerically the dose equivalent in Sv.
pub fn heating_dose_rate(tally: Measured, strength: f64, mass: f64) -> Result<Measured> {
    if !(mass.is_finite() && mass > 0.0) {
        return Err(Error::InvalidValue(f!("scoring mass of {mass} kg")));
    }
    Ok(tally * strength * J_PER_EV / mass * SECONDS_PER_HOUR)
}

/// Both dose rate estimates for a single scoring cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellDose {
    /// From the response weighted flux (Sv/h)
    pub flux: Measured,
    /// From the energy deposition (Sv/h), if it was tallied
    pub heating: Option<Measured>,
}

impl CellDose {
    /// True unless both estimates exist and differ by more than 3 sigma
    pub fn consistent(&self) -> bool {
        self.heating
            .map(|h| h.agrees_with(&self.flux, AGREEMENT_SIGMAS))
            .unwrap_or(true)
    }
}

/// Dose rates for every scoring cell at a single cooling time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoseReport {
    /// Total photon source strength the tallies were scaled by (photons/s)
    pub strength: f64,
    /// Dose rates keyed by scoring cell
    pub cells: BTreeMap<u32, CellDose>,
}

impl DoseReport {
    /// Convert the photon tallies of every scoring cell
    ///
    /// `volumes` are in cm3 and `masses` in kg. Heating is optional, but when
    /// it is given every flux cell needs a heating result too. Disagreement
    /// between the two estimates is logged, since it usually means a missing
    /// response bin or the wrong scoring volume, but is not an error.
    pub fn new(
        flux: &CellTally,
        heating: Option<&CellTally>,
        strength: f64,
        volumes: &BTreeMap<u32, f64>,
        masses: &BTreeMap<u32, f64>,
    ) -> Result<Self> {
        let mut report = DoseReport {
            strength,
            ..Default::default()
        };

        for (cell, value) in &flux.results {
            let volume = volumes.get(cell).ok_or(Error::MissingVolume(*cell))?;
            let flux_dose = flux_dose_rate(*value, strength, *volume)?;

            let heating_dose = match heating {
                Some(tally) => {
                    let mass = masses.get(cell).ok_or(Error::MissingDensity(*cell))?;
                    Some(heating_dose_rate(tally.get(*cell)?, strength, *mass)?)
                }
                None => None,
            };

            let dose = CellDose {
                flux: flux_dose,
                heating: heating_dose,
            };
            if !dose.consistent() {
                warn!(
                    "Cell {cell}: flux dose {} and heating dose {} Sv/h disagree beyond {AGREEMENT_SIGMAS} sigma",
                    dose.flux,
                    heating_dose.unwrap_or_default()
                );
            }
            info!("Cell {cell}: {} Sv/h", dose.flux);
            report.cells.insert(*cell, dose);
        }

        Ok(report)
    }
}

/// Write dose reports for every cooling time to JSON
pub fn write_dose_reports<P: AsRef<Path>>(
    reports: &BTreeMap<u32, DoseReport>,
    path: P,
) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, reports)?;
    Ok(())
}

/// Read dose reports back from JSON
pub fn read_dose_reports<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u32, DoseReport>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
