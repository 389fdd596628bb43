// crate modules
use crate::error::Result;
use crate::source::PhotonSource;

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Photon sources keyed by cooling day
pub type PhotonSources = BTreeMap<u32, Vec<PhotonSource>>;

/// Write photon sources for every cooling time to JSON
pub fn write_photon_sources<P: AsRef<Path>>(sources: &PhotonSources, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, sources)?;
    Ok(())
}

/// Read photon sources back from JSON
pub fn read_photon_sources<P: AsRef<Path>>(path: P) -> Result<PhotonSources> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
