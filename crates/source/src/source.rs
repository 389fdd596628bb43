//! Photon sources tied to individual cells

// crate modules
use crate::error::{Error, Result};

// r2s modules
use r2s_activation::Tabular;
use r2s_geometry::{BoundingBox, Geometry};
use r2s_utils::ValueExt;

// standard library
use std::collections::BTreeMap;

// external crates
use log::{debug, info};
use nalgebra::Point3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default number of rejected points before a cell is considered unreachable
pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;

/// Decay photon source of a single cell
///
/// Positions are sampled uniformly in the bounding box and rejected unless
/// they fall in the cell itself, so photons are only ever born in the
/// material that produced them. The strength is always the integral of the
/// energy distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotonSource {
    /// Cell the source is restricted to
    pub cell: u32,
    /// Box that positions are drawn from before rejection
    pub bbox: BoundingBox,
    /// Emission spectrum (photons/s/eV)
    pub energy: Tabular,
    /// Particle type, always `photon`
    pub particle: String,
    /// Total emission rate (photons/s)
    pub strength: f64,
}

impl PhotonSource {
    /// Source for a cell from its decay photon distribution
    pub fn new(cell: u32, bbox: BoundingBox, energy: Tabular) -> Self {
        Self {
            cell,
            bbox,
            strength: energy.integral(),
            energy,
            particle: "photon".to_string(),
        }
    }

    /// Sample a birth position inside the cell
    ///
    /// Gives up with [Error::RejectionLimit] after `max_attempts` points
    /// outside the cell rather than spinning forever on a cell that does not
    /// overlap its box.
    pub fn sample_position<R: Rng + ?Sized>(
        &self,
        geometry: &Geometry,
        rng: &mut R,
        max_attempts: u64,
    ) -> Result<Point3<f64>> {
        let cell = geometry.cell(self.cell)?;
        for _ in 0..max_attempts {
            let point = self.bbox.sample(rng);
            if cell.contains(&point) {
                return Ok(point);
            }
        }
        Err(Error::RejectionLimit {
            cell: self.cell,
            attempts: max_attempts,
        })
    }

    /// Sample a birth position and energy (eV)
    pub fn sample<R: Rng + ?Sized>(
        &self,
        geometry: &Geometry,
        rng: &mut R,
        max_attempts: u64,
    ) -> Result<(Point3<f64>, f64)> {
        let energy = self
            .energy
            .sample(rng)
            .ok_or(Error::ZeroStrength(self.cell))?;
        Ok((self.sample_position(geometry, rng, max_attempts)?, energy))
    }
}

impl std::fmt::Display for PhotonSource {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "cell {} {} {} /s",
            self.cell,
            self.particle,
            self.strength.sci(5, 2)
        )
    }
}

/// Build photon sources for every cell with a decay photon distribution
///
/// Boxes in `boxes` take precedence over anything the cell regions know about
/// themselves, and are repaired against `fallback` in the same way as for
/// volume estimation. Cells that emit nothing are skipped.
///
/// ```rust
/// # use r2s_activation::Tabular;
/// # use r2s_geometry::{Cell, Geometry, Sphere};
/// # use r2s_source::assemble_sources;
/// # use std::collections::BTreeMap;
/// let mut geometry = Geometry::new();
/// geometry.insert(Cell::new(1, Sphere::at_origin(5.0), Some(1)));
///
/// let spectrum = Tabular::new(vec![0.0, 1.0e6], vec![2.5]).unwrap();
/// let distributions = BTreeMap::from([(1, spectrum)]);
///
/// let sources = assemble_sources(&geometry, &distributions, &BTreeMap::new(), None).unwrap();
/// assert_eq!(sources[0].strength, 2.5e6);
/// ```
pub fn assemble_sources(
    geometry: &Geometry,
    distributions: &BTreeMap<u32, Tabular>,
    boxes: &BTreeMap<u32, BoundingBox>,
    fallback: Option<&BoundingBox>,
) -> Result<Vec<PhotonSource>> {
    let mut sources = Vec::with_capacity(distributions.len());

    for (cell, energy) in distributions {
        if energy.integral() <= 0.0 {
            info!("Skipping cell {cell}, no decay photons");
            continue;
        }
        let bbox = geometry.bounding_box(*cell, boxes)?.repaired(fallback)?;
        let source = PhotonSource::new(*cell, bbox, energy.clone());
        debug!("{source}");
        sources.push(source);
    }

    Ok(sources)
}

/// Total strength of a set of sources (photons/s)
pub fn total_strength(sources: &[PhotonSource]) -> f64 {
    sources.iter().map(|s| s.strength).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use r2s_geometry::{Cell, Cuboid, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn strength_is_the_integral() {
        let energy = Tabular::new(vec![0.0, 1.0e5, 1.0e6], vec![3.0, 0.25]).unwrap();
        let source = PhotonSource::new(1, BoundingBox::cube(1.0), energy.clone());
        assert_eq!(source.strength, energy.integral());
        assert_eq!(source.particle, "photon");
    }

    #[test]
    fn zero_sources_are_skipped() {
        let mut geometry = Geometry::new();
        geometry.insert(Cell::new(1, Sphere::at_origin(1.0), Some(1)));
        geometry.insert(Cell::new(2, Sphere::at_origin(2.0), Some(1)));

        let distributions = BTreeMap::from([
            (1, Tabular::zeros(vec![0.0, 1.0]).unwrap()),
            (2, Tabular::new(vec![0.0, 1.0], vec![1.0]).unwrap()),
        ]);
        let sources = assemble_sources(&geometry, &distributions, &BTreeMap::new(), None).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].cell, 2);
    }

    #[test]
    fn unreachable_cell() {
        let mut geometry = Geometry::new();
        let far = BoundingBox::new([10.0; 3], [11.0; 3]).unwrap();
        geometry.insert(Cell::new(1, Cuboid(far), Some(1)));

        let energy = Tabular::new(vec![0.0, 1.0], vec![1.0]).unwrap();
        let source = PhotonSource::new(1, BoundingBox::cube(1.0), energy);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(matches!(
            source.sample_position(&geometry, &mut rng, 100),
            Err(Error::RejectionLimit {
                cell: 1,
                attempts: 100
            })
        ));
    }
}
