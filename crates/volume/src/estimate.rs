//! Rejection sampling volume estimates

// crate modules
use crate::error::{Error, Result};
use crate::settings::VolumeSettings;

// r2s modules
use r2s_geometry::{BoundingBox, Geometry, Region};
use r2s_utils::{f, ValueExt};

// standard library
use std::collections::BTreeMap;
use std::path::Path;

// external crates
use kdam::tqdm;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Volume estimate for a single cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeEstimate {
    /// Estimated volume (cm3)
    pub volume: f64,
    /// Standard deviation of the estimate (cm3)
    pub std_dev: f64,
    /// Total number of points sampled
    pub samples: u64,
    /// Number of points that landed in the cell
    pub hits: u64,
    /// Repaired box the points were sampled in
    pub bbox: BoundingBox,
}

impl VolumeEstimate {
    /// Build the estimate from the raw tallies
    ///
    /// ```rust
    /// # use r2s_volume::VolumeEstimate;
    /// # use r2s_geometry::BoundingBox;
    /// let bbox = BoundingBox::cube(1.0);
    /// let estimate = VolumeEstimate::from_counts(250, 1000, bbox);
    /// assert_eq!(estimate.volume, 2.0);
    /// ```
    pub fn from_counts(hits: u64, samples: u64, bbox: BoundingBox) -> Self {
        let (volume, std_dev) = if samples == 0 {
            (0.0, 0.0)
        } else {
            let n = samples as f64;
            let p = hits as f64 / n;
            let v_box = bbox.volume();
            (p * v_box, v_box * (p * (1.0 - p) / n).sqrt())
        };

        Self {
            volume,
            std_dev,
            samples,
            hits,
            bbox,
        }
    }

    /// Relative standard deviation, infinite when nothing was hit
    pub fn relative_error(&self) -> f64 {
        if self.volume > 0.0 {
            self.std_dev / self.volume
        } else {
            f64::INFINITY
        }
    }
}

impl std::fmt::Display for VolumeEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} +/- {} cm3 ({}/{} hits)",
            self.volume.sci(5, 2),
            self.std_dev.sci(2, 2),
            self.hits,
            self.samples
        )
    }
}

/// Collection of estimates keyed by cell id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeResults {
    /// Estimate for every requested cell
    pub estimates: BTreeMap<u32, VolumeEstimate>,
}

impl VolumeResults {
    /// Plain `{cid: volume}` map, leaving out cells no point landed in
    pub fn volumes(&self) -> BTreeMap<u32, f64> {
        self.estimates
            .iter()
            .filter(|(_, e)| e.hits > 0)
            .map(|(id, e)| (*id, e.volume))
            .collect()
    }

    /// Repaired bounding boxes used for every cell
    pub fn bounding_boxes(&self) -> BTreeMap<u32, BoundingBox> {
        self.estimates.iter().map(|(id, e)| (*id, e.bbox)).collect()
    }

    /// Persist `{cid_string: volume}` to a JSON file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        r2s_geometry::write_volumes(&self.volumes(), path)?;
        Ok(())
    }
}

/// Estimate volumes for a list of cells and write them to the geometry
///
/// Each cell is sampled in its own bounding box. Boxes in `boxes` take
/// precedence over any the cell region knows about, and every box goes through
/// the same repair policy with the fallback domain in `settings`.
///
/// A cell that no point lands in keeps its estimate in the results but has its
/// volume cleared, so anything needing the volume fails on it by name.
///
/// ```rust
/// # use r2s_geometry::{Cell, Geometry, Sphere};
/// # use r2s_volume::{estimate_volumes, VolumeSettings};
/// # use std::collections::BTreeMap;
/// let mut geometry = Geometry::new();
/// geometry.insert(Cell::new(1, Sphere::at_origin(1.0), None));
///
/// let settings = VolumeSettings::new(10_000);
/// let results = estimate_volumes(&mut geometry, &[1], &BTreeMap::new(), &settings).unwrap();
///
/// assert!(geometry.cell(1).unwrap().volume.is_some());
/// assert!((results.estimates[&1].volume - 4.18879).abs() < 0.2);
/// ```
pub fn estimate_volumes(
    geometry: &mut Geometry,
    cells: &[u32],
    boxes: &BTreeMap<u32, BoundingBox>,
    settings: &VolumeSettings,
) -> Result<VolumeResults> {
    settings.validate()?;
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut results = VolumeResults::default();

    info!("Estimating volumes for {} cells", cells.len());
    for id in tqdm!(cells.iter(), desc = "Volumes", disable = !settings.progress) {
        let bbox = geometry
            .bounding_box(*id, boxes)?
            .repaired(settings.fallback.as_ref())
            .map_err(|e| match e {
                r2s_geometry::Error::InvalidBoundingBox(reason) => {
                    r2s_geometry::Error::InvalidBoundingBox(f!("cell {id}: {reason}"))
                }
                other => other,
            })?;

        let cell = geometry.cell_mut(*id)?;
        let estimate = estimate_region(cell.region.as_ref(), &bbox, settings, &mut rng);
        debug!("Cell {id}: {estimate}");

        if estimate.hits == 0 {
            warn!(
                "Cell {id}: no hits in {} samples, volume left unset",
                estimate.samples
            );
            cell.volume = None;
        } else {
            cell.volume = Some(estimate.volume);
        }
        results.estimates.insert(*id, estimate);
    }

    Ok(results)
}

/// Estimate a single region within an already repaired box
///
/// Always draws one batch of `settings.samples`. With a relative error
/// trigger, more batches are drawn until `sigma/V < trigger` or the total
/// reaches `settings.max_samples`.
pub fn estimate_region<R: Rng + ?Sized>(
    region: &dyn Region,
    bbox: &BoundingBox,
    settings: &VolumeSettings,
    rng: &mut R,
) -> VolumeEstimate {
    let mut hits = 0;
    let mut samples = 0;

    loop {
        let batch = settings.samples.min(settings.max_samples - samples);
        hits += (0..batch)
            .filter(|_| region.contains(&bbox.sample(rng)))
            .count() as u64;
        samples += batch;

        let estimate = VolumeEstimate::from_counts(hits, samples, *bbox);
        let Some(trigger) = settings.rel_err_trigger else {
            return estimate;
        };

        if estimate.relative_error() < trigger {
            return estimate;
        }

        if samples >= settings.max_samples {
            warn!(
                "Relative error {:.4} above trigger {trigger} after the maximum {} samples",
                estimate.relative_error(),
                samples
            );
            return estimate;
        }
    }
}

/// Estimate several cells sharing the same sample points in one box
///
/// Every point is assigned to each cell containing it. For disjoint cells the
/// total of the estimates can never exceed the box volume, which is the
/// natural way to check a geometry for overlaps or gaps.
///
/// No relative error trigger is applied, `settings.samples` points are drawn.
pub fn estimate_common(
    geometry: &Geometry,
    cells: &[u32],
    bbox: &BoundingBox,
    settings: &VolumeSettings,
) -> Result<VolumeResults> {
    settings.validate()?;
    let bbox = bbox.repaired(settings.fallback.as_ref())?;
    let mut rng = StdRng::seed_from_u64(settings.seed);

    let regions = cells
        .iter()
        .map(|id| Ok((*id, geometry.cell(*id)?.region.as_ref())))
        .collect::<Result<Vec<(u32, &dyn Region)>>>()?;

    let mut hits = vec![0_u64; regions.len()];
    for _ in 0..settings.samples {
        let point = bbox.sample(&mut rng);
        for (count, (_, region)) in hits.iter_mut().zip(regions.iter()) {
            if region.contains(&point) {
                *count += 1;
            }
        }
    }

    let estimates = regions
        .iter()
        .zip(hits)
        .map(|((id, _), h)| (*id, VolumeEstimate::from_counts(h, settings.samples, bbox)))
        .collect();

    Ok(VolumeResults { estimates })
}

impl VolumeSettings {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(Error::InvalidSettings("samples must be > 0".into()));
        }
        if self.max_samples < self.samples {
            return Err(Error::InvalidSettings(f!(
                "max_samples ({}) below batch size ({})",
                self.max_samples,
                self.samples
            )));
        }
        if let Some(trigger) = self.rel_err_trigger {
            if trigger.is_nan() || trigger <= 0.0 {
                return Err(Error::InvalidSettings(f!(
                    "relative error trigger must be positive, found {trigger}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r2s_geometry::{Cuboid, Sphere};

    #[test]
    fn full_box_has_no_error() {
        let bbox = BoundingBox::cube(1.0);
        let settings = VolumeSettings::new(100);
        let mut rng = StdRng::seed_from_u64(1);
        let e = estimate_region(&Cuboid(bbox), &bbox, &settings, &mut rng);
        assert_eq!(e.volume, 8.0);
        assert_eq!(e.std_dev, 0.0);
        assert_eq!(e.hits, 100);
    }

    #[test]
    fn trigger_adds_batches() {
        let bbox = BoundingBox::cube(1.0);
        let settings = VolumeSettings {
            rel_err_trigger: Some(0.002),
            max_samples: 50_000,
            ..VolumeSettings::new(1_000)
        };
        let mut rng = StdRng::seed_from_u64(1);
        let e = estimate_region(&Sphere::at_origin(1.0), &bbox, &settings, &mut rng);
        // unreachable trigger, so stops at the cap in whole batches
        assert_eq!(e.samples, 50_000);
    }

    #[test]
    fn trigger_met_early() {
        let bbox = BoundingBox::cube(1.0);
        let settings = VolumeSettings {
            rel_err_trigger: Some(0.05),
            max_samples: 1_000_000,
            ..VolumeSettings::new(1_000)
        };
        let mut rng = StdRng::seed_from_u64(3);
        let e = estimate_region(&Sphere::at_origin(1.0), &bbox, &settings, &mut rng);
        assert_eq!(e.samples, 1_000);
        assert!(e.relative_error() < 0.05);
    }

    #[test]
    fn bad_settings() {
        let mut settings = VolumeSettings::new(0);
        assert!(settings.validate().is_err());
        settings.samples = 10;
        settings.max_samples = 5;
        assert!(settings.validate().is_err());
        settings.max_samples = 10;
        settings.rel_err_trigger = Some(-1.0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn nothing_hit() {
        let e = VolumeEstimate::from_counts(0, 100, BoundingBox::cube(1.0));
        assert_eq!(e.volume, 0.0);
        assert!(e.relative_error().is_infinite());
    }
}
