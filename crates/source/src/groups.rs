//! Named groups of cells and their combined strength

// crate modules
use crate::source::PhotonSource;

// standard library
use std::collections::BTreeMap;

// external crates
use log::warn;
use serde::{Deserialize, Serialize};

/// Named groups of cell ids, e.g. `inner`, `next`, and `front`
///
/// Groups are free to overlap, and cells that belong to no group still count
/// towards the total source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellGroups(pub BTreeMap<String, Vec<u32>>);

impl CellGroups {
    /// Empty set of groups
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a group
    pub fn insert(&mut self, name: &str, cells: Vec<u32>) {
        self.0.insert(name.to_string(), cells);
    }

    /// Sum of member strengths for every group (photons/s)
    ///
    /// Members with no source, for example because they emit nothing, simply
    /// contribute zero.
    ///
    /// ```rust
    /// # use r2s_activation::Tabular;
    /// # use r2s_geometry::BoundingBox;
    /// # use r2s_source::{CellGroups, PhotonSource};
    /// let energy = Tabular::new(vec![0.0, 1.0], vec![4.0]).unwrap();
    /// let sources = vec![
    ///     PhotonSource::new(1, BoundingBox::cube(1.0), energy.clone()),
    ///     PhotonSource::new(2, BoundingBox::cube(1.0), energy.scaled(0.5)),
    /// ];
    ///
    /// let mut groups = CellGroups::new();
    /// groups.insert("inner", vec![1, 2]);
    /// groups.insert("front", vec![2, 3]);
    ///
    /// let totals = groups.strengths(&sources);
    /// assert_eq!(totals["inner"], 6.0);
    /// assert_eq!(totals["front"], 2.0);
    /// ```
    pub fn strengths(&self, sources: &[PhotonSource]) -> BTreeMap<String, f64> {
        let by_cell: BTreeMap<u32, f64> = sources.iter().map(|s| (s.cell, s.strength)).collect();

        self.0
            .iter()
            .map(|(name, cells)| {
                let total: f64 = cells
                    .iter()
                    .filter_map(|c| {
                        let strength = by_cell.get(c);
                        if strength.is_none() {
                            warn!("Group {name}: no source for cell {c}");
                        }
                        strength
                    })
                    .sum();
                (name.clone(), total)
            })
            .collect()
    }
}
