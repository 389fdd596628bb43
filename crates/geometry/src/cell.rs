//! Cells and collections of cells

// crate modules
use crate::bbox::BoundingBox;
use crate::error::{Error, Result};
use crate::region::Region;

// standard library
use std::collections::BTreeMap;

// external crates
use nalgebra::Point3;

/// A geometry cell
///
/// The region itself belongs to the transport engine and is only ever asked
/// containment questions. The workflow owns the `volume`, which starts as
/// `None` until estimated or supplied.
#[derive(Debug)]
pub struct Cell {
    /// Cell identifier
    pub id: u32,
    /// Geometric region of the cell
    pub region: Box<dyn Region>,
    /// Identifier of the fill material, `None` for void
    pub fill: Option<u32>,
    /// Volume of the cell (cm3)
    pub volume: Option<f64>,
}

impl Cell {
    /// New cell with no volume set
    pub fn new(id: u32, region: impl Region + 'static, fill: Option<u32>) -> Self {
        Self {
            id,
            region: Box::new(region),
            fill,
            volume: None,
        }
    }

    /// Builder-style volume assignment
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Check if a point is inside the cell
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.region.contains(point)
    }

    /// Volume only if it is usable, i.e. finite and positive
    pub fn valid_volume(&self) -> Option<f64> {
        self.volume.filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// Collection of cells keyed by id
///
/// Ordered by cell id so that iteration, and anything persisted from it, is
/// deterministic.
#[derive(Debug, Default)]
pub struct Geometry {
    cells: BTreeMap<u32, Cell>,
}

impl Geometry {
    /// Empty geometry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell, replacing any existing cell with the same id
    pub fn insert(&mut self, cell: Cell) -> Option<Cell> {
        self.cells.insert(cell.id, cell)
    }

    /// Get a cell by id
    pub fn cell(&self, id: u32) -> Result<&Cell> {
        self.cells.get(&id).ok_or(Error::UnknownCell(id))
    }

    /// Get a mutable cell by id
    pub fn cell_mut(&mut self, id: u32) -> Result<&mut Cell> {
        self.cells.get_mut(&id).ok_or(Error::UnknownCell(id))
    }

    /// Iterate over all cells in id order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// List of all cell ids
    pub fn ids(&self) -> Vec<u32> {
        self.cells.keys().copied().collect()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if there are no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell (by id) containing the point
    pub fn find_cell(&self, point: &Point3<f64>) -> Option<u32> {
        self.cells
            .values()
            .find(|c| c.contains(point))
            .map(|c| c.id)
    }

    /// Bounding box for a cell
    ///
    /// An explicitly supplied box takes precedence over the one the region
    /// reports about itself.
    pub fn bounding_box(
        &self,
        id: u32,
        supplied: &BTreeMap<u32, BoundingBox>,
    ) -> Result<BoundingBox> {
        if let Some(bbox) = supplied.get(&id) {
            return Ok(*bbox);
        }
        self.cell(id)?
            .region
            .bounding_box()
            .ok_or(Error::MissingBoundingBox(id))
    }

    /// Assign volumes to any cells in the map
    ///
    /// Ids not in the geometry are an error so that stale volume files are not
    /// silently applied to a different model.
    pub fn set_volumes(&mut self, volumes: &BTreeMap<u32, f64>) -> Result<()> {
        for (id, volume) in volumes {
            self.cell_mut(*id)?.volume = Some(*volume);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Sphere;

    #[test]
    fn supplied_box_wins() {
        let mut geometry = Geometry::new();
        geometry.insert(Cell::new(1, Sphere::at_origin(1.0), Some(1)));

        let mut supplied = BTreeMap::new();
        assert_eq!(
            geometry.bounding_box(1, &supplied).unwrap(),
            BoundingBox::cube(1.0)
        );

        supplied.insert(1, BoundingBox::cube(3.0));
        assert_eq!(
            geometry.bounding_box(1, &supplied).unwrap(),
            BoundingBox::cube(3.0)
        );

        assert!(matches!(
            geometry.bounding_box(2, &supplied),
            Err(Error::UnknownCell(2))
        ));
    }

    #[test]
    fn volume_validity() {
        let cell = Cell::new(3, Sphere::at_origin(1.0), None);
        assert!(cell.valid_volume().is_none());
        assert!(Cell::new(3, Sphere::at_origin(1.0), None)
            .with_volume(0.0)
            .valid_volume()
            .is_none());
        assert_eq!(
            Cell::new(3, Sphere::at_origin(1.0), None)
                .with_volume(2.0)
                .valid_volume(),
            Some(2.0)
        );
    }
}
