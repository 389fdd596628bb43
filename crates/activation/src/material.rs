//! Materials and the model handed to the activation stage

// crate modules
use crate::error::{Error, Result};

// r2s modules
use r2s_chain::Nuclide;
use r2s_geometry::Geometry;

// standard library
use std::collections::BTreeMap;

// external crates
use serde::{Deserialize, Serialize};

/// Avogadro constant (1/mol)
const AVOGADRO: f64 = 6.022_140_76e23;

/// Atoms per barn-cm to atoms per cm3
const BARN_CM: f64 = 1.0e24;

/// Material composition
///
/// Compositions are atom densities (atoms/b-cm) keyed by nuclide name in the
/// chain convention. The `volume` is only known once the material is tied to
/// a cell, at which point total atoms can be derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material identifier
    pub id: u32,
    /// Descriptive name
    #[serde(default)]
    pub name: String,
    /// Mass density (g/cm3)
    pub density: f64,
    /// Atom densities (atoms/b-cm)
    pub nuclides: BTreeMap<String, f64>,
    /// Volume (cm3), required for depletion
    #[serde(default)]
    pub volume: Option<f64>,
    /// True if the inventory is allowed to evolve
    #[serde(default)]
    pub depletable: bool,
}

impl Material {
    /// New material with no volume
    pub fn new(id: u32, density: f64, nuclides: BTreeMap<String, f64>) -> Self {
        Self {
            id,
            name: String::new(),
            density,
            nuclides,
            volume: None,
            depletable: false,
        }
    }

    /// Private copy for a single cell, marked depletable with the cell volume
    ///
    /// The copy owns its inventory outright, so depleting one cell can never
    /// leak into another cell filled with the same material.
    ///
    /// ```rust
    /// # use r2s_activation::Material;
    /// # use std::collections::BTreeMap;
    /// let steel = Material::new(1, 7.93, BTreeMap::from([("Fe56".into(), 0.08)]));
    /// let clone = steel.depletable_clone(12.5);
    ///
    /// assert!(clone.depletable);
    /// assert_eq!(clone.volume, Some(12.5));
    /// assert!(!steel.depletable);
    /// ```
    pub fn depletable_clone(&self, volume: f64) -> Material {
        let mut clone = self.clone();
        clone.depletable = true;
        clone.volume = Some(volume);
        clone
    }

    /// Total atoms of each nuclide, zero volume if it is not yet set
    pub fn atoms(&self) -> BTreeMap<String, f64> {
        let volume = self.volume.unwrap_or(0.0);
        self.nuclides
            .iter()
            .map(|(name, density)| (name.clone(), density * BARN_CM * volume))
            .collect()
    }

    /// Mass (g) from the density and volume
    pub fn mass(&self) -> Option<f64> {
        self.volume.map(|v| v * self.density)
    }

    /// Mass (g) from an inventory, taking the mass number as molar mass
    pub fn inventory_mass(atoms: &BTreeMap<String, f64>) -> f64 {
        atoms
            .iter()
            .filter_map(|(name, n)| {
                name.parse::<Nuclide>()
                    .ok()
                    .map(|nuc| n * nuc.mass as f64 / AVOGADRO)
            })
            .sum()
    }
}

/// Geometry with the materials that fill it
#[derive(Debug, Default)]
pub struct Model {
    /// Cells of the model
    pub geometry: Geometry,
    /// Materials keyed by id
    pub materials: BTreeMap<u32, Material>,
}

impl Model {
    /// Model from parts
    pub fn new(geometry: Geometry, materials: Vec<Material>) -> Self {
        Self {
            geometry,
            materials: materials.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    /// Material filling a cell
    pub fn fill(&self, cell: u32) -> Result<&Material> {
        let material = self
            .geometry
            .cell(cell)?
            .fill
            .ok_or(Error::MissingMaterial(cell))?;

        self.materials
            .get(&material)
            .ok_or(Error::UnknownMaterial { cell, material })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r2s_geometry::{Cell, Sphere};

    #[test]
    fn clones_never_alias() {
        let base = Material::new(1, 1.0, BTreeMap::from([("Co59".into(), 1e-3)]));
        let mut a = base.depletable_clone(1.0);
        let b = base.depletable_clone(2.0);
        a.nuclides.insert("Co60".into(), 1e-6);
        assert!(!b.nuclides.contains_key("Co60"));
        assert!(!base.nuclides.contains_key("Co60"));
    }

    #[test]
    fn total_atoms() {
        let m = Material::new(1, 1.0, BTreeMap::from([("H1".into(), 0.5)])).depletable_clone(2.0);
        assert_eq!(m.atoms()["H1"], 1.0e24);
        assert_eq!(m.mass(), Some(2.0));
        assert!((Material::inventory_mass(&m.atoms()) - 1.0e24 / AVOGADRO).abs() < 1e-12);
    }

    #[test]
    fn fills() {
        let mut geometry = Geometry::new();
        geometry.insert(Cell::new(1, Sphere::at_origin(1.0), Some(7)));
        geometry.insert(Cell::new(2, Sphere::at_origin(2.0), None));
        geometry.insert(Cell::new(3, Sphere::at_origin(3.0), Some(8)));
        let model = Model::new(
            geometry,
            vec![Material::new(7, 1.0, BTreeMap::new())],
        );

        assert_eq!(model.fill(1).unwrap().id, 7);
        assert!(matches!(model.fill(2), Err(Error::MissingMaterial(2))));
        assert!(matches!(
            model.fill(3),
            Err(Error::UnknownMaterial {
                cell: 3,
                material: 8
            })
        ));
    }
}
