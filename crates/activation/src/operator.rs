//! Depletion operators build the burnup matrix of each material

// crate modules
use crate::error::{Error, Result};
use crate::material::Material;
use crate::microxs::{FluxMicros, MicroXs};

// r2s modules
use r2s_chain::Chain;
use r2s_utils::f;

// external crates
use itertools::Itertools;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

/// Square centimetres in a barn
const CM2_PER_BARN: f64 = 1.0e-24;

/// Anything able to provide burnup matrices for a set of materials
///
/// Matrix rows and columns follow the order of [DepletionOperator::nuclides()]
/// and column `i` holds every rate (1/s) out of nuclide `i`.
pub trait DepletionOperator {
    /// Nuclide names in matrix order
    fn nuclides(&self) -> &[String];

    /// Cell ids of the materials being depleted
    fn cells(&self) -> &[u32];

    /// Starting atoms of every material
    fn initial_condition(&self) -> Vec<DVector<f64>>;

    /// Burnup matrix for material `index` while the source runs at `source_rate`
    fn matrix(&self, index: usize, source_rate: f64) -> Result<DMatrix<f64>>;
}

/// Operator with fixed one-group reaction rates and no transport feedback
///
/// Reaction rates scale with the source, so for a step with source rate `s`
///
/// ```text
/// rate = sigma * 1e-24 * (flux / V) * s
/// ```
///
/// where `flux` is the tally in particle-cm per source neutron and `V` the
/// material volume. The decay part of the matrix never changes, so it is
/// built once.
#[derive(Debug, Clone)]
pub struct IndependentOperator {
    nuclides: Vec<String>,
    cells: Vec<u32>,
    materials: Vec<Material>,
    /// Flux per unit source (1/cm2 per source neutron)
    flux_densities: Vec<f64>,
    reactions: Vec<DMatrix<f64>>,
    decay: DMatrix<f64>,
}

impl IndependentOperator {
    /// Operator for cloned materials and their one-group data, all in cell order
    ///
    /// Nuclides that the chain does not know about are dropped with a
    /// warning, since there is no data to evolve them with.
    pub fn new(
        chain: &Chain,
        cells: &[u32],
        materials: Vec<Material>,
        flux_micros: &FluxMicros,
    ) -> Result<Self> {
        flux_micros.validate(cells)?;
        if materials.len() != cells.len() {
            return Err(Error::OrderMismatch {
                expected: cells.len(),
                found: materials.len(),
            });
        }

        let mut flux_densities = Vec::with_capacity(cells.len());
        for ((cell, material), flux) in cells.iter().zip(&materials).zip(&flux_micros.fluxes) {
            let volume = material
                .volume
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or(Error::MissingVolume(*cell))?;
            if !material.depletable {
                warn!("Material {} in cell {cell} is not marked depletable", material.id);
            }
            for name in material.nuclides.keys().filter(|n| !chain.contains(n)) {
                warn!("Dropping {name} from cell {cell}, not in the depletion chain");
            }
            flux_densities.push(flux / volume);
        }

        let reactions = flux_micros
            .micros
            .iter()
            .map(|micros| reaction_matrix(chain, micros))
            .collect();

        debug!(
            "Independent operator over {} cells and {} nuclides",
            cells.len(),
            chain.len()
        );

        Ok(Self {
            nuclides: chain.names().into_iter().map(str::to_string).collect(),
            cells: cells.to_vec(),
            materials,
            flux_densities,
            reactions,
            decay: decay_matrix(chain),
        })
    }

    /// The materials being depleted, in cell order
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }
}

impl DepletionOperator for IndependentOperator {
    fn nuclides(&self) -> &[String] {
        &self.nuclides
    }

    fn cells(&self) -> &[u32] {
        &self.cells
    }

    fn initial_condition(&self) -> Vec<DVector<f64>> {
        self.materials
            .iter()
            .map(|m| {
                let atoms = m.atoms();
                DVector::from_iterator(
                    self.nuclides.len(),
                    self.nuclides
                        .iter()
                        .map(|n| atoms.get(n).copied().unwrap_or(0.0)),
                )
            })
            .collect()
    }

    fn matrix(&self, index: usize, source_rate: f64) -> Result<DMatrix<f64>> {
        let reactions = self
            .reactions
            .get(index)
            .ok_or_else(|| Error::NumericalInstability(f!("no material at index {index}")))?;

        let flux = self.flux_densities[index] * source_rate;
        if flux > 0.0 {
            Ok(&self.decay + reactions * flux)
        } else {
            Ok(self.decay.clone())
        }
    }
}

/// Decay part of the burnup matrix (1/s)
fn decay_matrix(chain: &Chain) -> DMatrix<f64> {
    let n = chain.len();
    let mut matrix = DMatrix::zeros(n, n);

    for (i, nuclide) in chain.nuclides().iter().enumerate() {
        let lambda = nuclide.decay_constant();
        if lambda == 0.0 {
            continue;
        }
        matrix[(i, i)] -= lambda;

        for mode in &nuclide.decay_modes {
            if let Some(j) = mode.target.as_deref().and_then(|t| chain.index_of(t)) {
                matrix[(j, i)] += lambda * mode.branching_ratio;
            }
            for (light, count) in mode.light_products() {
                if let Some(j) = chain.index_of(light) {
                    matrix[(j, i)] += lambda * count;
                }
            }
        }
    }
    matrix
}

/// Reaction part of the burnup matrix per unit flux (cm2)
///
/// Each reaction type removes the nuclide once, whatever the number of
/// branches it has to different products.
fn reaction_matrix(chain: &Chain, micros: &MicroXs) -> DMatrix<f64> {
    let n = chain.len();
    let mut matrix = DMatrix::zeros(n, n);

    for (i, nuclide) in chain.nuclides().iter().enumerate() {
        for kind in nuclide.reactions.iter().map(|r| r.kind.as_str()).unique() {
            if let Some(xs) = micros.get(&nuclide.name, kind) {
                matrix[(i, i)] -= xs * CM2_PER_BARN;
            }
        }

        for reaction in &nuclide.reactions {
            let Some(xs) = micros.get(&nuclide.name, &reaction.kind) else {
                continue;
            };
            let rate = xs * CM2_PER_BARN;

            if let Some(j) = reaction.target.as_deref().and_then(|t| chain.index_of(t)) {
                matrix[(j, i)] += rate * reaction.branching_ratio;
            }
            for (light, count) in reaction.light_products() {
                if let Some(j) = chain.index_of(light) {
                    matrix[(j, i)] += rate * count;
                }
            }
        }
    }
    matrix
}
