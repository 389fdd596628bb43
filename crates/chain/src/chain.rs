// crate modules
use crate::error::{Error, Result};
use crate::nuclide::normalise_name;
use crate::parsers::{decay_products, reaction_products, Ejectile};
use crate::xml::Element;

// r2s modules
use r2s_utils::{f, SliceExt};

// standard library
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

// external crates
use itertools::Itertools;
use log::{debug, info};

/// Light nuclides that may be produced as particles by reactions and decays
const LIGHT_NUCLIDES: [(Ejectile, &str); 5] = [
    (Ejectile::Proton, "H1"),
    (Ejectile::Deuteron, "H2"),
    (Ejectile::Triton, "H3"),
    (Ejectile::Helion, "He3"),
    (Ejectile::Alpha, "He4"),
];

fn light_nuclide(ejectile: Ejectile) -> Option<&'static str> {
    LIGHT_NUCLIDES
        .iter()
        .find(|(e, _)| *e == ejectile)
        .map(|(_, name)| *name)
}

/// A decay channel of a nuclide
#[derive(Debug, Clone, PartialEq)]
pub struct DecayMode {
    /// Decay type string e.g. `beta-`, `ec/beta+`, `alpha`
    pub kind: String,
    /// Daughter nuclide, `None` when the daughter is not tracked
    pub target: Option<String>,
    /// Fraction of decays taking this channel
    pub branching_ratio: f64,
}

impl DecayMode {
    /// Light nuclides emitted per decay of this nuclide through this mode
    pub fn light_products(&self) -> Vec<(&'static str, f64)> {
        decay_products(&self.kind)
            .into_iter()
            .filter_map(|(n, e)| light_nuclide(e).map(|name| (name, n as f64 * self.branching_ratio)))
            .collect()
    }
}

/// A neutron reaction channel
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Reaction type string e.g. `(n,gamma)`, `(n,2n)`, `fission`
    pub kind: String,
    /// Q value (eV)
    pub q_value: f64,
    /// Product nuclide, `None` when the product is not tracked
    pub target: Option<String>,
    /// Fraction of reactions of this type leading to the target
    pub branching_ratio: f64,
}

impl Reaction {
    /// Light nuclides emitted per reaction of this type through this branch
    ///
    /// Fission and anything else that is not an `(n,...)` channel emits
    /// nothing here.
    pub fn light_products(&self) -> Vec<(&'static str, f64)> {
        let Ok((_, products)) = reaction_products(&self.kind) else {
            return Vec::new();
        };
        products
            .into_iter()
            .filter_map(|(n, e)| light_nuclide(e).map(|name| (name, n as f64 * self.branching_ratio)))
            .collect()
    }
}

/// Emission spectrum of a decay source
///
/// Values are per decay. Discrete lines are (eV, particles/decay), tabular
/// forms are (eV, particles/decay/eV) with the usual interpolation laws.
#[derive(Debug, Clone, PartialEq)]
pub enum Spectrum {
    /// Discrete lines
    Discrete {
        energies: Vec<f64>,
        intensities: Vec<f64>,
    },
    /// Continuous table
    Tabular {
        energies: Vec<f64>,
        values: Vec<f64>,
        interpolation: Interpolation,
    },
    /// Weighted sum of other spectra
    Mixture(Vec<(f64, Spectrum)>),
}

/// Interpolation law of a tabular spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Histogram,
    LinearLinear,
}

impl Interpolation {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Histogram => "histogram",
            Self::LinearLinear => "linear-linear",
        }
    }
}

impl Spectrum {
    /// Total particles per decay
    pub fn total(&self) -> f64 {
        match self {
            Self::Discrete { intensities, .. } => intensities.iter().sum(),
            Self::Tabular {
                energies,
                values,
                interpolation,
            } => energies
                .windows(2)
                .zip(values.windows(2))
                .map(|(e, v)| segment_integral(*interpolation, e, v, e[0], e[1]))
                .sum(),
            Self::Mixture(parts) => parts.iter().map(|(p, s)| p * s.total()).sum(),
        }
    }

    /// Particles per decay falling in each group of an energy structure
    ///
    /// `edges` must be ascending with `n + 1` entries for `n` groups. Anything
    /// outside the structure is dropped.
    pub fn group_totals(&self, edges: &[f64]) -> Vec<f64> {
        let mut totals = vec![0.0; edges.len().saturating_sub(1)];
        self.accumulate(edges, 1.0, &mut totals);
        totals
    }

    fn accumulate(&self, edges: &[f64], weight: f64, totals: &mut [f64]) {
        match self {
            Self::Discrete {
                energies,
                intensities,
            } => {
                for (e, i) in energies.iter().zip(intensities) {
                    if let Ok(g) = edges.find_bin_exclusive(*e) {
                        totals[g] += weight * i;
                    }
                }
            }
            Self::Tabular {
                energies,
                values,
                interpolation,
            } => {
                for (e, v) in energies.windows(2).zip(values.windows(2)) {
                    for (g, group) in edges.windows(2).enumerate() {
                        let lo = e[0].max(group[0]);
                        let hi = e[1].min(group[1]);
                        if hi > lo {
                            totals[g] += weight * segment_integral(*interpolation, e, v, lo, hi);
                        }
                    }
                }
            }
            Self::Mixture(parts) => {
                for (p, s) in parts {
                    s.accumulate(edges, weight * p, totals);
                }
            }
        }
    }
}

/// Integral over `[lo, hi]` within a single table segment
fn segment_integral(interpolation: Interpolation, e: &[f64], v: &[f64], lo: f64, hi: f64) -> f64 {
    match interpolation {
        Interpolation::Histogram => v[0] * (hi - lo),
        Interpolation::LinearLinear => {
            let width = e[1] - e[0];
            if width <= 0.0 {
                return 0.0;
            }
            let at = |x: f64| v[0] + (v[1] - v[0]) * (x - e[0]) / width;
            0.5 * (at(lo) + at(hi)) * (hi - lo)
        }
    }
}

/// Decay emission source of a single particle type
#[derive(Debug, Clone, PartialEq)]
pub struct DecaySource {
    /// Emitted particle, e.g. `photon`
    pub particle: String,
    /// Spectrum per decay
    pub spectrum: Spectrum,
}

/// A nuclide entry of the chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainNuclide {
    /// Name in the chain convention
    pub name: String,
    /// Half-life (s), `None` for stable nuclides
    pub half_life: Option<f64>,
    /// Recoverable energy per decay (eV)
    pub decay_energy: f64,
    /// Decay channels
    pub decay_modes: Vec<DecayMode>,
    /// Reaction channels
    pub reactions: Vec<Reaction>,
    /// Decay emission sources
    pub sources: Vec<DecaySource>,
    /// Any other child elements (e.g. fission yields), kept verbatim
    pub extra: Vec<Element>,
}

impl ChainNuclide {
    /// New stable nuclide with no channels
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Decay constant (1/s), zero if stable
    pub fn decay_constant(&self) -> f64 {
        match self.half_life {
            Some(t) if t > 0.0 && t.is_finite() => std::f64::consts::LN_2 / t,
            _ => 0.0,
        }
    }

    /// Photon emission spectrum per decay, if the nuclide has one
    pub fn photon_spectrum(&self) -> Option<&Spectrum> {
        self.sources
            .iter()
            .find(|s| s.particle == "photon")
            .map(|s| &s.spectrum)
    }

    /// Names of every nuclide directly reachable through decay or reaction
    fn targets(&self) -> impl Iterator<Item = &str> {
        self.decay_modes
            .iter()
            .filter_map(|d| d.target.as_deref())
            .chain(self.reactions.iter().filter_map(|r| r.target.as_deref()))
    }

    /// Light nuclides emitted through any channel
    fn light_targets(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decay_modes
            .iter()
            .flat_map(|d| d.light_products())
            .chain(self.reactions.iter().flat_map(|r| r.light_products()))
            .map(|(name, _)| name)
    }
}

/// Depletion chain
///
/// A directed graph of nuclides where decay modes and reactions are the
/// edges. Nuclide order is the document order of the chain file and is
/// preserved by every operation, so written chains are deterministic.
///
/// ```rust
/// # use r2s_chain::{Chain, ChainNuclide, DecayMode};
/// let mut co60 = ChainNuclide::new("Co60");
/// co60.half_life = Some(1.6634e8);
/// co60.decay_modes.push(DecayMode {
///     kind: "beta-".into(),
///     target: Some("Ni60".into()),
///     branching_ratio: 1.0,
/// });
///
/// let mut chain = Chain::new();
/// chain.push(co60).unwrap();
/// chain.push(ChainNuclide::new("Ni60")).unwrap();
///
/// assert!(chain.contains("Co60"));
/// assert_eq!(chain.reduce(&["Ni60"], 3).unwrap().len(), 1);
/// assert_eq!(chain.reduce(&["Co60"], 1).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    nuclides: Vec<ChainNuclide>,
    index: HashMap<String, usize>,
}

impl Chain {
    /// Empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a nuclide, names must be unique
    pub fn push(&mut self, nuclide: ChainNuclide) -> Result<()> {
        if self.index.contains_key(&nuclide.name) {
            return Err(Error::MalformedChain(f!(
                "duplicate nuclide \"{}\"",
                nuclide.name
            )));
        }
        self.index.insert(nuclide.name.clone(), self.nuclides.len());
        self.nuclides.push(nuclide);
        Ok(())
    }

    /// Number of nuclides
    pub fn len(&self) -> usize {
        self.nuclides.len()
    }

    /// True if there are no nuclides
    pub fn is_empty(&self) -> bool {
        self.nuclides.is_empty()
    }

    /// Check for a nuclide by name, in any spelling the parser understands
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Position of a nuclide in the chain
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index
            .get(name)
            .or_else(|| self.index.get(&normalise_name(name)))
            .copied()
    }

    /// Get a nuclide by name
    pub fn nuclide(&self, name: &str) -> Result<&ChainNuclide> {
        self.index_of(name)
            .map(|i| &self.nuclides[i])
            .ok_or_else(|| Error::UnknownNuclide(name.to_string()))
    }

    /// All nuclides in chain order
    pub fn nuclides(&self) -> &[ChainNuclide] {
        &self.nuclides
    }

    /// All nuclide names in chain order
    pub fn names(&self) -> Vec<&str> {
        self.nuclides.iter().map(|n| n.name.as_str()).collect()
    }

    /// Neighbours of a nuclide that exist in this chain
    ///
    /// Light particle products count as edges only when the light nuclide is
    /// itself part of the chain.
    pub fn successors(&self, nuclide: &ChainNuclide) -> Vec<usize> {
        let direct = nuclide
            .targets()
            .filter_map(|name| self.index.get(name).copied());
        let light = nuclide
            .light_targets()
            .filter_map(|name| self.index.get(name).copied());
        direct.chain(light).unique().collect()
    }

    /// Reduce the chain to everything within `depth` hops of the seeds
    ///
    /// A breadth first search from the seeds follows decay, reaction, and
    /// light particle edges. Both ends of every traversed edge are kept, and
    /// all edges between kept nuclides survive. Channels that lead out of the
    /// reduced set are kept as losses with their target cleared, so removal
    /// rates are unchanged.
    ///
    /// Seeds go through [expand_seeds()] first, so elemental carbon brings in
    /// its stable isotopes. Any seed not in the chain is an error.
    pub fn reduce<S: AsRef<str>>(&self, seeds: &[S], depth: u32) -> Result<Chain> {
        let seeds = expand_seeds(seeds);
        let mut distance: HashMap<usize, u32> = HashMap::new();
        let mut queue = VecDeque::new();

        for seed in &seeds {
            let i = self
                .index_of(seed)
                .ok_or_else(|| Error::UnknownNuclide(seed.clone()))?;
            if distance.insert(i, 0).is_none() {
                queue.push_back(i);
            }
        }

        while let Some(i) = queue.pop_front() {
            let d = distance[&i];
            if d >= depth {
                continue;
            }
            for j in self.successors(&self.nuclides[i]) {
                if !distance.contains_key(&j) {
                    distance.insert(j, d + 1);
                    queue.push_back(j);
                }
            }
        }

        let keep: HashSet<&str> = distance
            .keys()
            .map(|i| self.nuclides[*i].name.as_str())
            .collect();

        let mut reduced = Chain::new();
        for nuclide in self.nuclides.iter().filter(|n| keep.contains(n.name.as_str())) {
            let mut nuclide = nuclide.clone();
            for mode in nuclide.decay_modes.iter_mut() {
                mode.target = mode.target.take().filter(|t| keep.contains(t.as_str()));
            }
            for reaction in nuclide.reactions.iter_mut() {
                reaction.target = reaction.target.take().filter(|t| keep.contains(t.as_str()));
            }
            reduced.push(nuclide)?;
        }

        info!(
            "Reduced chain from {} to {} nuclides (depth {depth})",
            self.len(),
            reduced.len()
        );
        Ok(reduced)
    }

    /// Read a chain from a depletion chain XML file
    pub fn read_xml<P: AsRef<Path>>(path: P) -> Result<Chain> {
        let path = path.as_ref();
        debug!("Reading chain from {}", path.display());
        let xml = std::fs::read_to_string(path)?;
        Self::from_xml_str(&xml)
    }

    /// Parse a chain from depletion chain XML text
    pub fn from_xml_str(xml: &str) -> Result<Chain> {
        let root = Element::parse(xml)?;
        if root.name != "depletion_chain" {
            return Err(Error::MalformedChain(f!(
                "expected <depletion_chain> root, found <{}>",
                root.name
            )));
        }

        let mut chain = Chain::new();
        for element in root.children.iter().filter(|c| c.name == "nuclide") {
            chain.push(nuclide_from_element(element)?)?;
        }
        Ok(chain)
    }

    /// Write the chain to a depletion chain XML file
    pub fn write_xml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_xml_string()?)?;
        Ok(())
    }

    /// Depletion chain XML text
    pub fn to_xml_string(&self) -> Result<String> {
        let mut root = Element::new("depletion_chain");
        root.children = self.nuclides.iter().map(nuclide_to_element).collect();
        root.to_document()
    }
}

/// Normalise seed names and decompose elemental carbon
///
/// `C0` becomes `C12` and `C13`. Duplicates are removed, keeping the first
/// occurrence.
///
/// ```rust
/// # use r2s_chain::expand_seeds;
/// assert_eq!(expand_seeds(&["fe56", "C0", "C12"]), vec!["Fe56", "C12", "C13"]);
/// ```
pub fn expand_seeds<S: AsRef<str>>(seeds: &[S]) -> Vec<String> {
    seeds
        .iter()
        .flat_map(|s| match normalise_name(s.as_ref()).as_str() {
            "C0" => vec!["C12".to_string(), "C13".to_string()],
            other => vec![other.to_string()],
        })
        .unique()
        .collect()
}

fn nuclide_from_element(element: &Element) -> Result<ChainNuclide> {
    let mut nuclide = ChainNuclide::new(element.required("name")?);
    nuclide.half_life = element.parse_attr("half_life")?;
    nuclide.decay_energy = element.parse_attr("decay_energy")?.unwrap_or(0.0);

    for child in &element.children {
        match child.name.as_str() {
            "decay" => nuclide.decay_modes.push(DecayMode {
                kind: child.required("type")?.to_string(),
                target: child.attr("target").map(str::to_string),
                branching_ratio: child.parse_attr("branching_ratio")?.unwrap_or(1.0),
            }),
            "reaction" => nuclide.reactions.push(Reaction {
                kind: child.required("type")?.to_string(),
                q_value: child.parse_attr("Q")?.unwrap_or(0.0),
                target: child.attr("target").map(str::to_string),
                branching_ratio: child.parse_attr("branching_ratio")?.unwrap_or(1.0),
            }),
            "source" => nuclide.sources.push(DecaySource {
                particle: child.attr("particle").unwrap_or("photon").to_string(),
                spectrum: spectrum_from_element(child)?,
            }),
            _ => nuclide.extra.push(child.clone()),
        }
    }

    Ok(nuclide)
}

fn spectrum_from_element(element: &Element) -> Result<Spectrum> {
    let kind = element.required("type")?;

    if kind == "mixture" {
        let parts = element
            .children
            .iter()
            .filter(|c| c.name == "pair")
            .map(|pair| {
                let probability = pair.parse_attr("probability")?.unwrap_or(1.0);
                let dist = pair.child("dist").ok_or_else(|| {
                    Error::MalformedChain("mixture <pair> without a <dist>".into())
                })?;
                Ok((probability, spectrum_from_element(dist)?))
            })
            .collect::<Result<Vec<(f64, Spectrum)>>>()?;
        return Ok(Spectrum::Mixture(parts));
    }

    let values = element
        .child("parameters")
        .map(|p| p.numbers())
        .transpose()?
        .unwrap_or_default();

    if values.len() % 2 != 0 {
        return Err(Error::MalformedChain(f!(
            "odd number of {kind} source parameters ({})",
            values.len()
        )));
    }
    let (x, p) = values.split_at(values.len() / 2);

    match kind {
        "discrete" => Ok(Spectrum::Discrete {
            energies: x.to_vec(),
            intensities: p.to_vec(),
        }),
        "tabular" => {
            let interpolation = match element.attr("interpolation").unwrap_or("histogram") {
                "histogram" => Interpolation::Histogram,
                "linear-linear" => Interpolation::LinearLinear,
                other => {
                    return Err(Error::MalformedChain(f!(
                        "unsupported interpolation \"{other}\""
                    )))
                }
            };
            Ok(Spectrum::Tabular {
                energies: x.to_vec(),
                values: p.to_vec(),
                interpolation,
            })
        }
        other => Err(Error::MalformedChain(f!("unknown source type \"{other}\""))),
    }
}

fn nuclide_to_element(nuclide: &ChainNuclide) -> Element {
    let mut element = Element::new("nuclide");
    element.push_attr("name", &nuclide.name);
    if let Some(half_life) = nuclide.half_life {
        element.push_attr("half_life", half_life);
    }
    if !nuclide.decay_modes.is_empty() {
        element.push_attr("decay_modes", nuclide.decay_modes.len());
        element.push_attr("decay_energy", nuclide.decay_energy);
    }
    element.push_attr("reactions", nuclide.reactions.len());

    for mode in &nuclide.decay_modes {
        let mut child = Element::new("decay");
        child.push_attr("type", &mode.kind);
        if let Some(target) = &mode.target {
            child.push_attr("target", target);
        }
        child.push_attr("branching_ratio", mode.branching_ratio);
        element.children.push(child);
    }

    for source in &nuclide.sources {
        let mut child = spectrum_to_element("source", &source.spectrum);
        child.attributes.insert(1, ("particle".into(), source.particle.clone()));
        element.children.push(child);
    }

    for reaction in &nuclide.reactions {
        let mut child = Element::new("reaction");
        child.push_attr("type", &reaction.kind);
        child.push_attr("Q", reaction.q_value);
        if let Some(target) = &reaction.target {
            child.push_attr("target", target);
        }
        if reaction.branching_ratio != 1.0 {
            child.push_attr("branching_ratio", reaction.branching_ratio);
        }
        element.children.push(child);
    }

    element.children.extend(nuclide.extra.iter().cloned());
    element
}

fn spectrum_to_element(name: &str, spectrum: &Spectrum) -> Element {
    let mut element = Element::new(name);
    let parameters = |x: &[f64], p: &[f64]| {
        let mut params = Element::new("parameters");
        params.text = Some(x.iter().chain(p).join(" "));
        params
    };

    match spectrum {
        Spectrum::Discrete {
            energies,
            intensities,
        } => {
            element.push_attr("type", "discrete");
            element.children.push(parameters(energies, intensities));
        }
        Spectrum::Tabular {
            energies,
            values,
            interpolation,
        } => {
            element.push_attr("type", "tabular");
            element.push_attr("interpolation", interpolation.as_str());
            element.children.push(parameters(energies, values));
        }
        Spectrum::Mixture(parts) => {
            element.push_attr("type", "mixture");
            for (probability, part) in parts {
                let mut pair = Element::new("pair");
                pair.push_attr("probability", probability);
                pair.children.push(spectrum_to_element("dist", part));
                element.children.push(pair);
            }
        }
    }
    element
}
