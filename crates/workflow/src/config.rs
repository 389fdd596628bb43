//! Workflow configuration read from TOML

// crate modules
use crate::error::{Error, Result};
use crate::stage::Stage;

// r2s modules
use r2s_activation::{ActivationSettings, DEFAULT_COOLING_DAYS};
use r2s_source::CellGroups;
use r2s_geometry::BoundingBox;
use r2s_utils::f;
use r2s_volume::VolumeSettings;

// standard library
use std::path::{Path, PathBuf};

// external crates
use serde::{Deserialize, Serialize};

/// Paths the transport engine is configured with for the whole run
///
/// These are fixed once the workflow starts and handed explicitly to every
/// stage that needs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineContext {
    /// Cross section library index
    pub cross_sections: PathBuf,
    /// Full depletion chain
    pub chain: PathBuf,
}

/// Chain reduction around the dose cell materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Seed nuclides, the dose cell compositions when empty
    pub seeds: Vec<String>,
    /// Maximum number of hops from any seed
    pub depth: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            depth: 4,
        }
    }
}

/// Irradiation history and the decay photon grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Name of a predefined schedule
    pub schedule: String,
    /// Cooling times to collect decay photon sources at (days)
    pub cooling_days: Vec<u32>,
    #[serde(flatten)]
    pub settings: ActivationSettings,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            schedule: "campaign1".to_string(),
            cooling_days: DEFAULT_COOLING_DAYS.to_vec(),
            settings: ActivationSettings::default(),
        }
    }
}

/// Everything the workflow needs besides the model and engine
///
/// ```rust
/// # use r2s_workflow::WorkflowConfig;
/// let config: WorkflowConfig = toml::from_str(r#"
///     output = "results"
///     dose_cells = [10, 11]
///     scoring_cells = [20]
///     batches = 50
///
///     [engine]
///     cross_sections = "/data/cross_sections.xml"
///     chain = "/data/chain.xml"
///
///     [volume]
///     samples = 100000
///
///     [activation]
///     schedule = "eff726"
///     cooling_days = [1, 7]
///
///     [groups]
///     inner = [10]
///     front = [11]
/// "#).unwrap();
///
/// assert_eq!(config.activation.schedule, "eff726");
/// assert_eq!(config.chain.depth, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Directory every artifact is written to
    pub output: PathBuf,
    /// Cells that are activated and become photon sources
    pub dose_cells: Vec<u32>,
    /// Cells where the dose rate is tallied
    pub scoring_cells: Vec<u32>,
    /// Photon transport batches
    #[serde(default = "default_batches")]
    pub batches: u32,
    /// Engine paths
    pub engine: EngineContext,
    /// Volume estimation
    #[serde(default)]
    pub volume: VolumeSettings,
    /// Optional JSON of bounding boxes overriding the cell regions
    #[serde(default)]
    pub bounding_boxes: Option<PathBuf>,
    /// Chain reduction
    #[serde(default)]
    pub chain: ChainConfig,
    /// Schedule and decay photon settings
    #[serde(default)]
    pub activation: ActivationConfig,
    /// Named groups of dose cells to total the source strength over
    #[serde(default)]
    pub groups: CellGroups,
}

fn default_batches() -> u32 {
    100
}

/// The configuration values each stage's results depend on
#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum StageSettings<'a> {
    Volumes {
        cells: Vec<u32>,
        volume: VolumeSettings,
        bounding_boxes: Option<&'a Path>,
    },
    Activation {
        dose_cells: &'a [u32],
        engine: &'a EngineContext,
        chain: &'a ChainConfig,
        activation: &'a ActivationConfig,
    },
    PhotonSources {
        fallback: Option<&'a BoundingBox>,
    },
    Dose {
        scoring_cells: &'a [u32],
        cross_sections: &'a Path,
        batches: u32,
    },
}

impl WorkflowConfig {
    /// Read and check a TOML configuration file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: WorkflowConfig = toml::from_str(&std::fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.dose_cells.is_empty() {
            return Err(Error::InvalidConfig("no dose cells".into()));
        }
        if self.scoring_cells.is_empty() {
            return Err(Error::InvalidConfig("no scoring cells".into()));
        }
        if self.batches == 0 {
            return Err(Error::InvalidConfig("zero batches".into()));
        }
        if self.activation.cooling_days.is_empty() {
            return Err(Error::InvalidConfig("no cooling times".into()));
        }
        for (name, cells) in &self.groups.0 {
            if let Some(c) = cells.iter().find(|c| !self.dose_cells.contains(c)) {
                return Err(Error::InvalidConfig(f!(
                    "group {name} includes cell {c}, which is not a dose cell"
                )));
            }
        }
        Ok(())
    }

    /// Path of an artifact in the output directory
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.output.join(name)
    }

    /// Settings that decide the results of a stage, as JSON
    ///
    /// These are stored next to each artifact, and an artifact made with
    /// different settings is stale even when the configuration never touched
    /// the disk.
    pub fn stage_settings(&self, stage: Stage) -> Result<serde_json::Value> {
        let settings = match stage {
            Stage::Volumes => StageSettings::Volumes {
                cells: self.volume_cells(),
                // the progress bar does not change any volume
                volume: VolumeSettings {
                    progress: false,
                    ..self.volume.clone()
                },
                bounding_boxes: self.bounding_boxes.as_deref(),
            },
            Stage::Activation => StageSettings::Activation {
                dose_cells: &self.dose_cells,
                engine: &self.engine,
                chain: &self.chain,
                activation: &self.activation,
            },
            Stage::PhotonSources => StageSettings::PhotonSources {
                fallback: self.volume.fallback.as_ref(),
            },
            Stage::Dose => StageSettings::Dose {
                scoring_cells: &self.scoring_cells,
                cross_sections: &self.engine.cross_sections,
                batches: self.batches,
            },
        };
        Ok(serde_json::to_value(settings)?)
    }

    /// Cooling days in the order products are keyed by
    pub fn cooling_days(&self) -> Vec<u32> {
        let mut days = self.activation.cooling_days.clone();
        days.sort_unstable();
        days.dedup();
        days
    }

    /// Every cell that needs a volume, dose cells first
    pub fn volume_cells(&self) -> Vec<u32> {
        let mut cells = self.dose_cells.clone();
        cells.extend(self.scoring_cells.iter().filter(|c| !self.dose_cells.contains(c)));
        cells
    }
}
