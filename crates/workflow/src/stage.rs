//! Workflow stages, states, and artifact freshness

// crate modules
use crate::error::{Error, Result};

// r2s modules
use r2s_utils::f;

// standard library
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// File names of every artifact written to the output directory
pub mod artifacts {
    pub const CELL_VOLUMES: &str = "cell_volumes.json";
    pub const BOUNDING_BOXES: &str = "bounding_boxes.json";
    pub const ACTIVATION_CELLS: &str = "activation_cells.json";
    pub const CHAIN_REDUCED: &str = "chain_reduced.xml";
    pub const DEPLETION_RESULTS: &str = "depletion_results.bin";
    pub const SOURCES: &str = "sources.bin";
    pub const PHOTON_SOURCES: &str = "photon_sources.json";
    pub const DOSE_RATES: &str = "dose_rates.json";
}

/// Name of the statepoint the engine writes after a number of batches
///
/// ```rust
/// # use r2s_workflow::statepoint_filename;
/// assert_eq!(statepoint_filename(100), "statepoint.100.h5");
/// ```
pub fn statepoint_filename(batches: u32) -> String {
    f!("statepoint.{batches}.h5")
}

/// The units of work, in the order they run
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Volumes,
    Activation,
    PhotonSources,
    Dose,
}

impl Stage {
    /// Every stage in order
    pub const ALL: [Stage; 4] = [
        Stage::Volumes,
        Stage::Activation,
        Stage::PhotonSources,
        Stage::Dose,
    ];

    /// Name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Volumes => "volumes",
            Self::Activation => "activation",
            Self::PhotonSources => "photon_sources",
            Self::Dose => "dose",
        }
    }

    /// The artifact that marks the stage as done
    pub fn artifact(&self) -> &'static str {
        match self {
            Self::Volumes => artifacts::CELL_VOLUMES,
            Self::Activation => artifacts::SOURCES,
            Self::PhotonSources => artifacts::PHOTON_SOURCES,
            Self::Dose => artifacts::DOSE_RATES,
        }
    }

    /// Artifacts of earlier stages this one reads
    pub fn upstream(&self) -> &'static [&'static str] {
        match self {
            Self::Volumes => &[],
            Self::Activation => &[artifacts::CELL_VOLUMES],
            Self::PhotonSources => &[artifacts::SOURCES, artifacts::BOUNDING_BOXES],
            Self::Dose => &[artifacts::PHOTON_SOURCES, artifacts::CELL_VOLUMES],
        }
    }

    /// State reached once the stage has completed
    pub fn completes(&self) -> State {
        match self {
            Self::Volumes => State::VolumesReady,
            Self::Activation => State::ActivationReady,
            Self::PhotonSources => State::PhotonSourcesReady,
            Self::Dose => State::DoseReady,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Progress through the workflow
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Init,
    VolumesReady,
    ActivationReady,
    PhotonSourcesReady,
    DoseReady,
}

impl State {
    /// The stage that moves the workflow on, `None` once complete
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            Self::Init => Some(Stage::Volumes),
            Self::VolumesReady => Some(Stage::Activation),
            Self::ActivationReady => Some(Stage::PhotonSources),
            Self::PhotonSourcesReady => Some(Stage::Dose),
            Self::DoseReady => None,
        }
    }
}

/// Check an artifact can be reused
///
/// The artifact must exist, be non-empty, and be at least as new as every
/// input that exists. Missing inputs are ignored, since only artifacts that
/// could have changed matter.
pub fn ensure_fresh<P: AsRef<Path>>(artifact: P, inputs: &[PathBuf]) -> Result<()> {
    let artifact = artifact.as_ref();
    let metadata = std::fs::metadata(artifact)?;
    if metadata.len() == 0 {
        return Err(Error::StaleArtifact(artifact.to_path_buf()));
    }
    let modified = metadata.modified()?;

    for input in inputs {
        if let Some(time) = modified_time(input) {
            if time > modified {
                debug!("{} is newer than {}", input.display(), artifact.display());
                return Err(Error::StaleArtifact(artifact.to_path_buf()));
            }
        }
    }
    Ok(())
}

/// Reuse an artifact only if it is fresh and parses
///
/// Anything else, including an artifact that fails to parse, means the stage
/// has to run again.
pub fn load_fresh<T, F>(artifact: &Path, inputs: &[PathBuf], parse: F) -> Option<T>
where
    F: FnOnce(&Path) -> Result<T>,
{
    ensure_fresh(artifact, inputs).ok()?;
    match parse(artifact) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Ignoring unreadable {}: {e}", artifact.display());
            None
        }
    }
}

/// Where the settings an artifact was made with are kept
///
/// ```rust
/// # use r2s_workflow::settings_path;
/// # use std::path::{Path, PathBuf};
/// assert_eq!(
///     settings_path(Path::new("results/sources.bin")),
///     PathBuf::from("results/sources.bin.settings.json")
/// );
/// ```
pub fn settings_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_owned();
    name.push(".settings.json");
    PathBuf::from(name)
}

/// Record the settings an artifact was made with
pub fn write_settings(artifact: &Path, settings: &serde_json::Value) -> Result<()> {
    let writer = BufWriter::new(File::create(settings_path(artifact))?);
    serde_json::to_writer_pretty(writer, settings)?;
    Ok(())
}

/// True if an artifact was made with exactly these settings
///
/// Missing or unreadable records never match.
pub fn settings_match(artifact: &Path, settings: &serde_json::Value) -> bool {
    let path = settings_path(artifact);
    let stored: Option<serde_json::Value> = File::open(&path)
        .ok()
        .and_then(|file| serde_json::from_reader(BufReader::new(file)).ok());

    match stored {
        Some(stored) if stored == *settings => true,
        Some(_) => {
            debug!("Settings changed since {} was written", artifact.display());
            false
        }
        None => false,
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stages_in_order() {
        let mut state = State::Init;
        let mut stages = Vec::new();
        while let Some(stage) = state.next_stage() {
            stages.push(stage);
            state = stage.completes();
        }
        assert_eq!(stages, Stage::ALL);
        assert_eq!(state, State::DoseReady);
    }

    #[test]
    fn freshness() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.json");
        let artifact = dir.path().join("artifact.json");

        // missing
        assert!(ensure_fresh(&artifact, &[]).is_err());

        // empty
        File::create(&artifact).unwrap();
        assert!(matches!(
            ensure_fresh(&artifact, &[]),
            Err(Error::StaleArtifact(_))
        ));

        std::fs::write(&artifact, "{}").unwrap();
        std::fs::write(&input, "{}").unwrap();
        let now = SystemTime::now();
        File::options()
            .write(true)
            .open(&input)
            .unwrap()
            .set_modified(now - Duration::from_secs(60))
            .unwrap();
        ensure_fresh(&artifact, &[input.clone()]).unwrap();

        // input touched after the artifact
        File::options()
            .write(true)
            .open(&input)
            .unwrap()
            .set_modified(now + Duration::from_secs(60))
            .unwrap();
        assert!(matches!(
            ensure_fresh(&artifact, &[input.clone()]),
            Err(Error::StaleArtifact(_))
        ));

        // ignore inputs that do not exist
        ensure_fresh(&artifact, &[dir.path().join("nothing")]).unwrap();
    }

    #[test]
    fn recorded_settings() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("sources.bin");
        let settings = serde_json::json!({"cooling_days": [1, 7], "schedule": "campaign1"});

        // nothing recorded yet
        assert!(!settings_match(&artifact, &settings));

        write_settings(&artifact, &settings).unwrap();
        assert!(settings_match(&artifact, &settings));

        let changed = serde_json::json!({"cooling_days": [1, 7, 15], "schedule": "campaign1"});
        assert!(!settings_match(&artifact, &changed));

        std::fs::write(settings_path(&artifact), "not json").unwrap();
        assert!(!settings_match(&artifact, &settings));
    }
}
