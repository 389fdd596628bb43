//! The staged shutdown dose driver

// crate modules
use crate::config::WorkflowConfig;
use crate::engine::{EngineSession, TransportEngine};
use crate::error::Result;
use crate::stage::{artifacts, load_fresh, settings_match, write_settings, Stage, State};

// r2s modules
use r2s_activation::{
    read_sources, run_activation, write_sources, DecaySources, Model, Schedule, SECONDS_PER_DAY,
};
use r2s_chain::Chain;
use r2s_geometry::{
    read_bounding_boxes, read_volumes, write_bounding_boxes, write_cell_list, write_volumes,
    BoundingBox,
};
use r2s_source::{
    assemble_sources, read_photon_sources, total_strength, write_photon_sources, PhotonSources,
};
use r2s_tally::{read_dose_reports, write_dose_reports, DoseReport, Response, TallySpec};
use r2s_utils::ValueExt;
use r2s_volume::estimate_volumes;

// standard library
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// external crates
use itertools::Itertools;
use log::{debug, info, warn};

/// Dose reports keyed by cooling day
pub type DoseRates = BTreeMap<u32, DoseReport>;

/// Shutdown dose workflow over a model and a transport engine
///
/// Stages run in a fixed order, each writing a single artifact to the output
/// directory:
///
/// | Stage            | Artifact              | Reads                   |
/// | ---------------- | --------------------- | ----------------------- |
/// | `volumes`        | `cell_volumes.json`   | the model               |
/// | `activation`     | `sources.bin`         | volumes, chain          |
/// | `photon_sources` | `photon_sources.json` | decay sources, boxes    |
/// | `dose`           | `dose_rates.json`     | photon sources, volumes |
///
/// A stage is skipped when its artifact is non-empty, parses, is newer than
/// everything it reads, and was made with the same stage settings as the
/// current configuration. The settings are recorded beside each artifact as
/// `<artifact>.settings.json`, so an in-memory configuration change is seen
/// too. Anything else is recomputed without complaint.
pub struct Workflow<E: TransportEngine> {
    config: WorkflowConfig,
    config_path: Option<PathBuf>,
    model: Model,
    engine: E,
    state: State,
}

/// Values produced by each stage, whether computed or reloaded
#[derive(Default)]
struct Products {
    volumes: BTreeMap<u32, f64>,
    boxes: BTreeMap<u32, BoundingBox>,
    decay: DecaySources,
    photons: PhotonSources,
    doses: DoseRates,
}

impl<E: TransportEngine> Workflow<E> {
    /// New workflow from a configuration already in memory
    pub fn new(config: WorkflowConfig, model: Model, engine: E) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            config_path: None,
            model,
            engine,
            state: State::Init,
        })
    }

    /// New workflow from a TOML configuration file
    ///
    /// Artifacts older than the file are treated as stale.
    pub fn from_file<P: AsRef<Path>>(path: P, model: Model, engine: E) -> Result<Self> {
        let path = path.as_ref();
        let mut workflow = Self::new(WorkflowConfig::read(path)?, model, engine)?;
        workflow.config_path = Some(path.to_path_buf());
        Ok(workflow)
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Configuration in use
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// The model, with any estimated volumes
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The transport engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Give back the engine
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Run every remaining stage and return the dose rates
    ///
    /// A failure leaves the state at the last completed stage and is wrapped
    /// with the name of the stage that failed.
    pub fn run(&mut self) -> Result<DoseRates> {
        std::fs::create_dir_all(&self.config.output)?;

        let Workflow {
            config,
            config_path,
            model,
            engine,
            state,
        } = self;

        let config: &WorkflowConfig = config;
        let mut runner = Runner {
            config,
            config_path: config_path.as_deref(),
            model,
            session: EngineSession::new(engine, &config.engine),
            products: Products::default(),
        };

        // always starts from the top so that skipped stages reload their products
        *state = State::Init;
        while let Some(stage) = state.next_stage() {
            runner.run(stage).map_err(|e| e.in_stage(stage))?;
            *state = stage.completes();
        }

        runner.session.close()?;
        Ok(runner.products.doses)
    }
}

/// Borrowed view of the workflow while the stages run
struct Runner<'a, E: TransportEngine> {
    config: &'a WorkflowConfig,
    config_path: Option<&'a Path>,
    model: &'a mut Model,
    session: EngineSession<'a, E>,
    products: Products,
}

impl<E: TransportEngine> Runner<'_, E> {
    fn run(&mut self, stage: Stage) -> Result<()> {
        let artifact = self.config.artifact(stage.artifact());
        let inputs = self.inputs(stage);
        let settings = self.config.stage_settings(stage)?;

        if settings_match(&artifact, &settings) && self.reload(stage, &artifact, &inputs) {
            info!("Skipping {stage} stage, {} is up to date", artifact.display());
            return Ok(());
        }

        info!("Running {stage} stage");
        match stage {
            Stage::Volumes => self.volumes()?,
            Stage::Activation => self.activation()?,
            Stage::PhotonSources => self.photon_sources()?,
            Stage::Dose => self.dose()?,
        }
        write_settings(&artifact, &settings)
    }

    /// Everything a stage reads from disk
    fn inputs(&self, stage: Stage) -> Vec<PathBuf> {
        let mut inputs = stage
            .upstream()
            .iter()
            .map(|name| self.config.artifact(name))
            .collect_vec();

        inputs.extend(self.config_path.map(Path::to_path_buf));
        match stage {
            Stage::Volumes => inputs.extend(self.config.bounding_boxes.clone()),
            Stage::Activation => inputs.push(self.config.engine.chain.clone()),
            _ => (),
        }
        inputs
    }

    /// Load the products of a stage from a fresh artifact
    fn reload(&mut self, stage: Stage, artifact: &Path, inputs: &[PathBuf]) -> bool {
        match stage {
            Stage::Volumes => {
                let boxes = self.config.artifact(artifacts::BOUNDING_BOXES);
                let Some(volumes) = load_fresh(artifact, inputs, |p| Ok(read_volumes(p)?)) else {
                    return false;
                };
                let Some(boxes) = load_fresh(&boxes, inputs, |p| Ok(read_bounding_boxes(p)?))
                else {
                    return false;
                };
                if let Err(e) = self.model.geometry.set_volumes(&volumes) {
                    debug!("Stored volumes do not match the model: {e}");
                    return false;
                }
                self.products.volumes = volumes;
                self.products.boxes = boxes;
            }
            Stage::Activation => {
                let Some(decay) = load_fresh(artifact, inputs, |p| Ok(read_sources(p)?)) else {
                    return false;
                };
                if !self.covers_cooling_days(&decay) {
                    return false;
                }
                self.products.decay = decay;
            }
            Stage::PhotonSources => {
                let Some(photons) = load_fresh(artifact, inputs, |p| Ok(read_photon_sources(p)?))
                else {
                    return false;
                };
                if !self.covers_cooling_days(&photons) {
                    return false;
                }
                self.products.photons = photons;
            }
            Stage::Dose => {
                let Some(doses) = load_fresh(artifact, inputs, |p| Ok(read_dose_reports(p)?))
                else {
                    return false;
                };
                if !self.covers_cooling_days(&doses) {
                    return false;
                }
                self.products.doses = doses;
            }
        }
        true
    }

    /// Reloaded products must be keyed by exactly the configured cooling days
    fn covers_cooling_days<V>(&self, products: &BTreeMap<u32, V>) -> bool {
        let stored = products.keys().copied().collect_vec();
        let wanted = self.config.cooling_days();
        if stored != wanted {
            debug!("Stored cooling days {stored:?} differ from {wanted:?}");
            return false;
        }
        true
    }

    /// Estimate the volume of every dose and scoring cell
    fn volumes(&mut self) -> Result<()> {
        let supplied = match &self.config.bounding_boxes {
            Some(path) => read_bounding_boxes(path)?,
            None => BTreeMap::new(),
        };

        let results = estimate_volumes(
            &mut self.model.geometry,
            &self.config.volume_cells(),
            &supplied,
            &self.config.volume,
        )?;

        self.products.volumes = results.volumes();
        self.products.boxes = results.bounding_boxes();

        write_bounding_boxes(
            &self.products.boxes,
            self.config.artifact(artifacts::BOUNDING_BOXES),
        )?;
        write_volumes(
            &self.products.volumes,
            self.config.artifact(artifacts::CELL_VOLUMES),
        )?;
        Ok(())
    }

    /// Reduce the chain, activate the dose cells, and bin their decay photons
    fn activation(&mut self) -> Result<()> {
        let config = self.config;
        let chain = Chain::read_xml(&config.engine.chain)?;
        let seeds = self.seeds()?;
        debug!("Chain seeds: {}", seeds.join(", "));

        let reduced = chain.reduce(seeds.as_slice(), config.chain.depth)?;
        reduced.write_xml(config.artifact(artifacts::CHAIN_REDUCED))?;

        let days = &config.activation.cooling_days;
        let schedule = Schedule::named(&config.activation.schedule)?.with_cooling(days)?;
        info!(
            "Schedule {}: {} steps over {:.1} days",
            config.activation.schedule,
            schedule.len(),
            schedule.duration() / SECONDS_PER_DAY
        );

        write_cell_list(
            &config.dose_cells,
            config.artifact(artifacts::ACTIVATION_CELLS),
        )?;

        let activation = run_activation(
            self.model,
            &config.dose_cells,
            &schedule,
            &reduced,
            days,
            self.session.engine()?,
            &config.activation.settings,
        )?;

        activation
            .depletion
            .write_bin(config.artifact(artifacts::DEPLETION_RESULTS))?;
        write_sources(&activation.sources, config.artifact(artifacts::SOURCES))?;

        self.products.decay = activation.sources;
        Ok(())
    }

    /// Configured seeds, or every nuclide filling a dose cell
    fn seeds(&self) -> Result<Vec<String>> {
        if !self.config.chain.seeds.is_empty() {
            return Ok(self.config.chain.seeds.clone());
        }

        let mut seeds = Vec::new();
        for cell in &self.config.dose_cells {
            seeds.extend(self.model.fill(*cell)?.nuclides.keys().cloned());
        }
        Ok(seeds.into_iter().sorted().dedup().collect())
    }

    /// Spatial and energy sources for every cooling time
    fn photon_sources(&mut self) -> Result<()> {
        let fallback = self.config.volume.fallback.as_ref();
        let mut photons = PhotonSources::new();

        for (day, distributions) in &self.products.decay {
            let sources = assemble_sources(
                &self.model.geometry,
                distributions,
                &self.products.boxes,
                fallback,
            )?;

            info!(
                "{day} days: {} sources, {} photons/s",
                sources.len(),
                total_strength(&sources).sci(5, 2)
            );
            for (name, strength) in self.config.groups.strengths(&sources) {
                info!("  {name}: {} photons/s", strength.sci(5, 2));
            }
            photons.insert(*day, sources);
        }

        write_photon_sources(&photons, self.config.artifact(artifacts::PHOTON_SOURCES))?;
        self.products.photons = photons;
        Ok(())
    }

    /// Photon transport and dose rates for every cooling time
    fn dose(&mut self) -> Result<()> {
        let config = self.config;
        let tallies = [
            TallySpec::flux_dose(&config.scoring_cells, &Response::ansi_1977()),
            TallySpec::heating(&config.scoring_cells),
        ];
        let masses = self.masses();
        let mut doses = DoseRates::new();

        for (day, sources) in &self.products.photons {
            if sources.is_empty() {
                warn!("No decay photons at {day} days, dose rates are zero");
                doses.insert(*day, DoseReport::default());
                continue;
            }

            info!("Transporting decay photons at {day} days");
            let results = self
                .session
                .engine()?
                .run_photons(sources, &tallies, config.batches)?;
            debug!("Statepoint {}", results.statepoint.display());

            let report = DoseReport::new(
                &results.flux,
                results.heating.as_ref(),
                total_strength(sources),
                &self.products.volumes,
                &masses,
            )?;
            doses.insert(*day, report);
        }

        write_dose_reports(&doses, config.artifact(artifacts::DOSE_RATES))?;
        self.products.doses = doses;
        Ok(())
    }

    /// Mass (kg) of every filled scoring cell with a volume
    fn masses(&self) -> BTreeMap<u32, f64> {
        self.config
            .scoring_cells
            .iter()
            .filter_map(|cell| {
                let density = self.model.fill(*cell).ok()?.density;
                let volume = self.products.volumes.get(cell)?;
                Some((*cell, density * volume / 1000.0))
            })
            .collect()
    }
}
