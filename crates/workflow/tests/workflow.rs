use r2s_activation::{FluxMicroProvider, FluxMicros, Material, MicroXs, Model};
use r2s_chain::{Chain, ChainNuclide, DecayMode, DecaySource, Reaction, Spectrum};
use r2s_geometry::{BoundingBox, Cell, Cuboid, Geometry, Sphere};
use r2s_source::{read_photon_sources, total_strength, PhotonSource};
use r2s_tally::{CellTally, Measured, Score, TallySpec};
use r2s_workflow::*;

use approx::assert_relative_eq;
use rstest::{fixture, rstest};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Counts every call and answers with fixed tallies
#[derive(Debug, Default)]
struct MockEngine {
    inits: usize,
    finalizes: usize,
    neutron_runs: usize,
    photon_runs: usize,
    fail_photons: bool,
}

impl FluxMicroProvider for MockEngine {
    fn flux_micros(
        &mut self,
        cells: &[u32],
        _materials: &[Material],
    ) -> r2s_activation::Result<FluxMicros> {
        assert_eq!(self.inits, self.finalizes + 1, "engine used before init");
        self.neutron_runs += 1;

        let mut micros = MicroXs::new();
        micros.insert("Co59", "(n,gamma)", 37.2);
        Ok(FluxMicros {
            fluxes: vec![5.0e3; cells.len()],
            micros: vec![micros; cells.len()],
        })
    }
}

impl TransportEngine for MockEngine {
    fn init(&mut self, context: &EngineContext) -> Result<()> {
        assert!(context.chain.exists());
        self.inits += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.finalizes += 1;
        Ok(())
    }

    fn run_photons(
        &mut self,
        sources: &[PhotonSource],
        tallies: &[TallySpec],
        batches: u32,
    ) -> Result<PhotonTallies> {
        assert_eq!(self.inits, self.finalizes + 1, "engine used before init");
        assert!(!sources.is_empty());
        self.photon_runs += 1;

        if self.fail_photons {
            return Err(Error::Engine("lost particles".into()));
        }

        let results = tallies[0]
            .cells()
            .into_iter()
            .map(|cell| (cell, Measured::new(2.0e-6, 1.0e-8)))
            .collect();
        Ok(PhotonTallies {
            statepoint: PathBuf::from(statepoint_filename(batches)),
            flux: CellTally::new(Score::Flux, results),
            heating: None,
        })
    }
}

/// Cobalt sphere next to a small air box
fn model() -> Model {
    let mut geometry = Geometry::new();
    geometry.insert(Cell::new(1, Sphere::at_origin(5.0), Some(1)));
    geometry.insert(Cell::new(
        2,
        Cuboid(BoundingBox::new([20.0, -1.0, -1.0], [22.0, 1.0, 1.0]).unwrap()),
        Some(2),
    ));

    let cobalt = Material::new(1, 8.9, BTreeMap::from([("Co59".into(), 0.09)]));
    let air = Material::new(2, 1.2e-3, BTreeMap::from([("N14".into(), 4.0e-5)]));
    Model::new(geometry, vec![cobalt, air])
}

fn write_chain(path: &Path) {
    let mut co59 = ChainNuclide::new("Co59");
    co59.reactions.push(Reaction {
        kind: "(n,gamma)".into(),
        q_value: 7.49e6,
        target: Some("Co60".into()),
        branching_ratio: 1.0,
    });

    let mut co60 = ChainNuclide::new("Co60");
    co60.half_life = Some(1.6634e8);
    co60.decay_modes.push(DecayMode {
        kind: "beta-".into(),
        target: Some("Ni60".into()),
        branching_ratio: 1.0,
    });
    co60.sources.push(DecaySource {
        particle: "photon".into(),
        spectrum: Spectrum::Discrete {
            energies: vec![1.173228e6, 1.332492e6],
            intensities: vec![0.9985, 0.9998],
        },
    });

    let mut chain = Chain::new();
    for nuclide in [co59, co60, ChainNuclide::new("Ni60")] {
        chain.push(nuclide).unwrap();
    }
    chain.write_xml(path).unwrap();
}

struct Setup {
    // keeps the directory alive for the whole test
    _dir: tempfile::TempDir,
    config: WorkflowConfig,
    text: String,
}

#[fixture]
fn setup() -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let chain = dir.path().join("chain.xml");
    write_chain(&chain);

    let text = format!(
        r#"
        output = "{}"
        dose_cells = [1]
        scoring_cells = [2]
        batches = 10

        [engine]
        cross_sections = "cross_sections.xml"
        chain = "{}"

        [volume]
        samples = 20000

        [activation]
        cooling_days = [1, 7]

        [groups]
        sphere = [1]
        "#,
        dir.path().join("results").display(),
        chain.display(),
    );
    let config: WorkflowConfig = toml::from_str(&text).unwrap();

    Setup {
        _dir: dir,
        config,
        text,
    }
}

fn touch(path: &Path, offset: Duration) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() + offset)
        .unwrap();
}

#[rstest]
fn full_run(setup: Setup) {
    let mut workflow = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    let doses = workflow.run().unwrap();
    assert_eq!(workflow.state(), State::DoseReady);

    for name in [
        artifacts::CELL_VOLUMES,
        artifacts::BOUNDING_BOXES,
        artifacts::ACTIVATION_CELLS,
        artifacts::CHAIN_REDUCED,
        artifacts::DEPLETION_RESULTS,
        artifacts::SOURCES,
        artifacts::PHOTON_SOURCES,
        artifacts::DOSE_RATES,
    ] {
        assert!(setup.config.artifact(name).exists(), "{name} missing");
    }

    // report strengths are the photon source totals
    let photons = read_photon_sources(setup.config.artifact(artifacts::PHOTON_SOURCES)).unwrap();
    assert_eq!(doses.keys().copied().collect::<Vec<_>>(), vec![1, 7]);
    for (day, report) in &doses {
        assert_relative_eq!(report.strength, total_strength(&photons[day]), max_relative = 1e-12);
    }

    // constant tally per photon, so dose follows the decaying source
    let day1 = doses[&1].cells[&2].flux.mean;
    let day7 = doses[&7].cells[&2].flux.mean;
    let expected = (-(6.0 * 86_400.0) * std::f64::consts::LN_2 / 1.6634e8).exp();
    assert_relative_eq!(day7 / day1, expected, max_relative = 1e-6);

    let engine = workflow.engine();
    assert_eq!((engine.inits, engine.finalizes), (1, 1));
    assert_eq!((engine.neutron_runs, engine.photon_runs), (1, 2));
}

#[rstest]
fn second_run_reuses_artifacts(setup: Setup) {
    let mut first = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    let expected = first.run().unwrap();

    let mut second = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    let doses = second.run().unwrap();
    assert_eq!(doses, expected);
    assert_eq!(second.state(), State::DoseReady);

    // volumes come back from disk too
    assert!(second.model().geometry.cell(1).unwrap().valid_volume().is_some());

    let engine = second.into_engine();
    assert_eq!(engine.inits, 0);
    assert_eq!((engine.neutron_runs, engine.photon_runs), (0, 0));
}

#[rstest]
fn newer_chain_reruns_activation_onwards(setup: Setup) {
    let mut first = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    first.run().unwrap();

    touch(&setup.config.engine.chain, Duration::from_secs(3600));

    let mut second = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    second.run().unwrap();

    let engine = second.into_engine();
    assert_eq!((engine.inits, engine.finalizes), (1, 1));
    assert_eq!((engine.neutron_runs, engine.photon_runs), (1, 2));
}

#[rstest]
fn new_cooling_days_rerun_activation_onwards(setup: Setup) {
    let mut first = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    first.run().unwrap();

    // same output directory, no configuration file to compare against
    let mut config = setup.config.clone();
    config.activation.cooling_days = vec![1, 7, 15];

    let mut second = Workflow::new(config, model(), MockEngine::default()).unwrap();
    let doses = second.run().unwrap();
    assert_eq!(doses.keys().copied().collect::<Vec<_>>(), vec![1, 7, 15]);

    let stored = read_photon_sources(setup.config.artifact(artifacts::PHOTON_SOURCES)).unwrap();
    assert_eq!(stored.keys().copied().collect::<Vec<_>>(), vec![1, 7, 15]);

    let engine = second.into_engine();
    assert_eq!((engine.neutron_runs, engine.photon_runs), (1, 3));
}

#[rstest]
fn new_scoring_cells_rerun_dose_only(setup: Setup) {
    let mut first = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    first.run().unwrap();

    let mut config = setup.config.clone();
    config.scoring_cells = vec![1, 2];

    let mut second = Workflow::new(config, model(), MockEngine::default()).unwrap();
    let doses = second.run().unwrap();
    for report in doses.values() {
        assert_eq!(report.cells.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    let engine = second.into_engine();
    assert_eq!((engine.neutron_runs, engine.photon_runs), (0, 2));
}

#[rstest]
fn settings_recorded_beside_artifacts(setup: Setup) {
    let mut workflow = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    workflow.run().unwrap();

    for stage in Stage::ALL {
        let artifact = setup.config.artifact(stage.artifact());
        assert!(settings_path(&artifact).exists(), "{stage} settings missing");
        let settings = setup.config.stage_settings(stage).unwrap();
        assert!(settings_match(&artifact, &settings));
    }

    // the progress bar is not a setting that changes results
    let mut quiet = setup.config.clone();
    quiet.volume.progress = !quiet.volume.progress;
    assert_eq!(
        quiet.stage_settings(Stage::Volumes).unwrap(),
        setup.config.stage_settings(Stage::Volumes).unwrap()
    );
}

#[rstest]
fn unreadable_artifact_is_recomputed(setup: Setup) {
    let mut first = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    let expected = first.run().unwrap();

    std::fs::write(setup.config.artifact(artifacts::DOSE_RATES), "{ not json").unwrap();

    let mut second = Workflow::new(setup.config.clone(), model(), MockEngine::default()).unwrap();
    assert_eq!(second.run().unwrap(), expected);

    let engine = second.into_engine();
    assert_eq!((engine.neutron_runs, engine.photon_runs), (0, 2));
}

#[rstest]
fn failures_name_the_stage(setup: Setup) {
    let mut config = setup.config.clone();
    config.activation.schedule = "campaign9".into();

    let mut workflow = Workflow::new(config, model(), MockEngine::default()).unwrap();
    let error = workflow.run().unwrap_err();

    assert_eq!(error.to_string(), "activation stage failed");
    assert!(matches!(
        error,
        Error::Stage {
            stage: Stage::Activation,
            ..
        }
    ));
    assert_eq!(workflow.state(), State::VolumesReady);
    assert_eq!(workflow.engine().inits, 0);
}

#[rstest]
fn engine_finalised_after_failure(setup: Setup) {
    let engine = MockEngine {
        fail_photons: true,
        ..Default::default()
    };
    let mut workflow = Workflow::new(setup.config.clone(), model(), engine).unwrap();

    let error = workflow.run().unwrap_err();
    assert!(matches!(
        error,
        Error::Stage {
            stage: Stage::Dose,
            ..
        }
    ));
    assert_eq!(workflow.state(), State::PhotonSourcesReady);

    let engine = workflow.engine();
    assert_eq!((engine.inits, engine.finalizes), (1, 1));
}

#[rstest]
fn groups_must_be_dose_cells(setup: Setup) {
    let mut config = setup.config.clone();
    config.groups.insert("air", vec![2]);
    assert!(matches!(
        Workflow::new(config, model(), MockEngine::default()),
        Err(Error::InvalidConfig(_))
    ));
}

#[rstest]
fn config_file_is_an_input(setup: Setup) {
    let path = setup.config.output.with_file_name("r2s.toml");
    std::fs::write(&path, &setup.text).unwrap();

    let mut first = Workflow::from_file(&path, model(), MockEngine::default()).unwrap();
    first.run().unwrap();

    touch(&path, Duration::from_secs(3600));
    let mut second = Workflow::from_file(&path, model(), MockEngine::default()).unwrap();
    second.run().unwrap();

    // every stage is stale against the edited configuration
    let engine = second.into_engine();
    assert_eq!((engine.neutron_runs, engine.photon_runs), (1, 2));
}
