use r2s_tally::*;

use approx::assert_relative_eq;
use rstest::{fixture, rstest};
use std::f64::consts::PI;
use std::io::Write;

const DENSITY: f64 = 18.05;

fn detector_volume() -> f64 {
    0.1 * PI * 2.86 * 2.86
}

/// Neutron, photon, electron, and positron heating for four detectors
#[fixture]
fn table() -> &'static str {
    "particle,cell,mean,std_dev,nuclide
neutron,1,1.52e5,2.1e3,total
photon,1,3.50e4,7.0e2,total
electron,1,5.5e3,3.0e2,total
positron,1,5.0e2,1.0e2,total
neutron,2,9.81e4,1.6e3,total
photon,2,2.61e4,5.2e2,total
electron,2,4.1e3,2.2e2,total
positron,2,3.6e2,8.0e1,total
neutron,3,4.47e4,9.0e2,total
photon,3,1.42e4,3.1e2,total
electron,3,2.2e3,1.4e2,total
positron,3,2.0e2,5.0e1,total
neutron,4,1.63e4,4.4e2,total
photon,4,6.8e3,1.9e2,total
electron,4,1.1e3,9.0e1,total
positron,4,9.0e1,3.0e1,total
photon,4,6.8e3,1.9e2,total
"
}

fn rows(table: &str) -> Vec<HeatingRow> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heating.csv");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(table.as_bytes())
        .unwrap();
    read_heating_csv(&path).unwrap()
}

#[rstest]
fn golden_absorbed_dose(table: &str) {
    let rows = rows(table);
    assert_eq!(rows.len(), 17);

    let results = heating_dose(&rows, &Calibration::default(), DENSITY, detector_volume()).unwrap();

    // one entry per cell, the repeated photon row of cell 4 counts once
    assert_eq!(results.iter().map(|r| r.cell).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

    let golden = [
        (6.666666747501966e-13, 7.723896388990583e-15),
        (4.444214216236285e-13, 5.86731491952608e-15),
        (2.117443894413837e-13, 3.32791495420605e-15),
        (8.390328253721386e-14, 1.6876315921806276e-15),
    ];
    for (result, (mean, std_dev)) in results.iter().zip(golden) {
        assert_relative_eq!(result.dose.mean, mean, max_relative = 1e-12);
        assert_relative_eq!(result.dose.std_dev, std_dev, max_relative = 1e-12);
    }

    assert_relative_eq!(results[0].photon.mean, 4.1e4, max_relative = 1e-12);
    assert_relative_eq!(results[0].neutron.mean, 1.52e5);

    // photon, electron, and positron uncertainties add in quadrature
    let quadrature = (7.0e2_f64.powi(2) + 3.0e2_f64.powi(2) + 1.0e2_f64.powi(2)).sqrt();
    assert_relative_eq!(results[0].photon.std_dev, quadrature, max_relative = 1e-12);
}

#[rstest]
fn calibration_weights(table: &str) {
    let rows = rows(table);
    let calibration = Calibration {
        neutron: 0.9,
        photon: 1.1,
        energy: 0.5,
    };
    let plain = heating_dose(&rows, &Calibration::default(), DENSITY, 1.0).unwrap();
    let weighted = heating_dose(&rows, &calibration, DENSITY, 1.0).unwrap();

    for (p, w) in plain.iter().zip(&weighted) {
        assert_relative_eq!(
            w.total.mean,
            p.neutron.mean * 0.45 + p.photon.mean * 1.1,
            max_relative = 1e-12
        );
    }
}

#[test]
fn unknown_particles_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heating.csv");
    std::fs::write(&path, "particle,cell,mean,std_dev\nmuon,1,1.0,0.1\n").unwrap();
    assert!(read_heating_csv(&path).is_err());
}

#[test]
fn detector_needs_mass() {
    assert!(heating_dose(&[], &Calibration::default(), 0.0, 1.0).is_err());
}

#[test]
fn nickel_foils() {
    let thicknesses = [0.2, 0.2, 0.1, 0.2, 0.2, 0.2];
    let tallies = [3.12e-5, 2.71e-5, 1.19e-5, 1.83e-5, 1.32e-5, 0.94e-5];
    let experiment = [
        Measured::new(6.21e-5, 3.1e-6),
        Measured::new(5.27e-5, 2.6e-6),
        Measured::new(4.58e-5, 2.3e-6),
        Measured::new(3.66e-5, 1.8e-6),
        Measured::new(2.55e-5, 1.3e-6),
        Measured::new(1.88e-5, 0.9e-6),
    ];

    for (i, ((t, tally), exp)) in thicknesses.iter().zip(tallies).zip(experiment).enumerate() {
        let foil = Foil::new(&format!("Ni{}", i + 1), 0.9, *t);
        assert_relative_eq!(foil.volume(), PI * 0.81 * t, max_relative = 1e-14);

        let comparison = foil.compare(Measured::from_relative(tally, 0.01), exp);
        assert!(comparison.agrees, "{}: {:?}", foil.name, comparison);
        assert_relative_eq!(comparison.ratio.mean, 1.0, max_relative = 0.05);
    }

    // the thin foil normalises to the larger rate density
    let thin = Foil::new("thin", 0.9, 0.1).rate_density(Measured::exact(1.0));
    let thick = Foil::new("thick", 0.9, 0.2).rate_density(Measured::exact(1.0));
    assert_relative_eq!(thin.mean, 2.0 * thick.mean, max_relative = 1e-14);
}
