//! Volume estimates against analytic shapes

use approx::assert_relative_eq;
use r2s_geometry::{
    BoundingBox, Cell, Complement, Cuboid, CylinderZ, Geometry, Intersection, Sphere,
};
use r2s_volume::{estimate_common, estimate_volumes, Error, VolumeSettings};
use rstest::{fixture, rstest};
use std::collections::BTreeMap;

/// Three disjoint cells nested inside a 10 cm cube
#[fixture]
fn nested() -> Geometry {
    let mut geometry = Geometry::new();
    geometry.insert(Cell::new(1, Sphere::at_origin(2.0), Some(1)));
    geometry.insert(Cell::new(
        2,
        Intersection(vec![
            Box::new(Sphere::at_origin(4.0)),
            Box::new(Complement(Box::new(Sphere::at_origin(2.0)))),
        ]),
        Some(1),
    ));
    geometry.insert(Cell::new(
        3,
        Intersection(vec![
            Box::new(Cuboid(BoundingBox::cube(5.0))),
            Box::new(Complement(Box::new(Sphere::at_origin(4.0)))),
        ]),
        None,
    ));
    geometry
}

#[rstest]
fn disjoint_cells_conserve_box_volume(nested: Geometry) {
    let bbox = BoundingBox::cube(5.0);
    let results = estimate_common(&nested, &[1, 2, 3], &bbox, &VolumeSettings::new(200_000))
        .unwrap();

    let total: f64 = results.estimates.values().map(|e| e.volume).sum();
    let sigma = results
        .estimates
        .values()
        .map(|e| e.std_dev.powi(2))
        .sum::<f64>()
        .sqrt();

    // space is fully partitioned, so the sum is the box within 3 sigma
    assert!(total <= bbox.volume() + 3.0 * sigma);
    assert_relative_eq!(total, bbox.volume(), max_relative = 1e-12);
}

#[rstest]
#[case(1, 4.0 / 3.0 * std::f64::consts::PI * 8.0)]
#[case(2, 4.0 / 3.0 * std::f64::consts::PI * (64.0 - 8.0))]
#[case(3, 1000.0 - 4.0 / 3.0 * std::f64::consts::PI * 64.0)]
fn estimates_within_three_sigma(mut nested: Geometry, #[case] id: u32, #[case] exact: f64) {
    let boxes = BTreeMap::from([(3, BoundingBox::cube(5.0))]);
    let results =
        estimate_volumes(&mut nested, &[id], &boxes, &VolumeSettings::new(200_000)).unwrap();

    let estimate = results.estimates[&id];
    assert!((estimate.volume - exact).abs() < 4.0 * estimate.std_dev);
    assert_eq!(nested.cell(id).unwrap().volume, Some(estimate.volume));
}

#[rstest]
fn flat_box_is_inflated() {
    // the foil bounding box has been collapsed onto the z = 0 plane
    let mut geometry = Geometry::new();
    geometry.insert(Cell::new(
        9,
        CylinderZ {
            x0: 0.0,
            y0: 0.0,
            radius: 0.9,
            z_min: -0.1,
            z_max: 0.1,
        },
        Some(2),
    ));
    let boxes = BTreeMap::from([(
        9,
        BoundingBox::new([-0.9, -0.9, 0.0], [0.9, 0.9, 0.0]).unwrap(),
    )]);

    let results =
        estimate_volumes(&mut geometry, &[9], &boxes, &VolumeSettings::new(100_000)).unwrap();
    let estimate = results.estimates[&9];

    assert_eq!(estimate.bbox.lower[2], -1.0);
    assert_eq!(estimate.bbox.upper[2], 1.0);
    let exact = std::f64::consts::PI * 0.81 * 0.2;
    assert!((estimate.volume - exact).abs() < 4.0 * estimate.std_dev);
}

#[rstest]
fn infinite_box_needs_fallback(mut nested: Geometry) {
    // cell 3 region has no box of its own, supply an unbounded one
    let boxes = BTreeMap::from([(
        3,
        BoundingBox::new([-5.0, -5.0, f64::NEG_INFINITY], [5.0, 5.0, f64::INFINITY]).unwrap(),
    )]);

    let err = estimate_volumes(&mut nested, &[3], &boxes, &VolumeSettings::new(1_000))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Geometry(r2s_geometry::Error::InvalidBoundingBox(_))
    ));

    let settings = VolumeSettings {
        fallback: Some(BoundingBox::cube(5.0)),
        ..VolumeSettings::new(1_000)
    };
    let results = estimate_volumes(&mut nested, &[3], &boxes, &settings).unwrap();
    assert_eq!(results.estimates[&3].bbox, BoundingBox::cube(5.0));
}

#[rstest]
fn unbounded_region_without_box(mut nested: Geometry) {
    nested.insert(Cell::new(
        4,
        Complement(Box::new(Cuboid(BoundingBox::cube(5.0)))),
        None,
    ));
    let err = estimate_volumes(&mut nested, &[4], &BTreeMap::new(), &VolumeSettings::new(10))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Geometry(r2s_geometry::Error::MissingBoundingBox(4))
    ));
}

#[rstest]
fn seeded_estimates_repeat(nested: Geometry) {
    let settings = VolumeSettings::new(10_000);
    let bbox = BoundingBox::cube(5.0);
    let a = estimate_common(&nested, &[1, 2], &bbox, &settings).unwrap();
    let b = estimate_common(&nested, &[1, 2], &bbox, &settings).unwrap();
    assert_eq!(a, b);
}

#[rstest]
fn persisted_volumes_restore_the_geometry(
    mut nested: Geometry,
    #[from(nested)] mut fresh: Geometry,
) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cell_volumes.json");

    let results =
        estimate_volumes(&mut nested, &[1, 2], &BTreeMap::new(), &VolumeSettings::new(5_000))
            .unwrap();
    results.write_json(&path).unwrap();

    let volumes = r2s_geometry::read_volumes(&path).unwrap();
    assert_eq!(volumes, results.volumes());

    fresh.set_volumes(&volumes).unwrap();
    assert_eq!(fresh.cell(2).unwrap().volume, Some(results.estimates[&2].volume));
}

#[rstest]
fn missed_cell_has_no_volume() {
    // far too small for a thousand points in a 10 cm cube
    let mut geometry = Geometry::new();
    geometry.insert(Cell::new(5, Sphere::at_origin(1.0e-4), Some(1)).with_volume(1.0));
    let boxes = BTreeMap::from([(5, BoundingBox::cube(5.0))]);

    let results =
        estimate_volumes(&mut geometry, &[5], &boxes, &VolumeSettings::new(1_000)).unwrap();
    assert_eq!(results.estimates[&5].hits, 0);
    assert!(results.volumes().is_empty());

    let cell = geometry.cell(5).unwrap();
    assert_eq!(cell.volume, None);
    assert_eq!(cell.valid_volume(), None);
}
