use r2s_activation::{Error, Schedule, DEFAULT_COOLING_DAYS, SCHEDULE_NAMES, SECONDS_PER_DAY};

use approx::assert_relative_eq;
use rstest::rstest;

#[test]
fn campaign1_expansion() {
    let schedule = Schedule::named("campaign1").unwrap();

    assert_eq!(
        schedule.timesteps,
        vec![
            19440.0, 61680.0, 32940.0, 54840.0, 15720.0, 6360.0, 8940.0, 86400.0, 518400.0,
            691200.0, 1296000.0, 2592000.0
        ]
    );
    assert_eq!(
        schedule.source_rates,
        vec![2.32e10, 0.0, 2.87e10, 0.0, 1.90e10, 0.0, 1.36e10, 0.0, 0.0, 0.0, 0.0, 0.0]
    );
    assert_eq!(schedule.last_irradiation(), Some(6));

    let checkpoints = schedule.checkpoints(&DEFAULT_COOLING_DAYS).unwrap();
    assert_eq!(
        checkpoints,
        vec![(1, 8), (7, 9), (15, 10), (30, 11), (60, 12)]
    );
}

#[rstest]
fn named_schedules_are_well_formed(#[values("campaign1", "campaign2", "eff726")] name: &str) {
    assert!(SCHEDULE_NAMES.contains(&name));
    let schedule = Schedule::named(name).unwrap();
    schedule.validate().unwrap();

    assert_eq!(schedule.times().len(), schedule.len() + 1);
    assert_relative_eq!(
        schedule.duration(),
        schedule.timesteps.iter().sum::<f64>(),
        max_relative = 1e-15
    );

    // every checkpoint is strictly after the last irradiation step and lands
    // exactly the right time after shutdown
    let last = schedule.last_irradiation().unwrap();
    let times = schedule.times();
    for (day, position) in schedule.checkpoints(&DEFAULT_COOLING_DAYS).unwrap() {
        assert!(position > last + 1);
        assert_relative_eq!(
            times[position] - schedule.shutdown_time(),
            day as f64 * SECONDS_PER_DAY,
            max_relative = 1e-12
        );
    }
}

#[rstest]
#[case("campaign3")]
#[case("")]
#[case("campaign 1")]
#[case(" campaign1 ")]
#[case("Campaign1")]
#[case("EFF726")]
fn unknown_names(#[case] name: &str) {
    assert!(matches!(Schedule::named(name), Err(Error::UnknownSchedule(_))));
}

#[test]
fn yields_become_rates() {
    let schedule = Schedule::from_yields(vec![100.0, 50.0, 10.0], vec![1.0e12, 0.0, 5.0e11]).unwrap();
    assert_eq!(schedule.source_rates, vec![1.0e10, 0.0, 5.0e10]);
}

#[rstest]
#[case(vec![10.0, -1.0], vec![1.0, 1.0])]
#[case(vec![10.0], vec![-1.0])]
#[case(vec![f64::NAN], vec![1.0])]
#[case(vec![10.0], vec![f64::INFINITY])]
fn ill_formed(#[case] timesteps: Vec<f64>, #[case] rates: Vec<f64>) {
    assert!(matches!(
        Schedule::from_pulses(timesteps, rates),
        Err(Error::InvalidSchedule(_))
    ));
}

#[test]
fn checkpoints_must_be_on_boundaries() {
    let schedule = Schedule::named("eff726").unwrap();
    assert!(matches!(
        schedule.checkpoint(2),
        Err(Error::UnknownCoolingCheckpoint(2))
    ));

    // a cooling time inside an existing step can never be reached
    assert!(schedule.with_cooling(&[3]).is_err());

    let extended = schedule.with_cooling(&[90, 120]).unwrap();
    assert_eq!(extended.len(), schedule.len() + 2);
    assert_eq!(extended.checkpoint(120).unwrap(), extended.len());
}
