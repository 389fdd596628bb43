//! Irradiation and cooling timelines

// crate modules
use crate::error::{Error, Result};

// r2s modules
use r2s_utils::{f, SliceExt};

// external crates
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

/// Seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Cooling times after shutdown (days) used by the shutdown dose benchmarks
pub const DEFAULT_COOLING_DAYS: [u32; 5] = [1, 7, 15, 30, 60];

/// Cooling steps that land exactly on [DEFAULT_COOLING_DAYS]
const COOLING_TAIL: [f64; 5] = [86_400.0, 518_400.0, 691_200.0, 1_296_000.0, 2_592_000.0];

/// Names recognised by [Schedule::named()]
pub const SCHEDULE_NAMES: [&str; 3] = ["campaign1", "campaign2", "eff726"];

/// An ordered list of steps with a constant neutron source rate in each
///
/// Steps with a zero source rate are cooling intervals. States live on step
/// boundaries, so a schedule of `n` steps has `n + 1` positions on its
/// timeline, with position `0` at the very start.
///
/// ```rust
/// # use r2s_activation::Schedule;
/// // 1 hour at 1e10 n/s, then a day of cooling
/// let schedule = Schedule::from_pulses(vec![3600.0, 86400.0], vec![1e10, 0.0]).unwrap();
///
/// assert_eq!(schedule.duration(), 90000.0);
/// assert_eq!(schedule.checkpoint(1).unwrap(), 2);
/// assert!(schedule.checkpoint(2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Step durations (s)
    pub timesteps: Vec<f64>,
    /// Source rate during each step (n/s)
    pub source_rates: Vec<f64>,
}

impl Schedule {
    /// Pulse-list profile of durations and source rates
    pub fn from_pulses(timesteps: Vec<f64>, source_rates: Vec<f64>) -> Result<Self> {
        let schedule = Self {
            timesteps,
            source_rates,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Integrated-yield profile, rates are `yield / duration`
    ///
    /// ```rust
    /// # use r2s_activation::Schedule;
    /// let schedule = Schedule::from_yields(vec![100.0, 50.0], vec![1e12, 0.0]).unwrap();
    /// assert_eq!(schedule.source_rates, vec![1e10, 0.0]);
    /// ```
    pub fn from_yields(timesteps: Vec<f64>, yields: Vec<f64>) -> Result<Self> {
        if timesteps.len() != yields.len() {
            return Err(Error::InvalidSchedule(f!(
                "{} durations but {} yields",
                timesteps.len(),
                yields.len()
            )));
        }
        let source_rates = timesteps
            .iter()
            .zip(&yields)
            .map(|(dt, y)| if *dt > 0.0 { y / dt } else { f64::NAN })
            .collect();
        Self::from_pulses(timesteps, source_rates)
    }

    /// One of the predefined benchmark schedules
    ///
    /// Every one ends with cooling steps at 1, 7, 15, 30, and 60 days after
    /// shutdown. Names are matched exactly, anything else fails with
    /// [Error::UnknownSchedule].
    pub fn named(name: &str) -> Result<Self> {
        let (timesteps, source_rates) = match name {
            "campaign1" => (
                vec![19440.0, 61680.0, 32940.0, 54840.0, 15720.0, 6360.0, 8940.0],
                vec![2.32e10, 0.0, 2.87e10, 0.0, 1.90e10, 0.0, 1.36e10],
            ),
            "campaign2" => {
                let durations = vec![25200.0, 57600.0, 28800.0, 55800.0, 18000.0];
                let yields = [5.04e14, 0.0, 6.48e14, 0.0, 3.06e14];
                let rates: Vec<f64> = durations.iter().zip(yields).map(|(dt, y)| y / dt).collect();
                (durations, rates)
            }
            "eff726" => (
                vec![14400.0, 72000.0, 14400.0],
                vec![8.0e10, 0.0, 8.0e10],
            ),
            _ => return Err(Error::UnknownSchedule(name.to_string())),
        };

        let mut schedule = Self::from_pulses(timesteps, source_rates)?;
        for dt in COOLING_TAIL {
            schedule.timesteps.push(dt);
            schedule.source_rates.push(0.0);
        }
        Ok(schedule)
    }

    /// Check the schedule is usable
    ///
    /// There must be at least one step, the same number of durations and
    /// rates, every duration positive, and every rate non-negative. NaN and
    /// infinite values are never allowed.
    pub fn validate(&self) -> Result<()> {
        if self.timesteps.is_empty() {
            return Err(Error::InvalidSchedule("no steps".into()));
        }
        if self.timesteps.len() != self.source_rates.len() {
            return Err(Error::InvalidSchedule(f!(
                "{} timesteps but {} source rates",
                self.timesteps.len(),
                self.source_rates.len()
            )));
        }
        if let Some((i, dt)) = self
            .timesteps
            .iter()
            .find_position(|dt| !dt.is_finite() || **dt <= 0.0)
        {
            return Err(Error::InvalidSchedule(f!("step {i} has duration {dt}")));
        }
        if let Some((i, s)) = self
            .source_rates
            .iter()
            .find_position(|s| !s.is_finite() || **s < 0.0)
        {
            return Err(Error::InvalidSchedule(f!("step {i} has source rate {s}")));
        }
        Ok(())
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.timesteps.len()
    }

    /// True if there are no steps
    pub fn is_empty(&self) -> bool {
        self.timesteps.is_empty()
    }

    /// Iterate over `(duration, source_rate)` pairs
    pub fn steps(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.timesteps
            .iter()
            .copied()
            .zip(self.source_rates.iter().copied())
    }

    /// Total campaign duration (s)
    pub fn duration(&self) -> f64 {
        self.timesteps.iter().sum()
    }

    /// Time at every position on the timeline, `len() + 1` values from zero
    pub fn times(&self) -> Vec<f64> {
        let mut times = vec![0.0];
        times.extend(self.timesteps.cumulative_sum());
        times
    }

    /// Index of the last step with a non-zero source
    pub fn last_irradiation(&self) -> Option<usize> {
        self.source_rates.iter().rposition(|s| *s > 0.0)
    }

    /// Time at the end of the last irradiation step, zero if never irradiated
    pub fn shutdown_time(&self) -> f64 {
        self.last_irradiation()
            .map(|i| self.timesteps[..=i].iter().sum())
            .unwrap_or(0.0)
    }

    /// Timeline position reached `days` after shutdown
    ///
    /// Resolved by the cumulative cooling time so that editing earlier steps
    /// can never silently move a checkpoint. The position must be strictly
    /// after the last irradiation step and fall exactly on a step boundary.
    pub fn checkpoint(&self, days: u32) -> Result<usize> {
        let first = self.last_irradiation().map(|i| i + 2).unwrap_or(1);
        let target = self.shutdown_time() + days as f64 * SECONDS_PER_DAY;
        let tolerance = 1e-9 * target.max(1.0);

        self.times()
            .iter()
            .enumerate()
            .skip(first)
            .find(|(_, t)| (*t - target).abs() <= tolerance)
            .map(|(k, _)| k)
            .ok_or(Error::UnknownCoolingCheckpoint(days))
    }

    /// Resolve several cooling times, in ascending order with no duplicates
    pub fn checkpoints(&self, days: &[u32]) -> Result<Vec<(u32, usize)>> {
        days.iter()
            .copied()
            .sorted()
            .dedup()
            .map(|d| Ok((d, self.checkpoint(d)?)))
            .collect()
    }

    /// Copy of the schedule with cooling steps appended for each cooling time
    ///
    /// Cooling times already on a step boundary are left alone. A cooling time
    /// that lands inside an existing step can not be reached and is an error.
    ///
    /// ```rust
    /// # use r2s_activation::Schedule;
    /// let schedule = Schedule::from_pulses(vec![3600.0], vec![1e10]).unwrap();
    /// let extended = schedule.with_cooling(&[7, 1]).unwrap();
    ///
    /// assert_eq!(extended.timesteps, vec![3600.0, 86400.0, 518400.0]);
    /// assert_eq!(extended.checkpoints(&[1, 7]).unwrap(), vec![(1, 2), (7, 3)]);
    /// ```
    pub fn with_cooling(&self, days: &[u32]) -> Result<Schedule> {
        self.validate()?;
        let mut schedule = self.clone();
        let mut cooled = self.duration() - self.shutdown_time();

        for day in days.iter().copied().sorted().dedup() {
            let target = day as f64 * SECONDS_PER_DAY;
            if target > cooled * (1.0 + 1e-9) {
                debug!("Appending {} s of cooling to reach {day} days", target - cooled);
                schedule.timesteps.push(target - cooled);
                schedule.source_rates.push(0.0);
                cooled = target;
            } else {
                schedule.checkpoint(day)?;
            }
        }

        Ok(schedule)
    }
}
