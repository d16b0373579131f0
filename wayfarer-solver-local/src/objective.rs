//! Objectives minimised by the local search.
//!
//! Every ordering is timed by the [`Scheduler`] and reduced to three
//! [`Measures`]. The request's [`OptimizationPreference`] picks one of them,
//! or blends all three after dividing each by its value on the seed tour so
//! that minutes and money are comparable.

use wayfarer_core::{Location, OptimizationPreference, Scheduler, Timeline};

/// Differences at or below this are treated as ties.
pub(crate) const EPSILON: f64 = 1e-9;

/// Highest comfort rank in the mode catalog.
const MAX_COMFORT_RANK: f64 = 5.0;

/// Weights of the blended objective used by
/// [`OptimizationPreference::Balanced`].
///
/// # Examples
/// ```
/// use wayfarer_solver_local::ObjectiveWeights;
///
/// let weights = ObjectiveWeights::default();
/// assert_eq!(weights.time, weights.cost);
/// assert_eq!(weights.cost, weights.experience);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveWeights {
    /// Weight of elapsed time.
    pub time: f64,
    /// Weight of money spent.
    pub cost: f64,
    /// Weight of the experience score.
    pub experience: f64,
}

impl Default for ObjectiveWeights {
    #[expect(clippy::float_arithmetic, reason = "equal thirds")]
    fn default() -> Self {
        let third = 1.0 / 3.0;
        Self {
            time: third,
            cost: third,
            experience: third,
        }
    }
}

/// Raw measures of one timed ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Measures {
    /// Minutes from the trip start to the last departure.
    pub time_minutes: f64,
    /// Stop costs plus transport costs.
    pub cost: f64,
    /// Negated reward for early priority stops and comfortable legs.
    pub experience: f64,
}

impl Measures {
    #[expect(
        clippy::float_arithmetic,
        reason = "objectives are real-valued sums over the timeline"
    )]
    #[expect(
        clippy::cast_precision_loss,
        reason = "stop counts and trip seconds are far below 2^52"
    )]
    pub(crate) fn of(timeline: &Timeline, scheduler: &Scheduler<'_>) -> Self {
        let elapsed = timeline.finish - scheduler.start_time();
        let time_minutes = elapsed.num_seconds() as f64 / 60.0;

        let count = timeline.entries.len() as f64;
        let mut cost = 0.0;
        let mut earliness = 0.0;
        let mut comfort = 0.0;
        for (position, entry) in timeline.entries.iter().enumerate() {
            let location = scheduler.locations().get(entry.index);
            cost += entry.leg.estimate.cost + location.map_or(0.0, Location::cost);
            comfort += f64::from(entry.leg.mode.comfort_rank);
            if location.is_some_and(Location::is_priority) {
                earliness += (count - position as f64) / count;
            }
        }
        let experience = if timeline.entries.is_empty() {
            0.0
        } else {
            -(earliness + comfort / count / MAX_COMFORT_RANK)
        };
        Self {
            time_minutes,
            cost,
            experience,
        }
    }
}

/// Scalar objective for one preference.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Objective {
    preference: OptimizationPreference,
    weights: ObjectiveWeights,
    scales: Measures,
}

impl Objective {
    /// Objective normalised against `baseline`, usually the seed tour.
    pub(crate) const fn new(
        preference: OptimizationPreference,
        weights: ObjectiveWeights,
        baseline: &Measures,
    ) -> Self {
        Self {
            preference,
            weights,
            scales: Measures {
                time_minutes: scale(baseline.time_minutes),
                cost: scale(baseline.cost),
                experience: scale(baseline.experience),
            },
        }
    }

    /// Value to minimise for `measures`.
    #[expect(clippy::float_arithmetic, reason = "weighted normalised sum")]
    pub(crate) const fn score(&self, measures: &Measures) -> f64 {
        match self.preference {
            OptimizationPreference::TimeEfficient => measures.time_minutes,
            OptimizationPreference::CostEffective => measures.cost,
            OptimizationPreference::ExperienceOptimal => measures.experience,
            OptimizationPreference::Balanced => {
                self.weights.time * measures.time_minutes / self.scales.time_minutes
                    + self.weights.cost * measures.cost / self.scales.cost
                    + self.weights.experience * measures.experience / self.scales.experience
            }
        }
    }
}

/// Magnitude used to normalise a measure; one when the baseline is zero.
const fn scale(value: f64) -> f64 {
    let magnitude = value.abs();
    if magnitude > EPSILON { magnitude } else { 1.0 }
}
