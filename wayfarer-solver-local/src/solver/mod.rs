//! `LocalSearchOptimizer` implementation.

use geo::Coord;
use tokio_util::sync::CancellationToken;
use wayfarer_core::{
    Itinerary, Location, OptimizeError, OptimizeRequest, Optimizer, Scheduler, SegmentEstimator,
    TravelEstimator, TravelMatrix,
};

use crate::objective::{Objective, ObjectiveWeights};
use crate::seed::{demoted, nearest_neighbour};
use crate::two_opt::Evaluator;

/// Ceiling on the default number of 2-opt evaluations.
const DEFAULT_EVALUATION_CAP: usize = 10_000;

/// Configuration for [`LocalSearchOptimizer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalSearchConfig {
    /// Upper bound on 2-opt evaluations; `None` allows `n²` capped at 10 000.
    pub max_evaluations: Option<usize>,
    /// Weights of the balanced objective.
    pub weights: ObjectiveWeights,
}

impl LocalSearchConfig {
    /// Evaluation budget for `len` stops.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_solver_local::LocalSearchConfig;
    ///
    /// let config = LocalSearchConfig::default();
    /// assert_eq!(config.evaluation_budget(20), 400);
    /// assert_eq!(config.evaluation_budget(500), 10_000);
    /// ```
    #[must_use]
    pub fn evaluation_budget(&self, len: usize) -> usize {
        self.max_evaluations
            .unwrap_or_else(|| len.saturating_mul(len).min(DEFAULT_EVALUATION_CAP))
    }
}

/// Nearest-neighbour plus 2-opt optimizer.
///
/// The optimizer is generic over the [`TravelEstimator`] used to price legs.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use wayfarer_core::{
///     CancellationToken, Location, ModeSelection, OptimizationPreference, OptimizeRequest,
///     Optimizer,
/// };
/// use wayfarer_solver_local::LocalSearchOptimizer;
///
/// let request = OptimizeRequest {
///     locations: vec![
///         Location::builder("far", "Far", Coord { x: 0.02, y: 0.0 }).build()?,
///         Location::builder("near", "Near", Coord { x: 0.01, y: 0.0 }).build()?,
///     ],
///     start: Coord { x: 0.0, y: 0.0 },
///     start_time: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
///     modes: ModeSelection::default(),
///     preference: OptimizationPreference::TimeEfficient,
///     budget: 50.0,
/// };
/// let itinerary = LocalSearchOptimizer::default().optimize(&request, &CancellationToken::new())?;
/// let order: Vec<_> = itinerary.order().iter().map(ToString::to_string).collect();
/// assert_eq!(order, ["near", "far"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct LocalSearchOptimizer<E = SegmentEstimator>
where
    E: TravelEstimator,
{
    estimator: E,
    config: LocalSearchConfig,
}

impl Default for LocalSearchOptimizer<SegmentEstimator> {
    fn default() -> Self {
        Self::new(SegmentEstimator::default())
    }
}

impl<E> LocalSearchOptimizer<E>
where
    E: TravelEstimator,
{
    /// Construct an optimizer using default configuration.
    #[must_use]
    pub fn new(estimator: E) -> Self {
        Self::with_config(estimator, LocalSearchConfig::default())
    }

    /// Construct an optimizer with explicit configuration.
    #[must_use]
    pub const fn with_config(estimator: E, config: LocalSearchConfig) -> Self {
        Self { estimator, config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    fn order(
        &self,
        request: &OptimizeRequest,
        scheduler: &Scheduler<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<usize>, OptimizeError> {
        let seed = nearest_neighbour(scheduler, cancel)?;
        let baseline = Evaluator::measure(scheduler, &seed);
        let objective = Objective::new(request.preference, self.config.weights, &baseline);
        let evaluator = Evaluator::new(scheduler, objective);

        let seeded = evaluator.candidate(seed);
        let as_given = evaluator.candidate((0..request.locations.len()).collect());
        let start = if Evaluator::prefers(&as_given, &seeded) {
            as_given
        } else {
            seeded
        };
        let budget = self.config.evaluation_budget(request.locations.len());
        let (best, evaluations) = evaluator.improve(start, budget, cancel)?;
        log::debug!(
            "ordered {} stops with {evaluations} of {budget} evaluations",
            best.order.len()
        );
        Ok(best.order)
    }
}

impl<E> Optimizer for LocalSearchOptimizer<E>
where
    E: TravelEstimator,
{
    fn optimize(
        &self,
        request: &OptimizeRequest,
        cancel: &CancellationToken,
    ) -> Result<Itinerary, OptimizeError> {
        request.validate()?;
        if cancel.is_cancelled() {
            return Err(OptimizeError::Cancelled);
        }
        if request.locations.is_empty() {
            return Ok(request.empty_itinerary());
        }

        let points: Vec<Coord<f64>> = std::iter::once(request.start)
            .chain(request.locations.iter().map(Location::coord))
            .collect();
        let matrix = TravelMatrix::build(&self.estimator, &points, request.modes)?;
        if cancel.is_cancelled() {
            return Err(OptimizeError::Cancelled);
        }

        let scheduler = Scheduler::new(
            &matrix,
            &request.locations,
            request.start,
            request.start_time,
        );
        let order = self.order(request, &scheduler, cancel)?;
        let demoted_stops = demoted(&request.locations, &order);
        for location in demoted_stops
            .iter()
            .filter_map(|&index| request.locations.get(index))
        {
            log::warn!(
                "priority stop {} could not be placed in the first half of the day",
                location.id()
            );
        }
        Ok(scheduler.itinerary(&order, request.budget, request.preference, &demoted_stops))
    }
}
