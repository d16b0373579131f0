//! Editable itinerary state with atomically replaced snapshots.
//!
//! An [`ItinerarySession`] owns the stop list and planning settings. Every
//! mutation re-times the current order, re-runs conflict detection and
//! publishes a new [`SessionSnapshot`] behind an [`Arc`], so readers always
//! see an itinerary together with the conflicts computed from it.
//!
//! Optimization can run off the session's thread: [`ItinerarySession::begin_optimize`]
//! hands out an [`OptimizeJob`] tagged with a generation number. Starting
//! another job or editing the session cancels the job's token and bumps the
//! generation; completing an outdated job fails with
//! [`SessionError::StaleResult`] and leaves the snapshot untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use geo::{Coord, Rect};
use log::{info, warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    Conflict, ConflictDetector, GeoError, Itinerary, Location, LocationId, LocationProvider,
    ModeSelection, OptimizationPreference, OptimizeError, OptimizeRequest, Optimizer,
    ScheduleFlag, Scheduler, SegmentEstimator, TravelEstimator, TravelMatrix, VisitStatus,
    validate_coord,
};

/// Errors from session operations. A failed operation leaves the session unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// No stop has this identifier.
    #[error("no stop with id {0}")]
    UnknownStop(LocationId),
    /// A stop with this identifier is already present.
    #[error("stop {0} is already in the itinerary")]
    DuplicateStop(LocationId),
    /// A position lies outside the stop list.
    #[error("position {position} is out of range for {len} stops")]
    PositionOutOfRange {
        /// Requested position.
        position: usize,
        /// Number of stops.
        len: usize,
    },
    /// The budget is negative or not a finite number.
    #[error("budget must be a finite, non-negative amount, got {0}")]
    InvalidBudget(f64),
    /// The start point or a stop could not be placed.
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),
    /// The optimizer failed.
    #[error("optimization failed: {0}")]
    Optimize(#[from] OptimizeError),
    /// An optimization result arrived after the session moved on.
    #[error("optimization result for generation {job} is stale (current generation {current})")]
    StaleResult {
        /// Generation the job was started for.
        job: u64,
        /// Generation of the session when the result arrived.
        current: u64,
    },
}

/// An itinerary paired with the conflicts detected in it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSnapshot {
    /// Session generation that produced the snapshot.
    pub generation: u64,
    /// Timed stops that will be visited.
    pub itinerary: Itinerary,
    /// Conflicts detected in `itinerary`.
    pub conflicts: Vec<Conflict>,
    /// Stops the traveller skipped, in list order.
    pub skipped: Vec<LocationId>,
}

impl SessionSnapshot {
    /// Whether any blocking conflict is present.
    pub fn has_blocking_conflicts(&self) -> bool {
        self.conflicts.iter().any(Conflict::is_blocking)
    }
}

/// An optimization run detached from its session.
///
/// Jobs are `Send`; run one on a worker thread and pass the
/// [`OptimizeOutcome`] back to [`ItinerarySession::complete_optimize`].
pub struct OptimizeJob<O: Optimizer> {
    generation: u64,
    request: OptimizeRequest,
    optimizer: Arc<O>,
    token: CancellationToken,
}

impl<O: Optimizer> OptimizeJob<O> {
    /// Generation the job belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Request that will be optimized.
    pub fn request(&self) -> &OptimizeRequest {
        &self.request
    }

    /// Token cancelled when the session moves on.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Run the optimizer.
    pub fn run(self) -> OptimizeOutcome {
        let result = self.optimizer.optimize(&self.request, &self.token);
        OptimizeOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// Result of an [`OptimizeJob`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOutcome {
    /// Generation the job belonged to.
    pub generation: u64,
    /// Optimized itinerary or the reason there is none.
    pub result: Result<Itinerary, OptimizeError>,
}

#[derive(Debug, Clone)]
struct PlanState {
    locations: Vec<Location>,
    statuses: HashMap<LocationId, VisitStatus>,
    demoted: HashSet<LocationId>,
    start: Coord<f64>,
    start_time: NaiveDateTime,
    modes: ModeSelection,
    preference: OptimizationPreference,
    budget: f64,
}

impl PlanState {
    fn status(&self, id: &LocationId) -> VisitStatus {
        self.statuses.get(id).copied().unwrap_or_default()
    }

    fn is_skipped(&self, location: &Location) -> bool {
        self.status(location.id()) == VisitStatus::Skipped
    }

    fn position(&self, id: &LocationId) -> Result<usize, SessionError> {
        self.locations
            .iter()
            .position(|location| location.id() == id)
            .ok_or_else(|| SessionError::UnknownStop(id.clone()))
    }

    fn active(&self) -> Vec<Location> {
        self.locations
            .iter()
            .filter(|location| !self.is_skipped(location))
            .cloned()
            .collect()
    }

    fn push(&mut self, location: Location) -> Result<(), SessionError> {
        if self.position(location.id()).is_ok() {
            return Err(SessionError::DuplicateStop(location.id().clone()));
        }
        self.locations.push(location);
        Ok(())
    }
}

/// Holds the stops, settings and latest snapshot of an itinerary being planned.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use chrono::NaiveDate;
/// use wayfarer_core::{
///     CancellationToken, Itinerary, ItinerarySession, Location, OptimizeError, OptimizeRequest,
///     Optimizer,
/// };
///
/// struct Nothing;
///
/// impl Optimizer for Nothing {
///     fn optimize(
///         &self,
///         request: &OptimizeRequest,
///         _cancel: &CancellationToken,
///     ) -> Result<Itinerary, OptimizeError> {
///         Ok(request.empty_itinerary())
///     }
/// }
///
/// let start_time = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let mut session = ItinerarySession::new(Nothing, Coord { x: 0.0, y: 0.0 }, start_time, 100.0)?;
/// let cafe = Location::builder("cafe", "Cafe", Coord { x: 0.0, y: 0.01 }).build()?;
/// let snapshot = session.add_stop(cafe)?;
/// assert_eq!(snapshot.itinerary.len(), 1);
/// assert!(snapshot.conflicts.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ItinerarySession<O: Optimizer> {
    optimizer: Arc<O>,
    detector: ConflictDetector,
    estimator: Arc<dyn TravelEstimator>,
    state: PlanState,
    generation: u64,
    in_flight: Option<CancellationToken>,
    snapshot: Arc<SessionSnapshot>,
}

impl<O: Optimizer> ItinerarySession<O> {
    /// Start an empty session.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidCoordinate`] for an invalid start point
    /// and [`SessionError::InvalidBudget`] for a negative or non-finite budget.
    pub fn new(
        optimizer: O,
        start: Coord<f64>,
        start_time: NaiveDateTime,
        budget: f64,
    ) -> Result<Self, SessionError> {
        let start = validate_coord(start)?;
        let budget = validate_budget(budget)?;
        let state = PlanState {
            locations: Vec::new(),
            statuses: HashMap::new(),
            demoted: HashSet::new(),
            start,
            start_time,
            modes: ModeSelection::default(),
            preference: OptimizationPreference::default(),
            budget,
        };
        let snapshot = Arc::new(SessionSnapshot {
            generation: 0,
            itinerary: Itinerary::empty(start, start_time, budget, state.preference),
            conflicts: Vec::new(),
            skipped: Vec::new(),
        });
        Ok(Self {
            optimizer: Arc::new(optimizer),
            detector: ConflictDetector::default(),
            estimator: Arc::new(SegmentEstimator::default()),
            state,
            generation: 0,
            in_flight: None,
            snapshot,
        })
    }

    /// Use `detector` for conflict detection.
    #[must_use]
    pub fn with_detector(mut self, detector: ConflictDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Use `estimator` when re-timing the stop list.
    #[must_use]
    pub fn with_estimator(mut self, estimator: Arc<dyn TravelEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Current generation; bumped by every mutation and optimization start.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All stops in list order, including skipped ones.
    pub fn stops(&self) -> &[Location] {
        &self.state.locations
    }

    /// Status recorded for `id`.
    pub fn status(&self, id: &LocationId) -> Option<VisitStatus> {
        self.state
            .position(id)
            .ok()
            .map(|_| self.state.status(id))
    }

    /// Append a stop.
    pub fn add_stop(&mut self, location: Location) -> Result<Arc<SessionSnapshot>, SessionError> {
        self.update(|state| state.push(location))
    }

    /// Append every provider location inside `bbox` not already present.
    pub fn add_stops_from(
        &mut self,
        provider: &dyn LocationProvider,
        bbox: &Rect<f64>,
    ) -> Result<Arc<SessionSnapshot>, SessionError> {
        let candidates: Vec<Location> = provider.locations_within(bbox).collect();
        self.update(|state| {
            for location in candidates {
                if state.position(location.id()).is_err() {
                    state.push(location)?;
                }
            }
            Ok(())
        })
    }

    /// Replace the stop with the same identifier as `location`.
    pub fn replace_stop(&mut self, location: Location) -> Result<Arc<SessionSnapshot>, SessionError> {
        self.update(|state| {
            let position = state.position(location.id())?;
            if let Some(slot) = state.locations.get_mut(position) {
                *slot = location;
            }
            Ok(())
        })
    }

    /// Remove the stop `id`.
    pub fn remove_stop(&mut self, id: &LocationId) -> Result<Arc<SessionSnapshot>, SessionError> {
        self.update(|state| {
            let position = state.position(id)?;
            state.locations.remove(position);
            state.statuses.remove(id);
            state.demoted.remove(id);
            Ok(())
        })
    }

    /// Move the stop at list position `from` to position `to`.
    pub fn reorder_stop(&mut self, from: usize, to: usize) -> Result<Arc<SessionSnapshot>, SessionError> {
        self.update(|state| {
            let len = state.locations.len();
            for position in [from, to] {
                if position >= len {
                    return Err(SessionError::PositionOutOfRange { position, len });
                }
            }
            let location = state.locations.remove(from);
            state.locations.insert(to, location);
            Ok(())
        })
    }

    /// Record the visit status of `id`. Skipped stops leave the itinerary.
    pub fn mark_status(
        &mut self,
        id: &LocationId,
        status: VisitStatus,
    ) -> Result<Arc<SessionSnapshot>, SessionError> {
        self.update(|state| {
            state.position(id)?;
            state.statuses.insert(id.clone(), status);
            Ok(())
        })
    }

    /// Change the optimization goal.
    pub fn set_preference(
        &mut self,
        preference: OptimizationPreference,
    ) -> Result<Arc<SessionSnapshot>, SessionError> {
        self.update(|state| {
            state.preference = preference;
            Ok(())
        })
    }

    /// Change how legs choose their mode.
    pub fn set_modes(&mut self, modes: ModeSelection) -> Result<Arc<SessionSnapshot>, SessionError> {
        self.update(|state| {
            state.modes = modes;
            Ok(())
        })
    }

    /// Change the spending ceiling.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidBudget`] for a negative or non-finite
    /// budget and leaves the session unchanged.
    pub fn set_budget(&mut self, budget: f64) -> Result<Arc<SessionSnapshot>, SessionError> {
        let budget = validate_budget(budget)?;
        self.update(|state| {
            state.budget = budget;
            Ok(())
        })
    }

    /// Change where and when the trip begins.
    pub fn set_start(
        &mut self,
        start: Coord<f64>,
        start_time: NaiveDateTime,
    ) -> Result<Arc<SessionSnapshot>, SessionError> {
        let start = validate_coord(start)?;
        self.update(|state| {
            state.start = start;
            state.start_time = start_time;
            Ok(())
        })
    }

    /// Request covering the non-skipped stops in list order.
    pub fn request(&self) -> OptimizeRequest {
        OptimizeRequest {
            locations: self.state.active(),
            start: self.state.start,
            start_time: self.state.start_time,
            modes: self.state.modes,
            preference: self.state.preference,
            budget: self.state.budget,
        }
    }

    /// Cancel any in-flight job and start a new one.
    pub fn begin_optimize(&mut self) -> OptimizeJob<O> {
        self.advance_generation();
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        OptimizeJob {
            generation: self.generation,
            request: self.request(),
            optimizer: Arc::clone(&self.optimizer),
            token,
        }
    }

    /// Install the result of a job started by [`Self::begin_optimize`].
    ///
    /// The stop list is reordered to match the optimized itinerary; skipped
    /// stops keep their relative order after the visited ones.
    pub fn complete_optimize(
        &mut self,
        outcome: OptimizeOutcome,
    ) -> Result<Arc<SessionSnapshot>, SessionError> {
        if outcome.generation != self.generation {
            warn!(
                "discarding stale optimization result (job {}, current {})",
                outcome.generation, self.generation
            );
            return Err(SessionError::StaleResult {
                job: outcome.generation,
                current: self.generation,
            });
        }
        self.in_flight = None;
        let mut itinerary = outcome.result?;

        let mut state = self.state.clone();
        let mut reordered: Vec<Location> = itinerary
            .stops
            .iter()
            .map(|stop| stop.location.clone())
            .collect();
        reordered.extend(state.locations.iter().filter(|l| state.is_skipped(l)).cloned());
        state.locations = reordered;
        state.demoted = itinerary
            .stops
            .iter()
            .filter(|stop| stop.has_flag(ScheduleFlag::PriorityDemoted))
            .map(|stop| stop.location.id().clone())
            .collect();
        for stop in &mut itinerary.stops {
            stop.status = state.status(stop.location.id());
        }
        let snapshot = self.assemble(&state, itinerary);
        self.state = state;
        Ok(self.publish(snapshot))
    }

    /// Optimize synchronously and install the result.
    pub fn optimize(&mut self) -> Result<Arc<SessionSnapshot>, SessionError> {
        let job = self.begin_optimize();
        let outcome = job.run();
        self.complete_optimize(outcome)
    }

    /// Run conflict detection over the current itinerary.
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        self.detector.detect(&self.snapshot.itinerary)
    }

    /// Re-optimize when blocking conflicts exist; otherwise return the current snapshot.
    pub fn resolve_conflicts(&mut self) -> Result<Arc<SessionSnapshot>, SessionError> {
        if self.snapshot.has_blocking_conflicts() {
            self.optimize()
        } else {
            Ok(self.snapshot())
        }
    }

    fn update<F>(&mut self, edit: F) -> Result<Arc<SessionSnapshot>, SessionError>
    where
        F: FnOnce(&mut PlanState) -> Result<(), SessionError>,
    {
        let mut state = self.state.clone();
        edit(&mut state)?;
        let itinerary = self.retime(&state)?;
        self.advance_generation();
        let snapshot = self.assemble(&state, itinerary);
        self.state = state;
        Ok(self.publish(snapshot))
    }

    fn retime(&self, state: &PlanState) -> Result<Itinerary, SessionError> {
        let active = state.active();
        let points: Vec<Coord<f64>> = std::iter::once(state.start)
            .chain(active.iter().map(Location::coord))
            .collect();
        let matrix = TravelMatrix::build(self.estimator.as_ref(), &points, state.modes)?;
        let order: Vec<usize> = (0..active.len()).collect();
        let demoted: Vec<usize> = active
            .iter()
            .enumerate()
            .filter(|(_, location)| state.demoted.contains(location.id()))
            .map(|(index, _)| index)
            .collect();
        let scheduler = Scheduler::new(&matrix, &active, state.start, state.start_time);
        let mut itinerary = scheduler.itinerary(&order, state.budget, state.preference, &demoted);
        for stop in &mut itinerary.stops {
            stop.status = state.status(stop.location.id());
        }
        Ok(itinerary)
    }

    fn assemble(&self, state: &PlanState, itinerary: Itinerary) -> SessionSnapshot {
        let conflicts = self.detector.detect(&itinerary);
        let skipped = state
            .locations
            .iter()
            .filter(|location| state.is_skipped(location))
            .map(|location| location.id().clone())
            .collect();
        SessionSnapshot {
            generation: self.generation,
            itinerary,
            conflicts,
            skipped,
        }
    }

    fn publish(&mut self, snapshot: SessionSnapshot) -> Arc<SessionSnapshot> {
        info!(
            "session generation {}: {} stops, {} conflicts",
            snapshot.generation,
            snapshot.itinerary.len(),
            snapshot.conflicts.len()
        );
        self.snapshot = Arc::new(snapshot);
        self.snapshot()
    }

    fn advance_generation(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.generation += 1;
    }
}

fn validate_budget(budget: f64) -> Result<f64, SessionError> {
    if budget.is_finite() && budget >= 0.0 {
        Ok(budget)
    } else {
        Err(SessionError::InvalidBudget(budget))
    }
}
