//! Deterministic helpers for unit, behaviour and property tests.
//!
//! Nothing here touches the network or the clock; every value is derived from
//! the arguments.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use geo::Coord;
use tokio_util::sync::CancellationToken;

use crate::{
    Category, GeoError, Itinerary, Location, LocationBuilder, LocationError, LocationProvider,
    ModeSelection, OptimizationPreference, OptimizeError, OptimizeRequest, Optimizer,
    SegmentEstimate, Scheduler, TravelEstimator, TravelMatrix, TravelMode, validate_coord,
};

/// In-memory [`LocationProvider`] backed by a vector.
#[derive(Debug, Default, Clone)]
pub struct MemoryLocations {
    locations: Vec<Location>,
}

impl MemoryLocations {
    /// Create a provider from a collection of locations.
    pub fn with_locations<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = Location>,
    {
        Self {
            locations: locations.into_iter().collect(),
        }
    }
}

impl LocationProvider for MemoryLocations {
    fn locations(&self) -> Box<dyn Iterator<Item = Location> + Send + '_> {
        Box::new(self.locations.iter().cloned())
    }
}

/// [`TravelEstimator`] charging one kilometre and one minute per leg.
///
/// Legs between identical coordinates are free and instant. Cost is the
/// mode's per-kilometre rate.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitTravelEstimator;

impl TravelEstimator for UnitTravelEstimator {
    fn estimate(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
        mode: &TravelMode,
    ) -> Result<SegmentEstimate, GeoError> {
        let from = validate_coord(from)?;
        let to = validate_coord(to)?;
        if from == to {
            return Ok(SegmentEstimate::ZERO);
        }
        Ok(SegmentEstimate {
            distance_km: 1.0,
            duration: TimeDelta::minutes(1),
            cost: mode.cost_per_km,
        })
    }
}

/// [`Optimizer`] that keeps the request order and times it with
/// [`UnitTravelEstimator`].
#[derive(Debug, Default, Clone, Copy)]
pub struct InputOrderOptimizer;

impl Optimizer for InputOrderOptimizer {
    fn optimize(
        &self,
        request: &OptimizeRequest,
        cancel: &CancellationToken,
    ) -> Result<Itinerary, OptimizeError> {
        request.validate()?;
        if cancel.is_cancelled() {
            return Err(OptimizeError::Cancelled);
        }
        Ok(schedule_in_order(
            &UnitTravelEstimator,
            &request.locations,
            request.start,
            request.start_time,
            request.modes,
            request.budget,
            request.preference,
        )?)
    }
}

/// 2025-05-01 at `hour:minute`, or the epoch for out-of-range input.
pub fn timestamp(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 1)
        .and_then(|day| day.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

/// Builder for an attraction named after `id` at (`lon`, `lat`).
pub fn location(id: &str, lon: f64, lat: f64) -> LocationBuilder {
    Location::builder(id, id.to_uppercase(), Coord { x: lon, y: lat }).category(Category::Attraction)
}

/// Time `locations` in the given order with `estimator`.
pub fn schedule_in_order<E: TravelEstimator + ?Sized>(
    estimator: &E,
    locations: &[Location],
    start: Coord<f64>,
    start_time: NaiveDateTime,
    modes: ModeSelection,
    budget: f64,
    preference: OptimizationPreference,
) -> Result<Itinerary, GeoError> {
    let points: Vec<_> = std::iter::once(start)
        .chain(locations.iter().map(Location::coord))
        .collect();
    let matrix = TravelMatrix::build(estimator, &points, modes)?;
    let order: Vec<usize> = (0..locations.len()).collect();
    Ok(Scheduler::new(&matrix, locations, start, start_time).itinerary(
        &order,
        budget,
        preference,
        &[],
    ))
}

/// Itinerary of attractions spaced 0.01° apart along the meridian, visited in
/// order from the origin with [`UnitTravelEstimator`] on foot.
pub fn planned_itinerary(
    stops: &[(&str, f64)],
    start_time: NaiveDateTime,
    budget: f64,
) -> Result<Itinerary, LocationError> {
    let mut lat = 0.0;
    let mut locations = Vec::with_capacity(stops.len());
    for (id, cost) in stops {
        lat += 0.01;
        locations.push(location(id, 0.0, lat).cost(*cost).build()?);
    }
    Ok(schedule_in_order(
        &UnitTravelEstimator,
        &locations,
        Coord { x: 0.0, y: 0.0 },
        start_time,
        ModeSelection::default(),
        budget,
        OptimizationPreference::default(),
    )?)
}

/// Itinerary holding one stop that starts where the trip starts.
pub fn single_stop_itinerary(
    builder: LocationBuilder,
    start_time: NaiveDateTime,
    budget: f64,
) -> Result<Itinerary, LocationError> {
    let location = builder.build()?;
    let start = location.coord();
    Ok(schedule_in_order(
        &UnitTravelEstimator,
        std::slice::from_ref(&location),
        start,
        start_time,
        ModeSelection::default(),
        budget,
        OptimizationPreference::default(),
    )?)
}
