//! Ordered, timed itineraries and their transport segments.

use chrono::{NaiveDateTime, TimeDelta};
use geo::{Coord, LineString};
use thiserror::Error;

use crate::{ItinerarySummary, Leg, Location, LocationId, MapRegion, TravelMode};

/// Errors for itinerary operations that need at least one stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItineraryError {
    /// The itinerary has no stops.
    #[error("itinerary has no stops")]
    EmptyItinerary,
}

/// What the optimizer should minimise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum OptimizationPreference {
    /// Elapsed time from start to last departure.
    TimeEfficient,
    /// Money spent at stops and on transport.
    CostEffective,
    /// Early must-see stops and comfortable transport.
    ExperienceOptimal,
    /// Normalised blend of the other three.
    #[default]
    Balanced,
}

/// Progress of a single stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VisitStatus {
    /// Not yet visited.
    #[default]
    Planned,
    /// Already visited.
    Visited,
    /// Dropped by the traveller; ignored by timing and budget rules.
    Skipped,
    /// Running late.
    Delayed,
}

/// Notes attached by the scheduler or optimizer to a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ScheduleFlag {
    /// The opening window is shorter than the dwell; the visit overruns closing.
    ClosesBeforeDwellComplete,
    /// A priority stop could not be placed in the first half of the tour.
    PriorityDemoted,
    /// The visit was pushed to the next day's opening.
    DeferredToNextDay,
}

/// A leg between two consecutive points of an itinerary.
///
/// Segments are derived from two points and a mode; build them with
/// [`TransportSegment::new`] rather than editing fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportSegment {
    from: Option<LocationId>,
    to: LocationId,
    from_coord: Coord<f64>,
    to_coord: Coord<f64>,
    mode: TravelMode,
    distance_km: f64,
    duration_seconds: i64,
    cost: f64,
    departure: NaiveDateTime,
    arrival: NaiveDateTime,
}

impl TransportSegment {
    /// Derive a segment leaving at `departure`.
    ///
    /// `from` is `None` for the leg out of the trip's start point.
    pub fn new(
        from: Option<LocationId>,
        to: LocationId,
        (from_coord, to_coord): (Coord<f64>, Coord<f64>),
        leg: &Leg,
        departure: NaiveDateTime,
    ) -> Self {
        Self {
            from,
            to,
            from_coord,
            to_coord,
            mode: leg.mode,
            distance_km: leg.estimate.distance_km,
            duration_seconds: leg.estimate.duration.num_seconds(),
            cost: leg.estimate.cost,
            departure,
            arrival: crate::hours::later_by(departure, leg.estimate.duration),
        }
    }

    /// Origin stop, or `None` for the trip start.
    pub fn from(&self) -> Option<&LocationId> {
        self.from.as_ref()
    }

    /// Destination stop.
    pub fn to(&self) -> &LocationId {
        &self.to
    }

    /// Origin coordinate.
    pub fn from_coord(&self) -> Coord<f64> {
        self.from_coord
    }

    /// Destination coordinate.
    pub fn to_coord(&self) -> Coord<f64> {
        self.to_coord
    }

    /// Mode used.
    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Travel time.
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.duration_seconds).unwrap_or(TimeDelta::MAX)
    }

    /// Fare or running cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Departure from the origin.
    pub fn departure(&self) -> NaiveDateTime {
        self.departure
    }

    /// Arrival at the destination.
    pub fn arrival(&self) -> NaiveDateTime {
        self.arrival
    }
}

/// A location placed in an itinerary with planned timing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItineraryStop {
    /// The location visited.
    pub location: Location,
    /// Start of the visit.
    pub arrival: NaiveDateTime,
    /// End of the visit.
    pub departure: NaiveDateTime,
    /// Progress of the visit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: VisitStatus,
    /// Leg into this stop.
    #[cfg_attr(feature = "serde", serde(default))]
    pub inbound: Option<TransportSegment>,
    /// Leg out of this stop.
    #[cfg_attr(feature = "serde", serde(default))]
    pub outbound: Option<TransportSegment>,
    /// Scheduling notes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: Vec<ScheduleFlag>,
}

impl ItineraryStop {
    /// Whether the stop carries `flag`.
    pub fn has_flag(&self, flag: ScheduleFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Whether timing and budget rules apply to the stop.
    pub fn is_active(&self) -> bool {
        self.status != VisitStatus::Skipped
    }

    /// Cost of the stop plus its inbound leg.
    pub fn cost_with_inbound(&self) -> f64 {
        self.location.cost() + self.inbound.as_ref().map_or(0.0, TransportSegment::cost)
    }
}

/// An ordered visiting sequence with a budget and an optimisation goal.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use wayfarer_core::{Itinerary, ItineraryError, OptimizationPreference};
///
/// let start_time = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let itinerary = Itinerary::empty(
///     Coord { x: 0.0, y: 0.0 },
///     start_time,
///     100.0,
///     OptimizationPreference::Balanced,
/// );
/// assert!(itinerary.is_empty());
/// assert_eq!(itinerary.finish_time(), Err(ItineraryError::EmptyItinerary));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Itinerary {
    /// Stops in visiting order.
    pub stops: Vec<ItineraryStop>,
    /// Where the trip begins.
    pub start: Coord<f64>,
    /// When the trip begins.
    pub start_time: NaiveDateTime,
    /// Spending ceiling.
    pub budget: f64,
    /// Optimisation goal used to order the stops.
    #[cfg_attr(feature = "serde", serde(default))]
    pub preference: OptimizationPreference,
}

impl Itinerary {
    /// An itinerary with no stops.
    pub fn empty(
        start: Coord<f64>,
        start_time: NaiveDateTime,
        budget: f64,
        preference: OptimizationPreference,
    ) -> Self {
        Self {
            stops: Vec::new(),
            start,
            start_time,
            budget,
            preference,
        }
    }

    /// Whether the itinerary has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Stops that timing and budget rules apply to.
    pub fn active_stops(&self) -> impl Iterator<Item = &ItineraryStop> {
        self.stops.iter().filter(|stop| stop.is_active())
    }

    /// Position of the stop for `id`.
    pub fn position(&self, id: &LocationId) -> Option<usize> {
        self.stops.iter().position(|stop| stop.location.id() == id)
    }

    /// Identifiers in visiting order.
    pub fn order(&self) -> Vec<LocationId> {
        self.stops
            .iter()
            .map(|stop| stop.location.id().clone())
            .collect()
    }

    /// Total of stop costs and inbound transport costs over active stops.
    pub fn total_cost(&self) -> f64 {
        self.active_stops().map(ItineraryStop::cost_with_inbound).sum()
    }

    /// Total transport distance in kilometres over active stops.
    pub fn total_distance_km(&self) -> f64 {
        self.active_stops()
            .filter_map(|stop| stop.inbound.as_ref())
            .map(TransportSegment::distance_km)
            .sum()
    }

    /// The last stop.
    pub fn last_stop(&self) -> Result<&ItineraryStop, ItineraryError> {
        self.stops.last().ok_or(ItineraryError::EmptyItinerary)
    }

    /// Departure from the last stop.
    pub fn finish_time(&self) -> Result<NaiveDateTime, ItineraryError> {
        self.last_stop().map(|stop| stop.departure)
    }

    /// Elapsed time from start to the last departure.
    pub fn elapsed(&self) -> Result<TimeDelta, ItineraryError> {
        self.finish_time().map(|finish| finish - self.start_time)
    }

    /// Aggregate statistics.
    pub fn summary(&self) -> ItinerarySummary {
        ItinerarySummary::from_itinerary(self)
    }

    /// The start point followed by each stop, for drawing the route.
    pub fn polyline(&self) -> LineString<f64> {
        std::iter::once(self.start)
            .chain(self.stops.iter().map(|stop| stop.location.coord()))
            .collect()
    }

    /// Viewport framing the whole route.
    pub fn map_region(&self) -> Option<MapRegion> {
        MapRegion::around(&self.polyline())
    }
}
