//! Assign concrete timestamps to a visiting order.
//!
//! Visits never shorten the dwell. A visit that would run past closing is
//! moved to the next day's opening; a visit whose window is shorter than the
//! dwell starts at opening and is flagged for the conflict detector.
//! Clock arithmetic saturates at [`NaiveDateTime::MAX`], so a timeline that
//! runs off the calendar keeps every stop and piles them up at the end.

use chrono::NaiveDateTime;
use geo::Coord;

use crate::hours::later_by;
use crate::{
    Itinerary, ItineraryStop, Leg, Location, OptimizationPreference, ScheduleFlag,
    TransportSegment, TravelMatrix,
};

/// Timing of one visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedVisit {
    /// Start of the visit.
    pub arrival: NaiveDateTime,
    /// End of the visit, always `arrival + dwell`.
    pub departure: NaiveDateTime,
    /// The window cannot hold the dwell; the visit runs past closing.
    pub dwell_overrun: bool,
    /// The visit starts on a later day than the traveller got there.
    pub deferred_to_next_day: bool,
}

/// Time a visit to `location` for a traveller who gets there at `reached_at`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use wayfarer_core::{Location, plan_visit};
///
/// let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
/// let gallery = Location::builder("gallery", "Gallery", Coord { x: 0.0, y: 0.0 })
///     .dwell_minutes(60)
///     .opening_hours("10:00-18:00".parse()?)
///     .build()?;
///
/// let early = plan_visit(&gallery, day.and_hms_opt(8, 30, 0).unwrap());
/// assert_eq!(early.arrival, day.and_hms_opt(10, 0, 0).unwrap());
///
/// let late = plan_visit(&gallery, day.and_hms_opt(17, 30, 0).unwrap());
/// assert!(late.deferred_to_next_day);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn plan_visit(location: &Location, reached_at: NaiveDateTime) -> PlannedVisit {
    let dwell = location.dwell();
    let (arrival, dwell_overrun) = match location.opening_hours() {
        None => (reached_at, false),
        Some(hours) => {
            let first = hours.next_opening(reached_at);
            if !hours.can_accommodate(dwell) {
                (first, true)
            } else if hours.departure(first, dwell).is_ok() {
                (first, false)
            } else {
                (hours.next_opening(hours.closes_on(first.date())), false)
            }
        }
    };
    PlannedVisit {
        arrival,
        departure: later_by(arrival, dwell),
        dwell_overrun,
        deferred_to_next_day: arrival.date() > reached_at.date(),
    }
}

/// One stop of a [`Timeline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineEntry {
    /// Index into the scheduler's locations.
    pub index: usize,
    /// Leg taken to get there.
    pub leg: Leg,
    /// When the previous visit (or the trip) was left.
    pub left_at: NaiveDateTime,
    /// When the traveller gets there.
    pub reached_at: NaiveDateTime,
    /// Timing of the visit.
    pub visit: PlannedVisit,
}

/// Timed visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    /// Visits in order.
    pub entries: Vec<TimelineEntry>,
    /// Departure from the last visit, or the start time when empty.
    pub finish: NaiveDateTime,
}

/// Times visiting orders over a fixed set of locations.
///
/// The matrix must hold the start at index `0` and `locations[i]` at `i + 1`.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler<'a> {
    matrix: &'a TravelMatrix,
    locations: &'a [Location],
    start: Coord<f64>,
    start_time: NaiveDateTime,
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler.
    pub fn new(
        matrix: &'a TravelMatrix,
        locations: &'a [Location],
        start: Coord<f64>,
        start_time: NaiveDateTime,
    ) -> Self {
        Self {
            matrix,
            locations,
            start,
            start_time,
        }
    }

    /// Locations being scheduled.
    pub fn locations(&self) -> &'a [Location] {
        self.locations
    }

    /// Matrix the scheduler reads legs from.
    pub fn matrix(&self) -> &'a TravelMatrix {
        self.matrix
    }

    /// When the trip begins.
    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    /// Time a visit to `locations[index]` leaving matrix point `from` at `left_at`.
    pub fn step(&self, from: usize, index: usize, left_at: NaiveDateTime) -> Option<TimelineEntry> {
        let leg = *self.matrix.leg(from, index + 1)?;
        let location = self.locations.get(index)?;
        let reached_at = later_by(left_at, leg.estimate.duration);
        Some(TimelineEntry {
            index,
            leg,
            left_at,
            reached_at,
            visit: plan_visit(location, reached_at),
        })
    }

    /// Time `order`, a sequence of indices into the locations.
    ///
    /// Out-of-range indices are skipped.
    pub fn timeline(&self, order: &[usize]) -> Timeline {
        let mut entries = Vec::with_capacity(order.len());
        let mut point = 0;
        let mut clock = self.start_time;
        for &index in order {
            let Some(entry) = self.step(point, index, clock) else {
                continue;
            };
            point = index + 1;
            clock = entry.visit.departure;
            entries.push(entry);
        }
        Timeline {
            entries,
            finish: clock,
        }
    }

    /// Build a full itinerary for `order`.
    ///
    /// Stops listed in `demoted` receive [`ScheduleFlag::PriorityDemoted`].
    pub fn itinerary(
        &self,
        order: &[usize],
        budget: f64,
        preference: OptimizationPreference,
        demoted: &[usize],
    ) -> Itinerary {
        let timeline = self.timeline(order);
        let mut stops: Vec<ItineraryStop> = Vec::with_capacity(timeline.entries.len());
        let mut from: Option<&Location> = None;
        for entry in &timeline.entries {
            let Some(location) = self.locations.get(entry.index) else {
                continue;
            };
            let from_coord = from.map_or(self.start, Location::coord);
            let segment = TransportSegment::new(
                from.map(|loc| loc.id().clone()),
                location.id().clone(),
                (from_coord, location.coord()),
                &entry.leg,
                entry.left_at,
            );
            if let Some(previous) = stops.last_mut() {
                previous.outbound = Some(segment.clone());
            }
            let mut flags = Vec::new();
            if entry.visit.dwell_overrun {
                flags.push(ScheduleFlag::ClosesBeforeDwellComplete);
            }
            if entry.visit.deferred_to_next_day {
                flags.push(ScheduleFlag::DeferredToNextDay);
            }
            if demoted.contains(&entry.index) {
                flags.push(ScheduleFlag::PriorityDemoted);
            }
            stops.push(ItineraryStop {
                location: location.clone(),
                arrival: entry.visit.arrival,
                departure: entry.visit.departure,
                status: crate::VisitStatus::Planned,
                inbound: Some(segment),
                outbound: None,
                flags,
            });
            from = Some(location);
        }
        Itinerary {
            stops,
            start: self.start,
            start_time: self.start_time,
            budget,
            preference,
        }
    }
}
