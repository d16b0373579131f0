//! Itinerary statistics and the map viewport framing a route.

use std::collections::BTreeMap;

use geo::{BoundingRect, Coord, LineString, Rect};

use crate::{Category, Itinerary, TransportSegment};

/// Aggregate figures for an itinerary.
///
/// Skipped stops and their inbound legs are left out of every total.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItinerarySummary {
    /// Number of stops that will be visited.
    pub stop_count: usize,
    /// Transport distance in kilometres.
    pub total_distance_km: f64,
    /// Minutes spent travelling.
    pub transport_minutes: i64,
    /// Minutes spent at stops.
    pub dwell_minutes: i64,
    /// Stop and transport spending.
    pub total_cost: f64,
    /// Transport spending alone.
    pub transport_cost: f64,
    /// Stop spending grouped by category.
    pub cost_by_category: BTreeMap<Category, f64>,
    /// Budget left after all spending; negative when over budget.
    pub budget_remaining: f64,
    /// Sum of leg distance times mode carbon index.
    pub carbon_score: f64,
}

impl ItinerarySummary {
    /// Compute the summary of `itinerary`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use geo::Coord;
    /// use wayfarer_core::{Itinerary, ItinerarySummary, OptimizationPreference};
    ///
    /// let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
    /// let trip = Itinerary::empty(Coord { x: 0.0, y: 0.0 }, start, 80.0, OptimizationPreference::Balanced);
    /// let summary = ItinerarySummary::from_itinerary(&trip);
    /// assert_eq!(summary.stop_count, 0);
    /// assert_eq!(summary.budget_remaining, 80.0);
    /// ```
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        let mut summary = Self {
            stop_count: 0,
            total_distance_km: 0.0,
            transport_minutes: 0,
            dwell_minutes: 0,
            total_cost: 0.0,
            transport_cost: 0.0,
            cost_by_category: BTreeMap::new(),
            budget_remaining: itinerary.budget,
            carbon_score: 0.0,
        };
        for stop in itinerary.active_stops() {
            summary.stop_count += 1;
            summary.dwell_minutes += i64::from(stop.location.dwell_minutes());
            *summary
                .cost_by_category
                .entry(stop.location.category())
                .or_insert(0.0) += stop.location.cost();
            if let Some(leg) = stop.inbound.as_ref() {
                summary.add_leg(leg);
            }
        }
        summary.total_cost = itinerary.total_cost();
        summary.budget_remaining = itinerary.budget - summary.total_cost;
        summary
    }

    fn add_leg(&mut self, leg: &TransportSegment) {
        self.total_distance_km += leg.distance_km();
        self.transport_minutes = self
            .transport_minutes
            .saturating_add(leg.duration().num_minutes());
        self.transport_cost += leg.cost();
        self.carbon_score += leg.distance_km() * leg.mode().carbon_footprint;
    }

    /// Whether spending exceeds the budget.
    pub fn is_over_budget(&self) -> bool {
        self.budget_remaining < 0.0
    }
}

/// Viewport framing a route with some breathing room.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapRegion {
    /// Tight bounds of every point.
    pub bounds: Rect<f64>,
    /// Centre of the viewport.
    pub center: Coord<f64>,
    /// Width and height in degrees, padded around the bounds.
    pub span: Coord<f64>,
}

impl MapRegion {
    /// Padding factor applied to the bounding span.
    pub const PADDING: f64 = 1.5;

    /// Minimum span in degrees so a single point still shows a neighbourhood.
    pub const MIN_SPAN_DEGREES: f64 = 0.01;

    /// Frame every vertex of `line`. Returns `None` for an empty line.
    pub fn around(line: &LineString<f64>) -> Option<Self> {
        let bounds = line.bounding_rect()?;
        let span = Coord {
            x: (bounds.width() * Self::PADDING).max(Self::MIN_SPAN_DEGREES),
            y: (bounds.height() * Self::PADDING).max(Self::MIN_SPAN_DEGREES),
        };
        Some(Self {
            bounds,
            center: bounds.center(),
            span,
        })
    }
}
