//! Proptest strategies for itinerary property tests.
//!
//! Generated stops stay within a city-sized box around the origin so that
//! every leg has a sensible walking or transit duration.

use geo::Coord;
use proptest::prelude::*;
use wayfarer_core::test_support::{location, schedule_in_order, timestamp};
use wayfarer_core::{
    Itinerary, Location, ModeSelection, OpeningHours, OptimizationPreference, SegmentEstimator,
};

/// Strategy for a valid coordinate anywhere on Earth.
pub fn coord_strategy() -> impl Strategy<Value = Coord<f64>> {
    (-180.0_f64..=180.0, -90.0_f64..=90.0).prop_map(|(x, y)| Coord { x, y })
}

/// Strategy for opening hours starting between 06:00 and 12:00.
fn hours_strategy() -> impl Strategy<Value = Option<OpeningHours>> {
    proptest::option::of((6_u32..12, 2_u32..10).prop_filter_map(
        "window must end before midnight",
        |(open, length)| format!("{open:02}:00-{:02}:00", open + length).parse().ok(),
    ))
}

/// Strategy for a single stop near the origin. The caller assigns the id.
fn stop_strategy() -> impl Strategy<Value = (Coord<f64>, f64, u32, Option<OpeningHours>)> {
    (
        -0.05_f64..0.05,
        -0.05_f64..0.05,
        0.0_f64..80.0,
        15_u32..120,
        hours_strategy(),
    )
        .prop_map(|(x, y, cost, dwell, hours)| (Coord { x, y }, cost, dwell, hours))
}

/// Strategy for `min..=max` stops with unique identifiers.
pub fn locations_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Location>> {
    proptest::collection::vec(stop_strategy(), min..=max).prop_map(|stops| {
        stops
            .into_iter()
            .enumerate()
            .filter_map(|(index, (coord, cost, dwell, hours))| {
                let builder = location(&format!("stop-{index}"), coord.x, coord.y)
                    .cost(cost)
                    .dwell_minutes(dwell);
                let builder = match hours {
                    Some(hours) => builder.opening_hours(hours),
                    None => builder,
                };
                builder.build().ok()
            })
            .collect()
    })
}

/// Visit `locations` in order from the origin at 08:00 with distance-based modes.
pub fn itinerary_in_order(locations: &[Location], budget: f64) -> Itinerary {
    schedule_in_order(
        &SegmentEstimator::default(),
        locations,
        Coord { x: 0.0, y: 0.0 },
        timestamp(8, 0),
        ModeSelection::ByDistance,
        budget,
        OptimizationPreference::Balanced,
    )
    .expect("generated coordinates are valid")
}
