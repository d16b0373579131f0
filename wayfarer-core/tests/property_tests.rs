//! Property-based tests for distances, scheduling and conflict detection.
//!
//! # Invariants tested
//!
//! - **Distance symmetry:** `d(a, b) == d(b, a)` and `d(a, a) == 0`.
//! - **Forward time:** every stop is reached no earlier than the previous
//!   departure, and departure follows arrival by the dwell time.
//! - **Repeatable detection:** running the detector twice yields the same list.
//! - **Budget monotonicity:** adding a stop with positive cost never lowers
//!   the itinerary total that budget checks compare against, and raising the
//!   budget never adds a budget conflict.

mod proptest_support;

use geo::Coord;
use proptest::prelude::*;
use wayfarer_core::test_support::{InputOrderOptimizer, location, timestamp};
use wayfarer_core::{ConflictDetector, ConflictKind, ItinerarySession, Location, compute_distance};

use proptest_support::{coord_strategy, itinerary_in_order, locations_strategy};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: great-circle distance is symmetric and non-negative.
    #[test]
    fn distance_is_symmetric(a in coord_strategy(), b in coord_strategy()) {
        let there = compute_distance(a, b).expect("valid coordinates");
        let back = compute_distance(b, a).expect("valid coordinates");
        prop_assert!(there >= 0.0);
        prop_assert!((there - back).abs() < 1e-9, "{there} != {back}");
    }

    /// Property: a point is zero kilometres from itself.
    #[test]
    fn distance_to_self_is_zero(a in coord_strategy()) {
        prop_assert_eq!(compute_distance(a, a).expect("valid coordinate"), 0.0);
    }

    /// Property: the schedule never moves backwards in time.
    #[test]
    fn schedule_moves_forward(locations in locations_strategy(1, 8)) {
        let itinerary = itinerary_in_order(&locations, 500.0);
        let mut left_at = itinerary.start_time;
        for stop in &itinerary.stops {
            prop_assert!(stop.arrival >= left_at, "{} arrives before leaving the previous stop", stop.location.id());
            prop_assert_eq!(stop.departure - stop.arrival, stop.location.dwell());
            if let Some(leg) = stop.inbound.as_ref() {
                prop_assert!(leg.arrival() <= stop.arrival);
                prop_assert!(leg.duration() >= chrono::TimeDelta::zero());
            }
            left_at = stop.departure;
        }
    }

    /// Property: detection is a pure function of the itinerary.
    #[test]
    fn detection_is_repeatable(locations in locations_strategy(0, 8), budget in 0.0_f64..400.0) {
        let itinerary = itinerary_in_order(&locations, budget);
        let detector = ConflictDetector::default();
        let first = detector.detect(&itinerary);
        let second = detector.detect(&itinerary);
        prop_assert_eq!(&first, &second);
        let keys: Vec<_> = first.iter().map(|c| (c.kind, c.position)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }

    /// Property: adding a paid stop never lowers the total cost.
    #[test]
    fn adding_a_paid_stop_never_lowers_total_cost(
        locations in locations_strategy(0, 8),
        x in -0.05_f64..0.05,
        y in -0.05_f64..0.05,
        cost in 0.01_f64..80.0,
    ) {
        let mut session = ItinerarySession::new(
            InputOrderOptimizer,
            Coord { x: 0.0, y: 0.0 },
            timestamp(8, 0),
            100.0,
        )
        .expect("valid session");
        for stop in locations {
            session.add_stop(stop).expect("unique generated stop");
        }
        let before = session.snapshot().itinerary.total_cost();
        let extra: Location = location("extra", x, y)
            .cost(cost)
            .build()
            .expect("valid extra stop");
        let after = session.add_stop(extra).expect("new id").itinerary.total_cost();
        prop_assert!(after >= before, "{after} < {before}");
        prop_assert!(after >= before + cost - 1e-9, "{after} misses the stop cost {cost}");
    }

    /// Property: a larger budget never reports more budget conflicts.
    #[test]
    fn raising_budget_never_adds_budget_conflicts(
        locations in locations_strategy(1, 8),
        budget in 0.0_f64..300.0,
        extra in 0.0_f64..300.0,
    ) {
        let detector = ConflictDetector::default();
        let count = |budget: f64| {
            detector
                .detect(&itinerary_in_order(&locations, budget))
                .iter()
                .filter(|conflict| conflict.kind == ConflictKind::BudgetExceeded)
                .count()
        };
        let tight = count(budget);
        let loose = count(budget + extra);
        prop_assert!(tight <= 1);
        prop_assert!(loose <= tight);
    }
}
