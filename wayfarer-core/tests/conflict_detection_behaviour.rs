//! Behavioural tests for the conflict detector.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wayfarer_core::test_support::{location, planned_itinerary, single_stop_itinerary, timestamp};
use wayfarer_core::{Conflict, ConflictDetector, ConflictKind, Itinerary, Magnitude};

#[derive(Debug, Default)]
struct DetectionWorld {
    itinerary: RefCell<Option<Itinerary>>,
    runs: RefCell<Vec<Vec<Conflict>>>,
}

impl DetectionWorld {
    fn detect(&self) {
        let itinerary = self.itinerary.borrow();
        let itinerary = itinerary.as_ref().expect("itinerary should be prepared");
        let conflicts = ConflictDetector::default().detect(itinerary);
        self.runs.borrow_mut().push(conflicts);
    }

    fn last_run(&self) -> Vec<Conflict> {
        self.runs
            .borrow()
            .last()
            .cloned()
            .expect("detection should run before assertions")
    }

    fn prepare_costs(&self, costs: &[(&str, f64)], budget: f64) {
        let itinerary =
            planned_itinerary(costs, timestamp(10, 0), budget).expect("valid itinerary");
        self.itinerary.replace(Some(itinerary));
    }
}

#[fixture]
fn world() -> DetectionWorld {
    DetectionWorld::default()
}

#[given("a museum open from 09:00 to 10:00 with a 90 minute visit")]
fn given_short_window(world: &DetectionWorld) {
    let museum = location("museum", 0.0, 0.0)
        .dwell_minutes(90)
        .opening_hours("09:00-10:00".parse().expect("valid hours"));
    let itinerary = single_stop_itinerary(museum, timestamp(9, 0), 1000.0).expect("valid");
    world.itinerary.replace(Some(itinerary));
}

#[given("stops costing 100 and 50 against a budget of 100")]
fn given_overspend(world: &DetectionWorld) {
    world.prepare_costs(&[("hotel", 100.0), ("dinner", 50.0)], 100.0);
}

#[given("stops costing 10 and 20 against a budget of 100")]
fn given_affordable(world: &DetectionWorld) {
    world.prepare_costs(&[("gallery", 10.0), ("lunch", 20.0)], 100.0);
}

#[when("conflicts are detected")]
fn when_detected(world: &DetectionWorld) {
    world.detect();
}

#[when("conflicts are detected twice")]
fn when_detected_twice(world: &DetectionWorld) {
    world.detect();
    world.detect();
}

#[then("exactly one opening-hours conflict is reported")]
fn then_one_opening_conflict(world: &DetectionWorld) {
    let conflicts = world.last_run();
    assert_eq!(conflicts.len(), 1, "conflicts: {conflicts:?}");
    assert!(
        conflicts
            .iter()
            .all(|conflict| conflict.kind == ConflictKind::OpeningHours)
    );
}

#[then("the remediation reads \"shorten the visit to museum by 30 minutes\"")]
fn then_shorten_remediation(world: &DetectionWorld) {
    let conflicts = world.last_run();
    let conflict = conflicts.first().expect("one conflict");
    assert_eq!(
        conflict.suggested_remediation(),
        "shorten the visit to museum by 30 minutes"
    );
}

#[then("exactly one budget-exceeded conflict is reported")]
fn then_one_budget_conflict(world: &DetectionWorld) {
    let conflicts = world.last_run();
    let budget: Vec<_> = conflicts
        .iter()
        .filter(|conflict| conflict.kind == ConflictKind::BudgetExceeded)
        .collect();
    assert_eq!(budget.len(), 1);
}

#[then("the overspend is 50")]
fn then_overspend(world: &DetectionWorld) {
    let conflicts = world.last_run();
    let conflict = conflicts
        .iter()
        .find(|conflict| conflict.kind == ConflictKind::BudgetExceeded)
        .expect("budget conflict");
    assert_eq!(conflict.magnitude, Magnitude::Money(50.0));
    assert_eq!(conflict.suggested_remediation(), "increase budget by 50.00");
}

#[then("both runs report the same conflicts")]
fn then_repeatable(world: &DetectionWorld) {
    let runs = world.runs.borrow();
    let [first, second] = runs.as_slice() else {
        panic!("expected two detection runs, got {}", runs.len());
    };
    assert_eq!(first, second);
}

#[then("no conflicts are reported")]
fn then_none(world: &DetectionWorld) {
    assert!(world.last_run().is_empty());
}

#[scenario(path = "tests/features/conflict_detection.feature", index = 0)]
fn short_opening_window(world: DetectionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/conflict_detection.feature", index = 1)]
fn spending_over_budget(world: DetectionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/conflict_detection.feature", index = 2)]
fn detection_is_repeatable(world: DetectionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/conflict_detection.feature", index = 3)]
fn feasible_walking_tour(world: DetectionWorld) {
    let _ = world;
}
