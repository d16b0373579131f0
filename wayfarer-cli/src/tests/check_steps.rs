//! Behaviour-driven step definitions driving the check CLI scenarios.

use super::helpers::{over_budget_itinerary, workspace, write_itinerary};
use super::*;
use crate::check::{CheckReport, run_check};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;
use wayfarer_core::ConflictKind;
use wayfarer_core::test_support::{planned_itinerary, timestamp};

#[derive(Debug)]
struct CheckWorld {
    _tmp: TempDir,
    itinerary_path: Utf8PathBuf,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CheckWorld {
    fn new() -> Self {
        let (tmp, root) = workspace();
        Self {
            _tmp: tmp,
            itinerary_path: root.join("itinerary.json"),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn report(&self) -> CheckReport {
        assert!(matches!(self.result.borrow().as_ref(), Some(Ok(()))));
        serde_json::from_slice(&self.stdout.borrow()).expect("output should be a check report")
    }
}

#[fixture]
fn world() -> CheckWorld {
    CheckWorld::new()
}

#[given("an itinerary over its budget exists on disk")]
fn over_budget_on_disk(#[from(world)] world: &CheckWorld) {
    write_itinerary(&world.itinerary_path, &over_budget_itinerary());
}

#[given("an itinerary within its budget exists on disk")]
fn within_budget_on_disk(#[from(world)] world: &CheckWorld) {
    let itinerary = planned_itinerary(&[("tower", 20.0), ("market", 15.0)], timestamp(10, 0), 100.0)
        .expect("valid itinerary");
    write_itinerary(&world.itinerary_path, &itinerary);
}

#[given("no itinerary exists on disk")]
fn no_itinerary(#[from(world)] world: &CheckWorld) {
    let _ = world;
}

#[when("I run the check command")]
fn run_check_command(#[from(world)] world: &CheckWorld) {
    let invocation = ["wayfarer", "check", world.itinerary_path.as_str()];
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Check(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_check(args, &mut *buffer)
        }
        Command::Plan(_) => panic!("expected check command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the report lists a budget-exceeded conflict")]
fn lists_budget_conflict(#[from(world)] world: &CheckWorld) {
    let report = world.report();
    assert!(
        report
            .conflicts
            .iter()
            .any(|conflict| conflict.kind == ConflictKind::BudgetExceeded)
    );
    assert!(report.summary.budget_remaining < 0.0);
}

#[then("the report lists no conflicts")]
fn lists_no_conflicts(#[from(world)] world: &CheckWorld) {
    let report = world.report();
    assert!(report.conflicts.is_empty(), "{:?}", report.conflicts);
    assert_eq!(report.summary.stop_count, 2);
}

#[then("the command fails because the itinerary file is missing")]
fn fails_missing_file(#[from(world)] world: &CheckWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingSourceFile { field, .. } => assert_eq!(*field, ARG_CHECK_ITINERARY),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[scenario(path = "tests/features/check_command.feature", index = 0)]
fn check_budget_overrun(#[from(world)] world: CheckWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/check_command.feature", index = 1)]
fn check_feasible_itinerary(#[from(world)] world: CheckWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/check_command.feature", index = 2)]
fn check_missing_itinerary(#[from(world)] world: CheckWorld) {
    let _ = world;
}
