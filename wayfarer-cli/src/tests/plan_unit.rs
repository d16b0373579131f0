//! Focused unit tests covering plan configuration, request loading and reports.

use super::helpers::{two_stop_request, workspace, write_request, write_utf8};
use super::*;
use crate::plan::{
    PlanArgs, PlanConfig, PlanOptimizerBuilder, PlanReport, config_from_layers_for_test,
    run_plan_with,
};
use camino::Utf8PathBuf;
use rstest::rstest;
use wayfarer_core::test_support::InputOrderOptimizer;
use wayfarer_core::{
    CancellationToken, ConflictKind, Itinerary, OptimizeError, OptimizeRequest,
    OptimizeRequestValidationError, Optimizer,
};

struct InputOrderBuilder;

impl PlanOptimizerBuilder for InputOrderBuilder {
    fn build(&self, _config: &PlanConfig) -> Result<Box<dyn Optimizer>, CliError> {
        Ok(Box::new(InputOrderOptimizer))
    }
}

struct CancelledOptimizer;

impl Optimizer for CancelledOptimizer {
    fn optimize(
        &self,
        _request: &OptimizeRequest,
        _cancel: &CancellationToken,
    ) -> Result<Itinerary, OptimizeError> {
        Err(OptimizeError::Cancelled)
    }
}

struct CancelledBuilder;

impl PlanOptimizerBuilder for CancelledBuilder {
    fn build(&self, _config: &PlanConfig) -> Result<Box<dyn Optimizer>, CliError> {
        Ok(Box::new(CancelledOptimizer))
    }
}

fn args_for(request_path: &Utf8PathBuf) -> PlanArgs {
    PlanArgs {
        request_path: Some(request_path.clone()),
        ..PlanArgs::default()
    }
}

fn plan_to_buffer(
    args: PlanArgs,
    builder: &dyn PlanOptimizerBuilder,
) -> (Result<(), CliError>, Vec<u8>) {
    let mut buffer = Vec::new();
    let outcome = run_plan_with(args, builder, &mut buffer);
    (outcome, buffer)
}

fn decode(buffer: &[u8]) -> PlanReport {
    serde_json::from_slice(buffer).expect("output should be a JSON plan report")
}

#[rstest]
fn converting_plan_without_request_errors() {
    let err = PlanConfig::try_from(PlanArgs::default()).expect_err("missing request");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(env, ENV_PLAN_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn report_keeps_optimizer_order_and_lists_conflicts() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_request(&request_path, &two_stop_request(100.0));

    let (outcome, buffer) = plan_to_buffer(args_for(&request_path), &InputOrderBuilder);
    outcome.expect("plan should succeed");

    let report = decode(&buffer);
    let order: Vec<String> = report
        .itinerary
        .order()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(order, ["gallery", "bakery"]);
    assert!(report.conflicts.is_empty());
    assert_eq!(report.summary.stop_count, 2);
    assert_eq!(report.summary, report.itinerary.summary());
}

#[rstest]
fn budget_override_surfaces_budget_conflict() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_request(&request_path, &two_stop_request(100.0));

    let args = PlanArgs {
        budget: Some(10.0),
        ..args_for(&request_path)
    };
    let (outcome, buffer) = plan_to_buffer(args, &InputOrderBuilder);
    outcome.expect("plan should succeed");

    let report = decode(&buffer);
    assert_eq!(report.itinerary.budget, 10.0);
    assert!(
        report
            .conflicts
            .iter()
            .any(|conflict| conflict.kind == ConflictKind::BudgetExceeded)
    );
}

#[rstest]
fn negative_budget_override_is_rejected() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_request(&request_path, &two_stop_request(100.0));

    let args = PlanArgs {
        budget: Some(-1.0),
        ..args_for(&request_path)
    };
    let (outcome, buffer) = plan_to_buffer(args, &InputOrderBuilder);
    match outcome.expect_err("negative budget") {
        CliError::InvalidRequest { path, source } => {
            assert_eq!(path, request_path);
            assert_eq!(source, OptimizeRequestValidationError::InvalidBudget(-1.0));
        }
        other => panic!("expected InvalidRequest, found {other:?}"),
    }
    assert!(buffer.is_empty());
}

#[rstest]
fn invalid_json_reports_parse_error() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_utf8(&request_path, b"{ not valid json");

    let (outcome, _) = plan_to_buffer(args_for(&request_path), &InputOrderBuilder);
    match outcome.expect_err("invalid json") {
        CliError::ParseInput { field, path, .. } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(path, request_path);
        }
        other => panic!("expected ParseInput, found {other:?}"),
    }
}

#[rstest]
#[case::absent(false)]
#[case::directory(true)]
fn unusable_request_path_is_reported(#[case] as_directory: bool) {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    if as_directory {
        std::fs::create_dir(request_path.as_std_path()).expect("request directory");
    }

    let (outcome, _) = plan_to_buffer(args_for(&request_path), &InputOrderBuilder);
    match outcome.expect_err("unusable path") {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_PLAN_REQUEST);
            assert_eq!(path, request_path);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn optimizer_failures_are_wrapped() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_request(&request_path, &two_stop_request(100.0));

    let (outcome, _) = plan_to_buffer(args_for(&request_path), &CancelledBuilder);
    match outcome.expect_err("cancelled optimizer") {
        CliError::Optimize { source } => assert_eq!(source, OptimizeError::Cancelled),
        other => panic!("expected Optimize, found {other:?}"),
    }
}

#[rstest]
fn output_path_receives_the_report() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    let output = root.join("plans/today.json");
    write_request(&request_path, &two_stop_request(100.0));

    let args = PlanArgs {
        output: Some(output.clone()),
        ..args_for(&request_path)
    };
    let (outcome, buffer) = plan_to_buffer(args, &InputOrderBuilder);
    outcome.expect("plan should succeed");
    assert!(buffer.is_empty());

    let written = wayfarer_fs::read_utf8_file(&output).expect("report file");
    let report: PlanReport = serde_json::from_str(&written).expect("report JSON");
    assert_eq!(report.itinerary.len(), 2);
}

#[cfg(feature = "solver-local")]
#[rstest]
fn default_builder_orders_nearest_first() {
    use crate::plan::DefaultPlanOptimizerBuilder;

    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_request(&request_path, &two_stop_request(100.0));

    let args = PlanArgs {
        max_evaluations: Some(50),
        ..args_for(&request_path)
    };
    let (outcome, buffer) = plan_to_buffer(args, &DefaultPlanOptimizerBuilder);
    outcome.expect("plan should succeed");
    let report = decode(&buffer);
    let order: Vec<String> = report
        .itinerary
        .order()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(order, ["bakery", "gallery"]);
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let (_tmp, root) = workspace();
    let env_request = root.join("from-env.json");
    let cli_output = root.join("from-cli.json");

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "request_path": root.join("from-file.json").as_str(),
            "max_evaluations": 25,
            "budget": 80.0,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": env_request.as_str(),
        "budget": 60.0,
    }));
    composer.push_cli(json!({ "output": cli_output.as_str() }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, env_request);
    assert_eq!(config.output, Some(cli_output));
    assert_eq!(config.budget, Some(60.0));
    assert_eq!(config.max_evaluations, Some(25));
}
