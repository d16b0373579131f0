//! Plan command implementation for the Wayfarer CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use wayfarer_core::{
    CancellationToken, Conflict, Itinerary, ItinerarySummary, OptimizeRequest, Optimizer,
    detect_conflicts,
};

use crate::{
    ARG_BUDGET, ARG_MAX_EVALUATIONS, ARG_OUTPUT, ARG_PLAN_REQUEST, CliError, ENV_PLAN_REQUEST,
    emit_report, load_json, require_existing,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Order the stops of a JSON-encoded trip request, time every \
                 visit and report the itinerary together with its conflicts \
                 and summary statistics.",
    about = "Plan an itinerary from a trip request"
)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing an OptimizeRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Write the plan to this file instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Replace the budget stored in the request.
    #[arg(long = ARG_BUDGET, value_name = "amount", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) budget: Option<f64>,
    /// Upper bound on 2-opt evaluations.
    #[arg(long = ARG_MAX_EVALUATIONS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_evaluations: Option<usize>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Report destination; standard output when absent.
    pub(crate) output: Option<Utf8PathBuf>,
    /// Budget replacing the one in the request.
    pub(crate) budget: Option<f64>,
    /// Evaluation cap handed to the optimizer.
    pub(crate) max_evaluations: Option<usize>,
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;
        Ok(Self {
            request_path,
            output: args.output,
            budget: args.budget,
            max_evaluations: args.max_evaluations,
        })
    }
}

/// JSON document printed by `plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlanReport {
    pub(crate) itinerary: Itinerary,
    pub(crate) conflicts: Vec<Conflict>,
    pub(crate) summary: ItinerarySummary,
}

impl From<Itinerary> for PlanReport {
    fn from(itinerary: Itinerary) -> Self {
        Self {
            conflicts: detect_conflicts(&itinerary),
            summary: itinerary.summary(),
            itinerary,
        }
    }
}

/// Builds an optimizer for the current plan invocation.
pub(super) trait PlanOptimizerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Optimizer>, CliError>;
}

pub(super) struct DefaultPlanOptimizerBuilder;

impl PlanOptimizerBuilder for DefaultPlanOptimizerBuilder {
    #[cfg(feature = "solver-local")]
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Optimizer>, CliError> {
        use wayfarer_core::SegmentEstimator;
        use wayfarer_solver_local::{LocalSearchConfig, LocalSearchOptimizer};

        let solver_config = LocalSearchConfig {
            max_evaluations: config.max_evaluations,
            ..LocalSearchConfig::default()
        };
        Ok(Box::new(LocalSearchOptimizer::with_config(
            SegmentEstimator::default(),
            solver_config,
        )))
    }

    #[cfg(not(feature = "solver-local"))]
    fn build(&self, _config: &PlanConfig) -> Result<Box<dyn Optimizer>, CliError> {
        Err(CliError::MissingFeature {
            feature: "solver-local",
            action: "planning",
        })
    }
}

pub(super) fn run_plan(args: PlanArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    run_plan_with(args, &DefaultPlanOptimizerBuilder, writer)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlanOptimizerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let report = execute_plan(&config, builder)?;
    emit_report(&report, config.output.as_deref(), writer)
}

fn execute_plan(
    config: &PlanConfig,
    builder: &dyn PlanOptimizerBuilder,
) -> Result<PlanReport, CliError> {
    require_existing(&config.request_path, ARG_PLAN_REQUEST)?;
    let mut request: OptimizeRequest = load_json(&config.request_path, ARG_PLAN_REQUEST)?;
    if let Some(budget) = config.budget {
        request.budget = budget;
    }
    request
        .validate_detailed()
        .map_err(|source| CliError::InvalidRequest {
            path: config.request_path.clone(),
            source,
        })?;

    let optimizer = builder.build(config)?;
    let itinerary = optimizer
        .optimize(&request, &CancellationToken::new())
        .map_err(|source| CliError::Optimize { source })?;
    let report = PlanReport::from(itinerary);
    log::info!(
        "planned {} stops with {} conflicts",
        report.itinerary.len(),
        report.conflicts.len()
    );
    Ok(report)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
