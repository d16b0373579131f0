//! Check command implementation for the Wayfarer CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use wayfarer_core::{Conflict, ConflictDetector, Itinerary, ItinerarySummary};

use crate::{
    ARG_CHECK_ITINERARY, ARG_OUTPUT, CliError, ENV_CHECK_ITINERARY, emit_report, load_json,
    require_existing,
};

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Scan a JSON-encoded itinerary for opening-hours, budget, \
                 overlap, travel-time and rush-hour conflicts without \
                 reordering it.",
    about = "Report the conflicts in an itinerary"
)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct CheckArgs {
    /// Path to a JSON file containing an Itinerary.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) itinerary_path: Option<Utf8PathBuf>,
    /// Write the report to this file instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

/// Resolved `check` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckConfig {
    pub(crate) itinerary_path: Utf8PathBuf,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let itinerary_path = args.itinerary_path.ok_or(CliError::MissingArgument {
            field: ARG_CHECK_ITINERARY,
            env: ENV_CHECK_ITINERARY,
        })?;
        Ok(Self {
            itinerary_path,
            output: args.output,
        })
    }
}

/// JSON document printed by `check`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CheckReport {
    pub(crate) conflicts: Vec<Conflict>,
    pub(crate) summary: ItinerarySummary,
}

pub(super) fn run_check(args: CheckArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = CheckConfig::try_from(merged)?;
    let report = execute_check(&config, &ConflictDetector::default())?;
    emit_report(&report, config.output.as_deref(), writer)
}

pub(super) fn execute_check(
    config: &CheckConfig,
    detector: &ConflictDetector,
) -> Result<CheckReport, CliError> {
    require_existing(&config.itinerary_path, ARG_CHECK_ITINERARY)?;
    let itinerary: Itinerary = load_json(&config.itinerary_path, ARG_CHECK_ITINERARY)?;
    let conflicts = detector.detect(&itinerary);
    if !conflicts.is_empty() {
        log::warn!(
            "{} conflicts found in {}",
            conflicts.len(),
            config.itinerary_path
        );
    }
    Ok(CheckReport {
        conflicts,
        summary: itinerary.summary(),
    })
}
