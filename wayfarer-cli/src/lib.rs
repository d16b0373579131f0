//! Command-line interface for planning and checking Wayfarer itineraries.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::Write;

mod check;
mod error;
mod plan;

pub use error::CliError;

use check::{CheckArgs, run_check};
use plan::{PlanArgs, run_plan};

pub(crate) const ARG_PLAN_REQUEST: &str = "request";
pub(crate) const ARG_CHECK_ITINERARY: &str = "itinerary";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_BUDGET: &str = "budget";
pub(crate) const ARG_MAX_EVALUATIONS: &str = "max-evaluations";
pub(crate) const ENV_PLAN_REQUEST: &str = "WAYFARER_CMDS_PLAN_REQUEST_PATH";
pub(crate) const ENV_CHECK_ITINERARY: &str = "WAYFARER_CMDS_CHECK_ITINERARY_PATH";
const ENV_LOG_LEVEL: &str = "WAYFARER_LOG_LEVEL";

/// Run the Wayfarer CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.log_level)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Plan(args) => run_plan(args, &mut stdout),
        Command::Check(args) => run_check(args, &mut stdout),
    }
}

fn init_logging(level: LevelFilter) -> Result<(), CliError> {
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .map_err(CliError::InstallLogger)
}

#[derive(Debug, Parser)]
#[command(
    name = "wayfarer",
    about = "Plan day itineraries and check them for conflicts",
    version
)]
struct Cli {
    /// Log verbosity written to standard error.
    #[arg(
        long = "log-level",
        env = ENV_LOG_LEVEL,
        default_value = "warn",
        global = true,
        value_name = "level"
    )]
    log_level: LevelFilter,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Order a trip request and report the itinerary with its conflicts.
    Plan(PlanArgs),
    /// Detect conflicts in an existing itinerary.
    Check(CheckArgs),
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match wayfarer_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Decode the JSON document at `path`.
pub(crate) fn load_json<T: DeserializeOwned>(
    path: &Utf8Path,
    field: &'static str,
) -> Result<T, CliError> {
    let contents = wayfarer_fs::read_utf8_file(path).map_err(|source| CliError::ReadInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// Write `report` as pretty JSON to `output`, or to `writer` when no file is given.
pub(crate) fn emit_report<T: Serialize>(
    report: &T,
    output: Option<&Utf8Path>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut payload = serde_json::to_string_pretty(report).map_err(CliError::SerializeReport)?;
    payload.push('\n');
    match output {
        Some(path) => {
            wayfarer_fs::write_utf8_file(path, &payload).map_err(|source| {
                CliError::WriteOutputFile {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            log::info!("wrote report to {path}");
            Ok(())
        }
        None => writer
            .write_all(payload.as_bytes())
            .map_err(CliError::WriteOutput),
    }
}

#[cfg(test)]
mod tests;
