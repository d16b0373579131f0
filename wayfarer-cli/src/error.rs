//! Error types emitted by the Wayfarer CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wayfarer_core::{OptimizeError, OptimizeRequestValidationError};

/// Errors emitted by the Wayfarer CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// The terminal logger could not be installed.
    #[error("failed to install logger: {0}")]
    InstallLogger(#[source] log::SetLoggerError),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading an input file failed.
    #[error("failed to read {field} at {path:?}: {source}")]
    ReadInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An input file is not valid JSON for its type.
    #[error("failed to parse {field} JSON at {path:?}: {source}")]
    ParseInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The trip request failed validation.
    #[error("request in {path:?} failed validation: {source}")]
    InvalidRequest {
        path: Utf8PathBuf,
        #[source]
        source: OptimizeRequestValidationError,
    },
    /// The optimizer rejected the request.
    #[error("optimizer failed: {source}")]
    Optimize {
        #[source]
        source: OptimizeError,
    },
    /// Serializing the report failed.
    #[error("failed to serialize report: {0}")]
    SerializeReport(#[source] serde_json::Error),
    /// Writing the report to standard output failed.
    #[error("failed to write report: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing the report file failed.
    #[error("failed to write report to {path:?}: {source}")]
    WriteOutputFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
