//! Engine-level errors.
//!
//! Per-test failures are never errors; they become events. An [`EngineError`] means the run as a
//! whole could not be carried out and is reported as the engine root's failure.

use miette::Diagnostic;
use thiserror::Error;
use vintage_core::{Cause, TreeError};
use vintage_legacy::RunnerError;

/// Errors that fail the whole engine run
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("failed to build the descriptor tree: {0}")]
    #[diagnostic(code(vintage::discovery::tree))]
    Tree(#[from] TreeError),

    #[error("legacy runner for `{class}` failed: {source}")]
    #[diagnostic(
        code(vintage::execution::runner),
        help("the runner itself failed; tests that already reported keep their results")
    )]
    Runner { class: String, source: RunnerError },

    #[error("legacy runner reported `{legacy_id}`, which was not discovered")]
    #[diagnostic(
        code(vintage::bridge::unknown_description),
        help("a runner's static description must cover every test it runs")
    )]
    UnknownDescription { legacy_id: String },
}

impl EngineError {
    /// The cause reported on the engine root.
    pub fn to_cause(&self) -> Cause {
        Cause::new(self.to_string())
    }
}
