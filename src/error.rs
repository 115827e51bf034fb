//! Error types for the case runner

use thiserror::Error;

/// Main error type for case building and dispatch
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("{0} is not supported as case input, only path string or settings object")]
    UnsupportedInput(String),

    #[error("Solver name : {0} is not supported")]
    UnknownSolver(String),

    #[error("Not implemented: {0}")]
    Unimplemented(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Solver '{0}' has not been run - call solve() first")]
    NotSolved(String),

    #[error("External solver failed: {0}")]
    ExternalFailure(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;
