//! Solver contract

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RunnerResult;
use crate::settings::CaseSettings;

/// Outcome of one `solve()` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutput {
    pub job_id: Uuid,
    pub solver_name: String,
    /// Directory holding the case file and the solver's result document.
    /// A temporary directory is removed together with the solver that made
    /// it; set an output dir in `RunnerConfig` to keep the files.
    pub work_dir: PathBuf,
    /// Result document written by the solver
    pub result: serde_json::Value,
    pub finished_at: String,
}

impl SolveOutput {
    pub fn new(
        job_id: Uuid,
        solver_name: impl Into<String>,
        work_dir: PathBuf,
        result: serde_json::Value,
    ) -> Self {
        Self {
            job_id,
            solver_name: solver_name.into(),
            work_dir,
            result,
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A PDE solver implementation driven by the runner.
///
/// Instances are built from a `CaseSettings` that they own for their whole
/// life. `solve` runs the computation and keeps the result so that `plot`
/// can show it afterwards.
pub trait Solver {
    /// Registry name of the implementation
    fn name(&self) -> &str;

    fn settings(&self) -> &CaseSettings;

    fn solve(&mut self) -> RunnerResult<SolveOutput>;

    /// Visualize the last result. Fails with `NotSolved` before `solve`.
    fn plot(&self) -> RunnerResult<()>;

    fn describe(&self) -> String {
        format!("{} solver\n{}", self.name(), self.settings().describe())
    }
}
