//! Case dispatch
//!
//! Takes a case, either as settings already in memory or as a path to a JSON
//! file, picks the solver named by `solver_name`, and runs `solve()` then
//! `plot()`. Nothing is retried; the first error ends the run.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{RunnerError, RunnerResult};
use crate::registry::SolverRegistry;
use crate::settings::CaseSettings;
use crate::solver::SolveOutput;

/// Case description accepted by the dispatcher
#[derive(Debug, Clone)]
pub enum CaseInput {
    Settings(CaseSettings),
    Path(PathBuf),
}

impl From<CaseSettings> for CaseInput {
    fn from(settings: CaseSettings) -> Self {
        CaseInput::Settings(settings)
    }
}

impl From<PathBuf> for CaseInput {
    fn from(path: PathBuf) -> Self {
        CaseInput::Path(path)
    }
}

impl From<&Path> for CaseInput {
    fn from(path: &Path) -> Self {
        CaseInput::Path(path.to_path_buf())
    }
}

impl From<&str> for CaseInput {
    fn from(path: &str) -> Self {
        CaseInput::Path(PathBuf::from(path))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An object is read as settings, a string as a file path. Anything else is
/// rejected without touching the filesystem.
impl TryFrom<Value> for CaseInput {
    type Error = RunnerError;

    fn try_from(value: Value) -> RunnerResult<Self> {
        match value {
            Value::Object(_) => Ok(CaseInput::Settings(CaseSettings::from_json_value(value)?)),
            Value::String(path) => Ok(CaseInput::Path(PathBuf::from(path))),
            other => Err(RunnerError::UnsupportedInput(json_type_name(&other).to_string())),
        }
    }
}

/// Turn a case input into settings, reading the file for path inputs.
///
/// Relative paths inside the case are made absolute against the current
/// directory, since the solver process runs in its own work directory.
pub fn resolve_settings(input: CaseInput) -> RunnerResult<CaseSettings> {
    let mut settings = match input {
        CaseInput::Settings(settings) => settings,
        CaseInput::Path(path) => {
            tracing::info!("Loading case from {:?}", path);
            CaseSettings::from_json_file(&path)?
        }
    };
    settings.resolve_paths(&std::env::current_dir()?);
    Ok(settings)
}

pub struct Dispatcher {
    registry: SolverRegistry,
}

impl Dispatcher {
    pub fn new(registry: SolverRegistry) -> Self {
        Self { registry }
    }

    /// Solve the case and plot the result
    pub fn run(&self, input: impl Into<CaseInput>) -> RunnerResult<SolveOutput> {
        let settings = resolve_settings(input.into())?;
        let solver_name = settings.solver_name.clone();

        tracing::info!("Dispatching case to {}", solver_name);
        let mut solver = self.registry.create(&solver_name, settings)?;
        let output = solver.solve()?;
        // plot may also be done outside, e.g. in ParaView from the result files
        solver.plot()?;
        Ok(output)
    }
}
