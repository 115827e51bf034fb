//! External solver process
//!
//! The heavy lifting (meshing, assembly, the linear/nonlinear solve and
//! plotting) happens in the external framework. `ExternalSolver` hands it a
//! case file in a per-job work directory and reads back the result document:
//!
//! ```text
//! <program> <args..> solve <solver_name> case.json result.json
//! <program> <args..> plot  <solver_name> case.json result.json [--interactive]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;
use uuid::Uuid;

use crate::config::RunnerConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::settings::CaseSettings;
use crate::solver::{SolveOutput, Solver};

pub const CASE_FILE: &str = "case.json";
pub const RESULT_FILE: &str = "result.json";

enum WorkDir {
    /// Removed when the solver is dropped
    Temporary(TempDir),
    Persistent(PathBuf),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            WorkDir::Temporary(dir) => dir.path(),
            WorkDir::Persistent(path) => path,
        }
    }
}

pub struct ExternalSolver {
    name: String,
    settings: CaseSettings,
    config: RunnerConfig,
    work_dir: Option<WorkDir>,
    last_output: Option<SolveOutput>,
}

impl ExternalSolver {
    /// Build a solver handle. Settings are validated here so that
    /// unimplemented boundary conditions fail before any process starts.
    pub fn new(
        name: impl Into<String>,
        settings: CaseSettings,
        config: RunnerConfig,
    ) -> RunnerResult<Self> {
        let name = name.into();
        settings.validate()?;
        if settings.solver_name != name {
            tracing::warn!(
                "Settings select solver '{}' but are run by '{}'",
                settings.solver_name,
                name
            );
        }
        Ok(Self {
            name,
            settings,
            config,
            work_dir: None,
            last_output: None,
        })
    }

    pub fn last_output(&self) -> Option<&SolveOutput> {
        self.last_output.as_ref()
    }

    fn prepare_work_dir(&self, job_id: &Uuid) -> RunnerResult<WorkDir> {
        match &self.config.output_dir {
            Some(root) => {
                let path = root.join(job_id.to_string());
                fs::create_dir_all(&path)?;
                Ok(WorkDir::Persistent(path))
            }
            None => Ok(WorkDir::Temporary(TempDir::new()?)),
        }
    }

    fn run_external(&self, action: &str, work_path: &Path, extra: &[&str]) -> RunnerResult<Output> {
        let mut cmd = self.config.command();
        cmd.arg(action)
            .arg(&self.name)
            .arg(CASE_FILE)
            .arg(RESULT_FILE)
            .args(extra)
            .current_dir(work_path);

        tracing::debug!("Running command: {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            RunnerError::ExternalFailure(format!(
                "Failed to execute {}: {}",
                self.config.solver_program, e
            ))
        })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::debug!("[{}] {}", self.name, line);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            tracing::error!(
                "{} {} failed. Stderr: {}\nStdout: {}",
                self.name,
                action,
                stderr,
                stdout
            );
            return Err(RunnerError::ExternalFailure(format!(
                "{} {} exited with status {}",
                self.name, action, output.status
            )));
        }

        Ok(output)
    }

    fn maybe_export_debug_file(&self, path: &Path, job_id: &Uuid, stem: &str) {
        let Some(dest_dir) = &self.config.debug_export else {
            return;
        };
        if let Err(err) = fs::create_dir_all(dest_dir) {
            tracing::warn!("Failed to create debug export directory {:?}: {}", dest_dir, err);
            return;
        }

        let dest_file = dest_dir.join(format!("{}_{}.json", stem, job_id));
        if let Err(err) = fs::copy(path, &dest_file) {
            tracing::warn!("Failed to export debug file {:?}: {}", dest_file, err);
        } else {
            tracing::info!("Exported debug file to {:?}", dest_file);
        }
    }
}

impl Solver for ExternalSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn settings(&self) -> &CaseSettings {
        &self.settings
    }

    fn solve(&mut self) -> RunnerResult<SolveOutput> {
        let job_id = Uuid::new_v4();
        let work_dir = self.prepare_work_dir(&job_id)?;
        let work_path = work_dir.path().to_path_buf();

        tracing::info!("Starting {} job {} in {:?}", self.name, job_id, work_path);

        let case_path = work_path.join(CASE_FILE);
        self.settings.write_json_file(&case_path)?;
        self.maybe_export_debug_file(&case_path, &job_id, "case");

        self.run_external("solve", &work_path, &[])?;

        let result_path = work_path.join(RESULT_FILE);
        if !result_path.exists() {
            return Err(RunnerError::AnalysisFailed(format!(
                "{} produced no {}",
                self.name, RESULT_FILE
            )));
        }
        let content = fs::read_to_string(&result_path)?;
        let result: serde_json::Value = serde_json::from_str(&content)?;
        self.maybe_export_debug_file(&result_path, &job_id, "result");

        tracing::info!("{} job {} finished", self.name, job_id);

        let output = SolveOutput::new(job_id, self.name.clone(), work_path, result);
        self.work_dir = Some(work_dir);
        self.last_output = Some(output.clone());
        Ok(output)
    }

    fn plot(&self) -> RunnerResult<()> {
        let work_dir = match (&self.work_dir, &self.last_output) {
            (Some(dir), Some(_)) => dir,
            _ => return Err(RunnerError::NotSolved(self.name.clone())),
        };

        tracing::info!("Plotting {} result", self.name);
        let extra: &[&str] = if self.config.interactive {
            &["--interactive"]
        } else {
            &[]
        };
        self.run_external("plot", work_dir.path(), extra)?;
        Ok(())
    }
}
