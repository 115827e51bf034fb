//! Runtime configuration
//!
//! Everything here comes from the environment so that the same binary works
//! from a source checkout and from a cluster job script.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Program invoked when `FENICS_SOLVER_PATH` is not set
pub const DEFAULT_SOLVER_PROGRAM: &str = "fenics-solver";

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// External solver executable
    pub solver_program: String,
    /// Arguments placed before the runner's own arguments
    pub solver_args: Vec<String>,
    /// Keep plot windows open instead of rendering headless
    pub interactive: bool,
    /// Persistent root for per-job work directories. Temporary directories
    /// are used when unset.
    pub output_dir: Option<PathBuf>,
    /// Directory receiving copies of case and result files
    pub debug_export: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            solver_program: DEFAULT_SOLVER_PROGRAM.to_string(),
            solver_args: Vec::new(),
            interactive: false,
            output_dir: None,
            debug_export: None,
        }
    }
}

fn flag(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

// Jobs run from their own work directory, so relative paths would break
fn absolute_program(program: String) -> String {
    if program.contains(std::path::MAIN_SEPARATOR) {
        std::fs::canonicalize(&program)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or(program)
    } else {
        // bare names are looked up on PATH
        program
    }
}

fn absolute_arg(arg: String) -> String {
    let path = Path::new(&arg);
    if path.is_relative() && path.exists() {
        std::fs::canonicalize(path)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or(arg)
    } else {
        arg
    }
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup using the `FENICS_*` variable names
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let solver_program = lookup("FENICS_SOLVER_PATH").unwrap_or_else(|| {
            // Prefer a repo-local solver launcher if present
            if Path::new("./bin/fenics-solver").exists() {
                "./bin/fenics-solver".to_string()
            } else {
                DEFAULT_SOLVER_PROGRAM.to_string()
            }
        });

        let solver_args: Vec<String> = lookup("FENICS_SOLVER_ARGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let mut config = Self::default()
            .with_solver_program(solver_program)
            .with_solver_args(solver_args)
            .with_interactive(flag(lookup("FENICS_INTERACTIVE")));
        if let Some(dir) = lookup("FENICS_OUTPUT_DIR") {
            config = config.with_output_dir(dir);
        }
        if let Some(dir) = lookup("FENICS_DEBUG_EXPORT") {
            config = config.with_debug_export(dir);
        }
        config
    }

    pub fn with_solver_program(mut self, program: impl Into<String>) -> Self {
        self.solver_program = absolute_program(program.into());
        self
    }

    /// Arguments naming an existing relative path are made absolute
    pub fn with_solver_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.solver_args = args.into_iter().map(|a| absolute_arg(a.into())).collect();
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_debug_export(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_export = Some(dir.into());
        self
    }

    /// Command with the configured program and leading arguments
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.solver_program);
        cmd.args(&self.solver_args);
        cmd
    }

    /// Probe the solver program. Only logs; a missing program shows up as an
    /// error on the first solve.
    pub fn check_solver_available(&self) -> bool {
        match self.command().arg("--version").output() {
            Ok(_) => {
                tracing::info!("External solver found: {}", self.solver_program);
                true
            }
            Err(e) => {
                tracing::warn!("External solver {} not accessible: {}", self.solver_program, e);
                tracing::warn!("Set FENICS_SOLVER_PATH to the solver launcher");
                false
            }
        }
    }
}
