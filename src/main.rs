use std::path::PathBuf;

use clap::Parser;
use fenics_runner::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Case run when no input is given, relative to the solver suite folder
const DEFAULT_CASE: &str = "./data/TestHeatTransfer.json";

#[derive(Parser, Debug)]
#[command(name = "fenics-runner", version, about = "Run a FEniCS solver case")]
struct Args {
    /// Path to a JSON case file
    case_input: Option<PathBuf>,

    /// External solver launcher, overrides FENICS_SOLVER_PATH
    #[arg(long)]
    solver_path: Option<String>,

    /// Keep plot windows open
    #[arg(long)]
    interactive: bool,

    /// Print the registered solver names and exit
    #[arg(long)]
    list_solvers: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fenics_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::debug!("{:?}", args);

    let mut config = RunnerConfig::from_env();
    if let Some(path) = args.solver_path {
        config = config.with_solver_program(path);
    }
    if args.interactive {
        config = config.with_interactive(true);
    }

    let registry = SolverRegistry::with_external_solvers(&config);
    if args.list_solvers {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    config.check_solver_available();

    match args.case_input {
        Some(case_input) => {
            let dispatcher = Dispatcher::new(registry);
            let output = dispatcher.run(case_input)?;
            tracing::info!("Job {} finished at {}", output.job_id, output.finished_at);
        }
        None => {
            tracing::warn!(
                "Not enough input argument, usage: `fenics-runner <case_input>`; running {} instead",
                DEFAULT_CASE
            );
            let settings = CaseSettings::from_json_file(DEFAULT_CASE)?;
            let solver_name = settings.solver_name.clone();
            let mut solver = registry.create(&solver_name, settings)?;
            tracing::info!("{}", solver.describe());
            solver.solve()?;
            solver.plot()?;
        }
    }

    Ok(())
}
