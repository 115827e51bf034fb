//! fenics-runner - case building and solver dispatch for an external FEniCS
//! solver suite
//!
//! This crate does no numerics of its own. It provides:
//! - a typed settings model for solve cases (material, function space,
//!   boundary conditions, thermal/body sources, transient options)
//! - a registry mapping solver names to implementations
//! - a dispatcher that loads a case and runs `solve()` then `plot()`
//! - the linear elasticity test case generator
//!
//! ## Example
//! ```no_run
//! use fenics_runner::prelude::*;
//!
//! let config = RunnerConfig::from_env();
//! let dispatcher = Dispatcher::new(SolverRegistry::with_external_solvers(&config));
//! let output = dispatcher.run("data/TestHeatTransfer.json").unwrap();
//! println!("job {} done", output.job_id);
//! ```

pub mod boundary;
pub mod case_builder;
pub mod config;
pub mod dispatcher;
pub mod elasticity;
pub mod error;
pub mod executor;
pub mod registry;
pub mod settings;
pub mod solver;

pub mod prelude {
    pub use crate::boundary::{
        Axis, AxisValue, BoundaryCondition, BoundaryConditions, BoundaryKind, BoundaryValue, Region,
        TimeFunction,
    };
    pub use crate::case_builder::ElasticityTestCase;
    pub use crate::config::RunnerConfig;
    pub use crate::dispatcher::{resolve_settings, CaseInput, Dispatcher};
    pub use crate::elasticity::{LinearElasticitySolver, NodalVonMises};
    pub use crate::error::{RunnerError, RunnerResult};
    pub use crate::executor::ExternalSolver;
    pub use crate::registry::{SolverFactory, SolverRegistry};
    pub use crate::settings::{
        CaseSettings, FieldExpression, FieldRank, FunctionSpace, Material, Mesh, SolverSettings,
        TransientSettings,
    };
    pub use crate::solver::{SolveOutput, Solver};
}
