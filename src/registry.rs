//! Solver registry
//!
//! Maps solver names to constructors. The dispatcher only ever talks to the
//! registry, so adding a solver means registering a factory.

use std::collections::BTreeMap;

use crate::config::RunnerConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::executor::ExternalSolver;
use crate::settings::CaseSettings;
use crate::solver::Solver;

pub const COUPLED_NAVIER_STOKES: &str = "CoupledNavierStokesSolver";
pub const SCALER_EQUATION: &str = "ScalerEquationSolver";

/// Builds a solver from the settings it will own
pub type SolverFactory = Box<dyn Fn(CaseSettings) -> RunnerResult<Box<dyn Solver>>>;

#[derive(Default)]
pub struct SolverRegistry {
    factories: BTreeMap<String, SolverFactory>,
}

impl SolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two solvers the external suite ships, both run out of process
    pub fn with_external_solvers(config: &RunnerConfig) -> Self {
        let mut registry = Self::new();
        for name in [COUPLED_NAVIER_STOKES, SCALER_EQUATION] {
            let config = config.clone();
            registry.register(name, move |settings| {
                let solver = ExternalSolver::new(name, settings, config.clone())?;
                Ok(Box::new(solver) as Box<dyn Solver>)
            });
        }
        registry
    }

    /// Register a factory, replacing any previous one under the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(CaseSettings) -> RunnerResult<Box<dyn Solver>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn create(&self, name: &str, settings: CaseSettings) -> RunnerResult<Box<dyn Solver>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RunnerError::UnknownSolver(name.to_string()))?;
        factory(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_registry_names() {
        let registry = SolverRegistry::with_external_solvers(&RunnerConfig::default());
        assert_eq!(registry.names(), vec![COUPLED_NAVIER_STOKES, SCALER_EQUATION]);
        assert!(registry.contains(SCALER_EQUATION));
        assert!(!registry.contains("LinearElasticitySolver"));
    }

    #[test]
    fn test_unknown_name() {
        let registry = SolverRegistry::with_external_solvers(&RunnerConfig::default());
        let err = registry
            .create("PoissonSolver", CaseSettings::new("PoissonSolver"))
            .err()
            .unwrap();
        assert!(matches!(err, RunnerError::UnknownSolver(ref n) if n == "PoissonSolver"));
        assert_eq!(err.to_string(), "Solver name : PoissonSolver is not supported");
    }

    #[test]
    fn test_external_factory_builds_named_solver() {
        let registry = SolverRegistry::with_external_solvers(&RunnerConfig::default());
        let solver = registry
            .create(SCALER_EQUATION, CaseSettings::new(SCALER_EQUATION))
            .unwrap();
        assert_eq!(solver.name(), SCALER_EQUATION);
        assert!(matches!(solver.plot(), Err(RunnerError::NotSolved(_))));
    }
}
