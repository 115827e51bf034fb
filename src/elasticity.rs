//! Linear elasticity solver
//!
//! Wraps the external `LinearElasticitySolver` and post-processes the nodal
//! Cauchy stresses it reports into von Mises equivalent stress.

use serde::{Deserialize, Serialize};

use crate::config::RunnerConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::executor::ExternalSolver;
use crate::settings::CaseSettings;
use crate::solver::{SolveOutput, Solver};

pub const LINEAR_ELASTICITY: &str = "LinearElasticitySolver";

/// Cauchy stress components at one node, as written in the result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressSample {
    pub node_id: usize,
    pub sxx: f64,
    pub syy: f64,
    pub szz: f64,
    pub sxy: f64,
    pub syz: f64,
    pub szx: f64,
}

impl StressSample {
    pub fn von_mises(&self) -> f64 {
        calc_von_mises(self.sxx, self.syy, self.szz, self.sxy, self.syz, self.szx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodalVonMises {
    pub node_id: usize,
    pub von_mises: f64,
}

/// Von Mises stress from the six independent stress components
pub fn calc_von_mises(sxx: f64, syy: f64, szz: f64, sxy: f64, syz: f64, szx: f64) -> f64 {
    (0.5 * ((sxx - syy).powi(2)
        + (syy - szz).powi(2)
        + (szz - sxx).powi(2)
        + 6.0 * (sxy.powi(2) + syz.powi(2) + szx.powi(2))))
    .sqrt()
}

/// Read the `stress` array of a result document
pub fn stress_samples(result: &serde_json::Value) -> RunnerResult<Vec<StressSample>> {
    let stress = result
        .get("stress")
        .ok_or_else(|| RunnerError::AnalysisFailed("result has no stress field".to_string()))?;
    Ok(serde_json::from_value(stress.clone())?)
}

pub struct LinearElasticitySolver {
    inner: ExternalSolver,
}

impl LinearElasticitySolver {
    pub fn new(settings: CaseSettings, config: RunnerConfig) -> RunnerResult<Self> {
        Ok(Self {
            inner: ExternalSolver::new(LINEAR_ELASTICITY, settings, config)?,
        })
    }

    /// Von Mises stress at every node of the last solve
    pub fn von_mises(&self) -> RunnerResult<Vec<NodalVonMises>> {
        let output = self
            .inner
            .last_output()
            .ok_or_else(|| RunnerError::NotSolved(LINEAR_ELASTICITY.to_string()))?;
        let samples = stress_samples(&output.result)?;
        Ok(samples
            .iter()
            .map(|s| NodalVonMises {
                node_id: s.node_id,
                von_mises: s.von_mises(),
            })
            .collect())
    }

    pub fn max_von_mises(&self) -> RunnerResult<Option<NodalVonMises>> {
        Ok(self
            .von_mises()?
            .into_iter()
            .max_by(|a, b| a.von_mises.total_cmp(&b.von_mises)))
    }
}

impl Solver for LinearElasticitySolver {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn settings(&self) -> &CaseSettings {
        self.inner.settings()
    }

    fn solve(&mut self) -> RunnerResult<SolveOutput> {
        self.inner.solve()
    }

    fn plot(&self) -> RunnerResult<()> {
        self.inner.plot()
    }
}
