//! Linear elasticity test case
//!
//! A 10 x 1 x 1 steel bar clamped on its left face and loaded on its right
//! face. Flags switch thermal stress, gravity-like body force and transient
//! loading on and off; `boundary_type` selects the right-face load:
//!
//! | type | label     | kind      | value             |
//! |------|-----------|-----------|-------------------|
//! | 1    | `displ`   | Dirichlet | (0, 0, zmax·1e-3) |
//! | 2    | `tensile` | stress    | (1e8, 0, 0)       |
//! | 3    | `bending` | force     | (0, 1e6, 0)       |

use crate::boundary::{Axis, BoundaryCondition, BoundaryValue, Region, TimeFunction};
use crate::config::RunnerConfig;
use crate::elasticity::{LinearElasticitySolver, NodalVonMises, LINEAR_ELASTICITY};
use crate::error::{RunnerError, RunnerResult};
use crate::settings::{CaseSettings, FieldExpression, FunctionSpace, Material, Mesh, TransientSettings};
use crate::solver::{SolveOutput, Solver};

const BOX_MIN: [f64; 3] = [0.0, 0.0, 0.0];
const BOX_MAX: [f64; 3] = [10.0, 1.0, 1.0];
const CELLS: [usize; 3] = [40, 10, 10];
const FE_DEGREE: u32 = 2;

/// rad/s
const OMEGA: f64 = 100.0;
/// kg/m³
const RHO: f64 = 7800.0;

const TIME_STEP: f64 = 0.001;
const END_TIME: f64 = 0.005;
/// Hz, frequency of the transient traction
const LOAD_FREQUENCY: f64 = 100.0;

const REFERENCE_TEMPERATURE: f64 = 293.0;
const BAR_TEMPERATURE: &str = "343";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElasticityTestCase {
    pub has_thermal_stress: bool,
    pub has_body_source: bool,
    pub transient: bool,
    pub boundary_type: u8,
}

impl Default for ElasticityTestCase {
    fn default() -> Self {
        Self {
            has_thermal_stress: false,
            has_body_source: false,
            transient: false,
            boundary_type: 1,
        }
    }
}

impl ElasticityTestCase {
    pub fn new(has_thermal_stress: bool, has_body_source: bool) -> Self {
        Self {
            has_thermal_stress,
            has_body_source,
            ..Default::default()
        }
    }

    pub fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    pub fn with_boundary_type(mut self, boundary_type: u8) -> Self {
        self.boundary_type = boundary_type;
        self
    }

    /// The standard set of cases run by the `linear-elasticity` binary
    pub fn matrix() -> Vec<Self> {
        vec![
            Self::new(true, true).with_transient(true),
            Self::new(true, true),
            Self::new(false, true),
            Self::new(true, false),
            Self::new(false, false),
        ]
    }

    fn right_face() -> Region {
        Region::plane(Axis::X, BOX_MAX[0])
    }

    fn left_face() -> Region {
        Region::plane(Axis::X, BOX_MIN[0])
    }

    /// Assemble the settings for this case.
    ///
    /// Fails with `Unimplemented` for a boundary type outside 1..=3.
    pub fn build_settings(&self) -> RunnerResult<CaseSettings> {
        let mut s = CaseSettings::new(LINEAR_ELASTICITY);
        let bcs = &mut s.boundary_conditions;

        // only x is held on the clamped face
        bcs.insert(
            "fixed",
            BoundaryCondition::dirichlet(
                Self::left_face(),
                1,
                BoundaryValue::partial(&[Some(0.0), None, None]),
            ),
        );

        match self.boundary_type {
            1 => {
                bcs.insert(
                    "displ",
                    BoundaryCondition::dirichlet(
                        Self::right_face(),
                        2,
                        BoundaryValue::vector(&[0.0, 0.0, BOX_MAX[2] * 1e-3]),
                    ),
                );
            }
            2 => {
                bcs.insert(
                    "tensile",
                    BoundaryCondition::stress(Self::right_face(), 2, BoundaryValue::vector(&[1e8, 0.0, 0.0])),
                );
            }
            3 => {
                bcs.insert(
                    "bending",
                    BoundaryCondition::force(Self::right_face(), 2, BoundaryValue::vector(&[0.0, 1e6, 0.0])),
                );
            }
            other => {
                return Err(RunnerError::Unimplemented(format!(
                    "elasticity boundary type {}",
                    other
                )))
            }
        }

        s.material = Some(Material::steel());
        s.function_space = Some(FunctionSpace::vector(
            Mesh::Box {
                min: BOX_MIN,
                max: BOX_MAX,
                cells: CELLS,
            },
            "Lagrange",
            FE_DEGREE,
        ));
        s.solver_settings
            .reference_values
            .insert("temperature".to_string(), REFERENCE_TEMPERATURE);

        if self.transient {
            s.solver_settings.transient_settings = Some(TransientSettings::new(0.0, TIME_STEP, END_TIME));
            s.boundary_conditions.insert(
                "tensile",
                BoundaryCondition::stress(
                    Self::right_face(),
                    2,
                    BoundaryValue::TimeDependent(TimeFunction::sinusoidal(
                        vec![1e8, 0.0, 0.0],
                        LOAD_FREQUENCY,
                    )),
                ),
            );
        }

        if self.has_thermal_stress {
            tracing::info!("test thermal stress");
            s.temperature_distribution = Some(FieldExpression::scalar(BAR_TEMPERATURE, FE_DEGREE));
        }
        if self.has_body_source {
            // gravity-like load, but along x
            s.body_source = Some(
                FieldExpression::vector(&["10*rho", "0", "0.0"], 2)
                    .with_parameter("omega", OMEGA)
                    .with_parameter("rho", RHO),
            );
        }

        Ok(s)
    }

    /// Build the case and hand it to `factory`, then solve. Plots only when
    /// `interactive` is set.
    pub fn run_with<F>(&self, factory: F, interactive: bool) -> RunnerResult<SolveOutput>
    where
        F: FnOnce(CaseSettings) -> RunnerResult<Box<dyn Solver>>,
    {
        let settings = self.build_settings()?;
        let mut solver = factory(settings)?;
        let output = solver.solve()?;
        if interactive {
            solver.plot()?;
        }
        Ok(output)
    }

    /// Run end to end with the external elasticity solver and report the
    /// highest von Mises stress
    pub fn run(&self, config: &RunnerConfig) -> RunnerResult<Option<NodalVonMises>> {
        let settings = self.build_settings()?;
        let mut solver = LinearElasticitySolver::new(settings, config.clone())?;
        solver.solve()?;

        let max = solver.max_von_mises()?;
        if let Some(peak) = &max {
            tracing::info!(
                "Stress von Mises: max {:.3e} Pa at node {}",
                peak.von_mises,
                peak.node_id
            );
        }
        if config.interactive {
            solver.plot()?;
        }
        Ok(max)
    }
}
