//! Case settings
//!
//! The settings structure describes one solve case: which solver runs it, the
//! material, the function space the field lives in, boundary conditions,
//! optional thermal coupling and body source, and solver-specific options.
//! Keys the runner does not know about are kept as raw JSON so that solver
//! specific options survive a read/write cycle.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::boundary::BoundaryConditions;
use crate::error::{RunnerError, RunnerResult};

fn absolute_path(base: &Path, path: &Path) -> PathBuf {
    // components() drops interior `.` entries
    base.join(path).components().collect()
}

/// Isotropic material properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Young's modulus in Pa
    pub elastic_modulus: f64,
    pub poisson_ratio: f64,
    /// Density in kg/m³
    pub density: f64,
    /// Linear thermal expansion coefficient in 1/K
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal_expansion_coefficient: Option<f64>,
    /// Further properties some solvers read (conductivity, viscosity, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Material {
    pub fn new(name: impl Into<String>, elastic_modulus: f64, poisson_ratio: f64, density: f64) -> Self {
        Self {
            name: name.into(),
            elastic_modulus,
            poisson_ratio,
            density,
            thermal_expansion_coefficient: None,
            extra: Map::new(),
        }
    }

    pub fn with_thermal_expansion(mut self, alpha: f64) -> Self {
        self.thermal_expansion_coefficient = Some(alpha);
        self
    }

    /// Numeric property outside the modelled fields
    pub fn property(&self, name: &str) -> Option<f64> {
        self.extra.get(name).and_then(Value::as_f64)
    }

    /// Structural steel
    pub fn steel() -> Self {
        Self::new("steel", 2e11, 0.27, 7800.0).with_thermal_expansion(2e-6)
    }
}

/// Mesh the external framework should build or load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mesh {
    /// Structured hexahedral box between two corner points
    Box {
        min: [f64; 3],
        max: [f64; 3],
        cells: [usize; 3],
    },
    /// Mesh file readable by the framework
    File { path: PathBuf },
}

/// Scalar or vector valued field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRank {
    Scalar,
    Vector,
}

/// Discrete function space descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpace {
    pub mesh: Mesh,
    /// Element family, e.g. "Lagrange"
    pub family: String,
    pub degree: u32,
    pub rank: FieldRank,
}

impl FunctionSpace {
    pub fn scalar(mesh: Mesh, family: impl Into<String>, degree: u32) -> Self {
        Self {
            mesh,
            family: family.into(),
            degree,
            rank: FieldRank::Scalar,
        }
    }

    pub fn vector(mesh: Mesh, family: impl Into<String>, degree: u32) -> Self {
        Self {
            mesh,
            family: family.into(),
            degree,
            rank: FieldRank::Vector,
        }
    }
}

/// Field given by one C++ expression string per component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExpression {
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, f64>,
    pub degree: u32,
}

impl FieldExpression {
    pub fn scalar(expression: impl Into<String>, degree: u32) -> Self {
        Self {
            components: vec![expression.into()],
            parameters: BTreeMap::new(),
            degree,
        }
    }

    pub fn vector(components: &[&str], degree: u32) -> Self {
        Self {
            components: components.iter().map(|c| c.to_string()).collect(),
            parameters: BTreeMap::new(),
            degree,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn rank(&self) -> FieldRank {
        if self.components.len() == 1 {
            FieldRank::Scalar
        } else {
            FieldRank::Vector
        }
    }
}

/// Time stepping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientSettings {
    pub transient: bool,
    pub starting_time: f64,
    pub time_step: f64,
    pub ending_time: f64,
}

impl TransientSettings {
    pub fn new(starting_time: f64, time_step: f64, ending_time: f64) -> Self {
        Self {
            transient: true,
            starting_time,
            time_step,
            ending_time,
        }
    }

    /// Number of steps between start and end, rounded to the nearest step
    pub fn num_steps(&self) -> usize {
        ((self.ending_time - self.starting_time) / self.time_step).round() as usize
    }

    pub fn validate(&self) -> RunnerResult<()> {
        if !(self.time_step > 0.0) {
            return Err(RunnerError::InvalidSettings(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.ending_time < self.starting_time {
            return Err(RunnerError::InvalidSettings(format!(
                "ending_time {} is before starting_time {}",
                self.ending_time, self.starting_time
            )));
        }
        Ok(())
    }
}

/// Solver specific options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    #[serde(default)]
    pub reference_values: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient_settings: Option<TransientSettings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings for a single solve case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseSettings {
    pub solver_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_folder: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_space: Option<FunctionSpace>,
    #[serde(default)]
    pub boundary_conditions: BoundaryConditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_distribution: Option<FieldExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_source: Option<FieldExpression>,
    #[serde(default)]
    pub solver_settings: SolverSettings,
    /// Keys not modelled above, passed through to the solver untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CaseSettings {
    pub fn new(solver_name: impl Into<String>) -> Self {
        Self {
            solver_name: solver_name.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(s: &str) -> RunnerResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_value(value: Value) -> RunnerResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> RunnerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        tracing::debug!("Read {} bytes of case settings from {:?}", content.len(), path);
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> RunnerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json_file(&self, path: impl AsRef<Path>) -> RunnerResult<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Make `case_folder` absolute against `base`, and a relative mesh file
    /// absolute against the case folder (or `base` when there is none).
    /// The external solver runs in its own work directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(folder) = self.case_folder.take() {
            self.case_folder = Some(absolute_path(base, &folder));
        }
        let mesh_base = self.case_folder.clone().unwrap_or_else(|| base.to_path_buf());
        if let Some(FunctionSpace {
            mesh: Mesh::File { path },
            ..
        }) = &mut self.function_space
        {
            *path = absolute_path(&mesh_base, &*path);
        }
    }

    pub fn is_transient(&self) -> bool {
        self.solver_settings
            .transient_settings
            .as_ref()
            .map_or(false, |t| t.transient)
    }

    pub fn validate(&self) -> RunnerResult<()> {
        if self.solver_name.is_empty() {
            return Err(RunnerError::InvalidSettings("solver_name is empty".to_string()));
        }
        self.boundary_conditions.validate()?;
        if let Some(transient) = &self.solver_settings.transient_settings {
            if transient.transient {
                transient.validate()?;
            }
        }
        Ok(())
    }

    /// Human readable summary of the case
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "case '{}' for solver {}",
            self.case_name.as_deref().unwrap_or("unnamed"),
            self.solver_name
        );
        if let Some(material) = &self.material {
            let _ = writeln!(
                out,
                "  material: {} (E={:e}, nu={}, rho={})",
                material.name, material.elastic_modulus, material.poisson_ratio, material.density
            );
        }
        if let Some(space) = &self.function_space {
            let _ = writeln!(
                out,
                "  function space: {:?} {} degree {}",
                space.rank, space.family, space.degree
            );
        }
        for (label, bc) in self.boundary_conditions.iter() {
            let _ = writeln!(out, "  bc {}: id={} type={}", label, bc.boundary_id, bc.kind);
        }
        if self.temperature_distribution.is_some() {
            let _ = writeln!(out, "  thermal stress: on");
        }
        if self.body_source.is_some() {
            let _ = writeln!(out, "  body source: on");
        }
        if let Some(t) = &self.solver_settings.transient_settings {
            let _ = writeln!(
                out,
                "  transient: t={}..{} dt={} ({} steps)",
                t.starting_time,
                t.ending_time,
                t.time_step,
                t.num_steps()
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{Axis, BoundaryCondition, BoundaryKind, BoundaryValue, Region};

    fn sample() -> CaseSettings {
        let mut s = CaseSettings::new("ScalerEquationSolver");
        s.case_name = Some("plate".to_string());
        s.material = Some(Material::steel());
        s.function_space = Some(FunctionSpace::scalar(
            Mesh::Box {
                min: [0.0; 3],
                max: [1.0; 3],
                cells: [4, 4, 4],
            },
            "Lagrange",
            1,
        ));
        s.boundary_conditions.insert(
            "hot",
            BoundaryCondition::dirichlet(Region::plane(Axis::X, 0.0), 1, BoundaryValue::Scalar(350.0)),
        );
        s.solver_settings.reference_values.insert("temperature".into(), 293.0);
        s
    }

    #[test]
    fn test_json_round_trip_keeps_unknown_keys() {
        let json = r#"{
            "solver_name": "ScalerEquationSolver",
            "scaler_name": "temperature",
            "boundary_conditions": {},
            "solver_settings": {"reference_values": {"temperature": 293}, "linear_solver": "mumps"}
        }"#;
        let s = CaseSettings::from_json_str(json).unwrap();
        assert_eq!(s.extra.get("scaler_name"), Some(&Value::from("temperature")));
        assert_eq!(s.solver_settings.extra.get("linear_solver"), Some(&Value::from("mumps")));

        let back = CaseSettings::from_json_str(&s.to_json_string().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_typed_round_trip() {
        let s = sample();
        let back = CaseSettings::from_json_str(&s.to_json_string().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_validate_rejects_unimplemented_bc() {
        let mut s = sample();
        s.boundary_conditions.insert(
            "sym",
            BoundaryCondition::new(Region::plane(Axis::Y, 0.0), 4, BoundaryKind::Symmetry, None),
        );
        assert!(matches!(s.validate(), Err(RunnerError::Unimplemented(_))));
    }

    #[test]
    fn test_validate_transient() {
        let mut s = sample();
        s.solver_settings.transient_settings = Some(TransientSettings::new(0.0, 0.0, 1.0));
        assert!(matches!(s.validate(), Err(RunnerError::InvalidSettings(_))));

        s.solver_settings.transient_settings = Some(TransientSettings::new(0.0, 0.001, 0.005));
        assert!(s.validate().is_ok());
        assert!(s.is_transient());
        assert_eq!(s.solver_settings.transient_settings.as_ref().unwrap().num_steps(), 5);
    }

    #[test]
    fn test_steady_case_ignores_placeholder_time_step() {
        let mut s = sample();
        let mut steady = TransientSettings::new(0.0, 0.0, 0.0);
        steady.transient = false;
        s.solver_settings.transient_settings = Some(steady);
        assert!(!s.is_transient());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_resolve_paths() {
        let base = Path::new("/work/suite");
        let mut s = sample();
        s.case_folder = Some(PathBuf::from("./data"));
        s.function_space = Some(FunctionSpace::vector(
            Mesh::File {
                path: PathBuf::from("TestCFD.xml"),
            },
            "Lagrange",
            2,
        ));
        s.resolve_paths(base);
        assert_eq!(s.case_folder, Some(PathBuf::from("/work/suite/data")));
        assert_eq!(
            s.function_space.unwrap().mesh,
            Mesh::File {
                path: PathBuf::from("/work/suite/data/TestCFD.xml")
            }
        );

        let mut s = sample();
        s.case_folder = Some(PathBuf::from("/abs/cases"));
        s.resolve_paths(base);
        assert_eq!(s.case_folder, Some(PathBuf::from("/abs/cases")));
    }

    #[test]
    fn test_describe_lists_boundaries() {
        let text = sample().describe();
        assert!(text.contains("case 'plate' for solver ScalerEquationSolver"));
        assert!(text.contains("bc hot: id=1 type=Dirichlet"));
    }
}
