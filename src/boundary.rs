//! Boundary condition records
//!
//! A case carries an ordered table of labelled records. Each record names the
//! boundary region, the facet id the external framework marks it with, the
//! kind of condition and its value. Values are either a scalar, a per-axis
//! vector where any axis may be left free, or a function of time for
//! transient runs.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RunnerError, RunnerResult};

/// Tolerance used by `Region::contains` for plane regions, same as the
/// framework's `near()` default
pub const DEFAULT_NEAR_TOLERANCE: f64 = 3e-16;

fn near(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Cartesian axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index (0-2)
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Part of the domain boundary a condition applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "region", rename_all = "snake_case")]
pub enum Region {
    /// All points with `x[axis] == coordinate`
    Plane { axis: Axis, coordinate: f64 },
    /// A single point, matched component-wise within `tolerance`
    Point { coordinates: [f64; 3], tolerance: f64 },
    /// Facets already tagged in an external mesh file
    Marker { name: String },
}

impl Region {
    pub fn plane(axis: Axis, coordinate: f64) -> Self {
        Region::Plane { axis, coordinate }
    }

    pub fn point(coordinates: [f64; 3], tolerance: f64) -> Self {
        Region::Point {
            coordinates,
            tolerance,
        }
    }

    pub fn marker(name: impl Into<String>) -> Self {
        Region::Marker { name: name.into() }
    }

    /// Evaluate the boundary predicate at `x`.
    ///
    /// Returns `None` for marker regions, which only the mesh provider can
    /// resolve.
    pub fn contains(&self, x: [f64; 3]) -> Option<bool> {
        match self {
            Region::Plane { axis, coordinate } => {
                Some(near(x[axis.index()], *coordinate, DEFAULT_NEAR_TOLERANCE))
            }
            Region::Point {
                coordinates,
                tolerance,
            } => Some(
                x.iter()
                    .zip(coordinates.iter())
                    .all(|(a, b)| near(*a, *b, *tolerance)),
            ),
            Region::Marker { .. } => None,
        }
    }
}

/// Boundary condition type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Prescribed field value (displacement, temperature, ...)
    #[serde(rename = "Dirichlet", alias = "dirichlet")]
    Dirichlet,
    /// Traction given as a stress vector on the facets
    Stress,
    /// Total force spread over the boundary surface
    Force,
    Symmetry,
    Antisymmetry,
    /// Elastic support, the mechanical analog of a heat transfer coefficient
    Spring,
}

impl BoundaryKind {
    pub fn is_implemented(self) -> bool {
        matches!(
            self,
            BoundaryKind::Dirichlet | BoundaryKind::Stress | BoundaryKind::Force
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryKind::Dirichlet => "Dirichlet",
            BoundaryKind::Stress => "stress",
            BoundaryKind::Force => "force",
            BoundaryKind::Symmetry => "symmetry",
            BoundaryKind::Antisymmetry => "antisymmetry",
            BoundaryKind::Spring => "spring",
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of one vector component: constrained to a number or left free.
///
/// Serialized as a number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum AxisValue {
    Fixed(f64),
    Free,
}

impl AxisValue {
    pub fn is_fixed(self) -> bool {
        matches!(self, AxisValue::Fixed(_))
    }

    pub fn value(self) -> Option<f64> {
        match self {
            AxisValue::Fixed(v) => Some(v),
            AxisValue::Free => None,
        }
    }
}

impl From<Option<f64>> for AxisValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => AxisValue::Fixed(v),
            None => AxisValue::Free,
        }
    }
}

impl From<AxisValue> for Option<f64> {
    fn from(value: AxisValue) -> Self {
        value.value()
    }
}

/// Prescribed value as a function of time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "snake_case")]
pub enum TimeFunction {
    /// `amplitude[i] * sin(2 pi frequency t)` for each component
    Sinusoidal { amplitude: Vec<f64>, frequency: f64 },
}

impl TimeFunction {
    pub fn sinusoidal(amplitude: Vec<f64>, frequency: f64) -> Self {
        TimeFunction::Sinusoidal {
            amplitude,
            frequency,
        }
    }

    pub fn evaluate(&self, t: f64) -> Vec<f64> {
        match self {
            TimeFunction::Sinusoidal {
                amplitude,
                frequency,
            } => {
                let factor = (frequency * std::f64::consts::PI * 2.0 * t).sin();
                amplitude.iter().map(|a| a * factor).collect()
            }
        }
    }
}

/// Value attached to a boundary condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundaryValue {
    Scalar(f64),
    Components(Vec<AxisValue>),
    TimeDependent(TimeFunction),
}

impl BoundaryValue {
    /// A vector with every component constrained
    pub fn vector(components: &[f64]) -> Self {
        BoundaryValue::Components(components.iter().map(|v| AxisValue::Fixed(*v)).collect())
    }

    /// A vector where `None` leaves the component unconstrained
    pub fn partial(components: &[Option<f64>]) -> Self {
        BoundaryValue::Components(components.iter().map(|v| AxisValue::from(*v)).collect())
    }

    /// Indices of the constrained components. A scalar or time function
    /// constrains its whole field, reported as component 0 only.
    pub fn constrained_axes(&self) -> Vec<usize> {
        match self {
            BoundaryValue::Components(values) => values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_fixed())
                .map(|(i, _)| i)
                .collect(),
            BoundaryValue::Scalar(_) => vec![0],
            BoundaryValue::TimeDependent(TimeFunction::Sinusoidal { amplitude, .. }) => {
                (0..amplitude.len()).collect()
            }
        }
    }

    pub fn is_fully_constrained(&self) -> bool {
        match self {
            BoundaryValue::Components(values) => values.iter().all(|v| v.is_fixed()),
            _ => true,
        }
    }

    pub fn is_time_dependent(&self) -> bool {
        matches!(self, BoundaryValue::TimeDependent(_))
    }
}

/// One boundary condition record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub boundary: Region,
    pub boundary_id: u32,
    #[serde(rename = "type")]
    pub kind: BoundaryKind,
    #[serde(default)]
    pub value: Option<BoundaryValue>,
}

impl BoundaryCondition {
    pub fn new(
        boundary: Region,
        boundary_id: u32,
        kind: BoundaryKind,
        value: Option<BoundaryValue>,
    ) -> Self {
        Self {
            boundary,
            boundary_id,
            kind,
            value,
        }
    }

    pub fn dirichlet(boundary: Region, boundary_id: u32, value: BoundaryValue) -> Self {
        Self::new(boundary, boundary_id, BoundaryKind::Dirichlet, Some(value))
    }

    pub fn stress(boundary: Region, boundary_id: u32, value: BoundaryValue) -> Self {
        Self::new(boundary, boundary_id, BoundaryKind::Stress, Some(value))
    }

    pub fn force(boundary: Region, boundary_id: u32, value: BoundaryValue) -> Self {
        Self::new(boundary, boundary_id, BoundaryKind::Force, Some(value))
    }

    /// Fails for kinds the solvers do not implement yet
    pub fn validate(&self, label: &str) -> RunnerResult<()> {
        if !self.kind.is_implemented() {
            return Err(RunnerError::Unimplemented(format!(
                "boundary condition '{}' of type '{}'",
                label, self.kind
            )));
        }
        Ok(())
    }
}

/// Boundary conditions keyed by label, in insertion order.
///
/// The order only decides how the framework numbers facets, but it is kept
/// so that a case read from JSON is written back unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryConditions {
    entries: Vec<(String, BoundaryCondition)>,
}

impl BoundaryConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. An existing label keeps its position and gets the
    /// new record; a new label is appended.
    pub fn insert(&mut self, label: impl Into<String>, bc: BoundaryCondition) -> Option<BoundaryCondition> {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => Some(std::mem::replace(existing, bc)),
            None => {
                self.entries.push((label, bc));
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&BoundaryCondition> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, bc)| bc)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundaryCondition)> {
        self.entries.iter().map(|(l, bc)| (l.as_str(), bc))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn validate(&self) -> RunnerResult<()> {
        for (label, bc) in self.iter() {
            bc.validate(label)?;
        }
        Ok(())
    }
}

impl Serialize for BoundaryConditions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, bc) in &self.entries {
            map.serialize_entry(label, bc)?;
        }
        map.end()
    }
}

struct BoundaryConditionsVisitor;

impl<'de> Visitor<'de> for BoundaryConditionsVisitor {
    type Value = BoundaryConditions;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of boundary condition records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = BoundaryConditions::new();
        while let Some((label, bc)) = access.next_entry::<String, BoundaryCondition>()? {
            table.insert(label, bc);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for BoundaryConditions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BoundaryConditionsVisitor)
    }
}
