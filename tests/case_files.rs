use std::cell::Cell;
use std::path::PathBuf;

use fenics_runner::prelude::*;
use fenics_runner::registry::{COUPLED_NAVIER_STOKES, SCALER_EQUATION};

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

#[test]
fn heat_transfer_case_loads() {
    let s = CaseSettings::from_json_file(data_file("TestHeatTransfer.json")).unwrap();
    assert_eq!(s.solver_name, SCALER_EQUATION);
    assert_eq!(s.boundary_conditions.labels(), vec!["hot", "cold"]);
    assert_eq!(
        s.boundary_conditions.get("hot").unwrap().value,
        Some(BoundaryValue::Scalar(350.0))
    );
    assert_eq!(s.material.as_ref().unwrap().property("thermal_conductivity"), Some(385.0));
    assert!(!s.is_transient());
    assert!(s.validate().is_ok());
}

#[test]
fn cfd_case_loads() {
    let s = CaseSettings::from_json_file(data_file("TestCFD.json")).unwrap();
    assert_eq!(s.solver_name, COUPLED_NAVIER_STOKES);
    assert!(s.is_transient());

    let outlet = s.boundary_conditions.get("outlet").unwrap();
    assert_eq!(outlet.kind, BoundaryKind::Stress);
    assert_eq!(outlet.value.as_ref().unwrap().constrained_axes(), vec![0]);
    assert_eq!(
        s.solver_settings.extra.get("solving_temperature"),
        Some(&serde_json::Value::Bool(false))
    );
}

#[test]
fn loaded_case_paths_are_absolute() {
    let s = resolve_settings(CaseInput::from(data_file("TestCFD.json"))).unwrap();
    let folder = std::env::current_dir().unwrap().join("data");
    assert_eq!(s.case_folder.as_deref(), Some(folder.as_path()));
    assert!(folder.is_dir());
    assert_eq!(
        s.function_space.unwrap().mesh,
        Mesh::File {
            path: folder.join("TestCFD.xml")
        }
    );
}

#[test]
fn data_files_round_trip() {
    for name in ["TestHeatTransfer.json", "TestCFD.json"] {
        let s = CaseSettings::from_json_file(data_file(name)).unwrap();
        let back = CaseSettings::from_json_str(&s.to_json_string().unwrap()).unwrap();
        assert_eq!(back, s, "{name}");
    }
}

#[test]
fn bad_boundary_type_fails_before_solver_is_built() {
    let constructed = Cell::new(0);
    for boundary_type in [0u8, 4, 7] {
        let result = ElasticityTestCase::new(true, false)
            .with_boundary_type(boundary_type)
            .run_with(
                |_settings| {
                    constructed.set(constructed.get() + 1);
                    Err(RunnerError::AnalysisFailed("should not be built".to_string()))
                },
                false,
            );
        assert!(matches!(result, Err(RunnerError::Unimplemented(_))));
    }
    assert_eq!(constructed.get(), 0);
}
