use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use fenics_runner::prelude::*;
use fenics_runner::registry::{COUPLED_NAVIER_STOKES, SCALER_EQUATION};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Construct(String, CaseSettings),
    Solve(String),
    Plot(String),
}

type CallLog = Rc<RefCell<Vec<Call>>>;

struct RecordingSolver {
    name: String,
    settings: CaseSettings,
    log: CallLog,
    solved: bool,
}

impl Solver for RecordingSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn settings(&self) -> &CaseSettings {
        &self.settings
    }

    fn solve(&mut self) -> RunnerResult<SolveOutput> {
        self.log.borrow_mut().push(Call::Solve(self.name.clone()));
        self.solved = true;
        Ok(SolveOutput::new(
            Uuid::new_v4(),
            self.name.clone(),
            PathBuf::new(),
            json!({"status": "ok"}),
        ))
    }

    fn plot(&self) -> RunnerResult<()> {
        if !self.solved {
            return Err(RunnerError::NotSolved(self.name.clone()));
        }
        self.log.borrow_mut().push(Call::Plot(self.name.clone()));
        Ok(())
    }
}

fn recording_registry(log: &CallLog) -> SolverRegistry {
    let mut registry = SolverRegistry::new();
    for name in [COUPLED_NAVIER_STOKES, SCALER_EQUATION] {
        let log = Rc::clone(log);
        registry.register(name, move |settings: CaseSettings| {
            log.borrow_mut()
                .push(Call::Construct(name.to_string(), settings.clone()));
            Ok(Box::new(RecordingSolver {
                name: name.to_string(),
                settings,
                log: Rc::clone(&log),
                solved: false,
            }) as Box<dyn Solver>)
        });
    }
    registry
}

fn minimal_settings(solver_name: &str) -> CaseSettings {
    let mut s = CaseSettings::new(solver_name);
    s.case_name = Some("minimal".to_string());
    s.boundary_conditions.insert(
        "wall",
        BoundaryCondition::dirichlet(Region::marker("wall"), 1, BoundaryValue::Scalar(300.0)),
    );
    s
}

#[test]
fn scaler_case_constructs_solves_and_plots_once() {
    let log: CallLog = Rc::default();
    let dispatcher = Dispatcher::new(recording_registry(&log));
    let settings = minimal_settings(SCALER_EQUATION);

    let output = dispatcher.run(settings.clone()).unwrap();
    assert_eq!(output.solver_name, SCALER_EQUATION);

    assert_eq!(
        *log.borrow(),
        vec![
            Call::Construct(SCALER_EQUATION.to_string(), settings),
            Call::Solve(SCALER_EQUATION.to_string()),
            Call::Plot(SCALER_EQUATION.to_string()),
        ]
    );
}

#[test]
fn every_registered_name_dispatches_to_its_solver() {
    for name in [COUPLED_NAVIER_STOKES, SCALER_EQUATION] {
        let log: CallLog = Rc::default();
        let dispatcher = Dispatcher::new(recording_registry(&log));
        dispatcher.run(minimal_settings(name)).unwrap();

        let calls = log.borrow();
        assert_eq!(calls.len(), 3);
        assert!(matches!(&calls[0], Call::Construct(n, _) if n == name));
        assert_eq!(calls[1], Call::Solve(name.to_string()));
        assert_eq!(calls[2], Call::Plot(name.to_string()));
    }
}

#[test]
fn unknown_solver_name_never_constructs() {
    let log: CallLog = Rc::default();
    let dispatcher = Dispatcher::new(recording_registry(&log));

    let err = dispatcher.run(minimal_settings("LinearElasticitySolver")).unwrap_err();
    match err {
        RunnerError::UnknownSolver(name) => assert_eq!(name, "LinearElasticitySolver"),
        other => panic!("expected UnknownSolver, got {other}"),
    }
    assert!(log.borrow().is_empty());
}

#[test]
fn non_object_non_string_input_is_a_type_error() {
    let err = CaseInput::try_from(json!(3.5)).unwrap_err();
    assert!(matches!(err, RunnerError::UnsupportedInput(ref t) if t == "number"));
    assert!(err.to_string().starts_with("number is not supported"));
}

#[test]
fn case_file_is_read_and_dispatched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("case.json");
    let settings = minimal_settings(COUPLED_NAVIER_STOKES);
    settings.write_json_file(&path).unwrap();

    let log: CallLog = Rc::default();
    let dispatcher = Dispatcher::new(recording_registry(&log));
    let input = CaseInput::try_from(json!(path.to_string_lossy())).unwrap();
    dispatcher.run(input).unwrap();

    assert_eq!(
        log.borrow()[0],
        Call::Construct(COUPLED_NAVIER_STOKES.to_string(), settings)
    );
}

#[test]
fn malformed_case_file_fails_before_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"solver_name\": ").unwrap();

    let log: CallLog = Rc::default();
    let dispatcher = Dispatcher::new(recording_registry(&log));
    let err = dispatcher.run(path.as_path()).unwrap_err();
    assert!(matches!(err, RunnerError::Serialization(_)));
    assert!(log.borrow().is_empty());
}

#[test]
fn settings_json_round_trip() {
    let settings = ElasticityTestCase::new(true, true)
        .with_transient(true)
        .build_settings()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elasticity.json");
    settings.write_json_file(&path).unwrap();

    let back = resolve_settings(CaseInput::from(path.as_path())).unwrap();
    assert_eq!(back, settings);
    assert_eq!(back.boundary_conditions.labels(), vec!["fixed", "displ", "tensile"]);
}
