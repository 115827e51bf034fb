//! Linear elasticity test matrix
//!
//! Runs the bar case with every flag combination of
//! `ElasticityTestCase::matrix()` through the external solver.

use fenics_runner::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fenics_runner=info,linear_elasticity=info".into()),
        )
        .init();

    let config = RunnerConfig::from_env();
    config.check_solver_available();

    for case in ElasticityTestCase::matrix() {
        tracing::info!(
            "=== thermal stress: {}, body source: {}, transient: {}, boundary type: {} ===",
            case.has_thermal_stress,
            case.has_body_source,
            case.transient,
            case.boundary_type
        );
        match case.run(&config)? {
            Some(peak) => tracing::info!("peak von Mises {:.3e} Pa", peak.von_mises),
            None => tracing::warn!("solver reported no stress samples"),
        }
    }

    Ok(())
}
