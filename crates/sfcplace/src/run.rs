//! End-to-end solve: scenario in, placement report out.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error};

use sfcplace_config::{ConfigError, SolverConfig};
use sfcplace_core::{Scenario, SfcError, Topology};
use sfcplace_model::{DecisionModel, ModelBuilder};
use sfcplace_solver::{PlacementReport, SolveOutcome, Solver, Violation};

/// Failures that stop a run before or after the search.
///
/// Search outcomes, including infeasibility, are not errors; they are in
/// the report's `kind`.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Input(#[from] SfcError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The returned placement breaks an invariant; only checked when
    /// `assert_solution` is set.
    #[error("Solution check failed with {} violation(s): {}", .0.len(), first_violation(.0))]
    InvalidSolution(Vec<Violation>),
}

fn first_violation(violations: &[Violation]) -> String {
    violations
        .first()
        .map_or_else(String::new, ToString::to_string)
}

/// Everything a run produced, for callers that export the model.
#[derive(Debug)]
pub struct SolveRun {
    pub topology: Topology,
    pub model: DecisionModel,
    pub outcome: SolveOutcome,
    pub report: PlacementReport,
}

/// Builds the model of `scenario`, solves it and reports the outcome.
pub fn run(scenario: &Scenario, config: &SolverConfig) -> Result<SolveRun, SolveError> {
    run_with_flag(scenario, config, None)
}

/// Like [`run`]; raising `flag` stops the search early.
///
/// The configured time limit covers the whole run, model construction
/// included.
pub fn run_with_flag(
    scenario: &Scenario,
    config: &SolverConfig,
    flag: Option<Arc<AtomicBool>>,
) -> Result<SolveRun, SolveError> {
    let started = Instant::now();
    #[cfg(feature = "console")]
    sfcplace_console::init();

    config.validate()?;
    let topology = Topology::new(scenario);
    let model = ModelBuilder::new(scenario, &topology).build();

    let mut solver = Solver::new(config.clone()).with_start(started);
    if let Some(flag) = flag {
        solver = solver.with_terminate_flag(flag);
    }
    let outcome = solver.solve(&model);
    let report = PlacementReport::from_outcome(scenario, &topology, &model, &outcome);

    if config.assert_solution {
        let violations = report.violations(scenario, &topology);
        if !violations.is_empty() {
            for violation in &violations {
                error!(event = "solution_violation", %violation);
            }
            return Err(SolveError::InvalidSolution(violations));
        }
        debug!(event = "solution_checked");
    }

    Ok(SolveRun {
        topology,
        model,
        outcome,
        report,
    })
}

/// Solves `scenario` and returns only the report.
pub fn solve(scenario: &Scenario, config: &SolverConfig) -> Result<PlacementReport, SolveError> {
    run(scenario, config).map(|run| run.report)
}

/// Loads a scenario document (JSON, YAML or TOML by extension) and solves it.
pub fn solve_file(
    path: impl AsRef<Path>,
    config: &SolverConfig,
) -> Result<PlacementReport, SolveError> {
    let scenario = Scenario::load(path)?;
    solve(&scenario, config)
}
