//! Infeasible and unbounded models, driven through the lower-level API.

use sfcplace::prelude::*;
use sfcplace::{
    save_lp, save_lp_subset, Comparison, Constraint, ConstraintGroup, ModelBuilder, Solver,
    Topology,
};
use sfcplace_model::LinearExpr;
use sfcplace_test::scenarios::{scenario_b, scenario_d};

fn forced_model() -> (Scenario, Topology, sfcplace::DecisionModel) {
    let scenario = scenario_b().scenario();
    let topology = Topology::new(&scenario);
    let model = ModelBuilder::new(&scenario, &topology).build();
    let admit = model.admit_var(sfcplace_core::SfcId(0));
    let model = model.with_constraint(Constraint::new(
        "force_s0",
        ConstraintGroup::Custom,
        LinearExpr::var(admit),
        Comparison::GreaterOrEqual,
        1,
    ));
    (scenario, topology, model)
}

#[test]
fn test_injected_contradiction_is_infeasible() {
    let (scenario, topology, model) = forced_model();
    let config = SolverConfig::default().with_explain_infeasibility(true);
    let outcome = Solver::new(config).solve(&model);

    assert_eq!(outcome.kind, ResultKind::Infeasible);
    assert!(!outcome.has_solution());

    let report = PlacementReport::from_outcome(&scenario, &topology, &model, &outcome);
    assert_eq!(report.objective, None);
    let conflict = report.conflict.expect("conflict");
    let names: Vec<&str> = conflict.iter().map(|m| m.name.as_str()).collect();
    assert!(names.contains(&"force_s0"));
    assert!(names.contains(&"compute_n0"));
    assert!(conflict
        .iter()
        .any(|m| m.group == "custom"));
}

#[test]
fn test_conflict_only_when_requested() {
    let (_, _, model) = forced_model();
    let outcome = Solver::new(SolverConfig::default()).solve(&model);

    assert_eq!(outcome.kind, ResultKind::Infeasible);
    assert_eq!(outcome.conflict, None);
}

#[test]
fn test_foreign_objective_is_unbounded() {
    let scenario = scenario_d().scenario();
    let topology = Topology::new(&scenario);
    let model = ModelBuilder::new(&scenario, &topology).build();
    let place = model.place_var(sfcplace_core::VnfId(0), sfcplace_core::NodeId(0));
    let model = model.with_objective(LinearExpr::var(place));

    let outcome = Solver::new(SolverConfig::default()).solve(&model);
    assert_eq!(outcome.kind, ResultKind::Unbounded);
    assert!(!outcome.has_solution());
}

#[test]
fn test_model_and_conflict_export() {
    let (_, _, model) = forced_model();
    let config = SolverConfig::default().with_explain_infeasibility(true);
    let outcome = Solver::new(config).solve(&model);
    let conflict = outcome.conflict.expect("conflict");

    let dir = tempfile::tempdir().expect("tempdir");
    let lp = dir.path().join("model.lp");
    let ilp = dir.path().join("model.ilp");
    save_lp(&model, &lp).expect("write model");
    save_lp_subset(&model, &conflict, &ilp).expect("write conflict");

    let lp = std::fs::read_to_string(lp).expect("read model");
    let ilp = std::fs::read_to_string(ilp).expect("read conflict");
    assert!(lp.contains("force_s0:"));
    assert!(lp.contains("lin_"));
    assert!(ilp.contains("force_s0:"));
    assert!(!ilp.contains("lin_"));
    assert!(ilp.len() < lp.len());
}
