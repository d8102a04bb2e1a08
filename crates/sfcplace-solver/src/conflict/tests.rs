//! Tests for conflict refinement.

use sfcplace_core::{NodeId, SfcId, VnfId};
use sfcplace_model::{Comparison, Constraint, ConstraintGroup, LinearExpr, ModelBuilder};
use sfcplace_test::scenarios::{scenario_b, scenario_d};
use sfcplace_test::DocumentBuilder;

use super::*;

fn build(builder: DocumentBuilder) -> DecisionModel {
    let (scenario, topology) = builder.build();
    ModelBuilder::new(&scenario, &topology).build()
}

/// Scenario B with its only chain forced in.
fn forced_admission() -> DecisionModel {
    let model = build(scenario_b());
    let admit = model.admit_var(SfcId(0));
    model.with_constraint(Constraint::new(
        "force_s0",
        ConstraintGroup::Custom,
        LinearExpr::var(admit),
        Comparison::GreaterOrEqual,
        1,
    ))
}

fn names(model: &DecisionModel, conflict: &[ConstraintId]) -> Vec<String> {
    conflict
        .iter()
        .map(|c| model.constraint(*c).name.clone())
        .collect()
}

#[test]
fn test_feasible_model_has_no_conflict() {
    let model = build(scenario_d());
    assert_eq!(ConflictRefiner::new(&model, 10_000).refine(), None);
}

#[test]
fn test_forced_admission_conflict() {
    let model = forced_admission();
    let conflict = ConflictRefiner::new(&model, 10_000)
        .refine()
        .expect("conflict");
    let names = names(&model, &conflict);

    assert!(names.contains(&"force_s0".to_string()));
    assert!(names.contains(&"compute_n0".to_string()));
    assert!(conflict.len() < model.constraint_count());
    assert!(conflict.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_conflict_is_irreducible() {
    let model = forced_admission();
    let mut refiner = ConflictRefiner::new(&model, 10_000);
    let conflict = refiner.refine().expect("conflict");

    let mut active = vec![false; model.constraint_count()];
    for c in &conflict {
        active[c.index()] = true;
    }
    assert_eq!(refiner.is_feasible(&active), Some(false));
    for c in &conflict {
        active[c.index()] = false;
        assert_eq!(
            refiner.is_feasible(&active),
            Some(true),
            "dropping {} keeps the rest infeasible",
            model.constraint(*c).name
        );
        active[c.index()] = true;
    }
}

#[test]
fn test_self_contradictory_constraint_stands_alone() {
    let model = build(scenario_d());
    let place = model.place_var(VnfId(0), NodeId(0));
    let model = model.with_constraint(Constraint::new(
        "impossible",
        ConstraintGroup::Custom,
        LinearExpr::var(place),
        Comparison::GreaterOrEqual,
        2,
    ));

    let conflict = ConflictRefiner::new(&model, 10_000)
        .refine()
        .expect("conflict");
    assert_eq!(names(&model, &conflict), vec!["impossible".to_string()]);
}

#[test]
fn test_exhausted_checks_give_up() {
    let model = forced_admission();
    let mut refiner = ConflictRefiner::new(&model, 0);
    assert_eq!(refiner.refine(), None);
    assert!(refiner.checks() > 0);
}
