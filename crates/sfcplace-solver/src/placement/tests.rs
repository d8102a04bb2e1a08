//! Tests for the placement search.

use sfcplace_core::{NodeId, SfcId, VnfId};
use sfcplace_model::{Comparison, Constraint, ConstraintGroup, LinearExpr, ModelBuilder};
use sfcplace_test::scenarios::{scenario_d, shared_vnf};
use sfcplace_test::DocumentBuilder;

use super::*;

fn build(builder: DocumentBuilder) -> DecisionModel {
    let (scenario, topology) = builder.build();
    ModelBuilder::new(&scenario, &topology).build()
}

fn never() -> bool {
    false
}

/// Fixes the admissions, then searches with the admission plan.
fn probe(model: &DecisionModel, admitted: &[bool], budget: u64) -> Probe {
    let mut propagator = Propagator::new(model);
    propagator.initialize().expect("initialize");
    for block in model.admissions() {
        if propagator
            .assign(block.var, admitted[block.sfc.index()])
            .is_err()
        {
            return Probe::Infeasible;
        }
    }
    let plan = SearchPlan::for_admission(model, admitted);
    PlacementSearch::new(&mut propagator, budget, &never).run(&plan)
}

/// Four VNFs that must all be placed on three single-slot nodes.
fn pigeonhole() -> DecisionModel {
    let model = build(
        DocumentBuilder::new()
            .node("n0", 10, 100)
            .node("n1", 10, 100)
            .node("n2", 10, 100)
            .edge("n0", "n1", 1, 100)
            .edge("n1", "n2", 1, 100)
            .vnf("a", 10, 1)
            .vnf("b", 10, 1)
            .vnf("c", 10, 1)
            .vnf("d", 10, 1)
            .sfc("s0", &["a", "b", "c"], 1, 100, "n0"),
    );
    let groups: Vec<_> = model.place_groups().to_vec();
    groups.into_iter().fold(model, |model, group| {
        let name = format!("must_place_{}", group.vnf.index());
        model.with_constraint(Constraint::new(
            name,
            ConstraintGroup::Custom,
            LinearExpr::sum(group.vars.iter().copied()),
            Comparison::GreaterOrEqual,
            1,
        ))
    })
}

#[test]
fn test_admission_plan_order() {
    let model = build(scenario_d());
    // Only `video` (origin n1, VNFs 3..6) admitted.
    let plan = SearchPlan::for_admission(&model, &[false, true, false]);
    let steps = plan.steps();

    assert_eq!(steps.len(), 9);
    assert_eq!(
        steps[0],
        Step::Place {
            group: 3,
            nodes: [1, 0, 2].into_iter().collect(),
            allow_unplaced: false,
        }
    );
    assert!(matches!(steps[2], Step::Place { group: 5, allow_unplaced: false, .. }));
    assert_eq!(
        steps[3],
        Step::Place {
            group: 0,
            nodes: [0, 1, 2].into_iter().collect(),
            allow_unplaced: true,
        }
    );
}

#[test]
fn test_shared_vnf_planned_once() {
    let model = build(shared_vnf());
    let plan = SearchPlan::for_admission(&model, &[true, true]);

    assert_eq!(plan.steps().len(), model.place_groups().len());
    assert!(plan
        .steps()
        .iter()
        .all(|step| matches!(step, Step::Place { allow_unplaced: false, .. })));
}

#[test]
fn test_feasibility_plan_decides_admissions_first() {
    let model = build(scenario_d());
    let plan = SearchPlan::for_feasibility(&model);
    let steps = plan.steps();

    assert_eq!(steps.len(), 3 + 9);
    assert_eq!(
        steps[0],
        Step::Decide {
            var: model.admit_var(SfcId(0)),
            first: false,
        }
    );
    assert!(steps[3..]
        .iter()
        .all(|step| matches!(step, Step::Place { allow_unplaced: true, .. })));
}

#[test]
fn test_feasible_placement() {
    let model = build(scenario_d());
    let Probe::Feasible(values) = probe(&model, &[true, true, true], 10_000) else {
        panic!("expected a placement");
    };

    assert!(model.violated_constraints(&values).is_empty());
    assert_eq!(model.objective_value(&values), 3);
    assert!(values[model.place_var(VnfId(0), NodeId(0)).index()]);
    assert!(values[model.place_var(VnfId(1), NodeId(0)).index()]);
}

#[test]
fn test_nothing_admitted_leaves_everything_unplaced() {
    let model = build(scenario_d());
    let Probe::Feasible(values) = probe(&model, &[false, false, false], 10_000) else {
        panic!("expected a placement");
    };
    assert!(values.iter().all(|v| !v));
}

#[test]
fn test_search_restores_propagator() {
    let model = build(scenario_d());
    let mut propagator = Propagator::new(&model);
    propagator.initialize().expect("initialize");
    let before = propagator.fixed_count();

    let plan = SearchPlan::for_feasibility(&model);
    let mut search = PlacementSearch::new(&mut propagator, 10_000, &never);
    assert!(matches!(search.run(&plan), Probe::Feasible(_)));
    assert!(search.nodes() > 0);
    assert_eq!(propagator.fixed_count(), before);
}

#[test]
fn test_pigeonhole_is_infeasible() {
    let model = pigeonhole();
    let mut propagator = Propagator::new(&model);
    propagator.initialize().expect("initialize");

    let plan = SearchPlan::for_feasibility(&model);
    let probe = PlacementSearch::new(&mut propagator, 100_000, &never).run(&plan);
    assert_eq!(probe, Probe::Infeasible);
}

#[test]
fn test_budget_exhaustion() {
    let model = pigeonhole();
    let mut propagator = Propagator::new(&model);
    propagator.initialize().expect("initialize");

    let plan = SearchPlan::for_feasibility(&model);
    let mut search = PlacementSearch::new(&mut propagator, 3, &never);
    assert_eq!(search.run(&plan), Probe::Exhausted);
    assert!(search.nodes() > 3);
}

#[test]
fn test_stop_callback() {
    let model = pigeonhole();
    let mut propagator = Propagator::new(&model);
    propagator.initialize().expect("initialize");

    let stop = || true;
    let plan = SearchPlan::for_feasibility(&model);
    let mut search = PlacementSearch::new(&mut propagator, u64::MAX, &stop);
    assert_eq!(search.run(&plan), Probe::Exhausted);
    assert_eq!(search.nodes(), 1);
}
