//! Tests for the solver phases.

use sfcplace_config::{ConstructionHeuristicType, ThreadCount};
use sfcplace_core::{SfcId, Topology};
use sfcplace_model::{Comparison, Constraint, ConstraintGroup, LinearExpr, ModelBuilder};
use sfcplace_test::scenarios::{bandwidth_contention, scenario_c, scenario_d, shared_vnf};
use sfcplace_test::{random_scenario, DocumentBuilder, RandomConfig};

use super::local_search::LateAcceptance;
use super::*;
use crate::termination::{NeverTermination, NodeCountTermination};

fn build(builder: DocumentBuilder) -> DecisionModel {
    let (scenario, topology) = builder.build();
    ModelBuilder::new(&scenario, &topology).build()
}

fn context<'a, T: Termination>(
    model: &'a DecisionModel,
    scope: &'a SolverScope,
    termination: &'a T,
) -> SearchContext<'a, T> {
    let mut base = Propagator::new(model);
    base.initialize().expect("initialize");
    SearchContext {
        model,
        scope,
        termination,
        base,
        bounder: ResourceBounder::new(model),
        weights: vec![1; model.admissions().len()],
        placement_budget: 100_000,
        monotone: model
            .constraints()
            .iter()
            .all(|c| c.group != ConstraintGroup::Custom),
    }
}

fn run_phase(model: &DecisionModel, phase: &mut dyn Phase<NeverTermination>) -> SolverScope {
    let scope = SolverScope::new();
    phase.solve(&context(model, &scope, &NeverTermination));
    scope
}

/// `s1` may only be admitted together with `s2`.
fn dependent_chains() -> DecisionModel {
    let model = build(bandwidth_contention());
    let (s1, s2) = (model.admit_var(SfcId(0)), model.admit_var(SfcId(1)));
    model.with_constraint(Constraint::new(
        "s1_needs_s2",
        ConstraintGroup::Custom,
        LinearExpr::var(s2).plus(s1, -1),
        Comparison::GreaterOrEqual,
        0,
    ))
}

#[test]
fn test_first_fit_keeps_document_order() {
    let model = build(scenario_d());
    assert_eq!(
        admission_order(&model, ConstructionHeuristicType::FirstFit),
        vec![0, 1, 2]
    );
}

#[test]
fn test_first_fit_decreasing_prefers_small_chains() {
    let model = build(
        DocumentBuilder::new()
            .node("n0", 1000, 1000)
            .vnf("big1", 50, 50)
            .vnf("big2", 50, 50)
            .vnf("big3", 50, 50)
            .vnf("s1", 1, 1)
            .vnf("s2", 1, 1)
            .vnf("s3", 1, 1)
            .sfc("heavy", &["big1", "big2", "big3"], 1, 10, "n0")
            .sfc("light", &["s1", "s2", "s3"], 1, 10, "n0")
            .sfc("mixed", &["s1", "big2", "s3"], 1, 10, "n0"),
    );
    assert_eq!(
        admission_order(&model, ConstructionHeuristicType::FirstFitDecreasing),
        vec![1, 2, 0]
    );
}

#[test]
fn test_greedy_admission_skips_conflicting_chain() {
    let model = build(bandwidth_contention());
    let scope = SolverScope::new();
    let context = context(&model, &scope, &NeverTermination);
    let mut oracle = AdmissionOracle::new();

    let result = greedy_admission(&context, &mut oracle, &[1, 0]);
    assert_eq!(result.admitted, vec![false, true]);
    assert_eq!(result.objective, 1);
    let values = result.values.expect("values");
    assert!(model.violated_constraints(&values).is_empty());
}

#[test]
fn test_oracle_caches_answers() {
    let model = build(scenario_d());
    let scope = SolverScope::new();
    let context = context(&model, &scope, &NeverTermination);
    let mut oracle = AdmissionOracle::new();

    assert!(matches!(oracle.check(&context, &[true, false, true]), Probe::Feasible(_)));
    let checks = scope.stats().feasibility_checks;
    assert!(matches!(oracle.check(&context, &[true, false, true]), Probe::Feasible(_)));
    assert_eq!(scope.stats().feasibility_checks, checks);
}

#[test]
fn test_construction_seeds_incumbent() {
    let model = build(scenario_c());
    let mut phase = ConstructionPhase::new(ConstructionHeuristicType::FirstFit);
    let scope = run_phase(&model, &mut phase);

    assert_eq!(phase.admitted(), &[false, true]);
    assert_eq!(scope.best_objective(), Some(1));
    scope.with_incumbent(|incumbent| {
        let incumbent = incumbent.expect("incumbent");
        assert_eq!(incumbent.subtree, None);
        assert!(model.violated_constraints(&incumbent.values).is_empty());
    });
}

#[test]
fn test_stopped_construction_keeps_baseline() {
    let model = build(scenario_d());
    let scope = SolverScope::new();
    let stopped = NodeCountTermination::new(0);
    let mut phase = ConstructionPhase::new(ConstructionHeuristicType::FirstFit);
    phase.solve(&context(&model, &scope, &stopped));

    assert_eq!(phase.admitted(), &[false, false, false]);
    assert_eq!(scope.best_objective(), Some(0));
    assert!(scope.is_cancelled());
}

#[test]
fn test_exhaustive_proves_optimum() {
    let model = build(shared_vnf());
    let scope = run_phase(&model, &mut ExhaustivePhase::new(4, ThreadCount::None));

    assert!(scope.is_complete());
    assert_eq!(scope.best_objective(), Some(2));
    scope.with_incumbent(|incumbent| {
        let incumbent = incumbent.expect("incumbent");
        assert_eq!(incumbent.subtree, Some(0));
        assert!(model.violated_constraints(&incumbent.values).is_empty());
    });
}

#[test]
fn test_exhaustive_without_monotonicity() {
    let model = dependent_chains();
    let scope = SolverScope::new();
    let context = context(&model, &scope, &NeverTermination);
    assert!(!context.monotone);

    ExhaustivePhase::new(1, ThreadCount::None).solve(&context);
    assert!(scope.is_complete());
    let incumbent = scope.take_incumbent().expect("incumbent");
    assert_eq!(incumbent.objective, 1);
    assert!(incumbent.values[model.admit_var(SfcId(1)).index()]);
    assert!(!incumbent.values[model.admit_var(SfcId(0)).index()]);
}

#[test]
fn test_exhaustive_thread_count_does_not_change_result() {
    let config = RandomConfig {
        sfcs: 5,
        vnfs: 10,
        nodes: 4,
        ..RandomConfig::default()
    };
    for seed in 0..4 {
        let scenario = random_scenario(seed, &config);
        let topology = Topology::new(&scenario);
        let model = ModelBuilder::new(&scenario, &topology).build();

        let serial = run_phase(&model, &mut ExhaustivePhase::new(3, ThreadCount::None));
        let parallel = run_phase(&model, &mut ExhaustivePhase::new(3, ThreadCount::Count(4)));

        let serial = serial.take_incumbent().expect("incumbent");
        let parallel = parallel.take_incumbent().expect("incumbent");
        assert_eq!(serial, parallel, "seed {seed}");
    }
}

#[test]
fn test_exhaustive_stops_on_node_limit() {
    let model = build(scenario_d());
    let scope = SolverScope::new();
    let termination = NodeCountTermination::new(1);
    let context = context(&model, &scope, &termination);

    ExhaustivePhase::new(0, ThreadCount::None).solve(&context);
    assert!(scope.is_cancelled());
    assert!(!scope.is_complete());
    assert_eq!(scope.explored_nodes(), 1);
}

#[test]
fn test_local_search_keeps_feasible_best() {
    let model = build(bandwidth_contention());
    let scope = run_phase(&model, &mut LocalSearchPhase::new(vec![0, 1], 50, 7));

    assert_eq!(scope.best_objective(), Some(1));
    scope.with_incumbent(|incumbent| {
        let incumbent = incumbent.expect("incumbent");
        assert!(model.violated_constraints(&incumbent.values).is_empty());
    });
}

#[test]
fn test_local_search_finds_order_independent_optimum() {
    let model = build(scenario_d());
    let scope = run_phase(&model, &mut LocalSearchPhase::new(vec![2, 1, 0], 10, 1));
    assert_eq!(scope.best_objective(), Some(3));
}

#[test]
fn test_late_acceptance_records_rejected_steps() {
    let mut acceptor = LateAcceptance::new(2, 0);

    assert!(acceptor.is_accepted(0, 4));
    acceptor.step_ended(4);
    // Worse than current, but not worse than two steps ago.
    assert!(acceptor.is_accepted(4, 2));
    acceptor.step_ended(2);
    assert_eq!(acceptor.late(), 4);
    assert!(!acceptor.is_accepted(2, 1));
    acceptor.step_ended(2);

    // The rejected step overwrote the 4 with the objective it kept.
    acceptor.step_ended(2);
    assert_eq!(acceptor.late(), 2);
    assert!(acceptor.is_accepted(3, 2));
    assert!(!acceptor.is_accepted(3, 1));
}
