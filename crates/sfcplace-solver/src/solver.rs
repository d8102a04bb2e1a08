//! Solver entry point.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use sfcplace_config::{SearchType, SolverConfig};
use sfcplace_model::{ConstraintGroup, ConstraintId, DecisionModel};

use crate::bounder::ResourceBounder;
use crate::conflict::ConflictRefiner;
use crate::outcome::{ResultKind, SolveOutcome};
use crate::phase::{
    admission_order, ConstructionPhase, ExhaustivePhase, LocalSearchPhase, Phase, SearchContext,
};
use crate::propagator::Propagator;
use crate::scope::SolverScope;
use crate::termination::{
    ExternalTermination, NodeCountTermination, OrTermination, Termination, TimeTermination,
};

/// Termination assembled from a [`SolverConfig`] and an optional flag.
pub type ConfiguredTermination = OrTermination<(
    Option<TimeTermination>,
    Option<NodeCountTermination>,
    Option<ExternalTermination>,
)>;

/// Solves decision models according to a configuration.
///
/// # Example
///
/// ```
/// use sfcplace_config::SolverConfig;
/// use sfcplace_core::{Scenario, Topology};
/// use sfcplace_model::ModelBuilder;
/// use sfcplace_solver::{ResultKind, Solver};
///
/// let scenario = Scenario::from_json_str(r#"{
///     "nodes": [{"id": "n0", "compute": 10, "memory": 10}],
///     "vnfs": [
///         {"id": "a", "compute": 1, "memory": 1},
///         {"id": "b", "compute": 1, "memory": 1},
///         {"id": "c", "compute": 1, "memory": 1}
///     ],
///     "sfcs": [{"id": "s", "chain": ["a", "b", "c"], "bandwidth": 1,
///               "latency_budget": 5, "origin": "n0"}]
/// }"#).unwrap();
/// let topology = Topology::new(&scenario);
/// let model = ModelBuilder::new(&scenario, &topology).build();
///
/// let outcome = Solver::new(SolverConfig::default()).solve(&model);
/// assert_eq!(outcome.kind, ResultKind::Optimal);
/// assert_eq!(outcome.objective, Some(1));
/// ```
#[derive(Debug)]
pub struct Solver<T: Termination = ConfiguredTermination> {
    config: SolverConfig,
    termination: T,
    started: Option<Instant>,
}

impl Solver<ConfiguredTermination> {
    pub fn new(config: SolverConfig) -> Self {
        let termination = OrTermination::new((
            config.time_limit().map(TimeTermination::new),
            config.node_count_limit().map(NodeCountTermination::new),
            None,
        ));
        Self {
            config,
            termination,
            started: None,
        }
    }

    /// Also stops when `flag` is raised.
    pub fn with_terminate_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        (self.termination.0).2 = Some(ExternalTermination::new(flag));
        self
    }
}

impl<T: Termination> Solver<T> {
    /// Replaces the configured termination.
    pub fn with_termination<U: Termination>(self, termination: U) -> Solver<U> {
        Solver {
            config: self.config,
            termination,
            started: self.started,
        }
    }

    /// Counts time limits and elapsed time from `started` instead of from
    /// the call to [`solve`](Self::solve), so that work done before the
    /// search, such as building the model, uses up the same budget.
    pub fn with_start(mut self, started: Instant) -> Self {
        self.started = Some(started);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve(&self, model: &DecisionModel) -> SolveOutcome {
        let scope = self
            .started
            .map_or_else(SolverScope::new, SolverScope::starting_at);
        let search_type = self.config.search.search_type;
        info!(
            event = "solve_start",
            chain_count = model.admissions().len() as u64,
            variable_count = model.variable_count() as u64,
            constraint_count = model.constraint_count() as u64,
            search_type = ?search_type,
            "Solving started"
        );

        let outcome = self.run(model, &scope);

        let final_score = outcome
            .objective
            .map_or_else(|| "none".to_string(), |o| o.to_string());
        info!(
            event = "solve_end",
            kind = outcome.kind.as_str(),
            final_score = %final_score,
            explored_nodes = outcome.stats.explored_nodes,
            feasibility_checks = outcome.stats.feasibility_checks,
            duration_ms = outcome.stats.elapsed_ms,
            "Solving ended"
        );
        outcome
    }

    fn run(&self, model: &DecisionModel, scope: &SolverScope) -> SolveOutcome {
        if model.objective_bound().is_none() {
            warn!(event = "objective_unbounded");
            return SolveOutcome::without_solution(ResultKind::Unbounded, scope.stats());
        }

        let mut base = Propagator::new(model);
        if let Err(conflict) = base.initialize() {
            info!(event = "root_conflict", constraint = conflict.0.index() as u64);
            let mut outcome = SolveOutcome::without_solution(ResultKind::Infeasible, scope.stats());
            outcome.conflict = self.explain(model);
            return outcome;
        }

        let weights = admission_weights(model);
        let context = SearchContext {
            model,
            scope,
            termination: &self.termination,
            base,
            bounder: ResourceBounder::new(model),
            weights,
            placement_budget: self.config.search.placement_node_limit(),
            monotone: model
                .constraints()
                .iter()
                .all(|c| c.group != ConstraintGroup::Custom),
        };

        let heuristic = self.config.search.construction_heuristic_type;
        let mut construction = ConstructionPhase::new(heuristic);
        construction.solve(&context);

        let search_type = self.config.search.search_type;
        match search_type {
            SearchType::BranchAndBound => {
                let mut exhaustive = ExhaustivePhase::new(
                    self.config.search.split_depth(),
                    self.config.thread_count,
                );
                exhaustive.solve(&context);
            }
            SearchType::Heuristic => {
                let mut local_search = LocalSearchPhase::new(
                    admission_order(model, heuristic),
                    self.config.search.local_search_step_limit(),
                    self.config.random_seed.unwrap_or(0),
                );
                local_search.solve(&context);
            }
        }

        let incumbent = scope.take_incumbent();
        let kind = match (search_type, scope.is_complete(), &incumbent) {
            (SearchType::Heuristic, _, _) => ResultKind::Heuristic,
            (SearchType::BranchAndBound, false, _) => ResultKind::TimedOut,
            (SearchType::BranchAndBound, true, Some(_)) => ResultKind::Optimal,
            (SearchType::BranchAndBound, true, None) => ResultKind::Infeasible,
        };

        let mut outcome = SolveOutcome::without_solution(kind, scope.stats());
        if let Some(incumbent) = incumbent {
            outcome.objective = Some(incumbent.objective);
            outcome.values = Some(incumbent.values);
        }
        if kind == ResultKind::Infeasible {
            outcome.conflict = self.explain(model);
        }
        outcome
    }

    fn explain(&self, model: &DecisionModel) -> Option<Vec<ConstraintId>> {
        if !self.config.explain_infeasibility {
            return None;
        }
        let conflict = ConflictRefiner::new(model, self.config.conflict_node_limit()).refine();
        match &conflict {
            Some(members) => info!(event = "conflict_found", constraints = members.len() as u64),
            None => warn!(event = "conflict_unavailable"),
        }
        conflict
    }
}

/// Objective coefficient of each chain's admission variable.
fn admission_weights(model: &DecisionModel) -> Vec<i64> {
    model
        .admissions()
        .iter()
        .map(|block| {
            model
                .objective()
                .terms()
                .iter()
                .filter(|(var, _)| *var == block.var)
                .map(|(_, coefficient)| *coefficient)
                .sum()
        })
        .collect()
}
