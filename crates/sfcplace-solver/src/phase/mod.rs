//! Solver phases.
//!
//! A solve runs a [`ConstructionPhase`] to seed the incumbent, followed by
//! either the [`ExhaustivePhase`] or the [`LocalSearchPhase`]. Phases share
//! one [`SearchContext`].

mod construction;
mod exhaustive;
mod local_search;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt::Debug;

use sfcplace_model::DecisionModel;

use crate::bounder::ResourceBounder;
use crate::placement::{PlacementSearch, Probe, SearchPlan};
use crate::propagator::Propagator;
use crate::scope::SolverScope;
use crate::termination::Termination;

pub use construction::{admission_order, ConstructionPhase};
pub use exhaustive::ExhaustivePhase;
pub use local_search::LocalSearchPhase;

/// A stage of the solve.
pub trait Phase<T: Termination>: Debug {
    fn solve(&mut self, context: &SearchContext<'_, T>);

    fn phase_type_name(&self) -> &'static str;
}

/// Everything a phase reads; shared across worker threads.
#[derive(Debug)]
pub struct SearchContext<'a, T: Termination> {
    pub model: &'a DecisionModel,
    pub scope: &'a SolverScope,
    pub termination: &'a T,
    /// Propagator with nothing decided, already initialized.
    pub base: Propagator<'a>,
    pub bounder: ResourceBounder<'a>,
    /// Objective coefficient of each chain's admission.
    pub weights: Vec<i64>,
    /// Node budget of each placement search.
    pub placement_budget: u64,
    /// Rejecting a chain can never break feasibility.
    ///
    /// Holds for every constraint the builder emits; injected constraints
    /// may break it, which disables infeasibility pruning.
    pub monotone: bool,
}

impl<'a, T: Termination> SearchContext<'a, T> {
    /// Polls the termination; raises the shared cancel flag when it fires.
    pub fn should_stop(&self) -> bool {
        if self.scope.is_cancelled() {
            return true;
        }
        if self.termination.is_terminated(self.scope) {
            self.scope.cancel();
            return true;
        }
        false
    }

    pub fn chain_count(&self) -> usize {
        self.weights.len()
    }

    pub fn total_weight(&self) -> i64 {
        self.weights.iter().sum()
    }

    pub fn weight_of(&self, admitted: &[bool]) -> i64 {
        self.weights
            .iter()
            .zip(admitted)
            .filter(|(_, a)| **a)
            .map(|(w, _)| *w)
            .sum()
    }

    /// Searches a placement admitting exactly the chains in `admitted`.
    ///
    /// Starts from `propagator`, which may already hold some admission
    /// decisions consistent with `admitted`, and leaves it unchanged.
    pub fn probe(&self, propagator: &mut Propagator<'a>, admitted: &[bool]) -> Probe {
        self.probe_until(propagator, admitted, &|| self.should_stop())
    }

    fn probe_until(
        &self,
        propagator: &mut Propagator<'a>,
        admitted: &[bool],
        stop: &dyn Fn() -> bool,
    ) -> Probe {
        let checkpoint = propagator.checkpoint();
        let fixed = self
            .model
            .admissions()
            .iter()
            .try_for_each(|block| propagator.assign(block.var, admitted[block.sfc.index()]));
        let probe = match fixed {
            Err(_) => {
                self.scope.record_feasibility_check(0);
                Probe::Infeasible
            }
            Ok(()) => {
                let plan = SearchPlan::for_admission(self.model, admitted);
                let mut search = PlacementSearch::new(propagator, self.placement_budget, stop);
                let probe = search.run(&plan);
                self.scope.record_feasibility_check(search.nodes());
                probe
            }
        };
        propagator.backtrack(checkpoint);
        probe
    }
}

/// Memoizing admission-set feasibility check used by the greedy phases.
#[derive(Debug, Default)]
pub struct AdmissionOracle {
    cache: HashMap<Vec<bool>, Option<Vec<bool>>>,
}

impl AdmissionOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feasibility of admitting exactly `admitted`; exhausted searches are
    /// not cached.
    pub fn check<T: Termination>(
        &mut self,
        context: &SearchContext<'_, T>,
        admitted: &[bool],
    ) -> Probe {
        if let Some(probe) = self.cached(admitted) {
            return probe;
        }
        if !context.bounder.admits(admitted) {
            self.cache.insert(admitted.to_vec(), None);
            return Probe::Infeasible;
        }
        if context.should_stop() {
            return Probe::Exhausted;
        }
        let mut propagator = context.base.clone();
        let probe = context.probe(&mut propagator, admitted);
        self.remember(admitted, probe)
    }

    /// Feasibility of rejecting every chain.
    ///
    /// Ignores the termination, so a solve stopped early still has its
    /// all-reject baseline; only the placement budget bounds the search.
    pub fn baseline<T: Termination>(&mut self, context: &SearchContext<'_, T>) -> Probe {
        let rejected = vec![false; context.chain_count()];
        if let Some(probe) = self.cached(&rejected) {
            return probe;
        }
        let mut propagator = context.base.clone();
        let probe = context.probe_until(&mut propagator, &rejected, &|| false);
        self.remember(&rejected, probe)
    }

    fn cached(&self, admitted: &[bool]) -> Option<Probe> {
        self.cache.get(admitted).map(|cached| match cached {
            Some(values) => Probe::Feasible(values.clone()),
            None => Probe::Infeasible,
        })
    }

    fn remember(&mut self, admitted: &[bool], probe: Probe) -> Probe {
        match &probe {
            Probe::Feasible(values) => {
                self.cache.insert(admitted.to_vec(), Some(values.clone()));
            }
            Probe::Infeasible => {
                self.cache.insert(admitted.to_vec(), None);
            }
            Probe::Exhausted => {}
        }
        probe
    }
}

/// Result of admitting chains greedily in a fixed order.
#[derive(Debug, Clone)]
pub struct GreedyResult {
    pub admitted: Vec<bool>,
    pub objective: i64,
    /// Assignment of the final admitted set, if any set was feasible.
    pub values: Option<Vec<bool>>,
}

/// Admits each chain of `order` whose addition keeps the set feasible.
pub fn greedy_admission<T: Termination>(
    context: &SearchContext<'_, T>,
    oracle: &mut AdmissionOracle,
    order: &[usize],
) -> GreedyResult {
    let mut admitted = vec![false; context.chain_count()];
    let mut values = match oracle.baseline(context) {
        Probe::Feasible(values) => Some(values),
        _ => None,
    };

    for &sfc in order {
        if context.should_stop() {
            break;
        }
        admitted[sfc] = true;
        match oracle.check(context, &admitted) {
            Probe::Feasible(found) => values = Some(found),
            Probe::Infeasible | Probe::Exhausted => admitted[sfc] = false,
        }
    }

    let objective = values
        .as_ref()
        .map_or(0, |v| context.model.objective_value(v));
    GreedyResult {
        admitted,
        objective,
        values,
    }
}
