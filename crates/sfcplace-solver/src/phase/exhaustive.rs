//! Branch-and-bound over admission decisions.
//!
//! The admission tree decides chains in document order, admitting before
//! rejecting. It is cut at `split_depth` into `2^depth` independent work
//! units, run on a rayon pool. Each unit's root fixes its prefix of
//! decisions; the unit index counts rejections as one bits, most
//! significant first, so unit 0 admits every prefix chain.
//!
//! At every node the bound is the weight of the chains admitted so far plus
//! all undecided ones; nodes that cannot beat the incumbent are cut. A node
//! that admitted a new chain is probed: the resource relaxation first, then
//! a placement search with every undecided chain rejected. A successful
//! probe is itself a solution.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use sfcplace_config::ThreadCount;

use super::{Phase, SearchContext};
use crate::placement::Probe;
use crate::propagator::Propagator;
use crate::scope::Incumbent;
use crate::termination::Termination;

/// Exhaustive admission search; complete unless terminated early.
#[derive(Debug, Clone)]
pub struct ExhaustivePhase {
    split_depth: usize,
    thread_count: ThreadCount,
}

impl ExhaustivePhase {
    pub fn new(split_depth: usize, thread_count: ThreadCount) -> Self {
        Self {
            split_depth,
            thread_count,
        }
    }
}

/// Mutable state of one work unit.
struct Worker<'c, 'a, T: Termination> {
    context: &'c SearchContext<'a, T>,
    propagator: Propagator<'a>,
    admitted: Vec<bool>,
    subtree: u32,
}

impl<T: Termination> Phase<T> for ExhaustivePhase {
    fn solve(&mut self, context: &SearchContext<'_, T>) {
        let started = Instant::now();
        let depth = self.split_depth.min(context.chain_count());
        let units = 1u32 << depth;
        let threads = self.thread_count.resolve(units as usize);

        info!(
            event = "phase_start",
            phase_name = "Branch and Bound",
            phase_index = 1u64,
            work_units = units as u64,
            threads = threads as u64,
            "Phase started"
        );

        let run = |subtree: u32| {
            if !context.should_stop() {
                explore_unit(context, depth, subtree);
            }
        };
        if threads <= 1 {
            (0..units).for_each(run);
        } else {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(|| (0..units).into_par_iter().for_each(run)),
                Err(err) => {
                    warn!(event = "pool_unavailable", error = %err);
                    (0..units).for_each(run);
                }
            }
        }

        let best = context
            .scope
            .best_objective()
            .map_or_else(|| "none".to_string(), |o| o.to_string());
        info!(
            event = "phase_end",
            phase_name = "Branch and Bound",
            phase_index = 1u64,
            duration_ms = started.elapsed().as_millis() as u64,
            steps = context.scope.explored_nodes(),
            best_score = %best,
            complete = context.scope.is_complete(),
            "Phase ended"
        );
    }

    fn phase_type_name(&self) -> &'static str {
        "ExhaustiveSearch"
    }
}

fn explore_unit<T: Termination>(context: &SearchContext<'_, T>, depth: usize, subtree: u32) {
    let mut worker = Worker {
        context,
        propagator: context.base.clone(),
        admitted: vec![false; context.chain_count()],
        subtree,
    };
    let mut admitted_weight = 0;
    let mut undecided_weight = context.total_weight();
    for position in 0..depth {
        let admit = (subtree >> (depth - 1 - position)) & 1 == 0;
        let var = context.model.admissions()[position].var;
        if worker.propagator.assign(var, admit).is_err() {
            context.scope.record_prune();
            trace!(event = "prune", subtree, depth = position, reason = "prefix");
            return;
        }
        worker.admitted[position] = admit;
        if admit {
            admitted_weight += context.weights[position];
        }
        undecided_weight -= context.weights[position];
    }
    worker.node(depth, admitted_weight, undecided_weight, true);
}

impl<T: Termination> Worker<'_, '_, T> {
    fn node(&mut self, depth: usize, admitted_weight: i64, undecided_weight: i64, probe: bool) {
        let context = self.context;
        if context.should_stop() {
            return;
        }
        context.scope.record_node();

        if context
            .scope
            .is_dominated(admitted_weight + undecided_weight, Some(self.subtree))
        {
            context.scope.record_prune();
            trace!(event = "prune", subtree = self.subtree, depth, reason = "bound");
            return;
        }

        if probe {
            if !context.bounder.admits(&self.admitted) {
                context.scope.record_prune();
                trace!(event = "prune", subtree = self.subtree, depth, reason = "relaxation");
                return;
            }
            match context.probe(&mut self.propagator, &self.admitted) {
                Probe::Feasible(values) => {
                    let objective = context.model.objective_value(&values);
                    if context.scope.offer(Incumbent {
                        objective,
                        values,
                        subtree: Some(self.subtree),
                    }) {
                        debug!(
                            event = "new_best",
                            step = context.scope.explored_nodes(),
                            score = %objective,
                            subtree = self.subtree,
                            "New best solution"
                        );
                    }
                }
                Probe::Infeasible if context.monotone => {
                    context.scope.record_prune();
                    trace!(event = "prune", subtree = self.subtree, depth, reason = "placement");
                    return;
                }
                Probe::Infeasible => {}
                Probe::Exhausted => {
                    // An undecided set only matters if it could beat the incumbent.
                    if !context.scope.is_cancelled()
                        && !context.scope.is_dominated(admitted_weight, Some(self.subtree))
                    {
                        context.scope.mark_incomplete();
                    }
                }
            }
        }

        let Some(block) = context.model.admissions().get(depth) else {
            return;
        };
        let weight = context.weights[depth];
        let checkpoint = self.propagator.checkpoint();

        if self.propagator.assign(block.var, true).is_ok() {
            self.admitted[depth] = true;
            self.node(
                depth + 1,
                admitted_weight + weight,
                undecided_weight - weight,
                true,
            );
            self.admitted[depth] = false;
        }
        self.propagator.backtrack(checkpoint);

        // Rejecting leaves the admitted set, and so the probe, unchanged.
        if self.propagator.assign(block.var, false).is_ok() {
            self.node(depth + 1, admitted_weight, undecided_weight - weight, false);
        }
        self.propagator.backtrack(checkpoint);
    }
}
