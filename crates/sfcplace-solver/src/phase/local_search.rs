//! Late-acceptance local search over admission orders.
//!
//! A state is an order of chains, evaluated by greedy admission. Moves swap
//! two chains or pull one to the front. A move is accepted if it does not
//! worsen the current objective or the objective recorded
//! `LATE_ACCEPTANCE_SIZE` steps earlier.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use super::{greedy_admission, AdmissionOracle, Phase, SearchContext};
use crate::scope::Incumbent;
use crate::termination::Termination;

const LATE_ACCEPTANCE_SIZE: usize = 16;

/// Objectives of the last steps, accepted or not.
#[derive(Debug, Clone)]
pub(crate) struct LateAcceptance {
    history: Vec<i64>,
    index: usize,
}

impl LateAcceptance {
    pub(crate) fn new(size: usize, initial: i64) -> Self {
        Self {
            history: vec![initial; size.max(1)],
            index: 0,
        }
    }

    /// Objective recorded one history length ago.
    pub(crate) fn late(&self) -> i64 {
        self.history[self.index]
    }

    pub(crate) fn is_accepted(&self, current: i64, candidate: i64) -> bool {
        candidate >= current || candidate >= self.late()
    }

    /// Records the objective the step ended with, which is the previous
    /// one when its move was rejected.
    pub(crate) fn step_ended(&mut self, objective: i64) {
        self.history[self.index] = objective;
        self.index = (self.index + 1) % self.history.len();
    }
}

/// Heuristic improvement phase; never proves optimality.
#[derive(Debug, Clone)]
pub struct LocalSearchPhase {
    initial_order: Vec<usize>,
    step_limit: u64,
    seed: u64,
}

impl LocalSearchPhase {
    pub fn new(initial_order: Vec<usize>, step_limit: u64, seed: u64) -> Self {
        Self {
            initial_order,
            step_limit,
            seed,
        }
    }
}

impl<T: Termination> Phase<T> for LocalSearchPhase {
    fn solve(&mut self, context: &SearchContext<'_, T>) {
        let started = Instant::now();
        info!(
            event = "phase_start",
            phase_name = "Late Acceptance",
            phase_index = 1u64,
            "Phase started"
        );

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut oracle = AdmissionOracle::new();
        let mut order = self.initial_order.clone();
        let initial = greedy_admission(context, &mut oracle, &order);
        let mut current = initial.objective;
        if let Some(values) = initial.values {
            context.scope.offer(Incumbent {
                objective: current,
                values,
                subtree: None,
            });
        }
        let mut acceptor = LateAcceptance::new(LATE_ACCEPTANCE_SIZE, current);
        let total = context.total_weight();
        let mut steps = 0u64;

        while order.len() > 1 && steps < self.step_limit && current < total {
            if context.should_stop() {
                break;
            }
            let i = rng.random_range(0..order.len());
            let j = rng.random_range(0..order.len());
            let mut candidate = order.clone();
            if rng.random_bool(0.5) {
                candidate.swap(i, j);
            } else {
                let chain = candidate.remove(i);
                candidate.insert(0, chain);
            }
            if candidate == order {
                continue;
            }
            steps += 1;

            let result = greedy_admission(context, &mut oracle, &candidate);
            let accepted = acceptor.is_accepted(current, result.objective);
            trace!(event = "step", step = steps, score = result.objective, accepted);
            if !accepted {
                acceptor.step_ended(current);
                continue;
            }

            acceptor.step_ended(result.objective);
            current = result.objective;
            order = candidate;
            if let Some(values) = result.values {
                if context.scope.offer(Incumbent {
                    objective: result.objective,
                    values,
                    subtree: None,
                }) {
                    debug!(
                        event = "new_best",
                        step = steps,
                        score = %result.objective,
                        "New best solution"
                    );
                }
            }
        }

        let best = context
            .scope
            .best_objective()
            .map_or_else(|| "none".to_string(), |o| o.to_string());
        info!(
            event = "phase_end",
            phase_name = "Late Acceptance",
            phase_index = 1u64,
            duration_ms = started.elapsed().as_millis() as u64,
            steps,
            best_score = %best,
            "Phase ended"
        );
    }

    fn phase_type_name(&self) -> &'static str {
        "LocalSearch"
    }
}
