//! Infeasibility explanation.
//!
//! [`ConflictRefiner`] shrinks the constraint set of an infeasible model to
//! an irreducible subset with a deletion filter: blocks of candidates are
//! dropped whenever the rest stays infeasible, and the block size halves
//! until single constraints have been tried.

#[cfg(test)]
mod tests;

use tracing::{debug, trace};

use sfcplace_model::{ConstraintId, DecisionModel};

use crate::placement::{PlacementSearch, Probe, SearchPlan};
use crate::propagator::Propagator;

/// Finds an irreducible infeasible constraint subset.
#[derive(Debug)]
pub struct ConflictRefiner<'m> {
    model: &'m DecisionModel,
    node_limit: u64,
    checks: u64,
}

impl<'m> ConflictRefiner<'m> {
    /// Each feasibility check visits at most `node_limit` search nodes.
    pub fn new(model: &'m DecisionModel, node_limit: u64) -> Self {
        Self {
            model,
            node_limit,
            checks: 0,
        }
    }

    /// Feasibility checks run so far.
    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Returns the conflict in ascending id order.
    ///
    /// `None` if the model is feasible or a check ran out of nodes.
    pub fn refine(&mut self) -> Option<Vec<ConstraintId>> {
        let count = self.model.constraint_count();
        let mut active = vec![true; count];
        if self.is_feasible(&active)? {
            debug!(event = "conflict_model_feasible");
            return None;
        }

        let mut block = count.div_ceil(2).max(1);
        loop {
            let mut members: Vec<usize> = (0..count).filter(|c| active[*c]).collect();
            let mut start = 0;
            while start < members.len() {
                let end = (start + block).min(members.len());
                for &c in &members[start..end] {
                    active[c] = false;
                }
                if self.is_feasible(&active)? {
                    for &c in &members[start..end] {
                        active[c] = true;
                    }
                    start = end;
                } else {
                    trace!(event = "conflict_drop", removed = (end - start) as u64);
                    members.drain(start..end);
                }
            }
            if block == 1 {
                break;
            }
            block = block.div_ceil(2);
        }

        let conflict: Vec<ConstraintId> = (0..count)
            .filter(|c| active[*c])
            .map(ConstraintId)
            .collect();
        debug!(
            event = "conflict_refined",
            constraints = conflict.len() as u64,
            checks = self.checks
        );
        Some(conflict)
    }

    /// `None` when the search ran out of nodes.
    fn is_feasible(&mut self, active: &[bool]) -> Option<bool> {
        self.checks += 1;
        let mut propagator = Propagator::with_active(self.model, active.to_vec());
        if propagator.initialize().is_err() {
            return Some(false);
        }
        let plan = SearchPlan::for_feasibility(self.model);
        let never = || false;
        let mut search = PlacementSearch::new(&mut propagator, self.node_limit, &never);
        match search.run(&plan) {
            Probe::Feasible(_) => Some(true),
            Probe::Infeasible => Some(false),
            Probe::Exhausted => None,
        }
    }
}
