//! Work-limited depth-first feasibility search.
//!
//! A [`SearchPlan`] lists the branching steps: binary decisions and VNF
//! placements. The search walks them in order on top of a [`Propagator`],
//! then branches on whatever is still free (value 0 first) until every
//! variable is fixed. The first complete assignment is returned.

#[cfg(test)]
mod tests;

use smallvec::SmallVec;

use sfcplace_model::{DecisionModel, VarId};

use crate::propagator::Propagator;

/// Result of one feasibility search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// A complete assignment satisfying every active constraint.
    Feasible(Vec<bool>),
    /// The search space was exhausted without a solution.
    Infeasible,
    /// The node budget ran out or the search was stopped.
    Exhausted,
}

/// One branching step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Fix `var`, trying `first` before its opposite.
    Decide { var: VarId, first: bool },
    /// Put the VNF of place group `group` on one of `nodes`, in order.
    Place {
        group: usize,
        nodes: SmallVec<[usize; 8]>,
        /// Try leaving the VNF unplaced before any node.
        allow_unplaced: bool,
    },
}

/// Ordered branching steps of a feasibility search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPlan {
    steps: Vec<Step>,
}

impl SearchPlan {
    /// Plan for placing the chains flagged in `admitted`.
    ///
    /// Expects every admission variable to be fixed before the search.
    /// VNFs of admitted chains come first, in admission and chain order,
    /// trying the origin of the first chain using them before the other
    /// nodes in index order. The remaining VNFs try staying unplaced first.
    pub fn for_admission(model: &DecisionModel, admitted: &[bool]) -> Self {
        let node_count = model.node_count();
        let group_count = model.place_groups().len();
        let mut seen = vec![false; group_count];
        let mut steps = Vec::with_capacity(group_count);

        for block in model
            .admissions()
            .iter()
            .filter(|b| admitted.get(b.sfc.index()).copied().unwrap_or(false))
        {
            let origin = block.origin.index();
            for &group in &block.chain {
                if std::mem::replace(&mut seen[group], true) {
                    continue;
                }
                let nodes = std::iter::once(origin)
                    .chain((0..node_count).filter(|n| *n != origin))
                    .collect();
                steps.push(Step::Place {
                    group,
                    nodes,
                    allow_unplaced: false,
                });
            }
        }
        for group in (0..group_count).filter(|g| !seen[*g]) {
            steps.push(Step::Place {
                group,
                nodes: (0..node_count).collect(),
                allow_unplaced: true,
            });
        }
        Self { steps }
    }

    /// Plan deciding every admission (rejection first), then every VNF.
    ///
    /// Makes no assumption about which constraints are active.
    pub fn for_feasibility(model: &DecisionModel) -> Self {
        let node_count = model.node_count();
        let mut steps: Vec<Step> = model
            .admissions()
            .iter()
            .map(|b| Step::Decide {
                var: b.var,
                first: false,
            })
            .collect();
        steps.extend((0..model.place_groups().len()).map(|group| Step::Place {
            group,
            nodes: (0..node_count).collect(),
            allow_unplaced: true,
        }));
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

enum Outcome {
    Found(Vec<bool>),
    Failed,
    Exhausted,
}

/// Feasibility search with a node budget and a cooperative stop callback,
/// polled at every node.
pub struct PlacementSearch<'a, 'm> {
    propagator: &'a mut Propagator<'m>,
    budget: u64,
    nodes: u64,
    stop: &'a dyn Fn() -> bool,
}

impl<'a, 'm> PlacementSearch<'a, 'm> {
    pub fn new(propagator: &'a mut Propagator<'m>, budget: u64, stop: &'a dyn Fn() -> bool) -> Self {
        Self {
            propagator,
            budget,
            nodes: 0,
            stop,
        }
    }

    /// Nodes visited so far.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Runs `plan` from the propagator's current state.
    ///
    /// The propagator is returned to that state afterwards.
    pub fn run(&mut self, plan: &SearchPlan) -> Probe {
        let checkpoint = self.propagator.checkpoint();
        let outcome = self.step(plan, 0);
        self.propagator.backtrack(checkpoint);
        match outcome {
            Outcome::Found(values) => Probe::Feasible(values),
            Outcome::Failed => Probe::Infeasible,
            Outcome::Exhausted => Probe::Exhausted,
        }
    }

    fn visit(&mut self) -> bool {
        self.nodes += 1;
        self.nodes > self.budget || (self.stop)()
    }

    /// Assigns `var := value` and continues with `next`, undoing on failure.
    fn try_value(
        &mut self,
        var: VarId,
        value: bool,
        next: impl FnOnce(&mut Self) -> Outcome,
    ) -> Outcome {
        let checkpoint = self.propagator.checkpoint();
        let outcome = match self.propagator.assign(var, value) {
            Ok(()) => next(self),
            Err(_) => Outcome::Failed,
        };
        if matches!(outcome, Outcome::Failed) {
            self.propagator.backtrack(checkpoint);
        }
        outcome
    }

    fn step(&mut self, plan: &SearchPlan, index: usize) -> Outcome {
        if self.visit() {
            return Outcome::Exhausted;
        }
        let Some(step) = plan.steps.get(index) else {
            return self.complete(0);
        };
        match step {
            Step::Decide { var, first } => {
                if self.propagator.is_fixed(*var) {
                    return self.step(plan, index + 1);
                }
                for value in [*first, !*first] {
                    match self.try_value(*var, value, |s| s.step(plan, index + 1)) {
                        Outcome::Failed => continue,
                        other => return other,
                    }
                }
                Outcome::Failed
            }
            Step::Place {
                group,
                nodes,
                allow_unplaced,
            } => {
                let model = self.propagator.model();
                let vars = &model.place_groups()[*group].vars;
                if vars.iter().any(|v| self.propagator.value(*v) == Some(true)) {
                    return self.step(plan, index + 1);
                }
                if *allow_unplaced {
                    let checkpoint = self.propagator.checkpoint();
                    let cleared = vars
                        .iter()
                        .try_for_each(|v| self.propagator.assign(*v, false));
                    let outcome = match cleared {
                        Ok(()) => self.step(plan, index + 1),
                        Err(_) => Outcome::Failed,
                    };
                    match outcome {
                        Outcome::Failed => self.propagator.backtrack(checkpoint),
                        other => return other,
                    }
                }
                for &node in nodes {
                    let var = vars[node];
                    if self.propagator.value(var) == Some(false) {
                        continue;
                    }
                    match self.try_value(var, true, |s| s.step(plan, index + 1)) {
                        Outcome::Failed => continue,
                        other => return other,
                    }
                }
                Outcome::Failed
            }
        }
    }

    /// Branches on the remaining free variables in index order.
    fn complete(&mut self, from: usize) -> Outcome {
        let Some(var) = self.propagator.first_free(from) else {
            return match self.propagator.assignment() {
                Some(values) => Outcome::Found(values),
                None => Outcome::Failed,
            };
        };
        for value in [false, true] {
            if self.visit() {
                return Outcome::Exhausted;
            }
            match self.try_value(var, value, |s| s.complete(var.index() + 1)) {
                Outcome::Failed => continue,
                other => return other,
            }
        }
        Outcome::Failed
    }
}
