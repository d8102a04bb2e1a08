//! Bound propagation over the binary decision model.
//!
//! Every constraint keeps the smallest and largest value its expression can
//! still take given the fixed variables. Fixing a variable updates those
//! activities for the constraints it occurs in, which are then re-examined:
//! a constraint whose activity range misses its right-hand side is a
//! conflict, and a free variable whose one value would cause that is forced
//! to the other. Linearization rows make this fix every product variable as
//! soon as its factors decide it.
//!
//! Assignments are recorded on a trail; [`Propagator::backtrack`] undoes
//! them in reverse order.


use sfcplace_model::{Comparison, ConstraintId, DecisionModel, VarId};

/// A constraint that can no longer be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict(pub ConstraintId);

/// Partial 0/1 assignment with incremental constraint bounds.
#[derive(Debug, Clone)]
pub struct Propagator<'m> {
    model: &'m DecisionModel,
    values: Vec<Option<bool>>,
    min_activity: Vec<i64>,
    max_activity: Vec<i64>,
    active: Vec<bool>,
    trail: Vec<VarId>,
    queue: Vec<ConstraintId>,
    queued: Vec<bool>,
}

impl<'m> Propagator<'m> {
    /// Propagator over every constraint of `model`.
    pub fn new(model: &'m DecisionModel) -> Self {
        Self::with_active(model, vec![true; model.constraint_count()])
    }

    /// Propagator that ignores constraints whose `active` flag is false.
    ///
    /// # Panics
    ///
    /// Panics if `active` does not have one flag per constraint.
    pub fn with_active(model: &'m DecisionModel, active: Vec<bool>) -> Self {
        assert_eq!(active.len(), model.constraint_count());
        let constraints = model.constraints();
        Self {
            model,
            values: vec![None; model.variable_count()],
            min_activity: constraints.iter().map(|c| c.expr.min_value()).collect(),
            max_activity: constraints.iter().map(|c| c.expr.max_value()).collect(),
            active,
            trail: Vec::new(),
            queue: Vec::new(),
            queued: vec![false; constraints.len()],
        }
    }

    pub fn model(&self) -> &'m DecisionModel {
        self.model
    }

    pub fn is_active(&self, constraint: ConstraintId) -> bool {
        self.active[constraint.index()]
    }

    /// Examines every active constraint once and propagates to a fixpoint.
    ///
    /// Must be called before the first [`assign`](Self::assign) so that
    /// constraints violated with nothing fixed are detected.
    pub fn initialize(&mut self) -> Result<(), Conflict> {
        for id in 0..self.active.len() {
            if self.active[id] {
                self.enqueue(ConstraintId(id));
            }
        }
        self.propagate()
    }

    pub fn value(&self, var: VarId) -> Option<bool> {
        self.values[var.index()]
    }

    pub fn is_fixed(&self, var: VarId) -> bool {
        self.values[var.index()].is_some()
    }

    /// Trail length, used as a backtrack point.
    pub fn checkpoint(&self) -> usize {
        self.trail.len()
    }

    /// Fixes `var` and propagates.
    ///
    /// On conflict the partial propagation stays on the trail; callers
    /// backtrack to their checkpoint. Assigning a variable its current
    /// value is a no-op, the opposite value is a conflict.
    pub fn assign(&mut self, var: VarId, value: bool) -> Result<(), Conflict> {
        match self.values[var.index()] {
            Some(current) if current == value => Ok(()),
            Some(_) => Err(self.conflict_for(var)),
            None => {
                self.fix(var, value);
                self.propagate()
            }
        }
    }

    /// Undoes every assignment made after `checkpoint`.
    pub fn backtrack(&mut self, checkpoint: usize) {
        while self.trail.len() > checkpoint {
            let Some(var) = self.trail.pop() else {
                break;
            };
            let Some(value) = self.values[var.index()].take() else {
                continue;
            };
            for &(c, coefficient) in self.model.occurrences(var) {
                let c = c.index();
                match (value, coefficient > 0) {
                    (true, true) => self.min_activity[c] -= coefficient,
                    (true, false) => self.max_activity[c] -= coefficient,
                    (false, true) => self.max_activity[c] += coefficient,
                    (false, false) => self.min_activity[c] += coefficient,
                }
            }
        }
        self.clear_queue();
    }

    /// Lowest-indexed free variable at or after `from`.
    pub fn first_free(&self, from: usize) -> Option<VarId> {
        self.values[from.min(self.values.len())..]
            .iter()
            .position(Option::is_none)
            .map(|offset| VarId(from + offset))
    }

    /// The complete assignment, if every variable is fixed.
    pub fn assignment(&self) -> Option<Vec<bool>> {
        self.values.iter().copied().collect()
    }

    pub fn fixed_count(&self) -> usize {
        self.trail.len()
    }

    fn fix(&mut self, var: VarId, value: bool) {
        self.values[var.index()] = Some(value);
        self.trail.push(var);
        for &(c, coefficient) in self.model.occurrences(var) {
            let index = c.index();
            match (value, coefficient > 0) {
                (true, true) => self.min_activity[index] += coefficient,
                (true, false) => self.max_activity[index] += coefficient,
                (false, true) => self.max_activity[index] -= coefficient,
                (false, false) => self.min_activity[index] -= coefficient,
            }
            if self.active[index] {
                self.enqueue(c);
            }
        }
    }

    fn enqueue(&mut self, c: ConstraintId) {
        if !self.queued[c.index()] {
            self.queued[c.index()] = true;
            self.queue.push(c);
        }
    }

    fn clear_queue(&mut self) {
        for c in self.queue.drain(..) {
            self.queued[c.index()] = false;
        }
    }

    fn propagate(&mut self) -> Result<(), Conflict> {
        let mut forced: Vec<(VarId, bool)> = Vec::new();
        while let Some(c) = self.queue.pop() {
            self.queued[c.index()] = false;
            forced.clear();
            if let Err(conflict) = self.examine(c, &mut forced) {
                self.clear_queue();
                return Err(conflict);
            }
            for &(var, value) in &forced {
                match self.values[var.index()] {
                    None => self.fix(var, value),
                    Some(current) if current != value => {
                        self.clear_queue();
                        return Err(Conflict(c));
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Checks one constraint and collects the values it forces.
    fn examine(&self, c: ConstraintId, forced: &mut Vec<(VarId, bool)>) -> Result<(), Conflict> {
        let constraint = self.model.constraint(c);
        let (min, max) = (self.min_activity[c.index()], self.max_activity[c.index()]);
        let rhs = constraint.rhs;
        let upper = matches!(
            constraint.comparison,
            Comparison::LessOrEqual | Comparison::Equal
        );
        let lower = matches!(
            constraint.comparison,
            Comparison::GreaterOrEqual | Comparison::Equal
        );

        if (upper && min > rhs) || (lower && max < rhs) {
            return Err(Conflict(c));
        }
        let upper_slack = if upper { rhs - min } else { i64::MAX };
        let lower_slack = if lower { max - rhs } else { i64::MAX };
        if upper_slack >= max - min && lower_slack >= max - min {
            return Ok(());
        }

        for &(var, coefficient) in constraint.expr.terms() {
            if self.values[var.index()].is_some() {
                continue;
            }
            let magnitude = coefficient.abs();
            // Value that moves the activity up, and its opposite.
            let raising = coefficient > 0;
            if magnitude > upper_slack {
                forced.push((var, !raising));
            } else if magnitude > lower_slack {
                forced.push((var, raising));
            }
        }
        Ok(())
    }

    fn conflict_for(&self, var: VarId) -> Conflict {
        let constraint = self
            .model
            .occurrences(var)
            .iter()
            .map(|(c, _)| *c)
            .find(|c| self.active[c.index()])
            .unwrap_or(ConstraintId(usize::MAX));
        Conflict(constraint)
    }
}
