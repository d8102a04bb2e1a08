//! The immutable decision model handed to the solver.

use std::collections::HashMap;

use smallvec::SmallVec;

use sfcplace_core::{NodeId, SfcId, VnfId};

use crate::constraint::{Constraint, ConstraintGroup, ConstraintId};
use crate::expr::LinearExpr;
use crate::variable::{VarId, VarKind, Variable};

/// The `place` variables of one VNF, indexed by node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceGroup {
    pub vnf: VnfId,
    pub vars: Vec<VarId>,
}

/// The admission variable of one SFC and the place groups it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionBlock {
    pub sfc: SfcId,
    pub var: VarId,
    /// Place-group index of each chain VNF, in chain order.
    pub chain: SmallVec<[usize; 8]>,
    pub origin: NodeId,
}

/// Aggregate compute/memory data for cheap admission pre-checks.
///
/// Index 0 is compute, index 1 is memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRelaxation {
    pub vnf_demand: Vec<[i64; 2]>,
    pub node_capacity: Vec<[i64; 2]>,
}

impl ResourceRelaxation {
    /// Sum of all node capacities per resource.
    pub fn total_capacity(&self) -> [i64; 2] {
        self.node_capacity
            .iter()
            .fold([0, 0], |acc, c| [acc[0] + c[0], acc[1] + c[1]])
    }

    /// Largest single-node capacity per resource.
    pub fn max_node_capacity(&self) -> [i64; 2] {
        self.node_capacity
            .iter()
            .fold([0, 0], |acc, c| [acc[0].max(c[0]), acc[1].max(c[1])])
    }
}

/// Variable and constraint counts of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub place_vars: usize,
    pub admit_vars: usize,
    pub uses_vars: usize,
    pub constraints_by_group: Vec<(ConstraintGroup, usize)>,
}

impl ModelStats {
    pub fn variable_count(&self) -> usize {
        self.place_vars + self.admit_vars + self.uses_vars
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints_by_group.iter().map(|(_, n)| n).sum()
    }

    pub fn constraints_in(&self, group: ConstraintGroup) -> usize {
        self.constraints_by_group
            .iter()
            .find(|(g, _)| *g == group)
            .map_or(0, |(_, n)| *n)
    }
}

/// Variables, constraints and objective (`maximize`) of one solve.
///
/// Built by [`ModelBuilder`](crate::ModelBuilder); afterwards only
/// [`with_constraint`](Self::with_constraint) derives new values from it.
#[derive(Debug, Clone)]
pub struct DecisionModel {
    pub(crate) variables: Vec<Variable>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: LinearExpr,
    pub(crate) place_groups: Vec<PlaceGroup>,
    pub(crate) admissions: Vec<AdmissionBlock>,
    pub(crate) relaxation: ResourceRelaxation,
    pub(crate) node_count: usize,
    /// Per variable: constraints it occurs in, with its coefficient.
    pub(crate) occurrences: Vec<Vec<(ConstraintId, i64)>>,
    /// Per variable: product variables it is a factor of.
    pub(crate) dependents: Vec<Vec<VarId>>,
    pub(crate) uses_index: HashMap<(SfcId, usize, NodeId, NodeId), VarId>,
}

impl DecisionModel {
    pub(crate) fn assemble(
        variables: Vec<Variable>,
        constraints: Vec<Constraint>,
        objective: LinearExpr,
        place_groups: Vec<PlaceGroup>,
        admissions: Vec<AdmissionBlock>,
        relaxation: ResourceRelaxation,
        node_count: usize,
    ) -> Self {
        let mut uses_index = HashMap::new();
        let mut dependents = vec![Vec::new(); variables.len()];
        for var in &variables {
            if let VarKind::Uses { sfc, hop, from, to } = var.kind {
                uses_index.insert((sfc, hop, from, to), var.id);
            }
            if let Some(product) = &var.definition {
                for factor in product.factors() {
                    dependents[factor.index()].push(var.id);
                }
            }
        }

        let mut model = Self {
            variables,
            constraints: Vec::new(),
            objective,
            place_groups,
            admissions,
            relaxation,
            node_count,
            occurrences: Vec::new(),
            dependents,
            uses_index,
        };
        model.occurrences = vec![Vec::new(); model.variables.len()];
        for constraint in constraints {
            model.push_constraint(constraint);
        }
        model
    }

    fn push_constraint(&mut self, mut constraint: Constraint) {
        let id = ConstraintId(self.constraints.len());
        constraint.id = id;
        for &(var, coefficient) in constraint.expr.terms() {
            self.occurrences[var.index()].push((id, coefficient));
        }
        self.constraints.push(constraint);
    }

    /// Returns a new model with one more constraint.
    ///
    /// Used to inject side constraints outside the builder path; the
    /// receiver is consumed so no shared mutable model exists.
    ///
    /// # Panics
    ///
    /// Panics if the constraint references a variable the model lacks.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        for (var, _) in constraint.expr.terms() {
            assert!(
                var.index() < self.variables.len(),
                "constraint `{}` references unknown variable {var}",
                constraint.name
            );
        }
        self.push_constraint(constraint);
        self
    }

    /// Returns a new model with a replaced objective.
    ///
    /// Exists for diagnostics; the builder's objective is `Σ admit`.
    pub fn with_objective(mut self, objective: LinearExpr) -> Self {
        self.objective = objective;
        self
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint {
        &self.constraints[id.index()]
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Looks a constraint up by name.
    pub fn constraint_named(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Objective to maximize.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn place_groups(&self) -> &[PlaceGroup] {
        &self.place_groups
    }

    pub fn admissions(&self) -> &[AdmissionBlock] {
        &self.admissions
    }

    pub fn relaxation(&self) -> &ResourceRelaxation {
        &self.relaxation
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn place_var(&self, vnf: VnfId, node: NodeId) -> VarId {
        self.place_groups[vnf.index()].vars[node.index()]
    }

    pub fn admit_var(&self, sfc: SfcId) -> VarId {
        self.admissions[sfc.index()].var
    }

    pub fn uses_var(&self, sfc: SfcId, hop: usize, from: NodeId, to: NodeId) -> Option<VarId> {
        self.uses_index.get(&(sfc, hop, from, to)).copied()
    }

    /// Constraints `var` occurs in, with its coefficient there.
    pub fn occurrences(&self, var: VarId) -> &[(ConstraintId, i64)] {
        &self.occurrences[var.index()]
    }

    /// Product variables `var` is a factor of.
    pub fn dependents(&self, var: VarId) -> &[VarId] {
        &self.dependents[var.index()]
    }

    /// Largest value the objective can take, if it only rewards admissions.
    ///
    /// Returns `None` when the objective references a non-admission variable,
    /// an unknown variable, or carries a non-positive coefficient; such an
    /// objective is not bounded by the number of chains and indicates a
    /// construction error.
    pub fn objective_bound(&self) -> Option<i64> {
        let mut bound = 0i64;
        for &(var, coefficient) in self.objective.terms() {
            let known = self
                .variables
                .get(var.index())
                .is_some_and(|v| v.kind.is_admit());
            if !known || coefficient <= 0 {
                return None;
            }
            bound += coefficient;
        }
        Some(bound)
    }

    /// Checks every constraint against a complete 0/1 assignment.
    ///
    /// Returns the ids of violated constraints, in model order.
    pub fn violated_constraints(&self, values: &[bool]) -> Vec<ConstraintId> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(|v| values[v.index()]))
            .map(|c| c.id)
            .collect()
    }

    /// Objective value of a complete 0/1 assignment.
    pub fn objective_value(&self, values: &[bool]) -> i64 {
        self.objective.evaluate(|v| values[v.index()])
    }

    pub fn stats(&self) -> ModelStats {
        let mut stats = ModelStats::default();
        for var in &self.variables {
            match var.kind {
                VarKind::Place { .. } => stats.place_vars += 1,
                VarKind::Admit { .. } => stats.admit_vars += 1,
                VarKind::Uses { .. } => stats.uses_vars += 1,
            }
        }
        stats.constraints_by_group = ConstraintGroup::ALL
            .iter()
            .map(|group| {
                (
                    *group,
                    self.constraints.iter().filter(|c| c.group == *group).count(),
                )
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        stats
    }
}
