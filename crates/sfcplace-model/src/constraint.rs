//! Linear constraints of the decision model.

use std::fmt;

use crate::expr::LinearExpr;
use crate::variable::VarId;

/// Dense index of a constraint in its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub usize);

impl ConstraintId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Relation between a constraint's expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

impl Comparison {
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::LessOrEqual => lhs <= rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::Equal => lhs == rhs,
        }
    }

    /// Operator as written in LP files.
    pub fn as_lp(self) -> &'static str {
        match self {
            Comparison::LessOrEqual => "<=",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Equal => "=",
        }
    }
}

/// The placement invariant a constraint enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstraintGroup {
    /// A VNF sits on at most one node.
    Uniqueness,
    /// Admission implies every chain VNF is placed.
    ChainPlacement,
    /// Admission pins the chain endpoints to the origin node.
    OriginPinning,
    ComputeCapacity,
    MemoryCapacity,
    /// Routed bandwidth of an edge stays within its capacity.
    Bandwidth,
    /// Routed latency of an admitted chain stays within its budget.
    Latency,
    /// Ties a `uses` variable to the product it stands for.
    Linearization,
    /// Forbids hop placements between disconnected nodes.
    Routing,
    /// Injected after building; not produced by the builder.
    Custom,
}

impl ConstraintGroup {
    pub const ALL: [ConstraintGroup; 10] = [
        ConstraintGroup::Uniqueness,
        ConstraintGroup::ChainPlacement,
        ConstraintGroup::OriginPinning,
        ConstraintGroup::ComputeCapacity,
        ConstraintGroup::MemoryCapacity,
        ConstraintGroup::Bandwidth,
        ConstraintGroup::Latency,
        ConstraintGroup::Linearization,
        ConstraintGroup::Routing,
        ConstraintGroup::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintGroup::Uniqueness => "uniqueness",
            ConstraintGroup::ChainPlacement => "chain_placement",
            ConstraintGroup::OriginPinning => "origin_pinning",
            ConstraintGroup::ComputeCapacity => "compute_capacity",
            ConstraintGroup::MemoryCapacity => "memory_capacity",
            ConstraintGroup::Bandwidth => "bandwidth",
            ConstraintGroup::Latency => "latency",
            ConstraintGroup::Linearization => "linearization",
            ConstraintGroup::Routing => "routing",
            ConstraintGroup::Custom => "custom",
        }
    }
}

impl fmt::Display for ConstraintGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `expr (<=|>=|=) rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub id: ConstraintId,
    pub name: String,
    pub group: ConstraintGroup,
    pub expr: LinearExpr,
    pub comparison: Comparison,
    pub rhs: i64,
}

impl Constraint {
    /// Creates a constraint; its id is assigned when added to a model.
    pub fn new(
        name: impl Into<String>,
        group: ConstraintGroup,
        expr: LinearExpr,
        comparison: Comparison,
        rhs: i64,
    ) -> Self {
        Self {
            id: ConstraintId(usize::MAX),
            name: name.into(),
            group,
            expr,
            comparison,
            rhs,
        }
    }

    /// Checks the constraint against a complete 0/1 assignment.
    pub fn is_satisfied_by(&self, value: impl Fn(VarId) -> bool) -> bool {
        self.comparison.holds(self.expr.evaluate(value), self.rhs)
    }

    /// True if no 0/1 assignment can satisfy the constraint.
    pub fn is_trivially_infeasible(&self) -> bool {
        let (lo, hi) = (self.expr.min_value(), self.expr.max_value());
        match self.comparison {
            Comparison::LessOrEqual => lo > self.rhs,
            Comparison::GreaterOrEqual => hi < self.rhs,
            Comparison::Equal => lo > self.rhs || hi < self.rhs,
        }
    }
}
