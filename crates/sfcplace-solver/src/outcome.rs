//! Search outcomes.

use std::fmt;

use serde::Serialize;

use sfcplace_model::ConstraintId;

use crate::stats::SolverStats;

/// How a solve ended. Every kind is a normal, reportable outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Complete search; the assignment is provably best.
    Optimal,
    /// A limit stopped the search; the assignment, if any, is the best found.
    TimedOut,
    /// Heuristic search; the assignment is not proven best.
    Heuristic,
    /// No assignment satisfies every constraint.
    Infeasible,
    /// The objective is not bounded by the admissions; the model is broken.
    Unbounded,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::Optimal => "optimal",
            ResultKind::TimedOut => "timed_out",
            ResultKind::Heuristic => "heuristic",
            ResultKind::Infeasible => "infeasible",
            ResultKind::Unbounded => "unbounded",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`Solver::solve`](crate::Solver::solve).
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub kind: ResultKind,
    /// Objective of `values`.
    pub objective: Option<i64>,
    /// Complete 0/1 assignment over the model's variables.
    pub values: Option<Vec<bool>>,
    pub stats: SolverStats,
    /// Irreducible infeasible constraint subset, when requested and found.
    pub conflict: Option<Vec<ConstraintId>>,
}

impl SolveOutcome {
    pub(crate) fn without_solution(kind: ResultKind, stats: SolverStats) -> Self {
        Self {
            kind,
            objective: None,
            values: None,
            stats,
            conflict: None,
        }
    }

    pub fn has_solution(&self) -> bool {
        self.values.is_some()
    }

    pub fn is_proven_optimal(&self) -> bool {
        self.kind == ResultKind::Optimal
    }
}
