//! Solver statistics.

use serde::Serialize;

/// Work counters of one solve.
///
/// # Example
///
/// ```
/// use sfcplace_solver::stats::SolverStats;
///
/// let stats = SolverStats {
///     explored_nodes: 1_500,
///     elapsed_ms: 500,
///     ..SolverStats::default()
/// };
/// assert_eq!(stats.nodes_per_second(), 3_000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    /// Admission-tree nodes visited.
    pub explored_nodes: u64,
    /// Admission-tree nodes cut by the bound, the relaxation or an
    /// infeasible placement.
    pub pruned_nodes: u64,
    /// Placement feasibility searches run.
    pub feasibility_checks: u64,
    /// Nodes visited inside placement searches.
    pub placement_nodes: u64,
    /// Times the incumbent improved.
    pub improvements: u64,
    pub elapsed_ms: u64,
}

impl SolverStats {
    pub fn nodes_per_second(&self) -> u64 {
        let work = self.explored_nodes + self.placement_nodes;
        if self.elapsed_ms == 0 {
            work
        } else {
            work * 1_000 / self.elapsed_ms
        }
    }
}
