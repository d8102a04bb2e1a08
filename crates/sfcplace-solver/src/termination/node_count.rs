//! Explored-node termination.

use super::Termination;
use crate::scope::SolverScope;

/// Terminates once `limit` admission-tree nodes have been explored.
#[derive(Debug, Clone)]
pub struct NodeCountTermination {
    limit: u64,
}

impl NodeCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Termination for NodeCountTermination {
    fn is_terminated(&self, scope: &SolverScope) -> bool {
        scope.explored_nodes() >= self.limit
    }
}
