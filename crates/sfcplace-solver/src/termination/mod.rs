//! Termination conditions for the search.

mod composite;
mod external;
mod node_count;
mod time;

use std::fmt::Debug;

use crate::scope::SolverScope;

pub use composite::OrTermination;
pub use external::ExternalTermination;
pub use node_count::NodeCountTermination;
pub use time::TimeTermination;

/// Decides when the search must stop.
///
/// Checked by every worker at every admission-tree node, so implementations
/// must be cheap and thread-safe.
pub trait Termination: Send + Sync + Debug {
    fn is_terminated(&self, scope: &SolverScope) -> bool;
}

/// An absent condition never terminates.
impl<T: Termination> Termination for Option<T> {
    fn is_terminated(&self, scope: &SolverScope) -> bool {
        self.as_ref().is_some_and(|t| t.is_terminated(scope))
    }
}

/// Never terminates; the search runs to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverTermination;

impl Termination for NeverTermination {
    fn is_terminated(&self, _scope: &SolverScope) -> bool {
        false
    }
}

#[cfg(test)]
mod tests;
