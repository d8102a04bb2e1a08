//! Externally triggered termination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates when a shared flag is raised, e.g. from a signal handler.
///
/// # Example
///
/// ```
/// use sfcplace_solver::termination::ExternalTermination;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// let flag = Arc::new(AtomicBool::new(false));
/// let termination = ExternalTermination::new(flag.clone());
/// flag.store(true, Ordering::SeqCst);
/// assert!(termination.is_requested());
/// ```
#[derive(Debug, Clone)]
pub struct ExternalTermination {
    flag: Arc<AtomicBool>,
}

impl ExternalTermination {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Termination for ExternalTermination {
    fn is_terminated(&self, _scope: &SolverScope) -> bool {
        self.is_requested()
    }
}
