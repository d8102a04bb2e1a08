//! Wall-clock termination.

use std::time::Duration;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates once the solve has run for `limit`.
///
/// # Example
///
/// ```
/// use sfcplace_solver::termination::TimeTermination;
/// use std::time::Duration;
///
/// let two_seconds = TimeTermination::seconds(2);
/// let half_second = TimeTermination::millis(500);
/// assert_eq!(two_seconds.limit(), Duration::from_secs(2));
/// assert_eq!(half_second.limit(), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl Termination for TimeTermination {
    fn is_terminated(&self, scope: &SolverScope) -> bool {
        scope.elapsed() >= self.limit
    }
}
