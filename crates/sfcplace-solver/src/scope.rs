//! Shared state of one solve.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::stats::SolverStats;

/// A feasible complete assignment and its objective value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incumbent {
    pub objective: i64,
    pub values: Vec<bool>,
    /// Work unit that found it; `None` for the construction phase.
    pub subtree: Option<u32>,
}

impl Incumbent {
    /// Total order used to pick between incumbents.
    ///
    /// Higher objective wins; on equal objective an exhaustive work unit
    /// beats the construction phase, and a lower unit index beats a higher
    /// one.
    pub fn rank(&self) -> u64 {
        rank(self.objective, self.subtree)
    }
}

pub(crate) fn rank(objective: i64, subtree: Option<u32>) -> u64 {
    let objective = (objective.max(-1) + 1) as u64;
    let tie = subtree.map_or(0, |k| u64::from(u32::MAX - k.min(u32::MAX - 1)));
    (objective << 32) | tie
}

/// Solve-wide scope shared by every phase and worker thread.
///
/// Counters are atomic so workers update them without locking; the
/// incumbent sits behind a mutex and its rank is mirrored in an atomic for
/// lock-free pruning checks.
#[derive(Debug)]
pub struct SolverScope {
    start: Instant,
    explored: AtomicU64,
    pruned: AtomicU64,
    feasibility_checks: AtomicU64,
    placement_nodes: AtomicU64,
    improvements: AtomicU64,
    cancelled: AtomicBool,
    incomplete: AtomicBool,
    best_rank: AtomicU64,
    incumbent: Mutex<Option<Incumbent>>,
}

impl Default for SolverScope {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverScope {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Scope whose clock started at `start`; time limits count from there.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            explored: AtomicU64::new(0),
            pruned: AtomicU64::new(0),
            feasibility_checks: AtomicU64::new(0),
            placement_nodes: AtomicU64::new(0),
            improvements: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            incomplete: AtomicBool::new(false),
            best_rank: AtomicU64::new(0),
            incumbent: Mutex::new(None),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Counts one explored search node and returns the new total.
    pub fn record_node(&self) -> u64 {
        self.explored.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn explored_nodes(&self) -> u64 {
        self.explored.load(Ordering::Relaxed)
    }

    pub fn record_prune(&self) {
        self.pruned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_feasibility_check(&self, placement_nodes: u64) {
        self.feasibility_checks.fetch_add(1, Ordering::Relaxed);
        self.placement_nodes
            .fetch_add(placement_nodes, Ordering::Relaxed);
    }

    /// Stops every worker at its next search node.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.mark_incomplete();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Records that some part of the search space was not fully explored.
    pub fn mark_incomplete(&self) {
        self.incomplete.store(true, Ordering::Relaxed);
    }

    pub fn is_complete(&self) -> bool {
        !self.incomplete.load(Ordering::Relaxed)
    }

    /// Rank of the current incumbent, 0 if there is none.
    pub fn best_rank(&self) -> u64 {
        self.best_rank.load(Ordering::Acquire)
    }

    /// True if an incumbent at least as good as `(objective, subtree)` exists.
    pub fn is_dominated(&self, objective: i64, subtree: Option<u32>) -> bool {
        rank(objective, subtree) <= self.best_rank()
    }

    /// Offers a feasible assignment; returns true if it became the incumbent.
    pub fn offer(&self, candidate: Incumbent) -> bool {
        let candidate_rank = candidate.rank();
        if candidate_rank <= self.best_rank() {
            return false;
        }
        let mut incumbent = match self.incumbent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if incumbent
            .as_ref()
            .is_some_and(|current| current.rank() >= candidate_rank)
        {
            return false;
        }
        self.best_rank.fetch_max(candidate_rank, Ordering::AcqRel);
        *incumbent = Some(candidate);
        self.improvements.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub fn best_objective(&self) -> Option<i64> {
        self.with_incumbent(|i| i.map(|i| i.objective))
    }

    pub fn with_incumbent<R>(&self, f: impl FnOnce(Option<&Incumbent>) -> R) -> R {
        match self.incumbent.lock() {
            Ok(guard) => f(guard.as_ref()),
            Err(poisoned) => f(poisoned.into_inner().as_ref()),
        }
    }

    pub fn take_incumbent(&self) -> Option<Incumbent> {
        match self.incumbent.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn stats(&self) -> SolverStats {
        SolverStats {
            explored_nodes: self.explored.load(Ordering::Relaxed),
            pruned_nodes: self.pruned.load(Ordering::Relaxed),
            feasibility_checks: self.feasibility_checks.load(Ordering::Relaxed),
            placement_nodes: self.placement_nodes.load(Ordering::Relaxed),
            improvements: self.improvements.load(Ordering::Relaxed),
            elapsed_ms: self.elapsed().as_millis() as u64,
        }
    }
}
