//! sfcplace Solver - admission search over a decision model
//!
//! The engine maximizes the admitted chains of a
//! [`DecisionModel`](sfcplace_model::DecisionModel):
//! - a [`Propagator`](propagator::Propagator) keeps activity bounds for
//!   every constraint and forces implied values
//! - a construction phase seeds the incumbent by greedy admission
//! - branch-and-bound over the admission variables proves optimality,
//!   splitting the tree across a `rayon` pool
//! - a late-acceptance local search replaces it in heuristic mode
//! - terminations stop the search cooperatively
//!
//! Search outcomes are values ([`ResultKind`]), never errors.

pub mod bounder;
pub mod conflict;
pub mod outcome;
pub mod phase;
pub mod placement;
pub mod propagator;
pub mod report;
pub mod scope;
pub mod solver;
pub mod stats;
pub mod termination;

pub use conflict::ConflictRefiner;
pub use outcome::{ResultKind, SolveOutcome};
pub use report::{PlacementReport, Violation};
pub use scope::SolverScope;
pub use solver::{ConfiguredTermination, Solver};
pub use stats::SolverStats;
pub use termination::{
    ExternalTermination, NeverTermination, NodeCountTermination, OrTermination, Termination,
    TimeTermination,
};
