//! sfcplace - VNF placement and SFC admission in Rust
//!
//! Load a scenario, pick a configuration, get a placement report:
//!
//! ```rust
//! use sfcplace::prelude::*;
//!
//! let scenario = Scenario::from_json_str(r#"{
//!     "nodes": [{"id": "edge", "compute": 30, "memory": 30}],
//!     "vnfs": [
//!         {"id": "fw", "compute": 10, "memory": 10},
//!         {"id": "nat", "compute": 10, "memory": 10},
//!         {"id": "ids", "compute": 10, "memory": 10}
//!     ],
//!     "sfcs": [{"id": "web", "chain": ["fw", "nat", "ids"], "bandwidth": 1,
//!               "latency_budget": 10, "origin": "edge"}]
//! }"#).unwrap();
//!
//! let report = sfcplace::solve(&scenario, &SolverConfig::default()).unwrap();
//! assert_eq!(report.kind, ResultKind::Optimal);
//! assert!(report.is_admitted("web"));
//! assert_eq!(report.node_of("nat"), Some("edge"));
//! ```

pub use sfcplace_config::{
    ConfigError, ConstructionHeuristicType, SearchConfig, SearchType, SolverConfig,
    TerminationConfig, ThreadCount,
};
pub use sfcplace_core::{Scenario, ScenarioDocument, SfcError, Topology};
pub use sfcplace_model::{
    save_lp, save_lp_subset, write_lp, write_lp_subset, Comparison, Constraint, ConstraintGroup,
    ConstraintId, DecisionModel, ModelBuilder, ModelError,
};
pub use sfcplace_solver::{
    PlacementReport, ResultKind, SolveOutcome, Solver, SolverStats, Violation,
};

#[cfg(feature = "console")]
pub use sfcplace_console as console;

mod run;
pub use run::{run, run_with_flag, solve, solve_file, SolveError, SolveRun};

pub mod prelude {
    pub use super::{
        PlacementReport, ResultKind, Scenario, SearchType, SolveError, SolverConfig, ThreadCount,
    };
}
