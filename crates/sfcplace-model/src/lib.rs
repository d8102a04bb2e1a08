//! sfcplace Model - binary decision model construction
//!
//! This crate turns a [`Scenario`](sfcplace_core::Scenario) and its
//! [`Topology`](sfcplace_core::Topology) into an explicit, immutable
//! [`DecisionModel`]:
//! - `place(vnf, node)` and `admit(sfc)` binary decisions
//! - auxiliary `uses(sfc, hop, a, b)` variables linearizing the product
//!   `admit · place(u, a) · place(v, b)`
//! - one constraint group per placement invariant
//! - the objective `maximize Σ admit(sfc)`
//!
//! The model is a plain value: once built it is only read, and may be
//! shared across solver threads.

pub mod builder;
pub mod constraint;
pub mod error;
pub mod expr;
pub mod lp;
pub mod model;
pub mod variable;

pub use builder::ModelBuilder;
pub use constraint::{Comparison, Constraint, ConstraintGroup, ConstraintId};
pub use error::ModelError;
pub use expr::LinearExpr;
pub use lp::{save_lp, save_lp_subset, write_lp, write_lp_subset};
pub use model::{AdmissionBlock, DecisionModel, ModelStats, PlaceGroup, ResourceRelaxation};
pub use variable::{Product, VarId, VarKind, Variable};
