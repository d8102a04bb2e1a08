//! Shared test fixtures for sfcplace crates.
//!
//! - [`builder`] - fluent construction of scenario documents
//! - [`scenarios`] - the fixed reference scenarios and small variants
//! - [`generator`] - seeded random instances for property checks
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! sfcplace-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use sfcplace_test::scenarios::{scenario_d, bandwidth_contention};
//! use sfcplace_test::generator::{random_scenario, RandomConfig};
//! ```

pub mod builder;
pub mod generator;
pub mod scenarios;

pub use builder::DocumentBuilder;
pub use generator::{random_document, random_scenario, RandomConfig};
