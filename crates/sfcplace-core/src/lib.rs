//! sfcplace Core - static entities and network topology
//!
//! This crate provides the read-only inputs of a placement solve:
//! - The resource & demand model (nodes, edges, VNFs, SFCs)
//! - Loading and validation of the scenario input document
//! - The topology graph with cached shortest-path queries
//! - The error taxonomy shared by the other crates

pub mod domain;
pub mod error;
pub mod topology;

pub use domain::{
    Chain, DocumentFormat, Edge, EdgeId, EdgeSpec, Hop, Node, NodeId, NodeSpec, Scenario,
    ScenarioDocument, Sfc, SfcId, SfcSpec, Vnf, VnfId, VnfSpec,
};
pub use error::{Result, SfcError};
pub use topology::Topology;
