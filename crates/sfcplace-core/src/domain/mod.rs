//! Resource & demand model.
//!
//! All entities are loaded once from a [`ScenarioDocument`], validated, and
//! never mutated afterwards. String identifiers are mapped to dense indices
//! in document order; that order is the tie-break order used everywhere.

mod document;
mod entity;
mod validate;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::path::Path;

pub use document::{DocumentFormat, EdgeSpec, NodeSpec, ScenarioDocument, SfcSpec, VnfSpec};
pub use entity::{Chain, Edge, EdgeId, Hop, Node, NodeId, Sfc, SfcId, Vnf, VnfId};
pub use validate::{MAX_QUANTITY, MIN_CHAIN_LEN};

use crate::error::Result;

/// A validated placement problem.
#[derive(Debug, Clone)]
pub struct Scenario {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    vnfs: Vec<Vnf>,
    sfcs: Vec<Sfc>,
    node_index: HashMap<String, NodeId>,
    vnf_index: HashMap<String, VnfId>,
    sfc_index: HashMap<String, SfcId>,
}

impl Scenario {
    /// Loads and validates a scenario file (JSON, YAML or TOML by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_document(&ScenarioDocument::from_file(path)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_document(&ScenarioDocument::from_json_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Self::from_document(&ScenarioDocument::from_yaml_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Self::from_document(&ScenarioDocument::from_toml_str(s)?)
    }

    /// Validates a raw document and builds the indexed model.
    ///
    /// # Errors
    ///
    /// Returns [`SfcError::MalformedInput`](crate::SfcError::MalformedInput)
    /// for the first schema or range violation found, in document order.
    pub fn from_document(doc: &ScenarioDocument) -> Result<Self> {
        validate::build(doc)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vnfs(&self) -> &[Vnf] {
        &self.vnfs
    }

    pub fn sfcs(&self) -> &[Sfc] {
        &self.sfcs
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn vnf(&self, id: VnfId) -> &Vnf {
        &self.vnfs[id.index()]
    }

    pub fn sfc(&self, id: SfcId) -> &Sfc {
        &self.sfcs[id.index()]
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    pub fn vnf_by_name(&self, name: &str) -> Option<VnfId> {
        self.vnf_index.get(name).copied()
    }

    pub fn sfc_by_name(&self, name: &str) -> Option<SfcId> {
        self.sfc_index.get(name).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn vnf_count(&self) -> usize {
        self.vnfs.len()
    }

    pub fn sfc_count(&self) -> usize {
        self.sfcs.len()
    }

    /// Returns the SFCs whose chain contains `vnf`, in document order.
    pub fn sfcs_using(&self, vnf: VnfId) -> impl Iterator<Item = &Sfc> + '_ {
        self.sfcs.iter().filter(move |sfc| sfc.contains(vnf))
    }

    /// Converts the scenario back into its document form.
    pub fn to_document(&self) -> ScenarioDocument {
        ScenarioDocument {
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeSpec {
                    id: n.name.clone(),
                    compute: n.compute,
                    memory: n.memory,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| EdgeSpec {
                    a: self.node(e.a).name.clone(),
                    b: self.node(e.b).name.clone(),
                    latency: e.latency,
                    bandwidth: e.bandwidth,
                })
                .collect(),
            vnfs: self
                .vnfs
                .iter()
                .map(|v| VnfSpec {
                    id: v.name.clone(),
                    compute: v.compute,
                    memory: v.memory,
                })
                .collect(),
            sfcs: self
                .sfcs
                .iter()
                .map(|s| SfcSpec {
                    id: s.name.clone(),
                    chain: s.chain.iter().map(|v| self.vnf(*v).name.clone()).collect(),
                    bandwidth: s.bandwidth,
                    latency_budget: s.latency_budget,
                    origin: self.node(s.origin).name.clone(),
                })
                .collect(),
        }
    }
}
