//! Fluent builder for [`ScenarioDocument`] values.

use sfcplace_core::{
    EdgeSpec, NodeSpec, Scenario, ScenarioDocument, SfcSpec, Topology, VnfSpec,
};

/// Accumulates nodes, edges, VNFs and chains in document order.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    doc: ScenarioDocument,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, id: &str, compute: u64, memory: u64) -> Self {
        self.doc.nodes.push(NodeSpec {
            id: id.to_string(),
            compute,
            memory,
        });
        self
    }

    pub fn edge(mut self, a: &str, b: &str, latency: u64, bandwidth: u64) -> Self {
        self.doc.edges.push(EdgeSpec {
            a: a.to_string(),
            b: b.to_string(),
            latency,
            bandwidth,
        });
        self
    }

    pub fn vnf(mut self, id: &str, compute: u64, memory: u64) -> Self {
        self.doc.vnfs.push(VnfSpec {
            id: id.to_string(),
            compute,
            memory,
        });
        self
    }

    pub fn sfc(
        mut self,
        id: &str,
        chain: &[&str],
        bandwidth: u64,
        latency_budget: u64,
        origin: &str,
    ) -> Self {
        self.doc.sfcs.push(SfcSpec {
            id: id.to_string(),
            chain: chain.iter().map(|v| v.to_string()).collect(),
            bandwidth,
            latency_budget,
            origin: origin.to_string(),
        });
        self
    }

    pub fn document(self) -> ScenarioDocument {
        self.doc
    }

    /// Validates the document.
    ///
    /// # Panics
    ///
    /// Panics if the fixture is malformed.
    pub fn scenario(self) -> Scenario {
        Scenario::from_document(&self.doc).expect("fixture scenario must be valid")
    }

    /// Validated scenario plus its topology.
    pub fn build(self) -> (Scenario, Topology) {
        let scenario = self.scenario();
        let topology = Topology::new(&scenario);
        (scenario, topology)
    }
}
