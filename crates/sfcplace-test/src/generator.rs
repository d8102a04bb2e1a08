//! Seeded random instances.
//!
//! Instances are small enough for exhaustive search and always valid:
//! chains draw distinct VNFs, and edges never repeat a node pair.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use sfcplace_core::{Scenario, ScenarioDocument};

use crate::builder::DocumentBuilder;

/// Shape of a generated instance.
#[derive(Debug, Clone)]
pub struct RandomConfig {
    pub nodes: usize,
    pub vnfs: usize,
    pub sfcs: usize,
    pub chain_len: usize,
    /// Probability of each non-ring node pair getting an edge.
    pub chord_probability: f64,
    /// Join the nodes in a ring first, so the graph is connected.
    pub connected: bool,
    pub node_capacity: (u64, u64),
    pub vnf_demand: (u64, u64),
    pub edge_bandwidth: (u64, u64),
    pub edge_latency: (u64, u64),
    pub sfc_bandwidth: (u64, u64),
    pub latency_budget: (u64, u64),
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            nodes: 3,
            vnfs: 6,
            sfcs: 3,
            chain_len: 3,
            chord_probability: 0.3,
            connected: true,
            node_capacity: (20, 60),
            vnf_demand: (5, 20),
            edge_bandwidth: (10, 40),
            edge_latency: (1, 10),
            sfc_bandwidth: (5, 15),
            latency_budget: (5, 40),
        }
    }
}

/// Generates a document from `seed`; equal seeds give equal documents.
///
/// # Panics
///
/// Panics if `config.chain_len` exceeds `config.vnfs` or any count is zero.
pub fn random_document(seed: u64, config: &RandomConfig) -> ScenarioDocument {
    assert!(config.nodes > 0 && config.vnfs > 0 && config.sfcs > 0);
    assert!(config.chain_len <= config.vnfs, "chain longer than VNF pool");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let range = |rng: &mut ChaCha8Rng, (lo, hi): (u64, u64)| rng.random_range(lo..=hi);
    let node = |i: usize| format!("n{i}");
    let vnf = |i: usize| format!("v{i}");

    let mut builder = DocumentBuilder::new();
    for i in 0..config.nodes {
        let compute = range(&mut rng, config.node_capacity);
        let memory = range(&mut rng, config.node_capacity);
        builder = builder.node(&node(i), compute, memory);
    }

    for i in 0..config.nodes {
        for j in (i + 1)..config.nodes {
            let ring = config.connected && (j == i + 1 || (i == 0 && j == config.nodes - 1));
            if ring || rng.random_bool(config.chord_probability) {
                let latency = range(&mut rng, config.edge_latency);
                let bandwidth = range(&mut rng, config.edge_bandwidth);
                builder = builder.edge(&node(i), &node(j), latency, bandwidth);
            }
        }
    }

    for i in 0..config.vnfs {
        let compute = range(&mut rng, config.vnf_demand);
        let memory = range(&mut rng, config.vnf_demand);
        builder = builder.vnf(&vnf(i), compute, memory);
    }

    let mut pool: Vec<usize> = (0..config.vnfs).collect();
    for i in 0..config.sfcs {
        pool.shuffle(&mut rng);
        let chain: Vec<String> = pool[..config.chain_len].iter().map(|v| vnf(*v)).collect();
        let chain: Vec<&str> = chain.iter().map(String::as_str).collect();
        let bandwidth = range(&mut rng, config.sfc_bandwidth);
        let budget = range(&mut rng, config.latency_budget);
        let origin = node(rng.random_range(0..config.nodes));
        builder = builder.sfc(&format!("s{i}"), &chain, bandwidth, budget, &origin);
    }

    builder.document()
}

/// [`random_document`], validated.
pub fn random_scenario(seed: u64, config: &RandomConfig) -> Scenario {
    Scenario::from_document(&random_document(seed, config))
        .expect("generated scenario must be valid")
}
