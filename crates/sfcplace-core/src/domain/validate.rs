//! Document validation and indexing.

use std::collections::{HashMap, HashSet};

use super::document::ScenarioDocument;
use super::entity::{Chain, Edge, EdgeId, Node, NodeId, Sfc, SfcId, Vnf, VnfId};
use super::Scenario;
use crate::error::{Result, SfcError};

/// Shortest chain accepted; a chain starts and ends on its origin node.
pub const MIN_CHAIN_LEN: usize = 3;

/// Largest accepted capacity, demand, latency or budget (2^40).
///
/// Keeps every linear sum of the decision model well inside `i64`.
pub const MAX_QUANTITY: u64 = 1 << 40;

fn positive(path: String, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(SfcError::malformed(path, "must be a positive integer"));
    }
    if value > MAX_QUANTITY {
        return Err(SfcError::malformed(
            path,
            format!("must not exceed {MAX_QUANTITY}"),
        ));
    }
    Ok(value)
}

fn identifier(path: String, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(SfcError::malformed(path, "identifier must not be empty"));
    }
    Ok(value.to_string())
}

fn register<I: Copy>(
    index: &mut HashMap<String, I>,
    path: String,
    name: &str,
    id: I,
) -> Result<()> {
    if index.insert(name.to_string(), id).is_some() {
        return Err(SfcError::malformed(
            path,
            format!("duplicate identifier `{name}`"),
        ));
    }
    Ok(())
}

pub(super) fn build(doc: &ScenarioDocument) -> Result<Scenario> {
    let mut node_index = HashMap::with_capacity(doc.nodes.len());
    let mut nodes = Vec::with_capacity(doc.nodes.len());
    for (i, spec) in doc.nodes.iter().enumerate() {
        let id = NodeId(i);
        let name = identifier(format!("nodes[{i}].id"), &spec.id)?;
        register(&mut node_index, format!("nodes[{i}].id"), &name, id)?;
        nodes.push(Node {
            id,
            name,
            compute: positive(format!("nodes[{i}].compute"), spec.compute)?,
            memory: positive(format!("nodes[{i}].memory"), spec.memory)?,
        });
    }

    let lookup_node = |path: String, name: &str| -> Result<NodeId> {
        node_index
            .get(name)
            .copied()
            .ok_or_else(|| SfcError::malformed(path, format!("unknown node `{name}`")))
    };

    let mut seen_pairs: HashSet<(NodeId, NodeId)> = HashSet::with_capacity(doc.edges.len());
    let mut edges = Vec::with_capacity(doc.edges.len());
    for (i, spec) in doc.edges.iter().enumerate() {
        let a = lookup_node(format!("edges[{i}].a"), &spec.a)?;
        let b = lookup_node(format!("edges[{i}].b"), &spec.b)?;
        if a == b {
            return Err(SfcError::malformed(
                format!("edges[{i}]"),
                format!("self-loop on node `{}`", spec.a),
            ));
        }
        if !seen_pairs.insert((a.min(b), a.max(b))) {
            return Err(SfcError::malformed(
                format!("edges[{i}]"),
                format!("parallel edge between `{}` and `{}`", spec.a, spec.b),
            ));
        }
        edges.push(Edge {
            id: EdgeId(i),
            a,
            b,
            latency: positive(format!("edges[{i}].latency"), spec.latency)?,
            bandwidth: positive(format!("edges[{i}].bandwidth"), spec.bandwidth)?,
        });
    }

    let mut vnf_index = HashMap::with_capacity(doc.vnfs.len());
    let mut vnfs = Vec::with_capacity(doc.vnfs.len());
    for (i, spec) in doc.vnfs.iter().enumerate() {
        let id = VnfId(i);
        let name = identifier(format!("vnfs[{i}].id"), &spec.id)?;
        register(&mut vnf_index, format!("vnfs[{i}].id"), &name, id)?;
        vnfs.push(Vnf {
            id,
            name,
            compute: positive(format!("vnfs[{i}].compute"), spec.compute)?,
            memory: positive(format!("vnfs[{i}].memory"), spec.memory)?,
        });
    }

    let mut sfc_index = HashMap::with_capacity(doc.sfcs.len());
    let mut sfcs = Vec::with_capacity(doc.sfcs.len());
    for (i, spec) in doc.sfcs.iter().enumerate() {
        let id = SfcId(i);
        let name = identifier(format!("sfcs[{i}].id"), &spec.id)?;
        register(&mut sfc_index, format!("sfcs[{i}].id"), &name, id)?;

        if spec.chain.len() < MIN_CHAIN_LEN {
            return Err(SfcError::malformed(
                format!("sfcs[{i}].chain"),
                format!(
                    "chain has {} VNFs, at least {MIN_CHAIN_LEN} are required",
                    spec.chain.len()
                ),
            ));
        }
        let mut chain = Chain::with_capacity(spec.chain.len());
        for (j, vnf_name) in spec.chain.iter().enumerate() {
            let path = format!("sfcs[{i}].chain[{j}]");
            let vnf = vnf_index
                .get(vnf_name.as_str())
                .copied()
                .ok_or_else(|| SfcError::malformed(path.clone(), format!("unknown VNF `{vnf_name}`")))?;
            if chain.contains(&vnf) {
                return Err(SfcError::malformed(
                    path,
                    format!("VNF `{vnf_name}` appears more than once in the chain"),
                ));
            }
            chain.push(vnf);
        }

        sfcs.push(Sfc {
            id,
            name,
            chain,
            bandwidth: positive(format!("sfcs[{i}].bandwidth"), spec.bandwidth)?,
            latency_budget: positive(format!("sfcs[{i}].latency_budget"), spec.latency_budget)?,
            origin: lookup_node(format!("sfcs[{i}].origin"), &spec.origin)?,
        });
    }

    Ok(Scenario {
        nodes,
        edges,
        vnfs,
        sfcs,
        node_index,
        vnf_index,
        sfc_index,
    })
}
