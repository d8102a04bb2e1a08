//! Structured placement reports.
//!
//! A [`PlacementReport`] names every entity by its document identifier, so
//! it serializes to self-describing JSON. [`PlacementReport::violations`]
//! re-checks the placement invariants against the scenario without going
//! through the decision model.

#[cfg(test)]
mod tests;

use serde::Serialize;
use thiserror::Error;

use sfcplace_core::{NodeId, Scenario, Topology};
use sfcplace_model::{DecisionModel, VarId};

use crate::outcome::{ResultKind, SolveOutcome};
use crate::stats::SolverStats;

/// Where a VNF ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VnfPlacement {
    pub vnf: String,
    /// `None` when the VNF is unplaced.
    pub node: Option<String>,
    /// Further nodes claimed by an invalid assignment.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub also_on: Vec<String>,
}

/// Admission of one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SfcAdmission {
    pub sfc: String,
    pub admitted: bool,
    /// Summed shortest-path latency of the hops; admitted chains only.
    pub routed_latency: Option<u64>,
}

/// Routed bandwidth over one edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkUsage {
    pub a: String,
    pub b: String,
    pub used: u64,
    pub capacity: u64,
}

/// One constraint of an infeasibility explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictMember {
    pub name: String,
    pub group: String,
}

/// A broken placement invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("VNF `{vnf}` is placed on {count} nodes")]
    MultiplePlacements { vnf: String, count: usize },

    #[error("SFC `{sfc}` is admitted but its VNF `{vnf}` is unplaced")]
    UnplacedChainVnf { sfc: String, vnf: String },

    #[error("SFC `{sfc}` is admitted but its endpoint `{vnf}` is not on origin `{origin}`")]
    EndpointOffOrigin {
        sfc: String,
        vnf: String,
        origin: String,
    },

    #[error("Node `{node}` carries {demand} compute, capacity {capacity}")]
    ComputeOverload {
        node: String,
        demand: u64,
        capacity: u64,
    },

    #[error("Node `{node}` carries {demand} memory, capacity {capacity}")]
    MemoryOverload {
        node: String,
        demand: u64,
        capacity: u64,
    },

    #[error("Edge `{a}`-`{b}` carries {used} bandwidth, capacity {capacity}")]
    BandwidthOverload {
        a: String,
        b: String,
        used: u64,
        capacity: u64,
    },

    #[error("SFC `{sfc}` routes {latency} latency, budget {budget}")]
    LatencyExceeded {
        sfc: String,
        latency: u64,
        budget: u64,
    },

    #[error("SFC `{sfc}` has a hop between disconnected nodes `{from}` and `{to}`")]
    Unroutable { sfc: String, from: String, to: String },

    #[error("Report names unknown entity `{name}`")]
    UnknownEntity { name: String },
}

/// Outcome of a solve, in document terms.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementReport {
    pub kind: ResultKind,
    pub proven_optimal: bool,
    pub objective: Option<i64>,
    pub placements: Vec<VnfPlacement>,
    pub admissions: Vec<SfcAdmission>,
    pub links: Vec<LinkUsage>,
    pub stats: SolverStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<Vec<ConflictMember>>,
}

impl PlacementReport {
    /// Builds the report of `outcome`, which was solved on `model`.
    ///
    /// Without an assignment every VNF is unplaced and every chain rejected.
    pub fn from_outcome(
        scenario: &Scenario,
        topology: &Topology,
        model: &DecisionModel,
        outcome: &SolveOutcome,
    ) -> Self {
        let values = outcome.values.as_deref();
        let is_set = |var: VarId| values.is_some_and(|v| v[var.index()]);

        let nodes_of: Vec<Vec<NodeId>> = scenario
            .vnfs()
            .iter()
            .map(|vnf| {
                scenario
                    .nodes()
                    .iter()
                    .map(|node| node.id)
                    .filter(|node| is_set(model.place_var(vnf.id, *node)))
                    .collect()
            })
            .collect();
        let location: Vec<Option<NodeId>> =
            nodes_of.iter().map(|nodes| nodes.first().copied()).collect();

        let placements = scenario
            .vnfs()
            .iter()
            .map(|vnf| {
                let nodes = &nodes_of[vnf.id.index()];
                VnfPlacement {
                    vnf: vnf.name.clone(),
                    node: nodes.first().map(|n| scenario.node(*n).name.clone()),
                    also_on: nodes
                        .iter()
                        .skip(1)
                        .map(|n| scenario.node(*n).name.clone())
                        .collect(),
                }
            })
            .collect();

        let admitted: Vec<bool> = scenario
            .sfcs()
            .iter()
            .map(|sfc| is_set(model.admit_var(sfc.id)))
            .collect();
        let admissions = scenario
            .sfcs()
            .iter()
            .map(|sfc| {
                let admitted = admitted[sfc.id.index()];
                SfcAdmission {
                    sfc: sfc.name.clone(),
                    admitted,
                    routed_latency: if admitted {
                        routed_latency(scenario, topology, &location, sfc.id.index())
                    } else {
                        None
                    },
                }
            })
            .collect();

        let used = link_usage(scenario, topology, &location, &admitted);
        let links = scenario
            .edges()
            .iter()
            .map(|edge| LinkUsage {
                a: scenario.node(edge.a).name.clone(),
                b: scenario.node(edge.b).name.clone(),
                used: used[edge.id.index()],
                capacity: edge.bandwidth,
            })
            .collect();

        let conflict = outcome.conflict.as_ref().map(|members| {
            members
                .iter()
                .map(|c| {
                    let constraint = model.constraint(*c);
                    ConflictMember {
                        name: constraint.name.clone(),
                        group: constraint.group.as_str().to_string(),
                    }
                })
                .collect()
        });

        Self {
            kind: outcome.kind,
            proven_optimal: outcome.is_proven_optimal(),
            objective: outcome.objective,
            placements,
            admissions,
            links,
            stats: outcome.stats.clone(),
            conflict,
        }
    }

    pub fn has_solution(&self) -> bool {
        self.objective.is_some()
    }

    pub fn admitted_count(&self) -> usize {
        self.admissions.iter().filter(|a| a.admitted).count()
    }

    /// Node of the named VNF, if it is placed.
    pub fn node_of(&self, vnf: &str) -> Option<&str> {
        self.placements
            .iter()
            .find(|p| p.vnf == vnf)
            .and_then(|p| p.node.as_deref())
    }

    pub fn is_admitted(&self, sfc: &str) -> bool {
        self.admissions.iter().any(|a| a.sfc == sfc && a.admitted)
    }

    /// Re-checks uniqueness, chain placement, origin pinning, node
    /// capacities, link bandwidth and latency budgets.
    ///
    /// Loads, routes and latencies are recomputed from the placements;
    /// the report's `links` and `routed_latency` are not trusted.
    pub fn violations(&self, scenario: &Scenario, topology: &Topology) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut location: Vec<Option<NodeId>> = vec![None; scenario.vnf_count()];
        let mut admitted = vec![false; scenario.sfc_count()];

        for placement in &self.placements {
            let Some(vnf) = scenario.vnf_by_name(&placement.vnf) else {
                violations.push(Violation::UnknownEntity {
                    name: placement.vnf.clone(),
                });
                continue;
            };
            if !placement.also_on.is_empty() {
                violations.push(Violation::MultiplePlacements {
                    vnf: placement.vnf.clone(),
                    count: placement.also_on.len() + 1,
                });
            }
            if let Some(node) = &placement.node {
                match scenario.node_by_name(node) {
                    Some(node) => location[vnf.index()] = Some(node),
                    None => violations.push(Violation::UnknownEntity { name: node.clone() }),
                }
            }
        }
        for admission in self.admissions.iter().filter(|a| a.admitted) {
            match scenario.sfc_by_name(&admission.sfc) {
                Some(sfc) => admitted[sfc.index()] = true,
                None => violations.push(Violation::UnknownEntity {
                    name: admission.sfc.clone(),
                }),
            }
        }

        for sfc in scenario.sfcs().iter().filter(|s| admitted[s.id.index()]) {
            let origin = scenario.node(sfc.origin);
            for &vnf in &sfc.chain {
                if location[vnf.index()].is_none() {
                    violations.push(Violation::UnplacedChainVnf {
                        sfc: sfc.name.clone(),
                        vnf: scenario.vnf(vnf).name.clone(),
                    });
                }
            }
            for end in [sfc.head(), sfc.tail()] {
                if location[end.index()].is_some_and(|n| n != sfc.origin) {
                    violations.push(Violation::EndpointOffOrigin {
                        sfc: sfc.name.clone(),
                        vnf: scenario.vnf(end).name.clone(),
                        origin: origin.name.clone(),
                    });
                }
            }
            for hop in sfc.hops() {
                let (Some(from), Some(to)) = (location[hop.from.index()], location[hop.to.index()])
                else {
                    continue;
                };
                if !topology.is_reachable(from, to) {
                    violations.push(Violation::Unroutable {
                        sfc: sfc.name.clone(),
                        from: scenario.node(from).name.clone(),
                        to: scenario.node(to).name.clone(),
                    });
                }
            }
            if let Some(latency) = routed_latency(scenario, topology, &location, sfc.id.index()) {
                if latency > sfc.latency_budget {
                    violations.push(Violation::LatencyExceeded {
                        sfc: sfc.name.clone(),
                        latency,
                        budget: sfc.latency_budget,
                    });
                }
            }
        }

        let mut compute = vec![0u64; scenario.node_count()];
        let mut memory = vec![0u64; scenario.node_count()];
        for vnf in scenario.vnfs() {
            if let Some(node) = location[vnf.id.index()] {
                compute[node.index()] += vnf.compute;
                memory[node.index()] += vnf.memory;
            }
        }
        for node in scenario.nodes() {
            let i = node.id.index();
            if compute[i] > node.compute {
                violations.push(Violation::ComputeOverload {
                    node: node.name.clone(),
                    demand: compute[i],
                    capacity: node.compute,
                });
            }
            if memory[i] > node.memory {
                violations.push(Violation::MemoryOverload {
                    node: node.name.clone(),
                    demand: memory[i],
                    capacity: node.memory,
                });
            }
        }

        let used = link_usage(scenario, topology, &location, &admitted);
        for edge in scenario.edges() {
            let used = used[edge.id.index()];
            if used > edge.bandwidth {
                violations.push(Violation::BandwidthOverload {
                    a: scenario.node(edge.a).name.clone(),
                    b: scenario.node(edge.b).name.clone(),
                    used,
                    capacity: edge.bandwidth,
                });
            }
        }

        violations
    }
}

/// Latency of a fully placed and routable chain.
fn routed_latency(
    scenario: &Scenario,
    topology: &Topology,
    location: &[Option<NodeId>],
    sfc: usize,
) -> Option<u64> {
    let sfc = &scenario.sfcs()[sfc];
    sfc.hops().try_fold(0u64, |total, hop| {
        let from = location[hop.from.index()]?;
        let to = location[hop.to.index()]?;
        Some(total + topology.distance(from, to)?)
    })
}

/// Bandwidth each edge carries for the admitted chains' placed hops.
fn link_usage(
    scenario: &Scenario,
    topology: &Topology,
    location: &[Option<NodeId>],
    admitted: &[bool],
) -> Vec<u64> {
    let mut used = vec![0u64; scenario.edges().len()];
    for sfc in scenario.sfcs().iter().filter(|s| admitted[s.id.index()]) {
        for hop in sfc.hops() {
            let (Some(from), Some(to)) = (location[hop.from.index()], location[hop.to.index()])
            else {
                continue;
            };
            let Ok(edges) = topology.shortest_path_edges(from, to) else {
                continue;
            };
            for edge in edges {
                used[edge.index()] += sfc.bandwidth;
            }
        }
    }
    used
}
