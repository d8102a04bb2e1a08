//! Topology graph with cached shortest-path queries.
//!
//! The graph is undirected and weighted by edge latency. Shortest-path trees
//! are computed lazily per source with Dijkstra and memoized in a
//! [`OnceLock`], so a `Topology` can be shared across search threads
//! without locking.
//!
//! # Tie-breaking
//!
//! The frontier is ordered by `(distance, node index)` and a predecessor is
//! only replaced on a strictly shorter distance. Among equally short paths
//! the one discovered through the lowest-indexed settled node wins, which
//! makes every query deterministic for a fixed graph.


use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::OnceLock;

use smallvec::SmallVec;

use crate::domain::{EdgeId, NodeId, Scenario};
use crate::error::{Result, SfcError};

/// Shortest-path tree rooted at one source node.
#[derive(Debug, Clone)]
struct PathTree {
    distance: Vec<Option<u64>>,
    /// Predecessor node and the edge used to reach each node.
    parent: Vec<Option<(NodeId, EdgeId)>>,
}

type Adjacency = SmallVec<[(NodeId, EdgeId, u64); 4]>;

/// Undirected latency-weighted graph of the physical network.
#[derive(Debug)]
pub struct Topology {
    names: Vec<String>,
    /// Adjacency lists sorted by neighbour index: `(neighbour, edge, latency)`.
    adjacency: Vec<Adjacency>,
    edge_ends: Vec<(NodeId, NodeId)>,
    trees: Vec<OnceLock<PathTree>>,
}

impl Topology {
    /// Builds the graph from a validated scenario.
    pub fn new(scenario: &Scenario) -> Self {
        let node_count = scenario.node_count();
        let mut adjacency: Vec<Adjacency> = vec![SmallVec::new(); node_count];
        for edge in scenario.edges() {
            adjacency[edge.a.index()].push((edge.b, edge.id, edge.latency));
            adjacency[edge.b.index()].push((edge.a, edge.id, edge.latency));
        }
        for neighbours in &mut adjacency {
            neighbours.sort_by_key(|(node, edge, _)| (*node, *edge));
        }

        Self {
            names: scenario.nodes().iter().map(|n| n.name.clone()).collect(),
            adjacency,
            edge_ends: scenario.edges().iter().map(|e| (e.a, e.b)).collect(),
            trees: (0..node_count).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_ends.len()
    }

    /// Endpoints of an edge, in document orientation.
    pub fn endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        self.edge_ends[edge.index()]
    }

    /// Neighbours of `node` with the connecting edge, by neighbour index.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        self.adjacency[node.index()]
            .iter()
            .map(|(other, edge, _)| (*other, *edge))
    }

    fn tree(&self, source: NodeId) -> &PathTree {
        self.trees[source.index()].get_or_init(|| self.dijkstra(source))
    }

    fn dijkstra(&self, source: NodeId) -> PathTree {
        let n = self.node_count();
        let mut distance: Vec<Option<u64>> = vec![None; n];
        let mut parent: Vec<Option<(NodeId, EdgeId)>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut frontier = BinaryHeap::new();

        distance[source.index()] = Some(0);
        frontier.push(Reverse((0u64, source.index())));

        while let Some(Reverse((dist, node))) = frontier.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;

            for &(next, edge, latency) in &self.adjacency[node] {
                if settled[next.index()] {
                    continue;
                }
                let candidate = dist + latency;
                let improves = match distance[next.index()] {
                    None => true,
                    Some(current) => candidate < current,
                };
                if improves {
                    distance[next.index()] = Some(candidate);
                    parent[next.index()] = Some((NodeId(node), edge));
                    frontier.push(Reverse((candidate, next.index())));
                }
            }
        }

        PathTree { distance, parent }
    }

    fn no_route(&self, from: NodeId, to: NodeId) -> SfcError {
        SfcError::NoRoute {
            from: self.names[from.index()].clone(),
            to: self.names[to.index()].clone(),
        }
    }

    /// Latency of the shortest path, or `None` across components.
    pub fn distance(&self, from: NodeId, to: NodeId) -> Option<u64> {
        self.tree(from).distance[to.index()]
    }

    pub fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        self.distance(from, to).is_some()
    }

    /// Edges along the shortest path from `from` to `to`, in travel order.
    ///
    /// # Errors
    ///
    /// Returns [`SfcError::NoRoute`] if the nodes are disconnected.
    pub fn shortest_path_edges(&self, from: NodeId, to: NodeId) -> Result<Vec<EdgeId>> {
        let tree = self.tree(from);
        if tree.distance[to.index()].is_none() {
            return Err(self.no_route(from, to));
        }
        let mut edges = Vec::new();
        let mut current = to;
        while current != from {
            // Reachable nodes other than the source always have a parent.
            let Some((prev, edge)) = tree.parent[current.index()] else {
                return Err(self.no_route(from, to));
            };
            edges.push(edge);
            current = prev;
        }
        edges.reverse();
        Ok(edges)
    }

    /// Nodes along the shortest path, both endpoints included.
    ///
    /// # Errors
    ///
    /// Returns [`SfcError::NoRoute`] if the nodes are disconnected.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>> {
        let edges = self.shortest_path_edges(from, to)?;
        let mut nodes = Vec::with_capacity(edges.len() + 1);
        nodes.push(from);
        let mut current = from;
        for edge in edges {
            let (a, b) = self.endpoints(edge);
            current = if a == current { b } else { a };
            nodes.push(current);
        }
        Ok(nodes)
    }

    /// Sum of edge latencies along the shortest path; 0 when `from == to`.
    ///
    /// # Errors
    ///
    /// Returns [`SfcError::NoRoute`] if the nodes are disconnected.
    pub fn shortest_path_length(&self, from: NodeId, to: NodeId) -> Result<u64> {
        self.distance(from, to)
            .ok_or_else(|| self.no_route(from, to))
    }

    /// True iff `edge` joins two consecutive nodes of `shortest_path(from, to)`.
    ///
    /// Disconnected pairs have no path, so no edge lies on it.
    pub fn edge_on_shortest_path(&self, edge: EdgeId, from: NodeId, to: NodeId) -> bool {
        self.shortest_path_edges(from, to)
            .map(|edges| edges.contains(&edge))
            .unwrap_or(false)
    }
}
