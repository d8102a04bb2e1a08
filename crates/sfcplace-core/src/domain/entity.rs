//! Static entities of the placement problem.

use std::fmt;

use smallvec::SmallVec;

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

index_id!(
    /// Dense index of a [`Node`] in document order.
    NodeId,
    "node"
);
index_id!(
    /// Dense index of an [`Edge`] in document order.
    EdgeId,
    "edge"
);
index_id!(
    /// Dense index of a [`Vnf`] in document order.
    VnfId,
    "vnf"
);
index_id!(
    /// Dense index of an [`Sfc`] in document order.
    SfcId,
    "sfc"
);

/// A compute node of the physical network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub compute: u64,
    pub memory: u64,
}

/// An undirected link between two distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub a: NodeId,
    pub b: NodeId,
    pub latency: u64,
    pub bandwidth: u64,
}

impl Edge {
    /// True if this edge joins `x` and `y`, in either orientation.
    #[inline]
    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// Returns the endpoint opposite to `node`, if `node` is an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }
}

/// A virtual network function with its resource demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vnf {
    pub id: VnfId,
    pub name: String,
    pub compute: u64,
    pub memory: u64,
}

/// Ordered VNF sequence of a service chain.
pub type Chain = SmallVec<[VnfId; 8]>;

/// One consecutive VNF pair of a chain; `index` is the position of `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub index: usize,
    pub from: VnfId,
    pub to: VnfId,
}

/// A service function chain, admitted or rejected as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sfc {
    pub id: SfcId,
    pub name: String,
    pub chain: Chain,
    pub bandwidth: u64,
    pub latency_budget: u64,
    pub origin: NodeId,
}

impl Sfc {
    /// First VNF of the chain; pinned to the origin node when admitted.
    pub fn head(&self) -> VnfId {
        self.chain[0]
    }

    /// Last VNF of the chain; pinned to the origin node when admitted.
    pub fn tail(&self) -> VnfId {
        self.chain[self.chain.len() - 1]
    }

    pub fn contains(&self, vnf: VnfId) -> bool {
        self.chain.contains(&vnf)
    }

    pub fn hop_count(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// Consecutive VNF pairs, in chain order.
    pub fn hops(&self) -> impl Iterator<Item = Hop> + '_ {
        self.chain.windows(2).enumerate().map(|(index, pair)| Hop {
            index,
            from: pair[0],
            to: pair[1],
        })
    }

    /// The VNF following `vnf` in the chain, or `None` for the last one.
    pub fn next_after(&self, vnf: VnfId) -> Option<VnfId> {
        let position = self.chain.iter().position(|v| *v == vnf)?;
        self.chain.get(position + 1).copied()
    }
}
