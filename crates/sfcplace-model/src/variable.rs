//! Binary decision variables.

use std::fmt;

use smallvec::SmallVec;

use sfcplace_core::{NodeId, SfcId, VnfId};

/// Dense index of a variable in its [`DecisionModel`](crate::DecisionModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

impl VarId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// What a binary variable decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// `vnf` is hosted on `node`.
    Place { vnf: VnfId, node: NodeId },

    /// `sfc` is admitted.
    Admit { sfc: SfcId },

    /// Hop `hop` of an admitted `sfc` runs from `from` to `to`.
    Uses {
        sfc: SfcId,
        hop: usize,
        from: NodeId,
        to: NodeId,
    },
}

impl VarKind {
    pub fn is_admit(&self) -> bool {
        matches!(self, VarKind::Admit { .. })
    }

    pub fn is_place(&self) -> bool {
        matches!(self, VarKind::Place { .. })
    }

    pub fn is_uses(&self) -> bool {
        matches!(self, VarKind::Uses { .. })
    }
}

/// Conjunction defining an auxiliary variable: it is 1 iff all factors are 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product(pub SmallVec<[VarId; 3]>);

impl Product {
    pub fn factors(&self) -> &[VarId] {
        &self.0
    }
}

/// A binary decision variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub id: VarId,
    pub kind: VarKind,
    /// LP-safe unique name.
    pub name: String,
    /// Set for auxiliary variables introduced by linearization.
    pub definition: Option<Product>,
}
