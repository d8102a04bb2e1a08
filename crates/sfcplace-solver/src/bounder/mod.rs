//! Cheap admission pre-check on aggregate compute and memory.
//!
//! Ignores routing entirely. A set of chains that fails here cannot be
//! admitted together, so the placement search is skipped for it.


use sfcplace_model::{AdmissionBlock, DecisionModel, ResourceRelaxation};

/// Relaxation of the capacity and pinning constraints.
#[derive(Debug, Clone)]
pub struct ResourceBounder<'m> {
    relaxation: &'m ResourceRelaxation,
    admissions: &'m [AdmissionBlock],
    total: [i64; 2],
    largest: [i64; 2],
}

impl<'m> ResourceBounder<'m> {
    pub fn new(model: &'m DecisionModel) -> Self {
        let relaxation = model.relaxation();
        Self {
            relaxation,
            admissions: model.admissions(),
            total: relaxation.total_capacity(),
            largest: relaxation.max_node_capacity(),
        }
    }

    /// False if the chains flagged in `admitted` provably cannot all fit.
    ///
    /// Checks, per resource: the summed demand of all required VNFs
    /// against the summed capacity; every required VNF against the largest
    /// node; and the VNFs pinned to each origin against that origin.
    pub fn admits(&self, admitted: &[bool]) -> bool {
        let vnf_count = self.relaxation.vnf_demand.len();
        let mut required = vec![false; vnf_count];
        let mut pinned: Vec<Option<usize>> = vec![None; vnf_count];

        for block in self
            .admissions
            .iter()
            .filter(|b| admitted.get(b.sfc.index()).copied().unwrap_or(false))
        {
            for &vnf in &block.chain {
                required[vnf] = true;
            }
            let origin = block.origin.index();
            for end in [block.chain.first(), block.chain.last()].into_iter().flatten() {
                match pinned[*end] {
                    Some(node) if node != origin => return false,
                    _ => pinned[*end] = Some(origin),
                }
            }
        }

        let mut demand = [0i64; 2];
        let mut at_origin = vec![[0i64; 2]; self.relaxation.node_capacity.len()];
        for vnf in (0..vnf_count).filter(|v| required[*v]) {
            let need = self.relaxation.vnf_demand[vnf];
            for r in 0..2 {
                if need[r] > self.largest[r] {
                    return false;
                }
                demand[r] += need[r];
            }
            if let Some(origin) = pinned[vnf] {
                for r in 0..2 {
                    at_origin[origin][r] += need[r];
                }
            }
        }

        (0..2).all(|r| demand[r] <= self.total[r])
            && at_origin
                .iter()
                .zip(&self.relaxation.node_capacity)
                .all(|(used, capacity)| used[0] <= capacity[0] && used[1] <= capacity[1])
    }
}
