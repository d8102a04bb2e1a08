//! Greedy construction phase.

use std::time::Instant;

use tracing::{debug, info};

use sfcplace_config::ConstructionHeuristicType;
use sfcplace_model::DecisionModel;

use super::{greedy_admission, AdmissionOracle, Phase, SearchContext};
use crate::scope::Incumbent;
use crate::termination::Termination;

/// Order in which the construction phase tries chains.
///
/// First fit keeps document order. First fit decreasing sorts by total
/// compute plus memory demand, smallest first, so that more chains fit;
/// ties keep document order.
pub fn admission_order(model: &DecisionModel, heuristic: ConstructionHeuristicType) -> Vec<usize> {
    let mut order: Vec<usize> = (0..model.admissions().len()).collect();
    if heuristic == ConstructionHeuristicType::FirstFitDecreasing {
        let demand = &model.relaxation().vnf_demand;
        order.sort_by_key(|&sfc| {
            model.admissions()[sfc]
                .chain
                .iter()
                .map(|&vnf| demand[vnf][0] + demand[vnf][1])
                .sum::<i64>()
        });
    }
    order
}

/// Admits chains greedily and offers the result as the first incumbent.
#[derive(Debug, Clone)]
pub struct ConstructionPhase {
    heuristic: ConstructionHeuristicType,
    admitted: Vec<bool>,
}

impl ConstructionPhase {
    pub fn new(heuristic: ConstructionHeuristicType) -> Self {
        Self {
            heuristic,
            admitted: Vec::new(),
        }
    }

    /// Chains admitted by the last run.
    pub fn admitted(&self) -> &[bool] {
        &self.admitted
    }
}

impl<T: Termination> Phase<T> for ConstructionPhase {
    fn solve(&mut self, context: &SearchContext<'_, T>) {
        let started = Instant::now();
        info!(
            event = "phase_start",
            phase_name = "Construction Heuristic",
            phase_index = 0u64,
            "Phase started"
        );

        let order = admission_order(context.model, self.heuristic);
        let mut oracle = AdmissionOracle::new();
        let result = greedy_admission(context, &mut oracle, &order);

        if let Some(values) = result.values {
            let objective = result.objective;
            if context.scope.offer(Incumbent {
                objective,
                values,
                subtree: None,
            }) {
                debug!(
                    event = "new_best",
                    step = order.len() as u64,
                    score = %objective,
                    "New best solution"
                );
            }
        }
        self.admitted = result.admitted;

        let best = context
            .scope
            .best_objective()
            .map_or_else(|| "none".to_string(), |o| o.to_string());
        info!(
            event = "phase_end",
            phase_name = "Construction Heuristic",
            phase_index = 0u64,
            duration_ms = started.elapsed().as_millis() as u64,
            steps = order.len() as u64,
            best_score = %best,
            "Phase ended"
        );
    }

    fn phase_type_name(&self) -> &'static str {
        "ConstructionHeuristic"
    }
}
