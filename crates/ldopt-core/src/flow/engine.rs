use crate::flow::graph::FlowArc;
use crate::flow::{canceling, cost_scaling, simplex, ssp};
use crate::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostScalingMethod {
    Push,
    Augment,
    #[default]
    PartialAugment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    FirstEligible,
    BestEligible,
    #[default]
    BlockSearch,
    CandidateList,
    AlteringList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleCancelingMethod {
    Simple,
    MinMean,
    #[default]
    CancelAndTighten,
}

/// Engine choice with its algorithm-specific parameter bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McfEngine {
    CapacityScaling { factor: i64 },
    CostScaling { method: CostScalingMethod, factor: i64 },
    NetworkSimplex { pivot_rule: PivotRule },
    CycleCanceling { method: CycleCancelingMethod },
}

impl McfEngine {
    pub fn capacity_scaling() -> Self {
        McfEngine::CapacityScaling { factor: 4 }
    }

    pub fn cost_scaling() -> Self {
        McfEngine::CostScaling {
            method: CostScalingMethod::default(),
            factor: 16,
        }
    }

    pub fn network_simplex() -> Self {
        McfEngine::NetworkSimplex {
            pivot_rule: PivotRule::default(),
        }
    }

    pub fn cycle_canceling() -> Self {
        McfEngine::CycleCanceling {
            method: CycleCancelingMethod::default(),
        }
    }
}

impl Default for McfEngine {
    fn default() -> Self {
        Self::network_simplex()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EngineSolution {
    pub flows: Vec<i64>,
    pub potentials: Vec<i64>,
    pub cost: i128,
}

/// Runs the selected engine on a rewritten graph (costs >= 0, supplies
/// balanced) and extracts flows, potentials, and the flow cost.
pub(crate) fn run(
    engine: &McfEngine,
    node_count: usize,
    arcs: &[FlowArc],
    supplies: &[i64],
) -> Result<EngineSolution, FlowError> {
    debug_assert!(arcs.iter().all(|arc| arc.cost >= 0));
    debug_assert_eq!(supplies.iter().map(|&s| s as i128).sum::<i128>(), 0);

    let network = match *engine {
        McfEngine::CapacityScaling { factor } => {
            if factor < 1 {
                return Err(FlowError::InvalidInput(format!(
                    "capacity scaling factor must be at least 1, got {factor}"
                )));
            }
            ssp::solve(node_count, arcs, supplies, factor)?
        }
        McfEngine::CostScaling { method, factor } => {
            if factor < 2 {
                return Err(FlowError::InvalidInput(format!(
                    "cost scaling factor must be at least 2, got {factor}"
                )));
            }
            cost_scaling::solve(node_count, arcs, supplies, method, factor)?
        }
        McfEngine::NetworkSimplex { pivot_rule } => {
            simplex::solve(node_count, arcs, supplies, pivot_rule)?
        }
        McfEngine::CycleCanceling { method } => canceling::solve(node_count, arcs, supplies, method)?,
    };

    let flows = network.arc_flows();
    let mut potentials = network.potentials();
    potentials.truncate(node_count);
    let cost = network.flow_cost(arcs);
    Ok(EngineSolution {
        flows,
        potentials,
        cost,
    })
}
