mod canceling;
mod cost_scaling;
pub mod engine;
mod graph;
pub mod model;
mod network;
mod simplex;
mod ssp;

pub use engine::{CostScalingMethod, CycleCancelingMethod, McfEngine, PivotRule};
pub use model::{ConstraintSense, LinearModel, VarId};

use crate::FlowError;

#[derive(Debug, Clone, Copy)]
pub struct SolveStats {
    pub nodes: usize,
    pub arcs: usize,
    pub reversed_arcs: usize,
    pub big_m: i64,
}

#[derive(Debug, Clone)]
pub struct DualMcfSolution {
    pub values: Vec<i64>,
    /// Optimal arc flows in the pre-rewrite orientation, the dual (slack)
    /// solution of the LP.
    pub dual_flows: Vec<i64>,
    pub objective: i128,
    pub flow_cost: i128,
    pub stats: SolveStats,
}

/// Solves the difference-constraint LP by dualizing to min-cost flow.
/// Node potentials decode the primal (`x_i = pi_i - pi_0`); the objective is
/// recovered from the engine cost plus the reversed-arc correction. On
/// success the solution is written into the model once.
pub fn solve(model: &mut LinearModel, engine: &McfEngine) -> Result<DualMcfSolution, FlowError> {
    let n = model.variable_count();
    if n == 0 {
        model.set_solution(Vec::new());
        return Ok(DualMcfSolution {
            values: Vec::new(),
            dual_flows: Vec::new(),
            objective: 0,
            flow_cost: 0,
            stats: SolveStats {
                nodes: 0,
                arcs: 0,
                reversed_arcs: 0,
                big_m: 0,
            },
        });
    }

    let flow_graph = graph::build(model)?;
    let stats = SolveStats {
        nodes: flow_graph.node_count(),
        arcs: flow_graph.arcs.len(),
        reversed_arcs: flow_graph.reversed_arcs,
        big_m: flow_graph.big_m,
    };

    let outcome = engine::run(
        engine,
        flow_graph.node_count(),
        &flow_graph.arcs,
        &flow_graph.supplies,
    )?;

    let source = flow_graph.source_node();
    let values: Vec<i64> = (0..n)
        .map(|var| outcome.potentials[var] - outcome.potentials[source])
        .collect();

    // reversal maps flow f back to capacity - f on the original orientation
    let dual_flows: Vec<i64> = flow_graph
        .arcs
        .iter()
        .zip(outcome.flows.iter())
        .map(|(arc, &flow)| {
            if arc.reversed {
                arc.capacity - flow
            } else {
                flow
            }
        })
        .collect();

    let flow_cost = outcome.cost + flow_graph.reversed_cost_offset;
    let objective: i128 = model
        .costs()
        .zip(values.iter())
        .map(|(cost, &x)| cost as i128 * x as i128)
        .sum();
    debug_assert_eq!(objective, -flow_cost);

    // last guard: the decoded point must satisfy the original system
    model.check_feasible(&values)?;
    model.set_solution(values.clone());

    eprintln!(
        "[dual_mcf] nodes={} arcs={} reversed={} big_m={} objective={objective}",
        stats.nodes, stats.arcs, stats.reversed_arcs, stats.big_m
    );

    Ok(DualMcfSolution {
        values,
        dual_flows,
        objective,
        flow_cost,
        stats,
    })
}
