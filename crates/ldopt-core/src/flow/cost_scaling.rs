use std::collections::VecDeque;

use crate::flow::engine::CostScalingMethod;
use crate::flow::graph::FlowArc;
use crate::flow::network::{self, ResidualNetwork};
use crate::FlowError;

// Costs are scaled by node_count + 1 so that 1-optimality at the end of the
// last epsilon phase implies exact optimality for the original integer costs.
pub(crate) fn solve(
    node_count: usize,
    arcs: &[FlowArc],
    supplies: &[i64],
    method: CostScalingMethod,
    factor: i64,
) -> Result<ResidualNetwork, FlowError> {
    {
        let (mut probe, source, sink, total) = network::with_super_nodes(node_count, arcs, supplies);
        if probe.max_flow(source, sink) < total {
            return Err(FlowError::Infeasible);
        }
    }

    let mut network = ResidualNetwork::from_arcs(node_count, arcs);
    if node_count == 0 {
        return Ok(network);
    }
    let scale = node_count as i128 + 1;
    let mut potentials = vec![0i128; node_count];
    let mut excess: Vec<i64> = supplies.to_vec();

    let max_cost = arcs
        .iter()
        .map(|arc| arc.cost as i128)
        .max()
        .unwrap_or(0)
        * scale;
    let mut epsilon = max_cost.max(1);
    loop {
        refine(
            &mut network,
            &mut excess,
            &mut potentials,
            epsilon,
            scale,
            method,
        )?;
        if epsilon == 1 {
            break;
        }
        epsilon = (epsilon / factor as i128).max(1);
    }
    Ok(network)
}

fn reduced_cost(
    network: &ResidualNetwork,
    u: usize,
    edge_idx: usize,
    potentials: &[i128],
    scale: i128,
) -> i128 {
    let edge = &network.graph[u][edge_idx];
    edge.cost as i128 * scale + potentials[u] - potentials[edge.to]
}

// One epsilon phase: saturate every negative reduced-cost residual edge,
// then discharge active nodes along admissible paths. The method caps the
// augmentation path length: 1 for pure push-relabel, 4 for partial
// augmentation, unbounded for full augmentation.
fn refine(
    network: &mut ResidualNetwork,
    excess: &mut [i64],
    potentials: &mut [i128],
    epsilon: i128,
    scale: i128,
    method: CostScalingMethod,
) -> Result<(), FlowError> {
    let n = network.node_count();
    for u in 0..n {
        for edge_idx in 0..network.graph[u].len() {
            let edge = &network.graph[u][edge_idx];
            if edge.cap <= 0 {
                continue;
            }
            if reduced_cost(network, u, edge_idx, potentials, scale) >= 0 {
                continue;
            }
            let (cap, to, rev) = {
                let edge = &network.graph[u][edge_idx];
                (edge.cap, edge.to, edge.rev)
            };
            network.graph[u][edge_idx].cap = 0;
            network.graph[to][rev].cap += cap;
            excess[u] -= cap;
            excess[to] += cap;
        }
    }

    let path_limit = match method {
        CostScalingMethod::Push => 1,
        CostScalingMethod::PartialAugment => 4,
        CostScalingMethod::Augment => n.max(1),
    };

    let mut active: VecDeque<usize> = (0..n).filter(|&v| excess[v] > 0).collect();
    let mut queued = vec![false; n];
    for &v in &active {
        queued[v] = true;
    }

    let mut guard = 0u64;
    let guard_limit = 1_000_000 + (n as u64).pow(2) * 64;

    while let Some(start) = active.pop_front() {
        queued[start] = false;
        while excess[start] > 0 {
            guard += 1;
            if guard > guard_limit {
                return Err(FlowError::InvalidInput(
                    "cost scaling failed to converge".to_string(),
                ));
            }

            // grow an admissible path, relabeling and backtracking at dead ends
            let mut path: Vec<(usize, usize)> = Vec::new();
            let mut current = start;
            loop {
                if path.len() == path_limit || (current != start && excess[current] < 0) {
                    break;
                }
                let admissible = (0..network.graph[current].len()).find(|&idx| {
                    network.graph[current][idx].cap > 0
                        && reduced_cost(network, current, idx, potentials, scale) < 0
                });
                match admissible {
                    Some(edge_idx) => {
                        let to = network.graph[current][edge_idx].to;
                        path.push((current, edge_idx));
                        current = to;
                    }
                    None => {
                        relabel(network, current, potentials, epsilon, scale)?;
                        if current != start {
                            let (previous, _) = path.pop().unwrap_or((start, 0));
                            current = previous;
                        }
                    }
                }
            }

            let mut amount = excess[start];
            for &(node, edge_idx) in &path {
                amount = amount.min(network.graph[node][edge_idx].cap);
            }
            for &(node, edge_idx) in &path {
                let (to, rev) = {
                    let edge = &network.graph[node][edge_idx];
                    (edge.to, edge.rev)
                };
                network.graph[node][edge_idx].cap -= amount;
                network.graph[to][rev].cap += amount;
            }
            excess[start] -= amount;
            excess[current] += amount;
            if excess[current] > 0 && !queued[current] {
                queued[current] = true;
                active.push_back(current);
            }
        }
    }
    Ok(())
}

// Lowers the potential just enough to make one outgoing edge admissible.
fn relabel(
    network: &ResidualNetwork,
    node: usize,
    potentials: &mut [i128],
    epsilon: i128,
    scale: i128,
) -> Result<(), FlowError> {
    let best = network.graph[node]
        .iter()
        .filter(|edge| edge.cap > 0)
        .map(|edge| potentials[edge.to] - edge.cost as i128 * scale)
        .max();
    match best {
        Some(best) => {
            potentials[node] = best - epsilon;
            Ok(())
        }
        None => Err(FlowError::InvalidInput(
            "active node without residual edges".to_string(),
        )),
    }
}
