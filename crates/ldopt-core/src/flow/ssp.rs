use crate::flow::graph::FlowArc;
use crate::flow::network::{ResidualNetwork, DIST_INF};
use crate::FlowError;

/// Capacity-scaling successive shortest paths. Each delta phase first
/// saturates negative reduced-cost edges of the delta-residual, then pushes
/// delta units along reduced-cost shortest paths from excess to deficit
/// nodes. A factor of 1 degrades to plain successive shortest paths.
pub(crate) fn solve(
    node_count: usize,
    arcs: &[FlowArc],
    supplies: &[i64],
    factor: i64,
) -> Result<ResidualNetwork, FlowError> {
    let mut network = ResidualNetwork::from_arcs(node_count, arcs);
    let mut excess: Vec<i64> = supplies.to_vec();
    let mut potentials = vec![0i64; node_count];

    let max_excess = excess.iter().copied().max().unwrap_or(0).max(0);
    if max_excess == 0 {
        return Ok(network);
    }

    let mut delta = 1i64;
    if factor > 1 {
        while delta.saturating_mul(factor) <= max_excess {
            delta *= factor;
        }
    }

    loop {
        saturate_negative_edges(&mut network, &mut excess, &potentials, delta);
        route_phase(&mut network, &mut excess, &mut potentials, delta);
        if delta == 1 {
            break;
        }
        delta = (delta / factor).max(1);
    }

    if excess.iter().any(|&e| e != 0) {
        return Err(FlowError::Infeasible);
    }
    Ok(network)
}

// Negative reduced-cost edges of the delta-residual get pushed to capacity,
// restoring the phase invariant before any augmentation happens.
fn saturate_negative_edges(
    network: &mut ResidualNetwork,
    excess: &mut [i64],
    potentials: &[i64],
    delta: i64,
) {
    for u in 0..network.node_count() {
        for edge_idx in 0..network.graph[u].len() {
            let edge = &network.graph[u][edge_idx];
            if edge.cap < delta {
                continue;
            }
            if edge
                .cost
                .saturating_add(potentials[u])
                .saturating_sub(potentials[edge.to])
                >= 0
            {
                continue;
            }
            let (cap, to, rev) = (edge.cap, edge.to, edge.rev);
            network.graph[u][edge_idx].cap = 0;
            network.graph[to][rev].cap += cap;
            excess[u] -= cap;
            excess[to] += cap;
        }
    }
}

fn route_phase(
    network: &mut ResidualNetwork,
    excess: &mut [i64],
    potentials: &mut [i64],
    delta: i64,
) {
    let n = network.node_count();
    loop {
        let sources: Vec<usize> = (0..n).filter(|&v| excess[v] >= delta).collect();
        if sources.is_empty() {
            return;
        }
        let mut progressed = false;
        for &source in &sources {
            let (dist, prev_node, prev_edge) =
                network.bellman_ford_reduced(source, delta, potentials);
            let target = (0..n)
                .filter(|&v| excess[v] <= -delta && dist[v] < DIST_INF / 2)
                .min_by_key(|&v| dist[v]);
            let Some(target) = target else {
                continue;
            };

            let reach = dist[target];
            for (pi, &d) in potentials.iter_mut().zip(dist.iter()) {
                *pi = pi.saturating_add(d.min(reach));
            }
            network.augment_path(source, target, delta, &prev_node, &prev_edge);
            excess[source] -= delta;
            excess[target] += delta;
            progressed = true;
            break;
        }
        if !progressed {
            return;
        }
    }
}
