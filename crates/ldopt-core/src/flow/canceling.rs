use crate::flow::engine::CycleCancelingMethod;
use crate::flow::graph::FlowArc;
use crate::flow::network::{self, ResidualNetwork};
use crate::FlowError;

const COST_INF: i128 = i128::MAX / 4;

/// Cycle canceling: a feasible flow is established by a cost-blind max flow,
/// then residual negative cycles are canceled until none remain. Simple
/// takes any Bellman-Ford cycle; MinMean cancels Karp minimum-mean cycles;
/// CancelAndTighten interleaves min-mean rounds with cheap Bellman-Ford
/// cleanup batches.
pub(crate) fn solve(
    node_count: usize,
    arcs: &[FlowArc],
    supplies: &[i64],
    method: CycleCancelingMethod,
) -> Result<ResidualNetwork, FlowError> {
    let (mut network, source, sink, total) = network::with_super_nodes(node_count, arcs, supplies);
    if network.max_flow(source, sink) < total {
        return Err(FlowError::Infeasible);
    }

    match method {
        CycleCancelingMethod::Simple => {
            while let Some(cycle) = negative_cycle(&network) {
                cancel(&mut network, &cycle);
            }
        }
        CycleCancelingMethod::MinMean => loop {
            let Some(cycle) = min_mean_cycle(&network) else {
                break;
            };
            cancel(&mut network, &cycle);
        },
        CycleCancelingMethod::CancelAndTighten => loop {
            let Some(cycle) = min_mean_cycle(&network) else {
                break;
            };
            cancel(&mut network, &cycle);
            while let Some(cycle) = negative_cycle(&network) {
                cancel(&mut network, &cycle);
            }
        },
    }
    Ok(network)
}

// Augments the cycle by its bottleneck residual capacity.
fn cancel(network: &mut ResidualNetwork, cycle: &[(usize, usize)]) {
    let mut bottleneck = i64::MAX;
    for &(node, edge_idx) in cycle {
        bottleneck = bottleneck.min(network.graph[node][edge_idx].cap);
    }
    debug_assert!(bottleneck > 0);
    for &(node, edge_idx) in cycle {
        let (to, rev) = {
            let edge = &network.graph[node][edge_idx];
            (edge.to, edge.rev)
        };
        network.graph[node][edge_idx].cap -= bottleneck;
        network.graph[to][rev].cap += bottleneck;
    }
}

// Bellman-Ford negative-cycle detection from a virtual root; a vertex still
// relaxing after n rounds sits on or below a negative cycle, found by
// walking the predecessors n times and tracing the loop.
fn negative_cycle(network: &ResidualNetwork) -> Option<Vec<(usize, usize)>> {
    let n = network.node_count();
    let mut dist = vec![0i128; n];
    let mut prev: Vec<(usize, usize)> = vec![(usize::MAX, usize::MAX); n];
    let mut witness = usize::MAX;

    for round in 0..=n {
        let mut updated = false;
        for u in 0..n {
            for (edge_idx, edge) in network.graph[u].iter().enumerate() {
                if edge.cap <= 0 {
                    continue;
                }
                let nd = dist[u] + edge.cost as i128;
                if nd < dist[edge.to] {
                    dist[edge.to] = nd;
                    prev[edge.to] = (u, edge_idx);
                    updated = true;
                    if round == n {
                        witness = edge.to;
                    }
                }
            }
        }
        if !updated {
            return None;
        }
    }

    // land inside the cycle
    let mut node = witness;
    for _ in 0..n {
        if prev[node].0 == usize::MAX {
            return None;
        }
        node = prev[node].0;
    }
    let start = node;
    let mut cycle = Vec::new();
    loop {
        let (from, edge_idx) = prev[node];
        if from == usize::MAX || cycle.len() > n {
            return None;
        }
        cycle.push((from, edge_idx));
        node = from;
        if node == start {
            break;
        }
    }
    cycle.reverse();

    let total: i128 = cycle
        .iter()
        .map(|&(node, edge_idx)| network.graph[node][edge_idx].cost as i128)
        .sum();
    if total < 0 {
        Some(cycle)
    } else {
        None
    }
}

// Karp's minimum-mean cycle over the residual graph. Returns a cycle with
// negative total cost, or None when the minimum mean is non-negative.
fn min_mean_cycle(network: &ResidualNetwork) -> Option<Vec<(usize, usize)>> {
    let n = network.node_count();
    if n == 0 {
        return None;
    }
    // d[k][v]: minimum cost of a k-edge walk ending in v, any start vertex
    let mut d = vec![vec![COST_INF; n]; n + 1];
    let mut parent = vec![vec![(usize::MAX, usize::MAX); n]; n + 1];
    for v in 0..n {
        d[0][v] = 0;
    }
    for k in 1..=n {
        for u in 0..n {
            if d[k - 1][u] >= COST_INF / 2 {
                continue;
            }
            for (edge_idx, edge) in network.graph[u].iter().enumerate() {
                if edge.cap <= 0 {
                    continue;
                }
                let nd = d[k - 1][u] + edge.cost as i128;
                if nd < d[k][edge.to] {
                    d[k][edge.to] = nd;
                    parent[k][edge.to] = (u, edge_idx);
                }
            }
        }
    }

    // mu* = min_v max_k (d[n][v] - d[k][v]) / (n - k)
    let mut best_vertex = usize::MAX;
    let mut best_num = 0i128;
    let mut best_den = 1i128;
    for v in 0..n {
        if d[n][v] >= COST_INF / 2 {
            continue;
        }
        let mut worst_num = i128::MIN;
        let mut worst_den = 1i128;
        for k in 0..n {
            if d[k][v] >= COST_INF / 2 {
                continue;
            }
            let num = d[n][v] - d[k][v];
            let den = (n - k) as i128;
            // num/den > worst_num/worst_den
            if worst_num == i128::MIN || num * worst_den > worst_num * den {
                worst_num = num;
                worst_den = den;
            }
        }
        if worst_num == i128::MIN {
            continue;
        }
        if best_vertex == usize::MAX || worst_num * best_den < best_num * worst_den {
            best_vertex = v;
            best_num = worst_num;
            best_den = worst_den;
        }
    }

    if best_vertex == usize::MAX || best_num >= 0 {
        return None;
    }

    // the n-edge walk into the minimizing vertex contains a repeated node;
    // the loop between the repetitions is the candidate cycle
    let mut position = vec![usize::MAX; n];
    let mut walk = Vec::with_capacity(n);
    let mut node = best_vertex;
    let mut k = n;
    while k > 0 {
        let (from, edge_idx) = parent[k][node];
        if from == usize::MAX {
            break;
        }
        walk.push((from, edge_idx, node));
        node = from;
        k -= 1;
    }
    walk.reverse();
    let mut cycle_range = None;
    for (index, &(from, _, _)) in walk.iter().enumerate() {
        if position[from] != usize::MAX {
            cycle_range = Some((position[from], index));
            break;
        }
        position[from] = index;
    }
    let cycle: Vec<(usize, usize)> = match cycle_range {
        Some((start, end)) => walk[start..end]
            .iter()
            .map(|&(from, edge_idx, _)| (from, edge_idx))
            .collect(),
        None => Vec::new(),
    };

    let total: i128 = cycle
        .iter()
        .map(|&(node, edge_idx)| network.graph[node][edge_idx].cost as i128)
        .sum();
    if !cycle.is_empty() && total < 0 {
        Some(cycle)
    } else {
        // the walk did not expose the cycle; fall back to Bellman-Ford,
        // which must succeed while the minimum mean is negative
        negative_cycle(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(tail: usize, head: usize, capacity: i64, cost: i64) -> FlowArc {
        FlowArc {
            tail,
            head,
            capacity,
            cost,
            reversed: false,
        }
    }

    #[test]
    fn all_methods_reach_the_same_cost() {
        let arcs = [arc(0, 1, 5, 10), arc(0, 2, 5, 1), arc(2, 1, 5, 1)];
        for method in [
            CycleCancelingMethod::Simple,
            CycleCancelingMethod::MinMean,
            CycleCancelingMethod::CancelAndTighten,
        ] {
            let network = solve(3, &arcs, &[3, -3, 0], method).unwrap();
            assert_eq!(network.arc_flows(), vec![0, 3, 3], "{method:?}");
        }
    }

    #[test]
    fn corrects_an_expensive_initial_routing() {
        // max flow may start on the expensive arc; canceling must move it
        let arcs = [arc(0, 1, 9, 7), arc(0, 2, 9, 1), arc(2, 1, 9, 1)];
        let network = solve(3, &arcs, &[4, -4, 0], CycleCancelingMethod::Simple).unwrap();
        assert_eq!(network.arc_flows(), vec![0, 4, 4]);
    }

    #[test]
    fn infeasible_supplies_are_reported() {
        let arcs = [arc(0, 1, 1, 0)];
        let err = solve(2, &arcs, &[2, -2], CycleCancelingMethod::MinMean).unwrap_err();
        assert_eq!(err, FlowError::Infeasible);
    }
}
