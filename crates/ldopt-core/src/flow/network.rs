use std::collections::VecDeque;

use crate::flow::graph::FlowArc;

pub(crate) const DIST_INF: i64 = i64::MAX / 4;

#[derive(Debug, Clone)]
pub(crate) struct ResidualEdge {
    pub to: usize,
    pub rev: usize,
    pub cap: i64,
    pub cost: i64,
}

/// Residual network with paired reverse edges; the reverse edge carries the
/// pushed flow as capacity.
#[derive(Debug, Clone)]
pub(crate) struct ResidualNetwork {
    pub graph: Vec<Vec<ResidualEdge>>,
    arc_positions: Vec<(usize, usize)>,
}

impl ResidualNetwork {
    pub fn new(node_count: usize) -> Self {
        Self {
            graph: vec![Vec::new(); node_count],
            arc_positions: Vec::new(),
        }
    }

    pub fn from_arcs(node_count: usize, arcs: &[FlowArc]) -> Self {
        let mut network = Self::new(node_count);
        for arc in arcs {
            network.add_tracked_edge(arc.tail, arc.head, arc.capacity, arc.cost);
        }
        network
    }

    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    pub fn add_edge(&mut self, from: usize, to: usize, cap: i64, cost: i64) -> (usize, usize) {
        let from_index = self.graph[from].len();
        let to_index = self.graph[to].len();
        self.graph[from].push(ResidualEdge {
            to,
            rev: to_index,
            cap,
            cost,
        });
        self.graph[to].push(ResidualEdge {
            to: from,
            rev: from_index,
            cap: 0,
            cost: -cost,
        });
        (from_index, to_index)
    }

    fn add_tracked_edge(&mut self, from: usize, to: usize, cap: i64, cost: i64) {
        let (index, _) = self.add_edge(from, to, cap, cost);
        self.arc_positions.push((from, index));
    }

    /// Flow pushed on every tracked arc, in insertion order.
    pub fn arc_flows(&self) -> Vec<i64> {
        self.arc_positions
            .iter()
            .map(|&(node, index)| {
                let edge = &self.graph[node][index];
                self.graph[edge.to][edge.rev].cap
            })
            .collect()
    }

    /// Bellman-Ford over reduced costs restricted to edges of residual
    /// capacity at least `delta`.
    pub fn bellman_ford_reduced(
        &self,
        source: usize,
        delta: i64,
        potentials: &[i64],
    ) -> (Vec<i64>, Vec<usize>, Vec<usize>) {
        let n = self.graph.len();
        let mut dist = vec![DIST_INF; n];
        let mut prev_node = vec![usize::MAX; n];
        let mut prev_edge = vec![usize::MAX; n];
        dist[source] = 0;

        for _ in 0..n {
            let mut updated = false;
            for u in 0..n {
                let du = dist[u];
                if du >= DIST_INF / 2 {
                    continue;
                }
                for (edge_idx, edge) in self.graph[u].iter().enumerate() {
                    if edge.cap < delta {
                        continue;
                    }
                    let reduced = edge
                        .cost
                        .saturating_add(potentials[u])
                        .saturating_sub(potentials[edge.to]);
                    let nd = du.saturating_add(reduced);
                    if nd < dist[edge.to] {
                        dist[edge.to] = nd;
                        prev_node[edge.to] = u;
                        prev_edge[edge.to] = edge_idx;
                        updated = true;
                    }
                }
            }
            if !updated {
                break;
            }
        }
        (dist, prev_node, prev_edge)
    }

    pub fn augment_path(
        &mut self,
        source: usize,
        sink: usize,
        amount: i64,
        prev_node: &[usize],
        prev_edge: &[usize],
    ) {
        let mut v = sink;
        while v != source {
            let u = prev_node[v];
            let edge_idx = prev_edge[v];
            let rev = self.graph[u][edge_idx].rev;
            self.graph[u][edge_idx].cap -= amount;
            self.graph[v][rev].cap += amount;
            v = u;
        }
    }

    /// Cost-blind max flow (BFS augmentation); used to establish supply
    /// routability before the engines that need a feasible start.
    pub fn max_flow(&mut self, source: usize, sink: usize) -> i64 {
        let n = self.graph.len();
        let mut total = 0;
        loop {
            let mut prev_node = vec![usize::MAX; n];
            let mut prev_edge = vec![usize::MAX; n];
            let mut queue = VecDeque::new();
            queue.push_back(source);
            prev_node[source] = source;
            while let Some(u) = queue.pop_front() {
                for (edge_idx, edge) in self.graph[u].iter().enumerate() {
                    if edge.cap > 0 && prev_node[edge.to] == usize::MAX {
                        prev_node[edge.to] = u;
                        prev_edge[edge.to] = edge_idx;
                        queue.push_back(edge.to);
                    }
                }
            }
            if prev_node[sink] == usize::MAX {
                return total;
            }
            let mut bottleneck = i64::MAX;
            let mut v = sink;
            while v != source {
                let u = prev_node[v];
                bottleneck = bottleneck.min(self.graph[u][prev_edge[v]].cap);
                v = u;
            }
            self.augment_path(source, sink, bottleneck, &prev_node, &prev_edge);
            total += bottleneck;
        }
    }

    /// Optimal node potentials: shortest distances from a virtual root over
    /// the final residual graph, which has no negative cycles at optimality.
    /// Every residual edge (u, v) then satisfies cost + pi_u - pi_v >= 0.
    pub fn potentials(&self) -> Vec<i64> {
        let n = self.graph.len();
        let mut dist = vec![0i64; n];
        for _ in 0..n {
            let mut updated = false;
            for u in 0..n {
                for edge in &self.graph[u] {
                    if edge.cap <= 0 {
                        continue;
                    }
                    let nd = dist[u].saturating_add(edge.cost);
                    if nd < dist[edge.to] {
                        dist[edge.to] = nd;
                        updated = true;
                    }
                }
            }
            if !updated {
                break;
            }
        }
        dist
    }

    /// Imposes externally computed flows on the tracked arcs.
    pub fn apply_flows(&mut self, flows: &[i64]) {
        for (arc, &flow) in flows.iter().enumerate() {
            let (node, index) = self.arc_positions[arc];
            let (to, rev) = {
                let edge = &self.graph[node][index];
                (edge.to, edge.rev)
            };
            self.graph[node][index].cap -= flow;
            self.graph[to][rev].cap += flow;
        }
    }

    /// Total cost of the tracked-arc flows.
    pub fn flow_cost(&self, arcs: &[FlowArc]) -> i128 {
        self.arc_flows()
            .iter()
            .zip(arcs.iter())
            .map(|(&flow, arc)| flow as i128 * arc.cost as i128)
            .sum()
    }
}

/// Residual network extended with a super source and sink wired to the
/// supply-carrying nodes; returns (network, source, sink, total supply).
pub(crate) fn with_super_nodes(
    node_count: usize,
    arcs: &[FlowArc],
    supplies: &[i64],
) -> (ResidualNetwork, usize, usize, i64) {
    let source = node_count;
    let sink = node_count + 1;
    let mut network = ResidualNetwork::new(node_count + 2);
    for arc in arcs {
        network.add_tracked_edge(arc.tail, arc.head, arc.capacity, arc.cost);
    }
    let mut total = 0;
    for (node, &supply) in supplies.iter().enumerate() {
        if supply > 0 {
            network.add_edge(source, node, supply, 0);
            total += supply;
        } else if supply < 0 {
            network.add_edge(node, sink, -supply, 0);
        }
    }
    (network, source, sink, total)
}
