use crate::flow::engine::PivotRule;
use crate::flow::graph::FlowArc;
use crate::flow::network::ResidualNetwork;
use crate::FlowError;

const INF_CAP: i64 = i64::MAX / 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArcState {
    Lower,
    Basic,
    Upper,
}

/// Primal network simplex on an artificial-root basis. The spanning tree is
/// kept as parent pointers and rebuilt after each pivot; potentials follow
/// from the zero reduced cost of basic arcs.
struct Simplex {
    tails: Vec<usize>,
    heads: Vec<usize>,
    caps: Vec<i64>,
    costs: Vec<i128>,
    flows: Vec<i64>,
    state: Vec<ArcState>,
    parent: Vec<usize>,
    parent_arc: Vec<usize>,
    depth: Vec<usize>,
    potentials: Vec<i128>,
    real_arcs: usize,
    node_count: usize,
    pivot_rule: PivotRule,
    cursor: usize,
    block_size: usize,
    candidates: Vec<usize>,
    bland: bool,
}

pub(crate) fn solve(
    node_count: usize,
    arcs: &[FlowArc],
    supplies: &[i64],
    pivot_rule: PivotRule,
) -> Result<ResidualNetwork, FlowError> {
    let mut network = ResidualNetwork::from_arcs(node_count, arcs);
    if node_count == 0 {
        return Ok(network);
    }

    let m = arcs.len();
    let root = node_count;
    let max_cost = arcs.iter().map(|arc| arc.cost as i128).max().unwrap_or(0);
    let artificial_cost = (max_cost + 1) * (node_count as i128 + 1);

    let total = node_count + 1;
    let mut simplex = Simplex {
        tails: Vec::with_capacity(m + node_count),
        heads: Vec::with_capacity(m + node_count),
        caps: Vec::with_capacity(m + node_count),
        costs: Vec::with_capacity(m + node_count),
        flows: Vec::with_capacity(m + node_count),
        state: Vec::with_capacity(m + node_count),
        parent: vec![usize::MAX; total],
        parent_arc: vec![usize::MAX; total],
        depth: vec![0; total],
        potentials: vec![0; total],
        real_arcs: m,
        node_count: total,
        pivot_rule,
        cursor: 0,
        block_size: (((m as f64).sqrt() * 0.5).round() as usize).max(10),
        candidates: Vec::new(),
        bland: false,
    };

    for arc in arcs {
        simplex.tails.push(arc.tail);
        simplex.heads.push(arc.head);
        simplex.caps.push(arc.capacity);
        simplex.costs.push(arc.cost as i128);
        simplex.flows.push(0);
        simplex.state.push(ArcState::Lower);
    }
    for (node, &supply) in supplies.iter().enumerate() {
        if supply >= 0 {
            simplex.tails.push(node);
            simplex.heads.push(root);
            simplex.flows.push(supply);
        } else {
            simplex.tails.push(root);
            simplex.heads.push(node);
            simplex.flows.push(-supply);
        }
        simplex.caps.push(INF_CAP);
        simplex.costs.push(artificial_cost);
        simplex.state.push(ArcState::Basic);
    }
    simplex.rebuild_tree(root);

    let iteration_limit = 64u64 * (m as u64 + node_count as u64 + 1) * (node_count as u64 + 1);
    let mut iterations = 0u64;
    let mut degenerate_streak = 0u64;

    while let Some(entering) = simplex.find_entering() {
        iterations += 1;
        if iterations > iteration_limit {
            return Err(FlowError::InvalidInput(
                "network simplex failed to converge".to_string(),
            ));
        }
        let theta = simplex.pivot(entering, root)?;
        if theta == 0 {
            degenerate_streak += 1;
            if degenerate_streak > 4 * (m as u64 + node_count as u64 + 1) {
                simplex.bland = true;
            }
        } else {
            degenerate_streak = 0;
        }
    }

    if simplex.flows[m..].iter().any(|&flow| flow > 0) {
        return Err(FlowError::Infeasible);
    }

    network.apply_flows(&simplex.flows[..m]);
    Ok(network)
}

impl Simplex {
    fn reduced_cost(&self, arc: usize) -> i128 {
        self.costs[arc] + self.potentials[self.tails[arc]] - self.potentials[self.heads[arc]]
    }

    fn violation(&self, arc: usize) -> i128 {
        match self.state[arc] {
            ArcState::Lower => -self.reduced_cost(arc),
            ArcState::Upper => self.reduced_cost(arc),
            ArcState::Basic => 0,
        }
    }

    fn eligible(&self, arc: usize) -> bool {
        self.violation(arc) > 0
    }

    fn find_entering(&mut self) -> Option<usize> {
        if self.bland {
            return (0..self.real_arcs).find(|&arc| self.eligible(arc));
        }
        match self.pivot_rule {
            PivotRule::FirstEligible => self.first_eligible(),
            PivotRule::BestEligible => self.best_eligible(),
            PivotRule::BlockSearch => self.block_search(),
            PivotRule::CandidateList => self.candidate_list(),
            PivotRule::AlteringList => self.altering_list(),
        }
    }

    fn first_eligible(&mut self) -> Option<usize> {
        let m = self.real_arcs;
        if m == 0 {
            return None;
        }
        for offset in 0..m {
            let arc = (self.cursor + offset) % m;
            if self.eligible(arc) {
                self.cursor = (arc + 1) % m;
                return Some(arc);
            }
        }
        None
    }

    fn best_eligible(&self) -> Option<usize> {
        (0..self.real_arcs)
            .filter(|&arc| self.eligible(arc))
            .max_by_key(|&arc| self.violation(arc))
    }

    fn block_search(&mut self) -> Option<usize> {
        let m = self.real_arcs;
        if m == 0 {
            return None;
        }
        let mut scanned = 0;
        let mut position = self.cursor % m;
        while scanned < m {
            let mut best: Option<usize> = None;
            let mut best_violation = 0;
            let block_end = (self.block_size).min(m - scanned);
            for _ in 0..block_end {
                let violation = self.violation(position);
                if violation > best_violation {
                    best_violation = violation;
                    best = Some(position);
                }
                position = (position + 1) % m;
                scanned += 1;
            }
            if let Some(arc) = best {
                self.cursor = position;
                return Some(arc);
            }
        }
        None
    }

    fn candidate_list(&mut self) -> Option<usize> {
        let mut candidates = std::mem::take(&mut self.candidates);
        candidates.retain(|&arc| self.eligible(arc));
        if candidates.is_empty() {
            let limit = (self.real_arcs / 4).max(10);
            candidates = (0..self.real_arcs)
                .filter(|&arc| self.eligible(arc))
                .take(limit)
                .collect();
        }
        let best = candidates
            .iter()
            .copied()
            .max_by_key(|&arc| self.violation(arc));
        if let Some(arc) = best {
            candidates.retain(|&candidate| candidate != arc);
        }
        self.candidates = candidates;
        best
    }

    fn altering_list(&mut self) -> Option<usize> {
        let mut candidates = std::mem::take(&mut self.candidates);
        candidates.retain(|&arc| self.eligible(arc));
        if candidates.is_empty() {
            candidates = (0..self.real_arcs)
                .filter(|&arc| self.eligible(arc))
                .collect();
            candidates.sort_by_key(|&arc| std::cmp::Reverse(self.violation(arc)));
            let head = ((self.real_arcs as f64).sqrt().round() as usize).max(5);
            candidates.truncate(head);
        }
        let next = if candidates.is_empty() {
            None
        } else {
            Some(candidates.remove(0))
        };
        self.candidates = candidates;
        next
    }

    // Applies one pivot; returns the flow change along the cycle.
    fn pivot(&mut self, entering: usize, root: usize) -> Result<i64, FlowError> {
        // push direction: along the arc when entering from the lower bound
        let forward = self.state[entering] == ArcState::Lower;
        let (push_tail, push_head) = if forward {
            (self.tails[entering], self.heads[entering])
        } else {
            (self.heads[entering], self.tails[entering])
        };

        // cycle arcs as (arc, direction): +1 if traversed tail -> head
        let mut cycle: Vec<(usize, i64)> = Vec::new();
        cycle.push((entering, if forward { 1 } else { -1 }));
        let mut up = push_head;
        let mut down = push_tail;
        while self.depth[up] > self.depth[down] {
            let arc = self.parent_arc[up];
            cycle.push((arc, if self.tails[arc] == up { 1 } else { -1 }));
            up = self.parent[up];
        }
        while self.depth[down] > self.depth[up] {
            let arc = self.parent_arc[down];
            cycle.push((arc, if self.tails[arc] == down { -1 } else { 1 }));
            down = self.parent[down];
        }
        while up != down {
            let arc = self.parent_arc[up];
            cycle.push((arc, if self.tails[arc] == up { 1 } else { -1 }));
            up = self.parent[up];
            let arc = self.parent_arc[down];
            cycle.push((arc, if self.tails[arc] == down { -1 } else { 1 }));
            down = self.parent[down];
        }

        let mut theta = i64::MAX;
        let mut leaving = entering;
        let mut leaving_direction = 1;
        for &(arc, direction) in &cycle {
            let residual = if direction > 0 {
                self.caps[arc] - self.flows[arc]
            } else {
                self.flows[arc]
            };
            if residual < theta || (residual == theta && arc < leaving) {
                theta = residual;
                leaving = arc;
                leaving_direction = direction;
            }
        }
        if theta >= INF_CAP / 2 {
            return Err(FlowError::Unbounded);
        }

        for &(arc, direction) in &cycle {
            self.flows[arc] += direction * theta;
        }

        if leaving == entering {
            // bound flip, basis unchanged
            self.state[entering] = if forward {
                ArcState::Upper
            } else {
                ArcState::Lower
            };
            return Ok(theta);
        }

        self.state[entering] = ArcState::Basic;
        self.state[leaving] = if leaving_direction > 0 {
            ArcState::Upper
        } else {
            ArcState::Lower
        };
        self.rebuild_tree(root);
        Ok(theta)
    }

    // Parent pointers, depths, and potentials from a BFS over basic arcs.
    fn rebuild_tree(&mut self, root: usize) {
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); self.node_count];
        for arc in 0..self.tails.len() {
            if self.state[arc] == ArcState::Basic {
                adjacency[self.tails[arc]].push(arc);
                adjacency[self.heads[arc]].push(arc);
            }
        }
        let mut visited = vec![false; self.node_count];
        let mut queue = std::collections::VecDeque::new();
        visited[root] = true;
        self.parent[root] = usize::MAX;
        self.parent_arc[root] = usize::MAX;
        self.depth[root] = 0;
        self.potentials[root] = 0;
        queue.push_back(root);
        while let Some(node) = queue.pop_front() {
            for &arc in &adjacency[node] {
                let other = self.tails[arc] + self.heads[arc] - node;
                if visited[other] {
                    continue;
                }
                visited[other] = true;
                self.parent[other] = node;
                self.parent_arc[other] = arc;
                self.depth[other] = self.depth[node] + 1;
                self.potentials[other] = if self.tails[arc] == node {
                    self.potentials[node] + self.costs[arc]
                } else {
                    self.potentials[node] - self.costs[arc]
                };
                queue.push_back(other);
            }
        }
    }
}
