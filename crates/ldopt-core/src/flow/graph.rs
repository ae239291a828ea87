use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::flow::model::LinearModel;
use crate::FlowError;

// Path costs must stay clear of the Bellman-Ford sentinel.
const SAFE_COST_LIMIT: i64 = i64::MAX / 16;

#[derive(Debug, Clone, Copy)]
pub(crate) struct FlowArc {
    pub tail: usize,
    pub head: usize,
    pub capacity: i64,
    pub cost: i64,
    pub reversed: bool,
}

/// Dual min-cost-flow graph: one node per variable plus the source node y0
/// (last index). Supplies are the reformulated objective coefficients c';
/// every difference constraint `y_i - y_j >= b` becomes an arc `i -> j`
/// with cost `-b`, capped at big M.
#[derive(Debug, Clone)]
pub(crate) struct FlowGraph {
    pub supplies: Vec<i64>,
    pub arcs: Vec<FlowArc>,
    pub big_m: i64,
    pub reversed_cost_offset: i128,
    pub reversed_arcs: usize,
}

impl FlowGraph {
    pub fn node_count(&self) -> usize {
        self.supplies.len()
    }

    pub fn source_node(&self) -> usize {
        self.supplies.len() - 1
    }
}

pub(crate) fn build(model: &LinearModel) -> Result<FlowGraph, FlowError> {
    let n = model.variable_count();
    let source = n;

    for (lower, upper) in model.bounds() {
        if lower > upper {
            // bound folding can cross the bounds; that is an empty box
            return Err(FlowError::Infeasible);
        }
    }

    let big_m = compute_big_m(model)?;

    let mut supplies = vec![0i64; n + 1];
    let mut total_cost = 0i64;
    for (var, cost) in model.costs().enumerate() {
        supplies[var] = cost;
        total_cost = total_cost
            .checked_add(cost)
            .ok_or_else(|| FlowError::InvalidInput("objective overflows".to_string()))?;
    }
    supplies[source] = -total_cost;

    let mut graph = FlowGraph {
        supplies,
        arcs: Vec::with_capacity(model.constraint_count() + 2 * n),
        big_m,
        reversed_cost_offset: 0,
        reversed_arcs: 0,
    };

    // (a) original differential constraints
    for constraint in model.constraints() {
        add_arc_for_difference(&mut graph, constraint.plus, constraint.minus, constraint.rhs);
    }
    // (b) lower bounds: y_i - y_0 >= d_i, (c) upper bounds: y_0 - y_i >= -u_i
    for (var, (lower, upper)) in model.bounds().enumerate() {
        add_arc_for_difference(&mut graph, var, source, lower);
        add_arc_for_difference(&mut graph, source, var, -upper);
    }

    debug_assert_eq!(graph.supplies.iter().map(|&s| s as i128).sum::<i128>(), 0);
    debug_assert!(graph.arcs.iter().all(|arc| arc.cost >= 0));

    if has_negative_cycle(model, n) {
        return Err(FlowError::Infeasible);
    }

    Ok(graph)
}

// Arc for `y_tail - y_head >= rhs` with cost `-rhs`. A negative cost is
// resolved by reversal: endpoints swap, the cost negates, the endpoint
// supplies compensate by the capacity, and the offset tally accumulates the
// removed cost so the objective can be corrected after the solve.
fn add_arc_for_difference(graph: &mut FlowGraph, tail: usize, head: usize, rhs: i64) {
    let cost = -rhs;
    let capacity = graph.big_m;
    if cost < 0 {
        graph.supplies[tail] -= capacity;
        graph.supplies[head] += capacity;
        graph.reversed_cost_offset += cost as i128 * capacity as i128;
        graph.reversed_arcs += 1;
        graph.arcs.push(FlowArc {
            tail: head,
            head: tail,
            capacity,
            cost: -cost,
            reversed: true,
        });
    } else {
        graph.arcs.push(FlowArc {
            tail,
            head,
            capacity,
            cost,
            reversed: false,
        });
    }
}

// Safe upper bound exceeding any feasible |x_i|: summed magnitudes of the
// bounds and constraint right hand sides, with head-room.
fn compute_big_m(model: &LinearModel) -> Result<i64, FlowError> {
    let mut sum = BigInt::zero();
    for (lower, upper) in model.bounds() {
        sum += BigInt::from(lower.unsigned_abs());
        sum += BigInt::from(upper.unsigned_abs());
    }
    for constraint in model.constraints() {
        sum += BigInt::from(constraint.rhs.unsigned_abs());
    }
    let big_m: BigInt = sum * 2 + 1;

    let node_count = BigInt::from(model.variable_count() as u64 + 1);
    let path_bound: BigInt = &big_m * node_count;
    if path_bound.to_i64().is_none() || big_m.to_i64().map_or(true, |m| m > SAFE_COST_LIMIT) {
        return Err(FlowError::InvalidInput(
            "input magnitudes exceed the engine's safe integer range".to_string(),
        ));
    }
    Ok(big_m.to_i64().unwrap_or(SAFE_COST_LIMIT))
}

// Feasibility of the difference system: `y_i - y_j >= b` is `y_j <= y_i - b`,
// an edge i -> j of weight -b; the system is feasible iff the weighted graph
// (bounds included) has no negative cycle.
fn has_negative_cycle(model: &LinearModel, n: usize) -> bool {
    let source = n;
    let node_count = n + 1;
    let mut edges: Vec<(usize, usize, i64)> = Vec::new();
    for constraint in model.constraints() {
        edges.push((constraint.plus, constraint.minus, -constraint.rhs));
    }
    for (var, (lower, upper)) in model.bounds().enumerate() {
        edges.push((var, source, -lower));
        edges.push((source, var, upper));
    }

    let mut dist = vec![0i64; node_count];
    for _ in 0..node_count {
        let mut updated = false;
        for &(u, v, w) in &edges {
            let nd = dist[u].saturating_add(w);
            if nd < dist[v] {
                dist[v] = nd;
                updated = true;
            }
        }
        if !updated {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::model::ConstraintSense;

    #[test]
    fn rewrite_leaves_costs_non_negative_and_supplies_balanced() {
        let mut model = LinearModel::new();
        let x1 = model.add_variable(0, 10, 1, "x1").unwrap();
        let x2 = model.add_variable(0, 10, 1, "x2").unwrap();
        model.add_difference(x1, x2, ConstraintSense::Ge, 3).unwrap();
        model.add_bound(x2, ConstraintSense::Ge, 1).unwrap();
        let graph = build(&model).unwrap();
        assert!(graph.arcs.iter().all(|arc| arc.cost >= 0));
        assert_eq!(
            graph.supplies.iter().map(|&s| s as i128).sum::<i128>(),
            0
        );
        assert_eq!(graph.reversed_arcs, 2);
        assert!(graph.reversed_cost_offset < 0);
    }

    #[test]
    fn infeasible_difference_cycle_is_detected() {
        let mut model = LinearModel::new();
        let x1 = model.add_variable(0, 10, 0, "x1").unwrap();
        let x2 = model.add_variable(0, 10, 0, "x2").unwrap();
        model.add_difference(x1, x2, ConstraintSense::Ge, 1).unwrap();
        model.add_difference(x2, x1, ConstraintSense::Ge, 1).unwrap();
        assert_eq!(build(&model).unwrap_err(), FlowError::Infeasible);
    }

    #[test]
    fn crossed_bounds_are_infeasible() {
        let mut model = LinearModel::new();
        let x = model.add_variable(0, 10, 0, "x").unwrap();
        model.add_bound(x, ConstraintSense::Ge, 8).unwrap();
        model.add_bound(x, ConstraintSense::Le, 2).unwrap();
        assert_eq!(build(&model).unwrap_err(), FlowError::Infeasible);
    }
}
