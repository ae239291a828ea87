use crate::coloring::{ColorCount, ColoringOptions};
use crate::conflict::ConflictGraph;
use crate::lp::{LinExpr, LpModel, LpOptions, Sense, Var};
use crate::numerics::{is_half_integral, is_integral};
use crate::ColoringError;

pub(crate) struct ColoringModel {
    pub lp: LpModel,
    pub color_bits: Vec<Var>,
    pub edge_bits: Vec<Var>,
    constr_count: u32,
}

impl ColoringModel {
    pub fn next_constr_name(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}{}", self.constr_count);
        self.constr_count += 1;
        name
    }
}

/// Variables and cover constraints of the relaxation. For every conflict
/// edge the four constraints below forbid identical 2-bit codes on the two
/// endpoints; under three colors the code 11 is ruled out per vertex.
pub(crate) fn build_model(
    graph: &ConflictGraph,
    options: &ColoringOptions,
) -> Result<ColoringModel, ColoringError> {
    let mut lp = LpModel::with_options(LpOptions {
        threads: options.threads,
        ..LpOptions::default()
    });

    let num_bits = graph.vertex_count() * 2;
    let mut color_bits = Vec::with_capacity(num_bits);
    for i in 0..num_bits {
        color_bits.push(lp.add_var(0.0, 1.0, 0.0, &format!("v{i}")));
    }
    // some of these may stay unreferenced by the hard constraints
    let mut edge_bits = Vec::with_capacity(graph.edge_count());
    for i in 0..graph.edge_count() {
        edge_bits.push(lp.add_var(0.0, 1.0, 0.0, &format!("e{i}")));
    }

    for vertex in 0..graph.vertex_count() as u32 {
        if let Some(color) = graph.precolor(vertex) {
            if color >= options.color_count.count() as u8 {
                return Err(ColoringError::InvalidInput(format!(
                    "precolor {color} exceeds color count on vertex {vertex}"
                )));
            }
            let b1 = f64::from(color >> 1);
            let b2 = f64::from(color & 1);
            let idx = (vertex as usize) << 1;
            lp.set_lb(color_bits[idx], b1);
            lp.set_ub(color_bits[idx], b1);
            lp.set_lb(color_bits[idx + 1], b2);
            lp.set_ub(color_bits[idx + 1], b2);
        }
    }

    let mut model = ColoringModel {
        lp,
        color_bits,
        edge_bits,
        constr_count: 0,
    };

    for edge in graph.edges() {
        let s = (edge.source as usize) << 1;
        let t = (edge.target as usize) << 1;
        let [s1, s2] = [model.color_bits[s], model.color_bits[s + 1]];
        let [t1, t2] = [model.color_bits[t], model.color_bits[t + 1]];

        // (0,0): s1 + s2 + t1 + t2 >= 1
        let name = model.next_constr_name("R");
        model.lp.add_constr(
            LinExpr::new()
                .term(s1, 1.0)
                .term(s2, 1.0)
                .term(t1, 1.0)
                .term(t2, 1.0),
            Sense::Ge,
            1.0,
            &name,
        );
        // (1,0): (1-s1) + s2 + (1-t1) + t2 >= 1
        let name = model.next_constr_name("R");
        model.lp.add_constr(
            LinExpr::new()
                .term(s1, -1.0)
                .term(s2, 1.0)
                .term(t1, -1.0)
                .term(t2, 1.0)
                .plus(2.0),
            Sense::Ge,
            1.0,
            &name,
        );
        // (0,1): s1 + (1-s2) + t1 + (1-t2) >= 1
        let name = model.next_constr_name("R");
        model.lp.add_constr(
            LinExpr::new()
                .term(s1, 1.0)
                .term(s2, -1.0)
                .term(t1, 1.0)
                .term(t2, -1.0)
                .plus(2.0),
            Sense::Ge,
            1.0,
            &name,
        );
        // (1,1): (1-s1) + (1-s2) + (1-t1) + (1-t2) >= 1
        let name = model.next_constr_name("R");
        model.lp.add_constr(
            LinExpr::new()
                .term(s1, -1.0)
                .term(s2, -1.0)
                .term(t1, -1.0)
                .term(t2, -1.0)
                .plus(4.0),
            Sense::Ge,
            1.0,
            &name,
        );
    }

    if options.color_count == ColorCount::Three {
        for vertex in 0..graph.vertex_count() {
            let idx = vertex << 1;
            let name = model.next_constr_name("R");
            model.lp.add_constr(
                LinExpr::new()
                    .term(model.color_bits[idx], 1.0)
                    .term(model.color_bits[idx + 1], 1.0),
                Sense::Le,
                1.0,
                &name,
            );
        }
    }

    Ok(model)
}

/// Fix the highest-degree vertex to color 0; precoloring already breaks the
/// color-permutation symmetry, so the anchor is skipped then.
pub(crate) fn set_anchor(graph: &ConflictGraph, model: &mut ColoringModel) {
    if graph.has_precolored() {
        return;
    }
    let anchor = graph.max_degree_vertex() as usize;
    let idx = anchor << 1;
    model.lp.set_ub(model.color_bits[idx], 0.0);
    model.lp.set_lb(model.color_bits[idx], 0.0);
    model.lp.set_ub(model.color_bits[idx + 1], 0.0);
    model.lp.set_lb(model.color_bits[idx + 1], 0.0);
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct NonIntegerCensus {
    pub vertex_non_integer: u32,
    pub vertex_half_integer: u32,
    pub edge_non_integer: u32,
    pub edge_half_integer: u32,
}

impl NonIntegerCensus {
    pub fn start() -> Self {
        Self {
            vertex_non_integer: u32::MAX,
            vertex_half_integer: u32::MAX,
            edge_non_integer: u32::MAX,
            edge_half_integer: u32::MAX,
        }
    }

    pub fn measure(lp: &LpModel, color_bits: &[Var], edge_bits: &[Var]) -> Self {
        let (vertex_non_integer, vertex_half_integer) = count_vars(lp, color_bits);
        let (edge_non_integer, edge_half_integer) = count_vars(lp, edge_bits);
        Self {
            vertex_non_integer,
            vertex_half_integer,
            edge_non_integer,
            edge_half_integer,
        }
    }
}

fn count_vars(lp: &LpModel, vars: &[Var]) -> (u32, u32) {
    let mut non_integer = 0;
    let mut half_integer = 0;
    for &var in vars {
        let value = lp.value(var);
        if !is_integral(value) {
            non_integer += 1;
            if is_half_integral(value) {
                half_integer += 1;
            }
        }
    }
    (non_integer, half_integer)
}

/// Penalize the larger bit of each non-integer pair, pushing toward 0/1.
pub(crate) fn adjust_variable_pairs(lp: &LpModel, color_bits: &[Var], obj: &mut LinExpr) {
    for pair in color_bits.chunks_exact(2) {
        let [v1, v2] = [pair[0], pair[1]];
        let value1 = lp.value(v1);
        let value2 = lp.value(v2);
        if is_integral(value1) && is_integral(value2) {
            continue;
        }
        if value1 > value2 {
            obj.add_term(v2, 1.0);
            obj.add_term(v1, -1.0);
        } else if value1 < value2 {
            obj.add_term(v1, 1.0);
            obj.add_term(v2, -1.0);
        }
    }
}

/// Discourage equal bit patterns across conflict edges; the sign is chosen
/// so minimizing pulls the two endpoint bits apart.
pub(crate) fn adjust_conflict_edges(
    graph: &ConflictGraph,
    lp: &LpModel,
    color_bits: &[Var],
    obj: &mut LinExpr,
) {
    for edge in graph.edges() {
        for bit in 0..2 {
            let s = color_bits[((edge.source as usize) << 1) + bit];
            let t = color_bits[((edge.target as usize) << 1) + bit];
            let value_s = lp.value(s);
            let value_t = lp.value(t);
            if value_s > value_t {
                obj.add_term(t, 1.0);
                obj.add_term(s, -1.0);
            } else if value_s < value_t {
                obj.add_term(s, 1.0);
                obj.add_term(t, -1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coloring::ColoringOptions;
    use crate::lp::LpStatus;

    fn single_edge_graph() -> ConflictGraph {
        let mut graph = ConflictGraph::new(2);
        graph.add_edge(0, 1, 1).unwrap();
        graph
    }

    #[test]
    fn cover_constraints_reject_identical_codes() {
        // brute force: every identical assignment violates some cover row
        let graph = single_edge_graph();
        let options = ColoringOptions {
            color_count: ColorCount::Four,
            ..ColoringOptions::default()
        };
        let mut model = build_model(&graph, &options).unwrap();
        for code in 0..4u8 {
            let bits = [code >> 1, code & 1, code >> 1, code & 1];
            for (var, bit) in model.color_bits.iter().zip(bits.iter()) {
                model.lp.set_lb(*var, f64::from(*bit));
                model.lp.set_ub(*var, f64::from(*bit));
            }
            assert_eq!(model.lp.optimize(), LpStatus::Infeasible, "code {code}");
        }
    }

    #[test]
    fn distinct_codes_stay_feasible() {
        let graph = single_edge_graph();
        let options = ColoringOptions {
            color_count: ColorCount::Four,
            ..ColoringOptions::default()
        };
        let mut model = build_model(&graph, &options).unwrap();
        let bits = [0u8, 0, 1, 0];
        for (var, bit) in model.color_bits.iter().zip(bits.iter()) {
            model.lp.set_lb(*var, f64::from(*bit));
            model.lp.set_ub(*var, f64::from(*bit));
        }
        assert_eq!(model.lp.optimize(), LpStatus::Optimal);
    }

    #[test]
    fn three_color_mode_forbids_code_three() {
        let graph = single_edge_graph();
        let options = ColoringOptions {
            color_count: ColorCount::Three,
            ..ColoringOptions::default()
        };
        let mut model = build_model(&graph, &options).unwrap();
        let idx = 0;
        model.lp.set_lb(model.color_bits[idx], 1.0);
        model.lp.set_ub(model.color_bits[idx], 1.0);
        model.lp.set_lb(model.color_bits[idx + 1], 1.0);
        model.lp.set_ub(model.color_bits[idx + 1], 1.0);
        assert_eq!(model.lp.optimize(), LpStatus::Infeasible);
    }

    #[test]
    fn precolored_vertices_are_fixed() {
        let mut graph = single_edge_graph();
        graph.set_precolor(0, 1).unwrap();
        let options = ColoringOptions {
            color_count: ColorCount::Four,
            ..ColoringOptions::default()
        };
        let mut model = build_model(&graph, &options).unwrap();
        assert_eq!(model.lp.optimize(), LpStatus::Optimal);
        assert_eq!(model.lp.value(model.color_bits[0]), 0.0);
        assert_eq!(model.lp.value(model.color_bits[1]), 1.0);
    }
}
