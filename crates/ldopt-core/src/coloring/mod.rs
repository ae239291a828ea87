mod cycles;
mod model;
mod refine;
mod rounding;

use crate::conflict::ConflictGraph;
use crate::lp::{LinExpr, LpStatus, Sense};
use crate::ColoringError;

use cycles::CycleCuts;
use model::{ColoringModel, NonIntegerCensus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCount {
    Three,
    Four,
}

impl ColorCount {
    pub fn count(self) -> usize {
        match self {
            ColorCount::Three => 3,
            ColorCount::Four => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColoringOptions {
    pub color_count: ColorCount,
    pub threads: usize,
    pub max_iterations: u32,
}

impl Default for ColoringOptions {
    fn default() -> Self {
        Self {
            color_count: ColorCount::Three,
            threads: 1,
            max_iterations: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColoringStats {
    pub refine_iterations: u32,
    pub cycle_cuts: u32,
    pub pairs_fixed: u32,
    pub conflicts_repaired: u32,
}

#[derive(Debug, Clone)]
pub struct ColoringSolution {
    pub colors: Vec<u8>,
    pub conflict_cost: i64,
    pub stats: ColoringStats,
}

/// Relaxed-LP coloring of a conflict graph: build the relaxation, anchor,
/// iteratively tighten with objective perturbations and odd-cycle cuts,
/// round via binding analysis, then decode and greedily repair.
pub fn color(
    graph: &ConflictGraph,
    options: &ColoringOptions,
) -> Result<ColoringSolution, ColoringError> {
    if graph.vertex_count() == 0 {
        return Ok(ColoringSolution {
            colors: Vec::new(),
            conflict_cost: 0,
            stats: ColoringStats::default(),
        });
    }

    let mut model = model::build_model(graph, options)?;
    model::set_anchor(graph, &mut model);

    let status = model.lp.optimize();
    if status != LpStatus::Optimal {
        return Err(ColoringError::SolverFailure(format!(
            "relaxation reported {status:?}"
        )));
    }

    let mut stats = ColoringStats::default();
    let mut cuts = CycleCuts::new();
    let mut objective = LinExpr::new();
    let mut prev = NonIntegerCensus::start();
    let mut cur = NonIntegerCensus::measure(&model.lp, &model.color_bits, &model.edge_bits);
    // the refinement count never needs to exceed 2|V|
    let max_iterations = options.max_iterations.min(2 * graph.vertex_count() as u32);

    while cur.vertex_non_integer > 0
        && cur.vertex_non_integer < prev.vertex_non_integer
        && stats.refine_iterations < max_iterations
    {
        model::adjust_variable_pairs(&model.lp, &model.color_bits, &mut objective);
        model::adjust_conflict_edges(graph, &model.lp, &model.color_bits, &mut objective);
        model.lp.set_objective(&objective);

        let added = add_odd_cycle_cuts(graph, &mut model, &mut cuts);
        stats.cycle_cuts += added;

        let status = model.lp.optimize();
        if status != LpStatus::Optimal {
            return Err(ColoringError::SolverFailure(format!(
                "refinement re-solve reported {status:?}"
            )));
        }

        prev = cur;
        cur = NonIntegerCensus::measure(&model.lp, &model.color_bits, &model.edge_bits);
        stats.refine_iterations += 1;
        eprintln!(
            "[lp_coloring] iter={} nonint={} halfint={} cuts={added}",
            stats.refine_iterations, cur.vertex_non_integer, cur.vertex_half_integer
        );
    }

    stats.pairs_fixed = rounding::round_with_binding_analysis(&mut model, options.color_count)?;

    let mut colors = refine::apply_solution(&model, options.color_count);
    if !graph.has_precolored() {
        stats.conflicts_repaired = refine::greedy_refine(graph, &mut colors, options.color_count);
    }

    let conflict_cost = graph.conflict_cost(&colors);
    Ok(ColoringSolution {
        colors,
        conflict_cost,
        stats,
    })
}

// Fresh cuts for every odd cycle found this round: for both bit layers,
// sum over the cycle is at least 1 and at most L-1.
fn add_odd_cycle_cuts(
    graph: &ConflictGraph,
    model: &mut ColoringModel,
    cuts: &mut CycleCuts,
) -> u32 {
    let mut added = 0;
    for root in 0..graph.vertex_count() as u32 {
        for cycle in cycles::odd_cycles(graph, root) {
            if !cuts.is_new(&cycle) {
                continue;
            }
            let length = cycle.len() as f64;
            for bit in 0..2usize {
                let mut expr = LinExpr::new();
                for &vertex in &cycle {
                    expr.add_term(model.color_bits[((vertex as usize) << 1) + bit], 1.0);
                }
                let name = model.next_constr_name(&format!("ODD{root}_"));
                model.lp.add_constr(expr.clone(), Sense::Ge, 1.0, &name);
                let name = model.next_constr_name(&format!("ODD{root}_"));
                model.lp.add_constr(expr, Sense::Le, length - 1.0, &name);
            }
            added += 1;
        }
    }
    added
}
