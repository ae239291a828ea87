use crate::coloring::model::ColoringModel;
use crate::coloring::ColorCount;
use crate::conflict::{ConflictEdge, ConflictGraph};
use crate::numerics::round_bit;

/// Decode 2-bit colors from the relaxation. Under three colors a residual
/// half-integer pair would round to code 11; the second bit is demoted so
/// every color stays in range.
pub(crate) fn apply_solution(model: &ColoringModel, color_count: ColorCount) -> Vec<u8> {
    let mut colors = Vec::with_capacity(model.color_bits.len() / 2);
    for pair in model.color_bits.chunks_exact(2) {
        let b1 = round_bit(model.lp.value(pair[0]));
        let mut b2 = round_bit(model.lp.value(pair[1]));
        if color_count == ColorCount::Three && b1 == 1 && b2 == 1 {
            b2 = 0;
        }
        colors.push((b1 << 1) | b2);
    }
    colors
}

/// Local pairwise repair over residual conflicts. Returns how many edges
/// were resolved.
pub(crate) fn greedy_refine(
    graph: &ConflictGraph,
    colors: &mut [u8],
    color_count: ColorCount,
) -> u32 {
    let mut resolved = 0;
    for edge in graph.edges() {
        if refine_edge(graph, colors, edge, color_count) {
            resolved += 1;
        }
    }
    resolved
}

fn refine_edge(
    graph: &ConflictGraph,
    colors: &mut [u8],
    edge: &ConflictEdge,
    color_count: ColorCount,
) -> bool {
    let endpoints = [edge.source, edge.target];
    if colors[endpoints[0] as usize] != colors[endpoints[1] as usize] {
        return false;
    }

    // colors used by neighbors other than the partner endpoint
    let mut forbidden = [[false; 4]; 2];
    for (side, &vertex) in endpoints.iter().enumerate() {
        let partner = endpoints[1 - side];
        for &u in graph.neighbors(vertex) {
            if u != partner {
                forbidden[side][colors[u as usize] as usize] = true;
            }
        }
    }

    let count = color_count.count() as u8;
    for c1 in 0..count {
        for c2 in 0..count {
            if c1 == c2 || forbidden[0][c1 as usize] || forbidden[1][c2 as usize] {
                continue;
            }
            colors[endpoints[0] as usize] = c1;
            colors[endpoints[1] as usize] = c2;
            return true;
        }
    }
    false
}
