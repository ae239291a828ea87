use std::collections::BTreeSet;

use crate::conflict::ConflictGraph;

/// Enumerates odd cycles through `root` along the DFS tree. The distance
/// array carries the two-coloring parity only; a vertex of equal parity seen
/// from the stack top closes an odd cycle, traced back along the stack.
pub(crate) fn odd_cycles(graph: &ConflictGraph, root: u32) -> Vec<Vec<u32>> {
    let n = graph.vertex_count();
    let mut parity = vec![-1i8; n];
    let mut visited = vec![false; n];
    let mut in_cycle = vec![false; n];
    let mut stack: Vec<u32> = Vec::with_capacity(n);
    let mut cycles = Vec::new();

    visited[root as usize] = true;
    parity[root as usize] = 0;
    stack.push(root);

    while let Some(&top) = stack.last() {
        let mut descended = false;
        for &u in graph.neighbors(top) {
            if parity[u as usize] == -1 {
                parity[u as usize] = 1 - parity[top as usize];
                visited[u as usize] = true;
                stack.push(u);
                descended = true;
                break;
            }
        }
        if descended {
            continue;
        }

        for &u in graph.neighbors(top) {
            if visited[u as usize] && parity[u as usize] == parity[top as usize] {
                let mut cycle = Vec::new();
                for &w in stack.iter().rev() {
                    cycle.push(w);
                    in_cycle[w as usize] = true;
                    if w == u {
                        break;
                    }
                }
                if in_cycle[root as usize] {
                    cycles.push(cycle.clone());
                }
                for &w in &cycle {
                    in_cycle[w as usize] = false;
                }
            }
        }

        stack.pop();
        visited[top as usize] = false;
    }

    cycles
}

/// Cycle-signature filter: enumeration across roots emits duplicates, and
/// re-adding their cuts is redundant.
#[derive(Debug, Default)]
pub(crate) struct CycleCuts {
    seen: BTreeSet<Vec<u32>>,
}

impl CycleCuts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new(&mut self, cycle: &[u32]) -> bool {
        let mut signature = cycle.to_vec();
        signature.sort_unstable();
        self.seen.insert(signature)
    }
}
