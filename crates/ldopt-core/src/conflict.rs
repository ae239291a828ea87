use crate::ColoringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictEdge {
    pub source: u32,
    pub target: u32,
    pub weight: i64,
}

/// Undirected conflict graph: edges forbid equal colors on their endpoints.
#[derive(Debug, Clone)]
pub struct ConflictGraph {
    adjacency: Vec<Vec<u32>>,
    edges: Vec<ConflictEdge>,
    precolor: Vec<Option<u8>>,
}

impl ConflictGraph {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
            edges: Vec::new(),
            precolor: vec![None; vertex_count],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn add_edge(&mut self, source: u32, target: u32, weight: i64) -> Result<(), ColoringError> {
        if source as usize >= self.vertex_count() || target as usize >= self.vertex_count() {
            return Err(ColoringError::InvalidInput(
                "edge endpoint outside vertex range".to_string(),
            ));
        }
        if source == target {
            return Err(ColoringError::InvalidInput(
                "edge endpoints must be distinct".to_string(),
            ));
        }
        if weight <= 0 {
            return Err(ColoringError::InvalidInput(format!(
                "positive edge weight expected, got {weight}"
            )));
        }
        self.adjacency[source as usize].push(target);
        self.adjacency[target as usize].push(source);
        self.edges.push(ConflictEdge {
            source,
            target,
            weight,
        });
        Ok(())
    }

    pub fn neighbors(&self, vertex: u32) -> &[u32] {
        &self.adjacency[vertex as usize]
    }

    pub fn degree(&self, vertex: u32) -> usize {
        self.adjacency[vertex as usize].len()
    }

    pub fn edges(&self) -> &[ConflictEdge] {
        &self.edges
    }

    pub fn set_precolor(&mut self, vertex: u32, color: u8) -> Result<(), ColoringError> {
        if vertex as usize >= self.vertex_count() {
            return Err(ColoringError::InvalidInput(
                "vertex outside range".to_string(),
            ));
        }
        if color > 3 {
            return Err(ColoringError::InvalidInput(format!(
                "precolor out of range: {color}"
            )));
        }
        self.precolor[vertex as usize] = Some(color);
        Ok(())
    }

    pub fn precolor(&self, vertex: u32) -> Option<u8> {
        self.precolor[vertex as usize]
    }

    pub fn has_precolored(&self) -> bool {
        self.precolor.iter().any(Option::is_some)
    }

    /// The vertex with the largest degree; the scan keeps the first maximum.
    pub fn max_degree_vertex(&self) -> u32 {
        let mut best = 0;
        let mut best_degree = 0;
        for vertex in 0..self.vertex_count() {
            let degree = self.adjacency[vertex].len();
            if degree > best_degree {
                best = vertex;
                best_degree = degree;
            }
        }
        best as u32
    }

    /// Total weight of edges whose endpoints share a color.
    pub fn conflict_cost(&self, colors: &[u8]) -> i64 {
        self.edges
            .iter()
            .filter(|edge| colors[edge.source as usize] == colors[edge.target as usize])
            .map(|edge| edge.weight)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_edges() {
        let mut graph = ConflictGraph::new(2);
        assert!(graph.add_edge(0, 0, 1).is_err());
        assert!(graph.add_edge(0, 2, 1).is_err());
        assert!(graph.add_edge(0, 1, 0).is_err());
        assert!(graph.add_edge(0, 1, -3).is_err());
        assert!(graph.add_edge(0, 1, 2).is_ok());
    }

    #[test]
    fn max_degree_keeps_first_maximum() {
        let mut graph = ConflictGraph::new(4);
        graph.add_edge(0, 1, 1).unwrap();
        graph.add_edge(1, 2, 1).unwrap();
        graph.add_edge(2, 3, 1).unwrap();
        // vertices 1 and 2 both have degree 2; the scan keeps vertex 1
        assert_eq!(graph.max_degree_vertex(), 1);
    }

    #[test]
    fn conflict_cost_counts_same_color_edges() {
        let mut graph = ConflictGraph::new(3);
        graph.add_edge(0, 1, 2).unwrap();
        graph.add_edge(1, 2, 5).unwrap();
        assert_eq!(graph.conflict_cost(&[0, 0, 1]), 2);
        assert_eq!(graph.conflict_cost(&[0, 0, 0]), 7);
        assert_eq!(graph.conflict_cost(&[0, 1, 2]), 0);
    }
}
