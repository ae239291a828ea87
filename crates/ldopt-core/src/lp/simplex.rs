use super::{LpModel, LpStatus, Sense};
use crate::numerics::EPSILON;
use rayon::prelude::*;

const FEAS_TOL: f64 = 1e-7;

/// Dense two-phase primal simplex over shifted variables (`x = lb + x'`).
/// Upper bounds become explicit rows; Bland's rule keeps pivoting finite.
pub(crate) fn solve(model: &LpModel) -> (LpStatus, Vec<f64>) {
    let n = model.num_vars();
    let mut lower = vec![0.0; n];
    let mut width = vec![0.0; n];
    let mut col_of = vec![usize::MAX; n];
    let mut structural = Vec::new();

    for var in 0..n {
        let (lb, ub) = model.var_bounds(var);
        if ub - lb < -EPSILON {
            return (LpStatus::Infeasible, Vec::new());
        }
        lower[var] = lb;
        width[var] = (ub - lb).max(0.0);
        if width[var] > EPSILON {
            col_of[var] = structural.len();
            structural.push(var);
        }
    }

    // Row specs over structural columns, with bounds shifted out of the rhs.
    let mut specs: Vec<(Vec<(usize, f64)>, Sense, f64)> = Vec::new();
    for (terms, sense, rhs) in model.rows() {
        let mut shifted = rhs;
        let mut row_terms = Vec::new();
        for &(var, coeff) in terms {
            shifted -= coeff * lower[var];
            if col_of[var] != usize::MAX {
                row_terms.push((col_of[var], coeff));
            }
        }
        if row_terms.is_empty() {
            let holds = match sense {
                Sense::Ge => shifted <= FEAS_TOL,
                Sense::Le => shifted >= -FEAS_TOL,
                Sense::Eq => shifted.abs() <= FEAS_TOL,
            };
            if !holds {
                return (LpStatus::Infeasible, Vec::new());
            }
            continue;
        }
        specs.push((row_terms, sense, shifted));
    }
    for (col, &var) in structural.iter().enumerate() {
        specs.push((vec![(col, 1.0)], Sense::Le, width[var]));
    }

    // Normalize right hand sides to be non-negative.
    for (terms, sense, rhs) in specs.iter_mut() {
        if *rhs < 0.0 {
            *rhs = -*rhs;
            for (_, coeff) in terms.iter_mut() {
                *coeff = -*coeff;
            }
            *sense = match *sense {
                Sense::Ge => Sense::Le,
                Sense::Le => Sense::Ge,
                Sense::Eq => Sense::Eq,
            };
        }
    }

    let m = specs.len();
    let n_struct = structural.len();
    let n_slack = specs
        .iter()
        .filter(|(_, sense, _)| *sense != Sense::Eq)
        .count();
    let n_art = specs
        .iter()
        .filter(|(_, sense, _)| *sense != Sense::Le)
        .count();
    let ncols = n_struct + n_slack + n_art;

    let mut tableau = vec![vec![0.0; ncols + 1]; m];
    let mut basis = vec![usize::MAX; m];
    let mut artificial = vec![false; ncols];

    let mut next_slack = n_struct;
    let mut next_art = n_struct + n_slack;
    for (row, (terms, sense, rhs)) in specs.iter().enumerate() {
        for &(col, coeff) in terms {
            tableau[row][col] += coeff;
        }
        tableau[row][ncols] = *rhs;
        match sense {
            Sense::Le => {
                tableau[row][next_slack] = 1.0;
                basis[row] = next_slack;
                next_slack += 1;
            }
            Sense::Ge => {
                tableau[row][next_slack] = -1.0;
                next_slack += 1;
                tableau[row][next_art] = 1.0;
                artificial[next_art] = true;
                basis[row] = next_art;
                next_art += 1;
            }
            Sense::Eq => {
                tableau[row][next_art] = 1.0;
                artificial[next_art] = true;
                basis[row] = next_art;
                next_art += 1;
            }
        }
    }

    let mut state = Tableau {
        tableau,
        basis,
        ncols,
        threads: model.options().threads,
        budget: model.options().max_iterations,
    };

    // Phase 1: drive the artificial variables to zero.
    if n_art > 0 {
        let mut cost = vec![0.0; ncols];
        for (col, flag) in artificial.iter().enumerate() {
            if *flag {
                cost[col] = 1.0;
            }
        }
        match state.run(&cost, &vec![false; ncols]) {
            PhaseEnd::Optimal => {}
            PhaseEnd::Unbounded => return (LpStatus::Unbounded, Vec::new()),
            PhaseEnd::IterationLimit => return (LpStatus::IterationLimit, Vec::new()),
        }
        let infeasibility: f64 = state
            .basis
            .iter()
            .zip(state.tableau.iter())
            .filter(|(&b, _)| artificial[b])
            .map(|(_, row)| row[ncols])
            .sum();
        if infeasibility > FEAS_TOL {
            return (LpStatus::Infeasible, Vec::new());
        }
        state.drive_out_artificials(&artificial);
    }

    // Phase 2: the real objective.
    let mut cost = vec![0.0; ncols];
    for (col, &var) in structural.iter().enumerate() {
        cost[col] = model.objective_coeff(var);
    }
    match state.run(&cost, &artificial) {
        PhaseEnd::Optimal => {}
        PhaseEnd::Unbounded => return (LpStatus::Unbounded, Vec::new()),
        PhaseEnd::IterationLimit => return (LpStatus::IterationLimit, Vec::new()),
    }

    let mut values = lower;
    for (row, &b) in state.basis.iter().enumerate() {
        if b < n_struct {
            values[structural[b]] += state.tableau[row][state.ncols];
        }
    }
    (LpStatus::Optimal, values)
}

enum PhaseEnd {
    Optimal,
    Unbounded,
    IterationLimit,
}

struct Tableau {
    tableau: Vec<Vec<f64>>,
    basis: Vec<usize>,
    ncols: usize,
    threads: usize,
    budget: usize,
}

impl Tableau {
    fn run(&mut self, cost: &[f64], barred: &[bool]) -> PhaseEnd {
        loop {
            if self.budget == 0 {
                return PhaseEnd::IterationLimit;
            }
            self.budget -= 1;

            let reduced = self.reduced_costs(cost);
            let entering = self.entering_column(&reduced, barred);
            let Some(col) = entering else {
                return PhaseEnd::Optimal;
            };

            let mut pivot_row = usize::MAX;
            let mut best_ratio = f64::INFINITY;
            for row in 0..self.tableau.len() {
                let coeff = self.tableau[row][col];
                if coeff > EPSILON {
                    let ratio = self.tableau[row][self.ncols] / coeff;
                    if ratio < best_ratio - EPSILON
                        || (ratio < best_ratio + EPSILON
                            && (pivot_row == usize::MAX || self.basis[row] < self.basis[pivot_row]))
                    {
                        best_ratio = ratio;
                        pivot_row = row;
                    }
                }
            }
            if pivot_row == usize::MAX {
                return PhaseEnd::Unbounded;
            }
            self.pivot(pivot_row, col);
        }
    }

    fn reduced_costs(&self, cost: &[f64]) -> Vec<f64> {
        let mut reduced = cost.to_vec();
        for (row, &b) in self.basis.iter().enumerate() {
            let cb = cost[b];
            if cb != 0.0 {
                let tab_row = &self.tableau[row];
                for (r, &a) in reduced.iter_mut().zip(tab_row.iter()) {
                    *r -= cb * a;
                }
            }
        }
        reduced
    }

    // Bland's rule: the lowest-index improving column.
    fn entering_column(&self, reduced: &[f64], barred: &[bool]) -> Option<usize> {
        if self.threads > 1 {
            (0..self.ncols)
                .into_par_iter()
                .filter(|&col| !barred[col] && reduced[col] < -EPSILON)
                .min()
        } else {
            (0..self.ncols).find(|&col| !barred[col] && reduced[col] < -EPSILON)
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let pivot_value = self.tableau[row][col];
        for value in self.tableau[row].iter_mut() {
            *value /= pivot_value;
        }
        for other in 0..self.tableau.len() {
            if other == row {
                continue;
            }
            let factor = self.tableau[other][col];
            if factor.abs() <= 1e-12 {
                continue;
            }
            for column in 0..=self.ncols {
                self.tableau[other][column] -= factor * self.tableau[row][column];
            }
            self.tableau[other][col] = 0.0;
        }
        self.basis[row] = col;
    }

    // Pivot basic artificials onto real columns where the row allows it;
    // rows that allow nothing are redundant and stay inert.
    fn drive_out_artificials(&mut self, artificial: &[bool]) {
        for row in 0..self.tableau.len() {
            if !artificial[self.basis[row]] {
                continue;
            }
            let col = (0..self.ncols)
                .find(|&col| !artificial[col] && self.tableau[row][col].abs() > EPSILON);
            if let Some(col) = col {
                self.pivot(row, col);
            }
        }
    }
}
