mod simplex;

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constr(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Ge,
    Le,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    IterationLimit,
}

/// Linear expression over model variables, duplicate terms combined.
#[derive(Debug, Clone, Default)]
pub struct LinExpr {
    terms: BTreeMap<usize, f64>,
    constant: f64,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, var: Var, coeff: f64) -> Self {
        self.add_term(var, coeff);
        self
    }

    pub fn plus(mut self, value: f64) -> Self {
        self.constant += value;
        self
    }

    pub fn add_term(&mut self, var: Var, coeff: f64) {
        *self.terms.entry(var.0).or_insert(0.0) += coeff;
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, f64)> + '_ {
        self.terms.iter().map(|(&idx, &coeff)| (Var(idx), coeff))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LpOptions {
    pub threads: usize,
    pub max_iterations: usize,
}

impl Default for LpOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            max_iterations: 20_000,
        }
    }
}

#[derive(Debug, Clone)]
struct VarData {
    lb: f64,
    ub: f64,
    name: String,
}

#[derive(Debug, Clone)]
struct ConstrData {
    terms: Vec<(usize, f64)>,
    sense: Sense,
    rhs: f64,
    name: String,
}

/// In-memory LP model with the query surface the coloring core consumes:
/// values, slacks, senses, coefficients, columns, and post-solve bound edits.
#[derive(Debug, Clone)]
pub struct LpModel {
    vars: Vec<VarData>,
    constrs: Vec<ConstrData>,
    columns: Vec<Vec<usize>>,
    objective: Vec<f64>,
    values: Vec<f64>,
    options: LpOptions,
}

impl LpModel {
    pub fn new() -> Self {
        Self::with_options(LpOptions::default())
    }

    pub fn with_options(options: LpOptions) -> Self {
        Self {
            vars: Vec::new(),
            constrs: Vec::new(),
            columns: Vec::new(),
            objective: Vec::new(),
            values: Vec::new(),
            options,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constrs(&self) -> usize {
        self.constrs.len()
    }

    pub fn add_var(&mut self, lb: f64, ub: f64, obj: f64, name: &str) -> Var {
        let var = Var(self.vars.len());
        self.vars.push(VarData {
            lb,
            ub,
            name: name.to_string(),
        });
        self.columns.push(Vec::new());
        self.objective.push(obj);
        self.values.push(0.0);
        var
    }

    /// Expression constants fold into the right hand side.
    pub fn add_constr(&mut self, expr: LinExpr, sense: Sense, rhs: f64, name: &str) -> Constr {
        let constr = Constr(self.constrs.len());
        let mut terms = Vec::new();
        for (var, coeff) in expr.iter() {
            if coeff != 0.0 {
                terms.push((var.0, coeff));
                self.columns[var.0].push(constr.0);
            }
        }
        self.constrs.push(ConstrData {
            terms,
            sense,
            rhs: rhs - expr.constant(),
            name: name.to_string(),
        });
        constr
    }

    /// Replaces the whole objective; variables absent from `expr` get zero.
    pub fn set_objective(&mut self, expr: &LinExpr) {
        self.objective.iter_mut().for_each(|c| *c = 0.0);
        for (var, coeff) in expr.iter() {
            self.objective[var.0] = coeff;
        }
    }

    pub fn optimize(&mut self) -> LpStatus {
        let (status, values) = simplex::solve(self);
        if status == LpStatus::Optimal {
            self.values = values;
        }
        status
    }

    pub fn value(&self, var: Var) -> f64 {
        self.values[var.0]
    }

    pub fn activity(&self, constr: Constr) -> f64 {
        self.constrs[constr.0]
            .terms
            .iter()
            .map(|&(var, coeff)| coeff * self.values[var])
            .sum()
    }

    pub fn slack(&self, constr: Constr) -> f64 {
        self.constrs[constr.0].rhs - self.activity(constr)
    }

    pub fn sense(&self, constr: Constr) -> Sense {
        self.constrs[constr.0].sense
    }

    pub fn coeff(&self, constr: Constr, var: Var) -> f64 {
        self.constrs[constr.0]
            .terms
            .iter()
            .find(|&&(idx, _)| idx == var.0)
            .map(|&(_, coeff)| coeff)
            .unwrap_or(0.0)
    }

    /// Constraints whose rows touch `var`.
    pub fn column(&self, var: Var) -> &[usize] {
        &self.columns[var.0]
    }

    pub fn lb(&self, var: Var) -> f64 {
        self.vars[var.0].lb
    }

    pub fn ub(&self, var: Var) -> f64 {
        self.vars[var.0].ub
    }

    pub fn set_lb(&mut self, var: Var, lb: f64) {
        self.vars[var.0].lb = lb;
    }

    pub fn set_ub(&mut self, var: Var, ub: f64) {
        self.vars[var.0].ub = ub;
    }

    pub fn var_name(&self, var: Var) -> &str {
        &self.vars[var.0].name
    }

    pub fn constr_name(&self, constr: Constr) -> &str {
        &self.constrs[constr.0].name
    }

    pub(crate) fn options(&self) -> &LpOptions {
        &self.options
    }

    pub(crate) fn objective_coeff(&self, var: usize) -> f64 {
        self.objective[var]
    }

    pub(crate) fn var_bounds(&self, var: usize) -> (f64, f64) {
        (self.vars[var].lb, self.vars[var].ub)
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = (&[(usize, f64)], Sense, f64)> + '_ {
        self.constrs
            .iter()
            .map(|c| (c.terms.as_slice(), c.sense, c.rhs))
    }
}

impl Default for LpModel {
    fn default() -> Self {
        Self::new()
    }
}
