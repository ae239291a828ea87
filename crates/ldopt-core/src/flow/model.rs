use crate::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    Ge,
    Le,
    Eq,
}

#[derive(Debug, Clone)]
struct VariableData {
    lower: i64,
    upper: i64,
    cost: i64,
    name: String,
}

/// Normalized differential constraint `x[plus] - x[minus] >= rhs`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DiffConstraint {
    pub plus: usize,
    pub minus: usize,
    pub rhs: i64,
}

/// Linear model accepted by the dual min-cost-flow reduction: integer
/// variables with finite bounds and a linear objective, plus constraints
/// that are either differential or simple bounds. Single-variable
/// constraints fold into the bounds; anything else is out of scope.
#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    variables: Vec<VariableData>,
    constraints: Vec<DiffConstraint>,
    solution: Option<Vec<i64>>,
}

impl LinearModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn add_variable(
        &mut self,
        lower: i64,
        upper: i64,
        cost: i64,
        name: &str,
    ) -> Result<VarId, FlowError> {
        if lower > upper {
            return Err(FlowError::InvalidInput(format!(
                "variable {name}: lower bound {lower} exceeds upper bound {upper}"
            )));
        }
        let id = VarId(self.variables.len());
        self.variables.push(VariableData {
            lower,
            upper,
            cost,
            name: name.to_string(),
        });
        self.solution = None;
        Ok(id)
    }

    /// `xi - xj {sense} rhs`; equality emits both directions.
    pub fn add_difference(
        &mut self,
        xi: VarId,
        xj: VarId,
        sense: ConstraintSense,
        rhs: i64,
    ) -> Result<(), FlowError> {
        if xi.0 >= self.variables.len() || xj.0 >= self.variables.len() {
            return Err(FlowError::InvalidInput(
                "variable id out of range".to_string(),
            ));
        }
        if xi == xj {
            return Err(FlowError::InvalidInput(
                "differential constraint needs two distinct variables".to_string(),
            ));
        }
        match sense {
            ConstraintSense::Ge => self.constraints.push(DiffConstraint {
                plus: xi.0,
                minus: xj.0,
                rhs,
            }),
            ConstraintSense::Le => self.constraints.push(DiffConstraint {
                plus: xj.0,
                minus: xi.0,
                rhs: -rhs,
            }),
            ConstraintSense::Eq => {
                self.constraints.push(DiffConstraint {
                    plus: xi.0,
                    minus: xj.0,
                    rhs,
                });
                self.constraints.push(DiffConstraint {
                    plus: xj.0,
                    minus: xi.0,
                    rhs: -rhs,
                });
            }
        }
        self.solution = None;
        Ok(())
    }

    /// Single-variable constraint, folded into the bounds.
    pub fn add_bound(
        &mut self,
        var: VarId,
        sense: ConstraintSense,
        rhs: i64,
    ) -> Result<(), FlowError> {
        if var.0 >= self.variables.len() {
            return Err(FlowError::InvalidInput(
                "variable id out of range".to_string(),
            ));
        }
        let data = &mut self.variables[var.0];
        match sense {
            ConstraintSense::Ge => data.lower = data.lower.max(rhs),
            ConstraintSense::Le => data.upper = data.upper.min(rhs),
            ConstraintSense::Eq => {
                data.lower = data.lower.max(rhs);
                data.upper = data.upper.min(rhs);
            }
        }
        self.solution = None;
        Ok(())
    }

    /// General entry point. Coefficients must be +-1 and the constraint must
    /// be differential or a simple bound; everything else is rejected.
    pub fn add_constraint(
        &mut self,
        terms: &[(VarId, i64)],
        sense: ConstraintSense,
        rhs: i64,
    ) -> Result<(), FlowError> {
        match terms {
            [(var, 1)] => self.add_bound(*var, sense, rhs),
            [(var, -1)] => {
                let flipped = match sense {
                    ConstraintSense::Ge => ConstraintSense::Le,
                    ConstraintSense::Le => ConstraintSense::Ge,
                    ConstraintSense::Eq => ConstraintSense::Eq,
                };
                self.add_bound(*var, flipped, -rhs)
            }
            [(a, 1), (b, -1)] => self.add_difference(*a, *b, sense, rhs),
            [(a, -1), (b, 1)] => self.add_difference(*b, *a, sense, rhs),
            _ => Err(FlowError::InvalidInput(
                "constraint is not differential and cannot be dualized".to_string(),
            )),
        }
    }

    pub fn lower(&self, var: VarId) -> i64 {
        self.variables[var.0].lower
    }

    pub fn upper(&self, var: VarId) -> i64 {
        self.variables[var.0].upper
    }

    pub fn cost(&self, var: VarId) -> i64 {
        self.variables[var.0].cost
    }

    pub fn name(&self, var: VarId) -> &str {
        &self.variables[var.0].name
    }

    pub fn solution(&self, var: VarId) -> Option<i64> {
        self.solution.as_ref().map(|values| values[var.0])
    }

    pub fn solution_values(&self) -> Option<&[i64]> {
        self.solution.as_deref()
    }

    pub fn objective_value(&self) -> Option<i128> {
        let values = self.solution.as_ref()?;
        Some(
            self.variables
                .iter()
                .zip(values.iter())
                .map(|(data, &x)| data.cost as i128 * x as i128)
                .sum(),
        )
    }

    pub(crate) fn set_solution(&mut self, values: Vec<i64>) {
        self.solution = Some(values);
    }

    pub(crate) fn constraints(&self) -> &[DiffConstraint] {
        &self.constraints
    }

    pub(crate) fn bounds(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.variables.iter().map(|data| (data.lower, data.upper))
    }

    pub(crate) fn costs(&self) -> impl Iterator<Item = i64> + '_ {
        self.variables.iter().map(|data| data.cost)
    }

    /// First violated constraint or bound for `values`, if any.
    pub(crate) fn check_feasible(&self, values: &[i64]) -> Result<(), FlowError> {
        for (var, data) in self.variables.iter().enumerate() {
            let x = values[var];
            if x < data.lower || x > data.upper {
                return Err(FlowError::Infeasible);
            }
        }
        for constraint in &self.constraints {
            if values[constraint.plus] - values[constraint.minus] < constraint.rhs {
                return Err(FlowError::Infeasible);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_single_variable_constraints_into_bounds() {
        let mut model = LinearModel::new();
        let x = model.add_variable(0, 10, 1, "x").unwrap();
        model
            .add_constraint(&[(x, 1)], ConstraintSense::Ge, 3)
            .unwrap();
        model
            .add_constraint(&[(x, -1)], ConstraintSense::Ge, -7)
            .unwrap();
        assert_eq!(model.lower(x), 3);
        assert_eq!(model.upper(x), 7);
        assert_eq!(model.constraint_count(), 0);
    }

    #[test]
    fn normalizes_le_and_eq_differences() {
        let mut model = LinearModel::new();
        let x = model.add_variable(0, 10, 0, "x").unwrap();
        let y = model.add_variable(0, 10, 0, "y").unwrap();
        model.add_difference(x, y, ConstraintSense::Le, 4).unwrap();
        model.add_difference(x, y, ConstraintSense::Eq, 1).unwrap();
        assert_eq!(model.constraint_count(), 3);
        assert!(model.check_feasible(&[3, 2]).is_ok());
        assert!(model.check_feasible(&[4, 2]).is_err());
    }

    #[test]
    fn rejects_general_linear_constraints() {
        let mut model = LinearModel::new();
        let x = model.add_variable(0, 10, 0, "x").unwrap();
        let y = model.add_variable(0, 10, 0, "y").unwrap();
        let err = model
            .add_constraint(&[(x, 2), (y, -1)], ConstraintSense::Ge, 0)
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
        let err = model
            .add_constraint(&[(x, 1), (y, 1)], ConstraintSense::Ge, 0)
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
    }
}
