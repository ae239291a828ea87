use crate::coloring::model::{ColoringModel, NonIntegerCensus};
use crate::coloring::ColorCount;
use crate::lp::{Constr, LpStatus, Sense, Var};
use crate::numerics::{is_half_integral, EPSILON};
use crate::ColoringError;

#[derive(Debug, Clone, Copy)]
struct ConstrVarInfo {
    coeff: f64,
    sense: Sense,
}

impl Default for ConstrVarInfo {
    fn default() -> Self {
        Self {
            coeff: 0.0,
            sense: Sense::Ge,
        }
    }
}

impl ConstrVarInfo {
    // Two (coeff, sense) observations are compatible iff either coefficient
    // is zero or they share the sign-sense combination.
    fn same_direction(&self, other: &ConstrVarInfo) -> bool {
        if self.coeff.abs() <= EPSILON || other.coeff.abs() <= EPSILON {
            true
        } else if self.sense == other.sense {
            (self.coeff > 0.0) == (other.coeff > 0.0)
        } else {
            (self.coeff > 0.0) != (other.coeff > 0.0)
        }
    }
}

/// Rounding of half-integer vertex pairs deduced from binding constraints.
/// A pair at (0.5, 0.5) is fixed to a candidate bit assignment that keeps
/// every binding constraint satisfied; incompatible sensitivity directions
/// or an empty candidate set abort the pair.
pub(crate) fn round_with_binding_analysis(
    model: &mut ColoringModel,
    color_count: ColorCount,
) -> Result<u32, ColoringError> {
    let mut prev = NonIntegerCensus::start();
    let mut cur = NonIntegerCensus::measure(&model.lp, &model.color_bits, &model.edge_bits);
    let mut pairs_fixed = 0;

    while cur.vertex_non_integer > 0 && cur.vertex_non_integer < prev.vertex_non_integer {
        let mut sweep: Vec<Var> = Vec::new();
        for pair_start in (0..model.color_bits.len()).step_by(2) {
            let var1 = model.color_bits[pair_start];
            let var2 = model.color_bits[pair_start + 1];
            let value1 = model.lp.value(var1);
            let value2 = model.lp.value(var2);
            if !(is_half_integral(value1) && is_half_integral(value2)) {
                continue;
            }

            if let Some((b1, b2)) = analyze_pair(model, var1, var2, value1, value2, color_count) {
                model.lp.set_lb(var1, f64::from(b1));
                model.lp.set_ub(var1, f64::from(b1));
                model.lp.set_lb(var2, f64::from(b2));
                model.lp.set_ub(var2, f64::from(b2));
                sweep.push(var1);
                sweep.push(var2);
                pairs_fixed += 1;
            }
        }

        let mut status = model.lp.optimize();
        if status == LpStatus::Infeasible && !sweep.is_empty() {
            // the binding analysis only covers binding constraints; a sweep
            // that trips a non-binding one is taken back wholesale
            for &var in &sweep {
                model.lp.set_lb(var, 0.0);
                model.lp.set_ub(var, 1.0);
            }
            pairs_fixed -= (sweep.len() / 2) as u32;
            status = model.lp.optimize();
            if status != LpStatus::Optimal {
                return Err(ColoringError::SolverFailure(format!(
                    "re-solve after rounding rollback reported {status:?}"
                )));
            }
            break;
        }
        if status != LpStatus::Optimal {
            return Err(ColoringError::SolverFailure(format!(
                "re-solve after rounding reported {status:?}"
            )));
        }
        prev = cur;
        cur = NonIntegerCensus::measure(&model.lp, &model.color_bits, &model.edge_bits);
    }

    Ok(pairs_fixed)
}

// Scans the binding constraints through both columns and returns the
// lexicographically smallest surviving candidate, or None on abort.
fn analyze_pair(
    model: &ColoringModel,
    var1: Var,
    var2: Var,
    value1: f64,
    value2: f64,
    color_count: ColorCount,
) -> Option<(u8, u8)> {
    let mut valid = [[true; 2]; 2];
    if color_count == ColorCount::Three {
        valid[1][1] = false;
    }
    let mut prev_info = [ConstrVarInfo::default(); 2];

    for &var in &[var1, var2] {
        for &constr_idx in model.lp.column(var) {
            let constr = Constr(constr_idx);
            if model.lp.slack(constr).abs() > EPSILON {
                continue;
            }
            let sense = model.lp.sense(constr);
            let cur_info = [
                ConstrVarInfo {
                    coeff: model.lp.coeff(constr, var1),
                    sense,
                },
                ConstrVarInfo {
                    coeff: model.lp.coeff(constr, var2),
                    sense,
                },
            ];

            // irreconcilable sensitivity directions
            if !cur_info[0].same_direction(&prev_info[0])
                || !cur_info[1].same_direction(&prev_info[1])
            {
                return None;
            }

            for (b1, row) in valid.iter_mut().enumerate() {
                for (b2, candidate) in row.iter_mut().enumerate() {
                    if !*candidate {
                        continue;
                    }
                    let delta = cur_info[0].coeff * (b1 as f64 - value1)
                        + cur_info[1].coeff * (b2 as f64 - value2);
                    let violates = match sense {
                        Sense::Ge => delta < -EPSILON,
                        Sense::Le => delta > EPSILON,
                        Sense::Eq => delta.abs() > EPSILON,
                    };
                    if violates {
                        *candidate = false;
                    }
                }
            }

            if valid.iter().flatten().all(|candidate| !candidate) {
                return None;
            }

            prev_info = cur_info;
        }
    }

    for b1 in 0..2u8 {
        for b2 in 0..2u8 {
            if valid[b1 as usize][b2 as usize] {
                return Some((b1, b2));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(coeff: f64, sense: Sense) -> ConstrVarInfo {
        ConstrVarInfo { coeff, sense }
    }

    #[test]
    fn zero_coefficients_are_always_compatible() {
        assert!(info(0.0, Sense::Ge).same_direction(&info(-1.0, Sense::Le)));
        assert!(info(1.0, Sense::Ge).same_direction(&info(0.0, Sense::Ge)));
    }

    #[test]
    fn matching_sense_needs_matching_sign() {
        assert!(info(1.0, Sense::Ge).same_direction(&info(2.0, Sense::Ge)));
        assert!(!info(1.0, Sense::Ge).same_direction(&info(-1.0, Sense::Ge)));
    }

    #[test]
    fn opposite_sense_needs_opposite_sign() {
        assert!(info(1.0, Sense::Ge).same_direction(&info(-1.0, Sense::Le)));
        assert!(!info(1.0, Sense::Ge).same_direction(&info(1.0, Sense::Le)));
    }
}
