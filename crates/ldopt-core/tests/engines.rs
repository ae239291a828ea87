use ldopt_core::flow::{
    self, ConstraintSense, CostScalingMethod, CycleCancelingMethod, LinearModel, McfEngine,
    PivotRule,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn all_engines() -> Vec<McfEngine> {
    vec![
        McfEngine::CapacityScaling { factor: 1 },
        McfEngine::CapacityScaling { factor: 4 },
        McfEngine::CostScaling {
            method: CostScalingMethod::Push,
            factor: 16,
        },
        McfEngine::CostScaling {
            method: CostScalingMethod::Augment,
            factor: 16,
        },
        McfEngine::CostScaling {
            method: CostScalingMethod::PartialAugment,
            factor: 4,
        },
        McfEngine::NetworkSimplex {
            pivot_rule: PivotRule::FirstEligible,
        },
        McfEngine::NetworkSimplex {
            pivot_rule: PivotRule::BestEligible,
        },
        McfEngine::NetworkSimplex {
            pivot_rule: PivotRule::BlockSearch,
        },
        McfEngine::NetworkSimplex {
            pivot_rule: PivotRule::CandidateList,
        },
        McfEngine::NetworkSimplex {
            pivot_rule: PivotRule::AlteringList,
        },
        McfEngine::CycleCanceling {
            method: CycleCancelingMethod::Simple,
        },
        McfEngine::CycleCanceling {
            method: CycleCancelingMethod::MinMean,
        },
        McfEngine::CycleCanceling {
            method: CycleCancelingMethod::CancelAndTighten,
        },
    ]
}

// feasible by construction: right hand sides are derived from a witness
fn random_model(rng: &mut StdRng) -> LinearModel {
    let n = rng.gen_range(2..6);
    let witness: Vec<i64> = (0..n).map(|_| rng.gen_range(-12..12)).collect();
    let mut model = LinearModel::new();
    let vars: Vec<_> = (0..n)
        .map(|i| {
            let cost = rng.gen_range(-3..4);
            model
                .add_variable(-15, 15, cost, &format!("x{i}"))
                .unwrap()
        })
        .collect();
    let constraints = rng.gen_range(1..8);
    for _ in 0..constraints {
        let i = rng.gen_range(0..n);
        let mut j = rng.gen_range(0..n);
        if i == j {
            j = (j + 1) % n;
        }
        let slack = rng.gen_range(0..6);
        let rhs = witness[i] - witness[j] - slack;
        model
            .add_difference(vars[i], vars[j], ConstraintSense::Ge, rhs)
            .unwrap();
    }
    model
}

#[test]
fn every_engine_solves_the_reference_scenario() {
    for engine in all_engines() {
        let mut model = LinearModel::new();
        let x1 = model.add_variable(0, 10, 1, "x1").unwrap();
        let x2 = model.add_variable(0, 10, 1, "x2").unwrap();
        model.add_difference(x1, x2, ConstraintSense::Ge, 3).unwrap();
        model.add_bound(x2, ConstraintSense::Ge, 1).unwrap();

        let solution = flow::solve(&mut model, &engine).unwrap();
        assert_eq!(solution.values, vec![4, 1], "{engine:?}");
        assert_eq!(solution.objective, 5, "{engine:?}");
    }
}

#[test]
fn engines_agree_on_random_instances() {
    let mut rng = StdRng::seed_from_u64(0xf10_cafe);
    for case in 0..10 {
        let model = random_model(&mut rng);
        let mut reference = None;
        for engine in all_engines() {
            let mut instance = model.clone();
            let solution = flow::solve(&mut instance, &engine).unwrap();
            assert_eq!(solution.objective, -solution.flow_cost, "{engine:?}");
            match reference {
                None => reference = Some(solution.objective),
                Some(expected) => {
                    assert_eq!(
                        solution.objective, expected,
                        "case {case}, engine {engine:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn engines_agree_on_infeasibility() {
    let mut model = LinearModel::new();
    let x1 = model.add_variable(0, 4, 1, "x1").unwrap();
    let x2 = model.add_variable(0, 4, 1, "x2").unwrap();
    // x1 - x2 >= 3 and x2 - x1 >= 3 cannot both hold
    model.add_difference(x1, x2, ConstraintSense::Ge, 3).unwrap();
    model.add_difference(x2, x1, ConstraintSense::Ge, 3).unwrap();
    for engine in all_engines() {
        let mut instance = model.clone();
        let err = flow::solve(&mut instance, &engine).unwrap_err();
        assert_eq!(err, ldopt_core::FlowError::Infeasible, "{engine:?}");
    }
}

#[test]
fn bad_parameters_are_rejected() {
    let mut model = LinearModel::new();
    model.add_variable(0, 1, 1, "x").unwrap();
    let err = flow::solve(&mut model, &McfEngine::CapacityScaling { factor: 0 }).unwrap_err();
    assert!(matches!(err, ldopt_core::FlowError::InvalidInput(_)));
    let err = flow::solve(
        &mut model,
        &McfEngine::CostScaling {
            method: CostScalingMethod::Push,
            factor: 1,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ldopt_core::FlowError::InvalidInput(_)));
}
