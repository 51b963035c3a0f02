//! Properties every objective must satisfy, checked across all variants.

use lightgbm_objective::*;
use proptest::prelude::*;

mod common;
use common::*;

const NUM_DATA: usize = 57;

#[test]
fn test_writes_exactly_required_slots() {
    let sentinel = GradHessPair::new(f64::MAX, -1.0);
    for objective_type in ObjectiveType::ALL {
        let metadata = metadata_for(objective_type, NUM_DATA, false, 7);
        let objective = initialized(objective_type, &metadata);
        let required = NUM_DATA * objective.num_tree_per_iteration();

        let scores = random_scores(required + 5, 11);
        let mut gpair = vec![sentinel; required + 5];
        objective.get_gradients(&scores, &mut gpair);

        assert!(
            gpair[..required].iter().all(|p| *p != sentinel),
            "{} left slots unwritten",
            objective_type
        );
        assert!(
            gpair[required..].iter().all(|p| *p == sentinel),
            "{} wrote past its slots",
            objective_type
        );
    }
}

#[test]
fn test_hessians_finite_and_non_negative() {
    for objective_type in ObjectiveType::ALL {
        for weighted in [false, true] {
            let metadata = metadata_for(objective_type, NUM_DATA, weighted, 3);
            let objective = initialized(objective_type, &metadata);
            let scores = random_scores(NUM_DATA * objective.num_tree_per_iteration(), 5);
            for pair in gradients(objective.as_ref(), &scores) {
                assert!(pair.grad.is_finite(), "{}: {:?}", objective_type, pair);
                assert!(pair.hess.is_finite() && pair.hess >= 0.0, "{}: {:?}", objective_type, pair);
            }
        }
    }
}

#[test]
fn test_constant_hessian_claim_holds() {
    for objective_type in ObjectiveType::ALL {
        for weighted in [false, true] {
            let metadata = metadata_for(objective_type, NUM_DATA, weighted, 13);
            let objective = initialized(objective_type, &metadata);
            if !objective.is_constant_hessian() {
                continue;
            }
            let scores = random_scores(NUM_DATA * objective.num_tree_per_iteration(), 17);
            let gpair = gradients(objective.as_ref(), &scores);
            let first = gpair[0].hess;
            assert!(
                gpair.iter().all(|p| p.hess == first),
                "{} claims a constant Hessian",
                objective_type
            );
        }
    }
}

#[test]
fn test_restored_objective_gives_identical_gradients() {
    for objective_type in ObjectiveType::ALL {
        let metadata = metadata_for(objective_type, NUM_DATA, true, 19);
        let objective = initialized(objective_type, &metadata);

        let mut restored = create_objective_function_from_str(&objective.to_string()).unwrap();
        restored
            .init(&metadata, NUM_DATA as DataSize)
            .unwrap();
        assert_eq!(restored.to_string(), objective.to_string());
        assert_eq!(restored.is_constant_hessian(), objective.is_constant_hessian());

        let scores = random_scores(NUM_DATA * objective.num_tree_per_iteration(), 23);
        assert_eq!(
            gradients(restored.as_ref(), &scores),
            gradients(objective.as_ref(), &scores),
            "{}",
            objective_type
        );
    }
}

#[test]
fn test_gradients_are_deterministic() {
    let num_data = 5_000;
    for objective_type in [
        ObjectiveType::Regression,
        ObjectiveType::Binary,
        ObjectiveType::Multiclass,
        ObjectiveType::Lambdarank,
    ] {
        let metadata = metadata_for(objective_type, num_data, true, 29);
        let objective = initialized(objective_type, &metadata);
        let scores = random_scores(num_data * objective.num_tree_per_iteration(), 31);
        assert_eq!(
            gradients(objective.as_ref(), &scores),
            gradients(objective.as_ref(), &scores)
        );
    }
}

#[test]
fn test_metadata_mismatch_is_data_error() {
    for objective_type in ObjectiveType::ALL {
        let metadata = metadata_for(objective_type, NUM_DATA, false, 37);
        let mut objective =
            create_objective_function(objective_type.name(), &config_for(objective_type)).unwrap();
        let err = objective
            .init(&metadata, NUM_DATA as DataSize + 1)
            .unwrap_err();
        assert!(err.is_data_error(), "{}: {:?}", objective_type, err);
    }
}

#[test]
fn test_factory_error_families() {
    let err = create_objective_function("unknown_type", &ObjectiveConfig::default()).unwrap_err();
    assert!(err.is_config_error());

    let err = create_objective_function_from_str("garbage string").unwrap_err();
    assert!(err.is_parse_error());
}

proptest! {
    #[test]
    fn prop_l2_gradient_is_residual(
        rows in prop::collection::vec((-1e3f32..1e3, -1e3f64..1e3), 1..64),
    ) {
        let (labels, scores): (Vec<f32>, Vec<f64>) = rows.into_iter().unzip();
        let metadata = Metadata::new(labels.clone());
        let objective = initialized(ObjectiveType::Regression, &metadata);
        prop_assert!(objective.is_constant_hessian());
        for (i, pair) in gradients(objective.as_ref(), &scores).iter().enumerate() {
            prop_assert_eq!(pair.grad, scores[i] - labels[i] as f64);
            prop_assert_eq!(pair.hess, 1.0);
        }
    }

    #[test]
    fn prop_binary_gradient_bounded(
        sigmoid in 0.1f64..5.0,
        scores in prop::collection::vec(-50.0f64..50.0, 4),
    ) {
        let metadata = Metadata::new(vec![0.0, 1.0, 1.0, 0.0]);
        let config = ObjectiveConfig::binary().with_sigmoid(sigmoid);
        let mut objective = create_objective_function("binary", &config).unwrap();
        objective.init(&metadata, 4).unwrap();
        for pair in gradients(objective.as_ref(), &scores) {
            prop_assert!(pair.grad.abs() <= sigmoid);
            prop_assert!(pair.hess >= 0.0 && pair.hess <= sigmoid * sigmoid / 4.0 + 1e-12);
        }
    }

    #[test]
    fn prop_softmax_channel_gradients_sum_to_zero(
        scores in prop::collection::vec(-10.0f64..10.0, 3 * 8),
        labels in prop::collection::vec(0usize..3, 8),
    ) {
        let metadata = Metadata::new(labels.iter().map(|&l| l as f32).collect());
        let objective = initialized(ObjectiveType::Multiclass, &metadata);
        let gpair = gradients(objective.as_ref(), &scores);
        for i in 0..8 {
            let sum: f64 = (0..3).map(|k| gpair[k * 8 + i].grad).sum();
            prop_assert!(sum.abs() < 1e-9);
        }
    }

    #[test]
    fn prop_description_round_trip(
        alpha in 0.01f64..0.99,
        sigmoid in 0.01f64..10.0,
        variance_power in 1.0f64..1.99,
    ) {
        let configs = [
            ("quantile", ObjectiveConfig::default().with_alpha(alpha)),
            ("huber", ObjectiveConfig::default().with_alpha(alpha)),
            ("binary", ObjectiveConfig::binary().with_sigmoid(sigmoid)),
            ("tweedie", ObjectiveConfig::tweedie(variance_power)),
        ];
        for (name, config) in configs {
            let objective = create_objective_function(name, &config).unwrap();
            let description = objective.to_string();
            let restored = create_objective_function_from_str(&description).unwrap();
            prop_assert_eq!(restored.to_string(), description);
        }
    }
}
