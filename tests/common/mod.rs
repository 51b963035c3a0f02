//! Common test utilities for objective function integration tests.

#![allow(dead_code)]

use lightgbm_objective::*;
use rand::prelude::*;

/// Number of classes used by multiclass fixtures.
pub const NUM_CLASS: usize = 3;

/// Documents per query in ranking fixtures (the last query takes the remainder).
pub const DOCS_PER_QUERY: usize = 10;

/// Configuration accepted by every objective type.
pub fn config_for(objective_type: ObjectiveType) -> ObjectiveConfig {
    let config = ObjectiveConfig::new(objective_type);
    if objective_type.is_multiclass() {
        config.with_num_class(NUM_CLASS)
    } else {
        config
    }
}

/// Labels drawn from the domain `objective_type` accepts.
pub fn labels_for(objective_type: ObjectiveType, num_data: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_data)
        .map(|i| match objective_type {
            ObjectiveType::Poisson | ObjectiveType::Tweedie => {
                // keep the label sum positive
                if i == 0 {
                    1.0
                } else {
                    rng.gen_range(0..6) as f32
                }
            }
            ObjectiveType::Gamma => rng.gen_range(0.1..10.0),
            ObjectiveType::Binary => rng.gen_range(0..2) as f32,
            ObjectiveType::CrossEntropy => rng.gen_range(0.0..=1.0),
            ObjectiveType::Multiclass | ObjectiveType::MulticlassOva => {
                rng.gen_range(0..NUM_CLASS) as f32
            }
            ObjectiveType::Lambdarank => rng.gen_range(0..5) as f32,
            _ => rng.gen_range(-5.0..5.0),
        })
        .collect()
}

/// Query sizes covering `num_data` rows.
pub fn query_counts(num_data: usize) -> Vec<DataSize> {
    let mut counts = vec![DOCS_PER_QUERY as DataSize; num_data / DOCS_PER_QUERY];
    if num_data % DOCS_PER_QUERY != 0 {
        counts.push((num_data % DOCS_PER_QUERY) as DataSize);
    }
    counts
}

/// Metadata valid for `objective_type`, optionally with random positive weights.
pub fn metadata_for(
    objective_type: ObjectiveType,
    num_data: usize,
    weighted: bool,
    seed: u64,
) -> Metadata {
    let mut metadata = Metadata::new(labels_for(objective_type, num_data, seed));
    if weighted {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        metadata = metadata.with_weights((0..num_data).map(|_| rng.gen_range(0.1..3.0)).collect());
    }
    if objective_type.needs_queries() {
        metadata = metadata.with_query_counts(&query_counts(num_data));
    }
    metadata
}

/// Random raw scores in a moderate range.
pub fn random_scores(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-3.0..3.0)).collect()
}

/// Create and initialize an objective of `objective_type` on `metadata`.
pub fn initialized(
    objective_type: ObjectiveType,
    metadata: &Metadata,
) -> Box<dyn ObjectiveFunction> {
    let mut objective =
        create_objective_function(objective_type.name(), &config_for(objective_type)).unwrap();
    objective
        .init(metadata, metadata.num_data() as DataSize)
        .unwrap();
    objective
}

/// Run `get_gradients` into a fresh buffer of exactly the required size.
pub fn gradients(objective: &dyn ObjectiveFunction, scores: &[f64]) -> Vec<GradHessPair> {
    let mut gpair = vec![GradHessPair::default(); scores.len()];
    objective.get_gradients(scores, &mut gpair);
    gpair
}
