use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lightgbm_objective::{
    create_objective_function, DataSize, GradHessPair, Metadata, ObjectiveConfig, ObjectiveType,
};
use rand::prelude::*;

const NUM_DATA: usize = 100_000;
const NUM_CLASS: usize = 5;

fn metadata(objective_type: ObjectiveType, rng: &mut StdRng) -> Metadata {
    let labels: Vec<f32> = (0..NUM_DATA)
        .map(|_| match objective_type {
            ObjectiveType::Binary => rng.gen_range(0..2) as f32,
            ObjectiveType::Multiclass => rng.gen_range(0..NUM_CLASS) as f32,
            ObjectiveType::Lambdarank => rng.gen_range(0..5) as f32,
            _ => rng.gen_range(-10.0..10.0),
        })
        .collect();
    let metadata = Metadata::new(labels);
    if objective_type.needs_queries() {
        metadata.with_query_counts(&vec![50; NUM_DATA / 50])
    } else {
        metadata
    }
}

fn bench_get_gradients(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_gradients");
    group.throughput(Throughput::Elements(NUM_DATA as u64));
    let mut rng = StdRng::seed_from_u64(42);

    for objective_type in [
        ObjectiveType::Regression,
        ObjectiveType::Binary,
        ObjectiveType::Multiclass,
        ObjectiveType::Lambdarank,
    ] {
        let config = ObjectiveConfig::new(objective_type).with_num_class(NUM_CLASS);
        let mut objective = create_objective_function(objective_type.name(), &config).unwrap();
        objective
            .init(&metadata(objective_type, &mut rng), NUM_DATA as DataSize)
            .unwrap();

        let len = NUM_DATA * objective.num_tree_per_iteration();
        let scores: Vec<f64> = (0..len).map(|_| rng.gen_range(-2.0..2.0)).collect();
        let mut gpair = vec![GradHessPair::default(); len];

        group.bench_with_input(
            BenchmarkId::from_parameter(objective_type),
            &scores,
            |b, scores| b.iter(|| objective.get_gradients(black_box(scores), &mut gpair)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_get_gradients);
criterion_main!(benches);
