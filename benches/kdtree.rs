use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kd_neighbors::kdtree::{KDTree, KDTreeBuilder, KDTreeIndex};
use kd_neighbors::{Metric, PointSetView};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_coords(seed: u64, len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0.0..1000.0)).collect()
}

fn construct(coords: &[f64], dim: usize) -> KDTree<'_, f64> {
    KDTreeBuilder::new(Metric::L2)
        .build(PointSetView::try_new(coords, dim).unwrap())
        .unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let dim = 3;
    let coords = random_coords(0, 100_000 * dim);
    let query_coords = random_coords(1, 10_000 * dim);
    let queries = PointSetView::try_new(&query_coords, dim).unwrap();

    c.bench_function("construction (100k points)", |b| {
        b.iter(|| construct(&coords, dim))
    });

    let tree = construct(&coords, dim);

    let mut group = c.benchmark_group("knn");
    for k in [1, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            b.iter(|| tree.search_knn(&queries, k).unwrap())
        });
    }
    group.finish();

    c.bench_function("fixed radius (r = 10)", |b| {
        b.iter(|| tree.search_fixed_radius(&queries, 10.0).unwrap())
    });

    c.bench_function("hybrid (r = 10, max_knn = 16)", |b| {
        b.iter(|| tree.hybrid_search(&queries, 10.0, 16).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
