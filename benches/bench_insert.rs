use std::{sync::Arc, time::Duration};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use kvgraph::{
    Edge, GraphStore, KvBackend, Traits,
    bench_utils::{BenchNode, GraphDataset, GraphShape, generate_graph},
};

const LINE_SEED: u64 = 0xA17C;
const DAG_SEED: u64 = 0xB25F;
const SF_SEED: u64 = 0xC3D9;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

struct BenchCase {
    id: String,
    dataset: Arc<GraphDataset>,
}

fn bench_scales() -> &'static [usize] {
    #[cfg(feature = "bench-ci")]
    {
        &[100, 500]
    }
    #[cfg(not(feature = "bench-ci"))]
    {
        &[1_000, 5_000]
    }
}

fn bench_cases() -> Vec<BenchCase> {
    let mut cases = Vec::new();
    for &nodes in bench_scales() {
        let line = generate_graph(GraphShape::Line, nodes, LINE_SEED + nodes as u64);
        cases.push(BenchCase {
            id: format!("line_{nodes}"),
            dataset: Arc::new(line),
        });
        let dag = generate_graph(
            GraphShape::RandomDag { edges: nodes * 3 },
            nodes,
            DAG_SEED + nodes as u64,
        );
        cases.push(BenchCase {
            id: format!("dag_{nodes}"),
            dataset: Arc::new(dag),
        });
        let scale_free = generate_graph(
            GraphShape::ScaleFree { m: 3 },
            nodes,
            SF_SEED + nodes as u64,
        );
        cases.push(BenchCase {
            id: format!("scalefree_{nodes}"),
            dataset: Arc::new(scale_free),
        });
    }
    cases
}

fn open_store(traits: Traits) -> GraphStore<BenchNode> {
    let backend = Arc::new(KvBackend::open_in_memory().expect("backend"));
    GraphStore::new(backend, traits).expect("store")
}

fn bench_insert_vertices(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_vertices");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in bench_cases() {
        let dataset = case.dataset.clone();
        group.bench_function(BenchmarkId::from_parameter(case.id), |b| {
            b.iter(|| {
                let store = open_store(Traits::new().directed());
                insert_vertices(&store, &dataset);
            });
        });
    }
    group.finish();
}

fn bench_insert_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_edges");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in bench_cases() {
        let dataset = case.dataset.clone();
        group.bench_function(BenchmarkId::from_parameter(case.id), |b| {
            b.iter(|| {
                let store = open_store(Traits::new().directed());
                let hashes = insert_vertices(&store, &dataset);
                insert_edges(&store, &dataset, &hashes);
            });
        });
    }
    group.finish();
}

fn bench_insert_acyclic(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_acyclic");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for case in bench_cases() {
        let dataset = case.dataset.clone();
        group.bench_function(BenchmarkId::from_parameter(case.id), |b| {
            b.iter(|| {
                let store = open_store(Traits::new().directed().prevent_cycles());
                let hashes = insert_vertices(&store, &dataset);
                insert_edges(&store, &dataset, &hashes);
            });
        });
    }
    group.finish();
}

fn insert_vertices(store: &GraphStore<BenchNode>, dataset: &GraphDataset) -> Vec<String> {
    dataset
        .nodes
        .iter()
        .map(|node| store.add_vertex(node).expect("vertex insert"))
        .collect()
}

fn insert_edges(store: &GraphStore<BenchNode>, dataset: &GraphDataset, hashes: &[String]) {
    for &(from, to) in &dataset.edges {
        let edge = Edge::new(hashes[from].clone(), hashes[to].clone());
        store.add_edge(&edge).expect("edge insert");
    }
}

criterion_group!(
    name = insert_benches;
    config = Criterion::default();
    targets = bench_insert_vertices, bench_insert_edges, bench_insert_acyclic
);
criterion_main!(insert_benches);
