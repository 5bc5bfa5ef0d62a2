use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use layout_core::config::presets;
use layout_core::graph::Graph;
use layout_core::layout;

/// A layered graph with a chain backbone plus periodic cross edges and a
/// few skip-level edges, scaling to `node_count` nodes.
fn build_scaling_graph(node_count: usize, acyclic: bool) -> Graph {
    let mut g = Graph::new();
    for i in 0..node_count {
        g.add_node(i as u64, format!("node{i}"), 4).unwrap();
    }
    for i in 0..node_count.saturating_sub(1) {
        let _ = g.add_edge(i as u64, i as u64 + 1, true, None);
    }
    for i in (0..node_count).step_by(3) {
        if i + 2 < node_count {
            let _ = g.add_edge(i as u64, i as u64 + 2, true, None);
        }
        if i + 4 < node_count {
            let _ = g.add_edge(i as u64, i as u64 + 4, true, None);
        }
    }
    if !acyclic && node_count > 10 {
        for i in (5..node_count).step_by(7) {
            if i >= 3 {
                let _ = g.add_edge(i as u64, i as u64 - 3, true, None);
            }
        }
    }
    g
}

fn small_dag() -> Graph {
    build_scaling_graph(4, true)
}

fn medium_dag() -> Graph {
    build_scaling_graph(8, true)
}

fn large_dag() -> Graph {
    let mut g = Graph::new();
    let names = [
        "input", "validate", "process", "output", "error_catch", "error_log", "error_notify",
        "fallback", "metrics", "dashboard", "alerts", "reports",
    ];
    for (i, name) in names.iter().enumerate() {
        g.add_node(i as u64, *name, 4).unwrap();
    }
    let edge = |g: &mut Graph, a: usize, b: usize| {
        let _ = g.add_edge(a as u64, b as u64, true, None);
    };
    edge(&mut g, 0, 1);
    edge(&mut g, 1, 2);
    edge(&mut g, 2, 3);
    edge(&mut g, 1, 4);
    edge(&mut g, 4, 5);
    edge(&mut g, 4, 6);
    edge(&mut g, 4, 7);
    edge(&mut g, 2, 8);
    edge(&mut g, 8, 9);
    edge(&mut g, 8, 10);
    edge(&mut g, 8, 11);
    edge(&mut g, 10, 6);
    g
}

fn bench_sugiyama_standard_simple(c: &mut Criterion) {
    c.bench_function("layout_sugiyama_standard_simple", |b| {
        b.iter(|| {
            let g = small_dag();
            let (config, reqs) = presets::sugiyama_standard();
            black_box(layout(&g, &config, reqs))
        })
    });
}

fn bench_sugiyama_standard_medium(c: &mut Criterion) {
    c.bench_function("layout_sugiyama_standard_medium", |b| {
        b.iter(|| {
            let g = medium_dag();
            let (config, reqs) = presets::sugiyama_standard();
            black_box(layout(&g, &config, reqs))
        })
    });
}

fn bench_sugiyama_quality_large(c: &mut Criterion) {
    c.bench_function("layout_sugiyama_quality_large", |b| {
        b.iter(|| {
            let g = large_dag();
            let (config, reqs) = presets::sugiyama_quality();
            black_box(layout(&g, &config, reqs))
        })
    });
}

fn bench_fdg_standard_simple(c: &mut Criterion) {
    c.bench_function("layout_fdg_standard_simple", |b| {
        b.iter(|| {
            let g = build_scaling_graph(4, false);
            let (config, reqs) = presets::fdg_standard();
            black_box(layout(&g, &config, reqs))
        })
    });
}

fn bench_fdg_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_fdg_scaling");
    for node_count in [5usize, 10, 25, 50, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("nodes", node_count),
            node_count,
            |b, &node_count| {
                b.iter(|| {
                    let g = build_scaling_graph(node_count, false);
                    let (config, reqs) = presets::fdg_fast();
                    black_box(layout(&g, &config, reqs))
                })
            },
        );
    }
    group.finish();
}

fn bench_sugiyama_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_sugiyama_scaling");
    for node_count in [5usize, 10, 20, 40, 80].iter() {
        group.bench_with_input(
            BenchmarkId::new("nodes", node_count),
            node_count,
            |b, &node_count| {
                b.iter(|| {
                    let g = build_scaling_graph(node_count, true);
                    let (config, reqs) = presets::sugiyama_fast();
                    black_box(layout(&g, &config, reqs))
                })
            },
        );
    }
    group.finish();
}

fn bench_algorithm_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_algorithm_comparison");

    group.bench_function("sugiyama", |b| {
        b.iter(|| {
            let g = build_scaling_graph(15, true);
            let (config, reqs) = presets::sugiyama_standard();
            black_box(layout(&g, &config, reqs))
        })
    });

    group.bench_function("force_directed", |b| {
        b.iter(|| {
            let g = build_scaling_graph(15, false);
            let (config, reqs) = presets::fdg_standard();
            black_box(layout(&g, &config, reqs))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sugiyama_standard_simple,
    bench_sugiyama_standard_medium,
    bench_sugiyama_quality_large,
    bench_fdg_standard_simple,
    bench_fdg_scaling,
    bench_sugiyama_scaling,
    bench_algorithm_comparison
);
criterion_main!(benches);
