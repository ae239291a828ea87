use criterion::{criterion_group, criterion_main, Criterion};

use ldopt_core::coloring::{color, ColorCount, ColoringOptions};
use ldopt_core::conflict::ConflictGraph;

fn ring_with_chords(n: usize) -> ConflictGraph {
    let mut graph = ConflictGraph::new(n);
    for i in 0..n as u32 {
        graph.add_edge(i, (i + 1) % n as u32, 1).unwrap();
    }
    for i in (0..n as u32).step_by(3) {
        let j = (i + n as u32 / 2) % n as u32;
        if i != j {
            let _ = graph.add_edge(i, j, 2);
        }
    }
    graph
}

fn bench_three_coloring(c: &mut Criterion) {
    let graph = ring_with_chords(15);
    let options = ColoringOptions {
        color_count: ColorCount::Three,
        ..ColoringOptions::default()
    };
    c.bench_function("color_ring_three", |b| {
        b.iter(|| color(&graph, &options).unwrap())
    });
}

fn bench_four_coloring(c: &mut Criterion) {
    let graph = ring_with_chords(15);
    let options = ColoringOptions {
        color_count: ColorCount::Four,
        ..ColoringOptions::default()
    };
    c.bench_function("color_ring_four", |b| {
        b.iter(|| color(&graph, &options).unwrap())
    });
}

criterion_group!(coloring, bench_three_coloring, bench_four_coloring);
criterion_main!(coloring);
