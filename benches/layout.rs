use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mindmap_layout::config::LayoutConfig;
use mindmap_layout::ir::ContentNode;
use mindmap_layout::layout::{LayoutStrategy, compute_layout};
use std::hint::black_box;

/// Root with `themes` branches, each holding `findings` findings with two leaves.
fn synthetic_tree(themes: usize, findings: usize) -> ContentNode {
    let mut root = ContentNode::new("root", "Synthetic review", 0);
    for t in 0..themes {
        let mut theme = ContentNode::new(format!("t{t}"), format!("Theme number {t}"), 1);
        for f in 0..findings {
            theme.push_child(
                ContentNode::new(format!("t{t}-f{f}"), format!("Finding {f} of theme {t}"), 2)
                    .with_child(format!("t{t}-f{f}-a"), "Supporting detail")
                    .with_child(format!("t{t}-f{f}-b"), "Counter point"),
            );
        }
        root.push_child(theme);
    }
    root
}

fn bench_radial(c: &mut Criterion) {
    let mut group = c.benchmark_group("radial");
    let config = LayoutConfig::default();
    for (themes, findings) in [(3, 4), (6, 8), (8, 20), (12, 30)] {
        let tree = synthetic_tree(themes, findings);
        let name = format!("{themes}x{findings}");
        group.bench_with_input(BenchmarkId::from_parameter(name), &tree, |b, tree| {
            b.iter(|| {
                let layout = compute_layout(black_box(tree), &[], LayoutStrategy::Radial, &config)
                    .expect("layout failed");
                black_box(layout.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("force");
    group.sample_size(10);
    let config = LayoutConfig::default();
    for (themes, findings) in [(3, 4), (6, 8), (8, 12)] {
        let tree = synthetic_tree(themes, findings);
        let name = format!("{themes}x{findings}");
        group.bench_with_input(BenchmarkId::from_parameter(name), &tree, |b, tree| {
            b.iter(|| {
                let layout = compute_layout(black_box(tree), &[], LayoutStrategy::ForceDirected, &config)
                    .expect("layout failed");
                black_box(layout.diagnostics.convergence);
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_radial, bench_force
);
criterion_main!(benches);
